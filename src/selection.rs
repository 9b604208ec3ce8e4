use indexmap::IndexSet;
use std::hash::Hash;

/// Ordered set of selected ids.
///
/// Iteration follows selection order, which keeps duplicate/delete batches
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionManager<T: Hash + Eq> {
    selected: IndexSet<T>,
}

impl<T: Hash + Eq> Default for SelectionManager<T> {
    fn default() -> Self {
        Self { selected: IndexSet::new() }
    }
}

impl<T: Hash + Eq + Clone> SelectionManager<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id`, replacing the selection unless `additive`.
    pub fn select(&mut self, id: T, additive: bool) {
        if !additive {
            self.selected.clear();
        }
        self.selected.insert(id);
    }

    /// Flip membership of `id`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: T) -> bool {
        if self.selected.shift_remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Click semantics: shift toggles, a plain click on an unselected item
    /// replaces the selection, a plain click on a selected item keeps it so
    /// the whole selection can be dragged.
    pub fn handle_interaction(&mut self, id: T, shift_held: bool) {
        if shift_held {
            self.toggle(id);
        } else if !self.selected.contains(&id) {
            self.select(id, false);
        }
    }

    pub fn remove(&mut self, id: &T) -> bool {
        self.selected.shift_remove(id)
    }

    /// Clear the current selection
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Replace the current selection with a new set of IDs
    ///
    /// Used when a marquee rectangle is (re)evaluated.
    pub fn replace_selection<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.selected.clear();
        self.selected.extend(ids);
    }

    /// Drop every id for which `keep` returns false.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.selected.retain(keep);
    }

    pub fn contains(&self, id: &T) -> bool {
        self.selected.contains(id)
    }

    pub fn iter(&self) -> indexmap::set::Iter<'_, T> {
        self.selected.iter()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.selected.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

#[cfg(feature = "slint")]
impl<T> SelectionManager<T>
where
    T: Hash + Eq + Clone + AsRef<str> + for<'a> From<&'a str>,
{
    /// Sync the internal selection set to a Slint VecModel
    pub fn sync_to_model(&self, model: &slint::VecModel<slint::SharedString>) {
        use slint::Model;
        while model.row_count() > 0 {
            model.remove(0);
        }
        for id in &self.selected {
            model.push(slint::SharedString::from(id.as_ref()));
        }
    }

    /// Sync the internal selection set from any Slint Model
    pub fn sync_from_model(&mut self, model: &dyn slint::Model<Data = slint::SharedString>) {
        self.selected.clear();
        for i in 0..model.row_count() {
            if let Some(id) = model.row_data(i) {
                self.selected.insert(T::from(id.as_str()));
            }
        }
    }
}
