use crate::geometry::Vec2;
use indexmap::IndexMap;

pub type PointerId = u64;

/// Active pointer contacts, keyed by pointer id, in press order.
#[derive(Debug, Clone, Default)]
pub struct ContactMap {
    contacts: IndexMap<PointerId, Vec2>,
}

/// Distance between and midpoint of the first two contacts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pinch {
    pub distance: f32,
    pub midpoint: Vec2,
}

impl ContactMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, id: PointerId, position: Vec2) {
        self.contacts.insert(id, position);
    }

    /// Update a known contact. Returns false for pointers that are not pressed.
    pub fn update(&mut self, id: PointerId, position: Vec2) -> bool {
        match self.contacts.get_mut(&id) {
            Some(p) => {
                *p = position;
                true
            }
            None => false,
        }
    }

    pub fn release(&mut self, id: PointerId) -> Option<Vec2> {
        self.contacts.shift_remove(&id)
    }

    pub fn contains(&self, id: PointerId) -> bool {
        self.contacts.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
    }

    /// Position of the oldest remaining contact.
    pub fn first(&self) -> Option<Vec2> {
        self.contacts.first().map(|(_, p)| *p)
    }

    pub fn pinch(&self) -> Option<Pinch> {
        let mut points = self.contacts.values();
        let a = *points.next()?;
        let b = *points.next()?;
        Some(Pinch { distance: a.distance(b), midpoint: a.midpoint(b) })
    }
}
