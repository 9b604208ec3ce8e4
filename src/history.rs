//! Bounded undo/redo stacks of reversible graph actions.
//!
//! Entries are gesture-granular: a whole drag is one [`HistoryAction::MoveNodes`],
//! a multi-delete is one [`HistoryAction::Batch`]. Applying an entry is the
//! store's job; this module only owns the stacks.

use crate::graph::{Edge, Group, Node, NodeMove};
use crate::id::GroupId;
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 5;

/// State of one group before and after a change; `None` means absent.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDelta {
    pub before: Option<Group>,
    pub after: Option<Group>,
}

impl GroupDelta {
    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryAction {
    AddNode {
        node: Node,
        index: usize,
    },
    /// A node together with everything its deletion cascaded into.
    DeleteNode {
        node: Node,
        index: usize,
        edges: Vec<(usize, Edge)>,
        memberships: Vec<(GroupId, usize)>,
    },
    AddEdge {
        edge: Edge,
        /// Edge that previously occupied the same target port.
        replaced: Option<(usize, Edge)>,
    },
    DeleteEdge {
        edge: Edge,
        index: usize,
    },
    MoveNodes {
        moves: Vec<NodeMove>,
    },
    /// Ungroup; `index` is the frame's position in group z-order.
    DeleteGroup {
        group: Group,
        index: usize,
    },
    GroupChange {
        groups: Vec<GroupDelta>,
        moves: Vec<NodeMove>,
    },
    /// Applied front to back, undone back to front.
    Batch(Vec<HistoryAction>),
}

impl HistoryAction {
    pub fn label(&self) -> &'static str {
        match self {
            HistoryAction::AddNode { .. } => "add node",
            HistoryAction::DeleteNode { .. } => "delete node",
            HistoryAction::AddEdge { .. } => "add edge",
            HistoryAction::DeleteEdge { .. } => "delete edge",
            HistoryAction::MoveNodes { .. } => "move nodes",
            HistoryAction::DeleteGroup { .. } => "ungroup",
            HistoryAction::GroupChange { .. } => "group change",
            HistoryAction::Batch(_) => "batch",
        }
    }

    /// Collapse trivial batches so an empty gesture never produces an entry.
    pub fn batch(mut actions: Vec<HistoryAction>) -> Option<HistoryAction> {
        match actions.len() {
            0 => None,
            1 => actions.pop(),
            _ => Some(HistoryAction::Batch(actions)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<HistoryAction>,
    redo_stack: Vec<HistoryAction>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(capacity + 1),
            redo_stack: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a new action. Clears the redo stack and evicts the oldest entry
    /// once the capacity is exceeded.
    pub fn push(&mut self, action: HistoryAction) {
        log::debug!("history: push {}", action.label());
        self.push_undo(action);
        self.redo_stack.clear();
    }

    fn push_undo(&mut self, action: HistoryAction) {
        self.undo_stack.push_back(action);
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
    }

    /// Pop the newest action and move it onto the redo stack.
    /// The caller applies its inverse.
    pub fn undo(&mut self) -> Option<HistoryAction> {
        let action = self.undo_stack.pop_back()?;
        log::debug!("history: undo {}", action.label());
        self.redo_stack.push(action.clone());
        Some(action)
    }

    /// Pop the most recently undone action and move it back onto the undo
    /// stack. The caller re-applies it.
    pub fn redo(&mut self) -> Option<HistoryAction> {
        let action = self.redo_stack.pop()?;
        log::debug!("history: redo {}", action.label());
        self.push_undo(action.clone());
        Some(action)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;
    use crate::id::NodeId;

    fn move_action(tag: &str) -> HistoryAction {
        HistoryAction::MoveNodes {
            moves: vec![NodeMove::new(NodeId::from(tag), Vec2::ZERO, Vec2::new(1.0, 1.0))],
        }
    }

    #[test]
    fn test_push_then_undo_then_redo() {
        let mut history = History::default();
        history.push(move_action("a"));
        assert!(history.can_undo());
        assert!(!history.can_redo());

        assert_eq!(history.undo(), Some(move_action("a")));
        assert!(!history.can_undo());
        assert_eq!(history.redo_len(), 1);

        assert_eq!(history.redo(), Some(move_action("a")));
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = History::with_capacity(5);
        for i in 0..10 {
            history.push(move_action(&format!("n{i}")));
        }
        assert_eq!(history.undo_len(), 5);
        let mut undone = Vec::new();
        while let Some(action) = history.undo() {
            undone.push(action);
        }
        assert_eq!(undone.first(), Some(&move_action("n9")));
        assert_eq!(undone.last(), Some(&move_action("n5")));
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::default();
        history.push(move_action("a"));
        history.push(move_action("b"));
        history.undo();
        assert!(history.can_redo());
        history.push(move_action("c"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks_return_none() {
        let mut history = History::default();
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut history = History::with_capacity(0);
        history.push(move_action("a"));
        history.push(move_action("b"));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_batch_collapses_trivial_cases() {
        assert_eq!(HistoryAction::batch(vec![]), None);
        assert_eq!(HistoryAction::batch(vec![move_action("a")]), Some(move_action("a")));
        assert!(matches!(
            HistoryAction::batch(vec![move_action("a"), move_action("b")]),
            Some(HistoryAction::Batch(v)) if v.len() == 2
        ));
    }
}
