//! Slint model sync.
//!
//! Copies store state into `VecModel`s a `.slint` UI can bind to. The UI
//! stays a view; every mutation still goes through [`Editor`](crate::editor::Editor).
//!
//! ```ignore
//! let rows = Rc::new(VecModel::<NodeRow>::default());
//! let selected = Rc::new(VecModel::<SharedString>::default());
//! let timer = slint::Timer::default();
//! timer.start(TimerMode::Repeated, Duration::from_millis(16), {
//!     let editor = editor.clone();
//!     move || {
//!         let mut editor = editor.borrow_mut();
//!         editor.tick(Instant::now());
//!         bridge::sync_node_rows(editor.store(), &rows);
//!         bridge::sync_selection(editor.store(), &selected);
//!     }
//! });
//! ```

use crate::geometry::Rect;
use crate::graph::NodeStatus;
use crate::registry;
use crate::store::GraphStore;
use slint::{Model, SharedString, VecModel};

/// One node as the UI draws it, in screen space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeRow {
    pub id: SharedString,
    pub kind: SharedString,
    pub title: SharedString,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub status: SharedString,
    pub error: SharedString,
    pub thumbnail: SharedString,
    pub selected: bool,
}

fn status_name(status: NodeStatus) -> &'static str {
    match status {
        NodeStatus::Idle => "idle",
        NodeStatus::Pending => "pending",
        NodeStatus::Running => "running",
        NodeStatus::Complete => "complete",
        NodeStatus::Error => "error",
    }
}

/// Rows for every node in z-order.
pub fn node_rows(store: &GraphStore) -> Vec<NodeRow> {
    let camera = store.camera();
    store
        .nodes()
        .values()
        .map(|node| {
            let screen: Rect = camera.world_rect_to_screen(&node.rect());
            NodeRow {
                id: node.id.as_str().into(),
                kind: node.kind.as_str().into(),
                title: registry::definition(&node.kind).title.into(),
                x: screen.x,
                y: screen.y,
                width: screen.width,
                height: screen.height,
                status: status_name(node.status).into(),
                error: node.error.as_deref().unwrap_or_default().into(),
                thumbnail: node.thumbnail.as_deref().unwrap_or_default().into(),
                selected: store.is_node_selected(&node.id),
            }
        })
        .collect()
}

/// Update `model` in place, touching only rows that changed.
pub fn sync_node_rows(store: &GraphStore, model: &VecModel<NodeRow>) {
    let rows = node_rows(store);
    for (i, row) in rows.iter().enumerate() {
        if i < model.row_count() {
            if model.row_data(i).as_ref() != Some(row) {
                model.set_row_data(i, row.clone());
            }
        } else {
            model.push(row.clone());
        }
    }
    while model.row_count() > rows.len() {
        model.remove(model.row_count() - 1);
    }
}

/// Mirror the node selection into a model of ids.
pub fn sync_selection(store: &GraphStore, model: &VecModel<SharedString>) {
    store.selected_node_ids().sync_to_model(model);
}

/// Mirror the edge selection into a model of ids.
pub fn sync_edge_selection(store: &GraphStore, model: &VecModel<SharedString>) {
    store.selected_edge_ids().sync_to_model(model);
}
