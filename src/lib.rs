//! # Pipeline Node Editor
//!
//! Graph model and interaction engine for node-based generative-AI pipeline
//! editors: image inputs, diffusion and 3D-reconstruction models, and their
//! outputs wired together on a pannable, zoomable canvas.
//!
//! ## Layers
//!
//! - [`GraphStore`] - nodes, edges, groups, selection, camera and a bounded
//!   undo/redo history with one entry per user gesture
//! - [`InteractionEngine`] - pointer/keyboard state machine turning raw input
//!   into store mutations and ephemeral UI state ([`InteractionView`])
//! - [`geometry`], [`ports`], [`hit_test`], [`path`] - coordinate transforms,
//!   derived ports, hit-testing and edge curves
//! - [`registry`] - node kinds with their default parameters, sizes and ports
//! - [`Editor`] - one editor instance tying the above to a [`Renderer`] and an
//!   [`ExecutionEngine`]
//!
//! Drawing and inference are external: hosts implement [`Renderer`] and
//! [`ExecutionEngine`].
//!
//! ## Quick Start
//!
//! ```
//! use pipeline_node_editor::{GraphStore, NodeKind};
//!
//! let mut store = GraphStore::new();
//! let image = store.add_node(NodeKind::Image, 0.0, 0.0, None, None, None);
//! let model = store.add_node(NodeKind::Model, 320.0, 0.0, None, None, None);
//! store.add_edge(&image, "image", &model, "image");
//!
//! assert_eq!(store.edges().len(), 1);
//! store.undo();
//! assert!(store.edges().is_empty());
//! ```
//!
//! The library logs through the `log` facade and installs no logger.

pub mod config;
pub mod editor;
pub mod error;
pub mod executor;
pub mod geometry;
pub mod graph;
pub mod history;
pub mod id;
pub mod interaction;
pub mod path;
pub mod ports;
pub mod registry;
pub mod renderer;
pub mod selection;
pub mod store;

#[cfg(feature = "slint")]
pub mod bridge;

pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{EditorError, Result};
pub use executor::{CompletionQueue, ExecutionCallbacks, ExecutionEngine, ExecutionOutcome};
pub use geometry::{Camera, CameraPatch, Rect, Vec2};
pub use graph::{
    // Connection validation framework
    BasicValidator, CompositeValidator, ConnectionRequest, ConnectionValidator, NoDuplicatesValidator,
    TypeValidator, ValidationError, ValidationResult,
    Edge, Group, GroupPatch, Node, NodePatch, NodeStatus, Params,
};
pub use history::{History, HistoryAction};
pub use id::{EdgeId, GroupId, NodeId};
pub use interaction::{
    GestureKind, InteractionEngine, InteractionView, Key, KeyEvent, KeyOutcome, Modifiers,
    PointerButton, PointerEvent,
};
pub use ports::{are_ports_compatible, PortDirection, PortType};
pub use registry::NodeKind;
pub use renderer::{select_renderer, RenderFrame, Renderer};
pub use selection::SelectionManager;
pub use store::GraphStore;
