//! Renderer capability interface.
//!
//! The core never draws. A host supplies one or more [`Renderer`]
//! implementations (GPU, 2D canvas, ...) and [`select_renderer`] keeps the
//! first one that initialises. Each frame the host pulls a [`RenderFrame`]
//! from the store and hands it over.

use crate::error::{EditorError, Result};
use crate::geometry::{Camera, Vec2};
use crate::graph::{Edge, Group, Node};
use crate::hit_test;
use crate::id::{EdgeId, GroupId, NodeId};
use crate::interaction::InteractionView;
use crate::path::{CubicBezier, MIN_CONTROL_OFFSET};
use crate::selection::SelectionManager;
use indexmap::IndexMap;

/// Borrowed view of everything drawn in one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    pub nodes: &'a IndexMap<NodeId, Node>,
    pub edges: &'a IndexMap<EdgeId, Edge>,
    pub groups: &'a IndexMap<GroupId, Group>,
    pub camera: Camera,
    pub selected_nodes: &'a SelectionManager<NodeId>,
    pub selected_edges: &'a SelectionManager<EdgeId>,
    /// Store revision this frame was taken at.
    pub revision: u64,
}

/// World-space curve of one edge, for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePath {
    pub id: EdgeId,
    pub curve: CubicBezier,
    pub selected: bool,
}

impl<'a> RenderFrame<'a> {
    /// Curves for every edge whose endpoints resolve, in z-order.
    pub fn edge_paths(&self) -> Vec<EdgePath> {
        self.edges
            .values()
            .filter_map(|edge| {
                let (start, end) = hit_test::edge_terminals(edge, self.nodes)?;
                Some(EdgePath {
                    id: edge.id.clone(),
                    curve: CubicBezier::from_endpoints(start, end, MIN_CONTROL_OFFSET),
                    selected: self.selected_edges.contains(&edge.id),
                })
            })
            .collect()
    }

    pub fn is_node_selected(&self, id: &NodeId) -> bool {
        self.selected_nodes.contains(id)
    }
}

pub trait Renderer {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Acquire the backend. A failure lets [`select_renderer`] fall through
    /// to the next candidate.
    fn initialize(&mut self) -> Result<()>;

    fn resize(&mut self, width: f32, height: f32);

    fn render(&mut self, frame: &RenderFrame<'_>);

    fn viewport_size(&self) -> Vec2;

    fn world_to_screen(&self, camera: &Camera, world: Vec2) -> Vec2 {
        camera.world_to_screen(world)
    }

    /// Edge under a world position. Backends with their own picking may
    /// override this.
    fn hit_test_edge(&self, frame: &RenderFrame<'_>, world: Vec2, threshold: f32) -> Option<EdgeId> {
        hit_test::hit_test_edge(world, frame.nodes, frame.edges, threshold)
    }

    fn set_interaction_state(&mut self, _view: &InteractionView) {}

    fn set_theme(&mut self, _dark: bool) {}
}

/// Initialise candidates in preference order and keep the first that works.
pub fn select_renderer(candidates: Vec<Box<dyn Renderer>>) -> Result<Box<dyn Renderer>> {
    for mut candidate in candidates {
        match candidate.initialize() {
            Ok(()) => {
                log::info!("using {} renderer", candidate.name());
                return Ok(candidate);
            }
            Err(e) => log::warn!("{} renderer unavailable: {e}", candidate.name()),
        }
    }
    Err(EditorError::NoRenderer)
}

/// Renderer that draws nothing; it only tracks the viewport and what it was
/// asked to draw. Used for headless hosts and as the fallback of last resort.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    viewport: Vec2,
    frames: u64,
    last_revision: Option<u64>,
    last_view: Option<InteractionView>,
    dark: bool,
}

impl HeadlessRenderer {
    pub fn new(width: f32, height: f32) -> Self {
        Self { viewport: Vec2::new(width, height), ..Self::default() }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_revision(&self) -> Option<u64> {
        self.last_revision
    }

    pub fn last_view(&self) -> Option<&InteractionView> {
        self.last_view.as_ref()
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }
}

impl Renderer for HeadlessRenderer {
    fn name(&self) -> &str {
        "headless"
    }

    fn initialize(&mut self) -> Result<()> {
        if !(self.viewport.x >= 0.0 && self.viewport.y >= 0.0) {
            return Err(EditorError::Renderer(format!("invalid viewport {:?}", self.viewport)));
        }
        Ok(())
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    fn render(&mut self, frame: &RenderFrame<'_>) {
        self.frames += 1;
        self.last_revision = Some(frame.revision);
    }

    fn viewport_size(&self) -> Vec2 {
        self.viewport
    }

    fn set_interaction_state(&mut self, view: &InteractionView) {
        self.last_view = Some(view.clone());
    }

    fn set_theme(&mut self, dark: bool) {
        self.dark = dark;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::GraphStore;

    struct Unavailable;

    impl Renderer for Unavailable {
        fn name(&self) -> &str {
            "gpu"
        }

        fn initialize(&mut self) -> Result<()> {
            Err(EditorError::Renderer("no adapter".into()))
        }

        fn resize(&mut self, _width: f32, _height: f32) {}

        fn render(&mut self, _frame: &RenderFrame<'_>) {}

        fn viewport_size(&self) -> Vec2 {
            Vec2::ZERO
        }
    }

    #[test]
    fn test_select_renderer_falls_through() {
        let renderer = select_renderer(vec![Box::new(Unavailable), Box::new(HeadlessRenderer::new(800.0, 600.0))])
            .unwrap();
        assert_eq!(renderer.name(), "headless");
        assert_eq!(renderer.viewport_size(), Vec2::new(800.0, 600.0));
    }

    #[test]
    fn test_select_renderer_none_available() {
        let err = select_renderer(vec![Box::new(Unavailable)]).err().unwrap();
        assert!(matches!(err, EditorError::NoRenderer));
        assert!(matches!(select_renderer(Vec::new()), Err(EditorError::NoRenderer)));
    }

    #[test]
    fn test_edge_paths_follow_ports() {
        let mut store = GraphStore::new();
        let a = store.add_node("image", 0.0, 0.0, None, None, None);
        let b = store.add_node("model", 400.0, 0.0, None, None, None);
        let input = crate::registry::definition(&store.node(&b).unwrap().kind).inputs[0].id;
        let edge = store.add_edge(&a, "image", &b, input).unwrap();
        store.select_edge(&edge, false);

        let frame = store.frame();
        let paths = frame.edge_paths();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].selected);
        let (start, end) = hit_test::edge_terminals(store.edge(&edge).unwrap(), store.nodes()).unwrap();
        assert_eq!(paths[0].curve.p0, start);
        assert_eq!(paths[0].curve.p3, end);
    }

    #[test]
    fn test_headless_records_frames() {
        let store = GraphStore::new();
        let mut renderer = HeadlessRenderer::new(100.0, 100.0);
        renderer.initialize().unwrap();
        renderer.render(&store.frame());
        renderer.set_theme(true);
        assert_eq!(renderer.frames(), 1);
        assert_eq!(renderer.last_revision(), Some(store.revision()));
        assert!(renderer.is_dark());
    }
}
