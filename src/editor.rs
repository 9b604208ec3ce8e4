//! One editor instance: store, interaction engine, configuration, and the
//! optional renderer and completion queue hanging off them.

use crate::config::EditorConfig;
use crate::error::Result;
use crate::executor::{CompletionQueue, ExecutionEngine, ExecutionOutcome};
use crate::geometry::Vec2;
use crate::interaction::{
    InteractionEngine, InteractionView, KeyEvent, KeyOutcome, Modifiers, PointerEvent, PointerId,
};
use crate::renderer::{select_renderer, Renderer};
use crate::store::GraphStore;
use std::path::Path;
use std::time::{Duration, Instant};

pub struct Editor {
    config: EditorConfig,
    store: GraphStore,
    interaction: InteractionEngine,
    completions: CompletionQueue,
    renderer: Option<Box<dyn Renderer>>,
    rendered_revision: Option<u64>,
    rendered_view: Option<InteractionView>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let completions =
            CompletionQueue::new(Duration::from_millis(config.execution.completion_display_ms));
        Self {
            store: GraphStore::with_config(&config),
            interaction: InteractionEngine::new(&config),
            completions,
            renderer: None,
            rendered_revision: None,
            rendered_view: None,
            config,
        }
    }

    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(EditorConfig::load(path)?))
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GraphStore {
        &mut self.store
    }

    pub fn interaction(&self) -> &InteractionEngine {
        &self.interaction
    }

    /// Engine and store together, for calls the wrappers below don't cover.
    pub fn parts_mut(&mut self) -> (&mut InteractionEngine, &mut GraphStore) {
        (&mut self.interaction, &mut self.store)
    }

    pub fn completions(&self) -> &CompletionQueue {
        &self.completions
    }

    pub fn view(&self) -> InteractionView {
        self.interaction.view(&self.store)
    }

    // ========================================================================
    // Renderer
    // ========================================================================

    /// Probe `candidates` in order and keep the first that initialises.
    pub fn attach_renderer(&mut self, candidates: Vec<Box<dyn Renderer>>) -> Result<()> {
        let renderer = select_renderer(candidates)?;
        self.interaction.set_viewport(renderer.viewport_size());
        self.renderer = Some(renderer);
        self.rendered_revision = None;
        self.rendered_view = None;
        Ok(())
    }

    pub fn renderer(&self) -> Option<&dyn Renderer> {
        self.renderer.as_deref()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.interaction.set_viewport(Vec2::new(width, height));
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize(width, height);
        }
        self.rendered_revision = None;
    }

    /// Draw if the store or the interaction state changed since the last
    /// frame. Returns whether anything was drawn.
    pub fn render_frame(&mut self) -> bool {
        let Some(renderer) = self.renderer.as_mut() else {
            return false;
        };
        let view = self.interaction.view(&self.store);
        let revision = self.store.revision();
        if self.rendered_revision == Some(revision) && self.rendered_view.as_ref() == Some(&view) {
            return false;
        }
        renderer.set_interaction_state(&view);
        renderer.render(&self.store.frame());
        log::trace!("rendered revision {revision}");
        self.rendered_revision = Some(revision);
        self.rendered_view = Some(view);
        true
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Route the engine's completion callbacks into this editor.
    pub fn connect_execution(&self, engine: &mut dyn ExecutionEngine) {
        engine.set_callbacks(self.completions.callbacks());
    }

    pub fn execute(&mut self, engine: &mut dyn ExecutionEngine) -> ExecutionOutcome {
        let outcome = engine.execute(&mut self.store);
        match &outcome.error {
            Some(error) => log::warn!("execution failed: {error}"),
            None => log::info!("execution finished"),
        }
        outcome
    }

    // ========================================================================
    // Frame tick and input
    // ========================================================================

    /// Advance time-driven state. Returns true while a camera animation is
    /// running or completions are still pending.
    pub fn tick(&mut self, now: Instant) -> bool {
        let animating = self.interaction.tick(&mut self.store, now);
        self.completions.poll(&mut self.store, now);
        animating || !self.completions.is_empty()
    }

    pub fn pointer_down(&mut self, event: PointerEvent) {
        self.interaction.pointer_down(&mut self.store, event);
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        self.interaction.pointer_move(&mut self.store, event);
    }

    pub fn pointer_up(&mut self, event: PointerEvent) {
        self.interaction.pointer_up(&mut self.store, event);
    }

    pub fn pointer_cancel(&mut self, pointer_id: PointerId) {
        self.interaction.pointer_cancel(&mut self.store, pointer_id);
    }

    pub fn wheel(&mut self, position: Vec2, delta: Vec2, modifiers: Modifiers) {
        self.interaction.wheel(&mut self.store, position, delta, modifiers);
    }

    pub fn key_down(&mut self, event: KeyEvent) -> KeyOutcome {
        self.interaction.key_down(&mut self.store, event)
    }

    pub fn key_up(&mut self, event: KeyEvent) -> KeyOutcome {
        self.interaction.key_up(event)
    }
}
