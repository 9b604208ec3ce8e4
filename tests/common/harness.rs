//! Test harness driving an [`Editor`] through screen-space input.
//!
//! The camera starts at the origin with zoom 1, so screen and world
//! coordinates coincide until a test pans or zooms.

#![allow(dead_code)]

use super::init_logging;
use pipeline_node_editor::geometry::Vec2;
use pipeline_node_editor::hit_test;
use pipeline_node_editor::interaction::{Key, KeyEvent, KeyOutcome, Modifiers, PointerEvent};
use pipeline_node_editor::ports::{self, PortDirection};
use pipeline_node_editor::renderer::HeadlessRenderer;
use pipeline_node_editor::{Editor, EditorConfig, GestureKind, GraphStore, NodeId, NodeKind};

pub const VIEWPORT: (f32, f32) = (1280.0, 800.0);

pub struct EditorHarness {
    pub editor: Editor,
}

impl EditorHarness {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        init_logging();
        let mut editor = Editor::new(config);
        editor
            .attach_renderer(vec![Box::new(HeadlessRenderer::new(VIEWPORT.0, VIEWPORT.1))])
            .unwrap();
        Self { editor }
    }

    pub fn store(&self) -> &GraphStore {
        self.editor.store()
    }

    pub fn store_mut(&mut self) -> &mut GraphStore {
        self.editor.store_mut()
    }

    pub fn gesture(&self) -> GestureKind {
        self.editor.interaction().gesture_kind()
    }

    // ========================================================================
    // Graph setup
    // ========================================================================

    pub fn add(&mut self, kind: NodeKind, x: f32, y: f32) -> NodeId {
        self.store_mut().add_node(kind, x, y, None, None, None)
    }

    pub fn position(&self, id: &NodeId) -> (f32, f32) {
        self.store().node(id).unwrap().position.into()
    }

    /// Screen position of a port handle.
    pub fn port(&self, id: &NodeId, port: &str, direction: PortDirection) -> (f32, f32) {
        let node = self.store().node(id).unwrap();
        let location = ports::find_port(node, port, direction).unwrap();
        self.store().camera().world_to_screen(location.position).into()
    }

    pub fn output(&self, id: &NodeId, port: &str) -> (f32, f32) {
        self.port(id, port, PortDirection::Output)
    }

    pub fn input(&self, id: &NodeId, port: &str) -> (f32, f32) {
        self.port(id, port, PortDirection::Input)
    }

    /// Screen position of a node's connector icon.
    pub fn connector(&self, id: &NodeId) -> (f32, f32) {
        let node = self.store().node(id).unwrap();
        let world = hit_test::connector_position(node).unwrap();
        self.store().camera().world_to_screen(world).into()
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    pub fn press(&mut self, at: (f32, f32)) {
        self.press_with(at, Modifiers::NONE);
    }

    pub fn press_with(&mut self, at: (f32, f32), modifiers: Modifiers) {
        self.editor.pointer_down(PointerEvent::primary(at.0, at.1).with_modifiers(modifiers));
    }

    pub fn move_to(&mut self, at: (f32, f32)) {
        self.editor.pointer_move(PointerEvent::primary(at.0, at.1));
    }

    pub fn release(&mut self, at: (f32, f32)) {
        self.editor.pointer_up(PointerEvent::primary(at.0, at.1));
    }

    pub fn click(&mut self, at: (f32, f32)) {
        self.press(at);
        self.release(at);
    }

    pub fn shift_click(&mut self, at: (f32, f32)) {
        self.press_with(at, Modifiers::shift());
        self.release(at);
    }

    /// Press, move in a few steps, release.
    pub fn drag(&mut self, from: (f32, f32), to: (f32, f32)) {
        self.drag_with(from, to, Modifiers::NONE);
    }

    pub fn drag_with(&mut self, from: (f32, f32), to: (f32, f32), modifiers: Modifiers) {
        self.press_with(from, modifiers);
        self.move_steps(from, to);
        self.release(to);
    }

    pub fn move_steps(&mut self, from: (f32, f32), to: (f32, f32)) {
        let (a, b) = (Vec2::from(from), Vec2::from(to));
        for step in 1..=4 {
            self.move_to(a.lerp(b, step as f32 / 4.0).into());
        }
    }

    /// Second finger, for pinch gestures.
    pub fn touch_down(&mut self, pointer: u64, at: (f32, f32)) {
        self.editor.pointer_down(PointerEvent::primary(at.0, at.1).with_pointer(pointer));
    }

    pub fn touch_move(&mut self, pointer: u64, at: (f32, f32)) {
        self.editor.pointer_move(PointerEvent::primary(at.0, at.1).with_pointer(pointer));
    }

    pub fn touch_up(&mut self, pointer: u64, at: (f32, f32)) {
        self.editor.pointer_up(PointerEvent::primary(at.0, at.1).with_pointer(pointer));
    }

    // ========================================================================
    // Keyboard
    // ========================================================================

    pub fn key(&mut self, c: char, modifiers: Modifiers) -> KeyOutcome {
        self.editor.key_down(KeyEvent::char(c, modifiers))
    }

    pub fn command(&mut self, c: char) -> KeyOutcome {
        self.key(c, Modifiers::ctrl())
    }

    pub fn special(&mut self, key: Key) -> KeyOutcome {
        self.editor.key_down(KeyEvent::new(key, Modifiers::NONE))
    }
}
