//! Pointer and keyboard state machine.
//!
//! [`InteractionEngine`] turns raw input into store mutations. It holds
//! exactly one active [`Gesture`]; every gesture either commits one history
//! entry on release or is abandoned, restoring whatever it changed silently
//! while in flight. The engine never owns the store; each handler borrows it.

pub mod camera_anim;
pub mod contacts;
pub mod gesture;
pub mod keyboard;
pub mod view;

pub use camera_anim::{ease_out_cubic, CameraAnimation};
pub use contacts::{ContactMap, PointerId};
pub use gesture::{Gesture, GestureKind, PanSource};
pub use keyboard::{Key, KeyCommand, KeyEvent, KeyOutcome, Modifiers};
pub use view::{AppendMenu, GroupAffordance, HoverState, InteractionView, PendingConnection};

use crate::config::{CameraConfig, EditorConfig, InteractionConfig};
use crate::geometry::{clamp_zoom, Camera, CameraPatch, Rect, Vec2};
use crate::graph::{
    BasicValidator, CompositeValidator, ConnectionRequest, ConnectionValidator, GroupPatch,
    NodeMove, NodePatch, TypeValidator, ValidationResult,
};
use crate::hit_test::{
    self, EdgeEnd, HitMode, CONNECTOR_RADIUS, GROUP_HEADER_HEIGHT,
};
use crate::history::GroupDelta;
use crate::id::{GroupId, NodeId};
use crate::ports::{self, are_ports_compatible, PortDirection, PortLocation};
use crate::registry::{self, NodeKind};
use crate::store::GraphStore;
use gesture::{
    ConnectState, DragState, GroupDragState, GroupResizeState, MarqueeState, ReconnectState,
};
use std::time::{Duration, Instant};

/// Smallest size a group can be resized to.
const MIN_GROUP_SIZE: Vec2 = Vec2::new(120.0, 80.0);
/// Horizontal gap between a node and one appended from its connector menu.
const APPEND_GAP: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// A pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: PointerId,
    pub position: Vec2,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn primary(x: f32, y: f32) -> Self {
        Self {
            pointer_id: 0,
            position: Vec2::new(x, y),
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_pointer(mut self, pointer_id: PointerId) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

pub struct InteractionEngine {
    config: InteractionConfig,
    camera_config: CameraConfig,
    connect_validator: CompositeValidator,
    reconnect_validator: CompositeValidator,
    gesture: Gesture,
    contacts: ContactMap,
    space_held: bool,
    hover: HoverState,
    active_group: Option<GroupId>,
    affordance: Option<GroupAffordance>,
    menu: Option<AppendMenu>,
    animation: Option<CameraAnimation>,
    viewport: Vec2,
}

impl Default for InteractionEngine {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl InteractionEngine {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            config: config.interaction.clone(),
            camera_config: config.camera.clone(),
            connect_validator: CompositeValidator::standard(),
            // Duplicates are resolved by the store: re-dropping on the
            // original port is a no-op rather than a rejection.
            reconnect_validator: CompositeValidator::new().add(BasicValidator).add(TypeValidator),
            gesture: Gesture::Idle,
            contacts: ContactMap::new(),
            space_held: false,
            hover: HoverState::None,
            active_group: None,
            affordance: None,
            menu: None,
            animation: None,
            viewport: Vec2::new(1280.0, 800.0),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn gesture_kind(&self) -> GestureKind {
        self.gesture.kind()
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn active_group(&self) -> Option<&GroupId> {
        self.active_group.as_ref()
    }

    pub fn affordance(&self) -> Option<&GroupAffordance> {
        self.affordance.as_ref()
    }

    pub fn menu(&self) -> Option<&AppendMenu> {
        self.menu.as_ref()
    }

    pub fn contacts(&self) -> &ContactMap {
        &self.contacts
    }

    pub fn space_held(&self) -> bool {
        self.space_held
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn set_viewport(&mut self, size: Vec2) {
        self.viewport = size;
    }

    fn begin(&mut self, next: Gesture) {
        log::debug!("gesture: {} -> {}", self.gesture.kind(), next.kind());
        self.gesture = next;
    }

    fn px(&self, store: &GraphStore, pixels: f32) -> f32 {
        store.camera().screen_len_to_world(pixels)
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    pub fn pointer_down(&mut self, store: &mut GraphStore, event: PointerEvent) {
        self.contacts.press(event.pointer_id, event.position);

        if self.contacts.len() >= 2 {
            self.abandon(store);
            if let Some(pinch) = self.contacts.pinch() {
                self.animation = None;
                self.begin(Gesture::Pan(PanSource::Pinch {
                    last_distance: pinch.distance,
                    last_mid: pinch.midpoint,
                }));
            }
            return;
        }
        if !self.gesture.is_idle() {
            return;
        }
        if self.space_held || event.button == PointerButton::Middle {
            self.animation = None;
            self.begin(Gesture::Pan(PanSource::Pointer { last: event.position }));
            return;
        }
        if event.button != PointerButton::Primary {
            return;
        }

        self.menu = None;
        self.affordance = None;
        let world = store.camera().screen_to_world(event.position);
        let shift = event.modifiers.shift;

        if let Some(anchor) = self.connector_at(store, world) {
            self.begin(Gesture::Connect(ConnectState {
                anchor,
                pointer_world: world,
                snap: None,
                from_connector: true,
                start_screen: event.position,
                moved: false,
            }));
            return;
        }

        if let Some(anchor) = self.port_at(store, world) {
            self.begin(Gesture::Connect(ConnectState {
                anchor,
                pointer_world: world,
                snap: None,
                from_connector: false,
                start_screen: event.position,
                moved: false,
            }));
            return;
        }

        let threshold = self.px(store, self.config.endpoint_threshold);
        if let Some(hit) = hit_test::hit_test_edge_endpoint(world, store.nodes(), store.edges(), threshold) {
            if let Some(fixed) = self.fixed_terminal(store, &hit) {
                store.select_edge(&hit.edge_id, false);
                self.begin(Gesture::Reconnect(ReconnectState {
                    edge_id: hit.edge_id,
                    moving: hit.end,
                    fixed,
                    pointer_world: world,
                    snap: None,
                }));
                return;
            }
        }

        let threshold = self.px(store, self.config.edge_hit_threshold);
        if let Some(edge_id) = hit_test::hit_test_edge(world, store.nodes(), store.edges(), threshold) {
            if shift {
                store.toggle_edge(&edge_id);
            } else {
                store.select_edge(&edge_id, false);
            }
            self.active_group = None;
            return;
        }

        if let Some(node_id) = hit_test::hit_test_node(world, store.nodes(), HitMode::Exact).map(|n| n.id.clone()) {
            self.active_group = None;
            store.click_node(&node_id, shift);
            if !store.selected_node_ids().is_empty() {
                let origins = store
                    .selected_node_ids()
                    .iter()
                    .filter_map(|id| store.node(id).map(|n| (id.clone(), n.position)))
                    .collect();
                self.begin(Gesture::Drag(DragState { start_world: world, origins, moved: false }));
            }
            return;
        }

        if let Some(group) = hit_test::hit_test_group_resize_handle(world, store.groups()).cloned() {
            self.active_group = Some(group.id.clone());
            self.begin(Gesture::GroupResize(GroupResizeState {
                group_id: group.id.clone(),
                start_world: world,
                before: group,
            }));
            return;
        }

        if let Some(group) = hit_test::hit_test_group_header(world, store.groups()).cloned() {
            self.active_group = Some(group.id.clone());
            let origins = group
                .members
                .iter()
                .filter_map(|id| store.node(id).map(|n| (id.clone(), n.position)))
                .collect();
            self.begin(Gesture::GroupDrag(GroupDragState {
                group_id: group.id.clone(),
                start_world: world,
                before: group,
                origins,
            }));
            return;
        }

        self.active_group = None;
        self.begin(Gesture::Marquee(MarqueeState {
            origin: event.position,
            current: event.position,
            committed: false,
            additive: shift,
            base_nodes: store.selected_node_ids().to_vec(),
            base_edges: store.selected_edge_ids().to_vec(),
        }));
    }

    pub fn pointer_move(&mut self, store: &mut GraphStore, event: PointerEvent) {
        let pressed = self.contacts.update(event.pointer_id, event.position);
        let world = store.camera().screen_to_world(event.position);

        if self.gesture.is_idle() {
            self.hover = self.hover_at(store, world);
            return;
        }
        if !pressed {
            return;
        }

        let snap_radius = self.px(store, self.config.snap_radius);
        let mut gesture = std::mem::take(&mut self.gesture);
        match &mut gesture {
            Gesture::Idle => {}
            Gesture::Pan(PanSource::Pointer { last }) => {
                let delta = event.position - *last;
                *last = event.position;
                pan_by_screen(store, delta);
            }
            Gesture::Pan(PanSource::Pinch { last_distance, last_mid }) => {
                if let Some(pinch) = self.contacts.pinch() {
                    let camera = store.camera();
                    let factor = if *last_distance > f32::EPSILON {
                        pinch.distance / *last_distance
                    } else {
                        1.0
                    };
                    let (min_zoom, max_zoom) = store.zoom_limits();
                    let zoom = clamp_zoom(camera.zoom * factor, min_zoom, max_zoom);
                    let zoomed = camera.zoomed_about(*last_mid, zoom);
                    let pan = (pinch.midpoint - *last_mid) / zoom;
                    store.set_camera(Camera::new(zoomed.x + pan.x, zoomed.y + pan.y, zoom).into());
                    *last_distance = pinch.distance;
                    *last_mid = pinch.midpoint;
                }
            }
            Gesture::Drag(drag) => {
                let delta = world - drag.start_world;
                if delta != Vec2::ZERO {
                    drag.moved = true;
                }
                for (id, origin) in &drag.origins {
                    let to = *origin + delta;
                    store.update_node(id, NodePatch::position(to.x, to.y));
                }
            }
            Gesture::Marquee(marquee) => {
                marquee.current = event.position;
                if !marquee.committed
                    && marquee.origin.distance(marquee.current) > self.config.marquee_threshold
                {
                    log::debug!("marquee committed");
                    marquee.committed = true;
                }
                if marquee.committed {
                    let rect = store
                        .camera()
                        .screen_rect_to_world(&Rect::from_corners(marquee.origin, marquee.current));
                    let mut nodes = hit_test::nodes_in_rect(&rect, store.nodes());
                    let mut edges = hit_test::edges_in_rect(&rect, store.nodes(), store.edges());
                    if marquee.additive {
                        nodes.splice(0..0, marquee.base_nodes.iter().cloned());
                        edges.splice(0..0, marquee.base_edges.iter().cloned());
                    }
                    store.set_selection(nodes, edges);
                }
            }
            Gesture::Connect(connect) => {
                connect.pointer_world = world;
                if connect.start_screen.distance(event.position) > self.config.click_threshold {
                    connect.moved = true;
                }
                connect.snap = hit_test::find_nearest_compatible_port(
                    world,
                    store.nodes(),
                    !connect.anchor.is_output(),
                    Some(&connect.anchor.node_id),
                    snap_radius,
                    connect.anchor.port_type,
                );
            }
            Gesture::Reconnect(reconnect) => {
                reconnect.pointer_world = world;
                reconnect.snap = hit_test::find_nearest_compatible_port(
                    world,
                    store.nodes(),
                    !reconnect.fixed.is_output(),
                    Some(&reconnect.fixed.node_id),
                    snap_radius,
                    reconnect.fixed.port_type,
                );
            }
            Gesture::GroupDrag(drag) => {
                let delta = world - drag.start_world;
                store.update_group(&drag.group_id, GroupPatch::rect(drag.before.rect.translate(delta)));
                for (id, origin) in &drag.origins {
                    let to = *origin + delta;
                    store.update_node(id, NodePatch::position(to.x, to.y));
                }
            }
            Gesture::GroupResize(resize) => {
                let delta = world - resize.start_world;
                let size = (resize.before.rect.size() + delta).max(MIN_GROUP_SIZE);
                store.update_group(
                    &resize.group_id,
                    GroupPatch::rect(Rect::from_origin_size(resize.before.rect.origin(), size)),
                );
            }
        }
        self.gesture = gesture;
    }

    pub fn pointer_up(&mut self, store: &mut GraphStore, event: PointerEvent) {
        self.contacts.update(event.pointer_id, event.position);
        if self.contacts.release(event.pointer_id).is_none() {
            return;
        }

        let gesture = std::mem::take(&mut self.gesture);
        let kind = gesture.kind();
        match gesture {
            Gesture::Idle => {}
            Gesture::Pan(source) => {
                match (self.contacts.first(), self.contacts.pinch()) {
                    (_, Some(pinch)) => {
                        self.gesture = Gesture::Pan(PanSource::Pinch {
                            last_distance: pinch.distance,
                            last_mid: pinch.midpoint,
                        });
                    }
                    (Some(last), None) if matches!(source, PanSource::Pinch { .. }) => {
                        log::debug!("gesture: pinch -> pan");
                        self.gesture = Gesture::Pan(PanSource::Pointer { last });
                    }
                    (Some(_), None) => self.gesture = Gesture::Pan(source),
                    (None, None) => {}
                }
            }
            Gesture::Drag(drag) => self.finish_drag(store, drag),
            Gesture::Marquee(marquee) => self.finish_marquee(store, marquee),
            Gesture::Connect(connect) => self.finish_connect(store, connect, event.position),
            Gesture::Reconnect(reconnect) => self.finish_reconnect(store, reconnect),
            Gesture::GroupDrag(drag) => self.finish_group_drag(store, drag),
            Gesture::GroupResize(resize) => self.finish_group_resize(store, resize),
        }

        if self.contacts.is_empty() && !self.gesture.is_idle() {
            self.gesture = Gesture::Idle;
        }
        if kind != self.gesture.kind() {
            log::debug!("gesture: {} -> {}", kind, self.gesture.kind());
        }
    }

    /// The platform cancelled a pointer (palm rejection, focus loss, ...).
    pub fn pointer_cancel(&mut self, store: &mut GraphStore, pointer_id: PointerId) {
        self.contacts.release(pointer_id);
        self.abandon(store);
    }

    /// Drop the in-flight gesture, restoring anything it changed silently.
    pub fn abandon(&mut self, store: &mut GraphStore) {
        let gesture = std::mem::take(&mut self.gesture);
        if gesture.is_idle() {
            return;
        }
        log::debug!("gesture: {} abandoned", gesture.kind());
        match gesture {
            Gesture::Drag(drag) => {
                for (id, origin) in drag.origins {
                    store.update_node(&id, NodePatch::position(origin.x, origin.y));
                }
            }
            Gesture::Marquee(marquee) if marquee.committed => {
                store.set_selection(marquee.base_nodes, marquee.base_edges);
            }
            Gesture::GroupDrag(drag) => {
                store.update_group(&drag.group_id, GroupPatch::rect(drag.before.rect));
                for (id, origin) in drag.origins {
                    store.update_node(&id, NodePatch::position(origin.x, origin.y));
                }
            }
            Gesture::GroupResize(resize) => {
                store.update_group(&resize.group_id, GroupPatch::rect(resize.before.rect));
            }
            _ => {}
        }
    }

    fn finish_drag(&mut self, store: &mut GraphStore, drag: DragState) {
        if !drag.moved {
            return;
        }
        let moves: Vec<NodeMove> = drag
            .origins
            .iter()
            .filter_map(|(id, from)| store.node(id).map(|n| NodeMove::new(id.clone(), *from, n.position)))
            .collect();
        store.record_move(moves);

        // membership changes are their own entry, pushed only when non-empty
        let moved: Vec<NodeId> = drag.origins.into_iter().map(|(id, _)| id).collect();
        let deltas = store.recompute_group_membership(&moved);
        if !deltas.is_empty() {
            store.record_group_change(deltas, Vec::new());
        }
    }

    fn finish_marquee(&mut self, store: &mut GraphStore, marquee: MarqueeState) {
        if !marquee.committed {
            if !marquee.additive {
                store.deselect_all();
            }
            return;
        }
        let rect = store
            .camera()
            .screen_rect_to_world(&Rect::from_corners(marquee.origin, marquee.current));
        self.affordance = group_affordance(store, &rect);
        if let Some(affordance) = &self.affordance {
            log::debug!("offering {affordance:?}");
        }
    }

    fn finish_connect(&mut self, store: &mut GraphStore, connect: ConnectState, screen: Vec2) {
        if connect.from_connector && !connect.moved {
            if let Some(node) = store.node(&connect.anchor.node_id) {
                let kinds = registry::definition(&node.kind).appendable;
                log::debug!("append menu opened for {}", node.id);
                self.menu = Some(AppendMenu { node_id: node.id.clone(), screen_position: screen, kinds });
            }
            return;
        }
        let Some(snap) = connect.snap else {
            log::debug!("connection released without a target");
            return;
        };
        let (source, target) = if connect.anchor.is_output() {
            (&connect.anchor, &snap)
        } else {
            (&snap, &connect.anchor)
        };
        let request = ConnectionRequest::new(
            source.node_id.clone(),
            source.port_id,
            target.node_id.clone(),
            target.port_id,
        );
        match self.connect_validator.validate(&request, store.graph_ref()) {
            ValidationResult::Valid => {
                store.add_edge(&source.node_id, source.port_id, &target.node_id, target.port_id);
            }
            ValidationResult::Invalid(reason) => log::debug!("connection refused: {reason}"),
        }
    }

    fn finish_reconnect(&mut self, store: &mut GraphStore, reconnect: ReconnectState) {
        let Some(snap) = reconnect.snap else {
            log::debug!("edge {} dropped in empty space", reconnect.edge_id);
            store.delete_edge(&reconnect.edge_id);
            return;
        };
        let (source, target) = match reconnect.moving {
            EdgeEnd::Target => (&reconnect.fixed, &snap),
            EdgeEnd::Source => (&snap, &reconnect.fixed),
        };
        let request = ConnectionRequest::new(
            source.node_id.clone(),
            source.port_id,
            target.node_id.clone(),
            target.port_id,
        );
        match self.reconnect_validator.validate(&request, store.graph_ref()) {
            ValidationResult::Valid => {
                store.replace_edge(
                    &reconnect.edge_id,
                    &source.node_id,
                    source.port_id,
                    &target.node_id,
                    target.port_id,
                );
            }
            ValidationResult::Invalid(reason) => log::debug!("reconnection refused: {reason}"),
        }
    }

    fn finish_group_drag(&mut self, store: &mut GraphStore, drag: GroupDragState) {
        let moves = drag
            .origins
            .iter()
            .filter_map(|(id, from)| store.node(id).map(|n| NodeMove::new(id.clone(), *from, n.position)))
            .collect();
        // a frame removed mid-drag stays removed; only member moves remain
        let groups = match store.group(&drag.group_id).cloned() {
            Some(after) => vec![GroupDelta { before: Some(drag.before), after: Some(after) }],
            None => Vec::new(),
        };
        store.record_group_change(groups, moves);
    }

    fn finish_group_resize(&mut self, store: &mut GraphStore, resize: GroupResizeState) {
        let Some(current) = store.group(&resize.group_id).cloned() else {
            return;
        };
        let candidates: Vec<NodeId> = store
            .nodes()
            .values()
            .filter(|n| n.kind.is_image())
            .filter(|n| {
                let rect = n.rect();
                current.members.contains(&n.id)
                    || rect.intersects(&current.rect)
                    || rect.intersects(&resize.before.rect)
            })
            .map(|n| n.id.clone())
            .collect();
        let mut deltas = store.recompute_group_membership(&candidates);

        let resized = deltas
            .iter_mut()
            .find(|d| d.before.as_ref().is_some_and(|g| g.id == resize.group_id));
        match resized {
            Some(delta) => delta.before = Some(resize.before),
            None => deltas.push(GroupDelta {
                before: Some(resize.before),
                after: store.group(&resize.group_id).cloned(),
            }),
        }
        store.record_group_change(deltas, Vec::new());
    }

    // ========================================================================
    // Wheel and camera
    // ========================================================================

    /// Command/ctrl + wheel (and trackpad pinch, which hosts report as
    /// ctrl + wheel) zooms about the cursor; a plain wheel pans.
    pub fn wheel(&mut self, store: &mut GraphStore, position: Vec2, delta: Vec2, modifiers: Modifiers) {
        self.animation = None;
        if modifiers.command() {
            let factor = (-delta.y * self.camera_config.wheel_zoom_speed).exp();
            self.zoom_about(store, position, store.camera().zoom * factor);
        } else {
            pan_by_screen(store, -delta);
        }
    }

    /// Set the zoom, keeping the world point under `anchor` (screen) fixed.
    pub fn zoom_about(&mut self, store: &mut GraphStore, anchor: Vec2, zoom: f32) {
        let (min_zoom, max_zoom) = store.zoom_limits();
        let zoom = clamp_zoom(zoom, min_zoom, max_zoom);
        let camera = store.camera().zoomed_about(anchor, zoom);
        store.set_camera(camera.into());
    }

    /// Multiply the zoom about the viewport centre.
    pub fn zoom_by(&mut self, store: &mut GraphStore, factor: f32) {
        self.animation = None;
        let center = self.viewport / 2.0;
        self.zoom_about(store, center, store.camera().zoom * factor);
    }

    /// Start an animated transition framing every node. Returns false when
    /// there is nothing to frame.
    pub fn zoom_to_fit(&mut self, store: &GraphStore) -> bool {
        let Some(target) = self.fit_camera(store) else {
            return false;
        };
        log::debug!("zoom to fit: {target:?}");
        self.animation = Some(CameraAnimation::new(
            store.camera(),
            target,
            Duration::from_millis(self.camera_config.animation_ms),
        ));
        true
    }

    /// Camera that frames all nodes in the current viewport.
    pub fn fit_camera(&self, store: &GraphStore) -> Option<Camera> {
        let bounds = hit_test::nodes_bounds(store.nodes().values())?;
        let content = bounds.expand(self.camera_config.fit_padding);
        let (min_zoom, max_zoom) = store.zoom_limits();
        let zoom = (self.viewport.x / content.width)
            .min(self.viewport.y / content.height)
            .min(self.camera_config.fit_max_zoom)
            .max(min_zoom)
            .min(max_zoom);
        if !zoom.is_finite() || zoom <= 0.0 {
            return None;
        }
        Some(Camera::centered_on(content.center(), self.viewport, zoom))
    }

    /// Advance the camera animation. Returns true while it is still running.
    pub fn tick(&mut self, store: &mut GraphStore, now: Instant) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        let (camera, done) = animation.sample(now);
        store.set_camera(CameraPatch::from(camera));
        if done {
            self.animation = None;
        }
        !done
    }

    // ========================================================================
    // Keyboard
    // ========================================================================

    pub fn key_down(&mut self, store: &mut GraphStore, event: KeyEvent) -> KeyOutcome {
        if event.in_text_input {
            return KeyOutcome::Ignored;
        }
        if event.key == Key::Space {
            self.space_held = true;
            return KeyOutcome::Handled;
        }
        let Some(command) = keyboard::resolve(&event) else {
            return KeyOutcome::Ignored;
        };
        log::debug!("key command {command:?}");

        let step = self.camera_config.zoom_step;
        match command {
            KeyCommand::Undo => {
                self.abandon(store);
                self.affordance = None;
                store.undo();
            }
            KeyCommand::Redo => {
                self.abandon(store);
                self.affordance = None;
                store.redo();
            }
            KeyCommand::ZoomIn => self.zoom_by(store, step),
            KeyCommand::ZoomOut => self.zoom_by(store, 1.0 / step),
            KeyCommand::ZoomReset => {
                self.animation = None;
                let center = self.viewport / 2.0;
                self.zoom_about(store, center, 1.0);
            }
            KeyCommand::ZoomToFit => {
                self.zoom_to_fit(store);
            }
            KeyCommand::Duplicate => {
                if self.gesture.is_idle() {
                    store.duplicate_selected_nodes();
                }
            }
            KeyCommand::Delete => self.delete_selection(store),
            KeyCommand::Escape => self.escape(store),
        }
        KeyOutcome::Handled
    }

    pub fn key_up(&mut self, event: KeyEvent) -> KeyOutcome {
        if event.key == Key::Space && self.space_held {
            self.space_held = false;
            return KeyOutcome::Handled;
        }
        KeyOutcome::Ignored
    }

    /// Delete selected nodes and edges, and ungroup the active group.
    pub fn delete_selection(&mut self, store: &mut GraphStore) {
        if !self.gesture.is_idle() {
            return;
        }
        let group = self.active_group.take();
        store.delete_selection_and_group(group.as_ref());
        self.affordance = None;
    }

    /// Close the append menu if open; otherwise abandon the gesture and
    /// clear every selection.
    pub fn escape(&mut self, store: &mut GraphStore) {
        if self.menu.take().is_some() {
            return;
        }
        self.abandon(store);
        store.deselect_all();
        self.active_group = None;
        self.affordance = None;
    }

    // ========================================================================
    // Affordances
    // ========================================================================

    /// Act on the pending group/ungroup affordance.
    pub fn apply_group_affordance(&mut self, store: &mut GraphStore) -> bool {
        let Some(affordance) = self.affordance.take() else {
            return false;
        };
        match affordance {
            GroupAffordance::Group { node_ids, bounds } => {
                let pad = self.config.group_padding;
                let rect = Rect::new(
                    bounds.x - pad,
                    bounds.y - pad - GROUP_HEADER_HEIGHT,
                    bounds.width + pad * 2.0,
                    bounds.height + pad * 2.0 + GROUP_HEADER_HEIGHT,
                );
                let id = store.add_group(None, rect, node_ids);
                self.active_group = Some(id);
            }
            GroupAffordance::Ungroup { group_id, .. } => {
                store.delete_group(&group_id);
                if self.active_group.as_ref() == Some(&group_id) {
                    self.active_group = None;
                }
            }
        }
        true
    }

    pub fn dismiss_affordance(&mut self) {
        self.affordance = None;
    }

    pub fn close_menu(&mut self) {
        self.menu = None;
    }

    /// Create a node of `kind` next to the menu's node and wire it up.
    pub fn append_from_menu(&mut self, store: &mut GraphStore, kind: &str) -> Option<NodeId> {
        let menu = self.menu.take()?;
        if !menu.kinds.contains(&kind) {
            log::debug!("{kind} cannot be appended to {}", menu.node_id);
            return None;
        }
        let source = store.node(&menu.node_id)?.clone();
        let output = registry::definition(&source.kind).first_output()?;

        let kind = NodeKind::from(kind);
        let input = registry::definition(&kind)
            .inputs
            .iter()
            .find(|p| are_ports_compatible(p.port_type, output.port_type));
        let id = store.add_node(
            kind,
            source.position.x + source.size.x + APPEND_GAP,
            source.position.y,
            None,
            None,
            None,
        );
        if let Some(input) = input {
            store.add_edge(&source.id, output.id, &id, input.id);
        }
        store.select_node(&id, false);
        Some(id)
    }

    // ========================================================================
    // Hit resolution
    // ========================================================================

    fn connector_at(&self, store: &GraphStore, world: Vec2) -> Option<PortLocation> {
        let node = hit_test::hit_test_connector(world, store.nodes(), CONNECTOR_RADIUS)?;
        let spec = registry::definition(&node.kind).first_output()?;
        ports::find_port(node, spec.id, PortDirection::Output)
    }

    /// Port handle under `world`, skipping outputs of connector kinds.
    fn port_at(&self, store: &GraphStore, world: Vec2) -> Option<PortLocation> {
        let radius = self.px(store, self.config.port_radius);
        hit_test::hit_test_any_port(world, store.nodes(), radius, |node, port| {
            !(registry::uses_connector(&node.kind) && port.is_output())
        })
    }

    fn fixed_terminal(&self, store: &GraphStore, hit: &hit_test::EndpointHit) -> Option<PortLocation> {
        let edge = store.edge(&hit.edge_id)?;
        match hit.end {
            EdgeEnd::Target => {
                ports::find_port(store.node(&edge.source)?, &edge.source_port, PortDirection::Output)
            }
            EdgeEnd::Source => {
                ports::find_port(store.node(&edge.target)?, &edge.target_port, PortDirection::Input)
            }
        }
    }

    fn hover_at(&self, store: &GraphStore, world: Vec2) -> HoverState {
        if let Some(node) = hit_test::hit_test_connector(world, store.nodes(), CONNECTOR_RADIUS) {
            return HoverState::Connector(node.id.clone());
        }
        if let Some(port) = self.port_at(store, world) {
            return HoverState::Port {
                node_id: port.node_id,
                port_id: port.port_id,
                direction: port.direction,
            };
        }
        if let Some(node) = hit_test::hit_test_node(world, store.nodes(), HitMode::ExtendRight) {
            return HoverState::Node(node.id.clone());
        }
        let threshold = self.px(store, self.config.edge_hit_threshold);
        if let Some(edge_id) = hit_test::hit_test_edge(world, store.nodes(), store.edges(), threshold) {
            return HoverState::Edge(edge_id);
        }
        HoverState::None
    }

    // ========================================================================
    // View
    // ========================================================================

    /// Snapshot of the ephemeral state for the renderer.
    pub fn view(&self, store: &GraphStore) -> InteractionView {
        let marquee = match &self.gesture {
            Gesture::Marquee(m) if m.committed => Some(
                store
                    .camera()
                    .screen_rect_to_world(&Rect::from_corners(m.origin, m.current)),
            ),
            _ => None,
        };
        let pending = match &self.gesture {
            Gesture::Connect(c) => Some(PendingConnection {
                from: c.anchor.position,
                to: c.snap.as_ref().map_or(c.pointer_world, |s| s.position),
                from_output: c.anchor.is_output(),
                snap: c.snap.clone(),
            }),
            Gesture::Reconnect(r) => Some(PendingConnection {
                from: r.fixed.position,
                to: r.snap.as_ref().map_or(r.pointer_world, |s| s.position),
                from_output: r.fixed.is_output(),
                snap: r.snap.clone(),
            }),
            _ => None,
        };
        InteractionView {
            gesture: self.gesture.kind(),
            marquee,
            pending,
            hover: self.hover.clone(),
            affordance: self.affordance.clone(),
            menu: self.menu.clone(),
            active_group: self.active_group.clone().filter(|id| store.group(id).is_some()),
        }
    }
}

fn pan_by_screen(store: &mut GraphStore, delta: Vec2) {
    let camera = store.camera();
    let world_delta = delta / camera.zoom;
    store.set_camera(CameraPatch::position(camera.x + world_delta.x, camera.y + world_delta.y));
}

fn group_affordance(store: &GraphStore, rect: &Rect) -> Option<GroupAffordance> {
    let images: Vec<NodeId> = store
        .selected_node_ids()
        .iter()
        .filter(|id| store.node(id).is_some_and(|n| n.kind.is_image()))
        .cloned()
        .collect();
    if images.len() >= 2 {
        let bounds = hit_test::nodes_bounds(images.iter().filter_map(|id| store.node(id)))?;
        return Some(GroupAffordance::Group { node_ids: images, bounds });
    }
    if store.selected_node_ids().is_empty() && store.selected_edge_ids().is_empty() {
        let group_id = hit_test::groups_in_rect(rect, store.groups()).into_iter().next()?;
        let bounds = store.group(&group_id)?.rect;
        return Some(GroupAffordance::Ungroup { group_id, bounds });
    }
    None
}
