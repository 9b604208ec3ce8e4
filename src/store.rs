//! The authoritative graph store.
//!
//! Owns nodes, edges, groups, the two selection sets, the camera and the
//! undo/redo history. Every mutation is total: unknown ids are ignored rather
//! than reported. Mutations that belong to a user gesture push exactly one
//! history entry; direct-manipulation updates (`update_node`, `update_group`,
//! `set_group_members`) are silent and the gesture records its net effect
//! when it completes.

use crate::config::EditorConfig;
use crate::geometry::{Camera, CameraPatch, Rect, Vec2};
use crate::graph::{
    Edge, Group, GroupPatch, GraphRef, Node, NodeMove, NodePatch, NodeStatus, Params,
};
use crate::history::{GroupDelta, History, HistoryAction};
use crate::id::{EdgeId, GroupId, NodeId};
use crate::registry::{self, NodeKind};
use crate::renderer::RenderFrame;
use crate::selection::SelectionManager;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::Value;
use std::hash::Hash;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Inverse,
}

/// Serializable copy of the graph, in z-order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone)]
pub struct GraphStore {
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
    groups: IndexMap<GroupId, Group>,
    selected_nodes: SelectionManager<NodeId>,
    selected_edges: SelectionManager<EdgeId>,
    camera: Camera,
    history: History,
    revision: u64,
    min_zoom: f32,
    max_zoom: f32,
    duplicate_offset: Vec2,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::with_config(&EditorConfig::default())
    }
}

fn insert_at<K: Hash + Eq, V>(map: &mut IndexMap<K, V>, index: usize, key: K, value: V) {
    if map.contains_key(&key) {
        map.insert(key, value);
    } else {
        let index = index.min(map.len());
        map.shift_insert(index, key, value);
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            groups: IndexMap::new(),
            selected_nodes: SelectionManager::new(),
            selected_edges: SelectionManager::new(),
            camera: Camera::default(),
            history: History::with_capacity(config.history.capacity),
            revision: 0,
            min_zoom: config.camera.min_zoom,
            max_zoom: config.camera.max_zoom,
            duplicate_offset: Vec2::new(
                config.interaction.duplicate_offset,
                config.interaction.duplicate_offset,
            ),
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Monotonic counter bumped by every mutation. Renderers compare it to
    /// skip frames where nothing changed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ========================================================================
    // Read views
    // ========================================================================

    pub fn nodes(&self) -> &IndexMap<NodeId, Node> {
        &self.nodes
    }

    pub fn edges(&self) -> &IndexMap<EdgeId, Edge> {
        &self.edges
    }

    pub fn groups(&self) -> &IndexMap<GroupId, Group> {
        &self.groups
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    /// Group that currently contains `node_id`.
    pub fn group_of(&self, node_id: &NodeId) -> Option<&Group> {
        self.groups.values().find(|g| g.members.contains(node_id))
    }

    pub fn selected_node_ids(&self) -> &SelectionManager<NodeId> {
        &self.selected_nodes
    }

    pub fn selected_edge_ids(&self) -> &SelectionManager<EdgeId> {
        &self.selected_edges
    }

    pub fn is_node_selected(&self, id: &NodeId) -> bool {
        self.selected_nodes.contains(id)
    }

    pub fn is_edge_selected(&self, id: &EdgeId) -> bool {
        self.selected_edges.contains(id)
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn zoom_limits(&self) -> (f32, f32) {
        (self.min_zoom, self.max_zoom)
    }

    pub fn graph_ref(&self) -> GraphRef<'_> {
        GraphRef { nodes: &self.nodes, edges: &self.edges }
    }

    /// Everything a renderer needs for one frame.
    pub fn frame(&self) -> RenderFrame<'_> {
        RenderFrame {
            nodes: &self.nodes,
            edges: &self.edges,
            groups: &self.groups,
            camera: self.camera,
            selected_nodes: &self.selected_nodes,
            selected_edges: &self.selected_edges,
            revision: self.revision,
        }
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
            groups: self.groups.values().cloned().collect(),
        }
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Create a node of `kind` at `(x, y)`.
    ///
    /// Parameters are the registry defaults merged with `overrides`; the size
    /// falls back to the registry default per axis.
    pub fn add_node(
        &mut self,
        kind: impl Into<NodeKind>,
        x: f32,
        y: f32,
        overrides: Option<Params>,
        width: Option<f32>,
        height: Option<f32>,
    ) -> NodeId {
        let kind = kind.into();
        let def = registry::definition(&kind);
        let size = Vec2::new(
            width.unwrap_or(def.default_size.0),
            height.unwrap_or(def.default_size.1),
        );
        let mut node = Node::new(NodeId::generate(), kind, Vec2::new(x, y), size);
        node.params = registry::merged_params(&node.kind, overrides);
        node.thumbnail = node.derived_thumbnail();

        let id = node.id.clone();
        log::debug!("add node {} ({})", id, node.kind);
        let action = HistoryAction::AddNode { node, index: self.nodes.len() };
        self.apply(&action, Direction::Forward);
        self.history.push(action);
        id
    }

    /// Shallow-merge `patch` into the node. Not recorded in history.
    pub fn update_node(&mut self, id: &NodeId, patch: NodePatch) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.apply(patch);
            self.bump();
        }
    }

    pub fn set_node_status(&mut self, id: &NodeId, status: NodeStatus, error: Option<String>) {
        self.update_node(id, NodePatch::status(status).with_error(error));
    }

    /// Set one parameter, keeping the others.
    pub fn set_param(&mut self, id: &NodeId, key: impl Into<String>, value: Value) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let mut params = node.params.clone();
        params.insert(key.into(), value);
        self.update_node(id, NodePatch::params(params));
    }

    /// Delete a node with its edges and group memberships, as one entry.
    pub fn delete_node(&mut self, id: &NodeId) {
        if let Some(action) = self.remove_node_cascade(id) {
            log::debug!("delete node {id}");
            self.bump();
            self.history.push(action);
        }
    }

    fn remove_node_cascade(&mut self, id: &NodeId) -> Option<HistoryAction> {
        let index = self.nodes.get_index_of(id)?;
        let edges: Vec<(usize, Edge)> = self
            .edges
            .values()
            .enumerate()
            .filter(|(_, e)| e.touches(id))
            .map(|(i, e)| (i, e.clone()))
            .collect();
        for (_, edge) in &edges {
            self.edges.shift_remove(&edge.id);
            self.selected_edges.remove(&edge.id);
        }

        let mut memberships = Vec::new();
        for group in self.groups.values_mut() {
            if let Some(pos) = group.members.get_index_of(id) {
                group.members.shift_remove_index(pos);
                memberships.push((group.id.clone(), pos));
            }
        }

        let node = self.nodes.shift_remove(id)?;
        self.selected_nodes.remove(id);
        Some(HistoryAction::DeleteNode { node, index, edges, memberships })
    }

    /// Clone every selected node at a fixed offset and select the clones.
    /// Edges are not duplicated.
    pub fn duplicate_selected_nodes(&mut self) -> Vec<NodeId> {
        let originals: Vec<Node> = self
            .selected_nodes
            .iter()
            .filter_map(|id| self.nodes.get(id).cloned())
            .collect();

        let mut actions = Vec::with_capacity(originals.len());
        let mut clones = Vec::with_capacity(originals.len());
        for original in originals {
            let mut node = original;
            node.id = NodeId::generate();
            node.position += self.duplicate_offset;
            node.status = NodeStatus::Idle;
            node.error = None;
            clones.push(node.id.clone());
            let action = HistoryAction::AddNode { node, index: self.nodes.len() };
            self.apply(&action, Direction::Forward);
            actions.push(action);
        }

        if let Some(action) = HistoryAction::batch(actions) {
            log::debug!("duplicated {} node(s)", clones.len());
            self.history.push(action);
            self.selected_edges.clear();
            self.selected_nodes.replace_selection(clones.iter().cloned());
            self.bump();
        }
        clones
    }

    /// Delete every selected edge and node as one entry.
    pub fn delete_selection(&mut self) -> bool {
        self.delete_selection_and_group(None)
    }

    /// Delete the selection and ungroup `group` in a single entry.
    ///
    /// Undoing it restores the frame and the deleted nodes together.
    pub fn delete_selection_and_group(&mut self, group: Option<&GroupId>) -> bool {
        let mut actions = Vec::new();
        for edge_id in self.selected_edges.to_vec() {
            if let Some(action) = self.remove_edge(&edge_id) {
                actions.push(action);
            }
        }
        for node_id in self.selected_nodes.to_vec() {
            if let Some(action) = self.remove_node_cascade(&node_id) {
                actions.push(action);
            }
        }
        if let Some(action) = group.and_then(|id| self.remove_group(id)) {
            actions.push(action);
        }
        match HistoryAction::batch(actions) {
            Some(action) => {
                log::debug!("delete selection ({})", action.label());
                self.bump();
                self.history.push(action);
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Edges
    // ========================================================================

    fn edge_rejection(
        &self,
        source: &NodeId,
        source_port: &str,
        target: &NodeId,
        target_port: &str,
        ignore: Option<&EdgeId>,
    ) -> Option<&'static str> {
        if source == target {
            return Some("self loop");
        }
        if !self.nodes.contains_key(source) || !self.nodes.contains_key(target) {
            return Some("unknown node");
        }
        let duplicate = self.edges.values().any(|e| {
            Some(&e.id) != ignore
                && &e.source == source
                && e.source_port == source_port
                && &e.target == target
                && e.target_port == target_port
        });
        duplicate.then_some("duplicate edge")
    }

    fn build_add_edge(
        &self,
        source: &NodeId,
        source_port: &str,
        target: &NodeId,
        target_port: &str,
    ) -> HistoryAction {
        let replaced = self
            .edges
            .values()
            .enumerate()
            .find(|(_, e)| e.terminates_at(target, target_port))
            .map(|(i, e)| (i, e.clone()));
        HistoryAction::AddEdge {
            edge: Edge {
                id: EdgeId::generate(),
                source: source.clone(),
                source_port: source_port.to_owned(),
                target: target.clone(),
                target_port: target_port.to_owned(),
            },
            replaced,
        }
    }

    /// Connect `source.source_port` to `target.target_port`.
    ///
    /// Returns `None` without mutating for self loops, unknown nodes and
    /// duplicates. An edge already occupying the target port is replaced
    /// within the same history entry.
    pub fn add_edge(
        &mut self,
        source: &NodeId,
        source_port: &str,
        target: &NodeId,
        target_port: &str,
    ) -> Option<EdgeId> {
        if let Some(reason) = self.edge_rejection(source, source_port, target, target_port, None) {
            log::debug!("add edge {source}.{source_port} -> {target}.{target_port} refused: {reason}");
            return None;
        }
        let action = self.build_add_edge(source, source_port, target, target_port);
        let HistoryAction::AddEdge { edge, .. } = &action else {
            return None;
        };
        let id = edge.id.clone();
        log::debug!("add edge {id}: {source}.{source_port} -> {target}.{target_port}");
        self.apply(&action, Direction::Forward);
        self.history.push(action);
        Some(id)
    }

    fn remove_edge(&mut self, id: &EdgeId) -> Option<HistoryAction> {
        let (index, _, edge) = self.edges.shift_remove_full(id)?;
        self.selected_edges.remove(id);
        Some(HistoryAction::DeleteEdge { edge, index })
    }

    pub fn delete_edge(&mut self, id: &EdgeId) {
        if let Some(action) = self.remove_edge(id) {
            log::debug!("delete edge {id}");
            self.bump();
            self.history.push(action);
        }
    }

    /// Swap `old` for a new edge as one entry (reconnection).
    ///
    /// Re-connecting to the same endpoints is a no-op that returns the old id.
    pub fn replace_edge(
        &mut self,
        old: &EdgeId,
        source: &NodeId,
        source_port: &str,
        target: &NodeId,
        target_port: &str,
    ) -> Option<EdgeId> {
        let existing = self.edges.get(old)?;
        if &existing.source == source
            && existing.source_port == source_port
            && &existing.target == target
            && existing.target_port == target_port
        {
            return Some(old.clone());
        }
        if let Some(reason) = self.edge_rejection(source, source_port, target, target_port, Some(old)) {
            log::debug!("replace edge {old} refused: {reason}");
            return None;
        }

        let delete = self.remove_edge(old)?;
        let add = self.build_add_edge(source, source_port, target, target_port);
        let HistoryAction::AddEdge { edge, .. } = &add else {
            return None;
        };
        let id = edge.id.clone();
        self.apply(&add, Direction::Forward);
        log::debug!("replace edge {old} with {id}");
        self.history.push(HistoryAction::Batch(vec![delete, add]));
        Some(id)
    }

    // ========================================================================
    // Groups
    // ========================================================================

    fn groupable_members(&self, ids: impl IntoIterator<Item = NodeId>) -> IndexSet<NodeId> {
        ids.into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(|n| n.kind.is_image()))
            .collect()
    }

    /// Create a group. Non-image and unknown members are dropped; members
    /// taken from another group leave it within the same entry.
    pub fn add_group(
        &mut self,
        name: Option<String>,
        rect: Rect,
        members: impl IntoIterator<Item = NodeId>,
    ) -> GroupId {
        let members = self.groupable_members(members);
        let group = Group {
            id: GroupId::generate(),
            name: name.unwrap_or_else(|| format!("Group {}", self.groups.len() + 1)),
            rect,
            members,
        };

        let mut deltas: Vec<GroupDelta> = self
            .groups
            .values()
            .filter(|g| g.members.iter().any(|m| group.members.contains(m)))
            .map(|g| {
                let mut after = g.clone();
                after.members.retain(|m| !group.members.contains(m));
                GroupDelta { before: Some(g.clone()), after: Some(after) }
            })
            .collect();
        let id = group.id.clone();
        log::info!("create group {id} with {} member(s)", group.members.len());
        deltas.push(GroupDelta { before: None, after: Some(group) });

        let action = HistoryAction::GroupChange { groups: deltas, moves: Vec::new() };
        self.apply(&action, Direction::Forward);
        self.history.push(action);
        id
    }

    /// Rename or reframe a group. Not recorded in history.
    pub fn update_group(&mut self, id: &GroupId, patch: GroupPatch) {
        if let Some(group) = self.groups.get_mut(id) {
            if let Some(name) = patch.name {
                group.name = name;
            }
            if let Some(rect) = patch.rect {
                group.rect = rect;
            }
            self.bump();
        }
    }

    /// Replace a group's members. Not recorded in history.
    pub fn set_group_members(&mut self, id: &GroupId, members: impl IntoIterator<Item = NodeId>) {
        if !self.groups.contains_key(id) {
            return;
        }
        let members = self.groupable_members(members);
        if let Some(group) = self.groups.get_mut(id) {
            group.members = members;
            self.bump();
        }
    }

    /// Ungroup: the frame goes away, its member nodes stay.
    pub fn delete_group(&mut self, id: &GroupId) {
        if let Some(action) = self.remove_group(id) {
            log::info!("ungroup {id}");
            self.bump();
            self.history.push(action);
        }
    }

    fn remove_group(&mut self, id: &GroupId) -> Option<HistoryAction> {
        let index = self.groups.get_index_of(id)?;
        let group = self.groups.shift_remove(id)?;
        Some(HistoryAction::DeleteGroup { group, index })
    }

    /// Record the net effect of a direct group manipulation already applied
    /// through the silent setters. No-op deltas and moves are dropped.
    pub fn record_group_change(&mut self, groups: Vec<GroupDelta>, moves: Vec<NodeMove>) {
        let groups: Vec<GroupDelta> = groups.into_iter().filter(|d| !d.is_noop()).collect();
        let moves: Vec<NodeMove> = moves.into_iter().filter(|m| !m.is_noop()).collect();
        if groups.is_empty() && moves.is_empty() {
            return;
        }
        self.history.push(HistoryAction::GroupChange { groups, moves });
    }

    /// Re-evaluate membership of `moved` image nodes against group frames.
    ///
    /// Members no longer overlapping their group are evicted; an ungrouped
    /// image node overlapping a group joins the topmost one. Applied
    /// silently; the returned deltas describe the changed groups.
    pub fn recompute_group_membership(&mut self, moved: &[NodeId]) -> Vec<GroupDelta> {
        let mut before: IndexMap<GroupId, Group> = IndexMap::new();

        for id in moved {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if !node.kind.is_image() {
                continue;
            }
            let rect = node.rect();

            let current = self
                .groups
                .values()
                .find(|g| g.members.contains(id))
                .map(|g| g.id.clone());
            if let Some(gid) = &current {
                if let Some(group) = self.groups.get_mut(gid) {
                    if !group.rect.intersects(&rect) {
                        before.entry(gid.clone()).or_insert_with(|| group.clone());
                        group.members.shift_remove(id);
                        log::debug!("node {id} left group {gid}");
                    } else {
                        continue;
                    }
                }
            }

            let target = self
                .groups
                .values()
                .rev()
                .find(|g| Some(&g.id) != current.as_ref() && g.rect.intersects(&rect))
                .map(|g| g.id.clone());
            if let Some(gid) = target {
                if let Some(group) = self.groups.get_mut(&gid) {
                    before.entry(gid.clone()).or_insert_with(|| group.clone());
                    group.members.insert(id.clone());
                    log::debug!("node {id} joined group {gid}");
                }
            }
        }

        if !before.is_empty() {
            self.bump();
        }
        before
            .into_iter()
            .filter_map(|(gid, before)| {
                let after = self.groups.get(&gid).cloned();
                let delta = GroupDelta { before: Some(before), after };
                (!delta.is_noop()).then_some(delta)
            })
            .collect()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select a node. Replacing clears the edge selection as well.
    pub fn select_node(&mut self, id: &NodeId, additive: bool) {
        if !self.nodes.contains_key(id) {
            return;
        }
        if !additive {
            self.selected_edges.clear();
        }
        self.selected_nodes.select(id.clone(), additive);
        self.bump();
    }

    pub fn select_edge(&mut self, id: &EdgeId, additive: bool) {
        if !self.edges.contains_key(id) {
            return;
        }
        if !additive {
            self.selected_nodes.clear();
        }
        self.selected_edges.select(id.clone(), additive);
        self.bump();
    }

    /// Pointer click on a node: shift toggles, a plain click on an
    /// unselected node replaces the selection, a plain click on a selected
    /// node keeps the selection intact for dragging.
    pub fn click_node(&mut self, id: &NodeId, shift: bool) {
        if !self.nodes.contains_key(id) {
            return;
        }
        if !shift && !self.selected_nodes.contains(id) {
            self.selected_edges.clear();
        }
        self.selected_nodes.handle_interaction(id.clone(), shift);
        self.bump();
    }

    pub fn toggle_node(&mut self, id: &NodeId) {
        if self.nodes.contains_key(id) {
            self.selected_nodes.toggle(id.clone());
            self.bump();
        }
    }

    pub fn toggle_edge(&mut self, id: &EdgeId) {
        if self.edges.contains_key(id) {
            self.selected_edges.toggle(id.clone());
            self.bump();
        }
    }

    /// Replace both selection sets; unknown ids are dropped.
    pub fn set_selection(
        &mut self,
        nodes: impl IntoIterator<Item = NodeId>,
        edges: impl IntoIterator<Item = EdgeId>,
    ) {
        let nodes: Vec<NodeId> = nodes.into_iter().filter(|id| self.nodes.contains_key(id)).collect();
        let edges: Vec<EdgeId> = edges.into_iter().filter(|id| self.edges.contains_key(id)).collect();
        self.selected_nodes.replace_selection(nodes);
        self.selected_edges.replace_selection(edges);
        self.bump();
    }

    pub fn deselect_all(&mut self) {
        if self.selected_nodes.is_empty() && self.selected_edges.is_empty() {
            return;
        }
        self.selected_nodes.clear();
        self.selected_edges.clear();
        self.bump();
    }

    // ========================================================================
    // Camera
    // ========================================================================

    /// Pan/zoom the viewport. Zoom is clamped; not recorded in history.
    pub fn set_camera(&mut self, patch: CameraPatch) {
        self.camera.apply(patch, self.min_zoom, self.max_zoom);
        self.bump();
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Record one completed drag. Positions are already applied.
    pub fn record_move(&mut self, moves: Vec<NodeMove>) {
        let moves: Vec<NodeMove> = moves.into_iter().filter(|m| !m.is_noop()).collect();
        if !moves.is_empty() {
            self.history.push(HistoryAction::MoveNodes { moves });
        }
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(action) => {
                self.apply(&action, Direction::Inverse);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(action) => {
                self.apply(&action, Direction::Forward);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_stack_size(&self) -> usize {
        self.history.undo_len()
    }

    pub fn redo_stack_size(&self) -> usize {
        self.history.redo_len()
    }

    // ========================================================================
    // Applying history actions
    // ========================================================================

    fn apply(&mut self, action: &HistoryAction, direction: Direction) {
        use Direction::{Forward, Inverse};
        match (action, direction) {
            (HistoryAction::AddNode { node, index }, Forward) => {
                insert_at(&mut self.nodes, *index, node.id.clone(), node.clone());
            }
            (HistoryAction::AddNode { node, .. }, Inverse) => {
                self.remove_node_cascade(&node.id);
            }
            (HistoryAction::DeleteNode { node, .. }, Forward) => {
                self.remove_node_cascade(&node.id);
            }
            (HistoryAction::DeleteNode { node, index, edges, memberships }, Inverse) => {
                insert_at(&mut self.nodes, *index, node.id.clone(), node.clone());
                for (edge_index, edge) in edges {
                    insert_at(&mut self.edges, *edge_index, edge.id.clone(), edge.clone());
                }
                for (gid, pos) in memberships {
                    if let Some(group) = self.groups.get_mut(gid) {
                        if !group.members.contains(&node.id) {
                            let pos = (*pos).min(group.members.len());
                            group.members.shift_insert(pos, node.id.clone());
                        }
                    }
                }
            }
            (HistoryAction::AddEdge { edge, replaced }, Forward) => {
                if let Some((_, old)) = replaced {
                    self.edges.shift_remove(&old.id);
                    self.selected_edges.remove(&old.id);
                }
                self.edges.insert(edge.id.clone(), edge.clone());
            }
            (HistoryAction::AddEdge { edge, replaced }, Inverse) => {
                self.edges.shift_remove(&edge.id);
                self.selected_edges.remove(&edge.id);
                if let Some((index, old)) = replaced {
                    insert_at(&mut self.edges, *index, old.id.clone(), old.clone());
                }
            }
            (HistoryAction::DeleteEdge { edge, .. }, Forward) => {
                self.edges.shift_remove(&edge.id);
                self.selected_edges.remove(&edge.id);
            }
            (HistoryAction::DeleteEdge { edge, index }, Inverse) => {
                insert_at(&mut self.edges, *index, edge.id.clone(), edge.clone());
            }
            (HistoryAction::MoveNodes { moves }, direction) => {
                self.apply_moves(moves, direction);
            }
            (HistoryAction::DeleteGroup { group, .. }, Forward) => {
                self.groups.shift_remove(&group.id);
            }
            (HistoryAction::DeleteGroup { group, index }, Inverse) => {
                insert_at(&mut self.groups, *index, group.id.clone(), group.clone());
            }
            (HistoryAction::GroupChange { groups, moves }, Forward) => {
                for delta in groups {
                    self.set_group_state(delta.before.as_ref(), delta.after.as_ref());
                }
                self.apply_moves(moves, Forward);
            }
            (HistoryAction::GroupChange { groups, moves }, Inverse) => {
                self.apply_moves(moves, Inverse);
                for delta in groups.iter().rev() {
                    self.set_group_state(delta.after.as_ref(), delta.before.as_ref());
                }
            }
            (HistoryAction::Batch(actions), Forward) => {
                for action in actions {
                    self.apply(action, Forward);
                }
            }
            (HistoryAction::Batch(actions), Inverse) => {
                for action in actions.iter().rev() {
                    self.apply(action, Inverse);
                }
            }
        }
        self.bump();
    }

    fn apply_moves(&mut self, moves: &[NodeMove], direction: Direction) {
        for m in moves {
            if let Some(node) = self.nodes.get_mut(&m.id) {
                node.position = match direction {
                    Direction::Forward => m.to,
                    Direction::Inverse => m.from,
                };
            }
        }
    }

    fn set_group_state(&mut self, from: Option<&Group>, to: Option<&Group>) {
        match (from, to) {
            (_, Some(group)) => {
                self.groups.insert(group.id.clone(), group.clone());
            }
            (Some(group), None) => {
                self.groups.shift_remove(&group.id);
            }
            (None, None) => {}
        }
    }
}
