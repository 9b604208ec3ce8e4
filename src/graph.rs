//! Graph data model: nodes, edges, groups and connection validation.

use crate::geometry::{Rect, Vec2};
use crate::id::{EdgeId, GroupId, NodeId};
use crate::ports::{self, are_ports_compatible, PortDirection, PortType};
use crate::registry::NodeKind;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Open key → value parameter map; the registry supplies per-kind defaults.
pub type Params = serde_json::Map<String, Value>;

/// Parameter keys a thumbnail URL is derived from, in priority order.
const THUMBNAIL_KEYS: [&str; 3] = ["thumbnail_url", "image_url", "output_url"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Idle,
    Pending,
    Running,
    Complete,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub position: Vec2,
    pub size: Vec2,
    pub status: NodeStatus,
    pub error: Option<String>,
    pub params: Params,
    pub thumbnail: Option<String>,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, position: Vec2, size: Vec2) -> Self {
        Self {
            id,
            kind,
            position,
            size,
            status: NodeStatus::Idle,
            error: None,
            params: Params::new(),
            thumbnail: None,
        }
    }

    /// Exact world-space bounds.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Thumbnail URL derived from the parameter map, if any.
    pub fn derived_thumbnail(&self) -> Option<String> {
        THUMBNAIL_KEYS
            .iter()
            .find_map(|key| self.params.get(*key).and_then(Value::as_str))
            .filter(|url| !url.is_empty())
            .map(str::to_owned)
    }

    /// Shallow merge: every `Some` field of the patch replaces the current value.
    pub fn apply(&mut self, patch: NodePatch) {
        let params_changed = patch.params.is_some();
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(error) = patch.error {
            self.error = error;
        }
        if let Some(params) = patch.params {
            self.params = params;
        }
        match patch.thumbnail {
            Some(thumbnail) => self.thumbnail = thumbnail,
            None if params_changed => self.thumbnail = self.derived_thumbnail(),
            None => {}
        }
    }
}

/// Partial node update for [`GraphStore::update_node`](crate::store::GraphStore::update_node).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub position: Option<Vec2>,
    pub size: Option<Vec2>,
    pub status: Option<NodeStatus>,
    pub error: Option<Option<String>>,
    pub params: Option<Params>,
    pub thumbnail: Option<Option<String>>,
}

impl NodePatch {
    pub fn position(x: f32, y: f32) -> Self {
        Self { position: Some(Vec2::new(x, y)), ..Self::default() }
    }

    pub fn size(w: f32, h: f32) -> Self {
        Self { size: Some(Vec2::new(w, h)), ..Self::default() }
    }

    pub fn status(status: NodeStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn params(params: Params) -> Self {
        Self { params: Some(params), ..Self::default() }
    }

    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: Option<String>) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub source_port: String,
    pub target: NodeId,
    pub target_port: String,
}

impl Edge {
    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source == node_id || &self.target == node_id
    }

    /// Same source/target/ports, ignoring the id.
    pub fn same_endpoints(&self, request: &ConnectionRequest) -> bool {
        self.source == request.source
            && self.source_port == request.source_port
            && self.target == request.target
            && self.target_port == request.target_port
    }

    pub fn terminates_at(&self, target: &NodeId, target_port: &str) -> bool {
        &self.target == target && self.target_port == target_port
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub rect: Rect,
    pub members: IndexSet<NodeId>,
}

/// Partial group update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupPatch {
    pub name: Option<String>,
    pub rect: Option<Rect>,
}

impl GroupPatch {
    pub fn rect(rect: Rect) -> Self {
        Self { rect: Some(rect), ..Self::default() }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }
}

/// One node's displacement over a completed drag gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMove {
    pub id: NodeId,
    pub from: Vec2,
    pub to: Vec2,
}

impl NodeMove {
    pub fn new(id: NodeId, from: Vec2, to: Vec2) -> Self {
        Self { id, from, to }
    }

    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

// ============================================================================
// Connection Validation
// ============================================================================

/// A proposed edge, already normalised to (output → input).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRequest {
    pub source: NodeId,
    pub source_port: String,
    pub target: NodeId,
    pub target_port: String,
}

impl ConnectionRequest {
    pub fn new(
        source: NodeId,
        source_port: impl Into<String>,
        target: NodeId,
        target_port: impl Into<String>,
    ) -> Self {
        Self {
            source,
            source_port: source_port.into(),
            target,
            target_port: target_port.into(),
        }
    }
}

/// Read-only view of the graph handed to validators.
#[derive(Clone, Copy)]
pub struct GraphRef<'a> {
    pub nodes: &'a IndexMap<NodeId, Node>,
    pub edges: &'a IndexMap<EdgeId, Edge>,
}

/// Result of connection validation with optional rejection reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Combine two results (AND logic): returns first error if any
    pub fn and(self, other: ValidationResult) -> ValidationResult {
        match self {
            ValidationResult::Valid => other,
            invalid => invalid,
        }
    }
}

/// Reasons a connection is refused. These are ordinary non-events for the
/// user; they only surface in debug logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
    #[error("port {port} not found on node {node}")]
    PortNotFound { node: NodeId, port: String },
    #[error("cannot connect a node to itself")]
    SameNode,
    #[error("must connect an output to an input")]
    IncompatibleDirection,
    #[error("type mismatch: {source_type} cannot feed {target_type}")]
    TypeMismatch { source_type: PortType, target_type: PortType },
    #[error("edge already exists")]
    DuplicateEdge,
}

/// Pluggable rule deciding whether a connection may be created.
pub trait ConnectionValidator {
    fn validate(&self, request: &ConnectionRequest, graph: GraphRef<'_>) -> ValidationResult;
}

/// Both nodes exist, are distinct, and expose an output → input port pair.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicValidator;

impl ConnectionValidator for BasicValidator {
    fn validate(&self, request: &ConnectionRequest, graph: GraphRef<'_>) -> ValidationResult {
        if request.source == request.target {
            return ValidationResult::Invalid(ValidationError::SameNode);
        }
        let Some(source) = graph.nodes.get(&request.source) else {
            return ValidationResult::Invalid(ValidationError::NodeNotFound(request.source.clone()));
        };
        let Some(target) = graph.nodes.get(&request.target) else {
            return ValidationResult::Invalid(ValidationError::NodeNotFound(request.target.clone()));
        };

        let source_is_output =
            ports::find_port(source, &request.source_port, PortDirection::Output).is_some();
        let target_is_input =
            ports::find_port(target, &request.target_port, PortDirection::Input).is_some();
        if source_is_output && target_is_input {
            return ValidationResult::Valid;
        }

        let source_exists = ports::node_ports(source)
            .iter()
            .any(|p| p.port_id == request.source_port);
        if !source_exists {
            return ValidationResult::Invalid(ValidationError::PortNotFound {
                node: request.source.clone(),
                port: request.source_port.clone(),
            });
        }
        let target_exists = ports::node_ports(target)
            .iter()
            .any(|p| p.port_id == request.target_port);
        if !target_exists {
            return ValidationResult::Invalid(ValidationError::PortNotFound {
                node: request.target.clone(),
                port: request.target_port.clone(),
            });
        }
        ValidationResult::Invalid(ValidationError::IncompatibleDirection)
    }
}

/// Port types must satisfy [`are_ports_compatible`].
///
/// Ports that cannot be resolved pass; existence is [`BasicValidator`]'s job.
#[derive(Clone, Copy, Debug, Default)]
pub struct TypeValidator;

impl ConnectionValidator for TypeValidator {
    fn validate(&self, request: &ConnectionRequest, graph: GraphRef<'_>) -> ValidationResult {
        let source = graph
            .nodes
            .get(&request.source)
            .and_then(|n| ports::find_port(n, &request.source_port, PortDirection::Output));
        let target = graph
            .nodes
            .get(&request.target)
            .and_then(|n| ports::find_port(n, &request.target_port, PortDirection::Input));
        match (source, target) {
            (Some(s), Some(t)) if !are_ports_compatible(s.port_type, t.port_type) => {
                ValidationResult::Invalid(ValidationError::TypeMismatch {
                    source_type: s.port_type,
                    target_type: t.port_type,
                })
            }
            _ => ValidationResult::Valid,
        }
    }
}

/// An identical edge must not already exist.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDuplicatesValidator;

impl ConnectionValidator for NoDuplicatesValidator {
    fn validate(&self, request: &ConnectionRequest, graph: GraphRef<'_>) -> ValidationResult {
        if graph.edges.values().any(|e| e.same_endpoints(request)) {
            ValidationResult::Invalid(ValidationError::DuplicateEdge)
        } else {
            ValidationResult::Valid
        }
    }
}

/// All validators must pass; the first failure short-circuits.
#[derive(Default)]
pub struct CompositeValidator {
    validators: Vec<Box<dyn ConnectionValidator>>,
}

impl CompositeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<V: ConnectionValidator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// The rule set applied to interactive connections.
    pub fn standard() -> Self {
        Self::new()
            .add(BasicValidator)
            .add(TypeValidator)
            .add(NoDuplicatesValidator)
    }
}

impl ConnectionValidator for CompositeValidator {
    fn validate(&self, request: &ConnectionRequest, graph: GraphRef<'_>) -> ValidationResult {
        for v in &self.validators {
            let result = v.validate(request, graph);
            if !result.is_valid() {
                return result;
            }
        }
        ValidationResult::Valid
    }
}

// ============================================================================
// Tests
// ============================================================================
