//! Typed connection terminals.
//!
//! Ports are never stored on nodes. They are derived from the node kind through
//! the [registry](crate::registry) and laid out along the node's edges: inputs on
//! the left, outputs on the right, evenly spaced vertically.

use crate::graph::Node;
use crate::geometry::Vec2;
use crate::id::NodeId;
use crate::registry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type carried by a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    Image,
    String,
    Number,
    Tensor,
    Mesh,
    Any,
}

impl PortType {
    /// Every member of the closed type set.
    pub const ALL: [PortType; 6] = [
        PortType::Image,
        PortType::String,
        PortType::Number,
        PortType::Tensor,
        PortType::Mesh,
        PortType::Any,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PortType::Image => "image",
            PortType::String => "string",
            PortType::Number => "number",
            PortType::Tensor => "tensor",
            PortType::Mesh => "mesh",
            PortType::Any => "any",
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    pub fn is_output(&self) -> bool {
        matches!(self, PortDirection::Output)
    }

    pub fn opposite(&self) -> PortDirection {
        match self {
            PortDirection::Input => PortDirection::Output,
            PortDirection::Output => PortDirection::Input,
        }
    }
}

/// Static description of a port, as declared by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSpec {
    pub id: &'static str,
    pub direction: PortDirection,
    pub port_type: PortType,
}

impl PortSpec {
    pub const fn input(id: &'static str, port_type: PortType) -> Self {
        Self { id, direction: PortDirection::Input, port_type }
    }

    pub const fn output(id: &'static str, port_type: PortType) -> Self {
        Self { id, direction: PortDirection::Output, port_type }
    }
}

/// Returns true iff the two types may be connected.
///
/// Reflexive, symmetric and total over the closed type set; `Any` absorbs
/// every other type.
pub fn are_ports_compatible(a: PortType, b: PortType) -> bool {
    a == b || a == PortType::Any || b == PortType::Any
}

/// A concrete port on a concrete node, with its world-space position.
#[derive(Debug, Clone, PartialEq)]
pub struct PortLocation {
    pub node_id: NodeId,
    pub port_id: &'static str,
    pub direction: PortDirection,
    pub port_type: PortType,
    pub position: Vec2,
}

impl PortLocation {
    pub fn is_output(&self) -> bool {
        self.direction.is_output()
    }

    pub fn same_port(&self, node_id: &NodeId, port_id: &str) -> bool {
        &self.node_id == node_id && self.port_id == port_id
    }
}

fn slot_y(node: &Node, index: usize, count: usize) -> f32 {
    node.position.y + node.size.y * (index as f32 + 1.0) / (count as f32 + 1.0)
}

/// All ports of a node with world-space positions, inputs first.
pub fn node_ports(node: &Node) -> Vec<PortLocation> {
    let def = registry::definition(&node.kind);
    let inputs = def.inputs.iter().enumerate().map(|(i, spec)| PortLocation {
        node_id: node.id.clone(),
        port_id: spec.id,
        direction: spec.direction,
        port_type: spec.port_type,
        position: Vec2::new(node.position.x, slot_y(node, i, def.inputs.len())),
    });
    let outputs = def.outputs.iter().enumerate().map(|(i, spec)| PortLocation {
        node_id: node.id.clone(),
        port_id: spec.id,
        direction: spec.direction,
        port_type: spec.port_type,
        position: Vec2::new(
            node.position.x + node.size.x,
            slot_y(node, i, def.outputs.len()),
        ),
    });
    inputs.chain(outputs).collect()
}

/// Look up one port by id and direction.
///
/// Input and output ports may share an id (an output node has both an `image`
/// input and an `image` output), so the direction disambiguates.
pub fn find_port(node: &Node, port_id: &str, direction: PortDirection) -> Option<PortLocation> {
    node_ports(node)
        .into_iter()
        .find(|p| p.port_id == port_id && p.direction == direction)
}

/// World position of an edge's source terminal.
pub fn output_position(node: &Node, port_id: &str) -> Option<Vec2> {
    find_port(node, port_id, PortDirection::Output).map(|p| p.position)
}

/// World position of an edge's target terminal.
pub fn input_position(node: &Node, port_id: &str) -> Option<Vec2> {
    find_port(node, port_id, PortDirection::Input).map(|p| p.position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;
    use crate::registry::NodeKind;
    use proptest::prelude::*;

    fn node(kind: NodeKind, x: f32, y: f32, w: f32, h: f32) -> Node {
        Node::new(NodeId::from("n-1"), kind, Vec2::new(x, y), Vec2::new(w, h))
    }

    // ========================================================================
    // are_ports_compatible()
    // ========================================================================

    #[test]
    fn test_compatible_is_reflexive() {
        for t in PortType::ALL {
            assert!(are_ports_compatible(t, t), "{t} should accept itself");
        }
    }

    #[test]
    fn test_any_absorbs_every_type() {
        for t in PortType::ALL {
            assert!(are_ports_compatible(PortType::Any, t));
            assert!(are_ports_compatible(t, PortType::Any));
        }
    }

    #[test]
    fn test_distinct_concrete_types_are_incompatible() {
        for a in PortType::ALL {
            for b in PortType::ALL {
                if a != b && a != PortType::Any && b != PortType::Any {
                    assert!(!are_ports_compatible(a, b), "{a} vs {b}");
                }
            }
        }
    }

    fn any_port_type() -> impl Strategy<Value = PortType> {
        prop::sample::select(PortType::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_compatibility_is_symmetric(a in any_port_type(), b in any_port_type()) {
            prop_assert_eq!(are_ports_compatible(a, b), are_ports_compatible(b, a));
        }
    }

    // ========================================================================
    // node_ports() - layout
    // ========================================================================

    #[test]
    fn test_image_node_has_single_output_on_right_edge() {
        let n = node(NodeKind::Image, 100.0, 200.0, 200.0, 100.0);
        let ports = node_ports(&n);
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].port_id, "image");
        assert!(ports[0].is_output());
        assert_eq!(ports[0].position, Vec2::new(300.0, 250.0));
    }

    #[test]
    fn test_inputs_are_evenly_spaced_on_left_edge() {
        let n = node(NodeKind::Model, 0.0, 0.0, 100.0, 300.0);
        let inputs: Vec<_> = node_ports(&n)
            .into_iter()
            .filter(|p| !p.is_output())
            .collect();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].position, Vec2::new(0.0, 100.0));
        assert_eq!(inputs[1].position, Vec2::new(0.0, 200.0));
    }

    #[test]
    fn test_find_port_disambiguates_by_direction() {
        let n = node(NodeKind::Output, 0.0, 0.0, 100.0, 100.0);
        let input = find_port(&n, "image", PortDirection::Input).unwrap();
        let output = find_port(&n, "image", PortDirection::Output).unwrap();
        assert_eq!(input.position, Vec2::new(0.0, 50.0));
        assert_eq!(output.position, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_unknown_port_lookup_is_none() {
        let n = node(NodeKind::Image, 0.0, 0.0, 100.0, 100.0);
        assert!(input_position(&n, "image").is_none());
        assert!(output_position(&n, "nope").is_none());
    }

    #[test]
    fn test_generic_kind_exposes_any_ports() {
        let n = node(NodeKind::from("upscaler"), 0.0, 0.0, 100.0, 100.0);
        let ports = node_ports(&n);
        assert!(ports.iter().all(|p| p.port_type == PortType::Any));
        assert_eq!(ports.len(), 2);
    }
}
