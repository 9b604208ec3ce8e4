//! The single active gesture and its per-state payload.

use crate::geometry::Vec2;
use crate::graph::Group;
use crate::hit_test::EdgeEnd;
use crate::id::{EdgeId, GroupId, NodeId};
use crate::ports::PortLocation;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureKind {
    #[default]
    Idle,
    Pan,
    Drag,
    Marquee,
    Connect,
    Reconnect,
    GroupDrag,
    GroupResize,
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GestureKind::Idle => "idle",
            GestureKind::Pan => "pan",
            GestureKind::Drag => "drag",
            GestureKind::Marquee => "marquee",
            GestureKind::Connect => "connect",
            GestureKind::Reconnect => "reconnect",
            GestureKind::GroupDrag => "group-drag",
            GestureKind::GroupResize => "group-resize",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanSource {
    /// One pointer (middle button, space-drag or the survivor of a pinch).
    Pointer { last: Vec2 },
    /// Two contacts: distance drives zoom, midpoint drives pan.
    Pinch { last_distance: f32, last_mid: Vec2 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub start_world: Vec2,
    /// Start position of every dragged node.
    pub origins: Vec<(NodeId, Vec2)>,
    pub moved: bool,
}

/// Marquee rectangle, kept in screen space until committed.
#[derive(Debug, Clone, PartialEq)]
pub struct MarqueeState {
    pub origin: Vec2,
    pub current: Vec2,
    pub committed: bool,
    pub additive: bool,
    /// Selection at press time, restored on abandon and unioned when additive.
    pub base_nodes: Vec<NodeId>,
    pub base_edges: Vec<EdgeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectState {
    /// Port the connection is dragged from.
    pub anchor: PortLocation,
    pub pointer_world: Vec2,
    pub snap: Option<PortLocation>,
    pub from_connector: bool,
    pub start_screen: Vec2,
    pub moved: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectState {
    pub edge_id: EdgeId,
    pub moving: EdgeEnd,
    /// The untouched terminal.
    pub fixed: PortLocation,
    pub pointer_world: Vec2,
    pub snap: Option<PortLocation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupDragState {
    pub group_id: GroupId,
    pub start_world: Vec2,
    pub before: Group,
    pub origins: Vec<(NodeId, Vec2)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupResizeState {
    pub group_id: GroupId,
    pub start_world: Vec2,
    pub before: Group,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Pan(PanSource),
    Drag(DragState),
    Marquee(MarqueeState),
    Connect(ConnectState),
    Reconnect(ReconnectState),
    GroupDrag(GroupDragState),
    GroupResize(GroupResizeState),
}

impl Gesture {
    pub fn kind(&self) -> GestureKind {
        match self {
            Gesture::Idle => GestureKind::Idle,
            Gesture::Pan(_) => GestureKind::Pan,
            Gesture::Drag(_) => GestureKind::Drag,
            Gesture::Marquee(_) => GestureKind::Marquee,
            Gesture::Connect(_) => GestureKind::Connect,
            Gesture::Reconnect(_) => GestureKind::Reconnect,
            Gesture::GroupDrag(_) => GestureKind::GroupDrag,
            Gesture::GroupResize(_) => GestureKind::GroupResize,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }
}
