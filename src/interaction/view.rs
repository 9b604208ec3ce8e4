//! Read-only snapshot of the ephemeral interaction state, for renderers.

use super::gesture::GestureKind;
use crate::geometry::{Rect, Vec2};
use crate::id::{EdgeId, GroupId, NodeId};
use crate::ports::{PortDirection, PortLocation};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum HoverState {
    #[default]
    None,
    Node(NodeId),
    Port {
        node_id: NodeId,
        port_id: &'static str,
        direction: PortDirection,
    },
    Connector(NodeId),
    Edge(EdgeId),
}

/// Live line drawn while connecting or reconnecting, in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConnection {
    pub from: Vec2,
    pub to: Vec2,
    /// True when `from` is an output terminal.
    pub from_output: bool,
    pub snap: Option<PortLocation>,
}

/// Offered after a marquee selection.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupAffordance {
    /// Two or more image nodes are selected and can be grouped.
    Group { node_ids: Vec<NodeId>, bounds: Rect },
    /// The marquee touched a group while selecting nothing.
    Ungroup { group_id: GroupId, bounds: Rect },
}

impl GroupAffordance {
    /// World rect the affordance button is anchored to.
    pub fn bounds(&self) -> Rect {
        match self {
            GroupAffordance::Group { bounds, .. } | GroupAffordance::Ungroup { bounds, .. } => *bounds,
        }
    }
}

/// "Append node" menu opened by clicking a connector.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendMenu {
    pub node_id: NodeId,
    pub screen_position: Vec2,
    pub kinds: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InteractionView {
    pub gesture: GestureKind,
    /// Committed marquee, world space.
    pub marquee: Option<Rect>,
    pub pending: Option<PendingConnection>,
    pub hover: HoverState,
    pub affordance: Option<GroupAffordance>,
    pub menu: Option<AppendMenu>,
    pub active_group: Option<GroupId>,
}
