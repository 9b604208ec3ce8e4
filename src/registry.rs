//! Static catalog of node kinds.
//!
//! The registry is consulted only when a node is created (default parameters
//! and size) and whenever ports are derived. Kinds not present in the catalog
//! fall back to [`GENERIC`]: no parameters, one `any` input and one `any` output.

use crate::graph::Params;
use crate::ports::{PortSpec, PortType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Node type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// User-supplied input image.
    Image,
    /// Image-to-image diffusion model.
    Model,
    /// Single-image 3D reconstruction.
    TripoSr,
    /// Generated image.
    Output,
    /// Generated mesh.
    MeshOutput,
    /// Any other tag; handled with generic defaults.
    Other(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Image => "image",
            NodeKind::Model => "model",
            NodeKind::TripoSr => "triposr",
            NodeKind::Output => "output",
            NodeKind::MeshOutput => "mesh-output",
            NodeKind::Other(tag) => tag,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, NodeKind::Image)
    }

    /// Kinds that run inference and report job completion.
    pub fn is_model(&self) -> bool {
        matches!(self, NodeKind::Model | NodeKind::TripoSr)
    }
}

impl From<&str> for NodeKind {
    fn from(tag: &str) -> Self {
        match tag {
            "image" => NodeKind::Image,
            "model" => NodeKind::Model,
            "triposr" => NodeKind::TripoSr,
            "output" => NodeKind::Output,
            "mesh-output" => NodeKind::MeshOutput,
            other => NodeKind::Other(other.to_owned()),
        }
    }
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        NodeKind::from(tag.as_str())
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Const-constructible parameter default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'static str),
}

impl ParamDefault {
    pub fn to_value(self) -> Value {
        match self {
            ParamDefault::Null => Value::Null,
            ParamDefault::Bool(b) => Value::Bool(b),
            ParamDefault::Int(i) => Value::from(i),
            ParamDefault::Float(f) => Value::from(f),
            ParamDefault::Str(s) => Value::from(s),
        }
    }
}

/// Everything the editor knows about a node kind.
#[derive(Debug)]
pub struct NodeDefinition {
    pub tag: &'static str,
    pub title: &'static str,
    pub default_size: (f32, f32),
    pub params: &'static [(&'static str, ParamDefault)],
    pub inputs: &'static [PortSpec],
    pub outputs: &'static [PortSpec],
    /// New output connections start from the external connector icon, not the port handle.
    pub connector: bool,
    /// Kinds offered by the connector's "append node" menu.
    pub appendable: &'static [&'static str],
}

impl NodeDefinition {
    pub fn default_params(&self) -> Params {
        self.params
            .iter()
            .map(|(key, value)| ((*key).to_owned(), value.to_value()))
            .collect()
    }

    pub fn first_output(&self) -> Option<&'static PortSpec> {
        self.outputs.first()
    }
}

pub static IMAGE: NodeDefinition = NodeDefinition {
    tag: "image",
    title: "Image",
    default_size: (200.0, 200.0),
    params: &[
        ("image_url", ParamDefault::Null),
        ("file_name", ParamDefault::Null),
    ],
    inputs: &[],
    outputs: &[PortSpec::output("image", PortType::Image)],
    connector: true,
    appendable: &["model", "triposr"],
};

pub static MODEL: NodeDefinition = NodeDefinition {
    tag: "model",
    title: "Img2Img",
    default_size: (260.0, 320.0),
    params: &[
        ("positive_prompt", ParamDefault::Str("")),
        ("negative_prompt", ParamDefault::Str("")),
        ("seed", ParamDefault::Int(42)),
        ("steps", ParamDefault::Int(20)),
        ("cfg", ParamDefault::Float(7.5)),
        ("sampler_name", ParamDefault::Str("euler")),
        ("scheduler", ParamDefault::Str("normal")),
        ("denoise", ParamDefault::Float(0.75)),
    ],
    inputs: &[
        PortSpec::input("image", PortType::Image),
        PortSpec::input("prompt", PortType::String),
    ],
    outputs: &[PortSpec::output("image", PortType::Image)],
    connector: false,
    appendable: &[],
};

pub static TRIPOSR: NodeDefinition = NodeDefinition {
    tag: "triposr",
    title: "TripoSR",
    default_size: (260.0, 340.0),
    params: &[
        ("foreground_ratio", ParamDefault::Float(0.85)),
        ("mc_resolution", ParamDefault::Int(256)),
        ("remove_bg", ParamDefault::Bool(true)),
        ("chunk_size", ParamDefault::Int(8192)),
        ("bake_texture", ParamDefault::Bool(false)),
        ("texture_resolution", ParamDefault::Int(2048)),
        ("render_video", ParamDefault::Bool(false)),
        ("render_n_views", ParamDefault::Int(30)),
        ("render_resolution", ParamDefault::Int(256)),
    ],
    inputs: &[PortSpec::input("image", PortType::Image)],
    outputs: &[PortSpec::output("mesh", PortType::Mesh)],
    connector: false,
    appendable: &[],
};

pub static OUTPUT: NodeDefinition = NodeDefinition {
    tag: "output",
    title: "Output",
    default_size: (200.0, 200.0),
    params: &[("output_url", ParamDefault::Null)],
    inputs: &[PortSpec::input("image", PortType::Image)],
    outputs: &[PortSpec::output("image", PortType::Image)],
    connector: true,
    appendable: &["model", "triposr"],
};

pub static MESH_OUTPUT: NodeDefinition = NodeDefinition {
    tag: "mesh-output",
    title: "Mesh",
    default_size: (240.0, 240.0),
    params: &[("mesh_url", ParamDefault::Null)],
    inputs: &[PortSpec::input("mesh", PortType::Mesh)],
    outputs: &[],
    connector: false,
    appendable: &[],
};

pub static GENERIC: NodeDefinition = NodeDefinition {
    tag: "generic",
    title: "Node",
    default_size: (200.0, 150.0),
    params: &[],
    inputs: &[PortSpec::input("in", PortType::Any)],
    outputs: &[PortSpec::output("out", PortType::Any)],
    connector: false,
    appendable: &[],
};

/// Definition for a kind, falling back to [`GENERIC`] for unknown tags.
pub fn definition(kind: &NodeKind) -> &'static NodeDefinition {
    match kind {
        NodeKind::Image => &IMAGE,
        NodeKind::Model => &MODEL,
        NodeKind::TripoSr => &TRIPOSR,
        NodeKind::Output => &OUTPUT,
        NodeKind::MeshOutput => &MESH_OUTPUT,
        NodeKind::Other(_) => &GENERIC,
    }
}

/// Whether a kind uses the connector affordance for outgoing connections.
pub fn uses_connector(kind: &NodeKind) -> bool {
    definition(kind).connector
}

/// Registry defaults merged with caller overrides; overrides win.
pub fn merged_params(kind: &NodeKind, overrides: Option<Params>) -> Params {
    let mut params = definition(kind).default_params();
    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            params.insert(key, value);
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_tags_roundtrip() {
        for tag in ["image", "model", "triposr", "output", "mesh-output", "lora"] {
            assert_eq!(NodeKind::from(tag).as_str(), tag);
        }
        assert_eq!(NodeKind::from("lora"), NodeKind::Other("lora".into()));
    }

    #[test]
    fn test_kind_serializes_as_tag() {
        assert_eq!(serde_json::to_value(NodeKind::MeshOutput).unwrap(), json!("mesh-output"));
        let parsed: NodeKind = serde_json::from_value(json!("triposr")).unwrap();
        assert_eq!(parsed, NodeKind::TripoSr);
    }

    #[test]
    fn test_model_defaults_match_inference_defaults() {
        let params = MODEL.default_params();
        assert_eq!(params["seed"], json!(42));
        assert_eq!(params["steps"], json!(20));
        assert_eq!(params["cfg"], json!(7.5));
        assert_eq!(params["denoise"], json!(0.75));
        assert_eq!(params["sampler_name"], json!("euler"));
    }

    #[test]
    fn test_unknown_kind_uses_generic_definition() {
        let def = definition(&NodeKind::from("something-new"));
        assert_eq!(def.tag, "generic");
        assert!(def.default_params().is_empty());
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let mut overrides = Params::new();
        overrides.insert("steps".into(), json!(50));
        overrides.insert("custom".into(), json!("x"));
        let params = merged_params(&NodeKind::Model, Some(overrides));
        assert_eq!(params["steps"], json!(50));
        assert_eq!(params["custom"], json!("x"));
        assert_eq!(params["seed"], json!(42));
    }

    #[test]
    fn test_connector_kinds() {
        assert!(uses_connector(&NodeKind::Image));
        assert!(uses_connector(&NodeKind::Output));
        assert!(!uses_connector(&NodeKind::Model));
        assert!(!uses_connector(&NodeKind::from("x")));
    }
}
