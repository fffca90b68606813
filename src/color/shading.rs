//! Data-only description of the per-attribute shading chain.
//!
//! The chain is always the same five nodes:
//! attribute input -> map range -> color ramp -> principled BSDF -> output.
//! Hosts realize it with their own node primitives.

use serde::Serialize;

use super::ColorMapping;

/// Node kinds in the chain, in evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ShaderNodeKind {
    AttributeInput,
    MapRange,
    ColorRamp,
    PrincipledBsdf,
    MaterialOutput,
}

/// Shader parameter value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ShaderParamValue {
    Bool(bool),
    Float(f32),
    String(String),
}

/// Shader parameter with name and value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShaderParam {
    pub name: &'static str,
    pub value: ShaderParamValue,
}

impl ShaderParam {
    fn float(name: &'static str, v: f32) -> Self {
        Self {
            name,
            value: ShaderParamValue::Float(v),
        }
    }

    /// Get as float if possible.
    pub fn as_float(&self) -> Option<f32> {
        match &self.value {
            ShaderParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string if possible.
    pub fn as_string(&self) -> Option<&str> {
        match &self.value {
            ShaderParamValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// One node of the chain.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShaderNode {
    pub kind: ShaderNodeKind,
    pub parameters: Vec<ShaderParam>,
    /// Editor layout position.
    pub location: [f32; 2],
}

impl ShaderNode {
    fn new(kind: ShaderNodeKind, x: f32) -> Self {
        Self {
            kind,
            parameters: Vec::new(),
            location: [x, 0.0],
        }
    }

    /// Get a parameter by name.
    pub fn param(&self, name: &str) -> Option<&ShaderParam> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Connection from one node's output socket to the next node's input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ShaderLink {
    pub from_node: usize,
    pub from_socket: &'static str,
    pub to_node: usize,
    pub to_socket: &'static str,
}

/// Material for one scalar attribute of one frame mesh.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShadingChainDescriptor {
    /// `<mesh>_<attribute>_Material`.
    pub name: String,
    pub attribute: String,
    pub nodes: Vec<ShaderNode>,
    pub links: Vec<ShaderLink>,
}

const LINKS: [ShaderLink; 4] = [
    ShaderLink { from_node: 0, from_socket: "Fac", to_node: 1, to_socket: "Value" },
    ShaderLink { from_node: 1, from_socket: "Result", to_node: 2, to_socket: "Fac" },
    ShaderLink { from_node: 2, from_socket: "Color", to_node: 3, to_socket: "Base Color" },
    ShaderLink { from_node: 3, from_socket: "BSDF", to_node: 4, to_socket: "Surface" },
];

impl ShadingChainDescriptor {
    /// Build the chain for `mapping` on the mesh named `mesh_name`.
    pub fn for_mapping(mesh_name: &str, mapping: &ColorMapping) -> Self {
        let mut attribute = ShaderNode::new(ShaderNodeKind::AttributeInput, -600.0);
        attribute.parameters.push(ShaderParam {
            name: "attribute_name",
            value: ShaderParamValue::String(mapping.attribute.clone()),
        });

        let (from_min, from_max) = mapping.map_range_domain();
        let mut map_range = ShaderNode::new(ShaderNodeKind::MapRange, -400.0);
        map_range.parameters = vec![
            ShaderParam::float("From Min", from_min),
            ShaderParam::float("From Max", from_max),
            ShaderParam::float("To Min", 0.0),
            ShaderParam::float("To Max", 1.0),
            ShaderParam {
                name: "Clamp",
                value: ShaderParamValue::Bool(true),
            },
        ];

        Self {
            name: format!("{}_{}_Material", mesh_name, mapping.attribute),
            attribute: mapping.attribute.clone(),
            nodes: vec![
                attribute,
                map_range,
                ShaderNode::new(ShaderNodeKind::ColorRamp, -200.0),
                ShaderNode::new(ShaderNodeKind::PrincipledBsdf, 200.0),
                ShaderNode::new(ShaderNodeKind::MaterialOutput, 400.0),
            ],
            links: LINKS.to_vec(),
        }
    }

    /// Node of the given kind.
    pub fn node(&self, kind: ShaderNodeKind) -> Option<&ShaderNode> {
        self.nodes.iter().find(|n| n.kind == kind)
    }

    /// The terminal node feeding the surface.
    pub fn surface_output(&self) -> Option<&ShaderNode> {
        self.node(ShaderNodeKind::MaterialOutput)
    }
}
