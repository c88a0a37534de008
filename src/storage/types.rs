use std::fmt;

use serde::Serialize;

use super::property::PropertyKind;
use crate::types::{EdgeId, VertexId};

/// Property value with owned data.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropValue {
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 32-bit floating point number.
    Float32(f32),
    /// 64-bit floating point number.
    Float64(f64),
    /// Owned string.
    Str(String),
    /// Owned byte vector.
    Bytes(Vec<u8>),
}

impl PropValue {
    /// Type tag written alongside the value.
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropValue::Bool(_) => PropertyKind::Bool,
            PropValue::Int32(_) => PropertyKind::Int32,
            PropValue::Int64(_) => PropertyKind::Int64,
            PropValue::Float32(_) => PropertyKind::Float32,
            PropValue::Float64(_) => PropertyKind::Float64,
            PropValue::Str(_) => PropertyKind::Str,
            PropValue::Bytes(_) => PropertyKind::Bytes,
        }
    }

    /// Inline slot payload for fixed-width kinds.
    pub fn inline_payload(&self) -> Option<i64> {
        match *self {
            PropValue::Bool(v) => Some(i64::from(v)),
            PropValue::Int32(v) => Some(i64::from(v)),
            PropValue::Int64(v) => Some(v),
            PropValue::Float32(v) => Some(i64::from(v.to_bits())),
            PropValue::Float64(v) => Some(v.to_bits() as i64),
            PropValue::Str(_) | PropValue::Bytes(_) => None,
        }
    }

    /// Rebuilds a fixed-width value from its inline payload.
    pub fn from_inline(kind: PropertyKind, payload: i64) -> Option<Self> {
        let value = match kind {
            PropertyKind::Bool => PropValue::Bool(payload != 0),
            PropertyKind::Int32 => PropValue::Int32(payload as i32),
            PropertyKind::Int64 => PropValue::Int64(payload),
            PropertyKind::Float32 => PropValue::Float32(f32::from_bits(payload as u32)),
            PropertyKind::Float64 => PropValue::Float64(f64::from_bits(payload as u64)),
            PropertyKind::Str | PropertyKind::Bytes => return None,
        };
        Some(value)
    }

    /// Bytes written to block storage for variable-width kinds.
    pub fn block_bytes(&self) -> Option<&[u8]> {
        match self {
            PropValue::Str(s) => Some(s.as_bytes()),
            PropValue::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Bool(v) => write!(f, "{v}"),
            PropValue::Int32(v) => write!(f, "{v}"),
            PropValue::Int64(v) => write!(f, "{v}"),
            PropValue::Float32(v) => write!(f, "{v}"),
            PropValue::Float64(v) => write!(f, "{v}"),
            PropValue::Str(v) => write!(f, "{v}"),
            PropValue::Bytes(v) => write!(f, "bytes(len={})", v.len()),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int32(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int64(value)
    }
}

impl From<f32> for PropValue {
    fn from(value: f32) -> Self {
        PropValue::Float32(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float64(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl From<Vec<u8>> for PropValue {
    fn from(value: Vec<u8>) -> Self {
        PropValue::Bytes(value)
    }
}

/// Options for [`super::Graph::add_edge_with`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CreateEdgeOptions {
    /// Sets the directed flag on the edge record.
    pub directed: bool,
}

impl Default for CreateEdgeOptions {
    fn default() -> Self {
        Self { directed: true }
    }
}

/// Edge with its label resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EdgeData {
    /// Edge id.
    pub id: EdgeId,
    /// Tail vertex.
    pub out_vertex: VertexId,
    /// Head vertex.
    pub in_vertex: VertexId,
    /// Label text.
    pub label: String,
    /// Directed flag.
    pub directed: bool,
}

/// A vertex or an edge, as the owner of a property chain.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ElementId {
    /// A vertex.
    Vertex(VertexId),
    /// An edge.
    Edge(EdgeId),
}

impl From<VertexId> for ElementId {
    fn from(value: VertexId) -> Self {
        ElementId::Vertex(value)
    }
}

impl From<EdgeId> for ElementId {
    fn from(value: EdgeId) -> Self {
        ElementId::Edge(value)
    }
}

/// Adjacency direction relative to a vertex.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dir {
    /// Edges whose out vertex is the vertex.
    Out,
    /// Edges whose in vertex is the vertex.
    In,
    /// Either.
    Both,
}

impl Dir {
    /// Whether an edge seen from one side matches this direction.
    pub(crate) fn accepts(self, is_out: bool, is_in: bool) -> bool {
        match self {
            Dir::Out => is_out,
            Dir::In => is_in,
            Dir::Both => is_out || is_in,
        }
    }
}
