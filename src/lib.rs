//! Property-graph storage engine over memory-mapped fixed-size slot files.
//!
//! A [`storage::Graph`] keeps vertices, edges, property nodes and dictionary
//! entries in separate slot stores, each with its own id generator. Edges
//! are threaded into per-vertex adjacency chains and properties into
//! per-element chains; long strings and byte values are chained across
//! fixed-size blocks.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod primitives;
pub mod storage;
pub mod types;

pub use config::GraphConfig;
pub use error::{GraphError, Result};
pub use logging::init_logging;
pub use storage::{
    CreateEdgeOptions, Dir, EdgeData, ElementId, Graph, GraphOptions, GraphStats, LabelManager,
    PropValue, SharedGraph,
};
pub use types::{EdgeId, VertexId};
