//! Graph storage engine built on fixed-size slot stores.
//!
//! Every record type lives in its own pair of files: a mapped `<name>.store`
//! holding the slots and a `<name>.ids` file holding the id generator state.
//! Strings and other variable-length values are chained across fixed-size
//! blocks.

/// Id allocation with batched free-list persistence.
pub mod ids;

/// Generic id-addressed slot repository.
pub mod slots;

/// Chained block storage for values longer than one slot.
pub mod blocks;

/// Vertex slot layout.
pub mod vertex;

/// Edge slot layout and adjacency pointers.
pub mod edge;

/// Property node slot layout and type tags.
pub mod property;

/// Dictionary entries for property keys and labels.
pub mod index;

mod graph;
mod labels;
mod options;
mod props;
mod shared;
mod types;

pub use graph::{EdgeWalk, Graph, GraphStats};
pub use labels::LabelManager;
pub use options::{GraphOptions, DEFAULT_ALLOCATION_UNIT};
pub use props::PropertyManager;
pub use shared::SharedGraph;
pub use types::{CreateEdgeOptions, Dir, EdgeData, ElementId, PropValue};
