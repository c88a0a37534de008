#![forbid(unsafe_code)]

//! Vertex/edge CRUD over the slot stores.
//!
//! Stores are acquired in the order vertices, edges, properties, labels and
//! released in reverse. All caller-facing ids are 64-bit; ids above the 32-bit
//! slot range are never issued, so reads of them answer absent and mutations
//! fail with [`GraphError::SlotNotInUse`].

use std::fs;

use serde::Serialize;
use tracing::{info, warn};

use super::edge::{EdgeCodec, EdgeRepository};
use super::labels::LabelManager;
use super::options::GraphOptions;
use super::props::PropertyManager;
use super::slots::store_paths;
use super::vertex::{VertexCodec, VertexRepository};
use crate::types::{EdgeId, GraphError, Result, SlotId, VertexId};

mod adjacency_ops;
mod edge_ops;
mod prop_ops;
mod vertex_ops;

pub use adjacency_ops::EdgeWalk;

pub(crate) const VERTEX_STORE: &str = "vertices";
pub(crate) const EDGE_STORE: &str = "edges";

/// Live record counts and the corruption flag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Live vertices.
    pub vertices: u64,
    /// Live edges.
    pub edges: u64,
    /// Live property nodes across all chains.
    pub properties: u64,
    /// Interned property keys.
    pub property_keys: u64,
    /// Live labels.
    pub labels: u64,
    /// Blocks holding string and byte property values.
    pub value_blocks: u64,
    /// True when any store was found dirty on open.
    pub corrupted: bool,
}

/// A property graph stored in one directory of mapped slot files.
pub struct Graph {
    options: GraphOptions,
    vertices: VertexRepository,
    edges: EdgeRepository,
    props: PropertyManager,
    labels: LabelManager,
    closed: bool,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("options", &self.options)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl Graph {
    /// Opens or creates the graph described by `options`.
    pub fn open(options: GraphOptions) -> Result<Self> {
        options.validate()?;
        let dir = options.dir.as_path();
        if !options.create_if_missing && !store_paths(dir, VERTEX_STORE).0.exists() {
            return Err(GraphError::NotFound("graph directory"));
        }
        fs::create_dir_all(dir)?;
        let unit = options.allocation_unit;
        let grab = options.grab_size;
        let vertices = VertexRepository::open(dir, VERTEX_STORE, VertexCodec, unit, grab)?;
        let edges = EdgeRepository::open(dir, EDGE_STORE, EdgeCodec, unit, grab)?;
        let props = PropertyManager::open(dir, options.layout())?;
        let labels = LabelManager::open(dir, options.layout())?;
        let graph = Self {
            options,
            vertices,
            edges,
            props,
            labels,
            closed: false,
        };
        let corrupted = graph.is_corrupted();
        if corrupted {
            warn!(dir = %graph.options.dir.display(), "graph.open.corrupted");
        }
        info!(
            dir = %graph.options.dir.display(),
            labels = graph.labels.len(),
            property_keys = graph.props.keys().len(),
            corrupted,
            "graph.open"
        );
        Ok(graph)
    }

    /// Options the graph was opened with.
    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    /// True when any store was found with its dirty marker set on open.
    /// Nothing repairs the stores; the flag is informational.
    pub fn is_corrupted(&self) -> bool {
        self.vertices.is_corrupted()
            || self.edges.is_corrupted()
            || self.props.is_corrupted()
            || self.labels.is_corrupted()
    }

    /// Live counts per store. Vertex, edge, property and block counts scan
    /// their stores.
    pub fn stats(&self) -> Result<GraphStats> {
        Ok(GraphStats {
            vertices: self.vertices.count()?,
            edges: self.edges.count()?,
            properties: self.props.node_count()?,
            property_keys: self.props.keys().len() as u64,
            labels: self.labels.len() as u64,
            value_blocks: self.props.value_block_count()?,
            corrupted: self.is_corrupted(),
        })
    }

    /// Flushes every store's data file and id file.
    pub fn flush(&mut self) -> Result<()> {
        self.vertices.flush()?;
        self.edges.flush()?;
        self.props.flush()?;
        self.labels.flush()
    }

    /// Closes every store in reverse order of acquisition and clears their
    /// dirty markers.
    pub fn close(mut self) -> Result<()> {
        self.close_stores()
    }

    fn close_stores(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.labels.close()?;
        self.props.close()?;
        self.edges.close()?;
        self.vertices.close()?;
        info!(dir = %self.options.dir.display(), "graph.close");
        Ok(())
    }
}

impl Drop for Graph {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        warn!(dir = %self.options.dir.display(), "graph.drop.unclosed");
        if let Err(err) = self.close_stores() {
            warn!(error = %err, "graph.drop.close_failed");
        }
    }
}

pub(super) fn vertex_slot(id: VertexId) -> Result<SlotId> {
    id.slot().ok_or(GraphError::SlotNotInUse {
        store: VERTEX_STORE,
        id: id.0,
    })
}

pub(super) fn edge_slot(id: EdgeId) -> Result<SlotId> {
    id.slot().ok_or(GraphError::SlotNotInUse {
        store: EDGE_STORE,
        id: id.0,
    })
}
