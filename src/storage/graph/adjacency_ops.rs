//! Walking a vertex's combined adjacency chain.
//!
//! Each vertex has one chain holding both its outgoing and incoming edges.
//! At every edge the walk follows the out-side pointers when the vertex is
//! the edge's out vertex and the in-side pointers otherwise, so one physical
//! edge record sits in two chains at once.

use super::Graph;
use crate::storage::edge::EdgeRepository;
use crate::storage::types::Dir;
use crate::types::{EdgeId, GraphError, Result, SlotId, VertexId};

impl Graph {
    /// Lazily yields the edges incident to `vertex`, most recently added
    /// first, filtered by direction and, when `labels` is not empty, by
    /// label. A vertex that is not live has no edges.
    pub fn get_edges(&self, vertex: VertexId, dir: Dir, labels: &[&str]) -> Result<EdgeWalk<'_>> {
        let filter = if labels.is_empty() {
            None
        } else {
            Some(labels.iter().filter_map(|l| self.labels.id_of(l)).collect())
        };
        let head = match vertex.slot() {
            Some(slot) => self.vertices.read(slot)?.map(|v| (slot, v.next_edge)),
            None => None,
        };
        let (slot, cursor) = head.unwrap_or((0, None));
        Ok(EdgeWalk::new(&self.edges, slot, dir, filter, cursor))
    }

    pub(super) fn edge_ids_of(
        &self,
        vertex: SlotId,
        dir: Dir,
        labels: Option<Vec<SlotId>>,
    ) -> Result<Vec<EdgeId>> {
        let head = self.vertices.get(vertex)?.next_edge;
        EdgeWalk::new(&self.edges, vertex, dir, labels, head).collect()
    }
}

/// Iterator returned by [`Graph::get_edges`].
pub struct EdgeWalk<'a> {
    edges: &'a EdgeRepository,
    vertex: SlotId,
    dir: Dir,
    labels: Option<Vec<SlotId>>,
    cursor: Option<SlotId>,
    prev: Option<SlotId>,
    steps: u64,
}

impl<'a> EdgeWalk<'a> {
    fn new(
        edges: &'a EdgeRepository,
        vertex: SlotId,
        dir: Dir,
        labels: Option<Vec<SlotId>>,
        cursor: Option<SlotId>,
    ) -> Self {
        Self {
            edges,
            vertex,
            dir,
            labels,
            cursor,
            prev: None,
            steps: 0,
        }
    }

    fn fail(&mut self, err: GraphError) -> Option<Result<EdgeId>> {
        self.cursor = None;
        Some(Err(err))
    }
}

impl Iterator for EdgeWalk<'_> {
    type Item = Result<EdgeId>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = self.cursor?;
            self.steps += 1;
            if self.steps > self.edges.capacity() {
                let err = GraphError::Corruption(format!(
                    "adjacency chain of vertex {} loops",
                    self.vertex
                ));
                return self.fail(err);
            }
            let record = match self.edges.read(id) {
                Ok(Some(record)) => record,
                Ok(None) => {
                    let err = GraphError::Corruption(format!(
                        "adjacency chain of vertex {} links to free edge {id}",
                        self.vertex
                    ));
                    return self.fail(err);
                }
                Err(err) => return self.fail(err),
            };
            let is_out = record.out_vertex == self.vertex;
            let is_in = record.in_vertex == self.vertex;
            if !is_out && !is_in {
                let err = GraphError::Corruption(format!(
                    "edge {id} in the chain of vertex {} does not touch it",
                    self.vertex
                ));
                return self.fail(err);
            }
            let (prev, next) = record.links(record.side_of(self.vertex));
            if prev != self.prev {
                let err = GraphError::Corruption(format!(
                    "edge {id} does not link back to {:?} in the chain of vertex {}",
                    self.prev, self.vertex
                ));
                return self.fail(err);
            }
            self.prev = Some(id);
            self.cursor = next;

            if !self.dir.accepts(is_out, is_in) {
                continue;
            }
            if let Some(labels) = &self.labels {
                if !labels.contains(&record.label) {
                    continue;
                }
            }
            return Some(Ok(EdgeId::from(id)));
        }
    }
}
