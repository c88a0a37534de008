use tracing::debug;

use super::{vertex_slot, Graph};
use crate::storage::types::Dir;
use crate::storage::vertex::VertexRecord;
use crate::types::{Result, VertexId};

impl Graph {
    /// Creates a vertex with no edges and no properties.
    pub fn add_vertex(&mut self) -> Result<VertexId> {
        let id = self.vertices.create(&VertexRecord::default())?;
        Ok(VertexId::from(id))
    }

    /// The vertex record, or `None` if `id` is not live.
    pub fn get_vertex(&self, id: VertexId) -> Result<Option<VertexRecord>> {
        match id.slot() {
            Some(slot) => self.vertices.read(slot),
            None => Ok(None),
        }
    }

    /// True when vertex `id` is live.
    pub fn contains_vertex(&self, id: VertexId) -> Result<bool> {
        match id.slot() {
            Some(slot) => self.vertices.contains(slot),
            None => Ok(false),
        }
    }

    /// Removes every incident edge, then the property chain, then the vertex.
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<()> {
        let slot = vertex_slot(id)?;
        let record = self.vertices.get(slot)?;
        let incident = self.edge_ids_of(slot, Dir::Both, None)?;
        for edge in &incident {
            self.remove_edge(*edge)?;
        }
        // Edge removal rewrote the head pointer; the property head is unchanged.
        let properties = self.props.delete_chain(record.next_property)?;
        self.vertices.delete(slot)?;
        debug!(
            vertex = slot,
            edges = incident.len(),
            properties,
            "graph.remove_vertex"
        );
        Ok(())
    }

    /// Every live vertex id, by ascending id.
    pub fn vertices(&self) -> Result<Vec<VertexId>> {
        self.vertices
            .scan()
            .map(|entry| entry.map(|(id, _)| VertexId::from(id)))
            .collect()
    }
}
