use tracing::trace;

use super::{edge_slot, vertex_slot, Graph};
use crate::storage::edge::{EdgeRecord, Side};
use crate::storage::types::{CreateEdgeOptions, EdgeData};
use crate::types::{EdgeId, GraphError, Result, SlotId, VertexId};

impl Graph {
    /// Creates a directed edge labelled `label` from `out` to `in_`.
    pub fn add_edge(&mut self, out: VertexId, in_: VertexId, label: &str) -> Result<EdgeId> {
        self.add_edge_with(out, in_, label, CreateEdgeOptions::default())
    }

    /// Creates an edge and splices it at the head of both endpoints'
    /// adjacency chains. A self-loop is threaded once, through its out side.
    pub fn add_edge_with(
        &mut self,
        out: VertexId,
        in_: VertexId,
        label: &str,
        opts: CreateEdgeOptions,
    ) -> Result<EdgeId> {
        let out_slot = vertex_slot(out)?;
        let in_slot = vertex_slot(in_)?;
        let mut out_vertex = self.vertices.get(out_slot)?;
        let mut in_vertex = self.vertices.get(in_slot)?;
        let self_loop = out_slot == in_slot;
        let label_id = self.labels.create_or_get(label)?;

        let record = EdgeRecord {
            directed: opts.directed,
            out_vertex: out_slot,
            in_vertex: in_slot,
            label: label_id,
            out_prev: None,
            out_next: out_vertex.next_edge,
            in_prev: None,
            in_next: if self_loop { None } else { in_vertex.next_edge },
            next_property: None,
        };
        let id = self.edges.create(&record)?;

        self.relink_prev(out_vertex.next_edge, out_slot, Some(id))?;
        out_vertex.next_edge = Some(id);
        self.vertices.update(out_slot, &out_vertex)?;
        if !self_loop {
            self.relink_prev(in_vertex.next_edge, in_slot, Some(id))?;
            in_vertex.next_edge = Some(id);
            self.vertices.update(in_slot, &in_vertex)?;
        }
        self.labels.increment_id(label_id)?;
        trace!(edge = id, out = out_slot, r#in = in_slot, label, "graph.add_edge");
        Ok(EdgeId::from(id))
    }

    /// The edge with its label resolved, or `None` if `id` is not live.
    pub fn get_edge(&self, id: EdgeId) -> Result<Option<EdgeData>> {
        let Some(slot) = id.slot() else {
            return Ok(None);
        };
        let Some(record) = self.edges.read(slot)? else {
            return Ok(None);
        };
        let label = self.labels.label_of(record.label).ok_or_else(|| {
            GraphError::Corruption(format!("edge {slot} references missing label {}", record.label))
        })?;
        Ok(Some(EdgeData {
            id,
            out_vertex: VertexId::from(record.out_vertex),
            in_vertex: VertexId::from(record.in_vertex),
            label: label.to_owned(),
            directed: record.directed,
        }))
    }

    /// True when edge `id` is live.
    pub fn contains_edge(&self, id: EdgeId) -> Result<bool> {
        match id.slot() {
            Some(slot) => self.edges.contains(slot),
            None => Ok(false),
        }
    }

    /// Deletes the edge's property chain and slot, splices it out of both
    /// adjacency chains and releases its label.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<()> {
        let slot = edge_slot(id)?;
        let record = self.edges.get(slot)?;
        self.props.delete_chain(record.next_property)?;
        self.edges.delete(slot)?;
        self.unlink(&record, Side::Out)?;
        if !record.is_self_loop() {
            self.unlink(&record, Side::In)?;
        }
        self.labels.decrement_id(record.label)?;
        trace!(edge = slot, "graph.remove_edge");
        Ok(())
    }

    /// Every live edge id, by ascending id.
    pub fn edges(&self) -> Result<Vec<EdgeId>> {
        self.edges
            .scan()
            .map(|entry| entry.map(|(id, _)| EdgeId::from(id)))
            .collect()
    }

    /// Points the `vertex`-side previous link of `edge` at `prev`.
    fn relink_prev(
        &mut self,
        edge: Option<SlotId>,
        vertex: SlotId,
        prev: Option<SlotId>,
    ) -> Result<()> {
        if let Some(edge) = edge {
            let mut record = self.edges.get(edge)?;
            let side = record.side_of(vertex);
            record.set_prev(side, prev);
            self.edges.update(edge, &record)?;
        }
        Ok(())
    }

    fn relink_next(&mut self, edge: SlotId, vertex: SlotId, next: Option<SlotId>) -> Result<()> {
        let mut record = self.edges.get(edge)?;
        let side = record.side_of(vertex);
        record.set_next(side, next);
        self.edges.update(edge, &record)
    }

    /// Joins the neighbours of a removed edge in one endpoint's chain.
    fn unlink(&mut self, record: &EdgeRecord, side: Side) -> Result<()> {
        let vertex = match side {
            Side::Out => record.out_vertex,
            Side::In => record.in_vertex,
        };
        let (prev, next) = record.links(side);
        match prev {
            Some(prev) => self.relink_next(prev, vertex, next)?,
            None => {
                let mut owner = self.vertices.get(vertex)?;
                owner.next_edge = next;
                self.vertices.update(vertex, &owner)?;
            }
        }
        self.relink_prev(next, vertex, prev)
    }
}
