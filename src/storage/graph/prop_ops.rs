use super::{edge_slot, vertex_slot, Graph};
use crate::storage::types::{ElementId, PropValue};
use crate::types::{EdgeId, Result, SlotId, VertexId};

impl Graph {
    /// Sets `key` on a vertex or edge, replacing any previous value in place.
    pub fn set_property(
        &mut self,
        element: impl Into<ElementId>,
        key: &str,
        value: impl Into<PropValue>,
    ) -> Result<()> {
        let element = element.into();
        let value = value.into();
        let head = self.require_property_head(element)?;
        let new_head = self.props.set_property(head, key, &value)?;
        if head != Some(new_head) {
            self.store_property_head(element, Some(new_head))?;
        }
        Ok(())
    }

    /// Value of `key`, or `None` when the element or the key is absent.
    pub fn get_property(
        &self,
        element: impl Into<ElementId>,
        key: &str,
    ) -> Result<Option<PropValue>> {
        match self.property_head(element.into())? {
            Some(head) => self.props.get_property(head, key),
            None => Ok(None),
        }
    }

    /// Removes `key` and returns its value, if it was set.
    pub fn remove_property(
        &mut self,
        element: impl Into<ElementId>,
        key: &str,
    ) -> Result<Option<PropValue>> {
        let element = element.into();
        let head = self.require_property_head(element)?;
        let (new_head, removed) = self.props.remove_property(head, key)?;
        if new_head != head {
            self.store_property_head(element, new_head)?;
        }
        Ok(removed)
    }

    /// Property keys of the element in chain order.
    pub fn property_keys(&self, element: impl Into<ElementId>) -> Result<Vec<String>> {
        match self.property_head(element.into())? {
            Some(head) => self.props.get_property_keys(head),
            None => Ok(Vec::new()),
        }
    }

    /// Every `(key, value)` pair of the element in chain order.
    pub fn properties(&self, element: impl Into<ElementId>) -> Result<Vec<(String, PropValue)>> {
        match self.property_head(element.into())? {
            Some(head) => self.props.properties(head),
            None => Ok(Vec::new()),
        }
    }

    /// Vertices whose `key` equals `value`. Scans every vertex.
    pub fn vertices_with(&self, key: &str, value: &PropValue) -> Result<Vec<VertexId>> {
        if self.props.key_id(key).is_none() {
            return Ok(Vec::new());
        }
        let mut found = Vec::new();
        for entry in self.vertices.scan() {
            let (id, record) = entry?;
            if self.props.get_property(record.next_property, key)?.as_ref() == Some(value) {
                found.push(VertexId::from(id));
            }
        }
        Ok(found)
    }

    /// Edges whose `key` equals `value`. Scans every edge.
    pub fn edges_with(&self, key: &str, value: &PropValue) -> Result<Vec<EdgeId>> {
        if self.props.key_id(key).is_none() {
            return Ok(Vec::new());
        }
        let mut found = Vec::new();
        for entry in self.edges.scan() {
            let (id, record) = entry?;
            if self.props.get_property(record.next_property, key)?.as_ref() == Some(value) {
                found.push(EdgeId::from(id));
            }
        }
        Ok(found)
    }

    /// Property chain head of a live element; `None` when the element is
    /// absent.
    fn property_head(&self, element: ElementId) -> Result<Option<Option<SlotId>>> {
        Ok(match element {
            ElementId::Vertex(id) => match id.slot() {
                Some(slot) => self.vertices.read(slot)?.map(|v| v.next_property),
                None => None,
            },
            ElementId::Edge(id) => match id.slot() {
                Some(slot) => self.edges.read(slot)?.map(|e| e.next_property),
                None => None,
            },
        })
    }

    fn require_property_head(&self, element: ElementId) -> Result<Option<SlotId>> {
        match element {
            ElementId::Vertex(id) => Ok(self.vertices.get(vertex_slot(id)?)?.next_property),
            ElementId::Edge(id) => Ok(self.edges.get(edge_slot(id)?)?.next_property),
        }
    }

    fn store_property_head(&mut self, element: ElementId, head: Option<SlotId>) -> Result<()> {
        match element {
            ElementId::Vertex(id) => {
                let slot = vertex_slot(id)?;
                let mut record = self.vertices.get(slot)?;
                record.next_property = head;
                self.vertices.update(slot, &record)
            }
            ElementId::Edge(id) => {
                let slot = edge_slot(id)?;
                let mut record = self.edges.get(slot)?;
                record.next_property = head;
                self.edges.update(slot, &record)
            }
        }
    }
}
