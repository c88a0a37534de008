#![forbid(unsafe_code)]

//! Per-element property chains and the shared property-key dictionary.
//!
//! Each vertex or edge owns a doubly linked chain of property nodes, one per
//! distinct key, with new keys appended at the tail. Fixed-width values live
//! inline in the node; strings and byte values live in a block store and the
//! node holds the head block id. Key dictionary entries are never deleted;
//! their counters track how many chains use the key.

use std::path::Path;

use tracing::trace;

use crate::storage::blocks::BlockRepository;
use crate::storage::index::{Dictionary, StoreLayout};
use crate::storage::property::{PropertyCodec, PropertyKind, PropertyRecord, PropertyRepository};
use crate::storage::types::PropValue;
use crate::types::{GraphError, Result, SlotId};

/// Store names backing a [`PropertyManager`].
pub(crate) const PROPERTY_STORE: &str = "properties";
pub(crate) const KEY_INDEX_STORE: &str = "property_keys";
pub(crate) const KEY_NAME_STORE: &str = "property_key_names";
pub(crate) const VALUE_STORE: &str = "property_values";

/// Property chains plus the key dictionary and value blocks they reference.
pub struct PropertyManager {
    nodes: PropertyRepository,
    keys: Dictionary,
    values: BlockRepository,
}

impl PropertyManager {
    /// Opens the property stores under `dir`.
    pub fn open(dir: &Path, layout: StoreLayout) -> Result<Self> {
        let nodes = PropertyRepository::open(
            dir,
            PROPERTY_STORE,
            PropertyCodec,
            layout.allocation_unit,
            layout.grab_size,
        )?;
        let keys = Dictionary::open(dir, KEY_INDEX_STORE, KEY_NAME_STORE, layout)?;
        let values = BlockRepository::open(
            dir,
            VALUE_STORE,
            layout.max_block_size,
            layout.allocation_unit,
            layout.grab_size,
        )?;
        Ok(Self {
            nodes,
            keys,
            values,
        })
    }

    /// Sets `key` on the chain starting at `head` and returns the chain head
    /// to store on the owner. An existing node keeps its id and position.
    pub fn set_property(
        &mut self,
        head: Option<SlotId>,
        key: &str,
        value: &PropValue,
    ) -> Result<SlotId> {
        let key_id = self.keys.intern(key)?;
        let chain = self.chain(head)?;
        if let Some((id, mut node)) = chain.iter().find(|(_, node)| node.key == key_id).copied() {
            self.release_value(&node)?;
            let (kind, payload) = self.store_value(value)?;
            node.kind = kind;
            node.payload = payload;
            self.nodes.update(id, &node)?;
            trace!(node = id, key, "props.replace");
            return head.ok_or_else(|| GraphError::Corruption("chain without head".into()));
        }

        let (kind, payload) = self.store_value(value)?;
        let tail = chain.last().copied();
        let id = self.nodes.create(&PropertyRecord {
            kind,
            key: key_id,
            payload,
            prev: tail.map(|(id, _)| id),
            next: None,
        })?;
        if let Some((tail_id, mut tail_node)) = tail {
            tail_node.next = Some(id);
            self.nodes.update(tail_id, &tail_node)?;
        }
        self.keys.adjust_count(key_id, 1)?;
        trace!(node = id, key, "props.append");
        Ok(head.unwrap_or(id))
    }

    /// Value of `key` in the chain, if present.
    pub fn get_property(&self, head: Option<SlotId>, key: &str) -> Result<Option<PropValue>> {
        let Some(key_id) = self.keys.lookup(key) else {
            return Ok(None);
        };
        match self.find(head, key_id)? {
            Some((_, node)) => self.load_value(&node).map(Some),
            None => Ok(None),
        }
    }

    /// Keys present in the chain, in chain order.
    pub fn get_property_keys(&self, head: Option<SlotId>) -> Result<Vec<String>> {
        self.chain(head)?
            .into_iter()
            .map(|(_, node)| self.key_name(node.key).map(str::to_owned))
            .collect()
    }

    /// Every `(key, value)` pair in chain order.
    pub fn properties(&self, head: Option<SlotId>) -> Result<Vec<(String, PropValue)>> {
        self.chain(head)?
            .into_iter()
            .map(|(_, node)| Ok((self.key_name(node.key)?.to_owned(), self.load_value(&node)?)))
            .collect()
    }

    /// Splices `key` out of the chain. Returns the new head and the removed
    /// value; an absent key leaves the chain untouched.
    pub fn remove_property(
        &mut self,
        head: Option<SlotId>,
        key: &str,
    ) -> Result<(Option<SlotId>, Option<PropValue>)> {
        let Some(key_id) = self.keys.lookup(key) else {
            return Ok((head, None));
        };
        let Some((id, node)) = self.find(head, key_id)? else {
            return Ok((head, None));
        };
        let value = self.load_value(&node)?;
        self.release_value(&node)?;

        let mut new_head = head;
        match node.prev {
            Some(prev_id) => {
                let mut prev = self.nodes.get(prev_id)?;
                prev.next = node.next;
                self.nodes.update(prev_id, &prev)?;
            }
            None => new_head = node.next,
        }
        if let Some(next_id) = node.next {
            let mut next = self.nodes.get(next_id)?;
            next.prev = node.prev;
            self.nodes.update(next_id, &next)?;
        }
        self.nodes.delete(id)?;
        self.keys.adjust_count(key_id, -1)?;
        trace!(node = id, key, "props.remove");
        Ok((new_head, Some(value)))
    }

    /// Releases every node of the chain and the value blocks they own.
    pub fn delete_chain(&mut self, head: Option<SlotId>) -> Result<usize> {
        let chain = self.chain(head)?;
        for (id, node) in &chain {
            self.release_value(node)?;
            self.nodes.delete(*id)?;
            self.keys.adjust_count(node.key, -1)?;
        }
        Ok(chain.len())
    }

    /// Dictionary id of `key`, if any chain ever used it.
    pub fn key_id(&self, key: &str) -> Option<SlotId> {
        self.keys.lookup(key)
    }

    /// The property-key dictionary.
    pub fn keys(&self) -> &Dictionary {
        &self.keys
    }

    /// Live property node count, by full scan.
    pub fn node_count(&self) -> Result<u64> {
        self.nodes.count()
    }

    /// Live value block count, by full scan.
    pub fn value_block_count(&self) -> Result<u64> {
        self.values.count()
    }

    /// True when any backing store was found dirty on open.
    pub fn is_corrupted(&self) -> bool {
        self.nodes.is_corrupted() || self.keys.is_corrupted() || self.values.is_corrupted()
    }

    /// Flushes every backing store.
    pub fn flush(&mut self) -> Result<()> {
        self.nodes.flush()?;
        self.keys.flush()?;
        self.values.flush()
    }

    /// Closes the stores in reverse order of opening.
    pub fn close(&mut self) -> Result<()> {
        self.values.close()?;
        self.keys.close()?;
        self.nodes.close()
    }

    fn key_name(&self, key_id: SlotId) -> Result<&str> {
        self.keys.key_of(key_id).ok_or_else(|| {
            GraphError::Corruption(format!("property node references missing key {key_id}"))
        })
    }

    fn find(&self, head: Option<SlotId>, key_id: SlotId) -> Result<Option<(SlotId, PropertyRecord)>> {
        Ok(self
            .chain(head)?
            .into_iter()
            .find(|(_, node)| node.key == key_id))
    }

    fn chain(&self, head: Option<SlotId>) -> Result<Vec<(SlotId, PropertyRecord)>> {
        let mut chain: Vec<(SlotId, PropertyRecord)> = Vec::new();
        let limit = self.nodes.capacity() as usize;
        let mut cursor = head;
        let mut prev = None;
        while let Some(id) = cursor {
            if chain.len() >= limit {
                return Err(GraphError::Corruption(format!("property chain at {id} loops")));
            }
            let node = self.nodes.read(id)?.ok_or_else(|| {
                GraphError::Corruption(format!("property chain links to free node {id}"))
            })?;
            if node.prev != prev {
                return Err(GraphError::Corruption(format!(
                    "property node {id} does not link back to {prev:?}"
                )));
            }
            cursor = node.next;
            prev = Some(id);
            chain.push((id, node));
        }
        Ok(chain)
    }

    fn store_value(&mut self, value: &PropValue) -> Result<(PropertyKind, i64)> {
        let kind = value.kind();
        if let Some(payload) = value.inline_payload() {
            return Ok((kind, payload));
        }
        let bytes = value.block_bytes().unwrap_or_default();
        let block = self.values.write(bytes)?;
        Ok((kind, i64::from(block)))
    }

    fn load_value(&self, node: &PropertyRecord) -> Result<PropValue> {
        if let Some(value) = PropValue::from_inline(node.kind, node.payload) {
            return Ok(value);
        }
        let block = node.value_block()?.ok_or_else(|| {
            GraphError::Corruption(format!("{:?} property without value block", node.kind))
        })?;
        match node.kind {
            PropertyKind::Bytes => Ok(PropValue::Bytes(self.values.read(block)?)),
            _ => Ok(PropValue::Str(self.values.read_str(block)?)),
        }
    }

    fn release_value(&mut self, node: &PropertyRecord) -> Result<()> {
        if let Some(block) = node.value_block()? {
            self.values.delete(block)?;
        }
        Ok(())
    }
}
