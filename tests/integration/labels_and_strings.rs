#![allow(missing_docs)]

use sombra_slots::storage::blocks::{BlockRepository, DEFAULT_MAX_BLOCK_SIZE};
use sombra_slots::storage::index::StoreLayout;
use sombra_slots::{Graph, GraphError, GraphOptions, LabelManager, Result};
use tempfile::TempDir;

const UNIT: u64 = 4096;

fn layout() -> StoreLayout {
    StoreLayout {
        allocation_unit: UNIT,
        grab_size: 16,
        max_block_size: DEFAULT_MAX_BLOCK_SIZE,
    }
}

#[test]
fn string_lengths_map_to_chain_lengths() -> Result<()> {
    let dir = TempDir::new()?;
    let mut blocks = BlockRepository::open(dir.path(), "strings", DEFAULT_MAX_BLOCK_SIZE, UNIT, 16)?;
    let bs = blocks.block_size();
    assert_eq!(bs, 50);

    for (len, expected) in [(bs, 1), (bs + 1, 2), (3 * bs + 1, 4)] {
        let text = "q".repeat(len);
        let head = blocks.write_str(&text)?;
        assert_eq!(blocks.chain_len(head)?, expected, "length {len}");
        assert_eq!(blocks.read_str(head)?, text);
    }
    assert_eq!(blocks.count()?, 7);
    blocks.close()
}

#[test]
fn odd_block_limit_is_rounded_down() -> Result<()> {
    let dir = TempDir::new()?;
    let mut blocks = BlockRepository::open(dir.path(), "odd", 9, UNIT, 16)?;
    assert_eq!(blocks.block_size(), 8);
    let head = blocks.write(&[7u8; 17])?;
    assert_eq!(blocks.chain_len(head)?, 3);
    assert_eq!(blocks.delete(head)?, 3);
    assert_eq!(blocks.count()?, 0);
    blocks.close()
}

#[test]
fn label_counts_follow_usage_and_reclaim_at_zero() -> Result<()> {
    let dir = TempDir::new()?;
    let mut labels = LabelManager::open(dir.path(), layout())?;
    let knows = labels.create_or_get("knows")?;
    assert_eq!(labels.count("knows")?, 0);
    assert_eq!(labels.increment("knows")?, 1);
    assert_eq!(labels.increment("knows")?, 2);
    assert_eq!(labels.create_or_get("knows")?, knows);

    assert_eq!(labels.decrement("knows")?, 1);
    assert_eq!(labels.decrement("knows")?, 0);
    assert_eq!(labels.id_of("knows"), None);
    assert!(matches!(
        labels.count("knows"),
        Err(GraphError::NotFound("label"))
    ));
    assert!(labels.is_empty());
    labels.close()
}

#[test]
fn labels_live_as_long_as_their_edges() -> Result<()> {
    let dir = TempDir::new()?;
    let mut graph = Graph::open(GraphOptions::new(dir.path()).allocation_unit(UNIT))?;
    let a = graph.add_vertex()?;
    let b = graph.add_vertex()?;
    let first = graph.add_edge(a, b, "likes")?;
    let second = graph.add_edge(b, a, "likes")?;
    let other = graph.add_edge(a, a, "self")?;
    assert_eq!(graph.stats()?.labels, 2);

    graph.remove_edge(first)?;
    assert_eq!(graph.stats()?.labels, 2);
    graph.remove_edge(second)?;
    assert_eq!(graph.stats()?.labels, 1);
    assert_eq!(graph.get_edge(other)?.map(|e| e.label), Some("self".into()));
    graph.remove_vertex(a)?;
    assert_eq!(graph.stats()?.labels, 0);
    graph.close()
}

#[test]
fn label_counts_are_persisted() -> Result<()> {
    let dir = TempDir::new()?;
    {
        let mut labels = LabelManager::open(dir.path(), layout())?;
        labels.create_or_get("rated")?;
        labels.increment("rated")?;
        labels.increment("rated")?;
        labels.close()?;
    }
    let mut labels = LabelManager::open(dir.path(), layout())?;
    assert_eq!(labels.count("rated")?, 2);
    let entry = &labels.entries()?[0];
    assert_eq!(entry.key, "rated");
    labels.close()
}
