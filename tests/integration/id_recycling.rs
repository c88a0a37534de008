#![allow(missing_docs)]

use sombra_slots::storage::ids::IdGenerator;
use sombra_slots::storage::vertex::{VertexCodec, VertexRecord, VertexRepository};
use sombra_slots::{Graph, GraphOptions, Result, VertexId};
use tempfile::TempDir;

const UNIT: u64 = 4096;

#[test]
fn deleted_vertex_id_is_reissued_first() -> Result<()> {
    let dir = TempDir::new()?;
    let mut graph = Graph::open(GraphOptions::new(dir.path()).allocation_unit(UNIT))?;
    for expected in 1..=10u64 {
        assert_eq!(graph.add_vertex()?, VertexId(expected));
    }
    graph.remove_vertex(VertexId(5))?;
    assert_eq!(graph.add_vertex()?, VertexId(5));
    assert_eq!(graph.add_vertex()?, VertexId(11));
    graph.close()
}

#[test]
fn freed_id_returns_within_one_batch() -> Result<()> {
    let dir = TempDir::new()?;
    let grab = 8usize;
    let mut repo = VertexRepository::open(dir.path(), "vertices", VertexCodec, UNIT, grab)?;
    for _ in 0..10 {
        repo.create(&VertexRecord::default())?;
    }
    let previous_max = 10;
    repo.delete(5)?;

    let mut issued = Vec::new();
    for _ in 0..=grab {
        issued.push(repo.create(&VertexRecord::default())?);
    }
    let reuse_at = issued.iter().position(|id| *id == 5).expect("id 5 reissued");
    assert!(issued[..reuse_at]
        .iter()
        .all(|id| *id <= previous_max + grab as u32));
    repo.close()
}

#[test]
fn batches_spill_to_disk_and_come_back() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("things.ids");
    let mut ids = IdGenerator::open(&path, "things", UNIT, 4)?;
    let issued: Vec<u32> = (0..20).map(|_| ids.generate_id()).collect::<Result<_>>()?;
    for id in &issued[..12] {
        ids.free_id(*id)?;
    }
    assert_eq!(ids.free_count(), 12);

    let mut reused = Vec::new();
    for _ in 0..12 {
        reused.push(ids.generate_id()?);
    }
    reused.sort_unstable();
    assert_eq!(reused, issued[..12].to_vec());
    assert_eq!(ids.generate_id()?, 21);
    ids.close()
}

#[test]
fn free_list_survives_reopen_across_page_boundaries() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("many.ids");
    // 1100 packed ids run past the first 4 KiB page of the id file.
    {
        let mut ids = IdGenerator::open(&path, "many", UNIT, 64)?;
        for _ in 0..1200 {
            ids.generate_id()?;
        }
        for id in 1..=1100 {
            ids.free_id(id)?;
        }
        ids.close()?;
    }
    let mut ids = IdGenerator::open(&path, "many", UNIT, 64)?;
    assert!(!ids.is_corrupted());
    assert_eq!(ids.free_count(), 1100);
    let mut back: Vec<u32> = (0..1100).map(|_| ids.generate_id()).collect::<Result<_>>()?;
    back.sort_unstable();
    assert_eq!(back, (1..=1100).collect::<Vec<u32>>());
    assert_eq!(ids.generate_id()?, 1201);
    ids.close()
}
