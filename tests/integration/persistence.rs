#![allow(missing_docs)]

use sombra_slots::{Dir, Graph, GraphError, GraphOptions, PropValue, Result, VertexId};
use tempfile::TempDir;

fn options(dir: &TempDir) -> GraphOptions {
    GraphOptions::new(dir.path()).allocation_unit(4096).grab_size(8)
}

#[test]
fn graph_round_trips_through_close_and_reopen() -> Result<()> {
    let dir = TempDir::new()?;
    let (a, b, e) = {
        let mut graph = Graph::open(options(&dir))?;
        let a = graph.add_vertex()?;
        let b = graph.add_vertex()?;
        let e = graph.add_edge(a, b, "follows")?;
        graph.set_property(a, "name", "ada")?;
        graph.set_property(e, "since", 1843i32)?;
        graph.close()?;
        (a, b, e)
    };

    let mut graph = Graph::open(options(&dir))?;
    assert!(!graph.is_corrupted());
    assert_eq!(graph.vertices()?, vec![a, b]);
    let edge = graph.get_edge(e)?.expect("edge survives");
    assert_eq!((edge.out_vertex, edge.in_vertex), (a, b));
    assert_eq!(edge.label, "follows");
    assert!(edge.directed);
    assert_eq!(graph.get_property(a, "name")?, Some(PropValue::Str("ada".into())));
    assert_eq!(graph.get_property(e, "since")?, Some(PropValue::Int32(1843)));
    let incoming: Vec<_> = graph.get_edges(b, Dir::In, &[])?.collect::<Result<_>>()?;
    assert_eq!(incoming, vec![e]);

    // A label interned before the restart is shared afterwards.
    let back = graph.add_edge(b, a, "follows")?;
    assert_eq!(graph.stats()?.labels, 1);
    assert_eq!(graph.get_edge(back)?.map(|d| d.label), Some("follows".into()));
    graph.close()
}

#[test]
fn freed_ids_are_reused_after_restart() -> Result<()> {
    let dir = TempDir::new()?;
    {
        let mut graph = Graph::open(options(&dir))?;
        for _ in 0..6 {
            graph.add_vertex()?;
        }
        graph.remove_vertex(VertexId(2))?;
        graph.remove_vertex(VertexId(4))?;
        graph.close()?;
    }
    let mut graph = Graph::open(options(&dir))?;
    let mut reused = vec![graph.add_vertex()?, graph.add_vertex()?];
    reused.sort();
    assert_eq!(reused, vec![VertexId(2), VertexId(4)]);
    assert_eq!(graph.add_vertex()?, VertexId(7));
    graph.close()
}

#[test]
fn unclean_shutdown_is_reported_on_next_open() -> Result<()> {
    let dir = TempDir::new()?;
    let mut graph = Graph::open(options(&dir))?;
    graph.add_vertex()?;
    graph.flush()?;
    std::mem::forget(graph);

    let graph = Graph::open(options(&dir))?;
    assert!(graph.is_corrupted());
    assert!(graph.stats()?.corrupted);
    assert_eq!(graph.stats()?.vertices, 1);
    graph.close()
}

#[test]
fn drop_without_close_still_marks_stores_clean() -> Result<()> {
    let dir = TempDir::new()?;
    {
        let mut graph = Graph::open(options(&dir))?;
        graph.add_vertex()?;
    }
    let graph = Graph::open(options(&dir))?;
    assert!(!graph.is_corrupted());
    graph.close()
}

#[test]
fn read_only_open_refuses_a_missing_directory() -> Result<()> {
    let dir = TempDir::new()?;
    let missing = dir.path().join("nope");
    let err = Graph::open(GraphOptions::new(&missing).create_if_missing(false)).unwrap_err();
    assert!(matches!(err, GraphError::NotFound(_)));
    assert!(!missing.exists());
    Ok(())
}

#[test]
fn invalid_layouts_are_rejected_before_touching_disk() -> Result<()> {
    let dir = TempDir::new()?;
    let target = dir.path().join("graph");
    let err = Graph::open(GraphOptions::new(&target).allocation_unit(1000)).unwrap_err();
    assert!(matches!(err, GraphError::Config(_)));
    let err = Graph::open(GraphOptions::new(&target).grab_size(0)).unwrap_err();
    assert!(matches!(err, GraphError::Config(_)));
    assert!(!target.exists());
    Ok(())
}
