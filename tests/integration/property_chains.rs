#![allow(missing_docs)]

use sombra_slots::{EdgeId, Graph, GraphError, GraphOptions, PropValue, Result, VertexId};
use tempfile::TempDir;

fn open_graph(dir: &TempDir) -> Result<Graph> {
    Graph::open(GraphOptions::new(dir.path()).allocation_unit(4096))
}

#[test]
fn removing_the_middle_key_keeps_the_others_in_order() -> Result<()> {
    let dir = TempDir::new()?;
    let mut graph = open_graph(&dir)?;
    let v = graph.add_vertex()?;
    graph.set_property(v, "a", 1i64)?;
    graph.set_property(v, "b", 2i64)?;
    graph.set_property(v, "c", 3i64)?;

    assert_eq!(graph.remove_property(v, "b")?, Some(PropValue::Int64(2)));
    assert_eq!(graph.property_keys(v)?, vec!["a", "c"]);
    assert_eq!(graph.get_property(v, "b")?, None);

    graph.set_property(v, "a", 10i64)?;
    assert_eq!(graph.property_keys(v)?, vec!["a", "c"]);
    assert_eq!(graph.get_property(v, "a")?, Some(PropValue::Int64(10)));
    assert_eq!(graph.stats()?.properties, 2);
    graph.close()
}

#[test]
fn every_value_kind_reads_back_unchanged() -> Result<()> {
    let dir = TempDir::new()?;
    let mut graph = open_graph(&dir)?;
    let v = graph.add_vertex()?;
    let long_text = "ünïcödé ".repeat(40);
    let values = vec![
        ("flag", PropValue::Bool(true)),
        ("small", PropValue::Int32(-7)),
        ("big", PropValue::Int64(i64::MIN)),
        ("ratio", PropValue::Float32(0.25)),
        ("pi", PropValue::Float64(std::f64::consts::PI)),
        ("empty", PropValue::Str(String::new())),
        ("text", PropValue::Str(long_text)),
        ("blob", PropValue::Bytes((0..=255).collect())),
    ];
    for (key, value) in &values {
        graph.set_property(v, key, value.clone())?;
    }
    assert_eq!(
        graph.properties(v)?,
        values
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<Vec<_>>()
    );
    graph.close()
}

#[test]
fn changing_a_value_kind_releases_old_blocks() -> Result<()> {
    let dir = TempDir::new()?;
    let mut graph = open_graph(&dir)?;
    let v = graph.add_vertex()?;
    graph.set_property(v, "name", "x".repeat(200))?;
    assert!(graph.stats()?.value_blocks >= 4);
    graph.set_property(v, "name", 42i32)?;
    assert_eq!(graph.stats()?.value_blocks, 0);
    assert_eq!(graph.get_property(v, "name")?, Some(PropValue::Int32(42)));
    graph.close()
}

#[test]
fn edges_carry_their_own_chains() -> Result<()> {
    let dir = TempDir::new()?;
    let mut graph = open_graph(&dir)?;
    let a = graph.add_vertex()?;
    let b = graph.add_vertex()?;
    let e = graph.add_edge(a, b, "rates")?;
    graph.set_property(e, "stars", 5i32)?;
    graph.set_property(a, "stars", 1i32)?;
    assert_eq!(graph.get_property(e, "stars")?, Some(PropValue::Int32(5)));
    assert_eq!(graph.edges_with("stars", &PropValue::Int32(5))?, vec![e]);
    assert_eq!(graph.vertices_with("stars", &PropValue::Int32(1))?, vec![a]);

    graph.remove_edge(e)?;
    assert_eq!(graph.stats()?.properties, 1);
    graph.close()
}

#[test]
fn missing_owners_read_as_empty_but_refuse_writes() -> Result<()> {
    let dir = TempDir::new()?;
    let mut graph = open_graph(&dir)?;
    let ghost = VertexId(99);
    assert_eq!(graph.get_property(ghost, "k")?, None);
    assert!(graph.property_keys(EdgeId(3))?.is_empty());
    let err = graph.set_property(ghost, "k", true).unwrap_err();
    assert!(matches!(err, GraphError::SlotNotInUse { id: 99, .. }));
    graph.close()
}
