#![allow(missing_docs)]

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sombra_slots::{Dir, EdgeId, Graph, GraphOptions, Result, VertexId};
use tempfile::TempDir;

fn open_graph() -> (TempDir, Graph) {
    let dir = TempDir::new().expect("tempdir");
    let graph = Graph::open(GraphOptions::new(dir.path()).allocation_unit(4096))
        .expect("open graph");
    (dir, graph)
}

fn walk(graph: &Graph, v: VertexId, dir: Dir, labels: &[&str]) -> Vec<EdgeId> {
    graph
        .get_edges(v, dir, labels)
        .expect("start walk")
        .collect::<Result<Vec<_>>>()
        .expect("walk chain")
}

#[test]
fn outgoing_edges_come_back_most_recent_first() -> Result<()> {
    let (_dir, mut graph) = open_graph();
    let a = graph.add_vertex()?;
    let b = graph.add_vertex()?;
    let c = graph.add_vertex()?;
    let ab = graph.add_edge(a, b, "knows")?;
    let ac = graph.add_edge(a, c, "knows")?;
    assert_eq!(walk(&graph, a, Dir::Out, &[]), vec![ac, ab]);
    assert_eq!(walk(&graph, a, Dir::Out, &["knows"]), vec![ac, ab]);
    Ok(())
}

/// Vertex V with chain [e1, e2, e3]: e2 is incoming, the others outgoing.
fn chain_of_three(graph: &mut Graph) -> Result<(VertexId, Vec<EdgeId>)> {
    let v = graph.add_vertex()?;
    let x = graph.add_vertex()?;
    let y = graph.add_vertex()?;
    let e3 = graph.add_edge(v, x, "a")?;
    let e2 = graph.add_edge(y, v, "b")?;
    let e1 = graph.add_edge(v, y, "a")?;
    Ok((v, vec![e1, e2, e3]))
}

fn remove_at(position: usize) -> Result<()> {
    let (_dir, mut graph) = open_graph();
    let (v, mut chain) = chain_of_three(&mut graph)?;
    assert_eq!(walk(&graph, v, Dir::Both, &[]), chain);
    let victim = chain.remove(position);
    graph.remove_edge(victim)?;
    assert_eq!(walk(&graph, v, Dir::Both, &[]), chain);
    assert!(graph.get_edge(victim)?.is_none());
    Ok(())
}

#[test]
fn removing_the_first_edge_moves_the_head() -> Result<()> {
    remove_at(0)
}

#[test]
fn removing_a_middle_edge_joins_its_neighbours() -> Result<()> {
    remove_at(1)
}

#[test]
fn removing_the_last_edge_ends_the_chain_early() -> Result<()> {
    remove_at(2)
}

#[test]
fn direction_filters_use_the_edge_orientation() -> Result<()> {
    let (_dir, mut graph) = open_graph();
    let (v, chain) = chain_of_three(&mut graph)?;
    assert_eq!(walk(&graph, v, Dir::Out, &[]), vec![chain[0], chain[2]]);
    assert_eq!(walk(&graph, v, Dir::In, &[]), vec![chain[1]]);
    assert_eq!(walk(&graph, v, Dir::Both, &["b"]), vec![chain[1]]);
    assert_eq!(walk(&graph, v, Dir::Out, &["b"]), vec![]);
    Ok(())
}

#[test]
fn random_removals_keep_every_chain_consistent() -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let (_dir, mut graph) = open_graph();
    let vertices: Vec<VertexId> = (0..12).map(|_| graph.add_vertex()).collect::<Result<_>>()?;
    let mut edges = Vec::new();
    for i in 0..150 {
        let out = *vertices.choose(&mut rng).expect("vertex");
        let in_ = *vertices.choose(&mut rng).expect("vertex");
        let label = if rng.gen_bool(0.5) { "odd" } else { "even" };
        edges.push(graph.add_edge(out, in_, label)?);
        if i % 3 == 2 {
            let idx = rng.gen_range(0..edges.len());
            let victim = edges.swap_remove(idx);
            graph.remove_edge(victim)?;
        }
    }

    let mut seen = 0;
    for v in &vertices {
        let incident = walk(&graph, *v, Dir::Both, &[]);
        for e in &incident {
            let data = graph.get_edge(*e)?.expect("live edge");
            assert!(data.out_vertex == *v || data.in_vertex == *v);
            if data.out_vertex == *v {
                seen += 1;
            }
        }
        let outs = walk(&graph, *v, Dir::Out, &[]).len();
        let ins = walk(&graph, *v, Dir::In, &[]).len();
        assert!(outs + ins >= incident.len());
    }
    assert_eq!(seen, edges.len());
    assert_eq!(graph.stats()?.edges, edges.len() as u64);
    Ok(())
}
