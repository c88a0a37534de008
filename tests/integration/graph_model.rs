#![allow(missing_docs)]

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use sombra_slots::{Dir, EdgeId, Graph, GraphOptions, PropValue, Result, VertexId};
use tempfile::TempDir;

const LABELS: [&str; 3] = ["knows", "likes", "owns"];
const KEYS: [&str; 4] = ["name", "age", "score", "tag"];

#[derive(Clone, Debug)]
enum Op {
    AddVertex,
    AddEdge(usize, usize, usize),
    RemoveEdge(usize),
    RemoveVertex(usize),
    SetProp(usize, usize, i32),
    SetText(usize, usize, String),
    RemoveProp(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::AddVertex),
        5 => (any::<usize>(), any::<usize>(), 0..LABELS.len())
            .prop_map(|(a, b, l)| Op::AddEdge(a, b, l)),
        2 => any::<usize>().prop_map(Op::RemoveEdge),
        1 => any::<usize>().prop_map(Op::RemoveVertex),
        3 => (any::<usize>(), 0..KEYS.len(), any::<i32>())
            .prop_map(|(v, k, n)| Op::SetProp(v, k, n)),
        1 => (any::<usize>(), 0..KEYS.len(), "[a-z]{0,120}")
            .prop_map(|(v, k, s)| Op::SetText(v, k, s)),
        2 => (any::<usize>(), 0..KEYS.len()).prop_map(|(v, k)| Op::RemoveProp(v, k)),
    ]
}

#[derive(Default)]
struct VertexModel {
    chain: Vec<EdgeId>,
    props: Vec<(String, PropValue)>,
}

#[derive(Default)]
struct Model {
    vertices: BTreeMap<VertexId, VertexModel>,
    edges: BTreeMap<EdgeId, (VertexId, VertexId, &'static str)>,
}

impl Model {
    fn pick_vertex(&self, n: usize) -> Option<VertexId> {
        if self.vertices.is_empty() {
            return None;
        }
        self.vertices.keys().nth(n % self.vertices.len()).copied()
    }

    fn pick_edge(&self, n: usize) -> Option<EdgeId> {
        if self.edges.is_empty() {
            return None;
        }
        self.edges.keys().nth(n % self.edges.len()).copied()
    }

    fn drop_edge(&mut self, e: EdgeId) {
        if let Some((out, in_, _)) = self.edges.remove(&e) {
            for v in [out, in_] {
                if let Some(vm) = self.vertices.get_mut(&v) {
                    vm.chain.retain(|x| *x != e);
                }
            }
        }
    }
}

fn apply(graph: &mut Graph, model: &mut Model, op: &Op) -> Result<()> {
    match op {
        Op::AddVertex => {
            let v = graph.add_vertex()?;
            model.vertices.insert(v, VertexModel::default());
        }
        Op::AddEdge(a, b, l) => {
            let (Some(out), Some(in_)) = (model.pick_vertex(*a), model.pick_vertex(*b)) else {
                return Ok(());
            };
            let e = graph.add_edge(out, in_, LABELS[*l])?;
            model.edges.insert(e, (out, in_, LABELS[*l]));
            let mut ends = vec![out];
            if in_ != out {
                ends.push(in_);
            }
            for v in ends {
                if let Some(vm) = model.vertices.get_mut(&v) {
                    vm.chain.insert(0, e);
                }
            }
        }
        Op::RemoveEdge(n) => {
            if let Some(e) = model.pick_edge(*n) {
                graph.remove_edge(e)?;
                model.drop_edge(e);
            }
        }
        Op::RemoveVertex(n) => {
            if let Some(v) = model.pick_vertex(*n) {
                graph.remove_vertex(v)?;
                let chain = model.vertices[&v].chain.clone();
                for e in chain {
                    model.drop_edge(e);
                }
                model.vertices.remove(&v);
            }
        }
        Op::SetProp(n, k, value) => set(graph, model, *n, *k, PropValue::Int32(*value))?,
        Op::SetText(n, k, text) => set(graph, model, *n, *k, PropValue::Str(text.clone()))?,
        Op::RemoveProp(n, k) => {
            if let Some(v) = model.pick_vertex(*n) {
                let removed = graph.remove_property(v, KEYS[*k])?;
                let props = &mut model.vertices.get_mut(&v).expect("live").props;
                let expected = props
                    .iter()
                    .position(|(key, _)| key == KEYS[*k])
                    .map(|i| props.remove(i).1);
                assert_eq!(removed, expected);
            }
        }
    }
    Ok(())
}

fn set(graph: &mut Graph, model: &mut Model, n: usize, k: usize, value: PropValue) -> Result<()> {
    let Some(v) = model.pick_vertex(n) else {
        return Ok(());
    };
    graph.set_property(v, KEYS[k], value.clone())?;
    let props = &mut model.vertices.get_mut(&v).expect("live").props;
    match props.iter_mut().find(|(key, _)| key == KEYS[k]) {
        Some(slot) => slot.1 = value,
        None => props.push((KEYS[k].to_string(), value)),
    }
    Ok(())
}

fn check(graph: &Graph, model: &Model) -> Result<()> {
    assert_eq!(graph.vertices()?, model.vertices.keys().copied().collect::<Vec<_>>());
    assert_eq!(graph.edges()?, model.edges.keys().copied().collect::<Vec<_>>());
    for (v, vm) in &model.vertices {
        let chain: Vec<EdgeId> = graph.get_edges(*v, Dir::Both, &[])?.collect::<Result<_>>()?;
        assert_eq!(chain, vm.chain, "chain of {v}");
        let outgoing: Vec<EdgeId> = graph.get_edges(*v, Dir::Out, &[])?.collect::<Result<_>>()?;
        let expected: Vec<EdgeId> = vm
            .chain
            .iter()
            .copied()
            .filter(|e| model.edges[e].0 == *v)
            .collect();
        assert_eq!(outgoing, expected, "outgoing of {v}");
        assert_eq!(graph.properties(*v)?, vm.props, "properties of {v}");
    }
    for (e, (out, in_, label)) in &model.edges {
        let data = graph.get_edge(*e)?.expect("live edge");
        assert_eq!((data.out_vertex, data.in_vertex), (*out, *in_));
        assert_eq!(data.label, *label);
    }
    let stats = graph.stats()?;
    let labels: BTreeSet<&str> = model.edges.values().map(|(_, _, l)| *l).collect();
    assert_eq!(stats.labels, labels.len() as u64);
    let props: usize = model.vertices.values().map(|vm| vm.props.len()).sum();
    assert_eq!(stats.properties, props as u64);
    assert!(!stats.corrupted);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn chains_match_an_in_memory_model(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let dir = TempDir::new().expect("tempdir");
        let options = GraphOptions::new(dir.path()).allocation_unit(4096).grab_size(4);
        let mut graph = Graph::open(options.clone()).expect("open");
        let mut model = Model::default();
        for op in &ops {
            apply(&mut graph, &mut model, op).expect("apply op");
        }
        check(&graph, &model).expect("check before reopen");
        graph.close().expect("close");

        let graph = Graph::open(options).expect("reopen");
        check(&graph, &model).expect("check after reopen");
        graph.close().expect("close");
    }
}
