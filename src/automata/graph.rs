//! Conversion between automata and explicit labeled graphs.
//!
//! An external graph is wrapped lazily: nodes are only visited when the automaton explores them.
//! In the other direction, an automaton is minimized and its transition table is listed without the rejecting sink.

use std::{
    cell::RefCell,
    collections::{BTreeSet, HashSet},
    fmt::Debug,
    hash::Hash,
    rc::Rc,
};

use indexmap::IndexSet;

use super::{min::MinimalDfa, Alphabet, Automaton, NState};
use crate::{Result, Symbol};

/// An external graph with its node type erased.
/// Nodes are identified by the order in which they were discovered.
trait ErasedGraph {
    fn is_final(&self, node: usize) -> bool;
    fn edges(&self, node: usize) -> Vec<(Symbol, usize)>;
}

struct LiveGraph<N, F> {
    finals: HashSet<N>,
    edges: F,
    nodes: RefCell<IndexSet<N>>,
}

impl<N, F> LiveGraph<N, F>
where
    N: Clone + Eq + Hash,
{
    fn node(&self, id: usize) -> N {
        self.nodes.borrow()[id].clone()
    }
}

impl<N, F> ErasedGraph for LiveGraph<N, F>
where
    N: Clone + Eq + Hash,
    F: Fn(&N) -> Vec<(Symbol, N)>,
{
    fn is_final(&self, node: usize) -> bool {
        self.finals.contains(&self.node(node))
    }

    fn edges(&self, node: usize) -> Vec<(Symbol, usize)> {
        let edges = (self.edges)(&self.node(node));
        let mut nodes = self.nodes.borrow_mut();
        edges
            .into_iter()
            .map(|(label, target)| (label, nodes.insert_full(target).0))
            .collect()
    }
}

/// A node of an external labeled graph.
#[derive(Clone)]
pub struct GraphNode {
    graph: Rc<dyn ErasedGraph>,
    node: usize,
}

impl GraphNode {
    pub(crate) fn is_final(&self) -> bool {
        self.graph.is_final(self.node)
    }

    pub(crate) fn defined_symbols(&self) -> Alphabet {
        self.graph
            .edges(self.node)
            .into_iter()
            .map(|(label, _)| label)
            .filter(|label| !label.is_epsilon())
            .collect()
    }

    pub(crate) fn successors(&self, symbol: &Symbol) -> Vec<GraphNode> {
        self.graph
            .edges(self.node)
            .into_iter()
            .filter(|(label, _)| label == symbol)
            .map(|(_, node)| GraphNode {
                graph: self.graph.clone(),
                node,
            })
            .collect()
    }
}

impl PartialEq for GraphNode {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.graph), Rc::as_ptr(&other.graph))
            && self.node == other.node
    }
}

impl Eq for GraphNode {}

impl Hash for GraphNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.graph) as *const ()).hash(state);
        self.node.hash(state);
    }
}

impl Debug for GraphNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GraphNode({})", self.node)
    }
}

/// Wraps an external labeled graph as an automaton.
///
/// The automaton starts in `initial` and accepts in the nodes of `finals`.
/// The outgoing edges of a node are queried through `edges` when the node is first explored, and may be queried again later.
/// Edges labeled with [`Symbol::Epsilon`] become epsilon transitions.
/// Nodes that are not reachable from `initial` are never visited.
///
/// # Examples
/// ```
/// use relang::{automata::from_labeled_graph, word, Symbol};
/// // 0 -a-> 1 -b-> 0, accepting in 1
/// let aut = from_labeled_graph(0, [1], |n: &u32| match n {
///     0 => vec![(Symbol::new("a"), 1)],
///     _ => vec![(Symbol::new("b"), 0)],
/// });
/// assert!(aut.accepts(&word(["a", "b", "a"])));
/// assert!(!aut.accepts(&word(["a", "b"])));
/// ```
pub fn from_labeled_graph<N, F>(
    initial: N,
    finals: impl IntoIterator<Item = N>,
    edges: F,
) -> Automaton
where
    N: Clone + Eq + Hash + 'static,
    F: Fn(&N) -> Vec<(Symbol, N)> + 'static,
{
    let mut nodes = IndexSet::new();
    nodes.insert(initial);
    let graph = LiveGraph {
        finals: finals.into_iter().collect(),
        edges,
        nodes: RefCell::new(nodes),
    };
    Automaton::from_state(NState::Graph(GraphNode {
        graph: Rc::new(graph),
        node: 0,
    }))
}

/// An explicit deterministic graph with numbered nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledGraph {
    /// The initial node.
    pub initial: usize,
    /// The number of nodes. Nodes are numbered from 0.
    pub num_nodes: usize,
    pub finals: BTreeSet<usize>,
    /// Edges as triples of source, label and target.
    pub edges: Vec<(usize, Symbol, usize)>,
}

impl LabeledGraph {
    /// Returns an automaton that explores this graph.
    pub fn to_automaton(&self) -> Automaton {
        let graph = Rc::new(self.clone());
        let finals = self.finals.clone();
        from_labeled_graph(self.initial, finals, move |&n: &usize| {
            graph
                .edges
                .iter()
                .filter(|(src, _, _)| *src == n)
                .map(|(_, label, dst)| (label.clone(), *dst))
                .collect()
        })
    }
}

/// Lists the minimal automaton as a labeled graph, leaving out the rejecting sink.
///
/// The nodes keep the breadth-first numbering of the minimal automaton with the sink removed.
/// The automaton of the empty language is a single, non-accepting node without edges.
pub fn to_labeled_graph(dfa: &MinimalDfa) -> Result<LabeledGraph> {
    let sink = dfa.sink()?;
    let renumber = |q: usize| match sink {
        Some(s) if q > s => q - 1,
        _ => q,
    };
    if sink == Some(0) {
        return Ok(LabeledGraph {
            initial: 0,
            num_nodes: 1,
            finals: BTreeSet::new(),
            edges: vec![],
        });
    }
    let edges = dfa
        .transitions()
        .filter(|&(src, _, dst)| Some(src) != sink && Some(dst) != sink)
        .map(|(src, label, dst)| (renumber(src), label.clone(), renumber(dst)))
        .collect();
    Ok(LabeledGraph {
        initial: 0,
        num_nodes: dfa.num_states() - usize::from(sink.is_some()),
        finals: dfa.finals().map(renumber).collect(),
        edges,
    })
}
