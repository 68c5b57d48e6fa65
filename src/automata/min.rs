//! Minimization of deterministic automata by partition refinement.
//!
//! The reachable states of a deterministic automaton are explored, with a missing successor standing for an implicit rejecting state.
//! The states are then partitioned into acceptance classes, and the classes are refined symbol by symbol until a complete pass over the alphabet splits nothing.
//! The resulting [`MinimalDfa`] is an explicit, total transition table with states numbered in breadth-first order from the start state.

use std::{collections::HashMap, fmt::Debug, hash::Hash, rc::Rc};

use bit_set::BitSet;
use indexmap::IndexSet;
use log::debug;

use super::{det::determinize, follow_successors, Alphabet, DetState, State};
use crate::{AutomatonError, CancelToken, Result, Symbol};

/// A minimal, total deterministic automaton.
///
/// States are numbered from 0, the start state.
/// Every state has exactly one successor for every symbol of the alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinimalDfa {
    alphabet: Rc<Alphabet>,
    /// The symbols of the alphabet in ascending order. Transitions are indexed by position in this list.
    symbols: Vec<Symbol>,
    finals: BitSet,
    transitions: Vec<Vec<usize>>,
}

impl MinimalDfa {
    /// Returns the number of states.
    pub fn num_states(&self) -> usize {
        self.transitions.len()
    }

    /// Returns the alphabet of the automaton.
    pub fn alphabet(&self) -> &Rc<Alphabet> {
        &self.alphabet
    }

    /// Returns the symbols of the alphabet in ascending order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn is_final(&self, state: usize) -> bool {
        self.finals.contains(state)
    }

    /// Returns an iterator over the final states in ascending order.
    pub fn finals(&self) -> impl Iterator<Item = usize> + '_ {
        self.finals.iter()
    }

    /// Returns the successor of `state` on the symbol at position `symbol` of [`MinimalDfa::symbols`].
    pub fn successor(&self, state: usize, symbol: usize) -> usize {
        self.transitions[state][symbol]
    }

    /// Returns the successor of `state` on `symbol`, or `None` if the symbol is not part of the alphabet.
    pub fn follow(&self, state: usize, symbol: &Symbol) -> Option<usize> {
        let idx = self.symbols.binary_search(symbol).ok()?;
        Some(self.transitions[state][idx])
    }

    /// Returns an iterator over all transitions as triples of source, symbol and destination.
    pub fn transitions(&self) -> impl Iterator<Item = (usize, &Symbol, usize)> + '_ {
        self.transitions.iter().enumerate().flat_map(move |(q, row)| {
            row.iter()
                .zip(self.symbols.iter())
                .map(move |(&p, a)| (q, a, p))
        })
    }

    /// Returns true if the automaton accepts the word.
    pub fn accepts(&self, word: &[Symbol]) -> bool {
        let mut q = 0;
        for symbol in word {
            match self.follow(q, symbol) {
                Some(p) => q = p,
                None => return false,
            }
        }
        self.is_final(q)
    }

    /// Returns the rejecting state that loops to itself on every symbol, if there is one.
    ///
    /// A minimal automaton has at most one such state.
    /// Finding more than one is reported as a violated invariant.
    pub fn sink(&self) -> Result<Option<usize>> {
        let mut sinks = (0..self.num_states())
            .filter(|&q| !self.is_final(q) && self.transitions[q].iter().all(|&p| p == q));
        let sink = sinks.next();
        if let Some(other) = sinks.next() {
            return Err(AutomatonError::InternalInvariant(format!(
                "minimal automaton has more than one sink state: {} and {}",
                sink.unwrap_or_default(),
                other
            )));
        }
        Ok(sink)
    }

    /// Returns the start state as a [`DetState`].
    pub fn into_state(self) -> MinState {
        MinState {
            dfa: Rc::new(self),
            index: 0,
        }
    }

    /// Returns the state with the given index as a [`DetState`], or `None` if there is no such state.
    pub fn state(self: &Rc<Self>, index: usize) -> Option<MinState> {
        (index < self.num_states()).then(|| MinState::new(self.clone(), index))
    }
}

/// A state of a [`MinimalDfa`].
#[derive(Clone)]
pub struct MinState {
    dfa: Rc<MinimalDfa>,
    index: usize,
}

impl MinState {
    /// Returns the state with the given index of a shared automaton.
    pub fn new(dfa: Rc<MinimalDfa>, index: usize) -> Self {
        Self { dfa, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The automaton this state belongs to.
    pub fn dfa(&self) -> &MinimalDfa {
        &self.dfa
    }
}

impl PartialEq for MinState {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.dfa, &other.dfa) && self.index == other.index
    }
}

impl Eq for MinState {}

impl Hash for MinState {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.dfa).hash(state);
        self.index.hash(state);
    }
}

impl Debug for MinState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MinState({} of {})", self.index, self.dfa.num_states())
    }
}

impl State for MinState {
    fn is_final(&self) -> bool {
        self.dfa.is_final(self.index)
    }

    fn defined_symbols(&self) -> Alphabet {
        self.dfa.alphabet.as_ref().clone()
    }

    fn successors(&self, symbol: &Symbol) -> Vec<Self> {
        follow_successors(self, symbol)
    }
}

impl DetState for MinState {
    fn alphabet(&self) -> Rc<Alphabet> {
        self.dfa.alphabet.clone()
    }

    fn follow(&self, symbol: &Symbol) -> Option<Self> {
        self.dfa
            .follow(self.index, symbol)
            .map(|index| MinState::new(self.dfa.clone(), index))
    }
}

/// Minimizes the deterministic automaton starting in `start`.
///
/// All reachable states are explored, so unreachable states never influence the result.
/// A symbol without successor leads to an implicit rejecting state that loops to itself, which makes the result total.
/// The cancellation token is polled once per explored state and once per refined symbol.
pub fn minimize<D: DetState>(start: &D, cancel: &CancelToken) -> Result<MinimalDfa> {
    let alphabet = start.alphabet();
    let symbols: Vec<Symbol> = alphabet.iter().cloned().collect();

    // `None` is the implicit rejecting state
    let mut states: IndexSet<Option<D>> = IndexSet::new();
    states.insert(Some(start.clone()));
    let mut rows: Vec<Vec<usize>> = Vec::new();
    while rows.len() < states.len() {
        cancel.check()?;
        let state = states[rows.len()].clone();
        let row = symbols
            .iter()
            .map(|a| {
                let next = state.as_ref().and_then(|q| q.follow(a));
                states.insert_full(next).0
            })
            .collect();
        rows.push(row);
    }
    let accepting: Vec<bool> = states
        .iter()
        .map(|q| q.as_ref().is_some_and(|q| q.is_final()))
        .collect();

    let (class, rounds) = refine(&symbols, &rows, &accepting, cancel)?;

    // Number the classes in breadth-first order from the class of the start state
    let mut representative: HashMap<usize, usize> = HashMap::new();
    for (q, &c) in class.iter().enumerate() {
        representative.entry(c).or_insert(q);
    }
    let mut order: IndexSet<usize> = IndexSet::new();
    order.insert(class[0]);
    let mut transitions = Vec::new();
    while transitions.len() < order.len() {
        let rep = representative[&order[transitions.len()]];
        let row: Vec<usize> = rows[rep]
            .iter()
            .map(|&p| order.insert_full(class[p]).0)
            .collect();
        transitions.push(row);
    }
    let mut finals = BitSet::new();
    for (i, c) in order.iter().enumerate() {
        if accepting[representative[c]] {
            finals.insert(i);
        }
    }

    debug!(
        "minimized {} explored states to {} classes in {} rounds",
        states.len(),
        transitions.len(),
        rounds
    );
    Ok(MinimalDfa {
        alphabet,
        symbols,
        finals,
        transitions,
    })
}

/// Determinizes and minimizes the automaton starting in `start`.
pub fn minimize_nfa<S: State>(start: &S, cancel: &CancelToken) -> Result<MinimalDfa> {
    minimize(&determinize(start, cancel)?, cancel)
}

/// Refines the acceptance partition of the explored states until it is stable.
/// Returns the class of every state together with the number of refinement rounds.
fn refine(
    symbols: &[Symbol],
    rows: &[Vec<usize>],
    accepting: &[bool],
    cancel: &CancelToken,
) -> Result<(Vec<usize>, usize)> {
    let mut class: Vec<usize> = if accepting.iter().all(|&f| f == accepting[0]) {
        vec![0; accepting.len()]
    } else {
        accepting.iter().map(|&f| usize::from(f)).collect()
    };
    let mut num_classes = class.iter().max().map_or(0, |&c| c + 1);
    let mut rounds = 0;
    loop {
        rounds += 1;
        let before = num_classes;
        for a in 0..symbols.len() {
            cancel.check()?;
            // Two states stay together iff they are in the same class and their successors on `a` are too
            let mut signatures: HashMap<(usize, usize), usize> = HashMap::new();
            let next: Vec<usize> = (0..rows.len())
                .map(|q| {
                    let fresh = signatures.len();
                    *signatures.entry((class[q], class[rows[q][a]])).or_insert(fresh)
                })
                .collect();
            class = next;
            num_classes = signatures.len();
        }
        if num_classes == before {
            return Ok((class, rounds));
        }
    }
}
