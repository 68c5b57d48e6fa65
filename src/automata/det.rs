//! Determinization of nondeterministic automata by the subset construction.
//!
//! The construction is lazy.
//! A deterministic state stands for a set of nondeterministic states, and its successor on a symbol is only computed when it is asked for.
//! Successors are memoized, so the work done for a state is never repeated.
//! All deterministic states created from the same start state share an arena that interns the nondeterministic states and the state sets.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    fmt::{Debug, Display},
    hash::Hash,
    rc::Rc,
};

use bit_set::BitSet;
use indexmap::IndexSet;
use log::{debug, trace};

use super::{follow_successors, reachable_alphabet, Alphabet, DetState, State};
use crate::{CancelToken, Result, Symbol};

/// A set of interned nondeterministic states.
/// Each set of states corresponds to a single state in the determinized automaton.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
struct StateSet(BitSet);

impl StateSet {
    fn new() -> Self {
        Self(BitSet::default())
    }

    /// Inserts a state into the set and returns whether it was newly inserted.
    fn insert(&mut self, state: usize) -> bool {
        self.0.insert(state)
    }

    fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter()
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for StateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use itertools::Itertools;
        write!(f, "{{{}}}", self.iter().join(", "))
    }
}

struct Node {
    members: StateSet,
    accepting: bool,
    follow: HashMap<Symbol, usize>,
}

/// The shared arena of a lazy subset construction.
struct Subset<S: State> {
    alphabet: Rc<Alphabet>,
    /// Interned nondeterministic states. The index of a state is its id in state sets.
    states: RefCell<IndexSet<S>>,
    nodes: RefCell<Vec<Node>>,
    /// Maps both raw successor sets and their epsilon closures to deterministic states.
    canonical: RefCell<HashMap<StateSet, usize>>,
}

impl<S: State> Subset<S> {
    fn new(alphabet: Alphabet) -> Self {
        Self {
            alphabet: Rc::new(alphabet),
            states: RefCell::new(IndexSet::new()),
            nodes: RefCell::new(Vec::new()),
            canonical: RefCell::new(HashMap::new()),
        }
    }

    fn intern(&self, state: S) -> usize {
        self.states.borrow_mut().insert_full(state).0
    }

    fn state(&self, id: usize) -> S {
        self.states.borrow()[id].clone()
    }

    /// Returns the deterministic state for a set of nondeterministic states.
    ///
    /// The raw set is looked up first, which avoids computing its epsilon closure again.
    /// Otherwise the closure is computed and looked up, and a new deterministic state is allocated if it is unknown.
    /// In both latter cases, the raw set and the closure are bound to the resulting state.
    fn lookup(&self, key: StateSet) -> usize {
        if let Some(&id) = self.canonical.borrow().get(&key) {
            return id;
        }
        let closed = self.close(&key);
        let existing = self.canonical.borrow().get(&closed).copied();
        let id = match existing {
            Some(id) => id,
            None => self.allocate(closed.clone()),
        };
        let mut canonical = self.canonical.borrow_mut();
        canonical.insert(key, id);
        canonical.insert(closed, id);
        id
    }

    fn close(&self, key: &StateSet) -> StateSet {
        let mut closed = key.clone();
        let mut queue: VecDeque<usize> = key.iter().collect();
        while let Some(id) = queue.pop_front() {
            for succ in self.state(id).successors(&Symbol::Epsilon) {
                let succ = self.intern(succ);
                if closed.insert(succ) {
                    queue.push_back(succ);
                }
            }
        }
        closed
    }

    fn allocate(&self, members: StateSet) -> usize {
        let accepting = members.iter().any(|q| self.state(q).is_final());
        let mut nodes = self.nodes.borrow_mut();
        trace!(
            "new subset state {} = {} (accepting: {})",
            nodes.len(),
            members,
            accepting
        );
        nodes.push(Node {
            members,
            accepting,
            follow: HashMap::new(),
        });
        nodes.len() - 1
    }

    /// Computes the successor of a deterministic state, memoizing the result.
    /// Returns `None` only for symbols outside of the alphabet.
    /// The empty set of nondeterministic states is an ordinary, rejecting state, so the automaton is total over its alphabet.
    fn follow(&self, id: usize, symbol: &Symbol) -> Option<usize> {
        if !self.alphabet.contains(symbol) {
            return None;
        }
        if let Some(&target) = self.nodes.borrow()[id].follow.get(symbol) {
            return Some(target);
        }
        let members = self.nodes.borrow()[id].members.clone();
        let mut target = StateSet::new();
        for q in members.iter() {
            for succ in self.state(q).successors(symbol) {
                target.insert(self.intern(succ));
            }
        }
        let target = self.lookup(target);
        self.nodes.borrow_mut()[id]
            .follow
            .insert(symbol.clone(), target);
        Some(target)
    }
}

/// A state of a lazily determinized automaton.
///
/// Two states are equal if they belong to the same construction and stand for the same set of nondeterministic states.
#[derive(Clone)]
pub struct DState<S: State> {
    subset: Rc<Subset<S>>,
    id: usize,
}

impl<S: State> DState<S> {
    /// The index of this state within its construction. The start state has index 0.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The nondeterministic states this state stands for.
    pub fn members(&self) -> Vec<S> {
        let nodes = self.subset.nodes.borrow();
        nodes[self.id]
            .members
            .iter()
            .map(|q| self.subset.state(q))
            .collect()
    }

    /// Returns true if this state stands for the empty set of nondeterministic states.
    /// Such a state rejects and loops to itself on every symbol.
    pub fn is_sink(&self) -> bool {
        self.subset.nodes.borrow()[self.id].members.is_empty()
    }

    /// The number of deterministic states created so far by the construction this state belongs to.
    pub fn num_created(&self) -> usize {
        self.subset.nodes.borrow().len()
    }
}

impl<S: State> PartialEq for DState<S> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.subset, &other.subset) && self.id == other.id
    }
}

impl<S: State> Eq for DState<S> {}

impl<S: State> Hash for DState<S> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.subset).hash(state);
        self.id.hash(state);
    }
}

impl<S: State> Debug for DState<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nodes = self.subset.nodes.borrow();
        write!(f, "DState({}: {})", self.id, nodes[self.id].members)
    }
}

impl<S: State> State for DState<S> {
    fn is_final(&self) -> bool {
        self.subset.nodes.borrow()[self.id].accepting
    }

    fn defined_symbols(&self) -> Alphabet {
        self.subset.alphabet.as_ref().clone()
    }

    fn successors(&self, symbol: &Symbol) -> Vec<Self> {
        follow_successors(self, symbol)
    }
}

impl<S: State> DetState for DState<S> {
    fn alphabet(&self) -> Rc<Alphabet> {
        self.subset.alphabet.clone()
    }

    fn follow(&self, symbol: &Symbol) -> Option<Self> {
        self.subset.follow(self.id, symbol).map(|id| DState {
            subset: self.subset.clone(),
            id,
        })
    }
}

/// Determinizes the automaton starting in `start`.
///
/// The alphabet of the result is the set of symbols reachable from `start`, which requires a complete exploration of the nondeterministic automaton.
/// Apart from that, no deterministic state is constructed before it is visited.
/// The number of deterministic states can be exponential in the number of nondeterministic ones.
pub fn determinize<S: State>(start: &S, cancel: &CancelToken) -> Result<DState<S>> {
    let alphabet = reachable_alphabet(start, cancel)?;
    let subset = Rc::new(Subset::new(alphabet));
    let mut key = StateSet::new();
    key.insert(subset.intern(start.clone()));
    let id = subset.lookup(key);
    debug!(
        "subset construction over {} symbols starts with {} interned states",
        subset.alphabet.len(),
        subset.states.borrow().len()
    );
    Ok(DState { subset, id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{automata::Automaton, word};

    fn det(a: &Automaton) -> DState<crate::automata::NState> {
        determinize(a.start(), &CancelToken::default()).unwrap()
    }

    fn run<D: DetState>(start: &D, w: &[Symbol]) -> Option<D> {
        let mut q = start.clone();
        for s in w {
            q = q.follow(s)?;
        }
        Some(q)
    }

    #[test]
    fn test_determinize_epsilon() {
        let d = det(&Automaton::epsilon());
        assert!(d.is_final());
        assert!(d.alphabet().is_empty());
        assert_eq!(d.follow(&Symbol::new("a")), None);
    }

    #[test]
    fn test_determinize_basic() {
        let ab = Automaton::atomic("a").concatenate(&Automaton::atomic("b"));
        let d = det(&ab);
        assert!(!d.is_final());
        assert!(run(&d, &word(["a", "b"])).unwrap().is_final());
        assert!(!run(&d, &word(["a"])).unwrap().is_final());
        assert!(!run(&d, &word(["b", "a"])).unwrap().is_final());
    }

    #[test]
    fn test_determinize_is_total() {
        let a = Automaton::atomic("a").union(&Automaton::atomic("b")).unwrap();
        let d = det(&a);
        let after_a = d.follow(&Symbol::new("a")).unwrap();
        let sink = after_a.follow(&Symbol::new("a")).unwrap();
        assert!(sink.is_sink());
        assert!(!sink.is_final());
        assert_eq!(sink.follow(&Symbol::new("b")), Some(sink.clone()));
    }

    #[test]
    fn test_successors_are_memoized() {
        let star = Automaton::atomic("a").kleene_star();
        let d = det(&star);
        let s1 = d.follow(&Symbol::new("a")).unwrap();
        let created = d.num_created();
        let s2 = d.follow(&Symbol::new("a")).unwrap();
        assert_eq!(s1, s2);
        assert_eq!(created, d.num_created());
    }

    #[test]
    fn test_star_loop_is_finite() {
        let star = Automaton::atomic("a").kleene_star();
        let d = det(&star);
        let mut q = d.clone();
        for _ in 0..10 {
            q = q.follow(&Symbol::new("a")).unwrap();
            assert!(q.is_final());
        }
        assert!(d.num_created() <= 3);
    }

    #[test]
    fn test_determinize_no_epsilon_successors() {
        let d = det(&Automaton::atomic("a").optional());
        assert!(d.successors(&Symbol::Epsilon).is_empty());
    }

    #[test]
    fn test_determinize_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        let a = Automaton::atomic("a");
        assert!(determinize(a.start(), &token).is_err());
    }
}
