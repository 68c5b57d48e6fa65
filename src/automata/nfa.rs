//! Nondeterministic states built by structural composition.
//!
//! A state of a combined automaton is never copied out of its operands.
//! Instead, a state either is a leaf or decorates the states of its operands and computes its transitions by delegating to them.
//! All states compare structurally, so two states built from equal operands are equal.
//! Consumers that intern states, such as the subset construction, rely on this to terminate on cyclic state graphs.
//!
//! Every decorator stores a fingerprint of its structure, computed once from the fingerprints of its children.
//! Hashing a state only reads the fingerprint, and comparing walks both structures without recursion,
//! visiting every pair of shared nodes once.

use std::{
    collections::{hash_map::DefaultHasher, HashSet},
    hash::{Hash, Hasher},
    rc::Rc,
};

use super::{graph::GraphNode, min::MinState, Alphabet, DetState, State};
use crate::Symbol;

/// A state of a nondeterministic automaton.
#[derive(Debug, Clone)]
pub enum NState {
    /// A state without symbol transitions that branches to the given states on epsilon.
    Branch(Rc<Branch>),
    /// The start state of an atomic automaton. Reading the symbol leads to an accepting leaf.
    Atom(Symbol),
    /// A state of the left operand of a concatenation together with the start states of the automata that follow it.
    Concat(Rc<Concat>),
    /// A state of the operand of a Kleene plus. Accepting states loop back to the operand's start state.
    Plus(Rc<Plus>),
    /// A state of one copy of a bounded repetition.
    Repeat(Rc<Repeat>),
    /// A node of an external labeled graph.
    Graph(GraphNode),
    /// A state of a minimal deterministic automaton.
    Det(MinState),
}

#[derive(Debug)]
pub struct Branch {
    fingerprint: u64,
    accepting: bool,
    targets: Vec<NState>,
}

/// The invariant is that `rest` is never empty.
/// A state with nothing left to follow is the wrapped state itself.
#[derive(Debug)]
pub struct Concat {
    fingerprint: u64,
    current: NState,
    rest: Rc<[NState]>,
}

#[derive(Debug)]
pub struct Plus {
    fingerprint: u64,
    current: NState,
    start: NState,
}

/// A state inside copy `done + 1` of the operand, after `done` completed copies.
/// The invariant is `done < max`.
#[derive(Debug)]
pub struct Repeat {
    fingerprint: u64,
    current: NState,
    start: NState,
    done: u32,
    min: u32,
    max: u32,
}

fn fingerprint(parts: impl Hash) -> u64 {
    let mut hasher = DefaultHasher::new();
    parts.hash(&mut hasher);
    hasher.finish()
}

impl Concat {
    fn wrap(current: NState, rest: Rc<[NState]>) -> NState {
        NState::Concat(Rc::new(Concat {
            fingerprint: fingerprint(("concat", &current, &*rest)),
            current,
            rest,
        }))
    }
}

impl Plus {
    fn wrap(current: NState, start: NState) -> NState {
        NState::Plus(Rc::new(Plus {
            fingerprint: fingerprint(("plus", &current, &start)),
            current,
            start,
        }))
    }
}

impl Repeat {
    fn wrap(current: NState, start: NState, done: u32, min: u32, max: u32) -> NState {
        NState::Repeat(Rc::new(Repeat {
            fingerprint: fingerprint(("repeat", &current, &start, done, min, max)),
            current,
            start,
            done,
            min,
            max,
        }))
    }

    fn with_current(&self, current: NState) -> NState {
        Self::wrap(current, self.start.clone(), self.done, self.min, self.max)
    }
}

impl NState {
    /// A state without any transitions.
    pub fn leaf(accepting: bool) -> Self {
        Self::branch(accepting, vec![])
    }

    /// A state without symbol transitions, branching to the given states on epsilon.
    pub fn branch(accepting: bool, targets: Vec<NState>) -> Self {
        NState::Branch(Rc::new(Branch {
            fingerprint: fingerprint(("branch", accepting, &targets)),
            accepting,
            targets,
        }))
    }

    /// The start state of the automaton accepting exactly the one-symbol word `symbol`.
    /// For epsilon this is the single accepting state without transitions.
    pub fn atom(symbol: Symbol) -> Self {
        if symbol.is_epsilon() {
            Self::leaf(true)
        } else {
            NState::Atom(symbol)
        }
    }

    /// The start state of the concatenation of the automata with the given start states.
    /// The empty concatenation accepts only the empty word.
    pub fn sequence(starts: &[NState]) -> Self {
        match starts.split_first() {
            None => Self::leaf(true),
            Some((first, rest)) => first.clone().followed_by(&Rc::from(rest)),
        }
    }

    /// The start state of the Kleene plus of the automaton starting in `start`.
    pub fn plus(start: NState) -> Self {
        Plus::wrap(start.clone(), start)
    }

    /// The start state of the automaton accepting between `min` and `max` words of the automaton starting in `start`.
    ///
    /// The copies are not unfolded. A single decorator counts the completed copies, so the depth of the state
    /// does not grow with the bounds. Requires `min <= max`.
    pub fn repeat(start: NState, min: u32, max: u32) -> Self {
        debug_assert!(min <= max);
        if max == 0 {
            return Self::leaf(true);
        }
        let first = Repeat::wrap(start.clone(), start, 0, min, max);
        if min == 0 && !first.is_final() {
            Self::branch(true, vec![first])
        } else {
            first
        }
    }

    /// Wraps this state so that, once it accepts, the automata starting in `rest` follow in order.
    /// If this state already is part of a concatenation, the continuation lists are spliced instead of nesting the decorators.
    fn followed_by(self, rest: &Rc<[NState]>) -> NState {
        if rest.is_empty() {
            return self;
        }
        match self {
            NState::Concat(c) => {
                let spliced: Rc<[NState]> = c.rest.iter().chain(rest.iter()).cloned().collect();
                Concat::wrap(c.current.clone(), spliced)
            }
            state => Concat::wrap(state, rest.clone()),
        }
    }

    /// Returns true if this is the start state of a minimal deterministic automaton.
    pub fn is_deterministic(&self) -> bool {
        matches!(self, NState::Det(_))
    }

    fn fingerprint(&self) -> u64 {
        match self {
            NState::Branch(b) => b.fingerprint,
            NState::Concat(c) => c.fingerprint,
            NState::Plus(p) => p.fingerprint,
            NState::Repeat(r) => r.fingerprint,
            NState::Atom(s) => fingerprint(("atom", s)),
            NState::Graph(g) => fingerprint(("graph", g)),
            NState::Det(m) => fingerprint(("det", m)),
        }
    }
}

impl Hash for NState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint());
    }
}

impl PartialEq for NState {
    fn eq(&self, other: &Self) -> bool {
        if self.fingerprint() != other.fingerprint() {
            return false;
        }
        let mut pending = vec![(self, other)];
        let mut compared: HashSet<(*const (), *const ())> = HashSet::new();
        while let Some((x, y)) = pending.pop() {
            if x.fingerprint() != y.fingerprint() {
                return false;
            }
            match (x, y) {
                (NState::Atom(a), NState::Atom(b)) if a == b => {}
                (NState::Graph(a), NState::Graph(b)) if a == b => {}
                (NState::Det(a), NState::Det(b)) if a == b => {}
                (NState::Branch(a), NState::Branch(b)) => {
                    if !first_visit(&mut compared, a, b) {
                        continue;
                    }
                    if a.accepting != b.accepting || a.targets.len() != b.targets.len() {
                        return false;
                    }
                    pending.extend(a.targets.iter().zip(b.targets.iter()));
                }
                (NState::Concat(a), NState::Concat(b)) => {
                    if !first_visit(&mut compared, a, b) {
                        continue;
                    }
                    if !Rc::ptr_eq(&a.rest, &b.rest) {
                        if a.rest.len() != b.rest.len() {
                            return false;
                        }
                        pending.extend(a.rest.iter().zip(b.rest.iter()));
                    }
                    pending.push((&a.current, &b.current));
                }
                (NState::Plus(a), NState::Plus(b)) => {
                    if !first_visit(&mut compared, a, b) {
                        continue;
                    }
                    pending.push((&a.start, &b.start));
                    pending.push((&a.current, &b.current));
                }
                (NState::Repeat(a), NState::Repeat(b)) => {
                    if !first_visit(&mut compared, a, b) {
                        continue;
                    }
                    if (a.done, a.min, a.max) != (b.done, b.min, b.max) {
                        return false;
                    }
                    pending.push((&a.start, &b.start));
                    pending.push((&a.current, &b.current));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Eq for NState {}

/// Returns false if the two nodes are the same or were already compared.
fn first_visit<T>(compared: &mut HashSet<(*const (), *const ())>, a: &Rc<T>, b: &Rc<T>) -> bool {
    !Rc::ptr_eq(a, b) && compared.insert((Rc::as_ptr(a).cast(), Rc::as_ptr(b).cast()))
}

impl State for NState {
    fn is_final(&self) -> bool {
        match self {
            NState::Branch(b) => b.accepting,
            NState::Atom(_) => false,
            NState::Concat(_) => false,
            NState::Plus(p) => p.current.is_final(),
            NState::Repeat(r) => r.done + 1 >= r.min && r.current.is_final(),
            NState::Graph(g) => g.is_final(),
            NState::Det(m) => m.is_final(),
        }
    }

    fn defined_symbols(&self) -> Alphabet {
        match self {
            NState::Branch(_) => Alphabet::new(),
            NState::Atom(s) => Alphabet::from([s.clone()]),
            NState::Concat(c) => c.current.defined_symbols(),
            NState::Plus(p) => p.current.defined_symbols(),
            NState::Repeat(r) => r.current.defined_symbols(),
            NState::Graph(g) => g.defined_symbols(),
            NState::Det(m) => m.alphabet().as_ref().clone(),
        }
    }

    fn successors(&self, symbol: &Symbol) -> Vec<Self> {
        match self {
            NState::Branch(b) if symbol.is_epsilon() => b.targets.clone(),
            NState::Branch(_) => vec![],
            NState::Atom(s) if s == symbol => vec![Self::leaf(true)],
            NState::Atom(_) => vec![],
            NState::Concat(c) => {
                let mut succs: Vec<NState> = c
                    .current
                    .successors(symbol)
                    .into_iter()
                    .map(|s| s.followed_by(&c.rest))
                    .collect();
                if symbol.is_epsilon() && c.current.is_final() {
                    if let Some((next, remaining)) = c.rest.split_first() {
                        succs.push(next.clone().followed_by(&Rc::from(remaining)));
                    }
                }
                succs
            }
            NState::Plus(p) => {
                let mut succs: Vec<NState> = p
                    .current
                    .successors(symbol)
                    .into_iter()
                    .map(|current| Plus::wrap(current, p.start.clone()))
                    .collect();
                if symbol.is_epsilon() && p.current.is_final() {
                    succs.push(Self::plus(p.start.clone()));
                }
                succs
            }
            NState::Repeat(r) => {
                let mut succs: Vec<NState> = r
                    .current
                    .successors(symbol)
                    .into_iter()
                    .map(|current| r.with_current(current))
                    .collect();
                // Start the next copy
                if symbol.is_epsilon() && r.current.is_final() && r.done + 1 < r.max {
                    succs.push(Repeat::wrap(
                        r.start.clone(),
                        r.start.clone(),
                        r.done + 1,
                        r.min,
                        r.max,
                    ));
                }
                succs
            }
            NState::Graph(g) => g.successors(symbol).into_iter().map(NState::Graph).collect(),
            NState::Det(m) => m.successors(symbol).into_iter().map(NState::Det).collect(),
        }
    }
}
