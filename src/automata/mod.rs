//! Finite automata as lazy state graphs.
//!
//! An automaton is identified with its start state.
//! A state knows whether it is accepting, which symbols it has transitions for, and its successors for a given symbol.
//! Everything else, such as the set of reachable states or the alphabet, is discovered by exploring the graph on demand.
//!
//! The module provides two views on states.
//! [`State`] is the general, nondeterministic view, where a symbol may lead to any number of successors and epsilon transitions are allowed.
//! [`DetState`] refines it for deterministic automata that carry an alphabet and have at most one successor per symbol.
//! The combinators in [`nfa`] build nondeterministic automata by composition; [`det`], [`min`], [`comp`], [`inter`] and [`prefix`] work on deterministic ones.

pub mod comp;
pub mod det;
#[cfg(feature = "dot")]
mod dot;
pub mod graph;
pub mod inter;
pub mod min;
pub mod nfa;
pub mod prefix;
pub mod query;

#[cfg(test)]
pub(crate) mod testing;

use std::{
    collections::{BTreeSet, HashSet, VecDeque},
    fmt::Display,
    hash::Hash,
    rc::Rc,
};

use log::debug;

use crate::{AutomatonError, CancelToken, Result, Symbol, Word};

pub use det::{determinize, DState};
pub use graph::{from_labeled_graph, LabeledGraph};
pub use inter::ProductMode;
pub use min::{minimize, MinState, MinimalDfa};
pub use nfa::NState;

/// A set of symbols. Alphabets never contain [`Symbol::Epsilon`].
pub type Alphabet = BTreeSet<Symbol>;

/// A state of a finite automaton.
///
/// States are values: they are cheap to clone and compare structurally.
/// Two states that are equal must have the same transitions and the same acceptance.
pub trait State: Clone + Eq + Hash {
    /// Returns true if the state is accepting.
    fn is_final(&self) -> bool;

    /// Returns the symbols that this state has outgoing transitions for.
    /// The set never contains epsilon, even if the state has epsilon transitions.
    fn defined_symbols(&self) -> Alphabet;

    /// Returns the successors of this state on the given symbol.
    /// Passing [`Symbol::Epsilon`] returns the targets of the epsilon transitions.
    fn successors(&self, symbol: &Symbol) -> Vec<Self>;
}

/// A state of a deterministic finite automaton.
///
/// All states of the same deterministic automaton share an alphabet.
/// A deterministic state has no epsilon transitions and at most one successor per symbol.
/// If `follow` returns `None` for a symbol of the alphabet, the state falls into an implicit rejecting sink.
pub trait DetState: State {
    /// The alphabet of the automaton this state belongs to.
    fn alphabet(&self) -> Rc<Alphabet>;

    /// Returns the unique successor on `symbol`, if any.
    fn follow(&self, symbol: &Symbol) -> Option<Self>;
}

/// Implements [`State::successors`] for deterministic states in terms of [`DetState::follow`].
pub(crate) fn follow_successors<D: DetState>(state: &D, symbol: &Symbol) -> Vec<D> {
    if symbol.is_epsilon() {
        return vec![];
    }
    state.follow(symbol).into_iter().collect()
}

/// Returns the epsilon closure of the given states.
/// The closure contains the states themselves and every state reachable from them by epsilon transitions only.
/// Each state is expanded exactly once, so cyclic epsilon paths terminate.
pub fn epsilon_closure<S: State>(states: impl IntoIterator<Item = S>) -> HashSet<S> {
    let mut closure = HashSet::new();
    let mut queue = VecDeque::new();
    for s in states {
        if closure.insert(s.clone()) {
            queue.push_back(s);
        }
    }
    while let Some(s) = queue.pop_front() {
        for succ in s.successors(&Symbol::Epsilon) {
            if closure.insert(succ.clone()) {
                queue.push_back(succ);
            }
        }
    }
    closure
}

/// Returns true if the automaton starting in `start` accepts the word.
///
/// The word is simulated on the set of active states, taking epsilon closures after every step.
/// Symbols without transitions simply yield no successors.
pub fn accepts<S: State>(start: &S, word: &[Symbol]) -> bool {
    let mut current = epsilon_closure([start.clone()]);
    for symbol in word {
        let next: Vec<S> = current.iter().flat_map(|s| s.successors(symbol)).collect();
        if next.is_empty() {
            return false;
        }
        current = epsilon_closure(next);
    }
    current.iter().any(|s| s.is_final())
}

/// Returns the union of the defined symbols of all states reachable from `start`.
///
/// Reachability follows epsilon transitions and transitions on every defined symbol.
/// This explores the complete reachable state graph, so the cancellation token is polled once per state.
pub fn reachable_alphabet<S: State>(start: &S, cancel: &CancelToken) -> Result<Alphabet> {
    let mut alphabet = Alphabet::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(start.clone());
    queue.push_back(start.clone());
    while let Some(state) = queue.pop_front() {
        cancel.check()?;
        let defined = state.defined_symbols();
        let next = state
            .successors(&Symbol::Epsilon)
            .into_iter()
            .chain(defined.iter().flat_map(|s| state.successors(s)));
        for succ in next {
            if seen.insert(succ.clone()) {
                queue.push_back(succ);
            }
        }
        alphabet.extend(defined);
    }
    if alphabet.contains(&Symbol::Epsilon) {
        return Err(AutomatonError::InternalInvariant(
            "epsilon is reported as a defined symbol".to_string(),
        ));
    }
    debug!(
        "explored {} states, reachable alphabet has {} symbols",
        seen.len(),
        alphabet.len()
    );
    Ok(alphabet)
}

/// An automaton over symbolic alphabets.
///
/// This is the entry point of the crate.
/// An automaton is a handle to its start state; combining automata composes their state graphs without copying them.
/// Combinators that need a deterministic automaton, such as intersection or negation, determinize and minimize their operands on the fly.
/// Methods that can run long use a [`CancelToken`] that is never cancelled; the free functions of the submodules accept a token explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Automaton {
    start: NState,
}

impl Automaton {
    /// The automaton with the given start state.
    pub fn from_state(start: NState) -> Self {
        Self { start }
    }

    /// The start state of the automaton.
    pub fn start(&self) -> &NState {
        &self.start
    }

    /// The automaton accepting exactly the one-symbol word `symbol`.
    /// The epsilon symbol yields the automaton accepting only the empty word.
    pub fn atomic(symbol: impl Into<Symbol>) -> Self {
        Self::from_state(NState::atom(symbol.into()))
    }

    /// The automaton accepting no word at all.
    pub fn empty() -> Self {
        Self::from_state(NState::leaf(false))
    }

    /// The automaton accepting only the empty word.
    pub fn epsilon() -> Self {
        Self::from_state(NState::leaf(true))
    }

    /// Returns true if the automaton is backed by a minimal deterministic automaton.
    pub fn is_deterministic(&self) -> bool {
        self.start.is_deterministic()
    }

    /// The automaton accepting the words accepted by either automaton.
    ///
    /// If both operands are deterministic, the result is the minimized product automaton.
    /// Otherwise, the result is a new start state that branches to both start states by epsilon transitions.
    pub fn union(&self, other: &Automaton) -> Result<Automaton> {
        if self.is_deterministic() && other.is_deterministic() {
            self.product(other, ProductMode::Union)
        } else {
            Ok(Self::from_state(NState::branch(
                false,
                vec![self.start.clone(), other.start.clone()],
            )))
        }
    }

    /// The automaton accepting the words accepted by both automata.
    /// Both operands are minimized first and the product automaton is minimized again.
    pub fn intersection(&self, other: &Automaton) -> Result<Automaton> {
        self.product(other, ProductMode::Intersection)
    }

    fn product(&self, other: &Automaton, mode: ProductMode) -> Result<Automaton> {
        let cancel = CancelToken::default();
        let left = self.minimize()?.into_state();
        let right = other.minimize()?.into_state();
        let product = inter::product(&left, &right, mode);
        Ok(min::minimize(&product, &cancel)?.into())
    }

    /// The automaton accepting every word `uv` where `u` is accepted by `self` and `v` by `other`.
    pub fn concatenate(&self, other: &Automaton) -> Automaton {
        Self::concatenate_all([self, other])
    }

    /// The concatenation of all given automata in order.
    /// The concatenation of no automata accepts only the empty word.
    pub fn concatenate_all<'a>(automata: impl IntoIterator<Item = &'a Automaton>) -> Automaton {
        let starts: Vec<NState> = automata.into_iter().map(|a| a.start.clone()).collect();
        Self::from_state(NState::sequence(&starts))
    }

    /// The automaton accepting one or more repetitions of words of this automaton.
    pub fn kleene_plus(&self) -> Automaton {
        Self::from_state(NState::plus(self.start.clone()))
    }

    /// The automaton accepting zero or more repetitions of words of this automaton.
    pub fn kleene_star(&self) -> Automaton {
        self.kleene_plus().optional()
    }

    /// The automaton accepting the empty word and the words of this automaton.
    /// If this automaton already accepts the empty word, it is returned unchanged.
    /// A deterministic automaton stays deterministic.
    pub fn optional(&self) -> Automaton {
        if self.start.is_final() {
            return self.clone();
        }
        if let NState::Det(m) = &self.start {
            // Minimizing cannot fail, the token is never cancelled.
            if let Ok(dfa) = min::minimize(&prefix::optional(m), &CancelToken::default()) {
                return dfa.into();
            }
        }
        Self::from_state(NState::branch(true, vec![self.start.clone()]))
    }

    /// The automaton accepting between `min` and `max` repetitions of words of this automaton.
    ///
    /// Returns an error if `min` exceeds `max`.
    /// The copies are counted by a single state decorator instead of being unfolded, so large bounds are cheap to build.
    pub fn repeat(&self, min: u32, max: u32) -> Result<Automaton> {
        if min > max {
            return Err(AutomatonError::Construction { min, max });
        }
        Ok(Self::from_state(NState::repeat(self.start.clone(), min, max)))
    }

    /// The automaton accepting every word over `alphabet` that this automaton rejects.
    ///
    /// Returns [`AutomatonError::AlphabetMismatch`] if this automaton uses a symbol outside of `alphabet`.
    pub fn negate(&self, alphabet: &Alphabet) -> Result<Automaton> {
        let cancel = CancelToken::default();
        let dfa = self.minimize()?.into_state();
        let negated = comp::negate(&dfa, alphabet)?;
        Ok(min::minimize(&negated, &cancel)?.into())
    }

    /// The automaton accepting every prefix of a word of this automaton.
    pub fn prefix_closure(&self) -> Result<Automaton> {
        let cancel = CancelToken::default();
        let closed = prefix::prefix_closure(&self.minimize()?.into_state(), &cancel)?;
        Ok(min::minimize(&closed, &cancel)?.into())
    }

    /// Returns the start state of a deterministic automaton accepting the same language.
    /// The subset construction is lazy: deterministic states are created as they are visited.
    pub fn determinize(&self) -> Result<DState<NState>> {
        det::determinize(&self.start, &CancelToken::default())
    }

    /// Returns the minimal deterministic automaton accepting the same language.
    pub fn minimize(&self) -> Result<MinimalDfa> {
        match &self.start {
            NState::Det(m) if m.index() == 0 => Ok(m.dfa().clone()),
            start => min::minimize_nfa(start, &CancelToken::default()),
        }
    }

    /// Returns true if the automaton accepts the word.
    pub fn accepts(&self, word: &[Symbol]) -> bool {
        accepts(&self.start, word)
    }

    /// Returns the set of symbols used by transitions reachable from the start state.
    pub fn alphabet(&self) -> Result<Alphabet> {
        match &self.start {
            NState::Det(m) => Ok(m.alphabet().as_ref().clone()),
            start => reachable_alphabet(start, &CancelToken::default()),
        }
    }

    /// Returns some word accepted by the automaton, or `None` if its language is empty.
    pub fn find_word(&self) -> Result<Option<Word>> {
        let cancel = CancelToken::default();
        query::find_accepted_word(&self.minimize()?.into_state(), &cancel)
    }

    /// Returns true if both automata accept the same language.
    pub fn equivalent(&self, other: &Automaton) -> Result<bool> {
        Ok(self.word_difference(other)?.is_none())
    }

    /// Returns a word accepted by exactly one of the two automata, or `None` if their languages are equal.
    pub fn word_difference(&self, other: &Automaton) -> Result<Option<Word>> {
        let cancel = CancelToken::default();
        query::find_word_difference(
            &self.minimize()?.into_state(),
            &other.minimize()?.into_state(),
            &cancel,
        )
    }

    /// Returns a regular expression for the language of the automaton.
    /// The automaton is minimized first; see [`crate::re::synthesize`] for the rendering.
    pub fn to_regex(&self) -> Result<String> {
        let cancel = CancelToken::default();
        crate::re::synthesize(&self.minimize()?, &cancel)
    }

    /// Returns the labeled graph of the minimal deterministic automaton without its rejecting sink.
    pub fn to_labeled_graph(&self) -> Result<LabeledGraph> {
        graph::to_labeled_graph(&self.minimize()?)
    }
}

impl From<MinimalDfa> for Automaton {
    fn from(dfa: MinimalDfa) -> Self {
        Self::from_state(NState::Det(dfa.into_state()))
    }
}

impl From<Symbol> for Automaton {
    fn from(symbol: Symbol) -> Self {
        Self::atomic(symbol)
    }
}

impl Display for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_regex() {
            Ok(re) => write!(f, "{}", re),
            Err(e) => write!(f, "<{}>", e),
        }
    }
}
