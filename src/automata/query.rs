//! Queries on the languages of deterministic automata.

use std::collections::HashSet;

use log::trace;

use super::{
    comp::{negate, Negated},
    inter::{intersection, union, Product},
    min::{minimize_nfa, MinimalDfa},
    Alphabet, DetState, State,
};
use crate::{CancelToken, Result, Symbol, Word};

/// Searches for some word accepted by the deterministic automaton starting in `start`.
///
/// The search is depth first and visits every state at most once, so it terminates on cyclic automata.
/// Symbols are tried in ascending order.
/// The word found is not necessarily the shortest one.
pub fn find_accepted_word<D: DetState>(start: &D, cancel: &CancelToken) -> Result<Option<Word>> {
    let symbols: Vec<Symbol> = start.alphabet().iter().cloned().collect();
    let mut visited = HashSet::new();
    visited.insert(start.clone());
    let mut stack = vec![(start.clone(), Word::new())];
    while let Some((state, word)) = stack.pop() {
        cancel.check()?;
        if state.is_final() {
            return Ok(Some(word));
        }
        for symbol in symbols.iter().rev() {
            if let Some(next) = state.follow(symbol) {
                if visited.insert(next.clone()) {
                    let mut extended = word.clone();
                    extended.push(symbol.clone());
                    stack.push((next, extended));
                }
            }
        }
    }
    Ok(None)
}

/// Searches for an accepted word that satisfies a predicate, pruning the search by a prefix predicate.
///
/// The automaton is determinized and minimized first, and paths into the rejecting sink are never followed.
/// The search extends a word only if the extension satisfies `prefix`, and returns the first accepted word that satisfies `word`.
///
/// The search keeps no set of visited states, since a state may be reached by different words that the predicates tell apart.
/// It only terminates if `prefix` rejects all sufficiently long words, or if an acceptable word is found.
pub fn find_predicate_word<S, P, W>(
    start: &S,
    prefix: P,
    word: W,
    cancel: &CancelToken,
) -> Result<Option<Word>>
where
    S: State,
    P: FnMut(&[Symbol]) -> bool,
    W: FnMut(&[Symbol]) -> bool,
{
    let dfa = minimize_nfa(start, cancel)?;
    search_minimal(&dfa, prefix, word, cancel)
}

/// Runs the predicate search of [`find_predicate_word`] on an already minimized automaton.
pub fn search_minimal<P, W>(
    dfa: &MinimalDfa,
    mut prefix: P,
    mut word: W,
    cancel: &CancelToken,
) -> Result<Option<Word>>
where
    P: FnMut(&[Symbol]) -> bool,
    W: FnMut(&[Symbol]) -> bool,
{
    let sink = dfa.sink()?;
    if sink == Some(0) {
        return Ok(None);
    }
    let mut stack = vec![(0, Word::new())];
    while let Some((state, current)) = stack.pop() {
        cancel.check()?;
        if dfa.is_final(state) && word(&current) {
            return Ok(Some(current));
        }
        for (idx, symbol) in dfa.symbols().iter().enumerate().rev() {
            let next = dfa.successor(state, idx);
            if Some(next) == sink {
                continue;
            }
            let mut extended = current.clone();
            extended.push(symbol.clone());
            if prefix(&extended) {
                stack.push((next, extended));
            } else {
                trace!("pruned prefix of length {}", extended.len());
            }
        }
    }
    Ok(None)
}

/// A state of the symmetric difference of two deterministic automata.
pub type Difference<A, B> = Product<Product<A, Negated<B>>, Product<Negated<A>, B>>;

/// Builds the automaton accepting the words accepted by exactly one of the two automata.
///
/// Both automata are complemented relative to the union of their alphabets, so the difference is taken over all words that either automaton can read.
pub fn difference<A: DetState, B: DetState>(left: &A, right: &B) -> Result<Difference<A, B>> {
    let alphabet: Alphabet = left.alphabet().union(&right.alphabet()).cloned().collect();
    let not_left = negate(left, &alphabet)?;
    let not_right = negate(right, &alphabet)?;
    Ok(union(
        &intersection(left, &not_right),
        &intersection(&not_left, right),
    ))
}

/// Returns a word accepted by exactly one of the two automata, or `None` if they accept the same language.
pub fn find_word_difference<A: DetState, B: DetState>(
    left: &A,
    right: &B,
    cancel: &CancelToken,
) -> Result<Option<Word>> {
    find_accepted_word(&difference(left, right)?, cancel)
}

/// Returns true if the two automata accept the same language.
pub fn language_equivalent<A: DetState, B: DetState>(
    left: &A,
    right: &B,
    cancel: &CancelToken,
) -> Result<bool> {
    Ok(find_word_difference(left, right, cancel)?.is_none())
}
