//! Complementation of a deterministic automaton relative to a total alphabet.
//! The complement accepts precisely those words over the alphabet that are not accepted by the original automaton.

use std::{hash::Hash, rc::Rc};

use super::{follow_successors, Alphabet, DetState, State};
use crate::{AutomatonError, Result, Symbol};

/// A state of the complement of a deterministic automaton.
///
/// The wrapped state is absent once the original automaton has fallen off its transitions, either because a state has no successor or because the symbol is not part of the original alphabet.
/// The absent state accepts and loops to itself on every symbol.
#[derive(Debug, Clone)]
pub struct Negated<D> {
    inner: Option<D>,
    alphabet: Rc<Alphabet>,
}

impl<D> Negated<D> {
    /// The wrapped state of the original automaton, if it has not been left yet.
    pub fn inner(&self) -> Option<&D> {
        self.inner.as_ref()
    }
}

// The alphabet is shared by all states of a complement and does not take part in equality.
impl<D: PartialEq> PartialEq for Negated<D> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<D: Eq> Eq for Negated<D> {}

impl<D: Hash> Hash for Negated<D> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<D: DetState> State for Negated<D> {
    fn is_final(&self) -> bool {
        !self.inner.as_ref().is_some_and(|q| q.is_final())
    }

    fn defined_symbols(&self) -> Alphabet {
        self.alphabet.as_ref().clone()
    }

    fn successors(&self, symbol: &Symbol) -> Vec<Self> {
        follow_successors(self, symbol)
    }
}

impl<D: DetState> DetState for Negated<D> {
    fn alphabet(&self) -> Rc<Alphabet> {
        self.alphabet.clone()
    }

    fn follow(&self, symbol: &Symbol) -> Option<Self> {
        if !self.alphabet.contains(symbol) {
            return None;
        }
        Some(Negated {
            inner: self.inner.as_ref().and_then(|q| q.follow(symbol)),
            alphabet: self.alphabet.clone(),
        })
    }
}

/// Computes the complement of the deterministic automaton starting in `start` with respect to `alphabet`.
///
/// The result accepts every word over `alphabet` that the original automaton rejects.
/// Returns [`AutomatonError::AlphabetMismatch`] if the original automaton uses a symbol that is not part of `alphabet`.
pub fn negate<D: DetState>(start: &D, alphabet: &Alphabet) -> Result<Negated<D>> {
    if alphabet.contains(&Symbol::Epsilon) {
        return Err(AutomatonError::InternalInvariant(
            "a total alphabet cannot contain epsilon".to_string(),
        ));
    }
    let missing: Vec<Symbol> = start.alphabet().difference(alphabet).cloned().collect();
    if !missing.is_empty() {
        return Err(AutomatonError::AlphabetMismatch { missing });
    }
    Ok(Negated {
        inner: Some(start.clone()),
        alphabet: Rc::new(alphabet.clone()),
    })
}
