//! Prefix closure and optionality of deterministic automata.

use std::rc::Rc;

use super::{follow_successors, min::minimize, Alphabet, DetState, MinState, State};
use crate::{CancelToken, Result, Symbol};

/// A state of the prefix closure of a minimal automaton.
///
/// In a minimal automaton, every state except the rejecting sink can reach an accepting state.
/// Making all of these states accepting yields an automaton for the set of prefixes of the original language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrefixClosed {
    inner: MinState,
    sink: Option<usize>,
}

impl State for PrefixClosed {
    fn is_final(&self) -> bool {
        self.sink != Some(self.inner.index())
    }

    fn defined_symbols(&self) -> Alphabet {
        self.inner.defined_symbols()
    }

    fn successors(&self, symbol: &Symbol) -> Vec<Self> {
        follow_successors(self, symbol)
    }
}

impl DetState for PrefixClosed {
    fn alphabet(&self) -> Rc<Alphabet> {
        self.inner.alphabet()
    }

    fn follow(&self, symbol: &Symbol) -> Option<Self> {
        self.inner.follow(symbol).map(|inner| PrefixClosed {
            inner,
            sink: self.sink,
        })
    }
}

/// Computes the prefix closure of the deterministic automaton starting in `start`.
/// The automaton is minimized first to find its unique rejecting sink.
pub fn prefix_closure<D: DetState>(start: &D, cancel: &CancelToken) -> Result<PrefixClosed> {
    let dfa = minimize(start, cancel)?;
    let sink = dfa.sink()?;
    Ok(PrefixClosed {
        inner: dfa.into_state(),
        sink,
    })
}

/// A state of a deterministic automaton that additionally accepts the empty word.
///
/// Only the start state is forced to accept.
/// Once a symbol is read, the automaton behaves exactly like the original one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DfaOptional<D> {
    Start(D),
    Inner(D),
}

impl<D> DfaOptional<D> {
    pub fn state(&self) -> &D {
        match self {
            DfaOptional::Start(q) | DfaOptional::Inner(q) => q,
        }
    }
}

impl<D: DetState> State for DfaOptional<D> {
    fn is_final(&self) -> bool {
        match self {
            DfaOptional::Start(_) => true,
            DfaOptional::Inner(q) => q.is_final(),
        }
    }

    fn defined_symbols(&self) -> Alphabet {
        self.state().defined_symbols()
    }

    fn successors(&self, symbol: &Symbol) -> Vec<Self> {
        follow_successors(self, symbol)
    }
}

impl<D: DetState> DetState for DfaOptional<D> {
    fn alphabet(&self) -> Rc<Alphabet> {
        self.state().alphabet()
    }

    fn follow(&self, symbol: &Symbol) -> Option<Self> {
        self.state().follow(symbol).map(DfaOptional::Inner)
    }
}

/// Makes the deterministic automaton starting in `start` accept the empty word.
/// If the start state already accepts, the automaton is unchanged.
pub fn optional<D: DetState>(start: &D) -> DfaOptional<D> {
    if start.is_final() {
        DfaOptional::Inner(start.clone())
    } else {
        DfaOptional::Start(start.clone())
    }
}
