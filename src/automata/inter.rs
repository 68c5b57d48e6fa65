//! Product automata of two deterministic automata.
//!
//! A product state pairs a state of each operand and moves both in lockstep.
//! Depending on the [`ProductMode`], it accepts if both or if either of the paired states accept.
//! An operand that has no successor on a symbol drops out of the pair and rejects from then on.

use std::{hash::Hash, rc::Rc};

use super::{follow_successors, Alphabet, DetState, State};
use crate::Symbol;

/// How the acceptance of the paired states is combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductMode {
    /// Accept if either state accepts. The alphabet is the union of both alphabets.
    Union,
    /// Accept if both states accept. The alphabet is the intersection of both alphabets.
    Intersection,
}

impl ProductMode {
    pub fn combine(self, left: bool, right: bool) -> bool {
        match self {
            ProductMode::Union => left || right,
            ProductMode::Intersection => left && right,
        }
    }

    fn alphabet(self, left: &Alphabet, right: &Alphabet) -> Alphabet {
        match self {
            ProductMode::Union => left.union(right).cloned().collect(),
            ProductMode::Intersection => left.intersection(right).cloned().collect(),
        }
    }
}

/// A state of a product automaton.
#[derive(Debug, Clone)]
pub struct Product<A, B> {
    left: Option<A>,
    right: Option<B>,
    mode: ProductMode,
    alphabet: Rc<Alphabet>,
}

impl<A, B> Product<A, B> {
    pub fn left(&self) -> Option<&A> {
        self.left.as_ref()
    }

    pub fn right(&self) -> Option<&B> {
        self.right.as_ref()
    }
}

impl<A: PartialEq, B: PartialEq> PartialEq for Product<A, B> {
    fn eq(&self, other: &Self) -> bool {
        self.left == other.left && self.right == other.right && self.mode == other.mode
    }
}

impl<A: Eq, B: Eq> Eq for Product<A, B> {}

impl<A: Hash, B: Hash> Hash for Product<A, B> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.left.hash(state);
        self.right.hash(state);
        self.mode.hash(state);
    }
}

impl<A: DetState, B: DetState> State for Product<A, B> {
    fn is_final(&self) -> bool {
        let left = self.left.as_ref().is_some_and(|q| q.is_final());
        let right = self.right.as_ref().is_some_and(|q| q.is_final());
        self.mode.combine(left, right)
    }

    fn defined_symbols(&self) -> Alphabet {
        self.alphabet.as_ref().clone()
    }

    fn successors(&self, symbol: &Symbol) -> Vec<Self> {
        follow_successors(self, symbol)
    }
}

impl<A: DetState, B: DetState> DetState for Product<A, B> {
    fn alphabet(&self) -> Rc<Alphabet> {
        self.alphabet.clone()
    }

    fn follow(&self, symbol: &Symbol) -> Option<Self> {
        if !self.alphabet.contains(symbol) {
            return None;
        }
        Some(Product {
            left: self.left.as_ref().and_then(|q| q.follow(symbol)),
            right: self.right.as_ref().and_then(|q| q.follow(symbol)),
            mode: self.mode,
            alphabet: self.alphabet.clone(),
        })
    }
}

/// The start state of the product of the deterministic automata starting in `left` and `right`.
pub fn product<A: DetState, B: DetState>(left: &A, right: &B, mode: ProductMode) -> Product<A, B> {
    let alphabet = mode.alphabet(&left.alphabet(), &right.alphabet());
    Product {
        left: Some(left.clone()),
        right: Some(right.clone()),
        mode,
        alphabet: Rc::new(alphabet),
    }
}

/// The product automaton accepting the words accepted by either automaton.
pub fn union<A: DetState, B: DetState>(left: &A, right: &B) -> Product<A, B> {
    product(left, right, ProductMode::Union)
}

/// The product automaton accepting the words accepted by both automata.
/// Its alphabet is the intersection of both alphabets, since no word using any other symbol can be accepted by both.
pub fn intersection<A: DetState, B: DetState>(left: &A, right: &B) -> Product<A, B> {
    product(left, right, ProductMode::Intersection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        automata::{accepts, minimize, Automaton, MinState},
        word, CancelToken,
    };

    fn dfa(a: &Automaton) -> MinState {
        a.minimize().unwrap().into_state()
    }

    #[test]
    fn test_combine() {
        assert!(ProductMode::Union.combine(true, false));
        assert!(!ProductMode::Union.combine(false, false));
        assert!(ProductMode::Intersection.combine(true, true));
        assert!(!ProductMode::Intersection.combine(true, false));
    }

    #[test]
    fn test_intersection() {
        let a_star = dfa(&Automaton::atomic("a").kleene_star());
        let aa = dfa(&Automaton::atomic("a").repeat(2, 2).unwrap());
        let p = intersection(&a_star, &aa);
        assert!(accepts(&p, &word(["a", "a"])));
        assert!(!accepts(&p, &word(["a"])));
        assert!(!accepts(&p, &[]));
    }

    #[test]
    fn test_intersection_alphabet() {
        let a = dfa(&Automaton::atomic("a"));
        let b = dfa(&Automaton::atomic("b"));
        let p = intersection(&a, &b);
        assert!(p.alphabet().is_empty());
        let m = minimize(&p, &CancelToken::default()).unwrap();
        assert_eq!(m.num_states(), 1);
        assert!(!m.is_final(0));
    }

    #[test]
    fn test_union_drops_fallen_off_operand() {
        let a = dfa(&Automaton::atomic("a"));
        let bb = dfa(&Automaton::atomic("b").concatenate(&Automaton::atomic("b")));
        let p = union(&a, &bb);
        assert_eq!(p.alphabet().len(), 2);
        let after_b = p.follow(&Symbol::new("b")).unwrap();
        assert!(after_b.left().is_none());
        assert!(after_b.right().is_some());
        assert!(accepts(&p, &word(["a"])));
        assert!(accepts(&p, &word(["b", "b"])));
        assert!(!accepts(&p, &word(["a", "b"])));
    }
}
