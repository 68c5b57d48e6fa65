//! Generators of small random automata and words for property tests.

use quickcheck::{Arbitrary, Gen};

use super::{Alphabet, Automaton};
use crate::{Symbol, Word};

const LABELS: [&str; 3] = ["a", "b", "c"];

/// The alphabet all generated automata and words are drawn from.
pub fn sigma() -> Alphabet {
    LABELS.iter().map(Symbol::new).collect()
}

/// The automaton accepting every word over [`sigma`].
pub fn sigma_star() -> Automaton {
    let mut any = Automaton::empty();
    for l in LABELS {
        any = any.union(&Automaton::atomic(l)).unwrap();
    }
    any.kleene_star()
}

fn label(g: &mut Gen) -> Symbol {
    Symbol::new(g.choose(&LABELS).unwrap())
}

/// A regular expression syntax tree, built into an automaton with the combinators of [`Automaton`].
#[derive(Clone, Debug)]
pub enum Expr {
    Sym(Symbol),
    Eps,
    Empty,
    Union(Box<Expr>, Box<Expr>),
    Concat(Box<Expr>, Box<Expr>),
    Star(Box<Expr>),
    Plus(Box<Expr>),
    Opt(Box<Expr>),
    Repeat(Box<Expr>, u32, u32),
}

impl Expr {
    pub fn build(&self) -> Automaton {
        match self {
            Expr::Sym(s) => Automaton::atomic(s.clone()),
            Expr::Eps => Automaton::epsilon(),
            Expr::Empty => Automaton::empty(),
            Expr::Union(l, r) => l.build().union(&r.build()).unwrap(),
            Expr::Concat(l, r) => l.build().concatenate(&r.build()),
            Expr::Star(e) => e.build().kleene_star(),
            Expr::Plus(e) => e.build().kleene_plus(),
            Expr::Opt(e) => e.build().optional(),
            Expr::Repeat(e, min, max) => e.build().repeat(*min, *max).unwrap(),
        }
    }

    fn generate(g: &mut Gen, depth: usize) -> Self {
        let choice = if depth == 0 {
            u8::arbitrary(g) % 8
        } else {
            u8::arbitrary(g) % 16
        };
        let sub = |g: &mut Gen| Box::new(Expr::generate(g, depth - 1));
        match choice {
            0..=5 => Expr::Sym(label(g)),
            6 => Expr::Eps,
            7 => Expr::Empty,
            8 | 9 => Expr::Union(sub(g), sub(g)),
            10 | 11 => Expr::Concat(sub(g), sub(g)),
            12 => Expr::Star(sub(g)),
            13 => Expr::Plus(sub(g)),
            14 => Expr::Opt(sub(g)),
            _ => {
                let min = u32::arbitrary(g) % 3;
                let max = min + u32::arbitrary(g) % 2;
                Expr::Repeat(sub(g), min, max)
            }
        }
    }
}

impl Arbitrary for Expr {
    fn arbitrary(g: &mut Gen) -> Self {
        Expr::generate(g, 3)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            Expr::Union(l, r) | Expr::Concat(l, r) => {
                Box::new(vec![l.as_ref().clone(), r.as_ref().clone()].into_iter())
            }
            Expr::Star(e) | Expr::Plus(e) | Expr::Opt(e) | Expr::Repeat(e, _, _) => {
                Box::new(std::iter::once(e.as_ref().clone()))
            }
            _ => quickcheck::empty_shrinker(),
        }
    }
}

/// A short word over [`sigma`].
#[derive(Clone, Debug)]
pub struct TestWord(pub Word);

impl Arbitrary for TestWord {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 6;
        TestWord((0..len).map(|_| label(g)).collect())
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let word = self.0.clone();
        Box::new((0..word.len()).map(move |i| {
            let mut shorter = word.clone();
            shorter.remove(i);
            TestWord(shorter)
        }))
    }
}
