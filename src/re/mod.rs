//! Regular expressions over symbols.
//!
//! Regular expressions are used to describe the language of an automaton in a readable form.
//! They are built exclusively by the smart constructors of [`ReBuilder`], which simplify on the fly,
//! and rendered by their [`Display`] implementation.
//! [`synthesize`] turns a minimal automaton into a regular expression, and [`parse`] reads one back into an automaton.

mod build;
mod parse;
mod synth;

use std::{cell::RefCell, fmt::Display, hash::Hash, rc::Rc};

use itertools::Itertools;
use smallvec::SmallVec;

pub use build::ReBuilder;
pub use parse::parse;
pub use synth::synthesize;

use crate::Symbol;

pub type ReId = usize;

type LazyProp<T> = RefCell<Option<T>>;

/// A reference-counted regular expression.
///
/// Every `Regex` is a pointer to an immutable node interned by a [`ReBuilder`].
/// Identical sub-expressions are stored only once, which makes equality checks and hashing O(1).
pub type Regex = Rc<ReNode>;

/// A node in the syntax tree of a regular expression.
///
/// Every node has an identifier that is unique within the [`ReBuilder`] that created it.
/// Equality, ordering and hashing only look at the identifier.
#[derive(Debug, Clone)]
pub struct ReNode {
    id: ReId,
    op: ReOp,

    /// Whether the regular expression accepts the empty word.
    nullable: LazyProp<bool>,
    /// The rendered expression and its binding strength.
    rendered: LazyProp<(Rc<str>, Prec)>,
}

impl PartialEq for ReNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for ReNode {}
impl Hash for ReNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}
impl PartialOrd for ReNode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ReNode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl ReNode {
    fn new(id: ReId, op: ReOp) -> Self {
        Self {
            id,
            op,
            nullable: RefCell::new(None),
            rendered: RefCell::new(None),
        }
    }

    pub fn id(&self) -> ReId {
        self.id
    }

    pub fn op(&self) -> &ReOp {
        &self.op
    }

    /// Returns whether the regular expression accepts the empty word.
    pub fn nullable(&self) -> bool {
        *self
            .nullable
            .borrow_mut()
            .get_or_insert_with(|| self.op.nullable())
    }

    /// Returns true if this is the empty set.
    pub fn is_empty_set(&self) -> bool {
        matches!(self.op, ReOp::Empty)
    }

    /// Returns true if this denotes the empty word.
    pub fn is_epsilon(&self) -> bool {
        matches!(self.op, ReOp::Symbol(Symbol::Epsilon))
    }

    /// Returns the regex as a repetition of a base expression with bounds.
    /// Expressions that are not repetitions are returned as a single repetition of themselves.
    pub(crate) fn as_repetition(self: &Rc<Self>) -> (Regex, u32, Option<u32>) {
        match &self.op {
            ReOp::Repeat(r, min, max) => (r.clone(), *min, *max),
            _ => (self.clone(), 1, Some(1)),
        }
    }

    fn render(&self) -> (Rc<str>, Prec) {
        if let Some(r) = self.rendered.borrow().as_ref() {
            return r.clone();
        }
        let r = self.op.render();
        *self.rendered.borrow_mut() = Some(r.clone());
        r
    }

    /// Renders the expression so that it binds at least as strong as `prec`, adding parentheses if necessary.
    fn render_at(&self, prec: Prec) -> String {
        let (s, p) = self.render();
        if p < prec {
            format!("({})", s)
        } else {
            s.to_string()
        }
    }
}

impl Display for ReNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render().0)
    }
}

/// The operations that define a regular expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReOp {
    /// A single symbol. [`Symbol::Epsilon`] denotes the empty word.
    Symbol(Symbol),
    /// The empty set, which matches no word.
    Empty,
    /// The concatenation of two or more regular expressions.
    Concat(SmallVec<[Regex; 2]>),
    /// The union of two or more regular expressions.
    Union(SmallVec<[Regex; 2]>),
    /// Between `min` and `max` repetitions of a regular expression. An absent maximum means unbounded.
    Repeat(Regex, u32, Option<u32>),
}

/// The binding strength of a rendered expression, from loosest to tightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Union,
    Concat,
    Postfix,
    Atom,
}

impl ReOp {
    fn nullable(&self) -> bool {
        match self {
            ReOp::Symbol(s) => s.is_epsilon(),
            ReOp::Empty => false,
            ReOp::Concat(rs) => rs.iter().all(|r| r.nullable()),
            ReOp::Union(rs) => rs.iter().any(|r| r.nullable()),
            ReOp::Repeat(r, min, _) => *min == 0 || r.nullable(),
        }
    }

    fn render(&self) -> (Rc<str>, Prec) {
        let (s, p) = match self {
            ReOp::Symbol(s) => (s.escape(), Prec::Atom),
            ReOp::Empty => ("∅".to_string(), Prec::Atom),
            ReOp::Concat(rs) => (
                rs.iter().map(|r| r.render_at(Prec::Concat)).join(""),
                Prec::Concat,
            ),
            ReOp::Union(rs) => (
                rs.iter().map(|r| r.render_at(Prec::Concat)).join("|"),
                Prec::Union,
            ),
            ReOp::Repeat(r, min, max) => render_repeat(r, *min, *max),
        };
        (Rc::from(s), p)
    }
}

/// Renders a repetition either with a counted suffix or by writing out its copies, whichever is shorter.
/// On a tie the written out form is used.
fn render_repeat(r: &Regex, min: u32, max: Option<u32>) -> (String, Prec) {
    let atom = r.render_at(Prec::Atom);
    let counted = match (min, max) {
        (0, None) => format!("{}*", atom),
        (1, None) => format!("{}+", atom),
        (0, Some(1)) => format!("{}?", atom),
        (n, None) => format!("{}{{{},}}", atom, n),
        (n, Some(m)) if n == m => format!("{}{{{}}}", atom, n),
        (n, Some(m)) => format!("{}{{{},{}}}", atom, n, m),
    };
    let factor = r.render_at(Prec::Concat);
    let unrolled = match (min, max) {
        (0, None) | (1, None) | (0, Some(1)) => None,
        (n, None) => Some(format!("{}{}+", factor.repeat(n as usize - 1), atom)),
        (n, Some(m)) => Some(format!(
            "{}{}",
            factor.repeat(n as usize),
            format!("{}?", atom).repeat(m.saturating_sub(n) as usize)
        )),
    };
    match unrolled {
        Some(u) if u.chars().count() <= counted.chars().count() => (u, Prec::Concat),
        _ => (counted, Prec::Postfix),
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;

    fn sym(b: &mut ReBuilder, l: &str) -> Regex {
        b.symbol(Symbol::new(l))
    }

    #[test]
    fn test_render_symbols() {
        let mut b = ReBuilder::default();
        assert_eq!(sym(&mut b, "a").to_string(), "a");
        assert_eq!(sym(&mut b, "open").to_string(), "<open>");
        assert_eq!(b.empty().to_string(), "∅");
        assert_eq!(b.epsilon().to_string(), "ε");
    }

    #[test]
    fn test_render_precedence() {
        let mut b = ReBuilder::default();
        let a = sym(&mut b, "a");
        let bb = sym(&mut b, "b");
        let c = sym(&mut b, "c");
        let ab = b.concat(smallvec![a.clone(), bb.clone()]);
        let u = b.union(smallvec![ab.clone(), c.clone()]);
        // union members are ordered by creation
        assert_eq!(u.to_string(), "c|ab");
        let uc = b.concat(smallvec![u.clone(), c.clone()]);
        assert_eq!(uc.to_string(), "(c|ab)c");
        let star = b.star(ab);
        assert_eq!(star.to_string(), "(ab)*");
    }

    #[test]
    fn test_render_counted_repetitions() {
        let mut b = ReBuilder::default();
        let a = sym(&mut b, "a");
        let cases = [
            (0, None, "a*"),
            (1, None, "a+"),
            (0, Some(1), "a?"),
            (2, Some(2), "aa"),
            (3, Some(3), "aaa"),
            (4, Some(4), "aaaa"),
            (5, Some(5), "a{5}"),
            (1, Some(2), "aa?"),
            (2, None, "aa+"),
            (3, None, "aaa+"),
            (4, None, "aaaa+"),
            (5, None, "a{5,}"),
            (2, Some(5), "a{2,5}"),
        ];
        for (min, max, expected) in cases {
            assert_eq!(b.repeat(a.clone(), min, max).to_string(), expected);
        }
    }

    #[test]
    fn test_render_repetition_of_delimited_symbol() {
        let mut b = ReBuilder::default();
        let x = sym(&mut b, "xy");
        assert_eq!(b.repeat(x.clone(), 2, Some(2)).to_string(), "<xy>{2}");
        assert_eq!(b.plus(x).to_string(), "<xy>+");
    }

    #[test]
    fn test_nested_repetition_is_parenthesized() {
        let mut b = ReBuilder::default();
        let a = sym(&mut b, "a");
        let inner = b.repeat(a, 2, Some(3));
        let outer = b.repeat(inner.clone(), 2, Some(5));
        assert_eq!(inner.to_string(), "aaa?");
        assert_eq!(outer.to_string(), "(aaa?){2,5}");
    }

    #[test]
    fn test_nullable() {
        let mut b = ReBuilder::default();
        let a = sym(&mut b, "a");
        assert!(!a.nullable());
        assert!(b.epsilon().nullable());
        assert!(!b.empty().nullable());
        assert!(b.star(a.clone()).nullable());
        let eps = b.epsilon();
        assert!(b.union(smallvec![a.clone(), eps]).nullable());
    }
}
