//! Finite automata over symbolic alphabets.
//!
//! Automata are built from atomic [`Symbol`]s with the combinators of [`automata::Automaton`].
//! Nondeterministic automata are lazy views over state graphs that are composed, never copied.
//! They can be determinized, minimized, compared for language equivalence, searched for accepted words,
//! and turned back into a regular expression.

pub mod automata;
mod cancel;
mod error;
pub mod re;
#[cfg(feature = "sampling")]
pub mod sampling;

use std::{fmt::Display, rc::Rc};

pub use automata::Automaton;
pub use cancel::CancelToken;
pub use error::{AutomatonError, Result};

/// A token of an alphabet.
///
/// A symbol is either an opaque label or the distinguished [`Symbol::Epsilon`] that denotes a transition that does not consume any input.
/// Labels are compared and hashed by value.
/// Cloning a symbol is cheap, the label is shared.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// The empty transition. Never part of an alphabet.
    Epsilon,
    /// An input symbol.
    Label(Rc<str>),
}

impl Symbol {
    /// Create a new symbol with the given label.
    ///
    /// # Examples
    /// ```
    /// use relang::Symbol;
    /// let a = Symbol::new("a");
    /// assert_eq!(a.label(), Some("a"));
    /// assert!(!a.is_epsilon());
    /// ```
    pub fn new(label: impl AsRef<str>) -> Self {
        Symbol::Label(Rc::from(label.as_ref()))
    }

    /// Returns true if this is the empty transition symbol.
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }

    /// Returns the label of the symbol, or `None` for epsilon.
    pub fn label(&self) -> Option<&str> {
        match self {
            Symbol::Epsilon => None,
            Symbol::Label(l) => Some(l),
        }
    }

    /// Returns whether the label can be written without delimiters in a regular expression.
    /// That is the case for labels that consist of exactly one alphanumeric character other than `ε`,
    /// which would read as the empty word.
    fn is_bare(&self) -> bool {
        match self {
            Symbol::Epsilon => false,
            Symbol::Label(l) => {
                let mut chars = l.chars();
                matches!(
                    (chars.next(), chars.next()),
                    (Some(c), None) if c.is_alphanumeric() && c != 'ε'
                )
            }
        }
    }

    /// Renders the symbol the way it appears in a regular expression.
    ///
    /// Single alphanumeric characters are written as they are, epsilon is written as `ε`.
    /// The label `ε` is delimited so that it is not mistaken for epsilon.
    /// Every other label is enclosed in angle brackets, with `>` and `\` escaped by a backslash.
    ///
    /// # Examples
    /// ```
    /// use relang::Symbol;
    /// assert_eq!(Symbol::new("a").escape(), "a");
    /// assert_eq!(Symbol::new("send").escape(), "<send>");
    /// assert_eq!(Symbol::new("a>b").escape(), "<a\\>b>");
    /// assert_eq!(Symbol::Epsilon.escape(), "ε");
    /// ```
    pub fn escape(&self) -> String {
        match self {
            Symbol::Epsilon => "ε".to_string(),
            Symbol::Label(l) if self.is_bare() => l.to_string(),
            Symbol::Label(l) => {
                let mut escaped = String::with_capacity(l.len() + 2);
                escaped.push('<');
                for c in l.chars() {
                    if c == '>' || c == '\\' {
                        escaped.push('\\');
                    }
                    escaped.push(c);
                }
                escaped.push('>');
                escaped
            }
        }
    }
}

impl From<&str> for Symbol {
    fn from(label: &str) -> Self {
        Symbol::new(label)
    }
}

impl From<String> for Symbol {
    fn from(label: String) -> Self {
        Symbol::Label(Rc::from(label))
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Symbol::new(c.to_string())
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Epsilon => write!(f, "ε"),
            Symbol::Label(l) => write!(f, "{}", l),
        }
    }
}

/// A word is a finite sequence of symbols.
/// Words never contain [`Symbol::Epsilon`].
pub type Word = Vec<Symbol>;

/// Creates a word from a sequence of labels.
///
/// # Examples
/// ```
/// use relang::{word, Symbol};
/// let w = word(["a", "b"]);
/// assert_eq!(w, vec![Symbol::new("a"), Symbol::new("b")]);
/// ```
pub fn word<I, T>(labels: I) -> Word
where
    I: IntoIterator<Item = T>,
    T: Into<Symbol>,
{
    labels.into_iter().map(Into::into).collect()
}

/// Renders a word as a space separated list of its labels.
pub fn display_word(word: &[Symbol]) -> String {
    use itertools::Itertools;
    word.iter().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_equality_by_value() {
        let a1 = Symbol::new("a");
        let a2: Symbol = String::from("a").into();
        assert_eq!(a1, a2);
        assert_ne!(a1, Symbol::new("b"));
        assert_ne!(a1, Symbol::Epsilon);
    }

    #[test]
    fn epsilon_orders_first() {
        assert!(Symbol::Epsilon < Symbol::new("a"));
        assert!(Symbol::new("a") < Symbol::new("b"));
    }

    #[test]
    fn escape_bare_and_delimited() {
        assert_eq!(Symbol::new("x").escape(), "x");
        assert_eq!(Symbol::new("7").escape(), "7");
        assert_eq!(Symbol::new("*").escape(), "<*>");
        assert_eq!(Symbol::new("").escape(), "<>");
        assert_eq!(Symbol::new("a\\b").escape(), "<a\\\\b>");
        assert_eq!(Symbol::new("ε").escape(), "<ε>");
        assert_ne!(Symbol::new("ε").escape(), Symbol::Epsilon.escape());
    }

    #[test]
    fn label_of_epsilon() {
        assert_eq!(Symbol::Epsilon.label(), None);
        assert_eq!(Symbol::from('q').label(), Some("q"));
    }

    #[test]
    fn word_from_labels() {
        let w = word(["a", "b", "a"]);
        assert_eq!(w.len(), 3);
        assert_eq!(display_word(&w), "a b a");
        assert_eq!(display_word(&[]), "");
    }
}
