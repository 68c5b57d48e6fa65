//! A parser for the regular expressions produced by [`super::synthesize`].
//!
//! The grammar, from loosest to tightest binding:
//!
//! ```text
//! union   := concat ('|' concat)*
//! concat  := postfix*
//! postfix := atom ('*' | '+' | '?' | '{' n '}' | '{' n ',' '}' | '{' n ',' m '}')*
//! atom    := '(' union ')' | 'ε' | '∅' | '<' label '>' | char
//! ```
//!
//! Inside angle brackets, `\` escapes the next character.
//! An empty concatenation denotes the empty word.

use crate::{Automaton, AutomatonError, Result, Symbol};

/// Parses a regular expression into an automaton accepting its language.
///
/// Errors report the position as the index of the offending character.
///
/// # Examples
/// ```
/// use relang::{re::parse, word};
/// let aut = parse("(ab)*|<open>c?").unwrap();
/// assert!(aut.accepts(&word(["a", "b", "a", "b"])));
/// assert!(aut.accepts(&word(["open"])));
/// assert!(!aut.accepts(&word(["a"])));
/// ```
pub fn parse(input: &str) -> Result<Automaton> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
    };
    let aut = parser.union()?;
    match parser.peek() {
        None => Ok(aut),
        Some(c) => Err(parser.error(format!("unexpected '{}'", c))),
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn error(&self, message: impl Into<String>) -> AutomatonError {
        AutomatonError::Syntax {
            position: self.pos,
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn union(&mut self) -> Result<Automaton> {
        let mut aut = self.concat()?;
        while self.peek() == Some('|') {
            self.pos += 1;
            let rhs = self.concat()?;
            aut = aut.union(&rhs)?;
        }
        Ok(aut)
    }

    fn concat(&mut self) -> Result<Automaton> {
        let mut parts = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            parts.push(self.postfix()?);
        }
        Ok(Automaton::concatenate_all(&parts))
    }

    fn postfix(&mut self) -> Result<Automaton> {
        let mut aut = self.atom()?;
        while let Some(c) = self.peek() {
            aut = match c {
                '*' => aut.kleene_star(),
                '+' => aut.kleene_plus(),
                '?' => aut.optional(),
                '{' => {
                    let start = self.pos;
                    self.pos += 1;
                    let (min, max) = self.bounds()?;
                    let bounded = match max {
                        Some(max) => aut.repeat(min, max),
                        None => aut
                            .repeat(min, min)
                            .map(|fixed| fixed.concatenate(&aut.kleene_star())),
                    };
                    // Report invalid bounds at the opening brace
                    aut = bounded.map_err(|e| match e {
                        AutomatonError::Construction { .. } => AutomatonError::Syntax {
                            position: start,
                            message: e.to_string(),
                        },
                        e => e,
                    })?;
                    continue;
                }
                _ => break,
            };
            self.pos += 1;
        }
        Ok(aut)
    }

    /// Parses the bounds of a counted repetition after the opening brace, including the closing brace.
    fn bounds(&mut self) -> Result<(u32, Option<u32>)> {
        let min = self.number()?;
        let max = match self.peek() {
            Some(',') => {
                self.pos += 1;
                if self.peek() == Some('}') {
                    None
                } else {
                    Some(self.number()?)
                }
            }
            _ => Some(min),
        };
        self.expect('}')?;
        Ok((min, max))
    }

    fn number(&mut self) -> Result<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected a number"));
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits.parse().map_err(|_| AutomatonError::Syntax {
            position: start,
            message: format!("repetition bound {} is too large", digits),
        })
    }

    fn atom(&mut self) -> Result<Automaton> {
        let start = self.pos;
        match self.next() {
            Some('(') => {
                let aut = self.union()?;
                self.expect(')')?;
                Ok(aut)
            }
            Some('ε') => Ok(Automaton::epsilon()),
            Some('∅') => Ok(Automaton::empty()),
            Some('<') => self.label().map(Automaton::atomic),
            Some(c @ (')' | '|' | '*' | '+' | '?' | '{' | '}' | '>' | '\\')) => {
                Err(AutomatonError::Syntax {
                    position: start,
                    message: format!("unexpected '{}'", c),
                })
            }
            Some(c) => Ok(Automaton::atomic(c)),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// Parses a delimited label after the opening angle bracket, including the closing bracket.
    fn label(&mut self) -> Result<Symbol> {
        let mut label = String::new();
        loop {
            match self.next() {
                Some('>') => break,
                Some('\\') => match self.next() {
                    Some(c) => label.push(c),
                    None => return Err(self.error("unterminated escape")),
                },
                Some(c) => label.push(c),
                None => return Err(self.error("unterminated label, expected '>'")),
            }
        }
        if label.is_empty() {
            return Err(self.error("empty label"));
        }
        Ok(Symbol::new(label))
    }
}
