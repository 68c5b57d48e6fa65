//! Random sampling of accepted words.

use rand::{seq::IteratorRandom, Rng};

use crate::{automata::MinimalDfa, Result, Word};

/// The result of sampling from an automaton.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SampleResult {
    /// Found a word in the language
    Sampled(Word),
    /// The language tried to sample from is empty
    Empty,
    /// The maximal length was reached without finding a word.
    MaxDepth,
}

impl SampleResult {
    /// Return true if sampling was successful and this result carries a word.
    pub fn success(&self) -> bool {
        matches!(self, SampleResult::Sampled(_))
    }

    /// Returns the sampled word, if any.
    pub fn word(self) -> Option<Word> {
        match self {
            SampleResult::Sampled(w) => Some(w),
            _ => None,
        }
    }
}

/// Samples a word accepted by the minimal automaton by a random walk from the start state.
///
/// Each step picks one of the symbols that does not lead into the rejecting sink uniformly at random.
/// In a final state, the walk stops with probability one half, or always if no symbol leads anywhere else than the sink.
/// Since every state of a minimal automaton other than the sink can reach a final state, the walk never gets stuck.
/// If no final state is reached within `max_len` symbols, the result is [`SampleResult::MaxDepth`].
pub fn sample_word<R: Rng>(
    dfa: &MinimalDfa,
    max_len: usize,
    rng: &mut R,
) -> Result<SampleResult> {
    let sink = dfa.sink()?;
    if sink == Some(0) {
        return Ok(SampleResult::Empty);
    }

    let mut word = Word::new();
    let mut state = 0;
    loop {
        let live = (0..dfa.symbols().len())
            .filter(move |&a| Some(dfa.successor(state, a)) != sink);
        let next = if word.len() < max_len {
            live.choose(rng)
        } else {
            None
        };
        if dfa.is_final(state) && (next.is_none() || rng.random_bool(0.5)) {
            return Ok(SampleResult::Sampled(word));
        }
        match next {
            Some(a) => {
                word.push(dfa.symbols()[a].clone());
                state = dfa.successor(state, a);
            }
            None => return Ok(SampleResult::MaxDepth),
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{automata::testing::Expr, word, Automaton};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn sample(a: &Automaton, max_len: usize) -> SampleResult {
        sample_word(&a.minimize().unwrap(), max_len, &mut rng()).unwrap()
    }

    #[test]
    fn test_sample_atomic() {
        let a = Automaton::atomic("a");
        assert_eq!(sample(&a, 10), SampleResult::Sampled(word(["a"])));
    }

    #[test]
    fn test_sample_empty_language() {
        assert_eq!(sample(&Automaton::empty(), 10), SampleResult::Empty);
        assert_eq!(sample(&Automaton::empty(), 0), SampleResult::Empty);
    }

    #[test]
    fn test_sample_epsilon() {
        assert_eq!(sample(&Automaton::epsilon(), 0), SampleResult::Sampled(vec![]));
    }

    #[test]
    fn test_sample_stops_at_max_len() {
        let aaa = Automaton::atomic("a").repeat(3, 3).unwrap();
        assert_eq!(sample(&aaa, 2), SampleResult::MaxDepth);
        assert_eq!(sample(&aaa, 3), SampleResult::Sampled(word(["a", "a", "a"])));
    }

    #[test]
    fn test_sample_multiple_paths() {
        let ab = Automaton::atomic("a").concatenate(&Automaton::atomic("b"));
        let xy = Automaton::atomic("x").concatenate(&Automaton::atomic("y"));
        let aut = ab.union(&xy).unwrap();
        let w = sample(&aut, 10).word().unwrap();
        assert!(w == word(["a", "b"]) || w == word(["x", "y"]));
    }

    #[test]
    fn test_sample_leaves_loops() {
        let aut = Automaton::atomic("a")
            .kleene_star()
            .concatenate(&Automaton::atomic("b"));
        let mut rng = rng();
        let dfa = aut.minimize().unwrap();
        for _ in 0..20 {
            match sample_word(&dfa, 100, &mut rng).unwrap() {
                SampleResult::Sampled(w) => assert!(aut.accepts(&w)),
                SampleResult::MaxDepth => (),
                SampleResult::Empty => unreachable!("language is not empty"),
            }
        }
    }

    #[quickcheck]
    fn sampled_words_are_accepted(x: Expr, seed: u64) -> bool {
        let x = x.build();
        let dfa = x.minimize().unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        match sample_word(&dfa, 8, &mut rng).unwrap() {
            SampleResult::Sampled(w) => x.accepts(&w),
            SampleResult::Empty => x.find_word().unwrap().is_none(),
            SampleResult::MaxDepth => true,
        }
    }
}
