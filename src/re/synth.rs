//! Conversion of minimal automata into regular expressions by state elimination.
//!
//! The automaton is written as a matrix of regular expressions, where entry `(i, j)` describes the words that lead from state `i` to state `j` in one step.
//! Eliminating a state `k` adds to every entry `(i, j)` the paths that go through `k`, i.e., `M[i][k] M[k][k]* M[k][j]`.
//! Diagonal entries always accept the empty word.
//! After all states are eliminated, entry `(0, f)` describes all words leading from the start state to `f`.
//! The size of the result depends on the elimination order, so two orders are tried and the shorter rendering is kept.

use log::debug;
use smallvec::smallvec;

use super::{ReBuilder, Regex};
use crate::{automata::MinimalDfa, CancelToken, Result};

/// Returns a regular expression for the language of a minimal automaton.
///
/// States are eliminated once in ascending and once in descending order, and the shorter rendering is returned.
/// On a tie, the ascending order wins.
/// The cancellation token is polled once per eliminated state.
pub fn synthesize(dfa: &MinimalDfa, cancel: &CancelToken) -> Result<String> {
    let n = dfa.num_states();
    let forward: Vec<usize> = (0..n).collect();
    let backward: Vec<usize> = (0..n).rev().collect();
    let first = eliminate(dfa, &forward, cancel)?.to_string();
    let second = eliminate(dfa, &backward, cancel)?.to_string();
    debug!(
        "synthesized expressions of length {} (ascending) and {} (descending) from {} states",
        first.chars().count(),
        second.chars().count(),
        n
    );
    if second.chars().count() < first.chars().count() {
        Ok(second)
    } else {
        Ok(first)
    }
}

/// Eliminates all states in the given order and returns the expression for the paths from the start state into a final state.
fn eliminate(dfa: &MinimalDfa, order: &[usize], cancel: &CancelToken) -> Result<Regex> {
    let mut builder = ReBuilder::default();
    let n = dfa.num_states();

    let mut table: Vec<Vec<Regex>> = vec![vec![builder.empty(); n]; n];
    for (i, row) in table.iter_mut().enumerate() {
        let mut labels: Vec<Vec<Regex>> = vec![vec![]; n];
        // Every state reaches itself without reading anything
        labels[i].push(builder.epsilon());
        for (a, symbol) in dfa.symbols().iter().enumerate() {
            let symbol = builder.symbol(symbol.clone());
            labels[dfa.successor(i, a)].push(symbol);
        }
        for (entry, labels) in row.iter_mut().zip(labels) {
            *entry = builder.union(labels.into_iter().collect());
        }
    }

    for &k in order {
        cancel.check()?;
        let through = builder.star(table[k][k].clone());
        let column: Vec<Regex> = table.iter().map(|row| row[k].clone()).collect();
        let row = table[k].clone();
        for (i, into_k) in column.iter().enumerate() {
            if into_k.is_empty_set() {
                continue;
            }
            for (j, from_k) in row.iter().enumerate() {
                if from_k.is_empty_set() {
                    continue;
                }
                // M[k][k] accepts the empty word, so paths that start or end in k absorb the old entry
                table[i][j] = match (i == k, j == k) {
                    (true, true) => through.clone(),
                    (true, false) => builder.concat(smallvec![through.clone(), from_k.clone()]),
                    (false, true) => builder.concat(smallvec![into_k.clone(), through.clone()]),
                    (false, false) => {
                        let path = builder.concat(smallvec![
                            into_k.clone(),
                            through.clone(),
                            from_k.clone()
                        ]);
                        builder.union(smallvec![table[i][j].clone(), path])
                    }
                };
            }
        }
    }

    let accepted = dfa.finals().map(|f| table[0][f].clone()).collect();
    Ok(builder.union(accepted))
}
