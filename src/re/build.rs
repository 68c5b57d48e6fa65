use smallvec::smallvec;

use super::*;
use std::collections::{BTreeSet, HashMap};

/// A builder for regular expressions that constructs unique regex instances.
/// It is the only way to create regex instances.
///
/// The constructors simplify their arguments on the fly.
/// Simplification never changes the denoted language; it only aims at shorter renderings.
#[derive(Debug)]
pub struct ReBuilder {
    registry: Registry,

    /* base expressions */
    re_empty: Regex,
    re_epsilon: Regex,
}

impl Default for ReBuilder {
    fn default() -> Self {
        let mut registry = Registry::new();
        let re_empty = registry.intern(ReOp::Empty);
        let re_epsilon = registry.intern(ReOp::Symbol(Symbol::Epsilon));
        Self {
            registry,
            re_empty,
            re_epsilon,
        }
    }
}

impl ReBuilder {
    fn intern(&mut self, regex: ReOp) -> Regex {
        self.registry.intern(regex)
    }

    /// Constructs a regular expression denoting the empty word.
    pub fn epsilon(&self) -> Regex {
        self.re_epsilon.clone()
    }

    /// Constructs a regular expression denoting the empty set.
    pub fn empty(&self) -> Regex {
        self.re_empty.clone()
    }

    /// Constructs a regular expression denoting the one-symbol word `symbol`.
    pub fn symbol(&mut self, symbol: Symbol) -> Regex {
        if symbol.is_epsilon() {
            self.epsilon()
        } else {
            self.intern(ReOp::Symbol(symbol))
        }
    }

    /// Constructs a regular expression denoting the concatenation of the given regular expressions.
    ///
    /// The empty set absorbs the concatenation and the empty word is dropped.
    /// Nested concatenations are flattened.
    /// Adjacent repetitions of the same base are folded into one, adding their bounds, e.g. `a{1,2}a*` becomes `a+`.
    pub fn concat(&mut self, rs: SmallVec<[Regex; 2]>) -> Regex {
        if rs.iter().any(|r| r.is_empty_set()) {
            return self.empty();
        }
        let flat = rs
            .into_iter()
            .filter(|r| !r.is_epsilon())
            .flat_map(|r| {
                if let ReOp::Concat(rs) = r.op() {
                    rs.clone()
                } else {
                    smallvec![r]
                }
            })
            .collect_vec();

        let mut terms: SmallVec<[Regex; 2]> = SmallVec::new();
        for r in flat {
            let mut current = r;
            while let Some(last) = terms.last() {
                match self.fold_adjacent(last, &current) {
                    Some(folded) => {
                        terms.pop();
                        current = folded;
                    }
                    None => break,
                }
            }
            if let ReOp::Concat(rs) = current.op() {
                terms.extend(rs.iter().cloned());
            } else {
                terms.push(current);
            }
        }

        match terms.len() {
            0 => self.epsilon(),
            1 => terms[0].clone(),
            _ => self.intern(ReOp::Concat(terms)),
        }
    }

    /// Folds `x{a,b}x{c,d}` into `x{a+c,b+d}`.
    fn fold_adjacent(&mut self, left: &Regex, right: &Regex) -> Option<Regex> {
        let (lbase, lmin, lmax) = left.as_repetition();
        let (rbase, rmin, rmax) = right.as_repetition();
        if lbase != rbase {
            return None;
        }
        let max = lmax.zip(rmax).map(|(l, r)| l.saturating_add(r));
        Some(self.repeat(lbase, lmin.saturating_add(rmin), max))
    }

    /// Constructs a regular expression denoting the union of the given regular expressions.
    ///
    /// The empty set is dropped, nested unions are flattened and duplicates are removed.
    /// Repetitions of the same base with touching ranges are merged, e.g. `a|a{2,3}` becomes `a{1,3}`.
    /// The empty word is dropped if another member already accepts it.
    /// Otherwise it turns a member `x{1,b}` into `x{0,b}`, or makes the whole union optional.
    pub fn union(&mut self, rs: SmallVec<[Regex; 2]>) -> Regex {
        // Collect into a set to deduplicate and make the order deterministic
        #[allow(clippy::mutable_key_type)]
        let mut set: BTreeSet<Regex> = rs
            .into_iter()
            .filter(|r| !r.is_empty_set())
            .flat_map(|r| {
                if let ReOp::Union(rs) = r.op() {
                    rs.clone()
                } else {
                    smallvec![r]
                }
            })
            .collect();
        let with_epsilon = set.remove(&self.re_epsilon);
        let mut terms: SmallVec<[Regex; 2]> = set.into_iter().collect();

        if self.merge_repetitions(&mut terms) {
            if with_epsilon {
                terms.push(self.epsilon());
            }
            return self.union(terms);
        }

        if with_epsilon && !terms.iter().any(|r| r.nullable()) {
            if terms.is_empty() {
                return self.epsilon();
            }
            let once = terms.iter().position(|r| r.as_repetition().1 == 1);
            return match once {
                Some(i) => {
                    let (base, _, max) = terms[i].as_repetition();
                    terms[i] = self.repeat(base, 0, max);
                    self.union(terms)
                }
                None => {
                    let inner = self.union(terms);
                    self.opt(inner)
                }
            };
        }

        match terms.len() {
            0 => self.empty(),
            1 => terms[0].clone(),
            _ => self.intern(ReOp::Union(terms)),
        }
    }

    /// Merges the first pair of repetitions over the same base whose ranges touch.
    /// Returns true if a pair was merged.
    fn merge_repetitions(&mut self, terms: &mut SmallVec<[Regex; 2]>) -> bool {
        for i in 0..terms.len() {
            for j in (i + 1)..terms.len() {
                let (ibase, imin, imax) = terms[i].as_repetition();
                let (jbase, jmin, jmax) = terms[j].as_repetition();
                if ibase != jbase || !touches(imin, imax, jmin, jmax) {
                    continue;
                }
                let max = imax.zip(jmax).map(|(a, b)| a.max(b));
                let merged = self.repeat(ibase, imin.min(jmin), max);
                terms.remove(j);
                terms[i] = merged;
                return true;
            }
        }
        false
    }

    /// Constructs a regular expression denoting between `min` and `max` repetitions of `r`.
    /// An absent maximum means unbounded. Invalid bounds denote the empty set.
    ///
    /// Nested repetitions are collapsed where the result is again a single repetition, e.g. `(a*)+` becomes `a*` and `(a{2}){3}` becomes `a{6}`.
    pub fn repeat(&mut self, r: Regex, min: u32, max: Option<u32>) -> Regex {
        if max.is_some_and(|max| min > max) {
            return self.empty();
        }
        if max == Some(0) {
            return self.epsilon();
        }
        if r.is_empty_set() {
            return if min == 0 { self.epsilon() } else { self.empty() };
        }
        if r.is_epsilon() {
            return self.epsilon();
        }
        if (min, max) == (1, Some(1)) {
            return r;
        }
        if let ReOp::Repeat(x, a, b) = r.op() {
            let (x, a, b) = (x.clone(), *a, *b);
            match (a, b) {
                // (x*){min,max} is x*
                (0, None) => return r,
                // (x+){min,max} is x* if min is 0 and x{min,} otherwise
                (1, None) => return self.repeat(x, min, None),
                // (x{a}){n} is x{a*n}
                (a, Some(b)) if a == b && max == Some(min) => {
                    return self.repeat(x, a.saturating_mul(min), Some(b.saturating_mul(min)))
                }
                // (x{0,b})* and (x{1,b})* are x*
                (0..=1, _) if (min, max) == (0, None) => return self.repeat(x, 0, None),
                // (x{1,b})? is x{0,b}
                (1, b) if (min, max) == (0, Some(1)) => return self.repeat(x, 0, b),
                _ => {}
            }
        }
        if r.nullable() && (min, max) == (0, Some(1)) {
            return r;
        }
        self.intern(ReOp::Repeat(r, min, max))
    }

    /// Constructs `r*`.
    pub fn star(&mut self, r: Regex) -> Regex {
        self.repeat(r, 0, None)
    }

    /// Constructs `r+`.
    pub fn plus(&mut self, r: Regex) -> Regex {
        self.repeat(r, 1, None)
    }

    /// Constructs `r?`.
    pub fn opt(&mut self, r: Regex) -> Regex {
        self.repeat(r, 0, Some(1))
    }
}

/// Returns whether the ranges `[amin, amax]` and `[bmin, bmax]` overlap or are adjacent.
fn touches(amin: u32, amax: Option<u32>, bmin: u32, bmax: Option<u32>) -> bool {
    let reaches = |max: Option<u32>, min: u32| max.map_or(true, |max| min <= max.saturating_add(1));
    reaches(amax, bmin) && reaches(bmax, amin)
}

#[derive(Debug)]
struct Registry {
    /// Stores the unique instances of `Regex`.
    registry: HashMap<ReOp, Regex>,
    /// The id to assign to the next regex.
    next_id: usize,
}

impl Registry {
    fn new() -> Self {
        Registry {
            registry: HashMap::new(),
            next_id: 0,
        }
    }

    /// Interns a regex pattern, ensuring each unique regex is stored and reused.
    fn intern(&mut self, op: ReOp) -> Regex {
        if let Some(existing) = self.registry.get(&op) {
            existing.clone()
        } else {
            let re = Rc::new(ReNode::new(self.next_id, op.clone()));
            self.next_id += 1;
            self.registry.insert(op, re.clone());
            re
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sym(b: &mut ReBuilder, l: &str) -> Regex {
        b.symbol(Symbol::new(l))
    }

    #[test]
    fn test_interning() {
        let mut b = ReBuilder::default();
        let a1 = sym(&mut b, "a");
        let a2 = sym(&mut b, "a");
        assert!(Rc::ptr_eq(&a1, &a2));
        assert_eq!(b.symbol(Symbol::Epsilon), b.epsilon());
    }

    #[test]
    fn test_concat_identities() {
        let mut b = ReBuilder::default();
        let a = sym(&mut b, "a");
        let eps = b.epsilon();
        let empty = b.empty();
        assert_eq!(b.concat(smallvec![a.clone(), eps.clone()]), a);
        assert_eq!(b.concat(smallvec![a.clone(), empty.clone()]), empty);
        assert_eq!(b.concat(smallvec![]), eps);
    }

    #[test]
    fn test_concat_flattens() {
        let mut b = ReBuilder::default();
        let a = sym(&mut b, "a");
        let c = sym(&mut b, "c");
        let ac = b.concat(smallvec![a.clone(), c.clone()]);
        let aca = b.concat(smallvec![ac, a.clone()]);
        match aca.op() {
            ReOp::Concat(rs) => assert_eq!(rs.len(), 3),
            _ => unreachable!(),
        }
        assert_eq!(aca.to_string(), "aca");
    }

    #[test]
    fn test_concat_folds_repetitions() {
        let mut b = ReBuilder::default();
        let a = sym(&mut b, "a");
        let a_star = b.star(a.clone());
        assert_eq!(b.concat(smallvec![a.clone(), a_star.clone()]), b.plus(a.clone()));
        assert_eq!(b.concat(smallvec![a_star.clone(), a_star.clone()]), a_star);
        let aaa = b.concat(smallvec![a.clone(), a.clone(), a.clone()]);
        assert_eq!(aaa, b.repeat(a.clone(), 3, Some(3)));
        let opt = b.opt(a.clone());
        let folded = b.concat(smallvec![opt.clone(), a.clone(), opt]);
        assert_eq!(folded, b.repeat(a, 1, Some(3)));
    }

    #[test]
    fn test_union_identities() {
        let mut b = ReBuilder::default();
        let a = sym(&mut b, "a");
        let empty = b.empty();
        assert_eq!(b.union(smallvec![a.clone(), empty.clone()]), a);
        assert_eq!(b.union(smallvec![a.clone(), a.clone()]), a);
        assert_eq!(b.union(smallvec![]), empty);
    }

    #[test]
    fn test_union_is_ordered() {
        let mut b = ReBuilder::default();
        let a = sym(&mut b, "a");
        let c = sym(&mut b, "c");
        assert_eq!(
            b.union(smallvec![a.clone(), c.clone()]),
            b.union(smallvec![c, a])
        );
    }

    #[test]
    fn test_union_with_epsilon() {
        let mut b = ReBuilder::default();
        let a = sym(&mut b, "a");
        let eps = b.epsilon();
        let a_star = b.star(a.clone());
        assert_eq!(b.union(smallvec![a.clone(), eps.clone()]), b.opt(a.clone()));
        assert_eq!(b.union(smallvec![a_star.clone(), eps.clone()]), a_star);
        let a_plus = b.plus(a.clone());
        assert_eq!(b.union(smallvec![a_plus, eps.clone()]), a_star);
        assert_eq!(b.union(smallvec![eps.clone(), eps.clone()]), eps);
    }

    #[test]
    fn test_union_merges_touching_ranges() {
        let mut b = ReBuilder::default();
        let a = sym(&mut b, "a");
        let a23 = b.repeat(a.clone(), 2, Some(3));
        let merged = b.union(smallvec![a.clone(), a23.clone()]);
        assert_eq!(merged, b.repeat(a.clone(), 1, Some(3)));
        let a5 = b.repeat(a.clone(), 5, Some(5));
        let apart = b.union(smallvec![a.clone(), a5]);
        assert!(matches!(apart.op(), ReOp::Union(_)));
    }

    #[test]
    fn test_repeat_collapses() {
        let mut b = ReBuilder::default();
        let a = sym(&mut b, "a");
        let a_star = b.star(a.clone());
        let a_plus = b.plus(a.clone());
        assert_eq!(b.star(a_star.clone()), a_star);
        assert_eq!(b.plus(a_star.clone()), a_star);
        assert_eq!(b.star(a_plus.clone()), a_star);
        assert_eq!(b.opt(a_plus.clone()), a_star);
        assert_eq!(b.repeat(a_plus, 2, Some(3)), b.repeat(a.clone(), 2, None));
        let a2 = b.repeat(a.clone(), 2, Some(2));
        assert_eq!(b.repeat(a2, 3, Some(3)), b.repeat(a.clone(), 6, Some(6)));
        let opt = b.opt(a.clone());
        assert_eq!(b.opt(opt.clone()), opt);
        assert_eq!(b.star(opt), a_star);
        assert_eq!(b.repeat(a.clone(), 1, Some(1)), a);
    }

    #[test]
    fn test_repeat_trivial() {
        let mut b = ReBuilder::default();
        let a = sym(&mut b, "a");
        let eps = b.epsilon();
        let empty = b.empty();
        assert_eq!(b.repeat(a.clone(), 0, Some(0)), eps);
        assert_eq!(b.star(empty.clone()), eps);
        assert_eq!(b.plus(empty.clone()), empty);
        assert_eq!(b.star(eps.clone()), eps);
        assert_eq!(b.repeat(a, 3, Some(2)), empty);
    }

    #[test]
    fn test_touches() {
        assert!(touches(1, Some(1), 2, Some(3)));
        assert!(touches(0, None, 5, Some(5)));
        assert!(!touches(1, Some(1), 3, Some(4)));
        assert!(touches(3, Some(4), 0, Some(2)));
    }
}
