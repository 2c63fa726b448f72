//! Complete deterministic automata and their language algebra.
//!
//! Every [`Automaton`] is immutable: operations build a fresh automaton and
//! minimise it before returning, so two automata for the same language over
//! the same alphabet always have the same number of states.

use crate::alphabet::{Alphabet, Symbol};
use crate::budget::{Budget, Unbounded, unbounded};
use crate::nfa::Nfa;
use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// A complete DFA over an [`Alphabet`].
///
/// The transition table is stored row-major with one row per state and one
/// column per symbol index, so every state has exactly one successor for
/// every symbol.
#[derive(Clone, Debug)]
pub struct Automaton {
    alphabet: Arc<Alphabet>,
    accepting: Vec<bool>,
    transitions: Vec<usize>,
    start: usize,
}

impl Automaton {
    /// The automaton accepting no strings at all.
    pub fn empty(alphabet: impl Into<Arc<Alphabet>>) -> Self {
        let alphabet = alphabet.into();
        let width = alphabet.symbol_count();
        Self::from_table(alphabet, vec![false], vec![0; width], 0)
    }

    /// The automaton accepting only the empty string.
    pub fn epsilon(alphabet: impl Into<Arc<Alphabet>>) -> Self {
        let alphabet = alphabet.into();
        let width = alphabet.symbol_count();
        Self::from_table(alphabet, vec![true, false], vec![1; width * 2], 0)
    }

    /// The automaton accepting every string over the alphabet.
    pub fn universal(alphabet: impl Into<Arc<Alphabet>>) -> Self {
        let alphabet = alphabet.into();
        let width = alphabet.symbol_count();
        Self::from_table(alphabet, vec![true], vec![0; width], 0)
    }

    /// Accepts exactly the one-symbol strings whose symbol index is listed.
    /// Out-of-range indices are ignored.
    pub fn symbols<I>(alphabet: impl Into<Arc<Alphabet>>, symbols: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let alphabet = alphabet.into();
        let width = alphabet.symbol_count();
        let mut transitions = vec![2; width * 3];
        for symbol in symbols {
            if symbol < width {
                transitions[symbol] = 1;
            }
        }
        Self::from_table(alphabet, vec![false, true, false], transitions, 0).minimized()
    }

    pub(crate) fn from_table(
        alphabet: Arc<Alphabet>,
        accepting: Vec<bool>,
        transitions: Vec<usize>,
        start: usize,
    ) -> Self {
        debug_assert_eq!(transitions.len(), accepting.len() * alphabet.symbol_count());
        Self {
            alphabet,
            accepting,
            transitions,
            start,
        }
    }

    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    pub fn state_count(&self) -> usize {
        self.accepting.len()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn is_accepting(&self, state: usize) -> bool {
        self.accepting.get(state).copied().unwrap_or(false)
    }

    /// Successor of `state` on the symbol with index `symbol`.
    pub fn next(&self, state: usize, symbol: usize) -> usize {
        self.transitions[state * self.alphabet.symbol_count() + symbol]
    }

    /// Whole-string acceptance. Characters missing from the alphabet are
    /// read as [`Symbol::Other`].
    pub fn accepts(&self, input: &str) -> bool {
        let state = input
            .chars()
            .fold(self.start, |state, ch| self.next(state, self.alphabet.classify(ch)));
        self.accepting[state]
    }

    /// Whole-string acceptance over symbol indices.
    pub fn accepts_symbols(&self, input: &[usize]) -> bool {
        let width = self.alphabet.symbol_count();
        let mut state = self.start;
        for &symbol in input {
            if symbol >= width {
                return false;
            }
            state = self.next(state, symbol);
        }
        self.accepting[state]
    }

    /// The non-accepting sink state, if the automaton has one.
    pub(crate) fn dead_state(&self) -> Option<usize> {
        let width = self.alphabet.symbol_count();
        (0..self.state_count()).find(|&state| {
            !self.accepting[state] && (0..width).all(|symbol| self.next(state, symbol) == state)
        })
    }

    pub fn union(&self, other: &Self) -> Self {
        unbounded(self.union_within(other, &Unbounded))
    }

    pub fn intersection(&self, other: &Self) -> Self {
        unbounded(self.intersection_within(other, &Unbounded))
    }

    pub fn difference(&self, other: &Self) -> Self {
        unbounded(self.difference_within(other, &Unbounded))
    }

    pub fn symmetric_difference(&self, other: &Self) -> Self {
        unbounded(self.product(other, &Unbounded, |a, b| a != b))
    }

    /// [`Automaton::union`] that gives up once the product construction
    /// outgrows `budget`.
    pub fn union_within<B: Budget>(&self, other: &Self, budget: &B) -> Result<Self, B::Error> {
        self.product(other, budget, |a, b| a || b)
    }

    pub fn intersection_within<B: Budget>(
        &self,
        other: &Self,
        budget: &B,
    ) -> Result<Self, B::Error> {
        self.product(other, budget, |a, b| a && b)
    }

    pub fn difference_within<B: Budget>(
        &self,
        other: &Self,
        budget: &B,
    ) -> Result<Self, B::Error> {
        self.product(other, budget, |a, b| a && !b)
    }

    /// Complement relative to the automaton's own alphabet.
    pub fn complement(&self) -> Self {
        Self {
            alphabet: self.alphabet.clone(),
            accepting: self.accepting.iter().map(|accepts| !accepts).collect(),
            transitions: self.transitions.clone(),
            start: self.start,
        }
    }

    pub fn concatenate(&self, other: &Self) -> Self {
        unbounded(self.concatenate_within(other, &Unbounded))
    }

    /// Kleene star.
    pub fn star(&self) -> Self {
        unbounded(self.star_within(&Unbounded))
    }

    /// [`Automaton::concatenate`] that gives up once the subset construction
    /// outgrows `budget`.
    pub fn concatenate_within<B: Budget>(
        &self,
        other: &Self,
        budget: &B,
    ) -> Result<Self, B::Error> {
        let (head, tail) = self.unify(other);
        let mut nfa = Nfa::new(head.alphabet.symbol_count());
        let first = nfa.embed(&head);
        let second = nfa.embed(&tail);
        nfa.set_start(first.start);
        for &state in &first.finals {
            nfa.add_epsilon(state, second.start);
        }
        for &state in &second.finals {
            nfa.mark_accept(state);
        }
        nfa.determinize(head.alphabet.clone(), budget)
    }

    pub fn star_within<B: Budget>(&self, budget: &B) -> Result<Self, B::Error> {
        let mut nfa = Nfa::new(self.alphabet.symbol_count());
        let entry = nfa.add_state();
        nfa.set_start(entry);
        nfa.mark_accept(entry);
        let body = nfa.embed(self);
        nfa.add_epsilon(entry, body.start);
        for &state in &body.finals {
            nfa.add_epsilon(state, entry);
        }
        nfa.determinize(self.alphabet.clone(), budget)
    }

    /// `self` concatenated with itself `count` times; `count == 0` yields
    /// the empty-string automaton.
    pub fn repeat(&self, count: u32) -> Self {
        (0..count).fold(Self::epsilon(self.alphabet.clone()), |acc, _| {
            acc.concatenate(self)
        })
    }

    /// `self | ε`.
    pub fn optional(&self) -> Self {
        self.union(&Self::epsilon(self.alphabet.clone()))
    }

    pub fn is_empty(&self) -> bool {
        self.shortest_match().is_none()
    }

    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.intersection(other).is_empty()
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        self.difference(other).is_empty()
    }

    /// Language equality.
    pub fn equivalent(&self, other: &Self) -> bool {
        self.symmetric_difference(other).is_empty()
    }

    /// A shortest accepted string, found breadth-first. Listed characters
    /// are preferred over [`Symbol::Other`] at every step.
    pub fn shortest_match(&self) -> Option<Vec<Symbol>> {
        let width = self.alphabet.symbol_count();
        let mut parent: Vec<Option<(usize, usize)>> = vec![None; self.state_count()];
        let mut seen = vec![false; self.state_count()];
        let mut queue = VecDeque::from([self.start]);
        seen[self.start] = true;

        while let Some(state) = queue.pop_front() {
            if self.accepting[state] {
                let mut path = Vec::new();
                let mut cursor = state;
                while let Some((prev, symbol)) = parent[cursor] {
                    path.push(self.alphabet.symbol(symbol));
                    cursor = prev;
                }
                path.reverse();
                return Some(path);
            }
            for symbol in 0..width {
                let next = self.next(state, symbol);
                if !seen[next] {
                    seen[next] = true;
                    parent[next] = Some((state, symbol));
                    queue.push_back(next);
                }
            }
        }
        None
    }

    /// Re-expresses the automaton over a superset alphabet. A character that
    /// was absent before was read as `Other`, so it keeps using the `Other`
    /// column.
    fn lift(&self, alphabet: &Arc<Alphabet>) -> Cow<'_, Self> {
        if Arc::ptr_eq(&self.alphabet, alphabet) || self.alphabet == *alphabet {
            return Cow::Borrowed(self);
        }
        debug_assert!(alphabet.is_superset_of(&self.alphabet));
        let columns: Vec<usize> = alphabet
            .symbols()
            .map(|symbol| match symbol {
                Symbol::Char(ch) => self.alphabet.classify(ch),
                Symbol::Other => self.alphabet.other(),
            })
            .collect();
        let mut transitions = Vec::with_capacity(self.state_count() * columns.len());
        for state in 0..self.state_count() {
            transitions.extend(columns.iter().map(|&column| self.next(state, column)));
        }
        Cow::Owned(Self::from_table(
            alphabet.clone(),
            self.accepting.clone(),
            transitions,
            self.start,
        ))
    }

    fn unify<'a>(&'a self, other: &'a Self) -> (Cow<'a, Self>, Cow<'a, Self>) {
        if Arc::ptr_eq(&self.alphabet, &other.alphabet) || self.alphabet == other.alphabet {
            return (Cow::Borrowed(self), Cow::Borrowed(other));
        }
        let alphabet = Arc::new(self.alphabet.union(&other.alphabet));
        (self.lift(&alphabet), other.lift(&alphabet))
    }

    /// Reachable product construction; `accept` decides finality from the
    /// finality of the two component states. `budget` sees the number of
    /// pairs discovered so far.
    fn product<B: Budget>(
        &self,
        other: &Self,
        budget: &B,
        accept: impl Fn(bool, bool) -> bool,
    ) -> Result<Self, B::Error> {
        let (left, right) = self.unify(other);
        let width = left.alphabet.symbol_count();
        let origin = (left.start, right.start);
        let mut index: HashMap<(usize, usize), usize> = HashMap::from([(origin, 0)]);
        let mut pairs = vec![origin];
        let mut accepting = Vec::new();
        let mut transitions = Vec::new();

        let mut cursor = 0;
        while cursor < pairs.len() {
            let (a, b) = pairs[cursor];
            accepting.push(accept(left.accepting[a], right.accepting[b]));
            for symbol in 0..width {
                let target = (left.next(a, symbol), right.next(b, symbol));
                let id = match index.get(&target) {
                    Some(&id) => id,
                    None => {
                        let id = pairs.len();
                        index.insert(target, id);
                        pairs.push(target);
                        budget.admit(pairs.len())?;
                        id
                    }
                };
                transitions.push(id);
            }
            cursor += 1;
        }

        Ok(Self::from_table(left.alphabet.clone(), accepting, transitions, 0).minimized())
    }

    /// Drops unreachable states and merges equivalent ones by partition
    /// refinement. States are renumbered in breadth-first order from the
    /// start, which therefore becomes state `0`.
    pub(crate) fn minimized(self) -> Self {
        let width = self.alphabet.symbol_count();

        let mut local = vec![usize::MAX; self.state_count()];
        let mut reachable = vec![self.start];
        local[self.start] = 0;
        let mut cursor = 0;
        while cursor < reachable.len() {
            let state = reachable[cursor];
            for symbol in 0..width {
                let next = self.next(state, symbol);
                if local[next] == usize::MAX {
                    local[next] = reachable.len();
                    reachable.push(next);
                }
            }
            cursor += 1;
        }

        let mut blocks: Vec<usize> = reachable
            .iter()
            .map(|&state| usize::from(self.accepting[state]))
            .collect();
        let any_accepting = blocks.iter().any(|&block| block == 1);
        let any_rejecting = blocks.iter().any(|&block| block == 0);
        let mut count = usize::from(any_accepting) + usize::from(any_rejecting);

        loop {
            let mut signatures: HashMap<(usize, Vec<usize>), usize> = HashMap::new();
            let mut refined = Vec::with_capacity(reachable.len());
            for (idx, &state) in reachable.iter().enumerate() {
                let row: Vec<usize> = (0..width)
                    .map(|symbol| blocks[local[self.next(state, symbol)]])
                    .collect();
                let fresh = signatures.len();
                refined.push(*signatures.entry((blocks[idx], row)).or_insert(fresh));
            }
            blocks = refined;
            if signatures.len() == count {
                break;
            }
            count = signatures.len();
        }

        let mut accepting = vec![false; count];
        let mut transitions = vec![0; count * width];
        let mut filled = vec![false; count];
        for (idx, &state) in reachable.iter().enumerate() {
            let block = blocks[idx];
            if filled[block] {
                continue;
            }
            filled[block] = true;
            accepting[block] = self.accepting[state];
            for symbol in 0..width {
                transitions[block * width + symbol] = blocks[local[self.next(state, symbol)]];
            }
        }

        Self::from_table(self.alphabet, accepting, transitions, blocks[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Arc<Alphabet> {
        Arc::new(Alphabet::new("abc".chars()))
    }

    #[test]
    fn minimisation_merges_equivalent_states() {
        let alphabet = abc();
        // Two accepting states that behave identically.
        let width = alphabet.symbol_count();
        let mut transitions = vec![3; width * 4];
        transitions[0] = 1;
        transitions[1] = 2;
        let raw = Automaton::from_table(alphabet, vec![false, true, true, false], transitions, 0);
        let min = raw.minimized();
        assert_eq!(min.state_count(), 3);
        assert!(min.accepts("a"));
        assert!(min.accepts("b"));
        assert!(!min.accepts("c"));
        assert_eq!(min.start(), 0);
    }

    #[test]
    fn minimisation_drops_unreachable_states() {
        let alphabet = abc();
        let width = alphabet.symbol_count();
        let transitions = vec![0; width * 2];
        let raw = Automaton::from_table(alphabet, vec![false, true], transitions, 0);
        let min = raw.minimized();
        assert_eq!(min.state_count(), 1);
        assert!(min.is_empty());
    }

    #[test]
    fn dead_state_is_detected() {
        let single = Automaton::symbols(abc(), [0]);
        assert_eq!(single.state_count(), 3);
        let dead = single.dead_state().expect("dead state");
        assert!(!single.is_accepting(dead));
        assert_eq!(Automaton::universal(abc()).dead_state(), None);
    }
}
