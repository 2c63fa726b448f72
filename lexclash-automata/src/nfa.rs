use crate::alphabet::Alphabet;
use crate::bitset::Bitset;
use crate::budget::Budget;
use crate::dfa::Automaton;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
struct NfaState {
    accepting: bool,
    transitions: Vec<(usize, usize)>,
    epsilons: Vec<usize>,
}

/// Thompson-style NFA with epsilon edges. Concatenation and star are
/// spliced together here and then handed back to the DFA world through
/// [`Nfa::determinize`].
pub(crate) struct Nfa {
    width: usize,
    states: Vec<NfaState>,
    start: usize,
}

/// Entry point and accepting states of an automaton copied into an [`Nfa`].
pub(crate) struct Fragment {
    pub(crate) start: usize,
    pub(crate) finals: Vec<usize>,
}

impl Nfa {
    pub(crate) fn new(width: usize) -> Self {
        Self {
            width,
            states: Vec::new(),
            start: 0,
        }
    }

    pub(crate) fn add_state(&mut self) -> usize {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }

    pub(crate) fn set_start(&mut self, state: usize) {
        self.start = state;
    }

    pub(crate) fn mark_accept(&mut self, state: usize) {
        if let Some(entry) = self.states.get_mut(state) {
            entry.accepting = true;
        }
    }

    pub(crate) fn add_transition(&mut self, from: usize, symbol: usize, to: usize) {
        self.states[from].transitions.push((symbol, to));
    }

    pub(crate) fn add_epsilon(&mut self, from: usize, to: usize) {
        self.states[from].epsilons.push(to);
    }

    /// Copies every state of `dfa` into this NFA. Edges into the dead state
    /// are dropped; a missing edge already means rejection here.
    pub(crate) fn embed(&mut self, dfa: &Automaton) -> Fragment {
        let offset = self.states.len();
        let dead = dfa.dead_state();
        let mut finals = Vec::new();
        for _ in 0..dfa.state_count() {
            self.add_state();
        }
        for state in 0..dfa.state_count() {
            if dfa.is_accepting(state) {
                finals.push(offset + state);
            }
            for symbol in 0..self.width {
                let target = dfa.next(state, symbol);
                if Some(target) != dead {
                    self.add_transition(offset + state, symbol, offset + target);
                }
            }
        }
        Fragment {
            start: offset + dfa.start(),
            finals,
        }
    }

    fn close(&self, set: &mut Bitset) {
        let mut stack: Vec<usize> = set.iter().collect();
        while let Some(state) = stack.pop() {
            for &next in &self.states[state].epsilons {
                if set.insert(next) {
                    stack.push(next);
                }
            }
        }
    }

    /// Subset construction. The resulting automaton is complete (the empty
    /// subset becomes the dead state) and minimised. `budget` sees the
    /// number of subsets discovered so far.
    pub(crate) fn determinize<B: Budget>(
        &self,
        alphabet: Arc<Alphabet>,
        budget: &B,
    ) -> Result<Automaton, B::Error> {
        debug_assert_eq!(alphabet.symbol_count(), self.width);
        let state_count = self.states.len();

        let mut start = Bitset::new(state_count);
        start.insert(self.start);
        self.close(&mut start);

        let mut index: HashMap<Bitset, usize> = HashMap::new();
        index.insert(start.clone(), 0);
        let mut subsets = vec![start];
        let mut accepting = Vec::new();
        let mut transitions = Vec::new();

        let mut cursor = 0;
        while cursor < subsets.len() {
            let mut moves = vec![Bitset::new(state_count); self.width];
            let mut accepts = false;
            for state in subsets[cursor].iter() {
                let entry = &self.states[state];
                accepts |= entry.accepting;
                for &(symbol, to) in &entry.transitions {
                    moves[symbol].insert(to);
                }
            }
            accepting.push(accepts);

            for mut target in moves {
                self.close(&mut target);
                let id = match index.get(&target) {
                    Some(&id) => id,
                    None => {
                        let id = subsets.len();
                        index.insert(target.clone(), id);
                        subsets.push(target);
                        budget.admit(subsets.len())?;
                        id
                    }
                };
                transitions.push(id);
            }
            cursor += 1;
        }

        log::trace!(
            "determinized {} NFA states into {} subsets",
            state_count,
            subsets.len()
        );
        Ok(Automaton::from_table(alphabet, accepting, transitions, 0).minimized())
    }
}
