use crate::compile::Builder;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::pattern::Pattern;
use crate::unify::shared_alphabet;
use lexclash_automata::{Automaton, Symbol};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// Two terminals whose languages overlap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collision<L> {
    pub left: L,
    pub right: L,
    /// A shortest string accepted by both terminals.
    pub witness: Vec<Symbol>,
}

impl<L> Collision<L> {
    /// The witness as text, with `Other` rendered as `<other>`.
    pub fn witness_text(&self) -> String {
        render(&self.witness)
    }
}

fn render(symbols: &[Symbol]) -> String {
    symbols.iter().map(Symbol::to_string).collect()
}

/// What [`CollisionDetector::detect`] found.
#[derive(Clone, Debug)]
pub struct Detection<L> {
    pub collisions: Vec<Collision<L>>,
    /// Terminals that failed to compile, in input order. They take no part
    /// in the pairwise checks.
    pub failures: Vec<(L, Error)>,
}

impl<L> Detection<L> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Finds every pair of terminals that can match the same string.
#[derive(Copy, Clone, Debug, Default)]
pub struct CollisionDetector {
    limits: Limits,
}

impl CollisionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self { limits }
    }

    /// Compiles every pattern over one shared alphabet and reports each
    /// overlapping pair `(i, j)` with `i < j`, ordered by `i` then `j`.
    ///
    /// Identical patterns are compiled once. Two labels with the same
    /// non-empty language collide with each other; a terminal is never
    /// paired with itself. A terminal that fails to compile is listed in
    /// [`Detection::failures`] under its label and the rest are still
    /// checked against each other.
    pub fn detect<L>(&self, terminals: &[(L, Pattern)]) -> Detection<L>
    where
        L: Clone + fmt::Debug,
    {
        let alphabet = Arc::new(shared_alphabet(terminals.iter().map(|(_, pattern)| pattern)));
        log::info!(
            "checking {} terminals over {} symbols",
            terminals.len(),
            alphabet.symbol_count()
        );
        let builder = Builder::new(alphabet).with_limits(self.limits);

        let mut slots: HashMap<&Pattern, Result<usize>> = HashMap::new();
        let mut automata = Vec::new();
        let mut compiled = Vec::with_capacity(terminals.len());
        let mut failures = Vec::new();
        for (label, pattern) in terminals {
            let slot = slots.entry(pattern).or_insert_with(|| {
                let automaton = builder.compile(pattern)?;
                automata.push(automaton);
                Ok(automata.len() - 1)
            });
            match slot {
                Ok(slot) => compiled.push((label, *slot)),
                Err(err) => {
                    log::debug!("terminal {:?} failed to compile: {}", label, err);
                    failures.push((label.clone(), err.clone()));
                }
            }
        }

        let mut unique = BTreeSet::new();
        for (i, &(_, a)) in compiled.iter().enumerate() {
            for &(_, b) in &compiled[i + 1..] {
                unique.insert((a.min(b), a.max(b)));
            }
        }
        let pairs: Vec<(usize, usize)> = unique.into_iter().collect();
        let witnesses: HashMap<(usize, usize), Option<Vec<Symbol>>> = pairs
            .iter()
            .copied()
            .zip(overlaps(&automata, &pairs))
            .collect();

        let mut collisions = Vec::new();
        for (i, &(left, a)) in compiled.iter().enumerate() {
            for &(right, b) in &compiled[i + 1..] {
                let Some(Some(witness)) = witnesses.get(&(a.min(b), a.max(b))) else {
                    continue;
                };
                log::debug!(
                    "{:?} collides with {:?} on {:?}",
                    left,
                    right,
                    render(witness)
                );
                collisions.push(Collision {
                    left: left.clone(),
                    right: right.clone(),
                    witness: witness.clone(),
                });
            }
        }
        log::info!(
            "found {} collisions among {} distinct patterns, {} terminals failed",
            collisions.len(),
            automata.len(),
            failures.len()
        );
        Detection {
            collisions,
            failures,
        }
    }
}

fn overlap(automata: &[Automaton], (a, b): (usize, usize)) -> Option<Vec<Symbol>> {
    let witness = if a == b {
        automata[a].shortest_match()
    } else {
        automata[a].intersection(&automata[b]).shortest_match()
    };
    log::trace!("patterns #{} and #{} disjoint: {}", a, b, witness.is_none());
    witness
}

#[cfg(feature = "rayon")]
fn overlaps(automata: &[Automaton], pairs: &[(usize, usize)]) -> Vec<Option<Vec<Symbol>>> {
    use rayon::prelude::*;

    pairs
        .par_iter()
        .map(|&pair| overlap(automata, pair))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn overlaps(automata: &[Automaton], pairs: &[(usize, usize)]) -> Vec<Option<Vec<Symbol>>> {
    pairs.iter().map(|&pair| overlap(automata, pair)).collect()
}

/// Labels of every colliding pair, in the order [`CollisionDetector::detect`]
/// reports them. Fails with the error of the first terminal that does not
/// compile.
pub fn find_collisions<L>(terminals: &[(L, Pattern)]) -> Result<Vec<(L, L)>>
where
    L: Clone + fmt::Debug,
{
    let detection = CollisionDetector::new().detect(terminals);
    if let Some((_, err)) = detection.failures.into_iter().next() {
        return Err(err);
    }
    Ok(detection
        .collisions
        .into_iter()
        .map(|collision| (collision.left, collision.right))
        .collect())
}

/// Terminals split into those that parsed and those that did not.
#[derive(Clone, Debug)]
pub struct ParsedTerminals<L> {
    pub patterns: Vec<(L, Pattern)>,
    pub failures: Vec<(L, Error)>,
}

impl<L> ParsedTerminals<L> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Parses every `(label, pattern)` pair, keeping going past bad patterns.
pub fn parse_terminals<L, S, I>(terminals: I) -> ParsedTerminals<L>
where
    I: IntoIterator<Item = (L, S)>,
    S: AsRef<str>,
{
    let mut parsed = ParsedTerminals {
        patterns: Vec::new(),
        failures: Vec::new(),
    };
    for (label, text) in terminals {
        match crate::parser::parse(text.as_ref()) {
            Ok(pattern) => parsed.patterns.push((label, pattern)),
            Err(err) => parsed.failures.push((label, err)),
        }
    }
    parsed
}
