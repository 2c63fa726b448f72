use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::pattern::{
    CharGroup, CompositeCharGroup, Concatenation, Direction, Lookaround, Node, Part, Pattern,
    Repeated,
};
use lexclash_automata::{Alphabet, Automaton, Symbol};
use std::sync::Arc;

/// Compiles patterns into automata over one fixed alphabet.
///
/// Every automaton a builder produces shares the builder's alphabet, which
/// is what makes its results safe to compare with each other. Patterns that
/// mention characters outside that alphabet are rejected with
/// [`Error::ForeignSymbols`] rather than silently folded into `Other`.
#[derive(Clone, Debug)]
pub struct Builder {
    alphabet: Arc<Alphabet>,
    limits: Limits,
}

impl Builder {
    pub fn new(alphabet: impl Into<Arc<Alphabet>>) -> Self {
        Self {
            alphabet: alphabet.into(),
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Compiles `pattern` into a minimal automaton.
    ///
    /// A lookahead constrains everything that follows it up to the end of
    /// the input, including text matched outside its enclosing group:
    /// `(?:a(?=b))b` accepts `ab`. Lookbehind, and lookahead inside an
    /// unbounded repetition, fail with [`Error::UnsupportedFeature`].
    ///
    /// The builder's [`Limits`] are checked while each subset or product
    /// construction is still running, so a blow-up stops at the first state
    /// over the ceiling with [`Error::StateLimit`].
    pub fn compile(&self, pattern: &Pattern) -> Result<Automaton> {
        if !self.alphabet.is_superset_of(pattern.alphabet()) {
            return Err(Error::ForeignSymbols);
        }
        let automaton = self.pattern(pattern, &self.epsilon())?;
        log::debug!(
            "compiled {:?} into {} states",
            pattern.to_string(),
            automaton.state_count()
        );
        Ok(automaton)
    }

    fn epsilon(&self) -> Automaton {
        Automaton::epsilon(self.alphabet.clone())
    }

    /// `pattern` followed by `next`.
    fn pattern(&self, pattern: &Pattern, next: &Automaton) -> Result<Automaton> {
        let mut options = pattern.options().iter();
        let first = match options.next() {
            Some(option) => self.concatenation(option, next)?,
            None => return Ok(Automaton::empty(self.alphabet.clone())),
        };
        options.try_fold(first, |acc, option| {
            let branch = self.concatenation(option, next)?;
            acc.union_within(&branch, &self.limits)
        })
    }

    /// Folds right to left so that each assertion sees exactly the
    /// automaton for whatever comes after it.
    fn concatenation(&self, concatenation: &Concatenation, next: &Automaton) -> Result<Automaton> {
        concatenation
            .parts()
            .iter()
            .rev()
            .try_fold(next.clone(), |rest, part| match part {
                Part::Node(node) => self.sequence(node, rest),
                Part::Lookaround(lookaround) => self.lookaround(lookaround, rest),
            })
    }

    /// `node` followed by `rest`. Nodes holding a lookahead are compiled
    /// against `rest` directly so the assertion can see past them.
    fn sequence(&self, node: &Node, rest: Automaton) -> Result<Automaton> {
        match node {
            Node::Group(pattern) if pattern.contains_lookaround() => self.pattern(pattern, &rest),
            Node::Repeated(repeated) if repeated.base().contains_lookaround() => {
                self.unrolled(repeated, rest)
            }
            _ => {
                let head = self.node(node)?;
                head.concatenate_within(&rest, &self.limits)
            }
        }
    }

    fn lookaround(&self, lookaround: &Lookaround, rest: Automaton) -> Result<Automaton> {
        if lookaround.direction() == Direction::Behind {
            return Err(Error::UnsupportedFeature("lookbehind".into()));
        }
        let anything = Automaton::universal(self.alphabet.clone());
        let prefixes = self.pattern(lookaround.inner(), &anything)?;
        if lookaround.is_negated() {
            rest.difference_within(&prefixes, &self.limits)
        } else {
            rest.intersection_within(&prefixes, &self.limits)
        }
    }

    /// A lookaround-free node on its own.
    fn node(&self, node: &Node) -> Result<Automaton> {
        match node {
            Node::CharGroup(group) => Ok(self.char_group(group)),
            Node::Composite(group) => self.composite(group),
            Node::Repeated(repeated) => self.repeated(repeated),
            Node::Group(pattern) => self.pattern(pattern, &self.epsilon()),
        }
    }

    fn char_group(&self, group: &CharGroup) -> Automaton {
        let negated = group.is_negated();
        let symbols = self
            .alphabet
            .symbols()
            .enumerate()
            .filter(|(_, symbol)| match symbol {
                Symbol::Char(ch) => group.chars().contains(ch) != negated,
                Symbol::Other => negated,
            })
            .map(|(idx, _)| idx);
        Automaton::symbols(self.alphabet.clone(), symbols)
    }

    fn composite(&self, group: &CompositeCharGroup) -> Result<Automaton> {
        let members = group
            .groups()
            .iter()
            .try_fold(Automaton::empty(self.alphabet.clone()), |acc, member| {
                acc.union_within(&self.char_group(member), &self.limits)
            })?;
        if !group.is_negated() {
            return Ok(members);
        }
        let any = self.char_group(&CharGroup::any());
        any.difference_within(&members, &self.limits)
    }

    fn repeated(&self, repeated: &Repeated) -> Result<Automaton> {
        let unit = self.node(repeated.base())?;
        let epsilon = self.epsilon();

        // Repeating the empty string, or nothing at all, stops changing after
        // the first step.
        if unit.equivalent(&epsilon) {
            return Ok(epsilon);
        }
        if unit.is_empty() {
            return Ok(if repeated.min() == 0 {
                epsilon
            } else {
                unit
            });
        }

        let mut result = epsilon.clone();
        for _ in 0..repeated.min() {
            result = result.concatenate_within(&unit, &self.limits)?;
        }
        match repeated.max() {
            None => {
                let tail = unit.star_within(&self.limits)?;
                result.concatenate_within(&tail, &self.limits)
            }
            Some(max) => {
                let optional = unit.union_within(&epsilon, &self.limits)?;
                for _ in repeated.min()..max {
                    result = result.concatenate_within(&optional, &self.limits)?;
                }
                Ok(result)
            }
        }
    }

    /// Bounded repetition of a base holding a lookahead, expanded copy by
    /// copy from the right so each copy sees what follows it.
    fn unrolled(&self, repeated: &Repeated, rest: Automaton) -> Result<Automaton> {
        let Some(max) = repeated.max() else {
            return Err(Error::UnsupportedFeature(
                "lookahead inside unbounded repetition".into(),
            ));
        };
        let mut tail = rest.clone();
        for _ in repeated.min()..max {
            let more = self.sequence(repeated.base(), tail)?;
            tail = more.union_within(&rest, &self.limits)?;
        }
        for _ in 0..repeated.min() {
            tail = self.sequence(repeated.base(), tail)?;
        }
        Ok(tail)
    }
}

/// Compiles `pattern` against `alphabet` with no size limits.
pub fn compile(pattern: &Pattern, alphabet: &Alphabet) -> Result<Automaton> {
    Builder::new(alphabet.clone()).compile(pattern)
}

impl Pattern {
    /// Compiles the pattern over its own alphabet.
    pub fn to_automaton(&self) -> Result<Automaton> {
        Builder::new(self.alphabet().clone()).compile(self)
    }
}
