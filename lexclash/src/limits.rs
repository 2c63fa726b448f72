use crate::error::Error;
use lexclash_automata::Budget;

/// Size ceilings applied while compiling patterns.
///
/// Product constructions can grow multiplicatively, and nested lookahead or
/// repetition can grow exponentially with nesting depth. A caller compiling
/// untrusted patterns should set `max_states`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    max_states: Option<usize>,
}

impl Limits {
    /// Fail compilation once any construction discovers more than `states`
    /// states, counted before minimisation.
    pub const fn max_states(mut self, states: usize) -> Self {
        self.max_states = Some(states);
        self
    }
}

impl Budget for Limits {
    type Error = Error;

    fn admit(&self, states: usize) -> Result<(), Error> {
        match self.max_states {
            Some(limit) if states > limit => Err(Error::StateLimit { limit, states }),
            _ => Ok(()),
        }
    }
}
