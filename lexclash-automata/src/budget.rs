use std::convert::Infallible;

/// Decides how many states a construction may create.
///
/// Subset and product constructions consult the budget every time they
/// discover a new state, before anything is minimised, so a construction
/// that would blow up stops at the first state past the limit instead of
/// after it has been built.
pub trait Budget {
    type Error;

    /// Called with the running state count of the construction.
    fn admit(&self, states: usize) -> Result<(), Self::Error>;
}

/// Admits any number of states.
#[derive(Copy, Clone, Debug, Default)]
pub struct Unbounded;

impl Budget for Unbounded {
    type Error = Infallible;

    fn admit(&self, _: usize) -> Result<(), Infallible> {
        Ok(())
    }
}

pub(crate) fn unbounded<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}
