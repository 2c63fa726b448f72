#![forbid(unsafe_code)]
#![doc = "Finite automata over small alphabets with an \"other\" sentinel, and the union, intersection, difference, concatenation and star operations on them."]

mod alphabet;
mod bitset;
mod budget;
mod dfa;
mod nfa;

pub use crate::alphabet::{Alphabet, Symbol};
pub use crate::budget::{Budget, Unbounded};
pub use crate::dfa::Automaton;
