#![forbid(unsafe_code)]
#![doc = "Lexclash: find lexer terminals whose patterns can match the same string."]

mod collision;
mod compile;
mod error;
mod limits;
mod parser;
mod pattern;
mod unify;

pub use collision::{
    Collision, CollisionDetector, Detection, ParsedTerminals, find_collisions, parse_terminals,
};
pub use compile::{Builder, compile};
pub use error::{Error, Result};
pub use lexclash_automata::{Alphabet, Automaton, Budget, Symbol};
pub use limits::Limits;
pub use parser::parse;
pub use pattern::{
    CharGroup, CompositeCharGroup, Concatenation, Direction, Lookaround, Node, Part, Pattern,
    Repeated,
};
pub use unify::shared_alphabet;

pub mod prelude {
    pub use crate::collision::{
        Collision, CollisionDetector, Detection, find_collisions, parse_terminals,
    };
    pub use crate::compile::{Builder, compile};
    pub use crate::error::{Error, Result};
    pub use crate::limits::Limits;
    pub use crate::parser::parse;
    pub use crate::pattern::Pattern;
    pub use crate::unify::shared_alphabet;
    pub use lexclash_automata::{Alphabet, Automaton, Symbol};
}
