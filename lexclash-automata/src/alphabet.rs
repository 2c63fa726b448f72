//! Finite input alphabets.
//!
//! Patterns range over an unbounded character domain, but only the
//! characters a pattern actually mentions can change its behaviour. An
//! [`Alphabet`] lists those characters and adds one sentinel,
//! [`Symbol::Other`], which stands for every character that is not listed.
//! Automata index their transition rows by the position of a symbol in the
//! alphabet, so the sentinel keeps them finite.

use core::fmt;

/// One input symbol: a listed character or the "anything else" sentinel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Char(char),
    Other,
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Char(ch) => write!(f, "{}", ch.escape_debug()),
            Symbol::Other => f.write_str("<other>"),
        }
    }
}

/// A sorted set of characters plus the [`Symbol::Other`] sentinel.
///
/// Symbol indices run from `0` to `symbol_count() - 1`; the listed
/// characters come first in code-point order and `Other` is always last.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    pub fn new<I>(chars: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        let mut chars: Vec<char> = chars.into_iter().collect();
        chars.sort_unstable();
        chars.dedup();
        Self { chars }
    }

    /// Number of symbols, including the sentinel.
    pub fn symbol_count(&self) -> usize {
        self.chars.len() + 1
    }

    /// The listed characters, in ascending order.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Index of the [`Symbol::Other`] sentinel.
    pub fn other(&self) -> usize {
        self.chars.len()
    }

    pub fn contains_char(&self, ch: char) -> bool {
        self.chars.binary_search(&ch).is_ok()
    }

    /// Maps an input character onto its symbol index. Characters that are
    /// not listed fall into the sentinel column.
    pub fn classify(&self, ch: char) -> usize {
        self.chars.binary_search(&ch).unwrap_or(self.other())
    }

    pub fn index_of(&self, symbol: Symbol) -> Option<usize> {
        match symbol {
            Symbol::Char(ch) => self.chars.binary_search(&ch).ok(),
            Symbol::Other => Some(self.other()),
        }
    }

    /// The symbol stored at `index`. Indices past the sentinel clamp to it.
    pub fn symbol(&self, index: usize) -> Symbol {
        match self.chars.get(index) {
            Some(&ch) => Symbol::Char(ch),
            None => Symbol::Other,
        }
    }

    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.chars
            .iter()
            .map(|&ch| Symbol::Char(ch))
            .chain(core::iter::once(Symbol::Other))
    }

    pub fn union(&self, other: &Alphabet) -> Alphabet {
        let mut merged = Vec::with_capacity(self.chars.len() + other.chars.len());
        let (mut left, mut right) = (0, 0);
        while left < self.chars.len() && right < other.chars.len() {
            let (a, b) = (self.chars[left], other.chars[right]);
            if a <= b {
                merged.push(a);
                left += 1;
                if a == b {
                    right += 1;
                }
            } else {
                merged.push(b);
                right += 1;
            }
        }
        merged.extend_from_slice(&self.chars[left..]);
        merged.extend_from_slice(&other.chars[right..]);
        Alphabet { chars: merged }
    }

    pub fn is_superset_of(&self, other: &Alphabet) -> bool {
        other.chars.iter().all(|&ch| self.contains_char(ch))
    }
}

impl FromIterator<char> for Alphabet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Alphabet::new(iter)
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, symbol) in self.symbols().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", symbol)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_always_last() {
        let alphabet = Alphabet::new("cab".chars());
        assert_eq!(alphabet.symbol_count(), 4);
        assert_eq!(alphabet.chars(), &['a', 'b', 'c']);
        assert_eq!(alphabet.symbol(3), Symbol::Other);
        assert_eq!(alphabet.index_of(Symbol::Other), Some(3));

        let empty = Alphabet::default();
        assert_eq!(empty.symbol_count(), 1);
        assert_eq!(empty.symbols().collect::<Vec<_>>(), vec![Symbol::Other]);
    }

    #[test]
    fn unlisted_characters_classify_as_other() {
        let alphabet = Alphabet::new("xy".chars());
        assert_eq!(alphabet.classify('x'), 0);
        assert_eq!(alphabet.classify('y'), 1);
        assert_eq!(alphabet.classify('z'), alphabet.other());
        assert_eq!(alphabet.index_of(Symbol::Char('z')), None);
    }

    #[test]
    fn union_merges_and_deduplicates() {
        let left = Alphabet::new("ace".chars());
        let right = Alphabet::new("bcd".chars());
        let merged = left.union(&right);
        assert_eq!(merged.chars(), &['a', 'b', 'c', 'd', 'e']);
        assert!(merged.is_superset_of(&left));
        assert!(merged.is_superset_of(&right));
        assert!(!left.is_superset_of(&merged));
    }
}
