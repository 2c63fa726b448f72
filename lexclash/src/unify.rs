use crate::pattern::Pattern;
use lexclash_automata::Alphabet;

/// The union of every pattern's own alphabet.
///
/// Automata that are going to be compared must all be compiled against the
/// result, so that the `Other` column means the same thing in each of them.
pub fn shared_alphabet<'a, I>(patterns: I) -> Alphabet
where
    I: IntoIterator<Item = &'a Pattern>,
{
    patterns
        .into_iter()
        .fold(Alphabet::default(), |acc, pattern| acc.union(pattern.alphabet()))
}
