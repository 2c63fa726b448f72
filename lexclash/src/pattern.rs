//! Pattern syntax trees.
//!
//! A parsed pattern is an owned tree: [`Pattern`] is an alternation of
//! [`Concatenation`]s, whose parts are [`Node`]s or zero-width
//! [`Lookaround`] assertions. Trees are immutable once built and compare
//! and hash structurally, so identical patterns can share one compiled
//! automaton. Each node memoises its [`Alphabet`] on first use.

use crate::error::{Error, Result};
use lexclash_automata::Alphabet;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

pub(crate) const WORD_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";
pub(crate) const DIGIT_CHARS: &str = "0123456789";
pub(crate) const SPACE_CHARS: &str = " \t\n\r\u{c}\u{b}";

/// Write-once memo slot. It takes no part in equality or hashing, so a
/// populated node still equals a fresh copy of itself.
#[derive(Clone, Default)]
struct Cached<T>(OnceLock<T>);

impl<T> Cached<T> {
    fn get_or_init(&self, init: impl FnOnce() -> T) -> &T {
        self.0.get_or_init(init)
    }
}

impl<T> PartialEq for Cached<T> {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl<T> Eq for Cached<T> {}

impl<T> Hash for Cached<T> {
    fn hash<H: Hasher>(&self, _: &mut H) {}
}

/// A set of characters, optionally complemented.
///
/// Complement is taken relative to whatever alphabet the group is compiled
/// against, so a negated group always also matches [`Symbol::Other`].
///
/// [`Symbol::Other`]: lexclash_automata::Symbol::Other
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CharGroup {
    chars: BTreeSet<char>,
    negated: bool,
    alphabet: Cached<Alphabet>,
}

impl CharGroup {
    pub fn new<I>(chars: I, negated: bool) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        Self {
            chars: chars.into_iter().collect(),
            negated,
            alphabet: Cached::default(),
        }
    }

    pub fn literal(ch: char) -> Self {
        Self::new([ch], false)
    }

    /// The `.` group: every symbol of the alphabet.
    pub fn any() -> Self {
        Self::new([], true)
    }

    pub fn chars(&self) -> &BTreeSet<char> {
        &self.chars
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn alphabet(&self) -> &Alphabet {
        self.alphabet
            .get_or_init(|| Alphabet::new(self.chars.iter().copied()))
    }

    /// The character, when this group matches exactly one.
    pub(crate) fn single(&self) -> Option<char> {
        match (self.negated, self.chars.len()) {
            (false, 1) => self.chars.first().copied(),
            _ => None,
        }
    }

    pub(crate) fn complemented(self) -> Self {
        Self::new(self.chars, !self.negated)
    }
}

impl fmt::Debug for CharGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharGroup")
            .field("chars", &self.chars)
            .field("negated", &self.negated)
            .finish_non_exhaustive()
    }
}

/// Union of several [`CharGroup`]s, optionally complemented as a whole.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CompositeCharGroup {
    groups: Vec<CharGroup>,
    negated: bool,
    alphabet: Cached<Alphabet>,
}

impl CompositeCharGroup {
    pub fn new(groups: Vec<CharGroup>, negated: bool) -> Self {
        Self {
            groups,
            negated,
            alphabet: Cached::default(),
        }
    }

    pub fn groups(&self) -> &[CharGroup] {
        &self.groups
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn alphabet(&self) -> &Alphabet {
        self.alphabet.get_or_init(|| {
            self.groups
                .iter()
                .fold(Alphabet::default(), |acc, group| acc.union(group.alphabet()))
        })
    }
}

impl fmt::Debug for CompositeCharGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeCharGroup")
            .field("groups", &self.groups)
            .field("negated", &self.negated)
            .finish_non_exhaustive()
    }
}

/// `base{min,max}`; `max == None` is unbounded.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Repeated {
    base: Box<Node>,
    min: u32,
    max: Option<u32>,
}

impl Repeated {
    pub fn new(base: Node, min: u32, max: Option<u32>) -> Result<Self> {
        if let Some(max) = max {
            if min > max {
                return Err(Error::InvalidRepeat {
                    repeat: format!("{{{},{}}}", min, max),
                });
            }
        }
        Ok(Self {
            base: Box::new(base),
            min,
            max,
        })
    }

    pub fn base(&self) -> &Node {
        &self.base
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> Option<u32> {
        self.max
    }

    pub fn alphabet(&self) -> &Alphabet {
        self.base.alphabet()
    }
}

impl fmt::Debug for Repeated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repeated")
            .field("base", &self.base)
            .field("min", &self.min)
            .field("max", &self.max)
            .finish()
    }
}

/// A pattern element that consumes input.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Node {
    CharGroup(CharGroup),
    Composite(CompositeCharGroup),
    Repeated(Repeated),
    /// A parenthesised sub-pattern. Capture identity is not kept.
    Group(Pattern),
}

impl Node {
    pub fn alphabet(&self) -> &Alphabet {
        match self {
            Node::CharGroup(group) => group.alphabet(),
            Node::Composite(group) => group.alphabet(),
            Node::Repeated(repeated) => repeated.alphabet(),
            Node::Group(pattern) => pattern.alphabet(),
        }
    }

    pub(crate) fn contains_lookaround(&self) -> bool {
        match self {
            Node::CharGroup(_) | Node::Composite(_) => false,
            Node::Repeated(repeated) => repeated.base.contains_lookaround(),
            Node::Group(pattern) => pattern.contains_lookaround(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Ahead,
    Behind,
}

/// A zero-width assertion: `(?=..)`, `(?!..)`, `(?<=..)` or `(?<!..)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Lookaround {
    inner: Pattern,
    direction: Direction,
    negated: bool,
}

impl Lookaround {
    pub fn new(inner: Pattern, direction: Direction, negated: bool) -> Self {
        Self {
            inner,
            direction,
            negated,
        }
    }

    pub fn inner(&self) -> &Pattern {
        &self.inner
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn alphabet(&self) -> &Alphabet {
        self.inner.alphabet()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Part {
    Node(Node),
    Lookaround(Lookaround),
}

impl Part {
    pub fn alphabet(&self) -> &Alphabet {
        match self {
            Part::Node(node) => node.alphabet(),
            Part::Lookaround(lookaround) => lookaround.alphabet(),
        }
    }
}

/// A sequence of parts; the empty sequence matches the empty string.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Concatenation {
    parts: Vec<Part>,
    alphabet: Cached<Alphabet>,
}

impl Concatenation {
    pub fn new(parts: Vec<Part>) -> Self {
        Self {
            parts,
            alphabet: Cached::default(),
        }
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn alphabet(&self) -> &Alphabet {
        self.alphabet.get_or_init(|| {
            self.parts
                .iter()
                .fold(Alphabet::default(), |acc, part| acc.union(part.alphabet()))
        })
    }
}

impl fmt::Debug for Concatenation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Concatenation").field(&self.parts).finish()
    }
}

/// An alternation of one or more concatenations; the root of every parsed
/// pattern.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    options: Vec<Concatenation>,
    alphabet: Cached<Alphabet>,
}

impl Pattern {
    /// An empty `options` list is read as a single empty concatenation.
    pub fn new(mut options: Vec<Concatenation>) -> Self {
        if options.is_empty() {
            options.push(Concatenation::default());
        }
        Self {
            options,
            alphabet: Cached::default(),
        }
    }

    pub fn options(&self) -> &[Concatenation] {
        &self.options
    }

    /// Every character the pattern mentions. The `Other` sentinel is
    /// implied by [`Alphabet`] itself.
    pub fn alphabet(&self) -> &Alphabet {
        self.alphabet.get_or_init(|| {
            self.options
                .iter()
                .fold(Alphabet::default(), |acc, option| acc.union(option.alphabet()))
        })
    }

    pub fn contains_lookaround(&self) -> bool {
        self.options.iter().any(|option| {
            option.parts.iter().any(|part| match part {
                Part::Node(node) => node.contains_lookaround(),
                Part::Lookaround(_) => true,
            })
        })
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.options).finish()
    }
}

// Rendering back to pattern syntax. Trees produced by the parser always
// render to text that parses to an equivalent pattern.

const SPECIAL_OUTER: &[char] = &[
    '+', '?', '*', '.', '$', '^', '\\', '(', ')', '[', ']', '{', '}', '|',
];
const SPECIAL_INNER: &[char] = &['\\', '[', ']', '-', '^'];

fn write_char(f: &mut fmt::Formatter<'_>, ch: char, special: &[char]) -> fmt::Result {
    if special.contains(&ch) {
        write!(f, "\\{}", ch)
    } else if (ch as u32) < 0x20 || ch == '\u{7f}' {
        write!(f, "\\x{:02x}", ch as u32)
    } else {
        write!(f, "{}", ch)
    }
}

fn write_class_items(f: &mut fmt::Formatter<'_>, chars: &BTreeSet<char>) -> fmt::Result {
    let chars: Vec<char> = chars.iter().copied().collect();
    let mut idx = 0;
    while idx < chars.len() {
        let mut end = idx;
        while end + 1 < chars.len() && chars[end + 1] as u32 == chars[end] as u32 + 1 {
            end += 1;
        }
        if end - idx >= 2 {
            write_char(f, chars[idx], SPECIAL_INNER)?;
            f.write_str("-")?;
            write_char(f, chars[end], SPECIAL_INNER)?;
        } else {
            for &ch in &chars[idx..=end] {
                write_char(f, ch, SPECIAL_INNER)?;
            }
        }
        idx = end + 1;
    }
    Ok(())
}

fn shorthand(group: &CharGroup) -> Option<&'static str> {
    let matches = |set: &str| group.chars.len() == set.len() && set.chars().all(|c| group.chars.contains(&c));
    match group.negated {
        true if matches(WORD_CHARS) => Some("\\W"),
        true if matches(DIGIT_CHARS) => Some("\\D"),
        true if matches(SPACE_CHARS) => Some("\\S"),
        _ => None,
    }
}

impl fmt::Display for CharGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ch) = self.single() {
            return write_char(f, ch, SPECIAL_OUTER);
        }
        if let Some(text) = shorthand(self) {
            return f.write_str(text);
        }
        match (self.negated, self.chars.is_empty()) {
            (true, true) => f.write_str("."),
            // Matches nothing.
            (false, true) => f.write_str("(?!)"),
            (negated, false) => {
                f.write_str(if negated { "[^" } else { "[" })?;
                write_class_items(f, &self.chars)?;
                f.write_str("]")
            }
        }
    }
}

impl fmt::Display for CompositeCharGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.negated { "[^" } else { "[" })?;
        for group in &self.groups {
            match (group.negated, shorthand(group)) {
                (false, _) => write_class_items(f, &group.chars)?,
                (true, Some(text)) => f.write_str(text)?,
                (true, None) => write!(f, "{}", group)?,
            }
        }
        f.write_str("]")
    }
}

impl fmt::Display for Repeated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.base.as_ref() {
            Node::Repeated(inner) => write!(f, "(?:{})", inner)?,
            base => write!(f, "{}", base)?,
        }
        match (self.min, self.max) {
            (0, None) => f.write_str("*"),
            (1, None) => f.write_str("+"),
            (0, Some(1)) => f.write_str("?"),
            (min, None) => write!(f, "{{{},}}", min),
            (min, Some(max)) if min == max => write!(f, "{{{}}}", min),
            (min, Some(max)) => write!(f, "{{{},{}}}", min, max),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::CharGroup(group) => write!(f, "{}", group),
            Node::Composite(group) => write!(f, "{}", group),
            Node::Repeated(repeated) => write!(f, "{}", repeated),
            Node::Group(pattern) => write!(f, "(?:{})", pattern),
        }
    }
}

impl fmt::Display for Lookaround {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opener = match (self.direction, self.negated) {
            (Direction::Ahead, false) => "(?=",
            (Direction::Ahead, true) => "(?!",
            (Direction::Behind, false) => "(?<=",
            (Direction::Behind, true) => "(?<!",
        };
        write!(f, "{}{})", opener, self.inner)
    }
}

impl fmt::Display for Concatenation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                Part::Node(node) => write!(f, "{}", node)?,
                Part::Lookaround(lookaround) => write!(f, "{}", lookaround)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, option) in self.options.iter().enumerate() {
            if i != 0 {
                f.write_str("|")?;
            }
            write!(f, "{}", option)?;
        }
        Ok(())
    }
}
