//! Recursive-descent parser for the supported pattern dialect.
//!
//! ```text
//! pattern       := concatenation ('|' concatenation)*
//! concatenation := object*
//! object        := group | repetition(atom)
//! group         := '(' ( '?' extension | pattern ')' )
//! atom          := '[' class | '\' escape | '.' | literal
//! repetition    := atom ('*' | '+' | '?' | '{' int? (',' int?)? '}')? '?'?
//! ```
//!
//! A trailing `?` after a quantifier (a lazy marker) is accepted and
//! dropped: automata accept or reject whole strings and have no notion of
//! match preference.

use crate::error::{Error, Result};
use crate::pattern::{
    CharGroup, CompositeCharGroup, Concatenation, DIGIT_CHARS, Direction, Lookaround, Node,
    Part, Pattern, Repeated, SPACE_CHARS, WORD_CHARS,
};
use std::str::FromStr;

/// Characters that never stand for themselves outside a class.
const SPECIAL: &[char] = &[
    '+', '?', '*', '.', '$', '^', '\\', '(', ')', '[', ']', '{', '}', '|',
];
/// Characters that must be escaped inside a class.
const SPECIAL_INNER: &[char] = &['\\', '[', ']', '-'];
/// Escapes reserved for constructs we do not implement. Only reserved
/// outside classes; inside one, `\b` is a backspace.
const RESERVED_ESCAPES: &[char] = &['u', 'U', 'A', 'Z', 'b', 'B'];
const INLINE_FLAGS: &[char] = &['a', 'i', 'L', 'm', 's', 'u', 'x'];
const CONTEXT_RADIUS: usize = 8;

/// Parses `text` into a [`Pattern`].
pub fn parse(text: &str) -> Result<Pattern> {
    Parser::new(text).finish()
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        parse(text)
    }
}

fn shorthand(ch: char) -> Option<CharGroup> {
    let group = match ch {
        'w' => CharGroup::new(WORD_CHARS.chars(), false),
        'W' => CharGroup::new(WORD_CHARS.chars(), true),
        'd' => CharGroup::new(DIGIT_CHARS.chars(), false),
        'D' => CharGroup::new(DIGIT_CHARS.chars(), true),
        's' => CharGroup::new(SPACE_CHARS.chars(), false),
        'S' => CharGroup::new(SPACE_CHARS.chars(), true),
        'a' => CharGroup::literal('\u{7}'),
        'b' => CharGroup::literal('\u{8}'),
        'f' => CharGroup::literal('\u{c}'),
        'n' => CharGroup::literal('\n'),
        'r' => CharGroup::literal('\r'),
        't' => CharGroup::literal('\t'),
        'v' => CharGroup::literal('\u{b}'),
        _ => return None,
    };
    Some(group)
}

fn is_octal(ch: char) -> bool {
    matches!(ch, '0'..='7')
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn finish(mut self) -> Result<Pattern> {
        let pattern = self.pattern()?;
        match self.peek() {
            None => Ok(pattern),
            Some(')') => Err(self.syntax("unbalanced ')'")),
            Some(ch) => Err(self.syntax(format!("unexpected {:?}", ch))),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: char) -> Result<()> {
        if self.eat(ch) {
            Ok(())
        } else {
            Err(self.syntax(format!("expected {:?}", ch)))
        }
    }

    /// Consumes up to `max` characters satisfying `accept`.
    fn take(&mut self, max: usize, accept: impl Fn(char) -> bool) -> String {
        let mut taken = String::new();
        while taken.len() < max {
            match self.peek() {
                Some(ch) if accept(ch) => {
                    taken.push(ch);
                    self.pos += 1;
                }
                _ => break,
            }
        }
        taken
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    fn syntax(&self, message: impl Into<String>) -> Error {
        let start = self.pos.saturating_sub(CONTEXT_RADIUS);
        let end = (self.pos + CONTEXT_RADIUS).min(self.chars.len());
        Error::Syntax {
            position: self.pos,
            context: self.text(start, end),
            message: message.into(),
        }
    }

    fn pattern(&mut self) -> Result<Pattern> {
        let mut options = vec![self.concatenation()?];
        while self.eat('|') {
            options.push(self.concatenation()?);
        }
        Ok(Pattern::new(options))
    }

    fn concatenation(&mut self) -> Result<Concatenation> {
        let mut parts = Vec::new();
        while let Some(ch) = self.peek() {
            if ch == '|' || ch == ')' {
                break;
            }
            if let Some(part) = self.object()? {
                parts.push(part);
            }
        }
        Ok(Concatenation::new(parts))
    }

    /// `None` for constructs that vanish entirely, i.e. comments.
    fn object(&mut self) -> Result<Option<Part>> {
        if self.eat('(') {
            return self.group();
        }
        let atom = self.atom()?;
        Ok(Some(Part::Node(self.repetition(atom)?)))
    }

    fn group(&mut self) -> Result<Option<Part>> {
        if self.eat('?') {
            return self.extension();
        }
        self.grouped()
    }

    fn enclosed(&mut self) -> Result<Pattern> {
        let pattern = self.pattern()?;
        self.expect(')')?;
        Ok(pattern)
    }

    fn grouped(&mut self) -> Result<Option<Part>> {
        let inner = self.enclosed()?;
        Ok(Some(Part::Node(self.repetition(Node::Group(inner))?)))
    }

    fn lookaround(&mut self, direction: Direction, negated: bool) -> Result<Option<Part>> {
        let inner = self.enclosed()?;
        Ok(Some(Part::Lookaround(Lookaround::new(
            inner, direction, negated,
        ))))
    }

    fn extension(&mut self) -> Result<Option<Part>> {
        let start = self.pos;
        let Some(ch) = self.bump() else {
            return Err(self.syntax("unterminated group"));
        };
        match ch {
            ':' => self.grouped(),
            '=' => self.lookaround(Direction::Ahead, false),
            '!' => self.lookaround(Direction::Ahead, true),
            'P' => {
                if self.eat('<') {
                    self.group_name()?;
                    self.grouped()
                } else if self.eat('=') {
                    Err(Error::UnsupportedFeature(
                        "named group back-references".into(),
                    ))
                } else {
                    Err(self.syntax("expected '<' or '=' after '(?P'"))
                }
            }
            '<' => {
                if self.eat('=') {
                    self.lookaround(Direction::Behind, false)
                } else if self.eat('!') {
                    self.lookaround(Direction::Behind, true)
                } else {
                    self.group_name()?;
                    self.grouped()
                }
            }
            '#' => {
                loop {
                    match self.bump() {
                        Some(')') => break,
                        Some(_) => {}
                        None => return Err(self.syntax("unterminated comment")),
                    }
                }
                Ok(None)
            }
            '(' => Err(Error::UnsupportedFeature("conditional groups".into())),
            flag if INLINE_FLAGS.contains(&flag) => {
                Err(Error::UnsupportedFeature("inline flags".into()))
            }
            other => {
                self.pos = start;
                Err(self.syntax(format!("unknown group extension '?{}'", other)))
            }
        }
    }

    fn group_name(&mut self) -> Result<()> {
        let name = self.take(usize::MAX, |ch| ch.is_ascii_alphanumeric() || ch == '_');
        if name.is_empty() {
            return Err(self.syntax("expected a group name"));
        }
        self.expect('>')
    }

    fn atom(&mut self) -> Result<Node> {
        let Some(ch) = self.peek() else {
            return Err(self.syntax("unexpected end of pattern"));
        };
        match ch {
            '[' => {
                self.pos += 1;
                self.class()
            }
            '\\' => {
                self.pos += 1;
                Ok(Node::CharGroup(self.escape(false)?))
            }
            '.' => {
                self.pos += 1;
                Ok(Node::CharGroup(CharGroup::any()))
            }
            '*' | '+' | '?' | '{' => Err(self.syntax(format!("nothing to repeat before {:?}", ch))),
            '^' | '$' => Err(self.syntax(format!("anchor {:?} is not supported", ch))),
            _ if SPECIAL.contains(&ch) => Err(self.syntax(format!("unexpected {:?}", ch))),
            _ => {
                self.pos += 1;
                Ok(Node::CharGroup(CharGroup::literal(ch)))
            }
        }
    }

    fn repetition(&mut self, base: Node) -> Result<Node> {
        let start = self.pos;
        let (min, max) = match self.peek() {
            Some('*') => {
                self.pos += 1;
                (0, None)
            }
            Some('+') => {
                self.pos += 1;
                (1, None)
            }
            Some('?') => {
                self.pos += 1;
                (0, Some(1))
            }
            Some('{') => {
                self.pos += 1;
                self.bounds()?
            }
            _ => return Ok(base),
        };
        let end = self.pos;
        self.eat('?');
        if max.is_some_and(|max| min > max) {
            return Err(Error::InvalidRepeat {
                repeat: self.text(start, end),
            });
        }
        Ok(Node::Repeated(Repeated::new(base, min, max)?))
    }

    /// The inside of `{..}`: `{}` is `{0}` and `{,n}` is `{0,n}`.
    fn bounds(&mut self) -> Result<(u32, Option<u32>)> {
        let min = self.number()?.unwrap_or(0);
        let max = if self.eat(',') {
            self.number()?
        } else {
            Some(min)
        };
        self.expect('}')?;
        Ok((min, max))
    }

    fn number(&mut self) -> Result<Option<u32>> {
        let digits = self.take(usize::MAX, |ch| ch.is_ascii_digit());
        if digits.is_empty() {
            return Ok(None);
        }
        digits
            .parse()
            .map(Some)
            .map_err(|_| self.syntax(format!("repetition count {} is too large", digits)))
    }

    fn code_point(&self, digits: &str, radix: u32) -> Result<CharGroup> {
        u32::from_str_radix(digits, radix)
            .ok()
            .filter(|&code| radix != 8 || code <= 0o377)
            .and_then(char::from_u32)
            .map(CharGroup::literal)
            .ok_or_else(|| self.syntax(format!("invalid character code {}", digits)))
    }

    /// Everything after a backslash. `inner` is set inside a class.
    fn escape(&mut self, inner: bool) -> Result<CharGroup> {
        if self.eat('x') {
            let digits = self.take(2, |ch| ch.is_ascii_hexdigit());
            if digits.len() != 2 {
                return Err(self.syntax("expected two hex digits after \\x"));
            }
            return self.code_point(&digits, 16);
        }
        if self.eat('0') {
            let digits = self.take(2, is_octal);
            if digits.is_empty() {
                return Ok(CharGroup::literal('\0'));
            }
            return self.code_point(&digits, 8);
        }
        if inner {
            let digits = self.take(3, is_octal);
            if !digits.is_empty() {
                return self.code_point(&digits, 8);
            }
            if self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
                return Err(self.syntax("bad escape in character class"));
            }
        } else {
            let octal = self.chars.len() >= self.pos + 3
                && self.chars[self.pos..self.pos + 3].iter().all(|&ch| is_octal(ch));
            if octal {
                let digits = self.take(3, is_octal);
                return self.code_point(&digits, 8);
            }
            if self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
                return Err(Error::UnsupportedFeature("numeric back-references".into()));
            }
        }

        let Some(ch) = self.bump() else {
            return Err(self.syntax("incomplete escape"));
        };
        if !inner && RESERVED_ESCAPES.contains(&ch) {
            return Err(Error::UnsupportedFeature(format!("escape \\{}", ch)));
        }
        if let Some(group) = shorthand(ch) {
            return Ok(group);
        }
        if ch.is_alphabetic() {
            self.pos -= 1;
            return Err(self.syntax(format!("unknown escape \\{}", ch)));
        }
        Ok(CharGroup::literal(ch))
    }

    /// Everything after `[`. A class with a single item collapses to that
    /// item; more items become a [`CompositeCharGroup`].
    fn class(&mut self) -> Result<Node> {
        let negated = self.eat('^');
        let mut items = Vec::new();
        loop {
            match self.peek() {
                Some(']') => break,
                Some(_) => items.push(self.class_item()?),
                None => return Err(self.syntax("unterminated character class")),
            }
        }
        if items.is_empty() {
            return Err(self.syntax("empty character class"));
        }
        self.pos += 1;

        if items.len() == 1 {
            let item = items.remove(0);
            let item = if negated { item.complemented() } else { item };
            return Ok(Node::CharGroup(item));
        }
        Ok(Node::Composite(CompositeCharGroup::new(items, negated)))
    }

    fn class_item(&mut self) -> Result<CharGroup> {
        let start = self.pos;
        let low = self.class_char()?;
        if !self.eat('-') {
            return Ok(low);
        }
        let high = self.class_char()?;
        match (low.single(), high.single()) {
            (Some(low), Some(high)) if low <= high => Ok(CharGroup::new(low..=high, false)),
            _ => Err(Error::InvalidRange {
                range: self.text(start, self.pos),
            }),
        }
    }

    fn class_char(&mut self) -> Result<CharGroup> {
        match self.peek() {
            Some('\\') => {
                self.pos += 1;
                self.escape(true)
            }
            Some(ch) if !SPECIAL_INNER.contains(&ch) => {
                self.pos += 1;
                Ok(CharGroup::literal(ch))
            }
            Some(ch) => Err(self.syntax(format!("unexpected {:?} in character class", ch))),
            None => Err(self.syntax("unterminated character class")),
        }
    }
}
