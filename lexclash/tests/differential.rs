//! Compiled automata checked against a backtracking engine on every short
//! string over a small pool of characters.

use fancy_regex::Regex;
use lexclash::parse;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `§` is never mentioned by a pattern, so it always reads as `Other`.
const POOL: &[char] = &['a', 'b', 'c', '1', '§'];
const MAX_LEN: usize = 4;

fn strings(pool: &[char], max_len: usize) -> Vec<String> {
    let mut all = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..max_len {
        let next: Vec<String> = frontier
            .iter()
            .flat_map(|prefix| {
                pool.iter().map(move |&ch| {
                    let mut s = prefix.clone();
                    s.push(ch);
                    s
                })
            })
            .collect();
        all.extend(next.iter().cloned());
        frontier = next;
    }
    all
}

fn check(pattern: &str, inputs: &[String]) {
    let reference = Regex::new(&format!("(?s)^(?:{})$", pattern))
        .unwrap_or_else(|err| panic!("reference rejected {:?}: {}", pattern, err));
    let dfa = parse(pattern)
        .and_then(|parsed| parsed.to_automaton())
        .unwrap_or_else(|err| panic!("failed to compile {:?}: {}", pattern, err));
    for input in inputs {
        assert_eq!(
            dfa.accepts(input),
            reference.is_match(input).unwrap(),
            "pattern {:?} on input {:?}",
            pattern,
            input
        );
    }
}

#[test]
fn hand_picked_patterns_agree() {
    let inputs = strings(POOL, MAX_LEN);
    let patterns = [
        "a|b",
        "a*",
        "[a-c_][a-c_1]*",
        "[^a]",
        "a+?b{1,2}",
        "(?:ab|c)*1?",
        ".{2}",
        "[^ab1]+",
        "\\w\\W",
        "\\d*[^\\d]",
        "(?=a)[a-c]+",
        "(?!ab)[a-c]*",
        "a(?=b|c)[bc]+",
        "(?=a)(?!ab)(?=[a-c]{2}).*",
        "(?:a(?=b))b",
        "(?:a(?!b)|ab)c?",
        "(?:(?=a).){1,3}",
        "(?:(?!a)\\w){0,2}a",
        "(?!(?:a|b)(?=c))...",
        "(?=.*c).+",
        "(?!.*1).*",
        "(?:(?:a|b)(?!c)){2}c?",
    ];
    for pattern in patterns {
        check(pattern, &inputs);
    }
}

struct Generator {
    rng: StdRng,
}

impl Generator {
    const LITERALS: &'static [&'static str] = &["a", "b", "c", "1"];
    const CLASSES: &'static [&'static str] = &[
        ".", "[ab]", "[^a]", "[a-c]", "[^b1]", "\\d", "\\w", "\\W", "[\\da]",
    ];
    const BOUNDED: &'static [&'static str] = &["?", "{2}", "{0,2}", "{1,3}"];
    const UNBOUNDED: &'static [&'static str] = &["*", "+", "{2,}"];

    fn pick<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.random_range(0..choices.len())]
    }

    /// Returns the pattern text and whether it holds a lookahead.
    fn pattern(&mut self, depth: u32) -> (String, bool) {
        let branches = if depth > 0 && self.rng.random_bool(0.3) { 2 } else { 1 };
        let mut texts = Vec::new();
        let mut looks = false;
        for _ in 0..branches {
            let (text, look) = self.concatenation(depth);
            texts.push(text);
            looks |= look;
        }
        (texts.join("|"), looks)
    }

    fn concatenation(&mut self, depth: u32) -> (String, bool) {
        let mut text = String::new();
        let mut looks = false;
        for _ in 0..self.rng.random_range(1..=3) {
            if depth > 0 && self.rng.random_bool(0.2) {
                let (inner, _) = self.pattern(depth - 1);
                let kind = if self.rng.random_bool(0.5) { '=' } else { '!' };
                text.push_str(&format!("(?{}{})", kind, inner));
                looks = true;
            } else {
                let (item, look) = self.quantified(depth);
                text.push_str(&item);
                looks |= look;
            }
        }
        (text, looks)
    }

    fn quantified(&mut self, depth: u32) -> (String, bool) {
        let (mut text, look) = self.atom(depth);
        if self.rng.random_bool(0.5) {
            let quantifier = if look || self.rng.random_bool(0.5) {
                self.pick(Self::BOUNDED)
            } else {
                self.pick(Self::UNBOUNDED)
            };
            text.push_str(quantifier);
            if self.rng.random_bool(0.2) {
                text.push('?');
            }
        }
        (text, look)
    }

    fn atom(&mut self, depth: u32) -> (String, bool) {
        match self.rng.random_range(0..if depth > 0 { 3 } else { 2 }) {
            0 => (self.pick(Self::LITERALS).to_string(), false),
            1 => (self.pick(Self::CLASSES).to_string(), false),
            _ => {
                let (inner, look) = self.pattern(depth - 1);
                (format!("(?:{})", inner), look)
            }
        }
    }
}

#[test]
fn random_patterns_agree() {
    let inputs = strings(POOL, MAX_LEN);
    let mut generator = Generator {
        rng: StdRng::seed_from_u64(0x1e7c_1a54),
    };
    for _ in 0..200 {
        let (pattern, _) = generator.pattern(3);
        check(&pattern, &inputs);
    }
}

#[test]
fn rendered_patterns_compile_to_the_same_language() {
    let mut generator = Generator {
        rng: StdRng::seed_from_u64(7),
    };
    for _ in 0..100 {
        let (text, _) = generator.pattern(3);
        let parsed = parse(&text).unwrap();
        let rendered = parsed.to_string();
        let reparsed = parse(&rendered)
            .unwrap_or_else(|err| panic!("{:?} rendered as {:?}: {}", text, rendered, err));
        let alphabet = parsed.alphabet().union(reparsed.alphabet());
        let original = lexclash::compile(&parsed, &alphabet).unwrap();
        let roundtrip = lexclash::compile(&reparsed, &alphabet).unwrap();
        assert!(
            original.equivalent(&roundtrip),
            "{:?} rendered as {:?}",
            text,
            rendered
        );
    }
}
