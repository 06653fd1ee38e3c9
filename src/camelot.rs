//!
//! src/camelot.rs  Andrew Belles  Oct 16th, 2026
//!
//! Camelot wheel keys: parsing of codes like "4A"/"10B" and the
//! harmonic-mixing neighbour rule used to decide key compatibility
//!
//!

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    A,   // minor
    B    // major
}

impl Mode {
    pub fn opposite(self) -> Self {
        match self {
            Mode::A => Mode::B,
            Mode::B => Mode::A
        }
    }
}

/// Position on the wheel, number in 1..=12
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Camelot {
    number: u8,
    mode: Mode
}

impl Camelot {
    pub fn new(number: u8, mode: Mode) -> Option<Self> {
        (1..=12).contains(&number).then_some(Self { number, mode })
    }

    /// Parses `<1-12><A|B>`, case-insensitive, surrounding whitespace allowed.
    /// Anything else is None, never an error.
    pub fn parse(code: &str) -> Option<Self> {
        let trimmed = code.trim();
        let letter = trimmed.chars().last()?;
        let digits = &trimmed[..trimmed.len() - letter.len_utf8()];

        let mode = match letter.to_ascii_uppercase() {
            'A' => Mode::A,
            'B' => Mode::B,
            _ => return None
        };
        if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let number: u8 = digits.parse().ok()?;
        Self::new(number, mode)
    }

    /// Wheel step in the same mode, wrapping 12 -> 1 and 1 -> 12
    fn step(self, delta: i8) -> Self {
        let n = (self.number as i8 - 1 + delta).rem_euclid(12) as u8 + 1;
        Self { number: n, mode: self.mode }
    }

    /// Keys a mix can move to from `self`: itself, one step either way on
    /// the same ring, and the relative key on the other ring.
    pub fn neighbors(self) -> [Camelot; 4] {
        [
            self,
            self.step(-1),
            self.step(1),
            Self { number: self.number, mode: self.mode.opposite() }
        ]
    }

    pub fn is_neighbor(self, other: Camelot) -> bool {
        self.neighbors().contains(&other)
    }
}

impl fmt::Display for Camelot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self.mode {
            Mode::A => 'A',
            Mode::B => 'B'
        };
        write!(f, "{}{}", self.number, letter)
    }
}

/// Free-function form used by the data boundary, tolerates absent codes
pub fn parse_camelot(code: Option<&str>) -> Option<Camelot> {
    code.and_then(Camelot::parse)
}

/// True iff `b` is one of the neighbours of `a`. Absent keys never match.
/// Queried from the already placed track towards the candidate.
pub fn is_adjacent(a: Option<Camelot>, b: Option<Camelot>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.is_neighbor(b),
        _ => false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn key(n: u8, m: Mode) -> Camelot {
        Camelot::new(n, m).unwrap()
    }

    #[test]
    fn parses_every_valid_code_in_any_case() {
        for n in 1..=12u8 {
            for (letter, mode) in [('A', Mode::A), ('B', Mode::B)] {
                let expect = Some(key(n, mode));
                assert_eq!(Camelot::parse(&format!("{n}{letter}")), expect);
                assert_eq!(
                    Camelot::parse(&format!("  {n}{}\t", letter.to_ascii_lowercase())),
                    expect
                );
            }
        }
    }

    #[test]
    fn rejects_malformed_codes() {
        for bad in ["", " ", "A", "0A", "13B", "4C", "4 A", "A4", "+4A", "004A", "4AB", "1.5A", "４A"] {
            assert_eq!(Camelot::parse(bad), None, "{bad:?} should not parse");
        }
        assert_eq!(parse_camelot(None), None);
    }

    #[test]
    fn display_round_trips() {
        let k = key(10, Mode::B);
        assert_eq!(k.to_string(), "10B");
        assert_eq!(Camelot::parse(&k.to_string()), Some(k));
    }

    #[test]
    fn neighbors_are_four_distinct_keys_including_self() {
        for n in 1..=12u8 {
            for mode in [Mode::A, Mode::B] {
                let k = key(n, mode);
                let set: HashSet<Camelot> = k.neighbors().into_iter().collect();
                assert_eq!(set.len(), 4);
                assert!(set.contains(&k));
            }
        }
    }

    #[test]
    fn neighbors_wrap_around_the_wheel() {
        let n = key(12, Mode::A).neighbors();
        assert!(n.contains(&key(11, Mode::A)));
        assert!(n.contains(&key(1, Mode::A)));
        assert!(n.contains(&key(12, Mode::B)));

        let n = key(1, Mode::B).neighbors();
        assert!(n.contains(&key(12, Mode::B)));
        assert!(n.contains(&key(2, Mode::B)));
        assert!(n.contains(&key(1, Mode::A)));
    }

    #[test]
    fn adjacency_rules() {
        let k = Some(key(4, Mode::A));
        assert!(is_adjacent(k, Some(key(4, Mode::A))));
        assert!(is_adjacent(k, Some(key(5, Mode::A))));
        assert!(is_adjacent(k, Some(key(3, Mode::A))));
        assert!(is_adjacent(k, Some(key(4, Mode::B))));
        assert!(!is_adjacent(k, Some(key(5, Mode::B))));
        assert!(!is_adjacent(k, Some(key(8, Mode::B))));
        assert!(!is_adjacent(k, None));
        assert!(!is_adjacent(None, k));
    }

    #[test]
    fn adjacency_is_symmetric_for_parsed_keys() {
        for a in 1..=12u8 {
            for b in 1..=12u8 {
                for (ma, mb) in [(Mode::A, Mode::A), (Mode::A, Mode::B), (Mode::B, Mode::B)] {
                    let (x, y) = (Some(key(a, ma)), Some(key(b, mb)));
                    assert_eq!(is_adjacent(x, y), is_adjacent(y, x));
                }
            }
        }
    }
}
