//! Token classifier.
//!
//! A four-state automaton over the nucleotide alphabet `{A, C, G, T}` that
//! recognizes `(A|C|G|T)* G T+ C (A|C|G|T)*`:
//!
//! ```text
//!   state      A          C          G      T       other
//!   Scanning   Scanning   Scanning   SawG   Scanning Scanning
//!   SawG       Scanning   Scanning   SawG   SawGT    SawG
//!   SawGT      Scanning   Accepted   SawG   SawGT    SawGT
//! ```
//!
//! Symbols outside the alphabet leave the current state untouched, so
//! `GxTC` still matches.

use std::fmt;

/// Classification outcome for a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
  /// The token contains a `G`, one or more `T`s, then a `C`.
  Match,
  NoMatch,
}

impl Tag {
  /// The tag as written to the output sink.
  pub fn as_str(&self) -> &'static str {
    match self {
      Tag::Match => "si",
      Tag::NoMatch => "no",
    }
  }

  pub fn is_match(&self) -> bool {
    matches!(self, Tag::Match)
  }
}

impl fmt::Display for Tag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
  Scanning,
  SawG,
  SawGT,
  Accepted,
}

impl State {
  fn step(self, symbol: u8) -> State {
    match (self, symbol) {
      (State::Scanning, b'G') => State::SawG,
      (State::Scanning, _) => State::Scanning,

      (State::SawG, b'C' | b'A') => State::Scanning,
      (State::SawG, b'T') => State::SawGT,
      (State::SawG, b'G') => State::SawG,
      (State::SawG, _) => State::SawG,

      (State::SawGT, b'T') => State::SawGT,
      (State::SawGT, b'G') => State::SawG,
      (State::SawGT, b'A') => State::Scanning,
      (State::SawGT, b'C') => State::Accepted,
      (State::SawGT, _) => State::SawGT,

      (State::Accepted, _) => State::Accepted,
    }
  }
}

/// Classify a token, stopping at the first accepting symbol.
pub fn classify(token: &str) -> Tag {
  let mut state = State::Scanning;

  for &symbol in token.as_bytes() {
    state = state.step(symbol);
    if state == State::Accepted {
      return Tag::Match;
    }
  }

  Tag::NoMatch
}
