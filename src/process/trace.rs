/*!
 * Execution Traces
 * Pre-recorded per-quantum outcomes, consumed front to back
 */

use crate::core::errors::{TraceError, TraceResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Outcome of one quantum
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Quantum fully used, more work remains
    Continue,
    /// Quantum released voluntarily
    Yield,
    /// No more work
    Terminate,
}

impl Symbol {
    /// Parse from the trace encoding
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "1" => Some(Self::Continue),
            "0" => Some(Self::Yield),
            "-" => Some(Self::Terminate),
            _ => None,
        }
    }

    /// Trace encoding of this symbol
    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Continue => "1",
            Self::Yield => "0",
            Self::Terminate => "-",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Symbol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid symbol '{}', expected 1, 0 or -", s))
        })
    }
}

/// Forward-only sequence of outcome symbols
///
/// Symbols are never replayed; the only lookahead is [`Trace::peek`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trace {
    symbols: Vec<Symbol>,
    cursor: usize,
}

impl Trace {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols, cursor: 0 }
    }

    /// Parse a textual trace belonging to process `index`
    ///
    /// Symbols may be separated by whitespace, newlines or commas. Lines whose
    /// first non-blank character is `#` are ignored.
    pub fn parse(index: usize, input: &str) -> TraceResult<Self> {
        let mut symbols = Vec::new();

        let tokens = input
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .flat_map(|line| line.split(|c: char| c.is_whitespace() || c == ','))
            .filter(|token| !token.is_empty());

        for (position, token) in tokens.enumerate() {
            let symbol = Symbol::parse(token).ok_or_else(|| TraceError::Malformed {
                index,
                position,
                token: token.to_string(),
            })?;
            symbols.push(symbol);
        }

        Ok(Self::new(symbols))
    }

    /// Return the next symbol and advance past it
    pub fn consume_next(&mut self) -> TraceResult<Symbol> {
        let symbol = *self.symbols.get(self.cursor).ok_or(TraceError::Exhausted)?;
        self.cursor += 1;
        Ok(symbol)
    }

    /// One-symbol lookahead
    #[inline]
    pub fn peek(&self) -> Option<Symbol> {
        self.symbols.get(self.cursor).copied()
    }

    /// Symbols not yet consumed
    #[inline]
    pub fn remaining(&self) -> usize {
        self.symbols.len() - self.cursor
    }

    /// Symbols consumed so far
    #[inline]
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

impl From<Vec<Symbol>> for Trace {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self::new(symbols)
    }
}

impl FromIterator<Symbol> for Trace {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_parsing() {
        assert_eq!(Symbol::parse("1"), Some(Symbol::Continue));
        assert_eq!(Symbol::parse("0"), Some(Symbol::Yield));
        assert_eq!(Symbol::parse("-"), Some(Symbol::Terminate));
        assert_eq!(Symbol::parse("2"), None);
        assert_eq!(Symbol::parse(""), None);
    }

    #[test]
    fn test_consume_is_forward_only() {
        let mut trace = Trace::new(vec![Symbol::Continue, Symbol::Terminate]);
        assert_eq!(trace.remaining(), 2);
        assert_eq!(trace.peek(), Some(Symbol::Continue));

        assert_eq!(trace.consume_next(), Ok(Symbol::Continue));
        assert_eq!(trace.consume_next(), Ok(Symbol::Terminate));
        assert!(trace.is_exhausted());
        assert_eq!(trace.consumed(), 2);
    }

    #[test]
    fn test_consume_empty_trace() {
        let mut trace = Trace::default();
        assert_eq!(trace.consume_next(), Err(TraceError::Exhausted));
        // Still exhausted, cursor does not move
        assert_eq!(trace.consume_next(), Err(TraceError::Exhausted));
        assert_eq!(trace.consumed(), 0);
    }

    #[test]
    fn test_parse_separators_and_comments() {
        let mut trace = Trace::parse(0, "# recorded run\n1 0\n1,1\n  -\n").unwrap();
        assert_eq!(trace.remaining(), 5);

        let mut symbols = Vec::new();
        while let Ok(symbol) = trace.consume_next() {
            symbols.push(symbol);
        }
        assert_eq!(
            symbols,
            vec![
                Symbol::Continue,
                Symbol::Yield,
                Symbol::Continue,
                Symbol::Continue,
                Symbol::Terminate
            ]
        );
    }

    #[test]
    fn test_parse_rejects_unknown_token() {
        let err = Trace::parse(7, "1 0 x -").unwrap_err();
        assert_eq!(
            err,
            TraceError::Malformed {
                index: 7,
                position: 2,
                token: "x".to_string()
            }
        );
    }

    #[test]
    fn test_symbol_serde() {
        let json = serde_json::to_string(&Symbol::Yield).unwrap();
        assert_eq!(json, "\"0\"");
        let back: Symbol = serde_json::from_str("\"-\"").unwrap();
        assert_eq!(back, Symbol::Terminate);
        assert!(serde_json::from_str::<Symbol>("\"E\"").is_err());
    }
}
