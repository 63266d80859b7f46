//! Ticker symbols and normalized symbol sets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trading symbol/ticker.
///
/// Symbols are trimmed and uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, trimming and converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the exchange-less code, the part before the first `.`.
    ///
    /// `600519.SH` has the code `600519`; a symbol without a suffix is its own code.
    #[must_use]
    pub fn code(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }

    /// Returns true if the symbol is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

/// A canonical set of symbols: sorted, deduplicated, with empty entries removed.
///
/// Two sets built from the same symbols in any order, with any duplicates or any
/// casing, compare equal and render to the same comma-joined string.
///
/// ```
/// use findata_core::SymbolSet;
///
/// let a = SymbolSet::new(["b", "A", "a"]);
/// let b = SymbolSet::parse("A, B");
/// assert_eq!(a, b);
/// assert_eq!(a.joined(), "A,B");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Symbol>", into = "Vec<Symbol>")]
pub struct SymbolSet(Vec<Symbol>);

impl SymbolSet {
    /// Builds a normalized set from any collection of symbol-like values.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let mut symbols: Vec<Symbol> = symbols
            .into_iter()
            .map(Into::into)
            .filter(|s| !s.is_empty())
            .collect();
        symbols.sort();
        symbols.dedup();
        Self(symbols)
    }

    /// Parses a comma-separated list such as `"MSFT, aapl,AAPL"`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        Self::new(s.split(','))
    }

    /// Returns the comma-joined canonical form.
    #[must_use]
    pub fn joined(&self) -> String {
        self.0
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Returns the number of distinct symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set holds no symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the symbols in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.0.iter()
    }

    /// Returns the symbols as a sorted slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Symbol] {
        &self.0
    }
}

impl fmt::Display for SymbolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

impl FromStr for SymbolSet {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for SymbolSet {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<Symbol> for SymbolSet {
    fn from(symbol: Symbol) -> Self {
        Self::new([symbol])
    }
}

impl From<Vec<Symbol>> for SymbolSet {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self::new(symbols)
    }
}

impl From<SymbolSet> for Vec<Symbol> {
    fn from(set: SymbolSet) -> Self {
        set.0
    }
}

impl<S: Into<Symbol>> FromIterator<S> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a SymbolSet {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_normalization() {
        assert_eq!(Symbol::new(" aapl ").as_str(), "AAPL");
        assert_eq!(Symbol::from("600519.sh").code(), "600519");
        assert_eq!(Symbol::from("MSFT").code(), "MSFT");
    }

    #[test]
    fn test_set_ignores_order_and_duplicates() {
        let a = SymbolSet::new(["B", "A", "A"]);
        let b = SymbolSet::new(["A", "B"]);
        assert_eq!(a, b);
        assert_eq!(a.joined(), "A,B");
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_set_from_comma_list() {
        let set = SymbolSet::parse("msft, AAPL,,aapl ");
        assert_eq!(set.joined(), "AAPL,MSFT");
        assert_eq!(set, "AAPL,MSFT".parse().unwrap());
    }

    #[test]
    fn test_empty_set() {
        assert!(SymbolSet::parse(" , ,").is_empty());
        assert_eq!(SymbolSet::default().joined(), "");
    }

    #[test]
    fn test_deserialized_set_is_canonical() {
        let set: SymbolSet = serde_json::from_str(r#"["msft", "AAPL", " aapl", ""]"#).unwrap();
        assert_eq!(set, SymbolSet::parse("AAPL,MSFT"));
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["AAPL","MSFT"]"#);
    }

    #[test]
    fn test_symbol_serde_normalizes() {
        let symbol: Symbol = serde_json::from_str("\"tsla\"").unwrap();
        assert_eq!(symbol, Symbol::new("TSLA"));
        assert_eq!(serde_json::to_string(&symbol).unwrap(), "\"TSLA\"");
    }
}
