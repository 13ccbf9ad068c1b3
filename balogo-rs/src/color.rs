//! Word colors.

use std::fmt;
use std::str::FromStr;

/// A color in strict `#RRGGBB` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexColor(String);

impl HexColor {
    /// Default color of the left word.
    pub fn default_left() -> Self {
        Self("#128AFA".to_string())
    }

    /// Default color of the right word.
    pub fn default_right() -> Self {
        Self("#2B2B2B".to_string())
    }

    /// Accepts exactly `#` followed by six hex digits, either case.
    pub fn parse(input: &str) -> Option<Self> {
        let digits = input.strip_prefix('#')?;
        if digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(input.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for HexColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("expected a #RRGGBB color, got {s:?}"))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#ABCDEF")]
    #[case("#123456")]
    #[case("#abcdef")]
    #[case("#128AFA")]
    fn test_accepts_hex(#[case] input: &str) {
        assert_eq!(HexColor::parse(input).map(|c| c.to_string()), Some(input.to_string()));
    }

    #[rstest]
    #[case("ABCDEF")]
    #[case("#ABCD")]
    #[case("#abcdefg")]
    #[case("")]
    #[case("#12345G")]
    #[case("1#23456")]
    #[case("#ÅBCDE")]
    fn test_rejects_malformed(#[case] input: &str) {
        assert_eq!(HexColor::parse(input), None);
        assert!(input.parse::<HexColor>().is_err());
    }
}
