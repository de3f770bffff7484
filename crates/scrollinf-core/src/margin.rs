//! Root margin parsing for the observer strategy.
//!
//! Accepts the subset of CSS margin syntax intersection observers understand:
//! one to four lengths, each in `px` or `%`, expanded with the usual
//! shorthand rules.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarginLength {
    Px(f64),
    Percent(f64),
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginLength::Px(value) => write!(f, "{value}px"),
            MarginLength::Percent(value) => write!(f, "{value}%"),
        }
    }
}

/// Expanded margin, in `top right bottom left` order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl RootMargin {
    pub fn parse(margin: &str) -> Result<Self, ConfigError> {
        let invalid = |reason| ConfigError::InvalidMargin {
            margin: margin.to_string(),
            reason,
        };

        let mut lengths = Vec::with_capacity(4);
        for token in margin.split_whitespace() {
            lengths.push(parse_length(token).ok_or_else(|| invalid("lengths must be px or %"))?);
        }

        let [top, right, bottom, left] = match lengths.as_slice() {
            [] => return Err(invalid("expected at least one length")),
            [all] => [*all; 4],
            [vertical, horizontal] => [*vertical, *horizontal, *vertical, *horizontal],
            [top, horizontal, bottom] => [*top, *horizontal, *bottom, *horizontal],
            [top, right, bottom, left] => [*top, *right, *bottom, *left],
            _ => return Err(invalid("expected at most four lengths")),
        };

        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl FromStr for RootMargin {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

fn parse_length(token: &str) -> Option<MarginLength> {
    if token == "0" {
        return Some(MarginLength::Px(0.0));
    }
    let (number, unit): (&str, fn(f64) -> MarginLength) = if let Some(n) = token.strip_suffix("px")
    {
        (n, MarginLength::Px)
    } else if let Some(n) = token.strip_suffix('%') {
        (n, MarginLength::Percent)
    } else {
        return None;
    };
    let value: f64 = number.parse().ok()?;
    value.is_finite().then(|| unit(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_value_applies_to_all_sides() {
        let margin = RootMargin::parse("200px").unwrap();
        assert_eq!(margin.top, MarginLength::Px(200.0));
        assert_eq!(margin.left, MarginLength::Px(200.0));
    }

    #[test]
    fn test_shorthand_expansion() {
        let margin = RootMargin::parse("10px 5%").unwrap();
        assert_eq!(margin.to_string(), "10px 5% 10px 5%");

        let margin = RootMargin::parse("1px 2px 3px").unwrap();
        assert_eq!(margin.to_string(), "1px 2px 3px 2px");

        let margin = RootMargin::parse(" 0  -20px 0 0 ").unwrap();
        assert_eq!(margin.right, MarginLength::Px(-20.0));
    }

    #[test]
    fn test_rejects_other_units() {
        assert!(matches!(
            RootMargin::parse("2em"),
            Err(ConfigError::InvalidMargin { .. })
        ));
        assert!(RootMargin::parse("200").is_err());
    }

    #[test]
    fn test_rejects_empty_and_too_many() {
        assert!(RootMargin::parse("   ").is_err());
        assert!(RootMargin::parse("1px 1px 1px 1px 1px").is_err());
    }
}
