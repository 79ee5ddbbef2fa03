use std::fmt;

/// Settlement outcome encoded by the leading symbol of a result string.
/// The rest of the string is free text and is never parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Void,
    Error,
    /// No known marker (pending, blank, typo). Shown in tables, excluded
    /// from accuracy and profit.
    Unrecognized,
}

const MARKERS: [(char, Outcome); 4] = [
    ('✅', Outcome::Win),
    ('❌', Outcome::Loss),
    ('⛔', Outcome::Void),
    ('⚠', Outcome::Error),
];

impl Outcome {
    /// Decode the first character of `result`. Pure.
    pub fn classify(result: &str) -> Self {
        let Some(first) = result.chars().next() else {
            return Outcome::Unrecognized;
        };
        MARKERS
            .iter()
            .find(|(marker, _)| *marker == first)
            .map(|(_, outcome)| *outcome)
            .unwrap_or(Outcome::Unrecognized)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Win => write!(f, "win"),
            Self::Loss => write!(f, "loss"),
            Self::Void => write!(f, "void"),
            Self::Error => write!(f, "error"),
            Self::Unrecognized => write!(f, "unrecognized"),
        }
    }
}
