use std::fmt;
use std::ops::Add;

use clap::ValueEnum;
use serde::{Deserialize, Serialize, Serializer};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Judge,
    Participant,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Judge, Role::Participant];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Judge => "judge",
            Self::Participant => "participant",
        }
    }

    pub fn markers(self) -> &'static [&'static str] {
        match self {
            Self::Judge => &["심사위원", "judge"],
            Self::Participant => &["참가자", "participant"],
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.markers().contains(&marker))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Zh,
    Ja,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Zh, Language::Ja];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
            Self::Ja => "ja",
        }
    }

    pub fn markers(self) -> &'static [&'static str] {
        match self {
            Self::En => &["영어", "en"],
            Self::Zh => &["중국어", "zh"],
            Self::Ja => &["일본어", "ja"],
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|language| language.markers().contains(&marker))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A count that may be unavailable. `NotApplicable` is sticky under addition
/// so a partial sum can never masquerade as a real total.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tally {
    Count(i64),
    NotApplicable,
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, rhs: Tally) -> Tally {
        match (self, rhs) {
            (Self::Count(left), Self::Count(right)) => Self::Count(left + right),
            _ => Self::NotApplicable,
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(value) => write!(f, "{value}"),
            Self::NotApplicable => f.write_str("N/A"),
        }
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Count(value) => serializer.serialize_i64(*value),
            Self::NotApplicable => serializer.serialize_str("N/A"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_resolve_in_both_spellings() {
        assert_eq!(Role::from_marker("심사위원"), Some(Role::Judge));
        assert_eq!(Role::from_marker("participant"), Some(Role::Participant));
        assert_eq!(Role::from_marker("staff"), None);
        assert_eq!(Language::from_marker("중국어"), Some(Language::Zh));
        assert_eq!(Language::from_marker("ja"), Some(Language::Ja));
        assert_eq!(Language::from_marker("fr"), None);
    }

    #[test]
    fn not_applicable_absorbs_sums() {
        assert_eq!(Tally::Count(2) + Tally::Count(-1), Tally::Count(1));
        assert_eq!(Tally::Count(2) + Tally::NotApplicable, Tally::NotApplicable);
        assert_eq!(Tally::NotApplicable + Tally::Count(2), Tally::NotApplicable);
    }

    #[test]
    fn tally_serializes_as_number_or_marker() {
        assert_eq!(serde_json::to_string(&Tally::Count(-2)).unwrap(), "-2");
        assert_eq!(
            serde_json::to_string(&Tally::NotApplicable).unwrap(),
            "\"N/A\""
        );
        assert_eq!(Tally::NotApplicable.to_string(), "N/A");
    }
}
