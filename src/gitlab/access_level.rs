use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LabError;

/// Permission tier of a group or project member.
///
/// Variants are declared in ascending order of privilege so the derived
/// `Ord` is the GitLab ordering. Discriminants are the API's integer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessLevel {
    Guest = 10,
    Reporter = 20,
    Developer = 30,
    Maintainer = 40,
}

impl AccessLevel {
    pub const ALL: [Self; 4] = [
        Self::Guest,
        Self::Reporter,
        Self::Developer,
        Self::Maintainer,
    ];

    /// Integer value sent to and received from the REST API.
    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Guest => "GUEST",
            Self::Reporter => "REPORTER",
            Self::Developer => "DEVELOPER",
            Self::Maintainer => "MAINTAINER",
        }
    }
}

impl TryFrom<u8> for AccessLevel {
    type Error = LabError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|level| level.value() == value)
            .ok_or_else(|| LabError::InvalidAccessLevel(value.to_string()))
    }
}

impl FromStr for AccessLevel {
    type Err = LabError;

    /// Accepts a level name in any case, or its integer value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Ok(value) = trimmed.parse::<u8>() {
            return Self::try_from(value).map_err(|_| LabError::InvalidAccessLevel(s.to_string()));
        }

        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LabError::InvalidAccessLevel(s.to_string()))
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Renders a raw level received from the API, including tiers outside the
/// four managed here (e.g. 50 for owners).
pub fn describe_raw_level(value: u8) -> String {
    match AccessLevel::try_from(value) {
        Ok(level) => level.to_string(),
        Err(_) => match value {
            0 => "NO_ACCESS".to_string(),
            5 => "MINIMAL_ACCESS".to_string(),
            50 => "OWNER".to_string(),
            other => format!("LEVEL_{other}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_totally_ordered() {
        assert!(AccessLevel::Guest < AccessLevel::Reporter);
        assert!(AccessLevel::Reporter < AccessLevel::Developer);
        assert!(AccessLevel::Developer < AccessLevel::Maintainer);

        let mut shuffled = vec![
            AccessLevel::Maintainer,
            AccessLevel::Guest,
            AccessLevel::Developer,
            AccessLevel::Reporter,
        ];
        shuffled.sort();
        assert_eq!(shuffled, AccessLevel::ALL.to_vec());
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("maintainer".parse::<AccessLevel>().unwrap(), AccessLevel::Maintainer);
        assert_eq!("Developer".parse::<AccessLevel>().unwrap(), AccessLevel::Developer);
        assert_eq!(" GUEST ".parse::<AccessLevel>().unwrap(), AccessLevel::Guest);
    }

    #[test]
    fn parses_api_values() {
        assert_eq!("20".parse::<AccessLevel>().unwrap(), AccessLevel::Reporter);
        assert_eq!(AccessLevel::try_from(40).unwrap(), AccessLevel::Maintainer);
        assert_eq!(AccessLevel::Developer.value(), 30);
    }

    #[test]
    fn rejects_unknown_levels() {
        for raw in ["OWNER", "admin", "", "50", "15"] {
            let err = raw.parse::<AccessLevel>().unwrap_err();
            assert!(
                matches!(err, LabError::InvalidAccessLevel(ref value) if value == raw),
                "{raw} gave {err:?}"
            );
        }
        assert!(AccessLevel::try_from(50).is_err());
    }

    #[test]
    fn describes_unmanaged_raw_levels() {
        assert_eq!(describe_raw_level(30), "DEVELOPER");
        assert_eq!(describe_raw_level(50), "OWNER");
        assert_eq!(describe_raw_level(7), "LEVEL_7");
    }
}
