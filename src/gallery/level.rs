//! Query parameter validation: academic level and roll number.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ValidationError;

/// Academic tier. Each level is a child folder of the root image folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Level {
    #[serde(rename = "UG")]
    Undergraduate,
    #[serde(rename = "PG")]
    Postgraduate,
    #[serde(rename = "PHD")]
    Doctorate,
}

impl Level {
    /// All levels in display order.
    pub const ALL: [Level; 3] = [Level::Undergraduate, Level::Postgraduate, Level::Doctorate];

    /// Folder name and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Undergraduate => "UG",
            Level::Postgraduate => "PG",
            Level::Doctorate => "PHD",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ValidationError;

    /// Exact, case-sensitive match against `UG`, `PG`, `PHD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidLevel(s.to_string()))
    }
}

/// A student roll number: exactly ten ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RollNumber(String);

impl RollNumber {
    /// Required number of digits.
    pub const LENGTH: usize = 10;

    /// Validate and wrap a roll number.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if s.len() == Self::LENGTH && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(RollNumber(s.to_string()))
        } else {
            Err(ValidationError::InvalidRollNumber)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RollNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated image listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageQuery {
    pub level: Level,
    pub roll_number: Option<RollNumber>,
}

impl ImageQuery {
    /// Validate raw query parameters.
    ///
    /// Empty strings count as absent. The level is checked first, so an
    /// invalid level is reported regardless of the roll number. When
    /// `require_roll_number` is set a missing roll number is rejected too.
    pub fn validate(
        level: Option<&str>,
        roll_number: Option<&str>,
        require_roll_number: bool,
    ) -> Result<Self, ValidationError> {
        let level = match level.filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<Level>()?,
            None => return Err(ValidationError::MissingLevel),
        };

        let roll_number = match roll_number.filter(|s| !s.is_empty()) {
            Some(raw) => Some(RollNumber::parse(raw)?),
            None if require_roll_number => return Err(ValidationError::MissingRollNumber),
            None => None,
        };

        Ok(ImageQuery { level, roll_number })
    }
}
