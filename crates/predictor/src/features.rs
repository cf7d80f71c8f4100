//! Feature vector construction and validation
//!
//! Every entry point (form, JSON API, sample rows, CLI) builds its input
//! through [`FeatureVector::from_raw`] so validation cannot drift between
//! code paths.

use crate::errors::{PredictorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Youngest accepted age (inclusive)
pub const AGE_MIN: i64 = 18;
/// Oldest accepted age (inclusive)
pub const AGE_MAX: i64 = 80;
/// Number of features the classifier was fit on
pub const FEATURE_COUNT: usize = 2;
/// Feature names in fit order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = ["age", "gender"];

/// Encoded gender as seen by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Numeric code the model was trained with
    pub fn code(self) -> i64 {
        match self {
            Gender::Female => 0,
            Gender::Male => 1,
        }
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Gender::Female),
            1 => Ok(Gender::Male),
            other => Err(PredictorError::InvalidInput(format!(
                "gender code {other} is not 0 (female) or 1 (male)"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        if value.is_empty() {
            return Err(PredictorError::InvalidInput("missing gender value".into()));
        }
        match value.to_ascii_lowercase().as_str() {
            "0" | "f" | "female" => Ok(Gender::Female),
            "1" | "m" | "male" => Ok(Gender::Male),
            _ => Err(PredictorError::InvalidInput(format!(
                "unknown gender '{value}' (expected male/female or 1/0)"
            ))),
        }
    }
}

/// Model input: `[age, gender]` in fit order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureVector {
    pub age: i64,
    pub gender: Gender,
}

impl FeatureVector {
    /// Build a validated vector from an age and a typed gender.
    pub fn new(age: i64, gender: Gender) -> Result<Self> {
        let vector = Self { age, gender };
        vector.validate()?;
        Ok(vector)
    }

    /// Build a validated vector from raw user-supplied values.
    pub fn from_raw(age: i64, gender_code: i64) -> Result<Self> {
        Self::new(age, Gender::from_code(gender_code)?)
    }

    /// Parse text fields, as submitted by a form or read from a CSV cell.
    pub fn parse(age: &str, gender: &str) -> Result<Self> {
        let age_text = age.trim();
        if age_text.is_empty() {
            return Err(PredictorError::InvalidInput("missing age value".into()));
        }
        let age = age_text.parse::<i64>().map_err(|_| {
            PredictorError::InvalidInput(format!("age '{age_text}' is not a whole number"))
        })?;
        let gender = gender.parse::<Gender>()?;
        Self::new(age, gender)
    }

    /// Check the declared domains.
    pub fn validate(&self) -> Result<()> {
        if !(AGE_MIN..=AGE_MAX).contains(&self.age) {
            return Err(PredictorError::InvalidInput(format!(
                "age {} is outside {AGE_MIN}..={AGE_MAX}",
                self.age
            )));
        }
        Ok(())
    }

    /// Numeric features in fit order
    pub fn to_features(&self) -> [f64; FEATURE_COUNT] {
        [self.age as f64, self.gender.code() as f64]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_bounds_are_inclusive() {
        assert!(FeatureVector::from_raw(18, 0).is_ok());
        assert!(FeatureVector::from_raw(80, 1).is_ok());
        assert!(matches!(
            FeatureVector::from_raw(17, 0),
            Err(PredictorError::InvalidInput(_))
        ));
        assert!(matches!(
            FeatureVector::from_raw(81, 1),
            Err(PredictorError::InvalidInput(_))
        ));
    }

    #[test]
    fn gender_codes() {
        assert_eq!(Gender::from_code(0).unwrap(), Gender::Female);
        assert_eq!(Gender::from_code(1).unwrap(), Gender::Male);
        assert!(Gender::from_code(2).is_err());
        assert_eq!(Gender::Male.code(), 1);
    }

    #[test]
    fn gender_names_parse_case_insensitively() {
        assert_eq!("Male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!(" f ".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("1".parse::<Gender>().unwrap(), Gender::Male);
        assert!("other".parse::<Gender>().is_err());
        assert_eq!(
            "".parse::<Gender>().unwrap_err(),
            PredictorError::InvalidInput("missing gender value".into())
        );
    }

    #[test]
    fn parse_text_fields() {
        let v = FeatureVector::parse("25", "male").unwrap();
        assert_eq!(v.to_features(), [25.0, 1.0]);
        assert!(FeatureVector::parse("25.5", "male").is_err());
        assert!(FeatureVector::parse(" ", "male").is_err());
    }

    #[test]
    fn validate_catches_direct_construction() {
        let v = FeatureVector {
            age: 5,
            gender: Gender::Female,
        };
        assert!(v.validate().is_err());
    }
}
