//! Languages served by the remote database

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GarlandError;

/// Language segment embedded in every document URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    De,
    Fr,
    Ja,
}

impl Language {
    /// Returns a slice containing all language variants.
    pub fn all() -> &'static [Language] {
        &[Language::En, Language::De, Language::Fr, Language::Ja]
    }

    /// Two-letter code used in request paths
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
            Language::Fr => "fr",
            Language::Ja => "ja",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = GarlandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "de" => Ok(Language::De),
            "fr" => Ok(Language::Fr),
            "ja" => Ok(Language::Ja),
            other => Err(GarlandError::InvalidConfig(format!(
                "unsupported language '{}', expected one of: en, de, fr, ja",
                other
            ))),
        }
    }
}
