//! Request language normalization
//!
//! Category content is translated into Ukrainian and English. Every other
//! requested code, including no code at all, resolves to Ukrainian.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use crate::shared::constants::SUPPORTED_LANGUAGES;

/// Language a localized view is rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Uk,
    En,
}

impl Language {
    /// Resolve a requested language code.
    ///
    /// Only "en" is matched, ignoring ASCII case; anything else is Ukrainian.
    pub fn normalize(code: Option<&str>) -> Self {
        match code {
            Some(code) if code.eq_ignore_ascii_case("en") => Language::En,
            _ => Language::Uk,
        }
    }

    /// Two-letter code stored on translation rows
    pub fn code(&self) -> &'static str {
        match self {
            Language::Uk => "uk",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Whether a translation may be written in this language code
pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&code)
}
