use serde::{Deserialize, Serialize};

/// Identifier assigned to a title by the upstream data source
pub type ExternalId = u64;

/// 0-based row position of a title in the loaded feature matrix
pub type InternalIndex = usize;

/// Display metadata for one title (one row of the info table)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleInfo {
    pub id: ExternalId,
    pub romaji: String,
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub native: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub popularity: u64,
}

/// Language used for the displayed title
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TitleLanguage {
    #[default]
    English,
    Romaji,
    Native,
}

impl TitleInfo {
    /// Title in the requested language, falling back to romaji when missing
    pub fn display_title(&self, language: TitleLanguage) -> &str {
        let preferred = match language {
            TitleLanguage::English => self.english.as_deref(),
            TitleLanguage::Native => self.native.as_deref(),
            TitleLanguage::Romaji => None,
        };

        preferred
            .filter(|title| !title.trim().is_empty())
            .unwrap_or(&self.romaji)
    }
}
