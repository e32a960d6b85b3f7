//! Version coordinates: language, version number, and the combined
//! [`VersionUri`] that names exactly one stored version of an item.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::ItemId;

/// Language tag of an item version (e.g. `en`, `fr-FR`, `zh-Hans`).
///
/// Tags are case-preserving but compared exactly as stored; the repository
/// is expected to hand out canonical tags.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Language(String);

impl Language {
    /// Validate and wrap a language tag.
    ///
    /// Accepts ASCII letters, digits and `-`, must start with a letter.
    pub fn new(tag: impl Into<String>) -> Result<Self, TypeError> {
        let tag = tag.into();
        let valid = tag.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !tag.ends_with('-');
        if !valid {
            return Err(TypeError::InvalidLanguage(tag));
        }
        Ok(Self(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Language {
    type Error = TypeError;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        Self::new(tag)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Language({})", self.0)
    }
}

/// 1-based version number within one language of an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32")]
pub struct VersionNumber(u32);

impl VersionNumber {
    pub const FIRST: VersionNumber = VersionNumber(1);

    pub fn new(number: u32) -> Result<Self, TypeError> {
        if number == 0 {
            return Err(TypeError::InvalidVersionNumber(number));
        }
        Ok(Self(number))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// The version that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl TryFrom<u32> for VersionNumber {
    type Error = TypeError;

    fn try_from(number: u32) -> Result<Self, Self::Error> {
        Self::new(number)
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully qualified coordinate of one item version.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VersionUri {
    pub item: ItemId,
    pub language: Language,
    pub version: VersionNumber,
}

impl VersionUri {
    pub fn new(item: ItemId, language: Language, version: VersionNumber) -> Self {
        Self {
            item,
            language,
            version,
        }
    }
}

impl fmt::Display for VersionUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}?lang={}&ver={}", self.item, self.language, self.version)
    }
}
