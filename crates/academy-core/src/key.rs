//! Module keys: the join key between client cache, server record store,
//! and certificate lookups.
//!
//! Every piece of mutable state is addressed by the composite
//! `(level_key, chapter_id, subject_id)` triple. The triple has exactly one
//! string form, produced by [`ModuleKey::code`]; the same triple must
//! serialize identically regardless of caller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProgressError;

/// Separator used in the canonical module code.
pub const CODE_SEPARATOR: &str = "::";

/// Composite key identifying one subject's progress within a level/chapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleKey {
    /// Level key, e.g. "Niveau 1".
    pub level_key: String,
    /// Chapter identifier within the level, e.g. "2".
    pub chapter_id: String,
    /// Subject identifier within the chapter, e.g. "greens".
    pub subject_id: String,
}

impl ModuleKey {
    pub fn new(
        level_key: impl Into<String>,
        chapter_id: impl Into<String>,
        subject_id: impl Into<String>,
    ) -> Self {
        Self {
            level_key: level_key.into(),
            chapter_id: chapter_id.into(),
            subject_id: subject_id.into(),
        }
    }

    /// Canonical string form, e.g. `"Niveau 1::2::greens"`.
    pub fn code(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.level_key,
            self.chapter_id,
            self.subject_id,
            sep = CODE_SEPARATOR
        )
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for ModuleKey {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(CODE_SEPARATOR).collect();
        match parts.as_slice() {
            [level, chapter, subject]
                if !level.is_empty() && !chapter.is_empty() && !subject.is_empty() =>
            {
                Ok(ModuleKey::new(*level, *chapter, *subject))
            }
            _ => Err(ProgressError::InvalidModuleCode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_stable_for_equal_triples() {
        let a = ModuleKey::new("Niveau 1", "2", "greens");
        let b = ModuleKey::new("Niveau 1".to_string(), "2", "greens");
        assert_eq!(a.code(), b.code());
        assert_eq!(a.code(), "Niveau 1::2::greens");
        assert_eq!(a.to_string(), a.code());
    }

    #[test]
    fn parse_roundtrip() {
        let key: ModuleKey = "Niveau 1::3::creatine".parse().unwrap();
        assert_eq!(key.level_key, "Niveau 1");
        assert_eq!(key.chapter_id, "3");
        assert_eq!(key.subject_id, "creatine");
        assert_eq!(key.code().parse::<ModuleKey>().unwrap(), key);
    }

    #[test]
    fn parse_rejects_malformed_codes() {
        for bad in ["", "justone", "a::b", "a::b::c::d", "::b::c", "a::::c", "a::b::"] {
            let err = bad.parse::<ModuleKey>().unwrap_err();
            assert!(
                matches!(err, ProgressError::InvalidModuleCode(_)),
                "expected InvalidModuleCode for {bad:?}"
            );
        }
    }
}
