//! Voice catalog modelling and narration voice selection.

use async_trait::async_trait;
use strum_macros::IntoStaticStr;

use crate::Result;

/// A perceived-quality hint derived from a voice's display name.
///
/// Synthesis engines rarely expose quality metadata directly, but many tag
/// their better voices in the display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub enum VoiceQuality {
    /// The name advertises a natural-sounding voice.
    Natural,
    /// The name advertises a premium voice.
    Premium,
    /// No quality hint in the name.
    Standard,
}

/// A voice installed in the synthesis engine's catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    id: String,
    name: String,
    language: String,
    local_service: bool,
}

impl Voice {
    /// Creates a voice record.
    ///
    /// `id` is the engine's stable identifier for the voice, `language` a
    /// BCP-47 tag such as `en-US`, and `local_service` whether the voice is
    /// rendered on-device (typically lower perceived quality than remote
    /// voices).
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        language: impl Into<String>,
        local_service: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language: language.into(),
            local_service,
        }
    }

    /// The engine's stable identifier for this voice.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The display name of this voice.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The BCP-47 language tag of this voice.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Whether this voice is rendered on-device.
    pub fn is_local_service(&self) -> bool {
        self.local_service
    }

    /// Whether this voice speaks English, in any regional variant.
    pub fn is_english(&self) -> bool {
        let mut lang = self.language.chars();
        lang.next().map(|c| c.eq_ignore_ascii_case(&'e')) == Some(true)
            && lang.next().map(|c| c.eq_ignore_ascii_case(&'n')) == Some(true)
    }

    /// The quality hint derived from this voice's display name.
    pub fn quality(&self) -> VoiceQuality {
        let name = self.name.to_lowercase();
        if name.contains("natural") {
            VoiceQuality::Natural
        } else if name.contains("premium") {
            VoiceQuality::Premium
        } else {
            VoiceQuality::Standard
        }
    }
}

/// Selects the best narration voice from the catalog.
///
/// Preference predicates are evaluated most specific first: natural-quality
/// English, premium English, remote English, any English, any remote voice,
/// any voice at all. The first voice in catalog order satisfying the earliest
/// predicate with at least one match wins. Returns `None` only for an empty
/// catalog.
pub fn select_voice(voices: &[Voice]) -> Option<&Voice> {
    let priorities: [&dyn Fn(&Voice) -> bool; 6] = [
        &|v| v.is_english() && v.quality() == VoiceQuality::Natural,
        &|v| v.is_english() && v.quality() == VoiceQuality::Premium,
        &|v| v.is_english() && !v.is_local_service(),
        &|v| v.is_english(),
        &|v| !v.is_local_service(),
        &|_| true,
    ];

    for priority in priorities {
        if let Some(voice) = voices.iter().find(|v| priority(v)) {
            return Some(voice);
        }
    }
    None
}

/// The source of [`Voice`] records.
///
/// Catalogs may populate lazily; the playback controller awaits the catalog
/// before resolving a voice for a new session.
#[async_trait]
pub trait VoiceCatalog: Send + Sync {
    /// Returns the voices currently installed in the engine.
    async fn voices(&self) -> Result<Vec<Voice>>;
}

/// A catalog backed by a fixed list of voices.
pub struct StaticCatalog {
    voices: Vec<Voice>,
}

impl StaticCatalog {
    /// Creates a catalog holding the given voices.
    pub fn new(voices: Vec<Voice>) -> Self {
        Self { voices }
    }
}

#[async_trait]
impl VoiceCatalog for StaticCatalog {
    async fn voices(&self) -> Result<Vec<Voice>> {
        Ok(self.voices.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(id: &str, name: &str, lang: &str) -> Voice {
        Voice::new(id, name, lang, false)
    }

    fn local(id: &str, name: &str, lang: &str) -> Voice {
        Voice::new(id, name, lang, true)
    }

    #[test]
    fn prefers_natural_english() {
        let voices = vec![
            local("v1", "Standard", "en-US"),
            local("v2", "Natural Voice", "en-US"),
        ];
        assert_eq!(select_voice(&voices).unwrap().id(), "v2");
    }

    #[test]
    fn prefers_premium_over_plain_remote() {
        let voices = vec![
            remote("v1", "Cloud English", "en-GB"),
            remote("v2", "Premium English", "en-GB"),
        ];
        assert_eq!(select_voice(&voices).unwrap().id(), "v2");
    }

    #[test]
    fn falls_back_to_remote_english() {
        let voices = vec![
            local("v1", "On Device", "en-US"),
            remote("v2", "Cloud", "en-US"),
        ];
        assert_eq!(select_voice(&voices).unwrap().id(), "v2");
    }

    #[test]
    fn falls_back_to_any_english_then_any_remote() {
        let voices = vec![local("v1", "Voix", "fr-FR"), local("v2", "Stimme", "en-AU")];
        assert_eq!(select_voice(&voices).unwrap().id(), "v2");

        let voices = vec![local("v1", "Voix", "fr-FR"), remote("v2", "Stimme", "de-DE")];
        assert_eq!(select_voice(&voices).unwrap().id(), "v2");
    }

    #[test]
    fn catalog_order_breaks_ties() {
        let voices = vec![
            remote("v1", "Natural A", "en-US"),
            remote("v2", "Natural B", "en-US"),
        ];
        assert_eq!(select_voice(&voices).unwrap().id(), "v1");
    }

    #[test]
    fn empty_catalog_selects_nothing() {
        assert!(select_voice(&[]).is_none());
    }

    #[test]
    fn quality_hint_is_case_insensitive() {
        assert_eq!(
            remote("v", "Microsoft NATURAL Aria", "en-US").quality(),
            VoiceQuality::Natural
        );
        assert_eq!(
            remote("v", "Premium+", "en-US").quality(),
            VoiceQuality::Premium
        );
        assert_eq!(remote("v", "Aria", "en-US").quality(), VoiceQuality::Standard);
    }

    #[test]
    fn language_match_ignores_case() {
        assert!(remote("v", "A", "EN-us").is_english());
        assert!(!remote("v", "A", "fr-FR").is_english());
    }
}
