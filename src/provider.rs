//! Trait seams for the collaborators the engine consumes.
//!
//! Content extraction, settings persistence, and the UI layer live outside
//! this crate. The playback controller only ever sees them through the traits
//! defined here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// The narratable content of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    /// The extracted page text.
    pub text: String,
    /// The page title.
    pub title: String,
}

/// Supplies the content of the page being narrated.
///
/// Failure to extract content, for example on an unsupported page, must
/// surface as an error rather than silently producing empty text.
#[async_trait]
pub trait PageContentProvider: Send + Sync {
    /// Returns the text and title of the current page.
    async fn page_content(&self) -> Result<PageContent>;
}

/// Persisted narration defaults.
///
/// The engine treats these purely as default
/// [`PlaybackOptions`](crate::playback::PlaybackOptions); how and where they
/// are stored is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationSettings {
    /// The persisted voice id, resolved against the catalog at start time.
    pub voice_id: Option<String>,
    /// Default rate of speech.
    pub rate: f32,
    /// Default pitch.
    pub pitch: f32,
    /// Default volume.
    pub volume: f32,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            voice_id: None,
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// Loads the persisted narration settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Returns the persisted settings, or the defaults when nothing has been
    /// persisted yet.
    async fn load(&self) -> Result<NarrationSettings>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_to_unit_values() {
        let settings = NarrationSettings::default();
        assert_eq!(settings.voice_id, None);
        assert_eq!(settings.rate, 1.0);
        assert_eq!(settings.pitch, 1.0);
        assert_eq!(settings.volume, 1.0);
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let settings: NarrationSettings =
            serde_json::from_str(r#"{"voice_id": "urn:voice:aria"}"#).unwrap();
        assert_eq!(settings.voice_id.as_deref(), Some("urn:voice:aria"));
        assert_eq!(settings.rate, 1.0);
        assert_eq!(settings.volume, 1.0);
    }
}
