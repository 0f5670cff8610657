//! The stateful narration session orchestrator.
//!
//! [`PlaybackController`] owns the chunk queue, the playback state machine,
//! and callback dispatch. It feeds chunks to the synthesis engine strictly
//! one at a time and advances or terminates the session in response to the
//! engine's lifecycle events.
//!
//! Every session carries a generation token. Control calls and engine events
//! happen at arbitrary asynchronous times, so any event whose token no longer
//! matches the controller's current token is discarded unconditionally. This
//! is what makes `start()` while speaking and `stop()` followed by late
//! engine events race-free. Chunk submission and cancellation are serialized
//! under the state lock: a chunk is only ever handed to the engine while its
//! generation is current, so cancellation can never leave an orphaned
//! utterance speaking.

use std::sync::{Arc, Mutex};

use strum_macros::IntoStaticStr;
use tracing::{debug, trace, warn};

use crate::chunk::{self, DEFAULT_MAX_CHUNK_LEN};
use crate::driver::{EventStream, Utterance, UtteranceDriver, UtteranceEvent};
use crate::provider::{PageContentProvider, SettingsStore};
use crate::voice::{self, Voice, VoiceCatalog};
use crate::{Error, Result};

mod progress;

pub use progress::progress;

/// The playback state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub enum PlaybackState {
    /// No session is live.
    Idle,
    /// The current session is being narrated.
    Speaking,
    /// The current session is paused mid-utterance.
    Paused,
}

/// Options for one narration session.
#[derive(Debug, Clone)]
pub struct PlaybackOptions {
    /// The voice to narrate with. When `None`, the controller resolves one
    /// from its voice catalog.
    pub voice: Option<Voice>,
    /// Rate of speech, 1.0 being normal.
    pub rate: f32,
    /// Pitch, 1.0 being normal.
    pub pitch: f32,
    /// Volume, 1.0 being full volume.
    pub volume: f32,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            voice: None,
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// The caller's observation hooks for one narration session.
///
/// Callbacks are supplied per [`start`](PlaybackController::start) call and
/// live exactly as long as the session, so there is no registration to race
/// against. A cancelled session fires none of them.
#[derive(Default)]
pub struct PlaybackCallbacks {
    on_start: Option<Box<dyn FnMut() + Send>>,
    on_progress: Option<Box<dyn FnMut(f32) + Send>>,
    on_end: Option<Box<dyn FnMut() + Send>>,
}

impl PlaybackCallbacks {
    /// Constructs a new, empty instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per session, when the engine starts speaking the first
    /// chunk.
    pub fn on_start<F: FnMut() + Send + 'static>(mut self, f: F) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    /// Called with the aggregate progress percentage on every word boundary
    /// the engine reports.
    pub fn on_progress<F: FnMut(f32) + Send + 'static>(mut self, f: F) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Called once when the session completes naturally.
    pub fn on_end<F: FnMut() + Send + 'static>(mut self, f: F) -> Self {
        self.on_end = Some(Box::new(f));
        self
    }

    fn started(&mut self) {
        if let Some(f) = self.on_start.as_mut() {
            f()
        }
    }

    fn progressed(&mut self, percent: f32) {
        if let Some(f) = self.on_progress.as_mut() {
            f(percent)
        }
    }

    fn ended(&mut self) {
        if let Some(f) = self.on_end.as_mut() {
            f()
        }
    }
}

struct Shared {
    generation: u64,
    state: PlaybackState,
}

/// Orchestrates narration sessions over an [`UtteranceDriver`].
///
/// The controller owns at most one live session at a time. Starting a new
/// session supersedes the previous one; stopping clears the current one. All
/// mutation of the session happens in response to engine events or explicit
/// control calls, never concurrently.
pub struct PlaybackController<D> {
    driver: D,
    catalog: Arc<dyn VoiceCatalog>,
    max_chunk_len: usize,
    shared: Mutex<Shared>,
}

impl<D: UtteranceDriver> PlaybackController<D> {
    /// Creates a controller narrating through `driver`, resolving voices
    /// from `catalog`.
    pub fn new(driver: D, catalog: Arc<dyn VoiceCatalog>) -> Self {
        Self {
            driver,
            catalog,
            max_chunk_len: DEFAULT_MAX_CHUNK_LEN,
            shared: Mutex::new(Shared {
                generation: 0,
                state: PlaybackState::Idle,
            }),
        }
    }

    /// Overrides the soft limit on chunk length, in characters.
    pub fn with_max_chunk_len(mut self, max_len: usize) -> Self {
        self.max_chunk_len = max_len;
        self
    }

    /// The current playback state.
    pub fn state(&self) -> PlaybackState {
        self.shared.lock().unwrap().state
    }

    /// Whether a session is live, speaking or paused.
    pub fn is_speaking(&self) -> bool {
        self.state() != PlaybackState::Idle
    }

    /// Narrates `text` from the beginning, superseding any session in
    /// progress.
    ///
    /// Resolves a voice from the catalog when `options` does not supply one,
    /// failing with [`Error::NoUsableVoice`] when the catalog is empty. The
    /// returned future completes `Ok` on natural completion,
    /// `Err(`[`Error::Synthesis`]`)` when the engine fails mid-utterance,
    /// and `Err(`[`Error::Cancelled`]`)` when the session is stopped or
    /// superseded.
    pub async fn start(
        &self,
        text: &str,
        options: PlaybackOptions,
        mut callbacks: PlaybackCallbacks,
    ) -> Result<()> {
        let generation = {
            let mut shared = self.shared.lock().unwrap();
            shared.generation += 1;
            shared.state = PlaybackState::Idle;
            self.driver.cancel_all();
            shared.generation
        };

        let text = chunk::normalize(text);
        let chunks = chunk::split_text(&text, self.max_chunk_len);
        let total_len = text.chars().count();

        if chunks.is_empty() {
            debug!("nothing to narrate");
            callbacks.ended();
            return Ok(());
        }

        let voice = self.resolve_voice(&options).await?;
        debug!(
            voice = voice.name(),
            quality = <&'static str>::from(voice.quality()),
            chunks = chunks.len(),
            "starting narration"
        );

        {
            let mut shared = self.shared.lock().unwrap();
            if shared.generation != generation {
                return Err(Error::Cancelled);
            }
            shared.state = PlaybackState::Speaking;
        }

        let mut started_fired = false;
        for (index, chunk) in chunks.iter().enumerate() {
            trace!(chunk = index, len = chunk.len(), "submitting chunk");
            let mut events = self.submit_current(
                generation,
                Utterance {
                    text: chunk.text().to_string(),
                    voice: voice.clone(),
                    rate: options.rate,
                    pitch: options.pitch,
                    volume: options.volume,
                },
            )?;

            loop {
                let event = match events.recv().await {
                    Some(event) => event,
                    // The engine dropped the stream without a terminal
                    // event; the utterance was cancelled out from under us.
                    None => return Err(Error::Cancelled),
                };
                if !self.is_current(generation) {
                    trace!(?event, "discarding event from superseded session");
                    return Err(Error::Cancelled);
                }

                match event {
                    UtteranceEvent::Started => {
                        if index == 0 && !started_fired {
                            started_fired = true;
                            callbacks.started();
                        }
                    }
                    UtteranceEvent::WordBoundary { char_index } => {
                        let percent = progress(chunk.offset(), char_index, total_len);
                        callbacks.progressed(percent);
                    }
                    UtteranceEvent::Ended => break,
                    UtteranceEvent::Failed(detail) => {
                        warn!(chunk = index, detail = %detail, "synthesis failed, aborting session");
                        let mut shared = self.shared.lock().unwrap();
                        if shared.generation == generation {
                            shared.state = PlaybackState::Idle;
                        }
                        return Err(Error::Synthesis(detail));
                    }
                }
            }
        }

        {
            let mut shared = self.shared.lock().unwrap();
            if shared.generation != generation {
                return Err(Error::Cancelled);
            }
            shared.state = PlaybackState::Idle;
        }
        debug!("narration complete");
        callbacks.progressed(100.0);
        callbacks.ended();
        Ok(())
    }

    /// Fetches the current page and the persisted narration settings, then
    /// narrates the page text with those settings as defaults.
    ///
    /// A persisted voice id is resolved against the catalog; when it no
    /// longer matches an installed voice, the controller falls back to
    /// automatic selection.
    pub async fn narrate_page(
        &self,
        pages: &dyn PageContentProvider,
        settings: &dyn SettingsStore,
        callbacks: PlaybackCallbacks,
    ) -> Result<()> {
        let content = pages.page_content().await?;
        let stored = settings.load().await?;

        let voice = match stored.voice_id.as_deref() {
            Some(id) => {
                let voices = self.catalog.voices().await?;
                voices.into_iter().find(|v| v.id() == id)
            }
            None => None,
        };

        debug!(title = %content.title, "narrating page");
        let options = PlaybackOptions {
            voice,
            rate: stored.rate,
            pitch: stored.pitch,
            volume: stored.volume,
        };
        self.start(&content.text, options, callbacks).await
    }

    /// Pauses the current utterance. Effective only while speaking; a silent
    /// no-op in any other state.
    pub fn pause(&self) {
        let mut shared = self.shared.lock().unwrap();
        if shared.state == PlaybackState::Speaking {
            self.driver.pause();
            shared.state = PlaybackState::Paused;
            debug!("narration paused");
        }
    }

    /// Resumes a paused session. Effective only while paused; a silent no-op
    /// in any other state.
    pub fn resume(&self) {
        let mut shared = self.shared.lock().unwrap();
        if shared.state == PlaybackState::Paused {
            self.driver.resume();
            shared.state = PlaybackState::Speaking;
            debug!("narration resumed");
        }
    }

    /// Stops the current session from any state, synchronously.
    ///
    /// Cancels the in-flight utterance, invalidates the session so that any
    /// late engine events are discarded, and moves to
    /// [`PlaybackState::Idle`]. No further callbacks fire for the stopped
    /// session; its pending `start()` future resolves
    /// `Err(`[`Error::Cancelled`]`)`.
    ///
    /// A session that has already spoken its final chunk counts as
    /// completed, not stopped: there is nothing left to cancel, and its
    /// `on_progress(100)`/`on_end` dispatch may still be in flight on the
    /// session task when a racing `stop()` returns. Stopping an idle
    /// controller is otherwise a no-op beyond invalidating stale events.
    pub fn stop(&self) {
        {
            let mut shared = self.shared.lock().unwrap();
            shared.generation += 1;
            shared.state = PlaybackState::Idle;
            self.driver.cancel_all();
        }
        debug!("narration stopped");
    }

    async fn resolve_voice(&self, options: &PlaybackOptions) -> Result<Voice> {
        if let Some(voice) = options.voice.clone() {
            return Ok(voice);
        }
        let voices = self.catalog.voices().await?;
        voice::select_voice(&voices)
            .cloned()
            .ok_or(Error::NoUsableVoice)
    }

    // Submission must happen while the generation is verifiably current, so
    // a concurrent stop() or superseding start() either lands before the
    // submit (and the check fails) or after it (and its cancel_all() takes
    // the utterance down). Without this, a stop() between two chunks could
    // leave an orphaned utterance speaking.
    fn submit_current(&self, generation: u64, utterance: Utterance) -> Result<EventStream> {
        let shared = self.shared.lock().unwrap();
        if shared.generation != generation {
            return Err(Error::Cancelled);
        }
        Ok(self.driver.submit(utterance))
    }

    fn is_current(&self, generation: u64) -> bool {
        self.shared.lock().unwrap().generation == generation
    }
}
