#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A sequential narration engine for bounded-utterance speech synthesizers.
//!
//! # Features
//!
//! Many speech-synthesis engines can only speak a bounded amount of text per
//! request and report progress and completion asynchronously, one utterance at
//! a time. This crate takes arbitrary-length text and narrates it through such
//! an engine: it splits the text into sentence-bounded chunks, feeds the
//! chunks to the engine strictly one after another, tracks aggregate progress
//! across chunk boundaries, and exposes a race-free pause/resume/stop control
//! surface.
//!
//! ## Playback
//!
//! The [playback] module provides [`PlaybackController`](playback::PlaybackController),
//! the stateful session orchestrator. A call to
//! [`start`](playback::PlaybackController::start) builds the chunk queue,
//! resolves a speaking voice if none was supplied, and drives the chunks
//! through the synthesis engine until the narration completes, fails, or is
//! stopped. Only one session is live at a time; starting a new one supersedes
//! the previous one, and any events still in flight for the superseded
//! session are discarded rather than acted upon.
//!
//! ## The synthesis engine
//!
//! The engine itself is not part of this crate. It is consumed through the
//! [`UtteranceDriver`](driver::UtteranceDriver) trait: one call to submit a
//! chunk, and a stream of lifecycle events back. Any engine that can be
//! adapted to that shape will do, whether it is a platform speech API, a
//! network service, or a deterministic fake for tests.
//!
//! ## Voices
//!
//! The [voice] module models the engine's voice catalog and picks the best
//! available narration voice through an ordered list of preference
//! predicates, favoring natural-sounding English voices.
//!
//! # Known limitation
//!
//! The engine performs no polling and defines no watchdog. If the synthesis
//! engine never terminates a submitted chunk, the session stalls until
//! [`stop`](playback::PlaybackController::stop) is called.

pub mod chunk;
pub mod driver;
pub mod playback;
pub mod provider;
pub mod voice;

use thiserror::Error as ThisError;

/// The error type returned by the narration engine.
#[derive(Debug, Clone, ThisError)]
pub enum Error {
    /// No voice was supplied and none could be resolved from the catalog.
    /// Not retryable until the catalog changes.
    #[error("no usable voice available")]
    NoUsableVoice,

    /// The synthesis engine reported a failure mid-utterance. The whole
    /// session is aborted; there is no partial resume.
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    /// The session was stopped or superseded by a newer `start()` call.
    #[error("narration cancelled")]
    Cancelled,

    /// The page content provider could not produce narration text.
    #[error("page content unavailable: {0}")]
    ContentUnavailable(String),

    /// The settings store could not load the persisted narration settings.
    #[error("settings unavailable: {0}")]
    Settings(String),
}

/// The result type returned by the narration engine.
pub type Result<T> = std::result::Result<T, Error>;
