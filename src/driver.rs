//! The abstraction over the external speech-synthesis engine.
//!
//! The playback controller never talks to a concrete engine. It submits one
//! utterance at a time through [`UtteranceDriver`] and consumes the lifecycle
//! events the driver streams back. Tests substitute a deterministic fake
//! driver; production code adapts a platform speech API or a network service
//! to the same shape.

use tokio::sync::mpsc::UnboundedReceiver;

use crate::voice::Voice;

/// One request to the synthesis engine, corresponding to exactly one chunk.
#[derive(Debug, Clone)]
pub struct Utterance {
    /// The text to speak.
    pub text: String,
    /// The voice to speak with.
    pub voice: Voice,
    /// Rate of speech, 1.0 being the voice's normal rate.
    pub rate: f32,
    /// Pitch, 1.0 being the voice's normal pitch.
    pub pitch: f32,
    /// Volume, 1.0 being full volume.
    pub volume: f32,
}

/// A lifecycle event reported by the synthesis engine for one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtteranceEvent {
    /// The engine began speaking the utterance.
    Started,
    /// The engine reached a word boundary at the given character offset
    /// within the utterance text.
    WordBoundary {
        /// Character offset of the word within the utterance text.
        char_index: usize,
    },
    /// The engine finished speaking the utterance.
    Ended,
    /// The engine failed mid-utterance, with an engine-specific detail.
    Failed(String),
}

/// The stream of lifecycle events for one submitted utterance.
///
/// A well-behaved driver yields, in order: at most one
/// [`Started`](UtteranceEvent::Started), zero or more
/// [`WordBoundary`](UtteranceEvent::WordBoundary), then exactly one of
/// [`Ended`](UtteranceEvent::Ended) or [`Failed`](UtteranceEvent::Failed).
/// Dropping the sending half without a terminal event is treated as
/// cancellation by the playback controller.
pub type EventStream = UnboundedReceiver<UtteranceEvent>;

/// The contract the playback controller requires from a synthesis engine.
///
/// The controller holds at most one utterance in flight at a time, so
/// implementations never need to queue. Submission must not be assumed to
/// complete synchronously; all continuation happens through the returned
/// event stream.
pub trait UtteranceDriver: Send + Sync {
    /// Schedules the rendering of one utterance and returns the stream of
    /// lifecycle events for it.
    fn submit(&self, utterance: Utterance) -> EventStream;

    /// Pauses whatever utterance is currently submitted. No-op when the
    /// engine is idle.
    fn pause(&self);

    /// Resumes a paused utterance. No-op when the engine is idle.
    fn resume(&self);

    /// Immediately stops any in-flight utterance and guarantees that no
    /// further events are delivered for it.
    fn cancel_all(&self);
}
