//! Result delivery to consumers.
//!
//! The poller only ever pushes state out through a [`ResultSink`]; it
//! never reads anything back from the consumer.

use chrono::{DateTime, Local};
use tokio::sync::mpsc;

use crate::arrivelah::FailureKind;
use crate::board::MalformedRecord;
use crate::domain::{DisplayServiceRow, StopId};

/// A successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardUpdate {
    /// Stop the rows belong to.
    pub stop: StopId,

    /// Rows sorted by line.
    pub rows: Vec<DisplayServiceRow>,

    /// Records dropped from this refresh.
    pub malformed: Vec<MalformedRecord>,

    /// When the response was received.
    pub updated_at: DateTime<Local>,
}

/// A failed refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Stop that was being fetched.
    pub stop: StopId,

    /// What kind of failure it was.
    pub kind: FailureKind,

    /// Diagnostic detail from the underlying error.
    pub message: String,

    /// When the failed response was received.
    pub updated_at: DateTime<Local>,
}

/// Everything the poller can publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publication {
    /// Fresh rows for the current stop.
    Rows(BoardUpdate),
    /// The latest fetch for the current stop failed.
    Failure(Failure),
    /// No stop is selected.
    Empty,
    /// The first fetch for a stop started (`true`) or settled (`false`).
    Loading(bool),
}

impl Publication {
    /// Hand this publication to the matching sink callback.
    pub fn deliver_to<K: ResultSink + ?Sized>(self, sink: &mut K) {
        match self {
            Publication::Rows(update) => sink.on_rows(update),
            Publication::Failure(failure) => sink.on_failure(failure),
            Publication::Empty => sink.on_empty(),
            Publication::Loading(loading) => sink.on_loading_changed(loading),
        }
    }
}

/// Consumer callbacks.
///
/// Callbacks run on the poller's task, one at a time, so they should
/// return quickly.
pub trait ResultSink: Send + 'static {
    /// New rows for the current stop.
    fn on_rows(&mut self, update: BoardUpdate);

    /// The current stop could not be refreshed.
    fn on_failure(&mut self, failure: Failure);

    /// No stop is selected.
    fn on_empty(&mut self);

    /// Whether a first fetch for the current stop is outstanding.
    fn on_loading_changed(&mut self, _loading: bool) {}
}

/// Sink that forwards every publication over a channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Publication>,
}

impl ChannelSink {
    /// Create a sink and the receiver its publications arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Publication>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, publication: Publication) {
        // A dropped receiver means nobody is watching any more
        let _ = self.tx.send(publication);
    }
}

impl ResultSink for ChannelSink {
    fn on_rows(&mut self, update: BoardUpdate) {
        self.forward(Publication::Rows(update));
    }

    fn on_failure(&mut self, failure: Failure) {
        self.forward(Publication::Failure(failure));
    }

    fn on_empty(&mut self) {
        self.forward(Publication::Empty);
    }

    fn on_loading_changed(&mut self, loading: bool) {
        self.forward(Publication::Loading(loading));
    }
}
