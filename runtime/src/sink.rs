//! Sink and run-history implementations.

use chrono::Utc;
use datagen_core::envelope::EventRecord;
use datagen_core::sink::{EventSink, RunHistory};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Sink that renders every event as a structured log line.
///
/// The business timestamp is rendered with the configured format so the
/// emitted line matches what a downstream pipeline would ingest.
#[derive(Debug, Clone)]
pub struct LogSink {
    timestamp_format: String,
}

impl LogSink {
    /// Creates a log sink rendering timestamps with `timestamp_format`.
    #[must_use]
    pub const fn new(timestamp_format: String) -> Self {
        Self { timestamp_format }
    }
}

impl EventSink for LogSink {
    fn enqueue(&self, record: EventRecord) {
        match serde_json::to_string(&record.payload) {
            Ok(body) => tracing::info!(
                topic = %record.topic,
                key = %record.key,
                timestamp = %record.timestamp.format(&self.timestamp_format),
                %body,
                "event"
            ),
            Err(error) => tracing::error!(
                topic = %record.topic,
                key = %record.key,
                %error,
                "event payload failed to serialize"
            ),
        }
    }
}

/// Sink that forwards records over an unbounded channel, for embedding the
/// datagen as an in-process event source.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<EventRecord>,
}

impl ChannelSink {
    /// Creates the sink together with its receiving end.
    #[must_use]
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<EventRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn enqueue(&self, record: EventRecord) {
        if self.tx.send(record).is_err() {
            tracing::warn!("event receiver dropped, record discarded");
        }
    }
}

/// Run history backed by a marker file.
///
/// The first successful start writes the marker; subsequent starts find it
/// and skip the history backfill.
#[derive(Debug, Clone)]
pub struct MarkerRunHistory {
    path: PathBuf,
}

impl MarkerRunHistory {
    /// Creates a run history around the marker at `path`.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Persists run evidence.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the marker cannot be written.
    pub fn record_run(&self) -> std::io::Result<()> {
        std::fs::write(&self.path, Utc::now().to_rfc3339())
    }
}

impl RunHistory for MarkerRunHistory {
    fn has_prior_run_evidence(&self) -> bool {
        self.path.exists()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use datagen_core::events::{EventPayload, Transaction, TransactionState};

    fn record() -> EventRecord {
        EventRecord::from_payload(EventPayload::Transaction(Transaction {
            id: 1,
            state: TransactionState::Started,
            amount: 42.0,
            timestamp: Utc::now(),
        }))
    }

    #[test]
    fn channel_sink_forwards_records() {
        let (sink, mut rx) = ChannelSink::pair();
        sink.enqueue(record());
        sink.enqueue(record());
        assert_eq!(rx.try_recv().unwrap().key, "txn-1");
        assert_eq!(rx.try_recv().unwrap().key, "txn-1");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channel_sink_survives_a_dropped_receiver() {
        let (sink, rx) = ChannelSink::pair();
        drop(rx);
        sink.enqueue(record());
    }

    #[test]
    fn marker_run_history_round_trips() {
        let path = std::env::temp_dir().join(format!("datagen-run-marker-{}", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let history = MarkerRunHistory::new(path.clone());
        assert!(!history.has_prior_run_evidence());
        history.record_run().unwrap();
        assert!(history.has_prior_run_evidence());

        std::fs::remove_file(path).unwrap();
    }
}
