//! The forwarding sink exported by the crate.

use std::cell::Cell;
use std::io::{self, Write};

use log::{debug, warn};
use parking_lot::Mutex;

use crate::config::{ConfigError, Destination, SinkConfig};
use crate::record::{Record, serialise_batch};

use super::error::{SinkError, WriteError};
use super::transport::{Delivery, HttpTransport};

thread_local! {
    static FLUSHING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside a sink call until dropped.
///
/// Anything the HTTP client or a `log` bridge emits while the batch lock is
/// held can be routed straight back into a sink on the same thread. Such
/// re-entered calls must not touch the batch lock.
pub(super) struct FlushGuard {
    _private: (),
}

impl FlushGuard {
    /// Enter the guarded region, or `None` if this thread is already inside.
    pub(super) fn enter() -> Option<Self> {
        FLUSHING.with(|flag| {
            if flag.replace(true) {
                None
            } else {
                Some(Self { _private: () })
            }
        })
    }
}

impl Drop for FlushGuard {
    fn drop(&mut self) {
        FLUSHING.with(|flag| flag.set(false));
    }
}

/// Sink forwarding JSON log records to an HTTP ingestion endpoint.
///
/// Each [`append`](Self::append) queues one record and immediately flushes
/// the whole pending batch in a single `POST`. Records leave the batch only
/// when the endpoint answers HTTP 200, so a failed flush keeps every record
/// for the next attempt.
///
/// The batch is guarded by a mutex held for the full append-and-flush
/// sequence. Concurrent callers are serialised and never send the same
/// record twice from one batch. A call re-entering from the thread that
/// already holds the lock (a log line emitted during the `POST`) is parked
/// in a separate queue and joins the batch, in order, on the next append or
/// flush.
pub struct ForwardingSink {
    destination: Destination,
    transport: HttpTransport,
    pending: Mutex<Vec<Record>>,
    deferred: Mutex<Vec<Record>>,
}

/// Flush outcome captured under the lock and logged after release.
struct FlushReport {
    sent: usize,
    result: Result<(), SinkError>,
}

impl ForwardingSink {
    /// Construct the sink from a validated configuration.
    pub fn new(config: SinkConfig) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self {
            destination: config.destination,
            transport,
            pending: Mutex::new(Vec::new()),
            deferred: Mutex::new(Vec::new()),
        })
    }

    /// Endpoint and credentials this sink delivers to.
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Decode `bytes` as a JSON object, queue it, and flush the batch.
    ///
    /// On success the returned count is `bytes.len()`. When the record was
    /// queued but the flush failed, [`WriteError::written`] still reports
    /// `bytes.len()`: the count means "accepted into the queue", not
    /// "delivered". Undecodable input reports zero and leaves the batch
    /// untouched.
    pub fn append(&self, bytes: &[u8]) -> Result<usize, WriteError> {
        let record = Record::from_slice(bytes).map_err(|err| WriteError {
            written: 0,
            source: SinkError::Decode(err),
        })?;

        let Some(_guard) = FlushGuard::enter() else {
            self.deferred.lock().push(record);
            return Ok(bytes.len());
        };

        let mut pending = self.pending.lock();
        pending.append(&mut self.deferred.lock());
        pending.push(record);
        let report = self.flush_locked(&mut pending);
        drop(pending);

        log_report(&report);
        report.result.map(|()| bytes.len()).map_err(|source| WriteError {
            written: bytes.len(),
            source,
        })
    }

    /// Deliver every pending record in one request.
    ///
    /// Returns immediately without touching the network when nothing is
    /// pending, or when called re-entrantly from inside another sink call on
    /// the same thread.
    pub fn flush(&self) -> Result<(), SinkError> {
        let Some(_guard) = FlushGuard::enter() else {
            return Ok(());
        };

        let mut pending = self.pending.lock();
        pending.append(&mut self.deferred.lock());
        let report = self.flush_locked(&mut pending);
        drop(pending);

        log_report(&report);
        report.result
    }

    /// Flush once more before the owning facility shuts down.
    ///
    /// Records still pending after a failed close are lost if the process
    /// exits. The sink stays usable afterwards.
    pub fn close(&self) -> Result<(), SinkError> {
        self.flush()
    }

    /// Number of records awaiting delivery.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len() + self.deferred.lock().len()
    }

    /// Snapshot of the pending batch in arrival order.
    pub fn pending(&self) -> Vec<Record> {
        let mut snapshot = self.pending.lock().clone();
        snapshot.extend(self.deferred.lock().iter().cloned());
        snapshot
    }

    fn flush_locked(&self, pending: &mut Vec<Record>) -> FlushReport {
        let sent = pending.len();
        let result = if sent == 0 {
            Ok(())
        } else {
            self.deliver(pending)
        };
        FlushReport { sent, result }
    }

    fn deliver(&self, pending: &mut Vec<Record>) -> Result<(), SinkError> {
        let body = serialise_batch(pending).map_err(SinkError::Encode)?;
        let url = self.destination.url();
        match self.transport.post_json(url, &body)? {
            Delivery::Accepted => {
                pending.clear();
                Ok(())
            }
            Delivery::Rejected(status) => Err(SinkError::UpstreamRejected {
                status,
                url: url.to_owned(),
                body,
            }),
        }
    }
}

// Called while the flush guard is still held, so a bridge routing these
// lines back into a sink defers them instead of recursing.
fn log_report(report: &FlushReport) {
    if report.sent == 0 {
        return;
    }
    match &report.result {
        Ok(()) => debug!("ForwardingSink delivered {} records", report.sent),
        Err(SinkError::UpstreamRejected { status, .. }) => {
            debug!(
                "ForwardingSink delivery of {} records rejected with status {status}",
                report.sent
            );
        }
        Err(_) => debug!("ForwardingSink delivery of {} records failed", report.sent),
    }
}

impl Write for &ForwardingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf).map_err(|err| err.into_inner().into())
    }

    fn flush(&mut self) -> io::Result<()> {
        ForwardingSink::flush(*self).map_err(io::Error::from)
    }
}

impl Write for ForwardingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut &*self)
    }
}

impl Drop for ForwardingSink {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().len() + self.deferred.get_mut().len();
        if pending == 0 {
            return;
        }
        match self.close() {
            Ok(()) => {}
            Err(SinkError::UpstreamRejected { status, .. }) => {
                warn!(
                    "ForwardingSink dropped {pending} undelivered records on close: status {status}"
                );
            }
            Err(err) => {
                warn!("ForwardingSink dropped {pending} undelivered records on close: {err}");
            }
        }
    }
}

impl std::fmt::Debug for ForwardingSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardingSink")
            .field("destination", &self.destination)
            .field("pending", &self.pending.try_lock().map(|p| p.len()))
            .finish()
    }
}
