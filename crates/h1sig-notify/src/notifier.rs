//! Notification transport trait and non-network implementations.

use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::error::{NotifyError, NotifyResult};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Delivers a text message to a fixed destination.
///
/// At most one attempt per call; retries are the caller's decision.
pub trait Notifier: Send + Sync {
    /// Transport name for logs and metrics labels.
    fn name(&self) -> &'static str;

    fn send<'a>(&'a self, text: &'a str) -> BoxFuture<'a, NotifyResult<()>>;
}

/// Prints alerts to the log instead of delivering them.
#[derive(Debug, Default)]
pub struct DryRunNotifier;

impl DryRunNotifier {
    /// Create the dry-run transport, warning once that nothing is delivered.
    pub fn new() -> Self {
        warn!("No notification destination configured, alerts will only be logged (dry-run)");
        Self
    }
}

impl Notifier for DryRunNotifier {
    fn name(&self) -> &'static str {
        "dry_run"
    }

    fn send<'a>(&'a self, text: &'a str) -> BoxFuture<'a, NotifyResult<()>> {
        Box::pin(async move {
            info!(message = %text, "[DRY RUN] Alert");
            Ok(())
        })
    }
}

/// Mock notifier for testing.
///
/// Records every message; can be switched to fail.
#[derive(Debug, Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<String>>,
    fail_with: Mutex<Option<NotifyError>>,
    attempts: AtomicUsize,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail with `error` (still recorded as attempts).
    pub fn set_failure(&self, error: Option<NotifyError>) {
        *self.fail_with.lock() = error;
    }

    /// Messages delivered successfully.
    pub fn sent_messages(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    /// Number of send calls, successful or not.
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Notifier for MockNotifier {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn send<'a>(&'a self, text: &'a str) -> BoxFuture<'a, NotifyResult<()>> {
        Box::pin(async move {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.fail_with.lock().clone() {
                return Err(err);
            }
            self.sent.lock().push(text.to_string());
            Ok(())
        })
    }
}
