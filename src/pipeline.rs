use crate::config::{PipelineConfig, SeenPolicy};
use crate::diff;
use crate::error::StateError;
use crate::format::{self, NotificationPayload};
use crate::notify::{NotificationChannel, RecipientId};
use crate::source::SnapshotSource;
use crate::state::JsonStateStore;

/// Terminal outcome of one run, for the operator and the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Ok,
    /// The source returned zero listings at all.
    Empty,
    /// Listings came back, but every id was already seen.
    NoNewListings,
    FetchError,
    ParseError,
}

impl RunStatus {
    pub fn is_success(self) -> bool {
        matches!(self, RunStatus::Ok | RunStatus::Empty | RunStatus::NoNewListings)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Ok => "ok",
            RunStatus::Empty => "empty",
            RunStatus::NoNewListings => "no_new",
            RunStatus::FetchError => "fetch_error",
            RunStatus::ParseError => "parse_error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub status: RunStatus,
    pub fetched: usize,
    pub new: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl RunSummary {
    fn terminal(status: RunStatus, fetched: usize) -> Self {
        Self {
            status,
            fetched,
            new: 0,
            delivered: 0,
            failed: 0,
        }
    }
}

/// One-shot batch run: load seen ids, fetch a snapshot, diff, render and
/// deliver each new listing, persist ids that qualified as delivered.
pub struct Pipeline<'a> {
    source: &'a dyn SnapshotSource,
    channel: &'a dyn NotificationChannel,
    store: &'a JsonStateStore,
    recipients: &'a [RecipientId],
    options: PipelineConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        source: &'a dyn SnapshotSource,
        channel: &'a dyn NotificationChannel,
        store: &'a JsonStateStore,
        recipients: &'a [RecipientId],
        options: PipelineConfig,
    ) -> Self {
        Self {
            source,
            channel,
            store,
            recipients,
            options,
        }
    }

    /// `Err` means the state file could not be loaded or written — fatal,
    /// and on load nothing has been sent yet. All other failures resolve
    /// into the summary's terminal status.
    pub async fn run(&self) -> Result<RunSummary, StateError> {
        let mut seen = self.store.load()?;
        tracing::debug!(seen = seen.len(), "state loaded");

        let fetched = match self.source.fetch().await {
            Ok(listings) => listings,
            Err(e) => {
                tracing::error!(error = %e, "snapshot fetch failed");
                if self.options.notify_on_error {
                    self.notice(&format!("⚠️ <b>Bot error fetching Sakani API:</b> {}", e))
                        .await;
                }
                let status = if e.is_parse() {
                    RunStatus::ParseError
                } else {
                    RunStatus::FetchError
                };
                return Ok(self.summarize(RunSummary::terminal(status, 0)));
            }
        };

        if fetched.is_empty() {
            if self.options.notify_on_empty {
                self.notice("ℹ️ <b>Bot run complete — No projects available at this time.</b>")
                    .await;
            }
            return Ok(self.summarize(RunSummary::terminal(RunStatus::Empty, 0)));
        }

        let new = diff::new_listings(&fetched, &seen);
        if new.is_empty() {
            if self.options.notify_on_no_new {
                self.notice("ℹ️ <b>Bot run complete — No new projects found.</b>")
                    .await;
            }
            return Ok(self.summarize(RunSummary::terminal(
                RunStatus::NoNewListings,
                fetched.len(),
            )));
        }

        let mut delivered_ids: Vec<String> = Vec::new();
        let mut failed = 0usize;

        for listing in &new {
            let payload = match format::render(listing) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(id = listing.id.as_str(), error = %e, "skipping unrenderable listing");
                    failed += 1;
                    continue;
                }
            };

            let outcomes = self.channel.send(&payload, self.recipients).await;
            let successes = outcomes.iter().filter(|o| o.result.is_ok()).count();
            let qualified = match self.options.seen_policy {
                SeenPolicy::AnyRecipient => successes >= 1,
                SeenPolicy::AllRecipients => successes == self.recipients.len(),
            };

            if qualified {
                tracing::info!(id = listing.id.as_str(), successes, "listing notified");
                delivered_ids.push(listing.id.clone());
            } else {
                tracing::warn!(
                    id = listing.id.as_str(),
                    successes,
                    recipients = self.recipients.len(),
                    "listing not marked seen, will retry next run"
                );
                failed += 1;
            }
        }

        // Skip the write entirely when nothing qualified: there is nothing
        // new to persist, and an untouched file cannot be half-written.
        if !delivered_ids.is_empty() {
            seen.extend(delivered_ids.iter().cloned());
            self.store.save(&seen)?;
            tracing::debug!(seen = seen.len(), "state saved");
        }

        Ok(self.summarize(RunSummary {
            status: RunStatus::Ok,
            fetched: fetched.len(),
            new: new.len(),
            delivered: delivered_ids.len(),
            failed,
        }))
    }

    fn summarize(&self, summary: RunSummary) -> RunSummary {
        tracing::info!(
            status = summary.status.as_str(),
            fetched = summary.fetched,
            new = summary.new,
            delivered = summary.delivered,
            failed = summary.failed,
            "run complete"
        );
        summary
    }

    /// Operator-facing notice through the same channel as listings, with a
    /// marker so it cannot be mistaken for one. Notice failures are only
    /// logged; they never change the run outcome.
    async fn notice(&self, text: &str) {
        let payload = NotificationPayload {
            text: text.to_string(),
            media_url: None,
        };
        for outcome in self.channel.send(&payload, self.recipients).await {
            if let Err(e) = outcome.result {
                tracing::warn!(recipient = outcome.recipient.as_str(), error = %e, "operator notice failed");
            }
        }
    }
}
