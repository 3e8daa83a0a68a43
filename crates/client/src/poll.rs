//! Interval polling of a message thread.
//!
//! A [`ThreadWatch`] refetches one conversation on a fixed interval and
//! publishes every resolved snapshot. Ticks do not wait for earlier fetches;
//! whichever fetch resolves last wins. Dropping or cancelling the watch stops
//! the ticker, and fetches still in flight are discarded.

use std::time::Duration;

use fairway_core::{Message, Principal};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::access::{DataAccess, Fetched};

/// Shortest interval a watch will poll at.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A live view of one message thread.
#[derive(Debug)]
pub struct ThreadWatch {
    with_user: Principal,
    snapshots: watch::Receiver<Option<Vec<Message>>>,
    ticker: JoinHandle<()>,
}

impl ThreadWatch {
    pub(crate) fn spawn(access: DataAccess, with_user: Principal, every: Duration) -> Self {
        let (sender, snapshots) = watch::channel(None);
        let every = every.max(MIN_POLL_INTERVAL);

        let ticker = {
            let with_user = with_user.clone();
            tokio::spawn(async move {
                let mut ticker = interval(every);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    ticker.tick().await;

                    if sender.is_closed() {
                        break;
                    }
                    if !access.connection().is_connected() {
                        debug!(%with_user, "Skipping poll: not connected");
                        continue;
                    }

                    let access = access.clone();
                    let sender = sender.clone();
                    let with_user = with_user.clone();
                    tokio::spawn(async move {
                        match access.poll_messages(&with_user).await {
                            Ok(Fetched::Ready(messages)) => {
                                // Nobody listening any more is fine
                                let _ = sender.send(Some(messages));
                            }
                            Ok(Fetched::Disabled) => {}
                            Err(e) => warn!(%with_user, error = %e, "Message poll failed"),
                        }
                    });
                }
            })
        };

        Self {
            with_user,
            snapshots,
            ticker,
        }
    }

    /// The counterparty of the watched thread.
    #[must_use]
    pub const fn with_user(&self) -> &Principal {
        &self.with_user
    }

    /// Most recent snapshot, `None` until the first poll resolves.
    #[must_use]
    pub fn latest(&self) -> Option<Vec<Message>> {
        self.snapshots.borrow().clone()
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the watch has stopped.
    pub async fn changed(&mut self) -> Option<Vec<Message>> {
        self.snapshots.changed().await.ok()?;
        self.snapshots.borrow_and_update().clone()
    }

    /// Stop polling.
    pub fn cancel(&self) {
        self.ticker.abort();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.ticker.is_finished()
    }
}

impl Drop for ThreadWatch {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

impl DataAccess {
    /// Poll the conversation with `with_user` every `every`.
    ///
    /// The first poll runs immediately. Intervals shorter than
    /// [`MIN_POLL_INTERVAL`] are raised to it. Must be called within a tokio
    /// runtime.
    #[must_use]
    pub fn watch_messages(&self, with_user: Principal, every: Duration) -> ThreadWatch {
        ThreadWatch::spawn(self.clone(), with_user, every)
    }
}
