//! Per-(account, api key) nonce sequencing.
//!
//! The first request for a pair fetches the exchange's next nonce once;
//! later requests count up locally. Each pair has its own async mutex held
//! across that first fetch, so concurrent callers on one pair wait for the
//! fetch and then receive distinct, gap-free nonces. Different pairs never
//! contend.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Where the tracker reads the first nonce of a pair from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NonceSource: Send + Sync {
    /// Next nonce the exchange expects for this pair.
    async fn fetch_current_nonce(&self, account_index: u64, api_key_index: u8) -> Result<u64>;
}

#[derive(Debug, Default)]
struct NonceSlot {
    /// `None` until the first fetch succeeds.
    next: Option<u64>,
}

impl NonceSlot {
    /// Roll back to `nonce` if it was the last one handed out.
    fn reclaim(&mut self, nonce: u64) -> bool {
        match nonce.checked_add(1) {
            Some(following) if self.next == Some(following) => {
                self.next = Some(nonce);
                true
            }
            _ => false,
        }
    }
}

pub struct NonceTracker {
    source: Arc<dyn NonceSource>,
    slots: DashMap<(u64, u8), Arc<Mutex<NonceSlot>>>,
}

impl NonceTracker {
    pub fn new(source: Arc<dyn NonceSource>) -> Self {
        Self {
            source,
            slots: DashMap::new(),
        }
    }

    fn slot(&self, account_index: u64, api_key_index: u8) -> Arc<Mutex<NonceSlot>> {
        self.slots
            .entry((account_index, api_key_index))
            .or_default()
            .clone()
    }

    /// Claim the next nonce for a pair.
    ///
    /// A failed first fetch leaves the pair unestablished; the next call
    /// fetches again.
    pub async fn next_nonce(&self, account_index: u64, api_key_index: u8) -> Result<u64> {
        let slot = self.slot(account_index, api_key_index);
        let mut slot = slot.lock().await;

        let nonce = match slot.next {
            Some(next) => next,
            None => {
                let fetched = self
                    .source
                    .fetch_current_nonce(account_index, api_key_index)
                    .await
                    .map_err(|e| {
                        warn!(
                            account_index,
                            api_key_index,
                            error = %e,
                            "Nonce fetch failed"
                        );
                        Error::NonceResolution {
                            account_index,
                            api_key_index,
                            source: Box::new(e),
                        }
                    })?;

                info!(
                    account_index,
                    api_key_index,
                    nonce = fetched,
                    "Nonce sequence established"
                );
                fetched
            }
        };

        let following = nonce.checked_add(1).ok_or_else(|| Error::NonceResolution {
            account_index,
            api_key_index,
            source: Box::new(Error::validation("nonce", "sequence exhausted at u64::MAX")),
        })?;
        slot.next = Some(following);
        debug!(account_index, api_key_index, nonce, "Nonce issued");
        Ok(nonce)
    }

    /// Forget the pair so the next call refetches from the exchange.
    pub fn refresh(&self, account_index: u64, api_key_index: u8) {
        if self.slots.remove(&(account_index, api_key_index)).is_some() {
            info!(account_index, api_key_index, "Nonce sequence dropped");
        }
    }

    /// Give back `nonce` if it is the most recently issued one for the pair.
    ///
    /// Used when a build fails after claiming a nonce, so the sequence stays
    /// gap-free. Returns whether the nonce was reclaimed.
    pub async fn release(&self, account_index: u64, api_key_index: u8, nonce: u64) -> bool {
        let Some(slot) = self
            .slots
            .get(&(account_index, api_key_index))
            .map(|entry| entry.value().clone())
        else {
            return false;
        };

        let reclaimed = slot.lock().await.reclaim(nonce);
        if reclaimed {
            debug!(account_index, api_key_index, nonce, "Nonce released");
        }
        reclaimed
    }

    /// Non-blocking [`release`](Self::release) for drop paths.
    ///
    /// Reclaims in place when the pair's lock is free. Otherwise the release
    /// is queued on the current tokio runtime, if there is one.
    pub fn release_now(self: &Arc<Self>, account_index: u64, api_key_index: u8, nonce: u64) {
        let Some(slot) = self
            .slots
            .get(&(account_index, api_key_index))
            .map(|entry| entry.value().clone())
        else {
            return;
        };

        if let Ok(mut guard) = slot.try_lock() {
            if guard.reclaim(nonce) {
                debug!(account_index, api_key_index, nonce, "Nonce released");
            }
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let tracker = Arc::clone(self);
                handle.spawn(async move {
                    tracker.release(account_index, api_key_index, nonce).await;
                });
            }
            Err(_) => warn!(
                account_index,
                api_key_index,
                nonce,
                "Nonce not released: slot busy outside a runtime"
            ),
        }
    }

    /// Nonce the next call would return, if the pair is established.
    pub async fn peek(&self, account_index: u64, api_key_index: u8) -> Option<u64> {
        let slot = self
            .slots
            .get(&(account_index, api_key_index))
            .map(|entry| entry.value().clone())?;
        let next = slot.lock().await.next;
        next
    }
}

impl std::fmt::Debug for NonceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceTracker")
            .field("pairs", &self.slots.len())
            .finish()
    }
}
