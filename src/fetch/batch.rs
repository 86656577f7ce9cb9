use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use crate::fetch::cancel::CancelToken;
use crate::fetch::fetcher::ResourceFetcher;
use crate::fetch::locator::ResourceLocator;
use crate::foundation::error::{CardError, CardResult};

/// How often the collector re-checks a deadline-less caller token.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Raw bytes for every key of one batch. Never partial.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceBundle {
    entries: BTreeMap<String, Vec<u8>>,
}

impl ResourceBundle {
    /// Bytes for `key`, if it was part of the batch.
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Move the bytes for `key` out of the bundle.
    pub fn take(&mut self, key: &str) -> Option<Vec<u8>> {
        self.entries.remove(key)
    }

    /// Keys present in the bundle, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the batch was empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fetch every locator concurrently, one worker thread per key.
///
/// Returns a bundle only when every fetch succeeded. The first failure cancels the
/// remaining workers and is returned immediately, tagged with its key. Each worker
/// sends its result over a channel, so only this function writes to the bundle.
#[tracing::instrument(skip_all, fields(count = locators.len()))]
pub fn fetch_all(
    fetcher: Arc<dyn ResourceFetcher>,
    locators: &BTreeMap<String, ResourceLocator>,
    cancel: &CancelToken,
) -> CardResult<ResourceBundle> {
    cancel.check("resource batch")?;
    if locators.is_empty() {
        return Ok(ResourceBundle::default());
    }

    let batch = cancel.child();
    let (tx, rx) = mpsc::channel::<(String, CardResult<Vec<u8>>)>();

    for (key, locator) in locators {
        let tx = tx.clone();
        let fetcher = fetcher.clone();
        let token = batch.clone();
        let key_owned = key.clone();
        let locator = locator.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("ogcard-fetch-{key}"))
            .spawn(move || {
                let result = fetcher.fetch(&locator, &token);
                // The collector may already have returned; a closed channel is fine.
                let _ = tx.send((key_owned, result));
            });

        if let Err(e) = spawned {
            batch.cancel();
            return Err(CardError::fetch(format!("spawn fetch worker for '{key}': {e}")));
        }
    }
    drop(tx);

    let mut entries = BTreeMap::new();
    while entries.len() < locators.len() {
        let wait = batch
            .remaining()
            .map_or(POLL_INTERVAL, |left| left.min(POLL_INTERVAL));

        match rx.recv_timeout(wait) {
            Ok((key, Ok(bytes))) => {
                tracing::debug!(key = %key, bytes = bytes.len(), "resource fetched");
                entries.insert(key, bytes);
            }
            Ok((key, Err(err))) => {
                batch.cancel();
                tracing::warn!(key = %key, error = %err, "resource batch aborted");
                let locator = locators
                    .get(&key)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                return Err(err.context(format!("{key} ({locator})")));
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if batch.is_cancelled() {
                    batch.cancel();
                    tracing::warn!(pending = locators.len() - entries.len(), "resource batch cancelled");
                    return Err(CardError::cancelled(
                        "resource batch cancelled before all fetches finished",
                    ));
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                batch.cancel();
                return Err(CardError::fetch(
                    "a fetch worker exited without reporting a result",
                ));
            }
        }
    }

    Ok(ResourceBundle { entries })
}

#[cfg(test)]
#[path = "../../tests/unit/fetch/batch.rs"]
mod tests;
