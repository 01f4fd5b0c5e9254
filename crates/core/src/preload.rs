//! Staggered background preload of token metadata/logos.
//!
//! One spawned task walks the token list through the fetch gate with a
//! fixed stagger; the returned handle aborts the walk when the consumer
//! goes away, so abandoned preloads never leak pending work.

use std::sync::Arc;

use folio_common::constants::PRELOAD_STAGGER;
use folio_common::types::TokenDetail;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

use crate::gate::FetchGate;

/// Handle to a running preload. Dropping it cancels the remaining work.
pub struct PreloadHandle {
    task: JoinHandle<()>,
}

impl PreloadHandle {
    /// Explicitly cancel the preload.
    pub fn cancel(self) {
        self.task.abort();
    }

    /// Wait for the preload to finish (mainly for tests and the CLI).
    pub async fn finished(mut self) {
        // Abort-on-drop still applies if the await is cancelled.
        let _ = (&mut self.task).await;
    }
}

impl Drop for PreloadHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Warm the cache for every `(network, address)` in `tokens`.
///
/// Suppressed or dropped fetches are left for a later pass; the preload
/// never retries on its own.
pub fn preload_token_logos(gate: &Arc<FetchGate>, tokens: &[TokenDetail]) -> PreloadHandle {
    let targets: Vec<(String, String)> = tokens
        .iter()
        .map(|t| (t.network.clone(), t.token.address.clone()))
        .collect();
    let gate = Arc::clone(gate);

    let task = tokio::spawn(async move {
        let total = targets.len();
        for (network, address) in targets {
            let _ = gate.fetch(&network, &address, None).await;
            sleep(PRELOAD_STAGGER).await;
        }
        debug!(total, "token metadata preload pass complete");
    });

    PreloadHandle { task }
}
