//! Universal constants for Folio.

use std::time::Duration;

/// Default portfolio gateway base URL (per-address portfolio endpoint).
pub const GATEWAY_BASE_URL: &str = "https://api.folio.wtf";

/// GeckoTerminal public API base URL.
pub const GECKO_BASE_URL: &str = "https://api.geckoterminal.com/api/v2";

/// How long a successful metadata lookup stays fresh.
pub const SUCCESS_TTL: Duration = Duration::from_secs(30 * 60);

/// How long a transient failure is negative-cached before a retry is allowed.
pub const FAILURE_TTL: Duration = Duration::from_secs(5 * 60);

/// Global cool-down after the upstream answers HTTP 429.
pub const RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(15 * 60);

/// Consecutive transient failures before a key is blacklisted.
pub const BLACKLIST_THRESHOLD: u32 = 3;

/// Soft cap on concurrently active outbound metadata requests.
/// Requests beyond the cap are dropped, not queued.
pub const MAX_ACTIVE_FETCHES: usize = 2;

/// Minimum spacing between any two outbound metadata requests.
pub const MIN_FETCH_SPACING: Duration = Duration::from_secs(1);

/// Stagger between logo preload dispatches.
pub const PRELOAD_STAGGER: Duration = Duration::from_millis(250);
