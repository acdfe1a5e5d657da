//! # 鮮度判定
//!
//! 署名時刻 `t` と現在時刻 `now` について、`0 <= now - t <= 猶予期間` の場合のみ新鮮とする。
//! 署名時刻が未来（`now < t`）の場合は拒否する。

use std::time::{SystemTime, UNIX_EPOCH};

/// デフォルトの猶予期間（秒）
pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 60;

/// 署名の猶予期間（秒）。
///
/// 0は「経過0秒のみ許可」を意味する。期限なしの特別値はない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GracePeriod(u64);

impl GracePeriod {
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub const fn as_secs(self) -> u64 {
        self.0
    }
}

impl Default for GracePeriod {
    fn default() -> Self {
        Self(DEFAULT_GRACE_PERIOD_SECS)
    }
}

/// 署名時刻が猶予期間内かを判定する。
pub fn is_fresh(timestamp: u64, grace: GracePeriod, now: u64) -> bool {
    match now.checked_sub(timestamp) {
        Some(elapsed) => elapsed <= grace.as_secs(),
        None => false,
    }
}

/// 現在のUNIX時刻（秒）。システム時刻がエポック以前なら0（すべての署名が未来扱いになる）。
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
