//! # Gateway設定・共有状態
//!
//! 環境変数からの設定読み込みとGatewayの共有状態の定義。
//! 設定は起動時に一度だけ読み込む。

use std::path::PathBuf;

use shortlink_core::{GracePeriod, TrustedKeySet};

use crate::storage::SlugStore;

/// デフォルトの待ち受けアドレス
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// 設定エラー。起動を中止する。
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("PUBLIC_KEY_URL または PUBLIC_KEY_FILE を設定してください")]
    MissingKeyLocation,
    #[error("GRACE_PERIOD は0以上の整数（秒）である必要があります: {0:?}")]
    InvalidGracePeriod(String),
}

/// 公開鍵素材の取得元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyLocation {
    Url(String),
    File(PathBuf),
}

/// 起動時設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub key_location: KeyLocation,
    pub grace_period: GracePeriod,
    pub bind_addr: String,
}

impl GatewayConfig {
    /// プロセスの環境変数から読み込む。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から読み込む。空文字列は未設定として扱う。
    ///
    /// `PUBLIC_KEY_FILE` と `PUBLIC_KEY_URL` の両方があればファイルを優先する。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let key_location = match (get("PUBLIC_KEY_FILE"), get("PUBLIC_KEY_URL")) {
            (Some(path), _) => KeyLocation::File(PathBuf::from(path)),
            (None, Some(url)) => KeyLocation::Url(url),
            (None, None) => return Err(ConfigError::MissingKeyLocation),
        };

        let grace_period = match get("GRACE_PERIOD") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(GracePeriod::from_secs)
                .map_err(|_| ConfigError::InvalidGracePeriod(raw))?,
            None => GracePeriod::default(),
        };

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            key_location,
            grace_period,
            bind_addr,
        })
    }
}

/// Gatewayの共有状態。
pub struct GatewayState {
    /// 起動時に構築した信頼済み公開鍵セット（以後変更しない）
    pub keys: TrustedKeySet,
    /// 署名の猶予期間
    pub grace_period: GracePeriod,
    /// スラッグストア（トレイトで抽象化）
    pub store: Box<dyn SlugStore>,
}
