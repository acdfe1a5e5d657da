//! # Authorizer
//!
//! 署名検証と鮮度判定を合成し、後段ハンドラの実行可否を返す。
//! ヘッダー欠落・Base64不正を含むあらゆる失敗は拒否になる。

use shortlink_types::{AuthorizationOutcome, RequestContext};

use crate::artifact::SignatureArtifact;
use crate::freshness::{is_fresh, unix_now, GracePeriod};
use crate::keystore::TrustedKeySet;
use crate::verifier::verify;

/// 現在時刻で判定する。
pub fn decide(
    authorization: Option<&str>,
    keys: &TrustedKeySet,
    grace: GracePeriod,
) -> AuthorizationOutcome {
    decide_at(authorization, keys, grace, unix_now())
}

/// `now`（UNIX秒）を指定して判定する。
pub fn decide_at(
    authorization: Option<&str>,
    keys: &TrustedKeySet,
    grace: GracePeriod,
    now: u64,
) -> AuthorizationOutcome {
    let artifact = match SignatureArtifact::from_header(authorization) {
        Ok(artifact) => artifact,
        Err(e) => {
            tracing::info!(error = %e, "Authorizationヘッダーを拒否しました");
            return AuthorizationOutcome::deny();
        }
    };

    let result = verify(&artifact, keys);
    let (Some(fingerprint), Some(timestamp)) = (&result.fingerprint, result.timestamp) else {
        tracing::info!(verified = result.valid, "署名を検証できませんでした");
        return AuthorizationOutcome::deny();
    };

    let fresh = is_fresh(timestamp, grace, now);
    tracing::info!(
        fingerprint = %fingerprint,
        timestamp,
        elapsed = (now as i64).saturating_sub(timestamp as i64),
        grace_period = grace.as_secs(),
        authorized = result.valid && fresh,
        "署名を検証しました"
    );

    if result.valid && fresh {
        AuthorizationOutcome::allow()
    } else {
        AuthorizationOutcome::deny()
    }
}

/// リクエストコンテキストの `Authorization` ヘッダーで判定する。
pub fn authorize_request(
    ctx: &RequestContext,
    keys: &TrustedKeySet,
    grace: GracePeriod,
) -> AuthorizationOutcome {
    decide(ctx.authorization(), keys, grace)
}
