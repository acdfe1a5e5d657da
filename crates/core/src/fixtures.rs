//! テスト用フィクスチャ
//!
//! GnuPGで生成した鍵・署名（鍵作成 1700000000、署名 1700000100）と、
//! 署名時刻を自由に指定できる決定的な署名者。

use base64::Engine;
use shortlink_crypto::Ed25519Signer;

use crate::TrustedKeySet;

pub const TRUSTED_KEYS: &str = include_str!("../tests/fixtures/trusted_keys.asc");
pub const UNTRUSTED_KEY: &str = include_str!("../tests/fixtures/untrusted_key.asc");
pub const PAYLOAD: &str = include_str!("../tests/fixtures/payload.json");
pub const SIGNED_ED25519: &str = include_str!("../tests/fixtures/signed_ed25519.asc");
pub const SIGNED_P256: &str = include_str!("../tests/fixtures/signed_p256.asc");
pub const SIGNED_UNTRUSTED: &str = include_str!("../tests/fixtures/signed_untrusted.asc");
pub const DETACHED_ED25519: &str = include_str!("../tests/fixtures/payload_ed25519.sig");

pub const ED25519_FINGERPRINT: &str = "FF6B6D59214220B7B1C17FAAA10629E68BD42161";
pub const P256_FINGERPRINT: &str = "E86642561BBD86F88573C457BD526210C33E8E20";
pub const UNTRUSTED_FINGERPRINT: &str = "2137C6293AE2B15901F8722537B07B782ABE33E1";

/// フィクスチャ署名の作成時刻
pub const SIGNED_AT: u64 = 1_700_000_100;

pub fn trusted_keys() -> TrustedKeySet {
    TrustedKeySet::bootstrap(TRUSTED_KEYS.as_bytes()).unwrap()
}

pub fn signer() -> Ed25519Signer {
    let seed: [u8; 32] = core::array::from_fn(|i| i as u8);
    Ed25519Signer::from_seed(seed, "Writer <writer@example.com>", 1_700_000_000)
}

pub fn signer_keys() -> TrustedKeySet {
    TrustedKeySet::bootstrap(signer().public_key_armor().as_bytes()).unwrap()
}

/// `Authorization` ヘッダー値（Base64）
pub fn header(signed: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(signed)
}
