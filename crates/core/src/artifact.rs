//! # 署名アーティファクト
//!
//! `Authorization` ヘッダーのBase64値をデコードした署名データ。

use base64::Engine;

use crate::error::InputFormatError;

/// Base64エンジン（Standard、パディング必須）
fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

/// デコード済みの署名データ（クリアテキスト署名または分離署名）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureArtifact {
    bytes: Vec<u8>,
}

impl SignatureArtifact {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// ヘッダー値をデコードする。前後の空白のみ許容し、それ以外の不正な文字は拒否する。
    pub fn from_base64(header: &str) -> Result<Self, InputFormatError> {
        let bytes = b64()
            .decode(header.trim())
            .map_err(|_| InputFormatError::Base64)?;
        Ok(Self { bytes })
    }

    /// `Option` のヘッダー値からデコードする。
    pub fn from_header(header: Option<&str>) -> Result<Self, InputFormatError> {
        Self::from_base64(header.ok_or(InputFormatError::MissingHeader)?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_text(&self) -> Result<&str, InputFormatError> {
        std::str::from_utf8(&self.bytes).map_err(|_| InputFormatError::Utf8)
    }

    /// ヘッダーに載せる形にエンコードする。
    pub fn to_base64(&self) -> String {
        b64().encode(&self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base64_roundtrips_header_value() {
        let artifact = SignatureArtifact::from_bytes(b"-----BEGIN PGP SIGNED MESSAGE-----".to_vec());
        let header = artifact.to_base64();
        assert_eq!(SignatureArtifact::from_base64(&header).unwrap(), artifact);
        assert_eq!(
            SignatureArtifact::from_base64(&format!(" {header}\n")).unwrap(),
            artifact
        );
    }

    #[test]
    fn test_malformed_base64_is_input_error() {
        for header in ["not base64!", "YWJj=", "YW Jj", "YWJjZA"] {
            assert_eq!(
                SignatureArtifact::from_base64(header),
                Err(InputFormatError::Base64),
                "header={header:?}"
            );
        }
        assert_eq!(
            SignatureArtifact::from_header(None),
            Err(InputFormatError::MissingHeader)
        );
    }

    #[test]
    fn test_as_text_rejects_binary() {
        let artifact = SignatureArtifact::from_bytes(vec![0xC2, 0xFF, 0x00]);
        assert_eq!(artifact.as_text(), Err(InputFormatError::Utf8));
    }
}
