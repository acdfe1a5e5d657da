//! # ASCII Armor
//!
//! RFC 4880 §6 のRadix-64エンコーディングとCRC-24チェックサム。

use base64::Engine;

use crate::CryptoError;

const CRC24_INIT: u32 = 0x00B7_04CE;
const CRC24_POLY: u32 = 0x0186_4CFB;

/// Armor本文の1行あたりの文字数
const LINE_WIDTH: usize = 64;

/// Base64エンジン（Standard）
fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

/// Armorブロックの種別（`-----BEGIN PGP <種別>-----`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArmorKind {
    PublicKeyBlock,
    Signature,
    Message,
    Other(String),
}

impl ArmorKind {
    fn from_label(label: &str) -> Self {
        match label {
            "PUBLIC KEY BLOCK" => ArmorKind::PublicKeyBlock,
            "SIGNATURE" => ArmorKind::Signature,
            "MESSAGE" => ArmorKind::Message,
            other => ArmorKind::Other(other.to_string()),
        }
    }

    fn label(&self) -> &str {
        match self {
            ArmorKind::PublicKeyBlock => "PUBLIC KEY BLOCK",
            ArmorKind::Signature => "SIGNATURE",
            ArmorKind::Message => "MESSAGE",
            ArmorKind::Other(label) => label,
        }
    }
}

/// デコード済みのArmorブロック。
#[derive(Debug, Clone)]
pub struct ArmorBlock {
    pub kind: ArmorKind,
    /// Armorヘッダー（`Comment: ...` 等）
    pub headers: Vec<(String, String)>,
    /// Radix-64デコード後のバイナリ
    pub data: Vec<u8>,
}

/// CRC-24 (RFC 4880 §6.1)
pub fn crc24(data: &[u8]) -> u32 {
    let mut crc = CRC24_INIT;
    for &byte in data {
        crc ^= u32::from(byte) << 16;
        for _ in 0..8 {
            crc <<= 1;
            if crc & 0x0100_0000 != 0 {
                crc ^= CRC24_POLY;
            }
        }
    }
    crc & 0x00FF_FFFF
}

fn parse_marker<'a>(line: &'a str, edge: &str) -> Option<&'a str> {
    line.strip_prefix("-----")?
        .strip_prefix(edge)?
        .strip_prefix(" PGP ")?
        .strip_suffix("-----")
}

/// テキスト中のArmorブロックをすべてデコードする。
///
/// ブロック外の行は無視する。チェックサム行が存在する場合は検証し、
/// 一致しなければ [`CryptoError::Checksum`] を返す。
pub fn decode(text: &str) -> Result<Vec<ArmorBlock>, CryptoError> {
    let mut blocks = Vec::new();
    let mut lines = text.lines().map(str::trim_end);

    while let Some(line) = lines.next() {
        let Some(label) = parse_marker(line, "BEGIN") else {
            continue;
        };

        let mut headers = Vec::new();
        let mut body = String::new();
        let mut checksum = None;
        let mut in_headers = true;
        let mut closed = false;

        for line in lines.by_ref() {
            if let Some(end) = parse_marker(line, "END") {
                if end != label {
                    return Err(CryptoError::Armor(format!(
                        "BEGIN {label} に対応しない END {end}"
                    )));
                }
                closed = true;
                break;
            }
            if in_headers {
                if line.is_empty() {
                    in_headers = false;
                    continue;
                }
                if let Some((key, value)) = line.split_once(": ") {
                    headers.push((key.to_string(), value.to_string()));
                    continue;
                }
                // ヘッダーと本文の間の空行を省略する実装がある
                in_headers = false;
            }
            if let Some(crc) = line.strip_prefix('=') {
                checksum = Some(crc.to_string());
                continue;
            }
            body.push_str(line.trim());
        }

        if !closed {
            return Err(CryptoError::Armor(format!("END {label} が見つかりません")));
        }

        let data = b64()
            .decode(body.as_bytes())
            .map_err(|e| CryptoError::Armor(format!("Radix-64デコードに失敗: {e}")))?;

        if let Some(crc) = checksum {
            let crc_bytes = b64().decode(crc.as_bytes()).map_err(|_| CryptoError::Checksum)?;
            let crc_arr: [u8; 3] = crc_bytes.try_into().map_err(|_| CryptoError::Checksum)?;
            let expected = u32::from_be_bytes([0, crc_arr[0], crc_arr[1], crc_arr[2]]);
            if expected != crc24(&data) {
                return Err(CryptoError::Checksum);
            }
        }

        blocks.push(ArmorBlock {
            kind: ArmorKind::from_label(label),
            headers,
            data,
        });
    }

    Ok(blocks)
}

/// バイナリをArmorブロックとしてエンコードする（末尾改行付き）。
pub fn encode(kind: &ArmorKind, data: &[u8]) -> String {
    let label = kind.label();
    let body = b64().encode(data);
    let crc = crc24(data).to_be_bytes();

    let mut out = format!("-----BEGIN PGP {label}-----\n\n");
    for chunk in body.as_bytes().chunks(LINE_WIDTH) {
        // Base64出力はASCIIのみ
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push('\n');
    }
    out.push('=');
    out.push_str(&b64().encode(&crc[1..]));
    out.push('\n');
    out.push_str(&format!("-----END PGP {label}-----\n"));
    out
}

/// 入力がバイナリパケット列かどうか（先頭オクテットのCTBビットで判定）。
pub fn is_binary(input: &[u8]) -> bool {
    input.first().is_some_and(|b| b & 0x80 != 0)
}

/// Armorまたはバイナリの入力から、指定種別のパケット列を取り出す。
///
/// バイナリ入力はそのまま1件として返す。
pub fn dearmor_or_binary(input: &[u8], kind: &ArmorKind) -> Result<Vec<Vec<u8>>, CryptoError> {
    if is_binary(input) {
        return Ok(vec![input.to_vec()]);
    }
    let text = std::str::from_utf8(input)
        .map_err(|_| CryptoError::Armor("UTF-8として解釈できません".to_string()))?;
    let blocks: Vec<Vec<u8>> = decode(text)?
        .into_iter()
        .filter(|block| &block.kind == kind)
        .map(|block| block.data)
        .collect();
    if blocks.is_empty() {
        return Err(CryptoError::Armor(format!(
            "BEGIN PGP {} ブロックがありません",
            kind.label()
        )));
    }
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc24_empty_is_init() {
        assert_eq!(crc24(&[]), CRC24_INIT);
    }

    #[test]
    fn test_encode_then_decode() {
        let data: Vec<u8> = (0u8..=200).collect();
        let text = encode(&ArmorKind::Signature, &data);
        assert!(text.starts_with("-----BEGIN PGP SIGNATURE-----\n\n"));
        assert!(text.ends_with("-----END PGP SIGNATURE-----\n"));

        let blocks = decode(&text).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, ArmorKind::Signature);
        assert_eq!(blocks[0].data, data);
    }

    #[test]
    fn test_decode_rejects_bad_checksum() {
        let text = encode(&ArmorKind::Message, b"hello world");
        let tampered = text.replace("aGVsbG8gd29ybGQ=", "aGVsbG8gd29ybGg=");
        assert!(matches!(decode(&tampered), Err(CryptoError::Checksum)));
    }

    #[test]
    fn test_decode_keeps_headers_and_handles_crlf() {
        let text = encode(&ArmorKind::PublicKeyBlock, b"key bytes")
            .replacen("\n\n", "\nComment: test key\n\n", 1)
            .replace('\n', "\r\n");
        let blocks = decode(&text).unwrap();
        assert_eq!(
            blocks[0].headers,
            vec![("Comment".to_string(), "test key".to_string())]
        );
        assert_eq!(blocks[0].data, b"key bytes");
    }

    #[test]
    fn test_decode_multiple_blocks_and_surrounding_text() {
        let text = format!(
            "preamble\n{}between\n{}",
            encode(&ArmorKind::PublicKeyBlock, b"first"),
            encode(&ArmorKind::PublicKeyBlock, b"second")
        );
        let blocks = decode(&text).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].data, b"second");
    }

    #[test]
    fn test_decode_rejects_unterminated_block() {
        let text = "-----BEGIN PGP SIGNATURE-----\n\nAAAA\n";
        assert!(matches!(decode(text), Err(CryptoError::Armor(_))));
    }

    #[test]
    fn test_dearmor_or_binary_filters_kind() {
        let text = encode(&ArmorKind::Message, b"not a key");
        assert!(dearmor_or_binary(text.as_bytes(), &ArmorKind::PublicKeyBlock).is_err());

        let binary = [0xC6u8, 0x01, 0x04];
        let out = dearmor_or_binary(&binary, &ArmorKind::PublicKeyBlock).unwrap();
        assert_eq!(out, vec![binary.to_vec()]);
    }
}
