//! # Cleartext Signature Framework
//!
//! RFC 4880 §7 のクリアテキスト署名の解析と組み立て。
//!
//! ```text
//! -----BEGIN PGP SIGNED MESSAGE-----
//! Hash: SHA256
//!
//! <ダッシュエスケープされた本文>
//! -----BEGIN PGP SIGNATURE-----
//! ...
//! -----END PGP SIGNATURE-----
//! ```
//!
//! 署名対象テキストは、各行のダッシュエスケープを外し行末の空白・タブを除去して
//! CRLFで連結したもの。署名マーカー直前の改行は含まない。

use crate::armor::{self, ArmorKind};
use crate::signature::{HashAlgorithm, Signature};
use crate::CryptoError;

pub const SIGNED_MESSAGE_HEADER: &str = "-----BEGIN PGP SIGNED MESSAGE-----";
pub const SIGNATURE_HEADER: &str = "-----BEGIN PGP SIGNATURE-----";

/// 枠組みだけを解析した結果（署名ブロックは未解析）
struct Frame<'a> {
    hash_names: Vec<String>,
    lines: Vec<&'a str>,
    signature_armor: &'a str,
}

fn unescape(line: &str) -> &str {
    line.strip_prefix("- ").unwrap_or(line)
}

fn split_frame(input: &str) -> Result<Frame<'_>, CryptoError> {
    let mut hash_names = Vec::new();
    let mut lines = Vec::new();
    let mut offset = 0;
    let mut state = 0u8; // 0: 開始前, 1: ヘッダー, 2: 本文

    for raw in input.split_inclusive('\n') {
        let start = offset;
        offset += raw.len();
        let line = raw.trim_end_matches(['\r', '\n']);

        match state {
            0 => {
                if line.trim_end() == SIGNED_MESSAGE_HEADER {
                    state = 1;
                }
            }
            1 => {
                if line.trim().is_empty() {
                    state = 2;
                } else if let Some(value) = line.strip_prefix("Hash:") {
                    hash_names.extend(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|name| !name.is_empty())
                            .map(str::to_ascii_uppercase),
                    );
                } else if !line.contains(": ") {
                    return Err(CryptoError::Cleartext(format!(
                        "不正なヘッダー行です: {line}"
                    )));
                }
            }
            _ => {
                if line.trim_end() == SIGNATURE_HEADER {
                    return Ok(Frame {
                        hash_names,
                        lines,
                        signature_armor: &input[start..],
                    });
                }
                lines.push(unescape(line));
            }
        }
    }

    let reason = match state {
        0 => "BEGIN PGP SIGNED MESSAGE がありません",
        1 => "ヘッダーの終端（空行）がありません",
        _ => "BEGIN PGP SIGNATURE がありません",
    };
    Err(CryptoError::Cleartext(reason.to_string()))
}

/// 署名を検証せずに、クリアテキスト署名から本文だけを取り出す（LF連結）。
pub fn extract_text(input: &str) -> Result<String, CryptoError> {
    Ok(split_frame(input)?.lines.join("\n"))
}

fn strip_trailing_whitespace(line: &str) -> &str {
    line.trim_end_matches([' ', '\t'])
}

/// 解析済みのクリアテキスト署名メッセージ。
#[derive(Debug, Clone)]
pub struct CleartextMessage {
    hash_names: Vec<String>,
    lines: Vec<String>,
    signatures: Vec<Signature>,
}

impl CleartextMessage {
    /// クリアテキスト署名を解析する。
    ///
    /// `Hash:` ヘッダーが宣言されている場合、宣言外のハッシュを使う署名は除外する。
    pub fn parse(input: &str) -> Result<Self, CryptoError> {
        let frame = split_frame(input)?;

        let mut signatures = Vec::new();
        for block in armor::decode(frame.signature_armor)? {
            if block.kind != ArmorKind::Signature {
                continue;
            }
            signatures.extend(Signature::parse_all(&block.data)?);
        }
        if !frame.hash_names.is_empty() {
            signatures.retain(|sig| {
                frame
                    .hash_names
                    .iter()
                    .any(|name| name == sig.hash_algorithm().name())
            });
        }

        Ok(Self {
            hash_names: frame.hash_names,
            lines: frame.lines.into_iter().map(str::to_string).collect(),
            signatures,
        })
    }

    /// ダッシュエスケープを外した本文（LF連結）
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// 署名対象のテキスト（行末空白除去、CRLF連結）
    pub fn signed_text(&self) -> Vec<u8> {
        self.lines
            .iter()
            .map(|line| strip_trailing_whitespace(line))
            .collect::<Vec<_>>()
            .join("\r\n")
            .into_bytes()
    }

    /// `Hash:` ヘッダーで宣言されたハッシュのうち対応しているもの
    pub fn declared_hashes(&self) -> Vec<HashAlgorithm> {
        self.hash_names
            .iter()
            .filter_map(|name| HashAlgorithm::from_name(name))
            .collect()
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }
}

/// 本文の各行を署名対象の形（行末空白除去）にそろえる。
pub(crate) fn canonical_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| strip_trailing_whitespace(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}

/// 本文と署名ブロックからクリアテキスト署名を組み立てる。
pub(crate) fn compose(hash: HashAlgorithm, lines: &[&str], signature_armor: &str) -> String {
    let mut out = format!("{SIGNED_MESSAGE_HEADER}\nHash: {}\n\n", hash.name());
    for line in lines {
        if line.starts_with('-') {
            out.push_str("- ");
        }
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(signature_armor);
    out
}
