//! # Ed25519署名者
//!
//! CLIとテストで使う、GnuPG互換の出力を作る最小限の署名者。
//! 32バイトのシードと鍵作成時刻・ユーザーIDから決定的に鍵を構成する。

use ed25519_dalek::{Signer as _, SigningKey};

use crate::armor::{self, ArmorKind};
use crate::cleartext;
use crate::key::{v4_fingerprint, ALGO_EDDSA_LEGACY, EDDSA_POINT_PREFIX, OID_ED25519};
use crate::packet::{encode_mpi, encode_packet, TAG_PUBLIC_KEY, TAG_SIGNATURE, TAG_USER_ID};
use crate::signature::{
    encode_subpacket, hash_trailer, HashAlgorithm, SignatureType, SUBPACKET_CREATION_TIME,
    SUBPACKET_ISSUER, SUBPACKET_ISSUER_FINGERPRINT, SUBPACKET_KEY_FLAGS,
};

/// ポジティブ認証署名（自己署名）
const SIG_POSITIVE_CERTIFICATION: u8 = 0x13;
/// 鍵フラグ: 認証 + 署名
const KEY_FLAGS_CERTIFY_SIGN: u8 = 0x03;

const HASH: HashAlgorithm = HashAlgorithm::Sha256;

pub struct Ed25519Signer {
    signing_key: SigningKey,
    user_id: String,
    created: u32,
    key_body: Vec<u8>,
    fingerprint: [u8; 20],
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("fingerprint", &self.fingerprint_hex())
            .field("user_id", &self.user_id)
            .field("created", &self.created)
            .finish_non_exhaustive()
    }
}

impl Ed25519Signer {
    /// シードから署名者を構成する。同じ引数からは常に同じフィンガープリントになる。
    pub fn from_seed(seed: [u8; 32], user_id: impl Into<String>, created: u32) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);

        let mut point = vec![EDDSA_POINT_PREFIX];
        point.extend_from_slice(signing_key.verifying_key().as_bytes());

        let mut key_body = vec![4];
        key_body.extend_from_slice(&created.to_be_bytes());
        key_body.push(ALGO_EDDSA_LEGACY);
        key_body.push(OID_ED25519.len() as u8);
        key_body.extend_from_slice(OID_ED25519);
        key_body.extend_from_slice(&encode_mpi(&point));

        let fingerprint = v4_fingerprint(&key_body);
        Self {
            signing_key,
            user_id: user_id.into(),
            created,
            key_body,
            fingerprint,
        }
    }

    /// OSの乱数からシードを生成する。
    pub fn generate(user_id: impl Into<String>, created: u32) -> Self {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        Self::from_seed(signing_key.to_bytes(), user_id, created)
    }

    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// 鍵作成時刻（UNIX秒）
    pub fn created(&self) -> u32 {
        self.created
    }

    pub fn fingerprint(&self) -> &[u8; 20] {
        &self.fingerprint
    }

    pub fn fingerprint_hex(&self) -> String {
        hex::encode_upper(self.fingerprint)
    }

    fn key_id(&self) -> &[u8] {
        &self.fingerprint[12..]
    }

    /// v4署名パケット本文を作る。`prefix` はハッシュ対象部より前にハッシュする入力。
    fn sign(&self, sig_type: u8, prefix: &[&[u8]], created: u32, key_flags: bool) -> Vec<u8> {
        let mut issuer_fp = vec![4];
        issuer_fp.extend_from_slice(&self.fingerprint);

        let mut hashed = encode_subpacket(SUBPACKET_CREATION_TIME, &created.to_be_bytes());
        if key_flags {
            hashed.extend(encode_subpacket(SUBPACKET_KEY_FLAGS, &[KEY_FLAGS_CERTIFY_SIGN]));
        }
        hashed.extend(encode_subpacket(SUBPACKET_ISSUER_FINGERPRINT, &issuer_fp));
        let unhashed = encode_subpacket(SUBPACKET_ISSUER, self.key_id());

        let mut body = vec![4, sig_type, ALGO_EDDSA_LEGACY, HASH.id()];
        body.extend_from_slice(&(hashed.len() as u16).to_be_bytes());
        body.extend_from_slice(&hashed);

        let trailer = hash_trailer(body.len());
        let mut parts = prefix.to_vec();
        parts.push(&body);
        parts.push(&trailer);
        let digest = HASH.digest(&parts);
        let signature = self.signing_key.sign(&digest).to_bytes();

        body.extend_from_slice(&(unhashed.len() as u16).to_be_bytes());
        body.extend_from_slice(&unhashed);
        body.extend_from_slice(&digest[..2]);
        body.extend_from_slice(&encode_mpi(&signature[..32]));
        body.extend_from_slice(&encode_mpi(&signature[32..]));
        body
    }

    /// 公開鍵ブロック（鍵パケット + ユーザーID + 自己署名）をArmorで出力する。
    pub fn public_key_armor(&self) -> String {
        let uid = self.user_id.as_bytes();
        let mut key_prefix = vec![0x99];
        key_prefix.extend_from_slice(&(self.key_body.len() as u16).to_be_bytes());
        key_prefix.extend_from_slice(&self.key_body);
        let mut uid_prefix = vec![0xB4];
        uid_prefix.extend_from_slice(&(uid.len() as u32).to_be_bytes());
        uid_prefix.extend_from_slice(uid);

        let self_sig = self.sign(
            SIG_POSITIVE_CERTIFICATION,
            &[key_prefix.as_slice(), uid_prefix.as_slice()],
            self.created,
            true,
        );

        let mut data = encode_packet(TAG_PUBLIC_KEY, &self.key_body);
        data.extend(encode_packet(TAG_USER_ID, uid));
        data.extend(encode_packet(TAG_SIGNATURE, &self_sig));
        armor::encode(&ArmorKind::PublicKeyBlock, &data)
    }

    /// クリアテキスト署名を作る（SHA-256、テキスト署名）。
    pub fn clearsign(&self, text: &str, created: u32) -> String {
        let lines = cleartext::canonical_lines(text);
        let signed = lines.join("\r\n");
        let body = self.sign(SignatureType::Text.id(), &[signed.as_bytes()], created, false);
        let armored = armor::encode(&ArmorKind::Signature, &encode_packet(TAG_SIGNATURE, &body));
        cleartext::compose(HASH, &lines, &armored)
    }

    /// バイナリ文書の分離署名をArmorで出力する。
    pub fn sign_detached(&self, content: &[u8], created: u32) -> String {
        let body = self.sign(SignatureType::Binary.id(), &[content], created, false);
        armor::encode(&ArmorKind::Signature, &encode_packet(TAG_SIGNATURE, &body))
    }
}
