use shortlink_crypto::CryptoError;

/// 起動時の信頼鍵セット構築エラー。プロセスを停止させる。
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// 公開鍵素材の取得失敗
    #[error("公開鍵素材の取得に失敗しました: {0}")]
    Fetch(String),
    /// 公開鍵素材の形式エラー
    #[error("公開鍵素材の形式が不正です: {0}")]
    Format(#[from] CryptoError),
    /// 利用可能な鍵が1件もない
    #[error("利用可能な公開鍵がありません")]
    NoUsableKeys,
}

/// リクエスト入力の形式エラー。呼び出し側で必ず拒否として扱う。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputFormatError {
    #[error("Authorizationヘッダーがありません")]
    MissingHeader,
    #[error("Authorizationヘッダーが正しいBase64ではありません")]
    Base64,
    #[error("署名データがUTF-8テキストではありません")]
    Utf8,
}
