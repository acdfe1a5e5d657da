//! # スラッグストア
//!
//! スラッグ→転送先URLの対応を保持するストレージの抽象インターフェース。
//! 条件付き書き込み（存在しなければ作成・存在すれば更新/削除）は
//! 実装側で原子的に行うこと。インメモリ実装は `memory` サブモジュールを参照。

pub mod memory;

pub use memory::MemorySlugStore;

use crate::error::GatewayError;

/// 条件付き書き込みの結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// 書き込みを反映した
    Applied,
    /// 前提条件（存在する/しない）を満たさず何もしなかった
    PreconditionFailed,
}

/// スラッグストアの抽象インターフェース。
///
/// Gateway運用者はKVS等の条件付き書き込みを持つバックエンドを実装として選択できる。
#[async_trait::async_trait]
pub trait SlugStore: Send + Sync {
    /// 登録済みの転送先を返す。未登録なら `None`。
    async fn get(&self, slug: &str) -> Result<Option<String>, GatewayError>;

    /// スラッグが未登録の場合のみ作成する。
    async fn create_if_absent(&self, slug: &str, target: &str)
        -> Result<WriteOutcome, GatewayError>;

    /// スラッグが登録済みの場合のみ転送先を置き換える。
    async fn update_if_present(
        &self,
        slug: &str,
        target: &str,
    ) -> Result<WriteOutcome, GatewayError>;

    /// スラッグが登録済みの場合のみ削除する。
    async fn delete_if_present(&self, slug: &str) -> Result<WriteOutcome, GatewayError>;
}
