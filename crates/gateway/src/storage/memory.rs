//! # インメモリ スラッグストア
//!
//! ローカル実行・テスト用。プロセス終了で内容は失われる。

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{SlugStore, WriteOutcome};
use crate::error::GatewayError;

/// `RwLock<HashMap>` によるスラッグストア。
/// 条件判定と書き込みは同じ書き込みロック内で行う。
#[derive(Debug, Default)]
pub struct MemorySlugStore {
    slugs: RwLock<HashMap<String, String>>,
}

impl MemorySlugStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 初期データ付きで構築する。
    #[cfg(test)]
    pub fn with_entries<I, S, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            slugs: RwLock::new(
                entries
                    .into_iter()
                    .map(|(slug, target)| (slug.into(), target.into()))
                    .collect(),
            ),
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.slugs.read().await.len()
    }
}

#[async_trait::async_trait]
impl SlugStore for MemorySlugStore {
    async fn get(&self, slug: &str) -> Result<Option<String>, GatewayError> {
        Ok(self.slugs.read().await.get(slug).cloned())
    }

    async fn create_if_absent(
        &self,
        slug: &str,
        target: &str,
    ) -> Result<WriteOutcome, GatewayError> {
        match self.slugs.write().await.entry(slug.to_string()) {
            Entry::Occupied(_) => Ok(WriteOutcome::PreconditionFailed),
            Entry::Vacant(entry) => {
                entry.insert(target.to_string());
                Ok(WriteOutcome::Applied)
            }
        }
    }

    async fn update_if_present(
        &self,
        slug: &str,
        target: &str,
    ) -> Result<WriteOutcome, GatewayError> {
        match self.slugs.write().await.get_mut(slug) {
            Some(current) => {
                *current = target.to_string();
                Ok(WriteOutcome::Applied)
            }
            None => Ok(WriteOutcome::PreconditionFailed),
        }
    }

    async fn delete_if_present(&self, slug: &str) -> Result<WriteOutcome, GatewayError> {
        match self.slugs.write().await.remove(slug) {
            Some(_) => Ok(WriteOutcome::Applied),
            None => Ok(WriteOutcome::PreconditionFailed),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_conditional_writes() {
        let store = MemorySlugStore::new();
        assert_eq!(store.get("a").await.unwrap(), None);

        assert_eq!(
            store.update_if_present("a", "https://x").await.unwrap(),
            WriteOutcome::PreconditionFailed
        );
        assert_eq!(
            store.create_if_absent("a", "https://x").await.unwrap(),
            WriteOutcome::Applied
        );
        assert_eq!(
            store.create_if_absent("a", "https://y").await.unwrap(),
            WriteOutcome::PreconditionFailed
        );
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("https://x"));

        assert_eq!(
            store.update_if_present("a", "https://y").await.unwrap(),
            WriteOutcome::Applied
        );
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("https://y"));

        assert_eq!(
            store.delete_if_present("a").await.unwrap(),
            WriteOutcome::Applied
        );
        assert_eq!(
            store.delete_if_present("a").await.unwrap(),
            WriteOutcome::PreconditionFailed
        );
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_create_has_single_winner() {
        let store = Arc::new(MemorySlugStore::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .create_if_absent("race", &format!("https://example.com/{i}"))
                    .await
                    .unwrap()
            }));
        }

        let mut applied = 0;
        for handle in handles {
            if handle.await.unwrap() == WriteOutcome::Applied {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_with_entries() {
        let store = MemorySlugStore::with_entries([("docs", "https://docs.example.com")]);
        assert_eq!(
            store.get("docs").await.unwrap().as_deref(),
            Some("https://docs.example.com")
        );
    }
}
