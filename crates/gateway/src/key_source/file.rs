//! # ファイル 公開鍵ソース
//!
//! ローカルファイルから公開鍵素材を読み込む。開発・テスト環境、
//! またはデプロイ時に鍵を同梱する構成向け。

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use super::KeySource;

/// ローカルファイルから公開鍵素材を読み込むソース。
pub struct FileKeySource {
    path: PathBuf,
}

impl FileKeySource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl KeySource for FileKeySource {
    fn fetch<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, String>> + Send + 'a>> {
        Box::pin(async move {
            tokio::fs::read(&self.path)
                .await
                .map_err(|e| format!("公開鍵ファイルの読み込みに失敗 ({}): {e}", self.path.display()))
        })
    }

    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_file() {
        let path = std::env::temp_dir().join(format!("shortlink-key-{}.asc", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, b"material").await.unwrap();

        let source = FileKeySource::new(path.clone());
        assert_eq!(source.fetch().await.unwrap(), b"material");
        assert!(source.describe().starts_with("file://"));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = FileKeySource::new(PathBuf::from("/nonexistent/shortlink/pub.asc"));
        let err = source.fetch().await.unwrap_err();
        assert!(err.contains("/nonexistent/shortlink/pub.asc"));
    }
}
