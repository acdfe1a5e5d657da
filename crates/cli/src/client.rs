//! # Gatewayクライアント
//!
//! 署名付き書き込み（POST/PUT/DELETE）と読み取り（リダイレクト先・信頼情報）を行う。

use reqwest::{Method, StatusCode};
use shortlink_crypto::Ed25519Signer;
use shortlink_types::{ErrorBody, SlugDeletion, SlugTarget, TrustInfo};

use crate::signing::{self, SignedRequest, SigningError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Gatewayへの接続に失敗: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error("Gatewayがリクエストを拒否しました ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("想定外のレスポンス: {0}")]
    Unexpected(String),
}

pub struct ShortlinkClient {
    endpoint: String,
    http: reqwest::Client,
}

impl ShortlinkClient {
    /// `endpoint` はGatewayのベースURL（末尾の `/` は無視する）。
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    /// スラッグを新規登録する。
    pub async fn create(
        &self,
        signer: &Ed25519Signer,
        slug: &str,
        target: &str,
    ) -> Result<(), ClientError> {
        let payload = serde_json::to_value(SlugTarget {
            target: target.to_string(),
        })
        .map_err(SigningError::from)?;
        self.send_signed(Method::POST, slug, signer, &payload).await
    }

    /// 登録済みスラッグの転送先を更新する。
    pub async fn update(
        &self,
        signer: &Ed25519Signer,
        slug: &str,
        target: &str,
    ) -> Result<(), ClientError> {
        let payload = serde_json::to_value(SlugTarget {
            target: target.to_string(),
        })
        .map_err(SigningError::from)?;
        self.send_signed(Method::PUT, slug, signer, &payload).await
    }

    /// 登録済みスラッグを削除する。
    pub async fn delete(&self, signer: &Ed25519Signer, slug: &str) -> Result<(), ClientError> {
        let payload = serde_json::to_value(SlugDeletion {
            slug: slug.to_string(),
        })
        .map_err(SigningError::from)?;
        self.send_signed(Method::DELETE, slug, signer, &payload).await
    }

    async fn send_signed(
        &self,
        method: Method,
        slug: &str,
        signer: &Ed25519Signer,
        payload: &serde_json::Value,
    ) -> Result<(), ClientError> {
        let SignedRequest {
            authorization,
            body,
        } = signing::sign_payload(signer, payload, signing::now())?;

        tracing::debug!(%method, slug, "署名付きリクエストを送信します");
        let response = self
            .http
            .request(method, self.url(slug))
            .header(reqwest::header::AUTHORIZATION, authorization)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejected(response).await)
        }
    }

    /// スラッグの転送先を返す（リダイレクトは辿らない）。
    pub async fn resolve(&self, slug: &str) -> Result<String, ClientError> {
        let response = self.http.get(self.url(slug)).send().await?;
        if response.status() != StatusCode::PERMANENT_REDIRECT {
            return Err(rejected(response).await);
        }
        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ClientError::Unexpected("locationヘッダーがありません".to_string()))
    }

    /// Gatewayが信頼している公開鍵と猶予期間を取得する。
    pub async fn trust_info(&self) -> Result<TrustInfo, ClientError> {
        let response = self
            .http
            .get(self.url("/.well-known/shortlink-keys"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        Ok(response.json().await?)
    }
}

/// エラーレスポンスを `{code, message}` として解釈する（解釈できなければ本文そのまま）。
async fn rejected(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text);
    ClientError::Rejected { status, message }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::response::IntoResponse;
    use shortlink_core::{authenticate, decide, GracePeriod, TrustedKeySet};

    use super::*;

    fn signer() -> Ed25519Signer {
        Ed25519Signer::from_seed([3u8; 32], "CLI <cli@example.com>", 1_700_000_000)
    }

    /// 署名を検証して結果だけを返すモックGateway
    async fn verify_write(
        State(keys): State<Arc<TrustedKeySet>>,
        Path(slug): Path<String>,
        headers: HeaderMap,
        body: String,
    ) -> axum::response::Response {
        let header = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !decide(Some(header), &keys, GracePeriod::default()).authorize {
            return (
                AxumStatus::UNAUTHORIZED,
                axum::Json(ErrorBody {
                    code: 401,
                    message: "Unauthorized".into(),
                }),
            )
                .into_response();
        }
        assert!(authenticate(header, &body, &keys));
        if slug == "taken" {
            return (
                AxumStatus::CONFLICT,
                axum::Json(ErrorBody {
                    code: 409,
                    message: "Slug already has a registered target.".into(),
                }),
            )
                .into_response();
        }
        AxumStatus::NO_CONTENT.into_response()
    }

    async fn spawn_mock_gateway(keys: TrustedKeySet) -> String {
        let app = axum::Router::new()
            .route(
                "/{slug}",
                axum::routing::post(verify_write)
                    .put(verify_write)
                    .delete(verify_write)
                    .get(|Path(slug): Path<String>| async move {
                        if slug == "docs" {
                            (
                                AxumStatus::PERMANENT_REDIRECT,
                                [("location", "https://docs.example.com")],
                                "redirecting",
                            )
                                .into_response()
                        } else {
                            (
                                AxumStatus::NOT_FOUND,
                                axum::Json(ErrorBody {
                                    code: 404,
                                    message: "Slug has no target.".into(),
                                }),
                            )
                                .into_response()
                        }
                    }),
            )
            .with_state(Arc::new(keys));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        format!("http://127.0.0.1:{port}/")
    }

    #[tokio::test]
    async fn test_signed_writes_are_accepted() {
        let signer = signer();
        let keys = TrustedKeySet::bootstrap(signer.public_key_armor().as_bytes()).unwrap();
        let client = ShortlinkClient::new(&spawn_mock_gateway(keys).await).unwrap();

        client.create(&signer, "ex", "https://example.com").await.unwrap();
        client.update(&signer, "ex", "https://example.org").await.unwrap();
        client.delete(&signer, "ex").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejections_carry_gateway_message() {
        let signer = signer();
        let keys = TrustedKeySet::bootstrap(signer.public_key_armor().as_bytes()).unwrap();
        let client = ShortlinkClient::new(&spawn_mock_gateway(keys).await).unwrap();

        let err = client
            .create(&signer, "taken", "https://example.com")
            .await
            .unwrap_err();
        match err {
            ClientError::Rejected { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Slug already has a registered target.");
            }
            other => panic!("unexpected error: {other}"),
        }

        let stranger = Ed25519Signer::from_seed([4u8; 32], "Other", 1_700_000_000);
        let err = client.delete(&stranger, "ex").await.unwrap_err();
        assert!(matches!(err, ClientError::Rejected { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_resolve() {
        let keys = TrustedKeySet::bootstrap(signer().public_key_armor().as_bytes()).unwrap();
        let client = ShortlinkClient::new(&spawn_mock_gateway(keys).await).unwrap();

        assert_eq!(
            client.resolve("docs").await.unwrap(),
            "https://docs.example.com"
        );
        let err = client.resolve("missing").await.unwrap_err();
        assert!(matches!(err, ClientError::Rejected { status: 404, .. }));
    }
}
