use std::time::Duration;

use async_trait::async_trait;
use packrat_crypto::EncryptedBlob;
use packrat_domain::RecordKind;
use packrat_vault::{ExportBundle, VaultMeta};
use reqwest::header::IF_MATCH;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::{PutReceipt, RemoteBlob, RemoteMeta, VaultApi};
use crate::error::SyncError;

/// HTTP implementation of [`VaultApi`].
///
/// Wire contract:
/// - `GET/PUT {base}/vault` for the metadata document;
/// - `GET/PUT {base}/vault/blob/{kind}` per record collection;
/// - `GET {base}/vault/export`, `POST {base}/vault/import`;
/// - preconditions travel in the `If-Match` header, concurrency tokens and
///   timestamps in the JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpVaultApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpVaultApi {
    /// Builds a client with the given request timeout.
    ///
    /// # Errors
    /// Returns [`SyncError::Network`] if the TLS backend cannot be set up.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Network { message: e.to_string() })?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl VaultApi for HttpVaultApi {
    async fn get_meta(&self) -> Result<Option<RemoteMeta>, SyncError> {
        let resp =
            self.client.get(self.url("/vault")).send().await.map_err(transport)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(parse_json(check(resp)?).await?))
    }

    async fn put_meta(
        &self,
        meta: &VaultMeta,
        if_match: Option<&str>,
    ) -> Result<PutReceipt, SyncError> {
        debug!(if_match = if_match.unwrap_or("<none>"), "uploading vault metadata");
        let mut req = self.client.put(self.url("/vault")).json(meta);
        if let Some(tag) = if_match {
            req = req.header(IF_MATCH, tag);
        }
        let resp = req.send().await.map_err(transport)?;
        parse_json(check(resp)?).await
    }

    async fn get_blob(&self, kind: RecordKind) -> Result<Option<RemoteBlob>, SyncError> {
        let resp = self
            .client
            .get(self.url(&format!("/vault/blob/{kind}")))
            .send()
            .await
            .map_err(transport)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(parse_json(check(resp)?).await?))
    }

    async fn put_blob(
        &self,
        kind: RecordKind,
        blob: &EncryptedBlob,
        if_match: Option<&str>,
    ) -> Result<PutReceipt, SyncError> {
        debug!(%kind, if_match = if_match.unwrap_or("<none>"), "uploading record blob");
        let mut req = self.client.put(self.url(&format!("/vault/blob/{kind}"))).json(blob);
        if let Some(tag) = if_match {
            req = req.header(IF_MATCH, tag);
        }
        let resp = req.send().await.map_err(transport)?;
        parse_json(check(resp)?).await
    }

    async fn get_export(&self) -> Result<Option<ExportBundle>, SyncError> {
        let resp =
            self.client.get(self.url("/vault/export")).send().await.map_err(transport)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(parse_json(check(resp)?).await?))
    }

    async fn post_import(&self, bundle: &ExportBundle) -> Result<(), SyncError> {
        let resp = self
            .client
            .post(self.url("/vault/import"))
            .json(bundle)
            .send()
            .await
            .map_err(transport)?;
        check(resp)?;
        Ok(())
    }
}

fn transport(err: reqwest::Error) -> SyncError {
    if err.is_timeout() {
        SyncError::Timeout
    } else {
        SyncError::Network { message: err.to_string() }
    }
}

fn check(resp: Response) -> Result<Response, SyncError> {
    match resp.status() {
        s if s.is_success() => Ok(resp),
        StatusCode::CONFLICT => Err(SyncError::Conflict),
        s => Err(SyncError::Http { status: s.as_u16() }),
    }
}

async fn parse_json<T: DeserializeOwned>(resp: Response) -> Result<T, SyncError> {
    resp.json().await.map_err(|e| SyncError::Decode { message: e.to_string() })
}
