//! CurseForge API client.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::http::{HttpClient, status_of};

use super::{CurseForgeApi, decode_item};

pub const DEFAULT_CURSEFORGE_API_URL: &str = "https://api.curseforge.com/v1";

/// `hashes[].algo` value for SHA-1.
pub const HASH_ALGO_SHA1: u32 = 1;

/// A file record as returned by the fingerprint endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurseForgeFile {
    pub id: u64,
    pub mod_id: u64,
    pub file_name: String,
    pub display_name: String,
    pub file_fingerprint: u32,
    #[serde(default)]
    pub hashes: Vec<FileHash>,
    /// Fingerprints of files bundled inside the artifact.
    #[serde(default)]
    pub modules: Vec<FileModule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileHash {
    pub value: String,
    pub algo: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileModule {
    #[serde(default)]
    pub name: Option<String>,
    pub fingerprint: u32,
}

/// A file record as returned by the batch files endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurseForgeFileSummary {
    pub id: u64,
    pub display_name: String,
    /// Absent when the author disallows third-party distribution.
    #[serde(default)]
    pub download_url: Option<String>,
}

/// Outcome of a single download-url lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadUrl {
    Available(String),
    /// Distribution is not permitted for this file.
    Restricted,
}

/// Response envelopes (internal).
mod api {
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    use super::CurseForgeFile;

    #[derive(Serialize, Debug)]
    pub struct FingerprintsRequest<'a> {
        pub fingerprints: &'a [u32],
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct FilesRequest<'a> {
        pub file_ids: &'a [u64],
    }

    #[derive(Deserialize, Debug)]
    pub struct Data<T> {
        pub data: T,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct FingerprintMatches {
        #[serde(default)]
        pub exact_matches: Vec<Value>,
    }

    #[derive(Deserialize, Debug)]
    pub struct FingerprintMatch {
        pub file: CurseForgeFile,
    }

    pub type FingerprintsResponse = Data<FingerprintMatches>;
    pub type FilesResponse = Data<Vec<Value>>;
    pub type DownloadUrlResponse = Data<Option<String>>;
}

/// CurseForge client. The API key travels as a default header of the
/// wrapped reqwest client.
pub struct CurseForgeClient {
    http_client: HttpClient,
    api_url: String,
}

impl CurseForgeClient {
    pub fn new(http_client: HttpClient, api_url: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl CurseForgeApi for CurseForgeClient {
    async fn fingerprint_matches(&self, fingerprints: &[u32]) -> Result<Vec<CurseForgeFile>> {
        let url = format!("{}/fingerprints", self.api_url);
        debug!("Requesting {} fingerprints from {}", fingerprints.len(), url);
        // TODO: split into several requests once CurseForge documents a per-request fingerprint limit.
        let response: api::FingerprintsResponse = self
            .http_client
            .post_json(&url, &api::FingerprintsRequest { fingerprints })
            .await?;
        Ok(response
            .data
            .exact_matches
            .into_iter()
            .filter_map(|m| decode_item::<api::FingerprintMatch>("fingerprint match", m))
            .map(|m| m.file)
            .collect())
    }

    async fn files(&self, file_ids: &[u64]) -> Result<Vec<CurseForgeFileSummary>> {
        let url = format!("{}/mods/files", self.api_url);
        debug!("Requesting {} files from {}", file_ids.len(), url);
        let response: api::FilesResponse = self
            .http_client
            .post_json(&url, &api::FilesRequest { file_ids })
            .await?;
        Ok(response
            .data
            .into_iter()
            .filter_map(|f| decode_item("file", f))
            .collect())
    }

    async fn download_url(&self, project_id: u64, file_id: u64) -> Result<DownloadUrl> {
        let url = format!(
            "{}/mods/{}/files/{}/download-url",
            self.api_url, project_id, file_id
        );
        match self
            .http_client
            .get_json::<api::DownloadUrlResponse>(&url)
            .await
        {
            Ok(api::Data { data: Some(url) }) => Ok(DownloadUrl::Available(url)),
            Ok(api::Data { data: None }) => Ok(DownloadUrl::Restricted),
            Err(e) if status_of(&e) == Some(StatusCode::FORBIDDEN) => Ok(DownloadUrl::Restricted),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use mockito::Matcher;
    use reqwest::Client;

    fn client_for(server: &mockito::Server) -> CurseForgeClient {
        CurseForgeClient::new(HttpClient::new(Client::new()), &server.url())
    }

    #[tokio::test]
    async fn test_fingerprint_matches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/fingerprints")
            .match_body(Matcher::Json(serde_json::json!({"fingerprints": [3641486011u32]})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": {"isCacheBuilt": true, "exactMatches": [{"id": 4712866, "file": {
                    "id": 4712866, "gameId": 432, "modId": 238222,
                    "displayName": "jei-1.20.1-forge-15.2.0.27.jar",
                    "fileName": "jei-1.20.1-forge-15.2.0.27.jar",
                    "fileFingerprint": 3641486011,
                    "hashes": [{"value": "8b3e1f3f0c7a2b6a9d1e8c5f4a3b2c1d0e9f8a7b", "algo": 1},
                               {"value": "0cc175b9c0f1b6a831c399e269772661", "algo": 2}],
                    "modules": [{"name": "META-INF", "fingerprint": 11}]
                }}], "exactFingerprints": [3641486011], "partialMatches": []}}"#,
            )
            .create_async()
            .await;

        let files = client_for(&server)
            .fingerprint_matches(&[3641486011])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].mod_id, 238222);
        assert_eq!(files[0].file_fingerprint, 3641486011);
        assert_eq!(files[0].hashes[0].algo, HASH_ALGO_SHA1);
        assert_eq!(files[0].modules[0].fingerprint, 11);
    }

    #[test_log::test(tokio::test)]
    async fn test_malformed_match_is_skipped() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/fingerprints")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": {"exactMatches": [
                    {"id": 1, "file": {"id": 1, "modId": 10, "displayName": "a.jar", "fileName": "a.jar", "fileFingerprint": 42}},
                    {"id": 2, "file": {"id": 2, "modId": 20, "fileName": "b.jar", "fileFingerprint": 43}}
                ]}}"#,
            )
            .create_async()
            .await;

        let files = client_for(&server)
            .fingerprint_matches(&[42, 43])
            .await
            .unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_fingerprint, 42);
    }

    #[tokio::test]
    async fn test_fingerprint_matches_unauthorized_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/fingerprints")
            .with_status(401)
            .create_async()
            .await;

        let err = client_for(&server)
            .fingerprint_matches(&[1])
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Http { status, .. }) if *status == StatusCode::UNAUTHORIZED
        ));
    }

    #[tokio::test]
    async fn test_files_keeps_missing_download_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/mods/files")
            .match_body(Matcher::Json(serde_json::json!({"fileIds": [1, 2]})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": [
                    {"id": 1, "displayName": "open.jar", "downloadUrl": "https://edge.forgecdn.net/files/0/1/open.jar"},
                    {"id": 2, "displayName": "closed.jar", "downloadUrl": null}
                ]}"#,
            )
            .create_async()
            .await;

        let files = client_for(&server).files(&[1, 2]).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            files[0].download_url.as_deref(),
            Some("https://edge.forgecdn.net/files/0/1/open.jar")
        );
        assert_eq!(files[1].download_url, None);
    }

    #[tokio::test]
    async fn test_files_skips_summary_without_id() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/mods/files")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": [
                    {"displayName": "broken.jar", "downloadUrl": null},
                    {"id": 7, "displayName": "ok.jar", "downloadUrl": "https://edge.forgecdn.net/files/0/7/ok.jar"}
                ]}"#,
            )
            .create_async()
            .await;

        let files = client_for(&server).files(&[6, 7]).await.unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].id, 7);
    }

    #[tokio::test]
    async fn test_download_url_available() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/mods/238222/files/4712866/download-url")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": "https://edge.forgecdn.net/files/4712/866/jei.jar"}"#)
            .create_async()
            .await;

        let url = client_for(&server)
            .download_url(238222, 4712866)
            .await
            .unwrap();

        assert_eq!(
            url,
            DownloadUrl::Available("https://edge.forgecdn.net/files/4712/866/jei.jar".into())
        );
    }

    #[tokio::test]
    async fn test_download_url_forbidden_is_restricted_not_fatal() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/mods/1/files/2/download-url")
            .with_status(403)
            .create_async()
            .await;

        let url = client_for(&server).download_url(1, 2).await.unwrap();

        assert_eq!(url, DownloadUrl::Restricted);
    }

    #[tokio::test]
    async fn test_download_url_server_error_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/mods/1/files/2/download-url")
            .with_status(500)
            .create_async()
            .await;

        assert!(client_for(&server).download_url(1, 2).await.is_err());
    }

    #[test]
    fn test_api_url_trailing_slash_is_trimmed() {
        let client = CurseForgeClient::new(
            HttpClient::new(Client::new()),
            "https://api.curseforge.com/v1/",
        );
        assert_eq!(client.api_url(), DEFAULT_CURSEFORGE_API_URL);
    }
}
