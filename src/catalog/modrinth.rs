//! Modrinth API client.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::http::HttpClient;
use crate::pack::HashFormat;

use super::{ModrinthApi, decode_item};

pub const DEFAULT_MODRINTH_API_URL: &str = "https://api.modrinth.com/v2";

/// A project version as returned by the hash lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Version {
    pub id: String,
    pub project_id: String,
    #[serde(default)]
    pub files: Vec<VersionFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionFile {
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub hashes: HashMap<String, String>,
    #[serde(default)]
    pub primary: bool,
}

impl Version {
    /// The file of this version whose `algorithm` hash equals `hash`.
    pub fn file_with_hash(&self, algorithm: HashFormat, hash: &str) -> Option<&VersionFile> {
        self.files.iter().find(|file| {
            file.hashes
                .get(algorithm.as_str())
                .is_some_and(|h| h.eq_ignore_ascii_case(hash))
        })
    }
}

/// Per-side support reported for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideSupport {
    Required,
    Optional,
    Unsupported,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub client_side: SideSupport,
    pub server_side: SideSupport,
}

mod api {
    use serde::Serialize;

    #[derive(Serialize, Debug)]
    pub struct VersionFilesRequest<'a> {
        pub hashes: &'a [String],
        pub algorithm: &'a str,
    }
}

/// Modrinth client. An optional token is a default header of the wrapped
/// reqwest client.
pub struct ModrinthClient {
    http_client: HttpClient,
    api_url: String,
}

impl ModrinthClient {
    pub fn new(http_client: HttpClient, api_url: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ModrinthApi for ModrinthClient {
    async fn versions_from_hashes(
        &self,
        hashes: &[String],
        algorithm: HashFormat,
    ) -> Result<HashMap<String, Version>> {
        let url = format!("{}/version_files", self.api_url);
        debug!("Requesting {} {} hashes from {}", hashes.len(), algorithm, url);
        let response: HashMap<String, Value> = self
            .http_client
            .post_json(
                &url,
                &api::VersionFilesRequest {
                    hashes,
                    algorithm: algorithm.as_str(),
                },
            )
            .await?;
        Ok(response
            .into_iter()
            .filter_map(|(hash, version)| Some((hash, decode_item("version", version)?)))
            .collect())
    }

    async fn projects(&self, ids: &[String]) -> Result<Vec<Project>> {
        let url = format!("{}/projects", self.api_url);
        let ids = serde_json::to_string(ids)?;
        debug!("Requesting projects {} from {}", ids, url);
        let response: Vec<Value> = self
            .http_client
            .get_json_with_query(&url, &[("ids", ids.as_str())])
            .await?;
        Ok(response
            .into_iter()
            .filter_map(|project| decode_item("project", project))
            .collect())
    }
}
