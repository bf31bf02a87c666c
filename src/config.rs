use anyhow::{Context, Result};
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    catalog::{
        CurseForgeClient, DEFAULT_CURSEFORGE_API_URL, DEFAULT_MODRINTH_API_URL, ModrinthClient,
    },
    coordinator::Materialize,
    digest::DEFAULT_MIN_SIZE,
    error::Error,
    http::HttpClient,
    runtime::Runtime,
};

pub const CURSEFORGE_KEY_ENV: &str = "CF_API_KEY";
pub const MODRINTH_KEY_ENV: &str = "MODRINTH_API_KEY";

const USER_AGENT: &str = concat!("packwiz-util/", env!("PACKWIZ_UTIL_VERSION"));

/// Options of one run, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub pack_file: PathBuf,
    pub cf_detect: bool,
    pub cf_url: bool,
    pub mr_detect: bool,
    pub mr_merge: bool,
    pub cf_api_key: Option<String>,
    pub mr_api_key: Option<String>,
    pub cf_api_url: Option<String>,
    pub mr_api_url: Option<String>,
    pub min_size: u64,
    pub jobs: Option<usize>,
    pub packwiz: String,
    pub write_metadata: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            pack_file: PathBuf::from("pack.toml"),
            cf_detect: false,
            cf_url: false,
            mr_detect: false,
            mr_merge: false,
            cf_api_key: None,
            mr_api_key: None,
            cf_api_url: None,
            mr_api_url: None,
            min_size: DEFAULT_MIN_SIZE,
            jobs: None,
            packwiz: "packwiz".to_string(),
            write_metadata: false,
        }
    }
}

impl Options {
    pub fn any_mode(&self) -> bool {
        self.uses_curseforge() || self.uses_modrinth()
    }

    pub fn uses_curseforge(&self) -> bool {
        self.cf_detect || self.cf_url
    }

    pub fn uses_modrinth(&self) -> bool {
        self.mr_detect || self.mr_merge
    }
}

pub struct Config<R: Runtime> {
    pub runtime: Arc<R>,
    pub options: Options,
    /// Present when a CurseForge mode is selected.
    pub curseforge: Option<CurseForgeClient>,
    /// Present when a Modrinth mode is selected.
    pub modrinth: Option<ModrinthClient>,
}

impl<R: Runtime> Config<R> {
    /// Resolve credentials and build the catalog clients. Fails on a
    /// missing credential before anything touches the pack or the network.
    pub fn new(runtime: R, options: Options) -> Result<Self> {
        let curseforge = if options.uses_curseforge() {
            let key = options
                .cf_api_key
                .clone()
                .or_else(|| runtime.env_var(CURSEFORGE_KEY_ENV).ok())
                .filter(|key| !key.is_empty())
                .ok_or(Error::MissingCredential {
                    flag: "--cf-api-key",
                    env: CURSEFORGE_KEY_ENV,
                    mode: if options.cf_detect {
                        "--cf-detect"
                    } else {
                        "--cf-url"
                    },
                })?;

            let mut headers = HeaderMap::new();
            headers.insert(HeaderName::from_static("x-api-key"), sensitive(&key)?);
            debug!("Using CurseForge API key {}", mask(&key));

            Some(CurseForgeClient::new(
                build_client(headers)?,
                options
                    .cf_api_url
                    .as_deref()
                    .unwrap_or(DEFAULT_CURSEFORGE_API_URL),
            ))
        } else {
            None
        };

        let modrinth = if options.uses_modrinth() {
            let mut headers = HeaderMap::new();
            if let Some(token) = options
                .mr_api_key
                .clone()
                .or_else(|| runtime.env_var(MODRINTH_KEY_ENV).ok())
                .filter(|token| !token.is_empty())
            {
                headers.insert(AUTHORIZATION, sensitive(&token)?);
                debug!("Using Modrinth token {}", mask(&token));
            }

            Some(ModrinthClient::new(
                build_client(headers)?,
                options
                    .mr_api_url
                    .as_deref()
                    .unwrap_or(DEFAULT_MODRINTH_API_URL),
            ))
        } else {
            None
        };

        Ok(Self {
            runtime: Arc::new(runtime),
            options,
            curseforge,
            modrinth,
        })
    }

    pub fn materialize(&self) -> Materialize {
        if self.options.write_metadata {
            Materialize::Direct
        } else {
            Materialize::Tool
        }
    }
}

fn build_client(headers: HeaderMap) -> Result<HttpClient> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()
        .context("Failed to build HTTP client")?;
    Ok(HttpClient::new(client))
}

fn sensitive(value: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(value).context("Credential is not a valid header value")?;
    value.set_sensitive(true);
    Ok(value)
}

/// First and last few characters only.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "*********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}
