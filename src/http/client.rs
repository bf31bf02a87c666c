//! HTTP client with uniform status handling.
//!
//! Requests are never retried: a non-success status becomes a typed
//! [`Error::Http`] that callers either propagate (fatal for the phase) or
//! inspect with [`status_of`] when a status has a per-item meaning.

use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Error;

/// Thin wrapper over a configured reqwest Client.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Performs a GET request and deserializes the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET JSON from {}...", url);
        self.send_json("GET", url, self.client.get(url)).await
    }

    /// Performs a GET request with query parameters and deserializes the JSON response.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("GET JSON from {} with query {:?}...", url, query);
        self.send_json("GET", url, self.client.get(url).query(query))
            .await
    }

    /// Performs a POST request with a JSON body and deserializes the JSON response.
    #[tracing::instrument(skip(self, body))]
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST JSON to {}...", url);
        self.send_json("POST", url, self.client.post(url).json(body))
            .await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: &'static str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send {} {}", method, url))?;

        let response = check_status(method, url, response)?;

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }
}

fn check_status(method: &'static str, url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    debug!("{} {} returned {}", method, url, status);
    Err(Error::Http {
        method,
        url: url.to_string(),
        status,
    }
    .into())
}

/// Extracts the HTTP status from an error produced by [`HttpClient`], if any.
pub fn status_of(error: &anyhow::Error) -> Option<StatusCode> {
    match error.downcast_ref::<Error>() {
        Some(Error::Http { status, .. }) => Some(*status),
        _ => None,
    }
}
