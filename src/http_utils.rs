//! HTTP client with a path-keyed read cache.
//!
//! Reads go through [`QuestboardClient::fetch`], which memoizes the parsed
//! response body under the request's path segments. Writes invalidate by
//! prefix: a mutation against `/encounters/...` drops every cached read
//! whose key starts with `encounters`, so the next read of any encounter
//! listing refetches. Narrower invalidation would have to know which
//! listings a given row appears in; dropping the family is always correct.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Mutex;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cli_utils;

/// An error returned by the HTTP API, carrying the response body text.
#[derive(Debug)]
pub struct HttpError {
    message: String,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for HttpError {}

/// HTTP client for the questboard API with a path-keyed read cache.
pub struct QuestboardClient {
    client: Client,
    base_url: String,
    cache: Mutex<HashMap<Vec<String>, Value>>,
}

impl QuestboardClient {
    /// Creates a client for the service at `base_url` with an empty cache.
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Constructs a full API URL from a path
    pub fn api_url(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/api/{}", self.base_url, path)
    }

    fn cache_key(path: &str) -> Vec<String> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Drops every cached read whose key starts with `prefix`.
    pub fn invalidate(&self, prefix: &[String]) {
        let mut cache = self.cache.lock().unwrap();
        cache.retain(|key, _| !key.starts_with(prefix));
    }

    fn invalidate_family(&self, path: &str) {
        let key = Self::cache_key(path);
        if let Some(family) = key.first() {
            self.invalidate(std::slice::from_ref(family));
        }
    }

    /// Makes a GET request, serving from the cache when the same path was
    /// fetched before and has not been invalidated since.
    pub async fn fetch<T>(&self, path: &str) -> Result<T, Box<dyn Error>>
    where
        T: DeserializeOwned,
    {
        let key = Self::cache_key(path);
        {
            let cache = self.cache.lock().unwrap();
            if let Some(value) = cache.get(&key) {
                return Ok(serde_json::from_value(value.clone())?);
            }
        }

        let value: Value = self.get(path).await?;
        let parsed = serde_json::from_value(value.clone())?;
        let mut cache = self.cache.lock().unwrap();
        cache.insert(key, value);
        Ok(parsed)
    }

    /// Makes an uncached GET request and handles the response
    pub async fn get<T>(&self, path: &str) -> Result<T, Box<dyn Error>>
    where
        T: DeserializeOwned,
    {
        let url = self.api_url(path);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Makes a POST request with JSON body, invalidating the path's cache
    /// family on success
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, Box<dyn Error>>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let url = self.api_url(path);
        let response = self.client.post(&url).json(body).send().await?;
        let parsed = self.handle_response(response).await?;
        self.invalidate_family(path);
        Ok(parsed)
    }

    /// Makes a PATCH request with JSON body, invalidating the path's cache
    /// family on success
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, Box<dyn Error>>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let url = self.api_url(path);
        let response = self.client.patch(&url).json(body).send().await?;
        let parsed = self.handle_response(response).await?;
        self.invalidate_family(path);
        Ok(parsed)
    }

    /// Handles HTTP response, deserializing success or returning error
    async fn handle_response<T>(&self, response: Response) -> Result<T, Box<dyn Error>>
    where
        T: DeserializeOwned,
    {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let error = response.text().await.unwrap_or_default();
            let msg = if error.is_empty() {
                "No error details".to_string()
            } else {
                error
            };
            Err(Box::new(HttpError { message: msg }))
        }
    }
}

/// Execute an HTTP operation and exit on error with formatted message
pub async fn execute_or_exit<T, F, Fut>(operation: F, context: &str) -> T
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, Box<dyn Error>>>,
{
    match operation().await {
        Ok(result) => result,
        Err(e) => cli_utils::exit_with_error(&format!("{}: {}", context, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_prefixes_api() {
        let client = QuestboardClient::new("http://localhost:8080".to_string());
        assert_eq!(
            client.api_url("/parties"),
            "http://localhost:8080/api/parties"
        );
        assert_eq!(
            client.api_url("issues/issue:a"),
            "http://localhost:8080/api/issues/issue:a"
        );
    }

    #[test]
    fn cache_key_splits_segments() {
        assert_eq!(
            QuestboardClient::cache_key("/encounters/party/party:a"),
            vec!["encounters", "party", "party:a"]
        );
        assert_eq!(QuestboardClient::cache_key("/parties"), vec!["parties"]);
    }

    #[test]
    fn invalidate_is_prefix_scoped() {
        let client = QuestboardClient::new("http://localhost:8080".to_string());
        {
            let mut cache = client.cache.lock().unwrap();
            cache.insert(
                QuestboardClient::cache_key("/encounters"),
                serde_json::json!([]),
            );
            cache.insert(
                QuestboardClient::cache_key("/encounters/party/party:a"),
                serde_json::json!([]),
            );
            cache.insert(
                QuestboardClient::cache_key("/parties"),
                serde_json::json!([]),
            );
        }

        client.invalidate(&["encounters".to_string()]);

        let cache = client.cache.lock().unwrap();
        assert!(!cache.contains_key(&QuestboardClient::cache_key("/encounters")));
        assert!(!cache.contains_key(&QuestboardClient::cache_key("/encounters/party/party:a")));
        assert!(cache.contains_key(&QuestboardClient::cache_key("/parties")));
    }

    #[test]
    fn invalidate_family_uses_first_segment() {
        let client = QuestboardClient::new("http://localhost:8080".to_string());
        {
            let mut cache = client.cache.lock().unwrap();
            cache.insert(
                QuestboardClient::cache_key("/issues"),
                serde_json::json!([]),
            );
        }

        client.invalidate_family("/issues/issue:a");

        let cache = client.cache.lock().unwrap();
        assert!(cache.is_empty());
    }
}
