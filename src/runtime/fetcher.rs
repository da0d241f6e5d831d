use crate::error::{ImporterError, Result};
use async_trait::async_trait;
use reqwest::Client;

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json, text/html;q=0.9, */*;q=0.8")
            .send()
            .await
            .map_err(|e| ImporterError::Network {
                url: url.to_string(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(ImporterError::Http {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|e| ImporterError::Network {
            url: url.to_string(),
            source: e,
        })
    }
}
