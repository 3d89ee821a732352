use anyhow::{bail, Context};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{Book, NewBook};

pub struct BookCatalogClient {
    url: String,
    client: ClientWithMiddleware,
}

impl BookCatalogClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Calls POST /books endpoint
    /// Returns the saved book with its assigned id
    pub async fn add_book(&self, book: NewBook) -> anyhow::Result<Book> {
        let response = self
            .client
            .post(format!("{}/books", self.url))
            .json(&book)
            .send()
            .await?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            bail!("Failed to add book {}", error)
        }

        response.json().await.context("Failed to parse saved book")
    }

    /// Calls GET /books endpoint
    pub async fn list_books(&self) -> anyhow::Result<Vec<Book>> {
        let response = self
            .client
            .get(format!("{}/books", self.url))
            .send()
            .await?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            bail!("Failed to list books {}", error)
        }

        response.json().await.context("Failed to parse books")
    }

    /// Calls GET /data endpoint
    pub async fn list_raw_documents(&self) -> anyhow::Result<Vec<serde_json::Value>> {
        let response = self
            .client
            .get(format!("{}/data", self.url))
            .send()
            .await?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            bail!("Failed to list raw documents {}", error)
        }

        response.json().await.context("Failed to parse documents")
    }
}
