//! `pirkka`: current price of a Pirkka beer from a scraping endpoint.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use lambdabot_core::Handler;
use reqwest::Client;
use serde::Deserialize;

use super::get;
use crate::registry::RegistryBuilder;

const DEFAULT_URL: &str = "https://juho.tech/api/pirkka_price";

#[derive(Debug, Deserialize)]
struct PriceResponse {
    price: f64,
}

pub struct PirkkaHandler {
    client: Client,
    url: String,
}

impl PirkkaHandler {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: DEFAULT_URL.to_string(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl Handler for PirkkaHandler {
    async fn handle(&self, _args: &str) -> Result<String> {
        let resp = get(&self.client, &self.url, "pirkka price API").await?;
        if !resp.status().is_success() {
            bail!("pirkka price API returned {}", resp.status());
        }
        let data: PriceResponse = resp
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("unable to parse pirkka price")?;
        Ok(format!("Pirkka olut: {:.2} €", data.price))
    }
}

pub fn register(builder: &mut RegistryBuilder, client: &Client) {
    builder.register("pirkka", Arc::new(PirkkaHandler::new(client.clone())));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::serve;
    use axum::{Json, Router, routing::get as route_get};
    use serde_json::json;

    #[tokio::test]
    async fn test_price() {
        let router = Router::new().route(
            "/api/pirkka_price",
            route_get(|| async { Json(json!({"price": 1.2})) }),
        );
        let base = serve(router).await;
        let handler = PirkkaHandler::new(Client::new()).with_url(format!("{base}/api/pirkka_price"));
        assert_eq!(handler.handle("").await.unwrap(), "Pirkka olut: 1.20 €");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let router = Router::new().route(
            "/api/pirkka_price",
            route_get(|| async { "<html>maintenance</html>" }),
        );
        let base = serve(router).await;
        let handler = PirkkaHandler::new(Client::new()).with_url(format!("{base}/api/pirkka_price"));
        let err = handler.handle("").await.unwrap_err();
        assert_eq!(err.to_string(), "unable to parse pirkka price");
    }

    #[tokio::test]
    async fn test_unreachable() {
        // Nothing listens on port 9 locally.
        let handler = PirkkaHandler::new(Client::new()).with_url("http://127.0.0.1:9/api/pirkka_price");
        let err = handler.handle("").await.unwrap_err();
        assert!(err.to_string().starts_with("unable to get API response"));
    }
}
