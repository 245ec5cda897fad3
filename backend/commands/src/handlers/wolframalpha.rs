//! `wa`: Wolfram|Alpha short answers.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use lambdabot_core::Handler;
use reqwest::{Client, StatusCode};

use super::get;
use crate::config::{HandlerConfig, require};
use crate::registry::RegistryBuilder;

const DEFAULT_BASE_URL: &str = "https://api.wolframalpha.com";

pub struct WolframAlphaHandler {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl WolframAlphaHandler {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl Handler for WolframAlphaHandler {
    async fn handle(&self, args: &str) -> Result<String> {
        let api_key = require(&self.api_key, "WOLFRAM_ALPHA_API_KEY")?;
        let url = format!(
            "{}/v1/result?appid={}&i={}",
            self.base_url,
            api_key,
            urlencoding::encode(args)
        );

        let resp = get(&self.client, &url, "Wolfram|Alpha").await?;
        let status = resp.status();
        // 501 carries a plain-text "did not understand your input" answer.
        // Any other non-2xx status is a failure, not an answer to echo back.
        if !status.is_success() && status != StatusCode::NOT_IMPLEMENTED {
            bail!("Wolfram|Alpha API returned {status}");
        }
        let body = resp
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("unable to read Wolfram|Alpha response")?;

        Ok(format!("{} = {}", args, body.trim_end()))
    }
}

pub fn register(builder: &mut RegistryBuilder, config: &HandlerConfig, client: &Client) {
    builder.register(
        "wa",
        Arc::new(WolframAlphaHandler::new(
            client.clone(),
            config.wolfram_alpha_api_key.clone(),
        )),
    );
}
