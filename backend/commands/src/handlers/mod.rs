/// Built-in command handlers.
///
/// Each module implements `Handler` for one upstream service and exposes a
/// `register` function that adds its command names to a `RegistryBuilder`.
pub mod echo;
pub mod electricity;
pub mod pirkka;
pub mod tvmaze;
pub mod weather;
pub mod wolframalpha;

use anyhow::{Context, Result};
use lambdabot_logging::redact_secrets;
use reqwest::{Client, Response};
use tracing::{debug, warn};

use crate::config::HandlerConfig;

pub use echo::EchoHandler;
pub use electricity::{EntsoeHandler, RedisPriceHandler};
pub use pirkka::PirkkaHandler;
pub use tvmaze::TvMazeHandler;
pub use weather::WeatherHandler;
pub use wolframalpha::WolframAlphaHandler;

const USER_AGENT: &str = concat!("lambdabot/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by every handler.
pub fn http_client(config: &HandlerConfig) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.http_timeout)
        .build()?)
}

/// GET `url`, turning transport failures into errors that do not echo the URL.
///
/// The status code is left for the caller to judge.
pub(crate) async fn get(client: &Client, url: &str, service: &str) -> Result<Response> {
    debug!(service, url = %redact_secrets(url), "Calling upstream");
    client
        .get(url)
        .send()
        .await
        .map_err(|e| {
            warn!(service, error = %redact_secrets(&e.to_string()), "Upstream request failed");
            e.without_url()
        })
        .with_context(|| format!("unable to get API response from {service}"))
}
