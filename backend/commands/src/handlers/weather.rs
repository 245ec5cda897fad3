//! `weather` / `forecast`: current conditions from OpenWeatherMap.
//!
//! The location is geocoded first, then the One Call API is asked for the
//! current conditions and any active alerts at those coordinates.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use lambdabot_core::Handler;
use reqwest::Client;
use serde::Deserialize;

use super::get;
use crate::config::{HandlerConfig, require};
use crate::registry::RegistryBuilder;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const DEFAULT_LOCATION: &str = "Helsinki";

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GeoLocation {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OneCallResponse {
    pub current: CurrentWeather,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentWeather {
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: i64,
    pub humidity: i64,
    #[serde(default)]
    pub uvi: f64,
    #[serde(default)]
    pub clouds: i64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherCondition {
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Alert {
    pub event: String,
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

pub struct WeatherHandler {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherHandler {
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

    async fn coordinates(&self, api_key: &str, location: &str) -> Result<GeoLocation> {
        let url = format!(
            "{}/geo/1.0/direct?q={}&limit=1&appid={}",
            self.base_url,
            urlencoding::encode(location),
            api_key
        );
        let resp = get(&self.client, &url, "OpenWeatherMap geocoding").await?;
        if !resp.status().is_success() {
            bail!("geocoding API returned {}", resp.status());
        }
        let found: Vec<GeoLocation> = resp
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("failed to parse geocoding response")?;
        found
            .into_iter()
            .next()
            .with_context(|| format!("location not found: {location}"))
    }

    async fn current(&self, api_key: &str, place: &GeoLocation) -> Result<OneCallResponse> {
        let url = format!(
            "{}/data/3.0/onecall?lat={}&lon={}&units=metric&exclude=minutely,hourly,daily&appid={}",
            self.base_url, place.lat, place.lon, api_key
        );
        let resp = get(&self.client, &url, "OpenWeatherMap").await?;
        if !resp.status().is_success() {
            bail!("weather API returned {}", resp.status());
        }
        resp.json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("failed to parse weather response")
    }
}

#[async_trait]
impl Handler for WeatherHandler {
    async fn handle(&self, args: &str) -> Result<String> {
        let api_key = require(&self.api_key, "OPENWEATHERMAP_API_KEY")?;
        let location = match args.trim() {
            "" => DEFAULT_LOCATION,
            location => location,
        };

        let place = self.coordinates(api_key, location).await?;
        let weather = self.current(api_key, &place).await?;
        Ok(format_weather_response(&place.name, &place.country, &weather))
    }
}

/// One-line summary of the current conditions at `name, country`.
pub fn format_weather_response(name: &str, country: &str, data: &OneCallResponse) -> String {
    let current = &data.current;
    let mut out = format!("{name}, {country}: ");

    if let Some(condition) = current.weather.first() {
        out.push_str(&condition.description);
        out.push_str(", ");
    }

    out.push_str(&format!(
        "Temperature: {:.1}°C, feels like: {:.1}°C, wind: {:.1} m/s, humidity: {}%, pressure: {}hPa, cloudiness: {}%",
        current.temp,
        current.feels_like,
        current.wind_speed,
        current.humidity,
        current.pressure,
        current.clouds
    ));

    if current.uvi > 0.0 {
        out.push_str(&format!(", UV index: {:.1}", current.uvi));
    }

    if let Some((first, rest)) = data.alerts.split_first() {
        out.push_str(&format!(" | ⚠️ {}", first.event));
        match rest.len() {
            0 => {}
            1 => out.push_str(" (+1 more alert)"),
            n => out.push_str(&format!(" (+{n} more alerts)")),
        }
    }

    out
}

pub fn register(builder: &mut RegistryBuilder, config: &HandlerConfig, client: &Client) {
    let handler = Arc::new(WeatherHandler::new(
        client.clone(),
        config.openweathermap_api_key.clone(),
    ));
    builder.register("weather", handler.clone());
    builder.register("forecast", handler);
}
