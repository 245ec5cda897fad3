//! `sahko` / `sahko2`: Finnish spot electricity prices.
//!
//! `sahko2` asks the ENTSO-E transparency platform for today's day-ahead
//! prices directly. `sahko` reads the same prices from a RedisTimeSeries key
//! that a separate job keeps filled. Both reply with
//! `Current: X c/kWh | Lowest: Y c/kWh | Highest: Z c/kWh`, VAT included.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Europe::Helsinki;
use lambdabot_core::Handler;
use lambdabot_logging::redact_secrets;
use redis::aio::MultiplexedConnection;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use super::get;
use crate::config::{HandlerConfig, require};
use crate::registry::RegistryBuilder;

/// Finnish VAT multiplier applied to every quoted price.
pub const VAT: f64 = 1.24;

const ENTSOE_BASE_URL: &str = "https://web-api.tp.entsoe.eu";
/// EIC code of the Finnish bidding zone.
const FINLAND_AREA: &str = "10YFI-1--------U";
/// Day-ahead prices document.
const DOCUMENT_TYPE: &str = "A44";
const ENTSOE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

pub const PRICE_SERIES_KEY: &str = "entsoe:fi";
/// Bucket wide enough that one day falls into at most two buckets.
const AGGREGATION_BUCKET_MS: i64 = 3_600_000_000;
const HOUR_MS: i64 = 3_600_000;

// ---------------------------------------------------------------------------
// Shared price handling
// ---------------------------------------------------------------------------

/// A price valid over `[start, end)`, in c/kWh with VAT.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSummary {
    pub current: Option<f64>,
    pub lowest: f64,
    pub highest: f64,
}

impl PriceSummary {
    pub fn from_points(points: &[PricePoint], now: DateTime<Utc>) -> Result<Self> {
        let Some(first) = points.first() else {
            bail!("no price points available");
        };
        let (lowest, highest) = points
            .iter()
            .fold((first.price, first.price), |(lo, hi), p| {
                (lo.min(p.price), hi.max(p.price))
            });
        let current = points
            .iter()
            .find(|p| p.start <= now && now < p.end)
            .map(|p| p.price);
        Ok(Self {
            current,
            lowest,
            highest,
        })
    }

    /// Summarize raw `TS.RANGE` samples (VAT free).
    ///
    /// `highs` and `lows` hold one value per aggregation bucket; a day may
    /// span two buckets, so they are folded again here.
    pub fn from_series(current: &[f64], highs: &[f64], lows: &[f64]) -> Result<Self> {
        let highest = highs.iter().copied().reduce(f64::max);
        let lowest = lows.iter().copied().reduce(f64::min);
        let (Some(lowest), Some(highest)) = (lowest, highest) else {
            bail!("no prices stored for today under {PRICE_SERIES_KEY}");
        };
        Ok(Self {
            current: current.first().map(|price| price * VAT),
            lowest: lowest * VAT,
            highest: highest * VAT,
        })
    }

    pub fn render(&self) -> String {
        let current = match self.current {
            Some(price) => format!("{price:.2} c/kWh"),
            None => "n/a".to_string(),
        };
        format!(
            "Current: {current} | Lowest: {:.2} c/kWh | Highest: {:.2} c/kWh",
            self.lowest, self.highest
        )
    }
}

/// Start of today and start of tomorrow in Finnish local time.
pub fn helsinki_day_bounds(now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let today = now.with_timezone(&Helsinki).date_naive();
    let tomorrow = today.succ_opt().context("date out of range")?;
    let midnight = |day: chrono::NaiveDate| {
        Helsinki
            .from_local_datetime(&day.and_time(chrono::NaiveTime::MIN))
            .earliest()
            .map(|t| t.with_timezone(&Utc))
            .with_context(|| format!("no local midnight on {day}"))
    };
    Ok((midnight(today)?, midnight(tomorrow)?))
}

// ---------------------------------------------------------------------------
// ENTSO-E document
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MarketDocument {
    #[serde(rename = "TimeSeries", default)]
    pub time_series: Vec<TimeSeries>,
}

#[derive(Debug, Deserialize)]
pub struct TimeSeries {
    #[serde(rename = "Period", default)]
    pub periods: Vec<Period>,
}

#[derive(Debug, Deserialize)]
pub struct Period {
    #[serde(rename = "timeInterval")]
    pub time_interval: TimeInterval,
    pub resolution: String,
    #[serde(rename = "Point", default)]
    pub points: Vec<Point>,
}

#[derive(Debug, Deserialize)]
pub struct TimeInterval {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct Point {
    pub position: u32,
    /// EUR/MWh, VAT free.
    #[serde(rename = "price.amount")]
    pub price_amount: f64,
}

/// Parse an ISO-8601 duration of the form `PT<n>M` or `PT<n>H`.
pub fn parse_resolution(resolution: &str) -> Result<TimeDelta> {
    let body = resolution
        .strip_prefix("PT")
        .with_context(|| format!("unsupported resolution {resolution:?}"))?;
    let (amount, unit) = body.split_at(body.len().saturating_sub(1));
    let amount: i64 = amount
        .parse()
        .with_context(|| format!("unsupported resolution {resolution:?}"))?;
    if amount <= 0 {
        bail!("unsupported resolution {resolution:?}");
    }
    match unit {
        "M" => Ok(TimeDelta::minutes(amount)),
        "H" => Ok(TimeDelta::hours(amount)),
        _ => bail!("unsupported resolution {resolution:?}"),
    }
}

fn parse_entsoe_time(value: &str) -> Result<DateTime<Utc>> {
    Ok(NaiveDateTime::parse_from_str(value.trim(), ENTSOE_TIME_FORMAT)
        .with_context(|| format!("invalid timestamp {value:?}"))?
        .and_utc())
}

/// Expand every period into one price point per resolution step.
///
/// Positions missing from a period repeat the previous position's price
/// (curve type A03 leaves out unchanged steps).
pub fn price_points(doc: &MarketDocument) -> Result<Vec<PricePoint>> {
    let mut out = Vec::new();
    for period in doc.time_series.iter().flat_map(|ts| &ts.periods) {
        let start = parse_entsoe_time(&period.time_interval.start)?;
        let end = parse_entsoe_time(&period.time_interval.end)?;
        let step = parse_resolution(&period.resolution)?;

        let mut points: Vec<&Point> = period.points.iter().collect();
        points.sort_by_key(|p| p.position);

        let mut next = points.iter().peekable();
        let mut price = None;
        let mut slot_start = start;
        let mut position = 1;
        while slot_start < end {
            while let Some(p) = next.next_if(|p| p.position <= position) {
                price = Some(p.price_amount / 10.0 * VAT);
            }
            if let Some(price) = price {
                out.push(PricePoint {
                    start: slot_start,
                    end: slot_start + step,
                    price,
                });
            }
            slot_start += step;
            position += 1;
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// sahko2: ENTSO-E API
// ---------------------------------------------------------------------------

pub struct EntsoeHandler {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl EntsoeHandler {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: ENTSOE_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl Handler for EntsoeHandler {
    async fn handle(&self, _args: &str) -> Result<String> {
        let api_key = require(&self.api_key, "ENTSOE_API_KEY")?;
        let now = Utc::now();
        let (start, end) = helsinki_day_bounds(now)?;

        let url = format!(
            "{}/api?securityToken={}&documentType={}&in_Domain={}&out_Domain={}&periodStart={}&periodEnd={}",
            self.base_url,
            api_key,
            DOCUMENT_TYPE,
            FINLAND_AREA,
            FINLAND_AREA,
            start.format("%Y%m%d%H%M"),
            end.format("%Y%m%d%H%M"),
        );
        let resp = get(&self.client, &url, "ENTSO-E").await?;
        if !resp.status().is_success() {
            bail!("ENTSO-E API returned {}", resp.status());
        }
        let body = resp
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("unable to read ENTSO-E response")?;
        let doc: MarketDocument =
            quick_xml::de::from_str(&body).context("unable to parse ENTSO-E document")?;

        let points = price_points(&doc)?;
        Ok(PriceSummary::from_points(&points, now)?.render())
    }
}

// ---------------------------------------------------------------------------
// sahko: Redis time series
// ---------------------------------------------------------------------------

pub struct RedisPriceHandler {
    addr: Option<String>,
    password: Option<String>,
    timeout: Duration,
}

impl RedisPriceHandler {
    pub fn new(addr: Option<String>, password: Option<String>, timeout: Duration) -> Self {
        Self {
            addr,
            password,
            timeout,
        }
    }

    async fn query(&self, url: &str) -> Result<PriceSummary> {
        let client = redis::Client::open(url).context("invalid Redis address")?;
        let mut con = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                warn!(url = %redact_secrets(url), error = %e, "Redis connection failed");
                e
            })
            .context("unable to connect to Redis")?;

        let now = Utc::now();
        let now_ms = now.timestamp_millis();
        let hour_ms = now_ms - now_ms.rem_euclid(HOUR_MS);
        let (start, end) = helsinki_day_bounds(now)?;
        let (start_ms, end_ms) = (start.timestamp_millis(), end.timestamp_millis() - 1);

        let current = ts_range(&mut con, hour_ms, hour_ms, None).await?;
        let highs = ts_range(&mut con, start_ms, end_ms, Some("max")).await?;
        let lows = ts_range(&mut con, start_ms, end_ms, Some("min")).await?;

        PriceSummary::from_series(&current, &highs, &lows)
    }
}

/// Build a `redis://` URL for database 0 from a `host:port` address.
pub fn connection_url(addr: &str, password: Option<&str>) -> String {
    if addr.starts_with("redis://") || addr.starts_with("rediss://") {
        return addr.to_string();
    }
    match password {
        Some(password) => format!(
            "redis://default:{}@{}/0",
            urlencoding::encode(password),
            addr
        ),
        None => format!("redis://{addr}/0"),
    }
}

async fn ts_range(
    con: &mut MultiplexedConnection,
    from_ms: i64,
    to_ms: i64,
    aggregation: Option<&str>,
) -> Result<Vec<f64>> {
    let mut cmd = redis::cmd("TS.RANGE");
    cmd.arg(PRICE_SERIES_KEY).arg(from_ms).arg(to_ms);
    if let Some(aggregation) = aggregation {
        cmd.arg("AGGREGATION").arg(aggregation).arg(AGGREGATION_BUCKET_MS);
    }
    let samples: Vec<(i64, f64)> = cmd
        .query_async(con)
        .await
        .with_context(|| format!("TS.RANGE {PRICE_SERIES_KEY} failed"))?;
    Ok(samples.into_iter().map(|(_, value)| value).collect())
}

#[async_trait]
impl Handler for RedisPriceHandler {
    async fn handle(&self, _args: &str) -> Result<String> {
        let addr = require(&self.addr, "REDIS_ADDR")?;
        let url = connection_url(addr, self.password.as_deref());
        match tokio::time::timeout(self.timeout, self.query(&url)).await {
            Ok(summary) => Ok(summary?.render()),
            Err(_) => {
                warn!(
                    url = %redact_secrets(&url),
                    timeout = ?self.timeout,
                    "Redis request timed out"
                );
                bail!("Redis request timed out after {:?}", self.timeout)
            }
        }
    }
}

pub fn register(builder: &mut RegistryBuilder, config: &HandlerConfig, client: &Client) {
    builder.register(
        "sahko",
        Arc::new(RedisPriceHandler::new(
            config.redis_addr.clone(),
            config.redis_password.clone(),
            config.http_timeout,
        )),
    );
    builder.register(
        "sahko2",
        Arc::new(EntsoeHandler::new(client.clone(), config.entsoe_api_key.clone())),
    );
}
