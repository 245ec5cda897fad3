//! `ep`: next or latest episode of a TV show from TVMaze.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use lambdabot_core::Handler;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::get;
use crate::registry::RegistryBuilder;

const DEFAULT_BASE_URL: &str = "https://api.tvmaze.com";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Show {
    pub name: String,
    #[serde(default)]
    pub status: String,
    pub network: Option<Channel>,
    #[serde(rename = "webChannel")]
    pub web_channel: Option<Channel>,
    #[serde(rename = "_embedded", default)]
    pub embedded: Embedded,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Channel {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Embedded {
    #[serde(default)]
    pub episodes: Vec<Episode>,
    pub nextepisode: Option<Episode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Episode {
    #[serde(default)]
    pub name: String,
    pub season: Option<u32>,
    pub number: Option<u32>,
    pub airdate: Option<String>,
}

impl Show {
    /// Streaming service if the show has one, otherwise the broadcast network.
    fn channel_name(&self) -> &str {
        self.web_channel
            .as_ref()
            .or(self.network.as_ref())
            .map(|c| c.name.as_str())
            .unwrap_or("unknown network")
    }
}

fn episode_code(ep: &Episode) -> String {
    format!("{}x{:02}", ep.season.unwrap_or(0), ep.number.unwrap_or(0))
}

/// "today", "5 days from now", "13 years ago", ...
pub fn relative_date(date: NaiveDate, today: NaiveDate) -> String {
    let days = (date - today).num_days();
    if days == 0 {
        return "today".to_string();
    }
    let span = days.unsigned_abs();
    let (amount, unit) = if span < 31 {
        (span, "day")
    } else if span < 365 {
        (span / 30, "month")
    } else {
        (span / 365, "year")
    };
    let plural = if amount == 1 { "" } else { "s" };
    let direction = if days > 0 { "from now" } else { "ago" };
    format!("{amount} {unit}{plural} {direction}")
}

fn airs(ep: &Episode, today: NaiveDate) -> String {
    let Some(airdate) = ep.airdate.as_deref().filter(|d| !d.is_empty()) else {
        return "[UNKNOWN]".to_string();
    };
    match NaiveDate::parse_from_str(airdate, "%Y-%m-%d") {
        Ok(date) => format!("{airdate} ({})", relative_date(date, today)),
        Err(_) => airdate.to_string(),
    }
}

/// Reply line for a show, preferring its announced next episode.
pub fn format_show(show: &Show, today: NaiveDate) -> Result<String> {
    if let Some(next) = &show.embedded.nextepisode {
        return Ok(format!(
            "Next episode of {} {} '{}' airs {} on {}",
            show.name,
            episode_code(next),
            next.name,
            airs(next, today),
            show.channel_name()
        ));
    }

    let Some(latest) = show.embedded.episodes.last() else {
        bail!("no episodes listed for {}", show.name);
    };
    let ended = if show.status == "Ended" { " [Ended]" } else { "" };
    Ok(format!(
        "Latest episode of {} {} '{}' airs {} on {}{}",
        show.name,
        episode_code(latest),
        latest.name,
        airs(latest, today),
        show.channel_name(),
        ended
    ))
}

pub struct TvMazeHandler {
    client: Client,
    base_url: String,
}

impl TvMazeHandler {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl Handler for TvMazeHandler {
    async fn handle(&self, args: &str) -> Result<String> {
        let query = args.trim();
        if query.is_empty() {
            bail!("usage: ep <show name>");
        }

        let url = format!(
            "{}/singlesearch/shows?q={}&embed[]=episodes&embed[]=nextepisode",
            self.base_url,
            urlencoding::encode(query)
        );
        let resp = get(&self.client, &url, "TVMaze").await?;
        match resp.status() {
            StatusCode::NOT_FOUND => bail!("show not found: {query}"),
            status if !status.is_success() => bail!("TVMaze API returned {status}"),
            _ => {}
        }
        let show: Show = resp
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("could not parse TVMaze response")?;

        format_show(&show, Utc::now().date_naive())
    }
}

pub fn register(builder: &mut RegistryBuilder, client: &Client) {
    builder.register("ep", Arc::new(TvMazeHandler::new(client.clone())));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::serve;
    use axum::{Json, Router, extract::Query, http::StatusCode as HttpStatus, routing::get as route_get};
    use serde_json::{Value, json};
    use std::collections::HashMap;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn episode(name: &str, season: u32, number: u32, airdate: &str) -> Episode {
        Episode {
            name: name.into(),
            season: Some(season),
            number: Some(number),
            airdate: Some(airdate.into()),
        }
    }

    #[test]
    fn test_relative_date() {
        let today = date("2020-11-01");
        assert_eq!(relative_date(date("2020-11-01"), today), "today");
        assert_eq!(relative_date(date("2020-11-02"), today), "1 day from now");
        assert_eq!(relative_date(date("2020-11-06"), today), "5 days from now");
        assert_eq!(relative_date(date("2020-12-25"), today), "1 month from now");
        assert_eq!(relative_date(date("2007-05-15"), today), "13 years ago");
    }

    #[test]
    fn test_next_episode() {
        let show = Show {
            name: "The Mandalorian".into(),
            status: "Running".into(),
            web_channel: Some(Channel {
                name: "Disney+".into(),
            }),
            embedded: Embedded {
                episodes: vec![episode("Chapter 9: The Marshal", 2, 1, "2020-10-30")],
                nextepisode: Some(episode("Chapter 10: The Passenger", 2, 2, "2020-11-06")),
            },
            ..Show::default()
        };
        assert_eq!(
            format_show(&show, date("2020-11-01")).unwrap(),
            "Next episode of The Mandalorian 2x02 'Chapter 10: The Passenger' airs 2020-11-06 (5 days from now) on Disney+"
        );
    }

    #[test]
    fn test_latest_episode_of_ended_show() {
        let show = Show {
            name: "Gilmore Girls".into(),
            status: "Ended".into(),
            network: Some(Channel {
                name: "The CW".into(),
            }),
            embedded: Embedded {
                episodes: vec![
                    episode("Unto the Breach", 7, 21, "2007-05-08"),
                    episode("Bon Voyage", 7, 22, "2007-05-15"),
                ],
                nextepisode: None,
            },
            ..Show::default()
        };
        assert_eq!(
            format_show(&show, date("2020-11-01")).unwrap(),
            "Latest episode of Gilmore Girls 7x22 'Bon Voyage' airs 2007-05-15 (13 years ago) on The CW [Ended]"
        );
    }

    #[test]
    fn test_latest_episode_without_airdate() {
        let mut latest = episode("The Grand Tour Presents: Madagascar Special", 4, 2, "");
        latest.airdate = None;
        let show = Show {
            name: "The Grand Tour".into(),
            status: "Running".into(),
            web_channel: Some(Channel {
                name: "Amazon Prime".into(),
            }),
            embedded: Embedded {
                episodes: vec![latest],
                nextepisode: None,
            },
            ..Show::default()
        };
        assert_eq!(
            format_show(&show, date("2020-11-01")).unwrap(),
            "Latest episode of The Grand Tour 4x02 'The Grand Tour Presents: Madagascar Special' airs [UNKNOWN] on Amazon Prime"
        );
    }

    #[test]
    fn test_no_episodes() {
        let show = Show {
            name: "Pilot Only".into(),
            ..Show::default()
        };
        assert!(format_show(&show, date("2020-11-01")).is_err());
    }

    #[tokio::test]
    async fn test_against_mock() {
        let router = Router::new().route(
            "/singlesearch/shows",
            route_get(|Query(q): Query<HashMap<String, String>>| async move {
                if q.get("q").map(String::as_str) != Some("doctor who") {
                    return Err(HttpStatus::NOT_FOUND);
                }
                Ok(Json::<Value>(json!({
                    "name": "Doctor Who",
                    "status": "Running",
                    "network": {"id": 12, "name": "BBC One", "country": {"code": "GB"}},
                    "webChannel": null,
                    "_embedded": {
                        "episodes": [
                            {"name": "The Timeless Children", "season": 12, "number": 10, "airdate": "2020-03-01"}
                        ],
                        "nextepisode": {
                            "name": "Revolution of the Daleks", "season": 12, "number": 0,
                            "airdate": "2020-12-25", "runtime": null, "summary": null
                        }
                    }
                })))
            }),
        );
        let handler = TvMazeHandler::new(Client::new()).with_base_url(serve(router).await);

        let out = handler.handle("doctor who").await.unwrap();
        assert!(
            out.starts_with("Next episode of Doctor Who 12x00 'Revolution of the Daleks' airs 2020-12-25 ("),
            "{out}"
        );
        assert!(out.ends_with(") on BBC One"), "{out}");

        let err = handler.handle("no such show").await.unwrap_err();
        assert_eq!(err.to_string(), "show not found: no such show");
    }
}
