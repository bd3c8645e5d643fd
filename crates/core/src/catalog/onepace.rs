//! One Pace GraphQL client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::CatalogConfig;

use super::{CatalogError, Episode, EpisodeSource};

const EPISODES_QUERY: &str = r#"
query {
    episodes {
        id
        title
        arc {
            title
        }
        part
        manga
        released
        torrent
    }
}
"#;

/// Client for the One Pace GraphQL API.
pub struct OnePaceClient {
    client: Client,
    graphql_url: String,
}

impl OnePaceClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            graphql_url: config.graphql_url.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<EpisodesData>,
}

#[derive(Debug, Deserialize)]
struct EpisodesData {
    episodes: Option<Vec<GqlEpisode>>,
}

#[derive(Debug, Deserialize)]
struct GqlEpisode {
    id: IdValue,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    arc: Option<GqlArc>,
    #[serde(default)]
    part: Option<u32>,
    #[serde(default)]
    manga: Option<String>,
    #[serde(default)]
    released: Option<String>,
    #[serde(default)]
    torrent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GqlArc {
    title: String,
}

/// The API has used both numeric and string ids.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdValue {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for IdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdValue::Number(n) => write!(f, "{}", n),
            IdValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<GqlEpisode> for Episode {
    fn from(e: GqlEpisode) -> Self {
        let arc_title = e
            .arc
            .map(|a| a.title)
            .or_else(|| e.title.clone())
            .unwrap_or_default();
        Episode {
            id: e.id.to_string(),
            title: e.title.unwrap_or_else(|| arc_title.clone()),
            arc_title,
            part: e.part.unwrap_or(1),
            manga_chapters: e.manga,
            released: e.released.as_deref().and_then(parse_release_date),
            magnet: e.torrent.filter(|t| !t.is_empty()),
        }
    }
}

fn parse_release_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
        })
}

#[async_trait]
impl EpisodeSource for OnePaceClient {
    fn name(&self) -> &str {
        "onepace"
    }

    async fn list_episodes(&self) -> Result<Vec<Episode>, CatalogError> {
        debug!("Fetching One Pace episodes from {}", self.graphql_url);

        let response = self
            .client
            .post(&self.graphql_url)
            .json(&serde_json::json!({ "query": EPISODES_QUERY }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: GraphQlResponse = response.json().await.map_err(|e| {
            CatalogError::ParseError(format!("Failed to parse episodes response: {}", e))
        })?;

        let episodes = body
            .data
            .and_then(|d| d.episodes)
            .ok_or_else(|| CatalogError::ParseError("Response has no episodes".to_string()))?;

        debug!("Fetched {} episodes from GraphQL API", episodes.len());
        Ok(episodes.into_iter().map(Episode::from).collect())
    }
}
