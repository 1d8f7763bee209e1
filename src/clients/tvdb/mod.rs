//! TVDB v4 REST adapter.
//!
//! Requests are authenticated with a bearer token obtained from `/login` and
//! cached for 24 hours. The cache lives behind a mutex owned by the client
//! instance; concurrent callers wait for a single login.

pub mod fields;

use crate::config::TvdbConfig;
use crate::domain::{ProviderName, ShowStatus, ShowType, normalize_status_or_default};
use crate::metadata::external_id::{format_external_id, parse_tvdb_id};
use crate::metadata::normalize::{AltTitles, PageBounds, UNTITLED, pick_titles};
use crate::metadata::{ListEpisodesOpts, MetadataError, MetadataProvider, SearchOpts};
use crate::models::episode::sort_episodes;
use crate::models::{Episode, Show};
use async_trait::async_trait;
use fields::{
    Item, decode_array_data, decode_object_data, extract_token, first_f64, first_int,
    first_string, object_array,
};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

pub const TVDB_API: &str = "https://api4.thetvdb.com/v4";

const BOUNDS: PageBounds = PageBounds::new(10, 100);
const TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const DEBUG_BODY_LIMIT: usize = 1200;

#[derive(Serialize)]
struct LoginRequest<'a> {
    apikey: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pin: Option<&'a str>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct TvdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    pin: String,
    debug: bool,
    token_ttl: Duration,
    token: Mutex<Option<CachedToken>>,
}

impl TvdbClient {
    #[must_use]
    pub fn from_config(config: &TvdbConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("Showkeeper/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(config.timeout_seconds))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
            pin: config.pin.trim().to_string(),
            debug: config.debug,
            token_ttl: TOKEN_TTL,
            token: Mutex::new(None),
        }
    }

    /// Overrides how long a login token is reused before logging in again.
    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    fn url(&self, path: &str) -> Result<Url, MetadataError> {
        Ok(Url::parse(&format!("{}{path}", self.base_url))?)
    }

    async fn ensure_token(&self) -> Result<String, MetadataError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.expires_at) {
            return Ok(token.value.clone());
        }

        if self.api_key.is_empty() {
            return Err(MetadataError::NotSupported(
                "tvdb provider is not configured: missing api key".to_string(),
            ));
        }

        let body = LoginRequest {
            apikey: &self.api_key,
            pin: (!self.pin.is_empty()).then_some(self.pin.as_str()),
        };

        let response = self
            .client
            .post(self.url("/login")?)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| MetadataError::tvdb(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::tvdb(format!(
                "login failed with status {}",
                status.as_u16()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| MetadataError::Internal(format!("failed to decode tvdb login: {e}")))?;

        let token = extract_token(&payload)
            .ok_or_else(|| MetadataError::tvdb("login response missing token"))?;

        debug!("TVDB token refreshed");
        *cached = Some(CachedToken {
            value: token.clone(),
            expires_at: Instant::now() + self.token_ttl,
        });
        Ok(token)
    }

    /// GETs a JSON document. A 401 drops the cached token and the request is
    /// sent once more with a fresh login.
    async fn get_json(&self, url: Url, label: &str) -> Result<Value, MetadataError> {
        if let Some(value) = self.try_get_json(url.clone(), label).await? {
            return Ok(value);
        }

        debug!(label, "TVDB token rejected; logging in again");
        self.try_get_json(url, label)
            .await?
            .ok_or_else(|| MetadataError::tvdb("request failed with status 401"))
    }

    /// `Ok(None)` means upstream rejected the token.
    async fn try_get_json(&self, mut url: Url, label: &str) -> Result<Option<Value>, MetadataError> {
        let token = self.ensure_token().await?;

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| MetadataError::tvdb(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(MetadataError::NotFound(format!("tvdb {label} not found")));
        }
        if status == StatusCode::UNAUTHORIZED {
            let mut cached = self.token.lock().await;
            // Another caller may already have replaced it.
            if cached.as_ref().is_some_and(|t| t.value == token) {
                *cached = None;
            }
            return Ok(None);
        }
        if !status.is_success() {
            return Err(MetadataError::tvdb(format!(
                "request failed with status {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MetadataError::tvdb(e.to_string()))?;

        if self.debug {
            url.set_query(None);
            debug!(url = %url, raw = %truncate_for_log(&body, DEBUG_BODY_LIMIT), "TVDB response");
        }

        Ok(Some(serde_json::from_str(&body)?))
    }

    async fn search_items(
        &self,
        query: &str,
        opts: SearchOpts,
        include_type: bool,
    ) -> Result<Vec<Item>, MetadataError> {
        let page = BOUNDS.page(opts.page);
        let limit = BOUNDS.limit(opts.limit);

        let mut url = self.url("/search")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            if include_type {
                pairs.append_pair("type", "series");
            }
            pairs
                .append_pair("page", &upstream_page(page).to_string())
                .append_pair("limit", &limit.to_string());
        }

        let payload = self.get_json(url, "search").await?;
        let items = decode_array_data(&payload);

        debug!(query, include_type, page, limit, count = items.len(), "TVDB search");
        Ok(items)
    }
}

/// TVDB pages are zero-based.
const fn upstream_page(page: u32) -> u32 {
    page.saturating_sub(1)
}

fn truncate_for_log(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &body[..end])
}

fn alt_titles(item: &Item, titles: &crate::metadata::normalize::PickedTitles) -> Vec<String> {
    let mut alts = AltTitles::new(titles);

    if let Some(aliases) = item.get("aliases").and_then(Value::as_array) {
        for alias in aliases {
            match alias {
                Value::String(value) => alts.push(value),
                Value::Object(entry) => alts.push_opt(first_string(entry, &["name", "title"]).as_deref()),
                _ => {}
            }
        }
    }

    match item.get("translations") {
        Some(Value::Array(entries)) => {
            for entry in entries.iter().filter_map(Value::as_object) {
                alts.push_opt(first_string(entry, &["name", "title"]).as_deref());
            }
        }
        Some(Value::Object(by_language)) => {
            alts.extend(by_language.values().filter_map(Value::as_str));
        }
        _ => {}
    }

    alts.finish()
}

fn map_search_item(item: &Item) -> Option<Show> {
    let id = ["id", "tvdb_id"]
        .iter()
        .filter_map(|key| first_string(item, &[*key]))
        .find_map(|raw| parse_tvdb_id(&raw).ok())?;

    let preferred = first_string(
        item,
        &["name_translated", "title", "seriesName", "name", "slug"],
    );
    let name = first_string(item, &["name"]);
    let titles = pick_titles(&[preferred.as_deref()], &[name.as_deref()]);

    Some(Show {
        external_id: format_external_id(ProviderName::Tvdb.id_prefix(), &id),
        alt_titles: alt_titles(item, &titles),
        title_preferred: titles.preferred,
        title_original: titles.original,
        show_type: map_show_type(first_string(item, &["primary_type", "type"])),
        status: map_status(item),
        synopsis: first_string(
            item,
            &["overview_translated", "overview", "overviews", "summary", "plot"],
        ),
        banner_url: first_string(item, &["image_url", "thumbnail", "image", "banner"]),
        ..Show::default()
    })
}

fn map_series(id: &str, item: &Item) -> Show {
    let preferred = first_string(item, &["name_translated", "name", "slug"]);
    let name = first_string(item, &["name"]);
    let titles = pick_titles(&[preferred.as_deref()], &[name.as_deref()]);

    let poster_url = first_string(item, &["image", "image_url"]);
    let banner_url = object_array(item, "artworks")
        .into_iter()
        .find(|artwork| {
            first_string(artwork, &["type", "typeName"])
                .is_some_and(|kind| kind.to_lowercase().contains("banner"))
        })
        .and_then(|artwork| first_string(artwork, &["image", "image_url"]))
        .or_else(|| poster_url.clone());

    let season_count = object_array(item, "seasons")
        .into_iter()
        .filter(|season| {
            season_kind(season).is_none_or(|kind| kind == "official")
                && first_int(season, &["number"]).is_some_and(|n| n > 0)
        })
        .count();

    Show {
        external_id: format_external_id(ProviderName::Tvdb.id_prefix(), id),
        alt_titles: alt_titles(item, &titles),
        title_preferred: titles.preferred,
        title_original: titles.original,
        show_type: map_show_type(first_string(item, &["type", "primary_type"])),
        status: map_status(item),
        synopsis: first_string(item, &["overview_translated", "overview", "overviews"]),
        start_date: first_string(item, &["firstAired", "first_air_time"]),
        end_date: first_string(item, &["lastAired"]),
        poster_url,
        banner_url,
        season_count: i64::try_from(season_count).ok().filter(|n| *n > 0),
        episode_count: None,
    }
}

/// `seasons[].type` is an object such as `{"id": 1, "type": "official"}`.
fn season_kind(season: &Item) -> Option<String> {
    season
        .get("type")
        .and_then(Value::as_object)
        .and_then(|kind| first_string(kind, &["type"]))
}

fn map_episode(series_id: &str, item: &Item) -> Option<Episode> {
    let season_number = first_int(item, &["seasonNumber", "season"]).unwrap_or(0);
    let episode_number = first_int(item, &["number", "episodeNumber"]).unwrap_or(0);
    if season_number < 0 || episode_number < 0 {
        return None;
    }

    let upstream_id = first_string(item, &["id"])
        .unwrap_or_else(|| format!("{series_id}:{season_number}:{episode_number}"));

    #[allow(clippy::cast_possible_truncation)]
    let runtime_minutes = first_f64(item, &["runtime", "runtimeMinutes"])
        .filter(|minutes| *minutes > 0.0)
        .map(|minutes| minutes.round() as i64);

    Some(Episode {
        provider: ProviderName::Tvdb,
        external_id: format_external_id(ProviderName::Tvdb.id_prefix(), &upstream_id),
        season_number,
        episode_number,
        title: first_string(item, &["name"])
            .unwrap_or_else(|| Episode::fallback_title(episode_number)),
        air_date: first_string(item, &["aired", "firstAired"]),
        runtime_minutes,
    })
}

fn map_show_type(value: Option<String>) -> ShowType {
    value.map_or(ShowType::Tv, |value| ShowType::from_upstream(&value))
}

fn map_status(item: &Item) -> ShowStatus {
    let raw = first_string(item, &["status", "statusName"]).unwrap_or_default();
    normalize_status_or_default(&raw, ShowStatus::Ongoing)
}

#[async_trait]
impl MetadataProvider for TvdbClient {
    fn name(&self) -> ProviderName {
        ProviderName::Tvdb
    }

    async fn search(&self, query: &str, opts: SearchOpts) -> Result<Vec<Show>, MetadataError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut items = self.search_items(query, opts, true).await?;
        if items.is_empty() {
            // Some account tiers index series without a type.
            items = self.search_items(query, opts, false).await?;
        }

        Ok(items.iter().filter_map(map_search_item).collect())
    }

    async fn get_show(&self, external_id: &str) -> Result<Show, MetadataError> {
        let id = parse_tvdb_id(external_id)?;
        let url = self.url(&format!("/series/{id}/extended"))?;

        let payload = self.get_json(url, &format!("series {id}")).await?;
        let item = decode_object_data(&payload).ok_or_else(|| {
            MetadataError::NotFound(format!("tvdb show {external_id} not found"))
        })?;

        let show = map_series(&id, &item);
        if show.title_preferred == UNTITLED {
            debug!(id = %id, "TVDB series has no usable title");
        }
        Ok(show)
    }

    async fn list_episodes(
        &self,
        external_id: &str,
        opts: ListEpisodesOpts,
    ) -> Result<Vec<Episode>, MetadataError> {
        let id = parse_tvdb_id(external_id)?;

        let mut url = self.url(&format!("/series/{id}/episodes/default"))?;
        url.query_pairs_mut()
            .append_pair("page", &upstream_page(BOUNDS.page(opts.page)).to_string())
            .append_pair("limit", &BOUNDS.limit(opts.limit).to_string());

        let payload = self.get_json(url, &format!("series {id}")).await?;

        let mut episodes: Vec<Episode> = decode_array_data(&payload)
            .iter()
            .filter_map(|item| map_episode(&id, item))
            .filter(|episode| {
                opts.season_number
                    .is_none_or(|season| episode.season_number == season)
            })
            .collect();
        sort_episodes(&mut episodes);

        debug!(id = %id, episodes = episodes.len(), "TVDB episodes");
        Ok(episodes)
    }
}
