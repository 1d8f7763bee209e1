use crate::config::AnilistConfig;
use crate::domain::{ProviderName, ShowStatus, ShowType, normalize_status_or_default};
use crate::metadata::external_id::{format_external_id, parse_anilist_id};
use crate::metadata::normalize::{AltTitles, PageBounds, pick_titles, trimmed_opt, unix_date, ymd};
use crate::metadata::{
    DiscoverOpts, DiscoverResult, ListEpisodesOpts, MetadataError, MetadataProvider, SearchOpts,
};
use crate::models::episode::sort_episodes;
use crate::models::{Episode, Show};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub const ANILIST_API: &str = "https://graphql.anilist.co";

const BOUNDS: PageBounds = PageBounds::new(10, 50);

const MEDIA_FIELDS: &str = r"
    fragment card on Media {
        id
        type
        status
        episodes
        description(asHtml: false)
        bannerImage
        synonyms
        coverImage { large }
        startDate { year month day }
        endDate { year month day }
        title { romaji english native }
    }
";

const SEARCH_QUERY: &str = r"
    query ($query: String!, $page: Int!, $perPage: Int!) {
        Page(page: $page, perPage: $perPage) {
            media(search: $query, type: ANIME, sort: SEARCH_MATCH) { ...card }
        }
    }
";

const SHOW_QUERY: &str = r"
    query ($id: Int!) {
        Media(id: $id, type: ANIME) { ...card }
    }
";

const EPISODES_QUERY: &str = r"
    query ($mediaId: Int!, $page: Int!, $perPage: Int!) {
        Page(page: $page, perPage: $perPage) {
            airingSchedules(mediaId: $mediaId, sort: EPISODE) {
                episode
                airingAt
            }
        }
    }
";

const DISCOVER_QUERY: &str = r"
    query ($page: Int!, $perPage: Int!) {
        trending: Page(page: $page, perPage: $perPage) {
            media(type: ANIME, sort: TRENDING_DESC) { ...card }
        }
        popular: Page(page: $page, perPage: $perPage) {
            media(type: ANIME, sort: POPULARITY_DESC) { ...card }
        }
        topRated: Page(page: $page, perPage: $perPage) {
            media(type: ANIME, sort: SCORE_DESC) { ...card }
        }
        upcoming: Page(page: $page, perPage: $perPage) {
            media(type: ANIME, status: NOT_YET_RELEASED, sort: POPULARITY_DESC) { ...card }
        }
        currentlyAiring: Page(page: $page, perPage: $perPage) {
            media(type: ANIME, status: RELEASING, sort: POPULARITY_DESC) { ...card }
        }
    }
";

#[derive(Serialize)]
struct GraphQLRequest {
    query: String,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQLError>,
}

#[derive(Deserialize)]
struct GraphQLError {
    message: String,
    #[serde(default)]
    status: Option<u16>,
}

#[derive(Deserialize)]
struct SearchData {
    #[serde(rename = "Page")]
    page: MediaPage,
}

#[derive(Deserialize)]
struct ShowData {
    #[serde(rename = "Media")]
    media: Option<Media>,
}

#[derive(Deserialize)]
struct EpisodesData {
    #[serde(rename = "Page")]
    page: SchedulePage,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscoverData {
    trending: MediaPage,
    popular: MediaPage,
    top_rated: MediaPage,
    upcoming: MediaPage,
    currently_airing: MediaPage,
}

#[derive(Deserialize, Default)]
struct MediaPage {
    #[serde(default)]
    media: Vec<Media>,
}

#[derive(Deserialize, Default)]
struct SchedulePage {
    #[serde(default, rename = "airingSchedules")]
    airing_schedules: Vec<AiringSchedule>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiringSchedule {
    episode: i64,
    airing_at: Option<i64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Media {
    #[serde(default)]
    id: i64,
    #[serde(rename = "type")]
    media_type: Option<String>,
    status: Option<String>,
    episodes: Option<i64>,
    description: Option<String>,
    banner_image: Option<String>,
    #[serde(default)]
    synonyms: Option<Vec<String>>,
    cover_image: Option<CoverImage>,
    start_date: Option<FuzzyDate>,
    end_date: Option<FuzzyDate>,
    #[serde(default)]
    title: Title,
}

#[derive(Deserialize)]
struct CoverImage {
    large: Option<String>,
}

#[derive(Deserialize, Default)]
struct FuzzyDate {
    year: Option<i32>,
    month: Option<i32>,
    day: Option<i32>,
}

impl FuzzyDate {
    fn format(date: Option<&Self>) -> Option<String> {
        date.and_then(|d| ymd(d.year, d.month, d.day))
    }
}

#[derive(Deserialize, Default)]
struct Title {
    romaji: Option<String>,
    english: Option<String>,
    native: Option<String>,
}

/// `AniList` GraphQL adapter. Also serves `anidb:` ids.
#[derive(Clone)]
pub struct AnilistClient {
    client: Client,
    endpoint: String,
}

impl Default for AnilistClient {
    fn default() -> Self {
        Self::from_config(&AnilistConfig::default())
    }
}

impl AnilistClient {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("Showkeeper/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            endpoint: endpoint.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AnilistConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, MetadataError> {
        // Unused fragments fail GraphQL validation.
        let query = if query.contains("...card") {
            format!("{query}\n{MEDIA_FIELDS}")
        } else {
            query.to_string()
        };
        let request = GraphQLRequest { query, variables };

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| MetadataError::anilist(e.to_string()))?;

        let status = response.status();
        let body: GraphQLResponse<T> = if status.is_success() {
            response.json().await.map_err(|e| {
                MetadataError::Internal(format!("failed to decode anilist response: {e}"))
            })?
        } else {
            // AniList reports missing media as a 404 carrying a GraphQL body.
            match response.json::<GraphQLResponse<T>>().await {
                Ok(body) if !body.errors.is_empty() => body,
                _ => {
                    return Err(MetadataError::anilist(format!(
                        "request failed with status {}",
                        status.as_u16()
                    )));
                }
            }
        };

        if let Some(error) = body.errors.first() {
            if error.status == Some(404) {
                return Err(MetadataError::NotFound(format!(
                    "anilist: {}",
                    error.message
                )));
            }
            return Err(MetadataError::anilist(format!(
                "graphql error: {}",
                error.message
            )));
        }

        body.data
            .ok_or_else(|| MetadataError::anilist("response carried no data"))
    }

    fn map_media(media: Media) -> Show {
        let Media {
            id,
            media_type,
            status,
            episodes,
            description,
            banner_image,
            synonyms,
            cover_image,
            start_date,
            end_date,
            title,
        } = media;

        let english = title.english.as_deref();
        let romaji = title.romaji.as_deref();
        let native = title.native.as_deref();

        let titles = pick_titles(&[english, romaji, native], &[native, romaji, english]);
        let mut alts = AltTitles::new(&titles);
        alts.push_opt(english);
        alts.push_opt(romaji);
        alts.push_opt(native);
        alts.extend(synonyms.iter().flatten().map(String::as_str));
        let alt_titles = alts.finish();

        Show {
            external_id: format_external_id(ProviderName::AniList.id_prefix(), &id.to_string()),
            title_preferred: titles.preferred,
            title_original: titles.original,
            alt_titles,
            show_type: map_type(media_type.as_deref()),
            status: normalize_status_or_default(
                status.as_deref().unwrap_or_default(),
                ShowStatus::Ongoing,
            ),
            synopsis: trimmed_opt(description.as_deref()),
            start_date: FuzzyDate::format(start_date.as_ref()),
            end_date: FuzzyDate::format(end_date.as_ref()),
            poster_url: trimmed_opt(cover_image.as_ref().and_then(|c| c.large.as_deref())),
            banner_url: trimmed_opt(banner_image.as_deref()),
            season_count: None,
            episode_count: episodes.filter(|count| *count > 0),
        }
    }

    fn map_page(page: MediaPage) -> Vec<Show> {
        page.media
            .into_iter()
            .filter(|media| media.id > 0)
            .map(Self::map_media)
            .collect()
    }
}

fn map_type(value: Option<&str>) -> ShowType {
    match value.map(str::trim) {
        Some(value) if value.eq_ignore_ascii_case("ANIME") => ShowType::Anime,
        Some(value) => ShowType::from_upstream(value),
        None => ShowType::Anime,
    }
}

#[async_trait]
impl MetadataProvider for AnilistClient {
    fn name(&self) -> ProviderName {
        ProviderName::AniList
    }

    async fn search(&self, query: &str, opts: SearchOpts) -> Result<Vec<Show>, MetadataError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let data: SearchData = self
            .execute(
                SEARCH_QUERY,
                json!({
                    "query": query.trim(),
                    "page": BOUNDS.page(opts.page),
                    "perPage": BOUNDS.limit(opts.limit),
                }),
            )
            .await?;

        let shows = Self::map_page(data.page);
        debug!(query, hits = shows.len(), "AniList search");
        Ok(shows)
    }

    async fn discover(&self, opts: DiscoverOpts) -> Result<DiscoverResult, MetadataError> {
        let data: DiscoverData = self
            .execute(
                DISCOVER_QUERY,
                json!({
                    "page": BOUNDS.page(opts.page),
                    "perPage": BOUNDS.limit(opts.limit),
                }),
            )
            .await?;

        Ok(DiscoverResult {
            trending: Self::map_page(data.trending),
            popular: Self::map_page(data.popular),
            top_rated: Self::map_page(data.top_rated),
            upcoming: Self::map_page(data.upcoming),
            currently_airing: Self::map_page(data.currently_airing),
        })
    }

    async fn get_show(&self, external_id: &str) -> Result<Show, MetadataError> {
        let media_id = parse_anilist_id(external_id)?;

        let data: ShowData = self.execute(SHOW_QUERY, json!({ "id": media_id })).await?;

        match data.media {
            Some(media) if media.id > 0 => Ok(Self::map_media(media)),
            _ => Err(MetadataError::NotFound(format!(
                "anilist show {external_id} not found"
            ))),
        }
    }

    async fn list_episodes(
        &self,
        external_id: &str,
        opts: ListEpisodesOpts,
    ) -> Result<Vec<Episode>, MetadataError> {
        let media_id = parse_anilist_id(external_id)?;

        let data: EpisodesData = self
            .execute(
                EPISODES_QUERY,
                json!({
                    "mediaId": media_id,
                    "page": BOUNDS.page(opts.page),
                    "perPage": BOUNDS.limit(opts.limit),
                }),
            )
            .await?;

        let mut episodes = map_schedules(media_id, data.page.airing_schedules);
        if let Some(season) = opts.season_number {
            episodes.retain(|episode| episode.season_number == season);
        }
        sort_episodes(&mut episodes);

        debug!(media_id, episodes = episodes.len(), "AniList episodes");
        Ok(episodes)
    }
}

/// `AniList` has no seasons; every scheduled episode lands in season 1.
fn map_schedules(media_id: i64, schedules: Vec<AiringSchedule>) -> Vec<Episode> {
    schedules
        .into_iter()
        .filter(|item| item.episode >= 0)
        .map(|item| Episode {
            provider: ProviderName::AniList,
            external_id: format_external_id(
                ProviderName::AniList.id_prefix(),
                &format!("{media_id}:{}", item.episode),
            ),
            season_number: 1,
            episode_number: item.episode,
            title: Episode::fallback_title(item.episode),
            air_date: unix_date(item.airing_at),
            runtime_minutes: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(value: serde_json::Value) -> Media {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_map_media_full() {
        let show = AnilistClient::map_media(media(json!({
            "id": 20,
            "type": "ANIME",
            "status": "FINISHED",
            "episodes": 220,
            "description": "  A ninja story. ",
            "bannerImage": "https://img/banner.jpg",
            "synonyms": ["NARUTO", "Naruto Uzumaki", "naruto uzumaki"],
            "coverImage": { "large": "https://img/cover.jpg" },
            "startDate": { "year": 2002, "month": 10, "day": 3 },
            "endDate": { "year": 2007, "month": 2, "day": null },
            "title": { "romaji": "NARUTO", "english": "Naruto", "native": "ナルト" }
        })));

        assert_eq!(show.external_id, "anilist:20");
        assert_eq!(show.title_preferred, "Naruto");
        assert_eq!(show.title_original.as_deref(), Some("ナルト"));
        assert_eq!(show.alt_titles, vec!["Naruto Uzumaki"]);
        assert_eq!(show.show_type, ShowType::Anime);
        assert_eq!(show.status, ShowStatus::Finished);
        assert_eq!(show.synopsis.as_deref(), Some("A ninja story."));
        assert_eq!(show.start_date.as_deref(), Some("2002-10-03"));
        assert_eq!(show.end_date, None);
        assert_eq!(show.poster_url.as_deref(), Some("https://img/cover.jpg"));
        assert_eq!(show.episode_count, Some(220));
    }

    #[test]
    fn test_map_media_sparse() {
        let show = AnilistClient::map_media(media(json!({
            "id": 5,
            "status": "HIATUS",
            "title": { "romaji": null, "english": " ", "native": null }
        })));

        assert_eq!(show.title_preferred, "Untitled");
        assert_eq!(show.title_original, None);
        assert!(show.alt_titles.is_empty());
        assert_eq!(show.status, ShowStatus::Ongoing);
        assert_eq!(show.show_type, ShowType::Anime);
    }

    #[test]
    fn test_map_schedules_season_one_and_dates() {
        let episodes = map_schedules(
            20,
            vec![
                AiringSchedule {
                    episode: 2,
                    airing_at: Some(1_033_689_600),
                },
                AiringSchedule {
                    episode: 1,
                    airing_at: Some(0),
                },
            ],
        );

        assert_eq!(episodes.len(), 2);
        assert!(episodes.iter().all(|e| e.season_number == 1));
        assert_eq!(episodes[0].external_id, "anilist:20:2");
        assert_eq!(episodes[0].title, "Episode 2");
        assert_eq!(episodes[0].air_date.as_deref(), Some("2002-10-04"));
        assert_eq!(episodes[1].air_date, None);
    }

    #[test]
    fn test_graphql_error_body_decodes() {
        let body: GraphQLResponse<ShowData> = serde_json::from_value(json!({
            "data": { "Media": null },
            "errors": [{ "message": "Not Found.", "status": 404 }]
        }))
        .unwrap();

        assert_eq!(body.errors[0].status, Some(404));
        assert!(body.data.unwrap().media.is_none());
    }
}
