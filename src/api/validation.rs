use super::ApiError;
use crate::domain::{ProviderName, ShowStatus, ShowType};
use crate::models::{EpisodeInput, Show};
use serde::Deserialize;

const MAX_EXTERNAL_ID_LEN: usize = 128;
const MAX_TITLE_LEN: usize = 500;

/// Show body as it arrives over the wire, before normalization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRequest {
    #[serde(default)]
    pub external_id: String,
    #[serde(default)]
    pub title_preferred: String,
    #[serde(default)]
    pub title_original: Option<String>,
    #[serde(default)]
    pub alt_titles: Vec<String>,
    #[serde(rename = "type", default)]
    pub show_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub season_count: Option<i64>,
    #[serde(default)]
    pub episode_count: Option<i64>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_date(field: &str, value: Option<&str>) -> Result<(), ApiError> {
    let Some(value) = value else {
        return Ok(());
    };
    let well_formed = value.len() == 10
        && chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();
    if !well_formed {
        return Err(ApiError::validation(format!(
            "{field} must be a YYYY-MM-DD date, got {value:?}"
        )));
    }
    Ok(())
}

fn validate_count(field: &str, value: Option<i64>) -> Result<(), ApiError> {
    if value.is_some_and(|v| v < 0) {
        return Err(ApiError::validation(format!("{field} must be >= 0")));
    }
    Ok(())
}

/// Normalizes and validates a show body.
///
/// With `require_external_id` the id must be present and carry a known
/// provider prefix.
pub fn validate_show(req: ShowRequest, require_external_id: bool) -> Result<Show, ApiError> {
    let external_id = req.external_id.trim().to_string();
    if external_id.chars().count() > MAX_EXTERNAL_ID_LEN {
        return Err(ApiError::validation(format!(
            "externalId must be at most {MAX_EXTERNAL_ID_LEN} characters"
        )));
    }
    if require_external_id {
        if external_id.is_empty() {
            return Err(ApiError::validation("externalId is required"));
        }
        if ProviderName::from_external_id(&external_id).is_none() {
            return Err(ApiError::validation(
                "externalId must be prefixed with anidb:, anilist: or tvdb:",
            ));
        }
    }

    let title_preferred = req.title_preferred.trim().to_string();
    let title_len = title_preferred.chars().count();
    if title_len == 0 || title_len > MAX_TITLE_LEN {
        return Err(ApiError::validation(format!(
            "titlePreferred must be 1 to {MAX_TITLE_LEN} characters"
        )));
    }

    let show_type = ShowType::parse(&req.show_type).ok_or_else(|| {
        ApiError::validation("type must be one of anime|tv|movie|ova|special")
    })?;
    let status = match req.status.trim().to_lowercase().as_str() {
        "ongoing" => ShowStatus::Ongoing,
        "finished" => ShowStatus::Finished,
        _ => return Err(ApiError::validation("status must be one of ongoing|finished")),
    };

    let start_date = clean(req.start_date);
    let end_date = clean(req.end_date);
    validate_date("startDate", start_date.as_deref())?;
    validate_date("endDate", end_date.as_deref())?;
    validate_count("seasonCount", req.season_count)?;
    validate_count("episodeCount", req.episode_count)?;

    let alt_titles = req
        .alt_titles
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    Ok(Show {
        external_id,
        title_preferred,
        title_original: clean(req.title_original),
        alt_titles,
        show_type,
        status,
        synopsis: clean(req.synopsis),
        start_date,
        end_date,
        poster_url: clean(req.poster_url),
        banner_url: clean(req.banner_url),
        season_count: req.season_count,
        episode_count: req.episode_count,
    })
}

pub fn validate_episode(mut input: EpisodeInput) -> Result<EpisodeInput, ApiError> {
    input.show_id = input.show_id.trim().to_string();
    if input.show_id.is_empty() {
        return Err(ApiError::validation("showId is required"));
    }
    if input.season_number < 0 || input.episode_number < 0 {
        return Err(ApiError::validation(
            "seasonNumber and episodeNumber must be >= 0",
        ));
    }
    input.title = input.title.trim().to_string();
    if input.title.is_empty() {
        input.title = crate::models::Episode::fallback_title(input.episode_number);
    }
    input.air_date = clean(input.air_date);
    validate_date("airDate", input.air_date.as_deref())?;
    validate_count("runtimeMinutes", input.runtime_minutes)?;
    Ok(input)
}

pub fn validate_search_query(query: &str) -> Result<&str, ApiError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Search query cannot be empty"));
    }
    Ok(trimmed)
}

/// Resolves the `type` query parameter; absent means `anidb`.
pub fn parse_provider(value: Option<&str>) -> Result<ProviderName, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(ProviderName::AniDb),
        Some(v) => v.parse().map_err(|e: crate::domain::UnknownProvider| {
            ApiError::validation(e.to_string())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ShowRequest {
        ShowRequest {
            external_id: "  anilist:20 ".to_string(),
            title_preferred: " Naruto ".to_string(),
            show_type: "ANIME".to_string(),
            status: " Finished".to_string(),
            alt_titles: vec![" NARUTO ".to_string(), "   ".to_string()],
            start_date: Some("2002-10-03".to_string()),
            ..ShowRequest::default()
        }
    }

    #[test]
    fn test_validate_show_normalizes() {
        let show = validate_show(request(), true).unwrap();
        assert_eq!(show.external_id, "anilist:20");
        assert_eq!(show.title_preferred, "Naruto");
        assert_eq!(show.show_type, ShowType::Anime);
        assert_eq!(show.status, ShowStatus::Finished);
        assert_eq!(show.alt_titles, vec!["NARUTO".to_string()]);
    }

    #[test]
    fn test_validate_show_rejects_bad_fields() {
        let mut req = request();
        req.external_id = "x".repeat(129);
        assert!(validate_show(req, false).is_err());

        let mut req = request();
        req.title_preferred = "   ".to_string();
        assert!(validate_show(req, true).is_err());

        let mut req = request();
        req.start_date = Some("2002-1-3".to_string());
        assert!(validate_show(req, true).is_err());

        let mut req = request();
        req.episode_count = Some(-1);
        assert!(validate_show(req, true).is_err());

        let mut req = request();
        req.show_type = "cartoon".to_string();
        assert!(validate_show(req, true).is_err());

        let mut req = request();
        req.external_id = "121361".to_string();
        assert!(validate_show(req, true).is_err());
    }

    #[test]
    fn test_parse_provider_defaults_to_anidb() {
        assert_eq!(parse_provider(None).unwrap(), ProviderName::AniDb);
        assert_eq!(parse_provider(Some(" ")).unwrap(), ProviderName::AniDb);
        assert_eq!(parse_provider(Some("TVDB")).unwrap(), ProviderName::Tvdb);
        assert!(parse_provider(Some("kitsu")).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  naruto ").unwrap(), "naruto");
        assert!(validate_search_query("   ").is_err());
    }
}
