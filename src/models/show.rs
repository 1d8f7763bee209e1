use crate::domain::{JobStatus, ShowStatus, ShowType};
use serde::{Deserialize, Serialize};

/// Normalized show record produced by every metadata provider and accepted by
/// the create/update/enqueue paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub external_id: String,
    pub title_preferred: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_original: Option<String>,
    #[serde(default)]
    pub alt_titles: Vec<String>,
    #[serde(rename = "type")]
    pub show_type: ShowType,
    pub status: ShowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_count: Option<i64>,
}

impl Default for Show {
    fn default() -> Self {
        Self {
            external_id: String::new(),
            title_preferred: "Untitled".to_string(),
            title_original: None,
            alt_titles: Vec::new(),
            show_type: ShowType::default(),
            status: ShowStatus::default(),
            synopsis: None,
            start_date: None,
            end_date: None,
            poster_url: None,
            banner_url: None,
            season_count: None,
            episode_count: None,
        }
    }
}

impl Show {
    /// Every title this show is known by, preferred first.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.title_preferred.as_str())
            .chain(self.title_original.as_deref())
            .chain(self.alt_titles.iter().map(String::as_str))
    }

    /// Case-insensitive substring match against the whole title set.
    ///
    /// `needle` must already be trimmed and lower-cased.
    #[must_use]
    pub fn title_contains(&self, needle: &str) -> bool {
        self.titles()
            .any(|title| title.to_lowercase().contains(needle))
    }
}

/// Id container persisted alongside a show row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowExternalIds {
    #[serde(default)]
    pub external_id: String,
}

/// A show row as stored, with its internal identifier and timestamps.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredShow {
    pub internal_show_id: String,
    #[serde(flatten)]
    pub show: Show,
    pub created_at: String,
    pub updated_at: String,
}

/// Identifiers and state of a show ingestion job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueuedJob {
    pub internal_show_id: String,
    pub internal_job_show_id: String,
    pub status: JobStatus,
    pub retry_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_contains_checks_all_titles() {
        let show = Show {
            title_preferred: "Naruto Shippuden".to_string(),
            title_original: Some("ナルト".to_string()),
            alt_titles: vec!["Naruto: Hurricane Chronicles".to_string()],
            ..Show::default()
        };

        assert!(show.title_contains("shippuden"));
        assert!(show.title_contains("ナルト"));
        assert!(show.title_contains("hurricane"));
        assert!(!show.title_contains("bleach"));
    }

    #[test]
    fn test_show_serializes_camel_case() {
        let show = Show {
            external_id: "anilist:20".to_string(),
            title_preferred: "Naruto".to_string(),
            show_type: ShowType::Anime,
            status: ShowStatus::Finished,
            ..Show::default()
        };

        let value = serde_json::to_value(&show).unwrap();
        assert_eq!(value["externalId"], "anilist:20");
        assert_eq!(value["titlePreferred"], "Naruto");
        assert_eq!(value["type"], "anime");
        assert_eq!(value["status"], "finished");
        assert!(value.get("titleOriginal").is_none());
        assert_eq!(value["altTitles"], serde_json::json!([]));
    }
}
