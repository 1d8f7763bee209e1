//! Provider-prefixed external identifiers.
//!
//! Every show leaving an adapter carries `"<provider>:<upstream id>"`. Adapters
//! accept either the prefixed or the bare form on the way back in.

use crate::domain::ProviderName;
use crate::metadata::MetadataError;

/// Prefixes `value` with `prefix` unless it already carries it.
///
/// Blank input yields an empty string.
#[must_use]
pub fn format_external_id(prefix: &str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }
    if has_prefix(value, prefix) {
        return value.to_string();
    }
    format!("{prefix}{value}")
}

fn has_prefix(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len()
        && value.is_char_boundary(prefix.len())
        && value[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn strip_prefix_ci<'a>(value: &'a str, prefix: &str) -> &'a str {
    if has_prefix(value, prefix) {
        &value[prefix.len()..]
    } else {
        value
    }
}

/// Parses an `AniList` media id from `anilist:<n>`, `anidb:<n>` or `<n>`.
pub fn parse_anilist_id(external_id: &str) -> Result<i64, MetadataError> {
    let mut value = external_id.trim();
    value = strip_prefix_ci(value, ProviderName::AniList.id_prefix());
    value = strip_prefix_ci(value, ProviderName::AniDb.id_prefix());

    match value.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(MetadataError::NotFound(format!(
            "invalid anilist id {external_id:?}"
        ))),
    }
}

/// Parses a TVDB series id from `tvdb:<n>`, `series-<n>`, `tvdb:series-<n>`
/// or `<n>`, returning the bare numeric string.
pub fn parse_tvdb_id(external_id: &str) -> Result<String, MetadataError> {
    let mut value = external_id.trim();
    value = strip_prefix_ci(value, ProviderName::Tvdb.id_prefix());
    value = strip_prefix_ci(value.trim(), "series-");
    let value = value.trim();

    match value.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id.to_string()),
        _ => Err(MetadataError::NotFound(format!(
            "invalid tvdb id {external_id:?}"
        ))),
    }
}
