use serde::Serialize;

/// Webhook target configured for one lifecycle event. An empty URL disables
/// delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSetting {
    pub event: String,
    pub url: String,
    pub updated_at: String,
}
