use super::time_of_day::TimeOfDay;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub entries: Vec<TemplateEntry>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateEntry {
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub project_id: Option<i64>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
}

/// Raw template entry, times as "HH:MM".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateEntryDraft {
    pub start_time: String,
    pub end_time: String,
    pub project_id: Option<i64>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateDraft {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub entries: Vec<TemplateEntryDraft>,
}

/// Partial update. `entries`, when present, replaces the whole collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub entries: Option<Vec<TemplateEntryDraft>>,
}
