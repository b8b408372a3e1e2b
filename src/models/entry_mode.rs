use serde::Serialize;

/// How a time entry was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryMode {
    Simple,   // start/stop timer
    Day,      // block inside a day
    Template, // expanded from a template
}

impl EntryMode {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EntryMode::Simple => "simple",
            EntryMode::Day => "day",
            EntryMode::Template => "template",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "simple" => Some(EntryMode::Simple),
            "day" => Some(EntryMode::Day),
            "template" => Some(EntryMode::Template),
            _ => None,
        }
    }
}
