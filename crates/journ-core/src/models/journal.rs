//! Journal entries and the categories they are filed under.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::parse_server_date;

/// A journal entry as returned by the list and detail endpoints.
///
/// The list endpoint omits `category_id`; the detail endpoint includes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: i64,
    pub title: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    pub content: Option<String>,
    pub date: String,
}

impl JournalEntry {
    pub fn title_display(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }

    pub fn category_display(&self) -> &str {
        self.category.as_deref().unwrap_or("Uncategorized")
    }

    /// Creation time, if the server's date string can be parsed
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        parse_server_date(&self.date)
    }
}

/// An entry as returned by the per-category listing, which carries no id or date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryJournal {
    pub title: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: Option<String>,
}

impl Category {
    pub fn name_display(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }
}
