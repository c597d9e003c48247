//! Day, week and month summaries of journal entries.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::JournalEntry;

/// Group key for entries whose date could not be parsed
pub const UNDATED: &str = "Undated";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
}

impl Period {
    /// Key of the group that `date` falls into
    pub fn key(self, date: NaiveDate) -> String {
        match self {
            Period::Day => date.format("%a %b %d %Y").to_string(),
            Period::Week => {
                let start = date - Duration::days(date.weekday().num_days_from_sunday() as i64);
                start.format("%a %b %d %Y").to_string()
            }
            Period::Month => date.format("%B %Y").to_string(),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Period::Day),
            "week" | "weekly" => Ok(Period::Week),
            "month" | "monthly" => Ok(Period::Month),
            other => Err(format!(
                "unknown period '{}', expected daily, weekly or monthly",
                other
            )),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Period::Day => "daily",
            Period::Week => "weekly",
            Period::Month => "monthly",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryGroup<'a> {
    pub key: String,
    pub entries: Vec<&'a JournalEntry>,
}

/// Group entries by period. Groups come out in the order their first entry
/// was seen, and entries keep their input order inside a group. Entries with
/// unparseable dates are collected in a trailing `Undated` group.
pub fn summarize(entries: &[JournalEntry], period: Period) -> Vec<SummaryGroup<'_>> {
    let mut groups: Vec<SummaryGroup<'_>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut undated = Vec::new();

    for entry in entries {
        let Some(created) = entry.created_at() else {
            undated.push(entry);
            continue;
        };
        let key = period.key(created.date());
        match index.get(&key) {
            Some(&i) => groups[i].entries.push(entry),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(SummaryGroup {
                    key,
                    entries: vec![entry],
                });
            }
        }
    }

    if !undated.is_empty() {
        groups.push(SummaryGroup {
            key: UNDATED.to_string(),
            entries: undated,
        });
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, date: &str) -> JournalEntry {
        JournalEntry {
            id,
            title: Some(format!("Entry {}", id)),
            category: Some("Life".into()),
            category_id: None,
            content: Some("...".into()),
            date: date.into(),
        }
    }

    fn keys(groups: &[SummaryGroup<'_>]) -> Vec<String> {
        groups.iter().map(|g| g.key.clone()).collect()
    }

    fn ids(group: &SummaryGroup<'_>) -> Vec<i64> {
        group.entries.iter().map(|e| e.id).collect()
    }

    fn sample() -> Vec<JournalEntry> {
        vec![
            // Saturday
            entry(1, "Sat, 17 Oct 2026 08:15:00 GMT"),
            // Sunday: starts a new week
            entry(2, "Sun, 18 Oct 2026 21:00:00 GMT"),
            entry(3, "Sat, 17 Oct 2026 22:30:00 GMT"),
            entry(4, "Sun, 01 Nov 2026 07:00:00 GMT"),
        ]
    }

    #[test]
    fn test_period_from_str() {
        assert_eq!("daily".parse::<Period>(), Ok(Period::Day));
        assert_eq!("Week".parse::<Period>(), Ok(Period::Week));
        assert_eq!("monthly".parse::<Period>(), Ok(Period::Month));
        assert!("yearly".parse::<Period>().is_err());
    }

    #[test]
    fn test_period_keys() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(Period::Day.key(date), "Sat Oct 17 2026");
        assert_eq!(Period::Week.key(date), "Sun Oct 11 2026");
        assert_eq!(Period::Month.key(date), "October 2026");

        // A Sunday is the start of its own week
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(Period::Week.key(sunday), "Sun Oct 18 2026");

        // Weeks can start in the previous month
        let first = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        assert_eq!(Period::Week.key(first), "Sun Sep 27 2026");
    }

    #[test]
    fn test_summarize_daily() {
        let entries = sample();
        let groups = summarize(&entries, Period::Day);
        assert_eq!(
            keys(&groups),
            vec!["Sat Oct 17 2026", "Sun Oct 18 2026", "Sun Nov 01 2026"]
        );
        assert_eq!(ids(&groups[0]), vec![1, 3]);
    }

    #[test]
    fn test_summarize_weekly() {
        let entries = sample();
        let groups = summarize(&entries, Period::Week);
        assert_eq!(
            keys(&groups),
            vec!["Sun Oct 11 2026", "Sun Oct 18 2026", "Sun Nov 01 2026"]
        );
        assert_eq!(ids(&groups[0]), vec![1, 3]);
        assert_eq!(ids(&groups[1]), vec![2]);
    }

    #[test]
    fn test_summarize_monthly() {
        let entries = sample();
        let groups = summarize(&entries, Period::Month);
        assert_eq!(keys(&groups), vec!["October 2026", "November 2026"]);
        assert_eq!(ids(&groups[0]), vec![1, 2, 3]);
        assert_eq!(ids(&groups[1]), vec![4]);
    }

    #[test]
    fn test_summarize_undated_last() {
        let entries = vec![entry(1, "not a date"), entry(2, "Sat, 17 Oct 2026 08:15:00 GMT")];
        let groups = summarize(&entries, Period::Day);
        assert_eq!(keys(&groups), vec!["Sat Oct 17 2026", UNDATED]);
        assert_eq!(ids(&groups[1]), vec![1]);
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[], Period::Month).is_empty());
    }
}
