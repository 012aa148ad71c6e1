use serde::{Deserialize, Serialize};

/// A prospective customer with contact info and follow-up history.
///
/// Older stored shapes used `ptype`/`config`/`fdate` for what are now
/// `segment`/`requirement`/`next_follow`, and a flat `notes` string instead
/// of the follow-up log. Serde aliases accept the old field names; the
/// remaining migration (id assignment, notes -> follow-up entry) happens in
/// `Store::load`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Lead {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub phone: String,
    /// Property segment, e.g. "Residential" / "Commercial".
    #[serde(default, alias = "ptype", alias = "category")]
    pub segment: Option<String>,
    /// What the client is looking for, e.g. "2 BHK".
    #[serde(default, alias = "config")]
    pub requirement: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    /// Sales pipeline status, e.g. "New Lead" / "Site Visit" / "Closed".
    #[serde(default)]
    pub status: Option<String>,
    /// Next-action timestamp (ISO-8601-like), overwritten by each appended
    /// follow-up. Empty string in old data means "not set".
    #[serde(default, alias = "fdate")]
    pub next_follow: Option<String>,
    /// Follow-up log, newest first.
    #[serde(default)]
    pub followups: Vec<Followup>,
    /// Flat notes string from the legacy shape; drained into `followups`
    /// during migration, never written back.
    #[serde(default, skip_serializing)]
    pub notes: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: String,
}

/// A timestamped note logged against a lead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Followup {
    pub note: String,
    pub at: String,
}

impl Lead {
    /// Case-insensitive substring match over name, phone and location.
    /// An empty filter matches every lead.
    pub fn matches_filter(&self, filter: &str) -> bool {
        if filter.is_empty() {
            return true;
        }
        let needle = filter.to_lowercase();
        let haystack = format!(
            "{} {} {}",
            self.name,
            self.phone,
            self.location.as_deref().unwrap_or("")
        )
        .to_lowercase();
        haystack.contains(&needle)
    }

    /// A lead is due iff it has a next-follow-up timestamp at or before
    /// `as_of`. ISO-8601 strings compare correctly lexicographically, so this
    /// follows the original's string comparison on the date prefix.
    pub fn is_due(&self, as_of: &str) -> bool {
        match self.next_follow.as_deref() {
            Some(f) if !f.is_empty() => {
                let len = as_of.len().min(f.len());
                f.get(..len).is_some_and(|prefix| prefix <= as_of)
            }
            _ => false,
        }
    }

    /// Follow-up notes joined newest first, for the CSV notes column.
    pub fn joined_notes(&self) -> String {
        self.followups
            .iter()
            .map(|f| f.note.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
