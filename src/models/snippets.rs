use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use super::{read, write, ModelError};

/// How many snippets the home page lists.
const LATEST_LIMIT: usize = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

impl Snippet {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires > now
    }
}

#[derive(Debug, Default)]
struct SnippetTable {
    last_id: i64,
    rows: BTreeMap<i64, Snippet>,
}

/// Snippet repository.
#[derive(Debug, Default)]
pub struct SnippetModel {
    table: RwLock<SnippetTable>,
}

impl SnippetModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a snippet that expires `expires_days` from now; returns its id.
    pub fn insert(&self, title: &str, content: &str, expires_days: i64) -> Result<i64, ModelError> {
        let now = Utc::now();
        let mut table = write(&self.table);
        table.last_id += 1;
        let id = table.last_id;
        table.rows.insert(id, Snippet {
            id,
            title: title.to_owned(),
            content: content.to_owned(),
            created: now,
            expires: now + Duration::days(expires_days),
        });
        Ok(id)
    }

    /// The snippet with `id`, unless it does not exist or has expired.
    pub fn get(&self, id: i64) -> Result<Snippet, ModelError> {
        let now = Utc::now();
        read(&self.table)
            .rows
            .get(&id)
            .filter(|s| s.is_live(now))
            .cloned()
            .ok_or(ModelError::NoRecord)
    }

    /// The ten most recently created snippets that have not expired.
    pub fn latest(&self) -> Result<Vec<Snippet>, ModelError> {
        let now = Utc::now();
        Ok(read(&self.table)
            .rows
            .values()
            .rev()
            .filter(|s| s.is_live(now))
            .take(LATEST_LIMIT)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get() {
        let model = SnippetModel::new();
        let id = model.insert("O snail", "Climb Mount Fuji,\nBut slowly, slowly!", 7).unwrap();
        assert_eq!(id, 1);

        let snippet = model.get(id).unwrap();
        assert_eq!(snippet.title, "O snail");
        assert!(snippet.expires - snippet.created == Duration::days(7));
    }

    #[test]
    fn missing_and_expired_are_no_record() {
        let model = SnippetModel::new();
        let expired = model.insert("old", "gone", -1).unwrap();
        assert!(matches!(model.get(expired), Err(ModelError::NoRecord)));
        assert!(matches!(model.get(99), Err(ModelError::NoRecord)));
    }

    #[test]
    fn latest_is_newest_first_live_and_capped() {
        let model = SnippetModel::new();
        for i in 0..12 {
            model.insert(&format!("snippet {i}"), "body", 1).unwrap();
        }
        model.insert("expired", "body", -1).unwrap();

        let latest = model.latest().unwrap();
        assert_eq!(latest.len(), 10);
        assert_eq!(latest[0].title, "snippet 11");
        assert!(latest.iter().all(|s| s.title != "expired"));
    }
}
