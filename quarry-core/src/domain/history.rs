// quarry-core/src/domain/history.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::pipeline::Direction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    pub executed_at: DateTime<Utc>,
}

/// Unique queries kept per database; past this, the oldest batch is dropped.
pub const MAX_QUERIES: usize = 1000;
const TRIM_BATCH: usize = 100;
/// Unique statements returned by [`QueryHistory::commands`].
pub const MAX_COMMANDS: usize = 2000;

/// Executed queries of one database, oldest first.
///
/// Queries are unique ignoring case and surrounding whitespace.
#[derive(Debug, Clone, Default)]
pub struct QueryHistory {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
    draft: String,
}

impl QueryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a history from stored entries, applying de-duplication and the cap.
    pub fn from_entries(entries: impl IntoIterator<Item = HistoryEntry>) -> Self {
        let mut history = Self::new();
        for entry in entries {
            history.push(entry);
        }
        history
    }

    /// Records an executed query. Re-running a known query moves it to the end.
    pub fn record(&mut self, query: &str) {
        self.push(HistoryEntry {
            query: query.trim().to_string(),
            executed_at: Utc::now(),
        });
    }

    fn push(&mut self, mut entry: HistoryEntry) {
        entry.query = entry.query.trim().to_string();
        if entry.query.is_empty() {
            return;
        }
        let key = dedup_key(&entry.query);
        self.entries.retain(|e| dedup_key(&e.query) != key);
        self.entries.push(entry);
        if self.entries.len() > MAX_QUERIES {
            self.entries.drain(..TRIM_BATCH);
        }
        self.cursor = None;
        self.draft.clear();
    }

    /// Most recent first, at most `limit`.
    pub fn recent(&self, limit: usize) -> Vec<&HistoryEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Case-insensitive substring search, most recent first.
    pub fn search(&self, term: &str, limit: usize) -> Vec<&HistoryEntry> {
        let term = term.trim().to_lowercase();
        self.entries
            .iter()
            .rev()
            .filter(|e| e.query.to_lowercase().contains(&term))
            .take(limit)
            .collect()
    }

    /// Individual statements of every recorded query, most recent first, unique
    /// ignoring case, at most [`MAX_COMMANDS`].
    pub fn commands(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.entries
            .iter()
            .rev()
            .flat_map(|e| split_commands(&e.query))
            .filter(|cmd| seen.insert(dedup_key(cmd)))
            .take(MAX_COMMANDS)
            .collect()
    }

    /// Walks the history like a shell prompt.
    ///
    /// The first `Up` stashes `current` as a draft; stepping `Down` past the newest
    /// entry gives the draft back. Returns `None` when there is nothing to show.
    pub fn navigate(&mut self, direction: Direction, current: &str) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }

        match (direction, self.cursor) {
            (Direction::Up, None) => {
                self.draft = current.to_string();
                self.cursor = Some(self.entries.len() - 1);
            }
            (Direction::Up, Some(idx)) => {
                self.cursor = Some(idx.saturating_sub(1));
            }
            (Direction::Down, None) => return None,
            (Direction::Down, Some(idx)) if idx + 1 >= self.entries.len() => {
                self.cursor = None;
                return Some(std::mem::take(&mut self.draft));
            }
            (Direction::Down, Some(idx)) => {
                self.cursor = Some(idx + 1);
            }
        }

        self.cursor
            .and_then(|idx| self.entries.get(idx))
            .map(|e| e.query.clone())
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Splits multi-statement text on `;` outside quoted strings.
///
/// Blank lines and `--` comment lines are skipped; a statement spanning several
/// lines is joined with single spaces.
pub fn split_commands(text: &str) -> Vec<String> {
    let mut commands = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with("--") {
            continue;
        }

        let mut prev: Option<char> = None;
        for ch in stripped.chars() {
            match ch {
                '"' | '\'' | '`' if prev != Some('\\') => match quote {
                    None => quote = Some(ch),
                    Some(open) if open == ch => quote = None,
                    Some(_) => {}
                },
                ';' if quote.is_none() => {
                    push_command(&mut commands, &mut current);
                    prev = Some(ch);
                    continue;
                }
                _ => {}
            }
            current.push(ch);
            prev = Some(ch);
        }
        current.push(' ');
    }
    push_command(&mut commands, &mut current);
    commands
}

fn dedup_key(query: &str) -> String {
    query.trim().to_lowercase()
}

fn push_command(commands: &mut Vec<String>, current: &mut String) {
    let cmd = current.trim();
    if !cmd.is_empty() {
        commands.push(cmd.to_string());
    }
    current.clear();
}
