use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::model::Course;

const COURSES_KEY: &str = "gradebook.courses";
const THEME_KEY: &str = "gradebook.theme";

/// Workspace-backed persistence: a single settings table whose
/// `gradebook.courses` row holds the full course array as one JSON blob,
/// rewritten in full on every mutation. A second independent row holds the
/// theme flag.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(workspace: &Path) -> anyhow::Result<Store> {
        std::fs::create_dir_all(workspace).with_context(|| {
            format!("failed to create workspace {}", workspace.to_string_lossy())
        })?;
        let db_path = workspace.join("gradebook.sqlite3");
        let conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open {}", db_path.to_string_lossy()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings(
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Store { conn })
    }

    fn get_raw(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM settings WHERE key = ?", [key], |r| {
                r.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_raw(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.conn.execute(
            "INSERT INTO settings(key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )?;
        Ok(())
    }

    /// Load the persisted course collection. Read and decode failures are
    /// not surfaced: the data is local and non-critical, so a missing key,
    /// corrupt JSON or a non-array blob all degrade to an empty collection
    /// after a note on stderr.
    pub fn load_courses(&self) -> Vec<Course> {
        let raw = match self.get_raw(COURSES_KEY) {
            Ok(Some(v)) => v,
            Ok(None) => return Vec::new(),
            Err(e) => {
                eprintln!("gradebookd: failed to read course blob: {e:#}");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Course>>(&raw) {
            Ok(courses) => courses,
            Err(e) => {
                eprintln!("gradebookd: course blob is not a valid course array: {e}");
                Vec::new()
            }
        }
    }

    /// Serialize and rewrite the full collection. Mutations always go
    /// through here; there are no partial updates.
    pub fn save_courses(&self, courses: &[Course]) -> anyhow::Result<()> {
        let blob = serde_json::to_string(courses).context("failed to serialize courses")?;
        self.set_raw(COURSES_KEY, &blob)
    }

    pub fn theme_dark(&self) -> bool {
        match self.get_raw(THEME_KEY) {
            Ok(Some(v)) => serde_json::from_str::<bool>(&v).unwrap_or(false),
            Ok(None) => false,
            Err(e) => {
                eprintln!("gradebookd: failed to read theme flag: {e:#}");
                false
            }
        }
    }

    pub fn set_theme_dark(&self, dark: bool) -> anyhow::Result<()> {
        self.set_raw(THEME_KEY, if dark { "true" } else { "false" })
    }
}
