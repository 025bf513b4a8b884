use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::models::GifImage;

#[derive(Debug, Clone)]
pub struct FavoriteGif {
    pub url: String,
    pub source: String,
    pub added_at: DateTime<Utc>,
}

impl From<GifImage> for FavoriteGif {
    fn from(gif: GifImage) -> Self {
        Self {
            url: gif.url,
            source: gif.source,
            added_at: Utc::now(),
        }
    }
}

impl From<FavoriteGif> for GifImage {
    fn from(fav: FavoriteGif) -> Self {
        Self {
            url: fav.url,
            source: fav.source,
        }
    }
}

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new() -> Result<Self> {
        let app_data_dir = Self::get_app_data_dir()?;
        if !app_data_dir.exists() {
            std::fs::create_dir_all(&app_data_dir)?;
        }

        Self::open_at(&app_data_dir.join("favorites.db"))
    }

    fn open_at(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        // Create the favorites table if it doesn't exist
        conn.execute(
            "CREATE TABLE IF NOT EXISTS favorites (
                url TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                added_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn get_app_data_dir() -> Result<PathBuf> {
        let home_dir =
            dirs_next::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home_dir.join(".gif_lightbox"))
    }

    pub fn add_favorite(&self, gif: &GifImage) -> Result<()> {
        let favorite = FavoriteGif::from(gif.clone());

        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Failed to lock database connection"))?;
        conn.execute(
            "INSERT OR REPLACE INTO favorites (url, source, added_at)
             VALUES (?1, ?2, ?3)",
            params![
                favorite.url,
                favorite.source,
                favorite.added_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    pub fn remove_favorite(&self, url: &str) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Failed to lock database connection"))?;
        conn.execute("DELETE FROM favorites WHERE url = ?1", params![url])?;
        Ok(())
    }

    pub fn is_favorite(&self, url: &str) -> Result<bool> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Failed to lock database connection"))?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM favorites WHERE url = ?1",
            params![url],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    pub fn get_all_favorites(&self) -> Result<Vec<FavoriteGif>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Failed to lock database connection"))?;
        let mut stmt = conn.prepare(
            "SELECT url, source, added_at
             FROM favorites
             ORDER BY added_at DESC",
        )?;

        let favorites_iter = stmt.query_map([], |row| {
            let added_at_str: String = row.get(2)?;
            let added_at = match DateTime::parse_from_rfc3339(&added_at_str) {
                Ok(dt) => dt.with_timezone(&Utc),
                Err(_) => Utc::now(), // Fallback if parsing fails
            };

            Ok(FavoriteGif {
                url: row.get(0)?,
                source: row.get(1)?,
                added_at,
            })
        })?;

        let mut favorites = Vec::new();
        for favorite in favorites_iter {
            favorites.push(favorite?);
        }

        Ok(favorites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_db(dir: &tempfile::TempDir) -> Database {
        Database::open_at(&dir.path().join("favorites.db")).unwrap()
    }

    fn gif(url: &str, source: &str) -> GifImage {
        GifImage {
            url: url.to_string(),
            source: source.to_string(),
        }
    }

    #[test]
    fn add_list_remove_roundtrip() {
        let dir = tempdir().unwrap();
        let db = test_db(&dir);

        db.add_favorite(&gif("https://media.test/a.gif", "a.com"))
            .unwrap();
        db.add_favorite(&gif("https://media.test/b.gif", "Unknown"))
            .unwrap();

        assert!(db.is_favorite("https://media.test/a.gif").unwrap());
        assert_eq!(db.get_all_favorites().unwrap().len(), 2);

        db.remove_favorite("https://media.test/a.gif").unwrap();

        assert!(!db.is_favorite("https://media.test/a.gif").unwrap());
        let remaining = db.get_all_favorites().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].url, "https://media.test/b.gif");
        assert_eq!(remaining[0].source, "Unknown");
    }

    #[test]
    fn adding_same_url_twice_keeps_one_row() {
        let dir = tempdir().unwrap();
        let db = test_db(&dir);

        db.add_favorite(&gif("https://media.test/a.gif", "a.com"))
            .unwrap();
        db.add_favorite(&gif("https://media.test/a.gif", "b.com"))
            .unwrap();

        let favorites = db.get_all_favorites().unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].source, "b.com");
    }

    #[test]
    fn favorite_converts_back_to_gif_image() {
        let favorite = FavoriteGif::from(gif("https://media.test/a.gif", "a.com"));
        let back = GifImage::from(favorite);

        assert_eq!(back, gif("https://media.test/a.gif", "a.com"));
    }
}
