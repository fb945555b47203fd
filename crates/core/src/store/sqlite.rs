//! SQLite-backed catalog store implementation.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{CatalogStore, StoreError};
use crate::account::{User, UserId, UserRole};
use crate::podcast::{
    CatalogStats, Episode, EpisodeId, Podcast, PodcastId, PodcastRelations, Review,
    DEFAULT_PODCAST_RATING,
};

const PODCAST_COLUMNS: &str = "id, title, category, rating, created_at, updated_at";
const EPISODE_COLUMNS: &str = "id, podcast_id, title, category, created_at, updated_at";
const REVIEW_COLUMNS: &str = "id, podcast_id, created_by, rating, comment, created_at, updated_at";
const USER_COLUMNS: &str = "id, email, password_hash, role, created_at, updated_at";

/// SQLite-backed catalog store.
pub struct SqliteCatalogStore {
    conn: Mutex<Connection>,
}

impl SqliteCatalogStore {
    /// Create a new SQLite store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(map_db)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(map_db)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS podcasts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                category TEXT NOT NULL,
                rating INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_podcasts_title ON podcasts(title);

            CREATE TABLE IF NOT EXISTS episodes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                podcast_id INTEGER NOT NULL REFERENCES podcasts(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                category TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_episodes_podcast ON episodes(podcast_id);

            CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                podcast_id INTEGER NOT NULL REFERENCES podcasts(id) ON DELETE CASCADE,
                created_by INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                rating INTEGER NOT NULL CHECK (rating BETWEEN 0 AND 5),
                comment TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reviews_podcast ON reviews(podcast_id);

            -- Many-to-many relations; the composite key makes each a set.
            CREATE TABLE IF NOT EXISTS subscriptions (
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                podcast_id INTEGER NOT NULL REFERENCES podcasts(id) ON DELETE CASCADE,
                PRIMARY KEY (user_id, podcast_id)
            );

            CREATE TABLE IF NOT EXISTS watched_episodes (
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                episode_id INTEGER NOT NULL REFERENCES episodes(id) ON DELETE CASCADE,
                PRIMARY KEY (user_id, episode_id)
            );
            "#,
        )
        .map_err(map_db)?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection mutex poisoned".to_string()))
    }

    fn row_to_podcast(row: &rusqlite::Row) -> rusqlite::Result<Podcast> {
        Ok(Podcast {
            id: row.get(0)?,
            title: row.get(1)?,
            category: row.get(2)?,
            rating: row.get(3)?,
            created_at: parse_timestamp(&row.get::<_, String>(4)?),
            updated_at: parse_timestamp(&row.get::<_, String>(5)?),
            episodes: None, // Loaded separately
            reviews: None,  // Loaded separately
        })
    }

    fn row_to_episode(row: &rusqlite::Row) -> rusqlite::Result<Episode> {
        Ok(Episode {
            id: row.get(0)?,
            podcast_id: row.get(1)?,
            title: row.get(2)?,
            category: row.get(3)?,
            created_at: parse_timestamp(&row.get::<_, String>(4)?),
            updated_at: parse_timestamp(&row.get::<_, String>(5)?),
        })
    }

    fn row_to_review(row: &rusqlite::Row) -> rusqlite::Result<Review> {
        Ok(Review {
            id: row.get(0)?,
            podcast_id: row.get(1)?,
            created_by: row.get(2)?,
            rating: row.get(3)?,
            comment: row.get(4)?,
            created_at: parse_timestamp(&row.get::<_, String>(5)?),
            updated_at: parse_timestamp(&row.get::<_, String>(6)?),
        })
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let role_str: String = row.get(3)?;
        let role = role_str.parse::<UserRole>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
            )
        })?;

        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            role,
            created_at: parse_timestamp(&row.get::<_, String>(4)?),
            updated_at: parse_timestamp(&row.get::<_, String>(5)?),
        })
    }

    /// Run a query and collect every mapped row.
    fn collect<T>(
        conn: &Connection,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
        map: fn(&rusqlite::Row) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, StoreError> {
        let mut stmt = conn.prepare(sql).map_err(map_db)?;
        let rows = stmt.query_map(params, map).map_err(map_db)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row.map_err(map_db)?);
        }
        Ok(items)
    }

    fn load_episodes(conn: &Connection, podcast_id: PodcastId) -> Result<Vec<Episode>, StoreError> {
        let sql = format!(
            "SELECT {} FROM episodes WHERE podcast_id = ? ORDER BY id",
            EPISODE_COLUMNS
        );
        Self::collect(conn, &sql, &[&podcast_id], Self::row_to_episode)
    }

    fn load_reviews(conn: &Connection, podcast_id: PodcastId) -> Result<Vec<Review>, StoreError> {
        let sql = format!(
            "SELECT {} FROM reviews WHERE podcast_id = ? ORDER BY id",
            REVIEW_COLUMNS
        );
        Self::collect(conn, &sql, &[&podcast_id], Self::row_to_review)
    }

    fn load_ids(conn: &Connection, sql: &str, user_id: UserId) -> Result<BTreeSet<i64>, StoreError> {
        let ids = Self::collect(conn, sql, &[&user_id], |row| row.get::<_, i64>(0))?;
        Ok(ids.into_iter().collect())
    }

    fn count(conn: &Connection, table: &str) -> Result<u64, StoreError> {
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .map_err(map_db)?;
        Ok(count.max(0) as u64)
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn create_podcast(&self, title: &str, category: &str) -> Result<Podcast, StoreError> {
        let conn = self.conn()?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO podcasts (title, category, rating, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            params![title, category, DEFAULT_PODCAST_RATING, now.to_rfc3339(), now.to_rfc3339()],
        )
        .map_err(map_db)?;

        let id = conn.last_insert_rowid();
        debug!(podcast_id = id, "Inserted podcast");

        Ok(Podcast {
            id,
            title: title.to_string(),
            category: category.to_string(),
            rating: DEFAULT_PODCAST_RATING,
            created_at: now,
            updated_at: now,
            episodes: None,
            reviews: None,
        })
    }

    fn find_podcast(
        &self,
        id: PodcastId,
        relations: PodcastRelations,
    ) -> Result<Option<Podcast>, StoreError> {
        let conn = self.conn()?;

        let podcast = conn
            .query_row(
                &format!("SELECT {} FROM podcasts WHERE id = ?", PODCAST_COLUMNS),
                params![id],
                Self::row_to_podcast,
            )
            .optional()
            .map_err(map_db)?;

        let Some(mut podcast) = podcast else {
            return Ok(None);
        };

        if relations.episodes {
            podcast.episodes = Some(Self::load_episodes(&conn, id)?);
        }
        if relations.reviews {
            podcast.reviews = Some(Self::load_reviews(&conn, id)?);
        }

        Ok(Some(podcast))
    }

    fn list_podcasts(&self) -> Result<Vec<Podcast>, StoreError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM podcasts ORDER BY id", PODCAST_COLUMNS);
        Self::collect(&conn, &sql, &[], Self::row_to_podcast)
    }

    fn search_podcasts(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Podcast>, u64), StoreError> {
        let conn = self.conn()?;

        // instr() is case-sensitive, unlike LIKE on ASCII text
        let total: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM podcasts WHERE instr(title, ?) > 0",
                params![query],
                |row| row.get(0),
            )
            .map_err(map_db)?;

        let sql = format!(
            "SELECT {} FROM podcasts WHERE instr(title, ?) > 0 ORDER BY id LIMIT ? OFFSET ?",
            PODCAST_COLUMNS
        );
        let podcasts = Self::collect(&conn, &sql, &[&query, &limit, &offset], Self::row_to_podcast)?;

        Ok((podcasts, total.max(0) as u64))
    }

    fn save_podcast(&self, podcast: &Podcast) -> Result<Podcast, StoreError> {
        let conn = self.conn()?;
        let now = Utc::now();

        let updated = conn
            .execute(
                "UPDATE podcasts SET title = ?, category = ?, rating = ?, updated_at = ? WHERE id = ?",
                params![
                    podcast.title,
                    podcast.category,
                    podcast.rating,
                    now.to_rfc3339(),
                    podcast.id
                ],
            )
            .map_err(map_db)?;

        if updated == 0 {
            return Err(StoreError::NotFound(format!("podcast {}", podcast.id)));
        }

        Ok(Podcast {
            updated_at: now,
            ..podcast.clone()
        })
    }

    fn delete_podcast(&self, id: PodcastId) -> Result<(), StoreError> {
        let conn = self.conn()?;

        let deleted = conn
            .execute("DELETE FROM podcasts WHERE id = ?", params![id])
            .map_err(map_db)?;

        if deleted == 0 {
            return Err(StoreError::NotFound(format!("podcast {}", id)));
        }
        Ok(())
    }

    fn create_episode(
        &self,
        podcast_id: PodcastId,
        title: &str,
        category: &str,
    ) -> Result<Episode, StoreError> {
        let conn = self.conn()?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO episodes (podcast_id, title, category, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            params![podcast_id, title, category, now.to_rfc3339(), now.to_rfc3339()],
        )
        .map_err(map_db)?;

        Ok(Episode {
            id: conn.last_insert_rowid(),
            podcast_id,
            title: title.to_string(),
            category: category.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    fn find_episode(&self, id: EpisodeId) -> Result<Option<Episode>, StoreError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM episodes WHERE id = ?", EPISODE_COLUMNS),
            params![id],
            Self::row_to_episode,
        )
        .optional()
        .map_err(map_db)
    }

    fn list_episodes(&self, podcast_id: PodcastId) -> Result<Vec<Episode>, StoreError> {
        let conn = self.conn()?;
        Self::load_episodes(&conn, podcast_id)
    }

    fn save_episode(&self, episode: &Episode) -> Result<Episode, StoreError> {
        let conn = self.conn()?;
        let now = Utc::now();

        let updated = conn
            .execute(
                "UPDATE episodes SET title = ?, category = ?, updated_at = ? WHERE id = ?",
                params![episode.title, episode.category, now.to_rfc3339(), episode.id],
            )
            .map_err(map_db)?;

        if updated == 0 {
            return Err(StoreError::NotFound(format!("episode {}", episode.id)));
        }

        Ok(Episode {
            updated_at: now,
            ..episode.clone()
        })
    }

    fn delete_episode(&self, id: EpisodeId) -> Result<(), StoreError> {
        let conn = self.conn()?;

        let deleted = conn
            .execute("DELETE FROM episodes WHERE id = ?", params![id])
            .map_err(map_db)?;

        if deleted == 0 {
            return Err(StoreError::NotFound(format!("episode {}", id)));
        }
        Ok(())
    }

    fn create_review(
        &self,
        author: UserId,
        podcast_id: PodcastId,
        rating: i32,
        comment: &str,
    ) -> Result<Review, StoreError> {
        let conn = self.conn()?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO reviews (podcast_id, created_by, rating, comment, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
            params![podcast_id, author, rating, comment, now.to_rfc3339(), now.to_rfc3339()],
        )
        .map_err(map_db)?;

        Ok(Review {
            id: conn.last_insert_rowid(),
            podcast_id,
            created_by: author,
            rating,
            comment: comment.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    fn list_reviews(&self, podcast_id: PodcastId) -> Result<Vec<Review>, StoreError> {
        let conn = self.conn()?;
        Self::load_reviews(&conn, podcast_id)
    }

    fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, StoreError> {
        let conn = self.conn()?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            params![email, password_hash, role.as_str(), now.to_rfc3339(), now.to_rfc3339()],
        )
        .map_err(map_db)?;

        Ok(User {
            id: conn.last_insert_rowid(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: now,
            updated_at: now,
        })
    }

    fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
            params![id],
            Self::row_to_user,
        )
        .optional()
        .map_err(map_db)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
            params![email],
            Self::row_to_user,
        )
        .optional()
        .map_err(map_db)
    }

    fn subscription_ids(&self, user_id: UserId) -> Result<BTreeSet<PodcastId>, StoreError> {
        let conn = self.conn()?;
        Self::load_ids(
            &conn,
            "SELECT podcast_id FROM subscriptions WHERE user_id = ?",
            user_id,
        )
    }

    fn set_subscribed(
        &self,
        user_id: UserId,
        podcast_id: PodcastId,
        subscribed: bool,
    ) -> Result<(), StoreError> {
        let conn = self.conn()?;

        let sql = if subscribed {
            "INSERT OR IGNORE INTO subscriptions (user_id, podcast_id) VALUES (?, ?)"
        } else {
            "DELETE FROM subscriptions WHERE user_id = ? AND podcast_id = ?"
        };
        conn.execute(sql, params![user_id, podcast_id])
            .map_err(map_db)?;

        Ok(())
    }

    fn list_subscriptions(&self, user_id: UserId) -> Result<Vec<Podcast>, StoreError> {
        let conn = self.conn()?;
        let sql = "SELECT p.id, p.title, p.category, p.rating, p.created_at, p.updated_at \
                   FROM podcasts p JOIN subscriptions s ON s.podcast_id = p.id \
                   WHERE s.user_id = ? ORDER BY p.id";
        Self::collect(&conn, sql, &[&user_id], Self::row_to_podcast)
    }

    fn watched_episode_ids(&self, user_id: UserId) -> Result<BTreeSet<EpisodeId>, StoreError> {
        let conn = self.conn()?;
        Self::load_ids(
            &conn,
            "SELECT episode_id FROM watched_episodes WHERE user_id = ?",
            user_id,
        )
    }

    fn add_watched_episode(
        &self,
        user_id: UserId,
        episode_id: EpisodeId,
    ) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO watched_episodes (user_id, episode_id) VALUES (?, ?)",
            params![user_id, episode_id],
        )
        .map_err(map_db)?;
        Ok(())
    }

    fn list_watched_episodes(&self, user_id: UserId) -> Result<Vec<Episode>, StoreError> {
        let conn = self.conn()?;
        let sql = "SELECT e.id, e.podcast_id, e.title, e.category, e.created_at, e.updated_at \
                   FROM episodes e JOIN watched_episodes w ON w.episode_id = e.id \
                   WHERE w.user_id = ? ORDER BY e.id";
        Self::collect(&conn, sql, &[&user_id], Self::row_to_episode)
    }

    fn stats(&self) -> Result<CatalogStats, StoreError> {
        let conn = self.conn()?;
        Ok(CatalogStats {
            podcasts: Self::count(&conn, "podcasts")?,
            episodes: Self::count(&conn, "episodes")?,
            reviews: Self::count(&conn, "reviews")?,
            users: Self::count(&conn, "users")?,
        })
    }
}

/// Classify a rusqlite error. Constraint violations become [`StoreError::Conflict`].
fn map_db(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::SqliteFailure(ref err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::Conflict(e.to_string())
        }
        other => StoreError::Database(other.to_string()),
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    // Stored values are always RFC 3339; fall back to now on corrupt rows
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
