//! sqlite-backed edge store.
//!
//! The store is an append log: every `ref` the extractor resolves becomes one row in `links`,
//! duplicates included. Deduplication happens when the backlink injector reads it back.

use crate::error::NotelinksError;
use futures_core::future::BoxFuture;
use sqlx::{
    error::BoxDynError,
    migrate::{MigrateDatabase, Migration as SqlxMigration, MigrationSource, MigrationType, Migrator},
    pool::PoolOptions,
    sqlite::{Sqlite, SqliteConnectOptions},
    ConnectOptions, Pool, Row,
};
use std::{
    path::{Path, PathBuf},
    result::Result,
    str::FromStr,
};

pub const IN_MEMORY_DB: &str = ":memory:";

/// A directed reference from one note to another.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, sqlx::FromRow)]
pub struct Edge {
    #[sqlx(rename = "from")]
    pub from_path: String,
    pub from_title: String,
    #[sqlx(rename = "to")]
    pub to_path: String,
}

/// One distinct referrer of a note, as shown in its backlinks section.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Backlink {
    #[sqlx(rename = "from")]
    pub from_path: String,
    pub from_title: String,
}

#[derive(Debug, Clone)]
pub struct LinkStore(pub Pool<Sqlite>);

impl LinkStore {
    /// Opens (creating if needed) the store at `db_path` and brings its schema up to date.
    pub async fn open<P: AsRef<Path>>(db_path: P) -> Result<LinkStore, NotelinksError> {
        Ok(LinkStore(db_init(db_path.as_ref().to_path_buf()).await?))
    }

    pub async fn in_memory() -> Result<LinkStore, NotelinksError> {
        Self::open(IN_MEMORY_DB).await
    }

    /// Empties `links` and restarts its id sequence, so a run never sees edges from an earlier
    /// one.
    #[tracing::instrument(skip(self))]
    pub async fn reset(&self) -> Result<(), NotelinksError> {
        let mut tx = self.0.begin().await?;
        sqlx::query("DELETE FROM links").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'links'")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::debug!("Link store cleared");
        Ok(())
    }

    /// Appends one edge. The row is committed before this returns.
    pub async fn insert_edge(&self, edge: &Edge) -> Result<i64, NotelinksError> {
        let result =
            sqlx::query(r#"INSERT INTO links ("from", from_title, "to") VALUES (?, ?, ?)"#)
                .bind(&edge.from_path)
                .bind(&edge.from_title)
                .bind(&edge.to_path)
                .execute(&self.0)
                .await
                .map_err(|e| {
                    tracing::error!(
                        "[LinkStore.insert_edge] SQL error storing {:?}\n\terror: {}",
                        edge,
                        e
                    );
                    e
                })?;
        Ok(result.last_insert_rowid())
    }

    /// Every distinct referenced path, ordered by when it was first referenced.
    pub async fn distinct_targets(&self) -> Result<Vec<String>, NotelinksError> {
        let rows = sqlx::query(
            r#"SELECT "to", MIN(id) AS first_seen FROM links GROUP BY "to" ORDER BY first_seen"#,
        )
        .fetch_all(&self.0)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| row.get::<String, _>("to"))
            .collect())
    }

    /// Every distinct `(from, from_title)` pair referencing `to_path`, ordered by when the pair
    /// was first recorded.
    pub async fn backlinks_for(&self, to_path: &str) -> Result<Vec<Backlink>, NotelinksError> {
        let rows = sqlx::query_as::<_, Backlink>(
            r#"SELECT "from", COALESCE(from_title, '') AS from_title, MIN(id) AS first_seen
               FROM links WHERE "to" = ?
               GROUP BY "from", from_title
               ORDER BY first_seen"#,
        )
        .bind(to_path)
        .fetch_all(&self.0)
        .await?;
        Ok(rows)
    }

    /// All recorded edges in insertion order, duplicates included.
    pub async fn edges(&self) -> Result<Vec<Edge>, NotelinksError> {
        let rows = sqlx::query_as::<_, Edge>(
            r#"SELECT "from", COALESCE(from_title, '') AS from_title, "to" FROM links ORDER BY id"#,
        )
        .fetch_all(&self.0)
        .await?;
        Ok(rows)
    }

    pub async fn edge_count(&self) -> Result<u64, NotelinksError> {
        let row = sqlx::query("SELECT COUNT(*) FROM links")
            .fetch_one(&self.0)
            .await?;
        Ok(row.get::<i64, usize>(0) as u64)
    }

    pub async fn close(self) {
        self.0.close().await;
    }
}

/// A migration definition.
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub sql: &'static str,
    pub kind: MigrationType,
}

#[derive(Debug, Clone)]
struct MigrationList(Vec<Migration>);

impl MigrationSource<'static> for MigrationList {
    fn resolve(self) -> BoxFuture<'static, Result<Vec<SqlxMigration>, BoxDynError>> {
        Box::pin(async move {
            let mut migrations = Vec::new();
            for migration in self.0 {
                if matches!(migration.kind, MigrationType::ReversibleUp) {
                    migrations.push(SqlxMigration::new(
                        migration.version,
                        migration.description.into(),
                        migration.kind,
                        migration.sql.into(),
                        false,
                    ));
                }
            }
            Ok(migrations)
        })
    }
}

fn migrations() -> MigrationList {
    MigrationList(vec![Migration {
        version: 1,
        description: "create_links_table",
        sql: r#"
            CREATE TABLE IF NOT EXISTS links (
                id INTEGER UNIQUE NOT NULL PRIMARY KEY AUTOINCREMENT,
                "from" TEXT NOT NULL,
                from_title TEXT,
                "to" TEXT NOT NULL,
                to_title TEXT
            );
            CREATE INDEX IF NOT EXISTS links_to ON links ("to");"#,
        kind: MigrationType::ReversibleUp,
    }])
}

pub async fn db_init(db_path: PathBuf) -> Result<Pool<Sqlite>, NotelinksError> {
    let in_memory = db_path.as_os_str() == IN_MEMORY_DB;
    let fqdb = if in_memory {
        "sqlite::memory:".to_string()
    } else {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        format!("sqlite:{}", db_path.to_string_lossy())
    };
    tracing::debug!("Initializing link store from: {:?}", fqdb);
    if !in_memory && !Sqlite::database_exists(&fqdb).await.unwrap_or(false) {
        Sqlite::create_database(&fqdb).await?;
    }
    let options = SqliteConnectOptions::from_str(&fqdb)?
        .read_only(false)
        .disable_statement_logging()
        .create_if_missing(true);

    // Every connection to `sqlite::memory:` is its own database, so the pool is kept to one
    // connection. The run is sequential anyway.
    let pool = PoolOptions::<Sqlite>::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    let migrator = Migrator::new(migrations()).await?;
    migrator.run(&pool).await?;

    let count_res = sqlx::query("SELECT COUNT(*) AS lcount FROM links;")
        .fetch_one(&pool)
        .await?;
    tracing::info!(
        "Link store initialized. Stored edge count: {}",
        count_res.get::<i64, usize>(0)
    );

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: &str, title: &str, to: &str) -> Edge {
        Edge {
            from_path: from.to_string(),
            from_title: title.to_string(),
            to_path: to.to_string(),
        }
    }

    #[tokio::test]
    async fn duplicates_are_stored_but_read_back_once() {
        let store = LinkStore::in_memory().await.unwrap();
        store
            .insert_edge(&edge("/notes/a.md", "A", "/notes/b.md"))
            .await
            .unwrap();
        store
            .insert_edge(&edge("/notes/a.md", "A", "/notes/b.md"))
            .await
            .unwrap();
        store
            .insert_edge(&edge("/notes/c.md", "C", "/notes/b.md"))
            .await
            .unwrap();

        assert_eq!(store.edge_count().await.unwrap(), 3);
        assert_eq!(store.distinct_targets().await.unwrap(), vec!["/notes/b.md"]);
        let backlinks = store.backlinks_for("/notes/b.md").await.unwrap();
        assert_eq!(
            backlinks,
            vec![
                Backlink {
                    from_path: "/notes/a.md".to_string(),
                    from_title: "A".to_string()
                },
                Backlink {
                    from_path: "/notes/c.md".to_string(),
                    from_title: "C".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn enumeration_follows_first_insertion() {
        let store = LinkStore::in_memory().await.unwrap();
        for (from, to) in [
            ("/notes/z.md", "/notes/t2.md"),
            ("/notes/m.md", "/notes/t1.md"),
            ("/notes/a.md", "/notes/t2.md"),
            ("/notes/z.md", "/notes/t2.md"),
        ] {
            store.insert_edge(&edge(from, from, to)).await.unwrap();
        }
        assert_eq!(
            store.distinct_targets().await.unwrap(),
            vec!["/notes/t2.md", "/notes/t1.md"]
        );
        let froms: Vec<String> = store
            .backlinks_for("/notes/t2.md")
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.from_path)
            .collect();
        assert_eq!(froms, vec!["/notes/z.md", "/notes/a.md"]);
    }

    #[tokio::test]
    async fn reset_clears_edges_and_ids() {
        let store = LinkStore::in_memory().await.unwrap();
        let first = store
            .insert_edge(&edge("/notes/a.md", "A", "/notes/b.md"))
            .await
            .unwrap();
        store
            .insert_edge(&edge("/notes/a.md", "A", "/notes/c.md"))
            .await
            .unwrap();
        store.reset().await.unwrap();
        assert_eq!(store.edge_count().await.unwrap(), 0);
        assert!(store.distinct_targets().await.unwrap().is_empty());

        let again = store
            .insert_edge(&edge("/notes/a.md", "A", "/notes/b.md"))
            .await
            .unwrap();
        assert_eq!(first, again);
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("logs").join("relations.db");
        {
            let store = LinkStore::open(&db_path).await.unwrap();
            store
                .insert_edge(&edge("/notes/a.md", "A", "/notes/b.md"))
                .await
                .unwrap();
            store.close().await;
        }
        let store = LinkStore::open(&db_path).await.unwrap();
        assert_eq!(
            store.edges().await.unwrap(),
            vec![edge("/notes/a.md", "A", "/notes/b.md")]
        );
    }
}
