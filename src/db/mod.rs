use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::{Connection, Transaction};
use tokio::sync::oneshot;

pub mod error;
pub mod helpers;
pub mod migrations;
pub mod models;
pub mod naming;
pub mod repositories;
pub mod schema;

use crate::config::{DeletePolicy, StoreConfig};
use migrations::run_migrations;

pub use error::StoreError;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to send shutdown to DB thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

/// Handle to the camp database.
///
/// The SQLite connection lives on a dedicated worker thread; every call is
/// shipped there as a closure, so requests are serialized and each mutation
/// runs inside its own transaction (see [`Database::transact`]).
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
    db_path: Arc<PathBuf>,
    delete_policy: DeletePolicy,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        Self::open(&StoreConfig {
            database_path: db_path,
            ..StoreConfig::default()
        })
    }

    /// Private in-memory database, mostly useful in tests.
    pub fn in_memory() -> Result<Self> {
        Self::new(PathBuf::from(":memory:"))
    }

    pub fn open(config: &StoreConfig) -> Result<Self> {
        let db_path = config.database_path.clone();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();
        let journal_mode = config.journal_mode.clone();

        let worker = thread::Builder::new()
            .name("camp-db".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", &journal_mode) {
                    error!("Failed to set journal mode {journal_mode}: {err}");
                }
                if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
                    error!("Failed to enable foreign keys: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run database migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("DB initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        DbCommand::Shutdown => break,
                    }
                }

                info!("Database thread shutting down");
            })
            .with_context(|| "failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Database initialized at {}", db_path.as_path().display());

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: Arc::new(db_path),
            delete_policy: config.delete_policy,
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to DB thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }

    /// Run `task` as one unit of work; any error rolls the whole task back.
    pub async fn transact<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open transaction")?;
            let output = task(&tx)?;
            tx.commit().context("failed to commit transaction")?;
            Ok(output)
        })
        .await
    }

    /// Row counts for `(activities, campers, signups)`.
    pub async fn table_counts(&self) -> Result<(i64, i64, i64)> {
        self.execute(|conn| {
            let count = |table: &str| -> Result<i64> {
                conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
                .with_context(|| format!("failed to count {table}"))
            };
            Ok((count("activities")?, count("campers")?, count("signups")?))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_file_database_and_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("camp.sqlite3");

        let db = Database::new(path.clone()).unwrap();
        assert_eq!(db.path(), path.as_path());
        assert!(path.exists());
        assert_eq!(db.table_counts().await.unwrap(), (0, 0, 0));
    }

    #[tokio::test]
    async fn transact_rolls_back_on_error() {
        let db = Database::in_memory().unwrap();
        let result: Result<()> = db
            .transact(|tx| {
                tx.execute(
                    "INSERT INTO activities (name, difficulty, created_at, updated_at)
                     VALUES ('Archery', 2, 'x', 'x')",
                    [],
                )?;
                Err(anyhow!("abort"))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(db.table_counts().await.unwrap(), (0, 0, 0));
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = Database::in_memory().unwrap();
        let err = db
            .execute(|conn| {
                conn.execute(
                    "INSERT INTO signups (time, camper_id, activity_id) VALUES (9, 1, 1)",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("FOREIGN KEY"));
    }
}
