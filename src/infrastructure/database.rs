//! SQLite 数据库 - 基础设施层
//!
//! 持有数据库位置，只暴露"在一个独立连接上执行操作"的能力

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::StoreError;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS essays (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id     TEXT,
        original_text  TEXT NOT NULL,
        corrected_text TEXT NOT NULL,
        feedback       TEXT NOT NULL,
        model_name     TEXT NOT NULL,
        latency_ms     INTEGER NOT NULL CHECK (latency_ms >= 0),
        created_at     TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_essays_created_at ON essays (created_at);
";

/// 数据库句柄
///
/// 不持有连接：每次操作都打开自己的连接，操作结束（无论成功、失败还是 panic）即释放，
/// 并发请求之间不共享连接
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 打开一个新连接
    pub fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path).map_err(|source| StoreError::Open {
            path: self.path.display().to_string(),
            source,
        })?;

        conn.execute_batch(
            "
            PRAGMA busy_timeout = 5000;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )
        .map_err(|source| StoreError::Open {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(conn)
    }

    /// 建表（幂等）
    pub fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute_batch(SCHEMA).map_err(StoreError::Schema)?;
        info!("✓ 数据库已就绪 (essays 表): {}", self.path.display());
        Ok(())
    }

    /// 在阻塞线程池中用一个独立连接执行操作
    pub async fn run<F, T>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = db.connect()?;
            debug!("已打开数据库连接: {}", db.path.display());
            op(&mut conn)
        })
        .await?
    }
}
