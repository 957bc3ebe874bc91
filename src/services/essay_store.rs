//! 批改记录存储 - 业务能力层
//!
//! 只负责"保存一条批改记录 / 读取最近的记录"，不关心批改流程

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, error};

use crate::error::StoreError;
use crate::infrastructure::Database;
use crate::models::essay::{EssayRecord, NewEssay};

/// 批改记录存储
#[async_trait]
pub trait EssayStore: Send + Sync {
    /// 写入一条完整记录并返回生成的ID
    ///
    /// 要么整条记录写入成功，要么什么都不写
    async fn insert(&self, essay: &NewEssay) -> Result<i64, StoreError>;

    /// 最近的 `limit` 条记录，新的在前
    async fn list_recent(&self, limit: usize) -> Result<Vec<EssayRecord>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<EssayRecord>, StoreError>;
}

/// 基于 SQLite 的存储
#[derive(Debug, Clone)]
pub struct SqliteEssayStore {
    db: Database,
}

impl SqliteEssayStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, student_id, original_text, corrected_text, feedback, \
     model_name, latency_ms, created_at FROM essays";

#[async_trait]
impl EssayStore for SqliteEssayStore {
    async fn insert(&self, essay: &NewEssay) -> Result<i64, StoreError> {
        let essay = essay.clone();
        let latency_ms = i64::try_from(essay.latency_ms).map_err(|_| StoreError::LatencyOutOfRange {
            latency_ms: essay.latency_ms,
        })?;
        let result = self
            .db
            .run(move |conn| {
                let tx = conn.transaction().map_err(StoreError::Insert)?;
                tx.execute(
                    "INSERT INTO essays (student_id, original_text, corrected_text, feedback, model_name, latency_ms, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        essay.student_id,
                        essay.original_text,
                        essay.corrected_text,
                        essay.feedback,
                        essay.model_name,
                        latency_ms,
                        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
                    ],
                )
                .map_err(StoreError::Insert)?;
                let id = tx.last_insert_rowid();
                // 未提交的事务在 drop 时回滚
                tx.commit().map_err(StoreError::Insert)?;
                Ok(id)
            })
            .await;

        match &result {
            Ok(id) => debug!("✓ 批改记录已保存，ID: {}", id),
            Err(e) => error!("❌ 批改记录保存失败: {}", e),
        }
        result
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<EssayRecord>, StoreError> {
        self.db
            .run(move |conn| {
                let sql = format!("{} ORDER BY created_at DESC, id DESC LIMIT ?1", SELECT_COLUMNS);
                let mut stmt = conn.prepare(&sql).map_err(StoreError::Query)?;
                let rows = stmt
                    .query_map(params![limit as i64], RawRow::from_row)
                    .map_err(StoreError::Query)?;

                let mut records = Vec::new();
                for row in rows {
                    records.push(row.map_err(StoreError::Query)?.into_record()?);
                }
                Ok(records)
            })
            .await
    }

    async fn get(&self, id: i64) -> Result<Option<EssayRecord>, StoreError> {
        self.db
            .run(move |conn| {
                let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
                conn.query_row(&sql, params![id], RawRow::from_row)
                    .optional()
                    .map_err(StoreError::Query)?
                    .map(RawRow::into_record)
                    .transpose()
            })
            .await
    }
}

/// 数据库中的一行，尚未校验
struct RawRow {
    id: i64,
    student_id: Option<String>,
    original_text: String,
    corrected_text: String,
    feedback: String,
    model_name: String,
    latency_ms: i64,
    created_at: String,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            student_id: row.get(1)?,
            original_text: row.get(2)?,
            corrected_text: row.get(3)?,
            feedback: row.get(4)?,
            model_name: row.get(5)?,
            latency_ms: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    fn into_record(self) -> Result<EssayRecord, StoreError> {
        let latency_ms = u64::try_from(self.latency_ms).map_err(|_| StoreError::CorruptRow {
            id: self.id,
            reason: format!("negative latency {}", self.latency_ms),
        })?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| StoreError::CorruptRow {
                id: self.id,
                reason: format!("bad created_at '{}': {}", self.created_at, e),
            })?
            .with_timezone(&Utc);

        Ok(EssayRecord {
            id: self.id,
            student_id: self.student_id,
            original_text: self.original_text,
            corrected_text: self.corrected_text,
            feedback: self.feedback,
            model_name: self.model_name,
            latency_ms,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn essay(student: Option<&str>, text: &str) -> NewEssay {
        NewEssay {
            student_id: student.map(str::to_string),
            original_text: text.to_string(),
            corrected_text: format!("{} (fixed)", text),
            feedback: "Fixed grammar and clarity.".to_string(),
            model_name: "google/flan-t5-base".to_string(),
            latency_ms: 1234,
        }
    }

    fn open_store(dir: &tempfile::TempDir) -> SqliteEssayStore {
        let db = Database::new(dir.path().join("essays.db"));
        db.init_schema().unwrap();
        SqliteEssayStore::new(db)
    }

    #[tokio::test]
    async fn test_insert_then_list_recent_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let submitted = essay(Some("s-1"), "I has a apple.");

        let before = Utc::now();
        let id = store.insert(&submitted).await.unwrap();

        let recent = store.list_recent(1).await.unwrap();
        assert_eq!(recent.len(), 1);
        let record = &recent[0];
        assert_eq!(record.id, id);
        assert_eq!(record.student_id, submitted.student_id);
        assert_eq!(record.original_text, submitted.original_text);
        assert_eq!(record.corrected_text, submitted.corrected_text);
        assert_eq!(record.feedback, submitted.feedback);
        assert_eq!(record.model_name, submitted.model_name);
        assert_eq!(record.latency_ms, submitted.latency_ms);
        assert!(record.created_at >= before - chrono::Duration::seconds(1));
    }

    #[tokio::test]
    async fn test_list_recent_is_newest_first_and_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(store.insert(&essay(Some("s"), &format!("essay {}", i))).await.unwrap());
        }

        let recent = store.list_recent(3).await.unwrap();
        let got: Vec<i64> = recent.iter().map(|r| r.id).collect();
        assert_eq!(got, vec![ids[4], ids[3], ids[2]]);

        assert_eq!(store.list_recent(100).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let a = store.insert(&essay(None, "a")).await.unwrap();
        let b = store.insert(&essay(None, "b")).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let id = store.insert(&essay(None, "anonymous")).await.unwrap();

        let record = store.get(id).await.unwrap().unwrap();
        assert_eq!(record.student_id, None);
        assert_eq!(record.original_text, "anonymous");
        assert!(store.get(id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_without_schema_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteEssayStore::new(Database::new(dir.path().join("empty.db")));

        let err = store.insert(&essay(Some("s"), "x")).await.unwrap_err();
        assert!(matches!(err, StoreError::Insert(_)));
    }

    #[tokio::test]
    async fn test_latency_beyond_column_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let mut too_slow = essay(Some("s"), "x");
        too_slow.latency_ms = u64::MAX;
        let err = store.insert(&too_slow).await.unwrap_err();
        assert!(matches!(err, StoreError::LatencyOutOfRange { latency_ms: u64::MAX }));
        assert!(store.list_recent(10).await.unwrap().is_empty());

        let mut widest = essay(Some("s"), "y");
        widest.latency_ms = i64::MAX as u64;
        let id = store.insert(&widest).await.unwrap();
        assert_eq!(store.get(id).await.unwrap().unwrap().latency_ms, i64::MAX as u64);
    }
}
