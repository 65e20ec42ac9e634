use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::fs;
use std::path::Path;
use steplog_core::common::TimeRange;
use steplog_core::health::entity::{Sample, SampleId, SampleKind};
use steplog_core::store::error::StoreError;
use steplog_core::store::port::HealthStore;
use tracing::debug;
use uuid::Uuid;

/// 默认样本数据库文件名
const DEFAULT_HEALTH_DB: &str = "health.db";

type SampleRow = (String, String, DateTime<Utc>, DateTime<Utc>, f64, String);

/// HealthStore 的 SQLite 实现。
///
/// # Summary
/// 在数据目录下的 `health.db` 中保存全部样本。
///
/// # Invariants
/// * 表结构在实例创建时初始化。
/// * 批量删除在单个事务内完成，要么全部生效，要么全部回滚。
/// * 查询结果按写入顺序返回。
pub struct SqliteHealthStore {
    pool: SqlitePool,
}

impl SqliteHealthStore {
    /// 在 `root` 目录下打开 (必要时创建) 样本数据库并初始化表结构。
    ///
    /// # Logic
    /// 1. 确保 `root` 目录存在。
    /// 2. 配置 SQLite 连接选项，开启 `create_if_missing`。
    /// 3. 连接数据库并执行 DDL。
    ///
    /// # Arguments
    /// * `root` - 数据目录。
    ///
    /// # Returns
    /// * `Result<Self, StoreError>` - 存储实例或初始化错误。
    pub async fn open(root: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(root).map_err(|e| StoreError::InitError(e.to_string()))?;

        let options = SqliteConnectOptions::new()
            .filename(root.join(DEFAULT_HEALTH_DB))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS samples (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                start_time DATETIME NOT NULL,
                end_time DATETIME NOT NULL,
                quantity REAL NOT NULL,
                source_name TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_samples_kind_start ON samples (kind, start_time);
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::InitError(e.to_string()))?;

        Ok(Self { pool })
    }

    fn decode(row: SampleRow) -> Result<Sample, StoreError> {
        let id = Uuid::parse_str(&row.0).map_err(|e| StoreError::Database(e.to_string()))?;
        let kind = row
            .1
            .parse::<SampleKind>()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(Sample {
            id: SampleId(id),
            kind,
            start_time: row.2,
            end_time: row.3,
            quantity: row.4,
            source_name: row.5,
        })
    }
}

#[async_trait]
impl HealthStore for SqliteHealthStore {
    /// # Logic
    /// 按 `kind` 与 `start_time ∈ [start, end)` 查询，按 rowid 升序返回。
    async fn query(&self, kind: SampleKind, range: &TimeRange) -> Result<Vec<Sample>, StoreError> {
        let rows = sqlx::query_as::<_, SampleRow>(
            r#"
            SELECT id, kind, start_time, end_time, quantity, source_name
            FROM samples
            WHERE kind = ? AND start_time >= ? AND start_time < ?
            ORDER BY rowid ASC
            "#,
        )
        .bind(kind.to_string())
        .bind(range.start())
        .bind(range.end())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!("Loaded {} {} samples from sqlite", rows.len(), kind);
        rows.into_iter().map(Self::decode).collect()
    }

    /// # Logic
    /// 1. 开启事务。
    /// 2. 逐条按 id 删除并累计受影响行数。
    /// 3. 提交事务；任一步失败则事务随 drop 回滚。
    async fn delete(&self, samples: &[Sample]) -> Result<usize, StoreError> {
        if samples.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut removed: u64 = 0;
        for sample in samples {
            let result = sqlx::query("DELETE FROM samples WHERE id = ?")
                .bind(sample.id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;
            removed += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(usize::try_from(removed).unwrap_or(usize::MAX))
    }

    async fn save(&self, sample: &Sample) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO samples (id, kind, start_time, end_time, quantity, source_name)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(sample.id.to_string())
        .bind(sample.kind.to_string())
        .bind(sample.start_time)
        .bind(sample.end_time)
        .bind(sample.quantity)
        .bind(&sample.source_name)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}
