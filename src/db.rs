//! SQLite database with Diesel ORM
//!
//! Stores one row per verdict ("job") so results can be looked up later by
//! id or by content hash. The schema is created on open.

use crate::analyzer::DetectionResult;
use crate::schema::*;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use serde::{Serialize, Serializer};
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Diesel Models
// ============================================================================

/// Insertable job
#[derive(Insertable)]
#[diesel(table_name = jobs)]
pub struct NewJob<'a> {
    pub id: &'a str,
    pub content_type: &'a str,
    pub human: bool,
    pub confidence: f64,
    pub ai_score: f64,
    pub detectors: &'a str,
    pub content_hash: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// Queryable job (database record)
#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Serialize)]
#[diesel(table_name = jobs)]
pub struct Job {
    pub id: String,
    pub content_type: String,
    pub human: bool,
    pub confidence: f64,
    pub ai_score: f64,
    #[serde(serialize_with = "comma_list")]
    pub detectors: String,
    pub content_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Job {
    pub fn detector_list(&self) -> Vec<&str> {
        split_detectors(&self.detectors)
    }
}

fn split_detectors(joined: &str) -> Vec<&str> {
    joined.split(',').filter(|d| !d.is_empty()).collect()
}

fn comma_list<S: Serializer>(joined: &str, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    split_detectors(joined).serialize(serializer)
}

// ============================================================================
// Database Connection
// ============================================================================

type DbPool = Pool<ConnectionManager<SqliteConnection>>;
type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Database connection wrapper with connection pool
pub struct Database {
    pool: DbPool,
}

/// Error type for database operations
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] diesel::r2d2::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Helper for raw SQL avg query
#[derive(QueryableByName)]
struct AvgResult {
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Double>)]
    avg: Option<f64>,
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

impl Database {
    /// Open database at specified path
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let manager = ConnectionManager::<SqliteConnection>::new(&path_str);
        let pool = Pool::builder()
            .max_size(5)
            .build(manager)
            .map_err(|e| DbError::Connection(e.to_string()))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    fn get_conn(&self) -> Result<DbConn> {
        self.pool.get().map_err(|e| DbError::Connection(e.to_string()))
    }

    fn init_schema(&self) -> Result<()> {
        let mut conn = self.get_conn()?;

        diesel::sql_query(r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY NOT NULL,
                content_type TEXT NOT NULL,
                human INTEGER NOT NULL,
                confidence REAL NOT NULL,
                ai_score REAL NOT NULL,
                detectors TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
        "#).execute(&mut conn)?;

        diesel::sql_query("CREATE INDEX IF NOT EXISTS idx_jobs_hash ON jobs(content_hash)").execute(&mut conn)?;
        diesel::sql_query("CREATE INDEX IF NOT EXISTS idx_jobs_created_at ON jobs(created_at)").execute(&mut conn)?;

        Ok(())
    }

    /// Cheap round trip used by the health check
    pub fn ping(&self) -> Result<()> {
        let mut conn = self.get_conn()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }

    // ========================================================================
    // Jobs
    // ========================================================================

    /// Store a verdict under a fresh id
    pub fn create_job(&self, result: &DetectionResult) -> Result<Job> {
        let mut conn = self.get_conn()?;
        let now = timestamp();
        let id = uuid::Uuid::new_v4().simple().to_string();
        let detectors = result.detectors.join(",");

        let new_job = NewJob {
            id: &id,
            content_type: result.content_type.as_str(),
            human: result.human,
            confidence: result.confidence,
            ai_score: result.ai_score,
            detectors: &detectors,
            content_hash: &result.content_hash,
            created_at: &now,
            updated_at: &now,
        };

        diesel::insert_into(jobs::table)
            .values(&new_job)
            .execute(&mut conn)?;

        Ok(Job {
            id,
            content_type: result.content_type.as_str().to_string(),
            human: result.human,
            confidence: result.confidence,
            ai_score: result.ai_score,
            detectors,
            content_hash: result.content_hash.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub fn get_job(&self, id: &str) -> Result<Option<Job>> {
        let mut conn = self.get_conn()?;

        let job = jobs::table
            .find(id)
            .select(Job::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(job)
    }

    /// Most recent job for a content hash
    pub fn find_by_hash(&self, hash: &str) -> Result<Option<Job>> {
        let mut conn = self.get_conn()?;

        let job = jobs::table
            .filter(jobs::content_hash.eq(hash))
            .order(jobs::created_at.desc())
            .select(Job::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(job)
    }

    pub fn recent_jobs(&self, limit: i64) -> Result<Vec<Job>> {
        let mut conn = self.get_conn()?;

        let recent = jobs::table
            .order(jobs::created_at.desc())
            .limit(limit)
            .select(Job::as_select())
            .load(&mut conn)?;

        Ok(recent)
    }

    /// Get summary statistics
    pub fn get_summary(&self) -> Result<DbSummary> {
        let mut conn = self.get_conn()?;

        let total: i64 = jobs::table.count().get_result(&mut conn)?;

        let human_count: i64 = jobs::table
            .filter(jobs::human.eq(true))
            .count()
            .get_result(&mut conn)?;

        // Use raw SQL for avg since Diesel's avg returns Numeric type
        let avg_ai_score: Option<f64> = diesel::sql_query("SELECT AVG(ai_score) as avg FROM jobs")
            .get_result::<AvgResult>(&mut conn)
            .ok()
            .and_then(|r| r.avg);

        Ok(DbSummary {
            total,
            human_count,
            ai_count: total - human_count,
            avg_ai_score,
        })
    }

    /// Delete every job
    pub fn clear(&self) -> Result<usize> {
        let mut conn = self.get_conn()?;
        let count = diesel::delete(jobs::table).execute(&mut conn)?;
        Ok(count)
    }
}

// ============================================================================
// Additional Types
// ============================================================================

/// Summary statistics from the database
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbSummary {
    pub total: i64,
    pub human_count: i64,
    pub ai_count: i64,
    pub avg_ai_score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ContentCategory;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(dir.path().join("jobs.db")).unwrap();
        (dir, db)
    }

    fn verdict(ai_score: f64, hash: &str) -> DetectionResult {
        DetectionResult {
            id: None,
            human: ai_score < 0.5,
            confidence: (ai_score - 0.5).abs() * 2.0,
            content_type: ContentCategory::Text,
            ai_score,
            detectors: vec!["humanmark".to_string(), "hive".to_string()],
            content_hash: hash.to_string(),
            processing_time_ms: 3,
            details: None,
        }
    }

    // ==========================================================================
    // JOB ROUND TRIP TESTS
    // ==========================================================================

    #[test]
    fn test_create_and_get_job() {
        let (_dir, db) = open_temp();
        let created = db.create_job(&verdict(0.8, "abc")).unwrap();

        assert_eq!(created.id.len(), 32);
        assert!(!created.id.contains('-'));

        let fetched = db.get_job(&created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(!fetched.human);
        assert_eq!(fetched.content_type, "text");
        assert_eq!(fetched.detector_list(), vec!["humanmark", "hive"]);
    }

    #[test]
    fn test_unknown_id_is_none() {
        let (_dir, db) = open_temp();
        assert!(db.get_job("does-not-exist").unwrap().is_none());
    }

    #[test]
    fn test_find_by_hash_returns_latest() {
        let (_dir, db) = open_temp();
        let _first = db.create_job(&verdict(0.2, "same")).unwrap();
        let second = db.create_job(&verdict(0.3, "same")).unwrap();
        db.create_job(&verdict(0.9, "other")).unwrap();

        let found = db.find_by_hash("same").unwrap().unwrap();
        assert_eq!(found.id, second.id);
        assert!(db.find_by_hash("missing").unwrap().is_none());
    }

    #[test]
    fn test_recent_jobs_limit_and_order() {
        let (_dir, db) = open_temp();
        let ids: Vec<String> = (0..4)
            .map(|i| db.create_job(&verdict(0.1 * i as f64, &format!("h{}", i))).unwrap().id)
            .collect();

        let recent = db.recent_jobs(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, ids[3]);
        assert_eq!(recent[1].id, ids[2]);
    }

    #[test]
    fn test_summary_and_clear() {
        let (_dir, db) = open_temp();
        db.create_job(&verdict(0.2, "a")).unwrap();
        db.create_job(&verdict(0.4, "b")).unwrap();
        db.create_job(&verdict(0.9, "c")).unwrap();

        let summary = db.get_summary().unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.human_count, 2);
        assert_eq!(summary.ai_count, 1);
        assert!((summary.avg_ai_score.unwrap() - 0.5).abs() < 1e-9);

        assert_eq!(db.clear().unwrap(), 3);
        let empty = db.get_summary().unwrap();
        assert_eq!(empty.total, 0);
        assert_eq!(empty.avg_ai_score, None);
    }

    #[test]
    fn test_ping() {
        let (_dir, db) = open_temp();
        assert!(db.ping().is_ok());
    }

    #[test]
    fn test_job_serializes_detectors_as_list() {
        let (_dir, db) = open_temp();
        let job = db.create_job(&verdict(0.7, "x")).unwrap();
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["detectors"], serde_json::json!(["humanmark", "hive"]));
        assert_eq!(json["human"], false);
    }
}
