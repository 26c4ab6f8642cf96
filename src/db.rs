//! Direct PostgreSQL access using sqlx.
//!
//! Two roles share one tokio runtime: the catalog database holds the
//! report hierarchy and each report's query text, the report database runs
//! those queries (and anything typed into the custom query tab).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Column, FromRow, PgPool, Row, TypeInfo};
use tokio::runtime::Runtime;

use crate::error::{DbError, Result};
use crate::executor::QueryRunner;
use crate::report_tree::{CatalogRow, ReportId, ROOT_ID};
use crate::results::{CellValue, ResultTable};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Read access to the report catalog.
pub trait ReportCatalog {
    /// Every (id, label, parent) row, in table order.
    fn report_rows(&self) -> Result<Vec<CatalogRow>>;

    /// Query text of one report, `None` when the report does not exist.
    fn report_query(&self, id: ReportId) -> Result<Option<String>>;
}

/// Row returned from the catalog hierarchy query
#[derive(Debug, FromRow)]
struct HierarchyRow {
    id: i64,
    label: Option<String>,
    parent_id: i64,
}

/// Row returned from the query-text lookup
#[derive(Debug, FromRow)]
struct QueryTextRow {
    query: Option<String>,
}

/// Connection pool bound to a shared runtime
pub struct DbClient {
    pool: PgPool,
    runtime: Arc<Runtime>,
}

impl DbClient {
    /// Connect to the database at `url`
    pub fn connect(url: &str, max_connections: u32, runtime: Arc<Runtime>) -> Result<Self> {
        let pool = runtime.block_on(async {
            PgPoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(ACQUIRE_TIMEOUT)
                .connect(url)
                .await
        })?;

        tracing::info!("Connected to PostgreSQL at {}", redact(url));

        Ok(Self { pool, runtime })
    }
}

/// Catalog role: reads the report hierarchy table.
pub struct CatalogClient {
    db: DbClient,
    table: String,
}

impl CatalogClient {
    pub fn new(db: DbClient, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
        }
    }
}

impl ReportCatalog for CatalogClient {
    fn report_rows(&self) -> Result<Vec<CatalogRow>> {
        let sql = format!(
            "SELECT r_id::BIGINT AS id, report_name AS label, \
             COALESCE(r_id_m, {root})::BIGINT AS parent_id \
             FROM {table}",
            root = ROOT_ID,
            table = self.table,
        );

        self.db.runtime.block_on(async {
            let rows: Vec<HierarchyRow> = sqlx::query_as(&sql).fetch_all(&self.db.pool).await?;

            Ok(rows
                .into_iter()
                .map(|r| CatalogRow::new(r.id, r.label.unwrap_or_default(), r.parent_id))
                .collect())
        })
    }

    fn report_query(&self, id: ReportId) -> Result<Option<String>> {
        let sql = format!("SELECT query FROM {} WHERE r_id = $1", self.table);

        self.db.runtime.block_on(async {
            let row: Option<QueryTextRow> = sqlx::query_as(&sql)
                .bind(id)
                .fetch_optional(&self.db.pool)
                .await?;

            Ok(row.and_then(|r| r.query))
        })
    }
}

/// Report role: runs arbitrary SQL and decodes the result set.
pub struct ReportClient {
    db: DbClient,
}

impl ReportClient {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }
}

impl QueryRunner for ReportClient {
    fn run(&self, sql: &str) -> Result<ResultTable> {
        self.db.runtime.block_on(async {
            let rows: Vec<PgRow> = sqlx::query(sql).fetch_all(&self.db.pool).await?;

            let columns: Vec<String> = rows
                .first()
                .map(|r| r.columns().iter().map(|c| c.name().to_string()).collect())
                .unwrap_or_default();

            let cells: Vec<Vec<CellValue>> = rows
                .iter()
                .map(|row| (0..row.len()).map(|i| decode_cell(row, i)).collect())
                .collect();

            Ok(ResultTable::new(columns, cells))
        })
    }
}

/// Stand-in for a role whose connection failed at startup.
pub struct Unavailable {
    reason: String,
}

impl Unavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl ReportCatalog for Unavailable {
    fn report_rows(&self) -> Result<Vec<CatalogRow>> {
        Err(DbError::unavailable(self.reason.clone()))
    }

    fn report_query(&self, _id: ReportId) -> Result<Option<String>> {
        Err(DbError::unavailable(self.reason.clone()))
    }
}

impl QueryRunner for Unavailable {
    fn run(&self, _sql: &str) -> Result<ResultTable> {
        Err(DbError::unavailable(self.reason.clone()))
    }
}

/// Decode one column of a row by its Postgres type name.
///
/// Types without a decoder here (NUMERIC, JSON, arrays, ...) render as a
/// `<TYPE>` placeholder rather than failing the whole query.
fn decode_cell(row: &PgRow, idx: usize) -> CellValue {
    let type_name = row.column(idx).type_info().name().to_string();

    let decoded: std::result::Result<Option<CellValue>, sqlx::Error> = match type_name.as_str() {
        "BOOL" => row
            .try_get::<Option<bool>, _>(idx)
            .map(|v| v.map(CellValue::Bool)),
        "INT2" => row
            .try_get::<Option<i16>, _>(idx)
            .map(|v| v.map(|n| CellValue::Int(n.into()))),
        "INT4" => row
            .try_get::<Option<i32>, _>(idx)
            .map(|v| v.map(|n| CellValue::Int(n.into()))),
        "INT8" => row
            .try_get::<Option<i64>, _>(idx)
            .map(|v| v.map(CellValue::Int)),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(idx)
            .map(|v| v.map(|n| CellValue::Float(n.into()))),
        "FLOAT8" => row
            .try_get::<Option<f64>, _>(idx)
            .map(|v| v.map(CellValue::Float)),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)
            .map(|v| v.map(|t| CellValue::Text(t.to_rfc3339()))),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(idx)
            .map(|v| v.map(|t| CellValue::Text(t.to_string()))),
        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(idx)
            .map(|v| v.map(|d| CellValue::Text(d.to_string()))),
        _ => row
            .try_get::<Option<String>, _>(idx)
            .map(|v| v.map(CellValue::Text)),
    };

    match decoded {
        Ok(Some(value)) => value,
        Ok(None) => CellValue::Null,
        Err(e) => {
            tracing::debug!("No decoder for column {} ({}): {}", idx, type_name, e);
            CellValue::Text(format!("<{}>", type_name))
        }
    }
}

/// Strip the password from a connection URL for logging.
pub fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let userinfo = &url[scheme_end + 3..at];
            match userinfo.find(':') {
                Some(colon) => format!(
                    "{}{}:***{}",
                    &url[..scheme_end + 3],
                    &userinfo[..colon],
                    &url[at..]
                ),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}
