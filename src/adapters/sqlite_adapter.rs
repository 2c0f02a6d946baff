//! SQLite price store adapter.

use crate::domain::config_validation::pool_size;
use crate::domain::error::CorpusError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> CorpusError {
    CorpusError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> CorpusError {
    CorpusError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, CorpusError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| CorpusError::Database {
        reason: format!("invalid stored date {value:?}: {e}"),
    })
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, CorpusError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| CorpusError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let max_size = pool_size(config)?;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .map_err(pool_error)?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, CorpusError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, CorpusError> {
        self.pool.get().map_err(pool_error)
    }

    pub fn initialize_schema(&self) -> Result<(), CorpusError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS closes (
                    ticker TEXT NOT NULL,
                    date TEXT NOT NULL,
                    close REAL NOT NULL,
                    PRIMARY KEY (ticker, date)
                );
                CREATE INDEX IF NOT EXISTS idx_closes_date ON closes(date);",
            )
            .map_err(query_error)
    }

    /// Upserts `points` for `ticker` in one transaction.
    pub fn insert_points(&self, ticker: &str, points: &[PricePoint]) -> Result<usize, CorpusError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;

        for point in points {
            tx.execute(
                "INSERT OR REPLACE INTO closes (ticker, date, close) VALUES (?1, ?2, ?3)",
                params![ticker, point.date.format("%Y-%m-%d").to_string(), point.close],
            )
            .map_err(query_error)?;
        }

        tx.commit().map_err(query_error)?;
        Ok(points.len())
    }

    fn has_ticker(&self, ticker: &str) -> Result<bool, CorpusError> {
        let count: i64 = self
            .conn()?
            .query_row(
                "SELECT COUNT(*) FROM closes WHERE ticker = ?1",
                params![ticker],
                |row| row.get(0),
            )
            .map_err(query_error)?;
        Ok(count > 0)
    }
}

impl PricePort for SqliteAdapter {
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, CorpusError> {
        let points = {
            let conn = self.conn()?;
            let mut stmt = conn
                .prepare(
                    "SELECT date, close FROM closes
                     WHERE ticker = ?1 AND date >= ?2 AND date <= ?3
                     ORDER BY date ASC",
                )
                .map_err(query_error)?;

            let rows = stmt
                .query_map(
                    params![
                        ticker,
                        start_date.format("%Y-%m-%d").to_string(),
                        end_date.format("%Y-%m-%d").to_string()
                    ],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
                )
                .map_err(query_error)?;

            let mut points = Vec::new();
            for row in rows {
                let (date, close) = row.map_err(query_error)?;
                points.push(PricePoint::new(parse_date(&date)?, close));
            }
            points
        };

        // The connection is back in the pool before the existence check.
        if points.is_empty() && !self.has_ticker(ticker)? {
            return Err(CorpusError::NoData {
                ticker: ticker.to_string(),
            });
        }

        Ok(PriceSeries::new(ticker, points))
    }

    fn list_tickers(&self) -> Result<Vec<String>, CorpusError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT ticker FROM closes ORDER BY ticker")
            .map_err(query_error)?;

        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_error)?;

        let mut tickers = Vec::new();
        for row in rows {
            tickers.push(row.map_err(query_error)?);
        }
        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, CorpusError> {
        let result: (Option<String>, Option<String>, i64) = self
            .conn()?
            .query_row(
                "SELECT MIN(date), MAX(date), COUNT(*) FROM closes WHERE ticker = ?1",
                params![ticker],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_error)?;

        match result {
            (Some(min), Some(max), count) if count > 0 => {
                Ok(Some((parse_date(&min)?, parse_date(&max)?, count as usize)))
            }
            _ => Ok(None),
        }
    }
}
