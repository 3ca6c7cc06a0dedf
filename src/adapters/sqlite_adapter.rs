//! SQLite price adapter.

use crate::domain::error::MoversError;
use crate::domain::interval::FetchWindow;
use crate::domain::price::{PriceBar, PriceSeries};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::debug;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn query_err(e: rusqlite::Error) -> MoversError {
    MoversError::DataQuery {
        reason: e.to_string(),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, MoversError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| MoversError::DataSource {
        reason: format!("invalid date '{}': {}", value, e),
    })
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, MoversError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| MoversError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = u32::try_from(config.get_int("sqlite", "pool_size", 4))
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| MoversError::ConfigInvalid {
                section: "sqlite".into(),
                key: "pool_size".into(),
                reason: format!("must be between 1 and {}", u32::MAX),
            })?;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| MoversError::DataSource {
                reason: e.to_string(),
            })?;

        debug!(path = %db_path, pool_size, "opened sqlite price store");
        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, MoversError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| MoversError::DataSource {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, MoversError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| MoversError::DataSource {
                reason: e.to_string(),
            })
    }

    pub fn initialize_schema(&self) -> Result<(), MoversError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS prices (
                    symbol TEXT NOT NULL,
                    date TEXT NOT NULL,
                    open REAL,
                    close REAL,
                    PRIMARY KEY (symbol, date)
                );
                CREATE INDEX IF NOT EXISTS idx_prices_date ON prices(date);",
            )
            .map_err(query_err)
    }

    pub fn insert_series(&self, series: &PriceSeries) -> Result<(), MoversError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        for bar in series.bars() {
            tx.execute(
                "INSERT OR REPLACE INTO prices (symbol, date, open, close)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    series.symbol(),
                    bar.date.format("%Y-%m-%d").to_string(),
                    bar.open,
                    bar.close
                ],
            )
            .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)
    }
}

impl PricePort for SqliteAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        window: &FetchWindow,
    ) -> Result<PriceSeries, MoversError> {
        let conn = self.conn()?;

        // ISO dates compare correctly as text
        let start_str = window
            .start
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let end_str = window.end.format("%Y-%m-%d").to_string();

        let mut stmt = conn
            .prepare(
                "SELECT date, open, close
                 FROM prices
                 WHERE symbol = ?1 AND date >= ?2 AND date <= ?3
                 ORDER BY date ASC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![symbol, start_str, end_str], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                ))
            })
            .map_err(query_err)?;

        let mut bars = Vec::new();
        for row in rows {
            let (date_str, open, close) = row.map_err(query_err)?;
            bars.push(PriceBar::new(parse_date(&date_str)?, open, close));
        }

        Ok(PriceSeries::new(symbol, bars))
    }

    fn list_symbols(&self) -> Result<Vec<String>, MoversError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare("SELECT DISTINCT symbol FROM prices ORDER BY symbol")
            .map_err(query_err)?;

        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_err)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(query_err)?);
        }

        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, MoversError> {
        let conn = self.conn()?;

        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(date), MAX(date), COUNT(*) FROM prices WHERE symbol = ?1",
                params![symbol],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_err)?;

        match result {
            (Some(min_str), Some(max_str), count) if count > 0 => Ok(Some((
                parse_date(&min_str)?,
                parse_date(&max_str)?,
                count as usize,
            ))),
            _ => Ok(None),
        }
    }
}
