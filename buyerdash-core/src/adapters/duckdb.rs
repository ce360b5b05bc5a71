//! DuckDB campaign store implementation

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use duckdb::types::Type;
use duckdb::{params, Connection};

use crate::domain::{CampaignRecord, CampaignStatus};
use crate::ports::{CampaignStore, DaySummary};
use crate::services::MigrationService;

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

const CAMPAIGN_COLUMNS: &str = "campaign_id, day::VARCHAR, buyer_code, account_code, site, series_code,
     spend, revenue, profit, roi, cpc, ctr, ecpm, status";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

/// DuckDB-backed campaign store
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl DuckDbRepository {
    /// Open (or create) the campaign database
    ///
    /// Retries with exponential backoff when another process holds the file.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: db_path.to_path_buf(),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[buyerdash] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off; nothing here needs ICU or httpfs
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<crate::services::MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Size of the database file in bytes
    pub fn get_db_size(&self) -> Result<u64> {
        Ok(std::fs::metadata(&self.db_path)?.len())
    }
}

fn conversion_error<E>(idx: usize, err: E) -> duckdb::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    duckdb::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_day(idx: usize, value: &str) -> duckdb::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| conversion_error(idx, e))
}

fn row_to_record(row: &duckdb::Row) -> duckdb::Result<CampaignRecord> {
    // Column order follows CAMPAIGN_COLUMNS
    let day: String = row.get(1)?;
    let buyer_code: String = row.get(2)?;
    let site: String = row.get(4)?;
    let status: String = row.get(13)?;

    Ok(CampaignRecord {
        id: row.get(0)?,
        date: parse_day(1, &day)?,
        buyer_code: buyer_code.parse().map_err(|e| conversion_error(2, e))?,
        account_code: row.get(3)?,
        site: site.parse().map_err(|e| conversion_error(4, e))?,
        series_code: row.get(5)?,
        spend: row.get(6)?,
        revenue: row.get(7)?,
        profit: row.get(8)?,
        roi: row.get(9)?,
        cpc: row.get(10)?,
        ctr: row.get(11)?,
        ecpm: row.get(12)?,
        status: status
            .parse::<CampaignStatus>()
            .map_err(|e| conversion_error(13, e))?,
    })
}

impl CampaignStore for DuckDbRepository {
    fn save_days(&self, days: &BTreeMap<NaiveDate, Vec<CampaignRecord>>, batch_id: &str) -> Result<()> {
        for (day, records) in days {
            if let Some(stray) = records.iter().find(|r| r.date != *day) {
                bail!(
                    "Campaign {} is dated {} but was saved under {}",
                    stray.id,
                    stray.date,
                    day
                );
            }
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO sys_campaigns (campaign_id, day, buyer_code, account_code, site, series_code,
                                            spend, revenue, profit, roi, cpc, ctr, ecpm, status, batch_id,
                                            imported_at)
                 VALUES (?, CAST(? AS DATE), ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
                 ON CONFLICT (campaign_id, day) DO UPDATE SET
                    buyer_code = EXCLUDED.buyer_code,
                    account_code = EXCLUDED.account_code,
                    site = EXCLUDED.site,
                    series_code = EXCLUDED.series_code,
                    spend = EXCLUDED.spend,
                    revenue = EXCLUDED.revenue,
                    profit = EXCLUDED.profit,
                    roi = EXCLUDED.roi,
                    cpc = EXCLUDED.cpc,
                    ctr = EXCLUDED.ctr,
                    ecpm = EXCLUDED.ecpm,
                    status = EXCLUDED.status,
                    batch_id = EXCLUDED.batch_id,
                    imported_at = EXCLUDED.imported_at",
            )?;

            // Dropping the transaction on an early return rolls back every day
            let rows = days
                .iter()
                .flat_map(|(day, records)| records.iter().map(move |record| (day, record)));
            for (day, record) in rows {
                stmt.execute(params![
                    record.id,
                    day.to_string(),
                    record.buyer_code.as_str(),
                    record.account_code,
                    record.site.as_str(),
                    record.series_code,
                    record.spend,
                    record.revenue,
                    record.profit,
                    record.roi,
                    record.cpc,
                    record.ctr,
                    record.ecpm,
                    record.status.as_str(),
                    batch_id,
                ])?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    fn delete_day(&self, day: NaiveDate) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM sys_campaigns WHERE day = CAST(? AS DATE)",
            params![day.to_string()],
        )?;
        Ok(deleted)
    }

    fn campaigns_for_day(&self, day: NaiveDate) -> Result<Vec<CampaignRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sys_campaigns WHERE day = CAST(? AS DATE) ORDER BY campaign_id",
            CAMPAIGN_COLUMNS
        ))?;

        let records = stmt
            .query_map(params![day.to_string()], row_to_record)?
            .collect::<duckdb::Result<Vec<_>>>()?;

        Ok(records)
    }

    fn existing_ids(&self, day: NaiveDate) -> Result<HashSet<String>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT campaign_id FROM sys_campaigns WHERE day = CAST(? AS DATE)")?;

        let ids = stmt
            .query_map(params![day.to_string()], |row| row.get::<_, String>(0))?
            .collect::<duckdb::Result<HashSet<_>>>()?;

        Ok(ids)
    }

    fn list_days(&self) -> Result<Vec<DaySummary>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT day::VARCHAR, COUNT(*) FROM sys_campaigns GROUP BY day ORDER BY day",
        )?;

        let days = stmt
            .query_map([], |row| {
                let day: String = row.get(0)?;
                Ok(DaySummary {
                    day: parse_day(0, &day)?,
                    campaigns: row.get(1)?,
                })
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;

        Ok(days)
    }

    fn count(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sys_campaigns", [], |row| row.get(0))?;
        Ok(count)
    }
}
