//! Execution history persistence (A3): Diesel + r2d2 SQLite pool, one
//! `execution_log` row per fill and one `daily_pnl` row per UTC date. Used
//! for crash recovery (re-seeding `RiskCore`'s daily P&L on restart) and
//! historical reporting, not as the live book-of-record — that's the Order
//! Manager's in-memory state.

pub mod model;
pub mod schema;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::OptionalExtension;
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

use crate::domain::{OrderSide, Trade};
use crate::error::{Error, Result};
use model::{DailyPnlRow, NewExecutionLogRow};
use schema::{daily_pnl, execution_log};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// # Errors
/// Returns an error if the pool cannot be built.
pub fn create_pool(database_url: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder().max_size(5).build(manager).map_err(|e| Error::Pool(e.to_string()))
}

/// # Errors
/// Returns an error if migrations fail to apply.
pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool.get().map_err(|e| Error::Pool(e.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS).map_err(|e| Error::Pool(e.to_string()))?;
    Ok(())
}

fn configure_sqlite_connection(conn: &mut SqliteConnection) -> Result<()> {
    diesel::sql_query("PRAGMA busy_timeout=5000").execute(conn)?;
    Ok(())
}

fn side_str(side: OrderSide) -> &'static str {
    match side {
        OrderSide::Buy => "buy",
        OrderSide::Sell => "sell",
    }
}

/// Records individual fills and maintains the daily realized-P&L aggregate.
pub struct ExecutionLog {
    pool: DbPool,
}

impl ExecutionLog {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Appends one execution-log row. Does not touch `daily_pnl` — fees are
    /// not realized P&L, only closed positions are (see
    /// [`Self::record_realized_pnl`]).
    pub fn record_trade(&self, trade: &Trade) -> Result<()> {
        let mut conn = self.pool.get().map_err(|e| Error::Pool(e.to_string()))?;
        if let Err(error) = configure_sqlite_connection(&mut conn) {
            warn!(%error, "failed to configure sqlite connection");
        }
        let row = NewExecutionLogRow {
            trade_id: trade.id.to_string(),
            order_id: trade.order_id.to_string(),
            venue: trade.venue.to_string(),
            market_id: trade.market_id.to_string(),
            outcome_id: trade.outcome_id.to_string(),
            side: side_str(trade.side).to_string(),
            price: trade.price.to_string(),
            size: trade.size.to_string(),
            fee: trade.fee.to_string(),
            executed_at: trade.executed_at.to_rfc3339(),
        };
        diesel::insert_into(execution_log::table).values(&row).execute(&mut conn)?;
        Ok(())
    }

    /// Adds `delta` to today's realized P&L and bumps the trade count,
    /// upserting the row if today has no entry yet.
    pub fn record_realized_pnl(&self, delta: Decimal) -> Result<()> {
        let today = chrono::Utc::now().date_naive().to_string();
        let mut conn = self.pool.get().map_err(|e| Error::Pool(e.to_string()))?;

        let mut row: DailyPnlRow = daily_pnl::table
            .filter(daily_pnl::date.eq(&today))
            .first(&mut conn)
            .optional()?
            .unwrap_or_else(|| DailyPnlRow { date: today.clone(), realized_pnl: "0".to_string(), trade_count: 0 });

        let current = Decimal::from_str(&row.realized_pnl).unwrap_or_default();
        row.realized_pnl = (current + delta).to_string();
        row.trade_count += 1;

        diesel::replace_into(daily_pnl::table).values(&row).execute(&mut conn)?;
        Ok(())
    }

    /// Used to re-seed `RiskCore`'s daily P&L after a restart.
    pub fn daily_pnl(&self, date: chrono::NaiveDate) -> Result<Decimal> {
        let mut conn = self.pool.get().map_err(|e| Error::Pool(e.to_string()))?;
        let row: Option<DailyPnlRow> = daily_pnl::table.filter(daily_pnl::date.eq(date.to_string())).first(&mut conn).optional()?;
        Ok(row.map(|r| Decimal::from_str(&r.realized_pnl).unwrap_or_default()).unwrap_or_default())
    }
}
