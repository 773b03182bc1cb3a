//! Row types for the `execution_log` and `daily_pnl` tables.
//!
//! Decimal columns are stored as `Text` rather than `Float` — unlike the
//! teacher's f32 stats rows, this crate treats `rust_decimal::Decimal` as
//! the one true numeric type at every boundary, and text round-trips it
//! exactly.

use diesel::prelude::*;

use super::schema::{daily_pnl, execution_log};

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = execution_log)]
pub struct NewExecutionLogRow {
    pub trade_id: String,
    pub order_id: String,
    pub venue: String,
    pub market_id: String,
    pub outcome_id: String,
    pub side: String,
    pub price: String,
    pub size: String,
    pub fee: String,
    pub executed_at: String,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = execution_log)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExecutionLogRow {
    pub id: Option<i32>,
    pub trade_id: String,
    pub order_id: String,
    pub venue: String,
    pub market_id: String,
    pub outcome_id: String,
    pub side: String,
    pub price: String,
    pub size: String,
    pub fee: String,
    pub executed_at: String,
}

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = daily_pnl)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DailyPnlRow {
    pub date: String,
    pub realized_pnl: String,
    pub trade_count: i32,
}
