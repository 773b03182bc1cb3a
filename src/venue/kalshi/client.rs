//! Kalshi-like REST client: RSA-PSS signed calls over `/trade-api/v2`,
//! normalized to the shared [`VenueClient`] contract.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client as HttpClient, Method};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::dto::{
    MarketResponse, MarketsResponse, WireBalance, WireFillsResponse, WireOrderBook,
    WireOrderRequest, WireOrderResponse, WirePositionsResponse,
};
use crate::domain::{
    Market, MarketId, MarketStatus, Order, OrderId, OrderRequest, OrderBook, OrderSide,
    OrderStatus, OrderType, Outcome, OutcomeId, Position, PositionSide, PriceLevel, Trade, Venue,
};
use crate::error::{Error, Result};
use crate::ratelimit::RateLimiter;
use crate::venue::auth::RsaPssSigner;
use crate::venue::{MarketFilter, VenueClient};

const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_millis(250);
const BASE_PATH: &str = "/trade-api/v2";

/// Integer cents `[0,100]` -> decimal `[0,1]`.
#[must_use]
pub fn cents_to_price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Decimal `[0,1]` -> integer cents `[0,100]`, rounded to the nearest cent.
#[must_use]
pub fn price_to_cents(price: Decimal) -> i64 {
    (price * Decimal::from(100)).round().try_into().unwrap_or(0)
}

/// `count * price/100` -> USD size.
#[must_use]
pub fn contracts_to_usd(count: i64, price_cents: i64) -> Decimal {
    Decimal::from(count) * cents_to_price(price_cents)
}

/// USD size / price -> nearest whole contract count.
#[must_use]
pub fn usd_to_contracts(size_usd: Decimal, price: Decimal) -> i64 {
    if price.is_zero() {
        return 0;
    }
    (size_usd / price).round().try_into().unwrap_or(0)
}

pub struct KalshiClient {
    http: HttpClient,
    base_url: String,
    signer: RsaPssSigner,
    orders_limiter: Arc<RateLimiter>,
    reads_limiter: Arc<RateLimiter>,
}

impl KalshiClient {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        signer: RsaPssSigner,
        orders_limiter: Arc<RateLimiter>,
        reads_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self { http: HttpClient::new(), base_url: base_url.into(), signer, orders_limiter, reads_limiter }
    }

    fn limiter_for(&self, method: &Method) -> &RateLimiter {
        if *method == Method::POST || *method == Method::DELETE {
            &self.orders_limiter
        } else {
            &self.reads_limiter
        }
    }

    async fn signed_request<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&str>,
    ) -> Result<T> {
        let mut last_err = None;

        for attempt in 0..MAX_ATTEMPTS {
            self.limiter_for(&method).acquire(1, Duration::from_secs(10)).await?;

            let timestamp_ms = Utc::now().timestamp_millis();
            let full_path = format!("{BASE_PATH}{path}");
            let headers = self.signer.sign(timestamp_ms, method.as_str(), &full_path)?;
            let url = format!("{}{full_path}", self.base_url);

            let start = std::time::Instant::now();
            let mut req = self
                .http
                .request(method.clone(), &url)
                .header("KALSHI-ACCESS-KEY", &headers.access_key)
                .header("KALSHI-ACCESS-TIMESTAMP", &headers.timestamp_ms)
                .header("KALSHI-ACCESS-SIGNATURE", &headers.signature);
            if let Some(body) = body {
                req = req.header("content-type", "application/json").body(body.to_string());
            }

            let outcome = async {
                let response = req.send().await?;
                let status = response.status();
                metrics::histogram!("order_latency_ms", "venue" => "kalshi")
                    .record(start.elapsed().as_millis() as f64);
                if !status.is_success() {
                    let text = response.text().await.unwrap_or_default();
                    if status.as_u16() == 429 {
                        return Err(Error::RateLimited(text));
                    }
                    return Err(Error::Transport(format!("http {status}: {text}")));
                }
                Ok(response.json::<T>().await?)
            }
            .await;

            match outcome {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt + 1 < MAX_ATTEMPTS => {
                    metrics::counter!("api_errors", "venue" => "kalshi", "endpoint" => path.to_string())
                        .increment(1);
                    warn!(attempt, %path, error = %err, "retrying kalshi request");
                    tokio::time::sleep(BASE_BACKOFF * 2u32.pow(attempt)).await;
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Transport("exhausted retries".into())))
    }
}

#[async_trait]
impl VenueClient for KalshiClient {
    fn venue(&self) -> Venue {
        Venue::Kalshi
    }

    async fn connect(&self) -> Result<()> {
        self.get_balance().await.map(|_| ()).map_err(|e| match e {
            Error::Http(_) | Error::Transport(_) => e,
            other => Error::Authentication { venue: "kalshi".into(), reason: other.to_string() },
        })
    }

    async fn get_markets(&self, filter: MarketFilter) -> Result<Vec<Market>> {
        let limit = filter.limit.unwrap_or(500).min(500);
        let status = if filter.active_only { "&status=open" } else { "" };
        let path = format!("/markets?limit={limit}{status}");
        let response: MarketsResponse = self.signed_request(Method::GET, &path, None).await?;
        debug!(count = response.markets.len(), "fetched kalshi markets");
        Ok(response.markets.into_iter().map(Into::into).collect())
    }

    async fn get_market(&self, external_id: &str) -> Result<Market> {
        let path = format!("/markets/{external_id}");
        let response: MarketResponse = self.signed_request(Method::GET, &path, None).await?;
        Ok(response.market.into())
    }

    async fn get_order_book(&self, market_id: &MarketId, outcome_id: &OutcomeId) -> Result<OrderBook> {
        let path = format!("/markets/{}/orderbook", market_id.as_str());
        let wire: WireOrderBook = self.signed_request(Method::GET, &path, None).await?;
        let mut book = OrderBook {
            market_id: market_id.clone(),
            outcome_id: outcome_id.clone(),
            bids: wire
                .orderbook
                .yes
                .into_iter()
                .map(|(p, s)| PriceLevel { price: cents_to_price(p), size: Decimal::from(s) })
                .collect(),
            asks: wire
                .orderbook
                .no
                .into_iter()
                .map(|(p, s)| PriceLevel { price: cents_to_price(100 - p), size: Decimal::from(s) })
                .collect(),
            timestamp: Utc::now(),
        };
        book.normalize();
        Ok(book)
    }

    async fn place_order(&self, request: OrderRequest) -> Result<Order> {
        request.validate()?;
        let side = if request.outcome_id.as_str().ends_with("-no") { "no" } else { "yes" };
        let action = match request.side {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        };
        let order_type = match request.order_type {
            OrderType::Fok => "market",
            _ => "limit",
        };
        let time_in_force = match request.order_type {
            OrderType::Gtc => "gtc",
            OrderType::Gtd => "day",
            OrderType::Ioc => "ioc",
            OrderType::Fok => "fok",
        };
        let price_cents = price_to_cents(request.price);
        let count = usd_to_contracts(request.size_usd, request.price);

        let wire_request = WireOrderRequest {
            ticker: request.market_id.as_str().to_string(),
            side,
            action,
            count,
            yes_price: (side == "yes").then_some(price_cents),
            no_price: (side == "no").then_some(price_cents),
            order_type,
            time_in_force,
        };
        let body = serde_json::to_string(&wire_request)?;
        let response: WireOrderResponse = self.signed_request(Method::POST, "/portfolio/orders", Some(&body)).await?;
        let wire_order = response.order;

        let status = match wire_order.status.as_str() {
            "filled" | "executed" => OrderStatus::Filled,
            "partially_filled" => OrderStatus::Partial,
            "resting" | "open" => OrderStatus::Open,
            "canceled" | "rejected" => {
                return Err(Error::Rejected { venue: "kalshi".into(), reason: wire_order.status });
            }
            other => {
                warn!(status = other, "unrecognized kalshi order status, treating as open");
                OrderStatus::Open
            }
        };

        let now = Utc::now();
        let fill_price_cents = wire_order.yes_price.or(wire_order.no_price).unwrap_or(price_cents);
        Ok(Order {
            id: OrderId::generate(),
            venue: Venue::Kalshi,
            external_order_id: Some(wire_order.order_id),
            market_id: request.market_id,
            outcome_id: request.outcome_id,
            side: request.side,
            price: request.price,
            size_usd: request.size_usd,
            filled_size_usd: contracts_to_usd(wire_order.filled_count, fill_price_cents),
            avg_fill_price: Some(cents_to_price(fill_price_cents)),
            order_type: request.order_type,
            status,
            strategy_id: request.strategy_id,
            created_at: now,
            updated_at: now,
        })
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<()> {
        let path = format!("/portfolio/orders/{}", order_id.as_str());
        let result: Result<serde_json::Value> = self.signed_request(Method::DELETE, &path, None).await;
        match result {
            Ok(_) => Ok(()),
            Err(Error::Transport(msg)) if msg.contains("404") => Err(Error::NotFound(order_id.as_str().to_string())),
            Err(other) => Err(other),
        }
    }

    async fn cancel_all_orders(&self, market_id: Option<&MarketId>) -> Result<()> {
        let path = match market_id {
            Some(id) => format!("/portfolio/orders?ticker={}", id.as_str()),
            None => "/portfolio/orders".to_string(),
        };
        let _: serde_json::Value = self.signed_request(Method::DELETE, &path, None).await?;
        Ok(())
    }

    async fn get_balance(&self) -> Result<Decimal> {
        let wire: WireBalance = self.signed_request(Method::GET, "/portfolio/balance", None).await?;
        Ok(cents_to_price(wire.balance))
    }

    async fn get_positions(&self) -> Result<Vec<Position>> {
        let wire: WirePositionsResponse = self.signed_request(Method::GET, "/portfolio/positions", None).await?;
        let now = Utc::now();
        Ok(wire
            .market_positions
            .into_iter()
            .map(|p| Position {
                id: crate::domain::PositionId::generate(),
                venue: Venue::Kalshi,
                market_id: MarketId::new(p.ticker.clone()),
                outcome_id: OutcomeId::new(format!("{}-yes", p.ticker)),
                side: if p.position >= 0 { PositionSide::Long } else { PositionSide::Short },
                size: Decimal::from(p.position.abs()),
                avg_entry_price: if p.position == 0 {
                    Decimal::ZERO
                } else {
                    contracts_to_usd(p.position.abs(), (p.market_exposure / p.position.abs().max(1)).abs())
                },
                current_price: Decimal::ZERO,
                realized_pnl: Decimal::ZERO,
                is_open: p.position != 0,
                strategy_id: None,
                opened_at: now,
            })
            .collect())
    }

    async fn get_trades(&self, limit: Option<usize>) -> Result<Vec<Trade>> {
        let path = format!("/portfolio/fills?limit={}", limit.unwrap_or(100));
        let wire: WireFillsResponse = self.signed_request(Method::GET, &path, None).await?;
        Ok(wire
            .fills
            .into_iter()
            .map(|f| Trade {
                id: crate::domain::TradeId::new(f.trade_id),
                venue: Venue::Kalshi,
                order_id: OrderId::new(f.order_id),
                market_id: MarketId::new(f.ticker.clone()),
                outcome_id: OutcomeId::new(format!("{}-yes", f.ticker)),
                side: if f.action.eq_ignore_ascii_case("buy") { OrderSide::Buy } else { OrderSide::Sell },
                price: cents_to_price(f.yes_price),
                size: Decimal::from(f.count),
                fee: Decimal::ZERO,
                executed_at: f.created_time,
            })
            .collect())
    }
}

impl From<super::dto::WireMarket> for Market {
    fn from(wire: super::dto::WireMarket) -> Self {
        let ticker = wire.ticker.clone();
        let yes_bid = wire.yes_bid.map(cents_to_price);
        let yes_ask = wire.yes_ask.map(cents_to_price);
        // NO side is complementary: no_ask = 100 - yes_bid, no_bid = 100 - yes_ask.
        let no_bid = wire.yes_ask.map(|c| cents_to_price(100 - c));
        let no_ask = wire.yes_bid.map(|c| cents_to_price(100 - c));

        let outcomes = vec![
            Outcome {
                id: OutcomeId::new(format!("{ticker}-yes")),
                external_id: format!("{ticker}-yes"),
                name: "Yes".into(),
                is_yes: true,
                probability: yes_ask.or(yes_bid).unwrap_or(Decimal::ZERO),
                best_bid: yes_bid,
                best_ask: yes_ask,
                bid_size: None,
                ask_size: None,
            },
            Outcome {
                id: OutcomeId::new(format!("{ticker}-no")),
                external_id: format!("{ticker}-no"),
                name: "No".into(),
                is_yes: false,
                probability: no_ask.or(no_bid).unwrap_or(Decimal::ZERO),
                best_bid: no_bid,
                best_ask: no_ask,
                bid_size: None,
                ask_size: None,
            },
        ];

        let status = match wire.status.as_deref() {
            Some("finalized") | Some("settled") => MarketStatus::Resolved,
            Some("closed") | Some("inactive") => MarketStatus::Suspended,
            _ => MarketStatus::Active,
        };

        Self {
            id: MarketId::new(ticker.clone()),
            venue: Venue::Kalshi,
            external_id: ticker,
            title: wire.title.unwrap_or_default(),
            description: wire.subtitle.unwrap_or_default(),
            category: wire.category.unwrap_or_default(),
            end_date: wire.close_time.unwrap_or_else(Utc::now),
            outcomes,
            volume_24h: Decimal::from(wire.volume_24h.unwrap_or(0)),
            liquidity: Decimal::from(wire.liquidity.unwrap_or(0)),
            is_active: status == MarketStatus::Active,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn cents_round_trip_price() {
        assert_eq!(cents_to_price(48), dec!(0.48));
        assert_eq!(price_to_cents(dec!(0.48)), 48);
    }

    #[test]
    fn contracts_to_usd_multiplies_count_by_price() {
        assert_eq!(contracts_to_usd(150, 49), dec!(73.50));
    }

    #[test]
    fn usd_to_contracts_divides_by_price() {
        assert_eq!(usd_to_contracts(dec!(73.50), dec!(0.49)), 150);
    }
}
