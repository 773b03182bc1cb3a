//! Polymarket-like REST client: HMAC-signed CLOB calls normalized to the
//! shared [`VenueClient`] contract.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client as HttpClient, Method};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::dto::{
    MarketsResponse, SubscribeMessage, WireBalance, WireOrderBook, WireOrderRequest,
    WireOrderResponse, WirePosition, WireTrade,
};
use crate::domain::{
    Market, MarketId, MarketStatus, Order, OrderId, OrderRequest, OrderBook, OrderSide,
    OrderStatus, OrderType, Outcome, OutcomeId, Position, PositionSide, PriceLevel, Trade, Venue,
};
use crate::error::{Error, Result};
use crate::ratelimit::RateLimiter;
use crate::venue::auth::HmacSigner;
use crate::venue::{MarketFilter, VenueClient};

const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_millis(250);

pub struct PolymarketClient {
    http: HttpClient,
    base_url: String,
    signer: HmacSigner,
    orders_limiter: Arc<RateLimiter>,
    reads_limiter: Arc<RateLimiter>,
}

impl PolymarketClient {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        signer: HmacSigner,
        orders_limiter: Arc<RateLimiter>,
        reads_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: base_url.into(),
            signer,
            orders_limiter,
            reads_limiter,
        }
    }

    fn limiter_for(&self, method: &Method) -> &RateLimiter {
        if *method == Method::POST || *method == Method::DELETE {
            &self.orders_limiter
        } else {
            &self.reads_limiter
        }
    }

    /// Acquire the appropriate rate limiter, sign, and send one request,
    /// retrying transient errors with exponential backoff.
    async fn signed_request<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&str>,
    ) -> Result<T> {
        let body = body.unwrap_or("");
        let mut last_err = None;

        for attempt in 0..MAX_ATTEMPTS {
            self.limiter_for(&method)
                .acquire(1, Duration::from_secs(10))
                .await?;

            let timestamp = Utc::now().timestamp();
            let headers = self.signer.sign(timestamp, method.as_str(), path, body)?;
            let url = format!("{}{path}", self.base_url);

            let start = std::time::Instant::now();
            let mut req = self
                .http
                .request(method.clone(), &url)
                .header("POLY-ADDRESS", &headers.address)
                .header("POLY-API-KEY", &headers.api_key)
                .header("POLY-PASSPHRASE", &headers.passphrase)
                .header("POLY-TIMESTAMP", &headers.timestamp)
                .header("POLY-SIGNATURE", &headers.signature);
            if !body.is_empty() {
                req = req.header("content-type", "application/json").body(body.to_string());
            }

            let outcome = async {
                let response = req.send().await?;
                let status = response.status();
                metrics::histogram!("order_latency_ms", "venue" => "polymarket")
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
                    metrics::counter!("api_errors", "venue" => "polymarket", "endpoint" => path.to_string())
                        .increment(1);
                    warn!(attempt, %path, error = %err, "retrying polymarket request");
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
impl VenueClient for PolymarketClient {
    fn venue(&self) -> Venue {
        Venue::Polymarket
    }

    async fn connect(&self) -> Result<()> {
        self.get_balance().await.map(|_| ()).map_err(|e| match e {
            Error::Http(_) | Error::Transport(_) => e,
            other => Error::Authentication { venue: "polymarket".into(), reason: other.to_string() },
        })
    }

    async fn get_markets(&self, filter: MarketFilter) -> Result<Vec<Market>> {
        let limit = filter.limit.unwrap_or(500).min(500);
        let active = if filter.active_only { "&active=true&closed=false" } else { "" };
        let path = format!("/markets?limit={limit}{active}");
        let response: MarketsResponse = self.signed_request(Method::GET, &path, None).await?;
        let markets = response.data.unwrap_or_default();
        debug!(count = markets.len(), "fetched polymarket markets");
        Ok(markets.into_iter().map(Into::into).collect())
    }

    async fn get_market(&self, external_id: &str) -> Result<Market> {
        let path = format!("/markets/{external_id}");
        let wire: super::dto::WireMarket = self.signed_request(Method::GET, &path, None).await?;
        Ok(wire.into())
    }

    async fn get_order_book(&self, market_id: &MarketId, outcome_id: &OutcomeId) -> Result<OrderBook> {
        let path = format!("/markets/{}/book?token_id={}", market_id.as_str(), outcome_id.as_str());
        let wire: WireOrderBook = self.signed_request(Method::GET, &path, None).await?;
        let mut book = OrderBook {
            market_id: market_id.clone(),
            outcome_id: outcome_id.clone(),
            bids: wire.bids.into_iter().map(|l| PriceLevel { price: l.price, size: l.size }).collect(),
            asks: wire.asks.into_iter().map(|l| PriceLevel { price: l.price, size: l.size }).collect(),
            timestamp: Utc::now(),
        };
        book.normalize();
        Ok(book)
    }

    async fn place_order(&self, request: OrderRequest) -> Result<Order> {
        request.validate()?;
        let side = match request.side {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        };
        let order_type = match request.order_type {
            OrderType::Gtc => "GTC",
            OrderType::Gtd => "GTD",
            OrderType::Ioc => "IOC",
            OrderType::Fok => "FOK",
        };
        let wire_request = WireOrderRequest {
            token_id: request.outcome_id.as_str().to_string(),
            price: request.price,
            size: request.size_usd,
            side,
            order_type,
        };
        let body = serde_json::to_string(&wire_request)?;
        let response: WireOrderResponse = self.signed_request(Method::POST, "/orders", Some(&body)).await?;

        let status = match response.status.as_str() {
            "matched" | "filled" => OrderStatus::Filled,
            "partially_matched" => OrderStatus::Partial,
            "live" | "open" => OrderStatus::Open,
            "rejected" | "cancelled" => {
                return Err(Error::Rejected { venue: "polymarket".into(), reason: response.status });
            }
            other => {
                warn!(status = other, "unrecognized polymarket order status, treating as open");
                OrderStatus::Open
            }
        };

        let now = Utc::now();
        Ok(Order {
            id: OrderId::generate(),
            venue: Venue::Polymarket,
            external_order_id: Some(response.order_id),
            market_id: request.market_id,
            outcome_id: request.outcome_id,
            side: request.side,
            price: request.price,
            size_usd: request.size_usd,
            filled_size_usd: response.making_amount.unwrap_or(Decimal::ZERO),
            avg_fill_price: response.price,
            order_type: request.order_type,
            status,
            strategy_id: request.strategy_id,
            created_at: now,
            updated_at: now,
        })
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<()> {
        let path = format!("/orders/{}", order_id.as_str());
        let result: Result<serde_json::Value> = self.signed_request(Method::DELETE, &path, None).await;
        match result {
            Ok(_) => Ok(()),
            Err(Error::Transport(msg)) if msg.contains("404") => Err(Error::NotFound(order_id.as_str().to_string())),
            Err(other) => Err(other),
        }
    }

    async fn cancel_all_orders(&self, market_id: Option<&MarketId>) -> Result<()> {
        let path = match market_id {
            Some(id) => format!("/orders?market={}", id.as_str()),
            None => "/orders".to_string(),
        };
        let _: serde_json::Value = self.signed_request(Method::DELETE, &path, None).await?;
        Ok(())
    }

    async fn get_balance(&self) -> Result<Decimal> {
        let wire: WireBalance = self.signed_request(Method::GET, "/balances/me", None).await?;
        Ok(wire.balance)
    }

    async fn get_positions(&self) -> Result<Vec<Position>> {
        let wire: Vec<WirePosition> = self.signed_request(Method::GET, "/positions", None).await?;
        let now = Utc::now();
        Ok(wire
            .into_iter()
            .map(|p| Position {
                id: crate::domain::PositionId::generate(),
                venue: Venue::Polymarket,
                market_id: MarketId::new(""),
                outcome_id: OutcomeId::new(p.token_id),
                side: if p.size >= Decimal::ZERO { PositionSide::Long } else { PositionSide::Short },
                size: p.size.abs(),
                avg_entry_price: p.avg_price,
                current_price: p.avg_price,
                realized_pnl: Decimal::ZERO,
                is_open: true,
                strategy_id: None,
                opened_at: now,
            })
            .collect())
    }

    async fn get_trades(&self, limit: Option<usize>) -> Result<Vec<Trade>> {
        let path = format!("/trades?limit={}", limit.unwrap_or(100));
        let wire: Vec<WireTrade> = self.signed_request(Method::GET, &path, None).await?;
        Ok(wire
            .into_iter()
            .map(|t| Trade {
                id: crate::domain::TradeId::new(t.id),
                venue: Venue::Polymarket,
                order_id: OrderId::generate(),
                market_id: MarketId::new(""),
                outcome_id: OutcomeId::new(t.token_id),
                side: if t.side.eq_ignore_ascii_case("buy") { OrderSide::Buy } else { OrderSide::Sell },
                price: t.price,
                size: t.size,
                fee: t.fee.unwrap_or(Decimal::ZERO),
                executed_at: t.timestamp,
            })
            .collect())
    }
}

impl From<super::dto::WireMarket> for Market {
    fn from(wire: super::dto::WireMarket) -> Self {
        let outcomes = wire
            .tokens
            .into_iter()
            .map(|t| {
                let is_yes = t.outcome.eq_ignore_ascii_case("yes");
                Outcome {
                    id: OutcomeId::new(t.token_id.clone()),
                    external_id: t.token_id,
                    name: t.outcome,
                    is_yes,
                    probability: t.price.unwrap_or(Decimal::ZERO),
                    best_bid: None,
                    best_ask: t.price,
                    bid_size: None,
                    ask_size: None,
                }
            })
            .collect();
        Self {
            id: MarketId::new(wire.condition_id.clone()),
            venue: Venue::Polymarket,
            external_id: wire.condition_id,
            title: wire.question.unwrap_or_default(),
            description: wire.description.unwrap_or_default(),
            category: wire.category.unwrap_or_default(),
            end_date: wire.end_date_iso.unwrap_or_else(Utc::now),
            outcomes,
            volume_24h: wire.volume_24hr.unwrap_or(Decimal::ZERO),
            liquidity: wire.liquidity.unwrap_or(Decimal::ZERO),
            status: if wire.closed {
                MarketStatus::Resolved
            } else if wire.active {
                MarketStatus::Active
            } else {
                MarketStatus::Suspended
            },
            is_active: wire.active && !wire.closed,
        }
    }
}

/// Build the initial subscription payload for a set of outcome token ids.
#[must_use]
pub fn book_subscription(token_ids: Vec<String>) -> SubscribeMessage {
    SubscribeMessage::new(token_ids, "book")
}
