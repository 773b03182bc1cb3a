//! REST fallback poller: when a venue's WebSocket feed is degraded (or as a
//! low-frequency watchdog even while it's healthy), re-derive `PriceUpdate`s
//! for the tracked universe by hitting the REST orderbook endpoint directly.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::Venue;
use crate::venue::VenueClient;

use super::MarketDataService;

/// Runs until the task is aborted by its owner (the Trading Engine, C13).
/// Every tick it walks the tracked markets for `venue` and refreshes the
/// cache with `PriceSource::Poll` data, independent of the WebSocket state.
pub async fn run_rest_poller(
    service: Arc<MarketDataService>,
    client: Arc<dyn VenueClient>,
    interval: Duration,
) {
    let venue = client.venue();
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let markets = service.tracked_markets(venue);
        for (market_id, outcome_id) in markets {
            match client.get_order_book(&market_id, &outcome_id).await {
                Ok(book) => {
                    debug!(%venue, %market_id, %outcome_id, "rest poll refreshed orderbook");
                    service.ingest_poll(venue, market_id, outcome_id, book);
                }
                Err(err) => {
                    warn!(%venue, %market_id, %outcome_id, error = %err, "rest poll failed");
                }
            }
        }
    }
}
