// ============================================================================
// API Client : CoinGecko
// ============================================================================
// Deux endpoints :
// - /coins/markets          : prix courant, variation 24 h, volume 24 h
// - /coins/{id}/market_chart : historique { "prices": [[ms, prix], ...] }
//
// Un échec (réseau, HTTP, JSON) remonte en anyhow::Error ; l'appelant le
// transforme en statut "price feed unavailable".
// ============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::api::PriceFeed;
use crate::config::FeedConfig;
use crate::models::{HistoryWindow, MarketTicker, PriceSample};

// ============================================================================
// Structures pour parser les réponses JSON
// ============================================================================

/// Une ligne de /coins/markets
#[derive(Debug, Deserialize)]
struct MarketEntry {
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    total_volume: Option<f64>,
}

/// Réponse de /market_chart (les autres séries sont ignorées)
#[derive(Debug, Deserialize)]
struct MarketChart {
    #[serde(default)]
    prices: Vec<(f64, f64)>,
}

/// Client HTTP CoinGecko
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    config: FeedConfig,
}

impl CoinGeckoClient {
    pub fn new(config: FeedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pichart/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .context("Échec de la création du client HTTP")?;
        Ok(Self { client, config })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url = %url, "Sending HTTP request to CoinGecko");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Échec de la requête HTTP vers CoinGecko")?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "CoinGecko returned error status");
            anyhow::bail!("CoinGecko a retourné une erreur : HTTP {}", status);
        }

        response
            .json()
            .await
            .context("Échec du parsing JSON de la réponse CoinGecko")
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoClient {
    #[instrument(skip(self), fields(coin = %self.config.coin_id))]
    async fn fetch_current(&self) -> Result<MarketTicker> {
        let url = build_markets_url(&self.config);
        let entries: Vec<MarketEntry> = self.get_json(&url).await?;
        let ticker = parse_markets(entries)?;
        info!(price = ticker.price, "Fetched current price");
        Ok(ticker)
    }

    #[instrument(skip(self), fields(coin = %self.config.coin_id))]
    async fn fetch_history(&self, window: HistoryWindow) -> Result<Vec<PriceSample>> {
        let url = build_history_url(&self.config, window);
        let chart: MarketChart = self.get_json(&url).await?;
        let samples = parse_history(chart);
        info!(samples = samples.len(), "Fetched price history");
        Ok(samples)
    }
}

/// URL du prix courant
fn build_markets_url(config: &FeedConfig) -> String {
    format!(
        "{}/coins/markets?vs_currency={}&ids={}&order=market_cap_desc&per_page=1&page=1&sparkline=false&price_change_percentage=24h",
        config.base_url, config.vs_currency, config.coin_id
    )
}

/// URL de l'historique journalier
fn build_history_url(config: &FeedConfig, window: HistoryWindow) -> String {
    format!(
        "{}/coins/{}/market_chart?vs_currency={}&days={}&interval=daily",
        config.base_url,
        config.coin_id,
        config.vs_currency,
        window.to_query()
    )
}

/// Première ligne de /coins/markets ; champs absents -> 0
fn parse_markets(entries: Vec<MarketEntry>) -> Result<MarketTicker> {
    let entry = entries
        .into_iter()
        .next()
        .context("Aucune donnée de marché retournée par CoinGecko")?;

    Ok(MarketTicker::new(
        entry.current_price.unwrap_or(0.0),
        entry.price_change_percentage_24h.unwrap_or(0.0),
        entry.total_volume.unwrap_or(0.0),
    ))
}

/// [[ms, prix], ...] -> Vec<PriceSample> (timestamps hors plage ignorés)
fn parse_history(chart: MarketChart) -> Vec<PriceSample> {
    let total = chart.prices.len();
    let samples: Vec<PriceSample> = chart
        .prices
        .into_iter()
        .filter_map(|(t, price)| PriceSample::from_millis(t as i64, price))
        .collect();

    if samples.len() < total {
        warn!(skipped = total - samples.len(), total, "Skipped history points with invalid timestamps");
    }
    samples
}

// ============================================================================
// Tests unitaires
// ============================================================================
