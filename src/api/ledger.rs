// ============================================================================
// API Client : Horizon (registre du mainnet Pi)
// ============================================================================
// GET {base}/accounts/{compte}/operations?limit=200&order=desc
//
// Réponse (extrait) :
// {
//   "_embedded": { "records": [ { "created_at", "type", "asset_type",
//                                 "from", "to", "source_account", ... } ] },
//   "_links": { "next": { "href": "..." } }
// }
//
// PAGINATION (collect_operations) :
// - Pages lues l'une après l'autre en suivant `_links.next.href`
// - Arrêt sur page vide, absence de lien suivant, ou plafond atteint
// - Le plafond compte les enregistrements bruts reçus, filtrés ou non :
//   la boucle se termine même contre un fournisseur qui pagine sans fin
// - Plafond atteint = succès partiel (`exhausted`), pas une erreur
//
// FILTRE : created_at >= cutoff, asset_type == "native", type "payment" ou
// contenant "claim".
// ============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::api::LedgerProvider;
use crate::config::LedgerConfig;
use crate::models::LedgerEvent;

/// Longueur d'une adresse publique (clé ed25519 encodée)
pub const ADDRESS_LEN: usize = 56;

// ============================================================================
// Validation d'adresse
// ============================================================================

/// Supprime les espaces et passe en majuscules
pub fn normalize_address(input: &str) -> String {
    input.trim().to_uppercase()
}

/// 56 caractères, commence par 'G', puis uniquement A-Z et 0-9
///
/// Contrôle de forme seulement : la somme de contrôle n'est pas vérifiée.
pub fn is_valid_address(address: &str) -> bool {
    address.len() == ADDRESS_LEN
        && address.starts_with('G')
        && address
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

// ============================================================================
// Structures pour parser la réponse JSON
// ============================================================================

/// Une opération telle que renvoyée par Horizon
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperationRecord {
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub source_account: Option<String>,
    #[serde(default)]
    pub claimant: Option<String>,
}

impl OperationRecord {
    /// Paiement ou réclamation en Pi natif, postérieur au cutoff
    pub fn is_relevant(&self, cutoff: DateTime<Utc>) -> bool {
        self.created_at >= cutoff
            && self.asset_type.as_deref() == Some("native")
            && (self.kind == "payment" || self.kind.contains("claim"))
    }

    /// Source : `from`, sinon le compte à l'origine de l'opération.
    /// Destination : `to`, sinon le bénéficiaire de la réclamation.
    pub fn into_event(self, reference: &str) -> LedgerEvent {
        let source = self.from.or(self.source_account).unwrap_or_default();
        let dest = self.to.or(self.claimant).unwrap_or_default();
        LedgerEvent::new(self.created_at, source, dest, reference)
    }
}

/// Une page de résultats et le curseur de la suivante
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationsPage {
    pub records: Vec<OperationRecord>,
    /// URL complète de la page suivante
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HorizonPage {
    #[serde(rename = "_embedded", default)]
    embedded: Option<Embedded>,
    #[serde(rename = "_links", default)]
    links: Option<Links>,
}

#[derive(Debug, Deserialize)]
struct Embedded {
    #[serde(default)]
    records: Vec<OperationRecord>,
}

#[derive(Debug, Deserialize)]
struct Links {
    next: Option<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
}

impl From<HorizonPage> for OperationsPage {
    fn from(page: HorizonPage) -> Self {
        Self {
            records: page.embedded.map(|e| e.records).unwrap_or_default(),
            next_cursor: page
                .links
                .and_then(|l| l.next)
                .map(|n| n.href)
                .filter(|href| !href.is_empty()),
        }
    }
}

// ============================================================================
// Client HTTP
// ============================================================================

/// Client de l'API Horizon
#[derive(Debug, Clone)]
pub struct HorizonClient {
    client: reqwest::Client,
    config: LedgerConfig,
}

impl HorizonClient {
    pub fn new(config: LedgerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pichart/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .context("Échec de la création du client HTTP")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}

/// URL de la première page
fn build_operations_url(config: &LedgerConfig, account: &str) -> String {
    format!(
        "{}/accounts/{}/operations?limit={}&order=desc",
        config.base_url, account, config.page_limit
    )
}

#[async_trait]
impl LedgerProvider for HorizonClient {
    async fn fetch_operations_page(&self, account: &str, cursor: Option<&str>) -> Result<OperationsPage> {
        let url = match cursor {
            Some(next) => next.to_string(),
            None => build_operations_url(&self.config, account),
        };
        debug!(url = %url, "Fetching operations page");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Échec de la requête HTTP vers Horizon")?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            warn!(account = %account, "Account not found on ledger");
            anyhow::bail!("Compte introuvable : {}", account);
        }
        if !status.is_success() {
            error!(status = %status, "Horizon returned error status");
            anyhow::bail!("Horizon a retourné une erreur : HTTP {}", status);
        }

        let page: HorizonPage = response
            .json()
            .await
            .context("Échec du parsing JSON de la réponse Horizon")?;
        Ok(page.into())
    }
}

// ============================================================================
// Pagination bornée
// ============================================================================

/// Résultat d'un chargement complet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerLoad {
    /// Opérations retenues, classées pour le compte demandé
    pub events: Vec<LedgerEvent>,
    /// Enregistrements bruts reçus
    pub records_fetched: usize,
    pub pages: usize,
    /// Arrêt sur le plafond de sécurité (résultats partiels)
    pub exhausted: bool,
}

/// Parcourt les pages d'opérations d'un compte jusqu'à épuisement ou plafond
#[instrument(skip(provider, config), fields(max_records = config.max_records))]
pub async fn collect_operations<P: LedgerProvider + ?Sized>(
    provider: &P,
    account: &str,
    config: &LedgerConfig,
) -> Result<LedgerLoad> {
    let mut load = LedgerLoad::default();
    let mut cursor: Option<String> = None;

    loop {
        if load.records_fetched >= config.max_records {
            load.exhausted = true;
            warn!(records = load.records_fetched, "Record cap reached, stopping pagination");
            break;
        }

        let page = provider
            .fetch_operations_page(account, cursor.as_deref())
            .await
            .with_context(|| format!("Échec du chargement de la page {}", load.pages + 1))?;
        load.pages += 1;

        if page.records.is_empty() {
            debug!(pages = load.pages, "Empty page, end of operations");
            break;
        }

        // Ordre décroissant : une page entièrement avant le cutoff est la dernière utile
        let past_cutoff = page.records.iter().all(|r| r.created_at < config.cutoff);

        load.records_fetched += page.records.len();
        load.events.extend(
            page.records
                .into_iter()
                .filter(|r| r.is_relevant(config.cutoff))
                .map(|r| r.into_event(account)),
        );

        if past_cutoff {
            debug!(pages = load.pages, cutoff = %config.cutoff, "Page older than cutoff, stopping pagination");
            break;
        }

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    info!(
        events = load.events.len(),
        records = load.records_fetched,
        pages = load.pages,
        exhausted = load.exhausted,
        "Operations loaded"
    );
    Ok(load)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ME: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
    const OTHER: &str = "GBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";

    fn record(kind: &str, year: i32, from: &str, to: &str) -> OperationRecord {
        OperationRecord {
            created_at: Utc.with_ymd_and_hms(year, 3, 1, 10, 0, 0).unwrap(),
            kind: kind.to_string(),
            asset_type: Some("native".to_string()),
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            source_account: None,
            claimant: None,
        }
    }

    /// Fournisseur qui renvoie toujours une page pleine et un lien suivant
    struct EndlessProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LedgerProvider for EndlessProvider {
        async fn fetch_operations_page(&self, _account: &str, _cursor: Option<&str>) -> Result<OperationsPage> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(OperationsPage {
                records: (0..200).map(|_| record("create_account", 2025, OTHER, ME)).collect(),
                next_cursor: Some(format!("page-{}", n + 1)),
            })
        }
    }

    /// Pages prédéfinies, servies dans l'ordre
    struct ScriptedProvider {
        pages: Vec<OperationsPage>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LedgerProvider for ScriptedProvider {
        async fn fetch_operations_page(&self, _account: &str, _cursor: Option<&str>) -> Result<OperationsPage> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages.get(n).cloned().context("no more pages")
        }
    }

    #[test]
    fn test_address_validation() {
        assert!(is_valid_address(ME));
        assert!(is_valid_address(&normalize_address(&format!("  {}  ", ME.to_lowercase()))));
        assert!(!is_valid_address(&ME[..55]));
        assert!(!is_valid_address(&OTHER.replacen('G', "S", 1)));
        assert!(is_valid_address(&format!("{}7", &ME[..55])));
        assert!(!is_valid_address(&format!("{}-", &ME[..55])));
        assert!(!is_valid_address(&format!("{}a", &ME[..55])));
    }

    #[test]
    fn test_record_filter() {
        let cutoff = LedgerConfig::default().cutoff;

        assert!(record("payment", 2025, OTHER, ME).is_relevant(cutoff));
        assert!(record("claim_claimable_balance", 2025, OTHER, ME).is_relevant(cutoff));
        assert!(record("create_claimable_balance", 2026, ME, OTHER).is_relevant(cutoff));
        assert!(!record("payment", 2024, OTHER, ME).is_relevant(cutoff));
        assert!(!record("create_account", 2025, OTHER, ME).is_relevant(cutoff));

        let mut token = record("payment", 2025, OTHER, ME);
        token.asset_type = Some("credit_alphanum4".to_string());
        assert!(!token.is_relevant(cutoff));
    }

    #[test]
    fn test_into_event_falls_back_to_source_and_claimant() {
        let mut claim = record("claim_claimable_balance", 2025, "", "");
        claim.from = None;
        claim.to = None;
        claim.source_account = Some(OTHER.to_string());
        claim.claimant = Some(ME.to_string());

        let event = claim.into_event(ME);
        assert_eq!(event.source_account, OTHER);
        assert_eq!(event.direction, Direction::In);
    }

    #[test]
    fn test_parse_horizon_page() {
        let json = r#"{
            "_links": { "next": { "href": "https://api.mainnet.minepi.com/accounts/X/operations?cursor=42&limit=200&order=desc" } },
            "_embedded": { "records": [
                { "created_at": "2025-06-01T12:00:00Z", "type": "payment", "asset_type": "native",
                  "from": "GA", "to": "GB", "source_account": "GA", "amount": "1.0000000" },
                { "created_at": "2025-05-01T12:00:00Z", "type": "create_account", "source_account": "GA" }
            ] }
        }"#;
        let page: OperationsPage = serde_json::from_str::<HorizonPage>(json).unwrap().into();

        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].kind, "payment");
        assert_eq!(page.records[1].asset_type, None);
        assert!(page.next_cursor.unwrap().contains("cursor=42"));
    }

    #[test]
    fn test_parse_empty_page() {
        let page: OperationsPage = serde_json::from_str::<HorizonPage>("{}").unwrap().into();
        assert!(page.records.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_build_operations_url() {
        let url = build_operations_url(&LedgerConfig::default(), ME);
        assert_eq!(
            url,
            format!("https://api.mainnet.minepi.com/accounts/{}/operations?limit=200&order=desc", ME)
        );
    }

    #[tokio::test]
    async fn test_endless_provider_stops_at_cap() {
        let provider = EndlessProvider {
            calls: AtomicUsize::new(0),
        };
        let load = collect_operations(&provider, ME, &LedgerConfig::default()).await.unwrap();

        assert!(load.exhausted);
        assert_eq!(load.records_fetched, 2000);
        assert_eq!(load.pages, 10);
        assert!(load.events.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_stops_on_missing_next_link() {
        let provider = ScriptedProvider {
            pages: vec![
                OperationsPage {
                    records: vec![record("payment", 2025, ME, OTHER), record("payment", 2024, OTHER, ME)],
                    next_cursor: Some("next".to_string()),
                },
                OperationsPage {
                    records: vec![record("payment", 2025, OTHER, ME)],
                    next_cursor: None,
                },
            ],
            calls: AtomicUsize::new(0),
        };
        let load = collect_operations(&provider, ME, &LedgerConfig::default()).await.unwrap();

        assert!(!load.exhausted);
        assert_eq!(load.pages, 2);
        assert_eq!(load.records_fetched, 3);
        let directions: Vec<Direction> = load.events.iter().map(|e| e.direction).collect();
        assert_eq!(directions, vec![Direction::Out, Direction::In]);
    }

    #[tokio::test]
    async fn test_stops_once_page_is_older_than_cutoff() {
        let provider = ScriptedProvider {
            pages: vec![
                OperationsPage {
                    records: vec![record("payment", 2025, OTHER, ME)],
                    next_cursor: Some("next".to_string()),
                },
                OperationsPage {
                    records: vec![record("payment", 2024, ME, OTHER), record("payment", 2023, OTHER, ME)],
                    next_cursor: Some("next".to_string()),
                },
                OperationsPage {
                    records: vec![record("payment", 2022, OTHER, ME)],
                    next_cursor: None,
                },
            ],
            calls: AtomicUsize::new(0),
        };
        let load = collect_operations(&provider, ME, &LedgerConfig::default()).await.unwrap();

        assert_eq!(load.pages, 2);
        assert_eq!(load.records_fetched, 3);
        assert_eq!(load.events.len(), 1);
        assert!(!load.exhausted);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        let provider = ScriptedProvider {
            pages: vec![OperationsPage {
                records: Vec::new(),
                next_cursor: Some("next".to_string()),
            }],
            calls: AtomicUsize::new(0),
        };
        let load = collect_operations(&provider, ME, &LedgerConfig::default()).await.unwrap();

        assert_eq!(load.pages, 1);
        assert!(load.events.is_empty());
        assert!(!load.exhausted);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = ScriptedProvider {
            pages: Vec::new(),
            calls: AtomicUsize::new(0),
        };
        assert!(collect_operations(&provider, ME, &LedgerConfig::default()).await.is_err());
    }
}
