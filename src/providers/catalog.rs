use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::models::StorePart;
use crate::providers::variance::{FixedVariance, MarketVariance, PriceVariance};
use crate::search::matches_query;

/// Source of store/part records for a search query. Implementations return
/// flat rows, one per part per store; grouping and ranking happen in the
/// search aggregation.
#[async_trait]
pub trait PartCatalog: Send + Sync + 'static {
    async fn search(&self, query: &str) -> Result<Vec<StorePart>>;
}

struct StoreFront {
    name: &'static str,
    address: &'static str,
    distance: f64,
}

struct CatalogPart {
    sku: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    base_price: i64,
}

const STORE_FRONTS: &[StoreFront] = &[
    StoreFront {
        name: "Ace Hardware",
        address: "123 S Main St",
        distance: 1.2,
    },
    StoreFront {
        name: "Home Depot",
        address: "4500 Commerce Blvd",
        distance: 3.8,
    },
    StoreFront {
        name: "Lowe's",
        address: "2200 Ranch Rd",
        distance: 4.5,
    },
    StoreFront {
        name: "True Value",
        address: "77 Oak St",
        distance: 2.1,
    },
];

const CATALOG: &[CatalogPart] = &[
    CatalogPart {
        sku: "cp-050",
        name: "Copper pipe 1/2 in.",
        description: "Type L copper supply pipe, 10 ft length",
        category: "Plumbing",
        base_price: 1_899,
    },
    CatalogPart {
        sku: "wax-kit",
        name: "Wax ring kit",
        description: "Toilet wax ring with brass closet bolts",
        category: "Plumbing",
        base_price: 649,
    },
    CatalogPart {
        sku: "fill-valve",
        name: "Fill valve",
        description: "Universal toilet fill valve, adjustable height",
        category: "Plumbing",
        base_price: 1_299,
    },
    CatalogPart {
        sku: "flapper",
        name: "Toilet flapper",
        description: "2 in. universal flapper with chain",
        category: "Plumbing",
        base_price: 549,
    },
    CatalogPart {
        sku: "p-trap",
        name: "P-trap assembly",
        description: "1-1/2 in. PVC P-trap with slip joints",
        category: "Plumbing",
        base_price: 879,
    },
    CatalogPart {
        sku: "supply-line",
        name: "Toilet supply line",
        description: "Braided stainless supply line, 12 in.",
        category: "Plumbing",
        base_price: 799,
    },
    CatalogPart {
        sku: "cap-455",
        name: "Run capacitor 45/5",
        description: "45/5 MFD 440V dual run capacitor",
        category: "HVAC",
        base_price: 2_499,
    },
    CatalogPart {
        sku: "contactor-2p",
        name: "Contactor 2-pole",
        description: "30A condenser contactor, 24V coil",
        category: "HVAC",
        base_price: 2_199,
    },
    CatalogPart {
        sku: "igniter",
        name: "Hot surface igniter",
        description: "Furnace hot surface igniter, silicon nitride",
        category: "HVAC",
        base_price: 3_499,
    },
    CatalogPart {
        sku: "filter-16251",
        name: "Air filter 16x25x1",
        description: "MERV 8 pleated air filter",
        category: "HVAC",
        base_price: 1_099,
    },
    CatalogPart {
        sku: "breaker-15",
        name: "Breaker 15A",
        description: "15A single-pole circuit breaker",
        category: "Electrical",
        base_price: 1_249,
    },
    CatalogPart {
        sku: "gfci-20",
        name: "GFCI outlet",
        description: "20A tamper-resistant GFCI receptacle",
        category: "Electrical",
        base_price: 2_299,
    },
];

/// Built-in catalog covering the local hardware stores. Each store quotes a
/// matching part independently through the variance strategy.
pub struct MockCatalog {
    variance: Arc<dyn PriceVariance>,
}

impl MockCatalog {
    pub fn new(variance: Arc<dyn PriceVariance>) -> Self {
        Self { variance }
    }

    /// Fixed prices, everything in stock. Used as the canned substitute when
    /// an external catalog fails, and by tests.
    pub fn deterministic() -> Self {
        Self::new(Arc::new(FixedVariance))
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new(Arc::new(MarketVariance::default()))
    }
}

#[async_trait]
impl PartCatalog for MockCatalog {
    async fn search(&self, query: &str) -> Result<Vec<StorePart>> {
        let mut results = Vec::new();
        for part in CATALOG {
            if !matches_query(query, &[part.name, part.description, part.category]) {
                continue;
            }
            for store in STORE_FRONTS {
                let quote = self.variance.quote(part.base_price);
                results.push(StorePart {
                    id: format!("{}-{}", slug(store.name), part.sku),
                    store: store.name.to_string(),
                    name: part.name.to_string(),
                    price: quote.price_cents,
                    in_stock: quote.in_stock,
                    image: None,
                    description: part.description.to_string(),
                    address: store.address.to_string(),
                    distance: store.distance,
                });
            }
        }
        Ok(results)
    }
}

fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Catalog backed by an external store-data endpoint returning the same
/// flat record shape.
pub struct HttpCatalog {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCatalog {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build catalog HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl PartCatalog for HttpCatalog {
    async fn search(&self, query: &str) -> Result<Vec<StorePart>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", query)])
            .send()
            .await
            .context("store catalog request failed")?
            .error_for_status()
            .context("store catalog returned an error status")?;

        let parts = response
            .json()
            .await
            .context("store catalog returned malformed records")?;
        Ok(parts)
    }
}
