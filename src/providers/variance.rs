//! Per-store price variance. The same logical part is quoted independently
//! by each store, so prices and availability differ between stores for one
//! search. The strategy is injected so tests can pin the output.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub price_cents: i64,
    pub in_stock: bool,
}

pub trait PriceVariance: Send + Sync + 'static {
    fn quote(&self, base_cents: i64) -> Quote;
}

/// Production strategy: ±15% around the base price, occasionally out of
/// stock, simulating real market spread between stores.
#[derive(Debug, Clone)]
pub struct MarketVariance {
    pub spread_basis_points: i64,
    pub in_stock_rate: f64,
}

impl Default for MarketVariance {
    fn default() -> Self {
        Self {
            spread_basis_points: 1_500,
            in_stock_rate: 0.85,
        }
    }
}

impl PriceVariance for MarketVariance {
    fn quote(&self, base_cents: i64) -> Quote {
        let mut rng = rand::thread_rng();
        let offset_bp = rng.gen_range(-self.spread_basis_points..=self.spread_basis_points);
        let price_cents = (base_cents + base_cents * offset_bp / 10_000).max(1);
        let in_stock = rng.gen_bool(self.in_stock_rate);
        Quote {
            price_cents,
            in_stock,
        }
    }
}

/// Deterministic strategy: base price unchanged, always in stock. Used for
/// tests and for canned fallback results.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedVariance;

impl PriceVariance for FixedVariance {
    fn quote(&self, base_cents: i64) -> Quote {
        Quote {
            price_cents: base_cents,
            in_stock: true,
        }
    }
}
