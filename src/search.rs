//! Part-search aggregation: groups flat catalog records by store, orders
//! in-stock parts by ascending price ahead of out-of-stock ones, and
//! designates the best price across stores among in-stock parts only.

use serde::{Deserialize, Serialize};

use crate::models::StorePart;

/// Case-insensitive substring match of the query against any of the given
/// fields.
pub fn matches_query(query: &str, fields: &[&str]) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartListing {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub in_stock: bool,
    pub image: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResult {
    pub store: String,
    pub address: String,
    pub distance: f64,
    pub parts: Vec<PartListing>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestPrice {
    pub store: String,
    pub part_id: String,
    pub name: String,
    pub price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub stores: Vec<StoreResult>,
    pub best_price: Option<BestPrice>,
}

/// Cheapest in-stock part across all stores. Out-of-stock parts are listed
/// in results but never win the comparison.
pub fn best_price(parts: &[StorePart]) -> Option<BestPrice> {
    parts
        .iter()
        .filter(|part| part.in_stock)
        .min_by_key(|part| part.price)
        .map(|part| BestPrice {
            store: part.store.clone(),
            part_id: part.id.clone(),
            name: part.name.clone(),
            price: part.price,
        })
}

/// Groups flat records by store, preserving first-seen store order. Within
/// a store, in-stock parts come first sorted by ascending price, then
/// out-of-stock parts sorted the same way.
pub fn group_by_store(parts: Vec<StorePart>) -> Vec<StoreResult> {
    let mut stores: Vec<StoreResult> = Vec::new();
    for part in parts {
        let listing = PartListing {
            id: part.id,
            name: part.name,
            price: part.price,
            in_stock: part.in_stock,
            image: part.image,
            description: part.description,
        };
        match stores.iter().position(|entry| entry.store == part.store) {
            Some(index) => stores[index].parts.push(listing),
            None => stores.push(StoreResult {
                store: part.store,
                address: part.address,
                distance: part.distance,
                parts: vec![listing],
            }),
        }
    }
    for entry in &mut stores {
        entry
            .parts
            .sort_by_key(|part| (!part.in_stock, part.price));
    }
    stores
}

pub fn build_response(query: &str, parts: Vec<StorePart>) -> SearchResponse {
    let best = best_price(&parts);
    SearchResponse {
        query: query.to_string(),
        stores: group_by_store(parts),
        best_price: best,
    }
}
