use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Scheduled,
    InProgress,
    Completed,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateStatus {
    Draft,
    #[serde(alias = "sent")]
    Submitted,
    #[serde(alias = "paid")]
    Approved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Labor,
    Material,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub role: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i64,
    pub work_order_number: String,
    pub customer_id: i64,
    pub technician_id: i64,
    pub status: JobStatus,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub work_order_number: String,
    pub customer_id: i64,
    pub technician_id: i64,
    pub status: JobStatus,
    pub description: String,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub time_zone: Option<String>,
}

/// Structured result of a vision-model analysis. Field names follow the
/// provider contract verbatim, so this shape doubles as the wire schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoAnalysis {
    pub identified: String,
    pub condition: String,
    pub recommendations: String,
    #[serde(default)]
    pub parts: Vec<String>,
    #[serde(default)]
    pub repair_steps: Vec<String>,
    pub estimated_repair_time: String,
    pub skill_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i64,
    pub job_id: i64,
    pub caption: Option<String>,
    pub data_url: String,
    pub taken_at: DateTime<Utc>,
    pub ai_analysis: Option<PhotoAnalysis>,
    pub before_photo: bool,
}

#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub job_id: i64,
    pub caption: Option<String>,
    pub data_url: String,
    pub before_photo: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub job_id: i64,
    pub technician_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub enhanced_content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewNote {
    pub job_id: i64,
    pub technician_id: i64,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub default_price: i64,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateItem {
    pub id: i64,
    pub job_id: i64,
    pub kind: ItemKind,
    pub description: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub store_source: Option<String>,
    pub material_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewEstimateItem {
    pub job_id: i64,
    pub kind: ItemKind,
    pub description: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub store_source: Option<String>,
    pub material_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub id: i64,
    pub job_id: i64,
    pub status: EstimateStatus,
    pub total_amount: i64,
    pub locked_amount: bool,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Flat record returned by a part-catalog provider, one row per part per
/// store. The search aggregation groups these by store for presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePart {
    pub id: String,
    pub store: String,
    pub name: String,
    pub price: i64,
    pub in_stock: bool,
    pub image: Option<String>,
    pub description: String,
    pub address: String,
    pub distance: f64,
}
