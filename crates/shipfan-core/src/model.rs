//! Normalized fulfillment model produced by the decoder.
//!
//! Field names serialize in camelCase; this is the shape downstream item
//! processors read out of each queue message.

use serde::{Deserialize, Serialize};

/// One shipped SKU inside a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub sku: String,
    /// Empty when the document carries no UPC.
    #[serde(default)]
    pub upc: String,
    pub quantity: i64,
}

/// One shipped container, identified by its tracking number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRecord {
    pub tracking_number: String,
    pub package_ship_date: String,
    #[serde(default)]
    pub lines: Vec<LineItem>,
}

/// Order-level fields shared by every package of a fulfillment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentHeader {
    pub order_id: u64,
    pub ship_date: String,
    pub shipping_carrier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfill_entire_order: Option<bool>,
}

/// A header plus its packages, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentRecord {
    #[serde(flatten)]
    pub header: FulfillmentHeader,
    #[serde(default)]
    pub packages: Vec<PackageRecord>,
}

impl FulfillmentRecord {
    /// Copy of this record carrying only `package`.
    ///
    /// This is the unit of fan-out: each copy is self-contained, so a consumer
    /// never has to join messages back together.
    pub fn with_single_package(&self, package: &PackageRecord) -> Self {
        Self {
            header: self.header.clone(),
            packages: vec![package.clone()],
        }
    }
}

/// The decoder's output: the store a document belongs to and its fulfillments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedBatch {
    pub store_identifier: u64,
    pub fulfillments: Vec<FulfillmentRecord>,
}

impl ParsedBatch {
    /// Number of packages across every fulfillment (= number of messages).
    pub fn package_count(&self) -> usize {
        self.fulfillments.iter().map(|f| f.packages.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fulfillments.is_empty()
    }
}
