//! Per-package fan-out: one queue message for every package of every fulfillment.

use serde::{Deserialize, Serialize};

use crate::error::MessageError;
use crate::model::{FulfillmentRecord, ParsedBatch};

/// Payload of a single queue message.
///
/// `data` always carries exactly one package, along with the full header, so
/// that each message can be processed on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchMessage {
    pub store_identifier: u64,
    pub source_file_name: String,
    pub data: FulfillmentRecord,
}

impl DispatchMessage {
    pub fn to_json(&self) -> Result<String, MessageError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Split `batch` into one [`DispatchMessage`] per package, record by record.
///
/// Records without packages contribute nothing.
pub fn fan_out(batch: &ParsedBatch, source_name: &str) -> Result<Vec<DispatchMessage>, MessageError> {
    if batch.is_empty() {
        return Err(MessageError::EmptyBatch {
            source_name: source_name.to_string(),
        });
    }

    Ok(batch
        .fulfillments
        .iter()
        .flat_map(|record| {
            record.packages.iter().map(move |package| DispatchMessage {
                store_identifier: batch.store_identifier,
                source_file_name: source_name.to_string(),
                data: record.with_single_package(package),
            })
        })
        .collect())
}

/// [`fan_out`] followed by JSON serialization of each message.
pub fn build_messages(batch: &ParsedBatch, source_name: &str) -> Result<Vec<String>, MessageError> {
    let messages = fan_out(batch, source_name)?
        .iter()
        .map(DispatchMessage::to_json)
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        source = source_name,
        fulfillments = batch.fulfillments.len(),
        messages = messages.len(),
        "built dispatch messages"
    );
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FulfillmentHeader, LineItem, PackageRecord};

    fn package(tracking: &str, lines: usize) -> PackageRecord {
        PackageRecord {
            tracking_number: tracking.into(),
            package_ship_date: "2024-01-05".into(),
            lines: (0..lines)
                .map(|i| LineItem {
                    sku: format!("SKU-{i}"),
                    upc: String::new(),
                    quantity: 1,
                })
                .collect(),
        }
    }

    fn record(order_id: u64, packages: Vec<PackageRecord>) -> FulfillmentRecord {
        FulfillmentRecord {
            header: FulfillmentHeader {
                order_id,
                ship_date: "2024-01-05".into(),
                shipping_carrier: "UPS".into(),
                fulfill_entire_order: Some(true),
            },
            packages,
        }
    }

    #[test]
    fn one_message_per_package_in_order() {
        let batch = ParsedBatch {
            store_identifier: 12345,
            fulfillments: vec![
                record(1, vec![package("A", 2), package("B", 0)]),
                record(2, vec![]),
                record(3, vec![package("C", 1)]),
            ],
        };
        let messages = fan_out(&batch, "e102.xml").unwrap();
        let order: Vec<_> = messages
            .iter()
            .map(|m| (m.data.header.order_id, m.data.packages[0].tracking_number.as_str()))
            .collect();
        assert_eq!(order, vec![(1, "A"), (1, "B"), (3, "C")]);
        assert!(messages.iter().all(|m| m.data.packages.len() == 1));
        assert!(messages.iter().all(|m| m.source_file_name == "e102.xml"));
    }

    #[test]
    fn empty_batch_is_rejected() {
        let batch = ParsedBatch {
            store_identifier: 1,
            fulfillments: vec![],
        };
        let err = build_messages(&batch, "empty.xml").unwrap_err();
        assert!(matches!(err, MessageError::EmptyBatch { .. }));
    }

    #[test]
    fn wire_format_is_field_named() {
        let batch = ParsedBatch {
            store_identifier: 12345,
            fulfillments: vec![record(9001, vec![package("1Z", 1)])],
        };
        let json = build_messages(&batch, "e102.xml").unwrap().remove(0);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["storeIdentifier"], 12345);
        assert_eq!(value["sourceFileName"], "e102.xml");
        assert_eq!(value["data"]["orderId"], 9001);
        assert_eq!(value["data"]["fulfillEntireOrder"], true);
        assert_eq!(value["data"]["packages"][0]["trackingNumber"], "1Z");
        assert_eq!(value["data"]["packages"][0]["lines"][0]["sku"], "SKU-0");

        let back: DispatchMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data.header.order_id, 9001);
    }
}
