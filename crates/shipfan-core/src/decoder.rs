//! Decoder for the `Data945` warehouse shipping notice.
//!
//! The document is array-normalized: any element may repeat, and any element
//! may be missing. Every access here goes through [`children`], [`first`] and
//! [`first_text`], which treat a node as "the first of a possibly-empty
//! sequence". Text fields fall back to `""`; only the integer fields
//! (store, order id, quantity) turn a missing or bad value into an error.
//!
//! ```text
//! Data945
//! ├── WebStore                    "WebStore: 12345"
//! └── documents
//!     └── document*
//!         ├── headerrow           reference, shipdate, transportationcode, fulfillentireorder
//!         └── documentpackages
//!             └── packagerow*     packagenumber, package_shipdate
//!                 └── document_lines
//!                     └── linerow*  SKU, UPC, quantity
//! ```

use roxmltree::{Document, Node};
use tracing::debug;

use crate::error::DecodeError;
use crate::model::{FulfillmentHeader, FulfillmentRecord, LineItem, PackageRecord, ParsedBatch};

/// Name of the document's root element.
pub const ROOT_ELEMENT: &str = "Data945";

mod tag {
    pub const WEB_STORE: &str = "WebStore";
    pub const DOCUMENTS: &str = "documents";
    pub const DOCUMENT: &str = "document";
    pub const HEADER_ROW: &str = "headerrow";
    pub const REFERENCE: &str = "reference";
    pub const SHIP_DATE: &str = "shipdate";
    pub const TRANSPORTATION_CODE: &str = "transportationcode";
    pub const FULFILL_ENTIRE_ORDER: &str = "fulfillentireorder";
    pub const DOCUMENT_PACKAGES: &str = "documentpackages";
    pub const PACKAGE_ROW: &str = "packagerow";
    pub const PACKAGE_NUMBER: &str = "packagenumber";
    pub const PACKAGE_SHIP_DATE: &str = "package_shipdate";
    pub const DOCUMENT_LINES: &str = "document_lines";
    pub const LINE_ROW: &str = "linerow";
    pub const SKU: &str = "SKU";
    pub const UPC: &str = "UPC";
    pub const QUANTITY: &str = "quantity";
}

/// Child elements of `parent` named `name`, in document order.
///
/// An absent parent yields an empty sequence.
pub fn children<'a, 'input: 'a>(
    parent: Option<Node<'a, 'input>>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    parent
        .into_iter()
        .flat_map(|p| p.children())
        .filter(move |c| c.is_element() && c.tag_name().name() == name)
}

/// First child element of `parent` named `name`.
pub fn first<'a, 'input: 'a>(
    parent: Option<Node<'a, 'input>>,
    name: &'static str,
) -> Option<Node<'a, 'input>> {
    children(parent, name).next()
}

/// Trimmed text of the first child element named `name`, or `""` if the
/// element or its text is missing.
pub fn first_text<'a, 'input: 'a>(parent: Option<Node<'a, 'input>>, name: &'static str) -> String {
    first(parent, name)
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

/// Extract the store number from a `WebStore` value such as `"WebStore: 12345"`.
///
/// Every non-digit character is discarded before parsing.
pub fn parse_store_identifier(raw: &str) -> Result<u64, DecodeError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().map_err(|_| DecodeError::FieldExtraction {
        field: "storeIdentifier",
        value: raw.to_string(),
    })
}

fn parse_required<T: std::str::FromStr>(field: &'static str, raw: String) -> Result<T, DecodeError> {
    raw.parse().map_err(|_| DecodeError::FieldExtraction { field, value: raw })
}

/// Optional yes/no flag. Absent or unrecognised values decode to `None`.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "y" | "yes" => Some(true),
        "false" | "0" | "n" | "no" => Some(false),
        _ => None,
    }
}

/// Decode a `Data945` document.
///
/// `source_name` is only used for error context.
pub fn decode(xml: &str, source_name: &str) -> Result<ParsedBatch, DecodeError> {
    let doc = Document::parse(xml).map_err(|e| DecodeError::MalformedDocument {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != ROOT_ELEMENT {
        return Err(DecodeError::MalformedDocument {
            source_name: source_name.to_string(),
            reason: format!(
                "expected root element <{ROOT_ELEMENT}>, found <{}>",
                root.tag_name().name()
            ),
        });
    }

    let store_identifier = parse_store_identifier(&first_text(Some(root), tag::WEB_STORE))?;

    let fulfillments = children(first(Some(root), tag::DOCUMENTS), tag::DOCUMENT)
        .map(decode_document)
        .collect::<Result<Vec<_>, _>>()?;

    if fulfillments.is_empty() {
        return Err(DecodeError::EmptyBatch {
            source_name: source_name.to_string(),
        });
    }

    let batch = ParsedBatch {
        store_identifier,
        fulfillments,
    };
    debug!(
        source = source_name,
        store = batch.store_identifier,
        fulfillments = batch.fulfillments.len(),
        packages = batch.package_count(),
        "decoded fulfillment document"
    );
    Ok(batch)
}

fn decode_document(document: Node<'_, '_>) -> Result<FulfillmentRecord, DecodeError> {
    let row = first(Some(document), tag::HEADER_ROW);

    let header = FulfillmentHeader {
        order_id: parse_required("orderId", first_text(row, tag::REFERENCE))?,
        ship_date: first_text(row, tag::SHIP_DATE),
        shipping_carrier: first_text(row, tag::TRANSPORTATION_CODE),
        fulfill_entire_order: parse_flag(&first_text(row, tag::FULFILL_ENTIRE_ORDER)),
    };

    let packages = children(first(Some(document), tag::DOCUMENT_PACKAGES), tag::PACKAGE_ROW)
        .map(decode_package)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FulfillmentRecord { header, packages })
}

fn decode_package(row: Node<'_, '_>) -> Result<PackageRecord, DecodeError> {
    let lines = children(first(Some(row), tag::DOCUMENT_LINES), tag::LINE_ROW)
        .map(decode_line)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PackageRecord {
        tracking_number: first_text(Some(row), tag::PACKAGE_NUMBER),
        package_ship_date: first_text(Some(row), tag::PACKAGE_SHIP_DATE),
        lines,
    })
}

fn decode_line(row: Node<'_, '_>) -> Result<LineItem, DecodeError> {
    Ok(LineItem {
        sku: first_text(Some(row), tag::SKU),
        upc: first_text(Some(row), tag::UPC),
        quantity: parse_required("quantity", first_text(Some(row), tag::QUANTITY))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_PACKAGES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Data945>
  <WebStore>WebStore: 12345</WebStore>
  <documents>
    <document>
      <headerrow>
        <reference> 9001 </reference>
        <shipdate>2024-01-05</shipdate>
        <transportationcode>UPS</transportationcode>
      </headerrow>
      <documentpackages>
        <packagerow>
          <packagenumber>1Z999AA10123456784</packagenumber>
          <package_shipdate>2024-01-05</package_shipdate>
          <document_lines>
            <linerow><SKU>SKU-1</SKU><UPC>012345678905</UPC><quantity>2</quantity></linerow>
            <linerow><SKU>SKU-2</SKU><quantity>1</quantity></linerow>
          </document_lines>
        </packagerow>
        <packagerow>
          <packagenumber>1Z999AA10123456785</packagenumber>
          <package_shipdate>2024-01-06</package_shipdate>
        </packagerow>
      </documentpackages>
    </document>
  </documents>
</Data945>"#;

    fn doc_with_header(header: &str) -> String {
        format!(
            "<Data945><WebStore>7</WebStore><documents><document>\
             <headerrow>{header}</headerrow></document></documents></Data945>"
        )
    }

    #[test]
    fn decodes_header_packages_and_lines() {
        let batch = decode(TWO_PACKAGES, "sample.xml").unwrap();
        assert_eq!(batch.store_identifier, 12345);
        assert_eq!(batch.fulfillments.len(), 1);

        let rec = &batch.fulfillments[0];
        assert_eq!(rec.header.order_id, 9001);
        assert_eq!(rec.header.ship_date, "2024-01-05");
        assert_eq!(rec.header.shipping_carrier, "UPS");
        assert_eq!(rec.header.fulfill_entire_order, None);

        assert_eq!(rec.packages.len(), 2);
        assert_eq!(rec.packages[0].lines.len(), 2);
        assert_eq!(rec.packages[0].lines[0].upc, "012345678905");
        assert!(rec.packages[1].lines.is_empty());
    }

    #[test]
    fn missing_upc_is_empty_string() {
        let batch = decode(TWO_PACKAGES, "sample.xml").unwrap();
        let line = &batch.fulfillments[0].packages[0].lines[1];
        assert_eq!(line.sku, "SKU-2");
        assert_eq!(line.upc, "");
    }

    #[test]
    fn missing_text_fields_are_empty_strings() {
        let batch = decode(&doc_with_header("<reference>1</reference>"), "x.xml").unwrap();
        let header = &batch.fulfillments[0].header;
        assert_eq!(header.ship_date, "");
        assert_eq!(header.shipping_carrier, "");
        assert!(batch.fulfillments[0].packages.is_empty());
    }

    #[test]
    fn self_closing_element_is_empty_string() {
        let batch = decode(
            &doc_with_header("<reference>1</reference><shipdate/>"),
            "x.xml",
        )
        .unwrap();
        assert_eq!(batch.fulfillments[0].header.ship_date, "");
    }

    #[test]
    fn store_identifier_strips_non_digits() {
        assert_eq!(parse_store_identifier("WebStore: 12345").unwrap(), 12345);
        assert_eq!(parse_store_identifier("42").unwrap(), 42);
        assert!(parse_store_identifier("WebStore:").is_err());
    }

    #[test]
    fn missing_order_id_fails() {
        let err = decode(&doc_with_header("<shipdate>2024-01-05</shipdate>"), "x.xml").unwrap_err();
        assert!(matches!(err, DecodeError::FieldExtraction { field: "orderId", .. }));
    }

    #[test]
    fn non_numeric_order_id_fails() {
        let err = decode(&doc_with_header("<reference>PO-77</reference>"), "x.xml").unwrap_err();
        match err {
            DecodeError::FieldExtraction { field, value } => {
                assert_eq!(field, "orderId");
                assert_eq!(value, "PO-77");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_quantity_fails() {
        let xml = TWO_PACKAGES.replace("<quantity>2</quantity>", "<quantity>two</quantity>");
        let err = decode(&xml, "x.xml").unwrap_err();
        assert!(matches!(err, DecodeError::FieldExtraction { field: "quantity", .. }));
    }

    #[test]
    fn wrong_root_is_malformed() {
        let err = decode("<Data940><WebStore>1</WebStore></Data940>", "x.xml").unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("x.xml"));
    }

    #[test]
    fn unparseable_xml_is_malformed() {
        assert!(decode("<Data945><documents>", "x.xml").unwrap_err().is_malformed());
        assert!(decode("", "x.xml").unwrap_err().is_malformed());
    }

    #[test]
    fn no_documents_is_empty_batch() {
        let err = decode("<Data945><WebStore>1</WebStore><documents/></Data945>", "x.xml")
            .unwrap_err();
        assert!(matches!(err, DecodeError::EmptyBatch { .. }));
    }

    #[test]
    fn fulfill_entire_order_flag() {
        let yes = decode(
            &doc_with_header("<reference>1</reference><fulfillentireorder>Y</fulfillentireorder>"),
            "x.xml",
        )
        .unwrap();
        assert_eq!(yes.fulfillments[0].header.fulfill_entire_order, Some(true));

        let junk = decode(
            &doc_with_header("<reference>1</reference><fulfillentireorder>?</fulfillentireorder>"),
            "x.xml",
        )
        .unwrap();
        assert_eq!(junk.fulfillments[0].header.fulfill_entire_order, None);
    }

    #[test]
    fn only_first_repeated_scalar_is_used() {
        let batch = decode(
            &doc_with_header("<reference>1</reference><reference>2</reference>"),
            "x.xml",
        )
        .unwrap();
        assert_eq!(batch.fulfillments[0].header.order_id, 1);
    }

    #[test]
    fn decode_is_deterministic() {
        let a = decode(TWO_PACKAGES, "sample.xml").unwrap();
        let b = decode(TWO_PACKAGES, "sample.xml").unwrap();
        assert_eq!(a, b);
    }
}
