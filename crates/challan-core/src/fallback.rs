//! Deterministic fallback extraction from plain OCR text.
//!
//! Used when the model path is unavailable, misconfigured, or its answer
//! cannot be salvaged. Labeled patterns pick out scalar fields; a keyword
//! heuristic locates the single product row and splits it into positional
//! columns. This path never touches the network and never fails: it always
//! returns a complete (possibly mostly-default) record.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::config::ExtractionConfig;
use crate::mapper::{normalize_date, parse_number};
use crate::record::{FieldValue, InventoryRecord};
use crate::schema::{self, FieldKind};

lazy_static! {
    // Header and summary fields, anchored to their printed labels.
    static ref ORDER_NO: Regex =
        Regex::new(r"(?i)Order No[.:=\s]+([A-Za-z0-9\-/]+)").unwrap();
    static ref ORDER_DATE: Regex =
        Regex::new(r"(?i)Order Date[.:=\s]+([0-9/\-.]+)").unwrap();
    static ref CUSTOMER_NAME: Regex =
        Regex::new(r"(?i)Customer Name[.:=\s]+([A-Za-z .]+)").unwrap();
    static ref CORRESPONDENCE_ADDRESS: Regex =
        Regex::new(r"(?i)Correspondence Address[.:=\s]+([A-Za-z0-9, .\-]+)").unwrap();
    static ref CITY: Regex = Regex::new(r"(?i)City[.:=\s]+([A-Za-z ]+)").unwrap();
    static ref STATE: Regex = Regex::new(r"(?i)State[.:=\s]+([A-Za-z ]+)").unwrap();
    static ref SHIPPING_ADDRESS: Regex =
        Regex::new(r"(?i)Shipping Address[.:=\s]+([A-Za-z0-9, .\-]+)").unwrap();
    static ref NET_PAYABLE: Regex =
        Regex::new(r"(?i)Net Payable[.:=\s]+([0-9,.]+)").unwrap();

    // Item-level fields as labeled text, for documents without a table row.
    static ref ITEM_NAME: Regex =
        Regex::new(r"(?i)Item Name[.:=\s]+([A-Za-z0-9, .]+)").unwrap();
    static ref HSN_CODE: Regex =
        Regex::new(r"(?i)HSN Code[.:=\s]+([A-Za-z0-9]+)").unwrap();
    static ref PACKING: Regex =
        Regex::new(r"(?i)Packing[.:=\s]+([A-Za-z0-9, .]+)").unwrap();
    static ref QUANTITY: Regex = Regex::new(r"(?i)Quantity[.:=\s]+([0-9]+)").unwrap();
    static ref TOTAL_QUANTITY: Regex =
        Regex::new(r"(?i)Total Quantity[.:=\s]+([0-9]+)").unwrap();
    static ref TAX_PERCENT: Regex =
        Regex::new(r"(?i)Tax (?:Percent|%)[.:=\s]+([0-9.]+)").unwrap();
    static ref TAX_AMOUNT: Regex =
        Regex::new(r"(?i)Tax (?:Amount|Amt)[.:=\s]+([0-9,.]+)").unwrap();
    static ref RATE: Regex = Regex::new(r"(?i)Rate[.:=\s]+([0-9,.]+)").unwrap();
    static ref AMOUNT: Regex = Regex::new(r"(?i)Amount[.:=\s]+([0-9,.]+)").unwrap();
}

/// Extract a canonical record from ordered OCR text fragments.
///
/// Returns the record plus one warning per field that fell back to its
/// kind default.
pub fn extract_fallback(
    blocks: &[String],
    config: &ExtractionConfig,
) -> (InventoryRecord, Vec<String>) {
    let text = blocks.join("\n");
    let mut record = InventoryRecord::default();
    let mut warnings = Vec::new();

    debug!(blocks = blocks.len(), chars = text.len(), "running fallback extraction");

    // Header and summary fields.
    set_text(&mut record, "orderNo", first_match(&ORDER_NO, &text, &[]));
    set_text(
        &mut record,
        "orderDate",
        first_match(&ORDER_DATE, &text, &[]).map(|date| {
            if config.normalize_dates {
                normalize_date(&date)
            } else {
                date
            }
        }),
    );
    set_text(&mut record, "customerName", first_match(&CUSTOMER_NAME, &text, &[]));
    set_text(
        &mut record,
        "correspondenceAddress",
        first_match(&CORRESPONDENCE_ADDRESS, &text, &[]),
    );
    set_text(&mut record, "city", first_match(&CITY, &text, &[]));
    set_text(&mut record, "state", first_match(&STATE, &text, &[]));
    set_text(
        &mut record,
        "shippingAddress",
        first_match(&SHIPPING_ADDRESS, &text, &[]),
    );
    set_number(&mut record, "netPayable", first_match(&NET_PAYABLE, &text, &[]));

    // Item-level fields: try the table row first, then labeled text.
    extract_product_row(&mut record, &text, config, &mut warnings);

    if default(&record, "itemName") {
        set_text(&mut record, "itemName", first_match(&ITEM_NAME, &text, &[]));
    }
    if default(&record, "hsnCode") {
        set_text(&mut record, "hsnCode", first_match(&HSN_CODE, &text, &[]));
    }
    if default(&record, "packing") {
        set_text(&mut record, "packing", first_match(&PACKING, &text, &[]));
    }
    if default(&record, "quantity") {
        set_number(
            &mut record,
            "quantity",
            first_match(&QUANTITY, &text, &["total"]),
        );
    }
    if default(&record, "totalQuantity") {
        set_number(&mut record, "totalQuantity", first_match(&TOTAL_QUANTITY, &text, &[]));
    }
    if default(&record, "taxPercent") {
        set_number(&mut record, "taxPercent", first_match(&TAX_PERCENT, &text, &[]));
    }
    if default(&record, "taxAmt") {
        set_number(&mut record, "taxAmt", first_match(&TAX_AMOUNT, &text, &[]));
    }
    if default(&record, "rate") {
        set_number(&mut record, "rate", first_match(&RATE, &text, &[]));
    }
    if default(&record, "amount") {
        set_number(&mut record, "amount", first_match(&AMOUNT, &text, &["tax", "net"]));
    }

    // One warning per field that ended up at its kind default.
    for spec in schema::fields() {
        if record.is_default(spec.id).unwrap_or(false) {
            let default_name = match spec.kind {
                FieldKind::Text => "empty string",
                FieldKind::Number => "0",
            };
            warnings.push(format!(
                "{}: not found in OCR text, defaulted to {default_name}",
                spec.id
            ));
        }
    }

    (record, warnings)
}

/// First capture of `re` in `text` whose label is not immediately preceded
/// by one of `excluded` words (so "Amount" does not match inside
/// "Tax Amount", nor "Quantity" inside "Total Quantity").
fn first_match(re: &Regex, text: &str, excluded: &[&str]) -> Option<String> {
    for caps in re.captures_iter(text) {
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let preceding = text[..start].trim_end().to_lowercase();
        if excluded.iter().any(|word| preceding.ends_with(word)) {
            continue;
        }
        let value = caps[1].trim().to_string();
        if !value.is_empty() {
            return Some(value);
        }
    }
    None
}

/// Locate the product row via the keyword set and split it on `|` into
/// positional columns. Captures a single row; when several lines match,
/// the first wins and a warning records the rest being dropped.
fn extract_product_row(
    record: &mut InventoryRecord,
    text: &str,
    config: &ExtractionConfig,
    warnings: &mut Vec<String>,
) {
    let keywords: Vec<String> = config
        .line_item_keywords
        .iter()
        .map(|k| k.to_lowercase())
        .collect();

    let matching: Vec<&str> = text
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            keywords.iter().any(|k| lower.contains(k.as_str()))
        })
        .collect();

    let Some(row) = matching.first() else {
        return;
    };

    if matching.len() > 1 {
        warnings.push(format!(
            "line items: {} rows matched the keyword set, only the first was captured",
            matching.len()
        ));
    }

    let cols: Vec<&str> = row
        .split('|')
        .map(str::trim)
        .filter(|col| !col.is_empty())
        .collect();

    if cols.len() < 8 {
        debug!(columns = cols.len(), "product row too short, skipping");
        return;
    }

    let col = |i: usize| cols.get(i).map(|s| s.to_string());

    set_text(record, "itemName", col(1));
    set_text(record, "hsnCode", col(2));
    set_text(record, "packing", col(3));
    set_number(record, "quantity", col(4));
    set_number(record, "totalQuantity", col(5));
    set_number(record, "taxPercent", col(6));
    set_number(record, "taxAmt", col(7));
    set_number(record, "rate", col(8));
    set_number(record, "amount", col(9));
}

fn set_text(record: &mut InventoryRecord, id: &str, value: Option<String>) {
    if let Some(text) = value {
        let _ = record.set(id, FieldValue::Text(text));
    }
}

fn set_number(record: &mut InventoryRecord, id: &str, value: Option<String>) {
    if let Some(number) = value.as_deref().and_then(parse_number) {
        let _ = record.set(id, FieldValue::Number(number));
    }
}

fn default(record: &InventoryRecord, id: &str) -> bool {
    record.is_default(id).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn blocks(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_labeled_fields_extracted() {
        let (record, warnings) = extract_fallback(
            &blocks(&["Order No: INV-2024-001", "Net Payable: 5900"]),
            &ExtractionConfig::default(),
        );

        assert_eq!(record.order_no, "INV-2024-001");
        assert_eq!(record.net_payable, 5900.0);
        // 15 fields stayed at their defaults and each produced a warning.
        assert_eq!(warnings.len(), 15);
        assert!(warnings.iter().any(|w| w.starts_with("customerName:")));
    }

    #[test]
    fn test_empty_input_yields_full_default_record() {
        let (record, warnings) = extract_fallback(&[], &ExtractionConfig::default());

        assert_eq!(record, InventoryRecord::default());
        assert_eq!(warnings.len(), 17);
    }

    #[test]
    fn test_product_row_split_by_pipe() {
        let (record, _) = extract_fallback(
            &blocks(&[
                "Order No: CHL-7",
                "1 | Eco Widget | 847130 | Box of 10 | 5 | 50 | 18 | 900 | 1000 | 5000",
            ]),
            &ExtractionConfig::default(),
        );

        assert_eq!(record.item_name, "Eco Widget");
        assert_eq!(record.hsn_code, "847130");
        assert_eq!(record.packing, "Box of 10");
        assert_eq!(record.quantity, 5.0);
        assert_eq!(record.total_quantity, 50.0);
        assert_eq!(record.tax_percent, 18.0);
        assert_eq!(record.tax_amt, 900.0);
        assert_eq!(record.rate, 1000.0);
        assert_eq!(record.amount, 5000.0);
    }

    #[test]
    fn test_short_product_row_leaves_item_defaults() {
        let (record, _) = extract_fallback(
            &blocks(&["1 | Eco Widget | 847130"]),
            &ExtractionConfig::default(),
        );
        assert_eq!(record.item_name, "");
        assert_eq!(record.quantity, 0.0);
    }

    #[test]
    fn test_multiple_product_rows_warns_and_keeps_first() {
        let (record, warnings) = extract_fallback(
            &blocks(&[
                "1 | Eco Widget | 847130 | Box | 5 | 50 | 18 | 900 | 1000 | 5000",
                "2 | Cool Gadget | 847150 | Bag | 2 | 20 | 18 | 360 | 1000 | 2000",
            ]),
            &ExtractionConfig::default(),
        );

        assert_eq!(record.item_name, "Eco Widget");
        assert!(warnings.iter().any(|w| w.contains("only the first")));
    }

    #[test]
    fn test_quantity_does_not_match_total_quantity() {
        let (record, _) = extract_fallback(
            &blocks(&["Total Quantity: 50"]),
            &ExtractionConfig::default(),
        );
        assert_eq!(record.total_quantity, 50.0);
        assert_eq!(record.quantity, 0.0);
    }

    #[test]
    fn test_amount_does_not_match_tax_amount() {
        let (record, _) = extract_fallback(
            &blocks(&["Tax Amount: 900"]),
            &ExtractionConfig::default(),
        );
        assert_eq!(record.tax_amt, 900.0);
        assert_eq!(record.amount, 0.0);
    }

    #[test]
    fn test_labeled_item_fields_without_table_row() {
        let (record, _) = extract_fallback(
            &blocks(&[
                "Item Name: Premium Widget",
                "HSN Code: 847130",
                "Quantity: 5",
            ]),
            &ExtractionConfig::default(),
        );
        assert_eq!(record.item_name, "Premium Widget");
        assert_eq!(record.hsn_code, "847130");
        assert_eq!(record.quantity, 5.0);
    }

    #[test]
    fn test_never_fails_on_garbage() {
        let (record, warnings) = extract_fallback(
            &blocks(&["%%%###", "|||||", "::::"]),
            &ExtractionConfig::default(),
        );
        assert_eq!(record, InventoryRecord::default());
        assert_eq!(warnings.len(), 17);
    }
}
