//! Canonical record and request/result types for one extraction.

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::schema::{self, FieldKind};

/// The canonical 17-field inventory record for one invoice/challan.
///
/// The struct shape is the invariant: serialization always yields exactly
/// the registry's key set, never more, never less, regardless of which
/// extraction path produced the record. Text fields default to the empty
/// string and numeric fields to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryRecord {
    pub order_no: String,
    pub order_date: String,
    pub customer_name: String,
    pub correspondence_address: String,
    pub city: String,
    pub state: String,
    pub shipping_address: String,
    pub item_name: String,
    pub hsn_code: String,
    pub packing: String,
    pub quantity: f64,
    pub total_quantity: f64,
    pub tax_percent: f64,
    pub tax_amt: f64,
    pub rate: f64,
    pub amount: f64,
    pub net_payable: f64,
}

/// A coerced field value, matched to the field's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    /// Kind-appropriate default value.
    pub fn default_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => FieldValue::Text(String::new()),
            FieldKind::Number => FieldValue::Number(0.0),
        }
    }
}

impl InventoryRecord {
    /// Set a field by its canonical id.
    ///
    /// A `FieldValue` of the wrong kind is silently coerced to the field's
    /// default; kind mismatches are caught upstream by the mapper.
    pub fn set(&mut self, id: &str, value: FieldValue) -> Result<(), SchemaError> {
        let kind = schema::field_kind(id)?;

        match (kind, value) {
            (FieldKind::Text, FieldValue::Text(text)) => {
                let slot = match id {
                    "orderNo" => &mut self.order_no,
                    "orderDate" => &mut self.order_date,
                    "customerName" => &mut self.customer_name,
                    "correspondenceAddress" => &mut self.correspondence_address,
                    "city" => &mut self.city,
                    "state" => &mut self.state,
                    "shippingAddress" => &mut self.shipping_address,
                    "itemName" => &mut self.item_name,
                    "hsnCode" => &mut self.hsn_code,
                    "packing" => &mut self.packing,
                    _ => unreachable!("registry id with text kind"),
                };
                *slot = text;
            }
            (FieldKind::Number, FieldValue::Number(number)) => {
                let slot = match id {
                    "quantity" => &mut self.quantity,
                    "totalQuantity" => &mut self.total_quantity,
                    "taxPercent" => &mut self.tax_percent,
                    "taxAmt" => &mut self.tax_amt,
                    "rate" => &mut self.rate,
                    "amount" => &mut self.amount,
                    "netPayable" => &mut self.net_payable,
                    _ => unreachable!("registry id with number kind"),
                };
                *slot = number;
            }
            // Wrong-kind value: leave the default in place.
            _ => {}
        }

        Ok(())
    }

    /// True when the field currently holds its kind default.
    pub fn is_default(&self, id: &str) -> Result<bool, SchemaError> {
        let value = match id {
            "orderNo" => self.order_no.is_empty(),
            "orderDate" => self.order_date.is_empty(),
            "customerName" => self.customer_name.is_empty(),
            "correspondenceAddress" => self.correspondence_address.is_empty(),
            "city" => self.city.is_empty(),
            "state" => self.state.is_empty(),
            "shippingAddress" => self.shipping_address.is_empty(),
            "itemName" => self.item_name.is_empty(),
            "hsnCode" => self.hsn_code.is_empty(),
            "packing" => self.packing.is_empty(),
            "quantity" => self.quantity == 0.0,
            "totalQuantity" => self.total_quantity == 0.0,
            "taxPercent" => self.tax_percent == 0.0,
            "taxAmt" => self.tax_amt == 0.0,
            "rate" => self.rate == 0.0,
            "amount" => self.amount == 0.0,
            "netPayable" => self.net_payable == 0.0,
            other => return Err(SchemaError::UnknownField(other.to_string())),
        };
        Ok(value)
    }
}

/// Source document kind declared by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Photographed or scanned image.
    Image,
    /// Multi-page document (PDF).
    Document,
}

/// One extraction request: decoded bytes plus declared media type, and the
/// already-recognized OCR text fragments for the fallback path (empty when
/// no OCR provider output is available).
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub source_kind: SourceKind,
    pub text_blocks: Vec<String>,
}

impl ExtractionRequest {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, source_kind: SourceKind) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            source_kind,
            text_blocks: Vec::new(),
        }
    }

    /// Attach recognized OCR text fragments for fallback extraction.
    pub fn with_text_blocks(mut self, blocks: Vec<String>) -> Self {
        self.text_blocks = blocks;
        self
    }
}

/// Which extraction path produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    /// Generative vision model.
    Model,
    /// Deterministic regex extraction over OCR text.
    Fallback,
}

/// Result of one extraction. Ephemeral: handed back to the caller, never
/// persisted by this crate.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// The canonical record.
    pub record: InventoryRecord,

    /// Which path produced the record.
    pub source: ExtractionSource,

    /// Ordered warnings accumulated along the way.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Raw model answer preserved when it could not be salvaged as JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_record_serializes_all_keys() {
        let record = InventoryRecord::default();
        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 17);
        for spec in crate::schema::fields() {
            assert!(object.contains_key(spec.id), "missing key {}", spec.id);
        }
    }

    #[test]
    fn test_set_by_id() {
        let mut record = InventoryRecord::default();
        record
            .set("orderNo", FieldValue::Text("INV-1".to_string()))
            .unwrap();
        record.set("netPayable", FieldValue::Number(5900.0)).unwrap();

        assert_eq!(record.order_no, "INV-1");
        assert_eq!(record.net_payable, 5900.0);
        assert!(!record.is_default("orderNo").unwrap());
        assert!(record.is_default("amount").unwrap());
    }

    #[test]
    fn test_set_unknown_field_fails() {
        let mut record = InventoryRecord::default();
        assert!(record.set("bogus", FieldValue::Number(1.0)).is_err());
    }

    #[test]
    fn test_wrong_kind_value_keeps_default() {
        let mut record = InventoryRecord::default();
        record
            .set("quantity", FieldValue::Text("five".to_string()))
            .unwrap();
        assert_eq!(record.quantity, 0.0);
    }
}
