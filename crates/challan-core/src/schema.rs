//! The canonical field schema registry.
//!
//! Every extractable field of an invoice/challan record is described here,
//! exactly once, at compile time. The prompt builder, the field mapper and
//! the fallback extractor all derive from this table; nothing else in the
//! crate hardcodes field knowledge.

use crate::error::SchemaError;

/// Value kind of a canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text; defaults to the empty string when unknown.
    Text,
    /// Numeric value; defaults to zero when unknown.
    Number,
}

impl FieldKind {
    /// Name used when rendering the field into the extraction prompt.
    pub fn prompt_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::Number => "number",
        }
    }
}

/// Immutable description of one canonical field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Canonical identifier (the serialized record key).
    pub id: &'static str,
    /// Value kind.
    pub kind: FieldKind,
    /// Human description rendered into the prompt.
    pub description: &'static str,
    /// Format hint rendered into the prompt.
    pub format: &'static str,
    /// Example value rendered into the prompt.
    pub example: &'static str,
    /// Human-readable label variants the model is expected to use as keys.
    pub labels: &'static [&'static str],
}

/// The 17 canonical fields, in registry order.
pub static FIELDS: [FieldSpec; 17] = [
    FieldSpec {
        id: "orderNo",
        kind: FieldKind::Text,
        description: "Order/Invoice/Challan number",
        format: "Usually starts with INV/CHL/ORD",
        example: "INV-2024-001",
        labels: &["Order No", "Order Number", "Invoice No"],
    },
    FieldSpec {
        id: "orderDate",
        kind: FieldKind::Text,
        description: "Date of order/invoice",
        format: "DD/MM/YYYY",
        example: "15/03/2024",
        labels: &["Date", "Order Date", "Invoice Date"],
    },
    FieldSpec {
        id: "customerName",
        kind: FieldKind::Text,
        description: "Full name of the customer",
        format: "Complete name as shown on invoice",
        example: "John Doe",
        labels: &["Customer Name"],
    },
    FieldSpec {
        id: "correspondenceAddress",
        kind: FieldKind::Text,
        description: "Complete correspondence address",
        format: "Full address including street, area, etc.",
        example: "123 Main Street, Area 51",
        labels: &["Correspondence Address"],
    },
    FieldSpec {
        id: "city",
        kind: FieldKind::Text,
        description: "City name",
        format: "City name only",
        example: "Mumbai",
        labels: &["City"],
    },
    FieldSpec {
        id: "state",
        kind: FieldKind::Text,
        description: "State name",
        format: "State name only",
        example: "Maharashtra",
        labels: &["State"],
    },
    FieldSpec {
        id: "shippingAddress",
        kind: FieldKind::Text,
        description: "Complete shipping address",
        format: "Full shipping address if different from correspondence",
        example: "456 Delivery Street, Area 52",
        labels: &["Shipping Address"],
    },
    FieldSpec {
        id: "itemName",
        kind: FieldKind::Text,
        description: "Name of the product/item",
        format: "Complete product name",
        example: "Premium Quality Widget",
        labels: &["Item Name"],
    },
    FieldSpec {
        id: "hsnCode",
        kind: FieldKind::Text,
        description: "HSN code of the item",
        format: "6-8 digit number",
        example: "847130",
        labels: &["HSN Code", "HSN"],
    },
    FieldSpec {
        id: "packing",
        kind: FieldKind::Text,
        description: "Packing details",
        format: "Packing information",
        example: "Box of 10 units",
        labels: &["Packaging", "Packing"],
    },
    FieldSpec {
        id: "quantity",
        kind: FieldKind::Number,
        description: "Quantity of items",
        format: "Numeric value",
        example: "5",
        labels: &["Quantity", "Qty"],
    },
    FieldSpec {
        id: "totalQuantity",
        kind: FieldKind::Number,
        description: "Total quantity including packing",
        format: "Numeric value",
        example: "50",
        labels: &["Total Quantity"],
    },
    FieldSpec {
        id: "taxPercent",
        kind: FieldKind::Number,
        description: "Tax percentage",
        format: "Numeric value without % symbol",
        example: "18",
        labels: &["Tax %", "Tax Percent", "Tax Percentage"],
    },
    FieldSpec {
        id: "taxAmt",
        kind: FieldKind::Number,
        description: "Tax amount",
        format: "Numeric value without currency symbol",
        example: "900",
        labels: &["Tax Amount", "Tax Amt"],
    },
    FieldSpec {
        id: "rate",
        kind: FieldKind::Number,
        description: "Rate per unit",
        format: "Numeric value without currency symbol",
        example: "1000",
        labels: &["Rate"],
    },
    FieldSpec {
        id: "amount",
        kind: FieldKind::Number,
        description: "Total amount before tax",
        format: "Numeric value without currency symbol",
        example: "5000",
        labels: &["Amount"],
    },
    FieldSpec {
        id: "netPayable",
        kind: FieldKind::Number,
        description: "Final amount including tax",
        format: "Numeric value without currency symbol",
        example: "5900",
        labels: &["Net Payable"],
    },
];

/// All field specs in registry order.
pub fn fields() -> &'static [FieldSpec] {
    &FIELDS
}

/// Look up the kind of a canonical field id.
pub fn field_kind(id: &str) -> Result<FieldKind, SchemaError> {
    FIELDS
        .iter()
        .find(|spec| spec.id == id)
        .map(|spec| spec.kind)
        .ok_or_else(|| SchemaError::UnknownField(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_seventeen_fields() {
        assert_eq!(fields().len(), 17);
    }

    #[test]
    fn test_registry_ids_are_unique() {
        let mut ids: Vec<&str> = fields().iter().map(|f| f.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 17);
    }

    #[test]
    fn test_field_kind_lookup() {
        assert_eq!(field_kind("orderNo").unwrap(), FieldKind::Text);
        assert_eq!(field_kind("netPayable").unwrap(), FieldKind::Number);
        assert!(matches!(
            field_kind("nope"),
            Err(SchemaError::UnknownField(_))
        ));
    }

    #[test]
    fn test_registry_order() {
        assert_eq!(fields()[0].id, "orderNo");
        assert_eq!(fields()[16].id, "netPayable");
    }
}
