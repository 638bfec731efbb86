//! Extraction prompt construction.
//!
//! The prompt is a pure render of the field schema registry plus a fixed
//! rule list: same registry in, same text out.

use crate::schema::FieldSpec;

/// Fixed extraction rules sent to the model, in order.
pub static EXTRACTION_RULES: [&str; 9] = [
    "If a field is not found, use an empty string for text fields and 0 for numeric fields",
    "Convert all numeric values to numbers (remove currency symbols, commas)",
    "Clean up addresses by removing extra spaces and newlines",
    "For dates, convert to DD/MM/YYYY format",
    "For amounts, remove currency symbols and convert to numbers",
    "For HSN codes, ensure they are 6-8 digits",
    "For order numbers, preserve the original format",
    "For names and addresses, preserve proper capitalization",
    "For quantities, ensure they are positive numbers",
];

/// Build the natural-language extraction instruction for the given fields
/// and rules. One description line per field, in the order given, then the
/// rule list, then a literal JSON-only instruction.
pub fn build_prompt(fields: &[FieldSpec], rules: &[&str]) -> String {
    let field_lines: String = fields
        .iter()
        .map(|field| {
            format!(
                "- {}: {} ({}, format: {}, example: {})\n",
                field.id,
                field.kind.prompt_name(),
                field.description,
                field.format,
                field.example
            )
        })
        .collect();

    let rule_lines: String = rules.iter().map(|rule| format!("- {}\n", rule)).collect();

    format!(
        "You are an expert at extracting structured data from invoices and challans. \
         Extract the following information from the provided document and return it as a JSON object.\n\
         \n\
         Required fields and their formats:\n\
         {field_lines}\
         \n\
         Rules for extraction:\n\
         {rule_lines}\
         \n\
         Return ONLY a valid JSON object with exactly these field identifiers as keys. \
         Do not include any explanations or additional text."
    )
}

/// The default prompt over the full registry.
pub fn default_prompt() -> String {
    build_prompt(crate::schema::fields(), &EXTRACTION_RULES)
}
