//! Prompts for remote ingredient analysis.
//!
//! The preamble is fixed; the instruction names the product category so
//! the model knows whether it is reading a food label or a cleaner.

use inspector_core::Category;
use serde_json::{json, Value as JsonValue};

/// System framing shared by every analysis request.
pub const SYSTEM_PREAMBLE: &str = r#"
You are an ingredient-safety analyst reading a photographed product label.

You report only ingredients you can read on the label.
You do not guess at ingredients that are not visible.
You answer with a single JSON object and nothing else: no prose, no Markdown.
"#;

const INSTRUCTION_BODY: &str = r#"
## Task
1. List every ingredient printed on the label, in label order.
2. Classify each ingredient as exactly one of "safe", "moderate" or "unsafe".
3. Describe each ingredient in at most 10 words.
4. Add a short "risk" tag (for example "Irritant" or "Allergen") where one applies.
5. If an ingredient is banned anywhere, list the jurisdictions in "bannedIn"
   and give a one-sentence "banReason".
6. Give an overall safety "score" from 0 (dangerous) to 100 (entirely safe).
7. Give a one-sentence "summary".

## Output Format (JSON)
{
  "score": 0-100,
  "summary": "one sentence",
  "ingredients": [
    {
      "name": "string",
      "status": "safe" | "moderate" | "unsafe",
      "description": "at most 10 words",
      "risk": "optional short tag",
      "bannedIn": ["optional", "jurisdictions"],
      "banReason": "optional sentence"
    }
  ]
}

Respond with the JSON object only.
"#;

/// Build the instruction for analyzing a label in `category`.
pub fn analysis_instruction(category: &Category) -> String {
    format!(
        "Analyze the ingredient list in this image of a product from the \"{}\" category.\n{}",
        category.display_name(),
        INSTRUCTION_BODY
    )
}

/// Structured-output hint sent alongside the instruction.
///
/// Written in the provider's OpenAPI subset (upper-case types, `nullable`)
/// rather than JSON Schema; the response is still validated against the
/// report JSON Schema after it arrives.
pub fn response_schema() -> JsonValue {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": { "type": "NUMBER" },
            "summary": { "type": "STRING" },
            "ingredients": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "status": {
                            "type": "STRING",
                            "enum": ["safe", "moderate", "unsafe"]
                        },
                        "description": { "type": "STRING" },
                        "risk": { "type": "STRING", "nullable": true },
                        "bannedIn": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "nullable": true
                        },
                        "banReason": { "type": "STRING", "nullable": true }
                    },
                    "required": ["name", "status", "description"]
                }
            }
        },
        "required": ["score", "summary", "ingredients"]
    })
}
