//! Prompt construction for detection and rewrite
//!
//! Pure functions only. Prompts embed user-submitted text verbatim and must
//! not be logged.

use serde_json::Value;

use crate::config::GlossaryLimits;

pub const DEFAULT_AUDIENCE: &str = "non-technical stakeholders";
pub const DEFAULT_TONE: &str = "neutral";

const DETECTION_OUTPUT_SHAPE: &str = r#"{
  "terms": [
    {"word": "string", "reason": "string", "confidence": 0.0}
  ],
  "overall_score": "Clear" | "Mixed" | "Heavy"
}"#;

/// Build the jargon detection prompt
///
/// `glossary` is serialized as a JSON array; pass it through
/// [`bounded_glossary`] first to keep the prompt within model input limits.
pub fn build_detection_prompt(message: &str, glossary: &[Value]) -> String {
    let glossary_json = Value::Array(glossary.to_vec()).to_string();

    format!(
        "You are a jargon detector for corporate messaging.\n\
         \n\
         Analyze the message below and return ONLY valid JSON with exactly this shape:\n\
         \n\
         {shape}\n\
         \n\
         Rules:\n\
         - \"confidence\" is a number between 0.0 and 1.0.\n\
         - \"overall_score\" is exactly one of \"Clear\", \"Mixed\" or \"Heavy\".\n\
         - Respond with the JSON object only: no markdown fences, no commentary.\n\
         \n\
         Message:\n\
         \"{message}\"\n\
         \n\
         Glossary terms this organization already treats as jargon:\n\
         {glossary_json}\n",
        shape = DETECTION_OUTPUT_SHAPE,
        message = message,
        glossary_json = glossary_json,
    )
}

/// Build the audience/tone rewrite prompt
///
/// Missing or empty labels fall back to [`DEFAULT_AUDIENCE`] and
/// [`DEFAULT_TONE`].
pub fn build_rewrite_prompt(message: &str, audience: Option<&str>, tone: Option<&str>) -> String {
    let audience = label_or(audience, DEFAULT_AUDIENCE);
    let tone = label_or(tone, DEFAULT_TONE);

    format!(
        "Rewrite this message clearly for {audience} in a {tone} tone.\n\
         Remove jargon but keep the original meaning.\n\
         \n\
         Return ONLY the rewritten message, with no preamble or explanation:\n\
         \n\
         \"{message}\"\n",
    )
}

/// Resolve an optional caller label, treating empty strings as absent
pub fn label_or<'a>(label: Option<&'a str>, default: &'a str) -> &'a str {
    match label {
        Some(value) if !value.is_empty() => value,
        _ => default,
    }
}

/// Longest glossary prefix that fits both the entry and size bounds
///
/// Size is counted in characters of the serialized JSON array.
///
/// Entries are dropped from the end, so the order the user curated wins.
pub fn bounded_glossary<'a>(glossary: &'a [Value], limits: &GlossaryLimits) -> &'a [Value] {
    let mut end = glossary.len().min(limits.max_entries);

    // "[" + "]" plus one comma between each pair of entries
    let mut size = 2;
    for (index, entry) in glossary[..end].iter().enumerate() {
        let entry_len = entry.to_string().chars().count() + usize::from(index > 0);
        if size + entry_len > limits.max_chars {
            end = index;
            break;
        }
        size += entry_len;
    }

    &glossary[..end]
}
