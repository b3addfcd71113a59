//! Model output parsing
//!
//! Detection output is parsed into a [`ParsedDetection`]; anything that does
//! not match the expected shape becomes [`ParsedDetection::Unparsed`] and is
//! flattened into the fallback wire response. Parsing never fails.

use lingua_common::types::{DetectionResponse, DetectionResult, RewriteResponse};
use serde_json::Value;
use tracing::debug;

/// Outcome of parsing raw detection output
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedDetection {
    /// Output matched the detection result shape
    Parsed(DetectionResult),
    /// Output was not JSON, or JSON of the wrong shape; holds the original text
    Unparsed(String),
}

impl ParsedDetection {
    pub fn is_parsed(&self) -> bool {
        matches!(self, ParsedDetection::Parsed(_))
    }
}

impl From<ParsedDetection> for DetectionResponse {
    fn from(parsed: ParsedDetection) -> Self {
        match parsed {
            ParsedDetection::Parsed(result) => result.into(),
            ParsedDetection::Unparsed(raw) => DetectionResponse::unparsed(raw),
        }
    }
}

/// Parse raw model text as a detection result
///
/// The text must be JSON whose top level matches the detection shape. Terms
/// are taken as the model wrote them: no per-field checks, no clamping of
/// confidence and no repair of malformed entries.
pub fn parse_detection(raw: String) -> ParsedDetection {
    let value = match serde_json::from_str::<Value>(&raw) {
        Ok(value) => value,
        Err(e) => {
            // Error position only; the message itself may quote model text
            debug!(
                category = ?e.classify(),
                line = e.line(),
                column = e.column(),
                raw_len = raw.len(),
                "Detection output is not JSON, using fallback"
            );
            return ParsedDetection::Unparsed(raw);
        }
    };

    match DetectionResult::try_from(value) {
        Ok(result) => {
            debug!(terms = result.terms().len(), score = %result.overall_score(), "Detection output parsed");
            ParsedDetection::Parsed(result)
        }
        Err(mismatch) => {
            debug!(%mismatch, raw_len = raw.len(), "Detection output has the wrong shape, using fallback");
            ParsedDetection::Unparsed(raw)
        }
    }
}

/// Rewrite output is passed through verbatim, empty output included
pub fn parse_rewrite(raw: String) -> RewriteResponse {
    RewriteResponse { rewritten: raw }
}
