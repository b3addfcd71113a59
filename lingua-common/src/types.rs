//! Shared request/response types
//!
//! Wire shapes for the detect and rewrite operations. Request bodies keep
//! every field optional so that missing-field validation happens in the
//! service, not in the JSON extractor.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

// ========================================
// Detection Types
// ========================================

/// One term the model flagged as jargon, in the shape the detection prompt asks for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JargonTerm {
    pub word: String,
    pub reason: String,
    /// Model-reported confidence, nominally in [0, 1]. Passed through as given.
    pub confidence: f64,
}

/// Overall clarity rating of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallScore {
    Clear,
    Mixed,
    Heavy,
}

impl OverallScore {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallScore::Clear => "Clear",
            OverallScore::Mixed => "Mixed",
            OverallScore::Heavy => "Heavy",
        }
    }

    /// Exact, case-sensitive label match
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Clear" => Some(OverallScore::Clear),
            "Mixed" => Some(OverallScore::Mixed),
            "Heavy" => Some(OverallScore::Heavy),
            _ => None,
        }
    }
}

impl fmt::Display for OverallScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a JSON value is not a detection result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeMismatch {
    NotAnObject,
    TermsNotAList,
    UnknownScore,
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShapeMismatch::NotAnObject => "not an object",
            ShapeMismatch::TermsNotAList => "terms is not a list",
            ShapeMismatch::UnknownScore => "overall_score is not Clear, Mixed or Heavy",
        })
    }
}

/// Detection result as produced by a well-formed model response
///
/// Only the top level is checked: an object whose `terms` is a list and whose
/// `overall_score` is a known label. Individual terms and any extra fields
/// are kept exactly as the model wrote them and serialize back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    fields: Map<String, Value>,
    overall_score: OverallScore,
}

impl DetectionResult {
    pub fn terms(&self) -> &[Value] {
        self.fields
            .get("terms")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn overall_score(&self) -> OverallScore {
        self.overall_score
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl TryFrom<Value> for DetectionResult {
    type Error = ShapeMismatch;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        let Value::Object(fields) = value else {
            return Err(ShapeMismatch::NotAnObject);
        };
        if !fields.get("terms").is_some_and(Value::is_array) {
            return Err(ShapeMismatch::TermsNotAList);
        }
        let overall_score = fields
            .get("overall_score")
            .and_then(Value::as_str)
            .and_then(OverallScore::from_label)
            .ok_or(ShapeMismatch::UnknownScore)?;

        Ok(Self { fields, overall_score })
    }
}

impl Serialize for DetectionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Body of the fallback response for output that did not parse
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnparsedDetection {
    pub terms: Vec<JargonTerm>,
    pub overall_score: OverallScore,
    pub raw: String,
}

/// Detection response body returned by `POST /api/detect`
///
/// `raw` appears only in the fallback, i.e. when the model output could not
/// be parsed into a [`DetectionResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DetectionResponse {
    Parsed(DetectionResult),
    Unparsed(UnparsedDetection),
}

impl DetectionResponse {
    /// Fallback response for model output that did not parse
    pub fn unparsed(raw: String) -> Self {
        DetectionResponse::Unparsed(UnparsedDetection {
            terms: Vec::new(),
            overall_score: OverallScore::Mixed,
            raw,
        })
    }

    pub fn raw(&self) -> Option<&str> {
        match self {
            DetectionResponse::Parsed(_) => None,
            DetectionResponse::Unparsed(fallback) => Some(&fallback.raw),
        }
    }
}

impl From<DetectionResult> for DetectionResponse {
    fn from(result: DetectionResult) -> Self {
        DetectionResponse::Parsed(result)
    }
}

// ========================================
// Rewrite Types
// ========================================

/// Rewrite response body returned by `POST /api/rewrite`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteResponse {
    pub rewritten: String,
}

// ========================================
// Request Types
// ========================================

/// `POST /api/detect` request body
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DetectRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}

/// `POST /api/rewrite` request body
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RewriteRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
}

// ========================================
// Error Response Types
// ========================================

/// Error body used by every non-2xx JSON response
///
/// # Examples
///
/// ```
/// use lingua_common::types::ErrorResponse;
///
/// let body = ErrorResponse::new("message and sessionId are required");
/// assert_eq!(
///     serde_json::to_string(&body).unwrap(),
///     r#"{"error":"message and sessionId are required"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
