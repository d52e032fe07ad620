//! Campaign request decoding and the email draft returned to callers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pipeline::PipelineError;

/// Everything needed to personalize one outreach email.
///
/// All fields are required; there are no defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRequest {
    /// Prospect company name.
    pub company_name: String,
    /// Prospect company website.
    pub company_url: String,
    /// Short description of the prospect company.
    pub company_description: String,
    /// Person the email is addressed to.
    pub receiver_name: String,
    /// Vendor success stories to reference.
    pub success_stories: String,
    /// Vendor services or products.
    pub services_list: String,
    /// Description of the sending vendor.
    pub vendor_description: String,
    /// Name used in the signature.
    pub sender_name: String,
}

impl CampaignRequest {
    /// Decode a raw JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MalformedRequest`] if the body is not JSON or
    /// any field is absent or not a string.
    pub fn decode(body: &[u8]) -> Result<Self, PipelineError> {
        serde_json::from_slice(body).map_err(|e| PipelineError::MalformedRequest(e.to_string()))
    }
}

/// The generated subject/body pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    /// Email body.
    pub email_content: String,
    /// Email subject line.
    pub email_subject: String,
}

impl EmailDraft {
    /// Build a draft from the extractor's output.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ExtractionFailure`] when nothing was extracted
    /// and [`PipelineError::MissingField`] when a key is absent or not a string.
    pub fn from_extracted(extracted: Option<Value>) -> Result<Self, PipelineError> {
        let value = extracted.ok_or(PipelineError::ExtractionFailure)?;
        Ok(Self {
            email_content: string_field(&value, "email_content")?,
            email_subject: string_field(&value, "email_subject")?,
        })
    }
}

fn string_field(value: &Value, key: &'static str) -> Result<String, PipelineError> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(PipelineError::MissingField(key))
}
