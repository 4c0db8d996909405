use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

// The service encodes field names in Go's default casing; lower case is accepted too.
const DATA_FIELDS: &[&str] = &["Data", "data"];
const ERROR_FIELDS: &[&str] = &["Error", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteResponse {
    /// Note ID
    #[serde(alias = "ID")]
    pub id: i64,
    /// Note text
    #[serde(alias = "Text")]
    pub text: String,
    /// Creation time, usually RFC 3339
    #[serde(rename = "createdAt", alias = "CreatedAt")]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    /// Note text
    #[serde(alias = "Text")]
    pub text: String,
}

impl CreateNoteRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Body of every service response: either a payload or an error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope<T> {
    Data(T),
    Error(String),
}

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("response body is not JSON: {0}")]
    NotJson(#[source] serde_json::Error),

    #[error("response body is not a JSON object")]
    NotAnObject,

    #[error("response carries neither a data nor an error field")]
    MissingFields,

    #[error("error field is not a string: {0}")]
    ErrorNotString(Value),

    #[error("data field does not match the expected shape: {0}")]
    Payload(#[source] serde_json::Error),
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decodes a raw response body. An error field wins over a data field.
    pub fn decode(body: &[u8]) -> Result<Self, EnvelopeError> {
        let value: Value = serde_json::from_slice(body).map_err(EnvelopeError::NotJson)?;
        let Value::Object(mut fields) = value else {
            return Err(EnvelopeError::NotAnObject);
        };

        if let Some(error) = take_field(&mut fields, ERROR_FIELDS) {
            return match error {
                Value::String(message) => Ok(Self::Error(message)),
                other => Err(EnvelopeError::ErrorNotString(other)),
            };
        }

        let data = take_field(&mut fields, DATA_FIELDS).ok_or(EnvelopeError::MissingFields)?;
        serde_json::from_value(data)
            .map(Self::Data)
            .map_err(EnvelopeError::Payload)
    }
}

fn take_field(fields: &mut Map<String, Value>, names: &[&str]) -> Option<Value> {
    names.iter().find_map(|name| fields.remove(*name))
}
