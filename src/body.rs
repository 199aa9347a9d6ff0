use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};
use url::form_urlencoded;

use crate::{ClientError, NameValue};

/// Media type of JSON request bodies.
pub const APPLICATION_JSON: &str = "application/json";
/// Media type of URL-encoded form bodies.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Fully materialized request body with its declared media type.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestBody {
    content_type: Option<String>,
    content: Vec<u8>,
}

impl RequestBody {
    /// Creates a body from raw bytes and an optional media type.
    pub fn new(content: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
        Self {
            content_type: content_type.map(str::to_owned),
            content: content.into(),
        }
    }

    /// Zero-length body with no declared media type.
    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    /// Encodes `params` as an `application/x-www-form-urlencoded` body.
    ///
    /// Parameters without a value are sent as `name=`.
    pub fn form(params: &[NameValue]) -> Self {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for param in params {
            serializer.append_pair(param.name(), param.value().unwrap_or_default());
        }
        Self::new(serializer.finish(), Some(FORM_URLENCODED))
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Vec<u8>) {
        (self.content_type, self.content)
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBody")
            .field("content_type", &self.content_type)
            .field("len", &self.content.len())
            .finish()
    }
}

/// Non-JSON body content, used verbatim.
pub enum RawContent {
    /// Text content, sent as UTF-8.
    Text(String),
    /// Bytes sent as-is.
    Bytes(Vec<u8>),
    /// Byte stream, read to the end when the body is resolved.
    Reader(Box<dyn Read + Send>),
}

impl RawContent {
    fn into_bytes(self) -> Result<Vec<u8>, ClientError> {
        match self {
            Self::Text(text) => Ok(text.into_bytes()),
            Self::Bytes(bytes) => Ok(bytes),
            Self::Reader(mut reader) => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }
}

impl fmt::Debug for RawContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

impl From<String> for RawContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RawContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Vec<u8>> for RawContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// JSON Patch (RFC 6902) operation kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

/// One JSON Patch operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonPatchOperation {
    pub op: PatchOp,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl JsonPatchOperation {
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self::with_value(PatchOp::Add, path, value)
    }

    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self::with_value(PatchOp::Replace, path, value)
    }

    pub fn test(path: impl Into<String>, value: Value) -> Self {
        Self::with_value(PatchOp::Test, path, value)
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Remove,
            path: path.into(),
            from: None,
            value: None,
        }
    }

    pub fn move_from(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_from(PatchOp::Move, from, path)
    }

    pub fn copy_from(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_from(PatchOp::Copy, from, path)
    }

    fn with_value(op: PatchOp, path: impl Into<String>, value: Value) -> Self {
        Self {
            op,
            path: path.into(),
            from: None,
            value: Some(value),
        }
    }

    fn with_from(op: PatchOp, from: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            op,
            path: path.into(),
            from: Some(from.into()),
            value: None,
        }
    }
}

/// Picks the request body from the first available source.
///
/// Precedence is `json`, then `json_patch`, then `raw`. JSON sources are
/// serialized compactly. When `content_type` is `None` no body is produced,
/// whatever the other arguments hold.
pub fn resolve_body<T>(
    content_type: Option<&str>,
    json: Option<&T>,
    json_patch: Option<&[JsonPatchOperation]>,
    raw: Option<RawContent>,
) -> Result<Option<RequestBody>, ClientError>
where
    T: Serialize + ?Sized,
{
    let Some(content_type) = content_type else {
        if json.is_some() || json_patch.is_some() || raw.is_some() {
            warn!("body content ignored because no content type was given");
        }
        return Ok(None);
    };

    let content = if let Some(model) = json {
        trace!(content_type, "serializing JSON model body");
        serde_json::to_vec(model)?
    } else if let Some(operations) = json_patch {
        trace!(
            content_type,
            operations = operations.len(),
            "serializing JSON patch body"
        );
        serde_json::to_vec(operations)?
    } else if let Some(raw) = raw {
        trace!(content_type, ?raw, "using raw body content");
        raw.into_bytes()?
    } else {
        return Ok(None);
    };

    Ok(Some(RequestBody::new(content, Some(content_type))))
}
