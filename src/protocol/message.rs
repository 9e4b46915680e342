use serde::Serialize;

use super::RequestParameters;
use crate::Result;

/// Form key carrying a text or JSON payload
pub const DATA_KEY: &str = "data";

/// Outbound message handed to `send`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Raw text, sent as `data=<text>`
    Text(String),
    /// Key/value pairs used as the form body as-is
    Fields(RequestParameters),
    /// Pre-serialized JSON, sent as `data=<json>`
    Json(String),
}

impl Payload {
    /// Serializes `value` to a JSON payload
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Payload::Json(serde_json::to_string(value)?))
    }

    /// Converts the payload into the form body of a send request
    pub fn into_body(self) -> RequestParameters {
        match self {
            Payload::Text(text) | Payload::Json(text) => {
                let mut body = RequestParameters::new();
                body.insert(DATA_KEY, text);
                body
            }
            Payload::Fields(fields) => fields,
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<RequestParameters> for Payload {
    fn from(fields: RequestParameters) -> Self {
        Payload::Fields(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_goes_under_data() {
        let body = Payload::from("hello").into_body();
        assert_eq!(body.get(DATA_KEY), Some("hello"));
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn test_fields_are_used_directly() {
        let fields: RequestParameters = [("H", "chat"), ("M", "send")].into_iter().collect();
        let body = Payload::Fields(fields.clone()).into_body();
        assert_eq!(body, fields);
    }

    #[test]
    fn test_json_goes_under_data() {
        let payload = Payload::json(&json!({"H": "chat", "M": "send", "A": ["hi"], "I": 0})).unwrap();
        let body = payload.into_body();

        let value: serde_json::Value = serde_json::from_str(body.get(DATA_KEY).unwrap()).unwrap();
        assert_eq!(value["M"], "send");
        assert_eq!(value["A"][0], "hi");
    }
}
