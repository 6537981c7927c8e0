//! Response envelope handling.
//!
//! Endpoints respond with either `{ "data": ... }` or a raw body. Both
//! shapes are accepted and unwrapped to the payload.

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// A response body that may or may not be wrapped in `{ "data": ... }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Raw(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Raw(value) => value,
        }
    }
}

/// Decode a body in either envelope shape
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice::<Envelope<T>>(body).map(Envelope::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        name: String,
    }

    #[test]
    fn test_unwraps_data_envelope() {
        let item: Item = decode(br#"{"data":{"name":"widget"}}"#).unwrap();
        assert_eq!(item.name, "widget");
    }

    #[test]
    fn test_accepts_raw_body() {
        let item: Item = decode(br#"{"name":"widget"}"#).unwrap();
        assert_eq!(item.name, "widget");
    }

    #[test]
    fn test_raw_list_body() {
        let items: Vec<Item> = decode(br#"[{"name":"a"},{"name":"b"}]"#).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_wrapped_list_body() {
        let items: Vec<Item> = decode(br#"{"data":[{"name":"a"}]}"#).unwrap();
        assert_eq!(items.len(), 1);
    }
}
