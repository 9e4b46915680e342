use serde::{Serialize, Serializer};

use crate::connection::Connection;

/// Ordered string parameters, encoded either into a query string or a form body
///
/// Inserting an existing key replaces its value but keeps its original position,
/// so the encoded order is the order in which keys were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParameters {
    pairs: Vec<(String, String)>,
}

impl RequestParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, returning the previous value if any
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.pairs.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Applies every pair of `other` on top of `self`; `other` wins on collision
    pub fn overlay(&mut self, other: &RequestParameters) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl Serialize for RequestParameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.pairs.iter())
    }
}

/// Builds the parameter set shared by every request on a connection
///
/// The four protocol keys come first, then the connection's custom query string
/// is laid over them. Custom keys may shadow protocol keys.
pub fn connection_parameters(
    connection: &dyn Connection,
    transport_name: &str,
    connection_data: Option<&str>,
) -> RequestParameters {
    let mut params = RequestParameters::new();
    params.insert("clientProtocol", connection.version().to_string());
    params.insert("transport", transport_name);
    params.insert("connectionData", connection_data.unwrap_or_default());
    params.insert(
        "connectionToken",
        connection.connection_token().unwrap_or_default(),
    );

    if let Some(query_string) = connection.query_string() {
        params.overlay(&query_string);
    }

    params
}
