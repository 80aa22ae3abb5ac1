//! Operations of the legacy `/select`, `/filter` and `/search` endpoints.
//!
//! The legacy service reports failures through an `"error code"` key in the
//! body, on 2xx and 4xx responses alike, so every non-5xx body here is checked
//! for it before the status is.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::{Attributes, MatchList};
use serde_json::Value;

impl Client {
    /// Fetch the metadata of a variable, optionally limited to one field.
    pub async fn legacy_select(&self, variable: &str, field: Option<&str>) -> Result<Attributes> {
        let mut params = vec![("varName", variable)];
        if let Some(field) = field {
            params.push(("fieldName", field));
        }
        let value = self.get_legacy("select", &params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Variable names whose fields equal the given values.
    ///
    /// All constraints must hold. No constraints returns whatever the service
    /// considers the full list.
    pub async fn filter<I, K, V>(&self, constraints: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let owned: Vec<(K, V)> = constraints.into_iter().collect();
        let params: Vec<(&str, &str)> = owned
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_ref()))
            .collect();
        let value = self.get_legacy("filter", &params).await?;
        let list: MatchList = serde_json::from_value(value)?;
        Ok(list.matches)
    }

    /// Variable names whose `field` contains `query`.
    pub async fn search_text(&self, query: &str, field: &str) -> Result<Vec<String>> {
        let value = self
            .get_legacy("search", &[("query", query), ("fieldName", field)])
            .await?;
        let list: MatchList = serde_json::from_value(value)?;
        Ok(list.matches)
    }

    async fn get_legacy(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value> {
        let response = self.send(&[endpoint], params).await?;
        let status = response.status();

        // A 4xx may still carry the legacy error fields
        if status.is_client_error() {
            let body = response.bytes().await?;
            if let Ok(value) = serde_json::from_slice::<Value>(&body) {
                check_embedded_error(&value)?;
            }
            return Err(Error::from_body(status, &body));
        }

        let value = Client::decode(response).await?;
        check_embedded_error(&value)?;
        Ok(value)
    }
}

fn check_embedded_error(value: &Value) -> Result<()> {
    match value.as_object() {
        Some(body) if body.contains_key("error code") => {
            let description = body
                .get("error_description")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            Err(Error::Attribute(description.to_string()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embedded_error_detected() {
        let body = json!({"error code": 404, "error_description": "Variable not found"});
        match check_embedded_error(&body) {
            Err(Error::Attribute(msg)) => assert_eq!(msg, "Variable not found"),
            other => panic!("unexpected: {:?}", other),
        }

        let body = json!({"error code": 400});
        assert!(matches!(
            check_embedded_error(&body),
            Err(Error::Attribute(msg)) if msg == "Unknown error"
        ));
    }

    #[test]
    fn test_plain_bodies_pass() {
        assert!(check_embedded_error(&json!({"name": "cm1relf"})).is_ok());
        assert!(check_embedded_error(&json!({"matches": []})).is_ok());
        assert!(check_embedded_error(&json!(["cm1relf"])).is_ok());
    }
}
