//! Main metadata client implementation.

use crate::error::{Error, Result};
use crate::types::*;
use crate::version::build_user_agent;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

/// Address of the public Fragile Families metadata service.
pub const DEFAULT_BASE_URL: &str = "http://api.metadata.fragilefamilies.princeton.edu";

/// Environment variable read by [`ClientBuilder::from_env`].
pub const BASE_URL_ENV: &str = "FFMETADATA_URL";

/// Builder for constructing a [`Client`].
pub struct ClientBuilder {
    base_url: String,
    user_agent_suffix: Option<String>,
    http_client: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Create a new client builder pointing at the public service.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent_suffix: None,
            http_client: None,
        }
    }

    /// Create a builder whose base URL is taken from `FFMETADATA_URL` when set.
    pub fn from_env() -> Self {
        let builder = Self::new();
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => builder.base_url(url.trim()),
            _ => builder,
        }
    }

    /// Set the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set a custom User-Agent suffix.
    pub fn user_agent_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.user_agent_suffix = Some(suffix.into());
        self
    }

    /// Use a preconfigured HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        if self.base_url.is_empty() {
            return Err(Error::Config("base URL is required".into()));
        }

        let base_url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL `{}`: {}", self.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "base URL `{}` cannot carry a path",
                self.base_url
            )));
        }

        if base_url.scheme() != "https" && self.base_url != DEFAULT_BASE_URL {
            warn!(
                base_url = %self.base_url,
                "Metadata base URL is not using HTTPS"
            );
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder().build().map_err(Error::Http)?,
        };

        Ok(Client {
            base_url,
            http_client,
            user_agent: build_user_agent(self.user_agent_suffix.as_deref()),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the Fragile Families metadata service.
///
/// Every operation issues exactly one GET request.
///
/// # Example
///
/// ```rust,no_run
/// use ffmetadata::{Client, Filter, FilterTree};
///
/// #[tokio::main]
/// async fn main() -> Result<(), ffmetadata::Error> {
///     let client = Client::new()?;
///
///     let source = client.select_attribute("ce3datey", "data_source").await?;
///     println!("{}", source);
///
///     let names = client
///         .search(FilterTree::or([
///             Filter::eq("data_source", "constructed"),
///             Filter::like("name", "c%"),
///         ]))
///         .await?;
///     println!("{:?}", names);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http_client: reqwest::Client,
    user_agent: String,
}

impl Client {
    /// Create a client for the public service.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    // === Variables ===

    /// Fetch attributes of a variable.
    ///
    /// A single attribute name yields [`Selection::Value`]; a list of names or
    /// [`AttributeSelector::All`] yields [`Selection::Attributes`].
    pub async fn select(
        &self,
        variable: &str,
        selector: impl Into<AttributeSelector>,
    ) -> Result<Selection> {
        match selector.into() {
            AttributeSelector::One(name) => self
                .select_attribute(variable, &name)
                .await
                .map(Selection::Value),
            selector => self
                .fetch_attributes(variable, &selector)
                .await
                .map(Selection::Attributes),
        }
    }

    /// Fetch every attribute of a variable.
    pub async fn select_all(&self, variable: &str) -> Result<Attributes> {
        self.fetch_attributes(variable, &AttributeSelector::All)
            .await
    }

    /// Fetch the value of one attribute of a variable.
    pub async fn select_attribute(&self, variable: &str, attribute: &str) -> Result<String> {
        let selector = AttributeSelector::One(attribute.to_string());
        let mut attributes = self.fetch_attributes(variable, &selector).await?;
        attributes
            .take(attribute)
            .ok_or_else(|| Error::AttributeNotFound {
                variable: variable.to_string(),
                attribute: attribute.to_string(),
            })
    }

    /// Fetch several attributes of a variable.
    pub async fn select_attributes(&self, variable: &str, attributes: &[&str]) -> Result<Attributes> {
        self.fetch_attributes(variable, &AttributeSelector::from(attributes))
            .await
    }

    // === Search ===

    /// Find variable names matching a filter, a list of filters (combined with
    /// AND), or a boolean filter tree.
    ///
    /// The filters are forwarded as-is; the service decides their meaning.
    pub async fn search(&self, filters: impl Into<Filters>) -> Result<Vec<String>> {
        let filters = filters.into();
        let q = serde_json::to_string(&SearchQuery { filters: &filters })?;
        let value = self.get(&["variable"], &[("q", q.as_str())]).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// List every variable, i.e. search with no filters.
    pub async fn search_all(&self) -> Result<Vec<String>> {
        self.search(Filters::default()).await
    }

    // === Internal methods ===

    async fn fetch_attributes(
        &self,
        variable: &str,
        selector: &AttributeSelector,
    ) -> Result<Attributes> {
        let value = self
            .get(&["variable", variable], &selector.query_pairs())
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Issue a GET for the given path segments and classify the response.
    pub(crate) async fn get(&self, segments: &[&str], params: &[(&str, &str)]) -> Result<Value> {
        let response = self.send(segments, params).await?;
        Self::decode(response).await
    }

    /// Issue a GET without looking at the response status.
    pub(crate) async fn send(
        &self,
        segments: &[&str],
        params: &[(&str, &str)],
    ) -> Result<reqwest::Response> {
        let url = self.endpoint(segments)?;

        let mut req = self
            .http_client
            .get(url.clone())
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json");
        if !params.is_empty() {
            req = req.query(params);
        }

        debug!(url = %url, params = params.len(), "Sending metadata request");
        let response = req.send().await?;
        debug!(url = %url, status = %response.status(), "Received metadata response");
        Ok(response)
    }

    /// Turn 4xx/5xx into errors, otherwise decode the JSON body.
    pub(crate) async fn decode(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(Error::from_response(response).await);
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("base URL `{}` cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = Client::new().unwrap();
        assert_eq!(client.base_url(), format!("{}/", DEFAULT_BASE_URL));
        assert!(client.user_agent.starts_with("ffmetadata-rust/"));
    }

    #[test]
    fn test_builder_rejects_bad_urls() {
        assert!(matches!(
            Client::builder().base_url("").build(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Client::builder().base_url("not a url").build(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Client::builder().base_url("mailto:someone@example.com").build(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = Client::builder()
            .base_url("http://localhost:8080/api/")
            .build()
            .unwrap();

        assert_eq!(
            client.endpoint(&["variable", "ce3datey"]).unwrap().as_str(),
            "http://localhost:8080/api/variable/ce3datey"
        );
        // Names are a single escaped segment
        assert_eq!(
            client.endpoint(&["variable", "a/b c"]).unwrap().as_str(),
            "http://localhost:8080/api/variable/a%2Fb%20c"
        );

        let root = Client::builder()
            .base_url("http://localhost:8080")
            .build()
            .unwrap();
        assert_eq!(
            root.endpoint(&["filter"]).unwrap().as_str(),
            "http://localhost:8080/filter"
        );
    }

    #[test]
    fn test_from_env_override() {
        std::env::remove_var(BASE_URL_ENV);
        assert_eq!(ClientBuilder::from_env().base_url, DEFAULT_BASE_URL);

        std::env::set_var(BASE_URL_ENV, "   ");
        assert_eq!(ClientBuilder::from_env().base_url, DEFAULT_BASE_URL);

        std::env::set_var(BASE_URL_ENV, "");
        assert_eq!(ClientBuilder::from_env().base_url, DEFAULT_BASE_URL);

        std::env::set_var(BASE_URL_ENV, " http://ffmeta-env-override.test:9123/v2/ ");
        let builder = ClientBuilder::from_env();
        assert_eq!(builder.base_url, "http://ffmeta-env-override.test:9123/v2");

        std::env::remove_var(BASE_URL_ENV);
        let client = builder.build().unwrap();
        assert_eq!(client.base_url(), "http://ffmeta-env-override.test:9123/v2");
    }

    #[test]
    fn test_user_agent_suffix() {
        let client = Client::builder()
            .user_agent_suffix("survey-tools/0.1")
            .build()
            .unwrap();
        assert!(client.user_agent.ends_with(" survey-tools/0.1"));
    }
}
