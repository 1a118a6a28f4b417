use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use serde_json::json;

use crate::config::Config;
use crate::constants::*;
use crate::decoder::{Resource, decode_page};
use crate::error::{FetchError, MutationError, TagOperation};
use crate::models::{Page, Transaction};
use crate::preferences::Preferences;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

/// A fully built request, headers included, ready for a [`Transport`].
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<Vec<u8>>,
}

/// Raw result of one round trip. Interpreting the status is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No response was received.
    TransportFailure(String),
    Http { status: u16, body: Vec<u8> },
}

/// The platform request primitive. Never retries.
pub trait Transport: Send + Sync {
    fn execute(&self, request: ApiRequest) -> impl Future<Output = Outcome> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Outcome {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, request.url);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return Outcome::TransportFailure(e.to_string()),
        };
        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => Outcome::Http {
                status,
                body: body.to_vec(),
            },
            Err(e) => Outcome::TransportFailure(e.to_string()),
        }
    }
}

/// A resource path relative to the API root, plus its query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
}

impl Endpoint {
    /// Starts from a fixed `/`-separated path such as `accounts`.
    pub fn new(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            query: Vec::new(),
        }
    }

    /// Appends one path segment. Reserved characters in it are escaped.
    pub fn segment(mut self, value: impl Into<String>) -> Self {
        self.segments.push(value.into());
        self
    }

    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn page_size(self, size: u32) -> Self {
        self.param(PAGE_SIZE_PARAM, size)
    }
}

/// Where the next page comes from: a first-page endpoint or a `links.next` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTarget {
    First(Endpoint),
    Next(String),
}

/// Authenticated client for the banking API.
///
/// The bearer token is read from [`Preferences`] at request time.
#[derive(Debug, Clone)]
pub struct ApiClient<T = HttpTransport> {
    transport: T,
    config: Config,
    preferences: Preferences,
}

impl ApiClient<HttpTransport> {
    pub fn new(config: Config, preferences: Preferences) -> Result<Self, reqwest::Error> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::with_transport(transport, config, preferences))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(transport: T, config: Config, preferences: Preferences) -> Self {
        Self {
            transport,
            config,
            preferences,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn url_for(&self, endpoint: &Endpoint) -> Result<Url, String> {
        let base = &self.config.base_url;
        let mut url = Url::parse(base).map_err(|e| format!("Invalid URL {}: {}", base, e))?;
        url.path_segments_mut()
            .map_err(|_| format!("Invalid URL {}: cannot be a base", base))?
            .pop_if_empty()
            .extend(&endpoint.segments);
        if !endpoint.query.is_empty() {
            url.query_pairs_mut().extend_pairs(endpoint.query.iter());
        }
        Ok(url)
    }

    /// Builds the request with auth headers. A JSON body adds `Content-Type`.
    pub async fn build_request(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> ApiRequest {
        let token = self.preferences.api_token().await;
        let mut headers = vec![
            ("accept", "application/json".to_string()),
            ("authorization", format!("Bearer {}", token)),
        ];
        if body.is_some() {
            headers.push(("content-type", "application/json".to_string()));
        }

        ApiRequest {
            method,
            url,
            headers,
            body: body.map(|b| b.to_string().into_bytes()),
        }
    }

    pub async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Outcome {
        tracing::debug!(method = method.as_str(), url = %url, "sending request");
        let request = self.build_request(method, url, body).await;
        self.transport.execute(request).await
    }

    pub fn resolve(&self, target: &PageTarget) -> Result<Url, String> {
        match target {
            PageTarget::First(endpoint) => self.url_for(endpoint),
            PageTarget::Next(next) => {
                Url::parse(next).map_err(|e| format!("Invalid URL {}: {}", next, e))
            }
        }
    }

    /// Fetches and decodes one page of `R`.
    pub async fn fetch_page<R: Resource>(
        &self,
        target: &PageTarget,
    ) -> Result<Page<R>, FetchError> {
        let url = self.resolve(target).map_err(FetchError::Transport)?;
        let outcome = self.send(Method::Get, url, None).await;
        let status = match &outcome {
            Outcome::Http { status, .. } => Some(*status),
            Outcome::TransportFailure(_) => None,
        };

        let result = decode_page::<R>(outcome);
        match &result {
            Ok(page) => tracing::info!(
                kind = R::KIND.label(),
                status,
                items = page.items.len(),
                "{} fetch successful",
                R::KIND.label()
            ),
            Err(e) => tracing::warn!(
                kind = R::KIND.label(),
                status,
                error = ?e,
                "{} fetch unsuccessful",
                R::KIND.label()
            ),
        }
        result
    }

    pub async fn add_tag(
        &self,
        transaction: &Transaction,
        tag_id: &str,
    ) -> Result<(), MutationError> {
        self.mutate_tags(TagOperation::Add, transaction, tag_id).await
    }

    pub async fn remove_tag(
        &self,
        transaction: &Transaction,
        tag_id: &str,
    ) -> Result<(), MutationError> {
        self.mutate_tags(TagOperation::Remove, transaction, tag_id).await
    }

    async fn mutate_tags(
        &self,
        operation: TagOperation,
        transaction: &Transaction,
        tag_id: &str,
    ) -> Result<(), MutationError> {
        let failed = |status| MutationError::Failed { operation, status };

        let url = match &transaction.relationships.tags_link {
            Some(link) => Url::parse(link).map_err(|_| failed(None))?,
            None => self
                .url_for(&tag_relationship_endpoint(&transaction.id))
                .map_err(|_| failed(None))?,
        };
        let method = match operation {
            TagOperation::Add => Method::Post,
            TagOperation::Remove => Method::Delete,
        };
        let body = json!({
            "data": [{ "type": TAG_RESOURCE_TYPE, "id": tag_id }]
        });

        let outcome = self.send(method, url, Some(body)).await;
        let result = classify_mutation(operation, &outcome);
        if let Err(e) = &result {
            tracing::warn!(
                transaction = %transaction.id,
                tag = tag_id,
                error = ?e,
                "tag mutation unsuccessful"
            );
        }
        result
    }
}

pub fn tag_relationship_endpoint(transaction_id: &str) -> Endpoint {
    Endpoint::new(TRANSACTIONS_PATH)
        .segment(transaction_id)
        .segment("relationships")
        .segment(TAGS_PATH)
}

/// 204 is the only success. A 403 on add means the per-transaction limit.
pub fn classify_mutation(operation: TagOperation, outcome: &Outcome) -> Result<(), MutationError> {
    match outcome {
        Outcome::Http { status: 204, .. } => Ok(()),
        Outcome::Http { status: 403, .. } if operation == TagOperation::Add => {
            Err(MutationError::TagLimitExceeded)
        }
        Outcome::Http { status, .. } => Err(MutationError::Failed {
            operation,
            status: Some(*status),
        }),
        Outcome::TransportFailure(_) => Err(MutationError::Failed {
            operation,
            status: None,
        }),
    }
}
