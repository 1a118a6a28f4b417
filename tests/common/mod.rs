#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use provenance::client::ApiClient;
use provenance::config::Config;
use provenance::decoder::decode_list;
use provenance::models::Transaction;
use provenance::preferences::Preferences;
use reqwest::Url;
use serde_json::{Value, json};
use uuid::Uuid;

pub const TEST_TOKEN: &str = "up:yeah:test-token";
pub const API_PREFIX: &str = "/api/v1";

type RouteKey = (String, String, Vec<(String, String)>);

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path relative to the API root, e.g. `transactions`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json_body(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Request body is not JSON")
    }
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<RouteKey, (u16, String)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// In-process stand-in for the banking API, listening on an ephemeral port.
pub struct MockUpstream {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(respond).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock upstream");
        let addr = listener.local_addr().expect("Mock upstream has no address");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock upstream stopped");
        });

        MockUpstream {
            base_url: format!("http://{}{}", addr, API_PREFIX),
            state,
        }
    }

    /// Registers a canned response. `query` order does not matter.
    pub fn on(&self, method: &str, path: &str, query: &[(&str, &str)], status: u16, body: Value) {
        let body = if status == 204 { String::new() } else { body.to_string() };
        self.on_raw(method, path, query, status, body);
    }

    pub fn on_raw(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, &str)],
        status: u16,
        body: String,
    ) {
        let mut query: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        query.sort();
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string(), query), (status, body));
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}/{}", self.base_url, path_and_query)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state.requests.lock().unwrap().clear();
    }
}

async fn respond(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let parsed = Url::parse(&format!("http://mock{}", uri)).expect("Unparseable request URI");
    let path = parsed
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(parsed.path())
        .trim_start_matches('/')
        .to_string();
    let mut query: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
    query.sort();

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.as_str().to_string(),
        path: path.clone(),
        query: query.clone(),
        headers,
        body: body.to_vec(),
    });

    let key = (method.as_str().to_string(), path, query);
    let found = state.routes.lock().unwrap().get(&key).cloned();
    match found {
        Some((status, body)) => (
            StatusCode::from_u16(status).expect("Invalid mock status"),
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            json!({ "errors": [{ "status": "404", "title": "Not Found", "detail": "No route" }] })
                .to_string(),
        )
            .into_response(),
    }
}

pub async fn client(mock: &MockUpstream) -> ApiClient {
    let config = Config::with_base_url(&mock.base_url).expect("Mock base URL rejected");
    let preferences = Preferences::in_memory();
    preferences
        .set_api_token(TEST_TOKEN)
        .await
        .expect("Failed to store token");
    ApiClient::new(config, preferences).expect("Failed to build client")
}

// Fixtures

pub fn money(cents: i64) -> Value {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    json!({
        "currencyCode": "AUD",
        "value": format!("{}{}.{:02}", sign, abs / 100, abs % 100),
        "valueInBaseUnits": cents
    })
}

pub fn page(data: Vec<Value>, next: Option<String>) -> Value {
    json!({ "data": data, "links": { "prev": null, "next": next } })
}

pub fn account(id: &str, name: &str, cents: i64) -> Value {
    json!({
        "type": "accounts",
        "id": id,
        "attributes": {
            "displayName": name,
            "accountType": "TRANSACTIONAL",
            "balance": money(cents),
            "createdAt": "2020-06-01T10:00:00+10:00"
        },
        "relationships": {
            "transactions": {
                "links": { "related": format!("https://api.example.test/accounts/{}/transactions", id) }
            }
        }
    })
}

pub fn category(id: &str, name: &str, parent: Option<&str>, children: &[&str]) -> Value {
    let parent = parent.map(|p| json!({ "type": "categories", "id": p }));
    let children: Vec<Value> = children
        .iter()
        .map(|c| json!({ "type": "categories", "id": c }))
        .collect();
    json!({
        "type": "categories",
        "id": id,
        "attributes": { "name": name },
        "relationships": {
            "parent": { "data": parent },
            "children": { "data": children }
        }
    })
}

pub fn tag(id: &str) -> Value {
    json!({ "type": "tags", "id": id })
}

/// Builder for transaction resources.
#[derive(Debug, Clone)]
pub struct TransactionFixture {
    pub id: String,
    description: String,
    cents: i64,
    settled: bool,
    account_id: String,
    category: Option<(String, String)>,
    tags: Vec<String>,
    tags_link: Option<String>,
}

impl TransactionFixture {
    pub fn new(description: &str, cents: i64) -> Self {
        TransactionFixture {
            id: Uuid::new_v4().to_string(),
            description: description.to_string(),
            cents,
            settled: true,
            account_id: "acc-1".to_string(),
            category: None,
            tags: Vec::new(),
            tags_link: None,
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn held(mut self) -> Self {
        self.settled = false;
        self
    }

    pub fn account(mut self, account_id: &str) -> Self {
        self.account_id = account_id.to_string();
        self
    }

    pub fn category(mut self, child: &str, parent: &str) -> Self {
        self.category = Some((child.to_string(), parent.to_string()));
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn tags_link(mut self, link: &str) -> Self {
        self.tags_link = Some(link.to_string());
        self
    }

    pub fn json(&self) -> Value {
        let (status, settled_at) = if self.settled {
            ("SETTLED", Some("2021-03-02T09:00:00+11:00"))
        } else {
            ("HELD", None)
        };
        let (category, parent) = match &self.category {
            Some((child, parent)) => (
                json!({ "type": "categories", "id": child }),
                json!({ "type": "categories", "id": parent }),
            ),
            None => (Value::Null, Value::Null),
        };
        let tags: Vec<Value> = self.tags.iter().map(|t| tag(t)).collect();
        let tags_links = self.tags_link.as_ref().map(|l| json!({ "self": l }));

        json!({
            "type": "transactions",
            "id": self.id,
            "attributes": {
                "status": status,
                "rawText": null,
                "description": self.description,
                "message": null,
                "holdInfo": null,
                "roundUp": null,
                "cashback": null,
                "amount": money(self.cents),
                "foreignAmount": null,
                "settledAt": settled_at,
                "createdAt": "2021-03-01T08:15:00+11:00"
            },
            "relationships": {
                "account": { "data": { "type": "accounts", "id": self.account_id } },
                "category": { "data": category },
                "parentCategory": { "data": parent },
                "tags": { "data": tags, "links": tags_links }
            }
        })
    }

    pub fn decode(&self) -> Transaction {
        decode_transactions(vec![self.json()]).remove(0)
    }
}

pub fn decode_transactions(data: Vec<Value>) -> Vec<Transaction> {
    let body = page(data, None).to_string();
    decode_list::<Transaction>(body.as_bytes())
        .expect("Fixture failed to decode")
        .items
}
