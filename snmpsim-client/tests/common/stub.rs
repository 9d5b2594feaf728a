//! In-process stand-in for the simulator REST API.
//!
//! Keeps entities as JSON in memory, honours relations and lab power, stores
//! uploaded recordings and answers metrics queries from a fixed traffic table
//! so filtered and unfiltered counters can be compared.

use super::serve;
use axum::body::Bytes;
use axum::extract::{Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

/// Endpoint with a handful of packets.
pub const ENDPOINT_QUIET: &str = "127.0.0.1:1161";
/// Endpoint with heavy traffic and some authentication failures.
pub const ENDPOINT_BUSY: &str = "127.0.0.1:1162";

pub const FILTER_KEYS: [&str; 2] = ["local_address", "transport_protocol"];

const FIRST_HIT: i64 = 1_700_000_000;
const LAST_HIT: i64 = 1_700_000_030;

/// Counters of one endpoint in the stub's traffic table.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndpointTraffic {
    pub total: u64,
    pub parse_failures: u64,
    pub auth_failures: u64,
    pub context_failures: u64,
    pub message_failures: u64,
}

impl EndpointTraffic {
    pub fn clean(total: u64) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    fn pdus(&self) -> u64 {
        self.total - self.parse_failures - self.auth_failures - self.context_failures
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct Inventory {
    next_id: u64,
    entities: BTreeMap<&'static str, BTreeMap<u64, Value>>,
    /// (kind, id, relation, other id)
    relations: BTreeSet<(&'static str, u64, &'static str, u64)>,
    recordings: BTreeMap<String, (u64, Vec<u8>)>,
    traffic: BTreeMap<String, EndpointTraffic>,
}

#[derive(Clone, Default)]
pub struct SimulatorStub {
    inventory: Arc<Mutex<Inventory>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    auth: Option<(String, String)>,
}

impl SimulatorStub {
    pub fn new() -> Self {
        let stub = Self::default();
        stub.set_traffic(ENDPOINT_QUIET, EndpointTraffic::clean(12));
        stub.set_traffic(
            ENDPOINT_BUSY,
            EndpointTraffic {
                total: 15_000,
                auth_failures: 3,
                message_failures: 1,
                ..EndpointTraffic::default()
            },
        );
        stub
    }

    /// Require HTTP basic auth on every route.
    pub fn with_auth(mut self, username: &str, password: &str) -> Self {
        self.auth = Some((username.to_string(), password.to_string()));
        self
    }

    pub fn set_traffic(&self, address: &str, traffic: EndpointTraffic) {
        self.inventory
            .lock()
            .unwrap()
            .traffic
            .insert(address.to_string(), traffic);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request recorded")
    }

    pub fn recording(&self, path: &str) -> Option<Vec<u8>> {
        self.inventory
            .lock()
            .unwrap()
            .recordings
            .get(path)
            .map(|(_, data)| data.clone())
    }

    pub fn entity_count(&self, kind: &str) -> usize {
        self.inventory
            .lock()
            .unwrap()
            .entities
            .get(kind)
            .map_or(0, BTreeMap::len)
    }

    /// Serve the stub and return the base URL to hand to the clients.
    pub async fn start(&self) -> String {
        serve(self.router()).await
    }

    pub fn router(&self) -> Router {
        let mgmt = Router::new()
            .merge(entity_routes("labs", &["name"]))
            .merge(entity_routes("agents", &["name", "data_dir"]))
            .merge(entity_routes("engines", &["name", "engine_id"]))
            .merge(entity_routes("endpoints", &["name", "address", "protocol"]))
            .merge(entity_routes("users", &["user", "name"]))
            .merge(relation_routes("labs", "agent", "agents"))
            .merge(relation_routes("agents", "engine", "engines"))
            .merge(relation_routes("engines", "endpoint", "endpoints"))
            .merge(relation_routes("engines", "user", "users"))
            .route("/labs/:id/power/:state", put(set_power))
            .route("/selectors", get(selectors))
            .route("/selectors/:id", get(selector))
            .route("/recordings", get(recordings))
            .route(
                "/recordings/*path",
                axum::routing::post(upload_recording).delete(delete_recording),
            );

        let metrics = Router::new()
            .route("/activity/:activity", get(activity))
            .route("/activity/:activity/filters", get(filters))
            .route("/activity/:activity/filters/:key", get(filter_values))
            .route("/processes", get(processes))
            .route("/processes/:id", get(process));

        Router::new()
            .nest("/snmpsim/mgmt/v1", mgmt)
            .nest("/snmpsim/metrics/v1", metrics)
            .layer(middleware::from_fn_with_state(self.clone(), record_and_authorize))
            .with_state(self.clone())
    }

    fn create(&self, kind: &'static str, required: &[&str], body: Value) -> Response {
        let Value::Object(mut fields) = body else {
            return error(StatusCode::BAD_REQUEST, "expected a JSON object");
        };
        for field in required {
            let present = fields
                .get(*field)
                .and_then(Value::as_str)
                .map_or(false, |v| !v.is_empty());
            if !present {
                return error(StatusCode::BAD_REQUEST, &format!("missing field {field}"));
            }
        }
        if kind == "endpoints" {
            let protocol = fields.get("protocol").and_then(Value::as_str);
            if !matches!(protocol, Some("udpv4") | Some("udpv6")) {
                return error(StatusCode::BAD_REQUEST, "unsupported protocol");
            }
        }

        let mut inventory = self.inventory.lock().unwrap();
        inventory.next_id += 1;
        let id = inventory.next_id;
        fields.insert("id".to_string(), json!(id));
        if kind == "labs" {
            fields.insert("power".to_string(), json!("off"));
        }
        let entity = Value::Object(fields);
        inventory
            .entities
            .entry(kind)
            .or_default()
            .insert(id, entity.clone());
        (StatusCode::CREATED, Json(entity)).into_response()
    }

    fn list(&self, kind: &'static str) -> Response {
        let inventory = self.inventory.lock().unwrap();
        let ids: Vec<u64> = inventory
            .entities
            .get(kind)
            .map(|items| items.keys().copied().collect())
            .unwrap_or_default();
        let items: Vec<Value> = ids
            .into_iter()
            .filter_map(|id| expand(&inventory, kind, id))
            .collect();
        Json(items).into_response()
    }

    fn fetch(&self, kind: &'static str, id: u64) -> Response {
        let inventory = self.inventory.lock().unwrap();
        match expand(&inventory, kind, id) {
            Some(entity) => Json(entity).into_response(),
            None => not_found(kind, id),
        }
    }

    fn remove(&self, kind: &'static str, id: u64) -> Response {
        let mut inventory = self.inventory.lock().unwrap();
        let removed = inventory
            .entities
            .get_mut(kind)
            .and_then(|items| items.remove(&id));
        if removed.is_none() {
            return not_found(kind, id);
        }
        inventory
            .relations
            .retain(|(k, i, _, _)| !(*k == kind && *i == id));
        StatusCode::NO_CONTENT.into_response()
    }

    fn link(&self, kind: &'static str, id: u64, relation: &'static str, target: &'static str, other: u64, add: bool) -> Response {
        let mut inventory = self.inventory.lock().unwrap();
        if !exists(&inventory, kind, id) {
            return not_found(kind, id);
        }
        if !exists(&inventory, target, other) {
            return not_found(target, other);
        }
        let key = (kind, id, relation, other);
        if add {
            inventory.relations.insert(key);
        } else if !inventory.relations.remove(&key) {
            return error(
                StatusCode::NOT_FOUND,
                &format!("{target} {other} is not linked to {kind} {id}"),
            );
        }
        StatusCode::NO_CONTENT.into_response()
    }
}

fn exists(inventory: &Inventory, kind: &str, id: u64) -> bool {
    inventory
        .entities
        .get(kind)
        .map_or(false, |items| items.contains_key(&id))
}

/// Entity JSON with its related entities inlined, one level deep.
fn expand(inventory: &Inventory, kind: &str, id: u64) -> Option<Value> {
    let mut entity = inventory.entities.get(kind)?.get(&id)?.clone();
    for (k, i, relation, other) in &inventory.relations {
        if *k != kind || *i != id {
            continue;
        }
        let target = target_kind(relation);
        if let Some(related) = inventory.entities.get(target).and_then(|m| m.get(other)) {
            if let Some(list) = entity
                .as_object_mut()
                .map(|fields| fields.entry(target).or_insert_with(|| json!([])))
                .and_then(Value::as_array_mut)
            {
                list.push(related.clone());
            }
        }
    }
    Some(entity)
}

fn target_kind(relation: &str) -> &'static str {
    match relation {
        "agent" => "agents",
        "engine" => "engines",
        "endpoint" => "endpoints",
        _ => "users",
    }
}

fn entity_routes(kind: &'static str, required: &'static [&'static str]) -> Router<SimulatorStub> {
    Router::new()
        .route(
            &format!("/{kind}"),
            get(move |State(stub): State<SimulatorStub>| async move { stub.list(kind) }).post(
                move |State(stub): State<SimulatorStub>, Json(body): Json<Value>| async move {
                    stub.create(kind, required, body)
                },
            ),
        )
        .route(
            &format!("/{kind}/:id"),
            get(
                move |State(stub): State<SimulatorStub>, Path(id): Path<u64>| async move {
                    stub.fetch(kind, id)
                },
            )
            .delete(
                move |State(stub): State<SimulatorStub>, Path(id): Path<u64>| async move {
                    stub.remove(kind, id)
                },
            ),
        )
}

fn relation_routes(kind: &'static str, relation: &'static str, target: &'static str) -> Router<SimulatorStub> {
    Router::new().route(
        &format!("/{kind}/:id/{relation}/:other"),
        put(
            move |State(stub): State<SimulatorStub>, Path((id, other)): Path<(u64, u64)>| async move {
                stub.link(kind, id, relation, target, other, true)
            },
        )
        .delete(
            move |State(stub): State<SimulatorStub>, Path((id, other)): Path<(u64, u64)>| async move {
                stub.link(kind, id, relation, target, other, false)
            },
        ),
    )
}

async fn set_power(
    State(stub): State<SimulatorStub>,
    Path((id, state)): Path<(u64, String)>,
) -> Response {
    if state != "on" && state != "off" {
        return error(StatusCode::BAD_REQUEST, &format!("unknown power state {state}"));
    }
    let mut inventory = stub.inventory.lock().unwrap();
    match inventory.entities.get_mut("labs").and_then(|labs| labs.get_mut(&id)) {
        Some(lab) => {
            lab["power"] = json!(state);
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found("labs", id),
    }
}

fn default_selectors() -> Vec<Value> {
    vec![
        json!({"id": 1, "comment": "SNMPv2c default", "template": "${context-name}${endpoint-id}${source-address}"}),
        json!({"id": 2, "comment": "SNMPv3 default", "template": "${context-engine-id}${context-name}"}),
    ]
}

async fn selectors() -> Json<Vec<Value>> {
    Json(default_selectors())
}

async fn selector(Path(id): Path<u64>) -> Response {
    match default_selectors().into_iter().find(|s| s["id"] == json!(id)) {
        Some(selector) => Json(selector).into_response(),
        None => not_found("selectors", id),
    }
}

async fn recordings(State(stub): State<SimulatorStub>) -> Json<Vec<Value>> {
    let inventory = stub.inventory.lock().unwrap();
    Json(
        inventory
            .recordings
            .iter()
            .map(|(path, (id, _))| recording_json(*id, path))
            .collect(),
    )
}

fn recording_json(id: u64, path: &str) -> Value {
    let name = path.rsplit('/').next().unwrap_or(path);
    json!({"id": id, "name": name, "path": path})
}

async fn upload_recording(
    State(stub): State<SimulatorStub>,
    Path(path): Path<String>,
    body: Bytes,
) -> Response {
    let mut inventory = stub.inventory.lock().unwrap();
    if inventory.recordings.contains_key(&path) {
        return error(StatusCode::CONFLICT, &format!("recording {path} already exists"));
    }
    inventory.next_id += 1;
    let id = inventory.next_id;
    inventory.recordings.insert(path.clone(), (id, body.to_vec()));
    (StatusCode::CREATED, Json(recording_json(id, &path))).into_response()
}

async fn delete_recording(State(stub): State<SimulatorStub>, Path(path): Path<String>) -> Response {
    let mut inventory = stub.inventory.lock().unwrap();
    match inventory.recordings.remove(&path) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => error(StatusCode::NOT_FOUND, &format!("recording {path} not found")),
    }
}

/// Sum the traffic of every endpoint matching all filter pairs.
fn matching_traffic(
    stub: &SimulatorStub,
    filters: &HashMap<String, String>,
) -> Result<EndpointTraffic, Response> {
    let inventory = stub.inventory.lock().unwrap();
    for (key, value) in filters {
        let known = match key.as_str() {
            "local_address" => inventory.traffic.contains_key(value),
            "transport_protocol" => value == "udpv4",
            _ => return Err(error(StatusCode::BAD_REQUEST, &format!("unknown filter {key}"))),
        };
        if !known {
            return Err(error(
                StatusCode::BAD_REQUEST,
                &format!("unknown value {value} for filter {key}"),
            ));
        }
    }

    let mut sum = EndpointTraffic::default();
    for (address, traffic) in &inventory.traffic {
        if filters
            .get("local_address")
            .map_or(false, |wanted| wanted != address)
        {
            continue;
        }
        sum.total += traffic.total;
        sum.parse_failures += traffic.parse_failures;
        sum.auth_failures += traffic.auth_failures;
        sum.context_failures += traffic.context_failures;
        sum.message_failures += traffic.message_failures;
    }
    Ok(sum)
}

async fn activity(
    State(stub): State<SimulatorStub>,
    Path(activity): Path<String>,
    Query(filters): Query<HashMap<String, String>>,
) -> Response {
    let traffic = match matching_traffic(&stub, &filters) {
        Ok(traffic) => traffic,
        Err(response) => return response,
    };
    match activity.as_str() {
        "packets" => Json(json!({
            "first_hit": FIRST_HIT,
            "last_hit": LAST_HIT,
            "total": traffic.total,
            "parse_failures": traffic.parse_failures,
            "auth_failures": traffic.auth_failures,
            "context_failures": traffic.context_failures,
        }))
        .into_response(),
        "messages" => Json(json!({
            "first_hit": FIRST_HIT,
            "last_hit": LAST_HIT,
            "pdus": traffic.pdus(),
            "var_binds": traffic.pdus(),
            "failures": traffic.message_failures,
            "variations": [
                {"name": "writecache", "first_hit": FIRST_HIT, "last_hit": LAST_HIT,
                 "total": traffic.pdus() / 2, "failures": traffic.message_failures},
                {"name": "numeric", "total": null, "failures": null},
            ],
        }))
        .into_response(),
        other => error(StatusCode::NOT_FOUND, &format!("unknown activity {other}")),
    }
}

async fn filters(Path(activity): Path<String>) -> Response {
    match activity.as_str() {
        "packets" | "messages" => Json(FILTER_KEYS.to_vec()).into_response(),
        other => error(StatusCode::NOT_FOUND, &format!("unknown activity {other}")),
    }
}

async fn filter_values(
    State(stub): State<SimulatorStub>,
    Path((_activity, key)): Path<(String, String)>,
) -> Response {
    match key.as_str() {
        "local_address" => {
            let inventory = stub.inventory.lock().unwrap();
            let values: Vec<String> = inventory.traffic.keys().cloned().collect();
            Json(values).into_response()
        }
        "transport_protocol" => Json(vec!["udpv4"]).into_response(),
        other => error(StatusCode::NOT_FOUND, &format!("unknown filter {other}")),
    }
}

fn process_json(id: u64) -> Option<Value> {
    let cmdline = match id {
        1 => "snmpsim-command-responder --config /etc/snmpsim/responder.json",
        2 => "snmpsim-mgmt-supervisor --watch-dir /etc/snmpsim",
        _ => return None,
    };
    Some(json!({
        "cmdline": cmdline,
        "uptime": 3600 * id,
        "owner": "snmpsim",
        "memory": 24 * 1024 * 1024,
        "cpu": null,
        "files": 12,
        "lifecycle": {"exits": id - 1, "restarts": id - 1},
    }))
}

async fn processes() -> Json<Vec<Value>> {
    Json((1..=2).filter_map(process_json).collect())
}

async fn process(Path(id): Path<u64>) -> Response {
    match process_json(id) {
        Some(process) => Json(process).into_response(),
        None => not_found("processes", id),
    }
}

async fn record_and_authorize(State(stub): State<SimulatorStub>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    stub.requests.lock().unwrap().push(RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        authorization: authorization.clone(),
    });

    if let Some((username, password)) = &stub.auth {
        let expected = format!("Basic {}", STANDARD.encode(format!("{username}:{password}")));
        if authorization.as_deref() != Some(expected.as_str()) {
            return error(StatusCode::UNAUTHORIZED, "authentication required");
        }
    }
    next.run(request).await
}

fn not_found(kind: &str, id: u64) -> Response {
    error(StatusCode::NOT_FOUND, &format!("{kind} {id} not found"))
}

pub fn error(status: StatusCode, message: &str) -> Response {
    let mut body = Map::new();
    body.insert("message".to_string(), json!(message));
    body.insert("status".to_string(), json!(status.as_u16()));
    (status, Json(Value::Object(body))).into_response()
}
