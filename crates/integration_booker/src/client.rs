//! Booker order API client
//!
//! Implements the four order operations (create, status, cancel, in-place
//! update) against the Booker dispatch API. Responses are reconciled
//! leniently: the upstream returns order identifiers in several shapes
//! (a signed token whose claims carry them, or assorted direct fields),
//! and known-vanished orders surface as outcomes rather than errors.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use domain::OrderRef;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::classify::{
    classify_response, classify_transport, looks_like_html, looks_like_stack_trace, snippet,
};
use crate::config::BookerConfig;
use crate::error::{BookerError, TransportKind};
use crate::models::{
    CancelOutcome, DriverInfo, JobStatus, OrderDocument, OrderUpdate, StatusSnapshot,
    UpdateOutcome,
};
use crate::token::{TokenManager, decode_claims};

const USER_AGENT: &str = "Corbiere/0.3";

/// HTTP verb used for an in-place order update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMethod {
    /// Full-document replacement
    Put,
    /// Partial patch
    Patch,
}

impl fmt::Display for UpdateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Put => "PUT",
            Self::Patch => "PATCH",
        };
        write!(f, "{verb}")
    }
}

/// Trait for Booker order API clients
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Submit a new order, returning its identifiers
    async fn create_order(&self, document: &OrderDocument) -> Result<OrderRef, BookerError>;

    /// Fetch the dispatch state of an order
    async fn order_status(&self, api_id: &str) -> Result<StatusSnapshot, BookerError>;

    /// Cancel an order; an already-vanished order counts as success
    async fn cancel_order(&self, api_id: &str, reason: &str)
    -> Result<CancelOutcome, BookerError>;

    /// Update an order in place; not guaranteed supported upstream
    async fn update_order(
        &self,
        api_id: &str,
        update: &OrderUpdate,
        method: UpdateMethod,
    ) -> Result<UpdateOutcome, BookerError>;

    /// Check if the dispatch API is reachable
    async fn is_available(&self) -> bool;
}

/// HTTP client for the Booker dispatch API
#[derive(Debug)]
pub struct BookerClient {
    http: Client,
    config: BookerConfig,
    tokens: TokenManager,
}

impl BookerClient {
    /// Create a new Booker client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &BookerConfig) -> Result<Self, BookerError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BookerError::Transport {
                kind: TransportKind::Request,
                detail: e.to_string(),
            })?;

        let tokens = TokenManager::new(config.clone(), http.clone());

        Ok(Self {
            http,
            config: config.clone(),
            tokens,
        })
    }

    /// Send an authenticated request and collect status plus raw body
    ///
    /// A 401 response drops the cached token so the next call re-issues;
    /// the 401 itself is still classified by the caller.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, String), BookerError> {
        let token = self.tokens.bearer_token().await?;

        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| classify_transport(&e, self.config.timeout_secs))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            BookerError::MalformedResponse(format!("failed to read response body: {e}"))
        })?;

        if status == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate().await;
        }

        debug!(status = %status, body = %body, "Booker response");
        Ok((status, body))
    }

    /// Parse a create response into an order reference
    ///
    /// Two shapes exist in the wild: a signed token whose middle-segment
    /// claims carry `oid`/`jid`, and direct identifier fields. The token
    /// is tried first; an undecodable token falls back to whatever direct
    /// fields are present. Order-id fields are searched in the fixed
    /// order `order_id`, `id`, `orderId`, `booking_id`; job-id fields as
    /// `meta.job_id`, `job_id`, `jid`.
    fn parse_create_response(body: &str) -> Result<OrderRef, BookerError> {
        if looks_like_stack_trace(body) {
            return Err(BookerError::UpstreamInternalError(snippet(body)));
        }
        if looks_like_html(body) {
            return Err(BookerError::ServiceUnavailable(format!(
                "order endpoint served an HTML page: {}",
                snippet(body)
            )));
        }

        let value: Value = serde_json::from_str(body).map_err(|_| {
            BookerError::MalformedResponse(format!(
                "order response was not JSON: {}",
                snippet(body)
            ))
        })?;

        if let Some(token) = value.get("token").and_then(Value::as_str) {
            if let Some(claims) = decode_claims(token) {
                let order_id = claims
                    .get("oid")
                    .and_then(Value::as_str)
                    .map(ToString::to_string);
                let job_id = claims.get("jid").and_then(numeric_id);

                if order_id.is_some() || job_id.is_some() {
                    return OrderRef::new(order_id, job_id)
                        .map_err(|_| BookerError::MissingIdentifier);
                }
            }
        }

        let order_id = direct_order_id(&value);
        let job_id = direct_job_id(&value);
        OrderRef::new(order_id, job_id).map_err(|_| BookerError::MissingIdentifier)
    }

    /// Parse a status response into a snapshot
    ///
    /// Accepts both the nested `order_status.job.state` shape and a bare
    /// top-level `status` field.
    fn parse_status_response(body: &str) -> Result<StatusSnapshot, BookerError> {
        if looks_like_stack_trace(body) {
            return Err(BookerError::UpstreamInternalError(snippet(body)));
        }
        if looks_like_html(body) {
            return Err(BookerError::ServiceUnavailable(format!(
                "status endpoint served an HTML page: {}",
                snippet(body)
            )));
        }

        let value: Value = serde_json::from_str(body).map_err(|_| {
            BookerError::MalformedResponse(format!(
                "status response was not JSON: {}",
                snippet(body)
            ))
        })?;

        let job = value.pointer("/order_status/job");
        let state = job
            .and_then(|j| j.get("state"))
            .and_then(Value::as_str)
            .or_else(|| value.get("status").and_then(Value::as_str));

        let Some(state) = state else {
            return Err(BookerError::MalformedResponse(format!(
                "status response carried no state field: {}",
                snippet(body)
            )));
        };

        let driver = job
            .and_then(|j| j.get("driver"))
            .or_else(|| value.get("driver"))
            .and_then(parse_driver);

        Ok(StatusSnapshot {
            status: JobStatus::from_wire(state),
            driver,
        })
    }
}

#[async_trait]
impl OrderApi for BookerClient {
    #[instrument(skip(self, document), fields(nodes = document.route.nodes.len()))]
    async fn create_order(&self, document: &OrderDocument) -> Result<OrderRef, BookerError> {
        let url = self.config.endpoint("order");
        let envelope = OrderEnvelope { order: document };

        let (status, body) = self.send(self.http.post(&url).json(&envelope)).await?;

        if !status.is_success() {
            return Err(classify_response(status, &body));
        }

        let reference = Self::parse_create_response(&body)?;
        debug!(order = %reference, "Order created");
        Ok(reference)
    }

    #[instrument(skip(self))]
    async fn order_status(&self, api_id: &str) -> Result<StatusSnapshot, BookerError> {
        let url = self.config.endpoint(&format!("order/{api_id}/status"));

        let (status, body) = self.send(self.http.get(&url)).await?;

        if status == StatusCode::NOT_FOUND {
            // Finished jobs are purged upstream; absence is a state
            debug!(%api_id, "Order unknown upstream, reporting not-found status");
            return Ok(StatusSnapshot {
                status: JobStatus::NotFound,
                driver: None,
            });
        }
        if !status.is_success() {
            return Err(classify_response(status, &body));
        }

        let snapshot = Self::parse_status_response(&body)?;
        if snapshot.status == JobStatus::Unknown {
            warn!(%api_id, "Upstream reported a state outside the known vocabulary");
        }
        Ok(snapshot)
    }

    #[instrument(skip(self))]
    async fn cancel_order(
        &self,
        api_id: &str,
        reason: &str,
    ) -> Result<CancelOutcome, BookerError> {
        let url = self.config.endpoint(&format!("order/{api_id}/cancel"));
        let payload = CancelRequest {
            company_id: &self.config.company_id,
            reason,
        };

        let (status, body) = self.send(self.http.post(&url).json(&payload)).await?;

        if status == StatusCode::NOT_FOUND {
            debug!(%api_id, "Order already absent upstream, cancel is a no-op");
            return Ok(CancelOutcome::AlreadyGone);
        }
        if !status.is_success() {
            return Err(classify_response(status, &body));
        }
        if looks_like_stack_trace(&body) {
            return Err(BookerError::UpstreamInternalError(snippet(&body)));
        }
        if looks_like_html(&body) {
            // A proxy page with a 2xx is no proof the backend cancelled
            return Err(BookerError::ServiceUnavailable(format!(
                "cancel endpoint served an HTML page: {}",
                snippet(&body)
            )));
        }

        Ok(CancelOutcome::Cancelled)
    }

    #[instrument(skip(self, update))]
    async fn update_order(
        &self,
        api_id: &str,
        update: &OrderUpdate,
        method: UpdateMethod,
    ) -> Result<UpdateOutcome, BookerError> {
        let url = self.config.endpoint(&format!("order/{api_id}"));
        let request = match method {
            UpdateMethod::Put => self.http.put(&url),
            UpdateMethod::Patch => self.http.patch(&url),
        };

        let (status, body) = self.send(request.json(update)).await?;

        if !status.is_success() {
            return Err(classify_response(status, &body));
        }

        // Applied needs a 2xx with a real JSON body; an HTML page or empty
        // body with a 2xx means a proxy answered without the backend
        // applying anything
        if serde_json::from_str::<Value>(&body).is_ok() {
            Ok(UpdateOutcome::Applied)
        } else {
            Ok(UpdateOutcome::Rejected {
                reason: format!(
                    "{method} returned HTTP {status} with a non-JSON body: {}",
                    snippet(&body)
                ),
            })
        }
    }

    async fn is_available(&self) -> bool {
        self.http.get(&self.config.base_url).send().await.is_ok()
    }
}

/// Pull the first usable order id out of the known direct fields
fn direct_order_id(value: &Value) -> Option<String> {
    ["order_id", "id", "orderId", "booking_id"]
        .iter()
        .find_map(|key| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|id| !id.is_empty())
        })
        .map(ToString::to_string)
}

/// Pull the first usable job id out of the known direct fields
fn direct_job_id(value: &Value) -> Option<u64> {
    [
        value.pointer("/meta/job_id"),
        value.get("job_id"),
        value.get("jid"),
    ]
    .into_iter()
    .flatten()
    .find_map(numeric_id)
}

/// Read a job id that may arrive as a number or a numeric string
fn numeric_id(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Extract driver details when the upstream includes any
fn parse_driver(value: &Value) -> Option<DriverInfo> {
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .map(ToString::to_string);
    let vehicle = value
        .get("vehicle")
        .and_then(Value::as_str)
        .map(ToString::to_string);

    if name.is_none() && vehicle.is_none() {
        return None;
    }
    Some(DriverInfo { name, vehicle })
}

#[derive(Serialize)]
struct OrderEnvelope<'a> {
    order: &'a OrderDocument,
}

#[derive(Serialize)]
struct CancelRequest<'a> {
    company_id: &'a str,
    reason: &'a str,
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::json;

    use super::*;
    use crate::models::{NodeAction, PassengerItem, RouteGraph, RouteLeg, RouteMeta, RouteNode};

    fn signed_token(claims: &Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.signature")
    }

    #[test]
    fn test_parse_create_direct_fields() {
        let body = json!({"order_id": "4f2a9c", "meta": {"job_id": 84512}}).to_string();
        let reference = BookerClient::parse_create_response(&body).unwrap();
        assert_eq!(reference.order_id(), Some("4f2a9c"));
        assert_eq!(reference.job_id(), Some(84512));
    }

    #[test]
    fn test_parse_create_field_priority() {
        // `id` outranks `booking_id`
        let body = json!({"booking_id": "beef01", "id": "cafe02"}).to_string();
        let reference = BookerClient::parse_create_response(&body).unwrap();
        assert_eq!(reference.order_id(), Some("cafe02"));

        // Blank ids are skipped, not taken
        let body = json!({"order_id": "  ", "orderId": "aa11"}).to_string();
        let reference = BookerClient::parse_create_response(&body).unwrap();
        assert_eq!(reference.order_id(), Some("aa11"));
    }

    #[test]
    fn test_parse_create_job_id_shapes() {
        let body = json!({"job_id": "84512"}).to_string();
        let reference = BookerClient::parse_create_response(&body).unwrap();
        assert_eq!(reference.job_id(), Some(84512));

        let body = json!({"jid": 221}).to_string();
        let reference = BookerClient::parse_create_response(&body).unwrap();
        assert_eq!(reference.job_id(), Some(221));

        // meta.job_id outranks a top-level jid
        let body = json!({"meta": {"job_id": 1}, "jid": 2}).to_string();
        let reference = BookerClient::parse_create_response(&body).unwrap();
        assert_eq!(reference.job_id(), Some(1));
    }

    #[test]
    fn test_parse_create_signed_token() {
        let token = signed_token(&json!({"oid": "4f2a9c", "jid": 84512, "exp": 2_000_000_000}));
        let body = json!({"token": token}).to_string();

        let reference = BookerClient::parse_create_response(&body).unwrap();
        assert_eq!(reference.order_id(), Some("4f2a9c"));
        assert_eq!(reference.job_id(), Some(84512));
    }

    #[test]
    fn test_parse_create_undecodable_token_falls_back() {
        let body = json!({"token": "not-a-signed-token", "order_id": "ab12"}).to_string();
        let reference = BookerClient::parse_create_response(&body).unwrap();
        assert_eq!(reference.order_id(), Some("ab12"));
    }

    #[test]
    fn test_parse_create_token_without_ids_falls_back() {
        let token = signed_token(&json!({"exp": 2_000_000_000}));
        let body = json!({"token": token, "meta": {"job_id": 7}}).to_string();
        let reference = BookerClient::parse_create_response(&body).unwrap();
        assert_eq!(reference.job_id(), Some(7));
    }

    #[test]
    fn test_parse_create_no_identifiers() {
        let err = BookerClient::parse_create_response("{}").unwrap_err();
        assert!(matches!(err, BookerError::MissingIdentifier));
    }

    #[test]
    fn test_parse_create_rejects_html_and_garbage() {
        let err = BookerClient::parse_create_response("<html><body>busy</body></html>")
            .unwrap_err();
        assert!(matches!(err, BookerError::ServiceUnavailable(_)));

        let err = BookerClient::parse_create_response("NullReferenceException at ...")
            .unwrap_err();
        assert!(matches!(err, BookerError::UpstreamInternalError(_)));

        let err = BookerClient::parse_create_response("not json at all").unwrap_err();
        assert!(matches!(err, BookerError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_status_nested_shape() {
        let body = json!({
            "order_status": {
                "job": {
                    "state": "en_route",
                    "driver": {"name": "Pat Vautier", "vehicle": "Silver Skoda Octavia"}
                }
            }
        })
        .to_string();

        let snapshot = BookerClient::parse_status_response(&body).unwrap();
        assert_eq!(snapshot.status, JobStatus::EnRoute);
        let driver = snapshot.driver.unwrap();
        assert_eq!(driver.name.as_deref(), Some("Pat Vautier"));
        assert_eq!(driver.vehicle.as_deref(), Some("Silver Skoda Octavia"));
    }

    #[test]
    fn test_parse_status_top_level_shape() {
        let body = json!({"status": "completed"}).to_string();
        let snapshot = BookerClient::parse_status_response(&body).unwrap();
        assert_eq!(snapshot.status, JobStatus::Completed);
        assert!(snapshot.driver.is_none());
    }

    #[test]
    fn test_parse_status_unknown_state() {
        let body = json!({"status": "hyperspace"}).to_string();
        let snapshot = BookerClient::parse_status_response(&body).unwrap();
        assert_eq!(snapshot.status, JobStatus::Unknown);
    }

    #[test]
    fn test_parse_status_missing_state() {
        let err = BookerClient::parse_status_response("{\"ok\": true}").unwrap_err();
        assert!(matches!(err, BookerError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_driver_requires_some_field() {
        assert!(parse_driver(&json!({})).is_none());
        assert!(parse_driver(&json!({"name": "Pat"})).is_some());
        assert!(parse_driver(&json!({"vehicle": "Skoda"})).is_some());
    }

    #[test]
    fn test_order_envelope_shape() {
        let document = OrderDocument {
            company_id: "corbiere".to_string(),
            provider_id: "fleet-1".to_string(),
            items: vec![PassengerItem {
                kind: PassengerItem::KIND.to_string(),
                name: "Ada Le Brun".to_string(),
                phone: "+447797123456".to_string(),
                email: None,
                seats: 1,
                luggage: 0,
                wheelchair: false,
                payment: "cash".to_string(),
            }],
            route: RouteGraph {
                nodes: vec![RouteNode {
                    seq: 0,
                    name: "Liberation Station".to_string(),
                    lat: 49_185_800,
                    lng: -2_108_900,
                    actions: vec![NodeAction::Enter],
                    arrival: None,
                    info: String::new(),
                }],
                legs: vec![RouteLeg {
                    from_node: 0,
                    to_node: 0,
                    coords: [0, 0, 0, 0],
                    distance: 0,
                    duration: 0,
                }],
                meta: RouteMeta::default(),
            },
        };

        let json = serde_json::to_value(OrderEnvelope { order: &document }).unwrap();
        assert_eq!(json["order"]["company_id"], "corbiere");
        assert_eq!(json["order"]["items"][0]["type"], "passenger");
        assert_eq!(json["order"]["route"]["nodes"][0]["actions"][0], "enter");
        assert_eq!(json["order"]["route"]["meta"]["distance"], 0);
    }

    #[test]
    fn test_update_method_display() {
        assert_eq!(UpdateMethod::Put.to_string(), "PUT");
        assert_eq!(UpdateMethod::Patch.to_string(), "PATCH");
    }
}
