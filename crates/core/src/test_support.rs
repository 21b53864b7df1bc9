//! Transports and fixtures for unit tests.

use crate::transport::{AsyncTransport, BlockingTransport, TransportRequest, TransportResponse};
use crate::{PdsError, PdsResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Returns a canned outcome and records every request it receives.
pub(crate) struct RecordingTransport {
    outcome: Result<TransportResponse, String>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl RecordingTransport {
    pub(crate) fn ok(body: Value) -> Self {
        Self::with_status(200, &body.to_string())
    }

    pub(crate) fn with_status(status: u16, body: &str) -> Self {
        Self {
            outcome: Ok(TransportResponse {
                status,
                body: body.to_string(),
            }),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(&self, request: &TransportRequest) -> PdsResult<TransportResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcome.clone().map_err(PdsError::Connection)
    }
}

impl BlockingTransport for RecordingTransport {
    fn get(&self, request: &TransportRequest) -> PdsResult<TransportResponse> {
        self.respond(request)
    }
}

#[async_trait]
impl AsyncTransport for RecordingTransport {
    async fn get(&self, request: &TransportRequest) -> PdsResult<TransportResponse> {
        self.respond(request)
    }
}

/// Never responds. Sets a flag when the in-flight call is dropped.
#[derive(Default)]
pub(crate) struct HangingTransport {
    released: Arc<AtomicBool>,
}

impl HangingTransport {
    pub(crate) fn released_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

struct ReleaseGuard(Arc<AtomicBool>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AsyncTransport for HangingTransport {
    async fn get(&self, _request: &TransportRequest) -> PdsResult<TransportResponse> {
        let _guard = ReleaseGuard(Arc::clone(&self.released));
        std::future::pending::<()>().await;
        unreachable!("pending future never resolves")
    }
}

/// Sandbox patient 9000000009 as PDS returns it.
pub(crate) fn standard_patient_json() -> Value {
    json!({
        "resourceType": "Patient",
        "id": "9000000009",
        "meta": {
            "versionId": "2",
            "security": [
                { "system": "http://terminology.hl7.org/CodeSystem/v3-Confidentiality", "code": "U", "display": "unrestricted" }
            ]
        },
        "name": [
            { "use": "usual", "given": ["Jane"], "family": "Smith", "prefix": ["Mrs"] }
        ],
        "gender": "female",
        "birthDate": "2010-10-22",
        "address": [
            { "use": "home", "line": ["1 Trevelyan Square", "Boar Lane", "City Centre", "Leeds", "West Yorkshire"], "postalCode": "LS1 6AE" }
        ],
        "generalPractitioner": [
            { "type": "Organization", "identifier": { "system": "https://fhir.nhs.uk/Id/ods-organization-code", "value": "Y12345" } }
        ]
    })
}

/// Sandbox patient 9000000017, labelled restricted.
pub(crate) fn restricted_patient_json() -> Value {
    json!({
        "resourceType": "Patient",
        "id": "9000000017",
        "meta": {
            "security": [
                { "system": "http://terminology.hl7.org/CodeSystem/v3-ActCode", "code": "R", "display": "restricted" }
            ]
        },
        "name": [{ "use": "official", "family": "Smythe", "given": ["Jayne"] }],
        "gender": "female",
        "birthDate": "1990-01-01"
    })
}
