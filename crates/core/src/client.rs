//! PDS lookup client.
//!
//! One algorithm, two calling conventions:
//! 1. normalise and validate the NHS number (no request is made for an invalid number)
//! 2. build the request: URL, `Accept`, a fresh `X-Request-ID`, and `Authorization` when a
//!    token is configured
//! 3. hand the request to the transport
//! 4. map non-2xx statuses to [`PdsError::Transport`]
//! 5. parse the body and normalise it
//!
//! Steps 1-2 and 4-5 are shared. [`PdsClient::lookup_patient_blocking`] and
//! [`PdsClient::lookup_patient`] differ only in how step 3 waits.

use crate::config::{Environment, PdsConfig};
use crate::constants::{
    ACCEPT_HEADER, AUTHORIZATION_HEADER, DEFAULT_TIMEOUT_SECS, FHIR_JSON_MEDIA_TYPE,
    REQUEST_ID_HEADER,
};
use crate::demographics::{normalise_patient, PatientDemographics};
use crate::transport::{AsyncTransport, BlockingTransport, TransportRequest, TransportResponse};
use crate::{PdsError, PdsResult};
use fhir::PatientDocument;
use pds_types::{NhsNumber, NonEmptyText};
use std::time::Duration;
use uuid::Uuid;

/// Client for the PDS FHIR `Patient` read.
///
/// Immutable once constructed and holds no per-call state, so one instance can serve any number
/// of concurrent lookups (wrap it in an `Arc` to share across tasks).
#[derive(Clone, Debug)]
pub struct PdsClient<T> {
    config: PdsConfig,
    transport: T,
}

/// A validated NHS number and the request that will fetch it.
struct PreparedLookup {
    nhs_number: NhsNumber,
    request_id: String,
    request: TransportRequest,
}

impl<T> PdsClient<T> {
    /// Create a client for `environment` with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`PdsError::Configuration`] if `environment` requires a token and `access_token`
    /// is absent or blank.
    pub fn new(
        environment: Environment,
        access_token: Option<&str>,
        transport: T,
    ) -> PdsResult<Self> {
        let config = PdsConfig::new(
            environment,
            NonEmptyText::from_optional(access_token),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )?;
        Ok(Self::with_config(config, transport))
    }

    /// Create a client from an already validated configuration.
    pub fn with_config(config: PdsConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &PdsConfig {
        &self.config
    }

    pub fn environment(&self) -> Environment {
        self.config.environment()
    }

    fn prepare(&self, input: &str) -> PdsResult<PreparedLookup> {
        let nhs_number = NhsNumber::parse(input).map_err(|reason| PdsError::InvalidNhsNumber {
            input: input.chars().filter(|c| !c.is_whitespace()).collect(),
            reason,
        })?;

        let request_id = Uuid::new_v4().to_string();

        let mut headers = vec![
            (ACCEPT_HEADER, FHIR_JSON_MEDIA_TYPE.to_string()),
            (REQUEST_ID_HEADER, request_id.clone()),
        ];
        if let Some(token) = self.config.access_token() {
            headers.push((AUTHORIZATION_HEADER, format!("Bearer {token}")));
        }

        let request = TransportRequest {
            url: self.config.patient_url(&nhs_number),
            headers,
            timeout: self.config.timeout(),
        };

        tracing::debug!(
            nhs_number = %nhs_number,
            environment = %self.config.environment(),
            request_id = %request_id,
            "PDS patient lookup"
        );

        Ok(PreparedLookup {
            nhs_number,
            request_id,
            request,
        })
    }

    fn complete(
        &self,
        lookup: PreparedLookup,
        outcome: PdsResult<TransportResponse>,
    ) -> PdsResult<PatientDemographics> {
        let PreparedLookup {
            nhs_number,
            request_id,
            ..
        } = lookup;

        let response = outcome.inspect_err(|e| {
            tracing::warn!(request_id = %request_id, "PDS request did not complete: {e}");
        })?;

        if !response.is_success() {
            tracing::warn!(
                request_id = %request_id,
                status = response.status,
                "PDS returned non-success status"
            );
            return Err(PdsError::Transport {
                status: response.status,
                body: response.body,
            });
        }

        let document = PatientDocument::parse(&response.body)?;

        match normalise_patient(&nhs_number, &document) {
            Ok(record) => {
                tracing::info!(request_id = %request_id, "PDS patient lookup succeeded");
                Ok(record)
            }
            Err(err @ PdsError::Restricted(_)) => {
                tracing::warn!(
                    nhs_number = %nhs_number,
                    request_id = %request_id,
                    "restricted patient record; access denied"
                );
                Err(err)
            }
            Err(err) => Err(err),
        }
    }
}

impl<T: BlockingTransport> PdsClient<T> {
    /// Look up a patient, blocking the calling thread for the duration of the request.
    ///
    /// # Errors
    ///
    /// - [`PdsError::InvalidNhsNumber`]: bad format or check digit; no request is made
    /// - [`PdsError::Transport`]: PDS answered with a non-2xx status
    /// - [`PdsError::Connection`]: no HTTP response was obtained
    /// - [`PdsError::ResponseParsing`]: the body was not a `Patient` JSON document
    /// - [`PdsError::Restricted`]: the record is restricted; no demographics are returned
    pub fn lookup_patient_blocking(&self, nhs_number: &str) -> PdsResult<PatientDemographics> {
        let lookup = self.prepare(nhs_number)?;
        let outcome = self.transport.get(&lookup.request);
        self.complete(lookup, outcome)
    }
}

impl<T: AsyncTransport> PdsClient<T> {
    /// Look up a patient, yielding to the caller's runtime while the request is in flight.
    ///
    /// Dropping the returned future before it completes aborts the request; normalisation only
    /// starts once the full body has arrived.
    ///
    /// # Errors
    ///
    /// Same as [`PdsClient::lookup_patient_blocking`].
    pub async fn lookup_patient(&self, nhs_number: &str) -> PdsResult<PatientDemographics> {
        let lookup = self.prepare(nhs_number)?;
        let outcome = self.transport.get(&lookup.request).await;
        self.complete(lookup, outcome)
    }
}
