//! PDS sandbox helpers.
//!
//! The sandbox serves a fixed set of test patients without authentication. These helpers are
//! intended for demos and manual testing; production callers should build a [`PdsClient`] with
//! their own configuration.

use crate::demographics::PatientDemographics;
use crate::transport::ReqwestTransport;
use crate::{PdsClient, PdsResult};

/// Known sandbox NHS numbers and what each one exercises.
pub const SANDBOX_TEST_PATIENTS: &[(&str, &str)] = &[
    ("9000000009", "Jane Smith - Standard test patient"),
    ("9000000017", "Jayne Smythe - Restricted record"),
    ("9000000025", "John Smith - Deceased notification"),
];

/// Description of a sandbox test patient, if `nhs_number` is one.
pub fn sandbox_patient_description(nhs_number: &str) -> Option<&'static str> {
    let canonical: String = nhs_number.chars().filter(|c| !c.is_whitespace()).collect();
    SANDBOX_TEST_PATIENTS
        .iter()
        .find(|(number, _)| *number == canonical)
        .map(|(_, description)| *description)
}

fn sandbox_client() -> PdsClient<ReqwestTransport> {
    PdsClient::with_config(crate::PdsConfig::sandbox(), ReqwestTransport::new())
}

/// Look up `nhs_number` in the sandbox.
pub async fn lookup_sandbox_patient(nhs_number: &str) -> PdsResult<PatientDemographics> {
    sandbox_client().lookup_patient(nhs_number).await
}

/// Blocking variant of [`lookup_sandbox_patient`].
///
/// Must not be called from inside an async runtime.
pub fn lookup_sandbox_patient_blocking(nhs_number: &str) -> PdsResult<PatientDemographics> {
    sandbox_client().lookup_patient_blocking(nhs_number)
}
