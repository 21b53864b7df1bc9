//! FHIR-aligned read model for the PDS `Patient` resource.
//!
//! PDS responses carry many optional nested structures, and the registry adds fields over
//! time. Rather than a strict wire struct (which would reject unknown keys, or fail a whole
//! lookup because one optional field had an unexpected shape), the document is held as generic
//! JSON and read through explicit accessors.
//!
//! Accessor rules:
//! - a missing field and a field of the wrong JSON type are both reported as absent
//! - list accessors skip entries that are not JSON objects
//! - nothing is read until an accessor is called, so callers control extraction order

use crate::{FhirError, FhirResult};
use serde_json::{Map, Value};

/// The only `resourceType` a PDS patient read may return.
pub const PATIENT_RESOURCE_TYPE: &str = "Patient";

// ============================================================================
// Public domain-level types
// ============================================================================

/// Purpose of a human name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameUse {
    /// Official name.
    Official,
    /// Usual/preferred name.
    Usual,
    /// Temporary name.
    Temp,
    /// Nickname or informal name.
    Nickname,
    /// Anonymous name.
    Anonymous,
    /// Old name (no longer in use).
    Old,
    /// Maiden name.
    Maiden,
}

impl NameUse {
    /// Parse from FHIR wire format string.
    fn from_wire(s: &str) -> Option<Self> {
        match s {
            "official" => Some(NameUse::Official),
            "usual" => Some(NameUse::Usual),
            "temp" => Some(NameUse::Temp),
            "nickname" => Some(NameUse::Nickname),
            "anonymous" => Some(NameUse::Anonymous),
            "old" => Some(NameUse::Old),
            "maiden" => Some(NameUse::Maiden),
            _ => None,
        }
    }
}

/// Purpose of an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressUse {
    Home,
    Work,
    Temp,
    Old,
    Billing,
}

impl AddressUse {
    fn from_wire(s: &str) -> Option<Self> {
        match s {
            "home" => Some(AddressUse::Home),
            "work" => Some(AddressUse::Work),
            "temp" => Some(AddressUse::Temp),
            "old" => Some(AddressUse::Old),
            "billing" => Some(AddressUse::Billing),
            _ => None,
        }
    }
}

/// Borrowed view of one `name[]` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HumanName<'a> {
    pub use_type: Option<NameUse>,
    pub family: Option<&'a str>,
    /// Given names in order (first name, then middle names).
    pub given: Vec<&'a str>,
}

/// Borrowed view of one `address[]` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address<'a> {
    pub use_type: Option<AddressUse>,
    /// Street lines in order.
    pub lines: Vec<&'a str>,
    pub city: Option<&'a str>,
    pub postal_code: Option<&'a str>,
}

/// Borrowed view of one `generalPractitioner[]` reference.
///
/// PDS references the registered GP practice by its ODS organisation code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PractitionerReference<'a> {
    /// `identifier.value`, the ODS code.
    pub identifier_value: Option<&'a str>,
    /// `display`, the practice name.
    pub display: Option<&'a str>,
}

// ============================================================================
// Public Patient document
// ============================================================================

/// A raw PDS `Patient` resource with typed, optional-field accessors.
#[derive(Clone, Debug, PartialEq)]
pub struct PatientDocument {
    root: Map<String, Value>,
}

impl PatientDocument {
    /// Parse a patient resource from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the text is not valid JSON,
    /// - the top-level value is not a JSON object,
    /// - `resourceType` is present and is not `"Patient"`.
    pub fn parse(json_text: &str) -> FhirResult<Self> {
        let value: Value = serde_json::from_str(json_text)?;
        Self::from_value(value)
    }

    /// Wrap an already-decoded JSON value.
    ///
    /// # Errors
    ///
    /// Same structural checks as [`PatientDocument::parse`].
    pub fn from_value(value: Value) -> FhirResult<Self> {
        let Value::Object(root) = value else {
            return Err(FhirError::InvalidInput(
                "Patient resource must be a JSON object".into(),
            ));
        };

        match root.get("resourceType") {
            None => {}
            Some(Value::String(rt)) if rt == PATIENT_RESOURCE_TYPE => {}
            Some(other) => {
                return Err(FhirError::InvalidInput(format!(
                    "Expected resourceType 'Patient', got {other}"
                )));
            }
        }

        Ok(Self { root })
    }

    /// Logical id of the resource (PDS uses the NHS number).
    pub fn id(&self) -> Option<&str> {
        str_field(&self.root, "id")
    }

    /// Codes from `meta.security[]`, in document order.
    pub fn security_codes(&self) -> impl Iterator<Item = &str> + '_ {
        let meta = self.root.get("meta").and_then(Value::as_object);
        meta.map(|m| objects(m, "security"))
            .into_iter()
            .flatten()
            .filter_map(|label| str_field(label, "code"))
    }

    /// Returns `true` if any security label carries `code`.
    ///
    /// Only `meta.security` is read.
    pub fn has_security_code(&self, code: &str) -> bool {
        self.security_codes().any(|c| c == code)
    }

    /// All `name[]` entries.
    pub fn names(&self) -> impl Iterator<Item = HumanName<'_>> + '_ {
        objects(&self.root, "name").map(|entry| HumanName {
            use_type: str_field(entry, "use").and_then(NameUse::from_wire),
            family: str_field(entry, "family"),
            given: strings(entry, "given"),
        })
    }

    /// The `official` name if there is one, otherwise the first name.
    pub fn preferred_name(&self) -> Option<HumanName<'_>> {
        self.names()
            .find(|n| n.use_type == Some(NameUse::Official))
            .or_else(|| self.names().next())
    }

    /// `birthDate` as written by the registry (normally `YYYY-MM-DD`).
    pub fn birth_date(&self) -> Option<&str> {
        str_field(&self.root, "birthDate")
    }

    /// Administrative gender as written by the registry (`male`, `female`, ...).
    pub fn gender(&self) -> Option<&str> {
        str_field(&self.root, "gender")
    }

    /// All `address[]` entries.
    pub fn addresses(&self) -> impl Iterator<Item = Address<'_>> + '_ {
        objects(&self.root, "address").map(|entry| Address {
            use_type: str_field(entry, "use").and_then(AddressUse::from_wire),
            lines: strings(entry, "line"),
            city: str_field(entry, "city"),
            postal_code: str_field(entry, "postalCode"),
        })
    }

    /// The `home` address if there is one, otherwise the first address.
    pub fn preferred_address(&self) -> Option<Address<'_>> {
        self.addresses()
            .find(|a| a.use_type == Some(AddressUse::Home))
            .or_else(|| self.addresses().next())
    }

    /// All `generalPractitioner[]` references.
    pub fn general_practitioners(&self) -> impl Iterator<Item = PractitionerReference<'_>> + '_ {
        objects(&self.root, "generalPractitioner").map(|entry| PractitionerReference {
            identifier_value: entry
                .get("identifier")
                .and_then(Value::as_object)
                .and_then(|identifier| str_field(identifier, "value")),
            display: str_field(entry, "display"),
        })
    }

    pub fn deceased_boolean(&self) -> Option<bool> {
        self.root.get("deceasedBoolean").and_then(Value::as_bool)
    }

    pub fn deceased_date_time(&self) -> Option<&str> {
        str_field(&self.root, "deceasedDateTime")
    }

    /// `true` when `deceasedDateTime` is present with any non-null value.
    pub fn has_deceased_date_time(&self) -> bool {
        self.root
            .get("deceasedDateTime")
            .is_some_and(|v| !v.is_null())
    }
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn str_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

/// Object entries of an array field; missing or non-array fields yield nothing.
fn objects<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> + 'a {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.as_slice())
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_object)
}

/// String entries of an array field, in order.
fn strings<'a>(object: &'a Map<String, Value>, key: &str) -> Vec<&'a str> {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> PatientDocument {
        PatientDocument::from_value(json!({
            "resourceType": "Patient",
            "id": "9000000009",
            "meta": {
                "versionId": "2",
                "security": [
                    { "system": "http://terminology.hl7.org/CodeSystem/v3-Confidentiality", "code": "U", "display": "unrestricted" }
                ]
            },
            "name": [
                { "use": "usual", "family": "Smith", "given": ["Janey"] },
                { "use": "official", "family": "Smith", "given": ["Jane", "Marie"], "prefix": ["Mrs"] }
            ],
            "gender": "female",
            "birthDate": "2010-10-22",
            "address": [
                { "use": "temp", "line": ["Temp House"], "postalCode": "TE1 1MP" },
                { "use": "home", "line": ["1 Trevelyan Square", "Boar Lane"], "city": "Leeds", "postalCode": "LS1 6AE" }
            ],
            "generalPractitioner": [
                { "type": "Organization", "identifier": { "system": "https://fhir.nhs.uk/Id/ods-organization-code", "value": "Y12345" }, "display": "Leeds Medical Practice" }
            ]
        }))
        .expect("valid patient")
    }

    #[test]
    fn parses_text_and_reads_id() {
        let doc = PatientDocument::parse(r#"{"resourceType":"Patient","id":"9000000009"}"#)
            .expect("should parse");
        assert_eq!(doc.id(), Some("9000000009"));
    }

    #[test]
    fn accepts_missing_resource_type() {
        let doc = PatientDocument::from_value(json!({ "gender": "male" })).expect("should parse");
        assert_eq!(doc.gender(), Some("male"));
    }

    #[test]
    fn rejects_invalid_resource_type() {
        let err = PatientDocument::from_value(json!({ "resourceType": "OperationOutcome" }))
            .expect_err("should reject");
        match err {
            FhirError::InvalidInput(msg) => assert!(msg.contains("OperationOutcome")),
            other => panic!("expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(matches!(
            PatientDocument::from_value(json!(["Patient"])),
            Err(FhirError::InvalidInput(_))
        ));
        assert!(matches!(
            PatientDocument::parse("not json"),
            Err(FhirError::InvalidJson(_))
        ));
    }

    #[test]
    fn reads_security_codes() {
        let doc = sample();
        assert_eq!(doc.security_codes().collect::<Vec<_>>(), vec!["U"]);
        assert!(!doc.has_security_code("R"));
        assert!(doc.has_security_code("U"));
    }

    #[test]
    fn security_codes_tolerate_missing_meta() {
        let doc = PatientDocument::from_value(json!({ "meta": { "versionId": "1" } })).unwrap();
        assert_eq!(doc.security_codes().count(), 0);
        let doc = PatientDocument::from_value(json!({ "meta": { "security": "R" } })).unwrap();
        assert_eq!(doc.security_codes().count(), 0);
    }

    #[test]
    fn preferred_name_is_official() {
        let doc = sample();
        let name = doc.preferred_name().expect("has name");
        assert_eq!(name.use_type, Some(NameUse::Official));
        assert_eq!(name.given, vec!["Jane", "Marie"]);
        assert_eq!(name.family, Some("Smith"));
    }

    #[test]
    fn preferred_name_falls_back_to_first() {
        let doc = PatientDocument::from_value(json!({
            "name": [
                { "use": "nickname", "given": ["Sally"] },
                { "use": "maiden", "family": "Jones" }
            ]
        }))
        .unwrap();
        let name = doc.preferred_name().expect("has name");
        assert_eq!(name.use_type, Some(NameUse::Nickname));
        assert_eq!(name.given, vec!["Sally"]);
        assert_eq!(name.family, None);
    }

    #[test]
    fn preferred_address_is_home() {
        let doc = sample();
        let address = doc.preferred_address().expect("has address");
        assert_eq!(address.use_type, Some(AddressUse::Home));
        assert_eq!(address.lines, vec!["1 Trevelyan Square", "Boar Lane"]);
        assert_eq!(address.city, Some("Leeds"));
        assert_eq!(address.postal_code, Some("LS1 6AE"));
    }

    #[test]
    fn reads_general_practitioner() {
        let doc = sample();
        let gp = doc
            .general_practitioners()
            .next()
            .expect("has GP reference");
        assert_eq!(gp.identifier_value, Some("Y12345"));
        assert_eq!(gp.display, Some("Leeds Medical Practice"));
    }

    #[test]
    fn wrong_types_are_reported_as_absent() {
        let doc = PatientDocument::from_value(json!({
            "name": [{ "given": "Jane", "family": 7 }, "not-an-object"],
            "birthDate": 19900101,
            "deceasedBoolean": "yes",
            "generalPractitioner": [{ "identifier": "Y12345" }]
        }))
        .unwrap();

        let name = doc.preferred_name().expect("object entry is kept");
        assert!(name.given.is_empty());
        assert_eq!(name.family, None);
        assert_eq!(doc.names().count(), 1);
        assert_eq!(doc.birth_date(), None);
        assert_eq!(doc.deceased_boolean(), None);
        let gp = doc.general_practitioners().next().unwrap();
        assert_eq!(gp.identifier_value, None);
    }

    #[test]
    fn reads_deceased_fields() {
        let doc = PatientDocument::from_value(json!({
            "deceasedBoolean": false,
            "deceasedDateTime": "2010-10-22T00:00:00+00:00"
        }))
        .unwrap();
        assert_eq!(doc.deceased_boolean(), Some(false));
        assert_eq!(doc.deceased_date_time(), Some("2010-10-22T00:00:00+00:00"));
        assert!(doc.has_deceased_date_time());
    }

    #[test]
    fn deceased_date_time_presence_ignores_type_but_not_null() {
        let odd = PatientDocument::from_value(json!({ "deceasedDateTime": 20101022 })).unwrap();
        assert_eq!(odd.deceased_date_time(), None);
        assert!(odd.has_deceased_date_time());

        let null = PatientDocument::from_value(json!({ "deceasedDateTime": null })).unwrap();
        assert!(!null.has_deceased_date_time());

        let absent = PatientDocument::from_value(json!({})).unwrap();
        assert!(!absent.has_deceased_date_time());
    }
}
