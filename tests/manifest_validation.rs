//! Validation for the endpoint manifest (manifest/endpoints.toml).
//!
//! The manifest lists every Armis endpoint the crate knows about and whether
//! it is implemented. These tests keep it syntactically valid and consistent
//! with the functions the crate actually exports.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Manifest {
    meta: Meta,
    endpoints: Vec<Endpoint>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Meta {
    schema_version: u32,
    last_validated: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Endpoint {
    family: String,
    name: String,
    method: String,
    path: String,
    request_content_type: String,
    response_status: u16,
    implemented: bool,
    #[serde(default)]
    notes: String,
}

fn load_manifest() -> Manifest {
    let content = std::fs::read_to_string("manifest/endpoints.toml")
        .expect("manifest/endpoints.toml should exist and be readable");
    toml::from_str(&content).expect("manifest/endpoints.toml should be valid TOML")
}

#[test]
fn manifest_endpoints_toml_is_valid() {
    let manifest = load_manifest();

    assert!(
        manifest.meta.schema_version >= 1,
        "schema_version must be at least 1"
    );
    assert!(!manifest.endpoints.is_empty());

    for ep in &manifest.endpoints {
        assert!(!ep.family.is_empty(), "endpoint family must not be empty");
        assert!(!ep.name.is_empty(), "endpoint name must not be empty");
        assert!(
            ep.path.starts_with("/api/v1/") && ep.path.ends_with('/'),
            "endpoint '{}' path '{}' must be a versioned path with a trailing slash",
            ep.name,
            ep.path
        );
    }
}

#[test]
fn manifest_endpoint_methods_are_valid_http_verbs() {
    let manifest = load_manifest();

    let valid_methods = ["GET", "POST", "PUT", "PATCH", "DELETE"];
    for ep in &manifest.endpoints {
        assert!(
            valid_methods.contains(&ep.method.as_str()),
            "endpoint '{}' has invalid method '{}', expected one of {:?}",
            ep.name,
            ep.method,
            valid_methods
        );
    }
}

#[test]
fn manifest_marks_exported_operations_implemented() {
    let manifest = load_manifest();

    let implemented: Vec<&str> = manifest
        .endpoints
        .iter()
        .filter(|ep| ep.implemented)
        .map(|ep| ep.name.as_str())
        .collect();

    for expected in [
        "exchange_access_token",
        "list_collectors",
        "get_collector",
        "create_collector",
        "update_collector",
        "delete_collector",
        "list_sites",
        "get_site",
        "create_site",
        "update_site",
        "delete_site",
        "list_users",
        "get_user",
        "create_user",
        "update_user",
        "delete_user",
        "search",
    ] {
        assert!(
            implemented.contains(&expected),
            "endpoint '{expected}' should be marked as implemented"
        );
    }
}

#[test]
fn body_carrying_endpoints_declare_content_type() {
    let manifest = load_manifest();

    for ep in &manifest.endpoints {
        let has_body = matches!(ep.method.as_str(), "POST" | "PUT" | "PATCH");
        assert_eq!(
            has_body,
            !ep.request_content_type.is_empty(),
            "endpoint '{}' content type does not match its method",
            ep.name
        );
    }
}
