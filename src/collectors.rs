//! Collector management (`/api/v1/collectors/`).
//!
//! - [`list_collectors`]: one page of collectors.
//! - [`get_collector`]: a single collector by number.
//! - [`create_collector`]: register a new collector.
//! - [`update_collector`]: rename or change deployment type.
//! - [`delete_collector`]: remove a collector.
//!
//! Only stable identifying fields are modelled; unknown fields are ignored.

use serde::{Deserialize, Serialize};

use crate::client::{ApiResponse, ArmisClient, PageParams};
use crate::error::Result;

/// A collector appliance as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collector {
    /// Tenant-unique collector number, used in item paths.
    pub collector_number: i64,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Deployment type, e.g. `"OVA"`.
    #[serde(default)]
    pub deployment_type: Option<String>,
    /// Hardware form, e.g. `"Physical"` or `"Virtual"`.
    #[serde(default, rename = "type")]
    pub collector_type: Option<String>,
    /// Connection state, e.g. `"Active"` or `"Offline"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Management IP address.
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Management interface MAC address.
    #[serde(default)]
    pub mac_address: Option<String>,
    /// Appliance serial number.
    #[serde(default)]
    pub serial_number: Option<String>,
    /// Cluster the collector belongs to, if clustered.
    #[serde(default)]
    pub cluster_id: Option<i64>,
    /// Last boot time (ISO 8601).
    #[serde(default)]
    pub boot_time: Option<String>,
    /// Last check-in time (ISO 8601).
    #[serde(default)]
    pub last_seen: Option<String>,
}

/// One page of collectors.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectorList {
    /// Collectors on this page.
    #[serde(default)]
    pub collectors: Vec<Collector>,
    /// Number of collectors on this page.
    #[serde(default)]
    pub count: Option<u64>,
    /// Offset of the next page, `None` on the last page.
    #[serde(default)]
    pub next: Option<u64>,
    /// Total number of collectors across all pages.
    #[serde(default)]
    pub total: Option<u64>,
}

/// Body for create and update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorSettings {
    /// Display name.
    pub name: String,
    /// Deployment type, e.g. `"OVA"`.
    pub deployment_type: String,
}

/// Returned when a collector is created. Carries the one-time credentials
/// the appliance needs to enroll.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollector {
    /// Number assigned to the new collector.
    pub collector_id: i64,
    /// License key entered on the appliance.
    #[serde(default)]
    pub license_key: Option<String>,
    /// Enrollment user name.
    #[serde(default)]
    pub user: Option<String>,
    /// Enrollment password. Shown only once.
    #[serde(default)]
    pub password: Option<String>,
}

/// Retrieves one page of collectors.
///
/// # Errors
///
/// - `ArmisError::Api`: non-success HTTP status.
/// - `ArmisError::Auth`: token refresh failed.
/// - `ArmisError::Network`: transport-level failure.
pub async fn list_collectors(client: &ArmisClient, page: PageParams) -> Result<CollectorList> {
    let path = client.api_path("collectors/");
    let response: ApiResponse<CollectorList> = client.get_with_query(&path, &page).await?;
    Ok(response.data)
}

/// Retrieves a single collector. A 404 `Api` error means it does not exist.
pub async fn get_collector(client: &ArmisClient, collector_number: i64) -> Result<Collector> {
    let path = client.api_item_path("collectors", &collector_number.to_string())?;
    let response: ApiResponse<Collector> = client.get(&path).await?;
    Ok(response.data)
}

/// Registers a new collector.
pub async fn create_collector(
    client: &ArmisClient,
    settings: &CollectorSettings,
) -> Result<NewCollector> {
    let path = client.api_path("collectors/");
    let response: ApiResponse<NewCollector> = client.post(&path, settings).await?;
    Ok(response.data)
}

/// Replaces a collector's name and deployment type.
pub async fn update_collector(
    client: &ArmisClient,
    collector_number: i64,
    settings: &CollectorSettings,
) -> Result<Collector> {
    let path = client.api_item_path("collectors", &collector_number.to_string())?;
    let response: ApiResponse<Collector> = client.patch(&path, settings).await?;
    Ok(response.data)
}

/// Deletes a collector.
pub async fn delete_collector(client: &ArmisClient, collector_number: i64) -> Result<()> {
    let path = client.api_item_path("collectors", &collector_number.to_string())?;
    client.delete(&path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_deserializes_full_response() {
        let json = r#"{
            "collectorNumber": 1234,
            "name": "hq-collector",
            "deploymentType": "OVA",
            "type": "Physical",
            "status": "Active",
            "ipAddress": "10.0.0.5",
            "macAddress": "00:11:22:33:44:55",
            "serialNumber": "SN-001",
            "clusterId": 7,
            "bootTime": "2026-10-01T08:00:00+00:00",
            "lastSeen": "2026-10-19T08:00:00+00:00"
        }"#;
        let collector: Collector = serde_json::from_str(json).unwrap();
        assert_eq!(collector.collector_number, 1234);
        assert_eq!(collector.name.as_deref(), Some("hq-collector"));
        assert_eq!(collector.collector_type.as_deref(), Some("Physical"));
        assert_eq!(collector.cluster_id, Some(7));
    }

    #[test]
    fn collector_deserializes_minimal_response() {
        let collector: Collector = serde_json::from_str(r#"{"collectorNumber": 1}"#).unwrap();
        assert_eq!(collector.collector_number, 1);
        assert!(collector.name.is_none());
        assert!(collector.status.is_none());
    }

    #[test]
    fn page_params_omit_unset_fields() {
        let encoded = serde_urlencoded::to_string(PageParams::default()).unwrap();
        assert_eq!(encoded, "");

        let page = PageParams {
            from: Some(100),
            length: Some(50),
        };
        assert_eq!(
            serde_urlencoded::to_string(page).unwrap(),
            "from=100&length=50"
        );
    }

    #[test]
    fn settings_serialize_camel_case() {
        let settings = CollectorSettings {
            name: "edge".to_string(),
            deployment_type: "OVA".to_string(),
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["deploymentType"], "OVA");
        assert_eq!(json["name"], "edge");
    }
}
