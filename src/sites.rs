//! Site management (`/api/v1/sites/`).
//!
//! Sites group devices by physical location. The endpoints here mirror the
//! collectors family: list, get, create, update and delete.

use serde::{Deserialize, Serialize};

use crate::client::{ApiResponse, ArmisClient, PageParams};
use crate::error::Result;

/// A site as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Site ID, used in item paths.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form address or description of the location.
    #[serde(default)]
    pub location: Option<String>,
    /// Latitude in decimal degrees.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude in decimal degrees.
    #[serde(default)]
    pub lng: Option<f64>,
    /// Business tier label.
    #[serde(default)]
    pub tier: Option<String>,
    /// ID of the enclosing site, if nested.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Device IDs of the network equipment that defines the site.
    #[serde(default)]
    pub network_equipment_device_ids: Vec<i64>,
}

/// One page of sites.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteList {
    /// Sites on this page.
    #[serde(default)]
    pub sites: Vec<Site>,
    /// Number of sites on this page.
    #[serde(default)]
    pub count: Option<u64>,
    /// Offset of the next page, `None` on the last page.
    #[serde(default)]
    pub next: Option<u64>,
    /// Total number of sites across all pages.
    #[serde(default)]
    pub total: Option<u64>,
}

/// Body for create and update. Unset optional fields are omitted so that an
/// update leaves them unchanged.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    /// Display name.
    pub name: String,
    /// Free-form address or description of the location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Latitude in decimal degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude in decimal degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    /// Business tier label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    /// ID of the enclosing site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Retrieves one page of sites.
pub async fn list_sites(client: &ArmisClient, page: PageParams) -> Result<SiteList> {
    let path = client.api_path("sites/");
    let response: ApiResponse<SiteList> = client.get_with_query(&path, &page).await?;
    Ok(response.data)
}

/// Retrieves a single site by ID.
pub async fn get_site(client: &ArmisClient, site_id: &str) -> Result<Site> {
    let path = client.api_item_path("sites", site_id)?;
    let response: ApiResponse<Site> = client.get(&path).await?;
    Ok(response.data)
}

/// Creates a site and returns it with its assigned ID.
pub async fn create_site(client: &ArmisClient, settings: &SiteSettings) -> Result<Site> {
    let path = client.api_path("sites/");
    let response: ApiResponse<Site> = client.post(&path, settings).await?;
    Ok(response.data)
}

/// Updates a site's properties.
pub async fn update_site(
    client: &ArmisClient,
    site_id: &str,
    settings: &SiteSettings,
) -> Result<Site> {
    let path = client.api_item_path("sites", site_id)?;
    let response: ApiResponse<Site> = client.patch(&path, settings).await?;
    Ok(response.data)
}

/// Deletes a site.
pub async fn delete_site(client: &ArmisClient, site_id: &str) -> Result<()> {
    let path = client.api_item_path("sites", site_id)?;
    client.delete(&path).await
}
