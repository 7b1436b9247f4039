//! HubSpot CRM client for the listing object type.
//!
//! Uses `reqwest` with bearer-token auth against the CRM v3 objects API.
//! The full search result is cached with `moka` (5-minute TTL) since the
//! website hammers the search endpoint on every filter change while the
//! underlying records change a few times a day.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use stonebridge_core::{ListingRecord, ListingStatus};

use crate::config::ListingsConfig;
use crate::transform;

/// Maximum page size the CRM objects API accepts.
const PAGE_LIMIT: usize = 100;

const SEARCH_CACHE_KEY: &str = "search";
const SEARCH_CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Properties requested for the search view.
pub const SEARCH_PROPERTIES: &[&str] = &[
    // Basic information
    "name",
    "hs_object_id",
    "sb_project",
    "sb_stage",
    "sb_dp_lot",
    "sb_mp_lot",
    "sb_status",
    "hs_price",
    "sb_build_list_price",
    "sb_listed_package_price",
    "sb_land_release_price",
    "sb_land_type",
    "hs_lot_size",
    "sb_total_build_size",
    "hs_bedrooms",
    "hs_bathrooms",
    "sb_car",
    "sb_house_type",
    "sb_facade",
    "sb_title",
    "hs_listing_type",
    "hs_address_1",
    // Location details
    "hs_city",
    "hs_neighborhood",
    // Land-focused properties
    "sb_orientation",
    "sb_setback",
    "sb_frontage",
    "sb_depth",
    "sb_aspect",
    "sb_registration_date",
    "sb_storeys",
    // Timing properties for sorting by newest
    "createdate",
    "hs_lastmodifieddate",
];

/// Properties requested for the detail view: the search set plus long-form
/// content, construction data, and document links.
pub const DETAIL_PROPERTIES: &[&str] = &[
    // Basic information
    "name",
    "hs_object_id",
    "sb_project",
    "sb_stage",
    "sb_dp_lot",
    "sb_mp_lot",
    "sb_status",
    "hs_price",
    "sb_build_list_price",
    "sb_listed_package_price",
    "sb_land_release_price",
    "sb_land_type",
    "hs_lot_size",
    "sb_total_build_size",
    "hs_bedrooms",
    "hs_bathrooms",
    "sb_car",
    "sb_house_type",
    "sb_facade",
    "sb_title",
    "hs_listing_type",
    "sb_listing_type",
    "sb_description",
    "sb_features_list",
    "hs_address_1",
    // Location details
    "hs_city",
    "hs_neighborhood",
    // Land and construction details
    "sb_orientation",
    "sb_setback",
    "sb_frontage",
    "sb_depth",
    "sb_aspect",
    "sb_ceiling_height",
    "sb_construction_type",
    "sb_energy_rating",
    "sb_estimated_completion",
    "sb_settlement_date",
    "sb_land_title_date",
    "sb_registration_date",
    "sb_storeys",
    // Document links
    "sb_brochure_url",
    "sb_masterplan_url",
    "sb_floorplan_url",
    "sb_contract_url",
    "sb_inclusions_url",
    "sb_specifications_url",
];

/// Errors from the CRM client.
#[derive(Debug, Error)]
pub enum HubspotError {
    /// HTTP request failed (connect, timeout, or body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// CRM returned a non-success status.
    #[error("CRM error: {status} - {body}")]
    Api { status: u16, body: String },

    /// CRM response body did not parse.
    #[error("Failed to parse CRM response: {0}")]
    Parse(#[from] serde_json::Error),
}

// Wire shapes for the CRM objects API. Property values arrive as strings
// or null regardless of the property's CRM-side type.

#[derive(Debug, Deserialize)]
struct ObjectPage {
    #[serde(default)]
    results: Vec<RawObject>,
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct RawObject {
    id: String,
    #[serde(default)]
    properties: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    next: Option<PagingNext>,
}

#[derive(Debug, Deserialize)]
struct PagingNext {
    after: String,
}

impl RawObject {
    fn into_record(self) -> ListingRecord {
        ListingRecord {
            id: self.id,
            properties: transform::transform_properties(self.properties),
        }
    }
}

/// Client for the CRM listing objects.
#[derive(Clone)]
pub struct HubspotClient {
    inner: Arc<HubspotClientInner>,
}

struct HubspotClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: secrecy::SecretString,
    object_type: String,
    search_cache: Cache<String, Arc<Vec<ListingRecord>>>,
}

impl HubspotClient {
    /// Create a new CRM client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ListingsConfig) -> Result<Self, HubspotError> {
        let client = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .build()?;

        let search_cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(SEARCH_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(HubspotClientInner {
                client,
                base_url: config.api_base.clone(),
                api_key: config.api_key.clone(),
                object_type: config.object_type.clone(),
                search_cache,
            }),
        })
    }

    /// Fetch every displayable listing, transformed, filtered, and sorted.
    ///
    /// Pages the objects endpoint 100 records at a time until the cursor is
    /// exhausted, then applies the display pipeline. The finished result is
    /// cached; callers share one `Arc`.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails or does not parse.
    pub async fn search_listings(&self) -> Result<Arc<Vec<ListingRecord>>, HubspotError> {
        if let Some(cached) = self.inner.search_cache.get(SEARCH_CACHE_KEY).await {
            debug!("Cache hit for listing search");
            return Ok(cached);
        }

        let properties = SEARCH_PROPERTIES.join(",");
        let filter_groups = status_filter_groups();
        let mut records: Vec<ListingRecord> = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/crm/v3/objects/{}?limit={PAGE_LIMIT}&properties={properties}&filterGroups={filter_groups}",
                self.inner.base_url, self.inner.object_type
            );
            if let Some(cursor) = &after {
                url.push_str("&after=");
                url.push_str(cursor);
            }

            let page: ObjectPage = self.get_json(&url).await?;
            debug!(count = page.results.len(), "Retrieved listings page");
            if page.results.is_empty() {
                break;
            }
            records.extend(page.results.into_iter().map(RawObject::into_record));

            match page.paging.and_then(|paging| paging.next) {
                Some(next) => after = Some(next.after),
                None => break,
            }
        }

        let fetched = records.len();
        transform::retain_included(&mut records);
        if records.len() < fetched {
            debug!(
                dropped = fetched - records.len(),
                "Dropped listings outside the status allow-list"
            );
        }
        transform::sort_listings(&mut records);

        let results = Arc::new(records);
        self.inner
            .search_cache
            .insert(SEARCH_CACHE_KEY.to_owned(), Arc::clone(&results))
            .await;
        info!(total = results.len(), "Listing search refreshed");
        Ok(results)
    }

    /// Fetch a single listing with the detail property set.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the listing does not exist,
    /// or the response does not parse.
    pub async fn get_listing(&self, id: &str) -> Result<ListingRecord, HubspotError> {
        let url = format!(
            "{}/crm/v3/objects/{}/{}?properties={}",
            self.inner.base_url,
            self.inner.object_type,
            urlencoding::encode(id),
            DETAIL_PROPERTIES.join(",")
        );

        let raw: RawObject = self.get_json(&url).await?;
        Ok(raw.into_record())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HubspotError> {
        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(self.inner.api_key.expose_secret())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "CRM returned non-success status"
            );
            return Err(HubspotError::Api {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse CRM response"
            );
            HubspotError::Parse(e)
        })
    }
}

/// The URL-encoded `filterGroups` query value restricting the search to the
/// displayable statuses.
fn status_filter_groups() -> String {
    let values: Vec<&str> = ListingStatus::INCLUDED
        .iter()
        .map(|status| status.wire_name())
        .collect();
    let groups = json!([
        {
            "filters": [
                {
                    "propertyName": "sb_status",
                    "operator": "IN",
                    "values": values,
                }
            ]
        }
    ]);
    urlencoding::encode(&groups.to_string()).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_groups_encode_every_included_status() {
        let encoded = status_filter_groups();
        let decoded = urlencoding::decode(&encoded).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&decoded).unwrap();

        let filter = &parsed[0]["filters"][0];
        assert_eq!(filter["propertyName"], "sb_status");
        assert_eq!(filter["operator"], "IN");
        let values = filter["values"].as_array().unwrap();
        assert_eq!(values.len(), 4);
        assert!(values.iter().any(|v| v == "sb_under_offer"));
    }

    #[test]
    fn test_detail_properties_extend_the_search_set() {
        for key in ["sb_description", "sb_brochure_url", "sb_settlement_date"] {
            assert!(DETAIL_PROPERTIES.contains(&key), "{key}");
            assert!(!SEARCH_PROPERTIES.contains(&key), "{key}");
        }
        // Shared basics appear in both.
        for key in ["name", "sb_status", "hs_price", "sb_frontage"] {
            assert!(SEARCH_PROPERTIES.contains(&key), "{key}");
            assert!(DETAIL_PROPERTIES.contains(&key), "{key}");
        }
    }

    #[test]
    fn test_raw_object_transforms_on_conversion() {
        let raw: RawObject = serde_json::from_value(serde_json::json!({
            "id": "101",
            "properties": {
                "name": "Botanica Lot 12",
                "sb_status": "sb_available",
                "sb_frontage": "15",
                "sb_aspect": null,
            }
        }))
        .unwrap();

        let record = raw.into_record();
        assert_eq!(record.id, "101");
        assert_eq!(record.status(), Some("Sb Available"));
        assert_eq!(record.property("frontage"), Some("15"));
        assert_eq!(record.property("aspect"), None);
        assert_eq!(record.property("name"), Some("Botanica Lot 12"));
    }

    #[test]
    fn test_page_parses_without_paging() {
        let page: ObjectPage = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(page.results.is_empty());
        assert!(page.paging.is_none());
    }
}
