//! HTTP route handlers for the listings proxy.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                    - Service info
//! GET  /health              - Health check
//! GET  /api/listings        - Transformed listing search
//! GET  /api/listing-detail  - Single listing (sample record without an id)
//! ```
//!
//! Every API response is HTTP 200 with `success` in the JSON body; the
//! website reads failures from the body because a non-2xx status from the
//! proxy surfaces in the browser as an opaque CORS error.

use axum::extract::{Query, State};
use axum::http::Method;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use stonebridge_core::{ListingRecord, ListingStatus};

use crate::state::AppState;

/// Create the API routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/listings", get(search))
        .route("/api/listing-detail", get(detail))
}

/// Assemble the full service router: API routes, health, service info,
/// browser CORS, and request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .merge(routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn service_info() -> Json<Value> {
    Json(json!({
        "service": "stonebridge-listings",
        "endpoints": ["/api/listings", "/api/listing-detail", "/health"],
    }))
}

/// `GET /api/listings` - the full transformed, filtered, sorted search.
async fn search(State(state): State<AppState>) -> Json<Value> {
    match state.hubspot().search_listings().await {
        Ok(results) => {
            let statuses: Vec<&str> = ListingStatus::INCLUDED
                .iter()
                .map(|status| status.wire_name())
                .collect();
            Json(json!({
                "results": &*results,
                "total": results.len(),
                "success": true,
                "included_statuses": statuses,
            }))
        }
        Err(e) => {
            error!(error = %e, "Listing search failed");
            Json(json!({
                "results": [],
                "total": 0,
                "success": false,
                "error": e.to_string(),
            }))
        }
    }
}

/// Query parameters for the detail endpoint.
#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub id: Option<String>,
}

/// `GET /api/listing-detail` - one listing, or the sample record when no id
/// is given (the website's layout tooling relies on it).
async fn detail(State(state): State<AppState>, Query(query): Query<DetailQuery>) -> Json<Value> {
    let Some(id) = query.id.as_deref().filter(|id| !id.is_empty()) else {
        debug!("No listing id in request; returning the sample listing");
        return Json(json!({
            "success": true,
            "property": sample_listing(),
            "message": "No listing id was provided, so a sample listing is being returned.",
        }));
    };

    match state.hubspot().get_listing(id).await {
        Ok(property) => Json(json!({ "success": true, "property": property })),
        Err(e) => {
            error!(error = %e, id, "Listing detail lookup failed");
            Json(json!({ "success": false, "error": e.to_string() }))
        }
    }
}

/// A stable, display-shaped record for id-less detail requests.
fn sample_listing() -> ListingRecord {
    let pairs = [
        ("hs_object_id", "mock-property"),
        ("name", "Mock Property"),
        ("project", "Sample Project"),
        ("stage", "1"),
        ("dp_lot", "123"),
        ("status", "Available"),
        ("hs_price", "650000"),
        ("hs_bedrooms", "4"),
        ("hs_bathrooms", "2"),
        ("car", "2"),
        ("house_type", "Single Story"),
        ("hs_listing_type", "House & Land Package"),
        ("description", "This is a mock property since no ID was provided."),
        ("title", "Torrens"),
        ("frontage", "15"),
        ("depth", "32"),
        ("aspect", "North"),
        ("hs_lot_size", "450"),
        ("land_type", "Corner"),
        ("registration_date", "2024-06-15"),
        ("storeys", "1"),
        ("hs_neighborhood", "Valley View"),
        ("hs_city", "Springfield"),
    ];
    ListingRecord {
        id: "mock-property".to_owned(),
        properties: pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), Some((*value).to_owned())))
            .collect(),
    }
}
