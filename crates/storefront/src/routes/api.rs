//! JSON endpoints used by `app.js`.
//!
//! Errors come back as `{"error": "..."}` with a matching status code so the
//! script can show a toast instead of following a redirect.

use aurelle_core::address::{Location, LocationLevel};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{instrument, warn};

use super::cart::CartSummary;
use crate::backend::ApiError;
use crate::middleware::OptionalAuth;
use crate::services::CartService;
use crate::services::address_picker::LocationDirectory;
use crate::state::AppState;

/// Error body for JSON clients.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Location lookup parameters.
#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    /// Code of the parent location.
    pub parent: Option<String>,
    /// Level of the parent, for cities: `regions` (no provinces) or
    /// `provinces` (the default).
    pub parent_level: Option<String>,
}

/// The directory call a location request maps to.
#[derive(Debug, PartialEq, Eq)]
enum LocationLookup<'a> {
    Regions,
    Provinces(&'a str),
    CitiesInRegion(&'a str),
    CitiesInProvince(&'a str),
    Barangays(&'a str),
}

impl<'a> LocationLookup<'a> {
    fn resolve(level: LocationLevel, query: &'a LocationQuery) -> Result<Self, &'static str> {
        if level == LocationLevel::Region {
            return Ok(Self::Regions);
        }
        let parent = query
            .parent
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or("parent is required")?;
        Ok(match level {
            LocationLevel::Region => Self::Regions,
            LocationLevel::Province => Self::Provinces(parent),
            LocationLevel::City => match query.parent_level.as_deref() {
                Some("regions") => Self::CitiesInRegion(parent),
                _ => Self::CitiesInProvince(parent),
            },
            LocationLevel::Barangay => Self::Barangays(parent),
        })
    }

    async fn fetch<D: LocationDirectory + Sync>(
        &self,
        directory: &D,
    ) -> Result<std::sync::Arc<Vec<Location>>, ApiError> {
        match *self {
            Self::Regions => directory.regions().await,
            Self::Provinces(region) => directory.provinces(region).await,
            Self::CitiesInRegion(region) => directory.cities_in_region(region).await,
            Self::CitiesInProvince(province) => directory.cities_in_province(province).await,
            Self::Barangays(city) => directory.barangays(city).await,
        }
    }
}

/// Options for one level of the address picker.
#[instrument(skip(state))]
pub async fn locations(
    State(state): State<AppState>,
    Path(level): Path<String>,
    Query(query): Query<LocationQuery>,
) -> Response {
    let Ok(level) = level.parse::<LocationLevel>() else {
        return json_error(StatusCode::NOT_FOUND, "unknown location level");
    };
    let lookup = match LocationLookup::resolve(level, &query) {
        Ok(lookup) => lookup,
        Err(message) => return json_error(StatusCode::BAD_REQUEST, message),
    };

    match lookup.fetch(state.backend()).await {
        Ok(locations) => Json(locations.as_ref().clone()).into_response(),
        Err(ApiError::NotFound(_)) => Json(Vec::<Location>::new()).into_response(),
        Err(e) => {
            warn!(error = %e, "Location lookup failed");
            json_error(StatusCode::BAD_GATEWAY, "locations are unavailable right now")
        }
    }
}

/// Item count and subtotal for the header badge.
///
/// Reads the session copy only, so it answers even while the backend is down.
#[instrument(skip(state, session, auth))]
pub async fn cart_summary(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
) -> Response {
    match CartService::new(state.backend(), &session, auth.0.as_ref())
        .local()
        .await
    {
        Ok(cart) => Json(CartSummary::new(&cart, None)).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to read cart from session");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "cart is unavailable")
        }
    }
}
