//! Cascading region → province → city → barangay picker.
//!
//! Each level's options depend on the level above, so lookups run one after
//! another. Regions without provinces (Metro Manila) list their cities
//! directly.

use std::future::Future;
use std::sync::Arc;

use aurelle_core::address::{Location, LocationSelection};
use thiserror::Error;

use crate::backend::ApiError;

/// Source of PSGC location lists.
pub trait LocationDirectory {
    /// Every region.
    fn regions(&self) -> impl Future<Output = Result<Arc<Vec<Location>>, ApiError>> + Send;

    /// Provinces of a region. Empty for regions without provinces.
    fn provinces(
        &self,
        region: &str,
    ) -> impl Future<Output = Result<Arc<Vec<Location>>, ApiError>> + Send;

    /// Cities hanging directly off a region without provinces.
    fn cities_in_region(
        &self,
        region: &str,
    ) -> impl Future<Output = Result<Arc<Vec<Location>>, ApiError>> + Send;

    /// Cities and municipalities of a province.
    fn cities_in_province(
        &self,
        province: &str,
    ) -> impl Future<Output = Result<Arc<Vec<Location>>, ApiError>> + Send;

    /// Barangays of a city or municipality.
    fn barangays(
        &self,
        city: &str,
    ) -> impl Future<Output = Result<Arc<Vec<Location>>, ApiError>> + Send;
}

/// Option lists for every dropdown the current selection unlocks.
#[derive(Debug, Clone, Default)]
pub struct PickerOptions {
    pub regions: Arc<Vec<Location>>,
    pub provinces: Arc<Vec<Location>>,
    pub cities: Arc<Vec<Location>>,
    pub barangays: Arc<Vec<Location>>,
    /// `false` once a region without provinces is selected.
    pub region_has_provinces: bool,
}

/// Why a selection could not be resolved.
#[derive(Debug, Error)]
pub enum PickerError {
    #[error(transparent)]
    Api(#[from] ApiError),
    /// A code does not belong to its parent's list.
    #[error("the selected {0} is not valid")]
    Mismatch(&'static str),
}

/// Load the dropdown options for `selection`, level by level.
///
/// Levels below the first unselected one stay empty.
///
/// # Errors
///
/// Returns the first failing lookup.
pub async fn options_for<D: LocationDirectory + Sync>(
    directory: &D,
    selection: &LocationSelection,
) -> Result<PickerOptions, ApiError> {
    let mut options = PickerOptions {
        regions: directory.regions().await?,
        region_has_provinces: true,
        ..PickerOptions::default()
    };

    let Some(region) = selection.region.as_deref() else {
        return Ok(options);
    };

    options.provinces = directory.provinces(region).await?;
    options.region_has_provinces = !options.provinces.is_empty();
    if options.region_has_provinces {
        if let Some(province) = selection.province.as_deref() {
            options.cities = directory.cities_in_province(province).await?;
        }
    } else {
        options.cities = directory.cities_in_region(region).await?;
    }

    if let Some(city) = selection.city.as_deref()
        && options.cities.iter().any(|c| c.code == city)
    {
        options.barangays = directory.barangays(city).await?;
    }

    Ok(options)
}

/// Check that every selected code belongs to its parent.
///
/// Returns whether the region has provinces, which address validation needs.
///
/// # Errors
///
/// Returns `PickerError::Mismatch` naming the first level that is not a
/// child of the level above.
pub async fn validate<D: LocationDirectory + Sync>(
    directory: &D,
    selection: &LocationSelection,
) -> Result<bool, PickerError> {
    let options = options_for(directory, selection).await?;
    let contains = |list: &[Location], code: Option<&str>| {
        code.is_none_or(|code| list.iter().any(|l| l.code == code))
    };

    if !contains(options.regions.as_slice(), selection.region.as_deref()) {
        return Err(PickerError::Mismatch("region"));
    }
    if options.region_has_provinces
        && !contains(options.provinces.as_slice(), selection.province.as_deref())
    {
        return Err(PickerError::Mismatch("province"));
    }
    if !contains(options.cities.as_slice(), selection.city.as_deref()) {
        return Err(PickerError::Mismatch("city or municipality"));
    }
    if !contains(options.barangays.as_slice(), selection.barangay.as_deref()) {
        return Err(PickerError::Mismatch("barangay"));
    }
    Ok(options.region_has_provinces)
}
