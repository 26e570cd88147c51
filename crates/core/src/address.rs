//! Philippine shipping addresses and the cascading location picker.
//!
//! Locations follow the PSGC hierarchy: region → province → city or
//! municipality → barangay. Some regions (Metro Manila) have no provinces;
//! their cities hang directly off the region.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::AddressId;

/// A PSGC location (region, province, city or barangay).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub code: String,
    pub name: String,
}

/// A level of the location hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationLevel {
    Region,
    Province,
    City,
    Barangay,
}

impl LocationLevel {
    /// Path segment and query value for this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Region => "regions",
            Self::Province => "provinces",
            Self::City => "cities",
            Self::Barangay => "barangays",
        }
    }
}

impl std::str::FromStr for LocationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regions" => Ok(Self::Region),
            "provinces" => Ok(Self::Province),
            "cities" => Ok(Self::City),
            "barangays" => Ok(Self::Barangay),
            _ => Err(format!("invalid location level: {s}")),
        }
    }
}

/// The picker's current selection, as PSGC codes.
///
/// Changing a level clears every level below it, so the selection is always
/// a prefix of the hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSelection {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub barangay: Option<String>,
}

impl LocationSelection {
    /// Build a selection from raw form values, dropping empty strings and
    /// anything below the first gap.
    #[must_use]
    pub fn from_form(
        region: Option<&str>,
        province: Option<&str>,
        city: Option<&str>,
        barangay: Option<&str>,
    ) -> Self {
        let clean = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };
        let mut selection = Self::default();
        if let Some(region) = clean(region) {
            selection.select_region(region);
            if let Some(province) = clean(province) {
                selection.select_province(province);
            }
            if let Some(city) = clean(city) {
                selection.select_city(city);
                if let Some(barangay) = clean(barangay) {
                    selection.select_barangay(barangay);
                }
            }
        }
        selection
    }

    /// Select a region. Returns `true` if the selection changed.
    pub fn select_region(&mut self, code: String) -> bool {
        if self.region.as_deref() == Some(code.as_str()) {
            return false;
        }
        self.region = Some(code);
        self.province = None;
        self.city = None;
        self.barangay = None;
        true
    }

    /// Select a province. Ignored until a region is chosen.
    pub fn select_province(&mut self, code: String) -> bool {
        if self.region.is_none() || self.province.as_deref() == Some(code.as_str()) {
            return false;
        }
        self.province = Some(code);
        self.city = None;
        self.barangay = None;
        true
    }

    /// Select a city or municipality. Ignored until a region is chosen.
    pub fn select_city(&mut self, code: String) -> bool {
        if self.region.is_none() || self.city.as_deref() == Some(code.as_str()) {
            return false;
        }
        self.city = Some(code);
        self.barangay = None;
        true
    }

    /// Select a barangay. Ignored until a city is chosen.
    pub fn select_barangay(&mut self, code: String) -> bool {
        if self.city.is_none() || self.barangay.as_deref() == Some(code.as_str()) {
            return false;
        }
        self.barangay = Some(code);
        true
    }

    /// The next dropdown the customer has to fill, or `None` when complete.
    #[must_use]
    pub const fn next_level(&self, region_has_provinces: bool) -> Option<LocationLevel> {
        if self.region.is_none() {
            Some(LocationLevel::Region)
        } else if region_has_provinces && self.province.is_none() {
            Some(LocationLevel::Province)
        } else if self.city.is_none() {
            Some(LocationLevel::City)
        } else if self.barangay.is_none() {
            Some(LocationLevel::Barangay)
        } else {
            None
        }
    }

    /// Whether every required level is selected.
    #[must_use]
    pub const fn is_complete(&self, region_has_provinces: bool) -> bool {
        self.next_level(region_has_provinces).is_none()
    }
}

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    /// Short name such as "Home" or "Office".
    pub label: String,
    pub recipient: String,
    pub phone: String,
    /// House number, street, building.
    pub street: String,
    pub barangay: Location,
    pub city: Location,
    #[serde(default)]
    pub province: Option<Location>,
    pub region: Location,
    pub postal_code: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// Single-line rendering for order summaries.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts = vec![
            self.street.as_str(),
            self.barangay.name.as_str(),
            self.city.name.as_str(),
        ];
        if let Some(province) = &self.province {
            parts.push(province.name.as_str());
        }
        parts.push(self.region.name.as_str());
        parts.push(self.postal_code.as_str());
        parts.retain(|p| !p.trim().is_empty());
        parts.join(", ")
    }

    /// The picker selection this address corresponds to.
    #[must_use]
    pub fn selection(&self) -> LocationSelection {
        LocationSelection {
            region: Some(self.region.code.clone()),
            province: self.province.as_ref().map(|p| p.code.clone()),
            city: Some(self.city.code.clone()),
            barangay: Some(self.barangay.code.clone()),
        }
    }
}

/// Address validation failures, one per field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("enter a valid mobile number (09XXXXXXXXX or +639XXXXXXXXX)")]
    InvalidPhone,
    #[error("postal code must be 4 digits")]
    InvalidPostalCode,
    #[error("select a {0}")]
    IncompleteLocation(&'static str),
}

/// Address form input, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddressDraft {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub is_default: bool,
}

/// A validated address ready for the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAddress {
    pub label: String,
    pub recipient: String,
    pub phone: String,
    pub street: String,
    pub region_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province_code: Option<String>,
    pub city_code: String,
    pub barangay_code: String,
    pub postal_code: String,
    pub is_default: bool,
}

impl AddressDraft {
    /// Validate the draft together with the picker selection.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(
        &self,
        selection: &LocationSelection,
        region_has_provinces: bool,
    ) -> Result<NewAddress, AddressError> {
        let recipient = required(&self.recipient, "recipient name")?;
        let street = required(&self.street, "street address")?;
        let phone = normalize_mobile(&self.phone).ok_or(AddressError::InvalidPhone)?;

        let postal_code = self.postal_code.trim();
        if postal_code.len() != 4 || !postal_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AddressError::InvalidPostalCode);
        }

        let region_code = selection
            .region
            .clone()
            .ok_or(AddressError::IncompleteLocation("region"))?;
        let province_code = if region_has_provinces {
            Some(
                selection
                    .province
                    .clone()
                    .ok_or(AddressError::IncompleteLocation("province"))?,
            )
        } else {
            None
        };
        let city_code = selection
            .city
            .clone()
            .ok_or(AddressError::IncompleteLocation("city or municipality"))?;
        let barangay_code = selection
            .barangay
            .clone()
            .ok_or(AddressError::IncompleteLocation("barangay"))?;

        let label = match self.label.trim() {
            "" => "Home".to_string(),
            label => label.to_string(),
        };

        Ok(NewAddress {
            label,
            recipient,
            phone,
            street,
            region_code,
            province_code,
            city_code,
            barangay_code,
            postal_code: postal_code.to_string(),
            is_default: self.is_default,
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, AddressError> {
    let value = value.trim();
    if value.is_empty() {
        Err(AddressError::Required(field))
    } else {
        Ok(value.to_string())
    }
}

/// Normalize a Philippine mobile number to `09XXXXXXXXX`.
///
/// Accepts `09XXXXXXXXX`, `+639XXXXXXXXX` and `639XXXXXXXXX`, ignoring
/// spaces and dashes. Returns `None` for anything else.
#[must_use]
pub fn normalize_mobile(input: &str) -> Option<String> {
    let compact: String = input
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let local = if let Some(rest) = compact.strip_prefix("+63") {
        format!("0{rest}")
    } else if let Some(rest) = compact.strip_prefix("63") {
        format!("0{rest}")
    } else {
        compact
    };
    let valid = local.len() == 11
        && local.starts_with("09")
        && local.chars().all(|c| c.is_ascii_digit());
    valid.then_some(local)
}
