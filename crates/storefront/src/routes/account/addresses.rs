//! Saved address route handlers.
//!
//! The region → province → city → barangay dropdowns work without
//! JavaScript: changing a level submits the form with `action=refresh`,
//! which re-renders it with the next level's options. `app.js` swaps that
//! round trip for calls to `/api/locations/{level}`.

use askama::Template;
use askama_web::WebTemplate;
use aurelle_core::AddressId;
use aurelle_core::address::{Address, AddressDraft, Location, LocationSelection};
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::backend::ApiError;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{PageLayout, RequireAuth, push_flash};
use crate::models::{CurrentCustomer, Flash};
use crate::routes::products::OptionView;
use crate::routes::{capitalize, return_to};
use crate::services::address_picker::{self, PickerError, PickerOptions};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Saved address display data.
#[derive(Clone)]
pub struct AddressView {
    pub id: String,
    pub label: String,
    pub recipient: String,
    pub phone: String,
    pub one_line: String,
    pub is_default: bool,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.to_string(),
            label: address.label.clone(),
            recipient: address.recipient.clone(),
            phone: address.phone.clone(),
            one_line: address.one_line(),
            is_default: address.is_default,
        }
    }
}

fn options(locations: &[Location], selected: Option<&str>) -> Vec<OptionView> {
    locations
        .iter()
        .map(|l| OptionView {
            value: l.code.clone(),
            label: l.name.clone(),
            selected: selected == Some(l.code.as_str()),
        })
        .collect()
}

// =============================================================================
// Form Types
// =============================================================================

/// Address form data, including the picker selection.
#[derive(Debug, Default, Deserialize)]
pub struct AddressForm {
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
    pub is_default: Option<String>,
    pub region: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub barangay: Option<String>,
    /// `refresh` re-renders the form with updated dropdowns.
    pub action: Option<String>,
    pub next: Option<String>,
}

impl AddressForm {
    fn from_address(address: &Address) -> Self {
        let selection = address.selection();
        Self {
            label: address.label.clone(),
            recipient: address.recipient.clone(),
            phone: address.phone.clone(),
            street: address.street.clone(),
            postal_code: address.postal_code.clone(),
            is_default: address.is_default.then(|| "true".to_string()),
            region: selection.region,
            province: selection.province,
            city: selection.city,
            barangay: selection.barangay,
            action: None,
            next: None,
        }
    }

    fn selection(&self) -> LocationSelection {
        LocationSelection::from_form(
            self.region.as_deref(),
            self.province.as_deref(),
            self.city.as_deref(),
            self.barangay.as_deref(),
        )
    }

    fn draft(&self) -> AddressDraft {
        AddressDraft {
            label: self.label.clone(),
            recipient: self.recipient.clone(),
            phone: self.phone.clone(),
            street: self.street.clone(),
            postal_code: self.postal_code.clone(),
            is_default: self.is_default.is_some(),
        }
    }

    fn is_refresh(&self) -> bool {
        self.action.as_deref() == Some("refresh")
    }
}

/// `?next=` on the new-address page (e.g. back to checkout).
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Address list template.
#[derive(Template, WebTemplate)]
#[template(path = "account/addresses.html")]
pub struct AddressesTemplate {
    pub layout: PageLayout,
    pub addresses: Vec<AddressView>,
}

/// New/edit address template.
#[derive(Template, WebTemplate)]
#[template(path = "account/address_form.html")]
pub struct AddressFormTemplate {
    pub layout: PageLayout,
    pub title: String,
    pub form_action: String,
    pub label: String,
    pub recipient: String,
    pub phone: String,
    pub street: String,
    pub postal_code: String,
    pub is_default: bool,
    pub regions: Vec<OptionView>,
    pub provinces: Vec<OptionView>,
    pub cities: Vec<OptionView>,
    pub barangays: Vec<OptionView>,
    pub region_has_provinces: bool,
    pub error: Option<String>,
    pub next: String,
}

impl AddressFormTemplate {
    fn new(
        layout: PageLayout,
        title: &str,
        form_action: String,
        form: &AddressForm,
        picker: &PickerOptions,
        error: Option<String>,
    ) -> Self {
        let selection = form.selection();
        Self {
            layout,
            title: title.to_string(),
            form_action,
            label: form.label.clone(),
            recipient: form.recipient.clone(),
            phone: form.phone.clone(),
            street: form.street.clone(),
            postal_code: form.postal_code.clone(),
            is_default: form.is_default.is_some(),
            regions: options(&picker.regions, selection.region.as_deref()),
            provinces: options(&picker.provinces, selection.province.as_deref()),
            cities: options(&picker.cities, selection.city.as_deref()),
            barangays: options(&picker.barangays, selection.barangay.as_deref()),
            region_has_provinces: picker.region_has_provinces,
            error,
            next: return_to(form.next.as_deref(), ""),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// List saved addresses.
#[instrument(skip(state, layout, customer), fields(customer_id = %customer.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    layout: PageLayout,
) -> Result<impl IntoResponse, AppError> {
    let addresses = state.backend().list_addresses(&customer.token).await?;
    Ok(AddressesTemplate {
        layout,
        addresses: addresses.iter().map(AddressView::from).collect(),
    })
}

async fn render_form(
    state: &AppState,
    layout: PageLayout,
    title: &str,
    form_action: String,
    form: &AddressForm,
    error: Option<String>,
) -> Result<Response, AppError> {
    let picker = address_picker::options_for(state.backend(), &form.selection()).await?;
    Ok(AddressFormTemplate::new(layout, title, form_action, form, &picker, error).into_response())
}

/// Display the new address form.
#[instrument(skip(state, layout, customer), fields(customer_id = %customer.id))]
pub async fn new(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    layout: PageLayout,
    Query(query): Query<NextQuery>,
) -> Result<Response, AppError> {
    let form = AddressForm {
        next: query.next,
        ..AddressForm::default()
    };
    render_form(&state, layout, "New address", "/account/addresses".to_string(), &form, None).await
}

/// Display the edit form for a saved address.
#[instrument(skip(state, layout, customer), fields(customer_id = %customer.id))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    layout: PageLayout,
    Path(id): Path<AddressId>,
) -> Result<Response, AppError> {
    let address = find_address(&state, &customer, id).await?;
    render_form(
        &state,
        layout,
        "Edit address",
        format!("/account/addresses/{id}"),
        &AddressForm::from_address(&address),
        None,
    )
    .await
}

async fn find_address(
    state: &AppState,
    customer: &CurrentCustomer,
    id: AddressId,
) -> Result<Address, AppError> {
    state
        .backend()
        .list_addresses(&customer.token)
        .await?
        .into_iter()
        .find(|a| a.id == id)
        .ok_or_else(|| AppError::NotFound(format!("address {id}")))
}

/// Outcome of validating and saving an address form.
enum SaveOutcome {
    Saved(Address),
    Invalid(String),
}

async fn save(
    state: &AppState,
    customer: &CurrentCustomer,
    id: Option<AddressId>,
    form: &AddressForm,
) -> Result<SaveOutcome, AppError> {
    let selection = form.selection();
    let region_has_provinces = match address_picker::validate(state.backend(), &selection).await {
        Ok(has_provinces) => has_provinces,
        Err(PickerError::Mismatch(level)) => {
            return Ok(SaveOutcome::Invalid(format!("The selected {level} is not valid")));
        }
        Err(PickerError::Api(e)) => return Err(e.into()),
    };
    let address = match form.draft().validate(&selection, region_has_provinces) {
        Ok(address) => address,
        Err(e) => return Ok(SaveOutcome::Invalid(capitalize(&e.to_string()))),
    };

    let backend = state.backend();
    let saved = match id {
        Some(id) => backend.update_address(&customer.token, id, &address).await,
        None => backend.create_address(&customer.token, &address).await,
    };
    match saved {
        Ok(saved) => Ok(SaveOutcome::Saved(saved)),
        Err(ApiError::Validation(message)) => Ok(SaveOutcome::Invalid(message)),
        Err(e) => Err(e.into()),
    }
}

/// Create an address, or re-render the form for a picker refresh.
#[instrument(skip(state, session, layout, customer, form), fields(customer_id = %customer.id))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    layout: PageLayout,
    Form(form): Form<AddressForm>,
) -> Result<Response, AppError> {
    let form_action = "/account/addresses".to_string();
    if form.is_refresh() {
        return render_form(&state, layout, "New address", form_action, &form, None).await;
    }

    match save(&state, &customer, None, &form).await? {
        SaveOutcome::Saved(address) => {
            info!(address_id = %address.id, "Address created");
            push_flash(&session, Flash::success("Address saved")).await;
            let next = return_to(form.next.as_deref(), "/account/addresses");
            Ok(Redirect::to(&next).into_response())
        }
        SaveOutcome::Invalid(message) => {
            render_form(&state, layout, "New address", form_action, &form, Some(message)).await
        }
    }
}

/// Update an address, or re-render the form for a picker refresh.
#[instrument(skip(state, session, layout, customer, form), fields(customer_id = %customer.id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    layout: PageLayout,
    Path(id): Path<AddressId>,
    Form(form): Form<AddressForm>,
) -> Result<Response, AppError> {
    let form_action = format!("/account/addresses/{id}");
    if form.is_refresh() {
        return render_form(&state, layout, "Edit address", form_action, &form, None).await;
    }

    match save(&state, &customer, Some(id), &form).await? {
        SaveOutcome::Saved(_) => {
            info!(address_id = %id, "Address updated");
            push_flash(&session, Flash::success("Address updated")).await;
            Ok(Redirect::to("/account/addresses").into_response())
        }
        SaveOutcome::Invalid(message) => {
            render_form(&state, layout, "Edit address", form_action, &form, Some(message)).await
        }
    }
}

/// Delete an address.
#[instrument(skip(state, session, customer), fields(customer_id = %customer.id))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Redirect, AppError> {
    match state.backend().delete_address(&customer.token, id).await {
        Ok(()) => push_flash(&session, Flash::success("Address removed")).await,
        Err(ApiError::Validation(message)) => push_flash(&session, Flash::error(message)).await,
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/account/addresses"))
}

/// Make an address the default.
#[instrument(skip(state, session, customer), fields(customer_id = %customer.id))]
pub async fn make_default(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Redirect, AppError> {
    state
        .backend()
        .set_default_address(&customer.token, id)
        .await?;
    push_flash(&session, Flash::success("Default address updated")).await;
    Ok(Redirect::to("/account/addresses"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn form(pairs: &str) -> AddressForm {
        let uri: axum::http::Uri = format!("/account/addresses?{pairs}").parse().unwrap();
        Query::<AddressForm>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_form_selection_drops_levels_below_gap() {
        let selection = form("region=07&province=&city=072217&barangay=072217001").selection();
        assert_eq!(selection.region.as_deref(), Some("07"));
        assert_eq!(selection.province, None);
        assert_eq!(selection.city.as_deref(), Some("072217"));
    }

    #[test]
    fn test_checkbox_maps_to_default_flag() {
        assert!(form("recipient=Bea&is_default=true").draft().is_default);
        assert!(!form("recipient=Bea").draft().is_default);
        assert!(form("action=refresh").is_refresh());
    }

    #[test]
    fn test_options_mark_selection() {
        let locations = vec![
            Location {
                code: "13".to_string(),
                name: "NCR".to_string(),
            },
            Location {
                code: "07".to_string(),
                name: "Central Visayas".to_string(),
            },
        ];
        let views = options(&locations, Some("07"));
        assert!(!views[0].selected);
        assert!(views[1].selected);
    }
}
