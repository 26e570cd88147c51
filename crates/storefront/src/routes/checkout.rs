//! Checkout route handlers.

use askama::Template;
use askama_web::WebTemplate;
use aurelle_core::order::CheckoutRequest;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{instrument, warn};

use super::cart::CartView;
use super::capitalize;
use crate::backend::ApiError;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{PageLayout, RequireAuth, push_flash};
use crate::models::Flash;
use crate::services::{CheckoutService, PlaceOrderError, SyncError};
use crate::state::AppState;

/// A selectable address or payment method.
#[derive(Clone)]
pub struct ChoiceView {
    pub id: String,
    pub title: String,
    pub detail: String,
    pub selected: bool,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub layout: PageLayout,
    pub cart: CartView,
    pub addresses: Vec<ChoiceView>,
    pub payment_methods: Vec<ChoiceView>,
}

/// Display the checkout page.
///
/// Defaults are preselected; an empty cart sends the customer back to it.
#[instrument(skip(state, session, layout, customer), fields(customer_id = %customer.id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    mut layout: PageLayout,
) -> Result<Response, AppError> {
    let shipping = state.config().shipping;
    let summary = CheckoutService::new(state.backend(), &session, &customer, &shipping)
        .summary()
        .await?;

    if summary.cart.is_empty() {
        push_flash(&session, Flash::info("Your cart is empty")).await;
        return Ok(Redirect::to("/cart").into_response());
    }
    layout.cart_count = summary.cart.item_count();

    let addresses = summary
        .addresses
        .iter()
        .map(|a| ChoiceView {
            id: a.id.to_string(),
            title: format!("{} ({})", a.recipient, a.label),
            detail: a.one_line(),
            selected: a.is_default,
        })
        .collect();
    let payment_methods = summary
        .payment_methods
        .iter()
        .map(|m| ChoiceView {
            id: m.id.to_string(),
            title: m.display_label(),
            detail: m.kind.label().to_string(),
            selected: m.is_default,
        })
        .collect();

    Ok(CheckoutTemplate {
        layout,
        cart: CartView::new(&summary.cart, &shipping),
        addresses,
        payment_methods,
    }
    .into_response())
}

/// Place the order.
///
/// Validation problems and backend outages go back to the checkout page as a
/// toast with the cart untouched.
#[instrument(skip(state, session, customer, form), fields(customer_id = %customer.id))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    Form(form): Form<CheckoutRequest>,
) -> Result<Redirect, AppError> {
    let shipping = state.config().shipping;
    let service = CheckoutService::new(state.backend(), &session, &customer, &shipping);

    let message = match service.place_order(&form).await {
        Ok(order) => {
            push_flash(
                &session,
                Flash::success(format!("Thank you! Order {} has been placed", order.number)),
            )
            .await;
            return Ok(Redirect::to(&format!("/account/orders/{}", order.id)));
        }
        Err(PlaceOrderError::Invalid(e)) => capitalize(&e.to_string()),
        Err(PlaceOrderError::Sync(SyncError::Backend(ApiError::Validation(message)))) => message,
        Err(PlaceOrderError::Sync(SyncError::Backend(e))) if e.is_unavailable() => {
            warn!(error = %e, "Order placement failed, backend unavailable");
            "We couldn't place your order right now. Your cart is saved, please try again."
                .to_string()
        }
        Err(e) => return Err(e.into()),
    };

    push_flash(&session, Flash::error(message)).await;
    Ok(Redirect::to("/checkout"))
}
