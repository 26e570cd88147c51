//! Cart route handlers.
//!
//! Forms post and redirect back with a toast. The enhanced add-to-cart
//! buttons in `app.js` send `Accept: application/json` and get the new
//! header badge data instead.

use askama::Template;
use askama_web::WebTemplate;
use aurelle_core::ProductId;
use aurelle_core::cart::{Cart, MAX_LINE_QUANTITY};
use aurelle_core::catalog::Product;
use aurelle_core::order::{OrderQuote, ShippingPolicy};
use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use super::{flash_rejection, return_to, wants_json};
use crate::backend::ApiError;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalAuth, PageLayout, push_flash};
use crate::models::Flash;
use crate::services::{CartService, SyncError};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub brand: String,
    pub image_url: Option<String>,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub subtotal: String,
    pub shipping_fee: String,
    pub total: String,
    /// "Spend ₱X more for free shipping", when it applies.
    pub free_shipping_remaining: Option<String>,
    pub max_quantity: u32,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, shipping: &ShippingPolicy) -> Self {
        let quote = OrderQuote::for_cart(cart, shipping);
        Self {
            lines: cart
                .lines()
                .iter()
                .map(|line| CartLineView {
                    product_id: line.product_id.to_string(),
                    name: line.name.clone(),
                    brand: line.brand.clone(),
                    image_url: line.image_url.clone(),
                    unit_price: line.unit_price.display(),
                    quantity: line.quantity,
                    line_total: line.line_total().display(),
                })
                .collect(),
            item_count: cart.item_count(),
            subtotal: quote.subtotal.display(),
            shipping_fee: quote.shipping_fee.display(),
            total: quote.total.display(),
            free_shipping_remaining: shipping
                .remaining_for_free(quote.subtotal)
                .map(|m| m.display()),
            max_quantity: MAX_LINE_QUANTITY,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Header badge data, returned to JSON clients.
#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
    pub item_count: u32,
    pub subtotal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CartSummary {
    #[must_use]
    pub fn new(cart: &Cart, message: Option<String>) -> Self {
        Self {
            item_count: cart.item_count(),
            subtotal: cart.subtotal().display(),
            message,
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    pub redirect_to: Option<String>,
}

/// Update cart line form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: PageLayout,
    pub cart: CartView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state, session, auth, layout))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    mut layout: PageLayout,
) -> Result<impl IntoResponse, AppError> {
    let cart = CartService::new(state.backend(), &session, auth.0.as_ref())
        .load()
        .await?;
    layout.cart_count = cart.item_count();

    Ok(CartShowTemplate {
        layout,
        cart: CartView::new(&cart, &state.config().shipping),
    })
}

/// Reply to a cart action: JSON for enhanced clients, a redirect otherwise.
async fn respond(
    session: &Session,
    headers: &HeaderMap,
    cart: &Cart,
    flash: Flash,
    redirect: &str,
) -> Response {
    if wants_json(headers) {
        return Json(CartSummary::new(cart, Some(flash.message))).into_response();
    }
    push_flash(session, flash).await;
    Redirect::to(redirect).into_response()
}

/// Reply to a refused cart action.
async fn refuse(
    session: &Session,
    headers: &HeaderMap,
    message: String,
    redirect: &str,
) -> Response {
    if wants_json(headers) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response();
    }
    push_flash(session, Flash::error(message)).await;
    Redirect::to(redirect).into_response()
}

fn only_left(product: &Product) -> String {
    if product.is_in_stock() {
        format!("Only {} left of {}", product.stock, product.name)
    } else {
        format!("{} is out of stock", product.name)
    }
}

/// Add a product to the cart.
#[instrument(skip(state, session, auth, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    let redirect = return_to(form.redirect_to.as_deref(), "/cart");
    let product = match state.backend().get_product(form.product_id).await {
        Ok(product) => product,
        Err(ApiError::NotFound(_)) => {
            return Ok(refuse(
                &session,
                &headers,
                "That fragrance is no longer available".to_string(),
                &redirect,
            )
            .await);
        }
        Err(e) => return Err(e.into()),
    };

    let cart_service = CartService::new(state.backend(), &session, auth.0.as_ref());
    let requested = form.quantity.unwrap_or(1).clamp(1, MAX_LINE_QUANTITY);
    let in_cart = cart_service
        .local()
        .await?
        .line(product.id)
        .map_or(0, |line| line.quantity);

    if !product.is_in_stock() {
        let message = format!("{} is out of stock", product.name);
        return Ok(refuse(&session, &headers, message, &redirect).await);
    }
    if in_cart.saturating_add(requested) > MAX_LINE_QUANTITY {
        let message = format!(
            "You can have at most {MAX_LINE_QUANTITY} of {} in your cart",
            product.name
        );
        return Ok(refuse(&session, &headers, message, &redirect).await);
    }
    if in_cart.saturating_add(requested) > product.stock {
        return Ok(refuse(&session, &headers, only_left(&product), &redirect).await);
    }

    match cart_service.add(&product, requested).await {
        Ok(cart) => {
            let product_id = product.id.to_string();
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[("product_id", product_id.as_str())]),
            );
            let flash = Flash::success(format!("Added {} to your cart", product.name));
            Ok(respond(&session, &headers, &cart, flash, &redirect).await)
        }
        Err(SyncError::Backend(ApiError::Validation(message))) => {
            Ok(refuse(&session, &headers, message, &redirect).await)
        }
        Err(e) => Err(e.into()),
    }
}

/// Change a line's quantity. Zero removes the line.
#[instrument(skip(state, session, auth, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response, AppError> {
    let quantity = form.quantity.min(MAX_LINE_QUANTITY);
    if quantity > 0 {
        let product = match state.backend().get_product(form.product_id).await {
            Ok(product) => product,
            Err(ApiError::NotFound(_)) => {
                let message = "That fragrance is no longer available".to_string();
                return Ok(refuse(&session, &headers, message, "/cart").await);
            }
            Err(e) => return Err(e.into()),
        };
        if quantity > product.stock {
            return Ok(refuse(&session, &headers, only_left(&product), "/cart").await);
        }
    }

    let cart_service = CartService::new(state.backend(), &session, auth.0.as_ref());
    match cart_service.update(form.product_id, quantity).await {
        Ok(cart) => {
            let flash = Flash::success("Cart updated");
            Ok(respond(&session, &headers, &cart, flash, "/cart").await)
        }
        Err(e) => {
            flash_rejection(&session, e).await?;
            Ok(Redirect::to("/cart").into_response())
        }
    }
}

/// Remove a line from the cart.
#[instrument(skip(state, session, auth, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response, AppError> {
    let cart_service = CartService::new(state.backend(), &session, auth.0.as_ref());
    match cart_service.remove(form.product_id).await {
        Ok(cart) => {
            let flash = Flash::info("Removed from your cart");
            Ok(respond(&session, &headers, &cart, flash, "/cart").await)
        }
        Err(e) => {
            flash_rejection(&session, e).await?;
            Ok(Redirect::to("/cart").into_response())
        }
    }
}

/// Empty the cart.
#[instrument(skip(state, session, auth))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
) -> Result<Redirect, AppError> {
    CartService::new(state.backend(), &session, auth.0.as_ref())
        .clear()
        .await?;
    push_flash(&session, Flash::info("Your cart is empty")).await;
    Ok(Redirect::to("/cart"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use aurelle_core::Money;
    use aurelle_core::cart::CartLine;

    use super::*;
    use crate::test_support::product;

    fn cart() -> Cart {
        Cart::from_lines([
            CartLine::from_product(&product(1, "Santal Noir", 250_000, 5), 2),
            CartLine::from_product(&product(2, "Neroli Blanc", 120_050, 5), 1),
        ])
    }

    #[test]
    fn test_view_total_is_sum_of_lines() {
        let cart = cart();
        let view = CartView::new(&cart, &ShippingPolicy::default());

        let sum = cart
            .lines()
            .iter()
            .map(CartLine::line_total)
            .fold(Money::ZERO, |acc, m| acc + m);
        assert_eq!(view.subtotal, sum.display());
        assert_eq!(view.subtotal, "₱6,200.50");
        assert_eq!(view.lines[0].line_total, "₱5,000.00");
        assert_eq!(view.item_count, 3);
    }

    #[test]
    fn test_view_shipping_below_threshold() {
        let cart = Cart::from_lines([CartLine::from_product(
            &product(1, "Santal Noir", 250_000, 5),
            1,
        )]);
        let view = CartView::new(&cart, &ShippingPolicy::default());
        assert_eq!(view.shipping_fee, "₱150.00");
        assert_eq!(view.total, "₱2,650.00");
        assert_eq!(view.free_shipping_remaining.as_deref(), Some("₱500.00"));
    }

    #[test]
    fn test_stock_refusal_names_what_is_left() {
        assert_eq!(
            only_left(&product(3, "Vetiver Sec", 280_000, 2)),
            "Only 2 left of Vetiver Sec"
        );
        assert_eq!(
            only_left(&product(3, "Vetiver Sec", 280_000, 0)),
            "Vetiver Sec is out of stock"
        );
    }

    #[test]
    fn test_summary_json_omits_missing_message() {
        let json = serde_json::to_value(CartSummary::new(&cart(), None)).unwrap();
        assert_eq!(json["item_count"], 3);
        assert!(json.get("message").is_none());
    }
}
