//! Favorites route handlers.
//!
//! Guests keep favorites in their session; they are merged into the account
//! on login.

use askama::Template;
use askama_web::WebTemplate;
use aurelle_core::ProductId;
use axum::{
    Form, Json,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use super::products::ProductCardView;
use super::{flash_rejection, return_to, wants_json};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, PageLayout, push_flash};
use crate::models::Flash;
use crate::services::FavoritesService;
use crate::state::AppState;

/// Toggle favorite form data.
#[derive(Debug, Deserialize)]
pub struct ToggleFavoriteForm {
    pub product_id: ProductId,
    pub redirect_to: Option<String>,
}

/// JSON reply for enhanced clients.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub favorited: bool,
    pub count: usize,
}

/// Favorites page template.
#[derive(Template, WebTemplate)]
#[template(path = "favorites/index.html")]
pub struct FavoritesIndexTemplate {
    pub layout: PageLayout,
    pub products: Vec<ProductCardView>,
}

/// Display favorited products.
#[instrument(skip(state, session, auth, layout))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    mut layout: PageLayout,
) -> Result<impl IntoResponse, AppError> {
    let favorites = FavoritesService::new(state.backend(), &session, auth.0.as_ref())
        .load()
        .await?;
    layout.favorites_count = favorites.len();

    let products = state.backend().products_by_ids(favorites.iter()).await?;
    Ok(FavoritesIndexTemplate {
        layout,
        products: products
            .iter()
            .map(|p| ProductCardView::new(p, &favorites))
            .collect(),
    })
}

/// Add or remove a favorite.
#[instrument(skip(state, session, auth, headers))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<ToggleFavoriteForm>,
) -> Result<Response, AppError> {
    let redirect = return_to(form.redirect_to.as_deref(), "/favorites");
    let service = FavoritesService::new(state.backend(), &session, auth.0.as_ref());

    let favorited = match service.toggle(form.product_id).await {
        Ok(favorited) => favorited,
        Err(e) => {
            flash_rejection(&session, e).await?;
            return Ok(Redirect::to(&redirect).into_response());
        }
    };

    if wants_json(&headers) {
        let count = service.local().await?.len();
        return Ok(Json(ToggleResponse { favorited, count }).into_response());
    }

    let message = if favorited {
        "Saved to your favorites"
    } else {
        "Removed from your favorites"
    };
    push_flash(&session, Flash::success(message)).await;
    Ok(Redirect::to(&redirect).into_response())
}
