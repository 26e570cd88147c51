//! Notification route handlers.

use askama::Template;
use askama_web::WebTemplate;
use aurelle_core::NotificationId;
use aurelle_core::notification::{Notification, unread_count};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::{PageLayout, RequireAuth, push_flash};
use crate::models::Flash;
use crate::state::AppState;

/// Notification display data.
#[derive(Clone)]
pub struct NotificationView {
    pub id: String,
    pub title: String,
    pub body: String,
    pub kind: String,
    pub read: bool,
    pub created_at: String,
}

impl From<&Notification> for NotificationView {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.to_string(),
            title: n.title.clone(),
            body: n.body.clone(),
            kind: n.kind.label().to_string(),
            read: n.read,
            created_at: n.created_at.format("%b %-d, %Y %-I:%M %p").to_string(),
        }
    }
}

/// Notifications page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/notifications.html")]
pub struct NotificationsTemplate {
    pub layout: PageLayout,
    pub notifications: Vec<NotificationView>,
    pub unread: usize,
}

/// List notifications, newest first.
#[instrument(skip(state, layout, customer), fields(customer_id = %customer.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    layout: PageLayout,
) -> Result<impl IntoResponse, AppError> {
    let notifications = state.backend().list_notifications(&customer.token).await?;
    Ok(NotificationsTemplate {
        layout,
        unread: unread_count(&notifications),
        notifications: notifications.iter().map(NotificationView::from).collect(),
    })
}

/// Mark one notification read.
#[instrument(skip(state, customer), fields(customer_id = %customer.id))]
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Path(id): Path<NotificationId>,
) -> Result<Redirect, AppError> {
    state
        .backend()
        .mark_notification_read(&customer.token, id)
        .await?;
    Ok(Redirect::to("/account/notifications"))
}

/// Mark every notification read.
#[instrument(skip(state, session, customer), fields(customer_id = %customer.id))]
pub async fn mark_all_read(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
) -> Result<Redirect, AppError> {
    state
        .backend()
        .mark_all_notifications_read(&customer.token)
        .await?;
    push_flash(&session, Flash::info("All notifications marked as read")).await;
    Ok(Redirect::to("/account/notifications"))
}
