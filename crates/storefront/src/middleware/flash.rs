//! One-shot flash messages ("toasts") stored in the session.

use tower_sessions::Session;

use crate::models::{Flash, session_keys};

/// Queue a flash message for the next rendered page.
///
/// Failures are logged; a lost toast never fails the request.
pub async fn push_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(session_keys::FLASH, &flash).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Take the pending flash message, removing it from the session.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session
        .remove::<Flash>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
}
