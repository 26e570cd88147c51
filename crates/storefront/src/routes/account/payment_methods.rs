//! Saved payment method route handlers.
//!
//! Card numbers are validated and masked here; only the masked form and the
//! detected brand are sent to the backend, and the raw number is never
//! rendered back into the form.

use askama::Template;
use askama_web::WebTemplate;
use aurelle_core::PaymentMethodId;
use aurelle_core::payment::{PaymentKind, PaymentMethod, PaymentMethodDraft};
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::backend::ApiError;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{PageLayout, RequireAuth, push_flash};
use crate::models::Flash;
use crate::routes::capitalize;
use crate::routes::products::OptionView;
use crate::state::AppState;

/// Saved payment method display data.
#[derive(Clone)]
pub struct PaymentMethodView {
    pub id: String,
    pub label: String,
    pub kind: String,
    pub account_name: Option<String>,
    pub expiry: Option<String>,
    pub is_default: bool,
}

impl From<&PaymentMethod> for PaymentMethodView {
    fn from(method: &PaymentMethod) -> Self {
        Self {
            id: method.id.to_string(),
            label: method.display_label(),
            kind: method.kind.label().to_string(),
            account_name: method.account_name.clone(),
            expiry: method.expiry.clone(),
            is_default: method.is_default,
        }
    }
}

/// Payment method form data.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentMethodForm {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub expiry: String,
    pub is_default: Option<String>,
}

impl PaymentMethodForm {
    fn draft(&self) -> Result<PaymentMethodDraft, String> {
        let kind = self
            .kind
            .parse::<PaymentKind>()
            .map_err(|_| "Choose a payment type".to_string())?;
        Ok(PaymentMethodDraft {
            kind,
            label: self.label.clone(),
            account_name: self.account_name.clone(),
            number: self.number.clone(),
            expiry: self.expiry.clone(),
            is_default: self.is_default.is_some(),
        })
    }
}

/// Payment method list template.
#[derive(Template, WebTemplate)]
#[template(path = "account/payment_methods.html")]
pub struct PaymentMethodsTemplate {
    pub layout: PageLayout,
    pub methods: Vec<PaymentMethodView>,
}

/// New payment method template.
#[derive(Template, WebTemplate)]
#[template(path = "account/payment_method_form.html")]
pub struct PaymentMethodFormTemplate {
    pub layout: PageLayout,
    pub kinds: Vec<OptionView>,
    pub label: String,
    pub account_name: String,
    pub expiry: String,
    pub is_default: bool,
    pub error: Option<String>,
}

impl PaymentMethodFormTemplate {
    fn new(layout: PageLayout, form: &PaymentMethodForm, error: Option<String>) -> Self {
        let selected = form
            .kind
            .parse::<PaymentKind>()
            .unwrap_or(PaymentKind::CashOnDelivery);
        Self {
            layout,
            kinds: PaymentKind::ALL
                .into_iter()
                .map(|k| OptionView {
                    value: k.as_str().to_string(),
                    label: k.label().to_string(),
                    selected: k == selected,
                })
                .collect(),
            label: form.label.clone(),
            account_name: form.account_name.clone(),
            expiry: form.expiry.clone(),
            is_default: form.is_default.is_some(),
            error,
        }
    }
}

/// List saved payment methods.
#[instrument(skip(state, layout, customer), fields(customer_id = %customer.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    layout: PageLayout,
) -> Result<impl IntoResponse, AppError> {
    let methods = state
        .backend()
        .list_payment_methods(&customer.token)
        .await?;
    Ok(PaymentMethodsTemplate {
        layout,
        methods: methods.iter().map(PaymentMethodView::from).collect(),
    })
}

/// Display the new payment method form.
#[instrument(skip(layout, _customer))]
pub async fn new(RequireAuth(_customer): RequireAuth, layout: PageLayout) -> impl IntoResponse {
    PaymentMethodFormTemplate::new(layout, &PaymentMethodForm::default(), None)
}

/// Save a payment method.
#[instrument(skip(state, session, layout, customer, form), fields(customer_id = %customer.id))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    layout: PageLayout,
    Form(form): Form<PaymentMethodForm>,
) -> Result<Response, AppError> {
    let today = chrono::Utc::now().date_naive();
    let method = match form.draft() {
        Ok(draft) => draft
            .validate(today)
            .map_err(|e| capitalize(&e.to_string())),
        Err(message) => Err(message),
    };
    let method = match method {
        Ok(method) => method,
        Err(message) => {
            return Ok(PaymentMethodFormTemplate::new(layout, &form, Some(message)).into_response());
        }
    };

    match state
        .backend()
        .create_payment_method(&customer.token, &method)
        .await
    {
        Ok(saved) => {
            info!(payment_method_id = %saved.id, kind = saved.kind.as_str(), "Payment method added");
            push_flash(&session, Flash::success("Payment method saved")).await;
            Ok(Redirect::to("/account/payment-methods").into_response())
        }
        Err(ApiError::Validation(message)) => {
            Ok(PaymentMethodFormTemplate::new(layout, &form, Some(message)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a payment method.
#[instrument(skip(state, session, customer), fields(customer_id = %customer.id))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    Path(id): Path<PaymentMethodId>,
) -> Result<Redirect, AppError> {
    match state
        .backend()
        .delete_payment_method(&customer.token, id)
        .await
    {
        Ok(()) => push_flash(&session, Flash::success("Payment method removed")).await,
        Err(ApiError::Validation(message)) => push_flash(&session, Flash::error(message)).await,
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/account/payment-methods"))
}

/// Make a payment method the default.
#[instrument(skip(state, session, customer), fields(customer_id = %customer.id))]
pub async fn make_default(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    Path(id): Path<PaymentMethodId>,
) -> Result<Redirect, AppError> {
    state
        .backend()
        .set_default_payment_method(&customer.token, id)
        .await?;
    push_flash(&session, Flash::success("Default payment method updated")).await;
    Ok(Redirect::to("/account/payment-methods"))
}
