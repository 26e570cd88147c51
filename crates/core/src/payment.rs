//! Saved payment methods.
//!
//! Card numbers are validated here and reduced to a masked form before
//! anything is sent to the backend; the web tier never forwards a full card
//! number. E-wallets (`GCash`, Maya) are identified by the mobile number
//! linked to the wallet.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::normalize_mobile;
use crate::types::PaymentMethodId;

/// How a customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    CashOnDelivery,
    Gcash,
    Maya,
    Card,
}

impl PaymentKind {
    /// Every kind, in menu order.
    pub const ALL: [Self; 4] = [Self::CashOnDelivery, Self::Gcash, Self::Maya, Self::Card];

    /// Wire value (`snake_case`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "cash_on_delivery",
            Self::Gcash => "gcash",
            Self::Maya => "maya",
            Self::Card => "card",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "Cash on Delivery",
            Self::Gcash => "GCash",
            Self::Maya => "Maya",
            Self::Card => "Credit/Debit Card",
        }
    }

    /// Whether this kind is an e-wallet identified by a mobile number.
    #[must_use]
    pub const fn is_wallet(self) -> bool {
        matches!(self, Self::Gcash | Self::Maya)
    }
}

impl std::str::FromStr for PaymentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("invalid payment kind: {s}"))
    }
}

/// Card network detected from the number prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Other,
}

impl CardBrand {
    /// Detect the brand of a digits-only card number.
    #[must_use]
    pub fn detect(digits: &str) -> Self {
        let prefix = |n: usize| digits.get(..n).and_then(|p| p.parse::<u32>().ok());
        if digits.starts_with('4') {
            Self::Visa
        } else if matches!(prefix(2), Some(34 | 37)) {
            Self::Amex
        } else if matches!(prefix(2), Some(51..=55)) || matches!(prefix(4), Some(2221..=2720)) {
            Self::Mastercard
        } else {
            Self::Other
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::Amex => "American Express",
            Self::Other => "Card",
        }
    }
}

/// A saved payment method as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub kind: PaymentKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub masked_number: Option<String>,
    #[serde(default)]
    pub brand: Option<CardBrand>,
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl PaymentMethod {
    /// Label for dropdowns and order summaries, e.g. `Visa •••• 4242`.
    #[must_use]
    pub fn display_label(&self) -> String {
        if let Some(label) = self.label.as_deref().filter(|l| !l.trim().is_empty()) {
            return label.to_string();
        }
        let name = match (self.kind, self.brand) {
            (PaymentKind::Card, Some(brand)) => brand.label(),
            (kind, _) => kind.label(),
        };
        match &self.masked_number {
            Some(masked) => format!("{name} {masked}"),
            None => name.to_string(),
        }
    }
}

/// Payment method validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentMethodError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("card number is not valid")]
    InvalidCardNumber,
    #[error("expiry must be in MM/YY format")]
    InvalidExpiry,
    #[error("card has expired")]
    Expired,
    #[error("enter the mobile number linked to the wallet")]
    InvalidWalletNumber,
}

/// Payment method form input, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentMethodDraft {
    pub kind: PaymentKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub account_name: String,
    /// Card number or wallet mobile number.
    #[serde(default)]
    pub number: String,
    /// Card expiry, `MM/YY`.
    #[serde(default)]
    pub expiry: String,
    #[serde(default)]
    pub is_default: bool,
}

/// A validated, masked payment method ready for the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPaymentMethod {
    pub kind: PaymentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<CardBrand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    pub is_default: bool,
}

impl PaymentMethodDraft {
    /// Validate and mask the draft.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self, today: NaiveDate) -> Result<NewPaymentMethod, PaymentMethodError> {
        let label = Some(self.label.trim().to_string()).filter(|l| !l.is_empty());
        let mut method = NewPaymentMethod {
            kind: self.kind,
            label,
            account_name: None,
            masked_number: None,
            brand: None,
            expiry: None,
            is_default: self.is_default,
        };

        match self.kind {
            PaymentKind::CashOnDelivery => {}
            PaymentKind::Gcash | PaymentKind::Maya => {
                let account_name = required(&self.account_name, "account name")?;
                let mobile =
                    normalize_mobile(&self.number).ok_or(PaymentMethodError::InvalidWalletNumber)?;
                method.account_name = Some(account_name);
                method.masked_number = Some(mask_mobile(&mobile));
            }
            PaymentKind::Card => {
                let account_name = required(&self.account_name, "cardholder name")?;
                let digits: String = self
                    .number
                    .chars()
                    .filter(|c| !c.is_whitespace() && *c != '-')
                    .collect();
                if !(12..=19).contains(&digits.len())
                    || !digits.chars().all(|c| c.is_ascii_digit())
                    || !luhn_valid(&digits)
                {
                    return Err(PaymentMethodError::InvalidCardNumber);
                }
                let expiry = parse_expiry(&self.expiry)?;
                if expiry < (today.year(), today.month()) {
                    return Err(PaymentMethodError::Expired);
                }
                method.account_name = Some(account_name);
                method.brand = Some(CardBrand::detect(&digits));
                method.masked_number = Some(mask_card(&digits));
                method.expiry = Some(format!("{:02}/{:02}", expiry.1, expiry.0 % 100));
            }
        }
        Ok(method)
    }
}

fn required(value: &str, field: &'static str) -> Result<String, PaymentMethodError> {
    let value = value.trim();
    if value.is_empty() {
        Err(PaymentMethodError::Required(field))
    } else {
        Ok(value.to_string())
    }
}

/// Luhn checksum over a digits-only string.
#[must_use]
pub fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0;
    for (i, ch) in digits.chars().rev().enumerate() {
        let Some(mut d) = ch.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    !digits.is_empty() && sum % 10 == 0
}

/// Parse `MM/YY` (or `MM/YYYY`) into `(year, month)`.
fn parse_expiry(input: &str) -> Result<(i32, u32), PaymentMethodError> {
    let (month, year) = input
        .trim()
        .split_once('/')
        .ok_or(PaymentMethodError::InvalidExpiry)?;
    let month: u32 = month
        .trim()
        .parse()
        .map_err(|_| PaymentMethodError::InvalidExpiry)?;
    let year_text = year.trim();
    let year: i32 = year_text
        .parse()
        .map_err(|_| PaymentMethodError::InvalidExpiry)?;
    let year = match year_text.len() {
        2 => 2000 + year,
        4 => year,
        _ => return Err(PaymentMethodError::InvalidExpiry),
    };
    if !(1..=12).contains(&month) {
        return Err(PaymentMethodError::InvalidExpiry);
    }
    Ok((year, month))
}

fn mask_card(digits: &str) -> String {
    let last_four: String = digits.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("•••• {last_four}")
}

fn mask_mobile(mobile: &str) -> String {
    let head: String = mobile.chars().take(4).collect();
    let tail: String = mobile.chars().skip(7).collect();
    format!("{head} ••• {tail}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn card(number: &str, expiry: &str) -> PaymentMethodDraft {
        PaymentMethodDraft {
            kind: PaymentKind::Card,
            label: String::new(),
            account_name: "Maria Santos".to_string(),
            number: number.to_string(),
            expiry: expiry.to_string(),
            is_default: false,
        }
    }

    #[test]
    fn test_luhn() {
        assert!(luhn_valid("4242424242424242"));
        assert!(luhn_valid("5555555555554444"));
        assert!(!luhn_valid("4242424242424241"));
        assert!(!luhn_valid(""));
    }

    #[test]
    fn test_card_is_masked_and_branded() {
        let method = card("4242 4242 4242 4242", "12/28").validate(today()).unwrap();
        assert_eq!(method.masked_number.as_deref(), Some("•••• 4242"));
        assert_eq!(method.brand, Some(CardBrand::Visa));
        assert_eq!(method.expiry.as_deref(), Some("12/28"));
        let json = serde_json::to_string(&method).unwrap();
        assert!(!json.contains("4242424242424242"));
    }

    #[test]
    fn test_card_rejects_bad_luhn() {
        assert_eq!(
            card("4242424242424241", "12/28").validate(today()),
            Err(PaymentMethodError::InvalidCardNumber)
        );
    }

    #[test]
    fn test_card_expiry_rules() {
        assert_eq!(
            card("4242424242424242", "09/26").validate(today()),
            Err(PaymentMethodError::Expired)
        );
        assert!(card("4242424242424242", "10/26").validate(today()).is_ok());
        assert_eq!(
            card("4242424242424242", "13/27").validate(today()),
            Err(PaymentMethodError::InvalidExpiry)
        );
        assert_eq!(
            card("4242424242424242", "1227").validate(today()),
            Err(PaymentMethodError::InvalidExpiry)
        );
    }

    #[test]
    fn test_brand_detection() {
        assert_eq!(CardBrand::detect("5555555555554444"), CardBrand::Mastercard);
        assert_eq!(CardBrand::detect("2223003122003222"), CardBrand::Mastercard);
        assert_eq!(CardBrand::detect("378282246310005"), CardBrand::Amex);
        assert_eq!(CardBrand::detect("6011111111111117"), CardBrand::Other);
    }

    #[test]
    fn test_wallet_masks_mobile() {
        let draft = PaymentMethodDraft {
            kind: PaymentKind::Gcash,
            label: String::new(),
            account_name: "Maria Santos".to_string(),
            number: "+639171234567".to_string(),
            expiry: String::new(),
            is_default: true,
        };
        let method = draft.validate(today()).unwrap();
        assert_eq!(method.masked_number.as_deref(), Some("0917 ••• 4567"));
    }

    #[test]
    fn test_wallet_requires_mobile() {
        let draft = PaymentMethodDraft {
            kind: PaymentKind::Maya,
            label: String::new(),
            account_name: "Maria".to_string(),
            number: "12345".to_string(),
            expiry: String::new(),
            is_default: false,
        };
        assert_eq!(
            draft.validate(today()),
            Err(PaymentMethodError::InvalidWalletNumber)
        );
    }

    #[test]
    fn test_cash_on_delivery_needs_nothing() {
        let draft = PaymentMethodDraft {
            kind: PaymentKind::CashOnDelivery,
            label: String::new(),
            account_name: String::new(),
            number: String::new(),
            expiry: String::new(),
            is_default: false,
        };
        let method = draft.validate(today()).unwrap();
        assert_eq!(method.masked_number, None);
    }

    #[test]
    fn test_display_label() {
        let method = PaymentMethod {
            id: PaymentMethodId::new(1),
            kind: PaymentKind::Card,
            label: None,
            account_name: Some("Maria".to_string()),
            masked_number: Some("•••• 4242".to_string()),
            brand: Some(CardBrand::Visa),
            expiry: Some("12/28".to_string()),
            is_default: true,
        };
        assert_eq!(method.display_label(), "Visa •••• 4242");
    }
}
