//! Customer accounts as seen by the storefront and the admin dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CustomerId, Money, Role};

/// A customer (or admin) account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Lifetime order count, only filled in by admin endpoints.
    #[serde(default)]
    pub order_count: Option<u32>,
    /// Lifetime spend, only filled in by admin endpoints.
    #[serde(default)]
    pub total_spent: Option<Money>,
}

impl Customer {
    /// Name to greet the customer with, falling back to the email's local part.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            self.email.split('@').next().unwrap_or(&self.email)
        } else {
            name
        }
    }

    /// Case-insensitive match on name, email or phone.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.name.to_lowercase().contains(&needle)
            || self.email.to_lowercase().contains(&needle)
            || self.phone.as_deref().is_some_and(|p| p.contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(name: &str, email: &str) -> Customer {
        Customer {
            id: CustomerId::new(1),
            name: name.to_string(),
            email: email.to_string(),
            phone: Some("09171234567".to_string()),
            role: Role::Customer,
            created_at: None,
            order_count: None,
            total_spent: None,
        }
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        assert_eq!(customer("Maria Santos", "maria@example.ph").display_name(), "Maria Santos");
        assert_eq!(customer("  ", "jun@example.ph").display_name(), "jun");
    }

    #[test]
    fn test_matches_search() {
        let c = customer("Maria Santos", "maria@example.ph");
        assert!(c.matches_search("santos"));
        assert!(c.matches_search("EXAMPLE.PH"));
        assert!(c.matches_search("0917"));
        assert!(c.matches_search(""));
        assert!(!c.matches_search("reyes"));
    }
}
