//! Dashboard figures computed from the live order and product lists.

use aurelle_core::Money;
use aurelle_core::OrderStatus;
use aurelle_core::catalog::Product;
use aurelle_core::order::Order;

/// How many orders the "recent orders" panel shows.
pub const RECENT_ORDER_COUNT: usize = 5;

/// Number of orders in one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: usize,
}

/// Headline numbers for the dashboard page.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    /// Sum of totals over every order that was not cancelled.
    pub revenue: Money,
    pub order_count: usize,
    /// One entry per status, in lifecycle order, zeros included.
    pub status_counts: Vec<StatusCount>,
    pub pending_count: usize,
    pub product_count: usize,
    /// Products at or below the threshold, lowest stock first.
    pub low_stock: Vec<Product>,
    /// Newest orders first.
    pub recent_orders: Vec<Order>,
}

impl DashboardStats {
    #[must_use]
    pub fn compute(orders: &[Order], products: &[Product], low_stock_threshold: u32) -> Self {
        let revenue = orders
            .iter()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .map(|o| o.total)
            .sum();

        let status_counts: Vec<StatusCount> = OrderStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: orders.iter().filter(|o| o.status == status).count(),
            })
            .collect();
        let pending_count = status_counts
            .iter()
            .find(|c| c.status == OrderStatus::Pending)
            .map_or(0, |c| c.count);

        let mut low_stock: Vec<Product> = products
            .iter()
            .filter(|p| p.stock <= low_stock_threshold)
            .cloned()
            .collect();
        low_stock.sort_by(|a, b| a.stock.cmp(&b.stock).then_with(|| a.name.cmp(&b.name)));

        let mut recent_orders = orders.to_vec();
        recent_orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        recent_orders.truncate(RECENT_ORDER_COUNT);

        Self {
            revenue,
            order_count: orders.len(),
            status_counts,
            pending_count,
            product_count: products.len(),
            low_stock,
            recent_orders,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
pub(crate) mod tests {
    use aurelle_core::catalog::Category;
    use aurelle_core::{OrderId, PaymentStatus, ProductId};
    use chrono::{TimeZone, Utc};

    use super::*;

    pub(crate) fn order(id: i32, status: OrderStatus, centavos: i64, day: u32) -> Order {
        Order {
            id: OrderId::new(id),
            number: format!("AUR-2026-{id:06}"),
            customer_id: None,
            customer_email: Some(format!("buyer{id}@example.ph")),
            status,
            payment_status: PaymentStatus::Unpaid,
            items: Vec::new(),
            subtotal: Money::from_centavos(centavos),
            shipping_fee: Money::ZERO,
            total: Money::from_centavos(centavos),
            shipping_address: String::new(),
            payment_label: "Cash on delivery".to_string(),
            notes: None,
            placed_at: Utc.with_ymd_and_hms(2026, 9, day, 10, 0, 0).unwrap(),
        }
    }

    pub(crate) fn product(id: i32, name: &str, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            brand: "Maison Aurelle".to_string(),
            description: String::new(),
            category: Category::Unisex,
            size_ml: 50,
            price: Money::from_centavos(350_000),
            stock,
            notes: Vec::new(),
            image_url: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_revenue_skips_cancelled_orders() {
        let orders = [
            order(1, OrderStatus::Delivered, 500_000, 1),
            order(2, OrderStatus::Cancelled, 900_000, 2),
            order(3, OrderStatus::Pending, 250_000, 3),
        ];
        let stats = DashboardStats::compute(&orders, &[], 5);
        assert_eq!(stats.revenue, Money::from_centavos(750_000));
        assert_eq!(stats.order_count, 3);
        assert_eq!(stats.pending_count, 1);
    }

    #[test]
    fn test_status_counts_include_zeros() {
        let orders = [
            order(1, OrderStatus::Shipped, 100, 1),
            order(2, OrderStatus::Shipped, 100, 2),
        ];
        let stats = DashboardStats::compute(&orders, &[], 5);
        assert_eq!(stats.status_counts.len(), OrderStatus::ALL.len());
        let shipped = stats
            .status_counts
            .iter()
            .find(|c| c.status == OrderStatus::Shipped)
            .unwrap();
        assert_eq!(shipped.count, 2);
        assert_eq!(stats.pending_count, 0);
    }

    #[test]
    fn test_low_stock_sorted_ascending() {
        let products = [
            product(1, "Oud Royale", 4),
            product(2, "Citrus Bloom", 40),
            product(3, "Ambre Nuit", 0),
            product(4, "Vetiver Smoke", 5),
        ];
        let stats = DashboardStats::compute(&[], &products, 5);
        let names: Vec<&str> = stats.low_stock.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Ambre Nuit", "Oud Royale", "Vetiver Smoke"]);
        assert_eq!(stats.product_count, 4);
    }

    #[test]
    fn test_recent_orders_newest_first() {
        let orders: Vec<Order> = (1..=7)
            .map(|i| order(i, OrderStatus::Pending, 100, u32::try_from(i).unwrap()))
            .collect();
        let stats = DashboardStats::compute(&orders, &[], 5);
        let ids: Vec<i32> = stats.recent_orders.iter().map(|o| o.id.as_i32()).collect();
        assert_eq!(ids, [7, 6, 5, 4, 3]);
    }
}
