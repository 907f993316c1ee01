//! Pure per-screen projections over a store snapshot: filtering, sorting,
//! and the aggregate figures shown in the list headers.
//!
//! Nothing here touches the network or the stores; every function is a
//! synchronous transformation of a slice plus local screen parameters.

use chrono::{DateTime, Duration, Utc};

use crate::model::{Product, Role, User};

/// Active sort order for the product list. One key at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    Newest,
}

impl SortKey {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "name" | "name-asc" => Some(Self::NameAsc),
            "name-desc" => Some(Self::NameDesc),
            "price" | "price-asc" => Some(Self::PriceAsc),
            "price-desc" => Some(Self::PriceDesc),
            "newest" => Some(Self::Newest),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NameAsc => "name",
            Self::NameDesc => "name-desc",
            Self::PriceAsc => "price",
            Self::PriceDesc => "price-desc",
            Self::Newest => "newest",
        }
    }
}

/// Filter and sort parameters for the product list screen.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub term: String,
    pub sort: SortKey,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ProductQuery {
    /// Apply the query to a snapshot slice. A blank term or unset bound
    /// matches everything on that dimension; dimensions AND together.
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let term = self.term.to_lowercase();
        let term = term.trim();
        let mut matched: Vec<Product> = products
            .iter()
            .filter(|p| {
                term.is_empty()
                    || p.name.to_lowercase().contains(term)
                    || p.id.to_string().contains(term)
            })
            .filter(|p| self.min_price.is_none_or(|min| p.price >= min))
            .filter(|p| self.max_price.is_none_or(|max| p.price <= max))
            .cloned()
            .collect();
        sort_products(&mut matched, self.sort);
        matched
    }
}

fn sort_products(products: &mut [Product], key: SortKey) {
    match key {
        SortKey::NameAsc => products.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        SortKey::NameDesc => products.sort_by(|a, b| b.name.to_lowercase().cmp(&a.name.to_lowercase())),
        SortKey::PriceAsc => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortKey::PriceDesc => products.sort_by(|a, b| b.price.total_cmp(&a.price)),
        // Missing timestamps sort as oldest, i.e. last.
        SortKey::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

/// Filter parameters for the user-management screen.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub term: String,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

impl UserQuery {
    /// Free text matches name or email case-insensitively; role and status
    /// filters AND with it.
    pub fn apply(&self, users: &[User]) -> Vec<User> {
        let term = self.term.to_lowercase();
        let term = term.trim();
        users
            .iter()
            .filter(|u| {
                term.is_empty()
                    || u.name.to_lowercase().contains(term)
                    || u.email.to_lowercase().contains(term)
            })
            .filter(|u| self.role.is_none_or(|role| u.role == role))
            .filter(|u| self.active.is_none_or(|active| u.is_active == active))
            .cloned()
            .collect()
    }

    pub fn is_filtered(&self) -> bool {
        !self.term.trim().is_empty() || self.role.is_some() || self.active.is_some()
    }
}

/// Sum of all product prices ("inventory value" card).
pub fn total_value(products: &[Product]) -> f64 {
    products.iter().map(|p| p.price).sum()
}

/// Arithmetic mean of product prices; 0 for an empty list.
pub fn average_price(products: &[Product]) -> f64 {
    if products.is_empty() {
        return 0.0;
    }
    total_value(products) / products.len() as f64
}

pub fn active_count(users: &[User]) -> usize {
    users.iter().filter(|u| u.is_active).count()
}

pub fn admin_count(users: &[User]) -> usize {
    users.iter().filter(|u| u.role == Role::Admin).count()
}

/// Users created strictly within the last 30 days of `now`. Accounts with
/// no creation timestamp never count.
pub fn recent_count(users: &[User], now: DateTime<Utc>) -> usize {
    let cutoff = now - Duration::days(30);
    users
        .iter()
        .filter(|u| u.created_at.is_some_and(|created| created > cutoff))
        .count()
}

/// Whole days elapsed since the product was created, rounded up; 0 when the
/// timestamp is missing.
pub fn days_since_creation(product: &Product, now: DateTime<Utc>) -> i64 {
    match product.created_at {
        Some(created) => {
            let seconds = (now - created).num_seconds().abs();
            (seconds + 86_399) / 86_400
        }
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn product(id: u64, name: &str, price: f64) -> Product {
        Product {
            id,
            name: name.to_string(),
            price,
            created_at: None,
            updated_at: None,
        }
    }

    fn product_created(id: u64, name: &str, price: f64, created: &str) -> Product {
        Product {
            created_at: Some(created.parse().unwrap()),
            ..product(id, name, price)
        }
    }

    fn user(id: u64, name: &str, email: &str, role: Role, active: bool) -> User {
        User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role,
            is_active: active,
            created_at: None,
            updated_at: None,
            last_login: None,
        }
    }

    #[test]
    fn test_text_filter_is_case_insensitive_on_name() {
        let products = vec![product(1, "Blue Mug", 10.0), product(2, "Red Mug", 12.0)];
        let query = ProductQuery {
            term: "BLUE".to_string(),
            ..Default::default()
        };
        let result = query.apply(&products);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 1);
    }

    #[test]
    fn test_text_filter_matches_id_substring() {
        let products = vec![
            product(12, "A", 1.0),
            product(21, "B", 2.0),
            product(3, "C", 3.0),
        ];
        let query = ProductQuery {
            term: "1".to_string(),
            ..Default::default()
        };
        let ids: Vec<u64> = query.apply(&products).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![12, 21]);
    }

    #[test]
    fn test_blank_term_matches_all() {
        let products = vec![product(1, "A", 1.0), product(2, "B", 2.0)];
        let query = ProductQuery {
            term: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(query.apply(&products).len(), 2);
    }

    #[test]
    fn test_price_range_bounds_and_with_term() {
        let products = vec![
            product(1, "Mug", 5.0),
            product(2, "Mug XL", 25.0),
            product(3, "Plate", 25.0),
        ];
        // Only one entity matches both the term and the range.
        let query = ProductQuery {
            term: "mug".to_string(),
            min_price: Some(10.0),
            ..Default::default()
        };
        let result = query.apply(&products);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 2);
    }

    #[test]
    fn test_sort_by_price_desc() {
        let products = vec![product(1, "A", 5.0), product(2, "B", 25.0)];
        let query = ProductQuery {
            sort: SortKey::PriceDesc,
            ..Default::default()
        };
        let ids: Vec<u64> = query.apply(&products).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_sort_newest_puts_missing_timestamps_last() {
        let products = vec![
            product(1, "No date", 1.0),
            product_created(2, "Old", 1.0, "2024-01-01T00:00:00Z"),
            product_created(3, "New", 1.0, "2024-06-01T00:00:00Z"),
        ];
        let query = ProductQuery {
            sort: SortKey::Newest,
            ..Default::default()
        };
        let ids: Vec<u64> = query.apply(&products).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!(SortKey::from_str("price-desc"), Some(SortKey::PriceDesc));
        assert_eq!(SortKey::from_str("NEWEST"), Some(SortKey::Newest));
        assert_eq!(SortKey::from_str("size"), None);
        assert_eq!(SortKey::Newest.as_str(), "newest");
    }

    #[test]
    fn test_aggregates_on_fixture_lists() {
        assert_eq!(total_value(&[]), 0.0);
        assert_eq!(average_price(&[]), 0.0);

        let one = vec![product(1, "A", 10.0)];
        assert_eq!(average_price(&one), 10.0);

        let two = vec![product(1, "A", 10.0), product(2, "B", 20.0)];
        assert_eq!(total_value(&two), 30.0);
        assert_eq!(average_price(&two), 15.0);

        // Aggregates recompute after a delete shrinks the list.
        let after_delete = vec![product(2, "B", 20.0)];
        assert_eq!(total_value(&after_delete), 20.0);
        assert_eq!(average_price(&after_delete), 20.0);
    }

    #[test]
    fn test_user_filter_and_composition() {
        let users = vec![
            user(1, "Ana Admin", "ana@shop.com", Role::Admin, true),
            user(2, "Ana User", "ana2@shop.com", Role::User, true),
            user(3, "Bob Admin", "bob@shop.com", Role::Admin, false),
        ];
        // Term alone matches two; AND with role narrows to one.
        let query = UserQuery {
            term: "ana".to_string(),
            role: Some(Role::Admin),
            active: None,
        };
        let result = query.apply(&users);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 1);

        let inactive = UserQuery {
            term: String::new(),
            role: None,
            active: Some(false),
        };
        assert_eq!(inactive.apply(&users)[0].id, 3);

        assert!(query.is_filtered());
        assert!(!UserQuery::default().is_filtered());
    }

    #[test]
    fn test_user_term_matches_email() {
        let users = vec![user(1, "Ana", "ana@shop.com", Role::User, true)];
        let query = UserQuery {
            term: "SHOP.COM".to_string(),
            ..Default::default()
        };
        assert_eq!(query.apply(&users).len(), 1);
    }

    #[test]
    fn test_user_counts() {
        let users = vec![
            user(1, "A", "a@x.com", Role::Admin, true),
            user(2, "B", "b@x.com", Role::User, false),
            user(3, "C", "c@x.com", Role::User, true),
        ];
        assert_eq!(active_count(&users), 2);
        assert_eq!(admin_count(&users), 1);
    }

    #[test]
    fn test_recent_count_thirty_day_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 12, 1, 12, 0, 0).unwrap();
        let mut yesterday = user(1, "New", "n@x.com", Role::User, true);
        yesterday.created_at = Some(now - Duration::days(1));
        let mut too_old = user(2, "Old", "o@x.com", Role::User, true);
        too_old.created_at = Some(now - Duration::days(31));
        let no_date = user(3, "Unknown", "u@x.com", Role::User, true);

        assert_eq!(recent_count(&[yesterday, too_old, no_date], now), 1);
    }

    #[test]
    fn test_days_since_creation_rounds_up() {
        let now = Utc.with_ymd_and_hms(2024, 12, 1, 12, 0, 0).unwrap();
        let fresh = product_created(1, "A", 1.0, "2024-12-01T00:00:00Z");
        assert_eq!(days_since_creation(&fresh, now), 1);
        let older = product_created(2, "B", 1.0, "2024-11-21T12:00:00Z");
        assert_eq!(days_since_creation(&older, now), 10);
        assert_eq!(days_since_creation(&product(3, "C", 1.0), now), 0);
    }
}
