//! Form-level logic for the create and edit flows: input validation against
//! the catalog's field rules, and baseline/current dirty tracking so an edit
//! can only submit when something actually changed.

use crate::model::{CreateProductRequest, Product, UpdateProductRequest};

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;
pub const PRICE_MIN: f64 = 0.01;
pub const PRICE_MAX: f64 = 999_999.99;

/// A violated validation rule, tied to the field it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Raw text input for a product form, as typed by the operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub price: String,
}

impl ProductInput {
    /// Render a loaded product back into input text, the baseline an edit
    /// session diffs against.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: format!("{:.2}", product.price),
        }
    }

    /// Check every rule and either produce the request shape or the full
    /// list of violations, each with its own message.
    pub fn validate(&self) -> Result<CreateProductRequest, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError {
                field: "name",
                message: "Name is required".to_string(),
            });
        } else if name.chars().count() < NAME_MIN_LEN {
            errors.push(FieldError {
                field: "name",
                message: format!("Name must be at least {} characters", NAME_MIN_LEN),
            });
        } else if name.chars().count() > NAME_MAX_LEN {
            errors.push(FieldError {
                field: "name",
                message: format!("Name must be at most {} characters", NAME_MAX_LEN),
            });
        }

        let price_text = self.price.trim();
        if price_text.is_empty() {
            errors.push(FieldError {
                field: "price",
                message: "Price is required".to_string(),
            });
        } else {
            match price_text.parse::<f64>() {
                Ok(price) if price < PRICE_MIN => errors.push(FieldError {
                    field: "price",
                    message: format!("Price must be at least {}", PRICE_MIN),
                }),
                Ok(price) if price > PRICE_MAX => errors.push(FieldError {
                    field: "price",
                    message: format!("Price must be at most {}", PRICE_MAX),
                }),
                Ok(_) => {}
                Err(_) => errors.push(FieldError {
                    field: "price",
                    message: "Price must be a number".to_string(),
                }),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(CreateProductRequest {
            name: name.to_string(),
            price: price_text.parse().unwrap_or_default(),
        })
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// The fields tracked by an edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Price,
}

const TRACKED_FIELDS: [Field; 2] = [Field::Name, Field::Price];

/// One edit-form session: the baseline snapshotted when the entity loaded,
/// and the current input the operator is typing over it.
///
/// The baseline is an owned copy, never a live reference, so a store reload
/// mid-edit cannot shift what "changed" means.
#[derive(Debug, Clone)]
pub struct EditSession {
    product_id: u64,
    baseline: ProductInput,
    pub current: ProductInput,
}

impl EditSession {
    pub fn new(product: &Product) -> Self {
        let baseline = ProductInput::from_product(product);
        Self {
            product_id: product.id,
            baseline,
            current: ProductInput::from_product(product),
        }
    }

    pub fn product_id(&self) -> u64 {
        self.product_id
    }

    pub fn baseline(&self) -> &ProductInput {
        &self.baseline
    }

    /// Strict inequality against the baseline value for one field.
    pub fn has_field_changed(&self, field: Field) -> bool {
        match field {
            Field::Name => self.current.name != self.baseline.name,
            Field::Price => self.current.price != self.baseline.price,
        }
    }

    pub fn has_any_changes(&self) -> bool {
        TRACKED_FIELDS.iter().any(|f| self.has_field_changed(*f))
    }

    /// Names of the fields that differ from the baseline.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.has_field_changed(Field::Name) {
            changed.push("name");
        }
        if self.has_field_changed(Field::Price) {
            changed.push("price");
        }
        changed
    }

    /// Discard edits, restoring the input to the loaded baseline.
    pub fn reset(&mut self) {
        self.current = self.baseline.clone();
    }

    /// Submission is permitted only for valid input with at least one dirty
    /// field; a clean form would be a no-op update call.
    pub fn can_submit(&self) -> bool {
        self.has_any_changes() && self.current.is_valid()
    }

    /// Build the partial update carrying only the dirty fields.
    ///
    /// Returns the violations instead if the current input is invalid, and
    /// an empty request when nothing changed (callers gate on
    /// [`can_submit`](Self::can_submit) first).
    pub fn to_update_request(&self) -> Result<UpdateProductRequest, Vec<FieldError>> {
        let validated = self.current.validate()?;
        let mut req = UpdateProductRequest::default();
        if self.has_field_changed(Field::Name) {
            req.name = Some(validated.name);
        }
        if self.has_field_changed(Field::Price) {
            req.price = Some(validated.price);
        }
        Ok(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: u64, name: &str, price: f64) -> Product {
        Product {
            id,
            name: name.to_string(),
            price,
            created_at: None,
            updated_at: None,
        }
    }

    fn input(name: &str, price: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            price: price.to_string(),
        }
    }

    fn messages_for(input: &ProductInput, field: &str) -> Vec<String> {
        match input.validate() {
            Ok(_) => Vec::new(),
            Err(errors) => errors
                .into_iter()
                .filter(|e| e.field == field)
                .map(|e| e.message)
                .collect(),
        }
    }

    #[test]
    fn test_valid_input_passes_and_trims_name() {
        let req = input("  Blue Mug  ", "12.50").validate().unwrap();
        assert_eq!(req.name, "Blue Mug");
        assert_eq!(req.price, 12.5);
    }

    #[test]
    fn test_name_length_boundaries() {
        assert!(input(&"x".repeat(2), "1.00").is_valid());
        assert!(input(&"x".repeat(100), "1.00").is_valid());

        let too_short = messages_for(&input("x", "1.00"), "name");
        assert_eq!(too_short, vec!["Name must be at least 2 characters"]);

        let too_long = messages_for(&input(&"x".repeat(101), "1.00"), "name");
        assert_eq!(too_long, vec!["Name must be at most 100 characters"]);

        let missing = messages_for(&input("   ", "1.00"), "name");
        assert_eq!(missing, vec!["Name is required"]);
    }

    #[test]
    fn test_price_boundaries() {
        assert!(input("Mug", "0.01").is_valid());
        assert!(input("Mug", "999999.99").is_valid());

        let too_low = messages_for(&input("Mug", "0.009"), "price");
        assert_eq!(too_low, vec!["Price must be at least 0.01"]);

        let too_high = messages_for(&input("Mug", "1000000"), "price");
        assert_eq!(too_high, vec!["Price must be at most 999999.99"]);

        let not_a_number = messages_for(&input("Mug", "cheap"), "price");
        assert_eq!(not_a_number, vec!["Price must be a number"]);

        let missing = messages_for(&input("Mug", ""), "price");
        assert_eq!(missing, vec!["Price is required"]);
    }

    #[test]
    fn test_all_violations_reported_together() {
        let errors = input("", "").validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.field == "name"));
        assert!(errors.iter().any(|e| e.field == "price"));
    }

    #[test]
    fn test_session_is_clean_after_populate() {
        let session = EditSession::new(&product(1, "Mug", 12.5));
        assert!(!session.has_any_changes());
        assert!(!session.has_field_changed(Field::Name));
        assert!(!session.has_field_changed(Field::Price));
        assert!(!session.can_submit());
        assert!(session.changed_fields().is_empty());
    }

    #[test]
    fn test_dirty_iff_field_differs_from_baseline() {
        let mut session = EditSession::new(&product(1, "Mug", 12.5));
        session.current.name = "Mug XL".to_string();
        assert!(session.has_field_changed(Field::Name));
        assert!(!session.has_field_changed(Field::Price));
        assert!(session.has_any_changes());
        assert_eq!(session.changed_fields(), vec!["name"]);

        // Typing the original value back makes the field clean again.
        session.current.name = "Mug".to_string();
        assert!(!session.has_any_changes());
    }

    #[test]
    fn test_reset_restores_baseline() {
        let mut session = EditSession::new(&product(1, "Mug", 12.5));
        session.current = input("Other", "1.00");
        session.reset();
        assert!(!session.has_any_changes());
        assert_eq!(session.current.name, "Mug");
    }

    #[test]
    fn test_submit_gating() {
        let mut session = EditSession::new(&product(1, "Mug", 12.5));
        // Dirty but invalid: blocked.
        session.current.price = "free".to_string();
        assert!(session.has_any_changes());
        assert!(!session.can_submit());
        // Dirty and valid: allowed.
        session.current.price = "19.99".to_string();
        assert!(session.can_submit());
    }

    #[test]
    fn test_update_request_carries_only_dirty_fields() {
        let mut session = EditSession::new(&product(1, "Mug", 12.5));
        session.current.price = "19.99".to_string();
        let req = session.to_update_request().unwrap();
        assert_eq!(req.name, None);
        assert_eq!(req.price, Some(19.99));
    }

    #[test]
    fn test_baseline_survives_entity_changes() {
        let loaded = product(1, "Mug", 12.5);
        let session = EditSession::new(&loaded);
        drop(loaded);
        assert_eq!(session.baseline().name, "Mug");
        assert_eq!(session.baseline().price, "12.50");
    }
}
