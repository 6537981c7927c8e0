//! Authentication and validation logic tests.

use proptest::prelude::*;

use shared::models::UserRole;
use shared::validation::{validate_email, validate_entity_code, validate_password, validate_sku};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("ops@example.com").is_ok());
        assert!(validate_email("first.last@sub.domain.co").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@domain").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_password_minimum_length() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_entity_codes() {
        assert!(validate_entity_code("ACME").is_ok());
        assert!(validate_entity_code("WH-01").is_ok());
        assert!(validate_entity_code("a").is_err()); // too short, lowercase
        assert!(validate_entity_code("TOOLONGCODE1").is_err());
    }

    #[test]
    fn test_skus() {
        assert!(validate_sku("SKU-1001").is_ok());
        assert!(validate_sku("AB").is_err());
        assert!(validate_sku("lower-case").is_err());
    }

    #[test]
    fn test_default_role_is_operator() {
        assert_eq!(UserRole::default(), UserRole::Operator);
    }

    #[test]
    fn test_role_round_trip() {
        for role in [
            UserRole::Admin,
            UserRole::Manager,
            UserRole::Operator,
            UserRole::Viewer,
        ] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert!("SUPERUSER".parse::<UserRole>().is_err());
        assert!("admin".parse::<UserRole>().is_err());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any password at or above the minimum length passes
    #[test]
    fn prop_long_passwords_accepted(password in "[a-zA-Z0-9!@#]{8,64}") {
        prop_assert!(validate_password(&password).is_ok());
    }

    /// Short passwords never pass
    #[test]
    fn prop_short_passwords_rejected(password in "[a-zA-Z0-9]{0,7}") {
        prop_assert!(validate_password(&password).is_err());
    }

    /// Well-formed codes in the allowed alphabet and length pass
    #[test]
    fn prop_valid_codes_accepted(code in "[A-Z0-9][A-Z0-9-]{1,9}") {
        prop_assert!(validate_entity_code(&code).is_ok());
    }

    /// Emails without an @ never pass
    #[test]
    fn prop_email_requires_at_sign(s in "[a-z0-9.]{1,30}") {
        prop_assert!(validate_email(&s).is_err());
    }
}
