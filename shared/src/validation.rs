//! Validation utilities for the Supply Chain Management Platform

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate supplier/warehouse code format (2-10 uppercase alphanumeric, '-' allowed)
pub fn validate_entity_code(code: &str) -> Result<(), &'static str> {
    if code.len() < 2 {
        return Err("Code must be at least 2 characters");
    }
    if code.len() > 10 {
        return Err("Code must be at most 10 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("Code must be uppercase alphanumeric");
    }
    Ok(())
}

/// Validate SKU format (3-24 chars, uppercase alphanumeric plus '-')
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.len() < 3 || sku.len() > 24 {
        return Err("SKU must be 3-24 characters");
    }
    if !sku
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("SKU must be uppercase alphanumeric with dashes");
    }
    Ok(())
}

/// Validate a quantity used in an inventory operation
pub fn validate_positive_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("ops@example.com").is_ok());
        assert!(validate_email("user.name@domain.co").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@.").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_entity_code_valid() {
        assert!(validate_entity_code("ACME01").is_ok());
        assert!(validate_entity_code("RTM-01").is_ok());
        assert!(validate_entity_code("AB").is_ok());
    }

    #[test]
    fn test_validate_entity_code_invalid() {
        assert!(validate_entity_code("A").is_err()); // Too short
        assert!(validate_entity_code("ABCDEFGHIJK").is_err()); // Too long
        assert!(validate_entity_code("acme").is_err()); // Lowercase
        assert!(validate_entity_code("AC_ME").is_err()); // Underscore
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("WID-1042").is_ok());
        assert!(validate_sku("AB1").is_ok());
        assert!(validate_sku("ab-1042").is_err());
        assert!(validate_sku("AB").is_err());
        assert!(validate_sku("A-REALLY-REALLY-LONG-SKU-1").is_err());
    }

    #[test]
    fn test_validate_positive_quantity() {
        assert!(validate_positive_quantity(1).is_ok());
        assert!(validate_positive_quantity(0).is_err());
        assert!(validate_positive_quantity(-4).is_err());
    }
}
