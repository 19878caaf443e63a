//! Input validation functions
//!
//! Registration field rules shared by the backend service layer and any
//! client-side form validation.

/// Validate an Iranian mobile number: 09 followed by nine digits
pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone.is_empty() {
        return Err("Phone number cannot be empty".to_string());
    }
    let phone_regex = regex_lite::Regex::new(r"^09\d{9}$").unwrap();
    if !phone_regex.is_match(phone) {
        return Err("Phone number must match the format 09xxxxxxxxx".to_string());
    }
    Ok(())
}

/// Validate a username: letters, digits and underscore only
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }
    if username.len() > 50 {
        return Err("Username too long".to_string());
    }
    let username_regex = regex_lite::Regex::new(r"^[a-zA-Z0-9_]+$").unwrap();
    if !username_regex.is_match(username) {
        return Err("Username may only contain letters, digits and _".to_string());
    }
    Ok(())
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 6 {
        return Err("Password must be at least 6 characters".to_string());
    }
    if password.len() > 128 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if name.len() > 100 {
        return Err("Name too long".to_string());
    }
    Ok(())
}
