use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::models::{Session, User};

/// Validates password complexity requirements
/// - 10-72 characters long
/// - Contains uppercase letter
/// - Contains lowercase letter
/// - Contains digit
/// - Contains special character
pub fn validate_password_complexity(password: &str) -> ApiResult<()> {
    let len = password.len();
    if len < 10 || len > 72 {
        return Err(ApiError::BadRequest(
            "Password must be 10-72 characters long".to_string(),
        ));
    }

    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_numeric());
    let has_special = password
        .chars()
        .any(|c| "!@#$%^&*()_+-=[]{}|;:,.<>?".contains(c));

    if !has_uppercase {
        return Err(ApiError::BadRequest(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }

    if !has_lowercase {
        return Err(ApiError::BadRequest(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }

    if !has_digit {
        return Err(ApiError::BadRequest(
            "Password must contain at least one digit".to_string(),
        ));
    }

    if !has_special {
        return Err(ApiError::BadRequest(
            "Password must contain at least one special character (!@#$%^&*()_+-=[]{}|;:,.<>?)"
                .to_string(),
        ));
    }

    Ok(())
}

/// Hash password using Argon2id with parameters:
/// - m_cost = 19456 KiB (19 MiB)
/// - t_cost = 2 iterations
/// - p_cost = 1 thread
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(19456) // 19 MiB
        .t_cost(2) // 2 iterations
        .p_cost(1) // 1 thread
        .build()
        .map_err(|_| ApiError::Internal("Failed to build Argon2 params".to_string()))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify password against Argon2id hash
pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| ApiError::Internal("Invalid password hash format".to_string()))?;

    let argon2 = Argon2::default();

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generate secure random token for sessions (32 bytes = 64 hex characters)
pub fn generate_session_token() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

pub fn validate_and_normalize_email(email: &str) -> ApiResult<String> {
    let trimmed = email.trim();

    if !email_address::EmailAddress::is_valid(trimmed) {
        return Err(ApiError::BadRequest(
            "Invalid email format. Must be in format user@domain.tld".to_string(),
        ));
    }

    // Additional validation: require a TLD (dot after @)
    if let Some(at_pos) = trimmed.find('@') {
        let domain_part = &trimmed[at_pos + 1..];
        if !domain_part.contains('.') {
            return Err(ApiError::BadRequest(
                "Invalid email format. Domain must include a TLD (e.g., .com, .org)".to_string(),
            ));
        }
    }

    // Normalize to lowercase for consistent storage
    Ok(trimmed.to_lowercase())
}

/// Result of a successful authentication
pub struct AuthResult {
    pub session: Session,
    pub user: User,
}

/// Authenticate a provider with email and password:
/// 1. Normalize/validate the email
/// 2. Find the provider account
/// 3. Verify the password
/// 4. Create a session
pub async fn authenticate(
    db: &Database,
    email: &str,
    password: &str,
    session_duration_hours: i64,
) -> ApiResult<AuthResult> {
    let email = validate_and_normalize_email(email)?;

    // Generic error for unknown accounts and bad passwords alike
    let user = db
        .get_user_by_email(&email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !verify_password(password, &user.password_hash)? {
        return Err(ApiError::Unauthorized);
    }

    let token = generate_session_token();
    let session = Session::new(user.id.clone(), token, session_duration_hours);
    db.create_session(&session).await?;

    Ok(AuthResult { session, user })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_too_short() {
        assert!(validate_password_complexity("Short1!").is_err());
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a".repeat(73) + "A1!";
        assert!(validate_password_complexity(&long_password).is_err());
    }

    #[test]
    fn test_password_no_uppercase() {
        assert!(validate_password_complexity("lowercase123!").is_err());
    }

    #[test]
    fn test_password_no_lowercase() {
        assert!(validate_password_complexity("UPPERCASE123!").is_err());
    }

    #[test]
    fn test_password_no_digit() {
        assert!(validate_password_complexity("Lowercase!").is_err());
    }

    #[test]
    fn test_password_no_special() {
        assert!(validate_password_complexity("Lowercase123").is_err());
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password_complexity("SecureP@ssw0rd").is_ok());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let password = "SecureP@ssw0rd123";
        let hash = hash_password(password).unwrap();

        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("WrongPassword1!", &hash).unwrap());
    }

    #[test]
    fn test_session_token_generation() {
        let token1 = generate_session_token();
        let token2 = generate_session_token();

        // 64 hex characters, unique per call
        assert_eq!(token1.len(), 64);
        assert_eq!(token2.len(), 64);
        assert_ne!(token1, token2);
        assert!(token1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_email_normalization() {
        let result = validate_and_normalize_email("  Test@Example.COM  ");
        assert_eq!(result.unwrap(), "test@example.com");
    }

    #[test]
    fn test_invalid_emails_rejected() {
        assert!(validate_and_normalize_email("testexample.com").is_err());
        assert!(validate_and_normalize_email("test@").is_err());
        assert!(validate_and_normalize_email("test@localhost").is_err());
    }
}
