//! Request field validation
//!
//! Shape checks for onboarding and transaction inputs. Each returns the
//! offending field name so the API can report it.

use chrono::{NaiveDate, Utc};

use super::DomainError;

/// Longest free-text field (names, asset name)
pub const MAX_TEXT_LEN: usize = 100;

/// Free-mail providers not accepted for registration
const BLACKLISTED_EMAIL_DOMAINS: &[&str] = &[
    "outlook", "hotmail", "aol", "live", "inbox", "icloud", "mail", "gmx", "yandex",
];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// NIK (national identity number): exactly 16 ASCII digits
pub fn validate_nik(nik: &str) -> Result<(), DomainError> {
    if nik.len() != 16 || !nik.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::validation("nik", "must be exactly 16 digits"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| DomainError::validation("email", "must be a valid email address"))?;

    let well_formed = !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace);
    if !well_formed {
        return Err(DomainError::validation("email", "must be a valid email address"));
    }

    let provider = domain.split('.').next().unwrap_or_default().to_lowercase();
    if BLACKLISTED_EMAIL_DOMAINS.contains(&provider.as_str()) {
        return Err(DomainError::validation("email", "email provider is not allowed"));
    }

    Ok(())
}

/// At least 8 characters with an uppercase letter, a lowercase letter and a digit
pub fn validate_password(password: &str) -> Result<(), DomainError> {
    let strong = password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit());

    if !strong {
        return Err(DomainError::validation(
            "password",
            "must be at least 8 characters with upper case, lower case and a digit",
        ));
    }
    Ok(())
}

/// Non-blank text of letters, digits, spaces and light punctuation
pub fn validate_text(field: &'static str, value: &str) -> Result<(), DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "is required"));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(DomainError::validation(
            field,
            format!("must be at most {} characters", MAX_TEXT_LEN),
        ));
    }
    let allowed = |c: char| c.is_alphanumeric() || c == ' ' || ".,'-/()&".contains(c);
    if !value.chars().all(allowed) {
        return Err(DomainError::validation(field, "contains invalid characters"));
    }
    Ok(())
}

/// `YYYY-MM-DD`, strictly in the past
pub fn parse_birth_date(value: &str) -> Result<NaiveDate, DomainError> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| DomainError::validation("birth_date", "must be formatted as YYYY-MM-DD"))?;

    if date >= Utc::now().date_naive() {
        return Err(DomainError::validation("birth_date", "must be in the past"));
    }
    Ok(date)
}

/// Relative or absolute path ending in an image extension
pub fn validate_photo_path(field: &'static str, path: &str) -> Result<(), DomainError> {
    if path.trim().is_empty() || path.chars().any(char::is_whitespace) || path.contains("..") {
        return Err(DomainError::validation(field, "must be a valid file path"));
    }

    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(DomainError::validation(field, "must point to a jpg or png image"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nik() {
        assert!(validate_nik("3201123456780001").is_ok());
        assert!(validate_nik("320112345678000").is_err());
        assert!(validate_nik("32011234567800AB").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("budi@gmail.com").is_ok());
        assert!(validate_email("budi@company.co.id").is_ok());
        assert!(validate_email("budi.gmail.com").is_err());
        assert!(validate_email("@gmail.com").is_err());
        assert!(validate_email("budi@localhost").is_err());
    }

    #[test]
    fn test_email_blacklist() {
        let err = validate_email("budi@hotmail.com").unwrap_err();
        assert!(err.to_string().contains("not allowed"));
        assert!(validate_email("budi@Yandex.ru").is_err());
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password("Secret123").is_ok());
        assert!(validate_password("secret123").is_err());
        assert!(validate_password("SECRET123").is_err());
        assert!(validate_password("SecretPwd").is_err());
        assert!(validate_password("Sec123").is_err());
    }

    #[test]
    fn test_text() {
        assert!(validate_text("full_name", "Budi Santoso").is_ok());
        assert!(validate_text("asset_name", "Yamaha NMAX 155 (2024)").is_ok());
        assert!(validate_text("full_name", "   ").is_err());
        assert!(validate_text("full_name", "<script>").is_err());
        assert!(validate_text("full_name", &"a".repeat(MAX_TEXT_LEN + 1)).is_err());
    }

    #[test]
    fn test_birth_date() {
        assert_eq!(
            parse_birth_date("1990-01-31").unwrap(),
            NaiveDate::from_ymd_opt(1990, 1, 31).unwrap()
        );
        assert!(parse_birth_date("31-01-1990").is_err());
        assert!(parse_birth_date("2999-01-01").is_err());
    }

    #[test]
    fn test_photo_path() {
        assert!(validate_photo_path("ktp_photo_path", "/storage/ktp/budi.jpg").is_ok());
        assert!(validate_photo_path("ktp_photo_path", "selfie.PNG").is_ok());
        assert!(validate_photo_path("ktp_photo_path", "ktp.pdf").is_err());
        assert!(validate_photo_path("ktp_photo_path", "../etc/passwd.png").is_err());
        assert!(validate_photo_path("ktp_photo_path", "").is_err());
    }
}
