use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

pub fn validate_email(email: &str) -> AppResult<()> {
    if !EMAIL_REGEX.is_match(email) {
        return Err(AppError::ValidationError("Email inválido".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("maria@exemplo.com.br").is_ok());
        assert!(validate_email("joao@plantas.com").is_ok());
        assert!(validate_email("sem-arroba.com").is_err());
        assert!(validate_email("dois@@exemplo.com").is_err());
        assert!(validate_email("sem@dominio").is_err());
        assert!(validate_email("").is_err());
    }
}
