use validator::ValidateEmail;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

/// Strips punctuation from a CPF/CNPJ and checks the digit count.
///
/// CPF has 11 digits, CNPJ has 14. Check digits are verified by the gateway.
pub fn normalize_cpf_cnpj(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let only_allowed = raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '/' | ' '));

    if only_allowed && matches!(digits.len(), 11 | 14) {
        Some(digits)
    } else {
        None
    }
}
