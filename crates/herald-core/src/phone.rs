//! Phone number normalization and chat addresses.

/// Minimum digit count for a usable phone number.
pub const MIN_PHONE_DIGITS: usize = 10;

/// Normalize a raw phone number to digits prefixed with `country_code`.
///
/// `0812…` becomes `62812…`, `812…` becomes `62812…`, numbers that
/// already carry the country code are kept. Returns `None` when no
/// digits remain.
pub fn normalize_phone(raw: &str, country_code: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }

    if !country_code.is_empty() && digits.starts_with(country_code) {
        Some(digits)
    } else if let Some(rest) = digits.strip_prefix('0') {
        Some(format!("{country_code}{rest}"))
    } else if digits.starts_with('8') {
        Some(format!("{country_code}{digits}"))
    } else {
        Some(digits)
    }
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() >= MIN_PHONE_DIGITS
}

/// Build the transport address for a phone number.
///
/// An input that already ends with `suffix` is returned unchanged.
pub fn chat_address(phone: &str, suffix: &str) -> String {
    let phone = phone.trim();
    if !suffix.is_empty() && phone.ends_with(suffix) {
        phone.to_string()
    } else {
        format!("{phone}{suffix}")
    }
}
