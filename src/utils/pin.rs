/// Check-in PINs are exactly 4 numeric digits. Partial keypad entry never
/// reaches the backend; anything else here is a caller bug.
pub fn is_valid_pin(pin: &str) -> bool {
    pin.len() == 4 && pin.bytes().all(|b| b.is_ascii_digit())
}

/// Derive the default PIN from a contact number: strip everything that is
/// not a digit and take the last 4. Returns `None` when fewer than 4 digits
/// remain.
pub fn pin_from_contact(contact: &str) -> Option<String> {
    let digits: String = contact.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return None;
    }
    Some(digits[digits.len() - 4..].to_string())
}
