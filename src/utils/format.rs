/// Keep only the digits of a phone number.
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Device-handled dialer link: `tel:<digits>`.
pub fn dial_link(phone: &str) -> String {
    format!("tel:{}", phone_digits(phone))
}

/// WhatsApp deep link: `https://wa.me/<digits>?text=<url-encoded message>`.
/// Without a message the query string is omitted.
pub fn share_link(phone: &str, message: Option<&str>) -> String {
    let digits = phone_digits(phone);
    match message {
        Some(msg) if !msg.is_empty() => {
            format!("https://wa.me/{}?text={}", digits, urlencoding::encode(msg))
        }
        _ => format!("https://wa.me/{}", digits),
    }
}

/// Format a date string to a more readable form. Falls back to the raw
/// value (truncated to the date part) when it is not RFC 3339.
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 {
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dial_link_strips_non_digits() {
        assert_eq!(dial_link("+91 98765 43210"), "tel:919876543210");
        assert_eq!(dial_link("(555) 123-4567"), "tel:5551234567");
    }

    #[test]
    fn test_share_link_encodes_message() {
        assert_eq!(
            share_link("98765 43210", Some("2 BHK in HSR?")),
            "https://wa.me/9876543210?text=2%20BHK%20in%20HSR%3F"
        );
        assert_eq!(share_link("9876543210", None), "https://wa.me/9876543210");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-01-15T08:30:00+00:00"), "Jan 15, 2024");
        assert_eq!(format_date("2024-01-15T08:30"), "2024-01-15");
        assert_eq!(format_date("soon"), "soon");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
    }
}
