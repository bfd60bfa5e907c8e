/// North American numbers as `(XXX) XXX-XXXX`. Anything else, including
/// the "No phone provided" placeholder, is shown as stored.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let local = match digits.len() {
        10 => digits.as_str(),
        11 => match digits.strip_prefix('1') {
            Some(rest) => rest,
            None => return phone.to_string(),
        },
        _ => return phone.to_string(),
    };
    let (area, rest) = local.split_at(3);
    let (exchange, line) = rest.split_at(3);
    format!("({}) {}-{}", area, exchange, line)
}

const ELLIPSIS: &str = "...";

/// Fit a table cell to `width` characters, marking the cut with an ellipsis
pub fn truncate_string(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    match width.checked_sub(ELLIPSIS.len()).filter(|&keep| keep > 0) {
        Some(keep) => s.chars().take(keep).chain(ELLIPSIS.chars()).collect(),
        None => s.chars().take(width).collect(),
    }
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if let Ok(d) =
        chrono::NaiveDate::parse_from_str(date.get(..10).unwrap_or(date), "%Y-%m-%d")
    {
        d.format("%b %d, %Y").to_string()
    } else {
        date.to_string()
    }
}

/// Whole-dollar amount with thousands separators
pub fn format_dollars(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if whole < 0 {
        format!("-${}", out)
    } else {
        format!("${}", out)
    }
}
