//! Number formatting for document and context text.

/// Compact USD rendering: `$1.23B`, `$4.50M`, `$12.00K`, `$999.00`.
pub fn format_currency(value: f64) -> String {
    format_currency_with(value, 2)
}

pub fn format_currency_with(value: f64, decimals: usize) -> String {
    if value >= 1_000_000_000.0 {
        format!("${:.*}B", decimals, value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("${:.*}M", decimals, value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.*}K", decimals, value / 1_000.0)
    } else {
        format!("${:.*}", decimals, value)
    }
}

/// `3.14%`, or `N/A` when the value is missing.
pub fn format_percentage(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => "N/A".to_string(),
    }
}

/// Signed change: `+1.25%`, `-0.40%`, `N/A`.
pub fn format_change(value: Option<f64>) -> String {
    match value {
        Some(v) if v >= 0.0 => format!("+{:.2}%", v),
        Some(v) => format!("{:.2}%", v),
        None => "N/A".to_string(),
    }
}

/// Thousands-separated rendering with at most three fraction digits,
/// e.g. `1,000,000` or `1,234.5`.
pub fn format_grouped(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if value < 0.0 && (grouped != "0" || !frac.is_empty()) {
        "-"
    } else {
        ""
    };
    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}
