use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate text to a display width, appending `...` when cut.
///
/// # Examples
/// ```
/// use insights_core::utils::text::truncate_text;
/// assert_eq!(truncate_text("Hello World!", 8), "Hello...");
/// ```
pub fn truncate_text(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    const ELLIPSIS: &str = "...";
    let ellipsis_width = ELLIPSIS.width();

    if max_width <= ellipsis_width {
        return ELLIPSIS[..max_width].to_string();
    }

    let target_width = max_width - ellipsis_width;
    let mut result = String::new();
    let mut current_width = 0;

    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if current_width + ch_width > target_width {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }

    result.push_str(ELLIPSIS);
    result
}

/// Format an integer with thousands separators.
///
/// # Examples
/// ```
/// use insights_core::utils::text::format_number;
/// assert_eq!(format_number(6846370), "6,846,370");
/// ```
pub fn format_number(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Compact notation for large values: `6.8M`, `1.2K`, plain below a thousand.
pub fn format_compact_number(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else if value.fract() == 0.0 && value >= 0.0 {
        format_number(value as u64)
    } else {
        format!("{:.1}", value)
    }
}

/// Ratio to percentage with one decimal; `N/A` when the ratio is unknown.
pub fn format_percentage(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{:.1}%", r * 100.0),
        None => "N/A".to_string(),
    }
}

/// Upper-case the first character (chart labels arrive lower-case).
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
