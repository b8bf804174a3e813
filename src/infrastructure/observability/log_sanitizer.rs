const MAX_VISIBLE_CHARS: usize = 500;

const SECRET_MARKERS: [&str; 5] = [
    "api_key=",
    "api_secret=",
    "signature=",
    "\"api_key\":",
    "xi-api-key:",
];

/// Shortens an upstream response body for logging and masks credentials echoed back in it.
pub fn sanitize_upstream_body(body: &str) -> String {
    let trimmed = body.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let total_chars = trimmed.chars().count();
    let visible = if total_chars > MAX_VISIBLE_CHARS {
        let cut: String = trimmed.chars().take(MAX_VISIBLE_CHARS).collect();
        format!("{}... ({} chars total)", cut, total_chars)
    } else {
        trimmed.to_string()
    };

    SECRET_MARKERS
        .iter()
        .fold(visible, |text, marker| redact_after(&text, marker))
}

fn redact_after(text: &str, marker: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(idx) = rest.find(marker) {
        let value_start = idx + marker.len();
        result.push_str(&rest[..value_start]);
        result.push_str("[REDACTED]");

        let value = rest[value_start..].trim_start_matches([' ', '"']);
        let skipped = rest.len() - value_start - value.len();
        let end = value
            .find(|c: char| c.is_whitespace() || matches!(c, '&' | '"' | '\'' | ',' | '}'))
            .unwrap_or(value.len());
        rest = &rest[value_start + skipped + end..];
    }

    result.push_str(rest);
    result
}
