/// Format a user mention
pub fn mention_user(user_id: u64) -> String {
    format!("<@{}>", user_id)
}

/// Format a number with commas
pub fn format_number(n: i64) -> String {
    let s = n.unsigned_abs().to_string();
    let mut result = String::new();

    for (count, c) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    if n < 0 {
        result.push('-');
    }

    result.chars().rev().collect()
}

/// Truncate a string to at most `max_chars` characters, adding ellipsis if needed
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        s.chars().take(max_chars).collect()
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", truncated)
    }
}
