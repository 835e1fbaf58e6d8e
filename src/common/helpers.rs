// Helper functions for safe logging

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// let masked = safe_email_log("guide@example.com");
/// // Returns: "g***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.chars().count() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if let (2, Some(first)) = (parts.len(), parts[0].chars().next()) {
            return format!("{}***@{}", first, parts[1]);
        }
    }
    "***@***.***".to_string()
}

/// Masks session tokens for safe logging
/// Shows only first and last 4 characters
pub fn safe_token_log(token: &str) -> String {
    if token.len() > 8 && token.is_ascii() {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}

/// Splits a comma-separated env value into trimmed, non-empty entries
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
