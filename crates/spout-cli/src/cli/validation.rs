/// Parse a git branch or remote name.
///
/// Rejects the forms git itself refuses for ref components: empty names,
/// whitespace, a leading `-` or `.`, `..`, a trailing `/` or `.lock`, and
/// the characters `~^:?*[\`.
///
/// # Errors
///
/// Returns an error message naming the offending input.
pub fn parse_ref_name(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if s.starts_with('-') || s.starts_with('.') {
        return Err(format!("Name cannot start with '-' or '.': '{}'", s));
    }
    if s.ends_with('/') || s.ends_with(".lock") {
        return Err(format!("Name cannot end with '/' or '.lock': '{}'", s));
    }
    if s.contains("..") || s.contains("@{") {
        return Err(format!("Name cannot contain '..' or '@{{': '{}'", s));
    }
    if let Some(c) = s
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(*c))
    {
        return Err(format!("Name contains invalid character {:?}: '{}'", c, s));
    }
    Ok(s.to_string())
}

/// Parse the dev server host. Only a bare host name or IP is accepted.
pub fn parse_host(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Host cannot be empty".to_string());
    }
    if s.contains("://") || s.contains('/') {
        return Err(format!("Host must not include a scheme or path: '{}'", s));
    }
    Ok(s.to_string())
}
