pub mod job;
pub mod profile;

/// Collapses empty and whitespace-only text columns to `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank_drops_whitespace() {
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(
            non_blank(Some("Milano".to_string())),
            Some("Milano".to_string())
        );
    }
}
