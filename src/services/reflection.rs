//! Reflection (Feynman notes) route building

/// Reference to the reflection flow, deep-linked to a session when one was recorded
pub fn reflection_url(base: &str, session_id: Option<&str>) -> String {
    let base = if base.trim().is_empty() { "/reflection" } else { base.trim() };
    match session_id.filter(|id| !id.is_empty()) {
        Some(id) => {
            let separator = if base.contains('?') { '&' } else { '?' };
            format!("{}{}session_id={}", base, separator, urlencoding::encode(id))
        }
        None => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflection_url_with_session() {
        assert_eq!(reflection_url("/reflection", Some("42")), "/reflection?session_id=42");
        assert_eq!(
            reflection_url("http://localhost/notes?tab=new", Some("42")),
            "http://localhost/notes?tab=new&session_id=42"
        );
    }

    #[test]
    fn test_reflection_url_without_session() {
        assert_eq!(reflection_url("/reflection", None), "/reflection");
        assert_eq!(reflection_url("", Some("")), "/reflection");
    }

    #[test]
    fn test_session_id_is_encoded() {
        assert_eq!(reflection_url("/r", Some("a b&c")), "/r?session_id=a%20b%26c");
    }
}
