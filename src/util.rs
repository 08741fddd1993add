use uuid::Uuid;

/// Length of generated file and result ids.
pub const SHORT_ID_LEN: usize = 8;

/// Generate a short random token used for file ids and result ids.
pub fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHORT_ID_LEN);
    id
}

/// Pseudo-user identifier sent with each workflow run.
pub fn pseudo_user(prefix: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    if prefix.is_empty() {
        token
    } else {
        format!("{}-{}", prefix, token)
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }

    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }

    if max <= 3 {
        return s.chars().take(max).collect();
    }

    let truncated: String = s.chars().take(max - 3).collect();
    format!("{}...", truncated)
}

#[cfg(test)]
mod tests {
    use super::{pseudo_user, short_id, truncate, SHORT_ID_LEN};

    #[test]
    fn test_truncate_unicode_safe() {
        let input = "ééééé";
        assert_eq!(truncate(input, 4), "é...");
    }

    #[test]
    fn test_truncate_small_max() {
        let input = "こんにちは";
        assert_eq!(truncate(input, 3), "こんに");
        assert_eq!(truncate(input, 0), "");
    }

    #[test]
    fn test_short_id_shape() {
        let a = short_id();
        let b = short_id();
        assert_eq!(a.len(), SHORT_ID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_uppercase()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_pseudo_user_prefix() {
        assert!(pseudo_user("tui").starts_with("tui-"));
        assert!(!pseudo_user("").contains('-'));
    }
}
