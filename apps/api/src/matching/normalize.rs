/// Lowercases text for matching. No stemming, no stopword removal.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_only() {
        assert_eq!(normalize("Senior RUST Engineer, C++"), "senior rust engineer, c++");
    }

    #[test]
    fn test_normalize_keeps_whitespace_and_punctuation() {
        assert_eq!(normalize("  CI/CD\n"), "  ci/cd\n");
    }
}
