//! Text helpers

/// Borrow at most the first `max_chars` characters of `s`.
///
/// Counts Unicode scalar values, so a multi-byte character is never split.
pub fn leading_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_chars_shorter_than_limit() {
        assert_eq!(leading_chars("abc", 10), "abc");
        assert_eq!(leading_chars("", 10), "");
    }

    #[test]
    fn test_leading_chars_exact_limit() {
        assert_eq!(leading_chars("abcdef", 3), "abc");
        assert_eq!(leading_chars("abc", 3), "abc");
    }

    #[test]
    fn test_leading_chars_multibyte() {
        let jawi = "بسم الله";
        assert_eq!(leading_chars(jawi, 3), "بسم");
        assert_eq!(leading_chars("ééé", 2), "éé");
    }
}
