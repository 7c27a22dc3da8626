//! Edit-distance based string similarity on a 0-100 scale.
//!
//! All functions are symmetric in their arguments and return 0 when either
//! side is empty.

use strsim::normalized_levenshtein;

/// Full-sequence similarity of two strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    normalized_levenshtein(a, b) * 100.0
}

/// Like [`ratio`] but insensitive to word order.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Best [`ratio`] of the shorter string against every same-length window of
/// the longer one, so "yesterday" scores 100 against "yesterday live".
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (shorter, longer) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    let needle: String = shorter.iter().collect();
    longer
        .windows(shorter.len())
        .map(|window| ratio(&needle, &window.iter().collect::<String>()))
        .fold(0.0, f64::max)
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_ratio_identical_and_empty() {
        assert!(approx_eq(ratio("yesterday", "yesterday"), 100.0));
        assert!(approx_eq(ratio("", "yesterday"), 0.0));
        assert!(approx_eq(ratio("", ""), 0.0));
    }

    #[test]
    fn test_ratio_partial_difference() {
        // One substitution out of five characters
        assert!(approx_eq(ratio("hello", "hallo"), 80.0));
        assert!(ratio("hello", "world") < 50.0);
    }

    #[test]
    fn test_token_sort_ignores_order() {
        assert!(approx_eq(
            token_sort_ratio("quick brown fox", "fox quick brown"),
            100.0
        ));
        assert!(ratio("quick brown fox", "fox quick brown") < 100.0);
    }

    #[test]
    fn test_partial_ratio_substring() {
        assert!(approx_eq(partial_ratio("yesterday", "yesterday live"), 100.0));
        assert!(approx_eq(partial_ratio("beatles", "the beatles"), 100.0));
        assert!(partial_ratio("abc", "xyz") < 1.0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("yesterday", "yesterday live"),
            ("the beatles", "beatles"),
            ("help", "anthology"),
            ("abcd", "dcba"),
            ("", "x"),
        ];
        for (a, b) in pairs {
            assert!(approx_eq(ratio(a, b), ratio(b, a)));
            assert!(approx_eq(token_sort_ratio(a, b), token_sort_ratio(b, a)));
            assert!(approx_eq(partial_ratio(a, b), partial_ratio(b, a)));
        }
    }

    #[test]
    fn test_bounds() {
        let words = ["", "a", "ab", "yesterday", "東京", "the long and winding road"];
        for a in words {
            for b in words {
                for score in [ratio(a, b), token_sort_ratio(a, b), partial_ratio(a, b)] {
                    assert!((0.0..=100.0).contains(&score), "{} out of range", score);
                }
            }
        }
    }
}
