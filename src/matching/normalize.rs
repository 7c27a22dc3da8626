use std::sync::LazyLock;

use regex::Regex;

static PARENTHESIZED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").unwrap());
static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]").unwrap());
static FEAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bfeat\b").unwrap());
static FT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bft\b").unwrap());

/// Canonicalize a track, artist or album name for comparison.
///
/// Steps, in order:
/// - lowercase
/// - drop every `( ... )` group, parentheses included
/// - drop anything that is not a letter, number or whitespace
/// - `feat` becomes `ft`, then standalone `ft` tokens are dropped
/// - collapse whitespace and trim
///
/// Total and idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(name: &str) -> String {
    let lower = name.to_lowercase();
    let without_parens = PARENTHESIZED.replace_all(&lower, "");
    let alphanumeric = NON_ALPHANUMERIC.replace_all(&without_parens, "");
    let feat_to_ft = FEAT.replace_all(&alphanumeric, "ft");
    let without_ft = FT.replace_all(&feat_to_ft, "");

    without_ft.split_whitespace().collect::<Vec<_>>().join(" ")
}
