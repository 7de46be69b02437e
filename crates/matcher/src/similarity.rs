//! Normalized text similarity used by the material matcher.

use strsim::normalized_levenshtein;

/// Shortest substring that counts as a match. Queries below this length
/// only ever match by full-string equality.
pub const MIN_MATCH_LEN: usize = 3;

/// Similarity between a query and one candidate field, in [0, 1].
///
/// Combines normalized edit distance with substring containment so that
/// "Concrete" scores well against "Portland Cement Concrete" even though
/// the edit distance between the full strings is large. Tokens shorter
/// than [`MIN_MATCH_LEN`] are ignored to avoid spurious matches on "of",
/// "mm" and the like.
pub fn field_similarity(query: &str, field: &str) -> f64 {
    let query = query.trim().to_lowercase();
    let field = field.trim().to_lowercase();

    if query.is_empty() || field.is_empty() {
        return 0.0;
    }
    if query == field {
        return 1.0;
    }
    if query.chars().count() < MIN_MATCH_LEN {
        return 0.0;
    }

    let edit = normalized_levenshtein(&query, &field);
    let containment = containment_score(&query, &field);

    edit.max(containment)
}

/// Containment score: the better of full-string containment (weighted by
/// length ratio) and per-token coverage.
fn containment_score(query: &str, field: &str) -> f64 {
    let q_len = query.chars().count();
    let f_len = field.chars().count();

    let full = if field.contains(query) || query.contains(field) {
        let (short, long) = if q_len <= f_len {
            (q_len, f_len)
        } else {
            (f_len, q_len)
        };
        short as f64 / long as f64
    } else {
        0.0
    };

    full.max(token_coverage(query, field))
}

/// Fraction of query characters (in tokens of at least [`MIN_MATCH_LEN`])
/// found as whole tokens or substrings of the field.
fn token_coverage(query: &str, field: &str) -> f64 {
    let tokens: Vec<&str> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_MATCH_LEN)
        .collect();

    if tokens.is_empty() {
        return 0.0;
    }

    let total: usize = tokens.iter().map(|t| t.chars().count()).sum();
    let matched: usize = tokens
        .iter()
        .filter(|t| field.contains(**t))
        .map(|t| t.chars().count())
        .sum();

    // Coverage alone would rate a one-token hit against a long name too
    // highly, so scale by how much of the field the tokens account for.
    let coverage = matched as f64 / total as f64;
    let field_len = field.chars().count();
    let ratio = (matched as f64 / field_len as f64).min(1.0);

    coverage * ratio.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(field_similarity("Concrete", "concrete"), 1.0);
    }

    #[test]
    fn empty_inputs_score_zero() {
        assert_eq!(field_similarity("", "Concrete"), 0.0);
        assert_eq!(field_similarity("Concrete", ""), 0.0);
    }

    #[test]
    fn short_queries_require_equality() {
        // Two characters: below the minimum matched substring length.
        assert_eq!(field_similarity("C3", "C30/37 Concrete"), 0.0);
        assert_eq!(field_similarity("c3", "C3"), 1.0);
    }

    #[test]
    fn substring_scores_by_length_ratio() {
        let score = field_similarity("Concrete", "Portland Cement Concrete");
        assert!(score > 0.2, "got {score}");
        assert!(score < 1.0);
    }

    #[test]
    fn similarity_is_monotonic_in_closeness() {
        let near = field_similarity("Steel Beam", "Steel Beams");
        let far = field_similarity("Steel Beam", "Timber Joist");
        assert!(near > far);
        assert!(near > 0.8);
    }

    #[test]
    fn token_coverage_ignores_short_tokens() {
        // "of" never contributes; "wool" does.
        let score = field_similarity("wool of sheep", "Mineral Wool Insulation");
        assert!(score > 0.0);
    }
}
