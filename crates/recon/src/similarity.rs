//! Token-order tolerant fuzzy similarity between canonical descriptions.
//!
//! Tokens are sorted before comparison, so word order never matters. The ratio is
//! the Indel-normalized similarity `2·LCS / (|a| + |b|)`, scaled to 0–100 and
//! rounded half up.

/// Similarity score in `0..=100`.
///
/// Symmetric, 100 for identical inputs (including two empty strings), 0 when no
/// character is shared or exactly one side is empty. The single space joining
/// sorted tokens counts as a character, so two multi-word descriptions with no
/// word in common still score above 0 (`"AB CD"` vs `"EF GH"` is 20), well
/// below the probable threshold.
pub fn score(a: &str, b: &str) -> u8 {
    let a: Vec<char> = sorted_tokens(a).chars().collect();
    let b: Vec<char> = sorted_tokens(b).chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    if a == b {
        return 100;
    }

    let lcs = lcs_len(&a, &b);
    // round(200·lcs / total) without floats
    ((400 * lcs + total) / (2 * total)) as u8
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Longest common subsequence length, two-row DP.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    let mut prev = vec![0usize; short.len() + 1];
    let mut cur = vec![0usize; short.len() + 1];
    for &lc in long {
        for (j, &sc) in short.iter().enumerate() {
            cur[j + 1] = if lc == sc {
                prev[j] + 1
            } else {
                cur[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[short.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_is_100() {
        assert_eq!(score("PAGO PROVEEDOR A", "PAGO PROVEEDOR A"), 100);
        assert_eq!(score("", ""), 100);
    }

    #[test]
    fn disjoint_is_0() {
        assert_eq!(score("ABC", "XYZ"), 0);
        assert_eq!(score("ABC", ""), 0);
        assert_eq!(score("", "XYZ"), 0);
    }

    #[test]
    fn disjoint_words_share_only_the_separator() {
        // lcs is the one space: round(200 * 1 / 10)
        assert_eq!(score("AB CD", "EF GH"), 20);
        assert_eq!(score("AB", "EF GH"), 0);
    }

    #[test]
    fn word_order_ignored() {
        assert_eq!(score("PROVEEDOR PAGO", "PAGO PROVEEDOR"), 100);
    }

    #[test]
    fn suffix_variant_scores_high() {
        // "A PAGO PROVEEDOR" vs "A PAGO PROVEEDOR SA": lcs 16, total 35 → 91.4
        assert_eq!(score("PAGO PROVEEDOR A", "PAGO PROVEEDOR A SA"), 91);
    }

    #[test]
    fn typo_scores_between_tiers() {
        let s = score("TRANSFERENCIA RECIBIDA", "TRANSF RECIBIDA");
        assert!((70..90).contains(&s), "got {s}");
    }

    #[test]
    fn symmetric_examples() {
        let pairs = [
            ("COMPRA SUPERMERCADO", "SUPERMERCADO COMPRA 123"),
            ("DEBITO AUTOMATICO", "DEB AUT"),
            ("", "X"),
        ];
        for (a, b) in pairs {
            assert_eq!(score(a, b), score(b, a), "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn lcs_basic() {
        let a: Vec<char> = "ABCBDAB".chars().collect();
        let b: Vec<char> = "BDCABA".chars().collect();
        assert_eq!(lcs_len(&a, &b), 4);
    }
}
