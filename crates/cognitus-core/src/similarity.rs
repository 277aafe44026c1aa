//! Ratio-based string similarity.
//!
//! [`ratio`] scores two strings from 0 to 100 using the normalized Indel
//! distance (insertions and deletions only):
//!
//! ```text
//! ratio(a, b) = round(100 × 2·LCS(a, b) / (|a| + |b|))
//! ```
//!
//! where `LCS` is the length of the longest common subsequence and lengths
//! are counted in Unicode scalar values. Rounding is half-to-even and done
//! in integer arithmetic, so the same inputs always produce the same score
//! on every platform.
//!
//! # Properties
//!
//! - Symmetric: `ratio(a, b) == ratio(b, a)`.
//! - `ratio(a, a) == 100`, including for two empty strings.
//! - `ratio(a, "") == 0` for non-empty `a`.

/// Similarity score in `0..=100`; `100` means identical.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = (a.len() + b.len()) as u64;
    if total == 0 {
        return 100;
    }

    let lcs = lcs_len(&a, &b) as u64;
    round_half_even(200 * lcs, total) as u8
}

/// Length of the longest common subsequence, two-row dynamic programming.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; short.len() + 1];
    let mut curr = vec![0usize; short.len() + 1];
    for &lc in long {
        for (j, &sc) in short.iter().enumerate() {
            curr[j + 1] = if lc == sc {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[short.len()]
}

fn round_half_even(numerator: u64, denominator: u64) -> u64 {
    let quotient = numerator / denominator;
    let twice_remainder = 2 * (numerator % denominator);
    if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical() {
        let s = "The mitochondria is the powerhouse of the cell";
        assert_eq!(ratio(s, s), 100);
        assert_eq!(ratio("", ""), 100);
    }

    #[test]
    fn test_disjoint_and_empty() {
        assert_eq!(ratio("abc", "xyz"), 0);
        assert_eq!(ratio("abc", ""), 0);
        assert_eq!(ratio("", "abc"), 0);
    }

    #[test]
    fn test_known_values() {
        assert_eq!(ratio("abcd", "abce"), 75);
        assert_eq!(ratio("this is a test", "this is a test!"), 97);
        assert_eq!(ratio("kitten", "sitting"), 62);
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            ("What is DNA", "What is RNA exactly"),
            ("photosynthesis", "synthesis of photos"),
            ("a", "abcdefghijklmno"),
        ];
        for (a, b) in pairs {
            assert_eq!(ratio(a, b), ratio(b, a), "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn test_rounds_half_to_even() {
        // 200 / 16 = 12.5
        assert_eq!(ratio("a", "abcdefghijklmno"), 12);
        // 200 / 3 = 66.67
        assert_eq!(ratio("ab", "a"), 67);
    }

    #[test]
    fn test_case_sensitive() {
        assert!(ratio("Cell", "cell") < 100);
    }

    #[test]
    fn test_near_duplicate_crosses_threshold() {
        let stored = "What is the powerhouse of the cell The mitochondria";
        let candidate = "What is the powerhouse of a cell The mitochondria";
        assert!(ratio(stored, candidate) >= 90);
    }
}
