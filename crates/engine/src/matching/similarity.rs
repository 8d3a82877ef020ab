// ABOUTME: Narrow similarity-scoring interface and the default weighted edit-distance scorer.
// ABOUTME: Scores are integers in 0..=100; the concrete algorithm is swappable behind the trait.

use strsim::normalized_levenshtein;

/// Scores how similar two strings are, from 0 (unrelated) to 100 (identical).
pub trait Similarity {
    fn score(&self, a: &str, b: &str) -> u8;
}

/// Length ratio from which the partial (best window) ratio is considered.
const PARTIAL_RATIO_FROM: f64 = 1.5;
/// Length ratio from which partial matches are discounted more heavily.
const LONG_PARTIAL_FROM: f64 = 8.0;
const TOKEN_SCALE: f64 = 0.95;

/// Blend of full, token-sorted and partial edit-distance ratios.
///
/// Inputs are lowercased and stripped of punctuation first, so `"Director:"`
/// and `"director"` compare equal. When one side is much longer than the
/// other, the best-aligned window of the longer side is also scored, which
/// lets a short label match inside a `Label: value` fragment.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedRatio;

impl Similarity for WeightedRatio {
    fn score(&self, a: &str, b: &str) -> u8 {
        let a = preprocess(a);
        let b = preprocess(b);
        if a.is_empty() || b.is_empty() {
            return 0;
        }

        let base = ratio(&a, &b);
        let (short, long) = ordered_by_len(&a, &b);
        let len_ratio = char_len(long) as f64 / char_len(short) as f64;

        let best = if len_ratio < PARTIAL_RATIO_FROM {
            base.max(token_sort_ratio(&a, &b) * TOKEN_SCALE)
        } else {
            let scale = if len_ratio < LONG_PARTIAL_FROM { 0.9 } else { 0.6 };
            let partial = partial_ratio(short, long);
            let partial_tokens = partial_ratio(&sort_tokens(short), &sort_tokens(long));
            base.max(partial * scale)
                .max(partial_tokens * TOKEN_SCALE * scale)
        };

        best.round().clamp(0.0, 100.0) as u8
    }
}

/// Lowercases, maps non-alphanumerics to spaces and collapses whitespace.
fn preprocess(s: &str) -> String {
    let mapped: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    mapped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn ordered_by_len<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if char_len(a) <= char_len(b) {
        (a, b)
    } else {
        (b, a)
    }
}

fn ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b) * 100.0
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sort_tokens(a), &sort_tokens(b))
}

/// Best ratio of `short` against every equally long window of `long`.
fn partial_ratio(short: &str, long: &str) -> f64 {
    let (short, long) = ordered_by_len(short, long);
    let window = char_len(short);
    let chars: Vec<char> = long.chars().collect();
    if window == 0 {
        return 0.0;
    }
    if window >= chars.len() {
        return ratio(short, long);
    }

    let mut best = 0.0_f64;
    for start in 0..=(chars.len() - window) {
        let candidate: String = chars[start..start + window].iter().collect();
        let score = ratio(short, &candidate);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}
