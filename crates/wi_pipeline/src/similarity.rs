use std::collections::BTreeSet;

use wi_core::FilterOutcome;

fn tokens(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Token-set similarity in `0..=100`: word order, punctuation and repeated
/// words do not matter, and a title whose words are all contained in the
/// other scores 100.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let (ta, tb) = (tokens(a), tokens(b));
    if ta.is_empty() || tb.is_empty() {
        return 0;
    }

    let common: Vec<&str> = ta.intersection(&tb).map(String::as_str).collect();
    let only_a: Vec<&str> = ta.difference(&tb).map(String::as_str).collect();
    let only_b: Vec<&str> = tb.difference(&ta).map(String::as_str).collect();

    if !common.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 100;
    }

    let sect = common.join(" ");
    let (tail_a, tail_b) = (only_a.join(" "), only_b.join(" "));
    let with_a = join(&[sect.as_str(), tail_a.as_str()]);
    let with_b = join(&[sect.as_str(), tail_b.as_str()]);

    let mut best = ratio(&with_a, &with_b);
    if !sect.is_empty() {
        best = best.max(ratio(&sect, &with_a)).max(ratio(&sect, &with_b));
    }
    best.round().clamp(0.0, 100.0) as u8
}

/// Suppresses near-duplicate titles within one company's articles.
#[derive(Debug, Clone, Copy)]
pub struct TitleSimilarity {
    threshold: u8,
}

impl TitleSimilarity {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Keeps the first article of every group of similar titles, in order.
    pub fn retain_distinct(&self, outcomes: Vec<FilterOutcome>) -> Vec<FilterOutcome> {
        let mut kept: Vec<FilterOutcome> = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            let title = &outcome.article.title;
            let similar = kept
                .iter()
                .find(|k| token_set_ratio(&k.article.title, title) >= self.threshold);
            match similar {
                Some(existing) => tracing::debug!(
                    "🧹 Dropping similar title: {} (kept: {})",
                    title,
                    existing.article.title
                ),
                None => kept.push(outcome),
            }
        }
        kept
    }
}
