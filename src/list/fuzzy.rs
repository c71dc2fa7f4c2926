use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// One visible row: the index into the unfiltered entries plus the matched
/// character positions for highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rank {
    pub index: usize,
    pub matched: Vec<usize>,
}

impl Rank {
    fn unmatched(index: usize) -> Self {
        Self {
            index,
            matched: Vec::new(),
        }
    }
}

/// Ranks `targets` against `term`: best score first, ties in original order.
/// An empty term keeps every target in order.
pub fn rank(term: &str, targets: &[&str]) -> Vec<Rank> {
    if term.is_empty() {
        return (0..targets.len()).map(Rank::unmatched).collect();
    }
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, Rank)> = targets
        .iter()
        .enumerate()
        .filter_map(|(index, target)| {
            matcher
                .fuzzy_indices(target, term)
                .map(|(score, matched)| (score, Rank { index, matched }))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.index.cmp(&b.1.index)));
    scored.into_iter().map(|(_, rank)| rank).collect()
}

/// Ranks all but the last target, then appends the last one regardless of
/// score so it can never be filtered out.
pub fn rank_with_pinned_last(term: &str, targets: &[&str]) -> Vec<Rank> {
    let Some((_, real)) = targets.split_last() else {
        return Vec::new();
    };
    let mut ranks = rank(term, real);
    ranks.push(Rank::unmatched(targets.len() - 1));
    ranks
}
