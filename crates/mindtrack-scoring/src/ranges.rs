use mindtrack_core::models::scoring::ScoreRange;

/// Find the band a raw score falls into: the first range, in the given order,
/// whose inclusive bounds contain it. Overlaps are not an error.
pub fn match_range(raw_score: f64, ranges: &[ScoreRange]) -> Option<&ScoreRange> {
    ranges.iter().find(|range| range.contains(raw_score))
}
