//! Numeric helpers for score selection and threshold checks.

/// Returns `(index, value)` of the largest element; ties keep the lowest index.
///
/// NaN entries never win against a finite score. Returns `None` for an empty
/// iterator.
pub(crate) fn argmax<I>(scores: I) -> Option<(usize, f32)>
where
    I: IntoIterator<Item = f32>,
{
    let mut best: Option<(usize, f32)> = None;
    for (idx, score) in scores.into_iter().enumerate() {
        match best {
            None => best = Some((idx, score)),
            Some((_, best_score)) => {
                if score > best_score || (best_score.is_nan() && !score.is_nan()) {
                    best = Some((idx, score));
                }
            }
        }
    }
    best
}

/// Returns true when `value` lies in the closed unit interval.
pub(crate) fn in_unit_interval(value: f32) -> bool {
    (0.0..=1.0).contains(&value)
}
