//! Mask comparison metrics.

use serde::{Deserialize, Serialize};

use crate::error::MaskError;
use crate::mask::{Mask, FOREGROUND_THRESHOLD};
use crate::resample::match_size;

/// Keeps IoU and Dice finite when both masks are empty.
const OVERLAP_EPS: f64 = 1e-8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareMetric {
    /// Mean absolute difference; 0 for identical masks.
    #[default]
    Difference,
    /// `1 − difference`.
    Similarity,
    /// Intersection over union of the foregrounds.
    Iou,
    /// Dice coefficient of the foregrounds.
    Dice,
}

named_enum!(CompareMetric, "metric", {
    Difference => "difference",
    Similarity => "similarity",
    Iou => "iou",
    Dice => "dice",
});

/// Outcome of comparing two masks.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub metric: CompareMetric,
    pub score: f64,
    /// Per-pixel `|a − b|`, whatever the metric.
    pub diff: Mask,
    /// Foreground pixel counts.
    pub area_a: usize,
    pub area_b: usize,
    pub intersection: usize,
    pub union: usize,
}

/// Compares `a` with `b` under `metric`.
///
/// `b` is resampled bilinearly to `a`'s size if they differ.
pub fn compare(a: &Mask, b: &Mask, metric: CompareMetric) -> Result<Comparison, MaskError> {
    tracing::debug!(metric = %metric, width = a.width(), height = a.height(), "compare");
    let b = match_size(b, a)?;
    let diff = a.zip_with(&b, |x, y| (x - y).abs())?;

    let (mut area_a, mut area_b, mut intersection, mut union) = (0, 0, 0, 0);
    for (&x, &y) in a.data().iter().zip(b.data()) {
        let in_a = x > FOREGROUND_THRESHOLD;
        let in_b = y > FOREGROUND_THRESHOLD;
        area_a += usize::from(in_a);
        area_b += usize::from(in_b);
        intersection += usize::from(in_a && in_b);
        union += usize::from(in_a || in_b);
    }

    let score = match metric {
        CompareMetric::Difference => diff.mean(),
        CompareMetric::Similarity => 1.0 - diff.mean(),
        CompareMetric::Iou => intersection as f64 / (union as f64 + OVERLAP_EPS),
        CompareMetric::Dice => {
            2.0 * intersection as f64 / ((area_a + area_b) as f64 + OVERLAP_EPS)
        }
    };

    Ok(Comparison {
        metric,
        score,
        diff,
        area_a,
        area_b,
        intersection,
        union,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half(w: usize, h: usize, left: bool) -> Mask {
        Mask::from_fn(w, h, |x, _| f64::from(u8::from((x < w / 2) == left))).unwrap()
    }

    #[test]
    fn identical_all_ones_scores_perfectly() {
        let a = Mask::filled(10, 10, 1.0).unwrap();
        let score = |metric| compare(&a, &a, metric).unwrap().score;
        assert_eq!(score(CompareMetric::Difference), 0.0);
        assert_eq!(score(CompareMetric::Similarity), 1.0);
        assert!((score(CompareMetric::Iou) - 1.0).abs() < 1e-6);
        assert!((score(CompareMetric::Dice) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn complementary_halves_are_maximally_different() {
        let a = half(8, 4, true);
        let b = half(8, 4, false);
        let cmp = compare(&a, &b, CompareMetric::Difference).unwrap();
        assert_eq!(cmp.score, 1.0);
        assert!(cmp.diff.data().iter().all(|&v| v == 1.0));
        assert_eq!(cmp.intersection, 0);
        assert_eq!(cmp.union, 32);
        assert_eq!(compare(&a, &b, CompareMetric::Iou).unwrap().score, 0.0);
    }

    #[test]
    fn overlap_counts_and_scores() {
        // a covers x < 6, b covers x >= 4 on a 10-wide strip: overlap 2 columns.
        let a = Mask::from_fn(10, 1, |x, _| f64::from(u8::from(x < 6))).unwrap();
        let b = Mask::from_fn(10, 1, |x, _| f64::from(u8::from(x >= 4))).unwrap();
        let iou = compare(&a, &b, CompareMetric::Iou).unwrap();
        assert_eq!((iou.area_a, iou.area_b, iou.intersection, iou.union), (6, 6, 2, 10));
        assert!((iou.score - 0.2).abs() < 1e-6);
        let dice = compare(&a, &b, CompareMetric::Dice).unwrap();
        assert!((dice.score - 4.0 / 12.0).abs() < 1e-6);
    }

    #[test]
    fn empty_masks_have_zero_overlap_scores() {
        let a = Mask::new(5, 5).unwrap();
        assert_eq!(compare(&a, &a, CompareMetric::Iou).unwrap().score, 0.0);
        assert_eq!(compare(&a, &a, CompareMetric::Dice).unwrap().score, 0.0);
    }

    #[test]
    fn mismatched_b_is_resampled_to_a() {
        let a = Mask::filled(20, 10, 1.0).unwrap();
        let b = Mask::filled(5, 5, 1.0).unwrap();
        let cmp = compare(&a, &b, CompareMetric::Similarity).unwrap();
        assert_eq!((cmp.diff.width(), cmp.diff.height()), (20, 10));
        assert!((cmp.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn diff_is_returned_for_every_metric() {
        let a = Mask::filled(3, 3, 0.75).unwrap();
        let b = Mask::filled(3, 3, 0.25).unwrap();
        for &metric in CompareMetric::ALL {
            let cmp = compare(&a, &b, metric).unwrap();
            assert!(cmp.diff.data().iter().all(|&v| (v - 0.5).abs() < 1e-12), "{metric}");
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn pair() -> impl Strategy<Value = (Mask, Mask)> {
            (1_usize..=16, 1_usize..=16).prop_flat_map(|(w, h)| {
                let cells = prop::collection::vec(0.0_f64..=1.0, w * h);
                (cells.clone(), cells).prop_map(move |(a, b)| {
                    (Mask::from_data(w, h, a).unwrap(), Mask::from_data(w, h, b).unwrap())
                })
            })
        }

        proptest! {
            #[test]
            fn iou_never_exceeds_dice((a, b) in pair()) {
                let iou = compare(&a, &b, CompareMetric::Iou).unwrap().score;
                let dice = compare(&a, &b, CompareMetric::Dice).unwrap().score;
                prop_assert!(iou <= dice + 1e-12, "iou {iou} dice {dice}");
            }

            #[test]
            fn self_comparison_is_exact((a, _b) in pair()) {
                prop_assert_eq!(compare(&a, &a, CompareMetric::Difference).unwrap().score, 0.0);
                if a.count_above(FOREGROUND_THRESHOLD) > 0 {
                    let iou = compare(&a, &a, CompareMetric::Iou).unwrap().score;
                    prop_assert!((iou - 1.0).abs() < 1e-6);
                }
            }

            #[test]
            fn scores_stay_in_unit_range((a, b) in pair()) {
                for &metric in CompareMetric::ALL {
                    let score = compare(&a, &b, metric).unwrap().score;
                    prop_assert!((0.0..=1.0).contains(&score), "{metric}: {score}");
                }
            }
        }
    }
}
