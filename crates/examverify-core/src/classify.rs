//! Answer equivalence classification.
//!
//! Decides whether two answer sets for the same slot are the same answer,
//! and if not, how far apart they are.

use crate::config::Thresholds;
use crate::model::{AnswerShape, GraphKeyPoint};

/// Outcome of comparing two answer shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Equivalence {
    /// Same answer under the slot's equivalence rule.
    Duplicate,
    /// Different answers; `separation` is the largest element-wise gap.
    Distinct { separation: f64 },
    /// Shapes cannot be compared (different arity, or no answers).
    Incomparable,
}

impl Equivalence {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Equivalence::Duplicate)
    }
}

/// How a pair of shapes was compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Singleton,
    Magnitude,
    SortedSet,
}

/// Pick the comparison rule for two shapes, if any applies.
pub fn comparison_for(a: &AnswerShape, b: &AnswerShape) -> Option<Comparison> {
    use AnswerShape::{Multi, PlusMinus, Single, Unordered};
    match (a, b) {
        (Single(_), Single(_)) => Some(Comparison::Singleton),
        (PlusMinus(..), PlusMinus(..)) => Some(Comparison::Magnitude),
        (PlusMinus(..) | Unordered(..), PlusMinus(..) | Unordered(..)) => {
            Some(Comparison::SortedSet)
        }
        (Multi(x), Multi(y)) if x.len() == y.len() => Some(Comparison::SortedSet),
        _ => None,
    }
}

/// Compare two answer shapes under the duplicate floor.
pub fn compare_answers(a: &AnswerShape, b: &AnswerShape, thresholds: &Thresholds) -> Equivalence {
    let Some(rule) = comparison_for(a, b) else {
        return Equivalence::Incomparable;
    };

    let separation = match rule {
        Comparison::Singleton => match (a, b) {
            (AnswerShape::Single(x), AnswerShape::Single(y)) => (x - y).abs(),
            _ => return Equivalence::Incomparable,
        },
        Comparison::Magnitude => (magnitude(a) - magnitude(b)).abs(),
        Comparison::SortedSet => {
            let xs = sorted(a.values());
            let ys = sorted(b.values());
            xs.iter()
                .zip(&ys)
                .map(|(x, y)| (x - y).abs())
                .fold(0.0, f64::max)
        }
    };

    if separation < thresholds.duplicate {
        Equivalence::Duplicate
    } else {
        Equivalence::Distinct { separation }
    }
}

/// Mean magnitude of a ± pair's components.
fn magnitude(shape: &AnswerShape) -> f64 {
    let values = shape.values();
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64
}

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values
}

/// Returns `true` if `x` is a whole number within `floor`.
pub fn is_whole(x: f64, floor: f64) -> bool {
    (x - x.round()).abs() < floor
}

/// Minimum separation for two singleton answers.
///
/// The comparison is integer-typed when either value is whole.
pub fn min_separation(a: f64, b: f64, thresholds: &Thresholds) -> f64 {
    if is_whole(a, thresholds.duplicate) || is_whole(b, thresholds.duplicate) {
        thresholds.integer_separation
    } else {
        thresholds.decimal_separation
    }
}

/// First pair of components (one from each side) within `tolerance`.
pub fn first_close_component(a: &[f64], b: &[f64], tolerance: f64) -> Option<(f64, f64)> {
    a.iter()
        .flat_map(|x| b.iter().map(move |y| (*x, *y)))
        .find(|(x, y)| (x - y).abs() < tolerance)
}

/// Returns `true` if two graph key points match on both axes.
///
/// A vertex never matches an asymptote pair.
pub fn key_points_match(a: &GraphKeyPoint, b: &GraphKeyPoint, tolerance: f64) -> bool {
    let close = |x: f64, y: f64| (x - y).abs() <= tolerance;
    match (a, b) {
        (GraphKeyPoint::Vertex { x: ax, y: ay }, GraphKeyPoint::Vertex { x: bx, y: by }) => {
            close(*ax, *bx) && close(*ay, *by)
        }
        (
            GraphKeyPoint::Asymptotes {
                vertical: av,
                horizontal: ah,
            },
            GraphKeyPoint::Asymptotes {
                vertical: bv,
                horizontal: bh,
            },
        ) => close(*av, *bv) && close(*ah, *bh),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t() -> Thresholds {
        Thresholds::default()
    }

    fn shape(values: &[f64]) -> AnswerShape {
        AnswerShape::classify(values, 0.01)
    }

    #[test]
    fn singletons() {
        assert!(compare_answers(&shape(&[2.0]), &shape(&[2.0]), &t()).is_duplicate());
        assert!(compare_answers(&shape(&[4.0]), &shape(&[4.005]), &t()).is_duplicate());
        match compare_answers(&shape(&[7.3]), &shape(&[8.0]), &t()) {
            Equivalence::Distinct { separation } => assert!((separation - 0.7).abs() < 1e-9),
            other => panic!("expected distinct, got {other:?}"),
        }
    }

    #[test]
    fn plus_minus_pairs_compare_by_magnitude() {
        let a = shape(&[3.0, -3.0]);
        let b = shape(&[-3.0, 3.0]);
        assert_eq!(comparison_for(&a, &b), Some(Comparison::Magnitude));
        assert!(compare_answers(&a, &b, &t()).is_duplicate());

        let c = shape(&[1.5, -1.5]);
        assert!(!compare_answers(&a, &c, &t()).is_duplicate());
    }

    #[test]
    fn unordered_pairs_compare_as_sorted_sets() {
        let a = shape(&[1.0, 5.0]);
        let b = shape(&[5.0, 1.0]);
        assert_eq!(comparison_for(&a, &b), Some(Comparison::SortedSet));
        assert!(compare_answers(&a, &b, &t()).is_duplicate());

        let c = shape(&[1.0, 4.0]);
        assert_eq!(
            compare_answers(&a, &c, &t()),
            Equivalence::Distinct { separation: 1.0 }
        );
    }

    #[test]
    fn mixed_pair_kinds_fall_back_to_sorted_sets() {
        let pm = shape(&[2.0, -2.0]);
        let roots = shape(&[-2.0, 2.5]);
        assert_eq!(comparison_for(&pm, &roots), Some(Comparison::SortedSet));
        assert!(!compare_answers(&pm, &roots, &t()).is_duplicate());
    }

    #[test]
    fn non_inverse_pairs_are_not_magnitude_matched() {
        // Neither pair sums to zero, so sorted order decides: [-1.5, 0.5] vs [-0.5, 1.5].
        let a = shape(&[0.5, -1.5]);
        let b = shape(&[-0.5, 1.5]);
        assert_eq!(comparison_for(&a, &b), Some(Comparison::SortedSet));
        assert!(!compare_answers(&a, &b, &t()).is_duplicate());
    }

    #[test]
    fn mismatched_shapes_are_incomparable() {
        assert_eq!(
            compare_answers(&shape(&[2.0]), &shape(&[2.0, -2.0]), &t()),
            Equivalence::Incomparable
        );
        assert_eq!(
            compare_answers(&shape(&[1.0, 2.0, 3.0]), &shape(&[1.0, 2.0, 3.0, 4.0]), &t()),
            Equivalence::Incomparable
        );
        assert_eq!(
            compare_answers(&AnswerShape::None, &AnswerShape::None, &t()),
            Equivalence::Incomparable
        );
    }

    #[test]
    fn triples_compare_as_sorted_sets() {
        let a = shape(&[1.0, 2.0, 3.0]);
        let b = shape(&[3.0, 1.0, 2.0]);
        assert!(compare_answers(&a, &b, &t()).is_duplicate());
    }

    #[test]
    fn separation_depends_on_integer_typing() {
        assert_eq!(min_separation(7.3, 8.0, &t()), 2.0);
        assert_eq!(min_separation(7.3, 7.9, &t()), 0.5);
        assert!(is_whole(3.0, 0.01));
        assert!(is_whole(-2.999, 0.01));
        assert!(!is_whole(2.5, 0.01));
    }

    #[test]
    fn graph_key_points() {
        let v1 = GraphKeyPoint::Vertex { x: -2.0, y: 5.0 };
        let v2 = GraphKeyPoint::Vertex { x: -2.05, y: 5.02 };
        let v3 = GraphKeyPoint::Vertex { x: -2.0, y: 5.5 };
        assert!(key_points_match(&v1, &v2, 0.1));
        assert!(!key_points_match(&v1, &v3, 0.1));

        let a1 = GraphKeyPoint::Asymptotes {
            vertical: 1.0,
            horizontal: -3.0,
        };
        let a2 = GraphKeyPoint::Asymptotes {
            vertical: 1.0,
            horizontal: -3.0,
        };
        assert!(key_points_match(&a1, &a2, 0.1));
        assert!(!key_points_match(&v1, &a1, 0.1));
    }

    #[test]
    fn close_components() {
        assert_eq!(
            first_close_component(&[3.0, -3.0], &[-3.004], 0.01),
            Some((-3.0, -3.004))
        );
        assert_eq!(first_close_component(&[3.0, -3.0], &[4.0], 0.01), None);
    }
}
