use crate::detection::domain::detection::Detection;
use crate::shared::geometry::NativeRect;

/// The per-tick evaluation result and the only decision state the system
/// carries across ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Alignment {
    pub face_detected: bool,
    pub face_centered: bool,
}

impl Alignment {
    pub const NONE: Alignment = Alignment {
        face_detected: false,
        face_centered: false,
    };
}

/// Decide no-face / face-outside / face-contained for one tick.
///
/// Takes the first detection as ordered by the detector (highest confidence
/// first; no re-ranking here) and tests full containment of its box within
/// the guide rectangle. Pure: same inputs, same answer.
pub fn evaluate(detections: &[Detection], guide: &NativeRect) -> Alignment {
    let Some(first) = detections.first() else {
        return Alignment::NONE;
    };
    Alignment {
        face_detected: true,
        face_centered: guide.contains(&first.bounds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn detection(x: f64, y: f64, w: f64, h: f64) -> Detection {
        Detection::new(NativeRect::new(x, y, w, h), 0.9)
    }

    fn guide() -> NativeRect {
        NativeRect::new(0.0, 0.0, 100.0, 100.0)
    }

    #[test]
    fn test_empty_detections_is_none_regardless_of_guide() {
        assert_eq!(evaluate(&[], &guide()), Alignment::NONE);
        assert_eq!(
            evaluate(&[], &NativeRect::new(-50.0, -50.0, 1.0, 1.0)),
            Alignment::NONE
        );
    }

    #[test]
    fn test_contained_face_is_centered() {
        let result = evaluate(&[detection(10.0, 10.0, 50.0, 50.0)], &guide());
        assert!(result.face_detected);
        assert!(result.face_centered);
    }

    #[test]
    fn test_oversized_face_is_detected_but_not_centered() {
        let result = evaluate(&[detection(0.0, 0.0, 200.0, 200.0)], &guide());
        assert!(result.face_detected);
        assert!(!result.face_centered);
    }

    #[test]
    fn test_exact_fit_counts_as_centered() {
        // Boundary inclusivity: box edges equal to guide edges
        let result = evaluate(&[detection(0.0, 0.0, 100.0, 100.0)], &guide());
        assert!(result.face_centered);
    }

    #[rstest]
    #[case::past_left(-1.0, 10.0)]
    #[case::past_top(10.0, -1.0)]
    #[case::past_right(51.0, 10.0)]
    #[case::past_bottom(10.0, 51.0)]
    fn test_face_crossing_any_edge_is_not_centered(#[case] x: f64, #[case] y: f64) {
        let result = evaluate(&[detection(x, y, 50.0, 50.0)], &guide());
        assert!(result.face_detected);
        assert!(!result.face_centered);
    }

    #[test]
    fn test_only_first_detection_is_considered() {
        // Second face is contained, first is not: detector order wins.
        let outside = detection(500.0, 500.0, 50.0, 50.0);
        let inside = detection(10.0, 10.0, 50.0, 50.0);
        let result = evaluate(&[outside, inside], &guide());
        assert!(result.face_detected);
        assert!(!result.face_centered);
    }

    #[test]
    fn test_default_is_none() {
        assert_eq!(Alignment::default(), Alignment::NONE);
    }
}
