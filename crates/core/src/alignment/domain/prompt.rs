use crate::alignment::domain::evaluator::Alignment;

/// User-facing status, one per tick.
///
/// Camera and detector failures get their own variants so a broken setup is
/// never presented as "no face in frame".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuideStatus {
    /// No stream could be bound, or it never produced frames.
    CameraUnavailable,
    /// Detector models failed to load; every tick fails closed.
    DetectorUnavailable,
    /// Stream running, no face found this tick.
    NoFace,
    /// Face found but not fully inside the guide region.
    Outside,
    /// Face fully contained in the guide region.
    Verified,
}

impl GuideStatus {
    pub fn from_alignment(alignment: Alignment) -> Self {
        match (alignment.face_detected, alignment.face_centered) {
            (false, _) => GuideStatus::NoFace,
            (true, false) => GuideStatus::Outside,
            (true, true) => GuideStatus::Verified,
        }
    }

    /// The prompt line shown under the video surface.
    pub fn prompt(&self) -> &'static str {
        match self {
            GuideStatus::CameraUnavailable => {
                "camera unavailable: check permissions and connected devices"
            }
            GuideStatus::DetectorUnavailable => "face detector unavailable: model failed to load",
            GuideStatus::NoFace => "look at the camera and put your face in the frame",
            GuideStatus::Outside => "put your face in the gray frame",
            GuideStatus::Verified => "verified",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::no_face(false, false, GuideStatus::NoFace)]
    #[case::outside(true, false, GuideStatus::Outside)]
    #[case::verified(true, true, GuideStatus::Verified)]
    fn test_alignment_maps_to_status(
        #[case] detected: bool,
        #[case] centered: bool,
        #[case] expected: GuideStatus,
    ) {
        let alignment = Alignment {
            face_detected: detected,
            face_centered: centered,
        };
        assert_eq!(GuideStatus::from_alignment(alignment), expected);
    }

    #[test]
    fn test_prompts_are_mutually_distinct() {
        let statuses = [
            GuideStatus::CameraUnavailable,
            GuideStatus::DetectorUnavailable,
            GuideStatus::NoFace,
            GuideStatus::Outside,
            GuideStatus::Verified,
        ];
        for (i, a) in statuses.iter().enumerate() {
            for b in &statuses[i + 1..] {
                assert_ne!(a.prompt(), b.prompt());
            }
        }
    }

    #[test]
    fn test_verified_prompt_text() {
        assert_eq!(GuideStatus::Verified.prompt(), "verified");
    }

    #[test]
    fn test_failure_statuses_are_not_no_face() {
        assert_ne!(
            GuideStatus::CameraUnavailable.prompt(),
            GuideStatus::NoFace.prompt()
        );
        assert_ne!(
            GuideStatus::DetectorUnavailable.prompt(),
            GuideStatus::NoFace.prompt()
        );
    }
}
