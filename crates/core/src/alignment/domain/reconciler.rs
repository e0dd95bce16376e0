//! The single Viewport→NativeVideo conversion.
//!
//! Detection boxes live in the camera's decoded pixel space; the guide
//! region lives in on-screen layout space. Before any containment test the
//! guide must be re-expressed in NativeVideo coordinates, including the
//! scale between the rendered video size and its decoded resolution. A
//! rendering at native resolution makes the scale 1 and the conversion a
//! pure translation.

use crate::alignment::domain::guide_layout::GuideLayout;
use crate::shared::geometry::{NativeRect, NativeSize};

/// Express the guide region in NativeVideo space.
///
/// Returns `None` when the conversion is undefined: the stream has no
/// decoded dimensions yet, or the video surface is rendered with a
/// degenerate (zero) size. Callers treat `None` as "skip this tick".
pub fn reconcile(layout: &GuideLayout, native: NativeSize) -> Option<NativeRect> {
    if !native.is_ready() {
        return None;
    }
    if layout.video.width <= 0.0 || layout.video.height <= 0.0 {
        return None;
    }

    let scale_x = native.width as f64 / layout.video.width;
    let scale_y = native.height as f64 / layout.video.height;

    // Guide position relative to the video surface's top-left corner,
    // still in viewport pixels.
    let offset_x = layout.guide.x - layout.video.x;
    let offset_y = layout.guide.y - layout.video.y;

    Some(NativeRect::new(
        offset_x * scale_x,
        offset_y * scale_y,
        layout.guide.width * scale_x,
        layout.guide.height * scale_y,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::geometry::ViewportRect;
    use approx::assert_relative_eq;

    fn layout(video: (f64, f64, f64, f64), guide: (f64, f64, f64, f64)) -> GuideLayout {
        GuideLayout::new(
            ViewportRect::new(video.0, video.1, video.2, video.3),
            ViewportRect::new(guide.0, guide.1, guide.2, guide.3),
        )
    }

    #[test]
    fn test_unscaled_rendering_is_pure_translation() {
        // Video rendered at native resolution: only the offset matters.
        let l = layout((50.0, 50.0, 640.0, 480.0), (100.0, 100.0, 200.0, 200.0));
        let rect = reconcile(&l, NativeSize::new(640, 480)).unwrap();
        assert_relative_eq!(rect.x, 50.0);
        assert_relative_eq!(rect.y, 50.0);
        assert_relative_eq!(rect.width, 200.0);
        assert_relative_eq!(rect.height, 200.0);
    }

    #[test]
    fn test_downscaled_rendering_scales_offset_and_size() {
        // Native 640×480 rendered at 320×240: everything doubles.
        let l = layout((0.0, 0.0, 320.0, 240.0), (40.0, 30.0, 100.0, 50.0));
        let rect = reconcile(&l, NativeSize::new(640, 480)).unwrap();
        assert_relative_eq!(rect.x, 80.0);
        assert_relative_eq!(rect.y, 60.0);
        assert_relative_eq!(rect.width, 200.0);
        assert_relative_eq!(rect.height, 100.0);
    }

    #[test]
    fn test_anisotropic_scaling() {
        // Stretched rendering: per-axis factors differ.
        let l = layout((0.0, 0.0, 640.0, 240.0), (64.0, 24.0, 64.0, 24.0));
        let rect = reconcile(&l, NativeSize::new(1280, 960)).unwrap();
        assert_relative_eq!(rect.x, 128.0);
        assert_relative_eq!(rect.y, 96.0);
        assert_relative_eq!(rect.width, 128.0);
        assert_relative_eq!(rect.height, 96.0);
    }

    #[test]
    fn test_guide_left_of_video_yields_negative_offset() {
        // A guide partly outside the video maps to negative native coords;
        // containment later fails naturally, no clamping here.
        let l = layout((100.0, 100.0, 640.0, 480.0), (50.0, 50.0, 200.0, 200.0));
        let rect = reconcile(&l, NativeSize::new(640, 480)).unwrap();
        assert_relative_eq!(rect.x, -50.0);
        assert_relative_eq!(rect.y, -50.0);
    }

    #[test]
    fn test_not_ready_native_size_refuses() {
        let l = layout((0.0, 0.0, 640.0, 480.0), (10.0, 10.0, 50.0, 50.0));
        assert!(reconcile(&l, NativeSize::new(0, 0)).is_none());
        assert!(reconcile(&l, NativeSize::new(640, 0)).is_none());
    }

    #[test]
    fn test_degenerate_video_rect_refuses() {
        let l = layout((0.0, 0.0, 0.0, 480.0), (10.0, 10.0, 50.0, 50.0));
        assert!(reconcile(&l, NativeSize::new(640, 480)).is_none());
    }
}
