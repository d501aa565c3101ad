//! Bounding boxes and the "contain" fit used to place overlays on media
//!
//! Analysis coordinates are always in the media's natural pixel space. The
//! viewer shows media letterboxed inside its container (CSS `object-fit:
//! contain`), so every overlay box must pass through the same transform:
//!
//! ```text
//! scale   = min(Cw / W, Ch / H)
//! offsetX = (Cw - W * scale) / 2
//! offsetY = (Ch - H * scale) / 2
//! (x, y, w, h) -> (offsetX + x * scale, offsetY + y * scale, w * scale, h * scale)
//! ```
//!
//! A [`ContainFit`] is cheap to build and is never cached: callers rebuild it
//! from the current container size on every resize or load.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Smallest size anchored at the origin that contains every box.
    ///
    /// Used when the natural media size is unknown (e.g. in offline reports).
    pub fn covering<'a, I>(boxes: I) -> Option<Size>
    where
        I: IntoIterator<Item = &'a BoundingBox>,
    {
        let mut extent: Option<Size> = None;
        for b in boxes {
            let right = b.x + b.width;
            let bottom = b.y + b.height;
            let e = extent.get_or_insert(Size::new(0.0, 0.0));
            e.width = e.width.max(right);
            e.height = e.height.max(bottom);
        }
        extent.filter(Size::is_drawable)
    }
}

/// Rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Box positioned as percentages of a reference size (for CSS `%` layouts).
    pub fn as_percent_of(&self, reference: Size) -> Option<BoundingBox> {
        if !reference.is_drawable() {
            return None;
        }
        Some(BoundingBox {
            x: self.x / reference.width * 100.0,
            y: self.y / reference.height * 100.0,
            width: self.width / reference.width * 100.0,
            height: self.height / reference.height * 100.0,
        })
    }
}

/// Scale and centering offsets that fit natural media into a container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContainFit {
    pub natural: Size,
    pub container: Size,
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ContainFit {
    /// Returns `None` while the media has no usable natural size (not loaded yet).
    pub fn new(natural: Size, container: Size) -> Option<Self> {
        if !natural.is_drawable() || !container.width.is_finite() || !container.height.is_finite() {
            return None;
        }
        let container = Size::new(container.width.max(0.0), container.height.max(0.0));
        let scale = (container.width / natural.width).min(container.height / natural.height);
        let offset_x = (container.width - natural.width * scale) / 2.0;
        let offset_y = (container.height - natural.height * scale) / 2.0;

        Some(Self {
            natural,
            container,
            scale,
            offset_x,
            offset_y,
        })
    }

    /// Map a natural-space box into display space.
    pub fn map_box(&self, b: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x: self.offset_x + b.x * self.scale,
            y: self.offset_y + b.y * self.scale,
            width: b.width * self.scale,
            height: b.height * self.scale,
        }
    }

    /// The displayed media rectangle inside the container.
    pub fn content_rect(&self) -> BoundingBox {
        self.map_box(&BoundingBox::new(0.0, 0.0, self.natural.width, self.natural.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // CONTAIN FIT
    // ==========================================================================
    //
    // Wide media in a tall container is letterboxed top/bottom; tall media in
    // a wide container is pillarboxed left/right. Either way the full media
    // rectangle must land exactly on the centered content rect.
    // ==========================================================================

    #[test]
    fn test_letterbox_wide_media() {
        let fit = ContainFit::new(Size::new(400.0, 200.0), Size::new(800.0, 800.0)).unwrap();
        assert_eq!(fit.scale, 2.0);
        assert_eq!(fit.offset_x, 0.0);
        assert_eq!(fit.offset_y, 200.0);
        assert_eq!(fit.content_rect(), BoundingBox::new(0.0, 200.0, 800.0, 400.0));
    }

    #[test]
    fn test_pillarbox_tall_media() {
        let fit = ContainFit::new(Size::new(100.0, 200.0), Size::new(400.0, 200.0)).unwrap();
        assert_eq!(fit.scale, 1.0);
        assert_eq!(fit.offset_x, 150.0);
        assert_eq!(fit.offset_y, 0.0);
        assert_eq!(fit.content_rect(), BoundingBox::new(150.0, 0.0, 100.0, 200.0));
    }

    #[test]
    fn test_box_mapping() {
        let fit = ContainFit::new(Size::new(400.0, 200.0), Size::new(800.0, 800.0)).unwrap();
        let mapped = fit.map_box(&BoundingBox::new(100.0, 50.0, 40.0, 20.0));
        assert_eq!(mapped, BoundingBox::new(200.0, 300.0, 80.0, 40.0));
    }

    #[test]
    fn test_downscale() {
        let fit = ContainFit::new(Size::new(1600.0, 1200.0), Size::new(400.0, 400.0)).unwrap();
        assert_eq!(fit.scale, 0.25);
        assert_eq!(fit.offset_y, 50.0);
        assert_eq!(fit.content_rect(), BoundingBox::new(0.0, 50.0, 400.0, 300.0));
    }

    #[test]
    fn test_unloaded_media_has_no_fit() {
        assert!(ContainFit::new(Size::new(0.0, 0.0), Size::new(800.0, 600.0)).is_none());
        assert!(ContainFit::new(Size::new(f64::NAN, 10.0), Size::new(800.0, 600.0)).is_none());
        assert!(ContainFit::new(Size::new(10.0, 10.0), Size::new(f64::INFINITY, 600.0)).is_none());
    }

    #[test]
    fn test_covering_extent() {
        let boxes = [
            BoundingBox::new(10.0, 10.0, 100.0, 50.0),
            BoundingBox::new(200.0, 5.0, 20.0, 300.0),
        ];
        assert_eq!(Size::covering(boxes.iter()), Some(Size::new(220.0, 305.0)));
        assert_eq!(Size::covering(std::iter::empty()), None);
    }

    #[test]
    fn test_percent_placement() {
        let b = BoundingBox::new(50.0, 25.0, 100.0, 50.0);
        let pct = b.as_percent_of(Size::new(200.0, 100.0)).unwrap();
        assert_eq!(pct, BoundingBox::new(25.0, 25.0, 50.0, 50.0));
        assert!(b.as_percent_of(Size::default()).is_none());
    }
}
