//! Viewer interaction state
//!
//! Zoom, pan, frame navigation and overlay selection as one immutable value.
//! Every transition consumes the state and returns the next one, so a host
//! can keep history, diff states, or share them across threads freely.

use crate::model::MediaType;
use crate::overlay::OverlayKind;
use serde::Serialize;

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_STEP: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub media_type: MediaType,
    pub zoom: f64,
    pub pan: Point,
    /// Pointer position minus pan at drag start; `Some` while dragging
    pub drag_origin: Option<Point>,
    pub frame_index: usize,
    /// Number of frames the navigator can step through
    pub frame_count: usize,
    pub filter_suspicious: bool,
    pub heatmap_index: usize,
    pub overlay: OverlayKind,
}

impl ViewState {
    pub fn new(media_type: MediaType) -> Self {
        Self {
            media_type,
            zoom: 1.0,
            pan: Point::default(),
            drag_origin: None,
            frame_index: 0,
            frame_count: 0,
            filter_suspicious: true,
            heatmap_index: 0,
            overlay: OverlayKind::default_for(media_type),
        }
    }

    pub fn zoom_in(self) -> Self {
        Self {
            zoom: (self.zoom * ZOOM_STEP).min(MAX_ZOOM),
            ..self
        }
    }

    pub fn zoom_out(self) -> Self {
        Self {
            zoom: (self.zoom / ZOOM_STEP).max(MIN_ZOOM),
            ..self
        }
    }

    /// Back to 100% and centered.
    pub fn reset(self) -> Self {
        Self {
            zoom: 1.0,
            pan: Point::default(),
            drag_origin: None,
            ..self
        }
    }

    pub fn start_drag(self, pointer: Point) -> Self {
        Self {
            drag_origin: Some(Point::new(pointer.x - self.pan.x, pointer.y - self.pan.y)),
            ..self
        }
    }

    /// Pan follows the pointer only while a drag is active.
    pub fn drag_to(self, pointer: Point) -> Self {
        match self.drag_origin {
            Some(origin) => Self {
                pan: Point::new(pointer.x - origin.x, pointer.y - origin.y),
                ..self
            },
            None => self,
        }
    }

    pub fn end_drag(self) -> Self {
        Self {
            drag_origin: None,
            ..self
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    /// Set how many frames are navigable (e.g. after extraction finishes).
    ///
    /// The current index is pulled back inside the new range.
    pub fn with_frame_count(self, count: usize) -> Self {
        Self {
            frame_count: count,
            frame_index: self.frame_index.min(count.saturating_sub(1)),
            ..self
        }
    }

    pub fn prev_frame(self) -> Self {
        Self {
            frame_index: self.frame_index.saturating_sub(1),
            ..self
        }
    }

    pub fn next_frame(self) -> Self {
        if self.frame_index + 1 < self.frame_count {
            Self {
                frame_index: self.frame_index + 1,
                ..self
            }
        } else {
            self
        }
    }

    /// Jump to a frame; out-of-range indices are ignored.
    pub fn select_frame(self, index: usize) -> Self {
        if index < self.frame_count {
            Self {
                frame_index: index,
                ..self
            }
        } else {
            self
        }
    }

    pub fn has_prev_frame(&self) -> bool {
        self.frame_index > 0
    }

    pub fn has_next_frame(&self) -> bool {
        self.frame_index + 1 < self.frame_count
    }

    /// Toggling the filter changes the navigable list, so navigation restarts.
    pub fn toggle_filter(self) -> Self {
        Self {
            filter_suspicious: !self.filter_suspicious,
            frame_index: 0,
            ..self
        }
    }

    pub fn select_heatmap(self, index: usize) -> Self {
        Self {
            heatmap_index: index,
            ..self
        }
    }

    /// Heatmap index actually shown out of `available`; out of range falls back to 0.
    pub fn effective_heatmap(&self, available: usize) -> Option<usize> {
        match available {
            0 => None,
            n if self.heatmap_index < n => Some(self.heatmap_index),
            _ => Some(0),
        }
    }

    /// Select an overlay; one not offered for this media type falls back to the default.
    pub fn select_overlay(self, overlay: OverlayKind) -> Self {
        let overlay = if overlay.is_available_for(self.media_type) {
            overlay
        } else {
            OverlayKind::default_for(self.media_type)
        };
        Self { overlay, ..self }
    }

    /// Same as [`select_overlay`](Self::select_overlay) for a raw id.
    pub fn select_overlay_id(self, id: &str) -> Self {
        match id.parse::<OverlayKind>() {
            Ok(kind) => self.select_overlay(kind),
            Err(_) => {
                let overlay = OverlayKind::default_for(self.media_type);
                Self { overlay, ..self }
            }
        }
    }
}
