//! deepview - Visual evidence for deepfake detection results
//!
//! deepview takes the JSON a deepfake detection backend returns for an image,
//! video or audio file and turns it into evidence a reviewer can look at:
//! face boxes, artifact regions, heatmaps, per-frame verdicts and a temporal
//! consistency score.
//!
//! # Overview
//!
//! Backends are inconsistent. Some precompute a `visual_evidence` block,
//! others only ship raw per-frame predictions; some report confidence as a
//! fraction, others as a percentage. The [`evidence`] module hides all of that
//! behind one total function, [`derive`], which never fails and always returns
//! a fully populated [`EvidenceBundle`].
//!
//! # Derivation
//!
//! 1. **Passthrough**: a backend `visual_evidence` block is mapped field by
//!    field. Nothing is recomputed.
//!
//! 2. **Fallback**: otherwise evidence is computed from raw data. For videos
//!    that means suspicious frames, a confidence heatmap and a temporal
//!    consistency score built from variance, sudden changes and prediction
//!    swaps. For images it means the face region plus artifact and forensic
//!    scores from `details.face_features`.
//!
//! # Quick Start
//!
//! ```no_run
//! use deepview::{derive, AnalysisResult, ContainFit, Size};
//!
//! let json = std::fs::read_to_string("clip.json").unwrap();
//! let result = AnalysisResult::from_json_str(&json).unwrap();
//! let evidence = derive(&result);
//!
//! println!("Consistency: {:.3} ({})",
//!     evidence.temporal_analysis.consistency_score,
//!     evidence.temporal_analysis.label());
//!
//! // Place regions on a 960x540 player showing a 1920x1080 video
//! let fit = ContainFit::new(Size::new(1920.0, 1080.0), Size::new(960.0, 540.0)).unwrap();
//! for region in &evidence.regions {
//!     println!("{}: {:?}", region.description, fit.map_box(&region.bounds));
//! }
//! ```
//!
//! # Temporal Consistency
//!
//! | Score | Label | Meaning |
//! |-------|-------|---------|
//! | > 0.7 | Consistent | Frames agree with each other |
//! | 0.4-0.7 | Moderate | Some jitter between frames |
//! | <= 0.4 | Inconsistent | Confidence swings or verdict flips |
//!
//! # Modules
//!
//! - [`evidence`]: The deriver, frame selection and extraction
//! - [`overlay`]: Overlay kinds per media type and their rendering
//! - [`view`]: Zoom, pan and frame navigation state
//! - [`geometry`]: Bounding boxes and the contain transform
//! - [`report`]: Output formatters (HTML, JSON, CSV)

pub mod error;
pub mod evidence;
pub mod geometry;
pub mod model;
pub mod overlay;
pub mod palette;
pub mod percent;
pub mod report;
pub mod view;

#[cfg(feature = "cli")]
pub mod config;
#[cfg(feature = "cli")]
pub mod scan;
#[cfg(feature = "cli")]
pub mod serve;

pub use error::{Error, Result};
pub use evidence::{derive, DeriveOptions, Deriver, EvidenceBundle, EvidenceRecord};
pub use geometry::{BoundingBox, ContainFit, Size};
pub use model::{AnalysisResult, MediaType, Prediction};
pub use overlay::{render, OverlayKind, RenderContext};
pub use percent::normalize_percentage;
pub use view::ViewState;
