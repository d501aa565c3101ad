use deepview::overlay::{self, RenderContext};
use deepview::view::{Point, ViewState};
use deepview::{AnalysisResult, ContainFit, Deriver, EvidenceBundle, MediaType, Size};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

fn parse_result(value: JsValue) -> Result<AnalysisResult, JsValue> {
    let raw: serde_json::Value = serde_wasm_bindgen::from_value(value).map_err(|e| {
        web_sys::console::warn_1(&format!("deepview: unreadable result: {e}").into());
        JsValue::from(e)
    })?;
    Ok(AnalysisResult::from_value(raw))
}

/// Derive evidence for one analysis result object.
#[wasm_bindgen(js_name = deriveEvidence)]
pub fn derive_evidence(result: JsValue) -> Result<JsValue, JsValue> {
    let result = parse_result(result)?;
    to_js(&deepview::derive(&result))
}

#[wasm_bindgen(js_name = normalizePercentage)]
pub fn normalize_percentage(value: Option<f64>) -> f64 {
    deepview::normalize_percentage(value)
}

/// Contain-fit of natural media into a container, or `undefined` when
/// either size is not drawable yet.
#[wasm_bindgen(js_name = containFit)]
pub fn contain_fit(
    natural_width: f64,
    natural_height: f64,
    container_width: f64,
    container_height: f64,
) -> Result<JsValue, JsValue> {
    match ContainFit::new(
        Size::new(natural_width, natural_height),
        Size::new(container_width, container_height),
    ) {
        Some(fit) => to_js(&fit),
        None => Ok(JsValue::UNDEFINED),
    }
}

/// Overlay ids offered for a media type, default first.
#[wasm_bindgen(js_name = overlayIds)]
pub fn overlay_ids(media_type: &str) -> js_sys::Array {
    let media = MediaType::parse(media_type);
    let default = overlay::OverlayKind::default_for(media);
    let ids = js_sys::Array::new();
    ids.push(&JsValue::from_str(default.id()));
    for kind in overlay::OverlayKind::options_for(media) {
        if *kind != default {
            ids.push(&JsValue::from_str(kind.id()));
        }
    }
    ids
}

/// One opened result: evidence plus the viewer state around it.
#[wasm_bindgen]
pub struct Viewer {
    result: AnalysisResult,
    evidence: EvidenceBundle,
    view: ViewState,
    natural: Option<Size>,
    container: Option<Size>,
    suspicious_confidence: f64,
}

#[wasm_bindgen]
impl Viewer {
    #[wasm_bindgen(constructor)]
    pub fn new(result: JsValue) -> Result<Viewer, JsValue> {
        let result = parse_result(result)?;
        let deriver = Deriver::new();
        let evidence = deriver.derive(&result);
        let mut viewer = Viewer {
            view: ViewState::new(result.media_type),
            result,
            evidence,
            natural: None,
            container: None,
            suspicious_confidence: deriver.options.suspicious_confidence,
        };
        viewer.sync_frame_count();
        Ok(viewer)
    }

    #[wasm_bindgen(js_name = setNaturalSize)]
    pub fn set_natural_size(&mut self, width: f64, height: f64) {
        self.natural = Some(Size::new(width, height));
    }

    #[wasm_bindgen(js_name = setContainerSize)]
    pub fn set_container_size(&mut self, width: f64, height: f64) {
        self.container = Some(Size::new(width, height));
    }

    pub fn evidence(&self) -> Result<JsValue, JsValue> {
        to_js(&self.evidence)
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.view)
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) {
        self.update(ViewState::zoom_in);
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) {
        self.update(ViewState::zoom_out);
    }

    pub fn reset(&mut self) {
        self.update(ViewState::reset);
    }

    #[wasm_bindgen(js_name = startDrag)]
    pub fn start_drag(&mut self, x: f64, y: f64) {
        self.update(|v| v.start_drag(Point::new(x, y)));
    }

    #[wasm_bindgen(js_name = dragTo)]
    pub fn drag_to(&mut self, x: f64, y: f64) {
        self.update(|v| v.drag_to(Point::new(x, y)));
    }

    #[wasm_bindgen(js_name = endDrag)]
    pub fn end_drag(&mut self) {
        self.update(ViewState::end_drag);
    }

    #[wasm_bindgen(js_name = prevFrame)]
    pub fn prev_frame(&mut self) {
        self.update(ViewState::prev_frame);
    }

    #[wasm_bindgen(js_name = nextFrame)]
    pub fn next_frame(&mut self) {
        self.update(ViewState::next_frame);
    }

    #[wasm_bindgen(js_name = toggleFilter)]
    pub fn toggle_filter(&mut self) {
        self.update(ViewState::toggle_filter);
        self.sync_frame_count();
    }

    #[wasm_bindgen(js_name = selectHeatmap)]
    pub fn select_heatmap(&mut self, index: usize) {
        self.update(|v| v.select_heatmap(index));
    }

    #[wasm_bindgen(js_name = selectOverlay)]
    pub fn select_overlay(&mut self, id: &str) {
        self.update(|v| v.select_overlay_id(id));
    }

    /// Render the selected overlay in container coordinates.
    pub fn overlay(&self) -> Result<JsValue, JsValue> {
        let ctx = self.context();
        to_js(&overlay::render(self.view.overlay, &ctx))
    }
}

impl Viewer {
    fn update(&mut self, f: impl FnOnce(ViewState) -> ViewState) {
        self.view = f(self.view.clone());
    }

    fn fit(&self) -> Option<ContainFit> {
        ContainFit::new(self.natural?, self.container?)
    }

    fn context(&self) -> RenderContext<'_> {
        RenderContext::new(&self.result, &self.evidence)
            .with_fit(self.fit())
            .with_frame_index(self.view.frame_index)
            .with_filter_suspicious(self.view.filter_suspicious)
            .with_suspicious_confidence(self.suspicious_confidence)
    }

    fn sync_frame_count(&mut self) {
        let count = self.context().navigable_frames().len();
        self.update(|v| v.with_frame_count(count));
    }
}

#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&concat!("deepview-wasm ", env!("CARGO_PKG_VERSION")).into());
}
