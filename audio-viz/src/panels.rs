//! Canvas drawing for the dashboard panels.
//!
//! The raster pipeline decides what to paint; this module is the
//! mechanism: a [`PaintSurface`] over the 2D canvas context, plus the
//! waveform and prediction-chart drawing that doesn't go through the grid
//! renderer.

use crate::surfaces::{Panel, PanelKind};
use crate::viz::{State, ACCENT_COLOR, ACCENT_SECONDARY, PANEL_BG, TEXT_COLOR, TEXT_DIM};
use common::{ClassPrediction, WaveformData};
use raster::{
    render_grid, waveform, DynamicRange, Gradient, NumericGrid, PaintSurface, Rgb, ViewTransform,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

/// Width of the decibel window stretched over the spectrogram palette.
pub(crate) const SPECTROGRAM_DB_RANGE: f64 = 80.0;

const PANEL_BORDER: &str = "#2a3a4a";

/// [`PaintSurface`] over a canvas 2D context.
pub(crate) struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl PaintSurface for CanvasSurface<'_> {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.set_fill_style_str(PANEL_BG);
        self.ctx.fill_rect(0.0, 0.0, width, height);
    }

    fn begin_transform(&mut self, transform: &ViewTransform) {
        self.ctx.save();
        let _ = self
            .ctx
            .translate(transform.translate_x, transform.translate_y);
        let _ = self.ctx.scale(transform.scale_x(), transform.scale_y());
    }

    fn end_transform(&mut self) {
        self.ctx.restore();
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill_rect(x, y, width, height);
    }
}

fn panel_context(
    document: &Document,
    id: &str,
) -> Result<(CanvasRenderingContext2d, f64, f64), JsValue> {
    let canvas = document
        .get_element_by_id(id)
        .ok_or("no panel canvas")?
        .dyn_into::<HtmlCanvasElement>()?;

    let ctx = canvas
        .get_context("2d")?
        .ok_or("no 2d context")?
        .dyn_into::<CanvasRenderingContext2d>()?;

    Ok((ctx, canvas.width() as f64, canvas.height() as f64))
}

/// Draw one panel according to its grant state and the data on hand.
pub(crate) fn render_panel(
    document: &Document,
    state: &State,
    panel: &Panel,
) -> Result<(), JsValue> {
    let (ctx, width, height) = panel_context(document, &panel.id)?;

    let Some(response) = state.response.as_ref() else {
        draw_placeholder(&ctx, width, height, "No data yet");
        return Ok(());
    };

    if !panel.granted {
        // contention denial: the context belongs to another panel right now
        draw_placeholder(&ctx, width, height, "Waiting for render context");
        return Ok(());
    }

    match &panel.kind {
        PanelKind::Spectrogram => {
            let grid = NumericGrid::from_tensor(&response.input_spectrogram);
            let ceiling = grid.max_value().unwrap_or(0.0);
            let window = DynamicRange::new(ceiling, SPECTROGRAM_DB_RANGE);
            let gradient = Gradient::spectrogram();
            let mut surface = CanvasSurface::new(&ctx);
            render_grid(
                &mut surface,
                &grid,
                &state.spectrogram_transform,
                &window,
                |t| gradient.sample(t),
                width,
                height,
            );
        }
        PanelKind::FeatureMap(layer) => {
            let Some(tensor) = response.visualization.get(layer) else {
                draw_placeholder(&ctx, width, height, "Layer missing from response");
                return Ok(());
            };
            let grid = NumericGrid::from_tensor(tensor);
            let ceiling = grid.max_value().unwrap_or(1.0);
            let floor = grid.min_value().unwrap_or(0.0);
            let window = DynamicRange::new(ceiling, ceiling - floor);
            let gradient = Gradient::feature_map();
            let mut surface = CanvasSurface::new(&ctx);
            render_grid(
                &mut surface,
                &grid,
                &ViewTransform::identity(),
                &window,
                |t| gradient.sample(t),
                width,
                height,
            );
        }
        PanelKind::Waveform => {
            render_waveform(&ctx, &response.waveform, width, height);
        }
    }

    Ok(())
}

fn draw_placeholder(ctx: &CanvasRenderingContext2d, width: f64, height: f64, message: &str) {
    ctx.set_fill_style_str(PANEL_BG);
    ctx.fill_rect(0.0, 0.0, width, height);

    ctx.set_stroke_style_str(PANEL_BORDER);
    ctx.set_line_width(1.0);
    ctx.stroke_rect(0.5, 0.5, width - 1.0, height - 1.0);

    ctx.set_fill_style_str(TEXT_DIM);
    ctx.set_font("12px monospace");
    ctx.set_text_align("center");
    let _ = ctx.fill_text(message, width / 2.0, height / 2.0);
}

/// Envelope bars plus a decimated outline, with a small duration caption.
fn render_waveform(ctx: &CanvasRenderingContext2d, data: &WaveformData, width: f64, height: f64) {
    ctx.set_fill_style_str(PANEL_BG);
    ctx.fill_rect(0.0, 0.0, width, height);

    let mid = height / 2.0;
    let env = waveform::envelope(&data.values, width as usize);

    ctx.set_fill_style_str(ACCENT_COLOR);
    ctx.set_global_alpha(0.35);
    for (i, (low, high)) in env.iter().enumerate() {
        let top = mid - *high as f64 * mid;
        let bar = ((*high - *low) as f64 * mid).max(1.0);
        ctx.fill_rect(i as f64, top, 1.0, bar);
    }
    ctx.set_global_alpha(1.0);

    let outline = waveform::polyline(&waveform::downsample(&data.values, 2000), width, height);
    if !outline.is_empty() {
        ctx.set_stroke_style_str(ACCENT_COLOR);
        ctx.set_line_width(1.0);
        ctx.begin_path();
        for (i, (x, y)) in outline.iter().enumerate() {
            if i == 0 {
                ctx.move_to(*x, *y);
            } else {
                ctx.line_to(*x, *y);
            }
        }
        ctx.stroke();
    }

    ctx.set_fill_style_str(TEXT_DIM);
    ctx.set_font("10px monospace");
    ctx.set_text_align("left");
    let _ = ctx.fill_text(
        &format!("{:.2}s @ {} Hz", data.duration, data.sample_rate),
        8.0,
        12.0,
    );
}

/// Draw the prediction chart from whatever the latest response holds.
pub(crate) fn render_predictions(document: &Document, state: &State) -> Result<(), JsValue> {
    let (ctx, width, height) = panel_context(document, crate::viz::PREDICTIONS_CANVAS)?;
    let predictions: &[ClassPrediction] = state
        .response
        .as_ref()
        .map(|r| r.predictions.as_slice())
        .unwrap_or(&[]);
    render_prediction_chart(&ctx, predictions, width, height);
    Ok(())
}

/// Horizontal confidence bars for the top predictions.
fn render_prediction_chart(
    ctx: &CanvasRenderingContext2d,
    predictions: &[ClassPrediction],
    width: f64,
    height: f64,
) {
    ctx.set_fill_style_str(PANEL_BG);
    ctx.fill_rect(0.0, 0.0, width, height);

    ctx.set_fill_style_str(TEXT_COLOR);
    ctx.set_font("14px monospace");
    ctx.set_text_align("left");
    let _ = ctx.fill_text("Top predictions", 10.0, 20.0);

    if predictions.is_empty() {
        ctx.set_fill_style_str(TEXT_DIM);
        ctx.set_font("12px monospace");
        let _ = ctx.fill_text("No data yet", 10.0, height / 2.0);
        return;
    }

    let label_width = 110.0;
    let bar_area = width - label_width - 70.0;
    let row_height = 32.0;

    for (i, prediction) in predictions.iter().enumerate() {
        let y = 48.0 + i as f64 * row_height;

        ctx.set_fill_style_str(TEXT_DIM);
        ctx.set_font("12px monospace");
        let _ = ctx.fill_text(&prediction.class, 10.0, y + 4.0);

        let bar = (prediction.confidence.clamp(0.0, 1.0) * bar_area).max(1.0);
        let color = if i == 0 { ACCENT_COLOR } else { ACCENT_SECONDARY };
        ctx.set_fill_style_str(color);
        ctx.set_global_alpha(if i == 0 { 1.0 } else { 0.6 });
        ctx.fill_rect(label_width, y - 8.0, bar, 16.0);
        ctx.set_global_alpha(1.0);

        ctx.set_fill_style_str(TEXT_COLOR);
        let _ = ctx.fill_text(
            &prediction.confidence_pct(),
            label_width + bar + 8.0,
            y + 4.0,
        );
    }
}
