//! Magnitude-response widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use saavy_ramp::ParamController;

const RESPONSE_POINTS: usize = 160;
pub const MIN_FREQ: f64 = 20.0;
pub const MAX_FREQ: f64 = 20_000.0;
const FLOOR_DB: f64 = -60.0;
const CEILING_DB: f64 = 24.0;

/// Filter response at log-spaced frequencies, as (log10 Hz, dB) points.
pub struct ResponseCurve {
    freqs: Vec<f32>,
    magnitudes: Vec<f32>,
    points: Vec<(f64, f64)>,
}

impl ResponseCurve {
    pub fn new(sample_rate: f32) -> Self {
        let max_freq = MAX_FREQ.min(sample_rate as f64 * 0.5);
        let ratio = max_freq / MIN_FREQ;
        let freqs: Vec<f32> = (0..RESPONSE_POINTS)
            .map(|i| {
                let t = i as f64 / (RESPONSE_POINTS - 1) as f64;
                (MIN_FREQ * ratio.powf(t)) as f32
            })
            .collect();
        let points = freqs.iter().map(|&f| ((f as f64).log10(), FLOOR_DB)).collect();

        Self {
            magnitudes: vec![0.0; freqs.len()],
            freqs,
            points,
        }
    }

    /// Re-evaluate at the controller's current goals.
    pub fn update(&mut self, controller: &ParamController) {
        controller.frequency_response(&self.freqs, &mut self.magnitudes);
        for (point, &magnitude) in self.points.iter_mut().zip(&self.magnitudes) {
            let db = 20.0 * (magnitude.max(1e-6) as f64).log10();
            point.1 = db.clamp(FLOOR_DB, CEILING_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.points
    }
}

/// Decade labels for a log10 frequency axis.
pub fn frequency_axis(title: &str) -> Axis<'_> {
    Axis::default()
        .title(title)
        .bounds([MIN_FREQ.log10(), MAX_FREQ.log10()])
        .labels(vec!["20", "200", "2k", "20k"])
        .style(Style::default().fg(Color::DarkGray))
}

pub fn render_response(frame: &mut Frame, area: Rect, curve: &[(f64, f64)]) {
    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(curve);

    let chart = Chart::new(vec![dataset])
        .block(Block::default().title(" Response ").borders(Borders::ALL))
        .x_axis(frequency_axis("Hz"))
        .y_axis(
            Axis::default()
                .title("dB")
                .bounds([FLOOR_DB, CEILING_DB])
                .labels(vec!["-60", "-36", "-12", "+12"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
