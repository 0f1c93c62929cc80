//! TUI for filterdemo
//!
//! Shows the filter's parameter goals, its magnitude response and a live
//! spectrum of the output, and turns key presses into parameter changes.

mod response;
mod spectrum;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use std::time::Duration;

use saavy_ramp::{EventTime, ParamController, ParamId, ParameterAccess};

use super::app::VIS_BLOCK_LEN;
use response::{render_response, ResponseCurve};
use spectrum::{render_spectrum, SpectrumAnalyzer};

const SEMITONE: f32 = 1.059_463_1;
const RESONANCE_STEP_DB: f32 = 1.0;
const SWEEP_LOW_HZ: f32 = 150.0;
const SWEEP_HIGH_HZ: f32 = 6_000.0;
/// Sweeps start this far ahead of the render clock so they land mid-block
const SWEEP_LEAD_SECONDS: f64 = 0.05;

pub struct UiApp {
    controller: ParamController,
    audio_rx: Consumer<f32>,
    vis_buffer: Vec<f32>,
    vis_filled: usize,
    spectrum: SpectrumAnalyzer,
    response: ResponseCurve,
    last_message: String,
    should_quit: bool,
}

impl UiApp {
    pub fn new(controller: ParamController, audio_rx: Consumer<f32>) -> Self {
        let sample_rate = controller.sample_rate() as f32;
        Self {
            controller,
            audio_rx,
            vis_buffer: vec![0.0; VIS_BLOCK_LEN],
            vis_filled: 0,
            spectrum: SpectrumAnalyzer::new(VIS_BLOCK_LEN, sample_rate),
            response: ResponseCurve::new(sample_rate),
            last_message: String::new(),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_diagnostics();
            self.response.update(&self.controller);

            terminal.draw(|frame| self.render(frame))?;

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Collect tapped samples; analyze every time a full window is in.
    fn poll_audio(&mut self) {
        while let Ok(sample) = self.audio_rx.pop() {
            self.vis_buffer[self.vis_filled] = sample;
            self.vis_filled += 1;
            if self.vis_filled == VIS_BLOCK_LEN {
                self.spectrum.update(&self.vis_buffer);
                self.vis_filled = 0;
            }
        }
    }

    fn poll_diagnostics(&mut self) {
        let diagnostics = self.controller.take_diagnostics();
        if !diagnostics.is_clean() {
            self.last_message = format!(
                "{} late, {} ignored, {} deferred events",
                diagnostics.late, diagnostics.ignored, diagnostics.overflows
            );
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up => self.nudge(ParamId::Cutoff, |hz| hz * SEMITONE),
            KeyCode::Down => self.nudge(ParamId::Cutoff, |hz| hz / SEMITONE),
            KeyCode::Right => self.nudge(ParamId::Resonance, |db| db + RESONANCE_STEP_DB),
            KeyCode::Left => self.nudge(ParamId::Resonance, |db| db - RESONANCE_STEP_DB),
            KeyCode::Char('s') | KeyCode::Char('S') => self.sweep(),
            _ => {}
        }
    }

    fn nudge(&mut self, id: ParamId, change: impl Fn(f32) -> f32) {
        let value = id.spec().clamp(change(self.controller.value(id)));
        self.controller.set_value(id, value);
        self.last_message = format!("{} → {:.1}", id.spec().name, value);
    }

    /// Schedule a one-second cutoff sweep: up from low settings, down otherwise.
    fn sweep(&mut self) {
        let sample_rate = self.controller.sample_rate();
        let cutoff = self.controller.value(ParamId::Cutoff);
        let target = if cutoff < SWEEP_LOW_HZ * 4.0 {
            SWEEP_HIGH_HZ
        } else {
            SWEEP_LOW_HZ
        };
        let start = self.controller.sample_time() + (sample_rate * SWEEP_LEAD_SECONDS) as u64;

        self.last_message =
            match self
                .controller
                .schedule(EventTime::At(start), sample_rate as u32, ParamId::Cutoff, target)
            {
                Ok(()) => format!("Sweep to {:.0} Hz at sample {}", target, start),
                Err(err) => err.to_string(),
            };
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),      // Status
                Constraint::Percentage(45), // Response
                Constraint::Min(6),         // Spectrum
                Constraint::Length(1),      // Help bar
            ])
            .split(frame.area());

        self.render_status(frame, chunks[0]);
        render_response(frame, chunks[1], self.response.data());
        render_spectrum(frame, chunks[2], self.spectrum.data());

        let help = Paragraph::new(
            " [↑/↓] Cutoff ±1 semitone  [←/→] Resonance ±1 dB  [S] Sweep  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title(" filterdemo ").borders(Borders::ALL);
        let seconds = self.controller.sample_time() as f64 / self.controller.sample_rate();

        let line = Line::from(vec![
            Span::styled(
                format!(" Cutoff: {:>7.1} Hz  ", self.controller.value(ParamId::Cutoff)),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!("Resonance: {:>+5.1} dB  ", self.controller.value(ParamId::Resonance)),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(
                format!("Clock: {:>8.2} s  ", seconds),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("Queue: {} free  ", self.controller.queue_slots()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(self.last_message.as_str(), Style::default().fg(Color::Green)),
        ]);

        frame.render_widget(Paragraph::new(line).block(block), area);
    }
}
