//! filterdemo - play a detuned saw pair through the ramped low-pass and steer
//! it from the terminal
//!
//! Run with: cargo run --bin filterdemo

mod app;
mod source;
mod ui;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let terminal = ratatui::init();

    let res = app::run(terminal);

    ratatui::restore();
    res
}
