//! Audio setup: cpal output stream driving the filter renderer in place

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ratatui::DefaultTerminal;
use rtrb::{PushError, RingBuffer};

use saavy_ramp::{engine::BufferList, AudioFormat, FilterUnit, UnitConfig};

use super::{source::SawPair, ui::UiApp};

/// Channels the filter renders; mapped onto however many the device has
const FILTER_CHANNELS: usize = 2;
const BLOCK_FRAMES: usize = 512;
const SOURCE_FREQ: f32 = 55.0;
/// Analyzer window; the audio→UI ring holds this many blocks
pub const VIS_BLOCK_LEN: usize = 2048;
const AUDIO_RING_BLOCKS: usize = 8;

pub fn run(mut terminal: DefaultTerminal) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f64;
    let device_channels = config.channels() as usize;

    let format = AudioFormat::new(sample_rate, FILTER_CHANNELS);
    let (mut renderer, controller) = FilterUnit::new(UnitConfig::new().max_frames(BLOCK_FRAMES))
        .allocate_render_resources(format, format)
        .wrap_err("failed to allocate filter render resources")?;

    let (audio_tx, audio_rx) = RingBuffer::<f32>::new(VIS_BLOCK_LEN * AUDIO_RING_BLOCKS);

    let stream = device
        .build_output_stream(
            &config.into(),
            {
                let mut source = SawPair::new(SOURCE_FREQ, sample_rate as f32);
                let mut audio_tx = audio_tx;
                let mut timestamp = 0u64;
                move |data: &mut [f32], _| {
                    let total_frames = data.len() / device_channels;
                    let mut frames_written = 0;
                    while frames_written < total_frames {
                        let frames = (total_frames - frames_written).min(BLOCK_FRAMES);
                        let out_off = frames_written * device_channels;
                        let block = &mut data[out_off..out_off + frames * device_channels];

                        // Unset output: the renderer filters its pulled input in place
                        let mut output = BufferList::unset(FILTER_CHANNELS, frames);
                        match renderer.render(timestamp, frames as u32, &mut source, &mut output) {
                            Ok(()) => {
                                for (i, frame) in block.chunks_mut(device_channels).enumerate() {
                                    for (ch, sample) in frame.iter_mut().enumerate() {
                                        *sample = output
                                            .channel(ch % FILTER_CHANNELS)
                                            .map_or(0.0, |c| c[i]);
                                    }
                                }
                            }
                            Err(_) => block.fill(0.0),
                        }

                        // Mono tap for the analyzer, dropped when the UI falls behind
                        for frame in block.chunks(device_channels) {
                            if let Err(PushError::Full(_)) = audio_tx.push(frame[0]) {
                                break;
                            }
                        }

                        timestamp += frames as u64;
                        frames_written += frames;
                    }
                }
            },
            move |err| eprintln!("Stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    stream.play().wrap_err("failed to start output stream")?;

    let mut app = UiApp::new(controller, audio_rx);
    app.run(&mut terminal)
}
