use std::ops::Range;

use saavy_ramp::{
    engine::{
        channel, render_with_events, BufferList, EventList, ParamEvent, RenderBuffers,
        RenderKernel,
    },
    AudioFormat, EventTime, FilterUnit, ParamController, ParamId, ParameterAccess,
    ParameterRamper, PullInput, Renderer, UnitConfig,
};

const SAMPLE_RATE: f64 = 48_000.0;

/// Multiplies the input by a ramped gain.
struct GainKernel {
    gain: ParameterRamper,
}

impl RenderKernel for GainKernel {
    fn apply_event(&mut self, event: &ParamEvent) {
        self.gain.start_ramp(event.value, event.ramp_frames);
    }

    fn process(&mut self, buffers: &RenderBuffers<'_>, frames: Range<usize>) {
        let input = buffers.input(0, frames.clone());
        let output = buffers.output(0, frames);
        for (x, y) in input.iter().zip(output) {
            y.set(x.get() * self.gain.get_step());
        }
    }
}

/// Deterministic broadband test signal, continuous across blocks.
struct Noise {
    state: u32,
}

impl Noise {
    fn new() -> Self {
        Self { state: 0x1234_5678 }
    }
}

impl PullInput for Noise {
    fn pull_input(
        &mut self,
        _timestamp: u64,
        frame_count: usize,
        input: &mut BufferList<'_>,
    ) -> Result<(), i32> {
        let mut samples = vec![0.0f32; frame_count];
        for sample in samples.iter_mut() {
            self.state ^= self.state << 13;
            self.state ^= self.state >> 17;
            self.state ^= self.state << 5;
            *sample = (self.state as f32 / u32::MAX as f32) * 2.0 - 1.0;
        }
        for ch in 0..input.channel_count() {
            if let Some(channel) = input.channel_mut(ch) {
                channel.copy_from_slice(&samples);
            }
        }
        Ok(())
    }
}

fn allocate(max_frames: usize) -> (Renderer, ParamController) {
    let format = AudioFormat::stereo(SAMPLE_RATE);
    match FilterUnit::new(UnitConfig::new().max_frames(max_frames))
        .allocate_render_resources(format, format)
    {
        Ok(halves) => halves,
        Err(err) => panic!("{}", err),
    }
}

fn schedule_automation(controller: &mut ParamController) {
    controller
        .schedule(EventTime::At(300), 128, ParamId::Cutoff, 4_000.0)
        .unwrap();
    controller
        .schedule(EventTime::At(300), 0, ParamId::Resonance, 12.0)
        .unwrap();
    controller
        .schedule(EventTime::At(777), 64, ParamId::Cutoff, 200.0)
        .unwrap();
}

/// Render `total` frames in place in blocks of `block`, returning channel 0.
fn render_in_place(renderer: &mut Renderer, total: usize, block: usize) -> Vec<f32> {
    let mut source = Noise::new();
    let mut rendered = Vec::with_capacity(total);
    let mut timestamp = 0u64;
    while rendered.len() < total {
        let frames = block.min(total - rendered.len());
        let mut output = BufferList::unset(2, frames);
        renderer
            .render(timestamp, frames as u32, &mut source, &mut output)
            .unwrap();
        rendered.extend_from_slice(output.channel(0).unwrap());
        timestamp += frames as u64;
    }
    rendered
}

#[test]
fn scheduled_events_land_on_absolute_sample_across_blocks() {
    let (mut scheduler, mut queue) = channel(16);
    let mut list = EventList::with_capacity(16);
    let mut kernel = GainKernel {
        gain: ParameterRamper::new(1.0),
    };

    scheduler
        .schedule(EventTime::At(612), 0, ParamId::Cutoff, 0.5)
        .unwrap();
    scheduler
        .schedule(EventTime::At(900), 4, ParamId::Cutoff, 0.0)
        .unwrap();

    let mut rendered = Vec::new();
    for block in 0..2u64 {
        let mut storage = vec![vec![1.0f32; 512]];
        list.clear();
        let report = queue.drain_block(block * 512, 512, &mut list);
        assert!(!report.overflowed);

        {
            let input = BufferList::from_channels(storage.iter_mut().map(|c| c.as_mut_slice()));
            let mut output = BufferList::unset(1, 512);
            let buffers = RenderBuffers::prepare(&input, &mut output);
            let walk = render_with_events(&mut kernel, list.as_slice(), 512, &buffers);
            assert_eq!(walk.ignored, 0);
        }
        rendered.extend_from_slice(&storage[0]);
    }

    assert!(rendered[..612].iter().all(|&x| x == 1.0));
    assert!(rendered[612..900].iter().all(|&x| x == 0.5));
    assert_eq!(&rendered[900..905], &[0.5, 0.375, 0.25, 0.125, 0.0]);
    assert!(rendered[904..].iter().all(|&x| x == 0.0));
}

#[test]
fn output_does_not_depend_on_block_size() {
    let (mut small, mut small_controller) = allocate(512);
    let (mut large, mut large_controller) = allocate(512);
    schedule_automation(&mut small_controller);
    schedule_automation(&mut large_controller);

    let a = render_in_place(&mut small, 1_536, 64);
    let b = render_in_place(&mut large, 1_536, 512);

    assert_eq!(a, b);
    assert_eq!(small_controller.value(ParamId::Cutoff), 200.0);
    assert_eq!(large_controller.value(ParamId::Resonance), 12.0);
}

#[test]
fn in_place_and_out_of_place_render_identically() {
    let (mut in_place, mut in_place_controller) = allocate(256);
    let (mut out_of_place, mut out_of_place_controller) = allocate(256);
    schedule_automation(&mut in_place_controller);
    schedule_automation(&mut out_of_place_controller);

    let expected = render_in_place(&mut in_place, 1_024, 256);

    let mut source = Noise::new();
    let mut rendered = Vec::new();
    for block in 0..4u64 {
        let mut out_storage = vec![vec![0.0f32; 256]; 2];
        {
            let mut output =
                BufferList::from_channels(out_storage.iter_mut().map(|c| c.as_mut_slice()));
            out_of_place
                .render(block * 256, 256, &mut source, &mut output)
                .unwrap();
        }
        assert_eq!(out_storage[0], out_storage[1]);
        rendered.extend_from_slice(&out_storage[0]);
    }

    assert_eq!(rendered, expected);
}

#[test]
fn automation_changes_the_signal_at_the_scheduled_sample() {
    let (mut automated, mut controller) = allocate(512);
    let (mut reference, _reference_controller) = allocate(512);
    schedule_automation(&mut controller);

    let a = render_in_place(&mut automated, 1_024, 512);
    let b = render_in_place(&mut reference, 1_024, 512);

    assert_eq!(a[..300], b[..300]);
    let first_difference = a.iter().zip(&b).position(|(x, y)| x != y);
    assert_eq!(first_difference, Some(300));
}

#[test]
fn pre_render_values_carry_into_rendering() {
    let format = AudioFormat::new(SAMPLE_RATE, 1);
    let mut unit = FilterUnit::default();
    unit.set_value(ParamId::Cutoff, 30.0);

    let (mut renderer, controller) = unit.allocate_render_resources(format, format).unwrap();
    assert_eq!(controller.value(ParamId::Cutoff), 30.0);

    let mut source = Noise::new();
    let mut output = BufferList::unset(1, 512);
    renderer
        .render(0, 512, &mut source, &mut output)
        .unwrap();

    // Broadband noise through a 30 Hz low-pass barely moves
    let peak = output
        .channel(0)
        .unwrap()
        .iter()
        .fold(0.0f32, |acc, &x| acc.max(x.abs()));
    assert!(peak < 0.2, "peak {}", peak);
}

/// Render one in-place block of `frames` at `timestamp` and return the
/// published cutoff goal.
fn render_block(
    renderer: &mut Renderer,
    controller: &ParamController,
    timestamp: u64,
    frames: u32,
) -> f32 {
    let mut output = BufferList::unset(2, frames as usize);
    renderer
        .render(timestamp, frames, &mut Noise::new(), &mut output)
        .unwrap();
    controller.value(ParamId::Cutoff)
}

#[test]
fn out_of_order_times_each_land_in_their_own_block() {
    let (mut renderer, mut controller) = allocate(256);
    controller
        .schedule(EventTime::At(900), 0, ParamId::Cutoff, 3_000.0)
        .unwrap();
    controller
        .schedule(EventTime::At(300), 0, ParamId::Cutoff, 1_500.0)
        .unwrap();

    let goals: Vec<f32> = (0..4u64)
        .map(|block| render_block(&mut renderer, &controller, block * 256, 256))
        .collect();
    assert_eq!(goals, vec![400.0, 1_500.0, 1_500.0, 3_000.0]);
    assert!(controller.take_diagnostics().is_clean());
}

#[test]
fn immediate_writes_pass_a_far_future_event() {
    let (mut renderer, mut controller) = allocate(512);
    controller
        .schedule(EventTime::At(48_000), 0, ParamId::Resonance, 6.0)
        .unwrap();
    controller.set_value(ParamId::Cutoff, 2_000.0);

    // An empty block in between must not swallow the write
    assert_eq!(render_block(&mut renderer, &controller, 0, 0), 400.0);
    assert_eq!(render_block(&mut renderer, &controller, 0, 512), 2_000.0);

    let mut timestamp = 512;
    while timestamp + 512 <= 48_000 {
        render_block(&mut renderer, &controller, timestamp, 512);
        assert_eq!(controller.value(ParamId::Resonance), -5.0);
        timestamp += 512;
    }
    render_block(&mut renderer, &controller, timestamp, 512);
    assert_eq!(controller.value(ParamId::Resonance), 6.0);
}
