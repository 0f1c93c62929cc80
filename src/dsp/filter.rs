use std::f32::consts::PI;

/*
Resonant State-Variable Low-Pass
================================

The effect's signal path is a single TPT (topology-preserving transform)
state-variable filter run as a low-pass. Two parameters shape it:

  cutoff (Hz)       Where the response starts falling at 12 dB/octave.

  resonance (dB)    Gain of the peak at the cutoff. 0 dB is a flat corner
                    (Q = 1), +20 dB is a sharp whistle (Q = 10), negative
                    values round the corner off.

    Q = 10^(resonance / 20)        k = 1 / Q   (damping)


Trapezoidal Integration
-----------------------

The integrators are discretised with the trapezoidal rule and the cutoff is
pre-warped:

    g = tan(π · fc / fs)

The digital filter then matches the analog prototype exactly at the cutoff,
and the structure stays stable while its coefficients change every sample.
The kernel relies on that when it feeds in ramped parameter values.


Magnitude Response
------------------

Because the TPT structure is the bilinear transform of the analog low-pass
H(s) = 1 / (s² + k·s + 1) (frequency-normalised), its response at any
frequency f follows from the same pre-warp:

    Ω = tan(π · f / fs)

    |H(f)| = g² / √((g² − Ω²)² + (k·g·Ω)²)

Reference points:
    f = 0        →  |H| = 1          (DC passes untouched)
    f = fc       →  |H| = 1/k = Q    (the resonant peak)
    f → fs/2     →  |H| → 0

The UI draws this curve. Evaluating it never touches the running filter state.
*/

/// Cutoff is kept away from DC and Nyquist when computing coefficients.
const MIN_CUTOFF_HZ: f32 = 1.0;
const MAX_CUTOFF_RATIO: f32 = 0.49;

/// Per-sample filter coefficients derived from cutoff and resonance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub g: f32,
    pub k: f32,
}

impl Coefficients {
    pub fn new(cutoff_hz: f32, resonance_db: f32, sample_rate: f32) -> Self {
        Self {
            g: prewarp(cutoff_hz, sample_rate),
            k: damping(resonance_db),
        }
    }
}

#[inline]
fn prewarp(cutoff_hz: f32, sample_rate: f32) -> f32 {
    let cutoff = cutoff_hz.clamp(MIN_CUTOFF_HZ, sample_rate * MAX_CUTOFF_RATIO);
    (PI * cutoff / sample_rate).tan()
}

#[inline]
fn damping(resonance_db: f32) -> f32 {
    10.0_f32.powf(-resonance_db / 20.0)
}

/// Integrator memory for one channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvfState {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory
}

impl SvfState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter one sample, returning the low-pass output.
    #[inline]
    pub fn next_sample(&mut self, sample: f32, coeffs: Coefficients) -> f32 {
        let Coefficients { g, k } = coeffs;
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }

    /// Filter a whole buffer in place with fixed coefficients.
    pub fn render(&mut self, buffer: &mut [f32], coeffs: Coefficients) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, coeffs);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}

/// Linear magnitude of the low-pass at each frequency in `frequencies`.
///
/// Pure function of the parameters; writes `min(frequencies.len(), out.len())`
/// values.
pub fn magnitude_response(
    cutoff_hz: f32,
    resonance_db: f32,
    sample_rate: f32,
    frequencies: &[f32],
    out: &mut [f32],
) {
    let Coefficients { g, k } = Coefficients::new(cutoff_hz, resonance_db, sample_rate);
    let g2 = g * g;
    let nyquist = sample_rate * 0.5;

    for (magnitude, &freq) in out.iter_mut().zip(frequencies.iter()) {
        if freq >= nyquist {
            *magnitude = 0.0;
            continue;
        }
        let omega = (PI * freq.max(0.0) / sample_rate).tan();
        let real = g2 - omega * omega;
        let imag = k * g * omega;
        *magnitude = g2 / (real * real + imag * imag).sqrt();
    }
}
