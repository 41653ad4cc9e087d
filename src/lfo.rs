//! LFO Unit
//!
//! A per-voice low-frequency modulation source. Each unit combines a
//! persistent base rate/depth with transient offsets accumulated by
//! external modulation sources, drives its own oscillator core, and
//! clears the offsets after every produced sample. The offsets form a
//! single-cycle modulation bus: written any number of times between
//! productions, consumed exactly once.
//!
//! The unit is single-threaded. `produce_sample` runs on the audio
//! thread; when configuration comes from another thread, the owner
//! serializes it against production (see [`crate::io`] for a lock-free
//! hand-off of note-start values).

use crate::osc::{Oscillator, Waveshape};
use crate::params::{FrequencyRange, LfoParamSource};

/// A per-voice low-frequency modulation source.
///
/// One instance per LFO slot per voice. The unit exclusively owns its
/// oscillator core; the core is never shared between units.
#[derive(Debug, Clone)]
pub struct LfoUnit {
    osc: Oscillator,

    /// Base modulation depth, persists until explicitly set.
    amount: f64,

    /// Base oscillation rate in Hz, persists until explicitly set.
    frequency: f64,

    /// Last observed oscillator phase, kept across notes so a
    /// non-retriggered LFO keeps free-running.
    phase: f64,

    // Transient external modulation, cleared after each produced sample.
    amount_offset: f64,
    frequency_offset: f64,

    /// Scales normalized (-1..1) rate offsets into Hz: half the span of
    /// the allowed range.
    frequency_max_offset: f64,

    range: FrequencyRange,
}

impl LfoUnit {
    /// Create a unit bounded to `range`. The base frequency starts at the
    /// bottom of the range with zero depth.
    pub fn new(range: FrequencyRange, sample_rate: f64) -> Self {
        let mut osc = Oscillator::new(sample_rate);
        osc.set_frequency(range.min());
        Self {
            osc,
            amount: 0.0,
            frequency: range.min(),
            phase: 0.0,
            amount_offset: 0.0,
            frequency_offset: 0.0,
            frequency_max_offset: 0.5 * range.span(),
            range,
        }
    }

    /// Produce one modulation sample.
    ///
    /// Clamps the effective depth into [-1, 1] and the effective rate
    /// into the unit's range, advances the oscillator one step, records
    /// the resulting phase, and clears both offset accumulators. Safe to
    /// call at control-block granularity on the audio thread: no
    /// allocation, no locking, bounded time.
    pub fn produce_sample(&mut self) -> f64 {
        let amount = (self.amount + self.amount_offset).clamp(-1.0, 1.0);
        let frequency = self.range.clamp(self.frequency + self.frequency_offset);

        self.osc.set_frequency(frequency);
        let sample = amount * self.osc.process();
        self.phase = self.osc.phase();

        self.amount_offset = 0.0;
        self.frequency_offset = 0.0;

        sample
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.osc.set_sample_rate(sample_rate);
    }

    pub fn set_waveshape(&mut self, waveshape: Waveshape) {
        self.osc.set_waveshape(waveshape);
    }

    /// Set the base rate. Pushed to the oscillator immediately so the
    /// next sample runs at the new rate even before any production.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
        self.osc.set_frequency(frequency);
    }

    /// Set the oscillator core's internal amplitude. Distinct from the
    /// amount: the amplitude scales the raw waveform inside the core,
    /// the amount scales the produced modulation sample.
    pub fn set_amplitude(&mut self, amplitude: f64) {
        self.osc.set_amplitude(amplitude);
    }

    /// Set the base modulation depth.
    pub fn set_amount(&mut self, amount: f64) {
        self.amount = amount;
    }

    /// Accumulate a normalized rate offset (-1..1), scaled to Hz by half
    /// the range span. Additive: multiple sources may write per cycle.
    pub fn add_frequency_offset(&mut self, normalized: f64) {
        self.frequency_offset += normalized * self.frequency_max_offset;
    }

    /// Accumulate a depth offset, unscaled. Additive, like
    /// [`add_frequency_offset`](Self::add_frequency_offset).
    pub fn add_amount_offset(&mut self, offset: f64) {
        self.amount_offset += offset;
    }

    /// Bind the unit from a parameter source at note-start.
    ///
    /// Pulls waveshape, base rate, and base depth for `slot` and applies
    /// them along with the voice's sample rate. When the slot's retrigger
    /// flag is set the phase restarts from zero; otherwise the oscillator
    /// resumes from the phase recorded by the last production.
    pub fn note_on<P: LfoParamSource + ?Sized>(
        &mut self,
        source: &P,
        slot: usize,
        sample_rate: f64,
    ) {
        let params = source.lfo_params(slot);
        self.set_waveshape(params.waveshape);
        self.set_sample_rate(sample_rate);
        self.set_frequency(params.rate);
        self.set_amount(params.amount);
        if params.retrigger {
            self.phase = 0.0;
            self.osc.set_phase(0.0);
        }
    }

    /// The unit has no release state; note-off is a no-op.
    pub fn note_off(&mut self) {}

    /// Phase recorded by the last production, in [0, 1).
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Current base depth.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Current base rate in Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// The frequency bounds fixed at construction.
    pub fn range(&self) -> FrequencyRange {
        self.range
    }
}
