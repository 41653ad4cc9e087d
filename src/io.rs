//! Control-Thread Parameter Hand-Off
//!
//! The modulation core is single-threaded: production runs on the audio
//! thread and never takes a lock. When a UI or host thread owns the
//! parameter values, they cross over through the atomics here instead:
//! the control thread writes fields independently, the audio thread
//! snapshots them at note-start via [`LfoParamSource`].
//!
//! The hand-off is single-writer/single-reader per field. A note-start
//! read may interleave with a concurrent edit and observe a mix of old
//! and new fields; for control data bound once per note this is
//! acceptable, and no field itself can tear.

use crate::osc::Waveshape;
use crate::params::{LfoParamSource, LfoParams};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

/// Atomic f64 for lock-free communication between threads
///
/// Uses AtomicU64 internally since there's no native AtomicF64.
/// Suitable for real-time audio thread communication.
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl Default for AtomicF64 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Clone for AtomicF64 {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

/// One LFO slot's note-start parameters as shared atomics.
#[derive(Debug)]
pub struct SharedLfoSlot {
    rate: AtomicF64,
    amount: AtomicF64,
    waveshape: AtomicU32,
    retrigger: AtomicBool,
}

impl SharedLfoSlot {
    pub fn new(params: LfoParams) -> Self {
        Self {
            rate: AtomicF64::new(params.rate),
            amount: AtomicF64::new(params.amount),
            waveshape: AtomicU32::new(params.waveshape.id()),
            retrigger: AtomicBool::new(params.retrigger),
        }
    }

    /// Overwrite every field from `params`.
    pub fn store(&self, params: LfoParams) {
        self.rate.set(params.rate);
        self.amount.set(params.amount);
        self.waveshape.store(params.waveshape.id(), Ordering::Relaxed);
        self.retrigger.store(params.retrigger, Ordering::Relaxed);
    }

    /// Snapshot the current values.
    pub fn load(&self) -> LfoParams {
        LfoParams {
            waveshape: Waveshape::from_id(self.waveshape.load(Ordering::Relaxed)),
            rate: self.rate.get(),
            amount: self.amount.get(),
            retrigger: self.retrigger.load(Ordering::Relaxed),
        }
    }

    pub fn set_rate(&self, rate: f64) {
        self.rate.set(rate);
    }

    pub fn set_amount(&self, amount: f64) {
        self.amount.set(amount);
    }

    pub fn set_waveshape(&self, waveshape: Waveshape) {
        self.waveshape.store(waveshape.id(), Ordering::Relaxed);
    }

    pub fn set_retrigger(&self, retrigger: bool) {
        self.retrigger.store(retrigger, Ordering::Relaxed);
    }
}

impl Default for SharedLfoSlot {
    fn default() -> Self {
        Self::new(LfoParams::default())
    }
}

/// A bank of shared slots. Cloning is cheap and every clone sees the
/// same underlying values, so one handle can live with the UI and
/// another with the audio thread.
#[derive(Debug, Clone)]
pub struct SharedLfoBank {
    slots: Arc<Vec<SharedLfoSlot>>,
}

impl SharedLfoBank {
    pub fn new(slots: usize) -> Self {
        Self {
            slots: Arc::new((0..slots).map(|_| SharedLfoSlot::default()).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, slot: usize) -> Option<&SharedLfoSlot> {
        self.slots.get(slot)
    }
}

impl LfoParamSource for SharedLfoBank {
    fn lfo_params(&self, slot: usize) -> LfoParams {
        self.slots
            .get(slot)
            .map(SharedLfoSlot::load)
            .unwrap_or_default()
    }
}
