//! # Warble: Per-Voice LFO Modulation Engine
//!
//! `warble` is a Rust library providing the modulation layer of a software
//! synthesizer voice: low-frequency oscillators that produce a bounded
//! control signal each processing block and a compact destination scheme
//! deciding which synthesis parameter that signal drives: an operator's
//! level or phase, the filter's cutoff or resonance, or another LFO's
//! own rate or depth.
//!
//! ## Architecture
//!
//! Data flows parameter store → LFO unit → synthesis targets:
//!
//! - **Oscillator core** ([`osc`]) - single-sample waveform generator with
//!   selectable shape, exclusively owned by its LFO unit
//! - **LFO unit** ([`lfo`]) - clamps base rate/depth plus transient offset
//!   accumulators, produces one modulation sample per control block
//! - **Destination routing** ([`routing`]) - decodes the flat integer id
//!   layout into typed destinations and answers classification queries
//! - **Parameters** ([`params`], [`io`]) - validated ranges, per-slot
//!   note-start values, JSON presets, and a lock-free hand-off for values
//!   owned by a control thread
//! - **Voice rack** ([`voice`]) - per-voice slot collection dispatching
//!   produced samples to their targets, including cross-LFO modulation
//!
//! ## Quick Start
//!
//! ```rust
//! use warble::prelude::*;
//!
//! let range = FrequencyRange::new(0.1, 20.0).unwrap();
//! let layout = RoutingLayout::new(4, 2);
//! let mut rack = LfoRack::new(layout, range, 48_000.0);
//!
//! // Route LFO 0 at the filter cutoff, LFO 1 at operator 0's level
//! rack.set_destination(0, FILTER_FREQ_SLOT);
//! rack.set_destination(1, 0);
//!
//! let mut bank = LfoParamBank::new(2);
//! bank.set(
//!     0,
//!     LfoParams {
//!         waveshape: Waveshape::Triangle,
//!         rate: 2.0,
//!         amount: 0.5,
//!         retrigger: true,
//!     },
//! );
//!
//! rack.note_on(&bank, 48_000.0);
//! let frame = rack.produce_block();
//! assert!(frame.filter_freq.abs() <= 1.0);
//! ```

pub mod io;
pub mod lfo;
pub mod osc;
pub mod params;
pub mod routing;
pub mod voice;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::io::{AtomicF64, SharedLfoBank, SharedLfoSlot};
    pub use crate::lfo::LfoUnit;
    pub use crate::osc::{Oscillator, Waveshape};
    pub use crate::params::{FrequencyRange, LfoParamBank, LfoParamSource, LfoParams, ParamError};
    pub use crate::routing::{
        Destination, RoutingLayout, FILTER_FREQ_SLOT, FILTER_RES_SLOT, LFO_SLOT_BASE,
        MAX_OPERATORS,
    };
    pub use crate::voice::{LfoRack, ModulationFrame};
}

// Re-export key types at crate root for convenience
pub use prelude::*;
