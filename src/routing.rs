//! Destination Routing
//!
//! A modulation destination is addressed by a single non-negative integer
//! id assigned by the owning voice. The flat id space packs the voice's
//! routing matrix:
//!
//! ```text
//! 0..8   operator block, even = output level, odd = phase
//!        (a fixed 8-slot region, interleaved per operator)
//! 8      filter cutoff
//! 9      filter resonance
//! 10..   LFO block, even = rate, odd = amount, sized to lfos - 1
//!        (one interleaved pair per destination LFO, the producer
//!        itself excluded)
//! ```
//!
//! The integer layout is a compatibility boundary: hosts and presets
//! speak raw ids, everything inside the crate works with the decoded
//! [`Destination`]. Ids that fall outside the populated regions are
//! inert: they decode to `None` and classify false in every query.

use serde::{Deserialize, Serialize};

/// Destination id of the filter cutoff slot.
pub const FILTER_FREQ_SLOT: i64 = 8;

/// Destination id of the filter resonance slot.
pub const FILTER_RES_SLOT: i64 = 9;

/// First destination id of the LFO block.
pub const LFO_SLOT_BASE: i64 = 10;

/// Operator capacity of the fixed operator block (ids `0..8`).
pub const MAX_OPERATORS: usize = 4;

/// A decoded modulation destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Destination {
    /// Output level of operator `op`.
    OpLevel { op: usize },
    /// Phase of operator `op`.
    OpPhase { op: usize },
    /// Filter cutoff frequency.
    FilterFreq,
    /// Filter resonance.
    FilterRes,
    /// Base rate of another LFO. `lfo` counts destination LFOs in slot
    /// order with the producing LFO excluded.
    LfoRate { lfo: usize },
    /// Base depth of another LFO. `lfo` counts as in
    /// [`LfoRate`](Destination::LfoRate).
    LfoAmount { lfo: usize },
}

/// Destination-id layout for one voice: how many operator slots and LFO
/// slots the id space is populated for.
///
/// The layout constants are frozen: the operator block always spans ids
/// `0..8` and the filter slots sit at 8 and 9 regardless of how few
/// operators a voice has. Unpopulated ids inside those regions are
/// simply unassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingLayout {
    operators: usize,
    lfos: usize,
}

impl RoutingLayout {
    /// `operators` must not exceed [`MAX_OPERATORS`]; the operator block
    /// cannot grow past id 7 without colliding with the filter slots.
    pub fn new(operators: usize, lfos: usize) -> Self {
        debug_assert!(operators <= MAX_OPERATORS);
        Self { operators, lfos }
    }

    pub fn operators(&self) -> usize {
        self.operators
    }

    pub fn lfos(&self) -> usize {
        self.lfos
    }

    /// Decode a raw destination id.
    ///
    /// Malformed ids (negative, in the gap above the populated operator
    /// slots, or past the end of the LFO block) decode to `None`.
    pub fn decode(&self, id: i64) -> Option<Destination> {
        if id < 0 {
            return None;
        }

        let operators = self.operators.min(MAX_OPERATORS) as i64;
        if id < 2 * operators {
            let op = (id / 2) as usize;
            return Some(if id % 2 == 0 {
                Destination::OpLevel { op }
            } else {
                Destination::OpPhase { op }
            });
        }

        if id == FILTER_FREQ_SLOT {
            return Some(Destination::FilterFreq);
        }
        if id == FILTER_RES_SLOT {
            return Some(Destination::FilterRes);
        }

        let lfo_end = LFO_SLOT_BASE + 2 * self.lfos.saturating_sub(1) as i64;
        if id >= LFO_SLOT_BASE && id < lfo_end {
            let lfo = ((id - LFO_SLOT_BASE) / 2) as usize;
            return Some(if (id - LFO_SLOT_BASE) % 2 == 0 {
                Destination::LfoRate { lfo }
            } else {
                Destination::LfoAmount { lfo }
            });
        }

        None
    }

    /// Re-encode a destination into the raw id layout. Inverse of
    /// [`decode`](Self::decode) for every destination the layout
    /// populates.
    pub fn encode(&self, destination: Destination) -> i64 {
        match destination {
            Destination::OpLevel { op } => 2 * op as i64,
            Destination::OpPhase { op } => 2 * op as i64 + 1,
            Destination::FilterFreq => FILTER_FREQ_SLOT,
            Destination::FilterRes => FILTER_RES_SLOT,
            Destination::LfoRate { lfo } => LFO_SLOT_BASE + 2 * lfo as i64,
            Destination::LfoAmount { lfo } => LFO_SLOT_BASE + 2 * lfo as i64 + 1,
        }
    }

    /// Whether `id` targets an operator's output level.
    pub fn targets_op_level(&self, id: i64) -> bool {
        matches!(self.decode(id), Some(Destination::OpLevel { .. }))
    }

    /// Whether `id` targets an operator's phase.
    pub fn targets_op_phase(&self, id: i64) -> bool {
        matches!(self.decode(id), Some(Destination::OpPhase { .. }))
    }

    /// Whether `id` targets the filter cutoff.
    pub fn targets_filter_freq(&self, id: i64) -> bool {
        matches!(self.decode(id), Some(Destination::FilterFreq))
    }

    /// Whether `id` targets the filter resonance.
    pub fn targets_filter_res(&self, id: i64) -> bool {
        matches!(self.decode(id), Some(Destination::FilterRes))
    }

    /// Whether `id` targets another LFO's rate.
    pub fn targets_lfo_rate(&self, id: i64) -> bool {
        matches!(self.decode(id), Some(Destination::LfoRate { .. }))
    }

    /// Whether `id` targets another LFO's depth.
    pub fn targets_lfo_amount(&self, id: i64) -> bool {
        matches!(self.decode(id), Some(Destination::LfoAmount { .. }))
    }
}
