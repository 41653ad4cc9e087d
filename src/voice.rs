//! Per-Voice LFO Rack
//!
//! Glue between the modulation units and the synthesis targets they
//! drive. The rack owns one [`LfoUnit`] per slot plus each slot's raw
//! destination id, runs every unit once per control block, and sorts the
//! produced samples into a [`ModulationFrame`] for the voice to apply to
//! its operators and filter. Samples routed at another LFO skip the
//! frame entirely and land on the target unit's offset accumulators.

use crate::lfo::LfoUnit;
use crate::params::{FrequencyRange, LfoParamSource};
use crate::routing::{Destination, RoutingLayout, MAX_OPERATORS};

/// One control block's worth of modulation, sorted by target.
///
/// The values are offsets for the voice to consume once and discard,
/// mirroring the accumulate-then-clear contract of the units themselves.
/// Multiple LFOs routed at the same target sum.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModulationFrame {
    pub op_level: [f64; MAX_OPERATORS],
    pub op_phase: [f64; MAX_OPERATORS],
    pub filter_freq: f64,
    pub filter_res: f64,
}

/// A voice's set of LFO slots with their destination routing.
pub struct LfoRack {
    units: Vec<LfoUnit>,
    destinations: Vec<i64>,
    layout: RoutingLayout,
}

impl LfoRack {
    /// Build a rack of `layout.lfos()` units sharing one frequency
    /// range. All slots start unrouted.
    pub fn new(layout: RoutingLayout, range: FrequencyRange, sample_rate: f64) -> Self {
        Self {
            units: (0..layout.lfos())
                .map(|_| LfoUnit::new(range, sample_rate))
                .collect(),
            destinations: vec![-1; layout.lfos()],
            layout,
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn layout(&self) -> RoutingLayout {
        self.layout
    }

    pub fn unit(&self, slot: usize) -> Option<&LfoUnit> {
        self.units.get(slot)
    }

    pub fn unit_mut(&mut self, slot: usize) -> Option<&mut LfoUnit> {
        self.units.get_mut(slot)
    }

    /// Route `slot`'s output to a raw destination id. Unroutable ids are
    /// accepted and stay inert.
    pub fn set_destination(&mut self, slot: usize, id: i64) {
        if let Some(entry) = self.destinations.get_mut(slot) {
            *entry = id;
        }
    }

    /// The decoded destination of `slot`, if it is routed anywhere.
    pub fn destination(&self, slot: usize) -> Option<Destination> {
        self.destinations
            .get(slot)
            .and_then(|&id| self.layout.decode(id))
    }

    /// Bind every slot from the parameter source at note-start.
    pub fn note_on<P: LfoParamSource + ?Sized>(&mut self, source: &P, sample_rate: f64) {
        for (slot, unit) in self.units.iter_mut().enumerate() {
            unit.note_on(source, slot, sample_rate);
        }
    }

    /// Note-off is a no-op for every unit; kept for lifecycle symmetry.
    pub fn note_off(&mut self) {
        for unit in &mut self.units {
            unit.note_off();
        }
    }

    /// Run every unit once and sort the outputs by destination.
    ///
    /// Slots are processed in index order. Cross-LFO modulation lands on
    /// the target's offset accumulators, so a lower slot reaches a
    /// higher slot within the same block, while a higher slot reaches a
    /// lower one at the next block.
    pub fn produce_block(&mut self) -> ModulationFrame {
        let mut frame = ModulationFrame::default();

        for slot in 0..self.units.len() {
            let sample = self.units[slot].produce_sample();
            match self.layout.decode(self.destinations[slot]) {
                Some(Destination::OpLevel { op }) => frame.op_level[op] += sample,
                Some(Destination::OpPhase { op }) => frame.op_phase[op] += sample,
                Some(Destination::FilterFreq) => frame.filter_freq += sample,
                Some(Destination::FilterRes) => frame.filter_res += sample,
                Some(Destination::LfoRate { lfo }) => {
                    let target = absolute_slot(slot, lfo);
                    if let Some(unit) = self.units.get_mut(target) {
                        unit.add_frequency_offset(sample);
                    }
                }
                Some(Destination::LfoAmount { lfo }) => {
                    let target = absolute_slot(slot, lfo);
                    if let Some(unit) = self.units.get_mut(target) {
                        unit.add_amount_offset(sample);
                    }
                }
                None => {}
            }
        }

        frame
    }
}

// Destination LFO indices count over the other slots in order; the
// producing slot has no entry of its own in the layout.
fn absolute_slot(producer: usize, index: usize) -> usize {
    if index >= producer {
        index + 1
    } else {
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osc::Waveshape;
    use crate::params::{LfoParamBank, LfoParams};
    use crate::routing::{FILTER_FREQ_SLOT, FILTER_RES_SLOT, LFO_SLOT_BASE};
    use approx::assert_relative_eq;

    const SAMPLE_RATE: f64 = 100.0;

    fn test_range() -> FrequencyRange {
        FrequencyRange::new(0.1, 10.0).unwrap()
    }

    // Square units read +1.0 at phase zero, so the first block's frame
    // carries each slot's bound amount verbatim.
    fn square_params(amount: f64) -> LfoParams {
        LfoParams {
            waveshape: Waveshape::Square,
            rate: 1.0,
            amount,
            retrigger: true,
        }
    }

    fn rack_with(amounts: &[f64]) -> LfoRack {
        let layout = RoutingLayout::new(2, amounts.len());
        let mut rack = LfoRack::new(layout, test_range(), SAMPLE_RATE);
        let mut bank = LfoParamBank::new(amounts.len());
        for (slot, &amount) in amounts.iter().enumerate() {
            bank.set(slot, square_params(amount));
        }
        rack.note_on(&bank, SAMPLE_RATE);
        rack
    }

    #[test]
    fn test_dispatch_into_frame_fields() {
        let mut rack = rack_with(&[0.25, 0.5, -0.75, 0.125]);
        rack.set_destination(0, 0); // operator 0 level
        rack.set_destination(1, 3); // operator 1 phase
        rack.set_destination(2, FILTER_FREQ_SLOT);
        rack.set_destination(3, FILTER_RES_SLOT);

        let frame = rack.produce_block();

        assert_relative_eq!(frame.op_level[0], 0.25);
        assert_relative_eq!(frame.op_phase[1], 0.5);
        assert_relative_eq!(frame.filter_freq, -0.75);
        assert_relative_eq!(frame.filter_res, 0.125);
        assert_relative_eq!(frame.op_level[1], 0.0);
        assert_relative_eq!(frame.op_phase[0], 0.0);
    }

    #[test]
    fn test_same_target_sums() {
        let mut rack = rack_with(&[0.25, 0.5]);
        rack.set_destination(0, FILTER_FREQ_SLOT);
        rack.set_destination(1, FILTER_FREQ_SLOT);

        let frame = rack.produce_block();
        assert_relative_eq!(frame.filter_freq, 0.75);
    }

    #[test]
    fn test_unrouted_and_malformed_slots_are_inert() {
        let mut rack = rack_with(&[0.5, 0.5, 0.5]);
        // slot 0 left at the unrouted default
        rack.set_destination(1, 100);
        rack.set_destination(2, -7);

        assert_eq!(rack.destination(0), None);
        let frame = rack.produce_block();
        assert_eq!(frame, ModulationFrame::default());
    }

    #[test]
    fn test_rate_modulation_reaches_target_same_block() {
        // Slot 0 routes at the first destination LFO, which is slot 1
        // from producer 0. Its +1.0 * 0.9 sample becomes a normalized
        // rate offset: 1 + 0.9 * 4.95 = 5.455 Hz effective on slot 1.
        let mut rack = rack_with(&[0.9, 0.0]);
        rack.set_destination(0, LFO_SLOT_BASE);

        rack.produce_block();
        assert_relative_eq!(
            rack.unit(1).unwrap().phase(),
            (1.0 + 0.9 * 4.95) / SAMPLE_RATE,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_rate_modulation_consumed_by_target_production() {
        let mut rack = rack_with(&[0.9, 0.0]);
        rack.set_destination(0, LFO_SLOT_BASE);

        rack.produce_block();
        let boosted = rack.unit(1).unwrap().phase();

        // Stop modulating: the target falls back to its base rate, so
        // the offset did not persist past its one consumption.
        rack.set_destination(0, -1);
        rack.produce_block();
        assert_relative_eq!(
            rack.unit(1).unwrap().phase() - boosted,
            1.0 / SAMPLE_RATE,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_amount_modulation_reaches_target_same_block() {
        let mut rack = rack_with(&[0.5, 0.25]);
        rack.set_destination(0, LFO_SLOT_BASE + 1); // first LFO-amount slot
        rack.set_destination(1, FILTER_FREQ_SLOT);

        // Slot 1's effective depth this block: 0.25 + 0.5 from slot 0.
        let frame = rack.produce_block();
        assert_relative_eq!(frame.filter_freq, 0.75);

        // Stop modulating: the offset was consumed, so slot 1 returns to
        // its base depth. The square is still in its high half at 1 Hz.
        rack.set_destination(0, -1);
        let frame = rack.produce_block();
        assert_relative_eq!(frame.filter_freq, 0.25);
    }

    #[test]
    fn test_lfo_index_skips_the_producer() {
        // From producer 2, destination indices 0 and 1 are slots 0 and 1.
        assert_eq!(absolute_slot(2, 0), 0);
        assert_eq!(absolute_slot(2, 1), 1);
        // From producer 0 they are slots 1 and 2.
        assert_eq!(absolute_slot(0, 0), 1);
        assert_eq!(absolute_slot(0, 1), 2);
        // From a middle producer the index steps over it.
        assert_eq!(absolute_slot(1, 0), 0);
        assert_eq!(absolute_slot(1, 1), 2);
    }

    #[test]
    fn test_note_off_is_a_no_op() {
        let mut rack = rack_with(&[0.5]);
        rack.set_destination(0, FILTER_FREQ_SLOT);
        rack.produce_block();
        let phase = rack.unit(0).unwrap().phase();

        rack.note_off();
        assert_relative_eq!(rack.unit(0).unwrap().phase(), phase);
        assert_relative_eq!(rack.unit(0).unwrap().amount(), 0.5);
    }
}
