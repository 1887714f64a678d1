// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, span, warn, Level};

use super::registry::{FixtureEntry, Registry};
use super::RoutingEngine;
use crate::color::Rgb;
use crate::dmx::delay::{capacity_for, DelayLine};
use crate::dmx::universe::DmxFrame;
use crate::dmx::{OutputTransmitter, TransmitOutcome};
use crate::fixture::{Fixture, DEFAULT_INPUT_LAYER};
use crate::frame::Frame;
use crate::output::Output;
use crate::sampling::master;

/// The result of one frame pass, per output id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameReport {
    pub outcomes: BTreeMap<String, TransmitOutcome>,
}

impl FrameReport {
    pub fn outcome(&self, output_id: &str) -> Option<&TransmitOutcome> {
        self.outcomes.get(output_id)
    }

    /// Total number of universes sent during the pass.
    pub fn universes_sent(&self) -> usize {
        self.outcomes
            .values()
            .map(|outcome| match outcome {
                TransmitOutcome::Sent { universes } => universes.len(),
                TransmitOutcome::Failed { sent, .. } => *sent,
                _ => 0,
            })
            .sum()
    }

    /// Ids of outputs that failed to send during the pass.
    pub fn failed(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, TransmitOutcome::Failed { .. }))
            .map(|(id, _)| id.as_str())
    }
}

/// Per output state that lives across frames.
pub(crate) struct OutputRuntime {
    pub transmitter: OutputTransmitter,
    /// Processed channel bytes per fixture, for fixtures with a timing delay.
    fixture_delays: HashMap<String, DelayLine<Vec<u8>>>,
    pub last_outcome: Option<TransmitOutcome>,
}

impl OutputRuntime {
    pub fn new(output: &Output, log_throttle: Duration) -> OutputRuntime {
        OutputRuntime {
            transmitter: OutputTransmitter::new(output, log_throttle),
            fixture_delays: HashMap::new(),
            last_outcome: None,
        }
    }

    pub fn reconfigure(&mut self, output: &Output) {
        self.transmitter.reconfigure(output);
        self.fixture_delays
            .retain(|fixture_id, _| output.fixture_ids().contains(fixture_id));
    }

    /// Runs a fixture's channels through its delay line. Until the line has
    /// filled up the fixture stays dark.
    fn delay_fixture(&mut self, fixture: &Fixture, fps: f64, channels: Vec<u8>) -> Vec<u8> {
        let capacity = capacity_for(fixture.delay_ms(), fps);
        if capacity == 0 {
            self.fixture_delays.remove(fixture.id());
            return channels;
        }

        let line = self
            .fixture_delays
            .entry(fixture.id().to_string())
            .or_insert_with(|| DelayLine::new(capacity));
        if line.capacity() != capacity {
            line.resize(capacity);
        }

        let len = channels.len();
        match line.push(channels) {
            // A frame queued before the fixture was reshaped is no longer usable.
            Some(delayed) if delayed.len() == len => delayed,
            _ => vec![0; len],
        }
    }
}

impl RoutingEngine {
    /// Routes one rendered frame to every registered output.
    ///
    /// `layers` maps layer names to frames; fixtures read from their input
    /// layer and fall back to the composite frame if it isn't there.
    pub fn process_frame(
        &self,
        composite: &Frame,
        layers: &HashMap<String, Frame>,
    ) -> FrameReport {
        self.process_frame_at(composite, layers, Instant::now())
    }

    /// Same as [`process_frame`](Self::process_frame) with an explicit clock.
    pub fn process_frame_at(
        &self,
        composite: &Frame,
        layers: &HashMap<String, Frame>,
        now: Instant,
    ) -> FrameReport {
        let span = span!(Level::DEBUG, "process frame");
        let _enter = span.enter();

        let guard = self.registry.read();
        let registry: &Registry = &guard;
        let jobs: Vec<(Arc<Output>, Arc<Mutex<OutputRuntime>>)> = {
            let mut runtimes = self.runtimes.lock();
            registry
                .outputs
                .values()
                .map(|output| {
                    let runtime = runtimes
                        .entry(output.id().to_string())
                        .or_insert_with(|| {
                            Arc::new(Mutex::new(OutputRuntime::new(
                                output,
                                self.settings.log_throttle,
                            )))
                        })
                        .clone();
                    (output.clone(), runtime)
                })
                .collect()
        };

        let outcomes = jobs
            .par_iter()
            .map(|(output, runtime)| {
                let outcome =
                    self.process_output(registry, output, runtime, composite, layers, now);
                (output.id().to_string(), outcome)
            })
            .collect::<BTreeMap<String, TransmitOutcome>>();

        debug!(outputs = outcomes.len(), "Processed frame.");
        FrameReport { outcomes }
    }

    fn process_output(
        &self,
        registry: &Registry,
        output: &Output,
        runtime: &Mutex<OutputRuntime>,
        composite: &Frame,
        layers: &HashMap<String, Frame>,
        now: Instant,
    ) -> TransmitOutcome {
        let mut runtime = runtime.lock();
        let outcome = if !output.is_active() {
            TransmitOutcome::Inactive
        } else if self.stop_handle.is_stopped() {
            TransmitOutcome::Stopped
        } else if !runtime.transmitter.is_due(now) {
            runtime.transmitter.record_throttled();
            TransmitOutcome::Throttled
        } else {
            let frame = self.render_output(registry, output, &mut runtime, composite, layers);
            runtime
                .transmitter
                .transmit(frame, self.client.as_ref(), &self.stop_handle, now)
        };

        runtime.last_outcome = Some(outcome.clone());
        outcome
    }

    /// Builds the DMX frame for an output from all of its fixtures.
    fn render_output(
        &self,
        registry: &Registry,
        output: &Output,
        runtime: &mut OutputRuntime,
        composite: &Frame,
        layers: &HashMap<String, Frame>,
    ) -> DmxFrame {
        let entries: Vec<&FixtureEntry> = output
            .fixture_ids()
            .iter()
            .filter_map(|fixture_id| {
                let entry = registry.fixtures.get(fixture_id);
                if entry.is_none()
                    && self
                        .warnings
                        .first(&format!("missing:{}:{}", output.id(), fixture_id))
                {
                    warn!(
                        output = output.id(),
                        fixture = fixture_id,
                        "Output is assigned a fixture that doesn't exist, skipping it."
                    );
                }
                entry
            })
            .collect();

        let placements = registry.layout(output);

        let mut frame = DmxFrame::new();
        for (entry, placement) in entries.iter().zip(placements.iter()) {
            let fixture = &entry.fixture;
            if fixture.point_count() == 0 {
                continue;
            }
            if !placement.is_addressable() {
                if self
                    .warnings
                    .first(&format!("unaddressable:{}:{}", output.id(), fixture.id()))
                {
                    warn!(
                        output = output.id(),
                        fixture = fixture.id(),
                        last_universe = placement.last_universe(),
                        "Fixture lands past the last ArtNet universe, skipping it."
                    );
                }
                continue;
            }

            let channels = self.fixture_channels(registry, entry, output, composite, layers);
            let channels = runtime.delay_fixture(fixture, output.fps(), channels);

            for (pixel, values) in channels.chunks(fixture.channels_per_pixel()).enumerate() {
                frame.write(placement.allocation.address(pixel), values);
            }
            for universe in placement.first_universe()..=placement.last_universe() {
                frame.ensure_universe(universe);
            }
        }
        frame
    }

    /// Runs a fixture through sampling, correction, white synthesis and
    /// channel ordering. Returns the fixture's channel bytes in pixel order.
    fn fixture_channels(
        &self,
        registry: &Registry,
        entry: &FixtureEntry,
        output: &Output,
        composite: &Frame,
        layers: &HashMap<String, Frame>,
    ) -> Vec<u8> {
        let fixture = &entry.fixture;
        let colors = self.fixture_colors(registry, fixture, composite, layers);

        let order = fixture.channel_order();
        let channels_per_pixel = fixture.channels_per_pixel();
        if !order.fits(channels_per_pixel)
            && self.warnings.first(&format!("order:{}", fixture.id()))
        {
            warn!(
                fixture = fixture.id(),
                order = %order,
                variant = %fixture.variant(),
                "Channel order doesn't match the LED variant, using the native order."
            );
        }

        let mut channels = Vec::with_capacity(colors.len() * channels_per_pixel);
        for rgb in colors {
            let rgb = output.correction().apply(fixture.correction().apply(rgb));
            let pixel = order.apply(entry.synthesizer.apply(rgb));
            channels.extend_from_slice(pixel.as_slice());
        }
        channels
    }

    /// Samples a fixture, or derives its colors from its master.
    fn fixture_colors(
        &self,
        registry: &Registry,
        fixture: &Fixture,
        composite: &Frame,
        layers: &HashMap<String, Frame>,
    ) -> Vec<Rgb> {
        if let Some(master_id) = fixture.master_id() {
            match registry.fixtures.get(master_id) {
                Some(master) if master_id != fixture.id() => {
                    let master = &master.fixture;
                    let master_frame = self.input_frame(master, composite, layers);
                    let master_colors = self.sampler.sample(master.points(), master_frame);
                    return master::resolve(fixture, master, &master_colors);
                }
                Some(_) => {
                    if self.warnings.first(&format!("master:{}", fixture.id())) {
                        warn!(
                            fixture = fixture.id(),
                            "Fixture is its own master, sampling it directly."
                        );
                    }
                }
                None => {
                    if self.warnings.first(&format!("master:{}", fixture.id())) {
                        warn!(
                            fixture = fixture.id(),
                            master = master_id,
                            "Master fixture doesn't exist, sampling directly."
                        );
                    }
                }
            }
        }

        let frame = self.input_frame(fixture, composite, layers);
        self.sampler.sample(fixture.points(), frame)
    }

    fn input_frame<'a>(
        &self,
        fixture: &Fixture,
        composite: &'a Frame,
        layers: &'a HashMap<String, Frame>,
    ) -> &'a Frame {
        let layer = fixture.input_layer();
        match layers.get(layer) {
            Some(frame) => frame,
            None => {
                if layer != DEFAULT_INPUT_LAYER
                    && self.warnings.first(&format!("layer:{layer}"))
                {
                    warn!(
                        fixture = fixture.id(),
                        layer, "Input layer isn't available, using the composite frame."
                    );
                }
                composite
            }
        }
    }
}
