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

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::processing::OutputRuntime;
use super::RoutingEngine;
use crate::color::WhiteChannelSynthesizer;
use crate::dmx::universe::{self, Placement};
use crate::fixture::Fixture;
use crate::output::Output;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{kind} has no id")]
    MissingIdentity { kind: &'static str },
    #[error("unknown fixture {0}")]
    UnknownFixture(String),
    #[error("unknown output {0}")]
    UnknownOutput(String),
}

/// A registered fixture and its resolved white channel pipeline.
pub(super) struct FixtureEntry {
    pub fixture: Arc<Fixture>,
    pub synthesizer: WhiteChannelSynthesizer,
}

#[derive(Default)]
pub(super) struct Registry {
    pub fixtures: HashMap<String, FixtureEntry>,
    pub outputs: HashMap<String, Arc<Output>>,
}

impl Registry {
    /// Lays out an output's fixtures. Unknown fixture ids take no space.
    pub fn layout(&self, output: &Output) -> Vec<Placement> {
        universe::layout_output(output, |id| {
            self.fixtures.get(id).map(|entry| entry.fixture.as_ref())
        })
    }
}

impl RoutingEngine {
    /// Adds a fixture, or replaces the fixture with the same id.
    pub fn register_fixture(&self, fixture: Fixture) -> Result<(), RegistryError> {
        if fixture.id().trim().is_empty() {
            return Err(RegistryError::MissingIdentity { kind: "fixture" });
        }

        let synthesizer = WhiteChannelSynthesizer::new(fixture.variant(), fixture.white());
        let id = fixture.id().to_string();
        debug!(fixture = %fixture, "Registering fixture.");

        let mut registry = self.registry.write();
        registry.fixtures.insert(
            id,
            FixtureEntry {
                fixture: Arc::new(fixture),
                synthesizer,
            },
        );
        Ok(())
    }

    /// Adds an output, or reconfigures the output with the same id. A
    /// reconfigured output keeps its delay line and counters.
    pub fn register_output(&self, output: Output) -> Result<(), RegistryError> {
        if output.id().trim().is_empty() {
            return Err(RegistryError::MissingIdentity { kind: "output" });
        }

        let mut registry = self.registry.write();
        for fixture_id in output.fixture_ids() {
            if !registry.fixtures.contains_key(fixture_id) {
                debug!(
                    output = output.id(),
                    fixture = fixture_id,
                    "Output references a fixture that isn't registered yet."
                );
            }
        }

        for placement in registry.layout(&output) {
            if !placement.is_addressable() {
                warn!(
                    output = output.id(),
                    fixture = placement.fixture_id.as_str(),
                    last_universe = placement.last_universe(),
                    "Fixture lands past the last ArtNet universe and won't be sent."
                );
            }
        }

        let mut runtimes = self.runtimes.lock();
        match runtimes.get(output.id()) {
            Some(runtime) => {
                info!(output = %output, "Reconfiguring output.");
                runtime.lock().reconfigure(&output);
            }
            None => {
                info!(output = %output, "Registering output.");
                runtimes.insert(
                    output.id().to_string(),
                    Arc::new(Mutex::new(OutputRuntime::new(
                        &output,
                        self.settings.log_throttle,
                    ))),
                );
            }
        }

        registry
            .outputs
            .insert(output.id().to_string(), Arc::new(output));
        Ok(())
    }

    /// Removes a fixture and strips it from every output it was assigned to.
    pub fn remove_fixture(&self, id: &str) -> Option<Arc<Fixture>> {
        let mut registry = self.registry.write();
        let entry = registry.fixtures.remove(id)?;

        for output in registry.outputs.values_mut() {
            if output.fixture_ids().iter().any(|fixture_id| fixture_id == id) {
                Arc::make_mut(output).unassign(id);
                debug!(output = output.id(), fixture = id, "Unassigned removed fixture.");
            }
        }

        info!(fixture = id, "Removed fixture.");
        Some(entry.fixture)
    }

    /// Removes an output along with its runtime state.
    pub fn remove_output(&self, id: &str) -> Option<Arc<Output>> {
        let mut registry = self.registry.write();
        let output = registry.outputs.remove(id)?;
        self.runtimes.lock().remove(id);
        info!(output = id, "Removed output.");
        Some(output)
    }

    /// Appends a registered fixture to an output.
    pub fn assign_fixture(&self, output_id: &str, fixture_id: &str) -> Result<(), RegistryError> {
        let mut registry = self.registry.write();
        if !registry.fixtures.contains_key(fixture_id) {
            return Err(RegistryError::UnknownFixture(fixture_id.to_string()));
        }
        let output = registry
            .outputs
            .get_mut(output_id)
            .ok_or_else(|| RegistryError::UnknownOutput(output_id.to_string()))?;
        Arc::make_mut(output).assign(fixture_id);
        Ok(())
    }

    /// Removes a fixture from an output. Returns false if it wasn't assigned.
    pub fn unassign_fixture(&self, output_id: &str, fixture_id: &str) -> Result<bool, RegistryError> {
        let mut registry = self.registry.write();
        let output = registry
            .outputs
            .get_mut(output_id)
            .ok_or_else(|| RegistryError::UnknownOutput(output_id.to_string()))?;
        Ok(Arc::make_mut(output).unassign(fixture_id))
    }

    pub fn fixture(&self, id: &str) -> Option<Arc<Fixture>> {
        self.registry
            .read()
            .fixtures
            .get(id)
            .map(|entry| entry.fixture.clone())
    }

    pub fn output(&self, id: &str) -> Option<Arc<Output>> {
        self.registry.read().outputs.get(id).cloned()
    }

    /// All fixtures, sorted by id.
    pub fn fixtures(&self) -> Vec<Arc<Fixture>> {
        let mut fixtures: Vec<Arc<Fixture>> = self
            .registry
            .read()
            .fixtures
            .values()
            .map(|entry| entry.fixture.clone())
            .collect();
        fixtures.sort_by(|a, b| a.id().cmp(b.id()));
        fixtures
    }

    /// All outputs, sorted by id.
    pub fn outputs(&self) -> Vec<Arc<Output>> {
        let mut outputs: Vec<Arc<Output>> = self.registry.read().outputs.values().cloned().collect();
        outputs.sort_by(|a, b| a.id().cmp(b.id()));
        outputs
    }

    /// Where each of the output's fixtures lands.
    pub fn layout(&self, output_id: &str) -> Option<Vec<Placement>> {
        let registry = self.registry.read();
        let output = registry.outputs.get(output_id)?;
        Some(registry.layout(output))
    }
}
