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

use serde::Serialize;

use super::processing::OutputRuntime;
use super::RoutingEngine;
use crate::dmx::TransmitOutcome;
use crate::output::Output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutputState {
    /// Inactive, or nothing has been sent yet.
    Idle,
    Active,
    /// The most recent send failed.
    Degraded,
}

/// A snapshot of an output for display.
#[derive(Debug, Clone, Serialize)]
pub struct OutputStatus {
    pub id: String,
    pub name: String,
    pub target: String,
    pub state: OutputState,
    pub frames_sent: u64,
    pub packets_sent: u64,
    pub frames_throttled: u64,
    pub frames_unchanged: u64,
    pub failures: u64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub sequence: u8,
    pub last_outcome: Option<TransmitOutcome>,
}

impl OutputStatus {
    fn new(output: &Output, runtime: &OutputRuntime) -> OutputStatus {
        let transmitter = &runtime.transmitter;
        let stats = transmitter.stats();
        let state = if stats.consecutive_failures > 0 {
            OutputState::Degraded
        } else if output.is_active() && stats.frames_sent + stats.frames_unchanged > 0 {
            OutputState::Active
        } else {
            OutputState::Idle
        };

        OutputStatus {
            id: output.id().to_string(),
            name: output.name().to_string(),
            target: transmitter.target().to_string(),
            state,
            frames_sent: stats.frames_sent,
            packets_sent: stats.packets_sent,
            frames_throttled: stats.frames_throttled,
            frames_unchanged: stats.frames_unchanged,
            failures: stats.failures,
            consecutive_failures: stats.consecutive_failures,
            last_error: stats.last_error.clone(),
            sequence: transmitter.sequence(),
            last_outcome: runtime.last_outcome.clone(),
        }
    }
}

impl RoutingEngine {
    pub fn output_status(&self, id: &str) -> Option<OutputStatus> {
        let output = self.output(id)?;
        let runtime = self.runtimes.lock().get(id).cloned()?;
        let runtime = runtime.lock();
        Some(OutputStatus::new(&output, &runtime))
    }

    /// Status of every output, sorted by id.
    pub fn statuses(&self) -> Vec<OutputStatus> {
        self.outputs()
            .iter()
            .filter_map(|output| self.output_status(output.id()))
            .collect()
    }
}
