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
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::dmx::ArtNetClient;
use crate::sampling::{Canvas, FrameSampler};
use crate::stop::StopHandle;
use crate::util::{WarnOnce, DEFAULT_LOG_THROTTLE};

use self::processing::OutputRuntime;
use self::registry::Registry;

mod processing;
mod registry;
mod status;


pub use processing::FrameReport;
pub use registry::RegistryError;
pub use status::{OutputState, OutputStatus};

/// Engine wide settings.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// The canvas fixture points were authored against.
    pub canvas: Canvas,
    /// Minimum time between two repeated transport error logs for an output.
    pub log_throttle: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            canvas: Canvas::default(),
            log_throttle: DEFAULT_LOG_THROTTLE,
        }
    }
}

/// The routing engine. Owns the fixture and output registries and turns each
/// rendered frame into ArtNet packets for every active output.
pub struct RoutingEngine {
    registry: RwLock<Registry>,
    /// Runtime state (delay lines, delta snapshots, counters) keyed by output id.
    /// Kept apart from the registry so outputs can be reconfigured without losing it.
    runtimes: Mutex<HashMap<String, Arc<Mutex<OutputRuntime>>>>,
    client: Arc<dyn ArtNetClient>,
    settings: EngineSettings,
    sampler: FrameSampler,
    stop_handle: StopHandle,
    warnings: WarnOnce,
}

impl RoutingEngine {
    /// Creates a new, empty routing engine that sends through the given client.
    pub fn new(client: Arc<dyn ArtNetClient>, settings: EngineSettings) -> RoutingEngine {
        info!(
            canvas_width = settings.canvas.width,
            canvas_height = settings.canvas.height,
            "Starting routing engine."
        );
        RoutingEngine {
            registry: RwLock::new(Registry::default()),
            runtimes: Mutex::new(HashMap::new()),
            client,
            settings,
            sampler: FrameSampler::new(settings.canvas),
            stop_handle: StopHandle::new(),
            warnings: WarnOnce::new(),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Stops the engine. Sends already in progress complete; nothing new is sent.
    pub fn stop(&self) {
        if !self.stop_handle.is_stopped() {
            info!("Stopping routing engine.");
        }
        self.stop_handle.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_handle.is_stopped()
    }

    /// A handle that can stop the engine from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }
}
