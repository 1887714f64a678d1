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

use std::path::Path;

use config::{Config, File, FileFormat};
use serde::Deserialize;

mod engine;
mod error;
mod fixture;
mod output;

pub use self::engine::Engine;
pub use self::error::ConfigError;
pub use self::fixture::Fixture;
pub use self::output::Output;

/// A complete routing configuration: engine settings, fixtures and outputs.
#[derive(Deserialize, Clone, Debug)]
pub struct Routing {
    engine: Option<Engine>,

    #[serde(default)]
    fixtures: Vec<Fixture>,

    #[serde(default)]
    outputs: Vec<Output>,
}

impl Routing {
    /// Loads a routing configuration from a YAML file.
    pub fn deserialize(path: &Path) -> Result<Routing, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Routing>()?)
    }

    /// Parses a routing configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Routing, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize::<Routing>()?)
    }

    pub fn engine(&self) -> Engine {
        self.engine.clone().unwrap_or_default()
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Converts every configured fixture.
    pub fn to_fixtures(&self) -> Result<Vec<crate::fixture::Fixture>, ConfigError> {
        self.fixtures.iter().map(Fixture::to_fixture).collect()
    }

    /// Converts every configured output.
    pub fn to_outputs(&self) -> Result<Vec<crate::output::Output>, ConfigError> {
        self.outputs.iter().map(Output::to_output).collect()
    }
}
