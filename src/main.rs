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
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{crate_version, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lumaroute::color::Rgb;
use lumaroute::config::Routing;
use lumaroute::dmx::artnet::ArtDmx;
use lumaroute::dmx::universe::{self, Placement};
use lumaroute::dmx::UdpArtNetClient;
use lumaroute::engine::RoutingEngine;
use lumaroute::fixture::Fixture;
use lumaroute::frame::Frame;
use lumaroute::output::DEFAULT_FPS;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Routes video frames to LED fixtures over ArtNet."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verifies a routing configuration and prints the universe layout.
    Verify {
        /// The path to the routing config.
        config_path: String,
        /// Print the layout as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Sends a still image or test pattern to every output until interrupted.
    Run {
        /// The path to the routing config.
        config_path: String,
        /// A PNG to send instead of the test pattern.
        #[arg(short, long)]
        image: Option<String>,
        /// A solid color to send instead of the test pattern, in the form r,g,b.
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Decodes a hex encoded ArtDmx packet.
    Decode {
        /// The packet bytes as hex. Whitespace is ignored.
        packet: String,
    },
}

#[derive(Serialize)]
struct OutputLayout<'a> {
    id: &'a str,
    target: String,
    fps: f64,
    placements: Vec<Placement>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Verify { config_path, json } => {
            let routing = Routing::deserialize(&PathBuf::from(&config_path))?;
            let fixtures = routing.to_fixtures()?;
            let outputs = routing.to_outputs()?;
            let by_id: HashMap<&str, &Fixture> = fixtures
                .iter()
                .map(|fixture| (fixture.id(), fixture))
                .collect();

            let layouts: Vec<OutputLayout> = outputs
                .iter()
                .map(|output| OutputLayout {
                    id: output.id(),
                    target: output.target().to_string(),
                    fps: output.fps(),
                    placements: universe::layout_output(output, |id| by_id.get(id).copied()),
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&layouts)?);
                return Ok(());
            }

            println!("Fixtures (count: {}):", fixtures.len());
            for fixture in fixtures.iter() {
                println!("- {}", fixture);
                println!("  Universes: {}", fixture.universe_count());
            }

            println!("Outputs (count: {}):", outputs.len());
            for (output, layout) in outputs.iter().zip(layouts.iter()) {
                println!("- {}", output);
                if output.is_broadcast() {
                    println!("  Broadcast");
                }
                for fixture_id in output.fixture_ids() {
                    if !by_id.contains_key(fixture_id.as_str()) {
                        println!("  Missing fixture: {}", fixture_id);
                    }
                }
                for placement in layout.placements.iter() {
                    println!(
                        "  {}: universes {}-{}, {} pixels per universe",
                        placement.fixture_id,
                        placement.first_universe(),
                        placement.last_universe(),
                        placement.allocation.pixels_per_universe()
                    );
                    if !placement.is_addressable() {
                        println!("    Past the last ArtNet universe, won't be sent");
                    }
                }
            }
        }
        Commands::Run {
            config_path,
            image,
            color,
        } => {
            let routing = Routing::deserialize(&PathBuf::from(&config_path))?;
            let engine_config = routing.engine();
            let client = Arc::new(UdpArtNetClient::bind(engine_config.bind_address()?)?);
            let engine = Arc::new(RoutingEngine::new(client, engine_config.settings()?));
            for fixture in routing.to_fixtures()? {
                engine.register_fixture(fixture)?;
            }
            for output in routing.to_outputs()? {
                engine.register_output(output)?;
            }

            let canvas = engine.settings().canvas;
            let (width, height) = (canvas.width.round() as u32, canvas.height.round() as u32);
            let frame = match (image, color) {
                (Some(path), _) => Frame::open(Path::new(&path))?,
                (None, Some(color)) => Frame::solid(width, height, parse_color(&color)?),
                (None, None) => Frame::horizontal_gradient(
                    width,
                    height,
                    Rgb::new(255, 0, 0),
                    Rgb::new(0, 0, 255),
                ),
            };

            let fps = engine
                .outputs()
                .iter()
                .filter(|output| output.is_active())
                .map(|output| output.fps())
                .fold(0.0, f64::max);
            let fps = if fps > 0.0 { fps } else { DEFAULT_FPS };
            info!(fps, "Sending frames, press Ctrl-C to stop.");

            let runner = {
                let engine = engine.clone();
                tokio::task::spawn_blocking(move || {
                    let interval = Duration::from_secs_f64(1.0 / fps);
                    let layers = HashMap::new();
                    let mut frames: u64 = 0;
                    while !engine.is_stopped() {
                        let start = Instant::now();
                        engine.process_frame(&frame, &layers);
                        frames += 1;
                        if let Some(remaining) = interval.checked_sub(start.elapsed()) {
                            spin_sleep::sleep(remaining);
                        }
                    }
                    frames
                })
            };

            tokio::signal::ctrl_c().await?;
            engine.stop();
            let frames = runner.await?;

            info!(frames, "Stopped.");
            for status in engine.statuses() {
                info!(
                    output = %status.id,
                    state = ?status.state,
                    frames_sent = status.frames_sent,
                    packets_sent = status.packets_sent,
                    failures = status.failures,
                    "Output summary."
                );
            }
        }
        Commands::Decode { packet } => {
            let packet = ArtDmx::decode(&parse_hex(&packet)?)?;
            println!("Sequence: {}", packet.sequence);
            println!("Physical: {}", packet.physical);
            println!("Universe: {}", packet.universe);
            println!("Length: {}", packet.data.len());
            let last_lit = packet.data.iter().rposition(|value| *value != 0);
            match last_lit {
                Some(last) => println!("Data: {:?}", &packet.data[..=last]),
                None => println!("Data: all zero"),
            }
        }
    }

    Ok(())
}

fn parse_color(color: &str) -> Result<Rgb, Box<dyn Error>> {
    let components = color
        .split(',')
        .map(|component| component.trim().parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()?;
    match components.as_slice() {
        &[r, g, b] => Ok(Rgb::new(r, g, b)),
        _ => Err(format!("expected r,g,b, got {}", color).into()),
    }
}

fn parse_hex(packet: &str) -> Result<Vec<u8>, Box<dyn Error>> {
    let digits: String = packet.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(hex::decode(digits)?)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(Rgb::new(1, 20, 255), parse_color("1, 20,255").unwrap());
        assert!(parse_color("1,2").is_err());
        assert!(parse_color("1,2,300").is_err());
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(vec![0x41, 0x72, 0x00], parse_hex("41 72 00").unwrap());
        assert_eq!(vec![0xde, 0xad, 0xbe, 0xef], parse_hex("DEAD\nbeef").unwrap());
        assert!(parse_hex("417").is_err());
        assert!(parse_hex("zz").is_err());
    }
}
