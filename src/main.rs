// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: CLI entry point - builds a PlanetConfig from flags, runs the simulation headlessly
// ABOUTME: for a requested number of steps, and optionally saves the resulting state to disk

use clap::Parser;
use tectonika::engine::backend::BackendKind;
use tectonika::{PlanetConfig, Simulation};

#[derive(Parser)]
#[command(name = "tectonika")]
#[command(about = "Spherical voxel planetary geodynamics simulator")]
struct Args {
    /// Planet radius in meters.
    #[arg(long, default_value = "6371000")]
    radius_m: f64,

    /// Number of shells from core to surface.
    #[arg(long, default_value = "20")]
    shell_count: usize,

    /// Latitude band count per shell.
    #[arg(long, default_value = "60")]
    lat_bands: usize,

    /// Longitude count at the equator.
    #[arg(long, default_value = "120")]
    lon_base: usize,

    /// Compute backend: cpu, compute, metal, or opencl. Non-cpu backends currently downgrade
    /// to cpu with a one-time warning.
    #[arg(long, default_value = "cpu")]
    backend: String,

    /// Simulated years advanced per real second the driver is stepped with.
    #[arg(long, default_value = "100000")]
    time_scale: f64,

    /// Reproducibility seed for hotspot/continent placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of the surface that starts as ocean.
    #[arg(long, default_value = "0.6")]
    ocean_fraction: f64,

    /// Number of real-time seconds to step the simulation.
    #[arg(short, long, default_value = "10")]
    steps: u64,

    /// Real-time seconds advanced per step.
    #[arg(long, default_value = "1.0")]
    dt_seconds: f64,

    /// Load an existing planet snapshot instead of generating a new one.
    #[arg(long)]
    load: Option<String>,

    /// Save the resulting planet snapshot to this path after stepping.
    #[arg(long)]
    save: Option<String>,

    /// Suppress per-step progress output.
    #[arg(short, long)]
    quiet: bool,
}

fn parse_backend(name: &str) -> Result<BackendKind, String> {
    match name.to_lowercase().as_str() {
        "cpu" => Ok(BackendKind::Cpu),
        "compute" => Ok(BackendKind::Compute),
        "metal" => Ok(BackendKind::Metal),
        "opencl" => Ok(BackendKind::OpenCl),
        other => Err(format!("unknown backend `{other}`")),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = PlanetConfig {
        radius_m: args.radius_m,
        shell_count: args.shell_count,
        lat_bands: args.lat_bands,
        lon_base: args.lon_base,
        backend: parse_backend(&args.backend)?,
        time_scale_years_per_second: args.time_scale,
        seed: args.seed,
        initial_ocean_fraction: args.ocean_fraction,
    };

    let mut sim = match &args.load {
        Some(path) => Simulation::load_from_file(config, path)?,
        None => Simulation::new(config)?,
    };

    if !args.quiet {
        println!(
            "tectonika: {} shells, {} lat bands, backend={}",
            sim.config().shell_count,
            sim.config().lat_bands,
            sim.config().backend
        );
    }

    for step in 0..args.steps {
        sim.step(args.dt_seconds)?;
        if !args.quiet {
            println!(
                "step {step}: elapsed={:.3e} yr, sea_level={:.1} m",
                sim.planet().elapsed_years,
                sim.planet().sea_level_m
            );
        }
    }

    if let Some(path) = &args.save {
        sim.save_to_file(path)?;
        if !args.quiet {
            println!("saved snapshot to {path}");
        }
    }

    Ok(())
}
