// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jerry Snitselaar and contributors

// ABOUTME: Terminal preview of a planet's surface shell, reading nothing but the published
// ABOUTME: RenderSnapshot -- demonstrates the renderer-never-writes-back contract (spec.md §6)

use std::io;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use tectonika::{Material, PlanetConfig, RenderSnapshot, Simulation};

#[derive(Parser)]
#[command(name = "snapshot-preview")]
#[command(about = "Generate a planet and preview its surface shell in a terminal")]
struct Args {
    /// Latitude band count for the preview planet (kept small; this is a visualization demo).
    #[arg(long, default_value = "40")]
    lat_bands: usize,

    /// Longitude count at the equator.
    #[arg(long, default_value = "80")]
    lon_base: usize,

    /// Number of shells.
    #[arg(long, default_value = "6")]
    shell_count: usize,

    /// Reproducibility seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of 1-second steps to advance before previewing.
    #[arg(long, default_value = "0")]
    warmup_steps: u64,
}

fn material_glyph(material: Material) -> (char, Color) {
    match material {
        Material::Water => ('~', Color::Blue),
        Material::Air => ('.', Color::Gray),
        Material::Ice => ('%', Color::Cyan),
        Material::Sediment => (',', Color::Yellow),
        Material::Sand => (':', Color::Yellow),
        Material::Granite => ('#', Color::Green),
        Material::Basalt => ('^', Color::DarkGray),
        Material::Peridotite => ('o', Color::Magenta),
        Material::Magma => ('*', Color::Red),
    }
}

/// Downsample the surface shell's packed material array onto a `rows x cols` terminal grid.
fn build_grid(snapshot: &RenderSnapshot, rows: usize, cols: usize) -> Vec<Line<'static>> {
    let surface_shell = snapshot.offsets.band_lon_counts.len() - 1;
    let start = snapshot.offsets.shell_offsets[surface_shell];
    let band_counts = &snapshot.offsets.band_lon_counts[surface_shell];
    let lat_bands = band_counts.len();

    let mut lines = Vec::with_capacity(rows);
    for row in 0..rows {
        let band = (row * lat_bands / rows.max(1)).min(lat_bands.saturating_sub(1));
        let band_offset: usize = band_counts[..band].iter().sum();
        let lon_count = band_counts[band].max(1);

        let mut spans = Vec::with_capacity(cols);
        for col in 0..cols {
            let lon = (col * lon_count / cols.max(1)).min(lon_count.saturating_sub(1));
            let flat = start + band_offset + lon;
            let material_tag = snapshot.voxels.material[flat];
            let material = Material::from_u8(material_tag).unwrap_or(Material::Water);
            let (glyph, color) = material_glyph(material);
            spans.push(Span::styled(glyph.to_string(), Style::default().fg(color)));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn draw(f: &mut Frame, snapshot: &RenderSnapshot) {
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(size);

    let rows = chunks[0].height.saturating_sub(2) as usize;
    let cols = chunks[0].width.saturating_sub(2) as usize;
    let grid = build_grid(snapshot, rows.max(1), cols.max(1));

    let map = Paragraph::new(grid).block(
        Block::default()
            .borders(Borders::ALL)
            .title("tectonika surface preview (q to quit)"),
    );
    f.render_widget(map, chunks[0]);

    let status = Paragraph::new(format!(
        "t={:.3e} yr  sea_level={:.1} m  plates={}",
        snapshot.elapsed_years,
        snapshot.sea_level_m,
        snapshot.plates.len()
    ))
    .style(Style::default().fg(Color::Gray));
    f.render_widget(status, chunks[1]);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = PlanetConfig {
        lat_bands: args.lat_bands,
        lon_base: args.lon_base,
        shell_count: args.shell_count,
        seed: args.seed,
        ..PlanetConfig::default()
    };

    let mut sim = Simulation::new(config)?;
    for _ in 0..args.warmup_steps {
        sim.step(1.0)?;
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let snapshot = sim.render_snapshot();
    sim.acknowledge_render();

    loop {
        terminal.draw(|f| draw(f, &snapshot))?;

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && key.code == KeyCode::Char('q') {
                    break;
                }
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
