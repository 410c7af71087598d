mod options;

use std::fs;
use std::io::Write as _;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use gumdrop::Options;
use log::LevelFilter;
use simplelog::{Config, TermLogger, TerminalMode};

use options::AppOptions;
use rustyboi_core::emulator::{load_boot_rom, Emulator, HostPresenter};
use rustyboi_core::hardware::ppu::palette::RGB;
use rustyboi_core::hardware::ppu::{RESOLUTION_HEIGHT, RESOLUTION_WIDTH};
use rustyboi_core::{EmulatorOptionsBuilder, InputKey, GREY_PALETTE, NOSTALGIC_PALETTE};

/// No window, no input, no sound; just runs the requested number of frames and
/// reports on what happened. A real front-end implements `HostPresenter` the
/// same way, wired up to a window and a controller instead.
struct HeadlessHost;

impl HostPresenter for HeadlessHost {
    fn present_frame(&mut self, _frame_buffer: &[RGB]) {}

    fn poll_input(&mut self) -> Vec<(InputKey, bool)> {
        Vec::new()
    }
}

fn level_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn read_boot_rom(path: &Path) -> Result<[u8; 256]> {
    let bytes = fs::read(path).with_context(|| format!("reading boot ROM {}", path.display()))?;
    load_boot_rom(&bytes).map_err(|e| anyhow!(e.to_string()))
}

fn write_ppm(path: &Path, frame: &[RGB]) -> Result<()> {
    let mut out = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write!(out, "P6\n{} {}\n255\n", RESOLUTION_WIDTH, RESOLUTION_HEIGHT)?;
    for pixel in frame {
        out.write_all(&[pixel.0, pixel.1, pixel.2])?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let opts = AppOptions::parse_args_default_or_exit();

    TermLogger::init(level_filter(opts.verbose), Config::default(), TerminalMode::Mixed)
        .context("initialising logger")?;

    let rom = fs::read(&opts.rom_path).with_context(|| format!("reading ROM {}", opts.rom_path.display()))?;
    let boot_rom = opts.boot_rom.as_deref().map(read_boot_rom).transpose()?;
    let palette = if opts.nostalgic_palette { NOSTALGIC_PALETTE } else { GREY_PALETTE };

    let emulator_options = EmulatorOptionsBuilder::new()
        .boot_rom(boot_rom)
        .display_colours(palette)
        .build();

    let mut emulator = Emulator::new(&rom, emulator_options).map_err(|e| anyhow!(e.to_string()))?;
    log::info!("running \"{}\"", emulator.cartridge_title());

    let mut host = HeadlessHost;
    for _ in 0..opts.frames {
        emulator.run_one_frame(&mut host);
    }

    let diagnostics = emulator.diagnostics();
    log::info!(
        "rendered {} frame(s) over {} cycles",
        diagnostics.frames_rendered,
        diagnostics.total_cycles
    );

    if let Some(path) = &opts.dump_frame {
        write_ppm(path, emulator.frame_buffer())?;
        log::info!("wrote final frame to {}", path.display());
    }

    Ok(())
}
