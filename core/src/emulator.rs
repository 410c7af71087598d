//! Ties the CPU, its owned MMU, and the MMU's owned components together into a
//! runnable machine, and defines the error/diagnostics/host-presenter surface
//! the rest of the crate is built around.
use std::error::Error;
use std::fmt;

use log::*;

use crate::hardware::cartridge::Cartridge;
use crate::hardware::cpu::Cpu;
use crate::hardware::mmu::Mmu;
use crate::hardware::ppu::palette::RGB;
use crate::hardware::ppu::Ppu;
use crate::io::bootrom::BootRom;
use crate::io::joypad::InputKey;
use crate::EmulatorOptions;

/// Clock cycles in one 59.7 Hz frame: 456 cycles/scanline * 154 scanlines.
pub const CYCLES_PER_FRAME: u32 = 70_224;

const MINIMUM_ROM_SIZE: usize = 0x150;

#[derive(Debug)]
pub enum GbError {
    /// Cartridge ROM shorter than the minimum header region; fatal at load time.
    RomLoadFailure { expected: usize, actual: usize },
    /// Boot ROM file isn't exactly 256 bytes; fatal at load time.
    BootRomSize { expected: usize, actual: usize },
    /// An address computation produced something outside `0x0000..=0xFFFF`.
    /// Every public MMU entry point takes a `u16`, which makes this
    /// unreachable from the outside; it exists for the wider-than-16-bit
    /// arithmetic the DMA source/destination calculation does before masking.
    InvalidAddress(u32),
}

impl fmt::Display for GbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GbError::RomLoadFailure { expected, actual } => write!(
                f,
                "ROM is smaller than the minimum cartridge header region: expected at least {} bytes, got {}",
                expected, actual
            ),
            GbError::BootRomSize { expected, actual } => write!(
                f,
                "boot ROM must be exactly {} bytes, got {}",
                expected, actual
            ),
            GbError::InvalidAddress(addr) => {
                write!(f, "address {:#X} is outside the 16-bit address space", addr)
            }
        }
    }
}

impl Error for GbError {}

/// Number of bytes a DMG boot ROM occupies.
pub const BOOT_ROM_SIZE: usize = 256;

/// Validate and convert a raw boot ROM image. The core takes a fixed-size
/// `[u8; 256]` everywhere else; this is the one fallible entry point that
/// turns an arbitrary byte slice (as read from a file) into that shape.
pub fn load_boot_rom(bytes: &[u8]) -> Result<[u8; BOOT_ROM_SIZE], GbError> {
    <[u8; BOOT_ROM_SIZE]>::try_from(bytes).map_err(|_| GbError::BootRomSize {
        expected: BOOT_ROM_SIZE,
        actual: bytes.len(),
    })
}

/// A snapshot a host can sample for debugging, an overlay, or trap logging. The
/// core never reads these back; they exist purely for observability.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    pub frames_rendered: u64,
    pub total_cycles: u64,
    pub last_opcode: u8,
    pub last_pc: u16,
    pub registers_snapshot: String,
}

/// What a host needs to implement to drive this core: deliver a finished frame
/// and report the current button state. There is no cartridge-RAM save hook,
/// since the no-MBC cartridge this core supports has no battery-backed RAM to
/// persist.
pub trait HostPresenter {
    /// `frame_buffer` is always `RESOLUTION_WIDTH * RESOLUTION_HEIGHT` RGB pixels,
    /// row-major, top-left origin.
    fn present_frame(&mut self, frame_buffer: &[RGB]);

    /// Polled once per frame; each entry is a key and whether it's currently held.
    fn poll_input(&mut self) -> Vec<(InputKey, bool)>;
}

pub struct Emulator {
    cpu: Cpu,
    diagnostics: Diagnostics,
}

impl Emulator {
    pub fn new(rom: &[u8], options: EmulatorOptions) -> Result<Self, GbError> {
        if rom.len() < MINIMUM_ROM_SIZE {
            return Err(GbError::RomLoadFailure {
                expected: MINIMUM_ROM_SIZE,
                actual: rom.len(),
            });
        }

        let cartridge = Cartridge::new(rom);
        info!("loaded cartridge: {:?}", cartridge.header.title);

        let boot_rom = BootRom::new(options.boot_rom);
        let ppu = Ppu::new(options.display_colours);
        let mut mmu = Mmu::new(cartridge, boot_rom, ppu);

        if mmu.boot_rom_finished() {
            seed_post_boot_io(&mut mmu);
        }

        Ok(Emulator {
            cpu: Cpu::new(mmu),
            diagnostics: Diagnostics::default(),
        })
    }

    /// Run until a full frame has been rendered, then hand it to `host`. Input is
    /// polled once at the start of the frame, matching how a real game samples
    /// the joypad once per vblank.
    pub fn run_one_frame(&mut self, host: &mut impl HostPresenter) {
        for (key, pressed) in host.poll_input() {
            self.cpu.mmu.joypad.set_key_state(key, pressed);
        }

        loop {
            let cycles = self.step();
            self.diagnostics.total_cycles += cycles;
            if self.cpu.consume_vblank() {
                self.diagnostics.frames_rendered += 1;
                host.present_frame(&self.cpu.mmu.ppu.frame_buffer);
                break;
            }
        }
    }

    /// Advance by a single CPU step, or by one DMA byte while a transfer is in
    /// flight (the CPU is frozen from the ROM's perspective during DMA, but the
    /// clock-driven components still need to be ticked). Returns cycles spent.
    pub fn step(&mut self) -> u64 {
        let cycles = if self.cpu.mmu.dma_in_progress() {
            let cycles = self.cpu.mmu.step_dma();
            self.cpu.mmu.tick_components(cycles);
            cycles as u64
        } else {
            self.cpu.step()
        };

        self.diagnostics.last_opcode = self.cpu.last_opcode();
        self.diagnostics.last_pc = self.cpu.pc();
        self.diagnostics.registers_snapshot = self.cpu.registers_snapshot();

        cycles
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics.clone()
    }

    pub fn cartridge_title(&self) -> &str {
        &self.cpu.mmu.cartridge().header.title
    }

    /// The most recently rendered frame, `RESOLUTION_WIDTH * RESOLUTION_HEIGHT` pixels.
    pub fn frame_buffer(&self) -> &[RGB] {
        &self.cpu.mmu.ppu.frame_buffer
    }

    /// Read a byte out of the address space without spending a cycle; for
    /// diagnostics and test harnesses, never used by the core itself.
    pub fn peek(&self, address: u16) -> u8 {
        self.cpu.mmu.read_byte(address)
    }
}

/// Seed the I/O registers to the values the real boot ROM would leave behind,
/// for the registers that live directly in the flat byte array rather than
/// behind an owning component (those - DIV, the joypad group select - already
/// initialize themselves correctly and are left alone).
fn seed_post_boot_io(mmu: &mut Mmu) {
    mmu.poke(0xFF0F, 0xE1);
    mmu.poke(0xFF10, 0x80);
    mmu.poke(0xFF11, 0xBF);
    mmu.poke(0xFF12, 0xF3);
    mmu.poke(0xFF14, 0xBF);
    mmu.poke(0xFF16, 0x3F);
    mmu.poke(0xFF19, 0xBF);
    mmu.poke(0xFF1A, 0x7F);
    mmu.poke(0xFF1B, 0xFF);
    mmu.poke(0xFF1C, 0x9F);
    mmu.poke(0xFF1E, 0xBF);
    mmu.poke(0xFF20, 0xFF);
    mmu.poke(0xFF23, 0xBF);
    mmu.poke(0xFF24, 0x77);
    mmu.poke(0xFF25, 0xF3);
    mmu.poke(0xFF26, 0xF1);
    mmu.poke(0xFF40, 0x91);
    mmu.poke(0xFF41, 0x05);
    mmu.poke(0xFF50, 0x01);
    mmu.poke(0xFF47, 0xFC);
    mmu.poke(0xFF48, 0xFF);
    mmu.poke(0xFF49, 0xFF);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GREY_PALETTE;

    fn options() -> EmulatorOptions {
        EmulatorOptions {
            boot_rom: None,
            display_colours: GREY_PALETTE,
        }
    }

    #[test]
    fn rejects_roms_smaller_than_the_header_region() {
        let result = Emulator::new(&[0u8; 16], options());
        assert!(matches!(result, Err(GbError::RomLoadFailure { .. })));
    }

    #[test]
    fn rejects_boot_roms_with_the_wrong_size() {
        let result = load_boot_rom(&[0u8; 255]);
        assert!(matches!(result, Err(GbError::BootRomSize { expected: 256, actual: 255 })));
    }

    #[test]
    fn accepts_a_256_byte_boot_rom() {
        assert!(load_boot_rom(&[0u8; 256]).is_ok());
    }

    #[test]
    fn boots_straight_into_cartridge_code_without_a_boot_rom() {
        let rom = vec![0u8; 0x8000];
        let emulator = Emulator::new(&rom, options()).unwrap();
        assert_eq!(emulator.cpu.mmu.read_byte(0xFF40), 0x91);
    }

    #[test]
    fn one_frame_advances_exactly_one_display_cycle() {
        let rom = vec![0u8; 0x8000];
        let mut emulator = Emulator::new(&rom, options()).unwrap();
        struct NullHost;
        impl HostPresenter for NullHost {
            fn present_frame(&mut self, _frame_buffer: &[RGB]) {}
            fn poll_input(&mut self) -> Vec<(InputKey, bool)> {
                Vec::new()
            }
        }
        emulator.run_one_frame(&mut NullHost);
        assert_eq!(emulator.diagnostics().frames_rendered, 1);
    }
}
