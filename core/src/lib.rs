pub mod emulator;
pub mod hardware;
pub mod io;

pub use crate::hardware::ppu::palette::{DisplayColour, GREY_PALETTE, NOSTALGIC_PALETTE};
pub use crate::io::joypad::InputKey;

/// Construction-time configuration for an `Emulator`. There is no `EmulatorMode`
/// switch here: this core only ever runs in DMG mode.
#[derive(Debug, Clone)]
pub struct EmulatorOptions {
    /// `None` skips straight to cartridge code with the registers the real boot
    /// ROM would have left behind, instead of executing it.
    pub boot_rom: Option<[u8; 256]>,
    pub display_colours: DisplayColour,
}

#[derive(Debug, Clone)]
pub struct EmulatorOptionsBuilder {
    boot_rom: Option<[u8; 256]>,
    display_colours: DisplayColour,
}

impl EmulatorOptionsBuilder {
    pub fn new() -> Self {
        EmulatorOptionsBuilder {
            boot_rom: None,
            display_colours: GREY_PALETTE,
        }
    }

    pub fn boot_rom(mut self, boot_rom: Option<[u8; 256]>) -> Self {
        self.boot_rom = boot_rom;
        self
    }

    pub fn display_colours(mut self, display_colours: DisplayColour) -> Self {
        self.display_colours = display_colours;
        self
    }

    pub fn build(self) -> EmulatorOptions {
        EmulatorOptions {
            boot_rom: self.boot_rom,
            display_colours: self.display_colours,
        }
    }
}

impl Default for EmulatorOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<EmulatorOptions> for EmulatorOptionsBuilder {
    fn from(from: EmulatorOptions) -> Self {
        EmulatorOptionsBuilder {
            boot_rom: from.boot_rom,
            display_colours: from.display_colours,
        }
    }
}
