use bitflags::*;

use crate::hardware::ppu::Mode;

bitflags! {
    /// FF40 - LCDC: each bit controls a facet of rendering, and unlike VRAM/OAM it
    /// is never locked by the PPU, so it may be written at any time.
    #[derive(Default)]
    pub struct LcdControl: u8 {
        /// When cleared, background and window turn blank (white); only sprites remain visible.
        const BG_WINDOW_PRIORITY    = 0b0000_0001;
        const SPRITE_DISPLAY_ENABLE  = 0b0000_0010;
        /// 0 = 8x8 sprites, 1 = 8x16.
        const SPRITE_SIZE            = 0b0000_0100;
        /// 0 = 0x9800, 1 = 0x9C00.
        const BG_TILE_MAP_SELECT     = 0b0000_1000;
        /// 0 = 0x8800 (signed indices), 1 = 0x8000 (unsigned indices).
        const BG_WINDOW_TILE_SELECT  = 0b0001_0000;
        const WINDOW_DISPLAY         = 0b0010_0000;
        /// 0 = 0x9800, 1 = 0x9C00.
        const WINDOW_MAP_SELECT      = 0b0100_0000;
        const LCD_DISPLAY            = 0b1000_0000;
    }
}

bitflags! {
    /// FF41 - STAT.
    #[derive(Default)]
    pub struct LcdStatus: u8 {
        const MODE_FLAG_0           = 0b0000_0001;
        const MODE_FLAG_1           = 0b0000_0010;
        /// (LYC == LY), read only.
        const COINCIDENCE_FLAG      = 0b0000_0100;
        const MODE_0_H_INTERRUPT    = 0b0000_1000;
        const MODE_1_V_INTERRUPT    = 0b0001_0000;
        const MODE_2_OAM_INTERRUPT  = 0b0010_0000;
        const COINCIDENCE_INTERRUPT = 0b0100_0000;
        const UNUSED                = 0b1000_0000;
    }
}

bitflags! {
    /// Byte 3 of an OAM sprite entry.
    #[derive(Default)]
    pub struct AttributeFlags: u8 {
        /// 0 = OBP0, 1 = OBP1.
        const PALETTE_NUMBER      = 0b0001_0000;
        const X_FLIP              = 0b0010_0000;
        const Y_FLIP              = 0b0100_0000;
        /// 0 = sprite above BG, 1 = sprite hidden behind BG colors 1-3.
        const OBJ_TO_BG_PRIORITY  = 0b1000_0000;
    }
}

impl LcdControl {
    /// Base address and indexing mode (`true` = unsigned $8000, `false` = signed $8800) for
    /// background/window tile data, per bit 4.
    pub fn bg_window_tile_address(&self) -> (u16, bool) {
        if self.contains(LcdControl::BG_WINDOW_TILE_SELECT) {
            (0x8000, true)
        } else {
            (0x9000, false)
        }
    }

    pub fn bg_tile_map_address(&self) -> u16 {
        if self.contains(LcdControl::BG_TILE_MAP_SELECT) {
            0x9C00
        } else {
            0x9800
        }
    }

    pub fn window_tile_map_address(&self) -> u16 {
        if self.contains(LcdControl::WINDOW_MAP_SELECT) {
            0x9C00
        } else {
            0x9800
        }
    }
}

impl LcdStatus {
    pub fn mode_flag(&self) -> Mode {
        match self.bits & 0x3 {
            0 => Mode::HBlank,
            1 => Mode::VBlank,
            2 => Mode::OamSearch,
            3 => Mode::LcdTransfer,
            _ => unreachable!("mode flag is masked to 2 bits"),
        }
    }

    pub fn set_mode_flag(&mut self, value: Mode) {
        self.bits = (self.bits & 0xFC)
            | match value {
                Mode::HBlank => 0,
                Mode::VBlank => 1,
                Mode::OamSearch => 2,
                Mode::LcdTransfer => 3,
            }
    }
}
