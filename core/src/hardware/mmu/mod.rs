//! The memory management unit: a flat 64 KiB byte array with a handful of
//! overlays (boot ROM, echo RAM, OAM DMA) and I/O-register dispatch to the
//! components that own the behavior behind a given address.
use crate::emulator::GbError;
use crate::hardware::cartridge::Cartridge;
use crate::hardware::ppu::{Ppu, LCD_STATUS_REGISTER, LY_REGISTER};
use crate::io::bootrom::BootRom;
use crate::io::interrupts::InterruptFlags;
use crate::io::joypad::JoyPad;
use crate::io::timer::{self, Timer};

/// Mask a wider-than-16-bit address computation down to `u16`, defensively
/// rejecting anything that doesn't fit instead of silently truncating.
fn checked_address(addr: u32) -> Result<u16, GbError> {
    u16::try_from(addr).map_err(|_| GbError::InvalidAddress(addr))
}

pub const ECHO_START: u16 = 0xE000;
pub const ECHO_END: u16 = 0xFDFF;
pub const ECHO_OFFSET: u16 = 0x2000;

pub const OAM_START: u16 = 0xFE00;
pub const DMA_REGISTER: u16 = 0xFF46;
pub const JOYPAD_REGISTER: u16 = 0xFF00;
pub const BOOT_ROM_DISABLE: u16 = 0xFF50;
pub const INTERRUPT_FLAG: u16 = 0xFF0F;
pub const INTERRUPT_ENABLE: u16 = 0xFFFF;

/// Value returned for reads of addresses this MMU has no real backing for; arbitrary,
/// matches the convention several emulators use for unmapped space.
pub const INVALID_READ: u8 = 0xFF;

#[derive(Debug, Default, Clone, Copy)]
struct DmaState {
    active: bool,
    /// True for the one m-cycle of setup delay between the FF46 write and the
    /// first byte actually being copied.
    pending: bool,
    source_base: u16,
    counter: u8,
}

pub struct Mmu {
    memory: Box<[u8; 0x10000]>,
    boot_rom: BootRom,
    boot_rom_active: bool,
    cartridge: Cartridge,
    pub timer: Timer,
    pub ppu: Ppu,
    pub joypad: JoyPad,
    dma: DmaState,
}

impl Mmu {
    pub fn new(cartridge: Cartridge, boot_rom: BootRom, ppu: Ppu) -> Self {
        let boot_rom_active = !boot_rom.is_finished;
        Mmu {
            memory: Box::new([0u8; 0x10000]),
            boot_rom,
            boot_rom_active,
            cartridge,
            timer: Timer::new(),
            ppu,
            joypad: JoyPad::new(),
            dma: DmaState::default(),
        }
    }

    pub fn read_byte(&self, address: u16) -> u8 {
        match address {
            0x0000..=0x00FF if self.boot_rom_active => self.boot_rom.read_byte(address),
            0x0000..=0x7FFF => self.cartridge.read_byte(address),
            ECHO_START..=ECHO_END => self.memory[(address - ECHO_OFFSET) as usize],
            JOYPAD_REGISTER => self.joypad.get_register(),
            timer::DIVIDER_REGISTER => self.timer.divider_register(),
            timer::TIMER_COUNTER => self.timer.timer_counter,
            timer::TIMER_MODULO => self.timer.timer_modulo,
            timer::TIMER_CONTROL => self.timer.timer_control,
            _ => self.memory[address as usize],
        }
    }

    pub fn write_byte(&mut self, address: u16, value: u8) {
        match address {
            // ROM region is read-only under the no-MBC assumption; writes are dropped.
            0x0000..=0x7FFF => self.cartridge.write_byte(address, value),
            ECHO_START..=ECHO_END => self.memory[(address - ECHO_OFFSET) as usize] = value,
            JOYPAD_REGISTER => self.joypad.set_register(value),
            timer::DIVIDER_REGISTER => {
                self.timer.reset_divider();
            }
            timer::TIMER_COUNTER => self.timer.timer_counter = value,
            timer::TIMER_MODULO => self.timer.timer_modulo = value,
            timer::TIMER_CONTROL => self.timer.timer_control = value,
            LY_REGISTER => {
                // LY is read-only in hardware, but a write still clears it to zero
                // and re-derives the LYC coincidence flag/interrupt from that.
                self.memory[address as usize] = 0;
                let raised = self.ppu.check_lyc(&mut self.memory);
                if !raised.is_empty() {
                    let current = InterruptFlags::from_bits_truncate(self.memory[INTERRUPT_FLAG as usize]);
                    self.memory[INTERRUPT_FLAG as usize] = (current | raised).bits();
                }
            }
            DMA_REGISTER => {
                self.memory[address as usize] = value;
                self.dma = DmaState {
                    active: true,
                    pending: true,
                    source_base: (value as u16) << 8,
                    counter: 0,
                };
            }
            BOOT_ROM_DISABLE => {
                self.memory[address as usize] = value;
                if value != 0 {
                    self.boot_rom_active = false;
                }
            }
            _ => self.memory[address as usize] = value,
        }
    }

    pub fn dma_in_progress(&self) -> bool {
        self.dma.active
    }

    /// Whether the boot ROM has already run (or was never supplied), i.e. whether the
    /// emulator should seed the post-BIOS register state instead of starting at 0x0000.
    pub fn boot_rom_finished(&self) -> bool {
        !self.boot_rom_active
    }

    /// Seed DIV to the value it would hold after the real boot ROM finished; used
    /// alongside `boot_rom_finished` when constructing a CPU with `skip_bios`.
    pub fn seed_post_boot_timer(&mut self, div_high_byte: u8) {
        self.timer.seed_divider(div_high_byte);
    }

    /// Copy a single byte of an in-flight OAM DMA transfer, consuming one machine cycle
    /// (4 clock cycles). Call this instead of `Cpu::step` while `dma_in_progress()`.
    /// The very first call after the FF46 write only consumes the setup delay and
    /// copies nothing; byte copying starts on the call after that.
    pub fn step_dma(&mut self) -> u16 {
        if self.dma.pending {
            self.dma.pending = false;
            return 4;
        }

        let source_wide = self.dma.source_base as u32 + self.dma.counter as u32;
        let dest_wide = OAM_START as u32 + self.dma.counter as u32;
        let source = checked_address(source_wide)
            .expect("DMA source stays within a 16-bit span: source_base <= 0xFF00, counter < 0xA0");
        let dest = checked_address(dest_wide)
            .expect("DMA destination stays within OAM's 0xA0-byte span");
        self.memory[dest as usize] = self.read_byte(source);

        self.dma.counter += 1;
        if self.dma.counter as usize >= 0xA0 {
            self.dma.active = false;
        }
        4
    }

    /// Advance Timer and PPU by `cycles` clock cycles and fold their raised interrupts
    /// into IF. Called by the emulator after every CPU step or DMA byte copy. Returns
    /// the interrupts raised this tick so the caller can notice VBlank without polling.
    pub fn tick_components(&mut self, cycles: u16) -> InterruptFlags {
        let mut raised = InterruptFlags::empty();
        if let Some(timer_interrupt) = self.timer.tick(cycles) {
            raised |= timer_interrupt;
        }
        raised |= self.ppu.tick(cycles, &mut self.memory);

        if !raised.is_empty() {
            let current = InterruptFlags::from_bits_truncate(self.memory[INTERRUPT_FLAG as usize]);
            self.memory[INTERRUPT_FLAG as usize] = (current | raised).bits();
        }
        raised
    }

    pub fn request_interrupt(&mut self, interrupt: InterruptFlags) {
        let current = InterruptFlags::from_bits_truncate(self.memory[INTERRUPT_FLAG as usize]);
        self.memory[INTERRUPT_FLAG as usize] = (current | interrupt).bits();
    }

    pub fn interrupt_flag(&self) -> u8 {
        self.memory[INTERRUPT_FLAG as usize]
    }

    pub fn set_interrupt_flag(&mut self, value: u8) {
        self.memory[INTERRUPT_FLAG as usize] = value;
    }

    pub fn interrupt_enable(&self) -> u8 {
        self.memory[INTERRUPT_ENABLE as usize]
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    /// Write raw bytes directly, bypassing all overlay logic; used by the emulator to
    /// seed post-BIOS I/O register values when booting with `skip_bios`.
    pub fn poke(&mut self, address: u16, value: u8) {
        self.memory[address as usize] = value;
    }

    pub fn ly(&self) -> u8 {
        self.memory[LY_REGISTER as usize]
    }

    pub fn lcd_status(&self) -> u8 {
        self.memory[LCD_STATUS_REGISTER as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::ppu::palette::GREY_PALETTE;
    use crate::hardware::ppu::register_flags::LcdStatus;
    use crate::hardware::ppu::LYC_REGISTER;

    fn new_mmu() -> Mmu {
        Mmu::new(
            Cartridge::new(&[0u8; 0x8000]),
            BootRom::new(None),
            Ppu::new(GREY_PALETTE),
        )
    }

    #[test]
    fn echo_ram_mirrors_wram() {
        let mut mmu = new_mmu();
        mmu.write_byte(0xC010, 0x42);
        assert_eq!(mmu.read_byte(0xE010), 0x42);

        mmu.write_byte(0xE020, 0x99);
        assert_eq!(mmu.read_byte(0xC020), 0x99);
    }

    #[test]
    fn rom_writes_are_ignored() {
        let mut mmu = new_mmu();
        let before = mmu.read_byte(0x0150);
        mmu.write_byte(0x0150, 0xAB);
        assert_eq!(mmu.read_byte(0x0150), before);
    }

    #[test]
    fn dma_copies_160_bytes_into_oam() {
        let mut mmu = new_mmu();
        for i in 0..0xA0u16 {
            mmu.write_byte(0xC000 + i, i as u8);
        }
        mmu.write_byte(DMA_REGISTER, 0xC0);
        assert!(mmu.dma_in_progress());

        mmu.step_dma(); // setup delay: consumes a cycle, copies nothing
        for _ in 0..0xA0 {
            mmu.step_dma();
        }

        assert!(!mmu.dma_in_progress());
        for i in 0..0xA0u16 {
            assert_eq!(mmu.read_byte(OAM_START + i), i as u8);
        }
    }

    #[test]
    fn writing_ly_clears_it_and_updates_the_coincidence_flag() {
        let mut mmu = new_mmu();
        mmu.poke(LY_REGISTER, 42);
        mmu.poke(LYC_REGISTER, 0);
        mmu.write_byte(LY_REGISTER, 0xFF); // value written is irrelevant; LY always clears to 0
        assert_eq!(mmu.ly(), 0);
        assert!(LcdStatus::from_bits_truncate(mmu.lcd_status()).contains(LcdStatus::COINCIDENCE_FLAG));
    }

    #[test]
    fn checked_address_rejects_anything_past_the_16_bit_span() {
        assert_eq!(checked_address(0xFFFF).unwrap(), 0xFFFF);
        assert!(matches!(checked_address(0x10000), Err(GbError::InvalidAddress(0x10000))));
    }

    #[test]
    fn boot_rom_disable_is_one_way() {
        let mut mmu = Mmu::new(
            Cartridge::new(&[0xAAu8; 0x8000]),
            BootRom::new(Some([0xBBu8; 0x100])),
            Ppu::new(GREY_PALETTE),
        );
        assert_eq!(mmu.read_byte(0x0010), 0xBB);
        mmu.write_byte(BOOT_ROM_DISABLE, 1);
        assert_eq!(mmu.read_byte(0x0010), 0xAA);
        mmu.write_byte(BOOT_ROM_DISABLE, 0);
        assert_eq!(mmu.read_byte(0x0010), 0xAA, "disabling the boot rom is one-way");
    }
}
