//! Purely here to provide an extra implementation block so that the main mod.rs doesn't get
//! too cluttered: the memory-fetch helpers that bill clock cycles as they go.

use crate::hardware::cpu::Cpu;
use crate::io::interrupts::InterruptFlags;

impl Cpu {
    /// Advance the whole machine (timer, PPU, and anything else hanging off the MMU) by
    /// 4 clock cycles and note whether that advance raised VBlank.
    pub fn add_cycles(&mut self) {
        self.cycles_performed += 4;
        let raised = self.mmu.tick_components(4);
        if raised.contains(InterruptFlags::VBLANK) {
            self.had_vblank = true;
        }
    }

    /// Based on the current `PC`, interpret the value at that location in memory as a `u8`.
    ///
    /// Advances the `PC` by 1.
    pub fn get_instr_u8(&mut self) -> u8 {
        let result = self.read_byte_cycle(self.registers.pc);
        self.registers.pc = self.registers.pc.wrapping_add(1);

        result
    }

    /// Based on the current `PC`, interpret the `current` and `current + 1` bytes at those
    /// locations in memory as a `u16`, little endian.
    ///
    /// Advances the `PC` by 2.
    pub fn get_instr_u16(&mut self) -> u16 {
        let least_s_byte = self.get_instr_u8() as u16;
        let most_s_byte = self.get_instr_u8() as u16;

        (most_s_byte << 8) | least_s_byte
    }

    /// Read a byte from the MMU and bill 4 cycles.
    pub fn read_byte_cycle(&mut self, address: u16) -> u8 {
        self.add_cycles();
        self.mmu.read_byte(address)
    }

    /// Write a byte to the MMU and bill 4 cycles.
    pub fn write_byte_cycle(&mut self, address: u16, value: u8) {
        self.add_cycles();
        self.mmu.write_byte(address, value);
    }

    /// Read a little-endian `u16` from the MMU and bill 8 cycles.
    pub fn read_short_cycle(&mut self, address: u16) -> u16 {
        let least_s_byte = self.read_byte_cycle(address) as u16;
        let most_s_byte = self.read_byte_cycle(address.wrapping_add(1)) as u16;

        (most_s_byte << 8) | least_s_byte
    }

    /// Write a little-endian `u16` to the MMU and bill 8 cycles.
    pub fn write_short_cycle(&mut self, address: u16, value: u16) {
        self.write_byte_cycle(address, (value & 0xFF) as u8);
        self.write_byte_cycle(address.wrapping_add(1), (value >> 8) as u8);
    }

    /// Whether a VBlank interrupt has been raised since the last call; consumes the flag.
    pub fn consume_vblank(&mut self) -> bool {
        let had_it = self.had_vblank;
        self.had_vblank = false;
        had_it
    }
}
