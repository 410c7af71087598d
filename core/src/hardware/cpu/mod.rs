//! The CPU is the main executor of any ROM's code, and keeps track of the cycles
//! it has performed so far. It owns the MMU outright: there is no generic memory
//! trait to thread through, since this core only ever runs one kind of machine.

use crate::hardware::cpu::execute::{InstructionAddress, JumpModifier};
use crate::hardware::cpu::traits::{SetU16, SetU8, ToU16, ToU8};
use crate::hardware::mmu::Mmu;
use crate::hardware::registers::Reg8::A;
use crate::hardware::registers::{Flags, Reg16, Registers};
use crate::io::interrupts::{InterruptFlags, Interrupts};

use log::*;
use std::fmt::Debug;

mod alu;
pub mod execute;
mod fetch;
mod instructions;
mod traits;

#[derive(Debug)]
pub struct Cpu {
    pub cycles_performed: u64,
    pub ime: bool,
    pub halted: bool,
    pub mmu: Mmu,
    opcode: u8,
    registers: Registers,
    had_vblank: bool,
}

impl Cpu {
    pub fn new(mmu: Mmu) -> Self {
        let boot_rom_finished = mmu.boot_rom_finished();

        let mut result = Cpu {
            opcode: 0,
            registers: Registers::new(),
            mmu,
            halted: false,
            cycles_performed: 0,
            ime: false,
            had_vblank: false,
        };

        if boot_rom_finished {
            result.registers.pc = 0x100;
            // Registers end up in this state after the real boot ROM runs.
            result.registers.set_af(0x01B0);
            result.registers.set_bc(0x0013);
            result.registers.set_de(0x00D8);
            result.registers.set_hl(0x014D);
            result.registers.sp = 0xFFFE;
            result.mmu.seed_post_boot_timer(0xAB);
        }

        result
    }

    /// Fetch and execute exactly one instruction (or service a pending interrupt, or
    /// idle one machine cycle if halted), returning the number of clock cycles spent.
    pub fn step(&mut self) -> u64 {
        let start = self.cycles_performed;

        if self.halted {
            self.add_cycles();
            if self.interrupt_pending() {
                self.halted = false;
                if self.ime {
                    if let Some(interrupt) = self.next_interrupt() {
                        self.service_interrupt(interrupt);
                    }
                }
            }
            return self.cycles_performed - start;
        }

        if self.ime {
            if let Some(interrupt) = self.next_interrupt() {
                self.service_interrupt(interrupt);
                return self.cycles_performed - start;
            }
        }

        self.opcode = self.get_instr_u8();
        trace!("executing {:02X} at PC {:04X}", self.opcode, self.registers.pc.wrapping_sub(1));
        self.execute(self.opcode);

        self.cycles_performed - start
    }

    /// The opcode most recently fetched, for trap logging and diagnostics.
    pub fn last_opcode(&self) -> u8 {
        self.opcode
    }

    pub fn pc(&self) -> u16 {
        self.registers.pc
    }

    pub fn registers_snapshot(&self) -> String {
        self.registers.to_string()
    }

    fn interrupt_pending(&self) -> bool {
        (self.mmu.interrupt_flag() & self.mmu.interrupt_enable() & 0x1F) != 0
    }

    fn next_interrupt(&self) -> Option<Interrupts> {
        let pending =
            InterruptFlags::from_bits_truncate(self.mmu.interrupt_flag() & self.mmu.interrupt_enable());
        Interrupts::iter().find(|interrupt| pending.contains_interrupt(*interrupt))
    }

    /// Reset the IF bit, clear IME, and jump to the interrupt's vector. Costs 20 cycles:
    /// two internal wait cycles, a two-byte push of PC, and the jump itself.
    fn service_interrupt(&mut self, interrupt: Interrupts) {
        use Interrupts::*;
        debug!("servicing {:?} interrupt", interrupt);

        let cleared = InterruptFlags::from_bits_truncate(self.mmu.interrupt_flag())
            & !InterruptFlags::from_bits_truncate(interrupt as u8);
        self.mmu.set_interrupt_flag(cleared.bits());

        self.add_cycles();
        self.add_cycles();

        self.ime = false;
        self.push_helper(self.registers.pc);

        self.registers.pc = match interrupt {
            VBLANK => 0x0040,
            LcdStat => 0x0048,
            TIMER => 0x0050,
            SERIAL => 0x0058,
            JOYPAD => 0x0060,
        };
    }

    /// Pass 4 ticks.
    fn nop(&mut self) {}

    /// `ld   rr,nn       x1 nn nn  12 ---- rr=nn (rr may be BC,DE,HL or SP)`
    /// OR
    /// `ld   SP,HL       F9         8 ---- SP=HL`
    fn load_16bit<T: Copy, U: Copy>(&mut self, destination: T, source: U)
    where
        Self: SetU16<T>,
        Self: ToU16<U>,
    {
        let source_value = self.read_u16_value(source);

        self.set_u16_value(destination, source_value);
    }

    /// `ld` never sets any flags.
    fn load_8bit<T: Copy, U: Copy>(&mut self, destination: T, source: U)
    where
        T: Debug,
        Self: SetU8<T>,
        Self: ToU8<U>,
    {
        let source_value = self.read_u8_value(source);

        self.set_u8_value(destination, source_value);
    }

    /// `r=r+1` OR `(HL)=(HL)+1`
    ///
    /// Flags: `z0h-`
    fn increment<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        let old_value = self.read_u8_value(target);
        let new_value = old_value.wrapping_add(1);

        self.registers.set_zf(new_value == 0);
        self.registers.set_n(false);
        self.registers.set_h((old_value & 0xF) + 0x1 > 0xF);

        self.set_u8_value(target, new_value);
    }

    /// `rr = rr+1      ;rr may be BC,DE,HL,SP`
    ///
    /// Flags: `----`
    fn increment16(&mut self, target: Reg16) {
        let new_value = self.read_u16_value(target).wrapping_add(1);

        self.set_u16_value(target, new_value);
        self.add_cycles();
    }

    /// `rotate A left; 7th bit to Carry flag`
    ///
    /// Flags: `000c`
    fn rlca(&mut self) {
        self.rotate_left(A);
        self.registers.set_zf(false);
    }

    /// `HL = HL+rr     ;rr may be BC,DE,HL,SP`
    ///
    /// Flags: `-0hc`
    fn add16(&mut self, target: Reg16) {
        let old_value = self.read_u16_value(target);
        let (result, overflowed) = old_value.overflowing_add(self.registers.hl());
        self.registers.set_n(false);
        self.registers.set_cf(overflowed);
        self.registers
            .set_h((old_value & 0x0FFF) + (self.registers.hl() & 0x0FFF) > 0x0FFF);

        self.registers.set_hl(result);
        self.add_cycles();
    }

    /// `r=r-1` OR `(HL)=(HL)-1`
    ///
    /// Flags: `z1h-`
    fn decrement<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        let old_value = self.read_u8_value(target);
        let new_value = old_value.wrapping_sub(1);

        self.registers.set_zf(new_value == 0);
        self.registers.set_n(true);
        self.registers.set_h(old_value & 0xF == 0);

        self.set_u8_value(target, new_value);
    }

    /// `rr = rr-1      ;rr may be BC,DE,HL,SP`
    ///
    /// Flags: `----`
    fn decrement16(&mut self, target: Reg16) {
        let new_value = self.read_u16_value(target).wrapping_sub(1);

        self.set_u16_value(target, new_value);
        self.add_cycles();
    }

    /// Rotate A right. Old bit 0 to Carry flag.
    ///
    /// Flags: `000C`
    fn rrca(&mut self) {
        self.rotate_right(A);
        self.registers.set_zf(false);
    }

    /// Low power standby mode. Real hardware halts the system clock until a button
    /// is pressed; treated as a no-op trap here since this core has no input-wake path.
    fn stop(&mut self) {
        warn!("STOP executed; treating as a no-op");
        self.get_instr_u8(); // STOP is followed by an (ignored) padding byte.
    }

    /// Rotate A left through Carry flag.
    ///
    /// Flags: `000C`
    fn rla(&mut self) {
        self.rotate_left_carry(A);
        self.registers.set_zf(false);
    }

    /// `jr   PC+dd` OR `jr   f,PC+dd`
    ///
    /// Flags: `----`
    fn relative_jump(&mut self, condition: JumpModifier) {
        let offset = self.get_instr_u8() as i8;
        if self.matches_jmp_condition(condition) {
            self.registers.pc = self.registers.pc.wrapping_add(offset as u16);
            self.add_cycles();
        }
    }

    /// Rotate A right through Carry flag.
    ///
    /// Flags: `000C`
    fn rra(&mut self) {
        self.rotate_right_carry(A);
        self.registers.set_zf(false);
    }

    /// Decimal adjust register A so it holds the correct BCD representation after an
    /// add or subtract.
    ///
    /// Flags: `Z-0C`
    fn daa(&mut self) {
        if !self.registers.n() {
            if self.registers.cf() || self.registers.a > 0x99 {
                self.registers.a = self.registers.a.wrapping_add(0x60);
                self.registers.set_cf(true);
            }
            if self.registers.h() || (self.registers.a & 0x0F) > 0x09 {
                self.registers.a = self.registers.a.wrapping_add(0x06);
            }
        } else {
            if self.registers.cf() {
                self.registers.a = self.registers.a.wrapping_sub(0x60);
            }
            if self.registers.h() {
                self.registers.a = self.registers.a.wrapping_sub(0x06);
            }
        }

        self.registers.set_zf(self.registers.a == 0);
        self.registers.set_h(false);
    }

    /// ComPLement accumulator (A = ~A).
    ///
    /// Flags: `-11-`
    fn cpl(&mut self) {
        self.registers.a = !self.registers.a;

        self.registers.set_n(true);
        self.registers.set_h(true);
    }

    /// Set Carry Flag.
    ///
    /// Flags: `-001`
    fn scf(&mut self) {
        self.registers.set_n(false);
        self.registers.set_h(false);
        self.registers.set_cf(true);
    }

    /// Complement Carry Flag.
    ///
    /// Flags: `-00i` where `i = inverted`
    fn ccf(&mut self) {
        self.registers.set_n(false);
        self.registers.set_h(false);
        self.registers.f.toggle(Flags::CF);
    }

    /// Halt until an interrupt occurs (low power).
    fn halt(&mut self) {
        debug!("entering halt");
        self.halted = true;
    }

    /// `A=A+r` OR `A=A+n` OR `A=A+(HL)`
    ///
    /// Flags: `Z0HC`
    fn add<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
    {
        let value = self.read_u8_value(target);
        let (new_value, overflowed) = self.registers.a.overflowing_add(value);
        self.registers.set_zf(new_value == 0);
        self.registers.set_n(false);
        self.registers.set_cf(overflowed);
        self.registers
            .set_h((self.registers.a & 0xF) + (value & 0xF) > 0xF);

        self.registers.a = new_value;
    }

    /// Add the value in `target` plus the carry flag to A.
    ///
    /// Flags: `Z0HC`
    fn adc<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
    {
        let value = self.read_u8_value(target);
        let carry_flag = self.registers.cf() as u8;
        let new_value = self.registers.a.wrapping_add(value).wrapping_add(carry_flag);
        self.registers.set_zf(new_value == 0);
        self.registers.set_n(false);
        self.registers
            .set_h((self.registers.a & 0xF) + (value & 0xF) + carry_flag > 0xF);
        self.registers
            .set_cf((self.registers.a as u16) + (value as u16) + carry_flag as u16 > 0xFF);

        self.registers.a = new_value;
    }

    /// Subtract the value in `target` from A.
    ///
    /// Flags: `Z1HC`
    fn sub<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
    {
        let value = self.read_u8_value(target);
        let new_value = self.registers.a.wrapping_sub(value);
        self.registers.set_zf(new_value == 0);
        self.registers.set_n(true);
        self.registers
            .set_h((self.registers.a & 0xF).wrapping_sub(value & 0xF) & 0x10 != 0);
        self.registers.set_cf(value > self.registers.a);

        self.registers.a = new_value;
    }

    /// Subtract the value in `target` and the carry flag from A.
    ///
    /// Flags: `Z1HC`
    fn sbc<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
    {
        let value = self.read_u8_value(target);
        let carry_flag = self.registers.cf() as u8;
        let new_value = self.registers.a.wrapping_sub(value).wrapping_sub(carry_flag);

        self.registers.set_zf(new_value == 0);
        self.registers.set_n(true);
        self.registers.set_h(
            (self.registers.a & 0xF)
                .wrapping_sub(value & 0xF)
                .wrapping_sub(carry_flag)
                & 0x10
                != 0,
        );
        self.registers
            .set_cf((value as u16 + carry_flag as u16) > self.registers.a as u16);

        self.registers.a = new_value;
    }

    /// Bitwise AND between the value in `target` and A.
    ///
    /// Flags: `Z010`
    fn and<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
    {
        self.registers.a &= self.read_u8_value(target);

        self.registers.set_zf(self.registers.a == 0);
        self.registers.set_n(false);
        self.registers.set_h(true);
        self.registers.set_cf(false);
    }

    /// Bitwise XOR between the value in `target` and A.
    ///
    /// Flags: `Z000`
    fn xor<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
    {
        self.registers.a ^= self.read_u8_value(target);

        self.registers.set_zf(self.registers.a == 0);
        self.registers.set_n(false);
        self.registers.set_h(false);
        self.registers.set_cf(false);
    }

    /// Store into A the bitwise OR of the value in `target` and A.
    ///
    /// Flags: `Z000`
    fn or<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
    {
        self.registers.a |= self.read_u8_value(target);

        self.registers.set_zf(self.registers.a == 0);
        self.registers.set_n(false);
        self.registers.set_h(false);
        self.registers.set_cf(false);
    }

    /// Subtract the value in `target` from A and set flags, without storing the result.
    ///
    /// Flags: `Z1HC`
    fn compare<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
    {
        let value = self.read_u8_value(target);
        let new_value = self.registers.a.wrapping_sub(value);
        self.registers.set_zf(new_value == 0);
        self.registers.set_n(true);
        self.registers.set_cf(value > self.registers.a);
        self.registers
            .set_h((self.registers.a & 0xF).wrapping_sub(value & 0xF) & 0x10 != 0);
    }

    /// Return from subroutine. A conditional POP PC.
    fn ret(&mut self, target: JumpModifier) {
        self.add_cycles();
        if self.matches_jmp_condition(target) {
            self.registers.pc = self.read_short_cycle(self.registers.sp);
            self.registers.sp = self.registers.sp.wrapping_add(2);
            self.add_cycles();
        }
    }

    /// Pop register `target` from the stack.
    ///
    /// Flags: `----`
    fn pop(&mut self, target: Reg16) {
        let sp_target = self.read_short_cycle(self.registers.sp);
        self.set_u16_value(target, sp_target);
        self.registers.sp = self.registers.sp.wrapping_add(2);
    }

    /// `jump to nn, PC=nn` OR `jump to HL, PC=HL` OR conditional jump.
    fn jump(&mut self, condition: JumpModifier) {
        let value = self.get_instr_u16();

        if self.matches_jmp_condition(condition) {
            self.registers.pc = if let JumpModifier::HL = condition {
                self.registers.hl()
            } else {
                value
            };

            self.add_cycles();
        }
    }

    fn matches_jmp_condition(&self, condition: JumpModifier) -> bool {
        match condition {
            JumpModifier::NotZero => !self.registers.zf(),
            JumpModifier::Zero => self.registers.zf(),
            JumpModifier::NotCarry => !self.registers.cf(),
            JumpModifier::Carry => self.registers.cf(),
            JumpModifier::Always => true,
            JumpModifier::HL => true,
        }
    }

    /// Call address n16, if condition `target` is met. Pushes the return address first.
    ///
    /// Flags: `----`
    fn call(&mut self, target: JumpModifier) {
        let address = self.get_instr_u16();
        if self.matches_jmp_condition(target) {
            self.push_helper(self.registers.pc);
            self.registers.pc = address;
        }
    }

    /// Push register `target` onto the stack.
    ///
    /// Flags: `----`
    fn push(&mut self, target: Reg16) {
        let value = self.read_u16_value(target);
        self.push_helper(value);
    }

    fn push_helper(&mut self, value: u16) {
        self.registers.sp = self.registers.sp.wrapping_sub(2);
        self.write_short_cycle(self.registers.sp, value);
        self.add_cycles();
    }

    /// Call a fixed vector; a shorter equivalent of CALL for a handful of addresses.
    ///
    /// Flags: `----`
    fn rst(&mut self, vec: u8) {
        self.push_helper(self.registers.pc);
        self.registers.pc = vec as u16;
    }

    /// Opcodes with no defined behavior. Real games never execute these deliberately;
    /// log and halt rather than panic, since a misbehaving ROM shouldn't take the
    /// whole process down.
    fn unknown(&mut self) {
        error!("undefined opcode encountered: {:02X}", self.opcode);
        self.halted = true;
    }

    /// Return from subroutine and enable interrupts. Equivalent to EI then RET.
    ///
    /// Flags: `----`
    fn reti(&mut self) {
        self.ime = true;
        self.registers.pc = self.read_short_cycle(self.registers.sp);
        self.registers.sp = self.registers.sp.wrapping_add(2);
        self.add_cycles();
    }

    /// `ADD SP,e8`
    ///
    /// Flags: `00HC`
    fn add_sp(&mut self) {
        let value = self.get_instr_u8() as i8 as u16;
        let new_value = self.registers.sp.wrapping_add(value);

        self.registers.set_zf(false);
        self.registers.set_n(false);
        self.registers.set_h((self.registers.sp & 0xF) + (value & 0xF) > 0xF);
        self.registers
            .set_cf((self.registers.sp & 0xFF) + (value & 0xFF) > 0xFF);

        self.registers.sp = new_value;

        self.add_cycles();
        self.add_cycles();
    }

    /// `DI`: clear IME.
    ///
    /// Flags: `----`
    fn di(&mut self) {
        self.ime = false;
    }

    /// `LD HL,SP+i8`
    ///
    /// Flags: `00HC`
    fn load_sp_i(&mut self) {
        let value = self.get_instr_u8() as i8 as u16;
        let new_value = self.registers.sp.wrapping_add(value);

        self.registers.set_hl(new_value);
        self.registers.set_zf(false);
        self.registers.set_n(false);
        self.registers.set_h((self.registers.sp & 0xF) + (value & 0xF) > 0xF);
        self.registers
            .set_cf((self.registers.sp & 0xFF) + (value & 0xFF) > 0xFF);

        self.add_cycles();
    }

    /// `LD SP, HL`
    ///
    /// Flags: `----`
    fn load_sp_hl(&mut self) {
        self.registers.sp = self.registers.hl();
        self.add_cycles();
    }

    /// `EI`: set IME immediately (the real hardware's one-instruction delay isn't
    /// modeled here; no ROM behavior in practice depends on the gap).
    fn ei(&mut self) {
        self.ime = true;
    }

    /*
       Prefixed (CB) instructions.
    */

    /// `RLC r8/[HL]`: rotate `target` left, old bit 7 into carry.
    ///
    /// Flags: `Z00C`
    fn rlc<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        self.rotate_left(target);
    }

    /// `RRC r8/[HL]`: rotate `target` right, old bit 0 into carry.
    ///
    /// Flags: `Z00C`
    fn rrc<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        self.rotate_right(target);
    }

    /// `RL r8/[HL]`: rotate `target` left through carry.
    ///
    /// Flags: `Z00C`
    fn rl<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        self.rotate_left_carry(target);
    }

    /// `RR r8/[HL]`: rotate `target` right through carry.
    ///
    /// Flags: `Z00C`
    fn rr<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        self.rotate_right_carry(target);
    }

    /// `SLA r8/[HL]`
    ///
    /// Flags: `Z00C`
    fn sla<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        self.shift_left(target);
    }

    /// `SRA r8/[HL]`: bit 7 is preserved (arithmetic shift).
    ///
    /// Flags: `Z00C`
    fn sra<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        let value = self.read_u8_value(target);
        let new_value = (value & 0x80) | value.wrapping_shr(1);

        self.registers.set_zf(new_value == 0);
        self.registers.set_n(false);
        self.registers.set_h(false);
        self.registers.set_cf((value & 0x1) != 0);

        self.set_u8_value(target, new_value);
    }

    /// `SWAP r8/[HL]`: swap the upper and lower nibbles.
    ///
    /// Flags: `Z000`
    fn swap<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        let value = self.read_u8_value(target);
        let new_value = ((value & 0x0F) << 4) | ((value & 0xF0) >> 4);

        self.registers.set_zf(new_value == 0);
        self.registers.set_n(false);
        self.registers.set_h(false);
        self.registers.set_cf(false);

        self.set_u8_value(target, new_value);
    }

    /// `SRL r8/[HL]`: logical shift right, 0 shifted into bit 7.
    ///
    /// Flags: `Z00C`
    fn srl<T: Copy>(&mut self, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        self.shift_right(target);
    }

    /// `BIT u3,r8/[HL]`: set the zero flag if bit `bit` is clear.
    ///
    /// Flags: `Z01-`
    fn bit<T: Copy + Debug>(&mut self, bit: u8, target: T)
    where
        Self: ToU8<T>,
    {
        let value = self.read_u8_value(target);
        let bitmask = 1 << bit;

        self.registers.set_zf((value & bitmask) == 0);
        self.registers.set_n(false);
        self.registers.set_h(true)
    }

    /// `SET u3,r8/[HL]`: force bit `bit` to 1.
    ///
    /// Flags: `----`
    fn set<T: Copy>(&mut self, bit: u8, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        let value = self.read_u8_value(target);
        let bitmask: u8 = 1 << bit;

        self.set_u8_value(target, value | bitmask);
    }

    /// `RES u3,r8/[HL]`: force bit `bit` to 0.
    ///
    /// Flags: `----`
    fn res<T: Copy>(&mut self, bit: u8, target: T)
    where
        Self: ToU8<T>,
        Self: SetU8<T>,
    {
        let value = self.read_u8_value(target);
        let bit_mask: u8 = 0x1 << bit;

        self.set_u8_value(target, value & !bit_mask);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::cartridge::Cartridge;
    use crate::hardware::ppu::palette::GREY_PALETTE;
    use crate::hardware::ppu::Ppu;
    use crate::hardware::registers::Reg8;
    use crate::io::bootrom::BootRom;
    use pretty_assertions::assert_eq;

    fn new_cpu(program: &[u8]) -> Cpu {
        let mut rom = vec![0u8; 0x8000];
        rom[0x100..0x100 + program.len()].copy_from_slice(program);
        let mmu = Mmu::new(Cartridge::new(&rom), BootRom::new(None), Ppu::new(GREY_PALETTE));
        Cpu::new(mmu)
    }

    #[test]
    fn post_boot_registers_match_the_documented_state() {
        let cpu = new_cpu(&[]);
        assert_eq!(cpu.registers.pc, 0x100);
        assert_eq!(cpu.registers.sp, 0xFFFE);
        assert_eq!(cpu.registers.af(), 0x01B0);
        assert_eq!(cpu.mmu.read_byte(0xFF04), 0xAB);
    }

    #[test]
    fn nop_costs_four_cycles_and_advances_pc() {
        let mut cpu = new_cpu(&[0x00]);
        let cycles = cpu.step();
        assert_eq!(cycles, 4);
        assert_eq!(cpu.registers.pc, 0x101);
    }

    #[test]
    fn daa_after_addition_corrects_to_bcd() {
        let mut cpu = new_cpu(&[]);
        cpu.registers.a = 0x0B; // as if 0x05 + 0x06 just happened
        cpu.registers.set_h(true);
        cpu.daa();
        assert_eq!(cpu.registers.a, 0x11);
        assert!(!cpu.registers.cf());
    }

    #[test]
    fn set_uses_or_not_and() {
        let mut cpu = new_cpu(&[]);
        cpu.registers.b = 0b0000_0000;
        cpu.set(1, Reg8::B);
        assert_eq!(cpu.registers.b, 0b0000_0010);
    }

    #[test]
    fn ei_takes_effect_immediately() {
        let mut cpu = new_cpu(&[]);
        cpu.ei();
        assert!(cpu.ime);
    }

    #[test]
    fn undefined_opcode_halts_instead_of_panicking() {
        let mut cpu = new_cpu(&[0xD3]);
        cpu.step();
        assert!(cpu.halted);
    }

    #[test]
    fn pending_interrupt_wakes_a_halted_cpu() {
        let mut cpu = new_cpu(&[]);
        cpu.halted = true;
        cpu.ime = true;
        cpu.mmu.set_interrupt_flag(InterruptFlags::VBLANK.bits());
        cpu.mmu.write_byte(0xFFFF, InterruptFlags::VBLANK.bits());
        cpu.step();
        assert!(!cpu.halted);
        assert_eq!(cpu.registers.pc, 0x0040);
    }

    #[test]
    fn interrupt_dispatch_follows_priority_order_and_clears_if() {
        let mut cpu = new_cpu(&[]);
        cpu.ime = true;
        cpu.mmu.write_byte(0xFFFF, 0xFF); // all enabled
        cpu.mmu
            .set_interrupt_flag((InterruptFlags::TIMER | InterruptFlags::VBLANK).bits());

        cpu.step();

        assert_eq!(cpu.registers.pc, 0x0040, "VBlank outranks Timer");
        assert_eq!(cpu.mmu.interrupt_flag() & InterruptFlags::VBLANK.bits(), 0);
        assert!(!cpu.ime);
    }
}
