//! Resolves the addressing modes used by `execute.rs` (a plain register, `(HL)` and
//! its increment/decrement variants, an immediate operand, `(a16)`, and the `$FF00+`
//! I/O page) to the bytes they read or write, billing memory cycles as it goes.
use crate::hardware::cpu::execute::{InstructionAddress, WrapperEnum};
use crate::hardware::cpu::traits::{SetU16, SetU8, ToU16, ToU8};
use crate::hardware::cpu::Cpu;
use crate::hardware::registers::{Reg16, Reg8};

impl ToU8<Reg8> for Cpu {
    fn read_u8_value(&mut self, target: Reg8) -> u8 {
        match target {
            Reg8::A => self.registers.a,
            Reg8::B => self.registers.b,
            Reg8::C => self.registers.c,
            Reg8::D => self.registers.d,
            Reg8::E => self.registers.e,
            Reg8::H => self.registers.h,
            Reg8::L => self.registers.l,
        }
    }
}

impl SetU8<Reg8> for Cpu {
    fn set_u8_value(&mut self, target: Reg8, value: u8) {
        match target {
            Reg8::A => self.registers.a = value,
            Reg8::B => self.registers.b = value,
            Reg8::C => self.registers.c = value,
            Reg8::D => self.registers.d = value,
            Reg8::E => self.registers.e = value,
            Reg8::H => self.registers.h = value,
            Reg8::L => self.registers.l = value,
        }
    }
}

impl ToU8<InstructionAddress> for Cpu {
    fn read_u8_value(&mut self, target: InstructionAddress) -> u8 {
        match target {
            InstructionAddress::BCI => {
                let addr = self.registers.bc();
                self.read_byte_cycle(addr)
            }
            InstructionAddress::DEI => {
                let addr = self.registers.de();
                self.read_byte_cycle(addr)
            }
            InstructionAddress::HLI => {
                let addr = self.registers.hl();
                self.read_byte_cycle(addr)
            }
            InstructionAddress::HLIP => {
                let addr = self.registers.hl();
                let value = self.read_byte_cycle(addr);
                self.registers.set_hl(addr.wrapping_add(1));
                value
            }
            InstructionAddress::HLIN => {
                let addr = self.registers.hl();
                let value = self.read_byte_cycle(addr);
                self.registers.set_hl(addr.wrapping_sub(1));
                value
            }
            InstructionAddress::DIRECT => self.get_instr_u8(),
            InstructionAddress::DirectMem => {
                let addr = self.get_instr_u16();
                self.read_byte_cycle(addr)
            }
            InstructionAddress::IoDirect => {
                let offset = self.get_instr_u8() as u16;
                self.read_byte_cycle(0xFF00 + offset)
            }
            InstructionAddress::IoC => {
                let offset = self.registers.c as u16;
                self.read_byte_cycle(0xFF00 + offset)
            }
        }
    }
}

impl SetU8<InstructionAddress> for Cpu {
    fn set_u8_value(&mut self, target: InstructionAddress, value: u8) {
        match target {
            InstructionAddress::BCI => {
                let addr = self.registers.bc();
                self.write_byte_cycle(addr, value);
            }
            InstructionAddress::DEI => {
                let addr = self.registers.de();
                self.write_byte_cycle(addr, value);
            }
            InstructionAddress::HLI => {
                let addr = self.registers.hl();
                self.write_byte_cycle(addr, value);
            }
            InstructionAddress::HLIP => {
                let addr = self.registers.hl();
                self.write_byte_cycle(addr, value);
                self.registers.set_hl(addr.wrapping_add(1));
            }
            InstructionAddress::HLIN => {
                let addr = self.registers.hl();
                self.write_byte_cycle(addr, value);
                self.registers.set_hl(addr.wrapping_sub(1));
            }
            InstructionAddress::DIRECT => unreachable!("an immediate operand is never a write target"),
            InstructionAddress::DirectMem => {
                let addr = self.get_instr_u16();
                self.write_byte_cycle(addr, value);
            }
            InstructionAddress::IoDirect => {
                let offset = self.get_instr_u8() as u16;
                self.write_byte_cycle(0xFF00 + offset, value);
            }
            InstructionAddress::IoC => {
                let offset = self.registers.c as u16;
                self.write_byte_cycle(0xFF00 + offset, value);
            }
        }
    }
}

impl ToU8<WrapperEnum> for Cpu {
    fn read_u8_value(&mut self, target: WrapperEnum) -> u8 {
        match target {
            WrapperEnum::Reg8(reg) => self.read_u8_value(reg),
            WrapperEnum::InstructionAddress(addr) => self.read_u8_value(addr),
        }
    }
}

impl SetU8<WrapperEnum> for Cpu {
    fn set_u8_value(&mut self, target: WrapperEnum, value: u8) {
        match target {
            WrapperEnum::Reg8(reg) => self.set_u8_value(reg, value),
            WrapperEnum::InstructionAddress(addr) => self.set_u8_value(addr, value),
        }
    }
}

impl ToU16<Reg16> for Cpu {
    fn read_u16_value(&mut self, target: Reg16) -> u16 {
        match target {
            Reg16::AF => self.registers.af(),
            Reg16::BC => self.registers.bc(),
            Reg16::DE => self.registers.de(),
            Reg16::HL => self.registers.hl(),
            Reg16::SP => self.registers.sp,
        }
    }
}

impl SetU16<Reg16> for Cpu {
    fn set_u16_value(&mut self, target: Reg16, value: u16) {
        match target {
            Reg16::AF => self.registers.set_af(value),
            Reg16::BC => self.registers.set_bc(value),
            Reg16::DE => self.registers.set_de(value),
            Reg16::HL => self.registers.set_hl(value),
            Reg16::SP => self.registers.sp = value,
        }
    }
}

impl ToU16<InstructionAddress> for Cpu {
    fn read_u16_value(&mut self, target: InstructionAddress) -> u16 {
        match target {
            InstructionAddress::DIRECT => self.get_instr_u16(),
            other => unreachable!("{:?} is not a 16-bit source", other),
        }
    }
}

impl SetU16<InstructionAddress> for Cpu {
    fn set_u16_value(&mut self, target: InstructionAddress, value: u16) {
        match target {
            InstructionAddress::DirectMem => {
                let addr = self.get_instr_u16();
                self.write_short_cycle(addr, value);
            }
            other => unreachable!("{:?} is not a 16-bit destination", other),
        }
    }
}
