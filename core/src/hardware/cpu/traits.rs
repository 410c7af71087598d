/// Resolves either a direct register or a memory-pointing pseudo-register (`(HL)`,
/// an immediate operand, ...) to its value, so instruction helpers can stay generic
/// over where their operand actually lives.
pub trait ToU8<T: Copy> {
    fn read_u8_value(&mut self, target: T) -> u8;
}

pub trait SetU8<T: Copy> {
    fn set_u8_value(&mut self, target: T, value: u8);
}

/// Same idea as `ToU8`/`SetU8`, for the 16-bit register pairs and `(a16)`.
pub trait ToU16<T: Copy> {
    fn read_u16_value(&mut self, target: T) -> u16;
}

pub trait SetU16<T: Copy> {
    fn set_u16_value(&mut self, target: T, value: u16);
}
