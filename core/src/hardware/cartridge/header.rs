//! Header parsing used only for diagnostics (title in log messages); it never
//! drives banking decisions since this core assumes a 32 KiB, no-MBC cartridge.
use std::str::from_utf8;

pub const HEADER_START: u16 = 0x0100;
pub const HEADER_END: u16 = 0x014F;

#[derive(Debug, Default)]
pub struct CartridgeHeader {
    /// Upper case ASCII, 16 characters, zero filled if less than that.
    pub title: String,
    /// Specifies which Memory Bank Controller (if any) the header declares.
    /// Not consulted for behavior here; only carried for logging.
    pub cartridge_type: u8,
    /// Specifies the ROM Size of the cartridge. Typically calculated as "32KB shl N".
    pub rom_size: u8,
    /// Specifies the size of the external RAM in the cartridge (if any).
    pub ram_size: u8,
    /// Contains an 8 bit checksum across the cartridge header bytes 0134-014C.
    pub header_checksum: u8,
    /// Contains a 16 bit checksum (upper byte first) across the whole cartridge ROM.
    pub global_checksum: u16,
}

impl CartridgeHeader {
    pub fn new(rom: &[u8]) -> Self {
        CartridgeHeader {
            title: read_title(rom),
            cartridge_type: rom.get(0x147).copied().unwrap_or(0),
            rom_size: rom.get(0x148).copied().unwrap_or(0),
            ram_size: rom.get(0x149).copied().unwrap_or(0),
            header_checksum: rom.get(0x14D).copied().unwrap_or(0),
            global_checksum: read_global_checksum(rom),
        }
    }
}

fn read_title(rom: &[u8]) -> String {
    let end = (0x144).min(rom.len());
    let start = (0x134).min(end);
    from_utf8(&rom[start..end])
        .unwrap_or("")
        .trim_matches(char::from(0))
        .to_owned()
}

fn read_global_checksum(rom: &[u8]) -> u16 {
    if rom.len() < 0x150 {
        return 0;
    }
    ((rom[0x14E] as u16) << 8) | rom[0x14F] as u16
}

#[cfg(test)]
mod tests {
    use super::read_title;

    #[test]
    fn test_read_title() {
        let mut test = vec![0u8; 0x8000];
        for (loc, i) in [0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x20, 0x57, 0x6f, 0x72, 0x00, 0x00]
            .iter()
            .enumerate()
        {
            test[0x134 + loc] = *i;
        }
        assert_eq!("Hello Wor", read_title(&test));
    }
}