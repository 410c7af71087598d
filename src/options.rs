use std::path::PathBuf;

use gumdrop::Options;

#[derive(Debug, Options)]
pub struct AppOptions {
    #[options(help = "print this help message")]
    pub help: bool,

    #[options(free, help = "path to the ROM file to run")]
    pub rom_path: PathBuf,

    #[options(help = "path to a 256-byte DMG boot ROM; omit to skip straight to cartridge code")]
    pub boot_rom: Option<PathBuf>,

    #[options(help = "number of frames to emulate before exiting", default = "60")]
    pub frames: u32,

    #[options(help = "use the green-tinted 'nostalgic' LCD palette instead of plain grey")]
    pub nostalgic_palette: bool,

    #[options(help = "write the last rendered frame as a PPM image to this path")]
    pub dump_frame: Option<PathBuf>,

    #[options(count, help = "increase log verbosity, can be repeated (-v, -vv, -vvv)")]
    pub verbose: u8,
}
