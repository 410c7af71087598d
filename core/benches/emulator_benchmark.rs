use criterion::{criterion_group, criterion_main, Criterion};
use rustyboi_core::emulator::{Emulator, HostPresenter};
use rustyboi_core::hardware::ppu::palette::RGB;
use rustyboi_core::{EmulatorOptionsBuilder, InputKey};

struct NullHost;

impl HostPresenter for NullHost {
    fn present_frame(&mut self, _frame_buffer: &[RGB]) {}

    fn poll_input(&mut self) -> Vec<(InputKey, bool)> {
        Vec::new()
    }
}

/// A cartridge full of zero bytes runs as an endless stream of NOPs, which is enough
/// to benchmark instruction dispatch and the timer/PPU tick path without shipping a
/// real ROM alongside the crate.
fn nop_rom() -> Vec<u8> {
    vec![0u8; 0x8000]
}

fn step_benchmark(c: &mut Criterion) {
    let mut emulator = Emulator::new(&nop_rom(), EmulatorOptionsBuilder::new().build()).unwrap();

    c.bench_function("cpu step (nop)", |b| b.iter(|| emulator.step()));
}

fn frame_benchmark(c: &mut Criterion) {
    let mut emulator = Emulator::new(&nop_rom(), EmulatorOptionsBuilder::new().build()).unwrap();
    let mut host = NullHost;

    c.bench_function("run one frame", |b| b.iter(|| emulator.run_one_frame(&mut host)));
}

criterion_group!(benches, step_benchmark, frame_benchmark);
criterion_main!(benches);
