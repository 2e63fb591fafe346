// NES Emulator - Main Entry Point
//
// The host windowing toolkit (pixel sink, input polling, timers) is an
// external collaborator, not part of this crate. This binary is a
// headless smoke-test harness: it loads a ROM, runs it for a fixed
// number of frames, and reports CPU/PPU state, which is enough to drive
// a real frontend against `Emulator`/`PixelSink` without building one here.

use nes_rs::emulator::Emulator;
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("NES Emulator (nes-rs) v0.1.0");
    println!("==============================");

    let args: Vec<String> = env::args().collect();
    let Some(rom_path) = args.get(1) else {
        eprintln!("usage: nes-rs <rom.nes> [frames]");
        return ExitCode::FAILURE;
    };
    let frames: u32 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(60);

    let mut emulator = Emulator::new();
    if let Err(err) = emulator.load_rom(rom_path) {
        eprintln!("failed to load '{}': {}", rom_path, err);
        return ExitCode::FAILURE;
    }
    println!("Loaded '{}'", rom_path);

    for _ in 0..frames {
        emulator.run_frame();
    }

    println!(
        "Ran {} frame(s). CPU: PC={:04X} A={:02X} X={:02X} Y={:02X} SP={:02X} P={:02X}",
        frames,
        emulator.cpu().pc,
        emulator.cpu().a,
        emulator.cpu().x,
        emulator.cpu().y,
        emulator.cpu().sp,
        emulator.cpu().status,
    );

    ExitCode::SUCCESS
}
