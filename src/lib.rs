// NES Emulator Library
// Core library for the NES emulator implementation

// Public modules
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod debug;
pub mod display;
pub mod emulator;
pub mod input;
pub mod machine;
pub mod ppu;
pub mod ram;

// Re-export main types for convenience
pub use bus::{Bus, MemoryMappedDevice};
pub use cartridge::{Cartridge, LoadError, Mapper, Mirroring};
pub use cpu::{Cpu, OpcodeEngine};
pub use debug::{CpuDebugger, CpuState, Debugger, LogLevel, Logger, MemoryRegion, MemoryViewer, PpuDebugger, PpuState, SpriteInfo, TraceEntry};
pub use display::{FrameBuffer, PixelSink};
pub use emulator::{Emulator, EmulatorConfig, SpeedMode};
pub use input::{Controller, ControllerIO};
pub use machine::Machine;
pub use ppu::Ppu;
pub use ram::Ram;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_components() {
        // Test that all components can be instantiated
        let _cpu = Cpu::new();
        let _ppu = Ppu::new();
        let _bus = Bus::new();
        let _cartridge = Cartridge::new();
        let _controller = Controller::new();
        let _controller_io = ControllerIO::new();
        let _ram = Ram::new();
    }
}
