// Emulator module - Main emulator coordinator
//
// Thin convenience wrapper around `Machine`: loads a ROM file into a
// cartridge/mapper, owns the user-facing configuration, and exposes
// play/pause/speed controls for a host frontend to drive.

mod config;

pub use config::{EmulatorConfig, SpeedMode};

use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::cpu::Cpu;
use crate::machine::Machine;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Main emulator structure
///
/// Coordinates the machine and provides high-level functionality for
/// loading games, controlling playback speed, and managing configuration.
pub struct Emulator {
    /// CPU + bus + tick/NMI/DMA handshake
    machine: Machine<Cpu>,

    /// Currently loaded cartridge, kept around for its header metadata
    /// (mirroring, mapper number) even though the bus owns the live mapper.
    cartridge: Option<Cartridge>,

    /// Configuration
    config: EmulatorConfig,

    /// Currently loaded ROM path
    rom_path: Option<PathBuf>,

    /// Paused state
    paused: bool,

    /// Speed mode
    speed_mode: SpeedMode,

    /// Frame timing for speed control
    #[allow(dead_code)]
    last_frame_time: Option<Instant>,
}

impl Emulator {
    /// Create a new emulator instance
    ///
    /// Initializes all components to their power-on state.
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// ```
    pub fn new() -> Self {
        Emulator {
            machine: Machine::new(),
            cartridge: None,
            config: EmulatorConfig::load_or_default(),
            rom_path: None,
            paused: false,
            speed_mode: SpeedMode::Normal,
            last_frame_time: None,
        }
    }

    /// Load a ROM file
    ///
    /// Parses the iNES file, builds its mapper, and wires it into the bus.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the ROM file (.nes)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nes_rs::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.load_rom("game.nes").expect("Failed to load ROM");
    /// ```
    pub fn load_rom<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let cartridge = Cartridge::from_ines_file(path)?;
        self.machine.bus_mut().load_cartridge(cartridge.clone())?;

        self.cartridge = Some(cartridge);
        self.rom_path = Some(path.to_path_buf());

        self.reset();

        Ok(())
    }

    /// Reset the emulator
    ///
    /// Resets CPU and bus state to power-on, as if pressing the reset button.
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.reset();
    /// ```
    pub fn reset(&mut self) {
        self.machine.reset();
        self.paused = false;
    }

    /// Run CPU/PPU steps until a full frame has been produced.
    ///
    /// No-ops while paused.
    pub fn run_frame(&mut self) {
        if self.paused {
            return;
        }
        self.machine.run_frame();
    }

    /// Set speed mode
    ///
    /// Controls emulation speed (normal, fast forward, slow motion).
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::emulator::{Emulator, SpeedMode};
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.set_speed_mode(SpeedMode::FastForward2x);
    /// ```
    pub fn set_speed_mode(&mut self, mode: SpeedMode) {
        self.speed_mode = mode;
    }

    /// Get current speed mode
    pub fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    /// Pause the emulator
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume the emulator
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Check if emulator is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Get reference to CPU
    pub fn cpu(&self) -> &Cpu {
        self.machine.cpu()
    }

    /// Get mutable reference to CPU
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        self.machine.cpu_mut()
    }

    /// Get reference to Bus
    pub fn bus(&self) -> &Bus {
        self.machine.bus()
    }

    /// Get mutable reference to Bus
    pub fn bus_mut(&mut self) -> &mut Bus {
        self.machine.bus_mut()
    }

    /// Get reference to the owning machine (bus + CPU + tick handshake)
    pub fn machine(&self) -> &Machine<Cpu> {
        &self.machine
    }

    /// Get mutable reference to the owning machine
    pub fn machine_mut(&mut self) -> &mut Machine<Cpu> {
        &mut self.machine
    }

    /// Get reference to configuration
    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    /// Get mutable reference to configuration
    pub fn config_mut(&mut self) -> &mut EmulatorConfig {
        &mut self.config
    }

    /// Get the currently loaded ROM path
    pub fn rom_path(&self) -> Option<&Path> {
        self.rom_path.as_deref()
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_emulator_starts_unpaused() {
        let emulator = Emulator::new();
        assert!(!emulator.is_paused());
        assert_eq!(emulator.speed_mode(), SpeedMode::Normal);
    }

    #[test]
    fn pause_resume_toggle() {
        let mut emulator = Emulator::new();
        emulator.pause();
        assert!(emulator.is_paused());
        emulator.resume();
        assert!(!emulator.is_paused());
        emulator.toggle_pause();
        assert!(emulator.is_paused());
    }
}
