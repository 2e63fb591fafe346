// Machine module - owns the bus and CPU core and drives the tick loop
//
// This is the piece that actually runs a ROM: it fetches one CPU
// instruction at a time through whatever `OpcodeEngine` is plugged in,
// advances the PPU three dots per CPU cycle, and handles the two
// asynchronous handshakes the rest of the system can't: VBlank NMI and
// OAM DMA.

use crate::bus::Bus;
use crate::cpu::{Cpu, OpcodeEngine};

/// Owns C1-C4 (cartridge/mapper, PPU, CPU memory map) and wires the
/// tick/NMI/frame-complete handshake to the opcode engine driving the CPU.
///
/// Generic over the opcode engine so a different 6502 core (or a test
/// double) can be plugged in without this module changing.
pub struct Machine<E: OpcodeEngine = Cpu> {
    bus: Bus,
    cpu: E,
    /// Cycles still owed to a prior OAM DMA stall; charged before the next
    /// instruction fetch.
    dma_stall_cycles: u32,
    /// Running total, used only to tell whether a DMA request landed on an
    /// odd or even CPU cycle (that parity decides 513 vs. 514 stall cycles).
    total_cycles: u64,
}

impl Machine<Cpu> {
    pub fn new() -> Self {
        Machine {
            bus: Bus::new(),
            cpu: Cpu::new(),
            dma_stall_cycles: 0,
            total_cycles: 0,
        }
    }
}

impl Default for Machine<Cpu> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: OpcodeEngine> Machine<E> {
    /// Build a machine around an explicit opcode engine, useful for tests
    /// that want to drive the bus/PPU without the reference CPU core.
    pub fn with_engine(engine: E) -> Self {
        Machine {
            bus: Bus::new(),
            cpu: engine,
            dma_stall_cycles: 0,
            total_cycles: 0,
        }
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn cpu(&self) -> &E {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut E {
        &mut self.cpu
    }

    /// Load the reset vector and bring the machine to its power-on state.
    pub fn reset(&mut self) {
        self.cpu.reset(&mut self.bus);
        self.dma_stall_cycles = 0;
    }

    /// Run one CPU instruction (plus any owed DMA stall cycles), advance
    /// the PPU in lockstep, and service a pending NMI if VBlank started.
    ///
    /// Returns the number of CPU cycles this step consumed.
    pub fn step(&mut self) -> u32 {
        if self.dma_stall_cycles > 0 {
            let stalled = self.dma_stall_cycles;
            self.dma_stall_cycles = 0;
            self.tick_ppu(stalled);
            self.total_cycles += stalled as u64;
            return stalled;
        }

        let cycles = self.cpu.step(&mut self.bus);
        self.tick_ppu(cycles);
        let landed_on_odd_cycle = self.total_cycles % 2 == 1;
        self.total_cycles += cycles as u64;

        if let Some(page) = self.bus.take_oam_dma_request() {
            self.run_oam_dma(page, landed_on_odd_cycle);
        }

        if self.bus.ppu().nmi_pending() {
            self.bus.ppu_mut().clear_nmi();
            self.cpu.nmi(&mut self.bus);
        }

        cycles
    }

    /// Run CPU steps until a full frame has been rendered, returning the
    /// number of CPU cycles consumed. Used by host frontends that pump one
    /// frame per vsync tick.
    pub fn run_frame(&mut self) -> u32 {
        let starting_frame = self.bus.ppu().frame_count();
        let mut total_cycles = 0;
        while self.bus.ppu().frame_count() == starting_frame {
            total_cycles += self.step();
        }
        total_cycles
    }

    /// Copy 256 bytes from `page << 8` into OAM and charge the 513/514
    /// cycle stall (514 when the triggering write landed on an odd CPU
    /// cycle, per the DMA unit's extra alignment cycle).
    fn run_oam_dma(&mut self, page: u8, landed_on_odd_cycle: bool) {
        let base = (page as u16) << 8;
        for offset in 0..=255u8 {
            let byte = self.bus.read(base.wrapping_add(offset as u16));
            self.bus.write_oam_byte(offset, byte);
        }
        self.dma_stall_cycles = if landed_on_odd_cycle { 514 } else { 513 };
    }

    fn tick_ppu(&mut self, cpu_cycles: u32) {
        for _ in 0..(cpu_cycles * 3) {
            self.bus.ppu_mut().step();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_loads_pc_from_vector() {
        let mut machine = Machine::new();
        machine.bus_mut().write(0xFFFC, 0x00);
        machine.bus_mut().write(0xFFFD, 0x80);
        machine.reset();
        assert_eq!(machine.cpu().pc, 0x8000);
    }

    #[test]
    fn step_advances_ppu_three_dots_per_cpu_cycle() {
        let mut machine = Machine::new();
        machine.bus_mut().write(0xFFFC, 0x00);
        machine.bus_mut().write(0xFFFD, 0x80);
        machine.reset();
        machine.bus_mut().write(0x8000, 0xEA); // NOP, 2 cycles
        let before = machine.bus().ppu().cycle();
        let cycles = machine.step();
        assert_eq!(cycles, 2);
        let after = machine.bus().ppu().cycle();
        // Exact dot position wraps around scanlines, so just check it moved.
        assert_ne!(before, after);
    }

    #[test]
    fn run_frame_stops_after_one_frame_completes() {
        let mut machine = Machine::new();
        machine.bus_mut().write(0xFFFC, 0x00);
        machine.bus_mut().write(0xFFFD, 0x80);
        machine.reset();
        // JMP $8000 - an infinite loop the PPU ticks through for a whole frame.
        machine.bus_mut().write(0x8000, 0x4C);
        machine.bus_mut().write(0x8001, 0x00);
        machine.bus_mut().write(0x8002, 0x80);
        let starting = machine.bus().ppu().frame_count();
        machine.run_frame();
        assert_eq!(machine.bus().ppu().frame_count(), starting + 1);
    }
}
