// Display module - the core-side half of the pixel sink boundary
//
// This module provides:
// - NES color palette (64 entries)
// - Frame buffer (256x240 palette indices)
// - The `PixelSink` trait a host frontend implements to receive completed
//   frames; the frontend itself (window creation, vsync, presentation) is
//   an external collaborator and lives outside this crate.

pub mod framebuffer;
pub mod palette;

pub use framebuffer::{FrameBuffer, SCREEN_HEIGHT, SCREEN_SIZE, SCREEN_WIDTH};
pub use palette::{palette_to_rgb, palette_to_rgba, NES_PALETTE};

/// Receives completed frames from the PPU.
///
/// The PPU hands over a `FrameBuffer` once per "frame complete" event; a
/// host implements this to push the buffer to a window, an off-screen
/// surface, or a test harness. Implementations must treat each call as a
/// full, consistent frame (the PPU never calls this mid-frame).
pub trait PixelSink {
    fn present(&mut self, frame: &FrameBuffer);
}
