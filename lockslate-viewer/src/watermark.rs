//! Tiled identity watermark.
//!
//! A dense, semi-transparent lattice of `email • name • date` labels the
//! embedder paints in a fixed overlay above the content, positioned
//! against the viewport, so scrolling the content underneath never
//! moves it out of the way.

use crate::client::ViewerIdentity;
use chrono::NaiveDate;

/// Opacity the embedder applies to the overlay.
pub const WATERMARK_OPACITY: f32 = 0.1;

/// Rotation of the lattice in degrees.
pub const WATERMARK_ROTATION_DEG: f32 = -45.0;

/// Horizontal/vertical distance between tile anchors, in CSS pixels.
const TILE_SPACING_X: u32 = 280;
const TILE_SPACING_Y: u32 = 120;

/// Anchor position of one watermark label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatermarkTile {
    pub x: i32,
    pub y: i32,
}

/// The watermark for one viewer session.
#[derive(Clone, Debug)]
pub struct Watermark {
    label: String,
}

impl Watermark {
    pub fn new(identity: &ViewerIdentity, date: NaiveDate) -> Self {
        Self {
            label: format!(
                "{} • {} • {}",
                identity.email,
                identity.name,
                date.format("%Y-%m-%d")
            ),
        }
    }

    /// The text every tile repeats.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Tile anchors covering the whole viewport.
    ///
    /// The lattice overshoots one spacing on every edge so the rotated
    /// labels still cover the corners; it depends only on the viewport
    /// size, never on scroll position.
    pub fn tiles(&self, viewport_w: u32, viewport_h: u32) -> Vec<WatermarkTile> {
        let mut tiles = Vec::new();
        let mut y = -(TILE_SPACING_Y as i32);
        let mut row = 0u32;
        while y < (viewport_h + TILE_SPACING_Y) as i32 {
            // Offset alternate rows for denser visual coverage
            let x_offset = if row % 2 == 0 { 0 } else { (TILE_SPACING_X / 2) as i32 };
            let mut x = -(TILE_SPACING_X as i32) + x_offset;
            while x < (viewport_w + TILE_SPACING_X) as i32 {
                tiles.push(WatermarkTile { x, y });
                x += TILE_SPACING_X as i32;
            }
            y += TILE_SPACING_Y as i32;
            row += 1;
        }
        tiles
    }
}
