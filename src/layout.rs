//! Window and main-menu geometry, computed from an explicit screen size.

use std::str::FromStr;

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl FromStr for ScreenSize {
    type Err = Error;

    /// Parses `1920x1080`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidScreenSize(s.to_string());
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

// ── Main Window ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// A window covering `fraction` of the screen on each axis, centered.
pub fn window_geometry(screen: ScreenSize, fraction: f32) -> WindowGeometry {
    let fraction = fraction.clamp(0.1, 1.0);
    let width = (screen.width as f32 * fraction) as u32;
    let height = (screen.height as f32 * fraction) as u32;
    WindowGeometry {
        x: ((screen.width - width) / 2) as i32,
        y: ((screen.height - height) / 2) as i32,
        width,
        height,
    }
}

// ── Main Menu ───────────────────────────────────────────────────────────────

const BUTTON_WIDTH_RATIO: f64 = 0.18;
const BUTTON_HEIGHT_RATIO: f64 = 0.10;
const SPACING_RATIO: f64 = 0.04;
const MIN_BUTTON: (i32, i32) = (80, 36);
const MAX_BUTTON: (i32, i32) = (280, 80);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuLayout {
    pub buttons: [ButtonRect; 2],
    pub font_size: i32,
}

/// Two equal buttons side by side, centered in a `width` x `height` page.
pub fn menu_layout(width: i32, height: i32) -> MenuLayout {
    let bw = ((width as f64 * BUTTON_WIDTH_RATIO) as i32).clamp(MIN_BUTTON.0, MAX_BUTTON.0);
    let bh = ((height as f64 * BUTTON_HEIGHT_RATIO) as i32).clamp(MIN_BUTTON.1, MAX_BUTTON.1);
    let font_size = ((bh as f64 * 0.4) as i32).max(9);
    let spacing = ((width as f64 * SPACING_RATIO) as i32).max(12);

    let total = bw * 2 + spacing;
    let x0 = ((width - total) / 2).max(0);
    let y0 = ((height - bh) / 2).max(0);
    let button = |x| ButtonRect {
        x,
        y: y0,
        width: bw,
        height: bh,
    };
    MenuLayout {
        buttons: [button(x0), button(x0 + bw + spacing)],
        font_size,
    }
}
