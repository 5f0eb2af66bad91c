#![forbid(unsafe_code)]

//! Colors used by the slot widgets.

/// A straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// CSS-style hex string, `#rrggbb` or `#rrggbbaa`.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Widget palette.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub row_background: Rgba,
    pub row_outline: Rgba,
    pub text: Rgba,
    pub text_secondary: Rgba,
    pub toggle_on: Rgba,
    pub toggle_off: Rgba,
    pub toggle_partial: Rgba,
    pub toggle_knob: Rgba,
    pub arrow: Rgba,
    pub overlay_background: Rgba,
    pub overlay_outline: Rgba,
    /// Global alpha for the text and arrows of disabled slots.
    pub disabled_opacity: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            row_background: Rgba::rgb(0x22, 0x22, 0x22),
            row_outline: Rgba::rgb(0x66, 0x66, 0x66),
            text: Rgba::rgb(0xdd, 0xdd, 0xdd),
            text_secondary: Rgba::rgb(0x99, 0x99, 0x99),
            toggle_on: Rgba::rgb(0x8a, 0xb4, 0xf8),
            toggle_off: Rgba::rgb(0x55, 0x55, 0x55),
            toggle_partial: Rgba::rgb(0x6a, 0x86, 0xb8),
            toggle_knob: Rgba::rgb(0xee, 0xee, 0xee),
            arrow: Rgba::rgb(0xbb, 0xbb, 0xbb),
            overlay_background: Rgba::rgb(0x11, 0x11, 0x11),
            overlay_outline: Rgba::rgb(0x8a, 0xb4, 0xf8),
            disabled_opacity: 0.4,
        }
    }
}
