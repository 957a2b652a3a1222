//! Framebuffer primitives (ARGB u32, 640×480)

use super::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Axis-aligned rectangle in framebuffer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && py >= self.y && px < self.x + self.w && py < self.y + self.h
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Grow (or shrink, for negative `by`) on every side
    pub fn inflate(&self, by: i32) -> Self {
        Self::new(self.x - by, self.y - by, self.w + 2 * by, self.h + 2 * by)
    }
}

/// Fill a rectangle, clipped to the framebuffer. Alpha below 0xFF blends.
pub fn fill_rect(fb: &mut [u32], rect: Rect, color: u32) {
    let a = color >> 24;
    if a == 0 {
        return;
    }
    let x0 = rect.x.max(0);
    let y0 = rect.y.max(0);
    let x1 = (rect.x + rect.w).min(SCREEN_WIDTH as i32);
    let y1 = (rect.y + rect.h).min(SCREEN_HEIGHT as i32);
    for y in y0..y1 {
        let row = y as usize * SCREEN_WIDTH;
        for x in x0..x1 {
            let idx = row + x as usize;
            fb[idx] = if a >= 0xFF { color } else { blend(fb[idx], color, a) };
        }
    }
}

/// One-pixel rectangle outline
pub fn outline_rect(fb: &mut [u32], rect: Rect, color: u32) {
    fill_rect(fb, Rect::new(rect.x, rect.y, rect.w, 1), color);
    fill_rect(fb, Rect::new(rect.x, rect.y + rect.h - 1, rect.w, 1), color);
    fill_rect(fb, Rect::new(rect.x, rect.y, 1, rect.h), color);
    fill_rect(fb, Rect::new(rect.x + rect.w - 1, rect.y, 1, rect.h), color);
}

/// Vertical gradient between two opaque colors
pub fn fill_gradient(fb: &mut [u32], top: u32, bottom: u32) {
    for y in 0..SCREEN_HEIGHT {
        let t = (y * 255 / (SCREEN_HEIGHT - 1)) as u32;
        let color = 0xFF000000 | mix(top, bottom, t);
        fb[y * SCREEN_WIDTH..(y + 1) * SCREEN_WIDTH].fill(color);
    }
}

/// Scale RGB channels by `percent` / 100
pub fn shade(color: u32, percent: u32) -> u32 {
    let r = ((color >> 16) & 0xFF) * percent / 100;
    let g = ((color >> 8) & 0xFF) * percent / 100;
    let b = (color & 0xFF) * percent / 100;
    (color & 0xFF000000) | (r.min(255) << 16) | (g.min(255) << 8) | b.min(255)
}

fn blend(dst: u32, src: u32, a: u32) -> u32 {
    0xFF000000 | mix(dst, src, a)
}

/// Per-channel linear mix of `from` towards `to`, `t` in 0..=255
fn mix(from: u32, to: u32, t: u32) -> u32 {
    let inv = 255 - t;
    let ch = |shift: u32| {
        let a = (from >> shift) & 0xFF;
        let b = (to >> shift) & 0xFF;
        ((a * inv + b * t) / 255) << shift
    };
    ch(16) | ch(8) | ch(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_is_clipped() {
        let mut fb = vec![0u32; SCREEN_WIDTH * SCREEN_HEIGHT];
        fill_rect(&mut fb, Rect::new(-10, -10, 20, 20), 0xFFFFFFFF);
        assert_eq!(fb[0], 0xFFFFFFFF);
        assert_eq!(fb[9 * SCREEN_WIDTH + 9], 0xFFFFFFFF);
        assert_eq!(fb[10], 0);
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains(10, 10));
        assert!(r.contains(14, 14));
        assert!(!r.contains(15, 10));
    }

    #[test]
    fn half_alpha_blends() {
        let mut fb = vec![0xFF000000u32; SCREEN_WIDTH * SCREEN_HEIGHT];
        fill_rect(&mut fb, Rect::new(0, 0, 1, 1), 0x80FFFFFF);
        let r = (fb[0] >> 16) & 0xFF;
        assert!(r > 0x70 && r < 0x90, "got {:x}", fb[0]);
    }

    #[test]
    fn shade_darkens() {
        assert_eq!(shade(0xFF804020, 50), 0xFF402010);
    }
}
