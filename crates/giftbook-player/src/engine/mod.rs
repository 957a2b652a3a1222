//! Engine — minifb window, input polling and stage renderer.
//!
//! Uses a 640×480 pixel framebuffer with 32-bit ARGB pixels. The stage is
//! drawn from its marker state each frame; the presentation owns all logic.

pub mod draw;
pub mod sound_engine;
pub mod timers;

use std::time::Instant;

use anyhow::Result;
use giftbook_common::AppConfig;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::game::ports::FocusRing;
use crate::game::stage::{ElementId, Marker, Section, Stage};
use crate::game::Presentation;
use draw::{fill_gradient, fill_rect, outline_rect, shade, Rect};
use sound_engine::SoundEngine;

pub const SCREEN_WIDTH: usize = 640;
pub const SCREEN_HEIGHT: usize = 480;
const FPS: usize = 60;
/// Held navigation keys keep stepping; the cooldown bounds the rate
const KEY_REPEAT: KeyRepeat = KeyRepeat::Yes;

/// Presentation as driven by the desktop engine
pub type DesktopPresentation = Presentation<Option<SoundEngine>, FocusRing>;

// Layout (logical 640×480)
const GIFT_BOX: Rect = Rect::new(240, 190, 160, 130);
const GIFT_LID: Rect = Rect::new(228, 166, 184, 28);
/// Where the unwrapped box sits once the book is out
const GIFT_BOX_CORNER: Rect = Rect::new(24, 392, 64, 52);
const BOOK: Rect = Rect::new(170, 90, 300, 300);
const SPINE_X: i32 = 320;
const LID_LIFT: i32 = 48;

const PAPER: u32 = 0xFFF4EBD0;
const COVER: u32 = 0xFF8E2B3A;
const RIBBON: u32 = 0xFFE8C547;
const BOX: u32 = 0xFF3C7A5C;
const FOCUS: u32 = 0xFFFFE066;

/// Run the engine until the window closes or Escape is pressed
pub fn run(config: &AppConfig, mut presentation: DesktopPresentation) -> Result<()> {
    let scale = config.window.scale.max(1);
    let options = WindowOptions {
        resize: true,
        scale_mode: minifb::ScaleMode::AspectRatioStretch,
        ..Default::default()
    };
    let mut window = Window::new("Giftbook", SCREEN_WIDTH * scale, SCREEN_HEIGHT * scale, options)
        .map_err(|e| anyhow::anyhow!("Window creation failed: {}", e))?;
    window.set_target_fps(FPS);

    let mut framebuffer = vec![0u32; SCREEN_WIDTH * SCREEN_HEIGHT];
    let mut prev_mouse_down = false;
    let mut frame_count: u64 = 0;
    let started = Instant::now();

    tracing::info!("Engine initialized, entering main loop");
    tracing::info!(
        "Controls: wheel/drag/{}/{} = navigate | click gift = open | Esc = quit",
        config.input.forward_key,
        config.input.backward_key
    );

    while window.is_open() && !window.is_key_down(Key::Escape) {
        presentation.update(started.elapsed().as_millis() as u64);

        // Mouse → logical 640×480
        let (out_w, out_h) = window.get_size();
        let (mouse_x, mouse_y) = window
            .get_mouse_pos(MouseMode::Clamp)
            .unwrap_or((0.0, 0.0));
        let mx = ((mouse_x as usize) * SCREEN_WIDTH / out_w.max(1)) as i32;
        let my = ((mouse_y as usize) * SCREEN_HEIGHT / out_h.max(1)) as i32;
        let mx = mx.clamp(0, SCREEN_WIDTH as i32 - 1);
        let my = my.clamp(0, SCREEN_HEIGHT as i32 - 1);

        // minifb reports wheel-up as positive
        if let Some((_, scroll_y)) = window.get_scroll_wheel() {
            presentation.on_wheel(-scroll_y);
        }

        for key in window.get_keys_pressed(KEY_REPEAT) {
            if let Some(name) = key_name(key) {
                presentation.on_key_down(name);
            }
        }

        // Left-button drags stand in for touch swipes; a release that is
        // not a swipe and lands on the gift box is a click.
        let mouse_down = window.get_mouse_down(MouseButton::Left);
        if mouse_down && !prev_mouse_down {
            presentation.on_touch_start(my as f32);
        }
        if !mouse_down && prev_mouse_down {
            let swiped = presentation.on_touch_end(Some(my as f32)).is_some();
            if !swiped && gift_box_rect(presentation.stage()).contains(mx, my) {
                presentation.on_primary_click();
            }
        }
        prev_mouse_down = mouse_down;

        let focused = presentation.sequencer.applicator().focus().focused();
        render(&mut framebuffer, presentation.stage(), focused);

        frame_count += 1;
        if frame_count % 5 == 0 {
            let seq = presentation.sequencer.sequence();
            let title = format!(
                "Giftbook – {} ({}/{}){}",
                presentation.scene(),
                presentation.sequencer.position() + 1,
                seq.len(),
                if presentation.sequencer.is_throttled() { " …" } else { "" },
            );
            window.set_title(&title);
        }

        window
            .update_with_buffer(&framebuffer, SCREEN_WIDTH, SCREEN_HEIGHT)
            .map_err(|e| anyhow::anyhow!("Display error: {}", e))?;
    }

    tracing::info!("Engine shutdown at scene {}", presentation.scene());
    Ok(())
}

/// DOM-style key name for a minifb key
fn key_name(key: Key) -> Option<&'static str> {
    Some(match key {
        Key::Up => "ArrowUp",
        Key::Down => "ArrowDown",
        Key::Left => "ArrowLeft",
        Key::Right => "ArrowRight",
        Key::PageUp => "PageUp",
        Key::PageDown => "PageDown",
        Key::Home => "Home",
        Key::End => "End",
        Key::Space => " ",
        Key::Enter => "Enter",
        _ => return None,
    })
}

/// Click target of the gift box for the current stage
fn gift_box_rect(stage: &Stage) -> Rect {
    if stage.section(Section::Gift).has(Marker::Active) {
        GIFT_BOX
    } else {
        GIFT_BOX_CORNER
    }
}

/// Draw the whole stage into a 640×480 framebuffer
fn render(fb: &mut [u32], stage: &Stage, focused: Option<ElementId>) {
    let (top, bottom) = match stage.active_section() {
        Some(Section::Gift) => (0x2A1B3D, 0x44318D),
        Some(Section::Book) => (0x10203A, 0x24476B),
        Some(Section::Finale) => (0x5A2A0C, 0xC98A2E),
        None => (0x000000, 0x000000),
    };
    fill_gradient(fb, top, bottom);

    draw_gift_box(fb, stage);
    if stage.container.has(Marker::Visible) {
        draw_book(fb, stage);
        if focused == Some(ElementId::Book) {
            outline_rect(fb, BOOK.inflate(6), FOCUS);
        }
    }
    if stage.section(Section::Finale).has(Marker::Active) {
        draw_confetti(fb);
    }
}

fn draw_gift_box(fb: &mut [u32], stage: &Stage) {
    let open = stage.gift_box.has(Marker::Open);
    let body = gift_box_rect(stage);
    let (lid, ribbon_w) = if body == GIFT_BOX {
        (GIFT_LID, 16)
    } else {
        (Rect::new(body.x - 4, body.y - 10, body.w + 8, 12), 6)
    };
    let lid = if open { lid.offset(0, -LID_LIFT * body.h / GIFT_BOX.h) } else { lid };

    fill_rect(fb, body, BOX);
    fill_rect(fb, Rect::new(body.x + (body.w - ribbon_w) / 2, body.y, ribbon_w, body.h), RIBBON);
    if open {
        // Inside of the box
        fill_rect(fb, Rect::new(body.x + 4, body.y, body.w - 8, 6), shade(BOX, 40));
    }
    fill_rect(fb, lid, shade(BOX, 120));
    fill_rect(fb, Rect::new(lid.x + (lid.w - ribbon_w) / 2, lid.y, ribbon_w, lid.h), RIBBON);
}

fn draw_book(fb: &mut [u32], stage: &Stage) {
    let opening = stage.container.has(Marker::Opening);
    let open = stage.container.has(Marker::Open);
    if opening && !open {
        fill_rect(fb, BOOK.inflate(18), 0x40FFF2C0);
    }
    if !opening && !open {
        // Closed book standing in the middle
        fill_rect(fb, Rect::new(SPINE_X - BOOK.w / 4, BOOK.y, BOOK.w / 2, BOOK.h), COVER);
        return;
    }

    let half = BOOK.w / 2;
    let left = Rect::new(BOOK.x, BOOK.y, half, BOOK.h);
    let right = Rect::new(SPINE_X, BOOK.y, half, BOOK.h);

    let cover_flipped = stage.cover.has(Marker::Flipped);
    if cover_flipped {
        fill_rect(fb, left.inflate(4), shade(COVER, 80));
    }
    fill_rect(fb, right.inflate(4), shade(COVER, 80));

    let mut pages: Vec<_> = stage.pages().iter().collect();
    pages.sort_by_key(|p| p.z_index.unwrap_or(0));
    for page in pages {
        let ElementId::Page(i) = page.id else { continue };
        let rect = if page.has(Marker::Flipped) { left } else { right };
        let tint = if i % 2 == 0 { 100 } else { 94 };
        fill_rect(fb, rect, shade(PAPER, tint));
        outline_rect(fb, rect, shade(PAPER, 70));
    }

    if !cover_flipped {
        fill_rect(fb, right, COVER);
        fill_rect(fb, Rect::new(right.x + 20, right.y + 40, half - 40, 6), RIBBON);
    }
    fill_rect(fb, Rect::new(SPINE_X - 1, BOOK.y, 2, BOOK.h), shade(COVER, 60));
}

fn draw_confetti(fb: &mut [u32]) {
    const COLORS: [u32; 4] = [0xFFFF6B6B, 0xFFFFD93D, 0xFF6BCB77, 0xFF4D96FF];
    let mut seed: u32 = 0x9E3779B9;
    for n in 0..60 {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        let x = (seed >> 8) as i32 % SCREEN_WIDTH as i32;
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        let y = (seed >> 8) as i32 % (BOOK.y - 10).max(1);
        fill_rect(fb, Rect::new(x, y, 6, 4), COLORS[n % COLORS.len()]);
    }
}
