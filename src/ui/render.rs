//! Cell rendering, one routine per (policy, item kind).
//!
//! Every routine has the same shape: draw one item into one cell and
//! return the area it occupied. Routines only read machine state; they
//! never change it.

use core::fmt::Write;

use heapless::String;

use crate::config::{CELL_PADDING, CELL_TEXT_LEN, CHAR_HEIGHT, CHAR_WIDTH};
use crate::files::{FileBrowser, Row};
use crate::registry::Registry;
use crate::state::{self, Heater};
use crate::ui::item::{Control, Item};
use crate::ui::layout::{Dimensions, RenderPolicy};
use crate::ui::surface::{Ink, Surface};

type CellText = String<CELL_TEXT_LEN>;

/// Live context for drawing one cell.
pub struct Live<'a> {
    pub registry: &'a dyn Registry,
    pub files: &'a FileBrowser,
    /// Value being edited, only for the selected cell.
    pub editing: Option<f32>,
    /// Second half of the blink period.
    pub blink: bool,
}

pub fn draw<S: Surface + ?Sized>(
    policy: RenderPolicy,
    item: &Item,
    area: &Dimensions,
    surface: &mut S,
    live: &Live<'_>,
) -> Dimensions {
    match (policy, item) {
        (_, Item::Logo { title, subtitle }) => logo(title, subtitle, area, surface),
        (policy, Item::Label { caption })
        | (policy, Item::Command { caption, .. })
        | (policy, Item::ConditionalCommand { caption, .. }) => {
            let ink = frame(policy, area, surface);
            caption_left(caption, area, surface, ink)
        }
        (RenderPolicy::Default, Item::Control(control)) => {
            let ink = frame(RenderPolicy::Default, area, surface);
            control_value(control, None, false, area, surface, live.registry, ink)
        }
        (RenderPolicy::Active, Item::Control(control)) => {
            let ink = frame(RenderPolicy::Active, area, surface);
            control_value(control, live.editing, live.blink, area, surface, live.registry, ink)
        }
        (policy, Item::Text { caption, read }) => {
            let ink = frame(policy, area, surface);
            let value = read(live.registry);
            caption_and_value(caption, &value, area, surface, ink)
        }
        (policy, Item::Temperatures { caption, heater }) => {
            let ink = frame(policy, area, surface);
            temperatures(caption, *heater, area, surface, live.registry, ink)
        }
        (policy, Item::Progress) => {
            let ink = frame(policy, area, surface);
            let progress = state::progress(live.registry);
            let mut value = CellText::new();
            let _ = write!(value, "{}%", progress.percent);
            caption_and_value(&progress.name, &value, area, surface, ink)
        }
        (policy, Item::Time) => {
            let ink = frame(policy, area, surface);
            let time = state::time_progress(live.registry);
            let mut value = CellText::new();
            push_clock(&mut value, time.elapsed);
            let _ = value.push_str(" / ");
            push_clock(&mut value, time.remaining);
            caption_left(&value, area, surface, ink)
        }
        (RenderPolicy::Default, Item::File { slot }) => {
            file_slot(live.files.slot(*slot), RenderPolicy::Default, area, surface)
        }
        (RenderPolicy::Active, Item::File { slot }) => match live.files.slot(*slot) {
            Some(row) => file_slot(Some(row), RenderPolicy::Active, area, surface),
            // An empty slot is never highlighted.
            None => file_slot(None, RenderPolicy::Default, area, surface),
        },
    }
}

/// Box for the policy; returns the ink to print with.
fn frame<S: Surface + ?Sized>(policy: RenderPolicy, area: &Dimensions, surface: &mut S) -> Ink {
    match policy {
        RenderPolicy::Default => {
            surface.draw_rectangle(area.x, area.y, area.w, area.h, false);
            Ink::Normal
        }
        RenderPolicy::Active => {
            surface.draw_rectangle(area.x, area.y, area.w, area.h, true);
            Ink::Inverted
        }
    }
}

/// Characters fitting between the cell's paddings.
fn columns(area: &Dimensions) -> usize {
    (area.w.saturating_sub(2 * CELL_PADDING) / CHAR_WIDTH) as usize
}

fn fit(text: &str, columns: usize) -> &str {
    match text.char_indices().nth(columns) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

fn text_y(area: &Dimensions) -> i32 {
    area.y + (area.h.saturating_sub(CHAR_HEIGHT) / 2) as i32
}

fn caption_left<S: Surface + ?Sized>(
    caption: &str,
    area: &Dimensions,
    surface: &mut S,
    ink: Ink,
) -> Dimensions {
    surface.print(
        area.x + CELL_PADDING as i32,
        text_y(area),
        fit(caption, columns(area)),
        ink,
    );
    *area
}

/// Caption on the left, value right-aligned. The value wins when both
/// do not fit.
fn caption_and_value<S: Surface + ?Sized>(
    caption: &str,
    value: &str,
    area: &Dimensions,
    surface: &mut S,
    ink: Ink,
) -> Dimensions {
    let columns = columns(area);
    let value = fit(value, columns);
    let value_len = value.chars().count();
    let room = columns.saturating_sub(value_len + 1);

    let y = text_y(area);
    if room > 0 {
        surface.print(area.x + CELL_PADDING as i32, y, fit(caption, room), ink);
    }
    let right = area.x + area.w as i32 - CELL_PADDING as i32;
    surface.print(right - (value_len as u32 * CHAR_WIDTH) as i32, y, value, ink);
    *area
}

fn control_value<S: Surface + ?Sized>(
    control: &Control,
    editing: Option<f32>,
    blink: bool,
    area: &Dimensions,
    surface: &mut S,
    registry: &dyn Registry,
    ink: Ink,
) -> Dimensions {
    let mut value = CellText::new();
    match editing {
        // The edited value flashes.
        Some(_) if blink => {}
        Some(edited) => {
            let _ = write!(value, "[{:.0}]", edited);
        }
        None => match (control.read)(registry) {
            Some(live) => {
                let _ = write!(value, "{:.0}", live);
            }
            None => {
                let _ = value.push('-');
            }
        },
    }
    caption_and_value(control.caption, &value, area, surface, ink)
}

fn temperatures<S: Surface + ?Sized>(
    caption: &str,
    heater: Heater,
    area: &Dimensions,
    surface: &mut S,
    registry: &dyn Registry,
    ink: Ink,
) -> Dimensions {
    let t = state::temperatures(registry, heater).unwrap_or_default();
    let mut value = CellText::new();
    let _ = write!(value, "{:.0}/{:.0}", t.current, t.target);
    caption_and_value(caption, &value, area, surface, ink)
}

/// `h:mm:ss`
fn push_clock(out: &mut CellText, secs: u32) {
    let _ = write!(out, "{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60);
}

fn file_slot<S: Surface + ?Sized>(
    row: Option<Row<'_>>,
    policy: RenderPolicy,
    area: &Dimensions,
    surface: &mut S,
) -> Dimensions {
    let ink = frame(policy, area, surface);
    let Some(row) = row else {
        return *area;
    };
    let mut label = CellText::new();
    let _ = label.push_str(fit(row.name(), CELL_TEXT_LEN - 1));
    if let Row::Entry(entry) = row {
        if entry.is_folder {
            let _ = label.push('/');
        }
    }
    caption_left(&label, area, surface, ink)
}

/// Horizontally centered start and clipped text.
fn centered<'t>(area: &Dimensions, text: &'t str) -> (i32, &'t str) {
    let text = fit(text, columns(area));
    let width = text.chars().count() as u32 * CHAR_WIDTH;
    (area.x + (area.w.saturating_sub(width) / 2) as i32, text)
}

fn logo<S: Surface + ?Sized>(
    title: &str,
    subtitle: &str,
    area: &Dimensions,
    surface: &mut S,
) -> Dimensions {
    surface.draw_rectangle(area.x, area.y, area.w, area.h, false);
    surface.draw_rectangle(
        area.x + 2,
        area.y + 2,
        area.w.saturating_sub(4),
        area.h.saturating_sub(4),
        false,
    );

    let middle = area.y + (area.h / 2) as i32;

    let (x, title) = centered(area, title);
    surface.print(x, middle - CHAR_HEIGHT as i32, title, Ink::Normal);
    let (x, subtitle) = centered(area, subtitle);
    surface.print(x, middle + 2, subtitle, Ink::Normal);
    *area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::{FileBrowser, MemoryFs};
    use crate::queue::Deferred;
    use crate::registry::{Domain, Key, MemoryRegistry};
    use crate::ui::surface::{Op, Recorder};

    const ROW: Dimensions = Dimensions::new(2, 16, 124, 16);

    fn no_read(_: &dyn Registry) -> Option<f32> {
        None
    }
    fn hotend_target(registry: &dyn Registry) -> Option<f32> {
        state::hotend_temperatures(registry).map(|t| t.target)
    }
    fn nothing(_: f32) -> Deferred {
        Deferred::AbortPlayback
    }

    static HOTEND: Item = Item::Control(Control {
        caption: "Hotend",
        read: hotend_target,
        write: nothing,
        min: 0.0,
        max: 260.0,
        step: 5.0,
        floor: 150.0,
    });

    static UNKNOWN: Item = Item::Control(Control {
        caption: "Z",
        read: no_read,
        write: nothing,
        min: 0.0,
        max: 200.0,
        step: 1.0,
        floor: 0.0,
    });

    fn hot_registry() -> MemoryRegistry {
        let mut registry = MemoryRegistry::new();
        let mut raw = [0u8; 8];
        raw[..4].copy_from_slice(&200.0f32.to_le_bytes());
        raw[4..].copy_from_slice(&180.0f32.to_le_bytes());
        registry.set(Domain::TemperatureControl, Key::Hotend, &raw);
        registry
    }

    fn render(policy: RenderPolicy, item: &Item, registry: &dyn Registry, editing: Option<f32>) -> Recorder {
        let files = FileBrowser::new();
        let live = Live {
            registry,
            files: &files,
            editing,
            blink: false,
        };
        let mut surface = Recorder::default();
        let used = draw(policy, item, &ROW, &mut surface, &live);
        assert_eq!(used, ROW);
        surface
    }

    #[test]
    fn default_policy_outlines_and_active_fills() {
        let label = Item::Label { caption: "Back" };
        let registry = MemoryRegistry::new();

        let idle = render(RenderPolicy::Default, &label, &registry, None);
        assert_eq!(
            idle.ops,
            [
                Op::Rect { x: 2, y: 16, w: 124, h: 16, filled: false },
                Op::Text { x: 4, y: 19, text: "Back".into(), ink: Ink::Normal },
            ]
        );

        let active = render(RenderPolicy::Active, &label, &registry, None);
        assert!(matches!(active.ops[0], Op::Rect { filled: true, .. }));
        assert!(matches!(active.ops[1], Op::Text { ink: Ink::Inverted, .. }));
    }

    #[test]
    fn control_shows_live_edited_or_missing_value() {
        let registry = hot_registry();
        let live = render(RenderPolicy::Default, &HOTEND, &registry, Some(999.0));
        assert_eq!(live.texts(), ["Hotend", "200"]);

        let editing = render(RenderPolicy::Active, &HOTEND, &registry, Some(215.0));
        assert_eq!(editing.texts(), ["Hotend", "[215]"]);

        let missing = render(RenderPolicy::Default, &UNKNOWN, &registry, None);
        assert_eq!(missing.texts(), ["Z", "-"]);
    }

    #[test]
    fn value_is_right_aligned() {
        let registry = hot_registry();
        let surface = render(RenderPolicy::Default, &HOTEND, &registry, None);
        // "200": 3 columns ending at the right padding.
        assert!(surface
            .ops
            .contains(&Op::Text { x: 124 - 18, y: 19, text: "200".into(), ink: Ink::Normal }));
    }

    #[test]
    fn temperatures_fall_back_to_zero() {
        let item = Item::Temperatures {
            caption: "Bed",
            heater: Heater::Bed,
        };
        let surface = render(RenderPolicy::Default, &item, &MemoryRegistry::new(), None);
        assert_eq!(surface.texts(), ["Bed", "0/0"]);
    }

    #[test]
    fn progress_and_time_without_file() {
        let registry = MemoryRegistry::new();
        let progress = render(RenderPolicy::Default, &Item::Progress, &registry, None);
        assert_eq!(progress.texts(), ["No file", "0%"]);

        let time = render(RenderPolicy::Default, &Item::Time, &registry, None);
        assert_eq!(time.texts(), ["0:00:00 / 0:00:00"]);
    }

    #[test]
    fn long_captions_are_clipped_to_the_cell() {
        let item = Item::Label {
            caption: "An extremely long caption that cannot fit",
        };
        let surface = render(RenderPolicy::Default, &item, &MemoryRegistry::new(), None);
        // 124 px wide, 2 px padding each side, 6 px per char.
        assert_eq!(surface.texts(), ["An extremely long ca"]);
    }

    #[test]
    fn logo_centers_both_lines() {
        let splash = Dimensions::new(0, 0, 128, 64);
        let item = Item::Logo {
            title: "Motion",
            subtitle: "A subtitle much wider than the panel",
        };
        let files = FileBrowser::new();
        let registry = MemoryRegistry::new();
        let live = Live {
            registry: &registry,
            files: &files,
            editing: None,
            blink: false,
        };
        let mut surface = Recorder::default();
        draw(RenderPolicy::Default, &item, &splash, &mut surface, &live);

        assert_eq!(surface.texts(), ["Motion", "A subtitle much wide"]);
        assert!(surface
            .ops
            .contains(&Op::Text { x: 46, y: 22, text: "Motion".into(), ink: Ink::Normal }));
        assert!(surface.ops.contains(&Op::Text {
            x: 4,
            y: 34,
            text: "A subtitle much wide".into(),
            ink: Ink::Normal
        }));
    }

    #[test]
    fn file_slots_show_names_and_folders() {
        let fs = MemoryFs {
            paths: std::vec!["/sd/", "/sd/a.gcode"],
        };
        let mut files = FileBrowser::new();
        files.open(&fs, "/");
        let registry = MemoryRegistry::new();
        let live = Live {
            registry: &registry,
            files: &files,
            editing: None,
            blink: false,
        };

        let mut surface = Recorder::default();
        draw(RenderPolicy::Active, &Item::File { slot: 0 }, &ROW, &mut surface, &live);
        assert_eq!(surface.texts(), ["sd/"]);

        let mut surface = Recorder::default();
        draw(RenderPolicy::Active, &Item::File { slot: 1 }, &ROW, &mut surface, &live);
        assert_eq!(
            surface.ops,
            [Op::Rect { x: 2, y: 16, w: 124, h: 16, filled: false }]
        );
    }
}
