//! Application-wide constants and compile-time configuration.
//!
//! All timing parameters, display geometry, capacities and machine
//! thresholds live here so they can be tuned in one place.

// Periodic context

/// Button sampling rate (Hz). Debounce and repeat timing count samples.
pub const BUTTON_SAMPLE_HZ: u64 = 23;

/// Refresh-flag rate (Hz). At most this many redraws per second.
pub const REFRESH_HZ: u64 = 50;

/// Samples a button must stay down after its first activation before
/// auto-repeat starts (~430 ms at 23 Hz).
pub const BUTTON_HOLD_SAMPLES: u16 = 10;

/// Samples between two repeat activations while held (~220 ms at 23 Hz).
pub const BUTTON_REPEAT_SAMPLES: u16 = 5;

// GPIO pin assignments (nRF52840-DK defaults)
//
// Actual `embassy_nrf::peripherals::*` types are selected in `main.rs`.
//
//   Button UP      → P0.11
//   Button DOWN    → P0.12
//   Button SELECT  → P0.24
//   I²C SDA        → P0.26
//   I²C SCL        → P0.27
//   UART TX        → P0.06 (machine command channel)
//   UART RX        → P0.08

// Command queue

/// Deferred command slots. Worst burst is a single menu action pushing
/// two temperature writes, so this leaves plenty of headroom.
pub const COMMAND_QUEUE_CAPACITY: usize = 8;

/// Longest single command line (e.g. `play /sd/folder/file.gcode -q`).
pub const COMMAND_LINE_LEN: usize = 96;

// Machine link

/// Commands waiting to go out on the serial link after a main-loop pass.
pub const LINK_OUTBOX_CAPACITY: usize = 8;

/// Longest reply line kept from the motion controller.
pub const REPLY_LINE_LEN: usize = 128;

/// Reply lines buffered between the UART reader and the main loop.
pub const REPLY_QUEUE_CAPACITY: usize = 8;

/// Seconds between two status requests to the motion controller.
pub const STATUS_POLL_SECS: u64 = 1;

// Display

/// Panel resolution.
pub const DISPLAY_WIDTH: u32 = 128;
pub const DISPLAY_HEIGHT: u32 = 64;

/// Monospace font metrics (FONT_6X10).
pub const CHAR_WIDTH: u32 = 6;
pub const CHAR_HEIGHT: u32 = 10;

/// Horizontal padding between a cell border and its caption.
pub const CELL_PADDING: u32 = 2;

/// Longest text rendered into one cell.
pub const CELL_TEXT_LEN: usize = 32;

// Menu graph

/// Maximum number of screens in one menu graph.
pub const MAX_GROUPS: usize = 24;

/// Maximum number of items on one screen.
pub const MAX_ITEMS: usize = 8;

/// Seconds of inactivity before a screen with an idle timeout returns home.
pub const SCREEN_IDLE_TIMEOUT_SECS: u32 = 60;

// Machine

/// Minimum hotend temperature (°C) for extrusion to be allowed.
pub const MIN_EXTRUSION_TEMPERATURE: f32 = 170.0;

/// Bounds and step of the manual hotend temperature control (°C).
pub const HOTEND_CONTROL_MIN: f32 = 0.0;
pub const HOTEND_CONTROL_MAX: f32 = 260.0;
pub const HOTEND_CONTROL_STEP: f32 = 5.0;
/// Value the hotend control starts from when the live value is unknown.
pub const HOTEND_CONTROL_FLOOR: f32 = 150.0;

/// Bounds and step of the manual bed temperature control (°C).
pub const BED_CONTROL_MIN: f32 = 0.0;
pub const BED_CONTROL_MAX: f32 = 110.0;
pub const BED_CONTROL_STEP: f32 = 5.0;

/// Bounds and step of the jog position controls (mm).
pub const AXIS_CONTROL_MIN: f32 = 0.0;
pub const AXIS_CONTROL_MAX: f32 = 200.0;
pub const AXIS_CONTROL_STEP: f32 = 1.0;

// File browsing

/// Longest file or folder name kept in a listing.
pub const FILE_NAME_LEN: usize = 32;

/// Longest absolute path handled by the browsers.
pub const FILE_PATH_LEN: usize = 80;

/// Maximum entries read from one folder; the rest are ignored.
pub const MAX_FOLDER_ENTRIES: usize = 32;

/// Visible characters of a file name on the screen-class lister.
pub const FILE_LINE_CHARS: usize = 18;

/// Number of file slots on the graph-based file browser screen.
pub const FILE_SLOTS: usize = 3;

// Persisted settings

/// Flash page index where settings storage starts (4 KB per page on nRF52840).
pub const STORAGE_FLASH_PAGE_START: u32 = 252;

/// Number of flash pages reserved for settings storage.
pub const STORAGE_FLASH_PAGE_COUNT: u32 = 4;
