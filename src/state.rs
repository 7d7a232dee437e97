//! Readers of live machine state and navigation conditions.
//!
//! Every reader decodes one registry value and substitutes a defined
//! fallback on a miss, so rendering and navigation never fail because
//! the machine has not published something yet.

use core::fmt::Write;

use heapless::String;

use crate::config::{FILE_NAME_LEN, MIN_EXTRUSION_TEMPERATURE};
use crate::registry::{f32_at, u32_at, Domain, Key, Registry};

/// Caption shown when no file is being played.
pub const NO_FILE_CAPTION: &str = "No file";

/// Caption shown when the network module has no address.
pub const NO_NETWORK_CAPTION: &str = "No network";

/// Target and measured temperature of one heater (°C).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperatures {
    pub target: f32,
    pub current: f32,
}

/// Heaters the panel can read and set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Heater {
    Hotend,
    Bed,
}

impl Heater {
    pub(crate) fn key(self) -> Key {
        match self {
            Heater::Hotend => Key::Hotend,
            Heater::Bed => Key::Bed,
        }
    }

    /// Key taking target requests for this heater.
    pub(crate) fn target_key(self) -> Key {
        match self {
            Heater::Hotend => Key::HotendTarget,
            Heater::Bed => Key::BedTarget,
        }
    }
}

/// Cartesian axes exposed by the robot's current position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }

    fn offset(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 4,
            Axis::Z => 8,
        }
    }
}

/// Progress of the file being played.
#[derive(Clone, Debug, PartialEq)]
pub struct Progress {
    pub percent: u32,
    /// File name stripped of folder and extension, or [`NO_FILE_CAPTION`].
    pub name: String<FILE_NAME_LEN>,
}

/// Elapsed and estimated remaining play time (seconds).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeProgress {
    pub elapsed: u32,
    pub remaining: u32,
}

pub fn temperatures(registry: &dyn Registry, heater: Heater) -> Option<Temperatures> {
    let mut buf = [0u8; 8];
    let len = registry.get(Domain::TemperatureControl, heater.key(), &mut buf)?;
    let bytes = &buf[..len];
    Some(Temperatures {
        target: f32_at(bytes, 0)?,
        current: f32_at(bytes, 4)?,
    })
}

pub fn hotend_temperatures(registry: &dyn Registry) -> Option<Temperatures> {
    temperatures(registry, Heater::Hotend)
}

pub fn bed_temperatures(registry: &dyn Registry) -> Option<Temperatures> {
    temperatures(registry, Heater::Bed)
}

/// Current position of one axis (mm).
pub fn axis_position(registry: &dyn Registry, axis: Axis) -> Option<f32> {
    let mut buf = [0u8; 12];
    let len = registry.get(Domain::Robot, Key::CurrentPosition, &mut buf)?;
    f32_at(&buf[..len], axis.offset())
}

/// Whether the player is running a file. Unknown counts as "not playing".
pub fn is_file_being_played(registry: &dyn Registry) -> bool {
    let mut buf = [0u8; 1];
    matches!(
        registry.get(Domain::Player, Key::IsPlaying, &mut buf),
        Some(1..) if buf[0] != 0
    )
}

pub fn progress(registry: &dyn Registry) -> Progress {
    let mut buf = [0u8; crate::registry::MEMORY_VALUE_LEN];
    let raw = registry
        .get(Domain::Player, Key::Progress, &mut buf)
        .map(|len| &buf[..len]);

    if let Some(bytes) = raw {
        if let (Some(percent), Ok(path)) = (
            u32_at(bytes, 0),
            core::str::from_utf8(bytes.get(8..).unwrap_or(&[])),
        ) {
            let mut name = String::new();
            for c in file_stem(path).chars() {
                if name.push(c).is_err() {
                    break;
                }
            }
            return Progress { percent, name };
        }
    }

    let mut name = String::new();
    let _ = name.push_str(NO_FILE_CAPTION);
    Progress { percent: 0, name }
}

pub fn time_progress(registry: &dyn Registry) -> TimeProgress {
    let mut buf = [0u8; 8];
    match registry.get(Domain::Player, Key::Progress, &mut buf) {
        Some(len) => {
            let bytes = &buf[..len];
            match (u32_at(bytes, 0), u32_at(bytes, 4)) {
                (Some(percent), Some(elapsed)) => TimeProgress {
                    elapsed,
                    remaining: estimate_remaining(elapsed, percent),
                },
                _ => TimeProgress::default(),
            }
        }
        None => TimeProgress::default(),
    }
}

/// Remaining play time extrapolated from elapsed time and percent done.
///
/// Below 4 % the estimate is too noisy to show, so it reads 0.
pub fn estimate_remaining(elapsed_secs: u32, percent_complete: u32) -> u32 {
    if percent_complete > 3 {
        let total = u64::from(elapsed_secs) * 100 / u64::from(percent_complete);
        (total.saturating_sub(u64::from(elapsed_secs))).min(u64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Dotted IPv4 address of the network module, or [`NO_NETWORK_CAPTION`].
pub fn network_address(registry: &dyn Registry) -> String<20> {
    let mut buf = [0u8; 4];
    let mut text = String::new();
    match registry.get(Domain::Network, Key::IpAddress, &mut buf) {
        Some(4) => {
            let _ = write!(text, "{}.{}.{}.{}", buf[0], buf[1], buf[2], buf[3]);
        }
        _ => {
            let _ = text.push_str(NO_NETWORK_CAPTION);
        }
    }
    text
}

/// File name without its folder and extension: `/sd/a/benchy.gcode` → `benchy`.
pub fn file_stem(path: &str) -> &str {
    let name = match path.rfind('/') {
        Some(slash) => &path[slash + 1..],
        None => path,
    };
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}

// Conditions

/// A side-effect-free predicate over machine state, evaluated every time
/// a conditional link or command is traversed.
pub trait Condition: Sync {
    fn holds(&self, registry: &dyn Registry) -> bool;
}

impl Condition for fn(&dyn Registry) -> bool {
    fn holds(&self, registry: &dyn Registry) -> bool {
        self(registry)
    }
}

/// Measured hotend temperature strictly above a threshold.
/// An unknown temperature never satisfies it.
pub struct HotendAbove(pub f32);

impl Condition for HotendAbove {
    fn holds(&self, registry: &dyn Registry) -> bool {
        hotend_temperatures(registry).is_some_and(|t| t.current > self.0)
    }
}

/// The hotend is hot enough to extrude.
pub static HOTEND_HOT: HotendAbove = HotendAbove(MIN_EXTRUSION_TEMPERATURE);

/// A file is currently being played.
pub struct FilePlaying;

impl Condition for FilePlaying {
    fn holds(&self, registry: &dyn Registry) -> bool {
        is_file_being_played(registry)
    }
}

pub static FILE_PLAYING: FilePlaying = FilePlaying;
