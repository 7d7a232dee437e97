//! Public state registry - the key/value store of live machine state.
//!
//! The registry itself belongs to the machine kernel; the panel only
//! consumes it through the [`Registry`] trait. Values travel as raw
//! little-endian bytes:
//!
//! ```text
//! Hotend / Bed           : [target f32][current f32]           8 bytes
//! HotendTarget / BedTarget (set) : [target f32]                4 bytes
//! CurrentPosition        : [x f32][y f32][z f32]              12 bytes
//! IsPlaying              : [0 | 1]                             1 byte
//! Progress               : [percent u32][elapsed u32][path..]  8+ bytes
//! IpAddress              : [a][b][c][d]                        4 bytes
//! AbortPlay (set)        : empty
//! ```

use heapless::Vec;

/// Module owning a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Domain {
    Robot,
    TemperatureControl,
    Player,
    Network,
}

/// Value within a domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    CurrentPosition,
    /// Heater reading, target and measured.
    Hotend,
    Bed,
    /// Heater target requests. Kept apart from the readings so a write
    /// never replaces the last measurement.
    HotendTarget,
    BedTarget,
    IsPlaying,
    Progress,
    AbortPlay,
    IpAddress,
}

/// Read/write access to live machine state.
///
/// A miss (`None`) means "value unavailable" and is never an error:
/// readers substitute a defined fallback.
pub trait Registry {
    /// Copy the value for `(domain, key)` into `out`, returning its length.
    /// Values longer than `out` are truncated.
    fn get(&self, domain: Domain, key: Key, out: &mut [u8]) -> Option<usize>;

    /// Replace the value for `(domain, key)`.
    fn set(&mut self, domain: Domain, key: Key, value: &[u8]);
}

/// Longest value held by [`MemoryRegistry`].
pub const MEMORY_VALUE_LEN: usize = 96;

/// Number of distinct keys held by [`MemoryRegistry`].
pub const MEMORY_SLOTS: usize = 16;

/// Bounded in-memory registry.
///
/// Used on the device as the panel-side mirror of machine state, and in
/// tests as the registry double.
pub struct MemoryRegistry {
    slots: Vec<(Domain, Key, Vec<u8, MEMORY_VALUE_LEN>), MEMORY_SLOTS>,
}

impl MemoryRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Drop a value so subsequent reads miss.
    pub fn remove(&mut self, domain: Domain, key: Key) {
        if let Some(pos) = self
            .slots
            .iter()
            .position(|(d, k, _)| *d == domain && *k == key)
        {
            self.slots.swap_remove(pos);
        }
    }

    /// Whether a value is present.
    pub fn contains(&self, domain: Domain, key: Key) -> bool {
        self.slots.iter().any(|(d, k, _)| *d == domain && *k == key)
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry for MemoryRegistry {
    fn get(&self, domain: Domain, key: Key, out: &mut [u8]) -> Option<usize> {
        let (_, _, value) = self
            .slots
            .iter()
            .find(|(d, k, _)| *d == domain && *k == key)?;
        let len = value.len().min(out.len());
        out[..len].copy_from_slice(&value[..len]);
        Some(len)
    }

    fn set(&mut self, domain: Domain, key: Key, value: &[u8]) {
        let mut stored: Vec<u8, MEMORY_VALUE_LEN> = Vec::new();
        let len = value.len().min(MEMORY_VALUE_LEN);
        let _ = stored.extend_from_slice(&value[..len]);

        if let Some(slot) = self
            .slots
            .iter_mut()
            .find(|(d, k, _)| *d == domain && *k == key)
        {
            slot.2 = stored;
            return;
        }

        // Full registry keeps its existing keys.
        let _ = self.slots.push((domain, key, stored));
    }
}

// Byte helpers shared by the readers in `state` and the deferred writers.

pub(crate) fn f32_at(bytes: &[u8], offset: usize) -> Option<f32> {
    let raw = bytes.get(offset..offset + 4)?;
    Some(f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

pub(crate) fn u32_at(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw = bytes.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_returns_none() {
        let reg = MemoryRegistry::new();
        let mut buf = [0u8; 8];
        assert_eq!(reg.get(Domain::Player, Key::Progress, &mut buf), None);
    }

    #[test]
    fn set_replaces_existing_value() {
        let mut reg = MemoryRegistry::new();
        reg.set(Domain::Network, Key::IpAddress, &[10, 0, 0, 1]);
        reg.set(Domain::Network, Key::IpAddress, &[192, 168, 1, 20]);

        let mut buf = [0u8; 8];
        assert_eq!(reg.get(Domain::Network, Key::IpAddress, &mut buf), Some(4));
        assert_eq!(&buf[..4], &[192, 168, 1, 20]);
    }

    #[test]
    fn get_truncates_to_output_buffer() {
        let mut reg = MemoryRegistry::new();
        reg.set(Domain::Robot, Key::CurrentPosition, &[1; 12]);

        let mut buf = [0u8; 4];
        assert_eq!(reg.get(Domain::Robot, Key::CurrentPosition, &mut buf), Some(4));
    }

    #[test]
    fn remove_makes_value_unavailable() {
        let mut reg = MemoryRegistry::new();
        reg.set(Domain::Player, Key::IsPlaying, &[1]);
        assert!(reg.contains(Domain::Player, Key::IsPlaying));

        reg.remove(Domain::Player, Key::IsPlaying);
        assert!(!reg.contains(Domain::Player, Key::IsPlaying));
    }

    #[test]
    fn byte_helpers_reject_short_input() {
        assert_eq!(f32_at(&[0, 0, 0], 0), None);
        assert_eq!(u32_at(&42u32.to_le_bytes(), 0), Some(42));
        assert_eq!(f32_at(&[0, 0, 0x80, 0x3f, 0], 0), Some(1.0));
    }
}
