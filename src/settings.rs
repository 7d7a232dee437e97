//! Preheat settings read once at startup.
//!
//! The panel only reads configuration; loading and persisting it is the
//! job of a [`ConfigSource`] (on the device, the flash store in
//! `storage`).

use crate::fmt::info;

/// Named numeric configuration values.
pub trait ConfigSource {
    fn number(&self, module: &str, key: &str) -> Option<f32>;
}

/// Configuration module the panel keys live under.
pub const MODULE: &str = "panel";

pub const KEY_HOTEND_PLA: &str = "hotend_temperature_PLA";
pub const KEY_BED_PLA: &str = "bed_temperature_PLA";
pub const KEY_HOTEND_ABS: &str = "hotend_temperature_ABS";
pub const KEY_BED_ABS: &str = "bed_temperature_ABS";

/// Hotend and bed targets for one material (°C).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MaterialProfile {
    pub hotend: f32,
    pub bed: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PreheatSettings {
    pub pla: MaterialProfile,
    pub abs: MaterialProfile,
}

impl PreheatSettings {
    pub const DEFAULT: Self = Self {
        pla: MaterialProfile {
            hotend: 185.0,
            bed: 60.0,
        },
        abs: MaterialProfile {
            hotend: 235.0,
            bed: 100.0,
        },
    };

    /// Read every key from `source`, falling back to [`Self::DEFAULT`]
    /// for the ones it does not have.
    pub fn load(source: &dyn ConfigSource) -> Self {
        let d = Self::DEFAULT;
        let read = |key: &str, fallback: f32| source.number(MODULE, key).unwrap_or(fallback);
        let settings = Self {
            pla: MaterialProfile {
                hotend: read(KEY_HOTEND_PLA, d.pla.hotend),
                bed: read(KEY_BED_PLA, d.pla.bed),
            },
            abs: MaterialProfile {
                hotend: read(KEY_HOTEND_ABS, d.abs.hotend),
                bed: read(KEY_BED_ABS, d.abs.bed),
            },
        };
        info!(
            "preheat PLA {}/{} ABS {}/{}",
            settings.pla.hotend, settings.pla.bed, settings.abs.hotend, settings.abs.bed
        );
        settings
    }
}

impl Default for PreheatSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static [(&'static str, f32)]);

    impl ConfigSource for Fixed {
        fn number(&self, module: &str, key: &str) -> Option<f32> {
            if module != MODULE {
                return None;
            }
            self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
        }
    }

    #[test]
    fn missing_keys_use_defaults() {
        let settings = PreheatSettings::load(&Fixed(&[]));
        assert_eq!(settings, PreheatSettings::DEFAULT);
        assert_eq!(settings.pla.hotend, 185.0);
        assert_eq!(settings.abs.bed, 100.0);
    }

    #[test]
    fn configured_keys_override_defaults() {
        let settings = PreheatSettings::load(&Fixed(&[(KEY_HOTEND_PLA, 200.0), (KEY_BED_ABS, 90.0)]));
        assert_eq!(settings.pla.hotend, 200.0);
        assert_eq!(settings.pla.bed, 60.0);
        assert_eq!(settings.abs.hotend, 235.0);
        assert_eq!(settings.abs.bed, 90.0);
    }
}
