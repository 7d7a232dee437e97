//! Persistent preheat settings.
//!
//! Uses the nRF52840's internal flash via the `sequential-storage` crate
//! as the panel's configuration source. Each setting is one map entry:
//! a one-byte key and a little-endian `f32` value. Keys that were never
//! written read as missing, so [`PreheatSettings::load`] falls back to
//! its defaults for them.
//!
//! [`PreheatSettings::load`]: crate::settings::PreheatSettings::load

use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;

use crate::config::{STORAGE_FLASH_PAGE_COUNT, STORAGE_FLASH_PAGE_START};
use crate::error::Error;
use crate::fmt::{debug, error, info};
use crate::settings::{
    ConfigSource, KEY_BED_ABS, KEY_BED_PLA, KEY_HOTEND_ABS, KEY_HOTEND_PLA, MODULE,
};

/// Flash page size for nRF52840 (4 KB).
const FLASH_PAGE_SIZE: u32 = 4096;

/// Start address of our storage region.
const STORAGE_START: u32 = STORAGE_FLASH_PAGE_START * FLASH_PAGE_SIZE;

/// End address (exclusive) of our storage region.
const STORAGE_END: u32 = (STORAGE_FLASH_PAGE_START + STORAGE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;

/// Scratch buffer for one map item.
const ITEM_BUFFER_SIZE: usize = 32;

/// Flash key of every persisted setting, in load order.
const KEYS: [(u8, &str); 4] = [
    (0x01, KEY_HOTEND_PLA),
    (0x02, KEY_BED_PLA),
    (0x03, KEY_HOTEND_ABS),
    (0x04, KEY_BED_ABS),
];

fn flash_key(name: &str) -> Option<(usize, u8)> {
    KEYS.iter()
        .enumerate()
        .find(|(_, (_, key))| *key == name)
        .map(|(slot, (id, _))| (slot, *id))
}

/// Settings read from flash, cached in RAM.
pub struct FlashConfig {
    values: [Option<f32>; KEYS.len()],
}

impl FlashConfig {
    /// A cache with nothing loaded.
    pub const fn new() -> Self {
        Self {
            values: [None; KEYS.len()],
        }
    }

    /// Read every known key from flash. Unreadable keys stay missing.
    pub async fn load_from_flash(&mut self, flash: &mut impl NorFlash) {
        let mut buf = [0u8; ITEM_BUFFER_SIZE];
        let mut found = 0;

        for (slot, (id, name)) in KEYS.iter().enumerate() {
            self.values[slot] = match sequential_storage::map::fetch_item::<u8, &[u8], _>(
                flash,
                STORAGE_START..STORAGE_END,
                &mut NoCache::new(),
                &mut buf,
                id,
            )
            .await
            {
                Ok(Some(data)) => decode(data),
                Ok(None) => None,
                Err(e) => {
                    error!("Flash read error for {}: {:?}", name, defmt::Debug2Format(&e));
                    None
                }
            };
            if self.values[slot].is_some() {
                found += 1;
            }
        }
        info!("Loaded {} of {} settings from flash", found, KEYS.len());
    }

    /// Persist one setting and update the cache.
    pub async fn store(
        &mut self,
        flash: &mut impl NorFlash,
        key: &str,
        value: f32,
    ) -> Result<(), Error> {
        let (slot, id) = flash_key(key).ok_or(Error::Storage)?;
        let mut buf = [0u8; ITEM_BUFFER_SIZE];
        let bytes = value.to_le_bytes();
        let item: &[u8] = &bytes;

        sequential_storage::map::store_item::<u8, &[u8], _>(
            flash,
            STORAGE_START..STORAGE_END,
            &mut NoCache::new(),
            &mut buf,
            &id,
            &item,
        )
        .await
        .map_err(|e| {
            error!("Flash write error for {}: {:?}", key, defmt::Debug2Format(&e));
            Error::Storage
        })?;

        debug!("Stored {} = {}", key, value);
        self.values[slot] = Some(value);
        Ok(())
    }
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for FlashConfig {
    fn number(&self, module: &str, key: &str) -> Option<f32> {
        if module != MODULE {
            return None;
        }
        let (slot, _) = flash_key(key)?;
        self.values[slot]
    }
}

fn decode(data: &[u8]) -> Option<f32> {
    let raw: [u8; 4] = data.get(..4)?.try_into().ok()?;
    Some(f32::from_le_bytes(raw))
}
