//! Crate-internal logging macros.
//!
//! With the `defmt` feature these forward to the `defmt` macros of the
//! same name (`warning!` to `defmt::warn!`, since `warn` is taken by the
//! lint attribute). Host builds without `defmt` compile them away; arguments
//! are still type-checked by borrowing them.

#![allow(unused_macros)]

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        $crate::fmt::discard!($($arg)*);
    }};
}

macro_rules! info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        $crate::fmt::discard!($($arg)*);
    }};
}

macro_rules! warning {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        $crate::fmt::discard!($($arg)*);
    }};
}

macro_rules! error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::error!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        $crate::fmt::discard!($($arg)*);
    }};
}

macro_rules! discard {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        let _ = ($(&$arg,)*);
    }};
}

pub(crate) use {debug, discard, error, info, warning};
