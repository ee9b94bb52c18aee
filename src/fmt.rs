//! Logging shims.
//!
//! Routes `debug!`/`info!` to `defmt` or `log` depending on the enabled
//! feature. With neither feature the arguments are still type-checked but
//! nothing is emitted.

#![allow(unused_macros)]

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! debug {
            ($($arg:tt)*) => { defmt::debug!($($arg)*) };
        }
        macro_rules! info {
            ($($arg:tt)*) => { defmt::info!($($arg)*) };
        }
    } else if #[cfg(feature = "log")] {
        macro_rules! debug {
            ($($arg:tt)*) => { log::debug!($($arg)*) };
        }
        macro_rules! info {
            ($($arg:tt)*) => { log::info!($($arg)*) };
        }
    } else {
        macro_rules! debug {
            ($fmt:literal $(, $arg:expr)* $(,)?) => {{
                $( let _ = &$arg; )*
            }};
        }
        macro_rules! info {
            ($fmt:literal $(, $arg:expr)* $(,)?) => {{
                $( let _ = &$arg; )*
            }};
        }
    }
}
