//! **r502-console** drives a HZ Grow R502 (and likely similar) fingerprint module from a text
//! console: enroll prints, find them again, delete them, with an LED for feedback.
//!
//! The console talks to the module through [`FingerprintSensor`]. [`R502`] implements it over
//! any embedded-hal serial port; [`SerialReader`]/[`SerialWriter`] adapt a host serial port.
//!
//! Repeated failed attempts at templating a finger lock the console out for a while. The count
//! is a plain value threaded through each attempt:
//!
//! ```
//! use std::time::Duration;
//! use r502_console::{LockoutState, LockoutVerdict};
//!
//! let lockout = LockoutState::new(2, Duration::from_secs(10));
//! let (lockout, verdict) = lockout.record_failure();
//! assert_eq!(verdict, LockoutVerdict::Continue);
//! let (lockout, verdict) = lockout.record_failure();
//! assert_eq!(verdict, LockoutVerdict::LockedOut { timeout: Duration::from_secs(10) });
//! assert_eq!(lockout.failed_attempts(), 0);
//! ```
#![warn(missing_debug_implementations, rust_2018_idioms)]

mod commands;
pub mod config;
mod console;
mod driver;
mod enroll;
mod error;
mod led;
mod lockout;
mod responses;
mod search;
mod sensor;
mod serial;
mod utils;

#[cfg(test)]
mod testing;

pub use crate::commands::Command;
pub use crate::console::Console;
pub use crate::driver::R502;
pub use crate::enroll::{enroll_finger, EnrollOutcome, EnrollStage};
pub use crate::error::{Error, Result};
pub use crate::led::{Indicator, Led, NoLed, Signal};
pub use crate::lockout::{LockoutState, LockoutVerdict};
pub use crate::responses::{
    DeletCharResult, DeletCharStatus, GenImgResult, GenImgStatus, Img2TzResult, Img2TzStatus,
    PasswordVerificationState, ReadIndexTableResult, ReadIndexTableStatus, ReadSysParaResult,
    ReadSysParaStatus, RegModelResult, RegModelStatus, Reply, SearchResult, SearchStatus, StoreResult,
    StoreStatus, SystemParameters, TemplateNumResult, TemplateNumStatus, VfyPwdResult,
};
pub use crate::search::{find_fingerprint, Match};
pub use crate::sensor::{CharBuffer, FingerprintSensor, Slot, TemplateIndex};
pub use crate::serial::{open as open_serial, SerialReader, SerialWriter};
pub use crate::utils::Error as DriverError;
