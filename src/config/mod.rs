//! Configuration loading for Pratibimba.
//!
//! Loads all configuration from a single YAML file. Every section and
//! field is optional; missing values take the defaults.

mod capture;
mod defaults;
mod error;
mod grid;
mod pratibimba;
mod timers;

pub use error::ConfigLoadError;
pub use pratibimba::PratibimbaConfig;

pub use capture::{CaptureSection, DetectionSection};
pub use grid::GridSection;
pub use timers::TimerSection;
