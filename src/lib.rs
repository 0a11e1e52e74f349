#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

pub mod cli;
pub mod config;
pub mod domains;
pub mod error;
pub mod explore;
pub mod history;
pub mod markup;
pub mod oracle;
pub mod space;
pub mod tags;

pub use config::Config;
pub use error::{GalleristError, Result};
