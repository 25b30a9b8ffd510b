// src/lib.rs
// ────────────────────────────────────────────────────────────────────────────
// Library entry point, shared by `main.rs` and the integration tests.

mod macros;

pub mod batch;
pub mod binder;
pub mod cli;
pub mod comms;
pub mod config;
pub mod error;
pub mod sysfs;

pub use batch::{run_batch, BatchReport, BatchRequest, DeviceOutcome, Mode};
pub use binder::{endpoint_name, BindOptions, Binder, DeviceOps};
pub use error::{BatchError, BindError, DeviceError, UnbindError};
pub use sysfs::BusLayout;
