// src/error.rs

//! Failure taxonomy for bind, unbind and batch runs.
//!
//! Every variant names the kernel path it was working on and keeps the
//! underlying `io::Error`, so the per-device report shows both the step
//! that failed and the system error text.

use std::{io, path::PathBuf};
use thiserror::Error;

/// One variant per step of the bind sequence, in order.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("endpoint name '{name}' does not fit the {max}-byte name field")]
    EndpointNameTooLong { name: String, max: usize },

    #[error("can't read {}: {source}", .path.display())]
    AttributeUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid dst addr {content:?} in {}", .path.display())]
    AttributeMalformed { path: PathBuf, content: String },

    #[error("can't write \"{driver}\" to {}: {source}", .path.display())]
    OverrideWriteFailed {
        path: PathBuf,
        driver: String,
        #[source]
        source: io::Error,
    },

    #[error("can't write \"{device}\" to {}: {source}", .path.display())]
    BindTriggerFailed {
        path: PathBuf,
        device: String,
        #[source]
        source: io::Error,
    },

    #[error("can't open dir {}: {source}", .dir.display())]
    ControlDirUnreadable {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't find {prefix} in {}", .dir.display())]
    ControlNodeNotFound { dir: PathBuf, prefix: String },

    #[error("can't open control node {}: {source}", .path.display())]
    ControlNodeOpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't create endpoint {name}: {source}")]
    EndpointCreateFailed {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl BindError {
    /// Taxonomy name of the failing step.
    ///
    /// An unreadable `rpmsg/` directory and an empty one are both reported as
    /// `ControlNodeNotFound`; only the message differs.
    pub fn kind(&self) -> &'static str {
        match self {
            BindError::EndpointNameTooLong { .. } => "EndpointNameTooLong",
            BindError::AttributeUnreadable { .. } => "AttributeUnreadable",
            BindError::AttributeMalformed { .. } => "AttributeMalformed",
            BindError::OverrideWriteFailed { .. } => "OverrideWriteFailed",
            BindError::BindTriggerFailed { .. } => "BindTriggerFailed",
            BindError::ControlDirUnreadable { .. } | BindError::ControlNodeNotFound { .. } => {
                "ControlNodeNotFound"
            }
            BindError::ControlNodeOpenFailed { .. } => "ControlNodeOpenFailed",
            BindError::EndpointCreateFailed { .. } => "EndpointCreateFailed",
        }
    }

    /// True once the bind trigger has gone through, i.e. the device is now
    /// attached to the character-device driver.
    pub fn left_device_bound(&self) -> bool {
        matches!(
            self,
            BindError::ControlDirUnreadable { .. }
                | BindError::ControlNodeNotFound { .. }
                | BindError::ControlNodeOpenFailed { .. }
                | BindError::EndpointCreateFailed { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum UnbindError {
    #[error("can't write \"{device}\" to {}: {source}", .path.display())]
    UnbindTriggerFailed {
        path: PathBuf,
        device: String,
        #[source]
        source: io::Error,
    },
}

impl UnbindError {
    pub fn kind(&self) -> &'static str {
        match self {
            UnbindError::UnbindTriggerFailed { .. } => "UnbindTriggerFailed",
        }
    }
}

/// Per-device failure as recorded in a batch report.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Unbind(#[from] UnbindError),
}

impl DeviceError {
    pub fn kind(&self) -> &'static str {
        match self {
            DeviceError::Bind(e) => e.kind(),
            DeviceError::Unbind(e) => e.kind(),
        }
    }
}

/// Rejected before any kernel interface is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}
