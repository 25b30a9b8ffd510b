// src/binder.rs

//! # Binder / Unbinder
//!
//! Moves one RPMsg device onto the `rpmsg_chrdev` driver and creates its
//! endpoint, or detaches it again.
//!
//! Bind sequence, failing fast at the first error:
//! 1. read and parse `devices/<id>/dst`
//! 2. write the driver name into `devices/<id>/driver_override`
//! 3. write `<id>` into `drivers/<driver>/bind`
//! 4. poll `devices/<id>/rpmsg/` for the control node
//! 5. open `/dev/<control node>` read-write, non-blocking
//! 6. `RPMSG_CREATE_EPT_IOCTL` with {`chrdev_<id>`, local, dst}
//!
//! Nothing is undone on failure unless `BindOptions::unbind_on_failure`
//! is set.

use crate::comms::{CharDevOpener, ControlHandle, ControlOpener, EndpointInfo, RPMSG_NAME_SIZE};
use crate::error::{BindError, UnbindError};
use crate::rpmsg_log;
use crate::sysfs::{parse_address, read_attribute, wait_for_control_node, write_attribute, BusLayout};
use log::Level;
use std::time::Duration;

/// Fixed prefix of every endpoint name.
pub const ENDPOINT_NAME_PREFIX: &str = "chrdev_";

/// Endpoint name for `device`: `chrdev_<device>`.
pub fn endpoint_name(device: &str) -> String {
    format!("{ENDPOINT_NAME_PREFIX}{device}")
}

/// Knobs for the bind sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindOptions {
    /// How long to wait for the control node after the bind trigger.
    pub probe_timeout: Duration,
    /// Sleep between two scans of `rpmsg/`.
    pub poll_interval: Duration,
    /// Unbind the device again when a step after the bind trigger fails.
    pub unbind_on_failure: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(1),
            poll_interval: Duration::from_millis(20),
            unbind_on_failure: false,
        }
    }
}

/// Per-device operations driven by the batch runner.
pub trait DeviceOps {
    fn bind(&self, device: &str, local_address: u32) -> Result<(), BindError>;
    fn unbind(&self, device: &str) -> Result<(), UnbindError>;
}

pub struct Binder<O: ControlOpener = CharDevOpener> {
    layout: BusLayout,
    options: BindOptions,
    opener: O,
}

impl Binder<CharDevOpener> {
    pub fn new(layout: BusLayout, options: BindOptions) -> Self {
        Self::with_opener(layout, options, CharDevOpener)
    }
}

impl<O: ControlOpener> Binder<O> {
    pub fn with_opener(layout: BusLayout, options: BindOptions, opener: O) -> Self {
        Self { layout, options, opener }
    }

    fn bind_steps(&self, device: &str, local_address: u32) -> Result<(), BindError> {
        let l = &self.layout;

        let mut info = EndpointInfo::new(&endpoint_name(device), local_address, 0).map_err(|e| {
            BindError::EndpointNameTooLong { name: e.name, max: RPMSG_NAME_SIZE - 1 }
        })?;

        // 1 ─ peer address
        let dst_path = l.dst_attr(device);
        let raw = read_attribute(&dst_path).map_err(|source| BindError::AttributeUnreadable {
            path: dst_path.clone(),
            source,
        })?;
        let text = String::from_utf8_lossy(&raw);
        info.dst = parse_address(&text).ok_or_else(|| BindError::AttributeMalformed {
            path: dst_path.clone(),
            content: text.trim_end().to_owned(),
        })?;
        rpmsg_log!(Level::Debug, "bind", "{}: dst=0x{:x}", device, info.dst);

        // 2 ─ driver override
        let override_path = l.driver_override_attr(device);
        write_attribute(&override_path, &l.driver).map_err(|source| {
            BindError::OverrideWriteFailed {
                path: override_path.clone(),
                driver: l.driver.clone(),
                source,
            }
        })?;

        // 3 ─ bind trigger
        let bind_path = l.bind_attr();
        write_attribute(&bind_path, device).map_err(|source| BindError::BindTriggerFailed {
            path: bind_path.clone(),
            device: device.to_owned(),
            source,
        })?;
        rpmsg_log!(Level::Debug, "bind", "{}: bound to {}", device, l.driver);

        // 4 ─ control node discovery
        let dir = l.rpmsg_dir(device);
        let node = match wait_for_control_node(
            &dir,
            &l.ctrl_prefix,
            self.options.probe_timeout,
            self.options.poll_interval,
        ) {
            Ok(Some(node)) => node,
            Ok(None) => {
                return Err(BindError::ControlNodeNotFound { dir, prefix: l.ctrl_prefix.clone() });
            }
            Err(source) => return Err(BindError::ControlDirUnreadable { dir, source }),
        };

        // 5 ─ open control node
        let node_path = l.dev_node(&node);
        let mut handle = self.opener.open(&node_path).map_err(|source| {
            BindError::ControlNodeOpenFailed { path: node_path.clone(), source }
        })?;

        // 6 ─ create endpoint; the handle is closed whatever the outcome
        let created = handle.create_endpoint(&info);
        drop(handle);
        created.map_err(|source| BindError::EndpointCreateFailed {
            name: info.name().to_owned(),
            source,
        })?;

        rpmsg_log!(
            Level::Info,
            "bind",
            "{}: endpoint {} created via {} (src=0x{:x}, dst=0x{:x})",
            device,
            info.name(),
            node_path.display(),
            info.src,
            info.dst
        );
        Ok(())
    }
}

impl<O: ControlOpener> DeviceOps for Binder<O> {
    fn bind(&self, device: &str, local_address: u32) -> Result<(), BindError> {
        let result = self.bind_steps(device, local_address);
        if let Err(e) = &result {
            rpmsg_log!(Level::Error, "bind", "{}: {} ({})", device, e, e.kind());
            if self.options.unbind_on_failure && e.left_device_bound() {
                rpmsg_log!(Level::Warn, "bind", "{}: rolling back bind", device);
                // failure already logged inside unbind
                let _ = self.unbind(device);
            }
        }
        result
    }

    fn unbind(&self, device: &str) -> Result<(), UnbindError> {
        let path = self.layout.unbind_attr();
        write_attribute(&path, device).map_err(|source| {
            let e = UnbindError::UnbindTriggerFailed {
                path: path.clone(),
                device: device.to_owned(),
                source,
            };
            rpmsg_log!(Level::Error, "unbind", "{}: {}", device, e);
            e
        })?;
        rpmsg_log!(Level::Info, "unbind", "{}: released from {}", device, self.layout.driver);
        Ok(())
    }
}
