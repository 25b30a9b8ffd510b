//! Fake RPMsg bus for integration tests.
//!
//! `FakeBus` lays out a sysfs-shaped tree in a temporary directory, and
//! `RecordingOpener` stands in for `/dev/rpmsg_ctrlN`, logging every open,
//! ioctl and close it sees.

#![allow(dead_code)]

use rpmsg_bind::comms::{ControlHandle, ControlOpener, EndpointInfo};
use rpmsg_bind::BusLayout;
use std::{
    cell::RefCell,
    fs, io,
    path::{Path, PathBuf},
    rc::Rc,
};
use tempfile::TempDir;

pub struct FakeBus {
    pub root: TempDir,
    pub layout: BusLayout,
}

impl FakeBus {
    /// Bus with the `rpmsg_chrdev` driver registered and no devices.
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let layout = BusLayout::rooted_at(root.path());
        fs::create_dir_all(layout.bind_attr().parent().unwrap()).unwrap();
        fs::write(layout.bind_attr(), "").unwrap();
        fs::write(layout.unbind_attr(), "").unwrap();
        fs::create_dir_all(&layout.dev_root).unwrap();
        Self { root, layout }
    }

    /// Register `device` with the given `dst` attribute text.
    pub fn add_device(&self, device: &str, dst: &str) {
        self.add_device_raw(device, dst.as_bytes());
    }

    /// Register `device` with arbitrary `dst` bytes.
    pub fn add_device_raw(&self, device: &str, dst: &[u8]) {
        let dst_path = self.layout.dst_attr(device);
        fs::create_dir_all(dst_path.parent().unwrap()).unwrap();
        fs::write(dst_path, dst).unwrap();
        fs::write(self.layout.driver_override_attr(device), "").unwrap();
    }

    /// Pretend the driver probe finished: `rpmsg/<node>` and `/dev/<node>`.
    pub fn publish_ctrl(&self, device: &str, node: &str) {
        fs::create_dir_all(self.layout.rpmsg_dir(device).join(node)).unwrap();
        fs::write(self.layout.dev_node(node), "").unwrap();
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    pub fn driver_override(&self, device: &str) -> String {
        self.read(&self.layout.driver_override_attr(device))
    }

    pub fn bind_written(&self) -> String {
        self.read(&self.layout.bind_attr())
    }

    pub fn unbind_written(&self) -> String {
        self.read(&self.layout.unbind_attr())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CtrlEvent {
    Opened(PathBuf),
    Created { name: String, src: u32, dst: u32 },
    Closed(PathBuf),
}

/// Fake control-node opener; clones share the same event log.
#[derive(Debug, Clone, Default)]
pub struct RecordingOpener {
    pub events: Rc<RefCell<Vec<CtrlEvent>>>,
    pub fail_open: bool,
    pub fail_create: bool,
}

impl RecordingOpener {
    pub fn failing_open() -> Self {
        Self { fail_open: true, ..Self::default() }
    }

    pub fn failing_create() -> Self {
        Self { fail_create: true, ..Self::default() }
    }

    pub fn events(&self) -> Vec<CtrlEvent> {
        self.events.borrow().clone()
    }
}

pub struct RecordingHandle {
    path: PathBuf,
    events: Rc<RefCell<Vec<CtrlEvent>>>,
    fail_create: bool,
}

impl ControlOpener for RecordingOpener {
    type Handle = RecordingHandle;

    fn open(&self, node: &Path) -> io::Result<RecordingHandle> {
        if self.fail_open {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        self.events.borrow_mut().push(CtrlEvent::Opened(node.to_path_buf()));
        Ok(RecordingHandle {
            path: node.to_path_buf(),
            events: Rc::clone(&self.events),
            fail_create: self.fail_create,
        })
    }
}

impl ControlHandle for RecordingHandle {
    fn create_endpoint(&mut self, info: &EndpointInfo) -> io::Result<()> {
        if self.fail_create {
            return Err(io::Error::from(io::ErrorKind::AlreadyExists));
        }
        self.events.borrow_mut().push(CtrlEvent::Created {
            name: info.name().to_owned(),
            src: info.src,
            dst: info.dst,
        });
        Ok(())
    }
}

impl Drop for RecordingHandle {
    fn drop(&mut self) {
        self.events.borrow_mut().push(CtrlEvent::Closed(self.path.clone()));
    }
}
