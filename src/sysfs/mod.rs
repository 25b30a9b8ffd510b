//! # RPMsg bus registry
//!
//! Path layout of the kernel objects the binder touches, plus the small file
//! helpers that read and write them.
//!
//! ```text
//! <bus_root>/devices/<id>/dst               peer address (text)
//! <bus_root>/devices/<id>/driver_override   driver forced on next probe
//! <bus_root>/devices/<id>/rpmsg/            control nodes, after bind
//! <bus_root>/drivers/<driver>/bind          write <id> to attach
//! <bus_root>/drivers/<driver>/unbind        write <id> to detach
//! <dev_root>/<control node>                 char device for the ioctl
//! ```

pub mod attr;
pub mod scan;

use std::path::{Path, PathBuf};

pub use attr::{parse_address, read_attribute, write_attribute};
pub use scan::{find_control_node, wait_for_control_node};

pub const DEFAULT_BUS_ROOT: &str = "/sys/bus/rpmsg";
pub const DEFAULT_DEV_ROOT: &str = "/dev";
/// Generic character-device driver devices are reassigned to.
pub const CHARDEV_DRIVER: &str = "rpmsg_chrdev";
/// Name prefix of the control node created under a bound device.
pub const CHARDEV_CTRL_PREFIX: &str = "rpmsg_ctrl";

/// Where the RPMsg bus and its device nodes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusLayout {
    pub bus_root: PathBuf,
    pub dev_root: PathBuf,
    pub driver: String,
    pub ctrl_prefix: String,
}

impl Default for BusLayout {
    fn default() -> Self {
        Self {
            bus_root: PathBuf::from(DEFAULT_BUS_ROOT),
            dev_root: PathBuf::from(DEFAULT_DEV_ROOT),
            driver: CHARDEV_DRIVER.into(),
            ctrl_prefix: CHARDEV_CTRL_PREFIX.into(),
        }
    }
}

impl BusLayout {
    fn device_dir(&self, device: &str) -> PathBuf {
        self.bus_root.join("devices").join(device)
    }

    fn driver_dir(&self) -> PathBuf {
        self.bus_root.join("drivers").join(&self.driver)
    }

    pub fn dst_attr(&self, device: &str) -> PathBuf {
        self.device_dir(device).join("dst")
    }

    pub fn driver_override_attr(&self, device: &str) -> PathBuf {
        self.device_dir(device).join("driver_override")
    }

    pub fn rpmsg_dir(&self, device: &str) -> PathBuf {
        self.device_dir(device).join("rpmsg")
    }

    pub fn bind_attr(&self) -> PathBuf {
        self.driver_dir().join("bind")
    }

    pub fn unbind_attr(&self) -> PathBuf {
        self.driver_dir().join("unbind")
    }

    pub fn dev_node(&self, node: &str) -> PathBuf {
        self.dev_root.join(node)
    }

    /// Rebase the layout under `root`, for running against a fake tree.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            bus_root: root.join("sys/bus/rpmsg"),
            dev_root: root.join("dev"),
            ..Self::default()
        }
    }
}
