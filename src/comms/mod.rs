//! User-to-kernel communication with the RPMsg character-device driver.

pub mod ioctl;

pub use ioctl::{
    CharDevHandle, CharDevOpener, ControlHandle, ControlOpener, EndpointInfo, NameTooLong,
    RPMSG_CREATE_EPT_IOCTL, RPMSG_NAME_SIZE,
};
