// src/batch.rs

//! Batch driver: applies bind or unbind to `prefix<offset+i>` for
//! `i in 0..count`, one device after the other.
//!
//! A failing device never stops the run. Every outcome lands in the
//! returned `BatchReport`; what that means for the exit status is left to
//! the caller.

use crate::binder::DeviceOps;
use crate::error::{BatchError, DeviceError};
use crate::rpmsg_log;
use log::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Device `i` gets local address `start_address + i`.
    Bind { start_address: i64 },
    Unbind,
}

impl Mode {
    pub fn verb(&self) -> &'static str {
        match self {
            Mode::Bind { .. } => "bind",
            Mode::Unbind => "unbind",
        }
    }
}

/// Raw batch parameters, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub prefix: String,
    /// Numeric suffix of the first device.
    pub offset: i64,
    pub count: i64,
    pub mode: Mode,
}

/// One device to visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDevice {
    pub device: String,
    pub local_address: Option<u32>,
}

/// Largest `base + count - 1` allowed for a 32-bit field.
fn last_fits_u32(base: i64, count: i64) -> bool {
    base.checked_add(count - 1)
        .is_some_and(|last| last <= i64::from(u32::MAX))
}

impl BatchRequest {
    /// Check the preconditions and return the devices to visit, in order.
    /// Nothing here touches the kernel; devices are produced on demand.
    pub fn plan(&self) -> Result<impl Iterator<Item = PlannedDevice> + '_, BatchError> {
        if self.prefix.is_empty() {
            return Err(BatchError::InvalidArguments("device prefix must not be empty".into()));
        }
        if self.count < 1 {
            return Err(BatchError::InvalidArguments(format!(
                "count must be at least 1, got {}",
                self.count
            )));
        }
        if self.offset < 0 || !last_fits_u32(self.offset, self.count) {
            return Err(BatchError::InvalidArguments(format!(
                "device offset {} with count {} is out of range",
                self.offset, self.count
            )));
        }
        if let Mode::Bind { start_address } = self.mode {
            if start_address < 0 {
                return Err(BatchError::InvalidArguments(
                    "start address must be set to a non-negative value to bind".into(),
                ));
            }
            if !last_fits_u32(start_address, self.count) {
                return Err(BatchError::InvalidArguments(format!(
                    "start address {} with count {} overflows 32 bits",
                    start_address, self.count
                )));
            }
        }

        Ok((0..self.count).map(move |i| PlannedDevice {
            device: format!("{}{}", self.prefix, self.offset + i),
            local_address: match self.mode {
                Mode::Bind { start_address } => Some((start_address + i) as u32),
                Mode::Unbind => None,
            },
        }))
    }
}

#[derive(Debug)]
pub struct DeviceOutcome {
    pub device: String,
    pub local_address: Option<u32>,
    pub result: Result<(), DeviceError>,
}

impl DeviceOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregate of one batch run, in visiting order.
#[derive(Debug)]
pub struct BatchReport {
    pub mode: Mode,
    pub outcomes: Vec<DeviceOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &DeviceOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(DeviceOutcome::is_ok)
    }
}

/// Run `request` against `ops`, continuing past failed devices.
pub fn run_batch<D>(ops: &D, request: &BatchRequest) -> Result<BatchReport, BatchError>
where
    D: DeviceOps + ?Sized,
{
    let plan = request.plan()?;
    let verb = request.mode.verb();
    rpmsg_log!(
        Level::Info,
        "batch",
        "{} {} device(s) starting at {}{}",
        verb,
        request.count,
        request.prefix,
        request.offset
    );

    let outcomes = plan
        .map(|PlannedDevice { device, local_address }| {
            rpmsg_log!(Level::Info, "batch", "Try to {} {} device", verb, device);
            let result = match local_address {
                Some(addr) => ops.bind(&device, addr).map_err(DeviceError::from),
                None => ops.unbind(&device).map_err(DeviceError::from),
            };
            DeviceOutcome { device, local_address, result }
        })
        .collect();

    let report = BatchReport { mode: request.mode, outcomes };
    rpmsg_log!(
        Level::Info,
        "batch",
        "{}: {}/{} device(s) succeeded",
        verb,
        report.succeeded(),
        report.total()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(prefix: &str, offset: i64, count: i64, mode: Mode) -> BatchRequest {
        BatchRequest { prefix: prefix.into(), offset, count, mode }
    }

    #[test]
    fn plan_numbers_devices_and_addresses() {
        let plan: Vec<_> = req("virtio", 0, 2, Mode::Bind { start_address: 0 }).plan().unwrap().collect();
        assert_eq!(
            plan,
            vec![
                PlannedDevice { device: "virtio0".into(), local_address: Some(0) },
                PlannedDevice { device: "virtio1".into(), local_address: Some(1) },
            ]
        );
    }

    #[test]
    fn plan_offsets_suffix_independently_of_address() {
        let plan: Vec<_> = req("rpmsg", 5, 3, Mode::Bind { start_address: 0x400 }).plan().unwrap().collect();
        let names: Vec<_> = plan.iter().map(|p| p.device.as_str()).collect();
        let addrs: Vec<_> = plan.iter().map(|p| p.local_address.unwrap()).collect();
        assert_eq!(names, ["rpmsg5", "rpmsg6", "rpmsg7"]);
        assert_eq!(addrs, [0x400, 0x401, 0x402]);
    }

    #[test]
    fn unbind_plan_has_no_addresses() {
        let request = req("virtio", 0, 3, Mode::Unbind);
        let mut plan = request.plan().unwrap();
        assert!(plan.all(|p| p.local_address.is_none()));
    }

    #[test]
    fn preconditions() {
        let bind = Mode::Bind { start_address: 0 };
        assert!(matches!(req("", 0, 1, bind).plan(), Err(BatchError::InvalidArguments(_))));
        assert!(matches!(req("v", 0, 0, bind).plan(), Err(BatchError::InvalidArguments(_))));
        assert!(matches!(req("v", 0, -4, Mode::Unbind).plan(), Err(BatchError::InvalidArguments(_))));
        assert!(matches!(
            req("v", 0, 1, Mode::Bind { start_address: -1 }).plan(),
            Err(BatchError::InvalidArguments(_))
        ));
        assert!(matches!(req("v", -1, 1, Mode::Unbind).plan(), Err(BatchError::InvalidArguments(_))));
    }

    #[test]
    fn address_range_must_fit_u32() {
        let top = i64::from(u32::MAX);
        assert!(req("v", 0, 1, Mode::Bind { start_address: top }).plan().is_ok());
        assert!(req("v", 0, 2, Mode::Bind { start_address: top }).plan().is_err());
    }

    #[test]
    fn huge_count_is_planned_lazily() {
        let request = req("virtio", 0, 4_000_000_000, Mode::Bind { start_address: 0 });
        let mut plan = request.plan().unwrap();

        assert_eq!(plan.next().map(|p| p.device).as_deref(), Some("virtio0"));
        assert_eq!(plan.next().map(|p| p.device).as_deref(), Some("virtio1"));
    }
}
