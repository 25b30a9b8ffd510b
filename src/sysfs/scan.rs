// src/sysfs/scan.rs

//! Control-node discovery under `devices/<id>/rpmsg/`.
//!
//! The directory shows up only once the driver probe triggered by the bind
//! write has finished, and the kernel gives user space nothing to wait on.
//! `wait_for_control_node` therefore polls until a deadline.

use crate::rpmsg_log;
use log::Level;
use std::{
    fs, io,
    path::Path,
    thread,
    time::{Duration, Instant},
};

/// Smallest sleep between two scans.
const MIN_POLL: Duration = Duration::from_millis(1);

/// Scan `dir` once for an entry whose name starts with `prefix`.
/// When several match, the lowest numeric suffix wins (`rpmsg_ctrl2` before
/// `rpmsg_ctrl10`); names without one sort last, by name.
pub fn find_control_node(dir: &Path, prefix: &str) -> io::Result<Option<String>> {
    let mut found: Option<(u64, String)> = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        let Some(suffix) = name.strip_prefix(prefix) else {
            continue;
        };
        let key = (suffix.parse::<u64>().unwrap_or(u64::MAX), name);
        if found.as_ref().is_none_or(|f| key < *f) {
            found = Some(key);
        }
    }
    Ok(found.map(|(_, name)| name))
}

/// Poll `dir` until a control node appears or `timeout` elapses.
///
/// A zero timeout performs exactly one scan. A timeout too large to
/// represent as an `Instant` means no deadline. A directory that does not
/// exist yet counts as "not ready"; if it is still missing at the deadline
/// the last I/O error is returned.
pub fn wait_for_control_node(
    dir: &Path,
    prefix: &str,
    timeout: Duration,
    poll: Duration,
) -> io::Result<Option<String>> {
    let deadline = Instant::now().checked_add(timeout);
    let poll = poll.max(MIN_POLL);
    let mut scans = 0u32;

    loop {
        scans = scans.saturating_add(1);
        let attempt = find_control_node(dir, prefix);
        if let Ok(Some(name)) = &attempt {
            rpmsg_log!(Level::Debug, "scan", "found {} in {} after {} scan(s)", name, dir.display(), scans);
            return attempt;
        }

        let now = Instant::now();
        let nap = match deadline {
            Some(deadline) if now >= deadline => {
                rpmsg_log!(Level::Debug, "scan", "gave up on {} after {} scan(s)", dir.display(), scans);
                return attempt;
            }
            Some(deadline) => poll.min(deadline - now),
            None => poll,
        };
        thread::sleep(nap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn finds_prefixed_entry() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("other")).unwrap();
        fs::create_dir(dir.path().join("rpmsg_ctrl3")).unwrap();
        fs::create_dir(dir.path().join("rpmsg_ctrl1")).unwrap();

        let got = find_control_node(dir.path(), "rpmsg_ctrl").unwrap();
        assert_eq!(got.as_deref(), Some("rpmsg_ctrl1"));
    }

    #[test]
    fn lowest_numeric_suffix_wins() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("rpmsg_ctrl10")).unwrap();
        fs::create_dir(dir.path().join("rpmsg_ctrl2")).unwrap();
        fs::create_dir(dir.path().join("rpmsg_ctrlx")).unwrap();

        let got = find_control_node(dir.path(), "rpmsg_ctrl").unwrap();
        assert_eq!(got.as_deref(), Some("rpmsg_ctrl2"));
    }

    #[test]
    fn unrepresentable_timeout_does_not_panic() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("rpmsg_ctrl0")).unwrap();
        let huge = crate::config::model::parse_duration("500000000000years").unwrap();

        let got = wait_for_control_node(dir.path(), "rpmsg_ctrl", huge, Duration::from_millis(1))
            .unwrap();
        assert_eq!(got.as_deref(), Some("rpmsg_ctrl0"));

        let got = wait_for_control_node(dir.path(), "rpmsg_ctrl", Duration::MAX, Duration::ZERO)
            .unwrap();
        assert_eq!(got.as_deref(), Some("rpmsg_ctrl0"));
    }

    #[test]
    fn empty_directory_yields_none() {
        let dir = tempdir().unwrap();
        assert_eq!(find_control_node(dir.path(), "rpmsg_ctrl").unwrap(), None);
    }

    #[test]
    fn zero_timeout_reports_missing_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("rpmsg");
        let err = wait_for_control_node(&missing, "rpmsg_ctrl", Duration::ZERO, Duration::ZERO)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn waits_for_late_probe() {
        let dir = tempdir().unwrap();
        let rpmsg = dir.path().join("rpmsg");
        let late = rpmsg.clone();
        let probe = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            fs::create_dir_all(late.join("rpmsg_ctrl0")).unwrap();
        });

        let got = wait_for_control_node(
            &rpmsg,
            "rpmsg_ctrl",
            Duration::from_secs(5),
            Duration::from_millis(5),
        )
        .unwrap();
        probe.join().unwrap();
        assert_eq!(got.as_deref(), Some("rpmsg_ctrl0"));
    }
}
