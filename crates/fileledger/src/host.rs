//! Host capabilities: raw volume access and the roots worth enumerating.
//!
//! The run coordinator only sees the [`HostProbe`] trait so tests can stand
//! in a fake host.

use crate::error::{InventoryError, Result};
use std::path::PathBuf;

pub trait HostProbe: Send + Sync {
    /// Whether this process can open the raw system volume.
    fn has_raw_volume_access(&self) -> bool;

    /// Top-level paths an inventory can start from.
    fn enumerable_roots(&self) -> Result<Vec<PathBuf>>;
}

/// Probe backed by the real operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

#[cfg(windows)]
impl HostProbe for SystemProbe {
    fn has_raw_volume_access(&self) -> bool {
        std::fs::File::open(r"\\.\PHYSICALDRIVE0").is_ok()
    }

    fn enumerable_roots(&self) -> Result<Vec<PathBuf>> {
        let roots: Vec<PathBuf> = (b'A'..=b'Z')
            .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
            .filter(|root| std::fs::read_dir(root).is_ok())
            .collect();
        if roots.is_empty() {
            return Err(InventoryError::RootNotFound(
                "no readable drive letters".to_string(),
            ));
        }
        Ok(roots)
    }
}

#[cfg(unix)]
impl HostProbe for SystemProbe {
    fn has_raw_volume_access(&self) -> bool {
        // SAFETY: geteuid has no preconditions and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }

    fn enumerable_roots(&self) -> Result<Vec<PathBuf>> {
        let mut roots = vec![PathBuf::from("/")];
        match std::fs::read_to_string("/proc/mounts") {
            Ok(table) => {
                for mount in mount_points(&table) {
                    if !roots.contains(&mount) && mount.is_dir() {
                        roots.push(mount);
                    }
                }
            }
            Err(err) => tracing::debug!(error = %err, "mount table unavailable"),
        }
        if !roots[0].is_dir() {
            return Err(InventoryError::RootNotFound("/".to_string()));
        }
        Ok(roots)
    }
}

/// Kernel and virtual filesystems that hold no user files.
#[cfg_attr(not(unix), allow(dead_code))]
const PSEUDO_FILESYSTEMS: &[&str] = &[
    "proc", "sysfs", "devtmpfs", "devpts", "tmpfs", "cgroup", "cgroup2", "securityfs",
    "debugfs", "tracefs", "pstore", "bpf", "mqueue", "hugetlbfs", "configfs", "fusectl",
    "autofs", "binfmt_misc", "overlay", "nsfs", "squashfs",
];

/// Mount points from a `/proc/mounts` style table, pseudo filesystems skipped.
#[cfg_attr(not(unix), allow(dead_code))]
pub(crate) fn mount_points(table: &str) -> Vec<PathBuf> {
    table
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let _device = fields.next()?;
            let target = fields.next()?;
            let fstype = fields.next()?;
            if PSEUDO_FILESYSTEMS.contains(&fstype) {
                return None;
            }
            Some(PathBuf::from(unescape_mount_field(target)))
        })
        .collect()
}

/// Undo the octal escaping (`\040` for space) the kernel applies to mount paths.
#[cfg_attr(not(unix), allow(dead_code))]
fn unescape_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 4 <= bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
                let value = digits
                    .iter()
                    .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                if let Ok(value) = u8::try_from(value) {
                    out.push(value);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
