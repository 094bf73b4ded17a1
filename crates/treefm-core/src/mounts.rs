//! Mount table parsing.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Mount point prefixes conventionally used for removable media.
pub const DEFAULT_REMOVABLE_ROOTS: &[&str] = &["/media/", "/mnt/", "/run/media/"];

/// A mounted removable device. Identity is the mount point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MountedDevice {
    /// Display name (last component of the mount point).
    pub name: String,
    /// Where the device is mounted.
    pub mount_point: PathBuf,
    /// Device node or source, e.g. `/dev/sdb1`.
    pub device_node: String,
}

impl MountedDevice {
    /// Build a device entry, deriving the name from the mount point.
    pub fn new(mount_point: impl Into<PathBuf>, device_node: impl Into<String>) -> Self {
        let mount_point = mount_point.into();
        let name = mount_point
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| mount_point.to_string_lossy().into_owned());
        Self {
            name,
            mount_point,
            device_node: device_node.into(),
        }
    }

    /// Label shown in the devices pane, e.g. "USB (/dev/sdb1)".
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.device_node)
    }
}

/// Parse a `/proc/mounts`-style table, keeping mounts under `roots`.
///
/// Only the first two whitespace-separated fields are read; lines with
/// fewer fields are skipped. Order follows the table.
pub fn parse_mount_table<S: AsRef<str>>(table: &str, roots: &[S]) -> Vec<MountedDevice> {
    table
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let mount_point = fields.next()?;
            Some((decode_mount_field(device), decode_mount_field(mount_point)))
        })
        .filter(|(_, mount_point)| is_removable(mount_point, roots))
        .map(|(device, mount_point)| MountedDevice::new(mount_point, device))
        .collect()
}

fn is_removable<S: AsRef<str>>(mount_point: &str, roots: &[S]) -> bool {
    roots
        .iter()
        .any(|root| mount_point.starts_with(root.as_ref()))
}

/// Decode the octal escapes the kernel uses for whitespace and backslashes
/// in mount table fields (`\040`, `\011`, `\012`, `\134`).
pub fn decode_mount_field(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }

    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && is_octal_triplet(&bytes[i + 1..i + 4]) {
            let value = (bytes[i + 1] - b'0') as u32 * 64
                + (bytes[i + 2] - b'0') as u32 * 8
                + (bytes[i + 3] - b'0') as u32;
            if let Ok(byte) = u8::try_from(value) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn is_octal_triplet(bytes: &[u8]) -> bool {
    bytes.len() == 3 && bytes.iter().all(|b| (b'0'..=b'7').contains(b))
}

/// Check whether `path` is the mount point of one of `devices`.
pub fn find_device<'a>(devices: &'a [MountedDevice], path: &Path) -> Option<&'a MountedDevice> {
    devices.iter().find(|d| d.mount_point == path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
/dev/nvme0n1p2 / ext4 rw,relatime 0 0
/dev/sdb1 /media/user/USB ext4 rw 0 0
/dev/sdc1 /run/media/user/SD\\040Card vfat rw 0 0
garbage
/dev/sdd1 /mnt/backup ntfs ro 0 0
";

    #[test]
    fn test_parse_filters_removable_roots() {
        let devices = parse_mount_table(TABLE, DEFAULT_REMOVABLE_ROOTS);
        assert_eq!(devices.len(), 3);

        assert_eq!(
            devices[0],
            MountedDevice {
                name: "USB".to_string(),
                mount_point: PathBuf::from("/media/user/USB"),
                device_node: "/dev/sdb1".to_string(),
            }
        );
        assert_eq!(devices[1].name, "SD Card");
        assert_eq!(devices[2].mount_point, PathBuf::from("/mnt/backup"));
    }

    #[test]
    fn test_short_lines_skipped() {
        let devices = parse_mount_table("onlyone\n\n   \n", DEFAULT_REMOVABLE_ROOTS);
        assert!(devices.is_empty());
    }

    #[test]
    fn test_decode_mount_field() {
        assert_eq!(decode_mount_field("/media/a\\040b"), "/media/a b");
        assert_eq!(decode_mount_field("/media/back\\134slash"), "/media/back\\slash");
        assert_eq!(decode_mount_field("/media/trailing\\04"), "/media/trailing\\04");
        assert_eq!(decode_mount_field("/plain"), "/plain");
    }

    #[test]
    fn test_label_and_lookup() {
        let devices = parse_mount_table(TABLE, DEFAULT_REMOVABLE_ROOTS);
        assert_eq!(devices[0].label(), "USB (/dev/sdb1)");
        assert!(find_device(&devices, Path::new("/mnt/backup")).is_some());
        assert!(find_device(&devices, Path::new("/mnt")).is_none());
    }
}
