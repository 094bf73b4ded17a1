use std::fs;
use std::io;
use std::path::PathBuf;

use tempfile::TempDir;
use treefm_core::{
    list_directory, parse_mount_table, FsError, PathInfo, PathKind, Theme, UserSettings,
    DEFAULT_REMOVABLE_ROOTS, MIN_FONT_SIZE,
};

#[cfg(unix)]
#[test]
fn test_symlinks_classified_by_target() {
    use std::os::unix::fs::symlink;

    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("dir");
    fs::create_dir(&dir).unwrap();
    symlink(&dir, temp.path().join("to_dir")).unwrap();
    symlink(temp.path().join("gone"), temp.path().join("dangling")).unwrap();

    let info = PathInfo::resolve(temp.path().join("to_dir"));
    assert_eq!(info.kind, PathKind::Directory);
    assert!(info.is_symlink);
    assert!(info.mode_string().starts_with('l'));

    let info = PathInfo::resolve(temp.path().join("dangling"));
    assert_eq!(info.kind, PathKind::Missing);
    assert!(info.is_symlink);

    // The listing puts a linked folder among the folders
    let listing = list_directory(temp.path()).unwrap();
    let folders: Vec<&str> = listing.folders.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(folders, vec!["dir", "to_dir"]);
    assert_eq!(listing.summary(), "2 folders, 1 files");
}

#[test]
fn test_listing_missing_directory_fails() {
    let temp = TempDir::new().unwrap();
    let err = list_directory(temp.path().join("absent")).unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("absent"));
}

#[test]
fn test_listing_a_file_fails() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("plain.txt");
    fs::write(&file, b"x").unwrap();
    assert!(list_directory(&file).is_err());
}

#[test]
fn test_error_classification() {
    let path = PathBuf::from("/some/path");

    let err = FsError::io(&path, io::Error::from(io::ErrorKind::PermissionDenied));
    assert!(err.is_permission_denied());
    assert_eq!(err.to_string(), "Permission denied: /some/path");

    let err = FsError::io(&path, io::Error::other("disk on fire"));
    assert!(matches!(err, FsError::Io { .. }));
    assert!(err.to_string().contains("disk on fire"));
}

#[test]
fn test_mount_table_with_custom_roots() {
    let table = "/dev/sdb1 /media/usb vfat rw 0 0\n/dev/sdc1 /srv/disk ext4 rw 0 0\n";

    assert_eq!(parse_mount_table(table, DEFAULT_REMOVABLE_ROOTS).len(), 1);

    let devices = parse_mount_table(table, &["/srv/"]);
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].name, "disk");
    assert_eq!(devices[0].device_node, "/dev/sdc1");
}

#[test]
fn test_settings_survive_garbage_and_clamp() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.toml");

    fs::write(&path, "this is not toml = = =").unwrap();
    assert_eq!(UserSettings::load_from(&path), UserSettings::default());

    fs::write(&path, "theme = \"dark\"\nfont_size = 1\n").unwrap();
    let settings = UserSettings::load_from(&path);
    assert_eq!(settings.theme, Theme::Dark);
    assert_eq!(settings.font_size, MIN_FONT_SIZE);

    // Missing keys take their defaults
    fs::write(&path, "font_size = 20\n").unwrap();
    let settings = UserSettings::load_from(&path);
    assert_eq!(settings.theme, Theme::Light);
    assert_eq!(settings.font_size, 20);
}
