use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::HistoryError;

/// Which of the two history locations is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageScope {
    Primary,
    /// The primary directory was not writable; only fallback entries are visible
    Fallback,
}

impl std::fmt::Display for StorageScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageScope::Primary => write!(f, "primary"),
            StorageScope::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocations {
    pub primary: PathBuf,
    pub fallback: PathBuf,
}

impl Default for StorageLocations {
    fn default() -> Self {
        Self {
            primary: program_data_dir(),
            fallback: default_fallback_dir(),
        }
    }
}

impl StorageLocations {
    pub fn with_primary(primary: PathBuf) -> Self {
        Self {
            primary,
            fallback: default_fallback_dir(),
        }
    }
}

/// `data/` next to the running executable
pub fn program_data_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("data")
}

/// Per-user temporary location used when the program directory is read-only
pub fn default_fallback_dir() -> PathBuf {
    std::env::temp_dir().join("gpa-tally").join("data")
}

/// Prepares a directory for history writes.
///
/// The filesystem implementation is [`FsProbe`]; tests substitute probes that
/// refuse particular directories to exercise the fallback.
pub trait DirProbe {
    fn prepare(&self, dir: &Path) -> io::Result<()>;
}

/// Creates the directory and proves it writable with a throwaway file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl DirProbe for FsProbe {
    fn prepare(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)?;
        let probe = dir.join(format!(".write-probe-{}", std::process::id()));
        fs::write(&probe, b"")?;
        fs::remove_file(&probe)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub dir: PathBuf,
    pub scope: StorageScope,
}

/// Pick the history directory: primary if it can be prepared, otherwise the fallback.
pub fn resolve_location(
    locations: &StorageLocations,
    probe: &dyn DirProbe,
) -> Result<ResolvedLocation, HistoryError> {
    let primary_err = match probe.prepare(&locations.primary) {
        Ok(()) => {
            debug!(dir = %locations.primary.display(), "using primary history location");
            return Ok(ResolvedLocation {
                dir: locations.primary.clone(),
                scope: StorageScope::Primary,
            });
        }
        Err(e) => e,
    };

    warn!(
        primary = %locations.primary.display(),
        fallback = %locations.fallback.display(),
        error = %primary_err,
        "primary history location not writable, falling back"
    );

    match probe.prepare(&locations.fallback) {
        Ok(()) => Ok(ResolvedLocation {
            dir: locations.fallback.clone(),
            scope: StorageScope::Fallback,
        }),
        Err(fallback_err) => Err(HistoryError::StorageUnavailable {
            primary: locations.primary.clone(),
            fallback: locations.fallback.clone(),
            primary_err,
            fallback_err,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DenyAll;

    impl DirProbe for DenyAll {
        fn prepare(&self, _dir: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    struct DenyPrimary(PathBuf);

    impl DirProbe for DenyPrimary {
        fn prepare(&self, dir: &Path) -> io::Result<()> {
            if dir == self.0 {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            } else {
                Ok(())
            }
        }
    }

    fn locations() -> StorageLocations {
        StorageLocations {
            primary: PathBuf::from("/opt/gpa-tally/data"),
            fallback: PathBuf::from("/tmp/gpa-tally/data"),
        }
    }

    #[test]
    fn test_resolve_prefers_primary() {
        struct AllowAll;
        impl DirProbe for AllowAll {
            fn prepare(&self, _dir: &Path) -> io::Result<()> {
                Ok(())
            }
        }

        let resolved = resolve_location(&locations(), &AllowAll).unwrap();
        assert_eq!(resolved.scope, StorageScope::Primary);
        assert_eq!(resolved.dir, PathBuf::from("/opt/gpa-tally/data"));
    }

    #[test]
    fn test_resolve_falls_back_when_primary_denied() {
        let locations = locations();
        let probe = DenyPrimary(locations.primary.clone());

        let resolved = resolve_location(&locations, &probe).unwrap();
        assert_eq!(resolved.scope, StorageScope::Fallback);
        assert_eq!(resolved.dir, locations.fallback);
    }

    #[test]
    fn test_resolve_fails_when_both_denied() {
        let err = resolve_location(&locations(), &DenyAll).unwrap_err();
        assert!(matches!(err, HistoryError::StorageUnavailable { .. }));
    }

    #[test]
    fn test_fs_probe_creates_directory() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("nested").join("data");

        FsProbe.prepare(&dir).unwrap();

        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_fs_probe_rejects_file_path() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("occupied");
        fs::write(&file, b"x").unwrap();

        assert!(FsProbe.prepare(&file).is_err());
    }
}
