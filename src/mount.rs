//! Local filesystem mount.
//!
//! Boot mounts a small local filesystem before bringing up the radio. The
//! portal itself never reads or writes files through it, so a failed mount
//! is logged and boot continues.

use std::fmt;
use std::path::PathBuf;

/// Make a local filesystem available.
pub trait FilesystemMount {
    /// Mount the filesystem. Calling it again after success is a no-op.
    fn mount(&mut self) -> Result<(), MountError>;
}

/// Errors mounting the filesystem.
#[derive(Debug)]
pub enum MountError {
    /// Host I/O failure.
    Io(std::io::Error),
    /// Invalid mount point.
    InvalidPath(String),
    /// ESP-IDF VFS error.
    #[cfg(feature = "esp32")]
    Esp(esp_idf_sys::EspError),
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::InvalidPath(path) => write!(f, "invalid mount point: {}", path),
            #[cfg(feature = "esp32")]
            Self::Esp(e) => write!(f, "VFS error: {:?}", e),
        }
    }
}

impl std::error::Error for MountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MountError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Host "mount": ensures the data directory exists.
#[derive(Debug, Clone)]
pub struct DirectoryMount {
    path: PathBuf,
}

impl DirectoryMount {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FilesystemMount for DirectoryMount {
    fn mount(&mut self) -> Result<(), MountError> {
        std::fs::create_dir_all(&self.path)?;
        log::info!("Data directory ready at {:?}", self.path);
        Ok(())
    }
}

/// SPIFFS on the default data partition.
#[cfg(feature = "esp32")]
pub struct SpiffsMount {
    base_path: std::ffi::CString,
    max_files: usize,
    mounted: bool,
}

#[cfg(feature = "esp32")]
impl SpiffsMount {
    /// Default VFS mount point.
    pub const BASE_PATH: &'static str = "/spiffs";

    /// Mount at [`Self::BASE_PATH`] with 5 open files, formatting the
    /// partition if it cannot be mounted.
    pub fn new() -> Result<Self, MountError> {
        Self::at(Self::BASE_PATH, 5)
    }

    pub fn at(base_path: &str, max_files: usize) -> Result<Self, MountError> {
        let base_path = std::ffi::CString::new(base_path)
            .map_err(|_| MountError::InvalidPath(base_path.to_string()))?;
        Ok(Self {
            base_path,
            max_files,
            mounted: false,
        })
    }
}

#[cfg(feature = "esp32")]
impl FilesystemMount for SpiffsMount {
    fn mount(&mut self) -> Result<(), MountError> {
        if self.mounted {
            return Ok(());
        }

        let conf = esp_idf_sys::esp_vfs_spiffs_conf_t {
            base_path: self.base_path.as_ptr(),
            partition_label: std::ptr::null(),
            max_files: self.max_files as _,
            format_if_mount_failed: true,
        };

        // SAFETY: `conf` and the strings it points to outlive the call; the
        // VFS layer copies the base path.
        esp_idf_sys::esp!(unsafe { esp_idf_sys::esp_vfs_spiffs_register(&conf) })
            .map_err(MountError::Esp)?;

        self.mounted = true;
        log::info!("SPIFFS mounted at {:?}", self.base_path);
        Ok(())
    }
}
