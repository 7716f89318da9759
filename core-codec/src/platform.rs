//! # Platform Resolver
//!
//! Maps the host OS and CPU architecture to a [`BackendId`] and locates the
//! matching `lagrangecodec` artifact.
//!
//! Host names are reduced to an ([`OsClass`], [`ArchClass`]) pair and looked up
//! in a static table. A pair with no table entry is the single
//! `UnsupportedPlatform` case.

use std::fmt;
use std::path::{Path, PathBuf};

use bridge_traits::HostPlatform;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CodecError, Result};

/// Base name of the native library, without platform prefix or suffix.
pub const LIBRARY_NAME: &str = "lagrangecodec";

/// One prebuilt backend, identified by OS and architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendId {
    WindowsX86,
    WindowsX64,
    MacosX64,
    MacosArm64,
    LinuxX64,
    LinuxArm64,
}

impl BackendId {
    pub const ALL: [BackendId; 6] = [
        BackendId::WindowsX86,
        BackendId::WindowsX64,
        BackendId::MacosX64,
        BackendId::MacosArm64,
        BackendId::LinuxX64,
        BackendId::LinuxArm64,
    ];

    /// Directory holding this backend's artifact, relative to the library root.
    pub fn platform_dir(&self) -> &'static str {
        match self {
            BackendId::WindowsX86 => "windows-x86",
            BackendId::WindowsX64 => "windows-x64",
            BackendId::MacosX64 => "macos-x64",
            BackendId::MacosArm64 => "macos-arm64",
            BackendId::LinuxX64 => "linux-x64",
            BackendId::LinuxArm64 => "linux-arm64",
        }
    }

    pub fn os_class(&self) -> OsClass {
        match self {
            BackendId::WindowsX86 | BackendId::WindowsX64 => OsClass::Windows,
            BackendId::MacosX64 | BackendId::MacosArm64 => OsClass::Macos,
            BackendId::LinuxX64 | BackendId::LinuxArm64 => OsClass::Linux,
        }
    }

    /// Shared-library file name, e.g. `liblagrangecodec.so` or `lagrangecodec.dll`.
    pub fn library_file_name(&self) -> String {
        let (prefix, suffix) = self.os_class().library_affixes();
        format!("{prefix}{LIBRARY_NAME}{suffix}")
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.platform_dir())
    }
}

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsClass {
    Windows,
    Macos,
    Linux,
}

impl OsClass {
    /// Classifies an OS name. Checked in order: `win`, `mac`, `nux`/`nix`.
    pub fn classify(os_name: &str) -> Option<Self> {
        let os = os_name.to_ascii_lowercase();
        if os.contains("win") {
            Some(OsClass::Windows)
        } else if os.contains("mac") {
            Some(OsClass::Macos)
        } else if os.contains("nux") || os.contains("nix") {
            Some(OsClass::Linux)
        } else {
            None
        }
    }

    /// Shared-library `(prefix, suffix)` for this OS family.
    pub fn library_affixes(&self) -> (&'static str, &'static str) {
        match self {
            OsClass::Windows => ("", ".dll"),
            OsClass::Macos => ("lib", ".dylib"),
            OsClass::Linux => ("lib", ".so"),
        }
    }
}

/// CPU architecture family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchClass {
    /// `arm64` or `aarch64`
    Arm64,
    /// `x86_64` or `amd64`
    X64,
    /// Any other name containing `64`
    Generic64,
    /// Everything else
    Generic32,
}

impl ArchClass {
    pub fn classify(arch: &str) -> Self {
        let arch = arch.to_ascii_lowercase();
        if arch.contains("arm64") || arch.contains("aarch64") {
            ArchClass::Arm64
        } else if arch.contains("x86_64") || arch.contains("amd64") {
            ArchClass::X64
        } else if arch.contains("64") {
            ArchClass::Generic64
        } else {
            ArchClass::Generic32
        }
    }
}

/// Every supported (OS, arch) pair. Linux has no generic fallback.
const BACKEND_TABLE: &[(OsClass, ArchClass, BackendId)] = &[
    (OsClass::Windows, ArchClass::Arm64, BackendId::WindowsX64),
    (OsClass::Windows, ArchClass::X64, BackendId::WindowsX64),
    (OsClass::Windows, ArchClass::Generic64, BackendId::WindowsX64),
    (OsClass::Windows, ArchClass::Generic32, BackendId::WindowsX86),
    (OsClass::Macos, ArchClass::Arm64, BackendId::MacosArm64),
    (OsClass::Macos, ArchClass::X64, BackendId::MacosX64),
    (OsClass::Macos, ArchClass::Generic64, BackendId::MacosX64),
    (OsClass::Macos, ArchClass::Generic32, BackendId::MacosX64),
    (OsClass::Linux, ArchClass::Arm64, BackendId::LinuxArm64),
    (OsClass::Linux, ArchClass::X64, BackendId::LinuxX64),
];

/// Resolves the backend for the given host.
pub fn resolve(host: &dyn HostPlatform) -> Result<BackendId> {
    resolve_names(&host.os_name(), &host.arch())
}

/// Resolves the backend for raw OS and architecture names.
pub fn resolve_names(os_name: &str, arch: &str) -> Result<BackendId> {
    let arch_class = ArchClass::classify(arch);
    let id = OsClass::classify(os_name).and_then(|os_class| {
        BACKEND_TABLE
            .iter()
            .find(|(os, a, _)| *os == os_class && *a == arch_class)
            .map(|(_, _, id)| *id)
    });

    match id {
        Some(id) => {
            debug!(os = os_name, arch, backend = %id, "Resolved codec backend");
            Ok(id)
        }
        None => Err(CodecError::UnsupportedPlatform {
            os: os_name.to_string(),
            arch: arch.to_string(),
        }),
    }
}

/// Artifact path for `id` under `library_dir`.
///
/// Pure: no filesystem access.
pub fn artifact_path(id: BackendId, library_dir: &Path) -> PathBuf {
    library_dir
        .join(id.platform_dir())
        .join(id.library_file_name())
}

/// Resolved backend plus the absolute location of its artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendArtifact {
    pub id: BackendId,
    pub path: PathBuf,
}

impl BackendArtifact {
    /// Locates the conventional artifact for `id` under `library_dir`.
    pub fn locate(id: BackendId, library_dir: &Path) -> Result<Self> {
        Self::with_path(id, artifact_path(id, library_dir))
    }

    /// Uses an explicit artifact path for `id`.
    pub fn with_path(id: BackendId, path: impl AsRef<Path>) -> Result<Self> {
        let path = std::path::absolute(path.as_ref()).map_err(|e| {
            CodecError::BackendLoad(format!(
                "cannot resolve artifact path {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Ok(Self { id, path })
    }
}
