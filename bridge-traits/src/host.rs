//! Host platform identification.
//!
//! The backend resolver only needs two strings: the OS name and the CPU
//! architecture. Putting them behind a trait lets tests (and hosts that
//! already know better, e.g. a managed runtime reporting its own
//! `os.name`/`os.arch`) supply them instead of the compile-time constants.

use crate::platform::PlatformSendSync;

/// Source of host OS and architecture names.
///
/// Values are free-form and matched case-insensitively by substring, so
/// `"Windows 11"`, `"windows"` and `"Mac OS X"` are all acceptable.
pub trait HostPlatform: PlatformSendSync {
    /// Operating system name (e.g. `linux`, `macos`, `Windows 10`)
    fn os_name(&self) -> String;

    /// CPU architecture name (e.g. `x86_64`, `amd64`, `aarch64`, `x86`)
    fn arch(&self) -> String;
}

/// Host description taken from the target the crate was compiled for.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostPlatform for SystemHost {
    fn os_name(&self) -> String {
        std::env::consts::OS.to_string()
    }

    fn arch(&self) -> String {
        std::env::consts::ARCH.to_string()
    }
}

/// Fixed host description, for hosts that report their own platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticHost {
    pub os_name: String,
    pub arch: String,
}

impl StaticHost {
    pub fn new(os_name: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os_name: os_name.into(),
            arch: arch.into(),
        }
    }
}

impl HostPlatform for StaticHost {
    fn os_name(&self) -> String {
        self.os_name.clone()
    }

    fn arch(&self) -> String {
        self.arch.clone()
    }
}
