//! # Codec Configuration Module
//!
//! Provides configuration management for the codec core.
//!
//! ## Overview
//!
//! Configuration is split in two:
//!
//! - [`CodecSettings`] holds plain values (where the native libraries live,
//!   how backend failures are reported, input limits). It is serializable and
//!   can be read from JSON or from `LAGRANGE_CODEC_*` environment variables.
//! - [`CodecConfig`] combines settings with the bridge implementations the
//!   core needs at runtime (`HostPlatform`, `BackendLoader`). Use
//!   [`CodecConfigBuilder`] to construct it; the builder fails fast when a
//!   required bridge is missing.
//!
//! ## Required Dependencies
//!
//! - `BackendLoader` - Opens the codec artifact (desktop default: `NativeLibraryLoader`)
//!
//! ## Optional Dependencies (with defaults)
//!
//! - `HostPlatform` - OS/arch source (default: `SystemHost`)
//!
//! When the `desktop-shims` feature is enabled, the desktop `BackendLoader`
//! is injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CodecConfig, PartialResultPolicy};
//!
//! let config = CodecConfig::builder()
//!     .library_dir("/opt/app/lib")
//!     .partial_results(PartialResultPolicy::Preserve)
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Environment
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `LAGRANGE_CODEC_LIBRARY_DIR` | Root directory containing `<platform-dir>/` folders |
//! | `LAGRANGE_CODEC_LIBRARY_PATH` | Exact library path; host must still be supported |
//! | `LAGRANGE_CODEC_PARTIAL_RESULTS` | `discard` or `preserve` |
//! | `LAGRANGE_CODEC_MAX_INPUT_BYTES` | Reject inputs larger than this |

use crate::error::{Error, Result};
use bridge_traits::{BackendLoader, HostPlatform, SystemHost};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const ENV_LIBRARY_DIR: &str = "LAGRANGE_CODEC_LIBRARY_DIR";
pub const ENV_LIBRARY_PATH: &str = "LAGRANGE_CODEC_LIBRARY_PATH";
pub const ENV_PARTIAL_RESULTS: &str = "LAGRANGE_CODEC_PARTIAL_RESULTS";
pub const ENV_MAX_INPUT_BYTES: &str = "LAGRANGE_CODEC_MAX_INPUT_BYTES";

/// What to do with chunks already emitted when the backend later fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartialResultPolicy {
    /// Drop everything; a failed invocation yields no output.
    #[default]
    Discard,
    /// Attach the chunks received before the failure to the error.
    Preserve,
}

impl std::str::FromStr for PartialResultPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discard" => Ok(Self::Discard),
            "preserve" => Ok(Self::Preserve),
            other => Err(Error::Config(format!(
                "Unknown partial result policy '{}': expected 'discard' or 'preserve'",
                other
            ))),
        }
    }
}

/// Plain codec settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecSettings {
    /// Root directory holding one sub-directory per platform
    /// (`linux-x64/`, `macos-arm64/`, ...).
    ///
    /// Relative paths are resolved against the current directory when the
    /// backend is first loaded.
    ///
    /// Default: `./lib`.
    #[serde(default = "default_library_dir")]
    pub library_dir: PathBuf,

    /// Exact path to the codec library. When set, platform resolution still
    /// runs (an unsupported host is still fatal) but this path is loaded.
    #[serde(default)]
    pub library_path: Option<PathBuf>,

    /// Handling of chunks emitted before a backend error.
    ///
    /// Default: `Discard`.
    #[serde(default)]
    pub partial_results: PartialResultPolicy,

    /// Largest accepted input buffer in bytes. `None` only applies the
    /// native `int` limit.
    #[serde(default)]
    pub max_input_bytes: Option<usize>,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            library_dir: default_library_dir(),
            library_path: None,
            partial_results: PartialResultPolicy::default(),
            max_input_bytes: None,
        }
    }
}

fn default_library_dir() -> PathBuf {
    PathBuf::from("./lib")
}

impl CodecSettings {
    /// Parse settings from a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid codec settings JSON: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from `LAGRANGE_CODEC_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(dir) = lookup(ENV_LIBRARY_DIR).filter(|v| !v.is_empty()) {
            settings.library_dir = PathBuf::from(dir);
        }

        if let Some(path) = lookup(ENV_LIBRARY_PATH).filter(|v| !v.is_empty()) {
            settings.library_path = Some(PathBuf::from(path));
        }

        if let Some(policy) = lookup(ENV_PARTIAL_RESULTS) {
            settings.partial_results = policy.parse()?;
        }

        if let Some(max) = lookup(ENV_MAX_INPUT_BYTES) {
            let value = max.trim().parse::<usize>().map_err(|e| {
                Error::Config(format!("{} must be a byte count: {}", ENV_MAX_INPUT_BYTES, e))
            })?;
            settings.max_input_bytes = Some(value);
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Validates the settings.
    pub fn validate(&self) -> Result<()> {
        if self.library_dir.as_os_str().is_empty() {
            return Err(Error::Config("Library directory cannot be empty".to_string()));
        }

        if let Some(path) = &self.library_path {
            if path.as_os_str().is_empty() {
                return Err(Error::Config("Library path cannot be empty".to_string()));
            }
        }

        if self.max_input_bytes == Some(0) {
            return Err(Error::Config(
                "max_input_bytes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Codec configuration: settings plus runtime bridges.
#[derive(Clone)]
pub struct CodecConfig {
    pub settings: CodecSettings,

    /// Host OS/arch source
    pub host: Arc<dyn HostPlatform>,

    /// Codec artifact loader (required)
    pub loader: Arc<dyn BackendLoader>,
}

impl std::fmt::Debug for CodecConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecConfig")
            .field("settings", &self.settings)
            .field("host", &"HostPlatform { ... }")
            .field("loader", &"BackendLoader { ... }")
            .finish()
    }
}

impl CodecConfig {
    /// Creates a new builder for constructing a `CodecConfig`.
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.settings.validate()
    }
}

/// Builder for [`CodecConfig`].
#[derive(Default)]
pub struct CodecConfigBuilder {
    settings: CodecSettings,
    host: Option<Arc<dyn HostPlatform>>,
    loader: Option<Arc<dyn BackendLoader>>,
}

impl CodecConfigBuilder {
    /// Replace all plain settings at once.
    pub fn settings(mut self, settings: CodecSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the platform library root directory.
    pub fn library_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.settings.library_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Sets an exact library path.
    pub fn library_path(mut self, path: impl AsRef<Path>) -> Self {
        self.settings.library_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the partial result policy.
    pub fn partial_results(mut self, policy: PartialResultPolicy) -> Self {
        self.settings.partial_results = policy;
        self
    }

    /// Sets the input size cap in bytes.
    pub fn max_input_bytes(mut self, max: usize) -> Self {
        self.settings.max_input_bytes = Some(max);
        self
    }

    /// Sets the host platform source.
    pub fn host(mut self, host: Arc<dyn HostPlatform>) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the backend loader.
    pub fn loader(mut self, loader: Arc<dyn BackendLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Builds the configuration, injecting defaults where available.
    ///
    /// # Errors
    ///
    /// - `Error::Config` if the settings are invalid
    /// - `Error::CapabilityMissing` if no loader was provided and the
    ///   `desktop-shims` feature is disabled
    pub fn build(self) -> Result<CodecConfig> {
        let loader = match self.loader {
            Some(loader) => loader,
            None => provide_default_loader()?,
        };

        let config = CodecConfig {
            settings: self.settings,
            host: self.host.unwrap_or_else(|| Arc::new(SystemHost)),
            loader,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_loader() -> Result<Arc<dyn BackendLoader>> {
    use bridge_desktop::NativeLibraryLoader;

    let loader: Arc<dyn BackendLoader> = Arc::new(NativeLibraryLoader::new());
    Ok(loader)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_loader() -> Result<Arc<dyn BackendLoader>> {
    Err(Error::CapabilityMissing {
        capability: "BackendLoader".to_string(),
        message: "A BackendLoader implementation is required to open the codec library. \
                 Desktop: enable the 'desktop-shims' feature to use NativeLibraryLoader. \
                 Other hosts: inject a loader for the platform's codec backend."
            .to_string(),
    })
}
