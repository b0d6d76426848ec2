//! Resolver configuration.
//!
//! Everything that steers library resolution lives in one [`ResolverConfig`]
//! handed to [`crate::LibraryRegistry`]. Once a registry owns it, it cannot
//! change.

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use gpa_core::{BackendKind, OperatingSystem};
use tracing::warn;

use crate::library::LibraryHandle;

pub const BACKEND_ENV: &str = "GPA_BACKEND";
pub const LIBRARY_PATH_ENV: &str = "GPA_LIBRARY_PATH";

/// What an override strategy is asked to resolve.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    /// Logical library identifier, e.g. `"GPUPerfAPI"`.
    pub library_name: &'a str,
    /// Entry point whose use triggered the resolution, if known.
    pub entry_name: Option<&'a str>,
    pub search_dirs: &'a [PathBuf],
}

/// Caller-supplied resolution strategy consulted before the backend mapping.
pub type OverrideResolver =
    Arc<dyn Fn(&ResolveRequest<'_>) -> Option<LibraryHandle> + Send + Sync>;

#[derive(Clone)]
pub struct ResolverConfig {
    pub backend: BackendKind,
    pub os: OperatingSystem,
    /// User directories searched after the executable's directory.
    pub search_dirs: Vec<PathBuf>,
    pub override_resolver: Option<OverrideResolver>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            os: OperatingSystem::current(),
            search_dirs: Vec::new(),
            override_resolver: None,
        }
    }
}

impl fmt::Debug for ResolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverConfig")
            .field("backend", &self.backend)
            .field("os", &self.os)
            .field("search_dirs", &self.search_dirs)
            .field("override_resolver", &self.override_resolver.is_some())
            .finish()
    }
}

impl ResolverConfig {
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    #[must_use]
    pub fn with_os(mut self, os: OperatingSystem) -> Self {
        self.os = os;
        self
    }

    #[must_use]
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    #[must_use]
    pub fn with_override<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&ResolveRequest<'_>) -> Option<LibraryHandle> + Send + Sync + 'static,
    {
        self.override_resolver = Some(Arc::new(resolver));
        self
    }

    /// Library file name for the configured backend and OS.
    pub fn library_file_name(&self) -> Option<&'static str> {
        gpa_core::library_name(self.backend, self.os)
    }

    /// Reads `GPA_BACKEND` and `GPA_LIBRARY_PATH` from the process
    /// environment on top of the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var_os(key))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(BACKEND_ENV) {
            match raw.to_string_lossy().parse::<BackendKind>() {
                Ok(backend) => config.backend = backend,
                Err(err) => warn!(%err, "ignoring {BACKEND_ENV}"),
            }
        }

        if let Some(paths) = lookup(LIBRARY_PATH_ENV) {
            config.search_dirs.extend(
                env::split_paths(&paths).filter(|dir| !dir.as_os_str().is_empty()),
            );
        }

        config
    }
}

#[cfg(feature = "toml-config")]
mod file {
    use std::fs;
    use std::path::{Path, PathBuf};

    use gpa_core::{BackendKind, OperatingSystem};
    use serde::Deserialize;
    use thiserror::Error;

    use super::ResolverConfig;

    #[derive(Debug, Error)]
    pub enum ConfigError {
        #[error("failed to read resolver config {path}: {source}")]
        Io {
            path: PathBuf,
            source: std::io::Error,
        },
        #[error("invalid resolver config: {0}")]
        Parse(#[from] toml::de::Error),
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct RawConfig {
        backend: Option<BackendKind>,
        os: Option<OperatingSystem>,
        search_dirs: Vec<PathBuf>,
    }

    impl ResolverConfig {
        pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
            let raw: RawConfig = toml::from_str(source)?;
            let mut config = Self::default();
            if let Some(backend) = raw.backend {
                config.backend = backend;
            }
            if let Some(os) = raw.os {
                config.os = os;
            }
            config.search_dirs = raw.search_dirs;
            Ok(config)
        }

        pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
            let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml_str(&source)
        }
    }
}

#[cfg(feature = "toml-config")]
pub use file::ConfigError;
