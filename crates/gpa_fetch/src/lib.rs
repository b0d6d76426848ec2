//! Downloads GPUPerfAPI release binaries when they are not already present.

pub mod extract;
pub mod source;

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gpa_core::{BackendKind, OperatingSystem};
use tracing::info;

pub use extract::{extract_all, extract_prefixed, has_prefix_ignore_ascii_case};
pub use source::{ArchiveSource, HttpArchiveSource, InMemoryArchive};

pub const GPA_NAME_AND_VERSION: &str = "GPUPerfAPI-4.0.0.39";

pub const DEFAULT_ARCHIVE_URL: &str = "https://github.com/GPUOpen-Tools/gpu_performance_api/releases/download/v4.0-tag/GPUPerfAPI-4.0.0.39.zip";

/// Archive directory holding the platform binaries.
pub const BINARIES_PREFIX: &str = "4_0/bin/";

const FALLBACK_TARGET_BINARY: &str = "GPUPerfAPIVK-x64.dll";

/// Binary whose presence means the collateral is already installed: the
/// Vulkan library for the current OS.
pub fn default_target_binary() -> &'static str {
    gpa_core::library_name(BackendKind::Vulkan, OperatingSystem::current())
        .unwrap_or(FALLBACK_TARGET_BINARY)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The target binary was already present; nothing was downloaded.
    Skipped { existing: PathBuf },
    Extracted { files: Vec<PathBuf> },
}

/// Fetches the release archive from a source and unpacks it.
#[derive(Debug, Clone)]
pub struct CollateralFetcher<S = HttpArchiveSource> {
    source: S,
    target_binary: String,
}

impl Default for CollateralFetcher {
    fn default() -> Self {
        Self::with_source(HttpArchiveSource::default())
    }
}

impl CollateralFetcher {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self::with_source(HttpArchiveSource::new(url))
    }
}

impl<S: ArchiveSource> CollateralFetcher<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            target_binary: default_target_binary().to_string(),
        }
    }

    #[must_use]
    pub fn with_target_binary(mut self, file_name: impl Into<String>) -> Self {
        self.target_binary = file_name.into();
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn target_binary(&self) -> &str {
        &self.target_binary
    }

    fn download(&self) -> Result<Cursor<Vec<u8>>> {
        let bytes = self
            .source
            .fetch()
            .with_context(|| format!("failed to fetch {}", self.source.location()))?;
        Ok(Cursor::new(bytes))
    }

    /// Downloads the archive and extracts all of it under `folder`.
    pub fn download_and_extract_all(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        create_folder(folder)?;
        let archive = self.download()?;
        let files = extract_all(archive, folder)
            .with_context(|| format!("failed to extract {}", self.source.location()))?;
        info!(files = files.len(), folder = %folder.display(), "GPUPerfAPI collateral extracted");
        Ok(files)
    }

    /// Extracts the platform binaries into `folder` unless the target binary
    /// is already there, in which case nothing is fetched.
    pub fn download_and_extract_binaries(&self, folder: &Path) -> Result<FetchOutcome> {
        create_folder(folder)?;

        let existing = folder.join(&self.target_binary);
        if existing.exists() {
            info!(path = %existing.display(), "GPUPerfAPI binaries already present");
            return Ok(FetchOutcome::Skipped { existing });
        }

        let archive = self.download()?;
        let files = extract_prefixed(archive, folder, BINARIES_PREFIX)
            .with_context(|| format!("failed to extract {}", self.source.location()))?;
        info!(files = files.len(), folder = %folder.display(), "GPUPerfAPI binaries extracted");
        Ok(FetchOutcome::Extracted { files })
    }
}

fn create_folder(folder: &Path) -> Result<()> {
    fs::create_dir_all(folder).with_context(|| format!("failed to create {}", folder.display()))
}

/// [`CollateralFetcher::download_and_extract_all`] from the default release.
pub fn download_and_extract_all(folder: &Path) -> Result<Vec<PathBuf>> {
    CollateralFetcher::<HttpArchiveSource>::default().download_and_extract_all(folder)
}

/// [`CollateralFetcher::download_and_extract_binaries`] from the default release.
pub fn download_and_extract_binaries(folder: &Path) -> Result<FetchOutcome> {
    CollateralFetcher::<HttpArchiveSource>::default().download_and_extract_binaries(folder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    struct CountingSource {
        bytes: Vec<u8>,
        fetches: Cell<usize>,
    }

    impl ArchiveSource for CountingSource {
        fn location(&self) -> &str {
            "counting"
        }

        fn fetch(&self) -> Result<Vec<u8>> {
            self.fetches.set(self.fetches.get() + 1);
            Ok(self.bytes.clone())
        }
    }

    struct Unreachable;

    impl ArchiveSource for Unreachable {
        fn location(&self) -> &str {
            "https://example.invalid/gpa.zip"
        }

        fn fetch(&self) -> Result<Vec<u8>> {
            anyhow::bail!("connection refused")
        }
    }

    fn release_zip() -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buffer);
            let options = SimpleFileOptions::default();
            zip.add_directory("4_0/bin/", options).unwrap();
            for name in ["4_0/bin/GPUPerfAPIVK-x64.dll", "4_0/bin/libGPUPerfAPIVK.so"] {
                zip.start_file(name, options).unwrap();
                zip.write_all(name.as_bytes()).unwrap();
            }
            zip.start_file("4_0/docs/index.html", options).unwrap();
            zip.write_all(b"<html/>").unwrap();
            zip.finish().unwrap();
        }
        buffer.into_inner()
    }

    fn counting() -> CountingSource {
        CountingSource {
            bytes: release_zip(),
            fetches: Cell::new(0),
        }
    }

    #[test]
    fn default_target_is_a_vulkan_library() {
        let target = default_target_binary();
        assert!(target == "GPUPerfAPIVK-x64.dll" || target == "libGPUPerfAPIVK.so");
        assert!(DEFAULT_ARCHIVE_URL.ends_with(&format!("{GPA_NAME_AND_VERSION}.zip")));
    }

    #[test]
    fn existing_target_skips_fetch() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("libGPUPerfAPIVK.so"), b"present").unwrap();
        let fetcher = CollateralFetcher::with_source(counting()).with_target_binary("libGPUPerfAPIVK.so");

        let outcome = fetcher.download_and_extract_binaries(dir.path()).unwrap();
        assert_eq!(
            outcome,
            FetchOutcome::Skipped {
                existing: dir.path().join("libGPUPerfAPIVK.so")
            }
        );
        assert_eq!(fetcher.source().fetches.get(), 0);
        assert_eq!(fs::read(dir.path().join("libGPUPerfAPIVK.so")).unwrap(), b"present");
    }

    #[test]
    fn binaries_are_flattened_into_folder() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("gpa");
        let fetcher = CollateralFetcher::with_source(counting()).with_target_binary("libGPUPerfAPIVK.so");

        let FetchOutcome::Extracted { files } = fetcher.download_and_extract_binaries(&folder).unwrap()
        else {
            panic!("expected extraction");
        };
        assert_eq!(files.len(), 2);
        assert!(folder.join("GPUPerfAPIVK-x64.dll").is_file());
        assert!(!folder.join("index.html").exists());
        assert_eq!(fetcher.source().fetches.get(), 1);

        let again = fetcher.download_and_extract_binaries(&folder).unwrap();
        assert!(matches!(again, FetchOutcome::Skipped { .. }));
        assert_eq!(fetcher.source().fetches.get(), 1);
    }

    #[test]
    fn full_extraction_keeps_structure() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = CollateralFetcher::with_source(counting());

        let files = fetcher.download_and_extract_all(dir.path()).unwrap();
        assert_eq!(files.len(), 3);
        assert!(dir.path().join("4_0/docs/index.html").is_file());
    }

    #[test]
    fn fetch_failure_names_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = CollateralFetcher::with_source(Unreachable)
            .download_and_extract_binaries(dir.path())
            .unwrap_err();
        assert!(format!("{err:#}").contains("failed to fetch https://example.invalid/gpa.zip"));
        assert!(format!("{err:#}").contains("connection refused"));
    }
}
