//! Loaded native libraries and the loader that finds them on disk.

use std::env;
use std::ffi::{CStr, c_void};
use std::fmt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::Arc;

use libloading::Library;
use tracing::{debug, warn};

/// Anything exported symbols can be looked up in.
///
/// Implemented for [`libloading::Library`]; tests and embedders can supply
/// in-process tables instead.
pub trait SymbolSource: Send + Sync {
    /// Address of the exported symbol `name` (exact, case-sensitive match).
    fn symbol_address(&self, name: &CStr) -> Option<NonNull<c_void>>;
}

impl SymbolSource for Library {
    fn symbol_address(&self, name: &CStr) -> Option<NonNull<c_void>> {
        // SAFETY: the symbol is read as a plain address; whoever calls through
        // it is responsible for using the right signature.
        let symbol = unsafe { self.get::<*mut c_void>(name.to_bytes_with_nul()) }.ok()?;
        NonNull::new(*symbol)
    }
}

/// Shared handle to a loaded native library.
///
/// The library stays loaded while any clone is alive. Resolved handles are
/// held by the registry cache, so in practice they live as long as the
/// registry (the process-wide registry never drops).
#[derive(Clone)]
pub struct LibraryHandle {
    source: Arc<dyn SymbolSource>,
    origin: Arc<str>,
}

impl LibraryHandle {
    pub fn from_library(library: Library, origin: impl Into<String>) -> Self {
        Self::from_source(library, origin)
    }

    pub fn from_source(source: impl SymbolSource + 'static, origin: impl Into<String>) -> Self {
        Self {
            source: Arc::new(source),
            origin: Arc::from(origin.into()),
        }
    }

    /// Path or label the library was loaded from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn symbol_address(&self, name: &CStr) -> Option<NonNull<c_void>> {
        self.source.symbol_address(name)
    }

    /// Whether both handles refer to the same loaded library instance.
    pub fn same_library(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
    }
}

impl fmt::Debug for LibraryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryHandle")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Strategy that turns a library file name into a loaded handle.
pub trait LibraryLoader: Send + Sync {
    /// Loads `file_name`, returning `None` when no candidate could be loaded.
    fn load(&self, file_name: &str, search_dirs: &[PathBuf]) -> Option<LibraryHandle>;
}

/// Loads libraries from disk with `libloading`.
///
/// Candidates are tried in order: the executable's directory, each configured
/// search directory, then the bare file name through the platform's default
/// search. Dependencies of a library loaded from a directory are resolved
/// from that same directory first, which on Windows requires an absolute
/// path, so directory candidates are made absolute against the working
/// directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeLoader;

impl NativeLoader {
    pub fn candidates(file_name: &str, search_dirs: &[PathBuf]) -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(search_dirs.len() + 2);
        if let Some(app_dir) = application_dir() {
            candidates.push(app_dir.join(file_name));
        }
        candidates.extend(search_dirs.iter().map(|dir| absolute(dir.join(file_name))));
        candidates.push(PathBuf::from(file_name));
        candidates
    }
}

impl LibraryLoader for NativeLoader {
    fn load(&self, file_name: &str, search_dirs: &[PathBuf]) -> Option<LibraryHandle> {
        for candidate in Self::candidates(file_name, search_dirs) {
            let in_directory = candidate.parent().is_some_and(|p| !p.as_os_str().is_empty());
            if in_directory && !candidate.is_file() {
                debug!(candidate = %candidate.display(), "library candidate not present");
                continue;
            }

            match open_library(&candidate, in_directory) {
                Ok(library) => {
                    debug!(path = %candidate.display(), "library loaded");
                    return Some(LibraryHandle::from_library(
                        library,
                        candidate.display().to_string(),
                    ));
                }
                Err(err) => {
                    warn!(path = %candidate.display(), error = %err, "failed to load library");
                }
            }
        }
        None
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}

fn application_dir() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    exe.parent().map(Path::to_path_buf)
}

#[cfg(windows)]
fn open_library(path: &Path, in_directory: bool) -> Result<Library, libloading::Error> {
    use libloading::os::windows::{
        LOAD_LIBRARY_SEARCH_DEFAULT_DIRS, LOAD_LIBRARY_SEARCH_DLL_LOAD_DIR,
    };

    // SAFETY: GPA libraries run no initialisers with preconditions we could violate.
    unsafe {
        if in_directory {
            libloading::os::windows::Library::load_with_flags(
                path,
                LOAD_LIBRARY_SEARCH_DLL_LOAD_DIR | LOAD_LIBRARY_SEARCH_DEFAULT_DIRS,
            )
            .map(Library::from)
        } else {
            Library::new(path)
        }
    }
}

#[cfg(unix)]
fn open_library(path: &Path, _in_directory: bool) -> Result<Library, libloading::Error> {
    use libloading::os::unix::{RTLD_LOCAL, RTLD_NOW};

    // SAFETY: GPA libraries run no initialisers with preconditions we could violate.
    unsafe {
        libloading::os::unix::Library::open(Some(path), RTLD_NOW | RTLD_LOCAL).map(Library::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoSymbols;

    impl SymbolSource for NoSymbols {
        fn symbol_address(&self, _name: &CStr) -> Option<NonNull<c_void>> {
            None
        }
    }

    #[test]
    fn candidates_follow_search_order() {
        let dirs = vec![PathBuf::from("/opt/gpa"), PathBuf::from("/home/me/gpa")];
        let candidates = NativeLoader::candidates("libGPUPerfAPIVK.so", &dirs);

        let app_dir = application_dir().expect("test binary has a directory");
        assert_eq!(candidates[0], app_dir.join("libGPUPerfAPIVK.so"));
        assert_eq!(candidates[1], absolute(PathBuf::from("/opt/gpa/libGPUPerfAPIVK.so")));
        assert_eq!(candidates[2], absolute(PathBuf::from("/home/me/gpa/libGPUPerfAPIVK.so")));
        assert_eq!(candidates[3], PathBuf::from("libGPUPerfAPIVK.so"));
    }

    #[test]
    fn relative_search_dirs_become_absolute() {
        let dirs = vec![PathBuf::from("third_party/gpa")];
        let candidates = NativeLoader::candidates("GPUPerfAPIVK-x64.dll", &dirs);
        let cwd = env::current_dir().unwrap();

        assert_eq!(candidates[1], cwd.join("third_party/gpa/GPUPerfAPIVK-x64.dll"));
        let (bare, in_dirs) = candidates.split_last().unwrap();
        assert!(in_dirs.iter().all(|candidate| candidate.is_absolute()));
        assert_eq!(bare, &PathBuf::from("GPUPerfAPIVK-x64.dll"));
    }

    #[test]
    fn missing_library_yields_none() {
        let dirs = vec![std::env::temp_dir().join("gpa-loader-missing-dir")];
        assert!(NativeLoader.load("libDefinitelyNotGPUPerfAPI.so", &dirs).is_none());
    }

    #[test]
    fn handles_compare_by_instance() {
        let first = LibraryHandle::from_source(NoSymbols, "first");
        let clone = first.clone();
        let second = LibraryHandle::from_source(NoSymbols, "first");

        assert!(first.same_library(&clone));
        assert!(!first.same_library(&second));
        assert_eq!(clone.origin(), "first");
        assert!(first.symbol_address(c"GpaGetFuncTable").is_none());
    }
}
