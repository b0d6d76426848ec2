//! Resolution of the logical `GPUPerfAPI` library to a loaded handle.

use std::collections::HashMap;
use std::sync::Arc;

use gpa_core::GPA_LIBRARY_NAME;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::bridge::GPA_GET_FUNC_TABLE_ENTRY;
use crate::config::{ResolveRequest, ResolverConfig};
use crate::library::{LibraryHandle, LibraryLoader, NativeLoader};

static GLOBAL: OnceCell<LibraryRegistry> = OnceCell::new();

/// Resolves logical library names and caches the results.
///
/// A successful resolution is permanent for the registry: later lookups
/// return the cached handle even if another registry is built with a
/// different backend. Failures are not cached, so a later lookup retries.
pub struct LibraryRegistry {
    config: ResolverConfig,
    loader: Box<dyn LibraryLoader>,
    cache: RwLock<HashMap<String, Arc<OnceCell<LibraryHandle>>>>,
}

impl LibraryRegistry {
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_loader(config, NativeLoader)
    }

    pub fn with_loader(config: ResolverConfig, loader: impl LibraryLoader + 'static) -> Self {
        Self {
            config,
            loader: Box::new(loader),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Installs the process-wide registry. Only the first call takes effect;
    /// later calls return the registry already installed.
    pub fn install(config: ResolverConfig) -> &'static Self {
        let mut installed = false;
        let registry = GLOBAL.get_or_init(|| {
            installed = true;
            Self::new(config)
        });
        if installed {
            info!(backend = %registry.config.backend, "installed global library registry");
        } else {
            warn!("global library registry already installed; keeping existing configuration");
        }
        registry
    }

    /// The process-wide registry, installed from the environment on first use.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(|| Self::new(ResolverConfig::from_env()))
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Handle for the GPA library, resolving it on first use.
    pub fn resolve_gpa(&self) -> Option<LibraryHandle> {
        self.resolve(GPA_LIBRARY_NAME, Some(GPA_GET_FUNC_TABLE_ENTRY))
    }

    /// Handle for `library_name`, or `None` if it cannot be resolved.
    ///
    /// Concurrent first calls for the same name run one load sequence; the
    /// others wait for it and share its result.
    pub fn resolve(&self, library_name: &str, entry_name: Option<&str>) -> Option<LibraryHandle> {
        if library_name != GPA_LIBRARY_NAME {
            debug!(library_name, "not a GPA library; leaving it to the caller");
            return None;
        }

        let slot = self.slot(library_name);
        if let Some(handle) = slot.get() {
            return Some(handle.clone());
        }

        let request = ResolveRequest {
            library_name,
            entry_name,
            search_dirs: &self.config.search_dirs,
        };
        slot.get_or_try_init(|| self.resolve_uncached(&request).ok_or(()))
            .ok()
            .cloned()
    }

    /// Cached handle for `library_name` without attempting resolution.
    pub fn cached(&self, library_name: &str) -> Option<LibraryHandle> {
        self.cache
            .read()
            .get(library_name)
            .and_then(|slot| slot.get().cloned())
    }

    fn slot(&self, library_name: &str) -> Arc<OnceCell<LibraryHandle>> {
        if let Some(slot) = self.cache.read().get(library_name) {
            return Arc::clone(slot);
        }
        Arc::clone(
            self.cache
                .write()
                .entry(library_name.to_string())
                .or_default(),
        )
    }

    fn resolve_uncached(&self, request: &ResolveRequest<'_>) -> Option<LibraryHandle> {
        if let Some(resolver) = &self.config.override_resolver {
            if let Some(handle) = resolver(request) {
                info!(origin = handle.origin(), "library resolved by override");
                return Some(handle);
            }
            debug!("override resolver declined; falling back to backend mapping");
        }

        let Some(file_name) = self.config.library_file_name() else {
            warn!(
                backend = %self.config.backend,
                os = ?self.config.os,
                "backend has no GPA library on this operating system"
            );
            return None;
        };

        debug!(file_name, backend = %self.config.backend, "loading GPA library");
        let handle = self.loader.load(file_name, request.search_dirs)?;
        info!(origin = handle.origin(), "GPA library resolved");
        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpa_core::{BackendKind, OperatingSystem};
    use parking_lot::Mutex;
    use std::ffi::{CStr, c_void};
    use std::path::PathBuf;
    use std::ptr::NonNull;

    use crate::library::SymbolSource;

    struct Empty;

    impl SymbolSource for Empty {
        fn symbol_address(&self, _name: &CStr) -> Option<NonNull<c_void>> {
            None
        }
    }

    /// Loader that "loads" any file name and records the requests it saw.
    #[derive(Clone, Default)]
    struct RecordingLoader {
        requests: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl LibraryLoader for RecordingLoader {
        fn load(&self, file_name: &str, _search_dirs: &[PathBuf]) -> Option<LibraryHandle> {
            self.requests.lock().push(file_name.to_string());
            (!self.fail).then(|| LibraryHandle::from_source(Empty, file_name))
        }
    }

    fn windows(backend: BackendKind) -> ResolverConfig {
        ResolverConfig::new(backend).with_os(OperatingSystem::Windows)
    }

    #[test]
    fn resolves_backend_file_name() {
        let loader = RecordingLoader::default();
        let registry = LibraryRegistry::with_loader(windows(BackendKind::Vulkan), loader.clone());

        let handle = registry.resolve_gpa().expect("resolved");
        assert_eq!(handle.origin(), "GPUPerfAPIVK-x64.dll");
        assert_eq!(*loader.requests.lock(), vec!["GPUPerfAPIVK-x64.dll"]);
    }

    #[test]
    fn second_resolution_hits_cache() {
        let loader = RecordingLoader::default();
        let registry = LibraryRegistry::with_loader(windows(BackendKind::OpenGL), loader.clone());

        let first = registry.resolve_gpa().unwrap();
        let second = registry.resolve_gpa().unwrap();
        assert!(first.same_library(&second));
        assert_eq!(loader.requests.lock().len(), 1);
        assert!(registry.cached(GPA_LIBRARY_NAME).unwrap().same_library(&first));
    }

    #[test]
    fn unsupported_combination_yields_none_without_loading() {
        let loader = RecordingLoader::default();
        let config = ResolverConfig::new(BackendKind::DirectX12).with_os(OperatingSystem::Linux);
        let registry = LibraryRegistry::with_loader(config, loader.clone());

        assert!(registry.resolve_gpa().is_none());
        assert!(loader.requests.lock().is_empty());
    }

    #[test]
    fn failures_are_retried() {
        let loader = RecordingLoader {
            fail: true,
            ..RecordingLoader::default()
        };
        let registry = LibraryRegistry::with_loader(windows(BackendKind::Vulkan), loader.clone());

        assert!(registry.resolve_gpa().is_none());
        assert!(registry.resolve_gpa().is_none());
        assert_eq!(loader.requests.lock().len(), 2);
        assert!(registry.cached(GPA_LIBRARY_NAME).is_none());
    }

    #[test]
    fn override_wins_and_sees_request() {
        let seen = Arc::new(Mutex::new(None));
        let seen_in_override = Arc::clone(&seen);
        let config = windows(BackendKind::Vulkan)
            .with_search_dir("/opt/gpa")
            .with_override(move |request| {
                *seen_in_override.lock() = Some((
                    request.library_name.to_string(),
                    request.entry_name.map(str::to_string),
                    request.search_dirs.to_vec(),
                ));
                Some(LibraryHandle::from_source(Empty, "override"))
            });
        let loader = RecordingLoader::default();
        let registry = LibraryRegistry::with_loader(config, loader.clone());

        assert_eq!(registry.resolve_gpa().unwrap().origin(), "override");
        assert!(loader.requests.lock().is_empty());
        assert_eq!(
            seen.lock().clone(),
            Some((
                "GPUPerfAPI".to_string(),
                Some("GpaGetFuncTable".to_string()),
                vec![PathBuf::from("/opt/gpa")],
            ))
        );
    }

    #[test]
    fn declining_override_falls_back_to_backend() {
        let config = windows(BackendKind::DirectX11).with_override(|_| None);
        let loader = RecordingLoader::default();
        let registry = LibraryRegistry::with_loader(config, loader.clone());

        assert_eq!(registry.resolve_gpa().unwrap().origin(), "GPUPerfAPIDX11-x64.dll");
    }

    #[test]
    fn foreign_library_names_are_not_resolved() {
        let loader = RecordingLoader::default();
        let registry = LibraryRegistry::with_loader(windows(BackendKind::Vulkan), loader.clone());

        assert!(registry.resolve("vulkan-1", None).is_none());
        assert!(loader.requests.lock().is_empty());
    }

    #[test]
    fn concurrent_first_resolution_loads_once() {
        let loader = RecordingLoader::default();
        let registry = LibraryRegistry::with_loader(windows(BackendKind::Vulkan), loader.clone());

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| assert!(registry.resolve_gpa().is_some()));
            }
        });
        assert_eq!(loader.requests.lock().len(), 1);
    }
}
