//! Extraction of the dispatch table through `GpaGetFuncTable`.
//!
//! The functions here return raw [`GpaStatus`] values; turning them into
//! errors is left to the caller.

use std::ffi::{CStr, c_void};
use std::ptr;

use gpa_core::{GPA_FUNCTION_TABLE_MAJOR_VERSION_NUMBER, GpaStatus, GpaVersion};
use tracing::{debug, info, warn};

use crate::library::LibraryHandle;
use crate::resolver::LibraryRegistry;
use crate::table::GpaFunctionTable;

/// The one symbol looked up by name in a GPA library.
pub const GPA_GET_FUNC_TABLE_SYMBOL: &CStr = c"GpaGetFuncTable";
pub(crate) const GPA_GET_FUNC_TABLE_ENTRY: &str = "GpaGetFuncTable";

/// Signature of the exported `GpaGetFuncTable`.
pub type GpaGetFuncTableFn = unsafe extern "C" fn(*mut c_void) -> GpaStatus;

/// Fills `table` from `library`'s `GpaGetFuncTable`.
///
/// Returns `kGpaStatusErrorLibLoadFailed` and resets `table` to its default
/// when the symbol is missing. Otherwise calls it once and returns its status
/// unmodified; on a negative status `table` is reset so a partially written
/// table is never observable.
///
/// # Safety
///
/// `library` must be a GPA library whose `GpaGetFuncTable` has the
/// [`GpaGetFuncTableFn`] signature and fills a table of this crate's layout.
/// Check the version with `GpaGetVersion` before calling any other slot.
pub unsafe fn load_function_table(library: &LibraryHandle, table: &mut GpaFunctionTable) -> GpaStatus {
    let Some(address) = library.symbol_address(GPA_GET_FUNC_TABLE_SYMBOL) else {
        warn!(origin = library.origin(), "GpaGetFuncTable not exported");
        *table = GpaFunctionTable::default();
        return GpaStatus::ERROR_LIB_LOAD_FAILED;
    };

    // SAFETY: the exported symbol has the `GpaGetFuncTableFn` signature per
    // this function's contract.
    let get_func_table =
        unsafe { std::mem::transmute::<*mut c_void, GpaGetFuncTableFn>(address.as_ptr()) };
    // SAFETY: `table` is a valid, exclusive `GpaFunctionTable` for the call.
    let status = unsafe { get_func_table(ptr::from_mut(table).cast()) };

    if status.is_error() {
        warn!(origin = library.origin(), %status, "GpaGetFuncTable failed");
        *table = GpaFunctionTable::default();
    } else {
        debug!(
            origin = library.origin(),
            populated = table.populated_slots(),
            missing = ?table.missing_entry_points(),
            "function table extracted"
        );
    }
    status
}

/// Calls the table's `GpaGetVersion`.
///
/// # Safety
///
/// `table` must come from a successful [`load_function_table`] on a library
/// that is still loaded.
pub unsafe fn query_version(table: &GpaFunctionTable) -> (GpaStatus, Option<GpaVersion>) {
    let Some(get_version) = table.gpa_get_version else {
        return (GpaStatus::ERROR_LIB_LOAD_FAILED, None);
    };
    let mut version = GpaVersion::default();
    // SAFETY: the slot was filled by `GpaGetFuncTable`; all out-pointers are valid.
    let status = unsafe {
        get_version(
            &mut version.major,
            &mut version.minor,
            &mut version.build,
            &mut version.update,
        )
    };
    (status, status.is_ok().then_some(version))
}

/// Where a [`TableLoader`] is in the load sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    NotLoaded,
    Loaded,
    /// Table filled but its version not yet checked; only `GpaGetVersion` may be called.
    TableExtracted,
    Usable,
    VersionMismatch,
    LoadFailed,
    ExtractionFailed,
}

impl LoadStage {
    /// Failure stages have no way forward; start over with a new loader.
    pub fn is_failed(self) -> bool {
        matches!(
            self,
            Self::VersionMismatch | Self::LoadFailed | Self::ExtractionFailed
        )
    }
}

/// Walks the load → extract → version-check sequence one step at a time.
///
/// Each step returns the raw status; a step taken out of order returns
/// `kGpaStatusErrorLibLoadFailed` and leaves the stage unchanged.
#[derive(Debug)]
pub struct TableLoader {
    stage: LoadStage,
    library: Option<LibraryHandle>,
    table: GpaFunctionTable,
    version: Option<GpaVersion>,
}

impl Default for TableLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TableLoader {
    pub fn new() -> Self {
        Self {
            stage: LoadStage::NotLoaded,
            library: None,
            table: GpaFunctionTable::default(),
            version: None,
        }
    }

    pub fn stage(&self) -> LoadStage {
        self.stage
    }

    pub fn version(&self) -> Option<GpaVersion> {
        self.version
    }

    /// Resolves the GPA library through `registry`.
    pub fn load(&mut self, registry: &LibraryRegistry) -> GpaStatus {
        if self.stage != LoadStage::NotLoaded {
            return GpaStatus::ERROR_LIB_LOAD_FAILED;
        }
        if let Some(library) = registry.resolve_gpa() {
            self.attach(library)
        } else {
            self.stage = LoadStage::LoadFailed;
            GpaStatus::ERROR_LIB_LOAD_FAILED
        }
    }

    /// Uses an already loaded library.
    pub fn attach(&mut self, library: LibraryHandle) -> GpaStatus {
        if self.stage != LoadStage::NotLoaded {
            return GpaStatus::ERROR_LIB_LOAD_FAILED;
        }
        self.library = Some(library);
        self.stage = LoadStage::Loaded;
        GpaStatus::OK
    }

    /// Extracts the function table.
    ///
    /// # Safety
    ///
    /// See [`load_function_table`].
    pub unsafe fn extract(&mut self) -> GpaStatus {
        let (LoadStage::Loaded, Some(library)) = (self.stage, &self.library) else {
            return GpaStatus::ERROR_LIB_LOAD_FAILED;
        };
        // SAFETY: forwarded from this function's contract.
        let status = unsafe { load_function_table(library, &mut self.table) };
        self.stage = if status.is_ok() {
            LoadStage::TableExtracted
        } else {
            LoadStage::ExtractionFailed
        };
        status
    }

    /// Queries `GpaGetVersion` and compares its major version with
    /// [`GPA_FUNCTION_TABLE_MAJOR_VERSION_NUMBER`].
    pub fn check_version(&mut self) -> GpaStatus {
        if self.stage != LoadStage::TableExtracted {
            return GpaStatus::ERROR_LIB_LOAD_FAILED;
        }
        // SAFETY: the table was extracted from `self.library`, which is still held.
        let (status, version) = unsafe { query_version(&self.table) };
        let Some(version) = version else {
            self.stage = LoadStage::VersionMismatch;
            return if status.is_error() {
                status
            } else {
                GpaStatus::ERROR_LIB_LOAD_FAILED
            };
        };

        self.version = Some(version);
        if version.major == GPA_FUNCTION_TABLE_MAJOR_VERSION_NUMBER {
            info!(%version, "GPA function table ready");
            self.stage = LoadStage::Usable;
            GpaStatus::OK
        } else {
            warn!(
                %version,
                expected = GPA_FUNCTION_TABLE_MAJOR_VERSION_NUMBER,
                "GPA major version mismatch; refusing to use the table"
            );
            self.stage = LoadStage::VersionMismatch;
            GpaStatus::ERROR_LIB_LOAD_MAJOR_VERSION_MISMATCH
        }
    }

    /// Library, table and version once the sequence reached
    /// [`LoadStage::Usable`].
    pub fn into_parts(self) -> Option<(LibraryHandle, GpaFunctionTable, GpaVersion)> {
        match (self.stage, self.library, self.version) {
            (LoadStage::Usable, Some(library), Some(version)) => Some((library, self.table, version)),
            _ => None,
        }
    }
}
