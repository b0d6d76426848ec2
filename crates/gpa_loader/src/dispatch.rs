//! `Gpa`: status-guarded calls through an extracted function table.
//!
//! Every accessor checks its slot, calls it, and runs the returned status
//! through [`GpaStatus::check_with`]. Out-parameters are only read back when
//! the status allows it.

use std::ffi::{CString, c_void};
use std::ptr;

use gpa_core::{
    GpaCommandListId, GpaCommandListType, GpaContextId, GpaDataType, GpaInitializeFlags,
    GpaLoggingType, GpaOpenContextFlags, GpaSessionId, GpaSessionSampleType, GpaSpmData,
    GpaStatus, GpaUsageType, GpaVersion, GpaVkContextOpenInfo, OutBuffer, Result, query_text,
    read_borrowed_text,
};
use tracing::debug;

use crate::bridge::TableLoader;
use crate::library::LibraryHandle;
use crate::logging::forward_to_tracing;
use crate::resolver::LibraryRegistry;
use crate::table::GpaFunctionTable;

/// A loaded, version-checked GPA library.
///
/// Holds its [`LibraryHandle`] so the library outlives every slot in the
/// table. Handles passed to accessors are opaque; validating them is the
/// native library's job.
#[derive(Debug, Clone)]
pub struct Gpa {
    library: LibraryHandle,
    table: GpaFunctionTable,
    version: GpaVersion,
}

fn slot<F>(slot: Option<F>, entry_point: &str) -> Result<F> {
    slot.ok_or_else(|| {
        GpaStatus::ERROR_LIB_LOAD_FAILED.fail_with(format!("{entry_point} is not exported"))
    })
}

fn c_string(text: &str, what: &str) -> Result<CString> {
    CString::new(text).map_err(|_| {
        GpaStatus::ERROR_INVALID_PARAMETER.fail_with(format!("{what} contains a NUL byte"))
    })
}

fn owned_text(status: GpaStatus, text: Option<String>, context: &str) -> Result<String> {
    status.check_with(context)?;
    text.ok_or_else(|| GpaStatus::ERROR_NULL_POINTER.fail_with(format!("{context}: no text returned")))
}

/// `kGpaStatusOk` means complete, `kGpaStatusResultNotReady` means not yet.
fn completion(status: GpaStatus, context: &str) -> Result<bool> {
    if status == GpaStatus::RESULT_NOT_READY {
        return Ok(false);
    }
    status.check_with(context)?;
    Ok(true)
}

impl Gpa {
    /// Resolves the GPA library through `registry` and prepares its table.
    pub fn load(registry: &LibraryRegistry) -> Result<Self> {
        let mut loader = TableLoader::new();
        loader
            .load(registry)
            .check_with("GPUPerfAPI library could not be resolved")?;
        // SAFETY: the registry only resolves the GPUPerfAPI identifier, so the
        // handle is a GPA build (or whatever the override vouched for).
        unsafe { Self::finish(loader) }
    }

    /// Like [`Gpa::load`] for a library the caller loaded.
    ///
    /// # Safety
    ///
    /// `library` must be a GPUPerfAPI library; see
    /// [`crate::load_function_table`].
    pub unsafe fn from_handle(library: LibraryHandle) -> Result<Self> {
        let mut loader = TableLoader::new();
        loader.attach(library).check()?;
        // SAFETY: forwarded from this function's contract.
        unsafe { Self::finish(loader) }
    }

    unsafe fn finish(mut loader: TableLoader) -> Result<Self> {
        // SAFETY: forwarded from the callers' contracts.
        unsafe { loader.extract() }.check_with("failed to extract the GPA function table")?;
        loader
            .check_version()
            .check_with("unsupported GPUPerfAPI version")?;
        let (library, table, version) = loader.into_parts().ok_or_else(|| {
            GpaStatus::ERROR_LIB_LOAD_FAILED.fail_with("GPA function table is not usable")
        })?;
        debug!(origin = library.origin(), %version, "GPA dispatcher ready");
        Ok(Self {
            library,
            table,
            version,
        })
    }

    pub fn version(&self) -> GpaVersion {
        self.version
    }

    pub fn library(&self) -> &LibraryHandle {
        &self.library
    }

    pub fn table(&self) -> &GpaFunctionTable {
        &self.table
    }

    /// Routes native log messages of the given kinds into `tracing`.
    pub fn forward_native_logging(&self, kinds: GpaLoggingType) -> Result<()> {
        let register = slot(self.table.gpa_register_logging_callback, "GpaRegisterLoggingCallback")?;
        // SAFETY: the callback is `extern "C"` and lives for the whole program.
        unsafe { register(kinds, Some(forward_to_tracing)) }
            .check_with("failed to register logging callback")
    }

    pub fn initialize(&self, flags: GpaInitializeFlags) -> Result<()> {
        let initialize = slot(self.table.gpa_initialize, "GpaInitialize")?;
        // SAFETY: plain value argument.
        unsafe { initialize(flags) }.check_with("failed to initialize GPA")
    }

    pub fn destroy(&self) -> Result<()> {
        let destroy = slot(self.table.gpa_destroy, "GpaDestroy")?;
        // SAFETY: no arguments.
        unsafe { destroy() }.check_with("failed to destroy GPA")
    }

    /// Opens a profiling context on an API-specific device object.
    ///
    /// # Safety
    ///
    /// `api_context` must be the object the active backend expects (for
    /// Vulkan, a [`GpaVkContextOpenInfo`]; for DirectX, the device) and stay
    /// valid until the context is closed.
    pub unsafe fn open_context(
        &self,
        api_context: *mut c_void,
        flags: GpaOpenContextFlags,
    ) -> Result<GpaContextId> {
        let open = slot(self.table.gpa_open_context, "GpaOpenContext")?;
        let mut context = GpaContextId::NULL;
        // SAFETY: `api_context` is valid per this function's contract.
        unsafe { open(api_context, flags, &mut context) }.check_with("failed to open context")?;
        Ok(context)
    }

    /// Opens a context on Vulkan handles.
    ///
    /// # Safety
    ///
    /// The three handles in `info` must be live Vulkan objects created with
    /// the extensions in [`gpa_core::ExtensionList`] enabled.
    pub unsafe fn open_vk_context(
        &self,
        info: &GpaVkContextOpenInfo,
        flags: GpaOpenContextFlags,
    ) -> Result<GpaContextId> {
        // SAFETY: GPA only reads the payload; handle validity is the caller's.
        unsafe { self.open_context(ptr::from_ref(info).cast_mut().cast(), flags) }
    }

    pub fn close_context(&self, context: GpaContextId) -> Result<()> {
        let close = slot(self.table.gpa_close_context, "GpaCloseContext")?;
        // SAFETY: opaque handle passed through.
        unsafe { close(context) }.check_with("failed to close context")
    }

    pub fn device_name(&self, context: GpaContextId) -> Result<String> {
        let get = slot(self.table.gpa_get_device_name, "GpaGetDeviceName")?;
        // SAFETY: GPA stores either nothing or a NUL-terminated name it owns.
        let (status, name) = unsafe { query_text(|out| get(context, out)) };
        owned_text(status, name, "failed to get device name")
    }

    /// `(device id, revision id)` of the context's GPU.
    pub fn device_and_revision_id(&self, context: GpaContextId) -> Result<(u32, u32)> {
        let get = slot(self.table.gpa_get_device_and_revision_id, "GpaGetDeviceAndRevisionId")?;
        let (mut device, mut revision) = (0, 0);
        // SAFETY: both out-pointers are valid locals.
        unsafe { get(context, &mut device, &mut revision) }
            .check_with("failed to get device and revision id")?;
        Ok((device, revision))
    }

    pub fn create_session(
        &self,
        context: GpaContextId,
        sample_type: GpaSessionSampleType,
    ) -> Result<GpaSessionId> {
        let create = slot(self.table.gpa_create_session, "GpaCreateSession")?;
        let mut session = GpaSessionId::NULL;
        // SAFETY: out-pointer is a valid local.
        unsafe { create(context, sample_type, &mut session) }
            .check_with("failed to create session")?;
        Ok(session)
    }

    pub fn delete_session(&self, session: GpaSessionId) -> Result<()> {
        let delete = slot(self.table.gpa_delete_session, "GpaDeleteSession")?;
        // SAFETY: opaque handle passed through.
        unsafe { delete(session) }.check_with("failed to delete session")
    }

    pub fn begin_session(&self, session: GpaSessionId) -> Result<()> {
        let begin = slot(self.table.gpa_begin_session, "GpaBeginSession")?;
        // SAFETY: opaque handle passed through.
        unsafe { begin(session) }.check_with("failed to begin session")
    }

    pub fn end_session(&self, session: GpaSessionId) -> Result<()> {
        let end = slot(self.table.gpa_end_session, "GpaEndSession")?;
        // SAFETY: opaque handle passed through.
        unsafe { end(session) }.check_with("failed to end session")
    }

    pub fn counter_count(&self, session: GpaSessionId) -> Result<u32> {
        let get = slot(self.table.gpa_get_num_counters, "GpaGetNumCounters")?;
        let mut count = 0;
        // SAFETY: out-pointer is a valid local.
        unsafe { get(session, &mut count) }.check_with("failed to get counter count")?;
        Ok(count)
    }

    pub fn counter_name(&self, session: GpaSessionId, index: u32) -> Result<String> {
        let get = slot(self.table.gpa_get_counter_name, "GpaGetCounterName")?;
        // SAFETY: GPA stores either nothing or a NUL-terminated name it owns.
        let (status, name) = unsafe { query_text(|out| get(session, index, out)) };
        owned_text(status, name, "failed to get counter name")
    }

    pub fn counter_group(&self, session: GpaSessionId, index: u32) -> Result<String> {
        let get = slot(self.table.gpa_get_counter_group, "GpaGetCounterGroup")?;
        // SAFETY: as for `counter_name`.
        let (status, group) = unsafe { query_text(|out| get(session, index, out)) };
        owned_text(status, group, "failed to get counter group")
    }

    pub fn counter_description(&self, session: GpaSessionId, index: u32) -> Result<String> {
        let get = slot(self.table.gpa_get_counter_description, "GpaGetCounterDescription")?;
        // SAFETY: as for `counter_name`.
        let (status, description) = unsafe { query_text(|out| get(session, index, out)) };
        owned_text(status, description, "failed to get counter description")
    }

    pub fn counter_index(&self, session: GpaSessionId, name: &str) -> Result<u32> {
        let get = slot(self.table.gpa_get_counter_index, "GpaGetCounterIndex")?;
        let name = c_string(name, "counter name")?;
        let mut index = 0;
        // SAFETY: `name` is NUL-terminated and outlives the call.
        unsafe { get(session, name.as_ptr(), &mut index) }
            .check_with("failed to get counter index")?;
        Ok(index)
    }

    pub fn data_type_as_str(&self, data_type: GpaDataType) -> Result<String> {
        let get = slot(self.table.gpa_get_data_type_as_str, "GpaGetDataTypeAsStr")?;
        // SAFETY: GPA returns a static string.
        let (status, text) = unsafe { query_text(|out| get(data_type, out)) };
        owned_text(status, text, "failed to get data type string")
    }

    pub fn usage_type_as_str(&self, usage_type: GpaUsageType) -> Result<String> {
        let get = slot(self.table.gpa_get_usage_type_as_str, "GpaGetUsageTypeAsStr")?;
        // SAFETY: GPA returns a static string.
        let (status, text) = unsafe { query_text(|out| get(usage_type, out)) };
        owned_text(status, text, "failed to get usage type string")
    }

    /// The library's own description of `status`, if it has one.
    pub fn status_as_str(&self, status: GpaStatus) -> Result<Option<String>> {
        let get = slot(self.table.gpa_get_status_as_str, "GpaGetStatusAsStr")?;
        // SAFETY: GPA returns null or a static string.
        Ok(unsafe { read_borrowed_text(GpaStatus::OK, get(status)) })
    }

    pub fn enable_counter(&self, session: GpaSessionId, index: u32) -> Result<()> {
        let enable = slot(self.table.gpa_enable_counter, "GpaEnableCounter")?;
        // SAFETY: value arguments only.
        unsafe { enable(session, index) }.check_with("failed to enable counter")
    }

    pub fn enable_counter_by_name(&self, session: GpaSessionId, name: &str) -> Result<()> {
        let enable = slot(self.table.gpa_enable_counter_by_name, "GpaEnableCounterByName")?;
        let name = c_string(name, "counter name")?;
        // SAFETY: `name` is NUL-terminated and outlives the call.
        unsafe { enable(session, name.as_ptr()) }.check_with("failed to enable counter by name")
    }

    pub fn enable_all_counters(&self, session: GpaSessionId) -> Result<()> {
        let enable = slot(self.table.gpa_enable_all_counters, "GpaEnableAllCounters")?;
        // SAFETY: opaque handle passed through.
        unsafe { enable(session) }.check_with("failed to enable all counters")
    }

    pub fn disable_all_counters(&self, session: GpaSessionId) -> Result<()> {
        let disable = slot(self.table.gpa_disable_all_counters, "GpaDisableAllCounters")?;
        // SAFETY: opaque handle passed through.
        unsafe { disable(session) }.check_with("failed to disable all counters")
    }

    /// Number of passes the enabled counters need.
    pub fn pass_count(&self, session: GpaSessionId) -> Result<u32> {
        let get = slot(self.table.gpa_get_pass_count, "GpaGetPassCount")?;
        let mut passes = 0;
        // SAFETY: out-pointer is a valid local.
        unsafe { get(session, &mut passes) }.check_with("failed to get pass count")?;
        Ok(passes)
    }

    /// Starts recording samples into an API command list.
    ///
    /// # Safety
    ///
    /// `command_list` must be the backend's command list object (or null for
    /// backends without one) and stay valid until the list is ended.
    pub unsafe fn begin_command_list(
        &self,
        session: GpaSessionId,
        pass_index: u32,
        command_list: *mut c_void,
        list_type: GpaCommandListType,
    ) -> Result<GpaCommandListId> {
        let begin = slot(self.table.gpa_begin_command_list, "GpaBeginCommandList")?;
        let mut id = GpaCommandListId::NULL;
        // SAFETY: `command_list` is valid per this function's contract.
        unsafe { begin(session, pass_index, command_list, list_type, &mut id) }
            .check_with("failed to begin command list")?;
        Ok(id)
    }

    pub fn end_command_list(&self, command_list: GpaCommandListId) -> Result<()> {
        let end = slot(self.table.gpa_end_command_list, "GpaEndCommandList")?;
        // SAFETY: opaque handle passed through.
        unsafe { end(command_list) }.check_with("failed to end command list")
    }

    pub fn begin_sample(&self, sample_id: u32, command_list: GpaCommandListId) -> Result<()> {
        let begin = slot(self.table.gpa_begin_sample, "GpaBeginSample")?;
        // SAFETY: value arguments only.
        unsafe { begin(sample_id, command_list) }.check_with("failed to begin sample")
    }

    pub fn end_sample(&self, command_list: GpaCommandListId) -> Result<()> {
        let end = slot(self.table.gpa_end_sample, "GpaEndSample")?;
        // SAFETY: opaque handle passed through.
        unsafe { end(command_list) }.check_with("failed to end sample")
    }

    /// Copies the secondary list's samples into `primary` under the ids in
    /// `new_sample_ids`.
    pub fn copy_secondary_samples(
        &self,
        secondary: GpaCommandListId,
        primary: GpaCommandListId,
        new_sample_ids: &mut [u32],
    ) -> Result<()> {
        let copy = slot(self.table.gpa_copy_secondary_samples, "GpaCopySecondarySamples")?;
        let mut ids = OutBuffer::new(new_sample_ids);
        // SAFETY: at most `len_u32` ids are read from a live exclusive buffer.
        unsafe { copy(secondary, primary, ids.len_u32(), ids.as_mut_ptr()) }
            .check_with("failed to copy secondary samples")
    }

    pub fn is_pass_complete(&self, session: GpaSessionId, pass_index: u32) -> Result<bool> {
        let is_complete = slot(self.table.gpa_is_pass_complete, "GpaIsPassComplete")?;
        // SAFETY: value arguments only.
        completion(
            unsafe { is_complete(session, pass_index) },
            "failed to query pass completion",
        )
    }

    pub fn is_session_complete(&self, session: GpaSessionId) -> Result<bool> {
        let is_complete = slot(self.table.gpa_is_session_complete, "GpaIsSessionComplete")?;
        // SAFETY: opaque handle passed through.
        completion(unsafe { is_complete(session) }, "failed to query session completion")
    }

    /// Size in bytes of the result buffer for one sample.
    pub fn sample_result_size(&self, session: GpaSessionId, sample_id: u32) -> Result<usize> {
        let get = slot(self.table.gpa_get_sample_result_size, "GpaGetSampleResultSize")?;
        let mut size = 0;
        // SAFETY: out-pointer is a valid local.
        unsafe { get(session, sample_id, &mut size) }
            .check_with("failed to get sample result size")?;
        Ok(size)
    }

    /// Fills `buffer` with one sample's results. Blocks until they are
    /// available; poll [`Gpa::is_session_complete`] first.
    pub fn sample_result(&self, session: GpaSessionId, sample_id: u32, buffer: &mut [u8]) -> Result<()> {
        let get = slot(self.table.gpa_get_sample_result, "GpaGetSampleResult")?;
        let mut out = OutBuffer::new(buffer);
        // SAFETY: GPA writes at most `byte_len` bytes into a live exclusive buffer.
        unsafe { get(session, sample_id, out.byte_len(), out.as_mut_ptr().cast()) }
            .check_with("failed to get sample result")
    }

    pub fn sqtt_sample_result_size(&self, session: GpaSessionId) -> Result<usize> {
        let get = slot(self.table.gpa_sqtt_get_sample_result_size, "GpaSqttGetSampleResultSize")?;
        let mut size = 0;
        // SAFETY: out-pointer is a valid local.
        unsafe { get(session, &mut size) }.check_with("failed to get SQTT result size")?;
        Ok(size)
    }

    pub fn sqtt_sample_result(&self, session: GpaSessionId, buffer: &mut [u8]) -> Result<()> {
        let get = slot(self.table.gpa_sqtt_get_sample_result, "GpaSqttGetSampleResult")?;
        let mut out = OutBuffer::new(buffer);
        // SAFETY: GPA writes at most `byte_len` bytes into a live exclusive buffer.
        unsafe { get(session, out.byte_len(), out.as_mut_ptr().cast()) }
            .check_with("failed to get SQTT result")
    }

    pub fn spm_sample_result_size(&self, session: GpaSessionId) -> Result<usize> {
        let get = slot(self.table.gpa_spm_get_sample_result_size, "GpaSpmGetSampleResultSize")?;
        let mut size = 0;
        // SAFETY: out-pointer is a valid local.
        unsafe { get(session, &mut size) }.check_with("failed to get SPM result size")?;
        Ok(size)
    }

    pub fn spm_sample_result(&self, session: GpaSessionId, buffer: &mut [u8]) -> Result<()> {
        let get = slot(self.table.gpa_spm_get_sample_result, "GpaSpmGetSampleResult")?;
        let mut out = OutBuffer::new(buffer);
        // SAFETY: GPA writes at most `byte_len` bytes into a live exclusive buffer.
        unsafe { get(session, out.byte_len(), out.as_mut_ptr().cast()) }
            .check_with("failed to get SPM result")
    }

    /// Computes derived counter values from SPM data into `results`.
    ///
    /// # Safety
    ///
    /// `spm_data` must point to SPM data obtained from
    /// [`Gpa::spm_sample_result`] for `session`.
    pub unsafe fn spm_calculate_derived_counters(
        &self,
        session: GpaSessionId,
        spm_data: *const GpaSpmData,
        results: &mut [u64],
    ) -> Result<()> {
        let calculate = slot(
            self.table.gpa_spm_calculate_derived_counters,
            "GpaSpmCalculateDerivedCounters",
        )?;
        let mut out = OutBuffer::new(results);
        // SAFETY: `spm_data` per this function's contract; GPA writes at most
        // `len_u32` values.
        unsafe { calculate(session, spm_data, out.len_u32(), out.as_mut_ptr()) }
            .check_with("failed to calculate derived SPM counters")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpa_core::{ErrorCategory, GPA_FUNCTION_TABLE_MAJOR_VERSION_NUMBER};
    use std::ffi::{CStr, c_char};
    use std::ptr::NonNull;

    use crate::bridge::GpaGetFuncTableFn;
    use crate::library::SymbolSource;

    const SAMPLE_BYTES: [u8; 16] = *b"0123456789abcdef";

    unsafe extern "C" fn get_version(
        major: *mut u32,
        minor: *mut u32,
        build: *mut u32,
        update: *mut u32,
    ) -> GpaStatus {
        unsafe {
            *major = GPA_FUNCTION_TABLE_MAJOR_VERSION_NUMBER;
            *minor = 0;
            *build = 39;
            *update = 0;
        }
        GpaStatus::OK
    }

    unsafe extern "C" fn old_version(
        major: *mut u32,
        _minor: *mut u32,
        _build: *mut u32,
        _update: *mut u32,
    ) -> GpaStatus {
        unsafe { *major = 3 };
        GpaStatus::OK
    }

    unsafe extern "C" fn device_name(context: GpaContextId, name: *mut *const c_char) -> GpaStatus {
        if context.is_null() {
            unsafe { *name = c"garbage".as_ptr() };
            return GpaStatus::ERROR_CONTEXT_NOT_FOUND;
        }
        unsafe { *name = c"Stub Radeon".as_ptr() };
        GpaStatus::OK
    }

    unsafe extern "C" fn counter_index(
        _session: GpaSessionId,
        name: *const c_char,
        index: *mut u32,
    ) -> GpaStatus {
        if unsafe { CStr::from_ptr(name) } != c"GPUTime" {
            return GpaStatus::ERROR_COUNTER_NOT_FOUND;
        }
        unsafe { *index = 7 };
        GpaStatus::OK
    }

    unsafe extern "C" fn session_not_ready(_session: GpaSessionId) -> GpaStatus {
        GpaStatus::RESULT_NOT_READY
    }

    unsafe extern "C" fn sample_result(
        _session: GpaSessionId,
        _sample_id: u32,
        size: usize,
        data: *mut c_void,
    ) -> GpaStatus {
        if size < SAMPLE_BYTES.len() {
            return GpaStatus::ERROR_READING_SAMPLE_RESULT;
        }
        unsafe { ptr::copy_nonoverlapping(SAMPLE_BYTES.as_ptr(), data.cast(), SAMPLE_BYTES.len()) };
        GpaStatus::OK
    }

    unsafe extern "C" fn fill_current(table: *mut c_void) -> GpaStatus {
        let table = unsafe { &mut *table.cast::<GpaFunctionTable>() };
        table.gpa_get_version = Some(get_version);
        table.gpa_get_device_name = Some(device_name);
        table.gpa_get_counter_index = Some(counter_index);
        table.gpa_is_session_complete = Some(session_not_ready);
        table.gpa_get_sample_result = Some(sample_result);
        GpaStatus::OK
    }

    unsafe extern "C" fn fill_old(table: *mut c_void) -> GpaStatus {
        let table = unsafe { &mut *table.cast::<GpaFunctionTable>() };
        table.gpa_get_version = Some(old_version);
        GpaStatus::OK
    }

    struct StubLibrary(GpaGetFuncTableFn);

    impl SymbolSource for StubLibrary {
        fn symbol_address(&self, name: &CStr) -> Option<NonNull<c_void>> {
            if name == crate::GPA_GET_FUNC_TABLE_SYMBOL {
                NonNull::new(self.0 as *mut c_void)
            } else {
                None
            }
        }
    }

    fn stub_gpa() -> Gpa {
        let handle = LibraryHandle::from_source(StubLibrary(fill_current), "stub");
        unsafe { Gpa::from_handle(handle) }.expect("stub loads")
    }

    fn context() -> GpaContextId {
        GpaContextId::from_raw(NonNull::<u8>::dangling().as_ptr().cast())
    }

    #[test]
    fn loads_and_reports_version() {
        let gpa = stub_gpa();
        assert_eq!(gpa.version().major, GPA_FUNCTION_TABLE_MAJOR_VERSION_NUMBER);
        assert_eq!(gpa.version().build, 39);
        assert_eq!(gpa.library().origin(), "stub");
    }

    #[test]
    fn rejects_other_major_version() {
        let handle = LibraryHandle::from_source(StubLibrary(fill_old), "old");
        let err = unsafe { Gpa::from_handle(handle) }.unwrap_err();
        assert_eq!(err.status(), GpaStatus::ERROR_LIB_LOAD_MAJOR_VERSION_MISMATCH);
    }

    #[test]
    fn copies_text_only_on_success() {
        let gpa = stub_gpa();
        assert_eq!(gpa.device_name(context()).unwrap(), "Stub Radeon");

        let err = gpa.device_name(GpaContextId::NULL).unwrap_err();
        assert_eq!(err.status(), GpaStatus::ERROR_CONTEXT_NOT_FOUND);
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn looks_up_counter_by_name() {
        let gpa = stub_gpa();
        assert_eq!(gpa.counter_index(GpaSessionId::NULL, "GPUTime").unwrap(), 7);
        assert_eq!(
            gpa.counter_index(GpaSessionId::NULL, "Wavefronts")
                .unwrap_err()
                .status(),
            GpaStatus::ERROR_COUNTER_NOT_FOUND
        );
        assert_eq!(
            gpa.counter_index(GpaSessionId::NULL, "GPU\0Time")
                .unwrap_err()
                .status(),
            GpaStatus::ERROR_INVALID_PARAMETER
        );
    }

    #[test]
    fn not_ready_is_not_an_error() {
        let gpa = stub_gpa();
        assert!(!gpa.is_session_complete(GpaSessionId::NULL).unwrap());
    }

    #[test]
    fn undersized_result_buffer_is_left_untouched() {
        let gpa = stub_gpa();
        let mut storage = [0xAAu8; 24];

        let err = gpa
            .sample_result(GpaSessionId::NULL, 0, &mut storage[..8])
            .unwrap_err();
        assert_eq!(err.status(), GpaStatus::ERROR_READING_SAMPLE_RESULT);
        assert_eq!(err.category(), ErrorCategory::BufferTooSmall);
        assert!(storage.iter().all(|&b| b == 0xAA));

        gpa.sample_result(GpaSessionId::NULL, 0, &mut storage[..16]).unwrap();
        assert_eq!(&storage[..16], &SAMPLE_BYTES);
        assert!(storage[16..].iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn missing_slot_is_load_failure() {
        let gpa = stub_gpa();
        let err = gpa.initialize(GpaInitializeFlags::DEFAULT).unwrap_err();
        assert_eq!(err.status(), GpaStatus::ERROR_LIB_LOAD_FAILED);
        assert_eq!(
            err.to_string(),
            "GpaInitialize is not exported (kGpaStatusErrorLibLoadFailed: -27)"
        );
    }
}
