//! `GpaFunctionTable`: the dispatch table `GpaGetFuncTable` fills in.
//!
//! Layout follows `gpu_perf_api_function_types.h` / `gpu_perf_api_functions.h`
//! for function table major version
//! [`GPA_FUNCTION_TABLE_MAJOR_VERSION_NUMBER`]: a two-word version header, then
//! one nullable function pointer per entry point in header order. Reordering
//! slots breaks the ABI.

use std::ffi::{c_char, c_void};
use std::fmt;

use gpa_core::{
    GPA_FUNCTION_TABLE_MAJOR_VERSION_NUMBER, GpaCommandListId, GpaCommandListType, GpaContextId,
    GpaContextSampleTypeFlags, GpaCounterSampleType, GpaDataType, GpaHwGeneration,
    GpaInitializeFlags, GpaLoggingCallback, GpaLoggingType, GpaOpenContextFlags, GpaSessionId,
    GpaSessionSampleType, GpaSpmData, GpaSqttInstructionFlags, GpaStatus, GpaUsageType, GpaUuid,
};

macro_rules! gpa_function_table {
    ($($symbol:ident => $field:ident: fn($($arg:ty),* $(,)?) -> $ret:ty;)*) => {
        /// Dispatch table populated by the native `GpaGetFuncTable`.
        #[repr(C)]
        #[derive(Clone, Copy)]
        pub struct GpaFunctionTable {
            /// Table major version the caller expects.
            pub major_version: u32,
            /// Size in bytes of the table the caller provides.
            pub minor_version: u32,
            $(
                #[doc = concat!("`", stringify!($symbol), "`")]
                pub $field: Option<unsafe extern "C" fn($($arg),*) -> $ret>,
            )*
        }

        impl GpaFunctionTable {
            /// Native entry point names, in slot order.
            pub const ENTRY_POINTS: &'static [&'static str] = &[$(stringify!($symbol)),*];

            /// Number of slots holding an address.
            pub fn populated_slots(&self) -> usize {
                let mut populated = 0;
                $(populated += usize::from(self.$field.is_some());)*
                populated
            }

            /// Names of the entry points the library did not provide.
            pub fn missing_entry_points(&self) -> Vec<&'static str> {
                let mut missing = Vec::new();
                $(
                    if self.$field.is_none() {
                        missing.push(stringify!($symbol));
                    }
                )*
                missing
            }
        }
    };
}

gpa_function_table! {
    GpaGetVersion => gpa_get_version: fn(*mut u32, *mut u32, *mut u32, *mut u32) -> GpaStatus;
    GpaGetFuncTable => gpa_get_func_table: fn(*mut c_void) -> GpaStatus;

    GpaRegisterLoggingCallback => gpa_register_logging_callback:
        fn(GpaLoggingType, Option<GpaLoggingCallback>) -> GpaStatus;

    GpaInitialize => gpa_initialize: fn(GpaInitializeFlags) -> GpaStatus;
    GpaDestroy => gpa_destroy: fn() -> GpaStatus;

    GpaOpenContext => gpa_open_context:
        fn(*mut c_void, GpaOpenContextFlags, *mut GpaContextId) -> GpaStatus;
    GpaCloseContext => gpa_close_context: fn(GpaContextId) -> GpaStatus;

    GpaGetSupportedSampleTypes => gpa_get_supported_sample_types:
        fn(GpaContextId, *mut GpaContextSampleTypeFlags) -> GpaStatus;
    GpaGetDeviceAndRevisionId => gpa_get_device_and_revision_id:
        fn(GpaContextId, *mut u32, *mut u32) -> GpaStatus;
    GpaGetDeviceName => gpa_get_device_name: fn(GpaContextId, *mut *const c_char) -> GpaStatus;
    GpaGetDeviceGeneration => gpa_get_device_generation:
        fn(GpaContextId, *mut GpaHwGeneration) -> GpaStatus;

    GpaGetNumCounters => gpa_get_num_counters: fn(GpaSessionId, *mut u32) -> GpaStatus;
    GpaGetCounterName => gpa_get_counter_name:
        fn(GpaSessionId, u32, *mut *const c_char) -> GpaStatus;
    GpaGetCounterIndex => gpa_get_counter_index:
        fn(GpaSessionId, *const c_char, *mut u32) -> GpaStatus;
    GpaGetCounterGroup => gpa_get_counter_group:
        fn(GpaSessionId, u32, *mut *const c_char) -> GpaStatus;
    GpaGetCounterDescription => gpa_get_counter_description:
        fn(GpaSessionId, u32, *mut *const c_char) -> GpaStatus;
    GpaGetCounterDataType => gpa_get_counter_data_type:
        fn(GpaSessionId, u32, *mut GpaDataType) -> GpaStatus;
    GpaGetCounterUsageType => gpa_get_counter_usage_type:
        fn(GpaSessionId, u32, *mut GpaUsageType) -> GpaStatus;
    GpaGetCounterUuid => gpa_get_counter_uuid: fn(GpaSessionId, u32, *mut GpaUuid) -> GpaStatus;
    GpaGetCounterSampleType => gpa_get_counter_sample_type:
        fn(GpaSessionId, u32, *mut GpaCounterSampleType) -> GpaStatus;
    GpaGetDataTypeAsStr => gpa_get_data_type_as_str:
        fn(GpaDataType, *mut *const c_char) -> GpaStatus;
    GpaGetUsageTypeAsStr => gpa_get_usage_type_as_str:
        fn(GpaUsageType, *mut *const c_char) -> GpaStatus;

    GpaCreateSession => gpa_create_session:
        fn(GpaContextId, GpaSessionSampleType, *mut GpaSessionId) -> GpaStatus;
    GpaDeleteSession => gpa_delete_session: fn(GpaSessionId) -> GpaStatus;
    GpaBeginSession => gpa_begin_session: fn(GpaSessionId) -> GpaStatus;
    GpaEndSession => gpa_end_session: fn(GpaSessionId) -> GpaStatus;

    GpaEnableCounter => gpa_enable_counter: fn(GpaSessionId, u32) -> GpaStatus;
    GpaDisableCounter => gpa_disable_counter: fn(GpaSessionId, u32) -> GpaStatus;
    GpaEnableCounterByName => gpa_enable_counter_by_name:
        fn(GpaSessionId, *const c_char) -> GpaStatus;
    GpaDisableCounterByName => gpa_disable_counter_by_name:
        fn(GpaSessionId, *const c_char) -> GpaStatus;
    GpaEnableAllCounters => gpa_enable_all_counters: fn(GpaSessionId) -> GpaStatus;
    GpaDisableAllCounters => gpa_disable_all_counters: fn(GpaSessionId) -> GpaStatus;

    GpaGetPassCount => gpa_get_pass_count: fn(GpaSessionId, *mut u32) -> GpaStatus;
    GpaGetNumEnabledCounters => gpa_get_num_enabled_counters:
        fn(GpaSessionId, *mut u32) -> GpaStatus;
    GpaGetEnabledIndex => gpa_get_enabled_index: fn(GpaSessionId, u32, *mut u32) -> GpaStatus;
    GpaIsCounterEnabled => gpa_is_counter_enabled: fn(GpaSessionId, u32) -> GpaStatus;

    GpaBeginCommandList => gpa_begin_command_list:
        fn(GpaSessionId, u32, *mut c_void, GpaCommandListType, *mut GpaCommandListId) -> GpaStatus;
    GpaEndCommandList => gpa_end_command_list: fn(GpaCommandListId) -> GpaStatus;
    GpaBeginSample => gpa_begin_sample: fn(u32, GpaCommandListId) -> GpaStatus;
    GpaEndSample => gpa_end_sample: fn(GpaCommandListId) -> GpaStatus;
    GpaContinueSampleOnCommandList => gpa_continue_sample_on_command_list:
        fn(u32, GpaCommandListId) -> GpaStatus;
    GpaCopySecondarySamples => gpa_copy_secondary_samples:
        fn(GpaCommandListId, GpaCommandListId, u32, *mut u32) -> GpaStatus;
    GpaGetSampleCount => gpa_get_sample_count: fn(GpaSessionId, *mut u32) -> GpaStatus;
    GpaGetSampleId => gpa_get_sample_id: fn(GpaSessionId, u32, *mut u32) -> GpaStatus;

    GpaIsPassComplete => gpa_is_pass_complete: fn(GpaSessionId, u32) -> GpaStatus;
    GpaIsSessionComplete => gpa_is_session_complete: fn(GpaSessionId) -> GpaStatus;
    GpaGetSampleResultSize => gpa_get_sample_result_size:
        fn(GpaSessionId, u32, *mut usize) -> GpaStatus;
    GpaGetSampleResult => gpa_get_sample_result:
        fn(GpaSessionId, u32, usize, *mut c_void) -> GpaStatus;

    GpaGetStatusAsStr => gpa_get_status_as_str: fn(GpaStatus) -> *const c_char;

    GpaSqttGetInstructionMask => gpa_sqtt_get_instruction_mask:
        fn(GpaSessionId, *mut GpaSqttInstructionFlags) -> GpaStatus;
    GpaSqttSetInstructionMask => gpa_sqtt_set_instruction_mask:
        fn(GpaSessionId, GpaSqttInstructionFlags) -> GpaStatus;
    GpaSqttGetComputeUnitId => gpa_sqtt_get_compute_unit_id:
        fn(GpaSessionId, *mut u32) -> GpaStatus;
    GpaSqttSetComputeUnitId => gpa_sqtt_set_compute_unit_id: fn(GpaSessionId, u32) -> GpaStatus;
    GpaSqttBegin => gpa_sqtt_begin: fn(GpaSessionId, *mut c_void) -> GpaStatus;
    GpaSqttEnd => gpa_sqtt_end: fn(GpaSessionId, *mut c_void) -> GpaStatus;
    GpaSqttGetSampleResultSize => gpa_sqtt_get_sample_result_size:
        fn(GpaSessionId, *mut usize) -> GpaStatus;
    GpaSqttGetSampleResult => gpa_sqtt_get_sample_result:
        fn(GpaSessionId, usize, *mut c_void) -> GpaStatus;

    GpaSpmSetSampleInterval => gpa_spm_set_sample_interval: fn(GpaSessionId, u32) -> GpaStatus;
    GpaSpmSetDuration => gpa_spm_set_duration: fn(GpaSessionId, u64) -> GpaStatus;
    GpaSpmBegin => gpa_spm_begin: fn(GpaSessionId, *mut c_void) -> GpaStatus;
    GpaSpmEnd => gpa_spm_end: fn(GpaSessionId, *mut c_void) -> GpaStatus;
    GpaSpmGetSampleResultSize => gpa_spm_get_sample_result_size:
        fn(GpaSessionId, *mut usize) -> GpaStatus;
    GpaSpmGetSampleResult => gpa_spm_get_sample_result:
        fn(GpaSessionId, usize, *mut c_void) -> GpaStatus;
    GpaSpmCalculateDerivedCounters => gpa_spm_calculate_derived_counters:
        fn(GpaSessionId, *const GpaSpmData, u32, *mut u64) -> GpaStatus;
}

/// Value `GpaGetFuncTable` expects in `minor_version`: the table size.
pub const GPA_FUNCTION_TABLE_MINOR_VERSION_NUMBER: u32 = size_of::<GpaFunctionTable>() as u32;

impl Default for GpaFunctionTable {
    /// Version header set, every slot empty.
    fn default() -> Self {
        Self {
            major_version: GPA_FUNCTION_TABLE_MAJOR_VERSION_NUMBER,
            minor_version: GPA_FUNCTION_TABLE_MINOR_VERSION_NUMBER,
            ..Self::EMPTY
        }
    }
}

impl GpaFunctionTable {
    // SAFETY: every field is an integer or an `Option` of a function pointer,
    // for which all-zero bytes are a valid value (`0` / `None`).
    const EMPTY: Self = unsafe { std::mem::zeroed() };

    /// True when no slot holds an address.
    pub fn is_unpopulated(&self) -> bool {
        self.populated_slots() == 0
    }

    /// True when the table holds its default header and no address.
    pub fn is_default(&self) -> bool {
        self.major_version == GPA_FUNCTION_TABLE_MAJOR_VERSION_NUMBER
            && self.minor_version == GPA_FUNCTION_TABLE_MINOR_VERSION_NUMBER
            && self.is_unpopulated()
    }
}

impl fmt::Debug for GpaFunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpaFunctionTable")
            .field("major_version", &self.major_version)
            .field("minor_version", &self.minor_version)
            .field("populated_slots", &self.populated_slots())
            .field("entry_points", &Self::ENTRY_POINTS.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_header_plus_one_pointer_per_entry() {
        let header = 2 * size_of::<u32>();
        let slots = GpaFunctionTable::ENTRY_POINTS.len() * size_of::<usize>();
        assert_eq!(size_of::<GpaFunctionTable>(), header.next_multiple_of(align_of::<usize>()) + slots);
    }

    #[test]
    fn default_table_is_empty_with_version_header() {
        let table = GpaFunctionTable::default();
        assert!(table.is_default());
        assert_eq!(table.major_version, GPA_FUNCTION_TABLE_MAJOR_VERSION_NUMBER);
        assert_eq!(
            table.missing_entry_points().len(),
            GpaFunctionTable::ENTRY_POINTS.len()
        );
    }

    #[test]
    fn entry_points_start_with_version_query() {
        assert_eq!(GpaFunctionTable::ENTRY_POINTS[0], "GpaGetVersion");
        assert_eq!(GpaFunctionTable::ENTRY_POINTS[1], "GpaGetFuncTable");
    }

    #[test]
    fn populated_slots_counts_addresses() {
        unsafe extern "C" fn destroy() -> GpaStatus {
            GpaStatus::OK
        }

        let mut table = GpaFunctionTable::default();
        table.gpa_destroy = Some(destroy);
        assert_eq!(table.populated_slots(), 1);
        assert!(!table.is_default());
        assert!(!table.missing_entry_points().contains(&"GpaDestroy"));
    }
}
