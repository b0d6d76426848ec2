//! Stand-in GPUPerfAPI library for running `gpuperfapi probe` without AMD
//! hardware. Builds as `libGPUPerfAPIVK.so` / `GPUPerfAPIVK.dll`.

#![allow(non_snake_case)]

use std::ffi::{c_char, c_void, CStr};
use std::sync::atomic::{AtomicBool, Ordering};

use gpa_core::{
    GpaInitializeFlags, GpaLoggingCallback, GpaLoggingType, GpaStatus,
    GPA_FUNCTION_TABLE_MAJOR_VERSION_NUMBER,
};
use gpa_loader::GpaFunctionTable;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

unsafe extern "C" fn get_version(
    major: *mut u32,
    minor: *mut u32,
    build: *mut u32,
    update: *mut u32,
) -> GpaStatus {
    if major.is_null() || minor.is_null() || build.is_null() || update.is_null() {
        return GpaStatus::ERROR_NULL_POINTER;
    }
    *major = GPA_FUNCTION_TABLE_MAJOR_VERSION_NUMBER;
    *minor = 0;
    *build = 39;
    *update = 0;
    GpaStatus::OK
}

unsafe extern "C" fn register_logging_callback(
    kinds: GpaLoggingType,
    callback: Option<GpaLoggingCallback>,
) -> GpaStatus {
    let Some(callback) = callback else {
        return GpaStatus::ERROR_NULL_POINTER;
    };
    if kinds.0 & GpaLoggingType::MESSAGE.0 != 0 {
        callback(GpaLoggingType::MESSAGE, c"gpa_stub logging attached".as_ptr());
    }
    GpaStatus::OK
}

unsafe extern "C" fn initialize(_flags: GpaInitializeFlags) -> GpaStatus {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        GpaStatus::ERROR_GPA_ALREADY_INITIALIZED
    } else {
        GpaStatus::OK
    }
}

unsafe extern "C" fn destroy() -> GpaStatus {
    if INITIALIZED.swap(false, Ordering::SeqCst) {
        GpaStatus::OK
    } else {
        GpaStatus::ERROR_GPA_NOT_INITIALIZED
    }
}

unsafe extern "C" fn status_as_str(status: GpaStatus) -> *const c_char {
    let text: &CStr = if status.is_ok() {
        c"stub: success"
    } else {
        c"stub: failure"
    };
    text.as_ptr()
}

/// Fills the caller's table. Rejects tables of another major version the way
/// GPUPerfAPI does.
///
/// # Safety
///
/// `table` must be null or point to a writable `GpaFunctionTable`.
#[no_mangle]
pub unsafe extern "C" fn GpaGetFuncTable(table: *mut c_void) -> GpaStatus {
    let Some(table) = table.cast::<GpaFunctionTable>().as_mut() else {
        return GpaStatus::ERROR_NULL_POINTER;
    };
    if table.major_version != GPA_FUNCTION_TABLE_MAJOR_VERSION_NUMBER {
        return GpaStatus::ERROR_LIB_LOAD_MAJOR_VERSION_MISMATCH;
    }

    table.gpa_get_version = Some(get_version);
    table.gpa_get_func_table = Some(GpaGetFuncTable);
    table.gpa_register_logging_callback = Some(register_logging_callback);
    table.gpa_initialize = Some(initialize);
    table.gpa_destroy = Some(destroy);
    table.gpa_get_status_as_str = Some(status_as_str);
    GpaStatus::OK
}
