//! Forwarding of native GPA log messages into `tracing`.

use std::ffi::{CStr, c_char};

use gpa_core::GpaLoggingType;
use tracing::{error, info, trace};

/// Target native messages are emitted under.
pub const NATIVE_LOG_TARGET: &str = "gpuperfapi::native";

/// Logging callback handed to `GpaRegisterLoggingCallback`.
///
/// Errors go to `error!`, traces to `trace!`, everything else to `info!`.
///
/// # Safety
///
/// `message` must be null or point to a NUL-terminated string valid for the
/// duration of the call.
pub unsafe extern "C" fn forward_to_tracing(kind: GpaLoggingType, message: *const c_char) {
    if message.is_null() {
        return;
    }
    // SAFETY: non-null and NUL-terminated per the callback contract.
    let message = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    let message = message.trim_end();

    if kind.0 & GpaLoggingType::ERROR.0 != 0 {
        error!(target: NATIVE_LOG_TARGET, "{message}");
    } else if kind.0 & GpaLoggingType::TRACE.0 != 0 && kind.0 & GpaLoggingType::MESSAGE.0 == 0 {
        trace!(target: NATIVE_LOG_TARGET, "{message}");
    } else {
        info!(target: NATIVE_LOG_TARGET, "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn tolerates_null_and_every_kind() {
        unsafe {
            forward_to_tracing(GpaLoggingType::ERROR, ptr::null());
            for kind in [
                GpaLoggingType::ERROR,
                GpaLoggingType::MESSAGE,
                GpaLoggingType::TRACE,
                GpaLoggingType::ALL,
            ] {
                forward_to_tracing(kind, c"counter backend initialised\n".as_ptr());
            }
        }
    }
}
