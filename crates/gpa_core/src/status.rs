//! Native GPA status codes.
//!
//! `GpaStatus` is a transparent wrapper over the `int32` the native library
//! returns, so any value coming back across the FFI boundary is representable,
//! including codes newer than this crate knows about.

use std::fmt;

use crate::error::GpaError;

/// Signed result code of every GPA entry point.
///
/// Non-negative values are success or benign (`kGpaStatusResultNotReady`);
/// negative values are errors, each belonging to exactly one [`ErrorCategory`].
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpaStatus(i32);

/// Coarse classification of negative statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Library or entry symbol missing, or the table version does not match.
    LoadFailure,
    NullPointer,
    /// Context, session, sample, counter or command list id not found.
    NotFound,
    IndexOutOfRange,
    /// Hardware, driver or graphics API does not support the request.
    Unsupported,
    /// Caller-supplied result buffer is smaller than the native result.
    BufferTooSmall,
    /// Call issued in the wrong lifecycle state (not open, already started...).
    InvalidState,
    InvalidArgument,
    Internal,
    /// `kGpaStatusErrorException` and any code this crate does not know.
    Unexpected,
}

macro_rules! gpa_statuses {
    ($($(#[$meta:meta])* $konst:ident = $value:literal => $name:literal, $category:expr;)*) => {
        impl GpaStatus {
            $($(#[$meta])* pub const $konst: Self = Self($value);)*

            /// Native enumerator name, if the code is known.
            pub const fn name(self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some($name),)*
                    _ => None,
                }
            }

            fn known_category(self) -> Option<ErrorCategory> {
                match self.0 {
                    $($value => $category,)*
                    _ => None,
                }
            }
        }
    };
}

gpa_statuses! {
    OK = 0 => "kGpaStatusOk", None;
    /// The operation completed but its result is not available yet.
    RESULT_NOT_READY = 1 => "kGpaStatusResultNotReady", None;
    ERROR_NULL_POINTER = -1 => "kGpaStatusErrorNullPointer", Some(ErrorCategory::NullPointer);
    ERROR_CONTEXT_NOT_OPEN = -2 => "kGpaStatusErrorContextNotOpen", Some(ErrorCategory::InvalidState);
    ERROR_CONTEXT_ALREADY_OPEN = -3 => "kGpaStatusErrorContextAlreadyOpen", Some(ErrorCategory::InvalidState);
    ERROR_INDEX_OUT_OF_RANGE = -4 => "kGpaStatusErrorIndexOutOfRange", Some(ErrorCategory::IndexOutOfRange);
    ERROR_COUNTER_NOT_FOUND = -5 => "kGpaStatusErrorCounterNotFound", Some(ErrorCategory::NotFound);
    ERROR_ALREADY_ENABLED = -6 => "kGpaStatusErrorAlreadyEnabled", Some(ErrorCategory::InvalidState);
    ERROR_NO_COUNTERS_ENABLED = -7 => "kGpaStatusErrorNoCountersEnabled", Some(ErrorCategory::InvalidState);
    ERROR_NOT_ENABLED = -8 => "kGpaStatusErrorNotEnabled", Some(ErrorCategory::InvalidState);
    ERROR_COMMAND_LIST_ALREADY_ENDED = -9 => "kGpaStatusErrorCommandListAlreadyEnded", Some(ErrorCategory::InvalidState);
    ERROR_COMMAND_LIST_ALREADY_STARTED = -10 => "kGpaStatusErrorCommandListAlreadyStarted", Some(ErrorCategory::InvalidState);
    ERROR_COMMAND_LIST_NOT_ENDED = -11 => "kGpaStatusErrorCommandListNotEnded", Some(ErrorCategory::InvalidState);
    ERROR_NOT_ENOUGH_PASSES = -12 => "kGpaStatusErrorNotEnoughPasses", Some(ErrorCategory::InvalidState);
    ERROR_SAMPLE_NOT_STARTED = -13 => "kGpaStatusErrorSampleNotStarted", Some(ErrorCategory::InvalidState);
    ERROR_SAMPLE_ALREADY_STARTED = -14 => "kGpaStatusErrorSampleAlreadyStarted", Some(ErrorCategory::InvalidState);
    ERROR_SAMPLE_NOT_ENDED = -15 => "kGpaStatusErrorSampleNotEnded", Some(ErrorCategory::InvalidState);
    ERROR_CANNOT_CHANGE_COUNTERS_WHEN_SAMPLING = -16 => "kGpaStatusErrorCannotChangeCountersWhenSampling", Some(ErrorCategory::InvalidState);
    ERROR_SESSION_NOT_FOUND = -17 => "kGpaStatusErrorSessionNotFound", Some(ErrorCategory::NotFound);
    ERROR_SAMPLE_NOT_FOUND = -18 => "kGpaStatusErrorSampleNotFound", Some(ErrorCategory::NotFound);
    ERROR_CONTEXT_NOT_FOUND = -19 => "kGpaStatusErrorContextNotFound", Some(ErrorCategory::NotFound);
    ERROR_COMMAND_LIST_NOT_FOUND = -20 => "kGpaStatusErrorCommandListNotFound", Some(ErrorCategory::NotFound);
    /// Also reported when the result buffer is too small.
    ERROR_READING_SAMPLE_RESULT = -21 => "kGpaStatusErrorReadingSampleResult", Some(ErrorCategory::BufferTooSmall);
    ERROR_VARIABLE_NUMBER_OF_SAMPLES_IN_PASSES = -22 => "kGpaStatusErrorVariableNumberOfSamplesInPasses", Some(ErrorCategory::InvalidState);
    ERROR_FAILED = -23 => "kGpaStatusErrorFailed", Some(ErrorCategory::Internal);
    ERROR_HARDWARE_NOT_SUPPORTED = -24 => "kGpaStatusErrorHardwareNotSupported", Some(ErrorCategory::Unsupported);
    ERROR_DRIVER_NOT_SUPPORTED = -25 => "kGpaStatusErrorDriverNotSupported", Some(ErrorCategory::Unsupported);
    ERROR_API_NOT_SUPPORTED = -26 => "kGpaStatusErrorApiNotSupported", Some(ErrorCategory::Unsupported);
    ERROR_LIB_LOAD_FAILED = -27 => "kGpaStatusErrorLibLoadFailed", Some(ErrorCategory::LoadFailure);
    ERROR_LIB_LOAD_MAJOR_VERSION_MISMATCH = -28 => "kGpaStatusErrorLibLoadMajorVersionMismatch", Some(ErrorCategory::LoadFailure);
    ERROR_LIB_LOAD_MINOR_VERSION_MISMATCH = -29 => "kGpaStatusErrorLibLoadMinorVersionMismatch", Some(ErrorCategory::LoadFailure);
    ERROR_GPA_NOT_INITIALIZED = -30 => "kGpaStatusErrorGpaNotInitialized", Some(ErrorCategory::InvalidState);
    ERROR_GPA_ALREADY_INITIALIZED = -31 => "kGpaStatusErrorGpaAlreadyInitialized", Some(ErrorCategory::InvalidState);
    ERROR_SAMPLE_IN_SECONDARY_COMMAND_LIST = -32 => "kGpaStatusErrorSampleInSecondaryCommandList", Some(ErrorCategory::InvalidState);
    ERROR_INCOMPATIBLE_SAMPLE_TYPES = -33 => "kGpaStatusErrorIncompatibleSampleTypes", Some(ErrorCategory::Unsupported);
    ERROR_SESSION_ALREADY_STARTED = -34 => "kGpaStatusErrorSessionAlreadyStarted", Some(ErrorCategory::InvalidState);
    ERROR_SESSION_NOT_STARTED = -35 => "kGpaStatusErrorSessionNotStarted", Some(ErrorCategory::InvalidState);
    ERROR_SESSION_NOT_ENDED = -36 => "kGpaStatusErrorSessionNotEnded", Some(ErrorCategory::InvalidState);
    ERROR_INVALID_DATA_TYPE = -37 => "kGpaStatusErrorInvalidDataType", Some(ErrorCategory::InvalidArgument);
    ERROR_INVALID_COUNTER_EQUATION = -38 => "kGpaStatusErrorInvalidCounterEquation", Some(ErrorCategory::InvalidArgument);
    ERROR_TIMEOUT = -39 => "kGpaStatusErrorTimeout", Some(ErrorCategory::Internal);
    ERROR_LIB_ALREADY_LOADED = -40 => "kGpaStatusErrorLibAlreadyLoaded", Some(ErrorCategory::LoadFailure);
    ERROR_OTHER_SESSION_ACTIVE = -41 => "kGpaStatusErrorOtherSessionActive", Some(ErrorCategory::InvalidState);
    ERROR_EXCEPTION = -42 => "kGpaStatusErrorException", Some(ErrorCategory::Unexpected);
    ERROR_INVALID_PARAMETER = -43 => "kGpaStatusErrorInvalidParameter", Some(ErrorCategory::InvalidArgument);
}

impl GpaStatus {
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> i32 {
        self.0
    }

    /// Success or benign status.
    pub const fn is_ok(self) -> bool {
        self.0 >= 0
    }

    pub const fn is_error(self) -> bool {
        self.0 < 0
    }

    /// Category of an error status; `None` for non-negative statuses.
    pub fn category(self) -> Option<ErrorCategory> {
        if self.is_ok() {
            return None;
        }
        Some(self.known_category().unwrap_or(ErrorCategory::Unexpected))
    }

    /// Passes non-negative statuses through and turns negative ones into a
    /// [`GpaError`] with the default message.
    pub fn check(self) -> Result<(), GpaError> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(GpaError::from_status(self, None))
        }
    }

    /// Like [`GpaStatus::check`] with a caller-supplied context phrase.
    pub fn check_with(self, context: impl Into<String>) -> Result<(), GpaError> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(GpaError::from_status(self, Some(context.into())))
        }
    }

    /// Error for a status the caller already knows to be negative, such as a
    /// locally detected missing entry point.
    pub fn fail_with(self, context: impl Into<String>) -> GpaError {
        GpaError::from_status(self, Some(context.into()))
    }
}

impl From<i32> for GpaStatus {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl From<GpaStatus> for i32 {
    fn from(status: GpaStatus) -> Self {
        status.0
    }
}

impl fmt::Debug for GpaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "GpaStatus({})", self.0),
        }
    }
}

impl fmt::Display for GpaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}: {}", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_negative_statuses_have_no_category() {
        for raw in [0, 1, 2, 57, i32::MAX] {
            assert_eq!(GpaStatus::from_raw(raw).category(), None);
        }
    }

    #[test]
    fn every_negative_status_has_exactly_one_category() {
        for raw in -60..0 {
            let status = GpaStatus::from_raw(raw);
            assert!(status.category().is_some(), "{raw} has no category");
        }
        assert_eq!(
            GpaStatus::from_raw(i32::MIN).category(),
            Some(ErrorCategory::Unexpected)
        );
    }

    #[test]
    fn taxonomy_matches_native_meaning() {
        assert_eq!(
            GpaStatus::ERROR_LIB_LOAD_FAILED.category(),
            Some(ErrorCategory::LoadFailure)
        );
        assert_eq!(
            GpaStatus::ERROR_READING_SAMPLE_RESULT.category(),
            Some(ErrorCategory::BufferTooSmall)
        );
        assert_eq!(
            GpaStatus::ERROR_CONTEXT_NOT_FOUND.category(),
            Some(ErrorCategory::NotFound)
        );
        assert_eq!(
            GpaStatus::ERROR_API_NOT_SUPPORTED.category(),
            Some(ErrorCategory::Unsupported)
        );
        assert_eq!(
            GpaStatus::ERROR_EXCEPTION.category(),
            Some(ErrorCategory::Unexpected)
        );
    }

    #[test]
    fn display_includes_name_and_value() {
        assert_eq!(GpaStatus::ERROR_FAILED.to_string(), "kGpaStatusErrorFailed: -23");
        assert_eq!(GpaStatus::from_raw(-999).to_string(), "-999");
        assert_eq!(format!("{:?}", GpaStatus::OK), "kGpaStatusOk");
    }
}
