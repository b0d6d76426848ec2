//! Status, error, marshaling and backend primitives shared by the GPUPerfAPI
//! loader and tools.

pub mod backend;
pub mod error;
pub mod marshal;
pub mod status;
pub mod types;
pub mod vk;

pub use backend::{BackendKind, OperatingSystem, ParseBackendError, library_name};
pub use error::{DEFAULT_ERROR_CONTEXT, GpaError, Result};
pub use marshal::{OutBuffer, query_text, read_borrowed_text};
pub use status::{ErrorCategory, GpaStatus};
pub use types::{
    GpaCommandListId, GpaCommandListType, GpaContextId, GpaContextSampleTypeFlags,
    GpaCounterSampleType, GpaDataType, GpaHwGeneration, GpaInitializeFlags, GpaLoggingCallback,
    GpaLoggingType, GpaOpenContextFlags, GpaSessionId, GpaSessionSampleType, GpaSpmData,
    GpaSqttInstructionFlags, GpaUsageType, GpaUuid, GpaVersion,
};
pub use vk::{ExtensionList, GpaVkContextOpenInfo};

/// Logical library identifier the resolver answers for.
pub const GPA_LIBRARY_NAME: &str = "GPUPerfAPI";

/// Function table major version this crate's table layout implements.
pub const GPA_FUNCTION_TABLE_MAJOR_VERSION_NUMBER: u32 = 4;
