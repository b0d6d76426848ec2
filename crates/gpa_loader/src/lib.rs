//! Dynamic loading of GPUPerfAPI.
//!
//! [`LibraryRegistry`] maps the logical `GPUPerfAPI` library to the backend's
//! shared library and caches the handle, [`load_function_table`] pulls the
//! dispatch table out through `GpaGetFuncTable`, and [`Gpa`] wraps the table
//! in status-checked calls.

pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod library;
pub mod logging;
pub mod resolver;
pub mod table;

pub use bridge::{
    GPA_GET_FUNC_TABLE_SYMBOL, GpaGetFuncTableFn, LoadStage, TableLoader, load_function_table,
    query_version,
};
#[cfg(feature = "toml-config")]
pub use config::ConfigError;
pub use config::{BACKEND_ENV, LIBRARY_PATH_ENV, OverrideResolver, ResolveRequest, ResolverConfig};
pub use dispatch::Gpa;
pub use library::{LibraryHandle, LibraryLoader, NativeLoader, SymbolSource};
pub use logging::{NATIVE_LOG_TARGET, forward_to_tracing};
pub use resolver::LibraryRegistry;
pub use table::{GPA_FUNCTION_TABLE_MINOR_VERSION_NUMBER, GpaFunctionTable};
