//! Mapping from graphics backend and operating system to the GPA library
//! file that implements it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Graphics API family the native profiler targets.
///
/// Deserializes through [`FromStr`], so config files take the same spellings
/// as `GPA_BACKEND`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Vulkan,
    DirectX11,
    DirectX12,
    OpenGL,
}

impl BackendKind {
    pub const ALL: [Self; 4] = [Self::Vulkan, Self::DirectX11, Self::DirectX12, Self::OpenGL];

    /// Library file name for this backend on `os`.
    pub fn library_name(self, os: OperatingSystem) -> Option<&'static str> {
        library_name(self, os)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vulkan => "vulkan",
            Self::DirectX11 => "directx11",
            Self::DirectX12 => "directx12",
            Self::OpenGL => "opengl",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBackendError(String);

impl fmt::Display for ParseBackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown backend `{}` (expected vulkan, dx11, dx12 or opengl)",
            self.0
        )
    }
}

impl std::error::Error for ParseBackendError {}

impl FromStr for BackendKind {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vulkan" | "vk" => Ok(Self::Vulkan),
            "directx11" | "dx11" | "d3d11" => Ok(Self::DirectX11),
            "directx12" | "dx12" | "d3d12" => Ok(Self::DirectX12),
            "opengl" | "gl" => Ok(Self::OpenGL),
            _ => Err(ParseBackendError(s.to_string())),
        }
    }
}

/// Operating systems the library family ships binaries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    Windows,
    Linux,
    Other,
}

impl OperatingSystem {
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Other => "other",
        })
    }
}

impl FromStr for OperatingSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "windows" | "win" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown operating system `{other}`")),
        }
    }
}

fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl<'de> Deserialize<'de> for BackendKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_from_str(deserializer)
    }
}

impl<'de> Deserialize<'de> for OperatingSystem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_from_str(deserializer)
    }
}

/// File name of the GPA library for `kind` on `os`, or `None` when that
/// combination is not shipped.
pub const fn library_name(kind: BackendKind, os: OperatingSystem) -> Option<&'static str> {
    use BackendKind::{DirectX11, DirectX12, OpenGL, Vulkan};
    use OperatingSystem::{Linux, Windows};

    match (kind, os) {
        (Vulkan, Windows) => Some("GPUPerfAPIVK-x64.dll"),
        (Vulkan, Linux) => Some("libGPUPerfAPIVK.so"),
        (DirectX11, Windows) => Some("GPUPerfAPIDX11-x64.dll"),
        (DirectX12, Windows) => Some("GPUPerfAPIDX12-x64.dll"),
        (OpenGL, Windows) => Some("GPUPerfAPIGL-x64.dll"),
        (OpenGL, Linux) => Some("libGPUPerfAPIGL.so"),
        _ => None,
    }
}
