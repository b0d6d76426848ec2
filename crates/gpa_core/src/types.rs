//! Plain types shared with the native GPA headers.

use std::ffi::{c_char, c_void};
use std::fmt;
use std::marker::{PhantomData, PhantomPinned};
use std::ptr;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(*mut c_void);

        impl $name {
            pub const NULL: Self = Self(ptr::null_mut());

            pub const fn from_raw(raw: *mut c_void) -> Self {
                Self(raw)
            }

            pub const fn as_raw(self) -> *mut c_void {
                self.0
            }

            pub fn is_null(self) -> bool {
                self.0.is_null()
            }
        }
    };
}

opaque_id!(
    /// Identifier of an opened GPA context.
    GpaContextId
);
opaque_id!(
    /// Identifier of a GPA session.
    GpaSessionId
);
opaque_id!(
    /// Identifier of a command list registered with a session.
    GpaCommandListId
);

macro_rules! native_enum {
    ($(#[$meta:meta])* $name:ident { $($konst:ident = $value:literal),* $(,)? }) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name(pub u32);

        impl $name {
            $(pub const $konst: Self = Self($value);)*
        }
    };
}

native_enum!(
    /// `GpaInitializeFlags` bit set.
    GpaInitializeFlags {
        DEFAULT = 0x00,
        ENABLE_SQTT = 0x01,
        ENABLE_SPM = 0x02,
    }
);

native_enum!(
    /// `GpaOpenContextFlags` bit set.
    GpaOpenContextFlags {
        DEFAULT = 0x00,
        HIDE_DERIVED_COUNTERS = 0x01,
        ENABLE_HARDWARE_COUNTERS = 0x04,
        CLOCK_MODE_NONE = 0x08,
        CLOCK_MODE_PEAK = 0x10,
    }
);

native_enum!(
    /// Sample types a session collects.
    GpaSessionSampleType {
        DISCRETE_COUNTER = 0,
        STREAMING_COUNTER = 1,
        SQTT = 2,
        STREAMING_COUNTER_AND_SQTT = 3,
    }
);

native_enum!(GpaCommandListType {
    NONE = 0,
    PRIMARY = 1,
    SECONDARY = 2,
});

native_enum!(GpaDataType {
    FLOAT64 = 0,
    UINT64 = 1,
});

native_enum!(GpaUsageType {
    RATIO = 0,
    PERCENTAGE = 1,
    CYCLES = 2,
    MILLISECONDS = 3,
    BYTES = 4,
    ITEMS = 5,
    KILOBYTES = 6,
    NANOSECONDS = 7,
});

native_enum!(
    /// Kinds of messages the native logger emits, combinable as a bit set.
    GpaLoggingType {
        NONE = 0x00,
        ERROR = 0x01,
        MESSAGE = 0x02,
        ERROR_AND_MESSAGE = 0x03,
        TRACE = 0x04,
        ERROR_AND_TRACE = 0x05,
        MESSAGE_AND_TRACE = 0x06,
        ERROR_MESSAGE_AND_TRACE = 0x07,
        ALL = 0xFF,
    }
);

native_enum!(GpaHwGeneration {
    NONE = 0,
    NVIDIA = 1,
    INTEL = 2,
    GFX6 = 3,
    GFX7 = 4,
    GFX8 = 5,
    GFX9 = 6,
    GFX10 = 7,
    GFX103 = 8,
    GFX11 = 9,
});

native_enum!(GpaContextSampleTypeFlags {
    DISCRETE_COUNTER = 0x01,
    STREAMING_COUNTER = 0x02,
    SQTT = 0x04,
});

native_enum!(GpaCounterSampleType {
    DISCRETE = 0,
    STREAMING = 1,
});

native_enum!(GpaSqttInstructionFlags {
    NONE = 0x00,
    INCLUDE_VMEM_LOAD = 0x01,
    INCLUDE_SMEM_LOAD = 0x02,
    INCLUDE_ALL = 0x03,
});

/// Native logging callback: `void (*)(GpaLoggingType, const char*)`.
pub type GpaLoggingCallback = unsafe extern "C" fn(GpaLoggingType, *const c_char);

/// Counter UUID as returned by `GpaGetCounterUuid`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GpaUuid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

/// Streaming performance monitor data produced by the native library.
///
/// Only ever handled behind a pointer obtained from native code.
#[repr(C)]
pub struct GpaSpmData {
    _data: [u8; 0],
    _marker: PhantomData<(*mut u8, PhantomPinned)>,
}

/// Version reported by `GpaGetVersion`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GpaVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub update: u32,
}

impl fmt::Display for GpaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.build, self.update)
    }
}
