//! Vulkan-specific pieces of the GPA interface: the context-open payload and
//! the extensions an application must enable for the AMD GPA interface.

use std::ffi::{CStr, c_void};

use crate::error::Result;
use crate::status::GpaStatus;

pub const VK_AMD_GPA_INTERFACE_EXTENSION_NAME: &CStr = c"VK_AMD_gpa_interface";
pub const VK_AMD_SHADER_CORE_PROPERTIES_EXTENSION_NAME: &CStr = c"VK_AMD_shader_core_properties";
pub const VK_AMD_SHADER_CORE_PROPERTIES_2_EXTENSION_NAME: &CStr =
    c"VK_AMD_shader_core_properties2";
const VK_KHR_GET_PHYSICAL_DEVICE_PROPERTIES_2_EXTENSION_NAME: &CStr =
    c"VK_KHR_get_physical_device_properties2";

/// Payload passed as the API context of `GpaOpenContext` on Vulkan.
///
/// Field order and width match the native `GpaVkContextOpenInfo`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpaVkContextOpenInfo {
    /// `VkInstance`
    pub instance: *mut c_void,
    /// `VkPhysicalDevice`
    pub physical_device: *mut c_void,
    /// `VkDevice`
    pub device: *mut c_void,
}

const _: () = assert!(size_of::<GpaVkContextOpenInfo>() == 3 * size_of::<usize>());

impl GpaVkContextOpenInfo {
    pub fn new(instance: *mut c_void, physical_device: *mut c_void, device: *mut c_void) -> Self {
        Self {
            instance,
            physical_device,
            device,
        }
    }
}

/// The fixed extension lists published for the AMD GPA interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionList {
    RequiredInstance,
    RequiredDevice,
    OptionalDevice,
}

impl ExtensionList {
    pub const fn names(self) -> &'static [&'static CStr] {
        match self {
            Self::RequiredInstance => &[VK_KHR_GET_PHYSICAL_DEVICE_PROPERTIES_2_EXTENSION_NAME],
            Self::RequiredDevice => &[
                VK_AMD_GPA_INTERFACE_EXTENSION_NAME,
                VK_AMD_SHADER_CORE_PROPERTIES_EXTENSION_NAME,
            ],
            Self::OptionalDevice => &[VK_AMD_SHADER_CORE_PROPERTIES_2_EXTENSION_NAME],
        }
    }

    pub const fn count(self) -> usize {
        self.names().len()
    }

    /// Extension name at `index`; out-of-range indices are an
    /// `kGpaStatusErrorIndexOutOfRange` error.
    pub fn get(self, index: usize) -> Result<&'static CStr> {
        let names = self.names();
        names.get(index).copied().ok_or_else(|| {
            GpaStatus::ERROR_INDEX_OUT_OF_RANGE
                .fail_with(format!("{self:?} index {index} must be < {}", names.len()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn lists_have_documented_contents() {
        assert_eq!(ExtensionList::RequiredInstance.count(), 1);
        assert_eq!(ExtensionList::RequiredDevice.count(), 2);
        assert_eq!(ExtensionList::OptionalDevice.count(), 1);

        assert_eq!(
            ExtensionList::RequiredInstance.get(0).unwrap(),
            c"VK_KHR_get_physical_device_properties2"
        );
        assert_eq!(
            ExtensionList::RequiredDevice.get(0).unwrap(),
            VK_AMD_GPA_INTERFACE_EXTENSION_NAME
        );
        assert_eq!(
            ExtensionList::RequiredDevice.get(1).unwrap(),
            VK_AMD_SHADER_CORE_PROPERTIES_EXTENSION_NAME
        );
        assert_eq!(
            ExtensionList::OptionalDevice.get(0).unwrap(),
            VK_AMD_SHADER_CORE_PROPERTIES_2_EXTENSION_NAME
        );
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        for list in [
            ExtensionList::RequiredInstance,
            ExtensionList::RequiredDevice,
            ExtensionList::OptionalDevice,
        ] {
            let err = list.get(list.count()).unwrap_err();
            assert_eq!(err.status(), GpaStatus::ERROR_INDEX_OUT_OF_RANGE);
        }
    }

    #[test]
    fn open_info_keeps_field_order() {
        let info = GpaVkContextOpenInfo::new(
            ptr::without_provenance_mut(0x10),
            ptr::without_provenance_mut(0x20),
            ptr::without_provenance_mut(0x30),
        );
        let words: [usize; 3] = unsafe { std::mem::transmute(info) };
        assert_eq!(words, [0x10, 0x20, 0x30]);
    }
}
