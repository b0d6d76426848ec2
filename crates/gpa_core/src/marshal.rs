//! Marshaling conventions at the native boundary.
//!
//! Native strings are borrowed: GPA keeps ownership and may invalidate them
//! when the owning context or session goes away, so they are copied into a
//! `String` right after the call and the raw address is dropped. Bulk
//! results go into caller-owned buffers described by an address and a
//! declared length that the native side must not exceed.

use std::ffi::{CStr, c_char};
use std::marker::PhantomData;
use std::ptr;

use crate::status::GpaStatus;

/// Copies a native-owned, NUL-terminated string if `status` is
/// `kGpaStatusOk` and `text` is non-null.
///
/// # Safety
///
/// When `status` is `kGpaStatusOk` and `text` is non-null, `text` must point
/// to a NUL-terminated byte sequence that stays valid for the duration of
/// this call.
pub unsafe fn read_borrowed_text(status: GpaStatus, text: *const c_char) -> Option<String> {
    if status != GpaStatus::OK || text.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    let text = unsafe { CStr::from_ptr(text) };
    Some(text.to_string_lossy().into_owned())
}

/// Runs a native query that reports a string through an out-parameter and
/// returns its status together with an owned copy of the string.
///
/// The copy is `None` unless the status is `kGpaStatusOk`.
///
/// # Safety
///
/// `query` must either leave the out-parameter untouched or store a pointer
/// satisfying [`read_borrowed_text`]'s contract.
pub unsafe fn query_text<F>(query: F) -> (GpaStatus, Option<String>)
where
    F: FnOnce(*mut *const c_char) -> GpaStatus,
{
    let mut text: *const c_char = ptr::null();
    let status = query(&mut text);
    // SAFETY: forwarded from this function's contract.
    let owned = unsafe { read_borrowed_text(status, text) };
    (status, owned)
}

/// Caller-owned output buffer handed to a native call as
/// `(address, declared length)`.
///
/// The borrow keeps the slice alive and exclusive for as long as the native
/// side can write to it.
pub struct OutBuffer<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

impl<'a, T> OutBuffer<'a, T> {
    pub fn new(buffer: &'a mut [T]) -> Self {
        Self {
            ptr: buffer.as_mut_ptr(),
            len: buffer.len(),
            _marker: PhantomData,
        }
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr
    }

    /// Length in elements.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length in bytes, for `size_t` size parameters.
    pub fn byte_len(&self) -> usize {
        self.len * size_of::<T>()
    }

    /// Length for `GpaUInt32` count parameters. Buffers longer than
    /// `u32::MAX` elements are declared as `u32::MAX` so the declared bound
    /// never exceeds the real one.
    pub fn len_u32(&self) -> u32 {
        u32::try_from(self.len).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_text_on_success() {
        let text = c"Radeon RX 7900 XTX";
        let owned = unsafe { read_borrowed_text(GpaStatus::OK, text.as_ptr()) };
        assert_eq!(owned.as_deref(), Some("Radeon RX 7900 XTX"));
    }

    #[test]
    fn failed_status_yields_absent_text() {
        let text = c"stale";
        for status in [
            GpaStatus::ERROR_CONTEXT_NOT_FOUND,
            GpaStatus::ERROR_NULL_POINTER,
            GpaStatus::RESULT_NOT_READY,
        ] {
            assert_eq!(unsafe { read_borrowed_text(status, text.as_ptr()) }, None);
        }
    }

    #[test]
    fn null_pointer_yields_absent_text() {
        assert_eq!(unsafe { read_borrowed_text(GpaStatus::OK, ptr::null()) }, None);
    }

    #[test]
    fn query_text_discards_output_of_failed_call() {
        let (status, text) = unsafe {
            query_text(|out| {
                *out = c"partial".as_ptr();
                GpaStatus::ERROR_INDEX_OUT_OF_RANGE
            })
        };
        assert_eq!(status, GpaStatus::ERROR_INDEX_OUT_OF_RANGE);
        assert_eq!(text, None);
    }

    #[test]
    fn query_text_copies_successful_output() {
        let (status, text) = unsafe {
            query_text(|out| {
                *out = c"GPUTime".as_ptr();
                GpaStatus::OK
            })
        };
        assert_eq!(status, GpaStatus::OK);
        assert_eq!(text.as_deref(), Some("GPUTime"));
    }

    #[test]
    fn out_buffer_reports_lengths() {
        let mut storage = [0u64; 6];
        let mut buffer = OutBuffer::new(&mut storage[..4]);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.len_u32(), 4);
        assert_eq!(buffer.byte_len(), 32);
        assert!(!buffer.as_mut_ptr().is_null());

        let mut empty: [u8; 0] = [];
        assert!(OutBuffer::new(&mut empty).is_empty());
    }
}
