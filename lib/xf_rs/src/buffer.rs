// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use libc::c_char;

use std::ffi::CStr;

pub const ERROR_BUFFER_LEN: usize = 200;

/// Fixed-size, NUL-terminated message storage handed to the driver on
/// failure. The address stays valid until the owner is dropped; the text
/// until the next call to [`ErrorBuffer::set`].
pub struct ErrorBuffer {
    bytes: [u8; ERROR_BUFFER_LEN],
}

impl ErrorBuffer {
    pub fn new() -> ErrorBuffer {
        ErrorBuffer {
            bytes: [0; ERROR_BUFFER_LEN],
        }
    }

    /// Stores `message`, truncated to fit (on a UTF-8 boundary) and cut at
    /// the first interior NUL.
    pub fn set(&mut self, message: &str) -> *const c_char {
        let text = message.split('\0').next().unwrap_or("");

        let mut end = text.len().min(ERROR_BUFFER_LEN - 1);
        while !text.is_char_boundary(end) {
            end -= 1;
        }

        self.bytes = [0; ERROR_BUFFER_LEN];
        self.bytes[..end].copy_from_slice(&text.as_bytes()[..end]);

        self.as_ptr()
    }

    pub fn as_str(&self) -> &str {
        let len = self
            .bytes
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(ERROR_BUFFER_LEN);
        std::str::from_utf8(&self.bytes[..len]).unwrap_or("")
    }

    pub fn as_ptr(&self) -> *const c_char {
        self.bytes.as_ptr() as *const c_char
    }
}

impl Default for ErrorBuffer {
    fn default() -> Self {
        ErrorBuffer::new()
    }
}

/// Stores an address bit-for-bit in a double slot.
pub fn pointer_to_slot(ptr: *const c_char) -> f64 {
    f64::from_bits(ptr as usize as u64)
}

/// Reads back a message whose address was stored with [`pointer_to_slot`].
///
/// # Safety
/// `slot` must have been produced by [`pointer_to_slot`] from a pointer to
/// a NUL-terminated string that is still alive.
pub unsafe fn message_from_slot<'a>(slot: f64) -> Option<&'a CStr> {
    let ptr = slot.to_bits() as usize as *const c_char;
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr))
    }
}
