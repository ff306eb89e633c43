// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! RAII input buffer access for feeding a component.

use std::{ops::BitOr, sync::Arc};

use tracing::trace;

use crate::{
    Error, Result,
    component::{ComponentShared, HeaderPtr},
};

/// `nFlags` bits of a submitted buffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferFlags(u32);

impl BufferFlags {
    pub const NONE: Self = Self(0);
    pub const END_OF_STREAM: Self = Self(omx_sys::OMX_BUFFERFLAG_EOS);
    pub const END_OF_FRAME: Self = Self(omx_sys::OMX_BUFFERFLAG_ENDOFFRAME);
    pub const CODEC_CONFIG: Self = Self(omx_sys::OMX_BUFFERFLAG_CODECCONFIG);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for BufferFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A free buffer of a component input port, borrowed for one write.
///
/// Obtained from [`crate::Component::input_buffer`]. Fill the payload, then
/// hand it to the component with [`Self::submit`]. A buffer dropped without
/// being submitted goes back to the port's free list.
///
/// # Examples
///
/// ```no_run
/// # use omx::{BufferFlags, Component};
/// # fn example(decoder: &Component, data: &[u8]) -> Result<(), omx::Error> {
/// let mut buffer = decoder.input_buffer(120, None)?;
/// let len = data.len().min(buffer.capacity());
/// buffer.payload_mut()[..len].copy_from_slice(&data[..len]);
/// buffer.submit(len, BufferFlags::END_OF_FRAME)?;
/// # Ok(())
/// # }
/// ```
pub struct InputBuffer {
    shared: Arc<ComponentShared>,
    port: u32,
    header: HeaderPtr,
    /// Set once the header has been handed back to the component.
    submitted: bool,
}

impl InputBuffer {
    pub(crate) fn new(shared: Arc<ComponentShared>, port: u32, header: HeaderPtr) -> Self {
        Self {
            shared,
            port,
            header,
            submitted: false,
        }
    }

    /// Returns the number of payload bytes the buffer can hold.
    pub fn capacity(&self) -> usize {
        unsafe { (*self.header.0).nAllocLen as usize }
    }

    /// Returns mutable access to the whole payload area.
    pub fn payload_mut(&mut self) -> &mut [u8] {
        // Safety: the header is exclusively ours until submitted and pBuffer
        // spans nAllocLen bytes.
        unsafe {
            let header = &*self.header.0;
            std::slice::from_raw_parts_mut(header.pBuffer, header.nAllocLen as usize)
        }
    }

    /// Hands the first `filled` bytes to the component.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArg`] if `filled` exceeds [`Self::capacity`],
    /// or the status of `EmptyThisBuffer`. In both cases the buffer returns to
    /// the free list.
    pub fn submit(mut self, filled: usize, flags: BufferFlags) -> Result<()> {
        let capacity = self.capacity();
        if filled > capacity {
            return Err(Error::InvalidArg(format!(
                "Filled length {filled} exceeds buffer capacity {capacity}."
            )));
        }
        unsafe {
            let header = &mut *self.header.0;
            header.nOffset = 0;
            header.nFilledLen = filled as u32;
            header.nFlags = flags.bits();
        }
        trace!(
            "{}: submit {filled} bytes on port {} flags {:#x}",
            self.shared.name,
            self.port,
            flags.bits()
        );
        self.submitted = true;
        let result = self.shared.empty_this_buffer(self.header);
        if result.is_err() {
            self.shared.recycle(self.port, self.header);
        }
        result
    }
}

impl Drop for InputBuffer {
    fn drop(&mut self) {
        if !self.submitted {
            self.shared.recycle(self.port, self.header);
        }
    }
}
