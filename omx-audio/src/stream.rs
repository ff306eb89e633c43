// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! Copying payload into hardware input buffers.

use std::time::Duration;

use omx::{BufferFlags, ComponentId};
use tracing::trace;

use crate::{
    Error, Result,
    format::FormatHeader,
    hardware::{AudioHardware, HardwareBuffer, HwResult},
};

/// The buffer-bearing input port the payload is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InputPort {
    pub(crate) component: ComponentId,
    pub(crate) port: u32,
    pub(crate) timeout: Option<Duration>,
}

impl InputPort {
    fn acquire<H: AudioHardware>(&self, hardware: &mut H) -> HwResult<H::Buffer> {
        hardware.acquire_input_buffer(self.component, self.port, self.timeout)
    }
}

/// Submits the format header as a codec-config buffer.
pub(crate) fn submit_header<H: AudioHardware>(
    hardware: &mut H,
    input: &InputPort,
    header: &FormatHeader,
) -> HwResult<()> {
    let bytes = header.to_bytes();
    let mut buffer = input.acquire(hardware)?;
    if buffer.capacity() < bytes.len() {
        return Err(omx::Error::InvalidArg(format!(
            "Input buffers of {} bytes cannot hold the {}-byte format header.",
            buffer.capacity(),
            bytes.len()
        )));
    }
    buffer.payload_mut()[..bytes.len()].copy_from_slice(&bytes);
    trace!("submitting format header");
    buffer.submit(
        bytes.len(),
        BufferFlags::CODEC_CONFIG | BufferFlags::END_OF_FRAME,
    )
}

/// Copies `payload` into as many input buffers as it takes.
///
/// The buffer that completes the payload is flagged end-of-frame.
/// `after_submit` runs after every successful submission and may stop the
/// write by returning an error.
pub(crate) fn write_payload<H, F>(
    hardware: &mut H,
    input: &InputPort,
    payload: &[u8],
    mut after_submit: F,
) -> Result<()>
where
    H: AudioHardware,
    F: FnMut(&mut H) -> Result<()>,
{
    let mut remaining = payload;
    while !remaining.is_empty() {
        let mut buffer = input
            .acquire(hardware)
            .map_err(Error::hardware("acquire input buffer"))?;
        let len = remaining.len().min(buffer.capacity());
        if len == 0 {
            return Err(Error::Hardware {
                operation: "acquire input buffer",
                source: omx::Error::Other("Input buffer has no capacity.".to_string()),
            });
        }
        buffer.payload_mut()[..len].copy_from_slice(&remaining[..len]);
        remaining = &remaining[len..];
        let flags = if remaining.is_empty() {
            BufferFlags::END_OF_FRAME
        } else {
            BufferFlags::NONE
        };
        buffer
            .submit(len, flags)
            .map_err(Error::hardware("submit buffer"))?;
        trace!("submitted {len} bytes, {} left", remaining.len());
        after_submit(hardware)?;
    }
    Ok(())
}
