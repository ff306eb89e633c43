// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! Tunnels between an output port and an input port.

use tracing::debug;

use crate::{Component, Error, Result};

/// A tunnel from `source_port` of one component to `sink_port` of another.
///
/// The descriptor is plain data; the components are passed to each call so
/// that the tunnel never outlives them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tunnel {
    pub source_port: u32,
    pub sink_port: u32,
}

impl Tunnel {
    pub fn new(source_port: u32, sink_port: u32) -> Self {
        Self {
            source_port,
            sink_port,
        }
    }

    /// Connects the two ports and enables both ends.
    ///
    /// Both ports must be disabled when this is called.
    pub fn establish(&self, source: &Component, sink: &Component) -> Result<()> {
        debug!(
            "tunnel {}:{} -> {}:{}",
            source.name(),
            self.source_port,
            sink.name(),
            self.sink_port
        );
        Error::from_status(unsafe {
            source.api().il.setup_tunnel(
                source.raw_handle(),
                self.source_port,
                sink.raw_handle(),
                self.sink_port,
            )
        })?;
        source.send_command(omx_sys::OMX_CommandPortEnable, self.source_port)?;
        sink.send_command(omx_sys::OMX_CommandPortEnable, self.sink_port)?;
        source.wait_for_command(omx_sys::OMX_CommandPortEnable, self.source_port)?;
        sink.wait_for_command(omx_sys::OMX_CommandPortEnable, self.sink_port)
    }

    /// Disables both ends of an established tunnel.
    pub fn disable(&self, source: &Component, sink: &Component) -> Result<()> {
        source.send_command(omx_sys::OMX_CommandPortDisable, self.source_port)?;
        sink.send_command(omx_sys::OMX_CommandPortDisable, self.sink_port)?;
        source.wait_for_command(omx_sys::OMX_CommandPortDisable, self.source_port)?;
        sink.wait_for_command(omx_sys::OMX_CommandPortDisable, self.sink_port)
    }

    /// Removes the tunnel from both components.
    pub fn teardown(&self, source: &Component, sink: &Component) -> Result<()> {
        let il = &source.api().il;
        let source_result = Error::from_status(unsafe {
            il.setup_tunnel(
                source.raw_handle(),
                self.source_port,
                std::ptr::null_mut(),
                0,
            )
        });
        let sink_result = Error::from_status(unsafe {
            il.setup_tunnel(sink.raw_handle(), self.sink_port, std::ptr::null_mut(), 0)
        });
        source_result.and(sink_result)
    }
}
