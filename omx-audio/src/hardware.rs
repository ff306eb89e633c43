// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! The hardware surface the pipeline is built on.
//!
//! [`AudioHardware`] is the seam between the pipeline logic and the IL: the
//! production implementation is [`crate::OmxHardware`], tests drive the
//! pipeline against a recording mock.

use std::time::Duration;

use crossbeam_channel::Receiver;
use omx::{AudioCoding, BufferFlags, ComponentId, ComponentState, Notification, PcmMode};

/// Result of a hardware call.
pub type HwResult<T> = core::result::Result<T, omx::Error>;

/// Parameter blocks the pipeline reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamIndex {
    PortFormat,
    Pcm,
}

/// A parameter or config value of one port or component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// Encoding of an audio port.
    PortFormat(AudioCoding),
    /// Buffer geometry of a port.
    PortBuffers { buffer_size: u32, buffer_count: u32 },
    /// Linear PCM description of a port.
    Pcm(PcmMode),
    /// Decoder forwards compressed input unmodified.
    DecoderPassthrough(bool),
    /// Output the renderer plays to.
    AudioDestination(String),
}

/// An output port tunnelled into an input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TunnelSpec {
    pub source: ComponentId,
    pub source_port: u32,
    pub sink: ComponentId,
    pub sink_port: u32,
}

/// A free hardware input buffer, borrowed for one submission.
pub trait HardwareBuffer {
    /// Payload bytes the buffer can hold.
    fn capacity(&self) -> usize;

    fn payload_mut(&mut self) -> &mut [u8];

    /// Hands the first `filled` bytes to the component. Filling more than
    /// [`Self::capacity`] is rejected.
    fn submit(self, filled: usize, flags: BufferFlags) -> HwResult<()>;
}

/// Component, port, buffer and tunnel primitives of the audio hardware.
///
/// Every call blocks until the hardware acknowledges it.
pub trait AudioHardware {
    type Buffer: HardwareBuffer;

    /// Creates a component with all of its ports disabled.
    fn create_component(&mut self, name: &str) -> HwResult<ComponentId>;

    /// Moves a component to `state`; already being there is not an error.
    fn set_state(&mut self, component: ComponentId, state: ComponentState) -> HwResult<()>;

    fn get_parameter(
        &mut self,
        component: ComponentId,
        port: u32,
        index: ParamIndex,
    ) -> HwResult<Param>;

    /// Sets a parameter. `port` is ignored by component-wide values.
    fn set_parameter(&mut self, component: ComponentId, port: u32, param: &Param)
    -> HwResult<()>;

    /// Enables `port` and allocates its buffers.
    fn enable_port_buffers(&mut self, component: ComponentId, port: u32) -> HwResult<()>;

    /// Disables `port` and frees its buffers.
    fn disable_port_buffers(&mut self, component: ComponentId, port: u32) -> HwResult<()>;

    /// Waits for a free input buffer, forever when `timeout` is `None`.
    fn acquire_input_buffer(
        &mut self,
        component: ComponentId,
        port: u32,
        timeout: Option<Duration>,
    ) -> HwResult<Self::Buffer>;

    /// Connects and enables both ends of a tunnel.
    fn setup_tunnel(&mut self, tunnel: &TunnelSpec) -> HwResult<()>;

    /// Disables both ends of a tunnel.
    fn disable_tunnel(&mut self, tunnel: &TunnelSpec) -> HwResult<()>;

    /// Removes a tunnel from both components.
    fn teardown_tunnel(&mut self, tunnel: &TunnelSpec) -> HwResult<()>;

    /// Steps the components down to `Loaded` and frees them as one unit.
    fn cleanup_components(&mut self, components: &[ComponentId]) -> HwResult<()>;

    /// Releases the hardware core once every component is gone.
    fn shutdown(&mut self) -> HwResult<()>;

    /// Errors, end-of-stream and port-format notifications of all components.
    fn notifications(&self) -> Receiver<Notification>;
}
