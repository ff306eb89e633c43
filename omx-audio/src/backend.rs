// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! [`AudioHardware`] on top of the OpenMAX IL.

use std::{collections::HashMap, time::Duration};

use crossbeam_channel::Receiver;
use omx::{
    BufferFlags, Component, ComponentId, ComponentState, InputBuffer, Notification, OmxApiHandle,
    OmxCore, Tunnel, config, load_api,
};
use tracing::debug;

use crate::hardware::{AudioHardware, HardwareBuffer, HwResult, Param, ParamIndex, TunnelSpec};

impl HardwareBuffer for InputBuffer {
    fn capacity(&self) -> usize {
        InputBuffer::capacity(self)
    }

    fn payload_mut(&mut self) -> &mut [u8] {
        InputBuffer::payload_mut(self)
    }

    fn submit(self, filled: usize, flags: BufferFlags) -> HwResult<()> {
        InputBuffer::submit(self, filled, flags)
    }
}

/// The VideoCore IL as [`AudioHardware`].
///
/// Owns the IL core and every component created through it.
pub struct OmxHardware {
    core: Option<OmxCore>,
    components: HashMap<ComponentId, Component>,
    notifications: Receiver<Notification>,
}

impl OmxHardware {
    /// Initialises the IL core from already loaded libraries.
    pub fn new(api: OmxApiHandle) -> HwResult<Self> {
        let core = OmxCore::new(api)?;
        let notifications = core.notifications();
        Ok(Self {
            core: Some(core),
            components: HashMap::new(),
            notifications,
        })
    }

    /// Loads the IL and host libraries from the configured directory and
    /// initialises the core.
    pub fn open() -> HwResult<Self> {
        let host = config::get_bcm_host_so_path();
        let api = load_api(config::get_openmaxil_so_path(), Some(host.as_path()))?;
        Self::new(api)
    }

    fn core(&self) -> HwResult<&OmxCore> {
        self.core
            .as_ref()
            .ok_or_else(|| omx::Error::Other("IL core already shut down.".to_string()))
    }

    fn component(&self, id: ComponentId) -> HwResult<&Component> {
        self.components.get(&id).ok_or(omx::Error::InvalidComponent)
    }

    fn tunnel_ends(&self, tunnel: &TunnelSpec) -> HwResult<(Tunnel, &Component, &Component)> {
        Ok((
            Tunnel::new(tunnel.source_port, tunnel.sink_port),
            self.component(tunnel.source)?,
            self.component(tunnel.sink)?,
        ))
    }
}

impl AudioHardware for OmxHardware {
    type Buffer = InputBuffer;

    fn create_component(&mut self, name: &str) -> HwResult<ComponentId> {
        let component = self.core()?.create_component(name)?;
        let id = component.id();
        self.components.insert(id, component);
        Ok(id)
    }

    fn set_state(&mut self, component: ComponentId, state: ComponentState) -> HwResult<()> {
        self.component(component)?.set_state(state)
    }

    fn get_parameter(
        &mut self,
        component: ComponentId,
        port: u32,
        index: ParamIndex,
    ) -> HwResult<Param> {
        let component = self.component(component)?;
        Ok(match index {
            ParamIndex::PortFormat => Param::PortFormat(component.audio_port_format(port)?),
            ParamIndex::Pcm => Param::Pcm(component.pcm_mode(port)?),
        })
    }

    fn set_parameter(
        &mut self,
        component: ComponentId,
        port: u32,
        param: &Param,
    ) -> HwResult<()> {
        let component = self.component(component)?;
        match param {
            Param::PortFormat(coding) => component.set_audio_port_format(port, *coding),
            Param::PortBuffers {
                buffer_size,
                buffer_count,
            } => component.set_port_buffers(port, *buffer_size, *buffer_count),
            Param::Pcm(mode) => component.set_pcm_mode(port, mode),
            Param::DecoderPassthrough(enabled) => component.set_decoder_passthrough(*enabled),
            Param::AudioDestination(destination) => component.set_audio_destination(destination),
        }
    }

    fn enable_port_buffers(&mut self, component: ComponentId, port: u32) -> HwResult<()> {
        self.component(component)?.enable_port_buffers(port)
    }

    fn disable_port_buffers(&mut self, component: ComponentId, port: u32) -> HwResult<()> {
        self.component(component)?.disable_port_buffers(port)
    }

    fn acquire_input_buffer(
        &mut self,
        component: ComponentId,
        port: u32,
        timeout: Option<Duration>,
    ) -> HwResult<InputBuffer> {
        self.component(component)?.input_buffer(port, timeout)
    }

    fn setup_tunnel(&mut self, tunnel: &TunnelSpec) -> HwResult<()> {
        let (tunnel, source, sink) = self.tunnel_ends(tunnel)?;
        tunnel.establish(source, sink)
    }

    fn disable_tunnel(&mut self, tunnel: &TunnelSpec) -> HwResult<()> {
        let (tunnel, source, sink) = self.tunnel_ends(tunnel)?;
        tunnel.disable(source, sink)
    }

    fn teardown_tunnel(&mut self, tunnel: &TunnelSpec) -> HwResult<()> {
        let (tunnel, source, sink) = self.tunnel_ends(tunnel)?;
        tunnel.teardown(source, sink)
    }

    fn cleanup_components(&mut self, components: &[ComponentId]) -> HwResult<()> {
        let owned = components
            .iter()
            .filter_map(|id| self.components.remove(id))
            .collect();
        self.core()?.cleanup_components(owned)
    }

    fn shutdown(&mut self) -> HwResult<()> {
        // Components still alive would keep the core referenced.
        self.components.clear();
        match self.core.take() {
            Some(core) => {
                debug!("Shutting down IL core");
                core.destroy()
            }
            None => Ok(()),
        }
    }

    fn notifications(&self) -> Receiver<Notification> {
        self.notifications.clone()
    }
}
