// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! The decoder → renderer component graph.
//!
//! ```text
//!  payload ─► decoder:120 ── decoder:121 ═══ tunnel ═══► renderer:100 ─► hdmi/local
//! ```
//!
//! Both components move Loaded → Idle → Executing on start and back down on
//! stop. The tunnel is only connected once the decoder has seen the first
//! buffer and published its output format.

use omx::{ComponentId, ComponentState};
use tracing::{debug, warn};

use crate::{
    format::FormatDescriptor,
    hardware::{AudioHardware, HwResult, Param, ParamIndex, TunnelSpec},
    settings::PipelineSettings,
};

/// Components, ports and progress of one pipeline.
#[derive(Debug)]
pub(crate) struct PipelineGraph {
    pub(crate) decoder: ComponentId,
    pub(crate) renderer: ComponentId,
    pub(crate) decoder_input_port: u32,
    pub(crate) tunnel: TunnelSpec,
    buffers_enabled: bool,
    tunnel_established: bool,
    passthrough_enabled: bool,
}

impl PipelineGraph {
    /// Creates the decoder and renderer.
    pub(crate) fn create<H: AudioHardware>(
        hardware: &mut H,
        settings: &PipelineSettings,
    ) -> HwResult<Self> {
        let decoder = hardware.create_component(&settings.decoder)?;
        let renderer = match hardware.create_component(&settings.renderer) {
            Ok(renderer) => renderer,
            Err(error) => {
                if let Err(cleanup) = hardware.cleanup_components(&[decoder]) {
                    warn!("Failed to clean up {}: {cleanup}", settings.decoder);
                }
                return Err(error);
            }
        };
        debug!("Created {decoder} ({}) and {renderer} ({})", settings.decoder, settings.renderer);
        Ok(Self {
            decoder,
            renderer,
            decoder_input_port: settings.decoder_input_port,
            tunnel: TunnelSpec {
                source: decoder,
                source_port: settings.decoder_output_port,
                sink: renderer,
                sink_port: settings.renderer_input_port,
            },
            buffers_enabled: false,
            tunnel_established: false,
            passthrough_enabled: false,
        })
    }

    /// Configures both components for `descriptor` and starts the decoder.
    ///
    /// Leaves the decoder executing with its input buffers allocated and the
    /// renderer idle, waiting for [`Self::finalize`].
    pub(crate) fn negotiate<H: AudioHardware>(
        &mut self,
        hardware: &mut H,
        descriptor: &FormatDescriptor,
        settings: &PipelineSettings,
    ) -> HwResult<()> {
        let encoding = descriptor.format.encoding;
        let port = self.decoder_input_port;

        debug!("{}: input coding {encoding}", self.decoder);
        hardware.set_parameter(self.decoder, port, &Param::PortFormat(encoding.coding()))?;
        hardware.set_parameter(
            self.decoder,
            port,
            &Param::PortBuffers {
                buffer_size: descriptor.buffer_size,
                buffer_count: settings.buffer_count,
            },
        )?;

        if encoding.is_passthrough() {
            hardware.set_parameter(self.decoder, port, &Param::DecoderPassthrough(true))?;
            self.passthrough_enabled = true;
        } else {
            if self.passthrough_enabled {
                hardware.set_parameter(self.decoder, port, &Param::DecoderPassthrough(false))?;
                self.passthrough_enabled = false;
            }
            hardware.set_parameter(self.decoder, port, &Param::Pcm(descriptor.pcm_mode()))?;
        }
        hardware.set_state(self.decoder, ComponentState::Idle)?;

        hardware.set_parameter(
            self.renderer,
            self.tunnel.sink_port,
            &Param::AudioDestination(settings.destination.as_str().to_owned()),
        )?;
        hardware.set_state(self.renderer, ComponentState::Idle)?;

        hardware.enable_port_buffers(self.decoder, port)?;
        self.buffers_enabled = true;
        hardware.set_state(self.decoder, ComponentState::Executing)
    }

    /// Gives the renderer the decoder's output format, connects the tunnel
    /// and starts the renderer.
    pub(crate) fn finalize<H: AudioHardware>(
        &mut self,
        hardware: &mut H,
        descriptor: &FormatDescriptor,
    ) -> HwResult<()> {
        let TunnelSpec {
            source,
            source_port,
            sink,
            sink_port,
        } = self.tunnel;

        let format = hardware.get_parameter(source, source_port, ParamIndex::PortFormat)?;
        hardware.set_parameter(sink, sink_port, &format)?;
        if !descriptor.format.encoding.is_passthrough() {
            let pcm = hardware.get_parameter(source, source_port, ParamIndex::Pcm)?;
            hardware.set_parameter(sink, sink_port, &pcm)?;
        }

        hardware.setup_tunnel(&self.tunnel)?;
        self.tunnel_established = true;
        hardware.set_state(sink, ComponentState::Executing)
    }

    /// Tears the running graph down to `Loaded`, decoder first.
    pub(crate) fn stop<H: AudioHardware>(&mut self, hardware: &mut H) -> HwResult<()> {
        if self.tunnel_established {
            hardware.disable_tunnel(&self.tunnel)?;
            hardware.teardown_tunnel(&self.tunnel)?;
            self.tunnel_established = false;
        }
        if self.buffers_enabled {
            hardware.disable_port_buffers(self.decoder, self.decoder_input_port)?;
            self.buffers_enabled = false;
        }
        hardware.set_state(self.decoder, ComponentState::Idle)?;
        hardware.set_state(self.renderer, ComponentState::Idle)?;
        hardware.set_state(self.decoder, ComponentState::Loaded)?;
        hardware.set_state(self.renderer, ComponentState::Loaded)
    }

    /// Frees both components and shuts the hardware down.
    ///
    /// Failures are logged and otherwise ignored.
    pub(crate) fn destroy<H: AudioHardware>(self, hardware: &mut H) {
        if let Err(error) = hardware.cleanup_components(&[self.decoder, self.renderer]) {
            warn!("Failed to clean up components: {error}");
        }
        if let Err(error) = hardware.shutdown() {
            warn!("Failed to shut down hardware: {error}");
        }
    }
}
