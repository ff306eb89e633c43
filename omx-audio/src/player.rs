// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! The caller-facing pipeline: create, start, write, stop, destroy.

use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use omx::{Event, Notification};
use tracing::{debug, error, info, trace, warn};

use crate::{
    Error, Result,
    format::{FormatDescriptor, StreamFormat},
    graph::PipelineGraph,
    hardware::AudioHardware,
    settings::PipelineSettings,
    stream::{self, InputPort},
};

/// Lifecycle state of an [`AudioPlayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    /// Components exist but nothing has been negotiated.
    Created,
    /// Negotiated and accepting payload.
    Started,
    /// Torn down to `Loaded`; may be started again.
    Stopped,
    /// A hardware call failed; only destroying the player is allowed.
    Faulted,
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlayerState::Created => "created",
            PlayerState::Started => "started",
            PlayerState::Stopped => "stopped",
            PlayerState::Faulted => "faulted",
        })
    }
}

/// A hardware audio output pipeline.
///
/// Owns one decoder, one renderer and the tunnel between them. Every call
/// blocks until the hardware has acknowledged it.
///
/// # Examples
///
/// ```no_run
/// use omx_audio::{AudioPlayer, OmxHardware, PipelineSettings, StreamFormat};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let hardware = OmxHardware::open()?;
/// let mut player = AudioPlayer::create(hardware, PipelineSettings::default())?;
///
/// player.start(&StreamFormat::pcm(2, 16, 48_000))?;
/// player.write(&[0u8; 4096])?;
/// player.stop()?;
/// player.destroy();
/// # Ok(())
/// # }
/// ```
pub struct AudioPlayer<H: AudioHardware> {
    hardware: H,
    settings: PipelineSettings,
    graph: Option<PipelineGraph>,
    notifications: Receiver<Notification>,
    state: PlayerState,
    descriptor: Option<FormatDescriptor>,
    header_pending: bool,
    first_frame_sent: AtomicBool,
    port_settings_changed: AtomicBool,
}

impl<H: AudioHardware> AudioPlayer<H> {
    /// Creates the decoder and renderer on `hardware`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for unusable settings and
    /// [`Error::Hardware`] if a component cannot be created. The hardware is
    /// shut down in both cases.
    pub fn create(mut hardware: H, settings: PipelineSettings) -> Result<Self> {
        let graph = settings
            .validate()
            .map_err(Error::from)
            .and_then(|()| {
                PipelineGraph::create(&mut hardware, &settings).map_err(Error::hardware("create"))
            });
        let graph = match graph {
            Ok(graph) => graph,
            Err(error) => {
                if let Err(shutdown) = hardware.shutdown() {
                    warn!("Failed to shut down hardware: {shutdown}");
                }
                return Err(error);
            }
        };
        let notifications = hardware.notifications();
        info!("Audio player created");
        Ok(Self {
            hardware,
            settings,
            graph: Some(graph),
            notifications,
            state: PlayerState::Created,
            descriptor: None,
            header_pending: false,
            first_frame_sent: AtomicBool::new(false),
            port_settings_changed: AtomicBool::new(false),
        })
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// The format negotiated by the last [`Self::start`].
    pub fn descriptor(&self) -> Option<&FormatDescriptor> {
        self.descriptor.as_ref()
    }

    /// Maximum number of channels the pipeline outputs.
    pub fn max_output_channels(&self) -> u32 {
        crate::format::max_output_channels()
    }

    fn check_usable(&self, operation: &'static str) -> Result<()> {
        match self.state {
            PlayerState::Faulted => Err(Error::Faulted),
            _ if self.graph.is_none() => Err(Error::InvalidState {
                operation,
                state: self.state,
            }),
            _ => Ok(()),
        }
    }

    /// Marks the player faulted on hardware failures and passes the error on.
    fn fault(&mut self, error: Error) -> Error {
        if matches!(error, Error::Hardware { .. }) {
            error!("Audio pipeline faulted: {error}");
            self.state = PlayerState::Faulted;
        }
        error
    }

    /// Negotiates `format` and starts the decoder.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the format is unsupported (nothing is touched)
    /// - [`Error::InvalidState`] if the player is already started
    /// - [`Error::Hardware`] if negotiation fails; the player is faulted
    pub fn start(&mut self, format: &StreamFormat) -> Result<()> {
        self.check_usable("start")?;
        if self.state == PlayerState::Started {
            return Err(Error::InvalidState {
                operation: "start",
                state: self.state,
            });
        }
        let descriptor = FormatDescriptor::build(format, self.settings.frames_per_buffer)?;
        self.drain_notifications();

        let Some(graph) = self.graph.as_mut() else {
            return Err(Error::Faulted);
        };
        if let Err(error) = graph.negotiate(&mut self.hardware, &descriptor, &self.settings) {
            return Err(self.fault(Error::hardware("start")(error)));
        }

        self.first_frame_sent.store(false, Ordering::SeqCst);
        self.port_settings_changed.store(false, Ordering::SeqCst);
        self.header_pending = !format.encoding.is_passthrough();
        self.descriptor = Some(descriptor);
        self.state = PlayerState::Started;
        info!(
            "Started {} channels ({} out), {} bit, {} Hz, {}",
            format.channels,
            descriptor.output_channels,
            format.bit_depth,
            format.sample_rate,
            format.encoding
        );
        Ok(())
    }

    /// Streams `payload` into the decoder.
    ///
    /// Blocks while all input buffers are in use. The first write after
    /// [`Self::start`] also connects the renderer.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] unless the player is started
    /// - [`Error::Hardware`] if a buffer cannot be acquired or submitted; the
    ///   player is faulted
    pub fn write(&mut self, payload: &[u8]) -> Result<()> {
        self.check_usable("write")?;
        if self.state != PlayerState::Started {
            return Err(Error::InvalidState {
                operation: "write",
                state: self.state,
            });
        }
        self.drain_notifications();
        if payload.is_empty() {
            return Ok(());
        }
        match self.write_started(payload) {
            Ok(()) => Ok(()),
            Err(error) => Err(self.fault(error)),
        }
    }

    fn write_started(&mut self, payload: &[u8]) -> Result<()> {
        let (Some(graph), Some(descriptor)) = (self.graph.as_mut(), self.descriptor) else {
            return Err(Error::Faulted);
        };
        let input = InputPort {
            component: graph.decoder,
            port: graph.decoder_input_port,
            timeout: self.settings.buffer_timeout(),
        };

        if self.header_pending {
            stream::submit_header(&mut self.hardware, &input, &descriptor.header())
                .map_err(Error::hardware("submit format header"))?;
            self.header_pending = false;
        }

        let first_frame_sent = &self.first_frame_sent;
        let port_settings_changed = &self.port_settings_changed;
        let notifications = &self.notifications;
        let timeout = self.settings.port_settings_timeout();
        stream::write_payload(&mut self.hardware, &input, payload, |hardware| {
            if first_frame_sent.swap(true, Ordering::SeqCst) {
                return Ok(());
            }
            let watch = PortWatch {
                notifications,
                port_settings_changed,
                decoder: graph.decoder,
                decoder_output_port: graph.tunnel.source_port,
            };
            watch.wait(timeout);
            graph
                .finalize(hardware, &descriptor)
                .map_err(Error::hardware("connect renderer"))?;
            info!("Renderer connected");
            Ok(())
        })
    }

    /// Stops playback and returns both components to `Loaded`.
    ///
    /// Does nothing unless the player is started.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Hardware`] if a transition fails; the player is
    /// faulted.
    pub fn stop(&mut self) -> Result<()> {
        self.check_usable("stop")?;
        if self.state != PlayerState::Started {
            return Ok(());
        }
        self.drain_notifications();
        let Some(graph) = self.graph.as_mut() else {
            return Err(Error::Faulted);
        };
        if let Err(error) = graph.stop(&mut self.hardware) {
            return Err(self.fault(Error::hardware("stop")(error)));
        }
        self.state = PlayerState::Stopped;
        info!("Stopped");
        Ok(())
    }

    /// Releases the components and the hardware.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn destroy(mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.drain_notifications();
        let Some(mut graph) = self.graph.take() else {
            return;
        };
        if self.state == PlayerState::Started
            && let Err(error) = graph.stop(&mut self.hardware)
        {
            warn!("Failed to stop before destroying: {error}");
        }
        graph.destroy(&mut self.hardware);
        info!("Audio player destroyed");
    }

    /// Logs every notification received so far.
    fn drain_notifications(&self) {
        let Some(graph) = self.graph.as_ref() else {
            return;
        };
        let watch = PortWatch {
            notifications: &self.notifications,
            port_settings_changed: &self.port_settings_changed,
            decoder: graph.decoder,
            decoder_output_port: graph.tunnel.source_port,
        };
        while let Ok(notification) = self.notifications.try_recv() {
            watch.handle(notification);
        }
    }
}

impl<H: AudioHardware> Drop for AudioPlayer<H> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Consumes notifications, logging them and recording when the decoder
/// publishes its output format.
struct PortWatch<'a> {
    notifications: &'a Receiver<Notification>,
    port_settings_changed: &'a AtomicBool,
    decoder: omx::ComponentId,
    decoder_output_port: u32,
}

impl PortWatch<'_> {
    fn handle(&self, notification: Notification) {
        let Notification { component, event } = notification;
        match event {
            Event::Error { status } => {
                if event.error().is_some_and(|error| error.is_same_state()) {
                    trace!("{component}: already in requested state");
                } else {
                    error!("omx error: {status:#x} ({component})");
                }
            }
            Event::EndOfStream { port } => info!("eos ({component} port {port})"),
            Event::PortSettingsChanged { port } => {
                debug!("{component}: port {port} settings changed");
                if component == self.decoder && port == self.decoder_output_port {
                    self.port_settings_changed.store(true, Ordering::SeqCst);
                }
            }
        }
    }

    /// Waits up to `timeout` for the decoder output format.
    fn wait(&self, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        while !self.port_settings_changed.load(Ordering::SeqCst) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.notifications.recv_timeout(remaining) {
                Ok(notification) => self.handle(notification),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                    warn!(
                        "Decoder output format not reported within {timeout:?}, connecting renderer anyway"
                    );
                    return;
                }
            }
        }
    }
}
