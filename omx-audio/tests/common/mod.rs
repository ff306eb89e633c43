// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! A recording [`AudioHardware`] for driving the pipeline without a board.

#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender, unbounded};
use omx::{AudioCoding, BufferFlags, ComponentId, ComponentState, Event, Notification, PcmMode};
use omx_audio::{AudioHardware, HardwareBuffer, HwResult, Param, ParamIndex, TunnelSpec};

/// Decoder output port the mock announces a format change on.
pub const DECODER_OUTPUT_PORT: u32 = 121;

/// A hardware call as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateComponent(String),
    SetState(ComponentId, ComponentState),
    GetParameter(ComponentId, u32, ParamIndex),
    SetParameter(ComponentId, u32, Param),
    EnablePortBuffers(ComponentId, u32),
    DisablePortBuffers(ComponentId, u32),
    Submit {
        component: ComponentId,
        port: u32,
        flags: BufferFlags,
        bytes: Vec<u8>,
    },
    SetupTunnel(TunnelSpec),
    DisableTunnel(TunnelSpec),
    TeardownTunnel(TunnelSpec),
    CleanupComponents(Vec<ComponentId>),
    Shutdown,
}

/// Calls the mock should fail with [`omx::Error::Hardware`].
#[derive(Debug, Default, Clone)]
pub struct Faults {
    /// Component name whose creation fails.
    pub create: Option<String>,
    /// Target state whose transitions fail.
    pub set_state: Option<ComponentState>,
    /// Buffer submissions fail.
    pub submit: bool,
}

/// Shared view of what the mock recorded.
#[derive(Debug, Clone)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
    faults: Arc<Mutex<Faults>>,
    notify: Sender<Notification>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Submitted buffers in order: flags and bytes.
    pub fn submits(&self) -> Vec<(BufferFlags, Vec<u8>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Submit { flags, bytes, .. } => Some((flags, bytes)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    pub fn position(&self, call: &Call) -> Option<usize> {
        self.calls().iter().position(|recorded| recorded == call)
    }

    pub fn set_faults(&self, faults: Faults) {
        *self.faults.lock().unwrap() = faults;
    }

    /// Injects an asynchronous notification.
    pub fn notify(&self, component: ComponentId, event: Event) {
        self.notify
            .send(Notification { component, event })
            .unwrap();
    }
}

pub struct MockHardware {
    calls: Arc<Mutex<Vec<Call>>>,
    faults: Arc<Mutex<Faults>>,
    next_id: u32,
    capacity: usize,
    decoder: Option<ComponentId>,
    announced: Arc<AtomicBool>,
    notify_tx: Sender<Notification>,
    notify_rx: Receiver<Notification>,
}

impl MockHardware {
    /// A mock whose input buffers hold `capacity` bytes.
    pub fn new(capacity: usize) -> (Self, Recorder) {
        let (notify_tx, notify_rx) = unbounded();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let faults = Arc::new(Mutex::new(Faults::default()));
        let recorder = Recorder {
            calls: Arc::clone(&calls),
            faults: Arc::clone(&faults),
            notify: notify_tx.clone(),
        };
        let hardware = Self {
            calls,
            faults,
            next_id: 0,
            capacity,
            decoder: None,
            announced: Arc::new(AtomicBool::new(false)),
            notify_tx,
            notify_rx,
        };
        (hardware, recorder)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn faults(&self) -> Faults {
        self.faults.lock().unwrap().clone()
    }
}

impl AudioHardware for MockHardware {
    type Buffer = MockBuffer;

    fn create_component(&mut self, name: &str) -> HwResult<ComponentId> {
        self.record(Call::CreateComponent(name.to_owned()));
        if self.faults().create.as_deref() == Some(name) {
            return Err(omx::Error::Hardware);
        }
        self.next_id += 1;
        let id = ComponentId(self.next_id);
        self.decoder.get_or_insert(id);
        Ok(id)
    }

    fn set_state(&mut self, component: ComponentId, state: ComponentState) -> HwResult<()> {
        self.record(Call::SetState(component, state));
        if self.faults().set_state == Some(state) {
            return Err(omx::Error::Hardware);
        }
        Ok(())
    }

    fn get_parameter(
        &mut self,
        component: ComponentId,
        port: u32,
        index: ParamIndex,
    ) -> HwResult<Param> {
        self.record(Call::GetParameter(component, port, index));
        Ok(match index {
            ParamIndex::PortFormat => Param::PortFormat(AudioCoding::Pcm),
            ParamIndex::Pcm => Param::Pcm(PcmMode::default()),
        })
    }

    fn set_parameter(&mut self, component: ComponentId, port: u32, param: &Param) -> HwResult<()> {
        self.record(Call::SetParameter(component, port, param.clone()));
        Ok(())
    }

    fn enable_port_buffers(&mut self, component: ComponentId, port: u32) -> HwResult<()> {
        self.record(Call::EnablePortBuffers(component, port));
        self.announced.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn disable_port_buffers(&mut self, component: ComponentId, port: u32) -> HwResult<()> {
        self.record(Call::DisablePortBuffers(component, port));
        Ok(())
    }

    fn acquire_input_buffer(
        &mut self,
        component: ComponentId,
        port: u32,
        _timeout: Option<Duration>,
    ) -> HwResult<MockBuffer> {
        Ok(MockBuffer {
            component,
            port,
            data: vec![0; self.capacity],
            calls: Arc::clone(&self.calls),
            fail: self.faults().submit,
            decoder: self.decoder,
            announced: Arc::clone(&self.announced),
            notify: self.notify_tx.clone(),
        })
    }

    fn setup_tunnel(&mut self, tunnel: &TunnelSpec) -> HwResult<()> {
        self.record(Call::SetupTunnel(*tunnel));
        Ok(())
    }

    fn disable_tunnel(&mut self, tunnel: &TunnelSpec) -> HwResult<()> {
        self.record(Call::DisableTunnel(*tunnel));
        Ok(())
    }

    fn teardown_tunnel(&mut self, tunnel: &TunnelSpec) -> HwResult<()> {
        self.record(Call::TeardownTunnel(*tunnel));
        Ok(())
    }

    fn cleanup_components(&mut self, components: &[ComponentId]) -> HwResult<()> {
        self.record(Call::CleanupComponents(components.to_vec()));
        Ok(())
    }

    fn shutdown(&mut self) -> HwResult<()> {
        self.record(Call::Shutdown);
        Ok(())
    }

    fn notifications(&self) -> Receiver<Notification> {
        self.notify_rx.clone()
    }
}

/// Input buffer of [`MockHardware`].
///
/// The first payload buffer after the decoder buffers are enabled makes the
/// decoder announce its output format, like the firmware does.
pub struct MockBuffer {
    component: ComponentId,
    port: u32,
    data: Vec<u8>,
    calls: Arc<Mutex<Vec<Call>>>,
    fail: bool,
    decoder: Option<ComponentId>,
    announced: Arc<AtomicBool>,
    notify: Sender<Notification>,
}

impl HardwareBuffer for MockBuffer {
    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn submit(self, filled: usize, flags: BufferFlags) -> HwResult<()> {
        if filled > self.data.len() {
            return Err(omx::Error::InvalidArg(format!(
                "{filled} bytes exceed the {}-byte buffer",
                self.data.len()
            )));
        }
        if self.fail {
            return Err(omx::Error::Hardware);
        }
        self.calls.lock().unwrap().push(Call::Submit {
            component: self.component,
            port: self.port,
            flags,
            bytes: self.data[..filled].to_vec(),
        });
        if !flags.contains(BufferFlags::CODEC_CONFIG)
            && !self.announced.swap(true, Ordering::SeqCst)
            && let Some(decoder) = self.decoder
        {
            let _ = self.notify.send(Notification {
                component: decoder,
                event: Event::PortSettingsChanged {
                    port: DECODER_OUTPUT_PORT,
                },
            });
        }
        Ok(())
    }
}
