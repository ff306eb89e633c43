// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! IL components with synchronous commands.
//!
//! The IL completes commands asynchronously through `EventHandler`. A
//! [`Component`] hides this: every state or port command is sent and then
//! waited for, so callers see a plain blocking call that either succeeds or
//! returns the status the component reported.

use std::{
    collections::{HashMap, VecDeque},
    ffi::c_void,
    ptr,
    sync::{
        Arc, Condvar, Mutex,
        atomic::{AtomicPtr, Ordering},
    },
    time::{Duration, Instant},
};

use crossbeam_channel::Sender;
use tracing::{debug, error, trace};

use crate::{
    Error, InputBuffer, Result,
    core::CoreContext,
    error::poisoned,
    event::{ComponentId, Event, Notification},
    params::{AudioCoding, ComponentState, InitStructure, PcmMode, PortDefinition},
};

/// How long a state or port command may take before it is reported as
/// [`Error::Timeout`].
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Buffer header pointer owned by the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HeaderPtr(pub(crate) *mut omx_sys::BufferHeader);

// Safety: headers are only dereferenced by the holder that took them out of
// the free list; the list itself is guarded by a mutex.
unsafe impl Send for HeaderPtr {}

#[derive(Debug, Clone, Copy)]
struct RawEvent {
    kind: omx_sys::EventType,
    data1: u32,
    data2: u32,
}

impl RawEvent {
    fn completes(&self, command: omx_sys::CommandType, data: u32) -> bool {
        self.kind == omx_sys::OMX_EventCmdComplete && self.data1 == command && self.data2 == data
    }
}

#[derive(Default)]
struct PortBuffers {
    allocated: Vec<HeaderPtr>,
    free: VecDeque<HeaderPtr>,
}

/// State shared between a [`Component`], its outstanding buffers and the IL
/// callback thread.
///
/// A pointer to this struct is registered as the component's `pAppData`, so
/// it must outlive the IL handle.
pub(crate) struct ComponentShared {
    pub(crate) id: ComponentId,
    pub(crate) name: String,
    handle: AtomicPtr<c_void>,
    events: Mutex<Vec<RawEvent>>,
    events_changed: Condvar,
    buffers: Mutex<HashMap<u32, PortBuffers>>,
    buffers_changed: Condvar,
    notify: Sender<Notification>,
}

impl ComponentShared {
    pub(crate) fn new(id: ComponentId, name: &str, notify: Sender<Notification>) -> Self {
        Self {
            id,
            name: name.to_string(),
            handle: AtomicPtr::new(ptr::null_mut()),
            events: Mutex::new(Vec::new()),
            events_changed: Condvar::new(),
            buffers: Mutex::new(HashMap::new()),
            buffers_changed: Condvar::new(),
            notify,
        }
    }

    pub(crate) fn handle(&self) -> omx_sys::Handle {
        self.handle.load(Ordering::Acquire)
    }

    pub(crate) fn set_handle(&self, handle: omx_sys::Handle) {
        self.handle.store(handle, Ordering::Release);
    }

    fn table(&self) -> Result<(&omx_sys::ComponentType, omx_sys::Handle)> {
        let handle = self.handle();
        if handle.is_null() {
            return Err(Error::InvalidComponent);
        }
        // Safety: a non-null handle returned by OMX_GetHandle points to the
        // component's function table until OMX_FreeHandle.
        Ok((unsafe { &*(handle as *const omx_sys::ComponentType) }, handle))
    }

    pub(crate) fn empty_this_buffer(&self, header: HeaderPtr) -> Result<()> {
        let (table, handle) = self.table()?;
        let empty = table.EmptyThisBuffer.ok_or(Error::NotImplemented)?;
        Error::from_status(unsafe { empty(handle, header.0) })
    }

    /// Puts a buffer back on the free list of its port.
    pub(crate) fn recycle(&self, port: u32, header: HeaderPtr) {
        match self.buffers.lock() {
            Ok(mut buffers) => {
                if let Some(pool) = buffers.get_mut(&port)
                    && !pool.free.contains(&header)
                {
                    pool.free.push_back(header);
                }
                self.buffers_changed.notify_all();
            }
            Err(error) => error!("{}: buffer list poisoned: {error}", self.name),
        }
    }

    fn push_event(&self, event: RawEvent) {
        match self.events.lock() {
            Ok(mut events) => {
                events.push(event);
                self.events_changed.notify_all();
            }
            Err(error) => error!("{}: event list poisoned: {error}", self.name),
        }
    }

    fn forward(&self, event: Event) {
        // Fails only once the core is gone.
        let _ = self.notify.send(Notification {
            component: self.id,
            event,
        });
    }
}

unsafe extern "C" fn event_handler(
    _component: omx_sys::Handle,
    app_data: omx_sys::Ptr,
    event: omx_sys::EventType,
    data1: u32,
    data2: u32,
    _event_data: omx_sys::Ptr,
) -> omx_sys::ErrorType {
    if app_data.is_null() {
        return omx_sys::OMX_ErrorNone;
    }
    // Safety: app_data is the ComponentShared registered at OMX_GetHandle,
    // which the owning Component keeps alive until OMX_FreeHandle returns.
    let shared = unsafe { &*(app_data as *const ComponentShared) };
    trace!(
        "{}: event {event} data1 {data1:#x} data2 {data2:#x}",
        shared.name
    );
    match event {
        omx_sys::OMX_EventCmdComplete => shared.push_event(RawEvent {
            kind: event,
            data1,
            data2,
        }),
        omx_sys::OMX_EventError => {
            shared.push_event(RawEvent {
                kind: event,
                data1,
                data2,
            });
            shared.forward(Event::Error { status: data1 });
        }
        omx_sys::OMX_EventPortSettingsChanged => {
            shared.forward(Event::PortSettingsChanged { port: data1 })
        }
        omx_sys::OMX_EventBufferFlag if data2 & omx_sys::OMX_BUFFERFLAG_EOS != 0 => {
            shared.forward(Event::EndOfStream { port: data1 })
        }
        _ => {}
    }
    omx_sys::OMX_ErrorNone
}

unsafe extern "C" fn empty_buffer_done(
    _component: omx_sys::Handle,
    app_data: omx_sys::Ptr,
    buffer: *mut omx_sys::BufferHeader,
) -> omx_sys::ErrorType {
    if app_data.is_null() || buffer.is_null() {
        return omx_sys::OMX_ErrorNone;
    }
    // Safety: see event_handler.
    let shared = unsafe { &*(app_data as *const ComponentShared) };
    let port = unsafe { (*buffer).nInputPortIndex };
    shared.recycle(port, HeaderPtr(buffer));
    omx_sys::OMX_ErrorNone
}

unsafe extern "C" fn fill_buffer_done(
    _component: omx_sys::Handle,
    _app_data: omx_sys::Ptr,
    _buffer: *mut omx_sys::BufferHeader,
) -> omx_sys::ErrorType {
    // Output ports are only ever tunnelled.
    omx_sys::OMX_ErrorNone
}

pub(crate) const CALLBACKS: omx_sys::Callbacks = omx_sys::Callbacks {
    EventHandler: Some(event_handler),
    EmptyBufferDone: Some(empty_buffer_done),
    FillBufferDone: Some(fill_buffer_done),
};

/// A single IL component instance.
///
/// Created by [`crate::OmxCore::create_component`] with every port disabled.
/// The IL handle is freed when the component is released or dropped.
///
/// # Thread Safety
///
/// Commands must be issued from one thread at a time. The IL callback thread
/// only touches internal state guarded by locks.
pub struct Component {
    shared: Arc<ComponentShared>,
    context: Arc<CoreContext>,
}

impl Component {
    pub(crate) fn new(shared: Arc<ComponentShared>, context: Arc<CoreContext>) -> Self {
        Self { shared, context }
    }

    /// Identifier used in [`Notification`]s raised by this component.
    pub fn id(&self) -> ComponentId {
        self.shared.id
    }

    /// Component name as passed to `OMX_GetHandle`.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub(crate) fn raw_handle(&self) -> omx_sys::Handle {
        self.shared.handle()
    }

    pub(crate) fn api(&self) -> &crate::OmxApi {
        &self.context.api
    }

    fn get_parameter<T>(&self, index: omx_sys::IndexType, value: &mut T) -> Result<()> {
        let (table, handle) = self.shared.table()?;
        let get = table.GetParameter.ok_or(Error::NotImplemented)?;
        Error::from_status(unsafe { get(handle, index, value as *mut T as omx_sys::Ptr) })
    }

    fn set_parameter<T>(&self, index: omx_sys::IndexType, value: &mut T) -> Result<()> {
        let (table, handle) = self.shared.table()?;
        let set = table.SetParameter.ok_or(Error::NotImplemented)?;
        Error::from_status(unsafe { set(handle, index, value as *mut T as omx_sys::Ptr) })
    }

    fn set_config<T>(&self, index: omx_sys::IndexType, value: &mut T) -> Result<()> {
        let (table, handle) = self.shared.table()?;
        let set = table.SetConfig.ok_or(Error::NotImplemented)?;
        Error::from_status(unsafe { set(handle, index, value as *mut T as omx_sys::Ptr) })
    }

    pub(crate) fn send_command(&self, command: omx_sys::CommandType, param: u32) -> Result<()> {
        let (table, handle) = self.shared.table()?;
        let send = table.SendCommand.ok_or(Error::NotImplemented)?;
        self.shared.events.lock().map_err(poisoned)?.clear();
        Error::from_status(unsafe { send(handle, command, param, ptr::null_mut()) })
    }

    /// Blocks until `command` completes for `data` or the component reports
    /// an error.
    pub(crate) fn wait_for_command(&self, command: omx_sys::CommandType, data: u32) -> Result<()> {
        let deadline = Instant::now() + COMMAND_TIMEOUT;
        let mut events = self.shared.events.lock().map_err(poisoned)?;
        loop {
            let found = events.iter().position(|event| {
                event.completes(command, data) || event.kind == omx_sys::OMX_EventError
            });
            if let Some(position) = found {
                let event = events.remove(position);
                if event.kind != omx_sys::OMX_EventError {
                    return Ok(());
                }
                return match Error::from_status(event.data1) {
                    Err(error)
                        if error.is_same_state() && command == omx_sys::OMX_CommandStateSet =>
                    {
                        Ok(())
                    }
                    Err(error) => Err(error),
                    Ok(()) => Err(Error::Undefined),
                };
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(Error::Timeout);
            }
            events = self
                .shared
                .events_changed
                .wait_timeout(events, deadline - now)
                .map_err(poisoned)?
                .0;
        }
    }

    /// Moves the component to `state` and waits for the transition.
    ///
    /// A component that is already in `state` is not an error.
    pub fn set_state(&self, state: ComponentState) -> Result<()> {
        debug!("{}: -> {state}", self.shared.name);
        match self.send_command(omx_sys::OMX_CommandStateSet, state.raw()) {
            Err(error) if error.is_same_state() => return Ok(()),
            other => other?,
        }
        self.wait_for_command(omx_sys::OMX_CommandStateSet, state.raw())
    }

    /// Returns the current component state.
    pub fn state(&self) -> Result<ComponentState> {
        let (table, handle) = self.shared.table()?;
        let get = table.GetState.ok_or(Error::NotImplemented)?;
        let mut state = omx_sys::OMX_StateInvalid;
        Error::from_status(unsafe { get(handle, &mut state) })?;
        Ok(ComponentState::from_raw(state))
    }

    /// Disables `port` (tunnelled or bufferless ports).
    pub fn disable_port(&self, port: u32) -> Result<()> {
        self.send_command(omx_sys::OMX_CommandPortDisable, port)?;
        self.wait_for_command(omx_sys::OMX_CommandPortDisable, port)
    }

    /// Disables every port of every domain the component exposes.
    pub(crate) fn disable_all_ports(&self) -> Result<()> {
        for index in [
            omx_sys::OMX_IndexParamAudioInit,
            omx_sys::OMX_IndexParamVideoInit,
            omx_sys::OMX_IndexParamImageInit,
            omx_sys::OMX_IndexParamOtherInit,
        ] {
            let mut ports = omx_sys::PortParam::init();
            // Components reject the indices of domains they do not implement.
            if self.get_parameter(index, &mut ports).is_err() {
                continue;
            }
            for port in ports.nStartPortNumber..ports.nStartPortNumber + ports.nPorts {
                self.disable_port(port)?;
            }
        }
        Ok(())
    }

    pub fn port_definition(&self, port: u32) -> Result<PortDefinition> {
        let mut raw = omx_sys::PortDefinition::init();
        raw.nPortIndex = port;
        self.get_parameter(omx_sys::OMX_IndexParamPortDefinition, &mut raw)?;
        Ok(PortDefinition::from_raw(&raw))
    }

    /// Sets the buffer size and count of `port`, keeping its other fields.
    pub fn set_port_buffers(&self, port: u32, buffer_size: u32, buffer_count: u32) -> Result<()> {
        let mut raw = omx_sys::PortDefinition::init();
        raw.nPortIndex = port;
        self.get_parameter(omx_sys::OMX_IndexParamPortDefinition, &mut raw)?;
        raw.nBufferSize = buffer_size;
        raw.nBufferCountActual = buffer_count;
        self.set_parameter(omx_sys::OMX_IndexParamPortDefinition, &mut raw)
    }

    pub fn audio_port_format(&self, port: u32) -> Result<AudioCoding> {
        let mut raw = omx_sys::AudioPortFormat::init();
        raw.nPortIndex = port;
        self.get_parameter(omx_sys::OMX_IndexParamAudioPortFormat, &mut raw)?;
        Ok(AudioCoding::from_raw(raw.eEncoding))
    }

    pub fn set_audio_port_format(&self, port: u32, coding: AudioCoding) -> Result<()> {
        let mut raw = omx_sys::AudioPortFormat::init();
        raw.nPortIndex = port;
        self.get_parameter(omx_sys::OMX_IndexParamAudioPortFormat, &mut raw)?;
        raw.eEncoding = coding.raw();
        self.set_parameter(omx_sys::OMX_IndexParamAudioPortFormat, &mut raw)
    }

    pub fn pcm_mode(&self, port: u32) -> Result<PcmMode> {
        let mut raw = omx_sys::AudioPcmMode::init();
        raw.nPortIndex = port;
        self.get_parameter(omx_sys::OMX_IndexParamAudioPcm, &mut raw)?;
        Ok(PcmMode::from_raw(&raw))
    }

    pub fn set_pcm_mode(&self, port: u32, mode: &PcmMode) -> Result<()> {
        let mut raw = mode.to_raw(port);
        self.set_parameter(omx_sys::OMX_IndexParamAudioPcm, &mut raw)
    }

    /// Switches a decoder between decoding and compressed passthrough.
    pub fn set_decoder_passthrough(&self, enabled: bool) -> Result<()> {
        let mut raw = omx_sys::ConfigBoolean::init();
        raw.bEnabled = if enabled {
            omx_sys::OMX_TRUE
        } else {
            omx_sys::OMX_FALSE
        };
        self.set_parameter(omx_sys::OMX_IndexParamBrcmDecoderPassThrough, &mut raw)
    }

    /// Routes a renderer to the named output (`"hdmi"` or `"local"`).
    pub fn set_audio_destination(&self, destination: &str) -> Result<()> {
        let mut raw = omx_sys::BrcmAudioDestination::init();
        let bytes = destination.as_bytes();
        if bytes.contains(&0) {
            return Err(Error::InvalidArg(format!(
                "Audio destination {destination:?} contains a NUL byte."
            )));
        }
        // Leave room for the terminating NUL.
        if bytes.len() >= raw.sName.len() {
            return Err(Error::InvalidArg(format!(
                "Audio destination {destination:?} is longer than {} bytes.",
                raw.sName.len() - 1
            )));
        }
        raw.sName[..bytes.len()].copy_from_slice(bytes);
        self.set_config(omx_sys::OMX_IndexConfigBrcmAudioDestination, &mut raw)
    }

    /// Enables `port` and allocates `nBufferCountActual` buffers of
    /// `nBufferSize` bytes on it.
    pub fn enable_port_buffers(&self, port: u32) -> Result<()> {
        let definition = self.port_definition(port)?;
        let (table, handle) = self.shared.table()?;
        let allocate = table.AllocateBuffer.ok_or(Error::NotImplemented)?;

        self.send_command(omx_sys::OMX_CommandPortEnable, port)?;

        let mut allocated = Vec::with_capacity(definition.buffer_count_actual as usize);
        for _ in 0..definition.buffer_count_actual {
            let mut header: *mut omx_sys::BufferHeader = ptr::null_mut();
            let status = unsafe {
                allocate(
                    handle,
                    &mut header,
                    port,
                    ptr::null_mut(),
                    definition.buffer_size,
                )
            };
            if let Err(error) = Error::from_status(status) {
                self.free_headers(port, &allocated);
                return Err(error);
            }
            if header.is_null() {
                self.free_headers(port, &allocated);
                return Err(Error::Other(format!(
                    "{}: AllocateBuffer returned no header.",
                    self.shared.name
                )));
            }
            allocated.push(HeaderPtr(header));
        }

        {
            let mut buffers = self.shared.buffers.lock().map_err(poisoned)?;
            let pool = buffers.entry(port).or_default();
            pool.free.extend(allocated.iter().copied());
            pool.allocated.extend(allocated.iter().copied());
        }
        debug!(
            "{}: port {port} enabled with {} buffers of {} bytes",
            self.shared.name, definition.buffer_count_actual, definition.buffer_size
        );
        self.wait_for_command(omx_sys::OMX_CommandPortEnable, port)
    }

    /// Disables `port` and frees its buffers once the component has returned
    /// all of them.
    pub fn disable_port_buffers(&self, port: u32) -> Result<()> {
        self.send_command(omx_sys::OMX_CommandPortDisable, port)?;

        let allocated = {
            let deadline = Instant::now() + COMMAND_TIMEOUT;
            let mut buffers = self.shared.buffers.lock().map_err(poisoned)?;
            loop {
                let pending = buffers
                    .get(&port)
                    .map(|pool| pool.allocated.len() - pool.free.len())
                    .unwrap_or(0);
                let now = Instant::now();
                if pending == 0 || now >= deadline {
                    if pending != 0 {
                        error!(
                            "{}: {pending} buffers still held on port {port}",
                            self.shared.name
                        );
                    }
                    break;
                }
                buffers = self
                    .shared
                    .buffers_changed
                    .wait_timeout(buffers, deadline - now)
                    .map_err(poisoned)?
                    .0;
            }
            buffers.remove(&port).map(|pool| pool.allocated).unwrap_or_default()
        };
        self.free_headers(port, &allocated);
        self.wait_for_command(omx_sys::OMX_CommandPortDisable, port)
    }

    /// Takes a free buffer of input `port`, waiting at most `timeout` (or
    /// forever with `None`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::PortUnpopulated`] if the port has no buffers and
    /// [`Error::Timeout`] if none was returned in time.
    pub fn input_buffer(&self, port: u32, timeout: Option<Duration>) -> Result<InputBuffer> {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let mut buffers = self.shared.buffers.lock().map_err(poisoned)?;
        loop {
            let pool = buffers.get_mut(&port).ok_or(Error::PortUnpopulated)?;
            if let Some(header) = pool.free.pop_front() {
                unsafe {
                    (*header.0).nFilledLen = 0;
                    (*header.0).nOffset = 0;
                    (*header.0).nFlags = 0;
                }
                return Ok(InputBuffer::new(self.shared.clone(), port, header));
            }
            buffers = match deadline {
                None => self.shared.buffers_changed.wait(buffers).map_err(poisoned)?,
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(Error::Timeout);
                    }
                    self.shared
                        .buffers_changed
                        .wait_timeout(buffers, deadline - now)
                        .map_err(poisoned)?
                        .0
                }
            };
        }
    }

    fn free_headers(&self, port: u32, headers: &[HeaderPtr]) {
        let Ok((table, handle)) = self.shared.table() else {
            return;
        };
        let Some(free) = table.FreeBuffer else {
            return;
        };
        for header in headers {
            if let Err(error) = Error::from_status(unsafe { free(handle, port, header.0) }) {
                error!("{}: FreeBuffer on port {port}: {error}", self.shared.name);
            }
        }
    }

    /// Steps the component down to `Loaded`, freeing any buffers still
    /// allocated on its ports during the transition.
    pub fn unload(&self) -> Result<()> {
        if matches!(
            self.state()?,
            ComponentState::Executing | ComponentState::Pause
        ) {
            self.set_state(ComponentState::Idle)?;
        }
        debug!("{}: -> {}", self.shared.name, ComponentState::Loaded);
        let loaded = ComponentState::Loaded.raw();
        match self.send_command(omx_sys::OMX_CommandStateSet, loaded) {
            Err(error) if error.is_same_state() => return Ok(()),
            other => other?,
        }
        self.free_all_buffers()?;
        self.wait_for_command(omx_sys::OMX_CommandStateSet, loaded)
    }

    fn free_all_buffers(&self) -> Result<()> {
        let pools: Vec<(u32, Vec<HeaderPtr>)> = self
            .shared
            .buffers
            .lock()
            .map_err(poisoned)?
            .drain()
            .map(|(port, pool)| (port, pool.allocated))
            .collect();
        for (port, headers) in pools {
            self.free_headers(port, &headers);
        }
        Ok(())
    }

    /// Frees any remaining buffers and the IL handle.
    ///
    /// Called automatically on drop; calling it twice is a no-op.
    pub fn release(&mut self) -> Result<()> {
        let handle = self.shared.handle();
        if handle.is_null() {
            return Ok(());
        }
        self.free_all_buffers()?;
        self.shared.set_handle(ptr::null_mut());
        debug!("{}: freeing handle", self.shared.name);
        Error::from_status(unsafe { self.context.api.il.free_handle(handle) })
    }
}

impl Drop for Component {
    fn drop(&mut self) {
        if let Err(error) = self.release() {
            error!("Failed to release {} on drop: {:?}", self.shared.name, error);
        }
    }
}
