// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! IL core initialisation and component creation.
//!
//! This module provides [`OmxCore`], the main entry point of the crate. A core
//! owns the `OMX_Init`/`OMX_Deinit` pair (and `bcm_host_init` on VideoCore
//! systems) and the notification channel every component reports into.

use std::{
    ffi::CString,
    os::raw::c_char,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use crate::{
    Component, Error, Result,
    api::OmxApiHandle,
    component::{CALLBACKS, ComponentShared},
    event::{ComponentId, Notification},
};

/// Internal shared context of an initialised IL core.
///
/// Components hold a reference so that the core is deinitialised only after
/// the last handle has been freed.
pub(crate) struct CoreContext {
    pub(crate) api: OmxApiHandle,
    next_id: AtomicU32,
    notify_tx: Sender<Notification>,
    notify_rx: Receiver<Notification>,
    initialized: bool,
}

impl CoreContext {
    /// Deinitialises the core immediately.
    ///
    /// # Errors
    ///
    /// Returns the status of `OMX_Deinit`.
    pub fn deinit(mut self) -> Result<()> {
        self.initialized = false;
        let status = unsafe { self.api.il.deinit() };
        if let Some(host) = &self.api.host {
            unsafe { host.deinit() };
        }
        Error::from_status(status)
    }
}

impl Drop for CoreContext {
    fn drop(&mut self) {
        if self.initialized {
            if let Err(error) = Error::from_status(unsafe { self.api.il.deinit() }) {
                warn!("OMX_Deinit failed on drop: {error}");
            }
            if let Some(host) = &self.api.host {
                unsafe { host.deinit() };
            }
        }
    }
}

/// An initialised IL core.
///
/// The core is cheaply cloneable. It stays initialised while any clone or
/// any [`Component`] created from it is alive.
///
/// # Examples
///
/// ```no_run
/// use omx::{ComponentState, OmxCore, config, load_api};
///
/// # fn main() -> Result<(), omx::Error> {
/// let host = config::get_bcm_host_so_path();
/// let api = load_api(config::get_openmaxil_so_path(), Some(host.as_path()))?;
/// let core = OmxCore::new(api)?;
///
/// let render = core.create_component("OMX.broadcom.audio_render")?;
/// render.set_audio_destination("hdmi")?;
/// render.set_state(ComponentState::Idle)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OmxCore {
    context: Arc<CoreContext>,
}

impl OmxCore {
    /// Initialises the host interface (when loaded) and the IL core.
    ///
    /// # Errors
    ///
    /// Returns the status of `OMX_Init` if the core refuses to start.
    pub fn new(api: OmxApiHandle) -> Result<Self> {
        if let Some(host) = &api.host {
            unsafe { host.init() };
        }
        if let Err(error) = Error::from_status(unsafe { api.il.init() }) {
            if let Some(host) = &api.host {
                unsafe { host.deinit() };
            }
            return Err(error);
        }
        debug!("IL core initialised");
        let (notify_tx, notify_rx) = crossbeam_channel::unbounded();
        Ok(Self {
            context: Arc::new(CoreContext {
                api,
                next_id: AtomicU32::new(0),
                notify_tx,
                notify_rx,
                initialized: true,
            }),
        })
    }

    /// Creates a component by name with all of its ports disabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ComponentNotFound`] for unknown names, or the status of
    /// the first port that could not be disabled.
    pub fn create_component(&self, name: &str) -> Result<Component> {
        let c_name = CString::new(name)?;
        let id = ComponentId(self.context.next_id.fetch_add(1, Ordering::Relaxed));
        let shared = Arc::new(ComponentShared::new(
            id,
            name,
            self.context.notify_tx.clone(),
        ));

        let mut handle: omx_sys::Handle = std::ptr::null_mut();
        let mut callbacks = CALLBACKS;
        unsafe {
            Error::from_status(self.context.api.il.get_handle(
                &mut handle,
                c_name.as_ptr() as *mut c_char,
                Arc::as_ptr(&shared) as omx_sys::Ptr,
                &mut callbacks,
            ))?;
        }
        if handle.is_null() {
            return Err(Error::Other(format!(
                "OMX_GetHandle returned no handle for {name}."
            )));
        }
        shared.set_handle(handle);
        debug!("Created {name} as {id}");

        let component = Component::new(shared, self.context.clone());
        component.disable_all_ports()?;
        Ok(component)
    }

    /// Returns a receiver for the notifications of every component created
    /// by this core.
    pub fn notifications(&self) -> Receiver<Notification> {
        self.context.notify_rx.clone()
    }

    /// Steps every component down to `Loaded` and frees their handles.
    ///
    /// All components are processed even if one fails; the first error is
    /// returned.
    pub fn cleanup_components(&self, components: Vec<Component>) -> Result<()> {
        let mut first_error = None;
        for component in &components {
            if let Err(error) = component.unload() {
                warn!("Failed to unload {}: {error}", component.name());
                first_error.get_or_insert(error);
            }
        }
        for mut component in components {
            if let Err(error) = component.release() {
                warn!("Failed to free {}: {error}", component.name());
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Deinitialises the core.
    ///
    /// # Errors
    ///
    /// Returns an error if components or clones of this core are still alive,
    /// or the status of `OMX_Deinit`.
    pub fn destroy(self) -> Result<()> {
        let context = Arc::into_inner(self.context)
            .ok_or_else(|| Error::Other("Core is still in use.".to_string()))?;
        context.deinit()
    }
}
