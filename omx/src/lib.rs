// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! # OMX - OpenMAX IL components
//!
//! Safe, idiomatic Rust bindings for the OpenMAX IL core shipped with
//! VideoCore-class SoCs, covering what is needed to feed audio decode and
//! render components.
//!
//! ## Overview
//!
//! This crate wraps the raw FFI ([`omx_sys`]) with RAII ownership and turns the
//! asynchronous IL command model into blocking calls.
//!
//! ### Key Concepts
//!
//! - **Core**: the initialised IL library ([`OmxCore`])
//! - **Component**: one processing stage such as a decoder or renderer ([`Component`])
//! - **Port**: a numbered input or output of a component, configured through
//!   parameter blocks ([`PortDefinition`], [`PcmMode`], [`AudioCoding`])
//! - **Buffer**: memory allocated by a component on an input port, borrowed
//!   through [`InputBuffer`]
//! - **Tunnel**: a direct connection from an output port to an input port ([`Tunnel`])
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────┐
//! │ OmxCore │  (OMX_Init / OMX_Deinit)
//! └────┬────┘
//!      │
//!      ├─► Component ──► InputBuffer   (EmptyThisBuffer)
//!      │       │
//!      │       └──── Tunnel ────► Component
//!      │
//!      └─► Receiver<Notification>      (errors, EOS, port settings)
//! ```
//!
//! ## Examples
//!
//! ```no_run
//! use omx::{BufferFlags, ComponentState, OmxCore, config, load_api};
//!
//! # fn main() -> Result<(), omx::Error> {
//! let host = config::get_bcm_host_so_path();
//! let api = load_api(config::get_openmaxil_so_path(), Some(host.as_path()))?;
//! let core = OmxCore::new(api)?;
//!
//! let render = core.create_component("OMX.broadcom.audio_render")?;
//! render.set_port_buffers(100, 4096, 10)?;
//! render.set_state(ComponentState::Idle)?;
//! render.enable_port_buffers(100)?;
//! render.set_state(ComponentState::Executing)?;
//!
//! let mut buffer = render.input_buffer(100, None)?;
//! buffer.payload_mut().fill(0);
//! let len = buffer.capacity();
//! buffer.submit(len, BufferFlags::END_OF_FRAME)?;
//!
//! core.cleanup_components(vec![render])?;
//! core.destroy()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! - [`OmxCore`] is `Send + Sync` and can be cloned across threads
//! - IL callbacks run on a thread owned by the IL; they only push into locked
//!   queues and the notification channel
//! - A [`Component`] should be driven from one thread at a time

mod api;
mod buffer;
mod component;
mod core;
mod error;
mod event;
mod params;
mod tunnel;

pub mod config;

pub use api::{OmxApi, OmxApiHandle, load_api};
pub use buffer::{BufferFlags, InputBuffer};
pub use component::{COMMAND_TIMEOUT, Component};
pub use core::OmxCore;
pub use error::{Error, Result};
pub use event::{ComponentId, Event, Notification};
pub use params::{
    AudioChannel, AudioCoding, ComponentState, PcmMode, PortDefinition, PortDirection,
};
pub use tunnel::Tunnel;
