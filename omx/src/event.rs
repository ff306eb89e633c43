// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! Asynchronous component notifications.
//!
//! The IL reports errors, end-of-stream and port reconfiguration from its own
//! callback thread. The callbacks never call back into user code; they push a
//! [`Notification`] onto the core's channel and the owner drains it on its own
//! thread (see [`crate::OmxCore::notifications`]).

use std::fmt;

use crate::Error;

/// Identifier assigned by the core to each component it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u32);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{}", self.0)
    }
}

/// An asynchronous event reported by a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The component reported an error outside of any pending command.
    Error {
        /// Raw `OMX_ERRORTYPE` status.
        status: omx_sys::ErrorType,
    },
    /// A buffer carrying the end-of-stream flag left the given port.
    EndOfStream { port: u32 },
    /// The component rewrote the format of the given port.
    PortSettingsChanged { port: u32 },
}

impl Event {
    /// Returns the typed error for [`Event::Error`] notifications.
    pub fn error(&self) -> Option<Error> {
        match self {
            Event::Error { status } => Error::from_status(*status).err(),
            _ => None,
        }
    }
}

/// An [`Event`] tagged with the component that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub component: ComponentId,
    pub event: Event,
}
