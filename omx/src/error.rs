// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for IL operations.
//!
//! This module defines the error types returned by IL calls, mapping
//! `OMX_ERRORTYPE` status codes to idiomatic Rust error enums.

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur when using the IL.
///
/// This enum maps `OMX_ERRORTYPE` codes to Rust error variants and includes
/// additional error types for Rust-side failures (loading the dynamic
/// library, string conversion, lock poisoning).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An unknown or unrecognized status code.
    #[error("Unknown error: {0:#x}")]
    Unknown(omx_sys::ErrorType),

    /// The component could not allocate the resources it needs.
    #[error("Insufficient resources")]
    InsufficientResources,

    /// The component reported an error without further detail.
    #[error("Undefined error")]
    Undefined,

    /// The requested component name is not known to the core.
    #[error("Component not found")]
    ComponentNotFound,

    /// The component name was malformed.
    #[error("Invalid component name")]
    InvalidComponentName,

    /// The component handle is invalid.
    #[error("Invalid component")]
    InvalidComponent,

    /// A parameter block or argument was rejected.
    #[error("Bad parameter")]
    BadParameter,

    /// The component does not implement the requested call.
    #[error("Not implemented")]
    NotImplemented,

    /// The hardware failed.
    #[error("Hardware error")]
    Hardware,

    /// The component is in the invalid state.
    #[error("Invalid state")]
    InvalidState,

    /// The input stream could not be parsed.
    #[error("Stream corrupt")]
    StreamCorrupt,

    /// The two ports of a tunnel do not agree on a format.
    #[error("Ports not compatible")]
    PortsNotCompatible,

    /// The component lost its resources to a higher priority client.
    #[error("Resources lost")]
    ResourcesLost,

    /// The component is not ready for the call.
    #[error("Not ready")]
    NotReady,

    /// A blocking operation timed out before completing.
    #[error("Timeout")]
    Timeout,

    /// The component is already in the requested state.
    #[error("Same state")]
    SameState,

    /// The requested state transition is not allowed from the current state.
    #[error("Incorrect state transition")]
    IncorrectStateTransition,

    /// The call is not allowed in the current state.
    #[error("Incorrect state operation")]
    IncorrectStateOperation,

    /// The parameter value is not supported.
    #[error("Unsupported setting")]
    UnsupportedSetting,

    /// The parameter index is not supported by the component.
    #[error("Unsupported index")]
    UnsupportedIndex,

    /// The port index does not exist on the component.
    #[error("Bad port index")]
    BadPortIndex,

    /// The port has no buffers allocated.
    #[error("Port unpopulated")]
    PortUnpopulated,

    /// An argument passed from Rust was invalid.
    #[error("Invalid argument: {0}")]
    InvalidArg(String),

    /// A generic error for Rust-level failures not directly mapped to IL errors.
    #[error("Other error: {0}")]
    Other(String),

    /// Failed to convert a Rust string to a C-compatible null-terminated string.
    #[error("Null string: {0}")]
    NulString(#[from] std::ffi::NulError),

    /// Failed to load or interact with the IL dynamic library.
    #[error("Loading library: {0}")]
    LibLoading(#[from] libloading::Error),
}

impl Error {
    /// Converts an `OMX_ERRORTYPE` status code to a Rust [`Result`].
    ///
    /// # Returns
    ///
    /// - `Ok(())` if `status == OMX_ErrorNone`
    /// - `Err(Error::...)` for any error status code
    ///
    /// # Examples
    ///
    /// ```
    /// use omx::Error;
    ///
    /// assert!(Error::from_status(omx_sys::OMX_ErrorNone).is_ok());
    /// assert!(matches!(
    ///     Error::from_status(omx_sys::OMX_ErrorSameState),
    ///     Err(Error::SameState)
    /// ));
    /// ```
    pub fn from_status(status: omx_sys::ErrorType) -> Result<()> {
        match status {
            omx_sys::OMX_ErrorNone => Ok(()),
            omx_sys::OMX_ErrorInsufficientResources => Err(Error::InsufficientResources),
            omx_sys::OMX_ErrorUndefined => Err(Error::Undefined),
            omx_sys::OMX_ErrorInvalidComponentName => Err(Error::InvalidComponentName),
            omx_sys::OMX_ErrorComponentNotFound => Err(Error::ComponentNotFound),
            omx_sys::OMX_ErrorInvalidComponent => Err(Error::InvalidComponent),
            omx_sys::OMX_ErrorBadParameter => Err(Error::BadParameter),
            omx_sys::OMX_ErrorNotImplemented => Err(Error::NotImplemented),
            omx_sys::OMX_ErrorHardware => Err(Error::Hardware),
            omx_sys::OMX_ErrorInvalidState => Err(Error::InvalidState),
            omx_sys::OMX_ErrorStreamCorrupt => Err(Error::StreamCorrupt),
            omx_sys::OMX_ErrorPortsNotCompatible => Err(Error::PortsNotCompatible),
            omx_sys::OMX_ErrorResourcesLost => Err(Error::ResourcesLost),
            omx_sys::OMX_ErrorNotReady => Err(Error::NotReady),
            omx_sys::OMX_ErrorTimeout => Err(Error::Timeout),
            omx_sys::OMX_ErrorSameState => Err(Error::SameState),
            omx_sys::OMX_ErrorIncorrectStateTransition => Err(Error::IncorrectStateTransition),
            omx_sys::OMX_ErrorIncorrectStateOperation => Err(Error::IncorrectStateOperation),
            omx_sys::OMX_ErrorUnsupportedSetting => Err(Error::UnsupportedSetting),
            omx_sys::OMX_ErrorUnsupportedIndex => Err(Error::UnsupportedIndex),
            omx_sys::OMX_ErrorBadPortIndex => Err(Error::BadPortIndex),
            omx_sys::OMX_ErrorPortUnpopulated => Err(Error::PortUnpopulated),
            other => Err(Error::Unknown(other)),
        }
    }

    /// Returns the IL status code behind this error, if it came from the IL.
    pub fn status(&self) -> Option<omx_sys::ErrorType> {
        let status = match self {
            Error::Unknown(status) => *status,
            Error::InsufficientResources => omx_sys::OMX_ErrorInsufficientResources,
            Error::Undefined => omx_sys::OMX_ErrorUndefined,
            Error::ComponentNotFound => omx_sys::OMX_ErrorComponentNotFound,
            Error::InvalidComponentName => omx_sys::OMX_ErrorInvalidComponentName,
            Error::InvalidComponent => omx_sys::OMX_ErrorInvalidComponent,
            Error::BadParameter => omx_sys::OMX_ErrorBadParameter,
            Error::NotImplemented => omx_sys::OMX_ErrorNotImplemented,
            Error::Hardware => omx_sys::OMX_ErrorHardware,
            Error::InvalidState => omx_sys::OMX_ErrorInvalidState,
            Error::StreamCorrupt => omx_sys::OMX_ErrorStreamCorrupt,
            Error::PortsNotCompatible => omx_sys::OMX_ErrorPortsNotCompatible,
            Error::ResourcesLost => omx_sys::OMX_ErrorResourcesLost,
            Error::NotReady => omx_sys::OMX_ErrorNotReady,
            Error::Timeout => omx_sys::OMX_ErrorTimeout,
            Error::SameState => omx_sys::OMX_ErrorSameState,
            Error::IncorrectStateTransition => omx_sys::OMX_ErrorIncorrectStateTransition,
            Error::IncorrectStateOperation => omx_sys::OMX_ErrorIncorrectStateOperation,
            Error::UnsupportedSetting => omx_sys::OMX_ErrorUnsupportedSetting,
            Error::UnsupportedIndex => omx_sys::OMX_ErrorUnsupportedIndex,
            Error::BadPortIndex => omx_sys::OMX_ErrorBadPortIndex,
            Error::PortUnpopulated => omx_sys::OMX_ErrorPortUnpopulated,
            Error::InvalidArg(_)
            | Error::Other(_)
            | Error::NulString(_)
            | Error::LibLoading(_) => return None,
        };
        Some(status)
    }

    /// Returns `true` when the component was already in the requested state.
    ///
    /// Callers treat this as informational rather than as a failure.
    pub fn is_same_state(&self) -> bool {
        matches!(self, Error::SameState)
    }
}

/// Maps a poisoned lock into an [`Error`].
pub(crate) fn poisoned<T>(_: std::sync::PoisonError<T>) -> Error {
    Error::Other("Component state lock poisoned.".to_string())
}
