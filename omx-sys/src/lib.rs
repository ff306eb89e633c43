// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! # omx-sys: Raw FFI bindings to OpenMAX IL
//!
//! This crate provides low-level, unsafe Rust declarations for the subset of
//! the OpenMAX IL 1.1.2 API (plus the VideoCore vendor extensions) needed to
//! drive audio decode and render components. The IL core is loaded at runtime
//! with `libloading`, so nothing links against the vendor libraries at build
//! time.
//!
//! ## Overview
//!
//! `omx-sys` exposes:
//! - Raw C types (`Handle`, `BufferHeader`, `ComponentType`, parameter blocks)
//! - The dynamically loaded core function tables ([`LibOpenMaxIl`], [`LibBcmHost`])
//! - Constants for status codes, indices, states, commands, events and flags
//!
//! ## Usage
//!
//! **Most users should NOT use this crate directly.** Use the safe [`omx`]
//! wrapper crate instead, which provides:
//! - RAII ownership of components, buffers and tunnels
//! - Rust-idiomatic error handling with `Result`
//! - Synchronous command completion on top of the asynchronous IL callbacks
//!
//! ## Safety
//!
//! All functions in this crate are `unsafe` and require the caller to uphold
//! the IL invariants:
//! - `OMX_Init` must succeed before any handle is requested
//! - Parameter blocks must carry a correct `nSize` and `nVersion`
//! - Buffer headers belong to the component until returned through a callback
//! - Callbacks are invoked on a thread owned by the IL implementation
//!
//! The struct layouts follow the headers compiled with `OMX_SKIP64BIT`, which
//! is how the VideoCore IL is built.
//!
//! [`omx`]: https://docs.rs/omx

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(clippy::missing_safety_doc)]

use std::ffi::OsStr;
use std::os::raw::{c_char, c_void};

pub type Handle = *mut c_void;
pub type Ptr = *mut c_void;
pub type U8 = u8;
pub type U32 = u32;
pub type S32 = i32;
pub type Bool = u32;

pub type ErrorType = u32;
pub type IndexType = u32;
pub type StateType = u32;
pub type CommandType = u32;
pub type EventType = u32;
pub type DirType = u32;
pub type PortDomainType = u32;
pub type AudioCodingType = u32;
pub type NumericalDataType = u32;
pub type EndianType = u32;
pub type AudioPcmModeType = u32;
pub type AudioChannelType = u32;

pub const OMX_FALSE: Bool = 0;
pub const OMX_TRUE: Bool = 1;

/// Specification version 1.1.2.0, packed as the IL headers expect.
pub const OMX_VERSION_MAJOR: u8 = 1;
pub const OMX_VERSION_MINOR: u8 = 1;
pub const OMX_VERSION_REVISION: u8 = 2;
pub const OMX_VERSION_STEP: u8 = 0;
pub const OMX_VERSION: u32 = (OMX_VERSION_STEP as u32) << 24
    | (OMX_VERSION_REVISION as u32) << 16
    | (OMX_VERSION_MINOR as u32) << 8
    | OMX_VERSION_MAJOR as u32;

// OMX_ERRORTYPE
pub const OMX_ErrorNone: ErrorType = 0;
pub const OMX_ErrorInsufficientResources: ErrorType = 0x8000_1000;
pub const OMX_ErrorUndefined: ErrorType = 0x8000_1001;
pub const OMX_ErrorInvalidComponentName: ErrorType = 0x8000_1002;
pub const OMX_ErrorComponentNotFound: ErrorType = 0x8000_1003;
pub const OMX_ErrorInvalidComponent: ErrorType = 0x8000_1004;
pub const OMX_ErrorBadParameter: ErrorType = 0x8000_1005;
pub const OMX_ErrorNotImplemented: ErrorType = 0x8000_1006;
pub const OMX_ErrorUnderflow: ErrorType = 0x8000_1007;
pub const OMX_ErrorOverflow: ErrorType = 0x8000_1008;
pub const OMX_ErrorHardware: ErrorType = 0x8000_1009;
pub const OMX_ErrorInvalidState: ErrorType = 0x8000_100A;
pub const OMX_ErrorStreamCorrupt: ErrorType = 0x8000_100B;
pub const OMX_ErrorPortsNotCompatible: ErrorType = 0x8000_100C;
pub const OMX_ErrorResourcesLost: ErrorType = 0x8000_100D;
pub const OMX_ErrorNoMore: ErrorType = 0x8000_100E;
pub const OMX_ErrorVersionMismatch: ErrorType = 0x8000_100F;
pub const OMX_ErrorNotReady: ErrorType = 0x8000_1010;
pub const OMX_ErrorTimeout: ErrorType = 0x8000_1011;
pub const OMX_ErrorSameState: ErrorType = 0x8000_1012;
pub const OMX_ErrorResourcesPreempted: ErrorType = 0x8000_1013;
pub const OMX_ErrorPortUnresponsiveDuringAllocation: ErrorType = 0x8000_1014;
pub const OMX_ErrorPortUnresponsiveDuringDeallocation: ErrorType = 0x8000_1015;
pub const OMX_ErrorPortUnresponsiveDuringStop: ErrorType = 0x8000_1016;
pub const OMX_ErrorIncorrectStateTransition: ErrorType = 0x8000_1017;
pub const OMX_ErrorIncorrectStateOperation: ErrorType = 0x8000_1018;
pub const OMX_ErrorUnsupportedSetting: ErrorType = 0x8000_1019;
pub const OMX_ErrorUnsupportedIndex: ErrorType = 0x8000_101A;
pub const OMX_ErrorBadPortIndex: ErrorType = 0x8000_101B;
pub const OMX_ErrorPortUnpopulated: ErrorType = 0x8000_101C;

// OMX_INDEXTYPE
pub const OMX_IndexParamAudioInit: IndexType = 0x0100_0002;
pub const OMX_IndexParamImageInit: IndexType = 0x0100_0003;
pub const OMX_IndexParamVideoInit: IndexType = 0x0100_0004;
pub const OMX_IndexParamOtherInit: IndexType = 0x0100_0005;
pub const OMX_IndexParamPortDefinition: IndexType = 0x0200_0001;
pub const OMX_IndexParamAudioPortFormat: IndexType = 0x0400_0001;
pub const OMX_IndexParamAudioPcm: IndexType = 0x0400_0002;
pub const OMX_IndexVendorStartUnused: IndexType = 0x7F00_0000;
// VideoCore IL vendor extension indices.
pub const OMX_IndexConfigBrcmAudioDestination: IndexType = 0x7F00_001B;
pub const OMX_IndexParamBrcmDecoderPassThrough: IndexType = 0x7F00_0073;

// OMX_STATETYPE
pub const OMX_StateInvalid: StateType = 0;
pub const OMX_StateLoaded: StateType = 1;
pub const OMX_StateIdle: StateType = 2;
pub const OMX_StateExecuting: StateType = 3;
pub const OMX_StatePause: StateType = 4;
pub const OMX_StateWaitForResources: StateType = 5;

// OMX_COMMANDTYPE
pub const OMX_CommandStateSet: CommandType = 0;
pub const OMX_CommandFlush: CommandType = 1;
pub const OMX_CommandPortDisable: CommandType = 2;
pub const OMX_CommandPortEnable: CommandType = 3;
pub const OMX_CommandMarkBuffer: CommandType = 4;

// OMX_EVENTTYPE
pub const OMX_EventCmdComplete: EventType = 0;
pub const OMX_EventError: EventType = 1;
pub const OMX_EventMark: EventType = 2;
pub const OMX_EventPortSettingsChanged: EventType = 3;
pub const OMX_EventBufferFlag: EventType = 4;
pub const OMX_EventResourcesAcquired: EventType = 5;
pub const OMX_EventComponentResumed: EventType = 6;
pub const OMX_EventDynamicResourcesAvailable: EventType = 7;
pub const OMX_EventPortFormatDetected: EventType = 8;

// OMX_DIRTYPE / OMX_PORTDOMAINTYPE
pub const OMX_DirInput: DirType = 0;
pub const OMX_DirOutput: DirType = 1;
pub const OMX_PortDomainAudio: PortDomainType = 0;

// OMX_AUDIO_CODINGTYPE
pub const OMX_AUDIO_CodingUnused: AudioCodingType = 0;
pub const OMX_AUDIO_CodingAutoDetect: AudioCodingType = 1;
pub const OMX_AUDIO_CodingPCM: AudioCodingType = 2;
pub const OMX_AUDIO_CodingVendorStartUnused: AudioCodingType = 0x7F00_0000;
pub const OMX_AUDIO_CodingFLAC: AudioCodingType = 0x7F00_0001;
pub const OMX_AUDIO_CodingDDP: AudioCodingType = 0x7F00_0002;
pub const OMX_AUDIO_CodingDTS: AudioCodingType = 0x7F00_0003;

pub const OMX_NumericalDataSigned: NumericalDataType = 0;
pub const OMX_NumericalDataUnsigned: NumericalDataType = 1;
pub const OMX_EndianBig: EndianType = 0;
pub const OMX_EndianLittle: EndianType = 1;
pub const OMX_AUDIO_PCMModeLinear: AudioPcmModeType = 0;

// OMX_AUDIO_CHANNELTYPE
pub const OMX_AUDIO_ChannelNone: AudioChannelType = 0;
pub const OMX_AUDIO_ChannelLF: AudioChannelType = 1;
pub const OMX_AUDIO_ChannelRF: AudioChannelType = 2;
pub const OMX_AUDIO_ChannelCF: AudioChannelType = 3;
pub const OMX_AUDIO_ChannelLS: AudioChannelType = 4;
pub const OMX_AUDIO_ChannelRS: AudioChannelType = 5;
pub const OMX_AUDIO_ChannelLFE: AudioChannelType = 6;
pub const OMX_AUDIO_ChannelCS: AudioChannelType = 7;
pub const OMX_AUDIO_ChannelLR: AudioChannelType = 8;
pub const OMX_AUDIO_ChannelRR: AudioChannelType = 9;

pub const OMX_AUDIO_MAXCHANNELS: usize = 16;

// Buffer header flags
pub const OMX_BUFFERFLAG_EOS: u32 = 0x0000_0001;
pub const OMX_BUFFERFLAG_STARTTIME: u32 = 0x0000_0002;
pub const OMX_BUFFERFLAG_DECODEONLY: u32 = 0x0000_0004;
pub const OMX_BUFFERFLAG_DATACORRUPT: u32 = 0x0000_0008;
pub const OMX_BUFFERFLAG_ENDOFFRAME: u32 = 0x0000_0010;
pub const OMX_BUFFERFLAG_SYNCFRAME: u32 = 0x0000_0020;
pub const OMX_BUFFERFLAG_EXTRADATA: u32 = 0x0000_0040;
pub const OMX_BUFFERFLAG_CODECCONFIG: u32 = 0x0000_0080;
pub const OMX_BUFFERFLAG_TIME_UNKNOWN: u32 = 0x0000_0100;

/// `OMX_VERSIONTYPE` viewed as its packed 32-bit form.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VersionType {
    pub nVersion: u32,
}

/// `OMX_TICKS` as declared when `OMX_SKIP64BIT` is set.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Ticks {
    pub nLowPart: u32,
    pub nHighPart: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct BufferHeader {
    pub nSize: U32,
    pub nVersion: VersionType,
    pub pBuffer: *mut U8,
    pub nAllocLen: U32,
    pub nFilledLen: U32,
    pub nOffset: U32,
    pub pAppPrivate: Ptr,
    pub pPlatformPrivate: Ptr,
    pub pInputPortPrivate: Ptr,
    pub pOutputPortPrivate: Ptr,
    pub hMarkTargetComponent: Handle,
    pub pMarkData: Ptr,
    pub nTickCount: U32,
    pub nTimeStamp: Ticks,
    pub nFlags: U32,
    pub nOutputPortIndex: U32,
    pub nInputPortIndex: U32,
}

pub type EventHandlerFn = unsafe extern "C" fn(
    hComponent: Handle,
    pAppData: Ptr,
    eEvent: EventType,
    nData1: U32,
    nData2: U32,
    pEventData: Ptr,
) -> ErrorType;

pub type BufferDoneFn =
    unsafe extern "C" fn(hComponent: Handle, pAppData: Ptr, pBuffer: *mut BufferHeader) -> ErrorType;

/// `OMX_CALLBACKTYPE`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Callbacks {
    pub EventHandler: Option<EventHandlerFn>,
    pub EmptyBufferDone: Option<BufferDoneFn>,
    pub FillBufferDone: Option<BufferDoneFn>,
}

/// `OMX_COMPONENTTYPE`: the function table behind every component handle.
///
/// The IL macros (`OMX_SendCommand`, `OMX_GetParameter`, ...) dispatch
/// through these pointers.
#[repr(C)]
pub struct ComponentType {
    pub nSize: U32,
    pub nVersion: VersionType,
    pub pComponentPrivate: Ptr,
    pub pApplicationPrivate: Ptr,
    pub GetComponentVersion: Option<
        unsafe extern "C" fn(Handle, *mut c_char, *mut VersionType, *mut VersionType, *mut c_void)
            -> ErrorType,
    >,
    pub SendCommand:
        Option<unsafe extern "C" fn(Handle, CommandType, U32, Ptr) -> ErrorType>,
    pub GetParameter: Option<unsafe extern "C" fn(Handle, IndexType, Ptr) -> ErrorType>,
    pub SetParameter: Option<unsafe extern "C" fn(Handle, IndexType, Ptr) -> ErrorType>,
    pub GetConfig: Option<unsafe extern "C" fn(Handle, IndexType, Ptr) -> ErrorType>,
    pub SetConfig: Option<unsafe extern "C" fn(Handle, IndexType, Ptr) -> ErrorType>,
    pub GetExtensionIndex:
        Option<unsafe extern "C" fn(Handle, *mut c_char, *mut IndexType) -> ErrorType>,
    pub GetState: Option<unsafe extern "C" fn(Handle, *mut StateType) -> ErrorType>,
    pub ComponentTunnelRequest:
        Option<unsafe extern "C" fn(Handle, U32, Handle, U32, *mut c_void) -> ErrorType>,
    pub UseBuffer: Option<
        unsafe extern "C" fn(Handle, *mut *mut BufferHeader, U32, Ptr, U32, *mut U8) -> ErrorType,
    >,
    pub AllocateBuffer:
        Option<unsafe extern "C" fn(Handle, *mut *mut BufferHeader, U32, Ptr, U32) -> ErrorType>,
    pub FreeBuffer: Option<unsafe extern "C" fn(Handle, U32, *mut BufferHeader) -> ErrorType>,
    pub EmptyThisBuffer: Option<unsafe extern "C" fn(Handle, *mut BufferHeader) -> ErrorType>,
    pub FillThisBuffer: Option<unsafe extern "C" fn(Handle, *mut BufferHeader) -> ErrorType>,
    pub SetCallbacks: Option<unsafe extern "C" fn(Handle, *mut Callbacks, Ptr) -> ErrorType>,
    pub ComponentDeInit: Option<unsafe extern "C" fn(Handle) -> ErrorType>,
    pub UseEGLImage: Option<
        unsafe extern "C" fn(Handle, *mut *mut BufferHeader, U32, Ptr, *mut c_void) -> ErrorType,
    >,
    pub ComponentRoleEnum: Option<unsafe extern "C" fn(Handle, *mut U8, U32) -> ErrorType>,
}

/// `OMX_PORT_PARAM_TYPE`, returned by the `*Init` indices.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct PortParam {
    pub nSize: U32,
    pub nVersion: VersionType,
    pub nPorts: U32,
    pub nStartPortNumber: U32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AudioPortDefinition {
    pub cMIMEType: *mut c_char,
    pub pNativeRender: Ptr,
    pub bFlagErrorConcealment: Bool,
    pub eEncoding: AudioCodingType,
}

/// `OMX_VIDEO_PORTDEFINITIONTYPE`; only present so the format union has the
/// size the IL expects.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VideoPortDefinition {
    pub cMIMEType: *mut c_char,
    pub pNativeRender: Ptr,
    pub nFrameWidth: U32,
    pub nFrameHeight: U32,
    pub nStride: S32,
    pub nSliceHeight: U32,
    pub nBitrate: U32,
    pub xFramerate: U32,
    pub bFlagErrorConcealment: Bool,
    pub eCompressionFormat: U32,
    pub eColorFormat: U32,
    pub pNativeWindow: Ptr,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union PortDefinitionFormat {
    pub audio: AudioPortDefinition,
    pub video: VideoPortDefinition,
}

/// `OMX_PARAM_PORTDEFINITIONTYPE`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct PortDefinition {
    pub nSize: U32,
    pub nVersion: VersionType,
    pub nPortIndex: U32,
    pub eDir: DirType,
    pub nBufferCountActual: U32,
    pub nBufferCountMin: U32,
    pub nBufferSize: U32,
    pub bEnabled: Bool,
    pub bPopulated: Bool,
    pub eDomain: PortDomainType,
    pub format: PortDefinitionFormat,
    pub bBuffersContiguous: Bool,
    pub nBufferAlignment: U32,
}

/// `OMX_AUDIO_PARAM_PORTFORMATTYPE`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct AudioPortFormat {
    pub nSize: U32,
    pub nVersion: VersionType,
    pub nPortIndex: U32,
    pub nIndex: U32,
    pub eEncoding: AudioCodingType,
}

/// `OMX_AUDIO_PARAM_PCMMODETYPE`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct AudioPcmMode {
    pub nSize: U32,
    pub nVersion: VersionType,
    pub nPortIndex: U32,
    pub nChannels: U32,
    pub eNumData: NumericalDataType,
    pub eEndian: EndianType,
    pub bInterleaved: Bool,
    pub nBitPerSample: U32,
    pub nSamplingRate: U32,
    pub ePCMMode: AudioPcmModeType,
    pub eChannelMapping: [AudioChannelType; OMX_AUDIO_MAXCHANNELS],
}

/// `OMX_CONFIG_BOOLEANTYPE`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigBoolean {
    pub nSize: U32,
    pub nVersion: VersionType,
    pub bEnabled: Bool,
}

/// `OMX_CONFIG_BRCMAUDIODESTINATIONTYPE`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrcmAudioDestination {
    pub nSize: U32,
    pub nVersion: VersionType,
    pub sName: [U8; 16],
}

pub type InitFn = unsafe extern "C" fn() -> ErrorType;
pub type GetHandleFn =
    unsafe extern "C" fn(*mut Handle, *mut c_char, Ptr, *mut Callbacks) -> ErrorType;
pub type FreeHandleFn = unsafe extern "C" fn(Handle) -> ErrorType;
pub type SetupTunnelFn = unsafe extern "C" fn(Handle, U32, Handle, U32) -> ErrorType;
pub type HostFn = unsafe extern "C" fn();

/// Function table of the IL core (`libopenmaxil.so`).
pub struct LibOpenMaxIl {
    __library: libloading::Library,
    pub OMX_Init: InitFn,
    pub OMX_Deinit: InitFn,
    pub OMX_GetHandle: GetHandleFn,
    pub OMX_FreeHandle: FreeHandleFn,
    pub OMX_SetupTunnel: SetupTunnelFn,
}

impl LibOpenMaxIl {
    pub unsafe fn new<P: AsRef<OsStr>>(path: P) -> Result<Self, libloading::Error> {
        let library = unsafe { libloading::Library::new(path)? };
        unsafe { Self::from_library(library) }
    }

    pub unsafe fn from_library(library: libloading::Library) -> Result<Self, libloading::Error> {
        unsafe {
            let OMX_Init: InitFn = *library.get(b"OMX_Init\0")?;
            let OMX_Deinit: InitFn = *library.get(b"OMX_Deinit\0")?;
            let OMX_GetHandle: GetHandleFn = *library.get(b"OMX_GetHandle\0")?;
            let OMX_FreeHandle: FreeHandleFn = *library.get(b"OMX_FreeHandle\0")?;
            let OMX_SetupTunnel: SetupTunnelFn = *library.get(b"OMX_SetupTunnel\0")?;
            Ok(Self {
                __library: library,
                OMX_Init,
                OMX_Deinit,
                OMX_GetHandle,
                OMX_FreeHandle,
                OMX_SetupTunnel,
            })
        }
    }

    pub unsafe fn init(&self) -> ErrorType {
        unsafe { (self.OMX_Init)() }
    }

    pub unsafe fn deinit(&self) -> ErrorType {
        unsafe { (self.OMX_Deinit)() }
    }

    pub unsafe fn get_handle(
        &self,
        handle: *mut Handle,
        component_name: *mut c_char,
        app_data: Ptr,
        callbacks: *mut Callbacks,
    ) -> ErrorType {
        unsafe { (self.OMX_GetHandle)(handle, component_name, app_data, callbacks) }
    }

    pub unsafe fn free_handle(&self, handle: Handle) -> ErrorType {
        unsafe { (self.OMX_FreeHandle)(handle) }
    }

    pub unsafe fn setup_tunnel(
        &self,
        output: Handle,
        output_port: U32,
        input: Handle,
        input_port: U32,
    ) -> ErrorType {
        unsafe { (self.OMX_SetupTunnel)(output, output_port, input, input_port) }
    }
}

/// Function table of the VideoCore host interface (`libbcm_host.so`).
pub struct LibBcmHost {
    __library: libloading::Library,
    pub bcm_host_init: HostFn,
    pub bcm_host_deinit: HostFn,
}

impl LibBcmHost {
    pub unsafe fn new<P: AsRef<OsStr>>(path: P) -> Result<Self, libloading::Error> {
        unsafe {
            let library = libloading::Library::new(path)?;
            let bcm_host_init: HostFn = *library.get(b"bcm_host_init\0")?;
            let bcm_host_deinit: HostFn = *library.get(b"bcm_host_deinit\0")?;
            Ok(Self {
                __library: library,
                bcm_host_init,
                bcm_host_deinit,
            })
        }
    }

    pub unsafe fn init(&self) {
        unsafe { (self.bcm_host_init)() }
    }

    pub unsafe fn deinit(&self) {
        unsafe { (self.bcm_host_deinit)() }
    }
}
