// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! Smoke tests for the hand-declared IL layouts.

use std::mem::size_of;

/// The pointer-free parameter blocks must match the C sizes byte for byte,
/// since the IL rejects any block whose `nSize` it does not recognise.
#[test]
fn pointer_free_parameter_blocks_have_c_sizes() {
    assert_eq!(size_of::<omx_sys::VersionType>(), 4);
    assert_eq!(size_of::<omx_sys::PortParam>(), 16);
    assert_eq!(size_of::<omx_sys::AudioPortFormat>(), 20);
    assert_eq!(size_of::<omx_sys::AudioPcmMode>(), 104);
    assert_eq!(size_of::<omx_sys::ConfigBoolean>(), 12);
    assert_eq!(size_of::<omx_sys::BrcmAudioDestination>(), 24);
}

#[test]
fn version_is_packed_little_endian() {
    assert_eq!(omx_sys::OMX_VERSION, 0x0002_0101);
    let version = omx_sys::VersionType {
        nVersion: omx_sys::OMX_VERSION,
    };
    assert_eq!(version.nVersion.to_le_bytes(), [1, 1, 2, 0]);
}

#[test]
fn loading_a_missing_core_fails() {
    let result = unsafe { omx_sys::LibOpenMaxIl::new("/nonexistent/libopenmaxil.so") };
    assert!(result.is_err());
}
