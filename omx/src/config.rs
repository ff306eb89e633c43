// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! Build-time configuration and path resolution for the IL libraries.
//!
//! This module provides helper functions to locate the OpenMAX IL core and
//! the VideoCore host library based on compile-time build settings.

use std::path::PathBuf;

// Build script generates constants.rs with OMX_LIB_DIR
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

/// Returns the directory the IL libraries are loaded from.
///
/// Defaults to `/opt/vc/lib`; set `OMX_LIB_DIR` when building to change it.
pub fn get_omx_lib_dir() -> PathBuf {
    PathBuf::from(OMX_LIB_DIR)
}

/// Returns the path to the OpenMAX IL core (`libopenmaxil.so`).
///
/// # Examples
///
/// ```no_run
/// use omx::config::{get_bcm_host_so_path, get_openmaxil_so_path};
/// use omx::load_api;
///
/// # fn main() -> Result<(), omx::Error> {
/// let host = get_bcm_host_so_path();
/// let api = load_api(get_openmaxil_so_path(), Some(host.as_path()))?;
/// # Ok(())
/// # }
/// ```
pub fn get_openmaxil_so_path() -> PathBuf {
    get_omx_lib_dir().join("libopenmaxil.so")
}

/// Returns the path to the VideoCore host interface (`libbcm_host.so`).
pub fn get_bcm_host_so_path() -> PathBuf {
    get_omx_lib_dir().join("libbcm_host.so")
}
