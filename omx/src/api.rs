// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! Dynamic loading of the IL core and host libraries.

use std::{path::Path, sync::Arc};

use tracing::debug;

use crate::Result;

/// The loaded IL function tables.
///
/// Holds the IL core and, on VideoCore systems, the host interface library
/// whose `bcm_host_init` must run before the core is initialized.
pub struct OmxApi {
    pub(crate) il: omx_sys::LibOpenMaxIl,
    pub(crate) host: Option<omx_sys::LibBcmHost>,
}

/// Shared handle to the loaded IL libraries.
pub type OmxApiHandle = Arc<OmxApi>;

/// Loads the IL core and, optionally, the VideoCore host library.
///
/// # Arguments
///
/// * `il_path` - Path to `libopenmaxil.so`
/// * `host_path` - Path to `libbcm_host.so`, or `None` on non-VideoCore systems
///
/// # Errors
///
/// Returns [`crate::Error::LibLoading`] if either library or one of its
/// symbols cannot be loaded.
///
/// # Examples
///
/// ```no_run
/// use omx::{config, load_api};
///
/// # fn main() -> Result<(), omx::Error> {
/// let host = config::get_bcm_host_so_path();
/// let api = load_api(config::get_openmaxil_so_path(), Some(host.as_path()))?;
/// # Ok(())
/// # }
/// ```
pub fn load_api(
    il_path: impl AsRef<Path>,
    host_path: Option<&Path>,
) -> Result<OmxApiHandle> {
    let host = host_path
        .map(|path| {
            debug!("Loading host library from {}", path.display());
            unsafe { omx_sys::LibBcmHost::new(path) }
        })
        .transpose()?;
    debug!("Loading IL core from {}", il_path.as_ref().display());
    let il = unsafe { omx_sys::LibOpenMaxIl::new(il_path.as_ref()) }?;
    Ok(Arc::new(OmxApi { il, host }))
}
