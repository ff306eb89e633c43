// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

//! Basic integration tests for the OMX Rust bindings.
//!
//! These tests cover everything that does not need a VideoCore board: status
//! code mapping, flag and parameter conversions, notification helpers and
//! library loading failures.

use std::path::Path;

use omx::{
    AudioChannel, AudioCoding, BufferFlags, ComponentId, ComponentState, Error, Event, config,
    load_api,
};

/// Ensures logging is initialized only once across all tests.
static LOG_ONCE: std::sync::Once = std::sync::Once::new();

fn setup_test() {
    // Initialize logging once (respects RUST_LOG environment variable)
    LOG_ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

#[test]
fn status_codes_map_to_variants() {
    setup_test();
    assert!(Error::from_status(omx_sys::OMX_ErrorNone).is_ok());
    assert!(matches!(
        Error::from_status(omx_sys::OMX_ErrorHardware),
        Err(Error::Hardware)
    ));
    assert!(matches!(
        Error::from_status(omx_sys::OMX_ErrorBadPortIndex),
        Err(Error::BadPortIndex)
    ));
    assert!(matches!(
        Error::from_status(0x8000_1234),
        Err(Error::Unknown(0x8000_1234))
    ));
}

#[test]
fn errors_report_their_status() {
    setup_test();
    for status in [
        omx_sys::OMX_ErrorInsufficientResources,
        omx_sys::OMX_ErrorSameState,
        omx_sys::OMX_ErrorIncorrectStateTransition,
        omx_sys::OMX_ErrorPortUnpopulated,
        0x8000_1234,
    ] {
        let error = Error::from_status(status).unwrap_err();
        assert_eq!(error.status(), Some(status));
    }
    assert_eq!(Error::Other("x".to_string()).status(), None);
}

#[test]
fn only_same_state_is_informational() {
    setup_test();
    assert!(Error::SameState.is_same_state());
    assert!(!Error::Hardware.is_same_state());
    assert!(!Error::Timeout.is_same_state());
}

#[test]
fn buffer_flags_combine() {
    setup_test();
    let header = BufferFlags::CODEC_CONFIG | BufferFlags::END_OF_FRAME;
    assert_eq!(header.bits(), 0x90);
    assert!(header.contains(BufferFlags::END_OF_FRAME));
    assert!(!header.contains(BufferFlags::END_OF_STREAM));
    assert_eq!(BufferFlags::default(), BufferFlags::NONE);
}

#[test]
fn vendor_codings_are_recognised() {
    setup_test();
    assert_eq!(AudioCoding::from_raw(2), AudioCoding::Pcm);
    assert_eq!(AudioCoding::from_raw(0x7F00_0002), AudioCoding::Ddp);
    assert_eq!(AudioCoding::from_raw(0x7F00_0003), AudioCoding::Dts);
    assert_eq!(AudioCoding::from_raw(0x7F00_0001), AudioCoding::Other(0x7F00_0001));
    assert_eq!(AudioCoding::Dts.raw(), omx_sys::OMX_AUDIO_CodingDTS);
}

#[test]
fn channel_codes_follow_the_il_enumeration() {
    setup_test();
    assert_eq!(AudioChannel::LeftFront.raw(), 1);
    assert_eq!(AudioChannel::LowFrequency.raw(), 6);
    assert_eq!(AudioChannel::RightRear.raw(), 9);
    assert_eq!(AudioChannel::from_raw(42), AudioChannel::None);
}

#[test]
fn states_display_in_lower_case() {
    setup_test();
    assert_eq!(ComponentState::Executing.to_string(), "executing");
    assert_eq!(
        ComponentState::from_raw(omx_sys::OMX_StateIdle),
        ComponentState::Idle
    );
    assert_eq!(ComponentState::from_raw(99), ComponentState::Invalid);
}

#[test]
fn error_events_expose_their_error() {
    setup_test();
    let event = Event::Error {
        status: omx_sys::OMX_ErrorStreamCorrupt,
    };
    assert!(matches!(event.error(), Some(Error::StreamCorrupt)));
    assert!(Event::EndOfStream { port: 100 }.error().is_none());
    assert_eq!(ComponentId(3).to_string(), "component#3");
}

#[test]
fn missing_library_fails_to_load() {
    setup_test();
    let result = load_api("/nonexistent/libopenmaxil.so", None);
    assert!(matches!(result, Err(Error::LibLoading(_))));

    let result = load_api(
        config::get_openmaxil_so_path(),
        Some(Path::new("/nonexistent/libbcm_host.so")),
    );
    assert!(matches!(result, Err(Error::LibLoading(_))));
}

#[test]
fn library_paths_share_one_directory() {
    setup_test();
    let dir = config::get_omx_lib_dir();
    assert_eq!(
        config::get_openmaxil_so_path(),
        dir.join("libopenmaxil.so")
    );
    assert_eq!(config::get_bcm_host_so_path(), dir.join("libbcm_host.so"));
}
