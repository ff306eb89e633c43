// SPDX-FileCopyrightText: 2025 2025 Contributors to the omx-audio project.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use omx_audio::{AudioDestination, ConfigError, Error, PipelineSettings, SettingsError};

#[test]
fn empty_object_gives_defaults() {
    let settings = PipelineSettings::from_json("{}").unwrap();
    assert_eq!(settings, PipelineSettings::default());
    assert_eq!(settings.decoder, "OMX.broadcom.audio_decode");
    assert_eq!(settings.renderer, "OMX.broadcom.audio_render");
    assert_eq!(
        (
            settings.decoder_input_port,
            settings.decoder_output_port,
            settings.renderer_input_port
        ),
        (120, 121, 100)
    );
    assert_eq!(settings.buffer_count, 10);
    assert_eq!(settings.frames_per_buffer, 1024);
    assert_eq!(settings.destination, AudioDestination::Hdmi);
    assert_eq!(settings.buffer_timeout(), None);
    assert_eq!(settings.port_settings_timeout(), Duration::from_secs(1));
}

#[test]
fn partial_override() {
    let settings = PipelineSettings::from_json(
        r#"{ "destination": "local", "buffer_count": 4, "buffer_timeout_ms": 250 }"#,
    )
    .unwrap();
    assert_eq!(settings.destination, AudioDestination::Local);
    assert_eq!(settings.destination.as_str(), "local");
    assert_eq!(settings.buffer_count, 4);
    assert_eq!(settings.buffer_timeout(), Some(Duration::from_millis(250)));
    assert_eq!(settings.frames_per_buffer, 1024);
}

#[test]
fn malformed_json_is_reported() {
    assert!(matches!(
        PipelineSettings::from_json(r#"{ "buffer_count": "many" }"#),
        Err(Error::Settings(SettingsError::Json(_)))
    ));
    assert!(matches!(
        PipelineSettings::from_json(r#"{ "destination": "spdif" }"#),
        Err(Error::Settings(SettingsError::Json(_)))
    ));
}

#[test]
fn missing_file_is_reported() {
    assert!(matches!(
        PipelineSettings::load("/nonexistent/omx-audio.json"),
        Err(Error::Settings(SettingsError::Io(_)))
    ));
}

#[test]
fn load_from_file() {
    let path = std::env::temp_dir().join(format!("omx-audio-settings-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "frames_per_buffer": 512 }"#).unwrap();
    let settings = PipelineSettings::load(&path);
    std::fs::remove_file(&path).unwrap();
    assert_eq!(settings.unwrap().frames_per_buffer, 512);
}

#[test]
fn validation() {
    assert_eq!(PipelineSettings::default().validate(), Ok(()));
    let zero_buffers = PipelineSettings {
        buffer_count: 0,
        ..PipelineSettings::default()
    };
    assert_eq!(zero_buffers.validate(), Err(ConfigError::BufferCount));
    let zero_frames = PipelineSettings {
        frames_per_buffer: 0,
        ..PipelineSettings::default()
    };
    assert_eq!(zero_frames.validate(), Err(ConfigError::FramesPerBuffer));
}

#[test]
fn destination_names() {
    assert_eq!("HDMI".parse::<AudioDestination>(), Ok(AudioDestination::Hdmi));
    assert_eq!("local".parse::<AudioDestination>(), Ok(AudioDestination::Local));
    assert!("spdif".parse::<AudioDestination>().is_err());
    assert_eq!(AudioDestination::Hdmi.as_str(), "hdmi");
}
