//! Microphone capture.
//!
//! The pipeline talks to the microphone through two small traits:
//!
//! * [`MicrophoneCapture`] opens a device ([`acquire`](MicrophoneCapture::acquire))
//!   and gives it back ([`release`](MicrophoneCapture::release)).
//! * [`CaptureHandle`] is one opened device.  It reports the native sample
//!   rate so the signal chain can be designed for it, and only starts the
//!   hardware stream when [`begin`](CaptureHandle::begin) is called.
//!
//! [`CpalMicrophone`] is the production implementation.  Its stream callback
//! downmixes each buffer to mono and hands it to a [`FrameSink`] on the cpal
//! audio thread.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use super::mix::downmix_into;

// ---------------------------------------------------------------------------
// FrameSink
// ---------------------------------------------------------------------------

/// Consumer of mono audio frames, called on the real-time audio thread.
///
/// Implementations must not block.  The sink may overwrite `frame` with its
/// own output.  [`CpalMicrophone`] discards it: an input stream has no
/// output route.
pub trait FrameSink: Send + 'static {
    fn process(&mut self, frame: &mut [f32]);
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors that can occur while opening or starting the microphone.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("input device {0:?} not found")]
    DeviceNotFound(String),

    #[error("failed to enumerate input devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("input device delivers {0:?} samples; only f32 is supported")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("capture already started on this handle")]
    AlreadyStarted,
}

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// One opened input device.
///
/// Not `Send`: `cpal::Stream` is tied to the thread that created it on some
/// platforms, so the handle stays with its owner.
pub trait CaptureHandle {
    /// Native sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Start the hardware stream, feeding every buffer to `sink`.
    fn begin(&mut self, sink: Box<dyn FrameSink>) -> Result<(), CaptureError>;

    /// Stop the hardware stream.  Idempotent.
    fn halt(&mut self);
}

/// Platform microphone.
pub trait MicrophoneCapture {
    /// Open the input device without starting it.
    fn acquire(&self) -> Result<Box<dyn CaptureHandle>, CaptureError>;

    /// Stop and drop a handle obtained from [`acquire`](Self::acquire).
    fn release(&self, mut handle: Box<dyn CaptureHandle>) {
        handle.halt();
    }
}

// ---------------------------------------------------------------------------
// CpalMicrophone
// ---------------------------------------------------------------------------

/// [`MicrophoneCapture`] on the default cpal host.
#[derive(Debug, Clone, Default)]
pub struct CpalMicrophone {
    /// Input device name; `None` selects the host default.
    device_name: Option<String>,
    /// Requested frames per callback; `None` keeps the host default.
    buffer_frames: Option<u32>,
}

impl CpalMicrophone {
    /// Capture from the host's default input device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture from the input device called `name`, or the default when
    /// `name` is `None`.
    pub fn with_device(name: Option<String>) -> Self {
        Self {
            device_name: name,
            buffer_frames: None,
        }
    }

    /// Ask for `frames` per callback instead of the host default.
    pub fn with_buffer_frames(mut self, frames: Option<u32>) -> Self {
        self.buffer_frames = frames;
        self
    }

    fn find_device(&self, host: &cpal::Host) -> Result<cpal::Device, CaptureError> {
        match &self.device_name {
            None => host.default_input_device().ok_or(CaptureError::NoDevice),
            Some(wanted) => host
                .input_devices()?
                .find(|d| d.name().is_ok_and(|n| &n == wanted))
                .ok_or_else(|| CaptureError::DeviceNotFound(wanted.clone())),
        }
    }
}

impl MicrophoneCapture for CpalMicrophone {
    /// Open the configured input device and query its preferred stream
    /// configuration.
    ///
    /// # Errors
    ///
    /// [`CaptureError::NoDevice`] / [`CaptureError::DeviceNotFound`] when the
    /// device is missing, [`CaptureError::DefaultConfig`] when it cannot
    /// report a configuration, [`CaptureError::UnsupportedFormat`] when it
    /// does not deliver `f32`.
    fn acquire(&self) -> Result<Box<dyn CaptureHandle>, CaptureError> {
        let host = cpal::default_host();
        let device = self.find_device(&host)?;

        let supported = device.default_input_config()?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(CaptureError::UnsupportedFormat(supported.sample_format()));
        }

        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let buffer_size = buffer_size_for(self.buffer_frames, supported.buffer_size());
        let mut config: cpal::StreamConfig = supported.into();
        config.buffer_size = buffer_size;

        log::info!(
            "microphone acquired: {} ({} Hz, {} ch, buffer {:?})",
            device.name().unwrap_or_else(|_| "<unnamed>".into()),
            sample_rate,
            channels,
            config.buffer_size
        );

        Ok(Box::new(CpalCapture {
            device,
            config,
            sample_rate,
            channels,
            stream: None,
        }))
    }
}

/// Stream buffer size for a requested frame count, clamped to what the
/// device reports.  Devices that report no range get the request as is.
fn buffer_size_for(
    requested: Option<u32>,
    supported: &cpal::SupportedBufferSize,
) -> cpal::BufferSize {
    match (requested, supported) {
        (None, _) => cpal::BufferSize::Default,
        (Some(frames), cpal::SupportedBufferSize::Range { min, max }) => {
            cpal::BufferSize::Fixed(frames.clamp(*min, (*max).max(*min)))
        }
        (Some(frames), cpal::SupportedBufferSize::Unknown) => cpal::BufferSize::Fixed(frames),
    }
}

/// An opened cpal input device.  Dropping it drops the stream, which stops
/// the hardware.
struct CpalCapture {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_rate: u32,
    channels: u16,
    stream: Option<cpal::Stream>,
}

impl CaptureHandle for CpalCapture {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn begin(&mut self, mut sink: Box<dyn FrameSink>) -> Result<(), CaptureError> {
        if self.stream.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }

        let channels = self.channels;
        let mut mono: Vec<f32> = Vec::new();

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                downmix_into(data, channels, &mut mono);
                sink.process(&mut mono);
            },
            |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
            },
            None,
        )?;

        stream.play()?;
        self.stream = Some(stream);
        Ok(())
    }

    fn halt(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                log::debug!("pausing input stream failed (dropping anyway): {e}");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
