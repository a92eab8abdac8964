//! cpal output stream driving the engine, and the gate that starts it.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use stepfx::{engine::AudioGate, engine::Engine, Error, MAX_BLOCK_SIZE};

pub struct AudioOutput {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,
}

impl AudioOutput {
    pub fn open() -> EyreResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        log::info!(
            "output: {} Hz, {} channels",
            config.sample_rate().0,
            config.channels()
        );
        Ok(Self { device, config })
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate().0 as f32
    }

    /// Build the stream around `engine`. The stream stays paused until the
    /// returned gate is resumed.
    pub fn start(self, mut engine: Engine) -> EyreResult<CpalGate> {
        let channels = self.config.channels() as usize;
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = self.device.build_output_stream(
            &self.config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames];
                    engine.process(block);

                    // Mono to all channels
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                    }
                    frames_written += frames;
                }
            },
            |err| log::error!("audio stream error: {}", err),
            None,
        )?;

        // Some hosts start streams on creation; playback waits for the gate.
        if let Err(err) = stream.pause() {
            log::debug!("could not pause new stream: {}", err);
        }

        Ok(CpalGate {
            stream,
            started: false,
        })
    }
}

/// Starts the output stream on the first play.
pub struct CpalGate {
    stream: cpal::Stream,
    started: bool,
}

impl AudioGate for CpalGate {
    fn resume(&mut self) -> stepfx::Result<()> {
        if self.started {
            return Ok(());
        }
        self.stream
            .play()
            .map_err(|err| Error::AudioStart(err.to_string()))?;
        self.started = true;
        log::info!("audio output started");
        Ok(())
    }
}
