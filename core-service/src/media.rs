//! Decoded media values returned by the composite operations.

use std::time::Duration;

use bytes::Bytes;
use core_codec::VideoMetadata;
use serde::Serialize;

/// Sample rate of PCM produced by `audio_to_pcm` and `silk_decode`.
pub const PCM_SAMPLE_RATE: u32 = 24_000;

/// Bytes per sample of signed 16-bit mono PCM.
pub const PCM_BYTES_PER_SAMPLE: usize = 2;

/// Signed 16-bit little-endian mono PCM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmAudio {
    pub data: Bytes,
    pub sample_rate: u32,
}

impl PcmAudio {
    pub fn new(data: Bytes, sample_rate: u32) -> Self {
        Self { data, sample_rate }
    }

    /// PCM at the backend's native 24 kHz rate.
    pub fn native(data: Bytes) -> Self {
        Self::new(data, PCM_SAMPLE_RATE)
    }

    pub fn sample_count(&self) -> usize {
        self.data.len() / PCM_BYTES_PER_SAMPLE
    }

    /// Playback length. A trailing odd byte is ignored.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let micros = self.sample_count() as u64 * 1_000_000 / u64::from(self.sample_rate);
        Duration::from_micros(micros)
    }
}

/// SILK-encoded voice message and its length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceRecord {
    pub silk: Bytes,
    pub duration: Duration,
}

/// Video dimensions, duration and an encoded thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoPreview {
    pub metadata: VideoMetadata,
    #[serde(skip)]
    pub first_frame: Bytes,
}

impl VideoPreview {
    pub fn duration(&self) -> Duration {
        self.metadata.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_duration() {
        // One second of 24 kHz mono s16le.
        let pcm = PcmAudio::native(Bytes::from(vec![0u8; 48_000]));
        assert_eq!(pcm.sample_count(), 24_000);
        assert_eq!(pcm.duration(), Duration::from_secs(1));

        let short = PcmAudio::native(Bytes::from(vec![0u8; 4_801]));
        assert_eq!(short.duration(), Duration::from_millis(100));
    }

    #[test]
    fn test_pcm_zero_rate() {
        let pcm = PcmAudio::new(Bytes::from_static(&[0, 0]), 0);
        assert_eq!(pcm.duration(), Duration::ZERO);
    }

    #[test]
    fn test_preview_duration() {
        let preview = VideoPreview {
            metadata: VideoMetadata::new(1280, 720, 12_500),
            first_frame: Bytes::new(),
        };
        assert_eq!(preview.duration(), Duration::from_millis(12_500));
    }
}
