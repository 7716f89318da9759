//! Async facade: each call runs on tokio's blocking pool.

use bytes::Bytes;
use core_codec::{ChunkStream, VideoMetadata};

use crate::error::{Result, ServiceError};
use crate::media::{PcmAudio, VideoPreview, VoiceRecord};
use crate::service::CodecService;

/// [`CodecService`] for async callers.
///
/// Inputs are taken by value so they can move onto the blocking pool.
#[derive(Debug, Clone)]
pub struct AsyncCodecService {
    inner: CodecService,
}

impl AsyncCodecService {
    pub fn new(inner: CodecService) -> Self {
        Self { inner }
    }

    pub fn blocking(&self) -> &CodecService {
        &self.inner
    }

    async fn run<T, F>(&self, call: F) -> Result<T>
    where
        F: FnOnce(&CodecService) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let service = self.inner.clone();
        tokio::task::spawn_blocking(move || call(&service))
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))?
    }

    pub async fn audio_to_pcm(&self, input: impl Into<Bytes>) -> Result<Bytes> {
        let input = input.into();
        self.run(move |s| s.audio_to_pcm(&input)).await
    }

    pub async fn silk_decode(&self, input: impl Into<Bytes>) -> Result<Bytes> {
        let input = input.into();
        self.run(move |s| s.silk_decode(&input)).await
    }

    pub async fn silk_encode(&self, input: impl Into<Bytes>) -> Result<Bytes> {
        let input = input.into();
        self.run(move |s| s.silk_encode(&input)).await
    }

    pub async fn silk_encode_chunks(&self, input: impl Into<Bytes>) -> Result<ChunkStream> {
        let input = input.into();
        self.run(move |s| s.silk_encode_chunks(&input)).await
    }

    pub async fn video_first_frame(&self, input: impl Into<Bytes>) -> Result<Bytes> {
        let input = input.into();
        self.run(move |s| s.video_first_frame(&input)).await
    }

    pub async fn video_get_size(&self, input: impl Into<Bytes>) -> Result<VideoMetadata> {
        let input = input.into();
        self.run(move |s| s.video_get_size(&input)).await
    }

    pub async fn audio_to_mono_pcm(&self, input: impl Into<Bytes>) -> Result<PcmAudio> {
        let input = input.into();
        self.run(move |s| s.audio_to_mono_pcm(&input)).await
    }

    pub async fn encode_voice(&self, input: impl Into<Bytes>) -> Result<VoiceRecord> {
        let input = input.into();
        self.run(move |s| s.encode_voice(&input)).await
    }

    pub async fn video_preview(&self, input: impl Into<Bytes>) -> Result<VideoPreview> {
        let input = input.into();
        self.run(move |s| s.video_preview(&input)).await
    }
}

impl From<CodecService> for AsyncCodecService {
    fn from(inner: CodecService) -> Self {
        Self::new(inner)
    }
}
