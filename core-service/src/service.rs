//! Caller-facing codec API.

use std::sync::Arc;

use bridge_traits::CodecBackend;
use bytes::Bytes;
use core_codec::{
    BackendCell, BackendHandle, ChunkStream, CodecError, CodecOperation, DispatchOptions,
    Dispatcher, MediaBuffer, VideoMetadata,
};
use core_runtime::{CodecConfig, CodecSettings};
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::media::{PcmAudio, VideoPreview, VoiceRecord};

// Handle and options are created together from one configuration.
static GLOBAL_DISPATCHER: BackendCell<Dispatcher> = BackendCell::new();

/// Synchronous codec operations over one loaded backend.
///
/// Every call blocks the calling thread until the backend returns. The
/// service is cheap to clone and safe to share between threads.
#[derive(Debug, Clone)]
pub struct CodecService {
    dispatcher: Dispatcher,
}

impl CodecService {
    /// Process-wide service configured from `LAGRANGE_CODEC_*` variables.
    ///
    /// The first call resolves the platform and loads the library; every
    /// later call shares that handle. A failed first load is returned again
    /// on every call and never retried. This and [`init_global`] are the only
    /// ways the service loads an artifact.
    ///
    /// [`init_global`]: CodecService::init_global
    pub fn global() -> Result<Self> {
        Self::global_with(|| {
            let settings = CodecSettings::from_env()?;
            CodecConfig::builder().settings(settings).build()
        })
    }

    /// Initializes the process-wide service with an explicit configuration.
    ///
    /// If the global backend is already initialized the existing handle is
    /// returned and `config` is ignored.
    pub fn init_global(config: CodecConfig) -> Result<Self> {
        if GLOBAL_DISPATCHER.is_initialized() {
            warn!("Codec backend already initialized; ignoring new configuration");
        }
        Self::global_with(move || Ok(config))
    }

    fn global_with<F>(config: F) -> Result<Self>
    where
        F: FnOnce() -> core_runtime::Result<CodecConfig>,
    {
        let dispatcher = GLOBAL_DISPATCHER.get_or_init(|| {
            let config = config().map_err(|e| {
                CodecError::BackendLoad(format!("invalid codec configuration: {e}"))
            })?;
            let handle = BackendHandle::open(&config)?;
            Ok(Dispatcher::new(
                Arc::new(handle),
                DispatchOptions::from(&config.settings),
            ))
        })?;
        Ok(Self { dispatcher })
    }

    /// Uses an already-constructed backend. Nothing is loaded.
    pub fn with_backend(backend: Arc<dyn CodecBackend>, settings: &CodecSettings) -> Self {
        Self::from_handle(
            Arc::new(BackendHandle::from_backend(backend)),
            DispatchOptions::from(settings),
        )
    }

    pub fn from_handle(handle: Arc<BackendHandle>, options: DispatchOptions) -> Self {
        Self {
            dispatcher: Dispatcher::new(handle, options),
        }
    }

    pub fn handle(&self) -> &Arc<BackendHandle> {
        self.dispatcher.handle()
    }

    /// Closes the underlying backend. Clones sharing the handle are closed too.
    pub fn close(&self) -> bool {
        self.dispatcher.handle().close()
    }

    // ========================================================================
    // Backend operations
    // ========================================================================

    /// Decodes any supported audio container to 24 kHz mono PCM.
    pub fn audio_to_pcm(&self, input: &[u8]) -> Result<Bytes> {
        Ok(self.audio_to_pcm_chunks(input)?.concat())
    }

    #[instrument(skip_all, fields(input_len = input.len()))]
    pub fn audio_to_pcm_chunks(&self, input: &[u8]) -> Result<ChunkStream> {
        self.chunks(CodecOperation::AudioToPcm, input)
    }

    /// Decodes a SILK stream to 24 kHz mono PCM.
    pub fn silk_decode(&self, input: &[u8]) -> Result<Bytes> {
        Ok(self.silk_decode_chunks(input)?.concat())
    }

    #[instrument(skip_all, fields(input_len = input.len()))]
    pub fn silk_decode_chunks(&self, input: &[u8]) -> Result<ChunkStream> {
        self.chunks(CodecOperation::SilkDecode, input)
    }

    /// Encodes 24 kHz mono PCM to SILK.
    pub fn silk_encode(&self, input: &[u8]) -> Result<Bytes> {
        Ok(self.silk_encode_chunks(input)?.concat())
    }

    #[instrument(skip_all, fields(input_len = input.len()))]
    pub fn silk_encode_chunks(&self, input: &[u8]) -> Result<ChunkStream> {
        self.chunks(CodecOperation::SilkEncode, input)
    }

    /// Extracts the first frame of a video as an encoded image.
    #[instrument(skip_all, fields(input_len = input.len()))]
    pub fn video_first_frame(&self, input: &[u8]) -> Result<Bytes> {
        Ok(self.dispatcher.first_frame(MediaBuffer::new(input))?)
    }

    /// Reads video width, height and duration.
    #[instrument(skip_all, fields(input_len = input.len()))]
    pub fn video_get_size(&self, input: &[u8]) -> Result<VideoMetadata> {
        Ok(self.dispatcher.video_size(MediaBuffer::new(input))?)
    }

    fn chunks(&self, operation: CodecOperation, input: &[u8]) -> Result<ChunkStream> {
        Ok(self
            .dispatcher
            .dispatch_chunks(operation, MediaBuffer::new(input))?)
    }

    // ========================================================================
    // Composite operations
    // ========================================================================

    pub fn audio_to_mono_pcm(&self, input: &[u8]) -> Result<PcmAudio> {
        self.audio_to_pcm(input).map(PcmAudio::native)
    }

    pub fn silk_decode_pcm(&self, input: &[u8]) -> Result<PcmAudio> {
        self.silk_decode(input).map(PcmAudio::native)
    }

    /// Encodes a voice message to SILK.
    ///
    /// Input the backend cannot decode as audio is assumed to be raw 24 kHz
    /// PCM already and is encoded as-is.
    #[instrument(skip_all, fields(input_len = input.len()))]
    pub fn encode_voice(&self, input: &[u8]) -> Result<VoiceRecord> {
        let pcm = match self.audio_to_pcm(input) {
            Ok(pcm) => PcmAudio::native(pcm),
            Err(crate::ServiceError::Codec(CodecError::Backend { code, .. })) => {
                warn!(code, "Audio decode failed, encoding input as raw PCM");
                PcmAudio::native(Bytes::copy_from_slice(input))
            }
            Err(err) => return Err(err),
        };

        let silk = self.silk_encode(&pcm.data)?;
        let duration = pcm.duration();
        debug!(
            silk_bytes = silk.len(),
            duration_ms = duration.as_millis() as u64,
            "Voice encoded"
        );
        Ok(VoiceRecord { silk, duration })
    }

    /// Probes a video and extracts its first frame.
    pub fn video_preview(&self, input: &[u8]) -> Result<VideoPreview> {
        let metadata = self.video_get_size(input)?;
        let first_frame = self.video_first_frame(input)?;
        Ok(VideoPreview {
            metadata,
            first_frame,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{StatusCode, STATUS_OK};

    /// Streams the input back as a single chunk.
    struct EchoBackend;

    impl CodecBackend for EchoBackend {
        fn audio_to_pcm(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode {
            sink(input);
            STATUS_OK
        }
        fn silk_decode(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode {
            sink(input);
            STATUS_OK
        }
        fn silk_encode(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode {
            sink(b"#!SILK_V3");
            sink(input);
            STATUS_OK
        }
        fn video_first_frame(&self, input: &[u8], frame: &mut dyn FnMut(&[u8])) -> StatusCode {
            frame(&input[..1]);
            STATUS_OK
        }
        fn video_get_size(&self, _input: &[u8], info: &mut VideoMetadata) -> StatusCode {
            *info = VideoMetadata::new(640, 480, 1500);
            STATUS_OK
        }
    }

    fn service() -> CodecService {
        CodecService::with_backend(Arc::new(EchoBackend), &CodecSettings::default())
    }

    #[test]
    fn test_silk_encode_concatenates_chunks() {
        let silk = service().silk_encode(&[1, 2]).unwrap();
        assert_eq!(silk.as_ref(), b"#!SILK_V3\x01\x02");
    }

    #[test]
    fn test_chunk_variant_keeps_boundaries() {
        let stream = service().silk_encode_chunks(&[1, 2]).unwrap();
        assert_eq!(stream.len(), 2);
    }

    #[test]
    fn test_audio_to_mono_pcm_rate() {
        let pcm = service().audio_to_mono_pcm(&[0; 480]).unwrap();
        assert_eq!(pcm.sample_rate, 24_000);
        assert_eq!(pcm.duration(), std::time::Duration::from_millis(10));
    }

    #[test]
    fn test_video_preview() {
        let preview = service().video_preview(&[9, 8, 7]).unwrap();
        assert_eq!(preview.metadata, VideoMetadata::new(640, 480, 1500));
        assert_eq!(preview.first_frame.as_ref(), &[9]);
    }

    #[test]
    fn test_close_shared_between_clones() {
        let service = service();
        let clone = service.clone();
        assert!(service.close());
        assert!(clone.handle().is_closed());
        assert!(matches!(
            clone.silk_decode(&[1]),
            Err(crate::ServiceError::Codec(CodecError::BackendClosed))
        ));
    }
}
