//! Async facade tests

#![cfg(feature = "async")]

use std::sync::Arc;

use bridge_traits::{CodecBackend, StatusCode, VideoMetadata, STATUS_OK};
use bytes::Bytes;
use core_runtime::CodecSettings;
use core_service::{AsyncCodecService, CodecError, CodecService, ServiceError};

struct ReverseBackend;

impl CodecBackend for ReverseBackend {
    fn audio_to_pcm(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode {
        for byte in input.iter().rev() {
            sink(&[*byte]);
        }
        STATUS_OK
    }
    fn silk_decode(&self, _input: &[u8], _sink: &mut dyn FnMut(&[u8])) -> StatusCode {
        13
    }
    fn silk_encode(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode {
        sink(input);
        STATUS_OK
    }
    fn video_first_frame(&self, _input: &[u8], frame: &mut dyn FnMut(&[u8])) -> StatusCode {
        frame(b"png");
        STATUS_OK
    }
    fn video_get_size(&self, _input: &[u8], info: &mut VideoMetadata) -> StatusCode {
        *info = VideoMetadata::new(320, 240, 750);
        STATUS_OK
    }
}

fn service() -> AsyncCodecService {
    CodecService::with_backend(Arc::new(ReverseBackend), &CodecSettings::default()).into()
}

#[tokio::test]
async fn test_async_audio_to_pcm() {
    let pcm = service().audio_to_pcm(vec![1u8, 2, 3]).await.unwrap();
    assert_eq!(pcm, Bytes::from_static(&[3, 2, 1]));
}

#[tokio::test]
async fn test_async_backend_error() {
    let err = service()
        .silk_decode(Bytes::from_static(b"silk"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Codec(CodecError::Backend { code: 13, .. })
    ));
}

#[tokio::test]
async fn test_async_video_preview() {
    let preview = service().video_preview(vec![0u8; 8]).await.unwrap();
    assert_eq!(preview.metadata, VideoMetadata::new(320, 240, 750));
    assert_eq!(preview.first_frame.as_ref(), b"png");
}

#[tokio::test]
async fn test_async_calls_run_concurrently() {
    let service = service();
    let tasks: Vec<_> = (0..8u8)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move { service.silk_encode(vec![i; 4]).await })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let silk = task.await.unwrap().unwrap();
        assert_eq!(silk.as_ref(), &[i as u8; 4]);
    }
}
