//! Stub backends shared by the integration suites.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{BackendLoader, CodecBackend, StatusCode, VideoMetadata, STATUS_OK};
use parking_lot::Mutex;

/// Deterministic backend that counts calls.
///
/// Streaming operations emit `chunk_count` chunks; chunk `i` is
/// `[i as u8, input[0], input.len() as u8]`. A non-zero `fail_status` is
/// returned after the chunks have been emitted.
pub struct StubBackend {
    pub chunk_count: usize,
    pub fail_status: StatusCode,
    pub frames: Vec<Vec<u8>>,
    pub metadata: VideoMetadata,
    pub calls: AtomicUsize,
}

impl StubBackend {
    pub fn new(chunk_count: usize) -> Self {
        Self {
            chunk_count,
            fail_status: STATUS_OK,
            frames: vec![vec![0xFF, 0xD8, 0xFF, 0xD9]],
            metadata: VideoMetadata::new(1920, 1080, 5000),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(mut self, status: StatusCode) -> Self {
        self.fail_status = status;
        self
    }

    pub fn with_frames(mut self, frames: Vec<Vec<u8>>) -> Self {
        self.frames = frames;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn stream(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for i in 0..self.chunk_count {
            sink(&[i as u8, input[0], input.len() as u8]);
        }
        self.fail_status
    }
}

impl CodecBackend for StubBackend {
    fn audio_to_pcm(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode {
        self.stream(input, sink)
    }

    fn silk_decode(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode {
        self.stream(input, sink)
    }

    fn silk_encode(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode {
        self.stream(input, sink)
    }

    fn video_first_frame(&self, _input: &[u8], frame: &mut dyn FnMut(&[u8])) -> StatusCode {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_status != STATUS_OK {
            return self.fail_status;
        }
        for bytes in &self.frames {
            frame(bytes);
        }
        STATUS_OK
    }

    fn video_get_size(&self, _input: &[u8], info: &mut VideoMetadata) -> StatusCode {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_status != STATUS_OK {
            return self.fail_status;
        }
        *info = self.metadata;
        STATUS_OK
    }

    fn describe(&self) -> String {
        "stub backend".to_string()
    }
}

/// Loader that counts loads and records requested paths.
pub struct CountingLoader {
    pub loads: AtomicUsize,
    pub paths: Mutex<Vec<PathBuf>>,
    pub backend: Arc<StubBackend>,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self {
            loads: AtomicUsize::new(0),
            paths: Mutex::new(Vec::new()),
            backend: Arc::new(StubBackend::new(2)),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl BackendLoader for CountingLoader {
    fn load(&self, path: &Path) -> BridgeResult<Arc<dyn CodecBackend>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().push(path.to_path_buf());
        // Widen the race window for the single-init test.
        std::thread::sleep(std::time::Duration::from_millis(20));
        Ok(self.backend.clone())
    }
}
