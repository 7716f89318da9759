//! # Codec Dispatch Core
//!
//! Validates input, calls the backend entry point, collects what it pushes
//! back through the chunk callback, and turns the status code into a
//! [`Result`].
//!
//! ## Invocation lifecycle
//!
//! ```text
//! Idle -> Validating -> Failed (InvalidInput)
//!                    -> Dispatched -> Failed (backend status)
//!                                  -> CollectingChunks* -> Completed | Failed
//!                                  -> Completed
//! ```
//!
//! `Completed` and `Failed` are terminal. The backend call is synchronous, so
//! chunk collection is a plain closure that copies each chunk into [`Bytes`]
//! before the callback returns. Nothing downstream sees a chunk until the
//! backend call has returned.

use std::fmt;
use std::sync::Arc;

use bridge_traits::{CodecBackend, CodecOperation, StatusCode, VideoMetadata, STATUS_OK};
use bytes::Bytes;
use core_runtime::{CodecSettings, PartialResultPolicy};
use thiserror::Error;
use tracing::{debug, debug_span, warn};

use crate::backend::BackendHandle;
use crate::error::{CodecError, Result};
use crate::types::{ChunkStream, MediaBuffer};

/// Largest input the native `int` length parameter can describe.
pub const MAX_NATIVE_INPUT: usize = i32::MAX as usize;

/// Lifecycle state of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationState {
    Idle,
    Validating,
    Dispatched,
    CollectingChunks,
    Completed,
    Failed,
}

impl InvocationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvocationState::Completed | InvocationState::Failed)
    }

    pub fn can_transition_to(&self, next: InvocationState) -> bool {
        use InvocationState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Dispatched)
                | (Validating, Failed)
                | (Dispatched, CollectingChunks)
                | (Dispatched, Completed)
                | (Dispatched, Failed)
                | (CollectingChunks, CollectingChunks)
                | (CollectingChunks, Completed)
                | (CollectingChunks, Failed)
        )
    }
}

/// Rejected state change.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{operation} cannot move from {from:?} to {to:?}")]
pub struct InvalidTransition {
    pub operation: CodecOperation,
    pub from: InvocationState,
    pub to: InvocationState,
}

impl From<InvalidTransition> for CodecError {
    fn from(err: InvalidTransition) -> Self {
        CodecError::MalformedResult(err.to_string())
    }
}

/// State tracker for a single call.
#[derive(Debug, Clone)]
pub struct Invocation {
    operation: CodecOperation,
    state: InvocationState,
}

impl Invocation {
    pub fn new(operation: CodecOperation) -> Self {
        Self {
            operation,
            state: InvocationState::Idle,
        }
    }

    pub fn operation(&self) -> CodecOperation {
        self.operation
    }

    pub fn state(&self) -> InvocationState {
        self.state
    }

    pub fn advance(&mut self, next: InvocationState) -> std::result::Result<(), InvalidTransition> {
        if !self.state.can_transition_to(next) {
            return Err(InvalidTransition {
                operation: self.operation,
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Moves to `Failed` and hands back `err`.
    fn fail(&mut self, err: CodecError) -> CodecError {
        if let Err(transition) = self.advance(InvocationState::Failed) {
            debug!("{transition}");
        }
        err
    }
}

/// Checks an input buffer before any backend call.
pub fn validate(input: &MediaBuffer<'_>, max_input_bytes: Option<usize>) -> Result<()> {
    if input.is_empty() {
        return Err(CodecError::InvalidInput("input buffer is empty".to_string()));
    }

    if input.declared_len() != input.len() {
        return Err(CodecError::InvalidInput(format!(
            "declared length {} does not match buffer length {}",
            input.declared_len(),
            input.len()
        )));
    }

    if input.len() > MAX_NATIVE_INPUT {
        return Err(CodecError::InvalidInput(format!(
            "input of {} bytes exceeds the native limit of {} bytes",
            input.len(),
            MAX_NATIVE_INPUT
        )));
    }

    if let Some(max) = max_input_bytes {
        if input.len() > max {
            return Err(CodecError::InvalidInput(format!(
                "input of {} bytes exceeds the configured limit of {} bytes",
                input.len(),
                max
            )));
        }
    }

    Ok(())
}

/// Callback-side accumulator: copies each chunk as it arrives.
#[derive(Debug, Default)]
pub struct ChunkCollector {
    chunks: Vec<Bytes>,
    total_bytes: usize,
}

impl ChunkCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.total_bytes += chunk.len();
        self.chunks.push(Bytes::copy_from_slice(chunk));
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn into_chunks(self) -> Vec<Bytes> {
        self.chunks
    }

    pub fn into_stream(self) -> ChunkStream {
        ChunkStream::new(self.chunks)
    }
}

/// Dispatch behaviour taken from settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    pub partial_results: PartialResultPolicy,
    pub max_input_bytes: Option<usize>,
}

impl From<&CodecSettings> for DispatchOptions {
    fn from(settings: &CodecSettings) -> Self {
        Self {
            partial_results: settings.partial_results,
            max_input_bytes: settings.max_input_bytes,
        }
    }
}

/// Runs invocations against a shared [`BackendHandle`].
#[derive(Clone)]
pub struct Dispatcher {
    handle: Arc<BackendHandle>,
    options: DispatchOptions,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handle", &self.handle)
            .field("options", &self.options)
            .finish()
    }
}

impl Dispatcher {
    pub fn new(handle: Arc<BackendHandle>, options: DispatchOptions) -> Self {
        Self { handle, options }
    }

    pub fn handle(&self) -> &Arc<BackendHandle> {
        &self.handle
    }

    pub fn options(&self) -> DispatchOptions {
        self.options
    }

    /// Runs a chunk-producing operation (`audio_to_pcm`, `silk_decode`,
    /// `silk_encode`) and returns its chunks in emission order.
    pub fn dispatch_chunks(
        &self,
        operation: CodecOperation,
        input: MediaBuffer<'_>,
    ) -> Result<ChunkStream> {
        let span = debug_span!("codec_invocation", %operation, input_len = input.len());
        let _enter = span.enter();

        let mut invocation = Invocation::new(operation);
        let backend = self.begin(&mut invocation, &input)?;

        let mut collector = ChunkCollector::new();
        let status = {
            let mut sink = |chunk: &[u8]| collector.push(chunk);
            call_streaming(backend, operation, input.as_slice(), &mut sink)
        };
        let Some(status) = status else {
            return Err(invocation.fail(CodecError::InvalidInput(format!(
                "{operation} does not produce a chunk stream"
            ))));
        };
        self.collected(&mut invocation, &collector)?;

        if status != STATUS_OK {
            return Err(self.backend_failure(&mut invocation, status, collector));
        }

        invocation.advance(InvocationState::Completed)?;
        debug!(
            chunks = collector.len(),
            bytes = collector.total_bytes(),
            "Invocation completed"
        );
        Ok(collector.into_stream())
    }

    /// Extracts the first video frame. The backend must deliver exactly one.
    pub fn first_frame(&self, input: MediaBuffer<'_>) -> Result<Bytes> {
        let operation = CodecOperation::VideoFirstFrame;
        let span = debug_span!("codec_invocation", %operation, input_len = input.len());
        let _enter = span.enter();

        let mut invocation = Invocation::new(operation);
        let backend = self.begin(&mut invocation, &input)?;

        let mut collector = ChunkCollector::new();
        let status = backend.video_first_frame(input.as_slice(), &mut |frame: &[u8]| {
            collector.push(frame)
        });
        self.collected(&mut invocation, &collector)?;

        if status != STATUS_OK {
            return Err(self.backend_failure(&mut invocation, status, collector));
        }

        let frames = collector.into_chunks();
        if frames.len() != 1 {
            let err = CodecError::MalformedResult(format!(
                "{operation} delivered {} frames, expected exactly one",
                frames.len()
            ));
            warn!("{err}");
            return Err(invocation.fail(err));
        }

        invocation.advance(InvocationState::Completed)?;
        let frame = frames.into_iter().next().unwrap_or_default();
        debug!(bytes = frame.len(), "Invocation completed");
        Ok(frame)
    }

    /// Probes video dimensions and duration.
    pub fn video_size(&self, input: MediaBuffer<'_>) -> Result<VideoMetadata> {
        let operation = CodecOperation::VideoGetSize;
        let span = debug_span!("codec_invocation", %operation, input_len = input.len());
        let _enter = span.enter();

        let mut invocation = Invocation::new(operation);
        let backend = self.begin(&mut invocation, &input)?;

        let mut info = VideoMetadata::default();
        let status = backend.video_get_size(input.as_slice(), &mut info);

        if status != STATUS_OK {
            return Err(self.backend_failure(&mut invocation, status, ChunkCollector::new()));
        }

        invocation.advance(InvocationState::Completed)?;
        debug!(
            width = info.width,
            height = info.height,
            duration_ms = info.duration,
            "Invocation completed"
        );
        Ok(info)
    }

    /// `Idle -> Validating -> Dispatched`, returning the backend to call.
    fn begin<'h>(
        &'h self,
        invocation: &mut Invocation,
        input: &MediaBuffer<'_>,
    ) -> Result<&'h dyn CodecBackend> {
        invocation.advance(InvocationState::Validating)?;

        if let Err(err) = validate(input, self.options.max_input_bytes) {
            debug!("Rejected input: {err}");
            return Err(invocation.fail(err));
        }

        let backend = match self.handle.backend() {
            Ok(backend) => backend,
            Err(err) => return Err(invocation.fail(err)),
        };

        invocation.advance(InvocationState::Dispatched)?;
        Ok(backend)
    }

    fn collected(&self, invocation: &mut Invocation, collector: &ChunkCollector) -> Result<()> {
        if !collector.is_empty() {
            invocation.advance(InvocationState::CollectingChunks)?;
        }
        Ok(())
    }

    fn backend_failure(
        &self,
        invocation: &mut Invocation,
        code: StatusCode,
        collector: ChunkCollector,
    ) -> CodecError {
        let operation = invocation.operation();
        let emitted = collector.len();
        let partial = match self.options.partial_results {
            PartialResultPolicy::Discard => Vec::new(),
            PartialResultPolicy::Preserve => collector.into_chunks(),
        };

        warn!(
            code,
            emitted_chunks = emitted,
            kept_chunks = partial.len(),
            "Backend returned an error status"
        );

        invocation.fail(CodecError::Backend {
            operation,
            code,
            partial,
        })
    }
}

fn call_streaming(
    backend: &dyn CodecBackend,
    operation: CodecOperation,
    input: &[u8],
    sink: &mut dyn FnMut(&[u8]),
) -> Option<StatusCode> {
    match operation {
        CodecOperation::AudioToPcm => Some(backend.audio_to_pcm(input, sink)),
        CodecOperation::SilkDecode => Some(backend.silk_decode(input, sink)),
        CodecOperation::SilkEncode => Some(backend.silk_encode(input, sink)),
        CodecOperation::VideoFirstFrame | CodecOperation::VideoGetSize => None,
    }
}
