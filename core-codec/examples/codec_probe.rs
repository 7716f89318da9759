//! Probe a media file with the native codec library.
//!
//! Run with:
//! ```bash
//! cargo run -p core-codec --features desktop-shims --example codec_probe -- clip.mp4
//! LAGRANGE_CODEC_LIBRARY_DIR=/opt/lagrange/lib \
//!     cargo run -p core-codec --features desktop-shims --example codec_probe -- voice.amr
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use core_codec::{BackendHandle, CodecOperation, DispatchOptions, Dispatcher, MediaBuffer};
use core_runtime::{CodecConfig, CodecSettings};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("core_codec=debug,bridge_desktop=debug")
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: codec_probe <media-file>")?;
    let input = std::fs::read(&path).with_context(|| format!("reading {path}"))?;

    let settings = CodecSettings::from_env()?;
    let options = DispatchOptions::from(&settings);
    let config = CodecConfig::builder().settings(settings).build()?;
    let handle = Arc::new(BackendHandle::open(&config)?);
    let dispatcher = Dispatcher::new(handle, options);

    match dispatcher.video_size(MediaBuffer::from(&input)) {
        Ok(info) if !info.is_empty() => {
            println!(
                "video {}x{}, {:.1}s",
                info.width,
                info.height,
                info.duration().as_secs_f64()
            );
            let frame = dispatcher.first_frame(MediaBuffer::from(&input))?;
            println!("first frame: {} bytes", frame.len());
        }
        _ => {
            let pcm =
                dispatcher.dispatch_chunks(CodecOperation::AudioToPcm, MediaBuffer::from(&input))?;
            println!("pcm: {} chunks, {} bytes", pcm.len(), pcm.total_bytes());
        }
    }

    dispatcher.handle().close();
    Ok(())
}
