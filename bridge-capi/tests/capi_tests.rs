//! C API tests
//!
//! All tests share one installed service backed by an in-process stub, so
//! no test closes it.

use std::ffi::c_void;
use std::os::raw::c_int;
use std::ptr;
use std::sync::{Arc, Once};

use bridge_capi::*;
use bridge_traits::{CodecBackend, StatusCode, VideoMetadata, STATUS_OK};
use core_runtime::CodecSettings;
use core_service::CodecService;

/// Emits one chunk per input byte (`[index, byte]`). `silk_decode` fails with
/// the status `-input[0]`, or 42 for a zero first byte.
struct StubBackend;

impl CodecBackend for StubBackend {
    fn audio_to_pcm(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode {
        for (i, byte) in input.iter().enumerate() {
            sink(&[i as u8, *byte]);
        }
        STATUS_OK
    }
    fn silk_decode(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode {
        sink(b"partial");
        match input[0] {
            0 => 42,
            code => -StatusCode::from(code),
        }
    }
    fn silk_encode(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode {
        sink(b"#!SILK_V3");
        sink(input);
        STATUS_OK
    }
    fn video_first_frame(&self, _input: &[u8], frame: &mut dyn FnMut(&[u8])) -> StatusCode {
        frame(&[0xFF, 0xD8, 0x00, 0xFF, 0xD9]);
        STATUS_OK
    }
    fn video_get_size(&self, _input: &[u8], info: &mut VideoMetadata) -> StatusCode {
        *info = VideoMetadata::new(1920, 1080, 5000);
        STATUS_OK
    }
}

fn setup() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let settings = CodecSettings::default();
        let service = CodecService::with_backend(Arc::new(StubBackend), &settings);
        assert!(install_service(service));
    });
}

unsafe extern "C" fn collect(user_data: *mut c_void, data: *const u8, len: c_int) {
    let chunks = &mut *user_data.cast::<Vec<Vec<u8>>>();
    chunks.push(std::slice::from_raw_parts(data, len as usize).to_vec());
}

fn user_data(chunks: &mut Vec<Vec<u8>>) -> *mut c_void {
    (chunks as *mut Vec<Vec<u8>>).cast()
}

#[test]
fn test_chunks_delivered_in_order() {
    setup();
    let input = [10u8, 20, 30];
    let mut chunks = Vec::new();

    let status = unsafe {
        lgc_audio_to_pcm(input.as_ptr(), 3, Some(collect), user_data(&mut chunks))
    };

    assert_eq!(status, LGC_OK);
    assert_eq!(chunks, vec![vec![0, 10], vec![1, 20], vec![2, 30]]);
}

#[test]
fn test_silk_encode_round_trip_shape() {
    setup();
    let pcm = [1u8, 2, 3, 4];
    let mut chunks = Vec::new();

    let status =
        unsafe { lgc_silk_encode(pcm.as_ptr(), 4, Some(collect), user_data(&mut chunks)) };

    assert_eq!(status, LGC_OK);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], b"#!SILK_V3");
    assert_eq!(chunks[1], pcm);
}

#[test]
fn test_backend_code_verbatim_without_chunks() {
    setup();
    let input = [0u8];
    let mut chunks = Vec::new();

    let status =
        unsafe { lgc_silk_decode(input.as_ptr(), 1, Some(collect), user_data(&mut chunks)) };

    assert_eq!(status, 42);
    assert!(chunks.is_empty());
}

#[test]
fn test_small_negative_backend_codes_not_confused_with_local_errors() {
    setup();
    for code in 1u8..=7 {
        let input = [code];
        let mut chunks = Vec::new();

        let status =
            unsafe { lgc_silk_decode(input.as_ptr(), 1, Some(collect), user_data(&mut chunks)) };

        assert_eq!(status, -c_int::from(code));
        assert!(![
            LGC_ERR_INVALID_INPUT,
            LGC_ERR_UNSUPPORTED_PLATFORM,
            LGC_ERR_BACKEND_LOAD,
            LGC_ERR_MALFORMED_RESULT,
            LGC_ERR_CLOSED,
            LGC_ERR_INTERNAL,
        ]
        .contains(&status));
        assert!(chunks.is_empty());
    }
}

#[test]
fn test_empty_input_never_calls_backend() {
    setup();
    let mut chunks = Vec::new();

    let status =
        unsafe { lgc_silk_encode(ptr::null(), 0, Some(collect), user_data(&mut chunks)) };
    assert_eq!(status, LGC_ERR_INVALID_INPUT);

    let mut info = VideoMetadata::default();
    let status = unsafe { lgc_video_get_size(ptr::null(), 0, &mut info) };
    assert_eq!(status, LGC_ERR_INVALID_INPUT);

    assert!(chunks.is_empty());
    assert_eq!(info, VideoMetadata::default());
}

#[test]
fn test_first_frame_ownership() {
    setup();
    let input = [0u8; 8];
    let mut frame: *mut u8 = ptr::null_mut();
    let mut size: c_int = 0;

    let status = unsafe { lgc_video_first_frame(input.as_ptr(), 8, &mut frame, &mut size) };

    assert_eq!(status, LGC_OK);
    assert_eq!(size, 5);
    let bytes = unsafe { std::slice::from_raw_parts(frame, size as usize) };
    assert_eq!(bytes, &[0xFF, 0xD8, 0x00, 0xFF, 0xD9]);
    unsafe { lgc_free_frame(frame, size) };
}

#[test]
fn test_video_get_size_layout() {
    setup();
    let input = [0u8; 8];
    let mut info = VideoMetadata::default();

    let status = unsafe { lgc_video_get_size(input.as_ptr(), 8, &mut info) };

    assert_eq!(status, LGC_OK);
    assert_eq!(info, VideoMetadata::new(1920, 1080, 5000));
}

#[test]
fn test_init_after_install_is_ok() {
    setup();
    let status = unsafe { lgc_init(c"/opt/lagrange/lib".as_ptr()) };
    assert_eq!(status, LGC_OK);
    assert!(!install_service(CodecService::with_backend(
        Arc::new(StubBackend),
        &CodecSettings::default()
    )));
}
