//! Single-frame camera capture through `getUserMedia`.
//!
//! Opens the default video device, waits for playback to start, draws one
//! frame to an offscreen canvas and stops every track again. The stream is
//! always released, whether or not the frame could be read.

use photodesk_core::intake::{CaptureError, CapturedFrame};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::error::{describe_js_error, error_name};

/// Grab one RGBA frame from the user's camera.
#[allow(clippy::future_not_send)] // MediaStream is !Send; WASM is single-threaded
pub async fn grab_frame() -> Result<CapturedFrame, CaptureError> {
    let stream = open_stream().await?;
    let frame = read_frame(&stream).await;
    stop_stream(&stream);
    frame
}

async fn open_stream() -> Result<web_sys::MediaStream, CaptureError> {
    let window = web_sys::window().ok_or(CaptureError::NoCamera)?;
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|_| CaptureError::NoCamera)?;

    let constraints = web_sys::MediaStreamConstraints::new();
    constraints.set_video(&JsValue::TRUE);
    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(map_media_error)?;

    let stream = JsFuture::from(promise).await.map_err(map_media_error)?;
    stream
        .dyn_into::<web_sys::MediaStream>()
        .map_err(|_| CaptureError::Frame("getUserMedia did not return a stream".into()))
}

async fn read_frame(stream: &web_sys::MediaStream) -> Result<CapturedFrame, CaptureError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| CaptureError::Frame("no document".into()))?;

    let video: web_sys::HtmlVideoElement = document
        .create_element("video")
        .map_err(frame_error)?
        .dyn_into()
        .map_err(|_| CaptureError::Frame("failed to create video element".into()))?;
    video.set_muted(true);
    video.set_src_object(Some(stream));

    let playing = video.play().map_err(frame_error)?;
    JsFuture::from(playing).await.map_err(frame_error)?;

    let (width, height) = (video.video_width(), video.video_height());
    if width == 0 || height == 0 {
        return Err(CaptureError::Frame("camera reported no frame size".into()));
    }

    let canvas: web_sys::HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(frame_error)?
        .dyn_into()
        .map_err(|_| CaptureError::Frame("failed to create canvas".into()))?;
    canvas.set_width(width);
    canvas.set_height(height);

    let ctx: web_sys::CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(frame_error)?
        .ok_or_else(|| CaptureError::Frame("2d context unavailable".into()))?
        .dyn_into()
        .map_err(|_| CaptureError::Frame("unexpected context type".into()))?;

    ctx.draw_image_with_html_video_element(&video, 0.0, 0.0)
        .map_err(frame_error)?;
    let data = ctx
        .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
        .map_err(frame_error)?;

    video.set_src_object(None);
    Ok(CapturedFrame {
        width,
        height,
        rgba: data.data().0,
    })
}

fn stop_stream(stream: &web_sys::MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<web_sys::MediaStreamTrack>() {
            track.stop();
        }
    }
}

fn map_media_error(err: JsValue) -> CaptureError {
    match error_name(&err).as_deref() {
        Some("NotAllowedError") | Some("SecurityError") => CaptureError::PermissionDenied,
        Some("NotFoundError") | Some("OverconstrainedError") => CaptureError::NoCamera,
        _ => CaptureError::Frame(describe_js_error(&err)),
    }
}

fn frame_error(err: JsValue) -> CaptureError {
    CaptureError::Frame(describe_js_error(&err))
}
