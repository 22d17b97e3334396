use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use js_sys::Uint8Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement};

use crate::capture::FrameGrabber;
use crate::error::{PresenceError, Result};
use presence_types::ImageSnapshot;

/// Grabs frames by drawing the video element onto an off-screen canvas and encoding it.
pub struct CanvasFrameGrabber {
    video: HtmlVideoElement,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    mime: String,
    quality: f64,
}

impl CanvasFrameGrabber {
    /// The canvas is sized to the video's current dimensions, so the video must be playing.
    pub fn new(video: &HtmlVideoElement, mime: &str, quality: f64) -> Result<Self> {
        let canvas = gloo_utils::document()
            .create_element("canvas")?
            .unchecked_into::<HtmlCanvasElement>();
        canvas.set_width(video.video_width());
        canvas.set_height(video.video_height());
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| PresenceError::Media("Failed to get 2D context".to_string()))?
            .unchecked_into::<CanvasRenderingContext2d>();

        Ok(Self {
            video: video.clone(),
            canvas,
            context,
            mime: mime.to_string(),
            quality,
        })
    }

    async fn to_blob(&self) -> Result<Blob> {
        let (tx, rx) = oneshot::channel::<Option<Blob>>();
        let callback = Closure::<dyn FnMut(Option<Blob>)>::once(move |blob: Option<Blob>| {
            let _ = tx.send(blob);
        });
        self.canvas.to_blob_with_type_and_encoder_options(
            callback.as_ref().unchecked_ref(),
            &self.mime,
            &JsValue::from_f64(self.quality),
        )?;
        rx.await
            .ok()
            .flatten()
            .ok_or_else(|| PresenceError::Media("Canvas blob was null.".to_string()))
    }

    async fn grab_frame(&self) -> Result<ImageSnapshot> {
        log::debug!("Taking picture (stream to canvas)");
        self.context
            .draw_image_with_html_video_element_and_dw_and_dh(
                &self.video,
                0.0,
                0.0,
                f64::from(self.canvas.width()),
                f64::from(self.canvas.height()),
            )?;
        let blob = self.to_blob().await?;
        let buffer = JsFuture::from(blob.array_buffer()).await?;
        let bytes = Uint8Array::new(&buffer).to_vec();
        Ok(ImageSnapshot::new(bytes, self.mime.clone()))
    }
}

impl FrameGrabber for CanvasFrameGrabber {
    fn grab(&self) -> LocalBoxFuture<'_, Result<ImageSnapshot>> {
        self.grab_frame().boxed_local()
    }
}
