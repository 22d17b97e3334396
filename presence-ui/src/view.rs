// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed handles on the page markup and the DOM rendering of presence nodes.

use js_sys::{Array, Uint8Array};
use log::{debug, warn};
use presence_client::{ImageSnapshot, Opacity, PresenceError, PresenceView, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Blob, BlobPropertyBag, Document, Element, HtmlDialogElement, HtmlElement, HtmlImageElement,
    HtmlVideoElement, Url,
};

pub const REGISTER_DIALOG_ID: &str = "register_dialog";
pub const FIRST_NAME_ID: &str = "first";
pub const GRADE_ID: &str = "grade";
pub const PINGS_ID: &str = "pings";
pub const CAPTURE_BUTTON_ID: &str = "capture_button";
pub const VIDEO_MAIN_ID: &str = "video_main";

pub const PING_CLASS: &str = "ping";
pub const THUMBNAIL_CLASS: &str = "thumbnail";
pub const MY_PING_CLASS: &str = "myPing";

fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T> {
    document
        .get_element_by_id(id)
        .and_then(|e| e.dyn_into::<T>().ok())
        .ok_or_else(|| PresenceError::MissingElement(id.to_string()))
}

/// Every element the page script touches, resolved once at startup.
#[derive(Clone, Debug)]
pub struct PageElements {
    pub register_dialog: HtmlDialogElement,
    pub first: Element,
    pub grade: Element,
    pub pings: Element,
    pub capture_button: HtmlElement,
    pub video_main: HtmlVideoElement,
}

impl PageElements {
    pub fn from_document(document: &Document) -> Result<Self> {
        Ok(Self {
            register_dialog: element_by_id(document, REGISTER_DIALOG_ID)?,
            first: element_by_id(document, FIRST_NAME_ID)?,
            grade: element_by_id(document, GRADE_ID)?,
            pings: element_by_id(document, PINGS_ID)?,
            capture_button: element_by_id(document, CAPTURE_BUTTON_ID)?,
            video_main: element_by_id(document, VIDEO_MAIN_ID)?,
        })
    }
}

/// Renders each user as a `span.ping` (label text plus an `img.thumbnail`) inside `#pings`.
///
/// Nodes carry the user id as their element id.
pub struct DomPresenceView {
    document: Document,
    pings: Element,
}

impl DomPresenceView {
    pub fn new(document: Document, pings: Element) -> Self {
        Self { document, pings }
    }

    fn node(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
    }

    fn create_node(&self, id: &str, label: &str) -> Result<HtmlElement> {
        let node: HtmlElement = self.document.create_element("span")?.unchecked_into();
        node.set_id(id);
        node.class_list().add_1(PING_CLASS)?;
        node.append_child(&self.document.create_text_node(label))?;
        let thumbnail = HtmlImageElement::new()?;
        thumbnail.class_list().add_1(THUMBNAIL_CLASS)?;
        node.append_child(&thumbnail)?;
        self.pings.append_child(&node)?;
        Ok(node)
    }

    fn thumbnail(&self, id: &str) -> Option<HtmlImageElement> {
        self.node(id)?
            .get_elements_by_class_name(THUMBNAIL_CLASS)
            .item(0)?
            .dyn_into::<HtmlImageElement>()
            .ok()
    }

    fn load_thumbnail(&self, id: &str, image: &ImageSnapshot) -> Result<()> {
        let thumbnail = self
            .thumbnail(id)
            .ok_or_else(|| PresenceError::MissingElement(format!("{id} .{THUMBNAIL_CLASS}")))?;

        let parts = Array::of1(&Uint8Array::from(image.bytes.as_slice()));
        let options = BlobPropertyBag::new();
        options.set_type(&image.mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
        let blob_url = Url::create_object_url_with_blob(&blob)?;

        let revoked_url = blob_url.clone();
        let on_load = Closure::once_into_js(move || {
            if let Err(e) = Url::revoke_object_url(&revoked_url) {
                warn!("Failed to revoke thumbnail URL: {e:?}");
            }
        });
        thumbnail.set_onload(Some(on_load.unchecked_ref()));
        thumbnail.set_src(&blob_url);
        Ok(())
    }
}

impl PresenceView for DomPresenceView {
    fn upsert_node(&self, id: &str, label: &str) {
        match self.node(id) {
            Some(node) => {
                if let Some(text) = node.first_child() {
                    text.set_text_content(Some(label));
                }
            }
            None => {
                if let Err(e) = self.create_node(id, label) {
                    warn!("Failed to create presence node for {id}: {e}");
                }
            }
        }
    }

    fn show_thumbnail(&self, id: &str, image: &ImageSnapshot) {
        if let Err(e) = self.load_thumbnail(id, image) {
            warn!("Failed to show thumbnail for {id}: {e}");
        }
    }

    fn set_opacity(&self, id: &str, opacity: Opacity) {
        let Some(node) = self.node(id) else {
            debug!("No presence node for {id}");
            return;
        };
        if let Err(e) = node.style().set_property("opacity", &opacity.to_string()) {
            warn!("Failed to set opacity for {id}: {e:?}");
        }
    }

    fn mark_self(&self, id: &str) {
        match self.node(id) {
            Some(node) => {
                if let Err(e) = node.class_list().add_1(MY_PING_CLASS) {
                    warn!("Failed to mark own presence node: {e:?}");
                }
            }
            None => warn!("Own presence node {id} is not on the page"),
        }
    }
}
