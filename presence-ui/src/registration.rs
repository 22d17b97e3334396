// SPDX-License-Identifier: MIT OR Apache-2.0

use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use log::info;
use presence_client::{PresenceError, Registration, RegistrationForm, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlDialogElement, HtmlInputElement, HtmlSelectElement};

use crate::view::PageElements;

/// Current value of a form control; the markup may use either an input or a select.
pub fn control_value(element: &Element) -> String {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
        select.value()
    } else {
        element.text_content().unwrap_or_default()
    }
}

/// Collects name and grade through the modal `#register_dialog`.
///
/// The dialog's `.close` button submits it.
#[derive(Clone, Debug)]
pub struct DialogRegistrationForm {
    dialog: HtmlDialogElement,
    first: Element,
    grade: Element,
}

impl DialogRegistrationForm {
    pub fn new(page: &PageElements) -> Self {
        Self {
            dialog: page.register_dialog.clone(),
            first: page.first.clone(),
            grade: page.grade.clone(),
        }
    }

    async fn run_dialog(&self) -> Result<Registration> {
        let close_button = self
            .dialog
            .query_selector(".close")?
            .ok_or_else(|| PresenceError::MissingElement("register_dialog .close".to_string()))?;

        let (tx, rx) = oneshot::channel::<Registration>();
        let mut tx = Some(tx);
        let dialog = self.dialog.clone();
        let first = self.first.clone();
        let grade = self.grade.clone();
        let on_close = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            dialog.close();
            if let Some(tx) = tx.take() {
                let _ = tx.send(Registration::new(&control_value(&first), &control_value(&grade)));
            }
        });
        close_button
            .add_event_listener_with_callback("click", on_close.as_ref().unchecked_ref())?;
        self.dialog.show_modal()?;
        info!("Waiting for registration");

        let registration = rx.await;
        close_button
            .remove_event_listener_with_callback("click", on_close.as_ref().unchecked_ref())?;
        registration
            .map_err(|_| PresenceError::Identity("registration dialog was abandoned".to_string()))
    }
}

impl RegistrationForm for DialogRegistrationForm {
    fn collect(&self) -> LocalBoxFuture<'_, Result<Registration>> {
        self.run_dialog().boxed_local()
    }
}
