use futures::future::LocalBoxFuture;
use futures::FutureExt;
use js_sys::Reflect;
use wasm_bindgen_futures::JsFuture;
use web_sys::Notification;

use crate::error::Result;
use crate::notify::{NotificationBackend, NotificationPermission};

/// Desktop notifications through the `Notification` web API.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNotifications;

fn parse_permission(value: Option<String>) -> NotificationPermission {
    match value.as_deref() {
        Some("granted") => NotificationPermission::Granted,
        Some("denied") => NotificationPermission::Denied,
        _ => NotificationPermission::Default,
    }
}

impl NotificationBackend for BrowserNotifications {
    fn is_supported(&self) -> bool {
        Reflect::has(&gloo_utils::window(), &"Notification".into()).unwrap_or(false)
    }

    fn permission(&self) -> NotificationPermission {
        match Notification::permission() {
            web_sys::NotificationPermission::Granted => NotificationPermission::Granted,
            web_sys::NotificationPermission::Denied => NotificationPermission::Denied,
            _ => NotificationPermission::Default,
        }
    }

    fn request_permission(&self) -> LocalBoxFuture<'_, Result<NotificationPermission>> {
        async move {
            let answer = JsFuture::from(Notification::request_permission()?).await?;
            Ok(parse_permission(answer.as_string()))
        }
        .boxed_local()
    }

    fn show(&self, message: &str) -> Result<()> {
        Notification::new(message)?;
        Ok(())
    }
}
