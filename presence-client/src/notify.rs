/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! "Wants to chat" notifications.

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use log::{debug, error, warn};

use crate::error::Result;

/// Shows a notification for a roster change. Delivery failures are logged, never returned.
pub trait Notifier {
    fn notify<'a>(&'a self, message: &'a str) -> LocalBoxFuture<'a, ()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationPermission {
    /// The user has not been asked yet.
    Default,
    Granted,
    Denied,
}

/// The platform's notification facility.
pub trait NotificationBackend {
    fn is_supported(&self) -> bool;
    fn permission(&self) -> NotificationPermission;
    fn request_permission(&self) -> LocalBoxFuture<'_, Result<NotificationPermission>>;
    fn show(&self, message: &str) -> Result<()>;
}

/// A [`Notifier`] that asks for permission the first time it is needed.
///
/// Without platform support, or once permission is denied, messages are logged and dropped.
pub struct PermissionGatedNotifier<B> {
    backend: B,
    enabled: bool,
}

impl<B: NotificationBackend> PermissionGatedNotifier<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            enabled: true,
        }
    }

    /// A notifier that only logs, for deployments that turn notifications off.
    pub fn disabled(backend: B) -> Self {
        Self {
            backend,
            enabled: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn deliver(&self, message: &str) {
        if !self.enabled {
            debug!("Notifications disabled, skipping: {message}");
            return;
        }
        if !self.backend.is_supported() {
            error!("This browser does not support desktop notifications.");
            return;
        }
        match self.backend.permission() {
            NotificationPermission::Granted => {}
            NotificationPermission::Denied => {
                warn!("Notifications previously denied!");
                return;
            }
            NotificationPermission::Default => match self.backend.request_permission().await {
                Ok(NotificationPermission::Granted) => {}
                Ok(_) => {
                    warn!("Notifications freshly denied!");
                    return;
                }
                Err(e) => {
                    warn!("Notification permission request failed: {e}");
                    return;
                }
            },
        }
        if let Err(e) = self.backend.show(message) {
            warn!("Failed to show notification: {e}");
        }
    }
}

impl<B: NotificationBackend> Notifier for PermissionGatedNotifier<B> {
    fn notify<'a>(&'a self, message: &'a str) -> LocalBoxFuture<'a, ()> {
        self.deliver(message).boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PresenceError;
    use std::cell::{Cell, RefCell};

    struct FakeBackend {
        supported: bool,
        permission: Cell<NotificationPermission>,
        answer: NotificationPermission,
        requests: Cell<u32>,
        shown: RefCell<Vec<String>>,
        fail_show: bool,
    }

    impl FakeBackend {
        fn with(permission: NotificationPermission, answer: NotificationPermission) -> Self {
            Self {
                supported: true,
                permission: Cell::new(permission),
                answer,
                requests: Cell::new(0),
                shown: RefCell::new(Vec::new()),
                fail_show: false,
            }
        }
    }

    impl NotificationBackend for FakeBackend {
        fn is_supported(&self) -> bool {
            self.supported
        }

        fn permission(&self) -> NotificationPermission {
            self.permission.get()
        }

        fn request_permission(&self) -> LocalBoxFuture<'_, Result<NotificationPermission>> {
            self.requests.set(self.requests.get() + 1);
            self.permission.set(self.answer);
            futures::future::ready(Ok(self.answer)).boxed_local()
        }

        fn show(&self, message: &str) -> Result<()> {
            if self.fail_show {
                return Err(PresenceError::Notification("blocked".into()));
            }
            self.shown.borrow_mut().push(message.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn granted_permission_shows_immediately() {
        use NotificationPermission::*;
        let notifier = PermissionGatedNotifier::new(FakeBackend::with(Granted, Granted));
        notifier.notify("Leo (K) wants to chat.").await;
        assert_eq!(
            *notifier.backend().shown.borrow(),
            vec!["Leo (K) wants to chat.".to_string()]
        );
        assert_eq!(notifier.backend().requests.get(), 0);
    }

    #[tokio::test]
    async fn default_permission_is_requested_once() {
        use NotificationPermission::*;
        let notifier = PermissionGatedNotifier::new(FakeBackend::with(Default, Granted));
        notifier.notify("first").await;
        notifier.notify("second").await;
        assert_eq!(notifier.backend().requests.get(), 1);
        assert_eq!(notifier.backend().shown.borrow().len(), 2);
    }

    #[tokio::test]
    async fn denied_permission_drops_messages() {
        use NotificationPermission::*;
        let fresh = PermissionGatedNotifier::new(FakeBackend::with(Default, Denied));
        fresh.notify("hello").await;
        assert!(fresh.backend().shown.borrow().is_empty());

        let previous = PermissionGatedNotifier::new(FakeBackend::with(Denied, Denied));
        previous.notify("hello").await;
        assert!(previous.backend().shown.borrow().is_empty());
        assert_eq!(previous.backend().requests.get(), 0);
    }

    #[tokio::test]
    async fn unsupported_or_disabled_never_touches_permission() {
        use NotificationPermission::*;
        let mut backend = FakeBackend::with(Default, Granted);
        backend.supported = false;
        let unsupported = PermissionGatedNotifier::new(backend);
        unsupported.notify("hello").await;
        assert_eq!(unsupported.backend().requests.get(), 0);

        let disabled = PermissionGatedNotifier::disabled(FakeBackend::with(Granted, Granted));
        disabled.notify("hello").await;
        assert!(disabled.backend().shown.borrow().is_empty());
    }

    #[tokio::test]
    async fn show_failure_is_swallowed() {
        use NotificationPermission::*;
        let mut backend = FakeBackend::with(Granted, Granted);
        backend.fail_show = true;
        let notifier = PermissionGatedNotifier::new(backend);
        notifier.notify("hello").await;
        assert!(notifier.backend().shown.borrow().is_empty());
    }
}
