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

use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use log::{info, warn};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::firebase::{auth, Auth, AuthUi, User, GOOGLE_PROVIDER_ID};
use crate::error::{PresenceError, Result};
use crate::session::{Identity, IdentityProvider};

const AUTH_CONTAINER_ID: &str = "firebaseui-auth-container";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInOption<'a> {
    provider: &'a str,
    auth_method: &'a str,
    client_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInConfig<'a> {
    sign_in_success_url: &'a str,
    sign_in_options: Vec<SignInOption<'a>>,
}

/// [`IdentityProvider`] backed by Firebase Auth, falling back to the FirebaseUI Google sign-in
/// widget when nobody is signed in.
pub struct FirebaseIdentity {
    auth: Auth,
}

impl Default for FirebaseIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl FirebaseIdentity {
    pub fn new() -> Self {
        Self { auth: auth() }
    }
}

fn identity_of(user: &User) -> Identity {
    Identity {
        uid: user.uid(),
        display_name: user.display_name(),
    }
}

/// Renders the sign-in widget. A successful sign-in redirects the page.
fn start_sign_in_widget(auth: &Auth, client_id: &str) -> Result<()> {
    let config = SignInConfig {
        sign_in_success_url: "/",
        sign_in_options: vec![SignInOption {
            provider: GOOGLE_PROVIDER_ID,
            auth_method: "https://accounts.google.com",
            client_id,
        }],
    };
    let config = serde_wasm_bindgen::to_value(&config)
        .map_err(|e| PresenceError::Identity(format!("Bad sign-in config: {e}")))?;

    let document = gloo_utils::document();
    let container = document.create_element("div")?;
    container.set_id(AUTH_CONTAINER_ID);
    gloo_utils::body().append_child(&container)?;

    AuthUi::new(auth).start(&format!("#{AUTH_CONTAINER_ID}"), &config);
    info!("Auth: no way to resolve from here, which is ok because likely going to get redirected.");
    Ok(())
}

impl IdentityProvider for FirebaseIdentity {
    fn authenticate<'a>(&'a self, client_id: &'a str) -> LocalBoxFuture<'a, Result<Identity>> {
        async move {
            if let Some(user) = self.auth.current_user() {
                info!(
                    "Authorized (existing): {}",
                    user.display_name().unwrap_or_default()
                );
                return Ok(identity_of(&user));
            }

            let (tx, rx) = oneshot::channel();
            let mut tx = Some(tx);
            let auth = self.auth.clone();
            let client_id = client_id.to_string();
            let observer = Closure::<dyn FnMut(Option<User>)>::new(move |user: Option<User>| {
                info!("onAuthStateChanged");
                match user {
                    Some(user) => {
                        info!(
                            "Authorized (onAuthStateChanged): {}",
                            user.display_name().unwrap_or_default()
                        );
                        if let Some(tx) = tx.take() {
                            let _ = tx.send(identity_of(&user));
                        }
                    }
                    None => {
                        if let Err(e) = start_sign_in_widget(&auth, &client_id) {
                            warn!("Failed to start sign-in widget: {e}");
                        }
                    }
                }
            });
            let unsubscribe = self
                .auth
                .on_auth_state_changed(observer.as_ref().unchecked_ref());

            let identity = rx.await;
            let _ = unsubscribe.call0(&JsValue::NULL);
            drop(observer);
            identity.map_err(|_| PresenceError::Identity("auth observer dropped".to_string()))
        }
        .boxed_local()
    }
}
