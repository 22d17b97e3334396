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

//! Session bootstrap: who is signed in, and making sure they have a roster record.

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use log::info;
use presence_types::Registration;
use web_time::Instant;

use crate::error::Result;
use crate::roster::RosterStore;

/// The signed-in user as reported by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub display_name: Option<String>,
}

/// Resolves the current user's identity.
///
/// Implementations resolve immediately when a session already exists. Otherwise they may render
/// an external sign-in flow that redirects the page, in which case the returned future never
/// completes. That is expected, not an error.
pub trait IdentityProvider {
    fn authenticate<'a>(&'a self, client_id: &'a str) -> LocalBoxFuture<'a, Result<Identity>>;
}

/// Collects name and grade from the user on their first visit.
pub trait RegistrationForm {
    fn collect(&self) -> LocalBoxFuture<'_, Result<Registration>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    First,
    Returning,
}

/// Everything the components need to know about the current session.
///
/// Built once by [`bootstrap`] and handed to each component at construction.
pub struct SessionContext<S> {
    my_user_id: String,
    display_name: Option<String>,
    visit: Visit,
    store: Rc<S>,
}

impl<S> Clone for SessionContext<S> {
    fn clone(&self) -> Self {
        Self {
            my_user_id: self.my_user_id.clone(),
            display_name: self.display_name.clone(),
            visit: self.visit,
            store: Rc::clone(&self.store),
        }
    }
}

impl<S> SessionContext<S> {
    pub fn new(identity: Identity, visit: Visit, store: Rc<S>) -> Self {
        Self {
            my_user_id: identity.uid,
            display_name: identity.display_name,
            visit,
            store,
        }
    }

    pub fn my_user_id(&self) -> &str {
        &self.my_user_id
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn visit(&self) -> Visit {
        self.visit
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Authenticate, then create the user's roster record on a first visit or refresh its
/// timestamp on a returning one.
pub async fn bootstrap<I, F, S>(
    identity: &I,
    form: &F,
    store: S,
    client_id: &str,
) -> Result<SessionContext<S>>
where
    I: IdentityProvider + ?Sized,
    F: RegistrationForm + ?Sized,
    S: RosterStore,
{
    let started = Instant::now();
    let user = identity.authenticate(client_id).await?;
    info!(
        "Authenticated {} ({}) in {:?}",
        user.uid,
        user.display_name.as_deref().unwrap_or("no display name"),
        started.elapsed()
    );

    let visit = match store.fetch_self(&user.uid).await? {
        None => {
            info!("First visit for {}, collecting registration", user.uid);
            let registration = form.collect().await?;
            store.create_self(&user.uid, &registration).await?;
            Visit::First
        }
        Some(record) => {
            info!("Welcome back {}", record.label());
            store.touch_self(&user.uid).await?;
            Visit::Returning
        }
    };

    Ok(SessionContext::new(user, visit, Rc::new(store)))
}
