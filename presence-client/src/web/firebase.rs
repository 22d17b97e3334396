//! Bindings to the parts of the Firebase compat SDK and FirebaseUI the client uses.

use js_sys::{Array, Function, Object, Promise, Uint8Array};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    // === Auth ===

    #[derive(Clone)]
    pub type Auth;

    #[wasm_bindgen(js_namespace = firebase, js_name = auth)]
    pub fn auth() -> Auth;

    #[wasm_bindgen(method, getter, js_name = currentUser)]
    pub fn current_user(this: &Auth) -> Option<User>;

    /// Returns the unsubscribe function.
    #[wasm_bindgen(method, js_name = onAuthStateChanged)]
    pub fn on_auth_state_changed(this: &Auth, observer: &Function) -> Function;

    pub type User;

    #[wasm_bindgen(method, getter)]
    pub fn uid(this: &User) -> String;

    #[wasm_bindgen(method, getter, js_name = displayName)]
    pub fn display_name(this: &User) -> Option<String>;

    #[wasm_bindgen(js_namespace = ["firebaseui", "auth"], js_name = AuthUI)]
    pub type AuthUi;

    #[wasm_bindgen(constructor, js_namespace = ["firebaseui", "auth"])]
    pub fn new(auth: &Auth) -> AuthUi;

    #[wasm_bindgen(method)]
    pub fn start(this: &AuthUi, container: &str, config: &JsValue);

    // === Firestore ===

    pub type Firestore;

    #[wasm_bindgen(js_namespace = firebase, js_name = firestore)]
    pub fn firestore() -> Firestore;

    #[wasm_bindgen(method)]
    pub fn collection(this: &Firestore, path: &str) -> CollectionReference;

    #[derive(Clone)]
    pub type CollectionReference;

    #[wasm_bindgen(method)]
    pub fn doc(this: &CollectionReference, id: &str) -> DocumentReference;

    /// Returns the unsubscribe function. `on_error` runs once if the listener is refused.
    #[wasm_bindgen(method, js_name = onSnapshot)]
    pub fn on_snapshot(
        this: &CollectionReference,
        on_next: &Function,
        on_error: &Function,
    ) -> Function;

    pub type DocumentReference;

    #[wasm_bindgen(method)]
    pub fn get(this: &DocumentReference) -> Promise;

    #[wasm_bindgen(method)]
    pub fn set(this: &DocumentReference, data: &Object) -> Promise;

    #[wasm_bindgen(method)]
    pub fn update(this: &DocumentReference, data: &Object) -> Promise;

    pub type DocumentSnapshot;

    #[wasm_bindgen(method, getter)]
    pub fn id(this: &DocumentSnapshot) -> String;

    #[wasm_bindgen(method, getter)]
    pub fn exists(this: &DocumentSnapshot) -> bool;

    #[wasm_bindgen(method)]
    pub fn data(this: &DocumentSnapshot) -> JsValue;

    pub type QuerySnapshot;

    #[wasm_bindgen(method, js_name = docChanges)]
    pub fn doc_changes(this: &QuerySnapshot) -> Array;

    pub type DocumentChange;

    #[wasm_bindgen(method, getter, js_name = "type")]
    pub fn kind(this: &DocumentChange) -> String;

    #[wasm_bindgen(method, getter)]
    pub fn doc(this: &DocumentChange) -> DocumentSnapshot;

    #[wasm_bindgen(js_namespace = ["firebase", "firestore", "FieldValue"], js_name = serverTimestamp)]
    pub fn server_timestamp() -> JsValue;

    #[wasm_bindgen(js_namespace = ["firebase", "firestore", "Blob"], js_name = fromUint8Array)]
    pub fn blob_from_uint8_array(bytes: &Uint8Array) -> JsValue;

    pub type FirestoreBlob;

    #[wasm_bindgen(method, js_name = toUint8Array)]
    pub fn to_uint8_array(this: &FirestoreBlob) -> Uint8Array;

    pub type Timestamp;

    #[wasm_bindgen(method, js_name = toMillis)]
    pub fn to_millis(this: &Timestamp) -> f64;
}

/// `firebase.auth.GoogleAuthProvider.PROVIDER_ID`
pub const GOOGLE_PROVIDER_ID: &str = "google.com";
