//! Thin wrappers over the browser APIs the app needs.

use js_sys::{Array, Uint8Array};
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use crate::error::{ClientError, Result};
use crate::services::QuestionFile;
use crate::session::Storage;

fn js_error(err: wasm_bindgen::JsValue) -> ClientError {
    ClientError::Storage(format!("{:?}", err))
}

/// `window.localStorage`. Looked up per call so the handle stays `Send`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn backend() -> Result<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| ClientError::Storage("no window".to_string()))?
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| ClientError::Storage("localStorage is disabled".to_string()))
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::backend().ok()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::backend()?.set_item(key, value).map_err(js_error)
    }

    fn remove(&self, key: &str) -> Result<()> {
        Self::backend()?.remove_item(key).map_err(js_error)
    }
}

/// Hand a file to the browser as a download.
pub fn save_file(file: &QuestionFile) -> Result<()> {
    let bytes = Uint8Array::from(file.content.as_slice());
    let parts = Array::of1(&bytes);
    let options = BlobPropertyBag::new();
    options.set_type(&file.mime_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_error)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(js_error)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| ClientError::Storage("no document".to_string()))?;
    let anchor = document
        .create_element("a")
        .map_err(js_error)?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| ClientError::Storage("anchor element unavailable".to_string()))?;
    anchor.set_href(&url);
    anchor.set_download(&file.file_name);
    anchor.click();

    Url::revoke_object_url(&url).map_err(js_error)
}

/// Native confirm dialog; `false` if it cannot be shown.
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}
