//! Error types for the page.
//!
//! `VerifyError` is the only user-facing taxonomy: it describes why a puzzle submission was
//! rejected and its `Display` text is the message shown in the toast. `PageError` covers setup
//! failures of the DOM glue and converts to/from `JsValue` at the wasm boundary.

use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::puzzle::ItemId;

/// Why a puzzle submission was rejected. Always recovered locally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Please select at least one image!")]
    NoSelection,
    /// At least one decoy was selected; `wrong` lists the offending items, which are now flagged.
    #[error("Oops! That's not your valentine! Try again 💔")]
    IncorrectSelection { wrong: Vec<ItemId> },
    #[error(
        "You missed {missed} image{}! Select ALL images with your valentine 💕",
        plural(.missed)
    )]
    IncompleteSelection { missed: usize },
}

fn plural(n: &usize) -> &'static str {
    if *n > 1 { "s" } else { "" }
}

/// Failures while wiring the page to the host document.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("no window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("missing element #{0}")]
    MissingElement(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("js error: {0}")]
    Js(String),
}

impl From<JsValue> for PageError {
    fn from(value: JsValue) -> Self {
        PageError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<PageError> for JsValue {
    fn from(err: PageError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missed_message_pluralizes() {
        assert_eq!(
            VerifyError::IncompleteSelection { missed: 1 }.to_string(),
            "You missed 1 image! Select ALL images with your valentine 💕"
        );
        assert_eq!(
            VerifyError::IncompleteSelection { missed: 4 }.to_string(),
            "You missed 4 images! Select ALL images with your valentine 💕"
        );
    }

    #[test]
    fn page_error_names_missing_element() {
        let err = PageError::MissingElement("no-btn".into());
        assert_eq!(err.to_string(), "missing element #no-btn");
    }
}
