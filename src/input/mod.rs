pub mod handler;

pub use handler::{
    handle_confirm_key, handle_field_editor_key, handle_selector_key, handle_start_input_key,
};

/// What a widget wants after handling one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow<T> {
    Continue,
    Done(T),
    Cancelled,
}
