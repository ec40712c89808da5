pub mod error;
pub mod fields;
pub mod form;
pub mod mode;

pub use error::EditError;
pub use fields::{carry_forward, Field, FieldKind, FieldName};
pub use form::{FieldEditor, Submission};
pub use mode::{InputMode, ModeInput};
