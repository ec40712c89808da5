pub mod confirm;
pub mod field_editor;
pub mod layout;
pub mod selector;
pub mod start_input;
pub mod styles;
pub mod terminal;
pub mod widgets;

pub use confirm::ConfirmState;
pub use selector::{SelectorItem, SelectorState};
pub use start_input::StartInputState;
pub use terminal::{run_interactive, Interactive};
pub use widgets::{confirm, edit_entry, prompt_start, select};
