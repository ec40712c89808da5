pub mod actions;
pub mod cli;
pub mod command;
pub mod external;
pub mod search;
pub mod store;

pub use actions::{ShelfHost, ShelfSession, TerminalHost};
pub use cli::ShelfCli;
pub use command::ShelfCommand;
pub use search::SearchField;
pub use store::{Shelf, ShelfError, ShelfSettings, ShelfStore};
