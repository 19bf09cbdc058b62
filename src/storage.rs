mod export;
mod input;
mod rename;

pub use export::{Export, ExportError};
pub use input::{LoadError, load_questions, load_users};
pub use rename::{ParseError, RenameError, load_team_rename, parse_team_rename};
