mod nom_parser;
pub mod tags;

pub use self::nom_parser::{ParsedLine, TMI_HOST};
pub use self::tags::Tags;
