pub mod tags;
pub mod thought_parser;
pub mod timestamp;

pub use tags::{extract_tags, normalize_tag};
pub use thought_parser::{parse_thought, parse_thought_default, thought_line};
pub use timestamp::{FormatError, TimestampCodec, now, validate_format};
