use crate::model::config::DEFAULT_SEPARATOR;
use crate::model::thought::Thought;
use crate::parse::timestamp::TimestampCodec;

/// Parse one line into a [`Thought`].
///
/// The first occurrence of `separator` splits the line: the text before it is
/// the timestamp string, the text after it is the content. A line without the
/// separator is not a thought. A separator-bearing line whose timestamp string
/// does not parse is still a thought, with `timestamp == None`.
pub fn parse_thought(line: &str, separator: &str, codec: &TimestampCodec) -> Option<Thought> {
    if separator.is_empty() {
        return None;
    }
    let split = line.find(separator)?;
    let timestamp_str = &line[..split];
    let content = &line[split + separator.len()..];
    Some(Thought {
        timestamp_str: timestamp_str.to_string(),
        timestamp: codec.parse(timestamp_str),
        content: content.to_string(),
    })
}

/// Parse with the default separator and timestamp format
pub fn parse_thought_default(line: &str) -> Option<Thought> {
    parse_thought(line, DEFAULT_SEPARATOR, &TimestampCodec::default())
}

/// Render a thought line from its parts
pub fn thought_line(timestamp_str: &str, separator: &str, content: &str) -> String {
    format!("{}{}{}", timestamp_str, separator, content)
}
