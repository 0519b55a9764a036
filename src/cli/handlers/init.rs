use std::fs;
use std::path::Path;

use super::Context;
use crate::cli::commands::InitArgs;
use crate::cli::output::InitJson;
use crate::io::document_io::atomic_write;
use crate::ops::layout::StreamLayout;
use crate::parse::tags::normalize_tag;
use crate::parse::timestamp;

/// Tag line, a blank line, then the first open prompt
const NOTE_TEMPLATE: &str = "{tag}\n\n{prompt}\n";

/// Validate that a tag is a single `#word` the tag extractor will find.
fn validate_tag(tag: &str) -> Result<(), String> {
    let name = tag.strip_prefix('#').unwrap_or(tag);
    if name.is_empty() {
        return Err("tag cannot be empty".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '/'))
    {
        return Err(format!(
            "invalid tag \"{}\": use letters, digits, '_', '-' or '/'",
            tag
        ));
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("invalid tag \"{}\": tags cannot be all digits", tag));
    }
    Ok(())
}

fn render_note(tag: &str, prompt: &str) -> String {
    NOTE_TEMPLATE.replace("{tag}", tag).replace("{prompt}", prompt)
}

pub fn cmd_init(ctx: &Context, args: InitArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(&args.file);
    if path.exists() && !args.force {
        return Err(format!("{} already exists (use --force to overwrite)", path.display()).into());
    }

    let stream = ctx.stream()?;
    let tag = normalize_tag(args.tag.as_deref().unwrap_or(stream.tag()));
    validate_tag(&tag)?;

    let layout: &StreamLayout = stream.layout();
    let prompt = layout.prefix(&layout.codec.format(timestamp::now()));

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    atomic_write(path, render_note(&tag, &prompt).as_bytes())?;

    if json {
        let out = InitJson {
            path: path.display().to_string(),
            tag,
            prompt,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Initialized thought stream: {} ({})", path.display(), tag);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tags::extract_tags;

    #[test]
    fn test_validate_tag() {
        assert!(validate_tag("#stream").is_ok());
        assert!(validate_tag("journal/daily").is_ok());
        assert!(validate_tag("#").is_err());
        assert!(validate_tag("two words").is_err());
        assert!(validate_tag("#2024").is_err());
    }

    #[test]
    fn test_rendered_note_is_tagged_with_open_prompt() {
        let note = render_note("#stream", "2024-06-01 09:00:00   ");
        assert_eq!(note, "#stream\n\n2024-06-01 09:00:00   \n");
        assert_eq!(extract_tags(&note), vec!["#stream".to_string()]);
    }
}
