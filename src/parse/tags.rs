use std::sync::LazyLock;

use regex::Regex;

/// Inline `#tag` token: preceded by start of line or whitespace
static INLINE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)#([\p{L}\p{N}_/\-]+)").expect("valid inline tag regex")
});

/// Prefix a tag with `#` unless it already has one
pub fn normalize_tag(tag: &str) -> String {
    if tag.starts_with('#') {
        tag.to_string()
    } else {
        format!("#{}", tag)
    }
}

/// Collect the tags of a markdown document, each with its leading `#`.
///
/// Reads inline `#tag` tokens outside fenced code blocks and the `tags`
/// key of YAML front matter (inline list, comma list, or block list).
/// Purely numeric tokens like `#123` are not tags. Order is first
/// appearance; duplicates are dropped.
pub fn extract_tags(source: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut push = |tag: String| {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    };

    let lines: Vec<&str> = source.lines().collect();
    let body_start = match front_matter_end(&lines) {
        Some(end) => {
            for tag in front_matter_tags(&lines[1..end]) {
                push(normalize_tag(&tag));
            }
            end + 1
        }
        None => 0,
    };

    let mut in_code_fence = false;
    for line in &lines[body_start.min(lines.len())..] {
        if line.trim_start().starts_with("```") {
            in_code_fence = !in_code_fence;
            continue;
        }
        if in_code_fence {
            continue;
        }
        for cap in INLINE_TAG_RE.captures_iter(line) {
            let name = &cap[1];
            if name.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            push(format!("#{}", name));
        }
    }
    tags
}

/// Index of the closing `---` of a front matter block starting on line 0
fn front_matter_end(lines: &[&str]) -> Option<usize> {
    if lines.first().map(|l| l.trim_end()) != Some("---") {
        return None;
    }
    lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, l)| l.trim_end() == "---")
        .map(|(i, _)| i)
}

fn front_matter_tags(lines: &[&str]) -> Vec<String> {
    let mut tags = Vec::new();
    let mut idx = 0;
    while idx < lines.len() {
        let line = lines[idx];
        idx += 1;
        let Some(value) = line
            .strip_prefix("tags:")
            .or_else(|| line.strip_prefix("tag:"))
        else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            // Block list on following lines
            while idx < lines.len() {
                let Some(item) = lines[idx].trim_start().strip_prefix("- ") else {
                    break;
                };
                tags.push(unquote(item.trim()).to_string());
                idx += 1;
            }
        } else {
            let inner = value
                .strip_prefix('[')
                .and_then(|v| v.strip_suffix(']'))
                .unwrap_or(value);
            for item in inner.split(',') {
                let item = unquote(item.trim());
                if !item.is_empty() {
                    tags.push(item.to_string());
                }
            }
        }
    }
    tags.retain(|t| !t.trim_start_matches('#').is_empty());
    tags
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_adds_missing_marker() {
        assert_eq!(normalize_tag("stream"), "#stream");
        assert_eq!(normalize_tag("#stream"), "#stream");
    }

    #[test]
    fn inline_tags() {
        let tags = extract_tags("#stream\n2023-01-01 10:00:00   idea about #rust and #rust/async");
        assert_eq!(tags, vec!["#stream", "#rust", "#rust/async"]);
    }

    #[test]
    fn tag_must_follow_whitespace() {
        assert!(extract_tags("issue#12 and a#b").is_empty());
    }

    #[test]
    fn numeric_tokens_are_not_tags() {
        assert_eq!(extract_tags("fix #123 for #v2"), vec!["#v2"]);
    }

    #[test]
    fn code_fences_are_skipped() {
        let src = "```\n#notatag\n```\n#real";
        assert_eq!(extract_tags(src), vec!["#real"]);
    }

    #[test]
    fn front_matter_inline_list() {
        let src = "---\ntitle: log\ntags: [stream, \"daily\"]\n---\nbody #x";
        assert_eq!(extract_tags(src), vec!["#stream", "#daily", "#x"]);
    }

    #[test]
    fn front_matter_block_list() {
        let src = "---\ntags:\n  - stream\n  - '#journal'\n---\n";
        assert_eq!(extract_tags(src), vec!["#stream", "#journal"]);
    }

    #[test]
    fn front_matter_comma_list() {
        assert_eq!(extract_tags("---\ntags: a, b\n---"), vec!["#a", "#b"]);
    }

    #[test]
    fn unterminated_front_matter_is_body() {
        assert_eq!(extract_tags("---\n#stream"), vec!["#stream"]);
    }
}
