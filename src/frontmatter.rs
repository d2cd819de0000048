use crate::errors::{VaultError, VaultResult};
use serde_yaml::{Mapping, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Frontmatter {
    Absent,
    Parsed(Mapping),
    NotMapping { body_start: usize },
    Malformed { detail: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitDocument<'a> {
    pub frontmatter: Frontmatter,
    pub body: &'a str,
    pub body_start: usize,
}

// A fenced block that cannot be used as a mapping is kept verbatim in `body`
// so that render paths which never touch metadata stay lossless. Callers that
// intentionally replace the block (update_metadata) use the offsets instead.
pub fn split(content: &str) -> SplitDocument<'_> {
    let whole = SplitDocument {
        frontmatter: Frontmatter::Absent,
        body: content,
        body_start: 0,
    };

    let Some(after_open) = strip_opening_fence(content) else {
        return whole;
    };
    let open_len = content.len() - after_open.len();

    let mut offset = open_len;
    let mut fence: Option<(usize, usize)> = None;
    for line in after_open.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        if is_fence_line(line) {
            fence = Some((line_start, offset));
            break;
        }
    }
    let Some((block_end, after_close)) = fence else {
        // Unterminated fence, the whole document is body.
        return whole;
    };

    let raw_block = &content[open_len..block_end];
    let body_start = skip_separator_line(content, after_close);

    match serde_yaml::from_str::<Value>(raw_block) {
        Ok(Value::Mapping(mapping)) => SplitDocument {
            frontmatter: Frontmatter::Parsed(mapping),
            body: &content[body_start..],
            body_start,
        },
        Ok(_) => SplitDocument {
            frontmatter: Frontmatter::NotMapping { body_start },
            ..whole
        },
        Err(error) => SplitDocument {
            frontmatter: Frontmatter::Malformed {
                detail: error.to_string(),
            },
            ..whole
        },
    }
}

pub fn render(metadata: Option<&Mapping>, body: &str) -> VaultResult<String> {
    let filtered = metadata.map(without_nulls).filter(|m| !m.is_empty());
    let Some(mapping) = filtered else {
        return Ok(body.to_string());
    };

    let yaml = serde_yaml::to_string(&mapping)
        .map_err(|error| VaultError::MetadataSerialize(error.to_string()))?;
    let mut out = String::with_capacity(yaml.len() + body.len() + 16);
    out.push_str("---\n");
    out.push_str(&yaml);
    out.push_str("---\n");
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body);
    }
    Ok(out)
}

pub fn merge_updates(existing: &mut Mapping, updates: &Mapping) {
    for (key, value) in updates {
        if value.is_null() {
            existing.remove(key);
        } else {
            existing.insert(key.clone(), value.clone());
        }
    }
}

pub fn without_nulls(mapping: &Mapping) -> Mapping {
    mapping
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn strip_opening_fence(content: &str) -> Option<&str> {
    let (first_line, rest) = match content.find('\n') {
        Some(idx) => (&content[..=idx], &content[idx + 1..]),
        None => (content, ""),
    };
    is_fence_line(first_line).then_some(rest)
}

fn is_fence_line(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == "---"
}

// render emits exactly one blank line between the fence and a non-empty
// body; consume that one separator so render(split(x)) == x on canonical
// documents.
fn skip_separator_line(content: &str, pos: usize) -> usize {
    let rest = &content[pos..];
    if rest.starts_with("\r\n") {
        pos + 2
    } else if rest.starts_with('\n') {
        pos + 1
    } else {
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, Value)]) -> Mapping {
        pairs
            .iter()
            .map(|(key, value)| (Value::String((*key).to_string()), value.clone()))
            .collect()
    }

    #[test]
    fn split_without_fence_returns_whole_body() {
        let doc = split("just a body\nwith two lines\n");
        assert_eq!(doc.frontmatter, Frontmatter::Absent);
        assert_eq!(doc.body, "just a body\nwith two lines\n");
        assert_eq!(doc.body_start, 0);
    }

    #[test]
    fn split_parses_mapping_and_body() {
        let doc = split("---\ntag: x\nstatus: done\n---\n\nhello");
        let Frontmatter::Parsed(mapping) = doc.frontmatter else {
            panic!("expected parsed frontmatter");
        };
        assert_eq!(
            mapping.get("tag"),
            Some(&Value::String("x".into()))
        );
        assert_eq!(doc.body, "hello");
    }

    #[test]
    fn split_without_separator_blank_line_still_finds_body() {
        let doc = split("---\ntag: x\n---\nhello");
        assert!(matches!(doc.frontmatter, Frontmatter::Parsed(_)));
        assert_eq!(doc.body, "hello");
    }

    #[test]
    fn unterminated_fence_is_treated_as_body() {
        let doc = split("---\ntag: x\nno closing fence");
        assert_eq!(doc.frontmatter, Frontmatter::Absent);
        assert_eq!(doc.body, "---\ntag: x\nno closing fence");
    }

    #[test]
    fn empty_block_is_not_a_mapping() {
        let doc = split("---\n---\nbody");
        let Frontmatter::NotMapping { body_start } = doc.frontmatter else {
            panic!("expected NotMapping");
        };
        // Lossless body keeps the block; body_start points past it.
        assert_eq!(doc.body, "---\n---\nbody");
        assert_eq!(&"---\n---\nbody"[body_start..], "body");
    }

    #[test]
    fn scalar_block_is_not_a_mapping() {
        let doc = split("---\njust a string\n---\nbody");
        assert!(matches!(doc.frontmatter, Frontmatter::NotMapping { .. }));
    }

    #[test]
    fn malformed_block_is_preserved_in_body() {
        let content = "---\ntags: [a, b\n---\nbody";
        let doc = split(content);
        assert!(matches!(doc.frontmatter, Frontmatter::Malformed { .. }));
        assert_eq!(doc.body, content);
        assert_eq!(doc.body_start, 0);
    }

    #[test]
    fn crlf_fences_are_recognized() {
        let doc = split("---\r\ntag: x\r\n---\r\n\r\nhello");
        assert!(matches!(doc.frontmatter, Frontmatter::Parsed(_)));
        assert_eq!(doc.body, "hello");
    }

    #[test]
    fn render_without_metadata_is_body_only() {
        assert_eq!(render(None, "body").expect("render"), "body");
        let empty = Mapping::new();
        assert_eq!(render(Some(&empty), "body").expect("render"), "body");
    }

    #[test]
    fn render_drops_null_values() {
        let meta = mapping(&[
            ("tag", Value::String("x".into())),
            ("stale", Value::Null),
        ]);
        let rendered = render(Some(&meta), "hello").expect("render");
        assert_eq!(rendered, "---\ntag: x\n---\n\nhello");
    }

    #[test]
    fn render_all_null_mapping_emits_no_fence() {
        let meta = mapping(&[("stale", Value::Null)]);
        assert_eq!(render(Some(&meta), "body").expect("render"), "body");
    }

    #[test]
    fn render_empty_body_has_no_trailing_blank_line() {
        let meta = mapping(&[("tag", Value::String("x".into()))]);
        assert_eq!(render(Some(&meta), "").expect("render"), "---\ntag: x\n---\n");
    }

    #[test]
    fn render_preserves_insertion_order() {
        let meta = mapping(&[
            ("zebra", Value::String("last".into())),
            ("alpha", Value::String("first".into())),
        ]);
        let rendered = render(Some(&meta), "").expect("render");
        assert_eq!(rendered, "---\nzebra: last\nalpha: first\n---\n");
    }

    #[test]
    fn canonical_documents_round_trip() {
        let meta = mapping(&[
            ("title", Value::String("Note".into())),
            (
                "tags",
                Value::Sequence(vec![Value::String("a".into()), Value::String("b".into())]),
            ),
        ]);
        let rendered = render(Some(&meta), "line one\nline two\n").expect("render");
        let doc = split(&rendered);
        let Frontmatter::Parsed(parsed) = doc.frontmatter else {
            panic!("expected parsed frontmatter");
        };
        let rerendered = render(Some(&parsed), doc.body).expect("re-render");
        assert_eq!(rerendered, rendered);
    }

    #[test]
    fn bodies_without_frontmatter_round_trip() {
        let content = "no metadata here\n\n- bullet\n";
        let doc = split(content);
        let rerendered = render(None, doc.body).expect("render");
        assert_eq!(rerendered, content);
    }

    #[test]
    fn merge_sets_overwrites_and_removes() {
        let mut existing = mapping(&[
            ("tag", Value::String("x".into())),
            ("status", Value::String("open".into())),
        ]);
        let updates = mapping(&[
            ("tag", Value::Null),
            ("status", Value::String("done".into())),
            ("reviewed", Value::Bool(true)),
        ]);
        merge_updates(&mut existing, &updates);

        assert!(existing.get("tag").is_none());
        assert_eq!(
            existing.get("status"),
            Some(&Value::String("done".into()))
        );
        assert_eq!(
            existing.get("reviewed"),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn merge_replaces_nested_structures_wholesale() {
        let mut existing = mapping(&[(
            "nested",
            Value::Mapping(mapping(&[("keep", Value::Bool(true))])),
        )]);
        let updates = mapping(&[(
            "nested",
            Value::Mapping(mapping(&[("other", Value::Bool(false))])),
        )]);
        merge_updates(&mut existing, &updates);

        let Some(Value::Mapping(nested)) = existing.get("nested") else {
            panic!("expected nested mapping");
        };
        assert!(nested.get("keep").is_none());
        assert_eq!(
            nested.get("other"),
            Some(&Value::Bool(false))
        );
    }

    #[test]
    fn merge_keeps_position_of_updated_keys() {
        let mut existing = mapping(&[
            ("first", Value::String("1".into())),
            ("second", Value::String("2".into())),
        ]);
        let updates = mapping(&[("first", Value::String("updated".into()))]);
        merge_updates(&mut existing, &updates);

        let keys: Vec<_> = existing
            .keys()
            .map(|key| key.as_str().expect("string key").to_string())
            .collect();
        assert_eq!(keys, vec!["first", "second"]);
    }
}
