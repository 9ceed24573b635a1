//! Description cleanup: HTML stripping, entity decoding and splitting the
//! rules text into WHEN / TARGET / EFFECT / RESTRICTIONS sections.

use crate::models::CardBody;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\s*/?\s*([A-Za-z][A-Za-z0-9]*)?[^>]*>").expect("valid tag regex"));

static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6}|[A-Za-z]+);").expect("valid entity regex"));

/// Tags that separate words when removed.
const BLOCK_TAGS: &[&str] = &[
    "br", "p", "div", "li", "ul", "ol", "tr", "td", "table", "h1", "h2", "h3", "h4", "h5", "h6",
];

const MARKERS: [(&str, Section); 4] = [
    ("WHEN:", Section::When),
    ("TARGET:", Section::Target),
    ("EFFECT:", Section::Effect),
    ("RESTRICTIONS:", Section::Restriction),
];

#[derive(Debug, Clone, Copy)]
enum Section {
    When,
    Target,
    Effect,
    Restriction,
}

/// Strips tags, decodes entities and collapses whitespace.
pub fn clean_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let stripped = TAG_RE.replace_all(text, |caps: &Captures| {
        let is_block = caps
            .get(1)
            .map(|name| BLOCK_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name.as_str())))
            .unwrap_or(false);
        if is_block {
            " "
        } else {
            ""
        }
    });

    let decoded = ENTITY_RE.replace_all(&stripped, |caps: &Captures| {
        decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    });

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entity(entity: &str) -> Option<String> {
    let decoded = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" | "#39" => '\'',
        "nbsp" => ' ',
        "ndash" => '–',
        "mdash" => '—',
        "rsquo" => '’',
        "lsquo" => '‘',
        "hellip" => '…',
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(|c: char| c == 'x' || c == 'X') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some(decoded.to_string())
}

/// Splits a raw (possibly HTML) description into card body sections.
///
/// Each section runs from its marker to the next marker found after it. Text
/// before the first marker is dropped; with no markers at all the whole text
/// becomes the effect.
pub fn parse_description(description: &str) -> CardBody {
    let text = clean_html(description);
    let mut body = CardBody::default();
    if text.is_empty() {
        return body;
    }

    let mut found: Vec<(usize, usize, Section)> = MARKERS
        .iter()
        .filter_map(|(marker, section)| {
            text.find(marker)
                .map(|start| (start, start + marker.len(), *section))
        })
        .collect();

    if found.is_empty() {
        body.effect = text;
        return body;
    }

    found.sort_by_key(|(start, _, _)| *start);

    for (i, (_, content_start, section)) in found.iter().enumerate() {
        let content_end = found[i + 1..]
            .iter()
            .map(|(start, _, _)| *start)
            .find(|start| start >= content_start)
            .unwrap_or(text.len());
        let content = text[*content_start..content_end].trim().to_string();

        match section {
            Section::When => body.when = content,
            Section::Target => body.target = content,
            Section::Effect => body.effect = content,
            Section::Restriction => body.restriction = content,
        }
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_html_strips_tags_and_entities() {
        let raw = "<b>WHEN:</b>&nbsp;Your turn.<br>TARGET: One&#39;s unit &amp; &quot;friends&quot; &#x41;";
        assert_eq!(
            clean_html(raw),
            "WHEN: Your turn. TARGET: One's unit & \"friends\" A"
        );
    }

    #[test]
    fn test_inline_tags_do_not_split_words() {
        assert_eq!(clean_html("re-<i>roll</i>"), "re-roll");
        assert_eq!(clean_html("one<br/>two</p><p>three"), "one two three");
    }

    #[test]
    fn test_unknown_entities_are_kept() {
        assert_eq!(clean_html("a &bogus; b"), "a &bogus; b");
        assert_eq!(clean_html(""), "");
    }

    #[test]
    fn test_parse_all_sections() {
        let body = parse_description(
            "WHEN: Your Shooting phase. TARGET: One unit. EFFECT: Re-roll hits. RESTRICTIONS: Once per battle.",
        );
        assert_eq!(body.when, "Your Shooting phase.");
        assert_eq!(body.target, "One unit.");
        assert_eq!(body.effect, "Re-roll hits.");
        assert_eq!(body.restriction, "Once per battle.");
    }

    #[test]
    fn test_parse_sample_description() {
        let body = parse_description("WHEN: Your turn TARGET: One unit EFFECT: Deal damage");
        assert_eq!(
            body,
            CardBody::new("Your turn", "One unit", "Deal damage", "")
        );
    }

    #[test]
    fn test_parse_without_markers_goes_to_effect() {
        let body = parse_description("<p>Just some   rules text</p>");
        assert_eq!(body.effect, "Just some rules text");
        assert_eq!(body.when, "");
        assert!(parse_description("").is_empty());
    }

    #[test]
    fn test_parse_missing_middle_section() {
        let body = parse_description("Intro text WHEN: Fight phase EFFECT: +1 to hit");
        assert_eq!(body.when, "Fight phase");
        assert_eq!(body.target, "");
        assert_eq!(body.effect, "+1 to hit");
    }

    #[test]
    fn test_parse_markers_out_of_order() {
        let body = parse_description("TARGET: That unit WHEN: Any phase");
        assert_eq!(body.target, "That unit");
        assert_eq!(body.when, "Any phase");
    }
}
