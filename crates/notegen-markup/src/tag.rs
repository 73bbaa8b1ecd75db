//! Parsing the inside of start and end tags.

/// A single `name="value"` pair. Valueless attributes carry an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A parsed start tag. Names are ASCII-lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub self_closing: bool,
}

/// Parse a lexed start tag such as `<td colspan=2 class="x">`.
///
/// Duplicate attributes keep the first occurrence, as browsers do.
pub fn parse_start_tag(slice: &str) -> StartTag {
    let inner = slice.strip_prefix('<').unwrap_or(slice);
    let inner = inner.strip_suffix('>').unwrap_or(inner);
    let (inner, self_closing) = match inner.strip_suffix('/') {
        Some(rest) => (rest, true),
        None => (inner, false),
    };

    let name_end = inner
        .find(|c: char| c.is_ascii_whitespace() || c == '/')
        .unwrap_or(inner.len());
    let name = inner[..name_end].to_ascii_lowercase();

    let mut attributes: Vec<Attribute> = Vec::new();
    let mut rest = &inner[name_end..];
    while let Some((attribute, remaining)) = next_attribute(rest) {
        if !attributes.iter().any(|a| a.name == attribute.name) {
            attributes.push(attribute);
        }
        rest = remaining;
    }

    StartTag {
        name,
        attributes,
        self_closing,
    }
}

/// Parse a lexed end tag such as `</TD >` into its lowercased name.
pub fn parse_end_tag(slice: &str) -> String {
    let inner = slice.strip_prefix("</").unwrap_or(slice);
    let inner = inner.strip_suffix('>').unwrap_or(inner);
    inner
        .split(|c: char| c.is_ascii_whitespace())
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn next_attribute(input: &str) -> Option<(Attribute, &str)> {
    let input = input.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '/');
    if input.is_empty() {
        return None;
    }

    let name_end = input
        .find(|c: char| c.is_ascii_whitespace() || c == '=' || c == '/')
        .unwrap_or(input.len());
    let name = input[..name_end].to_ascii_lowercase();
    let after_name = input[name_end..].trim_start_matches(|c: char| c.is_ascii_whitespace());

    let Some(after_eq) = after_name.strip_prefix('=') else {
        let attribute = Attribute {
            name,
            value: String::new(),
        };
        return Some((attribute, after_name));
    };

    let after_eq = after_eq.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (raw_value, remaining) = match after_eq.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let body = &after_eq[1..];
            match body.find(quote) {
                Some(end) => (&body[..end], &body[end + 1..]),
                None => (body, ""),
            }
        }
        _ => {
            let end = after_eq
                .find(|c: char| c.is_ascii_whitespace())
                .unwrap_or(after_eq.len());
            (&after_eq[..end], &after_eq[end..])
        }
    };

    let attribute = Attribute {
        name,
        value: html_escape::decode_html_entities(raw_value).into_owned(),
    };
    Some((attribute, remaining))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn attr(name: &str, value: &str) -> Attribute {
        Attribute {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn parses_name_and_quoted_attributes() {
        let tag = parse_start_tag(r#"<DIV class="key-point" data-edit-id='edit-1'>"#);
        assert_eq!(tag.name, "div");
        assert_eq!(
            tag.attributes,
            vec![attr("class", "key-point"), attr("data-edit-id", "edit-1")]
        );
        assert!(!tag.self_closing);
    }

    #[test]
    fn parses_unquoted_and_valueless_attributes() {
        let tag = parse_start_tag("<td colspan=2 contenteditable>");
        assert_eq!(
            tag.attributes,
            vec![attr("colspan", "2"), attr("contenteditable", "")]
        );
    }

    #[test]
    fn decodes_entities_in_values() {
        let tag = parse_start_tag(r#"<a title="Q&amp;A">"#);
        assert_eq!(tag.attributes, vec![attr("title", "Q&A")]);
    }

    #[test]
    fn first_duplicate_attribute_wins() {
        let tag = parse_start_tag(r#"<p id="a" id="b">"#);
        assert_eq!(tag.attributes, vec![attr("id", "a")]);
    }

    #[rstest]
    #[case("<br/>", "br", true)]
    #[case("<br />", "br", true)]
    #[case("<img src=\"x.png\"/>", "img", true)]
    #[case("<hr>", "hr", false)]
    fn detects_self_closing(#[case] input: &str, #[case] name: &str, #[case] closing: bool) {
        let tag = parse_start_tag(input);
        assert_eq!(tag.name, name);
        assert_eq!(tag.self_closing, closing);
    }

    #[rstest]
    #[case("</p>", "p")]
    #[case("</TABLE >", "table")]
    fn parses_end_tags(#[case] input: &str, #[case] name: &str) {
        assert_eq!(parse_end_tag(input), name);
    }
}
