use elementtree::Element;

/// The two response fields the CGI protocol carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    /// Session identifier returned by the login CGI.
    SessionId,
    /// Command output returned by the exec CGI.
    CommandOutput,
}

impl Field {
    fn tag(self) -> &'static str {
        match self {
            Field::SessionId => "SID",
            Field::CommandOutput => "CMDOUTPUT",
        }
    }
}

/// Extracts the text of the first element named after `field`, searching
/// the whole document in depth-first order.
///
/// `Ok(None)` means the document parsed but carries no such element.
/// Whitespace inside the matched element is preserved verbatim.
pub fn extract_field(raw: &[u8], field: Field) -> Result<Option<String>, elementtree::Error> {
    let root = Element::from_reader(raw)?;
    if root.tag().name() == field.tag() {
        return Ok(Some(root.text().to_string()));
    }
    Ok(find_descendant(&root, field.tag()).map(|node| node.text().to_string()))
}

fn find_descendant<'a>(node: &'a Element, tag: &str) -> Option<&'a Element> {
    for child in node.children() {
        if child.tag().name() == tag {
            return Some(child);
        }
        if let Some(found) = find_descendant(child, tag) {
            return Some(found);
        }
    }
    None
}

/// Entity-escapes text for embedding in a request payload. The remote
/// CGIs take credentials and the command line as XML text content, so
/// the five special characters must not pass through raw.
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[test]
fn extracts_sid_text() {
    let raw = b"<RSP><SID>12345</SID></RSP>";
    let value = extract_field(raw, Field::SessionId).unwrap();
    assert_eq!(value.as_deref(), Some("12345"));
}

#[test]
fn extracts_nested_field_anywhere() {
    let raw = b"<LOGIN><RESP><AUTH><SID>7f00a2</SID></AUTH></RESP></LOGIN>";
    let value = extract_field(raw, Field::SessionId).unwrap();
    assert_eq!(value.as_deref(), Some("7f00a2"));
}

#[test]
fn preserves_output_whitespace() {
    let raw = b"<RSP><CMDOUTPUT>hello\nworld</CMDOUTPUT></RSP>";
    let value = extract_field(raw, Field::CommandOutput).unwrap();
    assert_eq!(value.as_deref(), Some("hello\nworld"));
}

#[test]
fn first_match_wins() {
    let raw = b"<RSP><SID>first</SID><SID>second</SID></RSP>";
    let value = extract_field(raw, Field::SessionId).unwrap();
    assert_eq!(value.as_deref(), Some("first"));
}

#[test]
fn missing_field_is_none() {
    let raw = b"<RSP><STATUS>ok</STATUS></RSP>";
    assert_eq!(extract_field(raw, Field::CommandOutput).unwrap(), None);
}

#[test]
fn empty_document_root_match() {
    let raw = b"<CMDOUTPUT></CMDOUTPUT>";
    let value = extract_field(raw, Field::CommandOutput).unwrap();
    assert_eq!(value.as_deref(), Some(""));
}

#[test]
fn malformed_xml_is_an_error() {
    let raw = b"<RSP><SID>12345";
    assert!(extract_field(raw, Field::SessionId).is_err());
}

#[test]
fn extraction_is_idempotent() {
    let raw = b"<RSP><CMDOUTPUT>  padded  </CMDOUTPUT></RSP>";
    let first = extract_field(raw, Field::CommandOutput).unwrap();
    let second = extract_field(raw, Field::CommandOutput).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.as_deref(), Some("  padded  "));
}

#[test]
fn escapes_all_specials() {
    assert_eq!(
        escape_text(r#"a & b < c > d ' e " f"#),
        "a &amp; b &lt; c &gt; d &apos; e &quot; f"
    );
    assert_eq!(escape_text("plain"), "plain");
}
