//! Turns an XML document into a generic nested [`Value`].
//!
//! The shape follows the common XML to JSON convention of the upstream's own SDKs:
//! the document becomes `{ "<root>": ... }`, an element holding only text becomes a string,
//! an element with children becomes an object, repeated children become an array in
//! document order, attributes are collected under `"$"` and text next to children or
//! attributes under `"_"`.

use std::fmt::Display;

use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

static ATTRIBUTES_KEY: &str = "$";
static TEXT_KEY: &str = "_";

/// An element whose end tag has not been read yet.
#[derive(Debug, Default)]
struct OpenElement {
    name: String,
    attributes: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl OpenElement {
    fn open(start: &BytesStart) -> Result<Self> {
        let mut attributes = Map::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(malformed)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).to_string();
            let value = attribute.unescape_value().map_err(malformed)?;
            attributes.insert(key, Value::String(value.to_string()));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).to_string(),
            attributes,
            ..Default::default()
        })
    }

    fn into_value(self) -> (String, Value) {
        let text = self.text.trim();
        if self.attributes.is_empty() && self.children.is_empty() {
            return (self.name, Value::String(text.to_string()));
        }
        let mut object = self.children;
        if !self.attributes.is_empty() {
            object.insert(ATTRIBUTES_KEY.to_string(), Value::Object(self.attributes));
        }
        if !text.is_empty() {
            object.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
        }
        (self.name, Value::Object(object))
    }
}

/// Parse an XML document.
pub fn parse(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<OpenElement> = vec![];
    let mut root: Option<(String, Value)> = None;
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(start) => stack.push(OpenElement::open(&start)?),
            Event::Empty(start) => close(OpenElement::open(&start)?, &mut stack, &mut root)?,
            Event::End(end) => {
                let Some(element) = stack.pop() else {
                    return Err(malformed(format!(
                        "unmatched end tag </{}>",
                        String::from_utf8_lossy(end.name().as_ref())
                    )));
                };
                close(element, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(malformed)?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(cdata) => {
                let text = String::from_utf8_lossy(&cdata.into_inner()).to_string();
                append_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if let Some(element) = stack.last() {
        return Err(malformed(format!(
            "unexpected end of document inside <{}>",
            element.name
        )));
    }
    let (name, value) = root.ok_or_else(|| malformed("document has no root element"))?;
    Ok(Value::Object(Map::from_iter([(name, value)])))
}

fn close(
    element: OpenElement,
    stack: &mut [OpenElement],
    root: &mut Option<(String, Value)>,
) -> Result<()> {
    let (name, value) = element.into_value();
    match stack.last_mut() {
        Some(parent) => insert_child(&mut parent.children, name, value),
        None if root.is_none() => *root = Some((name, value)),
        None => return Err(malformed(format!("second root element <{name}>"))),
    }
    Ok(())
}

fn insert_child(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.get_mut(&name) {
        Some(Value::Array(siblings)) => siblings.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(name, value);
        }
    }
}

fn append_text(stack: &mut [OpenElement], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(element) => {
            element.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(malformed("text outside of the root element")),
    }
}

fn malformed(reason: impl Display) -> Error {
    Error::MalformedPayload(reason.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_nested() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
            <response>
                <header><resultCode>00</resultCode><resultMsg>NORMAL SERVICE.</resultMsg></header>
                <body>
                    <items>
                        <item><seq>1</seq><title>햄릿</title><thumbnail/></item>
                        <item><seq>2</seq><title><![CDATA[<오셀로> & 친구들]]></title></item>
                    </items>
                    <totalCount>2</totalCount>
                </body>
            </response>"#;
        let parsed = parse(xml).unwrap();
        let expected = json!({
            "response": {
                "header": { "resultCode": "00", "resultMsg": "NORMAL SERVICE." },
                "body": {
                    "items": {
                        "item": [
                            { "seq": "1", "title": "햄릿", "thumbnail": "" },
                            { "seq": "2", "title": "<오셀로> & 친구들" }
                        ]
                    },
                    "totalCount": "2"
                }
            }
        });
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_mixed_text_keeps_inner_whitespace() {
        assert_eq!(parse("<t>A <![CDATA[B]]> C</t>").unwrap(), json!({ "t": "A B C" }));
        assert_eq!(
            parse("<t>\n  첫째 &amp; <![CDATA[둘째]]>\n</t>").unwrap(),
            json!({ "t": "첫째 & 둘째" })
        );
        let parsed = parse("<t id=\"1\">  A <b>x</b> C  </t>").unwrap();
        assert_eq!(parsed["t"]["_"], json!("A  C"));
    }

    #[test]
    fn test_parse_single_child_is_not_an_array() {
        let parsed = parse("<items><item><seq>7</seq></item></items>").unwrap();
        assert_eq!(parsed, json!({ "items": { "item": { "seq": "7" } } }));
    }

    #[test]
    fn test_parse_attributes_and_escapes() {
        let parsed = parse(r#"<place id="12">예술의전당 &amp; 콘서트홀</place>"#).unwrap();
        assert_eq!(
            parsed,
            json!({ "place": { "$": { "id": "12" }, "_": "예술의전당 & 콘서트홀" } })
        );
    }

    #[test]
    fn test_parse_malformed() {
        for xml in [
            "",
            "not xml at all",
            "<response><header></response>",
            "<response><header>",
            "<a/><b/>",
            "<title>&bogus;</title>",
        ] {
            let err = parse(xml).unwrap_err();
            assert!(
                matches!(err, Error::MalformedPayload(_)),
                "{xml:?} gave {err:?}"
            );
        }
    }
}
