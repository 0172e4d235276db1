//! # RSS Item
//!
//! Pulls the title and description of the first `<item>` out of an RSS
//! feed, the two lines of a word-of-the-day banner.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::source_error;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub description: String,
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Title,
    Description,
}

/// The first item of the feed. Fails when the feed has no item.
pub fn first_item(xml: &str) -> Result<FeedItem> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut item = FeedItem::default();
    let mut in_item = false;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" => in_item = true,
                b"title" if in_item => field = Some(Field::Title),
                b"description" if in_item => field = Some(Field::Description),
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"item" if in_item => {
                    return Ok(FeedItem {
                        title: item.title.trim().to_string(),
                        description: item.description.trim().to_string(),
                    })
                }
                b"title" | b"description" => field = None,
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if let Some(f) = field {
                    let text = t
                        .unescape()
                        .map_err(|e| source_error("rss", e))?;
                    push_text(&mut item, f, &text);
                }
            }
            Ok(Event::CData(t)) => {
                if let Some(f) = field {
                    let text = String::from_utf8_lossy(&t.into_inner()).to_string();
                    push_text(&mut item, f, &text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(source_error("rss", e)),
            _ => {}
        }
        buf.clear();
    }
    Err(source_error("rss", "feed has no item"))
}

fn push_text(item: &mut FeedItem, field: Field, text: &str) {
    match field {
        Field::Title => item.title.push_str(text),
        Field::Description => item.description.push_str(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_item_only() {
        let xml = r#"<?xml version="1.0"?>
            <rss><channel><title>Wordsmith</title>
              <item><title>gist</title><description>the central point &amp; core</description></item>
              <item><title>second</title><description>ignored</description></item>
            </channel></rss>"#;
        let item = first_item(xml).unwrap();
        assert_eq!(item.title, "gist");
        assert_eq!(item.description, "the central point & core");
    }

    #[test]
    fn test_cdata_description() {
        let xml = "<rss><channel><item><title>x</title><description><![CDATA[a <b>bold</b> word]]></description></item></channel></rss>";
        assert_eq!(first_item(xml).unwrap().description, "a <b>bold</b> word");
    }

    #[test]
    fn test_no_item_is_source_error() {
        let err = first_item("<rss><channel><title>t</title></channel></rss>").unwrap_err();
        assert_eq!(err.kind(), "SourceError");
    }
}
