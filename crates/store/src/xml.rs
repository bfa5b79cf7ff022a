//! S3 XML bodies: ListObjectsV2 and DeleteObjects.

use quick_xml::escape::{escape, resolve_predefined_entity};
use quick_xml::events::{BytesRef, Event};
use quick_xml::Reader;

use crate::error::StoreError;

/// One page of a ListObjectsV2 response.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct ListPage {
    pub keys: Vec<String>,
    pub prefixes: Vec<String>,
    pub next_token: Option<String>,
}

/// Outcome of one DeleteObjects call.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct DeleteReport {
    pub deleted: usize,
    /// (key, message) per object S3 refused to delete.
    pub errors: Vec<(String, String)>,
}

/// Walk `xml`, calling `on_end(path, text)` as each element closes, where
/// `path` is the element stack and `text` the element's own text.
fn walk(xml: &str, mut on_end: impl FnMut(&[String], &str)) -> Result<(), StoreError> {
    // Text is not trimmed: keys may carry significant spaces around entities
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).to_string());
                text.clear();
            }
            Ok(Event::Text(ref e)) => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(ref e)) => {
                resolve_entity(e, &mut text)?;
            }
            Ok(Event::End(_)) => {
                on_end(&path, &text);
                path.pop();
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(StoreError::Parse(format!("malformed XML: {e}"))),
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

/// Append the text `e` stands for. Unknown named entities are kept verbatim.
fn resolve_entity(e: &BytesRef<'_>, text: &mut String) -> Result<(), StoreError> {
    match e.resolve_char_ref() {
        Ok(Some(c)) => text.push(c),
        Ok(None) => {
            let name = String::from_utf8_lossy(e);
            match resolve_predefined_entity(&name) {
                Some(value) => text.push_str(value),
                None => {
                    text.push('&');
                    text.push_str(&name);
                    text.push(';');
                }
            }
        }
        Err(err) => return Err(StoreError::Parse(format!("bad character reference: {err}"))),
    }
    Ok(())
}

pub(crate) fn parse_list_page(xml: &str) -> Result<ListPage, StoreError> {
    let mut page = ListPage::default();
    let mut truncated = false;

    walk(xml, |path, text| {
        let names: Vec<&str> = path.iter().map(String::as_str).collect();
        match names.as_slice() {
            ["ListBucketResult", "Contents", "Key"] => page.keys.push(text.to_string()),
            ["ListBucketResult", "CommonPrefixes", "Prefix"] => page.prefixes.push(text.to_string()),
            ["ListBucketResult", "IsTruncated"] => truncated = text.eq_ignore_ascii_case("true"),
            ["ListBucketResult", "NextContinuationToken"] => page.next_token = Some(text.to_string()),
            _ => {}
        }
    })?;

    if !truncated {
        page.next_token = None;
    } else if page.next_token.is_none() {
        return Err(StoreError::Parse(
            "truncated listing without NextContinuationToken".into(),
        ));
    }
    Ok(page)
}

pub(crate) fn parse_delete_result(xml: &str) -> Result<DeleteReport, StoreError> {
    let mut report = DeleteReport::default();
    let mut key = String::new();
    let mut message = String::new();

    walk(xml, |path, text| {
        let names: Vec<&str> = path.iter().map(String::as_str).collect();
        match names.as_slice() {
            ["DeleteResult", "Deleted"] => report.deleted += 1,
            ["DeleteResult", "Error", "Key"] => key = text.to_string(),
            ["DeleteResult", "Error", "Message"] => message = text.to_string(),
            ["DeleteResult", "Error"] => {
                report
                    .errors
                    .push((std::mem::take(&mut key), std::mem::take(&mut message)));
            }
            _ => {}
        }
    })?;
    Ok(report)
}

/// DeleteObjects request body for `keys`.
pub(crate) fn delete_request_body(keys: &[String]) -> String {
    let mut body = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Delete>"#);
    for key in keys {
        body.push_str("<Object><Key>");
        body.push_str(&escape(key.as_str()));
        body.push_str("</Key></Object>");
    }
    body.push_str("</Delete>");
    body
}
