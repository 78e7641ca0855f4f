//! XML construction and scraping helpers.

use crate::SoapError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

/// Wraps a body fragment in a SOAP 1.1 envelope.
#[must_use]
pub fn envelope(inner: &str) -> String {
    let mut xml = String::with_capacity(inner.len() + 256);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push_str(
        r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">"#,
    );
    xml.push_str("<soapenv:Header/><soapenv:Body>");
    xml.push_str(inner);
    xml.push_str("</soapenv:Body></soapenv:Envelope>");
    xml
}

/// Escapes the five XML entities.
#[must_use]
pub fn xml_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    result
}

/// First text content of the named element (local name), entity-unescaped.
///
/// Returns `None` when the element is absent or empty.
#[must_use]
pub fn text_of(xml: &str, element: &str) -> Option<String> {
    texts_of(xml, element).into_iter().next()
}

/// Text content of every occurrence of the named element, in document order.
#[must_use]
pub fn texts_of(xml: &str, element: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut values = Vec::new();
    let mut depth_in_target = 0usize;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                let name = std::str::from_utf8(name.as_ref()).unwrap_or("");
                if depth_in_target > 0 {
                    depth_in_target += 1;
                } else if name == element {
                    depth_in_target = 1;
                    current.clear();
                }
            }
            Ok(Event::Text(e)) => {
                if depth_in_target > 0 {
                    current.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::CData(e)) => {
                if depth_in_target > 0 {
                    current.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(_)) => {
                if depth_in_target > 0 {
                    depth_in_target -= 1;
                    if depth_in_target == 0 && !current.is_empty() {
                        values.push(std::mem::take(&mut current));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }

    values
}

/// Extracts repeated record elements into field maps.
///
/// For each occurrence of `record`, the direct child elements named in
/// `fields` are collected into a map. Used for the parameter tables and
/// error lists, which all share the `<Record><Field>value</Field></Record>`
/// shape.
pub fn records(
    xml: &str,
    record: &str,
    fields: &[&str],
) -> Result<Vec<HashMap<String, String>>, SoapError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut out = Vec::new();
    let mut current: Option<HashMap<String, String>> = None;
    let mut current_field: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                let name = std::str::from_utf8(name.as_ref()).unwrap_or("").to_string();
                if current.is_none() {
                    if name == record {
                        current = Some(HashMap::new());
                    }
                } else if fields.contains(&name.as_str()) {
                    current_field = Some(name);
                }
            }
            Ok(Event::Text(e)) => {
                if let (Some(map), Some(field)) = (current.as_mut(), current_field.as_ref()) {
                    let value = e.unescape().unwrap_or_default().to_string();
                    map.insert(field.clone(), value);
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                let name = std::str::from_utf8(name.as_ref()).unwrap_or("");
                if current_field.as_deref() == Some(name) {
                    current_field = None;
                } else if name == record {
                    if let Some(map) = current.take() {
                        out.push(map);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SoapError::InvalidResponse(format!("XML parse error: {e}")));
            }
            _ => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_wraps_body() {
        let env = envelope("<x>1</x>");
        assert!(env.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(env.contains("<soapenv:Body><x>1</x></soapenv:Body>"));
    }

    #[test]
    fn escape_covers_all_entities() {
        assert_eq!(xml_escape(r#"<a&"'>"#), "&lt;a&amp;&quot;&apos;&gt;");
    }

    #[test]
    fn text_of_finds_namespaced_elements() {
        let xml = r#"<soap:Envelope xmlns:soap="urn:x"><soap:Body>
            <loginCmsReturn>&lt;inner/&gt;</loginCmsReturn>
        </soap:Body></soap:Envelope>"#;
        assert_eq!(text_of(xml, "loginCmsReturn").as_deref(), Some("<inner/>"));
        assert_eq!(text_of(xml, "missing"), None);
    }

    #[test]
    fn texts_of_collects_all_occurrences() {
        let xml = "<r><v>a</v><v>b</v><v>c</v></r>";
        assert_eq!(texts_of(xml, "v"), vec!["a", "b", "c"]);
    }

    #[test]
    fn records_extracts_field_maps() {
        let xml = r#"<ResultGet>
            <Moneda><Id>PES</Id><Desc>Pesos Argentinos</Desc></Moneda>
            <Moneda><Id>DOL</Id><Desc>Dolar Estadounidense</Desc></Moneda>
        </ResultGet>"#;
        let rows = records(xml, "Moneda", &["Id", "Desc"]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Id"], "PES");
        assert_eq!(rows[1]["Desc"], "Dolar Estadounidense");
    }

    #[test]
    fn records_ignores_unlisted_fields() {
        let xml = "<r><Err><Code>600</Code><Msg>no auth</Msg><Extra>x</Extra></Err></r>";
        let rows = records(xml, "Err", &["Code", "Msg"]).unwrap();
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0]["Code"], "600");
    }
}
