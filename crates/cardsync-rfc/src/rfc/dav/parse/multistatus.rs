//! Multistatus response XML parsing.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesRef, BytesStart, Event};

use super::error::{ParseError, ParseResult};
use crate::rfc::dav::core::{
    DAV_NS, Href, Multistatus, Namespace, PropertyValue, QName, ResourceRecord, Status,
};

/// Parses a multistatus response body.
///
/// ## Summary
/// Walks the document once and flattens every `<response>` into a
/// [`ResourceRecord`]. Namespace prefixes are resolved by URI, so `d:`, `D:`
/// and a default namespace all land on `DAV:`. Properties inside non-2xx
/// propstats are dropped.
///
/// An empty body or a document without a multistatus root yields an empty
/// [`Multistatus`].
///
/// ## Errors
/// Returns an error if the XML is not well-formed or not valid UTF-8.
#[tracing::instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_multistatus(xml: &[u8]) -> ParseResult<Multistatus> {
    if xml.iter().all(u8::is_ascii_whitespace) {
        tracing::debug!("Empty multistatus body");
        return Ok(Multistatus::new());
    }

    // Whitespace is kept: address-data bodies depend on their line breaks.
    let mut reader = Reader::from_reader(xml);

    let mut buf = Vec::new();
    let mut scopes = NamespaceScopes::default();
    let mut builder = MultistatusBuilder::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = scopes.open(e)?;
                builder.start(name);
            }
            Ok(Event::Empty(ref e)) => {
                let name = scopes.open(e)?;
                builder.start(name);
                builder.end();
                scopes.close();
            }
            Ok(Event::End(_)) => {
                builder.end();
                scopes.close();
            }
            Ok(Event::Text(ref e)) => builder.text(&lossy_text(e)),
            Ok(Event::CData(ref e)) => builder.text(&lossy_text(e)),
            Ok(Event::GeneralRef(ref e)) => {
                let resolved = resolve_reference(e)?;
                builder.text(&resolved);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let multistatus = builder.finish();
    tracing::debug!(
        count = multistatus.responses.len(),
        has_sync_token = multistatus.sync_token.is_some(),
        "Parsed multistatus"
    );

    Ok(multistatus)
}

/// Reads a multistatus response body, degrading to an empty result.
///
/// ## Summary
/// Servers routinely emit non-conformant XML. Rather than aborting a sync,
/// a document that fails [`parse_multistatus`] is logged and treated as
/// reporting nothing.
#[must_use]
pub fn read_multistatus(xml: &[u8]) -> Multistatus {
    parse_multistatus(xml).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Discarding malformed multistatus response");
        Multistatus::new()
    })
}

/// Decodes character data, replacing invalid UTF-8.
///
/// A body in a legacy charset only garbles its own resource instead of
/// ending the walk over the whole document.
fn lossy_text(raw: &[u8]) -> Cow<'_, str> {
    let text = String::from_utf8_lossy(raw);
    if matches!(text, Cow::Owned(_)) {
        tracing::warn!("Replaced invalid UTF-8 in response text");
    }
    text
}

/// Resolves `&name;` and `&#NN;` references inside text.
fn resolve_reference(e: &BytesRef<'_>) -> ParseResult<Cow<'static, str>> {
    if e.is_char_ref() {
        let resolved = e
            .resolve_char_ref()
            .map_err(|err| ParseError::invalid_value(err.to_string()))?;
        return Ok(resolved.map_or(Cow::Borrowed(""), |c| Cow::Owned(c.to_string())));
    }

    let name = e.decode()?;
    Ok(quick_xml::escape::resolve_predefined_entity(&name).map_or_else(
        || {
            tracing::trace!(entity = %name, "Keeping unknown entity reference verbatim");
            Cow::Owned(format!("&{name};"))
        },
        Cow::Borrowed,
    ))
}

/// Prefix bindings in scope, innermost last.
#[derive(Default)]
struct NamespaceScopes {
    bindings: Vec<(String, String)>,
    frames: Vec<usize>,
}

impl NamespaceScopes {
    /// Enters an element: records its `xmlns` declarations and resolves its name.
    fn open(&mut self, e: &BytesStart<'_>) -> ParseResult<QName> {
        self.frames.push(self.bindings.len());

        for attr in e.attributes().flatten() {
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let value = std::str::from_utf8(&attr.value)?;
            if let Some(prefix) = key.strip_prefix("xmlns:") {
                self.bindings.push((prefix.to_string(), value.to_string()));
            } else if key == "xmlns" {
                self.bindings.push((String::new(), value.to_string()));
            } else {
                // Other attributes ignored
            }
        }

        let name_bytes = e.name();
        let name = std::str::from_utf8(name_bytes.as_ref())?;
        Ok(self.resolve(name))
    }

    /// Leaves the innermost element, dropping its declarations.
    fn close(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.bindings.truncate(frame);
        }
    }

    fn resolve(&self, name: &str) -> QName {
        let (prefix, local_name) = name.split_once(':').unwrap_or(("", name));

        let namespace = self
            .bindings
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| Namespace::new(uri.clone()));

        let namespace = match namespace {
            Some(namespace) => namespace,
            // Unprefixed names without a default namespace are DAV: in practice
            None if prefix.is_empty() => Namespace::new(DAV_NS),
            None => {
                tracing::trace!(prefix, local_name, "Undeclared namespace prefix");
                Namespace::UNRESOLVED
            }
        };

        QName::new(namespace, local_name.to_string())
    }
}

/// Returns whether `name` is the structural DAV element `local`.
fn is_dav(name: &QName, local: &str) -> bool {
    name.local_name() == local && (name.is_dav() || name.namespace.is_unresolved())
}

#[derive(Default)]
struct PropstatBuilder {
    status: Option<Status>,
    properties: Vec<(QName, PropertyValue)>,
}

#[derive(Default)]
struct ResponseBuilder {
    hrefs: Vec<String>,
    status: Option<Status>,
    propstats: Vec<PropstatBuilder>,
    current_propstat: Option<PropstatBuilder>,
}

impl ResponseBuilder {
    fn into_records(self) -> Vec<ResourceRecord> {
        let properties: Vec<(QName, PropertyValue)> = self
            .propstats
            .into_iter()
            .filter(|propstat| {
                let keep = propstat.status.is_none_or(|status| status.is_success());
                if !keep {
                    tracing::trace!(
                        status = ?propstat.status,
                        count = propstat.properties.len(),
                        "Dropping properties from unsuccessful propstat"
                    );
                }
                keep
            })
            .flat_map(|propstat| propstat.properties)
            .collect();

        self.hrefs
            .iter()
            .map(|href| Href::from_server(href))
            .filter(|href| !href.is_empty())
            .map(|href| ResourceRecord {
                href,
                status: self.status,
                properties: properties.clone(),
            })
            .collect()
    }
}

/// A property element being captured, including all of its descendants.
struct PropertyCapture {
    name: QName,
    /// Stack depth of the property element's parent.
    depth: usize,
    value: PropertyValue,
    href_text: Option<String>,
}

#[derive(Default)]
struct MultistatusBuilder {
    stack: Vec<QName>,
    result: Multistatus,
    response: Option<ResponseBuilder>,
    capture: Option<PropertyCapture>,
    text: String,
}

impl MultistatusBuilder {
    fn start(&mut self, name: QName) {
        if let Some(capture) = self.capture.as_mut() {
            if self.stack.len() == capture.depth + 1 {
                capture.value.children.push(name.clone());
            }
            if is_dav(&name, "href") {
                capture.href_text = Some(String::new());
            }
            self.stack.push(name);
            return;
        }

        let parent = self.stack.last();
        let in_response = self.response.is_some();

        if is_dav(&name, "response") && parent.is_none_or(|p| is_dav(p, "multistatus")) {
            self.response = Some(ResponseBuilder::default());
        } else if is_dav(&name, "propstat") && in_response {
            if let Some(response) = self.response.as_mut() {
                response.current_propstat = Some(PropstatBuilder::default());
            }
        } else if parent.is_some_and(|p| is_dav(p, "prop"))
            && self
                .response
                .as_ref()
                .is_some_and(|r| r.current_propstat.is_some())
        {
            self.capture = Some(PropertyCapture {
                name: name.clone(),
                depth: self.stack.len(),
                value: PropertyValue::default(),
                href_text: None,
            });
        } else if is_dav(&name, "href") || is_dav(&name, "status") || is_dav(&name, "sync-token") {
            self.text.clear();
        } else {
            // Structure we do not interpret (prop, responsedescription, error, ...)
        }

        self.stack.push(name);
    }

    fn end(&mut self) {
        let Some(name) = self.stack.pop() else {
            return;
        };

        if let Some(capture) = self.capture.as_mut() {
            if self.stack.len() > capture.depth {
                if is_dav(&name, "href")
                    && let Some(href) = capture.href_text.take()
                {
                    capture.value.hrefs.push(href);
                }
                return;
            }

            if let Some(capture) = self.capture.take()
                && let Some(propstat) = self
                    .response
                    .as_mut()
                    .and_then(|r| r.current_propstat.as_mut())
            {
                propstat.properties.push((capture.name, capture.value));
            }
            return;
        }

        let parent = self.stack.last();
        let text = std::mem::take(&mut self.text);

        if is_dav(&name, "response") {
            if let Some(response) = self.response.take() {
                if response.hrefs.is_empty() {
                    tracing::warn!("Skipping multistatus response without href");
                }
                self.result.responses.extend(response.into_records());
            }
        } else if is_dav(&name, "propstat") {
            if let Some(response) = self.response.as_mut()
                && let Some(propstat) = response.current_propstat.take()
            {
                response.propstats.push(propstat);
            }
        } else if is_dav(&name, "href") && parent.is_some_and(|p| is_dav(p, "response")) {
            if let Some(response) = self.response.as_mut() {
                response.hrefs.push(text);
            }
        } else if is_dav(&name, "status") && parent.is_some_and(|p| is_dav(p, "response")) {
            if let Some(response) = self.response.as_mut() {
                response.status = Status::parse_line(&text);
            }
        } else if is_dav(&name, "status") && parent.is_some_and(|p| is_dav(p, "propstat")) {
            if let Some(propstat) = self
                .response
                .as_mut()
                .and_then(|r| r.current_propstat.as_mut())
            {
                propstat.status = Status::parse_line(&text);
            }
        } else if is_dav(&name, "sync-token") && parent.is_some_and(|p| is_dav(p, "multistatus")) {
            let token = text.trim();
            if !token.is_empty() {
                self.result.sync_token = Some(token.to_string());
            }
        } else {
            // Nothing to record
        }
    }

    fn text(&mut self, s: &str) {
        if let Some(capture) = self.capture.as_mut() {
            capture.value.text.push_str(s);
            if let Some(href) = capture.href_text.as_mut() {
                href.push_str(s);
            }
        } else {
            self.text.push_str(s);
        }
    }

    fn finish(self) -> Multistatus {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::dav::core::{carddav_props, cs_props, dav_props};

    #[test]
    fn parse_empty_body() {
        let ms = parse_multistatus(b"").unwrap();
        assert!(ms.is_empty());
        let ms = parse_multistatus(b"  \r\n ").unwrap();
        assert!(ms.is_empty());
    }

    #[test]
    fn parse_without_multistatus_root() {
        let xml = br#"<?xml version="1.0"?><D:error xmlns:D="DAV:"><D:valid-sync-token/></D:error>"#;
        let ms = parse_multistatus(xml).unwrap();
        assert!(ms.is_empty());
    }

    #[test]
    fn malformed_document_reads_as_empty() {
        let xml = br#"<d:multistatus xmlns:d="DAV:"><d:response><d:href>/a</d:multistatus>"#;
        assert!(parse_multistatus(xml).is_err());
        assert!(read_multistatus(xml).is_empty());
    }

    #[test]
    fn parse_propfind_response_with_arbitrary_prefixes() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
<x0:multistatus xmlns:x0="DAV:" xmlns:x1="urn:ietf:params:xml:ns:carddav" xmlns:x2="http://calendarserver.org/ns/">
  <x0:response>
    <x0:href>/addressbooks/johndoe/contacts/</x0:href>
    <x0:propstat>
      <x0:prop>
        <x0:resourcetype><x0:collection/><x1:addressbook/></x0:resourcetype>
        <x0:displayname>My Address Book</x0:displayname>
        <x2:getctag>3145</x2:getctag>
      </x0:prop>
      <x0:status>HTTP/1.1 200 OK</x0:status>
    </x0:propstat>
  </x0:response>
</x0:multistatus>"#;

        let ms = parse_multistatus(xml).unwrap();
        assert_eq!(ms.responses.len(), 1);

        let record = &ms.responses[0];
        assert_eq!(record.href.as_str(), "/addressbooks/johndoe/contacts/");
        assert!(record.has_resource_type(&carddav_props::addressbook()));
        assert!(record.has_resource_type(&dav_props::collection()));
        assert_eq!(record.text(&dav_props::displayname()), Some("My Address Book"));
        assert_eq!(record.text(&cs_props::getctag()), Some("3145"));
    }

    #[test]
    fn default_namespace_resolves_by_uri() {
        let xml = br#"<multistatus xmlns="DAV:">
  <response>
    <href>/principals/users/johndoe/</href>
    <propstat>
      <prop>
        <current-user-principal><href>/principals/users/johndoe/</href></current-user-principal>
      </prop>
      <status>HTTP/1.1 200 OK</status>
    </propstat>
  </response>
</multistatus>"#;

        let ms = parse_multistatus(xml).unwrap();
        let value = ms.responses[0]
            .property(&dav_props::current_user_principal())
            .unwrap();
        assert_eq!(value.first_href(), Some("/principals/users/johndoe/"));
        assert_eq!(value.children, vec![QName::dav("href")]);
    }

    #[test]
    fn not_found_propstat_is_dropped() {
        let xml = br#"<d:multistatus xmlns:d="DAV:" xmlns:cs="http://calendarserver.org/ns/">
  <d:response>
    <d:href>/addressbooks/johndoe/contacts/</d:href>
    <d:propstat>
      <d:prop><d:displayname>Contacts</d:displayname></d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
    <d:propstat>
      <d:prop><cs:getctag/><d:sync-token/></d:prop>
      <d:status>HTTP/1.1 404 Not Found</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

        let ms = parse_multistatus(xml).unwrap();
        let record = &ms.responses[0];
        assert_eq!(record.properties.len(), 1);
        assert!(record.property(&cs_props::getctag()).is_none());
    }

    #[test]
    fn sync_collection_status_and_token() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>/addressbooks/johndoe/contacts/deletedcard.vcf</d:href>
    <d:status>HTTP/1.1 404 Not Found</d:status>
  </d:response>
  <d:response>
    <d:href>/addressbooks/johndoe/contacts/newcard.vcf</d:href>
    <d:propstat>
      <d:prop><d:getetag>"33441-34321"</d:getetag></d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
  <d:sync-token>http://sabredav.org/ns/sync/5001</d:sync-token>
</d:multistatus>"#;

        let ms = parse_multistatus(xml).unwrap();
        assert_eq!(ms.sync_token.as_deref(), Some("http://sabredav.org/ns/sync/5001"));
        assert_eq!(ms.responses.len(), 2);
        assert!(ms.responses[0].is_removed());
        assert!(!ms.responses[1].is_removed());
        assert_eq!(
            ms.responses[1].text(&dav_props::getetag()),
            Some("\"33441-34321\"")
        );
    }

    #[test]
    fn address_data_keeps_line_breaks_and_references() {
        let xml = b"<d:multistatus xmlns:d=\"DAV:\" xmlns:card=\"urn:ietf:params:xml:ns:carddav\">\
<d:response><d:href>/c/1.vcf</d:href><d:propstat><d:prop>\
<card:address-data>BEGIN:VCARD&#13;\nVERSION:3.0&#13;\nNOTE:a &amp; b&#13;\nEND:VCARD&#13;\n</card:address-data>\
</d:prop><d:status>HTTP/1.1 200 OK</d:status></d:propstat></d:response></d:multistatus>";

        let ms = parse_multistatus(xml).unwrap();
        let data = ms.responses[0]
            .property(&carddav_props::address_data())
            .unwrap();
        assert_eq!(
            data.text,
            "BEGIN:VCARD\r\nVERSION:3.0\r\nNOTE:a & b\r\nEND:VCARD\r\n"
        );
    }

    #[test_log::test]
    fn invalid_utf8_text_only_affects_its_resource() {
        let mut xml = b"<d:multistatus xmlns:d=\"DAV:\" xmlns:card=\"urn:ietf:params:xml:ns:carddav\">\
<d:response><d:href>/c/latin1.vcf</d:href><d:propstat><d:prop>\
<card:address-data>BEGIN:VCARD\nFN:Ren"
            .to_vec();
        xml.push(0xe9);
        xml.extend_from_slice(
            b"\nEND:VCARD\n</card:address-data></d:prop></d:propstat></d:response>\
<d:response><d:href>/c/good.vcf</d:href><d:propstat><d:prop>\
<card:address-data>BEGIN:VCARD\nFN:Good\nEND:VCARD\n</card:address-data>\
</d:prop></d:propstat></d:response></d:multistatus>",
        );

        let ms = parse_multistatus(&xml).unwrap();
        assert_eq!(ms.responses.len(), 2);
        let latin1 = ms.responses[0]
            .property(&carddav_props::address_data())
            .unwrap();
        assert_eq!(latin1.text, "BEGIN:VCARD\nFN:Ren\u{fffd}\nEND:VCARD\n");
        let good = ms.responses[1]
            .property(&carddav_props::address_data())
            .unwrap();
        assert_eq!(good.text, "BEGIN:VCARD\nFN:Good\nEND:VCARD\n");
    }

    #[test]
    fn cdata_address_data() {
        let xml = b"<d:multistatus xmlns:d=\"DAV:\" xmlns:card=\"urn:ietf:params:xml:ns:carddav\">\
<d:response><d:href>/c/1.vcf</d:href><d:propstat><d:prop>\
<card:address-data><![CDATA[BEGIN:VCARD\nFN:A <B>\nEND:VCARD\n]]></card:address-data>\
</d:prop></d:propstat></d:response></d:multistatus>";

        let ms = parse_multistatus(xml).unwrap();
        let data = ms.responses[0]
            .property(&carddav_props::address_data())
            .unwrap();
        assert_eq!(data.text, "BEGIN:VCARD\nFN:A <B>\nEND:VCARD\n");
    }

    #[test]
    fn undeclared_prefix_is_tolerated() {
        let xml = br#"<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>/c/1.vcf</d:href>
    <d:propstat><d:prop><x:getetag>"1"</x:getetag></d:prop></d:propstat>
  </d:response>
</d:multistatus>"#;

        let ms = read_multistatus(xml);
        assert_eq!(ms.responses.len(), 1);
        assert_eq!(ms.responses[0].text(&dav_props::getetag()), Some("\"1\""));
    }

    #[test]
    fn multiple_hrefs_in_one_response() {
        let xml = br#"<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>/c/1.vcf</d:href>
    <d:href>https://dav.example.com/c/2.vcf</d:href>
    <d:status>HTTP/1.1 404 Not Found</d:status>
  </d:response>
</d:multistatus>"#;

        let ms = parse_multistatus(xml).unwrap();
        let hrefs: Vec<&str> = ms.responses.iter().map(|r| r.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/c/1.vcf", "/c/2.vcf"]);
        assert!(ms.responses.iter().all(ResourceRecord::is_removed));
    }

    #[test]
    fn namespace_declarations_are_scoped() {
        // `c` means CardDAV only inside the first response.
        let xml = br#"<d:multistatus xmlns:d="DAV:">
  <d:response xmlns:c="urn:ietf:params:xml:ns:carddav">
    <d:href>/a/</d:href>
    <d:propstat><d:prop><d:resourcetype><c:addressbook/></d:resourcetype></d:prop></d:propstat>
  </d:response>
  <d:response xmlns:c="urn:ietf:params:xml:ns:caldav">
    <d:href>/b/</d:href>
    <d:propstat><d:prop><d:resourcetype><c:calendar/></d:resourcetype></d:prop></d:propstat>
  </d:response>
</d:multistatus>"#;

        let ms = parse_multistatus(xml).unwrap();
        assert!(ms.responses[0].has_resource_type(&carddav_props::addressbook()));
        assert!(!ms.responses[1].has_resource_type(&carddav_props::addressbook()));
        let calendar = QName::new(
            Namespace::new("urn:ietf:params:xml:ns:caldav"),
            "calendar",
        );
        assert!(ms.responses[1].has_resource_type(&calendar));
    }
}
