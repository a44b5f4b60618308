//! Just enough of a PDF reader to check what the serializer writes.

#![allow(dead_code)]

use std::collections::BTreeMap;

pub struct ParsedPdf<'a> {
    pub bytes: &'a [u8],
    /// Object number to byte offset, from the cross-reference table.
    pub offsets: BTreeMap<usize, usize>,
    pub trailer: String,
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|position| position + from)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|window| window == needle)
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find(haystack, needle, 0).is_some()
}

pub fn parse(bytes: &[u8]) -> ParsedPdf<'_> {
    assert!(bytes.starts_with(b"%PDF-1.4\n"), "missing header signature");
    assert!(bytes.ends_with(b"%%EOF\n"), "missing end marker");

    let startxref = rfind(bytes, b"startxref\n").expect("startxref present");
    let tail = std::str::from_utf8(&bytes[startxref + 10..]).expect("ascii tail");
    let xref_offset: usize = tail
        .lines()
        .next()
        .expect("xref offset line")
        .trim()
        .parse()
        .expect("numeric xref offset");
    assert!(bytes[xref_offset..].starts_with(b"xref\n"), "startxref must point at xref");

    let trailer_at = find(bytes, b"trailer\n", xref_offset).expect("trailer present");
    let table = std::str::from_utf8(&bytes[xref_offset..trailer_at]).expect("ascii xref");
    let mut lines = table.lines().skip(1);
    let header = lines.next().expect("subsection header");
    let mut parts = header.split_whitespace();
    assert_eq!(parts.next(), Some("0"));
    let size: usize = parts.next().expect("entry count").parse().expect("numeric count");

    let entries: Vec<&str> = lines.collect();
    assert_eq!(entries.len(), size, "entry count matches subsection header");
    assert_eq!(entries[0], "0000000000 65535 f ");

    let mut offsets = BTreeMap::new();
    for (number, entry) in entries.iter().enumerate().skip(1) {
        assert_eq!(entry.len(), 19, "entries are 20 bytes with the newline");
        assert!(entry.ends_with(" 00000 n "), "in-use entry {entry:?}");
        offsets.insert(number, entry[..10].parse().expect("numeric offset"));
    }

    let trailer_end = find(bytes, b"startxref", trailer_at).expect("startxref after trailer");
    let trailer = String::from_utf8_lossy(&bytes[trailer_at..trailer_end]).into_owned();

    ParsedPdf {
        bytes,
        offsets,
        trailer,
    }
}

impl<'a> ParsedPdf<'a> {
    /// Raw bytes of object `number`, between `obj` and `endobj`.
    pub fn object(&self, number: usize) -> &'a [u8] {
        let start = self.offsets[&number];
        let end = find(self.bytes, b"endobj", start).expect("endobj present");
        &self.bytes[start..end]
    }

    pub fn object_text(&self, number: usize) -> String {
        String::from_utf8_lossy(self.object(number)).into_owned()
    }

    /// Object numbers whose dictionary declares `/Type /Page`.
    pub fn page_objects(&self) -> Vec<usize> {
        self.offsets
            .keys()
            .copied()
            .filter(|number| {
                let text = self.object_text(*number);
                text.contains("/Type /Page ") || text.contains("/Type /Page>")
            })
            .collect()
    }

    /// Stream payload of object `number`, checked against its `/Length`.
    pub fn stream(&self, number: usize) -> &'a [u8] {
        let object = self.object(number);
        let text = String::from_utf8_lossy(object);
        let length_at = text.find("/Length ").expect("stream has a length");
        let length: usize = text[length_at + 8..]
            .split(|c: char| !c.is_ascii_digit())
            .next()
            .expect("length digits")
            .parse()
            .expect("numeric length");
        let data_start = find(object, b"stream\n", 0).expect("stream keyword") + 7;
        let data = &object[data_start..data_start + length];
        assert!(object[data_start + length..].starts_with(b"\nendstream"));
        data
    }

    /// Concatenated content streams of every page, in page order.
    pub fn page_contents(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for page in self.page_objects() {
            let text = self.object_text(page);
            let at = text.find("/Contents ").expect("page has contents");
            let number: usize = text[at + 10..]
                .split_whitespace()
                .next()
                .expect("contents reference")
                .parse()
                .expect("numeric reference");
            out.extend_from_slice(self.stream(number));
        }
        out
    }
}
