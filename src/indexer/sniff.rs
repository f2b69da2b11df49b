//! Content-type sniffing over a bounded file prefix
//!
//! Magic-byte signatures are checked in order; anything unrecognized is classified as
//! `text/plain` when it contains no binary control bytes, else as the default type.

use std::io::{self, Read, Seek, SeekFrom};

/// Assigned when a file is too small to sniff or matches nothing
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Number of leading bytes the classifier looks at
pub const SNIFF_LEN: usize = 512;

struct Signature {
    offset: usize,
    magic: &'static [u8],
    mime: &'static str,
}

const fn sig(offset: usize, magic: &'static [u8], mime: &'static str) -> Signature {
    Signature { offset, magic, mime }
}

static SIGNATURES: &[Signature] = &[
    // Documents
    sig(0, b"%PDF-", "application/pdf"),
    sig(0, b"%!PS-Adobe-", "application/postscript"),
    // Byte order marks
    sig(0, b"\xFE\xFF", "text/plain"),
    sig(0, b"\xFF\xFE", "text/plain"),
    sig(0, b"\xEF\xBB\xBF", "text/plain"),
    // Images
    sig(0, b"\x89PNG\r\n\x1A\n", "image/png"),
    sig(0, b"\xFF\xD8\xFF", "image/jpeg"),
    sig(0, b"GIF87a", "image/gif"),
    sig(0, b"GIF89a", "image/gif"),
    sig(0, b"BM", "image/bmp"),
    sig(0, b"\x00\x00\x01\x00", "image/x-icon"),
    sig(0, b"\x00\x00\x02\x00", "image/x-icon"),
    sig(0, b"II*\x00", "image/tiff"),
    sig(0, b"MM\x00*", "image/tiff"),
    // Audio and video
    sig(0, b"OggS\x00", "application/ogg"),
    sig(0, b"ID3", "audio/mpeg"),
    sig(0, b"fLaC", "audio/flac"),
    sig(0, b"MThd\x00\x00\x00\x06", "audio/midi"),
    sig(0, b"\x1A\x45\xDF\xA3", "video/webm"),
    sig(0, b".snd", "audio/basic"),
    // Archives
    sig(0, b"PK\x03\x04", "application/zip"),
    sig(0, b"\x1F\x8B\x08", "application/x-gzip"),
    sig(0, b"Rar!\x1A\x07", "application/x-rar-compressed"),
    sig(0, b"7z\xBC\xAF\x27\x1C", "application/x-7z-compressed"),
    sig(0, b"BZh", "application/x-bzip2"),
    // Executables and fonts
    sig(0, b"\x00asm", "application/wasm"),
    sig(0, b"wOFF", "font/woff"),
    sig(0, b"wOF2", "font/woff2"),
    sig(0, b"OTTO", "font/otf"),
    sig(0, b"\x00\x01\x00\x00", "font/ttf"),
];

/// Tags that mark a prefix as HTML when followed by a space or `>`
const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

impl Signature {
    fn matches(&self, head: &[u8]) -> bool {
        head.get(self.offset..self.offset + self.magic.len()) == Some(self.magic)
    }
}

/// Classify a file prefix, returning a MIME type without parameters
pub fn sniff(head: &[u8]) -> &'static str {
    let head = &head[..head.len().min(SNIFF_LEN)];

    if let Some(mime) = sniff_markup(head) {
        return mime;
    }
    if let Some(signature) = SIGNATURES.iter().find(|s| s.matches(head)) {
        return signature.mime;
    }
    if let Some(mime) = sniff_riff(head).or_else(|| sniff_iso_media(head)) {
        return mime;
    }
    if head.iter().any(|&b| is_binary_byte(b)) {
        return DEFAULT_CONTENT_TYPE;
    }
    "text/plain"
}

/// Read up to [`SNIFF_LEN`] bytes from the start of `file` and classify them
///
/// Files shorter than [`SNIFF_LEN`] get [`DEFAULT_CONTENT_TYPE`] without being read.
pub fn detect_content_type<F: Read + Seek>(file: &mut F, size: u64) -> io::Result<&'static str> {
    if size < SNIFF_LEN as u64 {
        return Ok(DEFAULT_CONTENT_TYPE);
    }

    file.seek(SeekFrom::Start(0))?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut head)?;
    Ok(sniff(&head))
}

fn sniff_markup(head: &[u8]) -> Option<&'static str> {
    let start = head.iter().position(|b| !b.is_ascii_whitespace())?;
    let data = &head[start..];

    if data.starts_with(b"<?xml") {
        return Some("text/xml");
    }

    HTML_TAGS
        .iter()
        .any(|tag| {
            data.len() > tag.len()
                && data[..tag.len()].eq_ignore_ascii_case(tag)
                && matches!(data[tag.len()], b' ' | b'>')
        })
        .then_some("text/html")
}

fn sniff_riff(head: &[u8]) -> Option<&'static str> {
    if head.len() < 12 || &head[..4] != b"RIFF" {
        return None;
    }
    match &head[8..12] {
        b"WAVE" => Some("audio/wave"),
        b"AVI " => Some("video/avi"),
        b"WEBP" => Some("image/webp"),
        _ => None,
    }
}

/// ISO base media files (`ftyp` box at offset 4)
fn sniff_iso_media(head: &[u8]) -> Option<&'static str> {
    if head.len() < 12 || &head[4..8] != b"ftyp" {
        return None;
    }
    match &head[8..12] {
        b"qt  " => Some("video/quicktime"),
        b"heic" | b"heix" | b"mif1" | b"msf1" => Some("image/heic"),
        b"avif" => Some("image/avif"),
        b"M4A " => Some("audio/mp4"),
        _ => Some("video/mp4"),
    }
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
