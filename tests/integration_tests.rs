//! Integration tests for tokio_formdata

use serde_json::json;
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio_formdata::multipart::Reader;
use tokio_formdata::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fixture(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Splits `haystack` on every occurrence of `needle`.
fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        if &haystack[i..i + needle.len()] == needle {
            segments.push(&haystack[start..i]);
            i += needle.len();
            start = i;
        } else {
            i += 1;
        }
    }
    segments.push(&haystack[start..]);
    segments
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[test]
fn test_scalar_fields_split_into_segments() {
    init_logging();

    let mut fields = FieldSet::new();
    fields.insert("username", "john_doe");
    fields.insert("age", 42);
    fields.insert("ratio", 0.5);
    fields.insert("subscribed", true);
    fields.insert("banned", false);

    let form = FormData::new(fields.clone()).unwrap();
    let token = form.boundary().token().as_bytes();

    // the body starts with a delimiter, so the first split segment is empty
    let segments = split_on(form.body(), token);
    assert!(segments[0].is_empty());
    let segments = &segments[1..];
    assert_eq!(segments.len(), fields.len() + 1);
    assert_eq!(segments[fields.len()], b"--\r\n");

    let expected = [
        ("username", "john_doe"),
        ("age", "42"),
        ("ratio", "0.5"),
        ("subscribed", "true"),
        ("banned", "false"),
    ];
    for (segment, (name, value)) in segments.iter().zip(expected) {
        let part = format!(
            "\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            name, value
        );
        assert_eq!(*segment, part.as_bytes());
    }
}

#[test]
fn test_content_type_carries_body_boundary() {
    let form = FormData::new([("a", "b")].into_iter().collect()).unwrap();

    let param = form
        .content_type()
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap();
    assert_eq!(format!("--{}", param), form.boundary().token());
    assert!(param.starts_with("----------------------------"));

    let (media_type, params) = media_type::parse_media_type(form.content_type()).unwrap();
    assert_eq!(media_type, "multipart/form-data");
    assert_eq!(params["boundary"], param);
}

#[test]
fn test_file_parts_carry_exact_bytes() {
    init_logging();
    let dir = TempDir::new().unwrap();

    let png = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52, 0xFF, 0xFE, 0x80, 0x0D, 0x0A,
    ];
    let binary: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
    let paths = [
        fixture(&dir, "image.png", &png),
        fixture(&dir, "notes.txt", "héllo wörld\r\n".as_bytes()),
        fixture(&dir, "blob.bin", &binary),
    ];

    let mut fields = FieldSet::new();
    fields.files("files", paths.iter().cloned());
    let form = FormData::new(fields).unwrap();
    let body = form.body();

    assert_eq!(split_on(body, b"filename=").len() - 1, 3);

    for (name, contents, mime) in [
        ("image.png", &png[..], "image/png"),
        ("notes.txt", "héllo wörld\r\n".as_bytes(), "text/plain"),
        ("blob.bin", &binary[..], "application/octet-stream"),
    ] {
        let mut part = format!(
            "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            name, mime
        )
        .into_bytes();
        part.extend_from_slice(contents);
        part.extend_from_slice(b"\r\n");
        assert!(contains(body, &part), "part for {} not found verbatim", name);
    }

    // base names only, never the directory
    let dir_name = dir.path().to_string_lossy().into_owned();
    assert!(!contains(body, dir_name.as_bytes()));
}

#[tokio::test]
async fn test_round_trip_through_reader() {
    init_logging();
    let dir = TempDir::new().unwrap();

    let pdf = b"%PDF-1.4\n\x00\x01binary\r\n--not-a-boundary\r\n".to_vec();
    let text = b"line one\nline two\n".to_vec();
    let pdf_path = fixture(&dir, "Report.PDF", &pdf);
    let text_path = fixture(&dir, "readme", &text);

    let fields = FieldSet::try_from(json!({
        "title": "Quarterly \"numbers\"",
        "pages": 12,
        "final": true,
        "file": [pdf_path, text_path],
        "note": "",
    }))
    .unwrap();

    let form = FormData::new(fields).unwrap();
    let (_, params) = media_type::parse_media_type(form.content_type()).unwrap();

    let mut reader = Reader::new(Cursor::new(form.body().clone()), &params["boundary"]);
    let mut parts = Vec::new();
    while let Some(part) = reader.next_part().await.unwrap() {
        parts.push((
            part.form_name().map(str::to_string),
            part.file_name().map(str::to_string),
            part.content_type(),
            part.bytes(),
        ));
    }

    assert_eq!(parts.len(), 6);

    let scalars: Vec<_> = parts
        .iter()
        .filter(|(_, file, _, _)| file.is_none())
        .map(|(name, _, _, bytes)| (name.clone().unwrap(), bytes.to_vec()))
        .collect();
    assert_eq!(
        scalars,
        [
            ("title".to_string(), b"Quarterly \"numbers\"".to_vec()),
            ("pages".to_string(), b"12".to_vec()),
            ("final".to_string(), b"true".to_vec()),
            ("note".to_string(), Vec::new()),
        ]
    );

    let files: Vec<_> = parts
        .iter()
        .filter(|(_, file, _, _)| file.is_some())
        .collect();
    assert_eq!(files.len(), 2);

    assert_eq!(files[0].0.as_deref(), Some("file"));
    assert_eq!(files[0].1.as_deref(), Some("Report.PDF"));
    assert_eq!(files[0].2.as_deref(), Some("application/pdf"));
    assert_eq!(&files[0].3[..], &pdf[..]);

    assert_eq!(files[1].1.as_deref(), Some("readme"));
    assert_eq!(files[1].2.as_deref(), Some("text/plain"));
    assert_eq!(&files[1].3[..], &text[..]);
}

#[test]
fn test_invalid_input_produces_nothing() {
    assert!(matches!(
        FieldSet::try_from(json!("not a mapping")),
        Err(Error::InvalidInput(_))
    ));

    let fields = FieldSet::try_from(json!({"name": "x", "files": "not-an-array"})).unwrap();
    match FormData::new(fields) {
        Err(Error::InvalidInput(message)) => assert!(message.contains("files")),
        other => panic!("expected InvalidInput, got {:?}", other),
    }

    let fields = FieldSet::try_from(json!({"FILE": true})).unwrap();
    assert!(matches!(FormData::new(fields), Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn test_names_cannot_inject_part_headers() {
    let fields: FieldSet = [("a\r\nContent-Type: text/evil", "v")].into_iter().collect();
    assert!(matches!(FormData::new(fields), Err(Error::InvalidInput(_))));

    // a real file whose name holds a line break
    let dir = TempDir::new().unwrap();
    let evil = fixture(&dir, "x.txt\r\nX-Evil: 1", b"payload");
    let mut fields = FieldSet::new();
    fields.files("file", [evil]);
    match FormData::new(fields) {
        Err(Error::InvalidInput(message)) => assert!(message.contains("file name")),
        other => panic!("expected InvalidInput, got {:?}", other),
    }

    // quotes and backslashes are escaped and come back intact;
    // the reader strips anything up to a backslash from file names
    let odd = fixture(&dir, "say \"hi\".txt", b"odd");
    let mut fields = FieldSet::new();
    fields.insert("na\"me\\", "v");
    fields.files("file", [odd]);
    let form = FormData::with_boundary(fields, Boundary::new("b").unwrap()).unwrap();

    let mut reader = Reader::new(Cursor::new(form.body().clone()), "b");
    let first = reader.next_part().await.unwrap().unwrap();
    assert_eq!(first.form_name(), Some("na\"me\\"));
    assert_eq!(first.header.len(), 1);
    let second = reader.next_part().await.unwrap().unwrap();
    assert_eq!(second.file_name(), Some("say \"hi\".txt"));
    assert_eq!(second.header.len(), 2);
    assert!(reader.next_part().await.unwrap().is_none());
}

#[test]
fn test_unreadable_file_fails_build() {
    let dir = TempDir::new().unwrap();
    let present = fixture(&dir, "present.txt", b"here");
    let missing = dir.path().join("missing.txt");

    let mut fields = FieldSet::new();
    fields.files("file", [present, missing.clone()]);

    match FormData::new(fields) {
        Err(Error::FileRead { path, source }) => {
            assert_eq!(path, missing);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected FileRead, got {:?}", other),
    }
}

#[test]
fn test_sniff_priority_order() {
    init_logging();
    let dir = TempDir::new().unwrap();

    // signature beats extension table and heuristic
    let png = fixture(&dir, "photo.PNG", b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR");
    assert_eq!(sniff(&png), "image/png");

    // text heuristic fires before the extension table
    let log = fixture(&dir, "app.log", b"2024-01-01 started\n");
    assert_eq!(sniff(&log), "text/plain");
    let css = fixture(&dir, "site.css", b"body { margin: 0 }");
    assert_eq!(sniff(&css), "text/plain");

    // binary with a known extension
    let mp4 = fixture(&dir, "clip.mp4", b"\x00\x00\x00\x18ftypXXXX\x00");
    assert_eq!(sniff(&mp4), "video/mp4");

    // nothing known
    assert_eq!(sniff(dir.path().join("ghost.bin")), "application/octet-stream");
}

#[test]
fn test_registered_extension_used_as_fallback() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "scene.blendx", b"BLENDER\x00\x01");

    assert_eq!(sniff(&path), "application/octet-stream");
    add_extension_type(".blendx", "application/x-blender").unwrap();
    assert_eq!(sniff(&path), "application/x-blender");
    assert_eq!(
        extensions_by_type("application/x-blender").unwrap(),
        [".blendx"]
    );
}

#[tokio::test]
async fn test_write_to_async_sink() {
    let form = FormData::with_boundary(
        [("q", "rust")].into_iter().collect(),
        Boundary::new("sink-boundary").unwrap(),
    )
    .unwrap();

    let mut sink = Vec::new();
    form.write_to(&mut sink).await.unwrap();
    assert_eq!(
        sink,
        b"--sink-boundary\r\nContent-Disposition: form-data; name=\"q\"\r\n\r\nrust\r\n--sink-boundary--\r\n"
    );
}

#[tokio::test]
async fn test_concurrent_builds_share_table() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "shared.gif", b"GIF87a\x00\x00");

    let mut set = tokio::task::JoinSet::new();
    for i in 0..8 {
        let path = path.clone();
        set.spawn_blocking(move || {
            let mut fields = FieldSet::new();
            fields.insert("index", i);
            fields.files("file", [path]);
            FormData::new(fields).unwrap()
        });
    }

    let mut boundaries = std::collections::HashSet::new();
    while let Some(result) = set.join_next().await {
        let form = result.unwrap();
        assert!(contains(form.body(), b"Content-Type: image/gif\r\n"));
        boundaries.insert(form.boundary().token().to_string());
    }
    assert_eq!(boundaries.len(), 8);
}
