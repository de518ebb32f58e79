//! End-to-end extraction tests against synthesized fixtures.

use textgrab::{Extractor, ExtractorConfig, HtmlExtractor};

#[tokio::test]
async fn html_file_extraction_strips_markup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.html");
    std::fs::write(
        &path,
        r#"<html>
        <head><title>Fixture</title><style>body { color: red }</style></head>
        <body>
            <h1>Heading</h1>
            <p>Visible <b>text</b> content.</p>
            <script>var hidden = 1;</script>
        </body>
        </html>"#,
    )
    .unwrap();

    let extractor = HtmlExtractor::default();
    let result = extractor.extract(&path.display().to_string()).await.unwrap();

    assert_eq!(result.title.as_deref(), Some("Fixture"));
    assert!(result.text.contains("Heading"));
    assert!(result.text.contains("Visible text content."));
    assert!(!result.text.contains("<p>"));
    assert!(!result.text.contains("hidden"));
    assert_eq!(result.content_type.as_deref(), Some("text/html"));
}

#[tokio::test]
async fn html_missing_file_is_an_error() {
    let extractor = HtmlExtractor::default();
    let err = extractor.extract("/no/such/file.html").await.unwrap_err();
    assert!(matches!(err, textgrab::ExtractError::Io(_)));
}

#[tokio::test]
async fn html_oversized_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.html");
    std::fs::write(&path, format!("<p>{}</p>", "x".repeat(512))).unwrap();

    let extractor = HtmlExtractor::new(ExtractorConfig::default().with_max_length(100));
    let err = extractor.extract_path(&path).await.unwrap_err();
    assert!(matches!(
        err,
        textgrab::ExtractError::ContentTooLarge { .. }
    ));
}

#[tokio::test]
async fn directory_conversion_mirrors_the_tree() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    std::fs::create_dir_all(input.path().join("guides/deep")).unwrap();
    std::fs::write(
        input.path().join("index.html"),
        "<html><body><h1>Index</h1></body></html>",
    )
    .unwrap();
    std::fs::write(
        input.path().join("guides/deep/setup.html"),
        "<html><body><p>Setup steps.</p></body></html>",
    )
    .unwrap();
    std::fs::write(input.path().join("guides/readme.txt"), "not html").unwrap();

    let extractor = HtmlExtractor::new(
        ExtractorConfig::default()
            .with_markdown(true)
            .with_workers(2),
    );
    let summary = extractor
        .convert_dir(input.path(), output.path(), false, None)
        .await
        .unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.converted, 2);
    assert_eq!(summary.failed, 0);

    let index = std::fs::read_to_string(output.path().join("index.md")).unwrap();
    assert!(index.contains("# Index"));
    let setup = std::fs::read_to_string(output.path().join("guides/deep/setup.md")).unwrap();
    assert!(setup.contains("Setup steps."));
    assert!(!output.path().join("guides/readme.txt").exists());
    assert!(!output.path().join("guides/readme.md").exists());
}

#[tokio::test]
async fn dry_run_writes_nothing() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    std::fs::write(
        input.path().join("a.html"),
        "<html><body><p>a</p></body></html>",
    )
    .unwrap();

    let extractor = HtmlExtractor::new(ExtractorConfig::default().with_markdown(true));
    let summary = extractor
        .convert_dir(input.path(), output.path(), true, None)
        .await
        .unwrap();

    assert_eq!(summary.converted, 1);
    assert!(std::fs::read_dir(output.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn directory_conversion_reports_progress() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    for name in ["a.html", "b.html", "c.html"] {
        std::fs::write(
            input.path().join(name),
            "<html><body><p>x</p></body></html>",
        )
        .unwrap();
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let hook: textgrab::html::ProgressFn = Arc::new(move |_done, total| {
        assert_eq!(total, 3);
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let extractor = HtmlExtractor::default();
    extractor
        .convert_dir(input.path(), output.path(), false, Some(hook))
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[cfg(feature = "pdf")]
mod pdf {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use textgrab::{ExtractorConfig, PdfExtractor};

    /// Build a one-page PDF containing the given text.
    fn one_page_pdf(text: &str, title: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
        });
        doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn known_text_pdf_round_trips() {
        let bytes = one_page_pdf("Hello PDF world", "Fixture Doc");
        let extractor = PdfExtractor::new(ExtractorConfig::default());
        let result = extractor
            .extract_from_bytes(&bytes, "fixture.pdf".to_string())
            .unwrap();

        assert!(result.text.contains("Hello PDF world"));
        assert_eq!(result.title.as_deref(), Some("Fixture Doc"));
        assert_eq!(result.metadata.get("page_count").map(String::as_str), Some("1"));
        assert_eq!(result.content_type.as_deref(), Some("application/pdf"));
    }
}
