use pdf_layout::*;
use std::path::PathBuf;

#[test]
fn test_booklet_validation() {
    assert!(BookletOptions::default().validate().is_ok());

    let options = BookletOptions {
        pages_per_sheet: 4,
        ..Default::default()
    };
    match options.validate() {
        Err(LayoutError::InvalidParameter(msg)) => assert!(msg.contains("pagesPerSheet")),
        other => panic!("Expected InvalidParameter, got {:?}", other),
    }

    // Oversized and negative gutters are clamped, not rejected
    let options = BookletOptions {
        add_gutter: true,
        gutter_size: -5.0,
        ..Default::default()
    };
    assert!(options.validate().is_ok());
}

#[test]
fn test_nup_grid_validation() {
    let grid = |mode| NupOptions {
        mode,
        ..Default::default()
    }
    .grid();

    assert_eq!(grid(NupMode::PagesPerSheet(9)).unwrap(), (3, 3));
    assert_eq!(grid(NupMode::Custom { rows: 4, cols: 2 }).unwrap(), (2, 4));
    assert!(grid(NupMode::PagesPerSheet(7)).is_err());
    assert!(grid(NupMode::Custom { rows: 0, cols: 2 }).is_err());
    assert!(grid(NupMode::Custom { rows: 301, cols: 1 }).is_err());
    assert!(grid(NupMode::Custom { rows: 300, cols: 300 }).is_ok());
}

#[test]
fn test_section_split_validation() {
    assert!(SectionSplitOptions::default().validate().is_ok());
    assert_eq!(SectionSplitOptions::default().sections(), (1, 1));

    let options = SectionSplitOptions {
        horizontal_divisions: 301,
        ..Default::default()
    };
    assert!(options.validate().is_err());

    let options = SectionSplitOptions {
        split_mode: SplitMode::Custom("  ".to_string()),
        ..Default::default()
    };
    assert!(options.validate().is_err());
}

#[test]
fn test_poster_validation() {
    assert!(PosterOptions::default().validate().is_ok());
    for (x, y) in [(0, 2), (2, 0), (301, 1)] {
        let options = PosterOptions {
            x_factor: x,
            y_factor: y,
            ..Default::default()
        };
        assert!(options.validate().is_err(), "accepted {}x{}", x, y);
    }
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_save_and_load_job() {
    use tempfile::NamedTempFile;

    let job = LayoutJob {
        input: PathBuf::from("input.pdf"),
        output: PathBuf::from("booklet.pdf"),
        operation: LayoutOperation::Booklet(BookletOptions {
            add_gutter: true,
            gutter_size: 18.0,
            spine_location: SpineLocation::Right,
            duplex_pass: DuplexPass::Second,
            ..Default::default()
        }),
    };

    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    job.save(path).await.unwrap();
    let loaded = LayoutJob::load(path).await.unwrap();

    assert_eq!(loaded, job);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_job_fills_defaults() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(
        temp_file.path(),
        r#"{
            "input": "in.pdf",
            "output": "out.pdf",
            "operation": { "MultiPage": { "mode": { "Custom": { "rows": 2, "cols": 3 } } } }
        }"#,
    )
    .unwrap();

    let job = LayoutJob::load(temp_file.path()).await.unwrap();
    match job.operation {
        LayoutOperation::MultiPage(options) => {
            assert_eq!(options.grid().unwrap(), (3, 2));
            assert_eq!(options.paper_size, PaperSize::A4);
            assert_eq!(options.page_order, PageOrder::LrTd);
        }
        other => panic!("unexpected operation {:?}", other),
    }
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_job_rejects_invalid_options() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(
        temp_file.path(),
        r#"{
            "input": "in.pdf",
            "output": "out.pdf",
            "operation": { "Poster": { "x_factor": 0 } }
        }"#,
    )
    .unwrap();
    assert!(matches!(
        LayoutJob::load(temp_file.path()).await,
        Err(LayoutError::InvalidParameter(_))
    ));

    std::fs::write(temp_file.path(), "not json").unwrap();
    assert!(matches!(
        LayoutJob::load(temp_file.path()).await,
        Err(LayoutError::Config(_))
    ));
}
