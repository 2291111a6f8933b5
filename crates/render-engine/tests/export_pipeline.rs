use std::io::Cursor;

use posterkit_common::config::ExportDefaults;
use posterkit_poster_model::config::{CutLineStyle, Orientation, PosterConfig, SizingMode};
use posterkit_poster_model::geometry::FracRect;
use posterkit_poster_model::layer::{ImageSource, Layer};
use posterkit_poster_model::units::Unit;
use posterkit_render_engine::text::FontStore;
use posterkit_render_engine::{PosterExporter, RecordingSink, SinkCommand};

fn exporter(pixels_per_inch: f64) -> PosterExporter {
    let defaults = ExportDefaults {
        pixels_per_inch,
        pixels_per_mm: 2.0,
        ..ExportDefaults::default()
    };
    PosterExporter::new(FontStore::empty(), defaults)
}

fn letter(mode: SizingMode) -> PosterConfig {
    PosterConfig {
        mode,
        unit: Unit::Inch,
        paper_id: "letter".to_string(),
        orientation: Orientation::Portrait,
        margin: 0.5,
        cut_line_style: CutLineStyle::Dashed,
        ..PosterConfig::default()
    }
}

fn png_layer(id: &str, rgba: [u8; 4], bounds: FracRect) -> Layer {
    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba(rgba));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png)
        .expect("png encode");
    let mut layer = Layer::image(id, ImageSource::from_bytes(bytes.get_ref(), "image/png"));
    layer.bounds = bounds;
    layer
}

fn drawn_images(sink: &RecordingSink) -> Vec<(u32, u32, f64, f64, u32, u32)> {
    sink.commands()
        .iter()
        .filter_map(|c| match c {
            SinkCommand::DrawImage {
                row,
                col,
                width,
                height,
                source,
                ..
            } => Some((*row, *col, *width, *height, source.width, source.height)),
            _ => None,
        })
        .collect()
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[tokio::test]
async fn letter_three_by_three_grid_emits_nine_pages_row_major() {
    let config = PosterConfig {
        grid_rows: 3,
        grid_cols: 3,
        ..letter(SizingMode::Grid)
    };
    let mut sink = RecordingSink::new();
    let report = exporter(10.0)
        .export(&config, &[], &mut sink, None)
        .await
        .expect("export should succeed");

    assert_eq!(report.pages, 9);
    assert_eq!((report.surface_width, report.surface_height), (225, 300));
    assert_eq!(sink.page_count(), 9);

    let images = drawn_images(&sink);
    let order: Vec<(u32, u32)> = images.iter().map(|i| (i.0, i.1)).collect();
    assert_eq!(
        order,
        vec![
            (0, 0),
            (0, 1),
            (0, 2),
            (1, 0),
            (1, 1),
            (1, 2),
            (2, 0),
            (2, 1),
            (2, 2)
        ]
    );
    for (_, _, w, h, pw, ph) in &images {
        assert_eq!((*w, *h), (7.5, 10.0));
        assert_eq!((*pw, *ph), (75, 100));
    }

    match &sink.commands()[1] {
        SinkCommand::AddPage {
            width,
            height,
            orientation,
        } => {
            assert_eq!((*width, *height), (8.5, 11.0));
            assert_eq!(*orientation, Orientation::Portrait);
        }
        other => panic!("expected add_page, got {other:?}"),
    }
    assert_eq!(sink.saved_as(), Some("poster.pdf"));
}

#[tokio::test]
async fn size_mode_last_column_is_partial() {
    let config = PosterConfig {
        target_width: 36.0,
        target_height: 24.0,
        ..letter(SizingMode::Size)
    };
    let mut sink = RecordingSink::new();
    let report = exporter(10.0)
        .export(&config, &[], &mut sink, None)
        .await
        .expect("export should succeed");

    assert_eq!((report.cols, report.rows), (5, 3));
    assert_eq!(report.pages, 15);
    assert!(report.degenerate_pages.is_empty());

    let images = drawn_images(&sink);
    let last_of_first_row = images
        .iter()
        .find(|i| i.0 == 0 && i.1 == 4)
        .expect("tile (0, 4)");
    assert!((last_of_first_row.2 - 6.0).abs() < 1e-9);
    assert_eq!(last_of_first_row.4, 60);

    let bottom_left = images
        .iter()
        .find(|i| i.0 == 2 && i.1 == 0)
        .expect("tile (2, 0)");
    assert!((bottom_left.3 - 4.0).abs() < 1e-9);
    assert_eq!(bottom_left.5, 40);
}

#[tokio::test]
async fn every_page_gets_label_and_cut_marks() {
    let config = PosterConfig {
        grid_rows: 2,
        grid_cols: 2,
        ..letter(SizingMode::Grid)
    };
    let mut sink = RecordingSink::new();
    exporter(10.0)
        .export(&config, &[], &mut sink, None)
        .await
        .expect("export should succeed");

    assert_eq!(
        sink.texts(),
        vec![
            "Page 1-1 (Row 1, Col 1)",
            "Page 1-2 (Row 1, Col 2)",
            "Page 2-1 (Row 2, Col 1)",
            "Page 2-2 (Row 2, Col 2)",
        ]
    );

    for page in sink.pages() {
        let rects = page
            .iter()
            .filter(|c| matches!(c, SinkCommand::DrawRect { .. }))
            .count();
        let lines = page
            .iter()
            .filter(|c| matches!(c, SinkCommand::DrawLine { .. }))
            .count();
        assert_eq!(rects, 1);
        assert_eq!(lines, 8);
    }
}

#[tokio::test]
async fn landscape_pages_swap_dimensions() {
    let config = PosterConfig {
        orientation: Orientation::Landscape,
        grid_rows: 1,
        grid_cols: 2,
        ..letter(SizingMode::Grid)
    };
    let mut sink = RecordingSink::new();
    let report = exporter(10.0)
        .export(&config, &[], &mut sink, None)
        .await
        .expect("export should succeed");

    assert_eq!((report.surface_width, report.surface_height), (200, 75));
    let first_page = sink.pages()[0];
    assert!(matches!(
        first_page[0],
        SinkCommand::AddPage { width, height, orientation: Orientation::Landscape }
            if width == 11.0 && height == 8.5
    ));
}

#[tokio::test]
async fn tiles_carry_the_layer_that_spans_them() {
    // Left half red, right half blue, on a 1x2 grid: each page is one color.
    let config = PosterConfig {
        grid_rows: 1,
        grid_cols: 2,
        show_cut_lines: false,
        show_page_numbers: false,
        ..letter(SizingMode::Grid)
    };
    let layers = vec![
        png_layer("red", [255, 0, 0, 255], FracRect::new(0.0, 0.0, 0.5, 1.0)),
        png_layer("blue", [0, 0, 255, 255], FracRect::new(0.5, 0.0, 0.5, 1.0)),
    ];

    let mut sink = RecordingSink::new();
    exporter(10.0)
        .export(&config, &layers, &mut sink, None)
        .await
        .expect("export should succeed");

    let pngs: Vec<&Vec<u8>> = sink
        .commands()
        .iter()
        .filter_map(|c| match c {
            SinkCommand::DrawImage { png, .. } => Some(png),
            _ => None,
        })
        .collect();
    assert_eq!(pngs.len(), 2);

    let left = image::load_from_memory(pngs[0]).expect("decode").to_rgba8();
    let right = image::load_from_memory(pngs[1]).expect("decode").to_rgba8();
    assert_eq!(left.dimensions(), (75, 100));
    assert_eq!(left.get_pixel(37, 50).0, [255, 0, 0, 255]);
    assert_eq!(right.get_pixel(37, 50).0, [0, 0, 255, 255]);
}

#[tokio::test]
async fn repeated_exports_produce_identical_tiles() {
    let config = PosterConfig {
        mode: SizingMode::Size,
        unit: Unit::Millimeter,
        paper_id: "a4".to_string(),
        margin: 7.0,
        target_width: 500.0,
        target_height: 300.0,
        ..PosterConfig::default()
    };
    let mut rotated = png_layer("photo", [10, 200, 90, 255], FracRect::new(0.1, 0.2, 0.5, 0.4));
    rotated.rotation = 17.0;
    rotated.opacity = 0.7;
    let layers = vec![
        png_layer("bg", [240, 240, 200, 255], FracRect::FULL),
        rotated,
    ];

    let signature = |sink: &RecordingSink| {
        sink.commands()
            .iter()
            .filter_map(|c| match c {
                SinkCommand::DrawImage { png, .. } => Some(fnv1a_64(png)),
                _ => None,
            })
            .collect::<Vec<_>>()
    };

    let exporter = exporter(10.0);
    let mut first = RecordingSink::new();
    exporter
        .export(&config, &layers, &mut first, None)
        .await
        .expect("first export");
    let mut second = RecordingSink::new();
    exporter
        .export(&config, &layers, &mut second, None)
        .await
        .expect("second export");

    assert_eq!(signature(&first), signature(&second));
    assert_eq!(signature(&first).len(), 6);
}

#[tokio::test]
async fn undecodable_layer_is_reported_and_export_continues() {
    let mut broken = Layer::image("broken", ImageSource::from_data_url("data:image/png;base64,AAAA"));
    broken.bounds = FracRect::FULL;
    let config = PosterConfig {
        grid_rows: 1,
        grid_cols: 1,
        ..letter(SizingMode::Grid)
    };

    let mut sink = RecordingSink::new();
    let report = exporter(10.0)
        .export(&config, &[broken], &mut sink, None)
        .await
        .expect("export should succeed");
    assert_eq!(report.skipped_layers, vec!["broken".to_string()]);
    assert_eq!(report.pages, 1);
}
