//! End-to-end transforms through the public API with the real backend.
//!
//! Fixtures are generated in memory with the `image` crate so nothing is
//! read from disk.

use image::{DynamicImage, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use image_press::imaging::{
    ImageBackend, RustBackend, SourceImage, TargetFormat, TargetSpec, TransformError,
    TransformOutcome, TransformSettings, render, transform,
};
use image_press::session::{Notice, Session};
use proptest::prelude::*;

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, ((x + y) % 256) as u8])
    })
}

fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Transparent everywhere except an opaque blue square in the centre.
fn transparent_png_fixture(size: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(size, size, |x, y| {
        let inside = (size / 4..size * 3 / 4).contains(&x) && (size / 4..size * 3 / 4).contains(&y);
        if inside {
            Rgba([0, 0, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), size, size, image::ExtendedColorType::Rgba8)
        .unwrap();
    buf
}

fn decode(bytes: &[u8]) -> DynamicImage {
    image::load_from_memory(bytes).unwrap()
}

fn load(bytes: &[u8], mime: &str) -> SourceImage {
    RustBackend::new().decode(bytes, mime).unwrap()
}

fn encoded(outcome: TransformOutcome) -> Vec<u8> {
    outcome
        .into_encoded()
        .expect("transform should have produced output")
        .into_bytes()
}

#[test]
fn jpeg_800x600_to_png_400x300() {
    let backend = RustBackend::new();
    let source = load(&jpeg_fixture(800, 600), "image/jpeg");
    let spec = TargetSpec::new(TargetFormat::Png).with_size(400, 300);

    let out = transform(&backend, &source, &spec, &TransformSettings::default())
        .unwrap()
        .into_encoded()
        .unwrap();

    assert_eq!(out.mime_type(), "image/png");
    assert_eq!(image::guess_format(out.bytes()).unwrap(), image::ImageFormat::Png);
    let img = decode(out.bytes());
    assert_eq!((img.width(), img.height()), (400, 300));
}

#[test]
fn transparent_png_to_jpeg_gets_white_background() {
    let backend = RustBackend::new();
    let source = load(&transparent_png_fixture(500), "image/png");
    let outcome = transform(
        &backend,
        &source,
        &TargetSpec::new(TargetFormat::Jpeg),
        &TransformSettings::default(),
    )
    .unwrap();

    let img = decode(&encoded(outcome));
    assert_eq!((img.width(), img.height()), (500, 500));
    assert!(!img.color().has_alpha());

    let rgb = img.to_rgb8();
    for (x, y) in [(0, 0), (499, 0), (0, 499), (499, 499), (10, 250)] {
        let px = rgb.get_pixel(x, y).0;
        assert!(px.iter().all(|&c| c >= 245), "({x},{y}) was {px:?}");
    }
    let centre = rgb.get_pixel(250, 250).0;
    assert!(centre[2] > 200 && centre[0] < 60, "centre was {centre:?}");
}

#[test]
fn downscaled_transparent_png_to_jpeg_has_clean_edge() {
    // Left half transparent black, right half opaque white.
    let img = RgbaImage::from_fn(100, 10, |x, _| {
        if x < 50 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), 100, 10, image::ExtendedColorType::Rgba8)
        .unwrap();

    let backend = RustBackend::new();
    let source = load(&buf, "image/png");
    let spec = TargetSpec::new(TargetFormat::Jpeg).with_size(33, 10);
    let out = render(&backend, &source, &spec, &TransformSettings::default()).unwrap();

    let rgb = decode(out.bytes()).to_rgb8();
    assert_eq!((rgb.width(), rgb.height()), (33, 10));
    for x in 0..33 {
        let px = rgb.get_pixel(x, 5).0;
        assert!(px.iter().all(|&c| c >= 240), "({x},5) was {px:?}");
    }
}

#[test]
fn transparent_png_to_bmp_is_opaque() {
    let backend = RustBackend::new();
    let source = load(&transparent_png_fixture(40), "image/png");
    let out = render(
        &backend,
        &source,
        &TargetSpec::new(TargetFormat::Bmp),
        &TransformSettings::default(),
    )
    .unwrap();

    let img = decode(out.bytes());
    assert!(!img.color().has_alpha());
    assert_eq!(img.to_rgb8().get_pixel(0, 0).0, [255, 255, 255]);
    assert_eq!(img.to_rgb8().get_pixel(20, 20).0, [0, 0, 255]);
}

#[test]
fn transparent_png_to_webp_keeps_alpha() {
    let backend = RustBackend::new();
    let source = load(&transparent_png_fixture(40), "image/png");
    let out = render(
        &backend,
        &source,
        &TargetSpec::new(TargetFormat::WebP),
        &TransformSettings::default(),
    )
    .unwrap();

    let img = decode(out.bytes()).to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0[3], 0);
    assert_eq!(img.get_pixel(20, 20).0, [0, 0, 255, 255]);
}

#[test]
fn gif_target_is_unsupported() {
    let err = TargetFormat::from_mime("image/gif").unwrap_err();
    assert!(matches!(err, TransformError::UnsupportedFormat(_)));

    let mut session = Session::new(TransformSettings::default());
    session.load(&png_fixture(16, 16), Some("image/png")).unwrap();
    let err = session.convert_mime("image/gif").unwrap_err();
    assert!(matches!(err, TransformError::UnsupportedFormat(_)));
    assert!(session.artifact().is_none());
}

#[test]
fn lossless_round_trips_are_pixel_identical() {
    let backend = RustBackend::new();
    let bytes = png_fixture(33, 17);
    let source = load(&bytes, "image/png");
    let original = source.pixels().to_rgb8();

    for format in [TargetFormat::Png, TargetFormat::WebP, TargetFormat::Bmp] {
        let out = render(
            &backend,
            &source,
            &TargetSpec::new(format),
            &TransformSettings::default(),
        )
        .unwrap();
        let back = decode(out.bytes()).to_rgb8();
        assert_eq!(back, original, "{format} round trip changed pixels");
    }
}

#[test]
fn lossy_round_trip_keeps_dimensions() {
    let backend = RustBackend::new();
    let source = load(&png_fixture(64, 48), "image/png");
    let out = render(
        &backend,
        &source,
        &TargetSpec::new(TargetFormat::Jpeg),
        &TransformSettings::default(),
    )
    .unwrap();
    let back = decode(out.bytes());
    assert_eq!((back.width(), back.height()), (64, 48));
}

#[test]
fn identical_inputs_give_identical_bytes() {
    let backend = RustBackend::new();
    let source = load(&transparent_png_fixture(60), "image/png");
    let settings = TransformSettings::default();

    for format in TargetFormat::ALL {
        let spec = TargetSpec::new(format).with_size(31, 29);
        let a = render(&backend, &source, &spec, &settings).unwrap();
        let b = render(&backend, &source, &spec, &settings).unwrap();
        assert_eq!(a.bytes(), b.bytes(), "{format} output differs between runs");
    }
}

#[test]
fn same_format_same_size_is_skipped() {
    let backend = RustBackend::new();
    let source = load(&jpeg_fixture(40, 30), "image/jpeg");
    let spec = TargetSpec::new(TargetFormat::Jpeg).with_size(40, 30);
    let outcome = transform(&backend, &source, &spec, &TransformSettings::default()).unwrap();
    assert_eq!(outcome, TransformOutcome::Skipped);

    let mut session = Session::new(TransformSettings::default());
    session.load(&jpeg_fixture(40, 30), Some("image/jpg")).unwrap();
    assert_eq!(session.convert(TargetFormat::Jpeg).unwrap(), Notice::SameFormat);
}

#[test]
fn gif_source_converts_to_png() {
    let frame = RgbaImage::from_pixel(12, 8, Rgba([10, 200, 30, 255]));
    let mut buf = Vec::new();
    image::codecs::gif::GifEncoder::new(&mut buf)
        .encode(frame.as_raw(), 12, 8, image::ExtendedColorType::Rgba8)
        .unwrap();

    let mut session = Session::new(TransformSettings::default());
    session.load(&buf, None).unwrap();
    let notice = session.convert(TargetFormat::Png).unwrap();
    assert_eq!(
        notice,
        Notice::Converted {
            from: None,
            to: TargetFormat::Png
        }
    );
    let img = decode(session.artifact().unwrap().image.bytes());
    assert_eq!((img.width(), img.height()), (12, 8));
}

#[test]
fn zero_dimensions_are_rejected() {
    let backend = RustBackend::new();
    let source = load(&png_fixture(10, 10), "image/png");
    let spec = TargetSpec::new(TargetFormat::Png).with_size(0, 5);
    let err = transform(&backend, &source, &spec, &TransformSettings::default()).unwrap_err();
    assert!(matches!(
        err,
        TransformError::InvalidDimensions {
            width: 0,
            height: 5
        }
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn output_has_exactly_requested_dimensions(
        width in 1u32..=96,
        height in 1u32..=96,
        format_index in 0usize..4,
    ) {
        let backend = RustBackend::new();
        let source = load(&png_fixture(37, 23), "image/png");
        let format = TargetFormat::ALL[format_index];
        let spec = TargetSpec::new(format).with_size(width, height);

        let out = render(&backend, &source, &spec, &TransformSettings::default()).unwrap();
        prop_assert_eq!(out.dimensions().width, width);
        prop_assert_eq!(out.dimensions().height, height);
        let img = decode(out.bytes());
        prop_assert_eq!((img.width(), img.height()), (width, height));
    }
}
