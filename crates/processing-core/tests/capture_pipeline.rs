use image::{Rgba, RgbaImage};

use snapstrip_processing_core::{apply_filter, decode_rgba, encode_png, render_mirrored_square};
use snapstrip_strip_model::FilterDescriptor;

const RED: Rgba<u8> = Rgba([200, 40, 40, 255]);
const BLUE: Rgba<u8> = Rgba([40, 60, 210, 255]);

/// 640×480 feed: red on the camera's left, blue on its right, with a
/// horizontal gradient so blur and resampling have something to chew on.
fn split_feed() -> RgbaImage {
    RgbaImage::from_fn(640, 480, |x, y| {
        let base = if x < 320 { RED } else { BLUE };
        let shade = (y % 32) as u8;
        Rgba([
            base[0].saturating_sub(shade),
            base[1].saturating_add(shade),
            base[2],
            255,
        ])
    })
}

fn fnv1a_64(input: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in input {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn capture(filter: FilterDescriptor) -> Vec<u8> {
    let square = render_mirrored_square(&split_feed(), 600).expect("feed has area");
    encode_png(&apply_filter(square, filter)).expect("encode")
}

#[test]
fn every_filter_yields_an_opaque_600_square() {
    for filter in FilterDescriptor::ALL {
        let decoded = decode_rgba(&capture(filter)).expect("decode");
        assert_eq!(decoded.dimensions(), (600, 600), "{filter}");
        assert!(decoded.pixels().all(|p| p[3] == 255), "{filter}");
    }
}

#[test]
fn capture_signature_is_stable_across_runs() {
    for filter in FilterDescriptor::ALL {
        assert_eq!(fnv1a_64(&capture(filter)), fnv1a_64(&capture(filter)), "{filter}");
    }
}

#[test]
fn filters_produce_distinct_frames() {
    let signatures: Vec<u64> = FilterDescriptor::ALL
        .iter()
        .map(|f| fnv1a_64(&capture(*f)))
        .collect();
    for (i, a) in signatures.iter().enumerate() {
        for b in &signatures[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn unfiltered_capture_is_mirrored() {
    let decoded = decode_rgba(&capture(FilterDescriptor::None)).expect("decode");
    // Camera-left red ends up on the viewer's right.
    let left = decoded.get_pixel(50, 300);
    let right = decoded.get_pixel(550, 300);
    assert!(left[2] > left[0], "left should be blue, got {left:?}");
    assert!(right[0] > right[2], "right should be red, got {right:?}");
}

#[test]
fn grayscale_capture_has_no_chroma() {
    let decoded = decode_rgba(&capture(FilterDescriptor::Grayscale)).expect("decode");
    assert!(decoded.pixels().all(|p| p[0] == p[1] && p[1] == p[2]));
}

#[test]
fn sepia_tints_white_warm() {
    let white = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
    let out = apply_filter(white, FilterDescriptor::Sepia);
    let p = out.get_pixel(1, 1);
    assert_eq!((p[0], p[1]), (255, 255));
    assert!((238..=239).contains(&p[2]), "blue channel {}", p[2]);
}
