//! # Similarity Scorer
//!
//! Compares two raster images and yields one scalar in [0, 1], where 1.0
//! is identical structure. Both inputs are normalized to a 300x300
//! luminance plane first, so the score reflects structural content rather
//! than resolution or color noise.
//!
//! Decode failures score 0 instead of erroring: a corrupt blob must never
//! look like a match and must never abort a candidate scan.

use image::imageops::FilterType;
use image::GrayImage;

/// Canonical square edge both images are resized to before comparison.
pub const CANONICAL_SIZE: u32 = 300;

/// Sliding window edge for the structural index.
const WINDOW: u32 = 7;

// Standard SSIM stabilizers for 8-bit dynamic range:
// C1 = (0.01 * 255)^2, C2 = (0.03 * 255)^2.
const C1: f64 = 6.5025;
const C2: f64 = 58.5225;

/// Scores two encoded images. Deterministic, no side effects.
pub fn score(image_a: &[u8], image_b: &[u8]) -> f64 {
    match (normalize(image_a), normalize(image_b)) {
        (Some(a), Some(b)) => mean_ssim(&a, &b),
        _ => 0.0,
    }
}

/// Decode, resize to the canonical square, reduce to 8-bit luminance.
fn normalize(bytes: &[u8]) -> Option<GrayImage> {
    let img = image::load_from_memory(bytes).ok()?;
    Some(
        img.resize_exact(CANONICAL_SIZE, CANONICAL_SIZE, FilterType::Triangle)
            .to_luma8(),
    )
}

/// Mean of the per-window SSIM index over every WINDOW x WINDOW position,
/// clamped to [0, 1] (the raw index can go negative for anti-correlated
/// windows, which for our purposes is just "not a match").
fn mean_ssim(a: &GrayImage, b: &GrayImage) -> f64 {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let (width, height) = a.dimensions();
    let (width, height) = (width as usize, height as usize);
    let win = WINDOW as usize;
    let pa = a.as_raw();
    let pb = b.as_raw();
    let n = (win * win) as f64;

    let mut total = 0.0;
    let mut windows = 0u64;

    for y in 0..=(height - win) {
        for x in 0..=(width - win) {
            let (mut sa, mut sb, mut saa, mut sbb, mut sab) = (0.0, 0.0, 0.0, 0.0, 0.0);
            for dy in 0..win {
                let row = (y + dy) * width + x;
                for dx in 0..win {
                    let va = pa[row + dx] as f64;
                    let vb = pb[row + dx] as f64;
                    sa += va;
                    sb += vb;
                    saa += va * va;
                    sbb += vb * vb;
                    sab += va * vb;
                }
            }
            let ma = sa / n;
            let mb = sb / n;
            let var_a = saa / n - ma * ma;
            let var_b = sbb / n - mb * mb;
            let cov = sab / n - ma * mb;
            total += ((2.0 * ma * mb + C1) * (2.0 * cov + C2))
                / ((ma * ma + mb * mb + C1) * (var_a + var_b + C2));
            windows += 1;
        }
    }

    (total / windows as f64).clamp(0.0, 1.0)
}
