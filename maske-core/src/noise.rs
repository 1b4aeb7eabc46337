//! 2D Value-Noise für animierte Render-Modi
//!
//! Zustandslos und deterministisch: gleiche Eingabe, gleicher Wert.

/// Versatz zwischen zwei Gitterzeilen beim Hashen der Ecken
const ROW_STRIDE: f32 = 12.345;

/// Größter f32-Wert unterhalb von 1.0
const BELOW_ONE: f32 = 0.999_999_94;

fn fract(x: f32) -> f32 {
    let f = x - libm::floorf(x);
    // x - floor(x) kann bei winzigen negativen x auf 1.0 runden
    if f >= 1.0 { 0.0 } else { f }
}

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Pseudo-Zufallswert eines Gitterpunkts in [0, 1)
fn hash(n: f32) -> f32 {
    fract(libm::sinf(n) * 43_758.547)
}

/// Wert des Noise-Felds an `(x, y)`, immer in [0, 1)
///
/// Hasht die vier Ecken der umgebenden Gitterzelle und interpoliert
/// bilinear mit geglätteten Anteilen (`3t² - 2t³`), dadurch stetig über
/// Zellgrenzen hinweg.
pub fn noise2d(x: f32, y: f32) -> f32 {
    let bx = libm::floorf(x);
    let by = libm::floorf(y);
    let fx = smoothstep(fract(x));
    let fy = smoothstep(fract(y));

    let corner = |dx: f32, dy: f32| hash(bx + dx + (by + dy) * ROW_STRIDE);

    let bottom = mix(corner(0.0, 0.0), corner(1.0, 0.0), fx);
    let top = mix(corner(0.0, 1.0), corner(1.0, 1.0), fx);

    mix(bottom, top, fy).clamp(0.0, BELOW_ONE)
}
