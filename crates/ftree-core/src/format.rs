//! Human-readable probability strings for logs and reports.

/// Values below this render in mantissa × 10^exponent form.
const SCIENTIFIC_THRESHOLD: f64 = 1e-4;

/// Format a probability for display.
///
/// - `None` or exactly zero: `"0"`
/// - positive and below `1e-4`: one-decimal mantissa, e.g. `"2.5×10^-6"`
/// - otherwise: four fixed decimals, e.g. `"0.0300"`, exact ties
///   rounded away from zero (`0.03125` → `"0.0313"`)
///
/// Negative and non-finite values use the fixed form. Only used for
/// display; analysis math never goes through strings.
#[must_use]
pub fn format_probability(prob: Option<f64>) -> String {
    let Some(p) = prob else {
        return "0".to_string();
    };
    if p == 0.0 {
        return "0".to_string();
    }

    if p > 0.0 && p < SCIENTIFIC_THRESHOLD {
        let exp = p.log10().floor();
        let mantissa = p / 10_f64.powf(exp);
        #[allow(clippy::cast_possible_truncation)]
        let exp = exp as i32;
        return format!("{mantissa:.1}×10^{exp}");
    }

    to_fixed4(p)
}

/// Four fixed decimals, with exact ties rounded away from zero.
///
/// `{:.4}` rounds ties to even. A value is an exact tie at four decimals
/// only when it is an odd multiple of 1/32, so those are rounded by hand.
fn to_fixed4(p: f64) -> String {
    let scaled = p.abs() * 32.0;
    let is_tie = p.is_finite() && scaled.fract() == 0.0 && (scaled / 2.0).fract() != 0.0;
    if !is_tie {
        return format!("{p:.4}");
    }

    // Exact: |p| * 10^4 is an odd multiple of 312.5, well inside u64.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let units = (p.abs() * 10_000.0 + 0.5) as u64;
    let sign = if p < 0.0 { "-" } else { "" };
    format!("{sign}{}.{:04}", units / 10_000, units % 10_000)
}
