//! Exponential Moving Average.
//!
//! alpha = 2/(span+1), EMA[0] = x[0], EMA[i] = alpha*x[i] + (1-alpha)*EMA[i-1].
//! Seeded with the first value and never bias-corrected, so every index
//! carries a value; the first ~2*span values still lean on the seed.

pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let Some(&seed) = values.first() else {
        return out;
    };

    let alpha = smoothing_factor(span);
    let mut ema = seed;
    out.push(ema);
    for &x in &values[1..] {
        ema = alpha * x + (1.0 - alpha) * ema;
        out.push(ema);
    }
    out
}

pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}
