//! Bollinger Bands.
//!
//! - Middle: SMA(n) of close
//! - Upper: Middle + (multiplier x StdDev)
//! - Lower: Middle - (multiplier x StdDev)
//!
//! StdDev is the sample standard deviation (divides by n-1). A band is
//! undefined wherever either input is.

pub struct Bands {
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

pub fn calculate_bollinger(middle: &[Option<f64>], stddev: &[Option<f64>], mult: f64) -> Bands {
    let (upper, lower) = middle
        .iter()
        .zip(stddev)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => (Some(m + mult * s), Some(m - mult * s)),
            _ => (None, None),
        })
        .unzip();

    Bands { upper, lower }
}

/// (upper - lower) / middle at each index.
pub fn normalized_bandwidth(
    upper: &[Option<f64>],
    lower: &[Option<f64>],
    middle: &[Option<f64>],
) -> Vec<Option<f64>> {
    upper
        .iter()
        .zip(lower)
        .zip(middle)
        .map(|((u, l), m)| match (u, l, m) {
            (Some(u), Some(l), Some(m)) if *m != 0.0 => Some((u - l) / m),
            _ => None,
        })
        .collect()
}

/// Whether the latest bandwidth sits below its mean over the trailing
/// `lookback` values (undefined entries skipped). `None` when the latest
/// bandwidth is undefined.
pub fn squeeze_state(bandwidth: &[Option<f64>], lookback: usize) -> Option<bool> {
    let current = (*bandwidth.last()?)?;
    let start = bandwidth.len().saturating_sub(lookback);
    let defined: Vec<f64> = bandwidth[start..].iter().flatten().copied().collect();
    if defined.is_empty() {
        return None;
    }
    let mean = defined.iter().sum::<f64>() / defined.len() as f64;
    Some(current < mean)
}
