//! Simple Moving Average over a trailing window.
//!
//! SMA(n)[i] = sum(x[i-n+1..=i]) / n. Undefined (`None`) for the first n-1
//! indices.

pub fn calculate_sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            Some(window.iter().sum::<f64>() / period as f64)
        })
        .collect()
}
