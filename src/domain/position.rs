//! Fixed-fractional position sizing.

use crate::domain::error::SwingError;

#[derive(Debug, Clone, PartialEq)]
pub struct PositionSizing {
    pub risk_per_share: f64,
    pub max_risk_amount: f64,
    pub quantity: u64,
    pub total_margin: f64,
}

/// Largest whole-share quantity whose loss at `stop` stays within
/// `risk_pct` percent of `capital`. Quantity is zero when entry equals stop.
pub fn position_size(
    capital: f64,
    risk_pct: f64,
    entry: f64,
    stop: f64,
) -> Result<PositionSizing, SwingError> {
    for (key, value) in [
        ("capital", capital),
        ("risk_pct", risk_pct),
        ("entry", entry),
        ("stop", stop),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(SwingError::invalid(
                "risk",
                key,
                format!("{key} must be a finite non-negative number"),
            ));
        }
    }

    let risk_per_share = (entry - stop).abs();
    let max_risk_amount = capital * (risk_pct / 100.0);
    let quantity = if risk_per_share > 0.0 {
        (max_risk_amount / risk_per_share).floor() as u64
    } else {
        0
    };

    Ok(PositionSizing {
        risk_per_share,
        max_risk_amount,
        quantity,
        total_margin: quantity as f64 * entry,
    })
}
