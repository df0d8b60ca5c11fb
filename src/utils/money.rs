// Currency amounts travel as f64 through the entity store, so every
// computed amount is normalized to cents before it is persisted.

/// Round an amount to two decimal places (cents).
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Format an amount the way it appears in payout notes and emails.
pub fn format_usd(amount: f64) -> String {
    format!("${:.2}", amount)
}
