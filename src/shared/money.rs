//! Money display helpers

use crate::domain::pricing::Money;

/// Format an amount in minor units as a human-readable string,
/// e.g. `12345, "NGN"` → `"123.45 NGN"`.
pub fn format_minor_units(amount: Money, currency: &str) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{}{}.{:02} {}", sign, abs / 100, abs % 100, currency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_major_and_minor_units() {
        assert_eq!(format_minor_units(12345, "NGN"), "123.45 NGN");
        assert_eq!(format_minor_units(124_200, "NGN"), "1242.00 NGN");
        assert_eq!(format_minor_units(0, "NGN"), "0.00 NGN");
        assert_eq!(format_minor_units(7, "USD"), "0.07 USD");
    }

    #[test]
    fn keeps_sign_for_negative_amounts() {
        assert_eq!(format_minor_units(-5, "NGN"), "-0.05 NGN");
        assert_eq!(format_minor_units(-12345, "NGN"), "-123.45 NGN");
    }
}
