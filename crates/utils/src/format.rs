//! Formatting utilities — USD amounts, addresses.

use rust_decimal::Decimal;

const THOUSAND: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);
const MILLION: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
const CENT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Format a USD amount compactly: `$1.2M`, `$45.3K`, `$12.34`, and
/// extra precision below one cent so dust prices stay readable.
pub fn format_usd(value: Decimal) -> String {
    let negative = value.is_sign_negative();
    let abs = value.abs();

    let body = if abs >= MILLION {
        format!("{:.1}M", abs / MILLION)
    } else if abs >= THOUSAND {
        format!("{:.1}K", abs / THOUSAND)
    } else if abs >= CENT || abs.is_zero() {
        format!("{:.2}", abs)
    } else {
        format!("{:.6}", abs)
    };

    if negative {
        format!("-${body}")
    } else {
        format!("${body}")
    }
}

/// Shorten a hex address for table display: `0x1234…cdef`.
/// Counts characters, not bytes, so arbitrary CLI input cannot split a
/// multi-byte character.
pub fn short_addr(address: &str) -> String {
    let count = address.chars().count();
    if count <= 12 {
        return address.to_string();
    }
    let head: String = address.chars().take(6).collect();
    let tail: String = address.chars().skip(count - 4).collect();
    format!("{head}…{tail}")
}
