/// Formats a price the way pt-BR renders currency, e.g. `R$ 1.234,50`.
///
/// The gap after the symbol is a non-breaking space. Currencies without a known symbol are
/// prefixed with their ISO code.
pub fn format_currency(value: f64, currency: &str) -> String {
    if !value.is_finite() {
        return format!("{:.2}", value);
    }

    let symbol = match currency.trim().to_uppercase().as_str() {
        "BRL" => "R$".to_string(),
        "USD" => "US$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        other if other.is_empty() => "R$".to_string(),
        other => other.to_string(),
    };

    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}{}\u{a0}{},{:02}",
        sign,
        symbol,
        group_thousands(cents / 100),
        cents % 100
    )
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_brl() {
        assert_eq!(format_currency(0.0, "BRL"), "R$\u{a0}0,00");
        assert_eq!(format_currency(7.5, "BRL"), "R$\u{a0}7,50");
        assert_eq!(format_currency(1234.5, "BRL"), "R$\u{a0}1.234,50");
        assert_eq!(format_currency(1234567.891, "brl"), "R$\u{a0}1.234.567,89");
        assert_eq!(format_currency(-5.0, "BRL"), "-R$\u{a0}5,00");
    }

    #[test]
    fn unknown_currency_uses_code() {
        assert_eq!(format_currency(10.0, "JPY"), "JPY\u{a0}10,00");
        assert_eq!(format_currency(10.0, "USD"), "US$\u{a0}10,00");
        assert_eq!(format_currency(f64::NAN, "BRL"), "NaN");
    }
}
