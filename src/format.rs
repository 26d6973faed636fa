//! Presentation helpers for amounts and dates, nothing here is persisted
use chrono::NaiveDate;

pub const DEFAULT_CURRENCY_SYMBOL: &str = "¥";

/// Format an amount with two decimals, thousands separators and a leading
/// currency symbol, e.g. `¥18,999.00`
pub fn format_currency(amount: f64, symbol: &str) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));
    let len = int_part.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 && formatted != "0.00" {
        "-"
    } else {
        ""
    };
    format!("{}{}{}.{}", sign, symbol, grouped, frac_part)
}

pub fn format_percentage(percentage: f64) -> String {
    format!("{:.1}%", percentage)
}

/// Long date as shown in tables and cards, e.g. `March 15, 2023`
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_grouping() {
        assert_eq!(format_currency(18999.0, "¥"), "¥18,999.00");
        assert_eq!(format_currency(0.0, "¥"), "¥0.00");
        assert_eq!(format_currency(999.5, "$"), "$999.50");
        assert_eq!(format_currency(1234567.891, "¥"), "¥1,234,567.89");
        assert_eq!(format_currency(100000.0, ""), "100,000.00");
        assert_eq!(format_currency(-2500.0, "¥"), "-¥2,500.00");
        assert_eq!(format_currency(-0.001, "¥"), "¥0.00");
    }

    #[test]
    fn percentage_and_date() {
        assert_eq!(format_percentage(33.333), "33.3%");
        assert_eq!(format_percentage(0.0), "0.0%");
        let date = NaiveDate::from_ymd_opt(2023, 3, 5).unwrap();
        assert_eq!(format_date(&date), "March 5, 2023");
    }
}
