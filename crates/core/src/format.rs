//! Display helpers shared by every frontend.

use chrono::NaiveDate;

/// Whole units with thousands separators, e.g. `1234567.6` → `"1,234,568"`.
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return "0".to_string();
    }
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Table date column, e.g. `"2024/01/05(Fri)"`. Missing dates render empty.
pub fn format_date_with_weekday(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y/%m/%d(%a)").to_string())
        .unwrap_or_default()
}
