use chrono::{Local, Utc};

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Date and time stamps for quote history entries, in local time.
pub fn today_stamp() -> (String, String) {
    let now = Local::now();
    (
        now.format("%Y-%m-%d").to_string(),
        now.format("%H:%M:%S").to_string(),
    )
}

/// Indian-style digit grouping: last three digits, then pairs, so
/// 1234567.89 renders as "12,34,567.89".
pub fn format_inr(value: f64) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 2);
    for (i, digit) in digits.iter().enumerate() {
        grouped.push(*digit);
        let remaining = len - i - 1;
        if remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0) {
            grouped.push(',');
        }
    }

    let sign = if negative { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inr_grouping_matches_indian_convention() {
        assert_eq!(format_inr(0.0), "0.00");
        assert_eq!(format_inr(100.0), "100.00");
        assert_eq!(format_inr(1000.0), "1,000.00");
        assert_eq!(format_inr(23600.0), "23,600.00");
        assert_eq!(format_inr(123456.78), "1,23,456.78");
        assert_eq!(format_inr(1234567.89), "12,34,567.89");
    }

    #[test]
    fn inr_grouping_keeps_sign() {
        assert_eq!(format_inr(-8260.0), "-8,260.00");
    }
}
