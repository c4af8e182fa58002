//! Display formatting for release data.

use chrono::NaiveDate;

/// Currency a price is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
  Usd,
  Gbp,
}

impl Currency {
  fn symbol(self) -> &'static str {
    match self {
      Currency::Usd => "$",
      Currency::Gbp => "£",
    }
  }
}

/// "Jun 5, 2024"
pub fn format_date(date: NaiveDate) -> String {
  date.format("%b %-d, %Y").to_string()
}

/// "$1,234.99", or "N/A" when the price is missing or zero.
pub fn format_price(price: Option<f64>, currency: Currency) -> String {
  match price {
    Some(p) if p.is_finite() && p != 0.0 => {
      let fixed = format!("{:.2}", p.abs());
      let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
      let sign = if p < 0.0 { "-" } else { "" };
      format!("{sign}{}{}.{cents}", currency.symbol(), group_thousands(whole))
    }
    _ => "N/A".to_string(),
  }
}

fn group_thousands(digits: &str) -> String {
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(c);
  }
  out
}

/// Turn a "YYYY-MM" key into "June 2024". Anything unparsable is returned as is.
pub fn format_month_year(month: &str) -> String {
  NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
    .map(|d| d.format("%B %Y").to_string())
    .unwrap_or_else(|_| month.to_string())
}
