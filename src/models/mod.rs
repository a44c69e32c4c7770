mod content_entry;
mod plan;
mod product;
mod user;

pub use content_entry::{ContentEntry, ContentType};
pub use plan::Plan;
pub use product::Product;
pub use user::User;

/// Render an amount in cents as `12.50`.
pub fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_prices_with_two_decimals() {
        assert_eq!(format_price(0), "0.00");
        assert_eq!(format_price(2999), "29.99");
        assert_eq!(format_price(5), "0.05");
        assert_eq!(format_price(-150), "-1.50");
    }

    #[test]
    fn unknown_content_type_is_rejected() {
        assert_eq!("image".parse::<ContentType>(), Ok(ContentType::Image));
        assert!("video".parse::<ContentType>().is_err());
    }
}
