use regex::Regex;
use std::sync::LazyLock;

static SHOP_PATH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/shop/(\d+)").unwrap());
static SHOP_QUERY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(shopid|sellerid)=(\d+)").unwrap());
static CATEGORY_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[._-]cat[._-]?(\d+)").unwrap());
static CATEGORY_QUERY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(category|catid)=(\d+)").unwrap());

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn capture_number(re: &Regex, text: &str, group: usize) -> Option<i64> {
    re.captures(text)
        .and_then(|caps| caps.get(group))
        .and_then(|m| m.as_str().parse().ok())
}

/// 從數字或商店網址取出 shopid
pub fn parse_shopid(input: &str) -> Option<i64> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    if is_digits(s) {
        return s.parse().ok();
    }
    capture_number(&SHOP_PATH_RE, s, 1).or_else(|| capture_number(&SHOP_QUERY_RE, s, 2))
}

/// 從數字或分類網址（`...-cat.12345`、`?category=12345`）取出分類 id
pub fn parse_category_id(input: &str) -> Option<i64> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    if is_digits(s) {
        return s.parse().ok();
    }
    capture_number(&CATEGORY_SLUG_RE, s, 1).or_else(|| capture_number(&CATEGORY_QUERY_RE, s, 2))
}

/// Price bounds accept plain digits only; anything else means "no bound".
pub fn parse_price(input: &str) -> Option<u64> {
    let s = input.trim();
    if is_digits(s) {
        s.parse().ok()
    } else {
        None
    }
}

pub fn parse_batch(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shopid() {
        assert_eq!(parse_shopid("  123456 "), Some(123456));
        assert_eq!(parse_shopid("https://shopee.co.th/shop/98765/search"), Some(98765));
        assert_eq!(parse_shopid("https://shopee.co.th/some-store?shopid=4321"), Some(4321));
        assert_eq!(parse_shopid("https://shopee.sg/x?SellerId=77"), Some(77));
        assert_eq!(parse_shopid(""), None);
        assert_eq!(parse_shopid("https://shopee.co.th/some-store"), None);
    }

    #[test]
    fn test_parse_category_id() {
        assert_eq!(parse_category_id("11044952"), Some(11044952));
        assert_eq!(
            parse_category_id("https://shopee.co.th/Mobile-Gadgets-cat.11044952"),
            Some(11044952)
        );
        assert_eq!(parse_category_id("https://shopee.vn/x-CAT-42"), Some(42));
        assert_eq!(parse_category_id("https://shopee.co.th/search?catid=555"), Some(555));
        assert_eq!(parse_category_id("https://shopee.co.th/search?Category=9"), Some(9));
        assert_eq!(parse_category_id("   "), None);
        assert_eq!(parse_category_id("phones"), None);
    }

    #[test]
    fn test_parse_price_requires_digits() {
        assert_eq!(parse_price("500"), Some(500));
        assert_eq!(parse_price(" 1200 "), Some(1200));
        assert_eq!(parse_price("12.5"), None);
        assert_eq!(parse_price("-3"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn test_parse_batch_skips_blank_lines() {
        let keywords = parse_batch("  iphone case \n\n\t\npower bank\r\n usb-c ");
        assert_eq!(keywords, vec!["iphone case", "power bank", "usb-c"]);
    }
}
