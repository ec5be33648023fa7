use crate::domain::model::Product;
use std::fmt::Write;

const TITLE_WIDTH: usize = 40;
const SHOP_WIDTH: usize = 20;

/// 1234567 -> "1,234,567"
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn price_text(product: &Product) -> String {
    if product.price_min != product.price_max {
        format!(
            "{:.2} - {:.2} {}",
            product.price_min, product.price_max, product.currency
        )
    } else {
        format!("{:.2} {}", product.price, product.currency)
    }
}

pub fn rating_text(product: &Product) -> String {
    if product.rating_count > 0 {
        format!("{:.2} / {} reviews", product.rating, product.rating_count)
    } else {
        format!("{:.2}", product.rating)
    }
}

fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{}{}", text, " ".repeat(width - count))
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

/// Terminal table of results, one product per line.
pub fn render_table(products: &[Product]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} {:>12} {:<26} {:<22} {:<50} {}",
        fit("title", TITLE_WIDTH),
        fit("shop", SHOP_WIDTH),
        "sold",
        "price",
        "rating",
        "url",
        "query"
    );

    for p in products {
        let _ = writeln!(
            out,
            "{} {} {:>12} {:<26} {:<22} {:<50} {}",
            fit(&p.title, TITLE_WIDTH),
            fit(p.shop_name.as_deref().unwrap_or(""), SHOP_WIDTH),
            format_thousands(p.historical_sold),
            price_text(p),
            rating_text(p),
            p.url,
            p.query.as_deref().unwrap_or("")
        );
    }

    let _ = writeln!(out, "found {} items", products.len());
    out
}
