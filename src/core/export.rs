use crate::domain::model::{Product, PRODUCT_COLUMNS};
use crate::utils::error::{Result, ScraperError};
use crate::utils::validation::validate_file_extension;
use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;

pub const DEFAULT_OUTPUT: &str = "shopee_bestsellers.xlsx";
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "csv", "json"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Json,
}

impl ExportFormat {
    /// 依副檔名決定匯出格式
    pub fn from_path(path: &str) -> Result<Self> {
        validate_file_extension("output", path, SUPPORTED_EXTENSIONS)?;
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            Ok(ExportFormat::Csv)
        } else if lower.ends_with(".json") {
            Ok(ExportFormat::Json)
        } else {
            Ok(ExportFormat::Xlsx)
        }
    }
}

#[derive(Serialize)]
struct JsonExport<'a> {
    fetched_at: DateTime<Utc>,
    count: usize,
    products: &'a [Product],
}

pub fn render(products: &[Product], format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => render_csv(products),
        ExportFormat::Xlsx => render_xlsx(products),
        ExportFormat::Json => render_json(products),
    }
}

/// CSV with a UTF-8 BOM so spreadsheet apps detect Thai text correctly.
pub fn render_csv(products: &[Product]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(UTF8_BOM.to_vec());

    writer.write_record(PRODUCT_COLUMNS)?;
    for product in products {
        writer.serialize(product)?;
    }

    writer.into_inner().map_err(|e| {
        ScraperError::IoError(std::io::Error::new(e.error().kind(), e.error().to_string()))
    })
}

pub fn render_xlsx(products: &[Product]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Best sellers")?;

    for (col, name) in PRODUCT_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }
    worksheet.set_column_width(0, 50)?;
    worksheet.set_column_width(13, 45)?;
    worksheet.set_freeze_panes(1, 0)?;

    for (index, p) in products.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_string(row, 0, &p.title)?;
        worksheet.write_number(row, 1, p.itemid as f64)?;
        worksheet.write_number(row, 2, p.shopid as f64)?;
        if let Some(shop_name) = &p.shop_name {
            worksheet.write_string(row, 3, shop_name)?;
        }
        worksheet.write_number(row, 4, p.price)?;
        worksheet.write_number(row, 5, p.price_min)?;
        worksheet.write_number(row, 6, p.price_max)?;
        worksheet.write_string(row, 7, &p.currency)?;
        worksheet.write_number(row, 8, p.historical_sold as f64)?;
        if let Some(sold) = p.sold_recent {
            worksheet.write_number(row, 9, sold as f64)?;
        }
        worksheet.write_number(row, 10, p.rating)?;
        worksheet.write_number(row, 11, p.rating_count as f64)?;
        worksheet.write_number(row, 12, p.stock as f64)?;
        worksheet.write_string(row, 13, &p.url)?;
        if let Some(query) = &p.query {
            worksheet.write_string(row, 14, query)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

pub fn render_json(products: &[Product]) -> Result<Vec<u8>> {
    let export = JsonExport {
        fetched_at: Utc::now(),
        count: products.len(),
        products,
    };
    Ok(serde_json::to_vec_pretty(&export)?)
}
