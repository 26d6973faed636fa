//! Export of the visible asset list and of the dashboard report as CSV.
//!
//! Files are UTF-8 with a byte order mark so spreadsheet programs pick the
//! right encoding, every field is double quoted and embedded quotes are doubled.
use std::io::{Read, Write};

use chrono::{NaiveDate, NaiveDateTime};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use log::info;
use thiserror::Error;

use crate::datatypes::date_time_helper::parse_date;
use crate::datatypes::{Asset, Category};
use crate::format::{format_currency, format_percentage};
use crate::stats::DashboardStats;

pub const BYTE_ORDER_MARK: &str = "\u{feff}";
pub const ASSET_HEADER: [&str; 6] = ["ID", "Name", "Category", "Value", "Purchase Date", "Description"];
pub const ASSET_FILE_PREFIX: &str = "assets";
pub const REPORT_FILE_PREFIX: &str = "asset_report";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("there is no data to export")]
    NothingToExport,
    #[error("CSV processing failed")]
    Csv(#[from] csv::Error),
    #[error("writing export failed")]
    Io(#[from] std::io::Error),
    #[error("export is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("invalid record in line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },
}

/// File name of an export created on `date`, e.g. `assets_2026-10-17.csv`
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, date.format("%Y-%m-%d"))
}

fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(writer)
}

/// Write `assets` in the given order, one row per asset after the header row
pub fn write_assets_csv<W: Write>(assets: &[Asset], mut writer: W) -> Result<(), ExportError> {
    if assets.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    writer.write_all(BYTE_ORDER_MARK.as_bytes())?;
    let mut csv = csv_writer(writer);
    csv.write_record(ASSET_HEADER)?;
    for asset in assets {
        csv.write_record([
            asset.id.map(|id| id.to_string()).unwrap_or_default(),
            asset.name.clone(),
            asset.category.name().to_string(),
            asset.value.to_string(),
            asset.purchase_date.format("%Y-%m-%d").to_string(),
            asset.description.clone().unwrap_or_default(),
        ])?;
    }
    csv.flush()?;
    info!("exported {} assets", assets.len());
    Ok(())
}

pub fn assets_csv_string(assets: &[Asset]) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_assets_csv(assets, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

fn invalid(record: &StringRecord, reason: String) -> ExportError {
    ExportError::InvalidRecord {
        line: record.position().map(|p| p.line()).unwrap_or(0),
        reason,
    }
}

fn field<'a>(record: &'a StringRecord, idx: usize) -> Result<&'a str, ExportError> {
    record
        .get(idx)
        .ok_or_else(|| invalid(record, format!("missing column '{}'", ASSET_HEADER[idx])))
}

fn record_to_asset(record: &StringRecord) -> Result<Asset, ExportError> {
    let id = match field(record, 0)?.trim() {
        "" => None,
        id => Some(
            id.parse()
                .map_err(|_| invalid(record, format!("invalid id '{}'", id)))?,
        ),
    };
    let category =
        Category::from_wire(field(record, 2)?).map_err(|e| invalid(record, e.to_string()))?;
    let value_str = field(record, 3)?;
    let value = value_str
        .trim()
        .parse()
        .map_err(|_| invalid(record, format!("invalid value '{}'", value_str)))?;
    let purchase_date = parse_date(field(record, 4)?).map_err(|e| invalid(record, e.to_string()))?;
    let description = match field(record, 5)? {
        "" => None,
        text => Some(text.to_string()),
    };
    Ok(Asset::new(
        id,
        field(record, 1)?,
        category,
        value,
        purchase_date,
        description,
    ))
}

/// Read assets back from a file written by [`write_assets_csv`]
pub fn read_assets_csv<R: Read>(mut reader: R) -> Result<Vec<Asset>, ExportError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let text = text.trim_start_matches(BYTE_ORDER_MARK);
    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    let mut assets = Vec::new();
    for record in csv.records() {
        assets.push(record_to_asset(&record?)?);
    }
    Ok(assets)
}

/// Write the dashboard report: key figures followed by the category table
pub fn write_report_csv<W: Write>(
    stats: &DashboardStats,
    generated_at: NaiveDateTime,
    currency_symbol: &str,
    mut writer: W,
) -> Result<(), ExportError> {
    if stats.summary.count == 0 {
        return Err(ExportError::NothingToExport);
    }
    writer.write_all(BYTE_ORDER_MARK.as_bytes())?;
    let mut csv = csv_writer(writer);
    let money = |amount: f64| format_currency(amount, currency_symbol);

    csv.write_record(["Asset report"])?;
    csv.write_record([
        "Generated at".to_string(),
        generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    ])?;
    csv.write_record([""])?;
    csv.write_record(["Key figures"])?;
    csv.write_record(["Total assets".to_string(), stats.summary.count.to_string()])?;
    csv.write_record(["Total value".to_string(), money(stats.summary.total)])?;
    csv.write_record(["Average value".to_string(), money(stats.summary.mean)])?;
    csv.write_record([""])?;
    csv.write_record(["Category distribution"])?;
    csv.write_record(["Category", "Count", "Value", "Share"])?;
    for (category, category_stats) in &stats.categories {
        csv.write_record([
            category.name().to_string(),
            category_stats.count.to_string(),
            money(category_stats.value),
            format_percentage(category_stats.percentage),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::TimeGrouping;

    fn assets() -> Vec<Asset> {
        vec![
            Asset::new(
                Some(1),
                r#"Dell "UltraSharp" 32"#,
                Category::Electronics,
                3299.0,
                NaiveDate::from_ymd_opt(2023, 8, 10).unwrap(),
                Some("4K, USB-C\nsecond line".to_string()),
            ),
            Asset::new(
                Some(7),
                "Sofa",
                Category::Unlisted("家居".to_string()),
                6500.25,
                NaiveDate::from_ymd_opt(2022, 11, 11).unwrap(),
                None,
            ),
        ]
    }

    #[test]
    fn write_quoted_rows_with_bom() {
        let text = assets_csv_string(&assets()).unwrap();
        assert!(text.starts_with(BYTE_ORDER_MARK));
        let mut lines = text.trim_start_matches(BYTE_ORDER_MARK).lines();
        assert_eq!(
            lines.next().unwrap(),
            r#""ID","Name","Category","Value","Purchase Date","Description""#
        );
        assert_eq!(
            lines.next().unwrap(),
            r#""1","Dell ""UltraSharp"" 32","电子设备","3299","2023-08-10","4K, USB-C"#
        );
        assert!(text.contains(r#""7","Sofa","家居","6500.25","2022-11-11","""#));
    }

    #[test]
    fn read_back_exported_assets() {
        let original = assets();
        let text = assets_csv_string(&original).unwrap();
        let parsed = read_assets_csv(text.as_bytes()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn nothing_to_export() {
        let result = assets_csv_string(&[]);
        assert!(matches!(result, Err(ExportError::NothingToExport)));
    }

    #[test]
    fn reject_broken_records() {
        let text = "\"ID\",\"Name\",\"Category\",\"Value\",\"Purchase Date\",\"Description\"\n\
                    \"1\",\"Desk\",\"家具\",\"cheap\",\"2023-01-01\",\"\"\n";
        let result = read_assets_csv(text.as_bytes());
        assert!(matches!(result, Err(ExportError::InvalidRecord { line: 2, .. })));
    }

    #[test]
    fn file_names_carry_the_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(export_file_name(ASSET_FILE_PREFIX, date), "assets_2026-10-17.csv");
        assert_eq!(
            export_file_name(REPORT_FILE_PREFIX, date),
            "asset_report_2026-10-17.csv"
        );
    }

    #[test]
    fn write_report() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let stats = DashboardStats::compute(&assets(), TimeGrouping::Year, today).unwrap();
        let generated_at = today.and_hms_opt(9, 30, 0).unwrap();
        let mut buf = Vec::new();
        write_report_csv(&stats, generated_at, "¥", &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"Generated at\",\"2026-10-17 09:30:00\"\n"));
        assert!(text.contains("\"Total assets\",\"2\"\n"));
        assert!(text.contains("\"Total value\",\"¥9,799.25\"\n"));
        assert!(text.contains("\"电子设备\",\"1\",\"¥3,299.00\",\"33.7%\"\n"));

        let empty = DashboardStats::compute(&[], TimeGrouping::Year, today).unwrap();
        let result = write_report_csv(&empty, generated_at, "¥", Vec::new());
        assert!(matches!(result, Err(ExportError::NothingToExport)));
    }
}
