//! Plain text rendering of already computed views.
//!
//! Functions here never filter, sort or aggregate themselves; they only turn
//! a [`TablePage`], a list of assets or [`DashboardStats`] into text.
use std::fmt::Write;

use crate::datatypes::Asset;
use crate::format::{format_currency, format_date, format_percentage};
use crate::stats::{Cohort, DashboardStats};
use crate::table::{PageSize, SortColumn, SortDirection, SortOrder, TablePage};

const TABLE_COLUMNS: [(SortColumn, &str); 6] = [
    (SortColumn::Id, "ID"),
    (SortColumn::Name, "Name"),
    (SortColumn::Category, "Category"),
    (SortColumn::Value, "Value"),
    (SortColumn::PurchaseDate, "Purchase date"),
    (SortColumn::Description, "Description"),
];

/// Row of the asset table with every cell formatted for display
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Styling key of the category
    pub category_key: String,
    pub value: String,
    pub purchase_date: String,
    pub description: String,
}

impl TableRow {
    pub fn new(asset: &Asset, currency_symbol: &str) -> TableRow {
        TableRow {
            id: asset.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            name: asset.name.clone(),
            category: asset.category.name().to_string(),
            category_key: asset.category.key().to_string(),
            value: format_currency(asset.value, currency_symbol),
            purchase_date: format_date(&asset.purchase_date),
            description: asset.description.clone().unwrap_or_else(|| "-".to_string()),
        }
    }

    fn cells(&self) -> [&str; 6] {
        [
            self.id.as_str(),
            self.name.as_str(),
            self.category.as_str(),
            self.value.as_str(),
            self.purchase_date.as_str(),
            self.description.as_str(),
        ]
    }
}

fn width(text: &str) -> usize {
    text.chars().count()
}

fn pad(text: &str, width_: usize) -> String {
    let fill = width_.saturating_sub(width(text));
    format!("{}{}", text, " ".repeat(fill))
}

fn header_label(column: SortColumn, label: &str, sort: &SortOrder) -> String {
    if column != sort.column {
        return label.to_string();
    }
    match sort.direction {
        SortDirection::Ascending => format!("{} ^", label),
        SortDirection::Descending => format!("{} v", label),
    }
}

/// Summary line below the table, e.g. `Showing 26-50 of 60 records`
pub fn table_info(page: &TablePage) -> String {
    match page.shown {
        Some((first, last)) => format!(
            "Showing {}-{} of {} records",
            first, last, page.total_matched
        ),
        None => "Showing 0 records".to_string(),
    }
}

/// Page indicator, `None` if everything fits on one page
pub fn page_info(page: &TablePage, page_size: PageSize) -> Option<String> {
    match page_size {
        PageSize::Fixed(_) if page.total_pages > 1 => {
            Some(format!("Page {} of {}", page.page, page.total_pages))
        }
        _ => None,
    }
}

pub fn render_table(
    page: &TablePage,
    sort: &SortOrder,
    page_size: PageSize,
    currency_symbol: &str,
) -> String {
    let mut out = String::new();
    if page.items.is_empty() {
        out.push_str("No assets match the current filters.\n");
        out.push_str(&table_info(page));
        out.push('\n');
        return out;
    }
    let headers: Vec<String> = TABLE_COLUMNS
        .iter()
        .map(|(column, label)| header_label(*column, label, sort))
        .collect();
    let rows: Vec<TableRow> = page
        .items
        .iter()
        .map(|a| TableRow::new(a, currency_symbol))
        .collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| width(h)).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.cells().iter()) {
            *w = (*w).max(width(cell));
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, w)| pad(cell, *w))
            .collect::<Vec<String>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };
    out.push_str(&line(headers.iter().map(|h| h.as_str()).collect()));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');
    for row in &rows {
        out.push_str(&line(row.cells().to_vec()));
        out.push('\n');
    }
    out.push_str(&table_info(page));
    if let Some(info) = page_info(page, page_size) {
        out.push_str(", ");
        out.push_str(&info);
    }
    out.push('\n');
    out
}

/// Card view of a list of assets with count and total value in front
pub fn render_cards(assets: &[Asset], currency_symbol: &str) -> String {
    let mut out = String::new();
    let total: f64 = assets.iter().map(|a| a.value).sum();
    let _ = writeln!(
        out,
        "{} assets, total value {}",
        assets.len(),
        format_currency(total, currency_symbol)
    );
    if assets.is_empty() {
        out.push_str("No assets yet.\n");
        return out;
    }
    for asset in assets {
        out.push('\n');
        out.push_str(&render_asset(asset, currency_symbol));
    }
    out
}

/// Detail view of a single asset
pub fn render_asset(asset: &Asset, currency_symbol: &str) -> String {
    let mut out = String::new();
    let id = asset.id.map(|id| format!("#{} ", id)).unwrap_or_default();
    let _ = writeln!(out, "{}{} [{}]", id, asset.name, asset.category);
    let _ = writeln!(out, "  Value:         {}", format_currency(asset.value, currency_symbol));
    let _ = writeln!(out, "  Purchase date: {}", format_date(&asset.purchase_date));
    if let Some(description) = &asset.description {
        let _ = writeln!(out, "  Description:   {}", description);
    }
    out
}

fn render_cohort(out: &mut String, title: &str, cohort: &Cohort, currency_symbol: &str) {
    let _ = writeln!(out, "{}: {}", title, cohort.count);
    for asset in &cohort.top {
        let _ = writeln!(
            out,
            "  {} {}",
            pad(&asset.name, 30),
            format_currency(asset.value, currency_symbol)
        );
    }
}

pub fn render_dashboard(stats: &DashboardStats, currency_symbol: &str) -> String {
    let money = |amount: f64| format_currency(amount, currency_symbol);
    let summary = &stats.summary;
    let mut out = String::new();

    out.push_str("== Key figures ==\n");
    let _ = writeln!(out, "Total assets:   {}", summary.count);
    let _ = writeln!(out, "Total value:    {}", money(summary.total));
    let _ = writeln!(out, "Average value:  {}", money(summary.mean));
    match &summary.max {
        Some((name, value)) => {
            let _ = writeln!(out, "Highest value:  {} ({})", money(*value), name);
        }
        None => {
            let _ = writeln!(out, "Highest value:  {} (-)", money(0.0));
        }
    }

    out.push_str("\n== Categories ==\n");
    for (category, category_stats) in &stats.categories {
        let _ = writeln!(
            out,
            "{} {:>4}  {:>18}  {:>6}",
            pad(category.name(), 12),
            category_stats.count,
            money(category_stats.value),
            format_percentage(category_stats.percentage)
        );
    }

    out.push_str("\n== Values ==\n");
    let _ = writeln!(out, "Median:             {}", money(summary.median));
    let _ = writeln!(out, "Standard deviation: {}", money(summary.std_dev));
    let _ = writeln!(
        out,
        "Low / mid / high:   {} / {} / {}",
        stats.tiers.low, stats.tiers.mid, stats.tiers.high
    );
    for (bucket, count) in &stats.distribution {
        let _ = writeln!(out, "{} {}", pad(bucket.label, 8), "#".repeat(*count));
    }

    let _ = writeln!(out, "\n== Purchases per {} ==", stats.grouping);
    for (period, count) in &stats.timeline {
        let _ = writeln!(out, "{} {:>4}", pad(period, 8), count);
    }

    out.push_str("\n== Status ==\n");
    let _ = writeln!(out, "Active: {}", stats.cohorts.active);
    render_cohort(&mut out, "New (last 30 days)", &stats.cohorts.new, currency_symbol);
    render_cohort(&mut out, "Aging (3+ years)", &stats.cohorts.aging, currency_symbol);
    render_cohort(&mut out, "High value", &stats.cohorts.high_value, currency_symbol);
    out
}
