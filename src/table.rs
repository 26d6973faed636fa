//! Filtering, sorting and paging of the cached asset list
use std::cmp::Ordering;
use std::fmt;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

use crate::datatypes::{Asset, Category};

pub const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("page {page} is out of range, there are {total_pages} pages")]
    PageOutOfRange { page: usize, total_pages: usize },
    #[error("unknown sort column '{0}'")]
    UnknownColumn(String),
    #[error("invalid page size '{0}', expected a positive number or 'all'")]
    InvalidPageSize(String),
}

/// Conjunction of optional predicates, an unset predicate matches everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetFilter {
    /// Case insensitive substring of name, category or description
    pub search: Option<String>,
    pub category: Option<Category>,
    /// Inclusive lower value bound
    pub min_value: Option<f64>,
    /// Inclusive upper value bound
    pub max_value: Option<f64>,
    /// Inclusive first purchase date
    pub start_date: Option<NaiveDate>,
    /// Inclusive last purchase date
    pub end_date: Option<NaiveDate>,
}

impl AssetFilter {
    pub fn is_empty(&self) -> bool {
        *self == AssetFilter::default()
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    }

    pub fn matches(&self, asset: &Asset) -> bool {
        self.matches_term(asset, self.search_term().as_deref())
    }

    fn matches_term(&self, asset: &Asset, term: Option<&str>) -> bool {
        if let Some(term) = term {
            let found = asset.name.to_lowercase().contains(term)
                || asset.category.name().to_lowercase().contains(term)
                || asset
                    .description
                    .as_deref()
                    .map_or(false, |d| d.to_lowercase().contains(term));
            if !found {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if asset.category != *category {
                return false;
            }
        }
        if self.min_value.map_or(false, |min| asset.value < min) {
            return false;
        }
        if self.max_value.map_or(false, |max| asset.value > max) {
            return false;
        }
        if self.start_date.map_or(false, |start| asset.purchase_date < start) {
            return false;
        }
        if self.end_date.map_or(false, |end| asset.purchase_date > end) {
            return false;
        }
        true
    }

    /// Matching assets in list order
    pub fn apply(&self, assets: &[Asset]) -> Vec<Asset> {
        let term = self.search_term();
        assets
            .iter()
            .filter(|a| self.matches_term(a, term.as_deref()))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Name,
    Category,
    Value,
    PurchaseDate,
    Description,
}

impl FromStr for SortColumn {
    type Err = TableError;

    fn from_str(s: &str) -> Result<SortColumn, TableError> {
        match s.to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "category" => Ok(Self::Category),
            "value" => Ok(Self::Value),
            "purchase_date" | "date" => Ok(Self::PurchaseDate),
            "description" => Ok(Self::Description),
            _ => Err(TableError::UnknownColumn(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> SortDirection {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder {
            column: SortColumn::Id,
            direction: SortDirection::Ascending,
        }
    }
}

fn lowercase(text: Option<&str>) -> String {
    text.unwrap_or_default().to_lowercase()
}

impl SortOrder {
    /// Compare by the sort column, numerically for id and value, by calendar
    /// for the purchase date and case insensitive for text columns
    pub fn compare(&self, a: &Asset, b: &Asset) -> Ordering {
        let ordering = match self.column {
            SortColumn::Id => a.id.cmp(&b.id),
            SortColumn::Value => a.value.total_cmp(&b.value),
            SortColumn::PurchaseDate => a.purchase_date.cmp(&b.purchase_date),
            SortColumn::Name => lowercase(Some(a.name.as_str())).cmp(&lowercase(Some(b.name.as_str()))),
            SortColumn::Category => lowercase(Some(a.category.name()))
                .cmp(&lowercase(Some(b.category.name()))),
            SortColumn::Description => {
                lowercase(a.description.as_deref()).cmp(&lowercase(b.description.as_deref()))
            }
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    pub fn sort(&self, assets: &mut [Asset]) {
        assets.sort_by(|a, b| self.compare(a, b));
    }

    /// Next order after the user picked `column`: the same column flips its
    /// direction, a new column starts ascending
    pub fn select(&self, column: SortColumn) -> SortOrder {
        if self.column == column {
            SortOrder {
                column,
                direction: self.direction.toggled(),
            }
        } else {
            SortOrder {
                column,
                direction: SortDirection::Ascending,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Fixed(NonZeroUsize),
    /// A single page holding every row
    All,
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Fixed(NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN))
    }
}

impl PageSize {
    pub fn total_pages(&self, rows: usize) -> usize {
        match self {
            Self::Fixed(size) => rows.div_ceil(size.get()),
            Self::All => 1,
        }
    }

    /// Index range of the rows on the 1-based `page`, clipped to `rows`
    pub fn window(&self, page: usize, rows: usize) -> Range<usize> {
        match self {
            Self::Fixed(size) => {
                let start = page.saturating_sub(1).saturating_mul(size.get()).min(rows);
                let end = start.saturating_add(size.get()).min(rows);
                start..end
            }
            Self::All => 0..rows,
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Fixed(size) => write!(f, "{}", size),
            Self::All => write!(f, "all"),
        }
    }
}

impl FromStr for PageSize {
    type Err = TableError;

    fn from_str(s: &str) -> Result<PageSize, TableError> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(PageSize::All);
        }
        s.parse::<NonZeroUsize>()
            .map(PageSize::Fixed)
            .map_err(|_| TableError::InvalidPageSize(s.to_string()))
    }
}

/// Filter, sort and take one page of `assets`.
/// Returns the rows of the page together with the number of matching assets.
pub fn apply(
    assets: &[Asset],
    filter: &AssetFilter,
    sort: &SortOrder,
    page_size: PageSize,
    page: usize,
) -> (Vec<Asset>, usize) {
    let mut matched = filter.apply(assets);
    sort.sort(&mut matched);
    let total = matched.len();
    let window = page_size.window(page, total);
    let items = matched.drain(window).collect();
    (items, total)
}

/// One page of the table as handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct TablePage {
    pub items: Vec<Asset>,
    pub total_matched: usize,
    pub page: usize,
    pub total_pages: usize,
    /// 1-based index of the first and last row shown, `None` if empty
    pub shown: Option<(usize, usize)>,
}

/// View state of the table, owned by the controller.
/// Changing the filter, the sort order or the page size returns to page 1.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    filter: AssetFilter,
    sort: SortOrder,
    page_size: PageSize,
    page: usize,
}

impl Default for TableView {
    fn default() -> Self {
        TableView::new(PageSize::default())
    }
}

impl TableView {
    pub fn new(page_size: PageSize) -> TableView {
        TableView {
            filter: AssetFilter::default(),
            sort: SortOrder::default(),
            page_size,
            page: 1,
        }
    }

    pub fn filter(&self) -> &AssetFilter {
        &self.filter
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_filter(&mut self, filter: AssetFilter) {
        self.filter = filter;
        self.page = 1;
    }

    pub fn set_search(&mut self, term: &str) {
        self.filter.search = Some(term.to_string()).filter(|t| !t.trim().is_empty());
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.set_filter(AssetFilter::default());
    }

    /// Sort by `column`, flipping the direction if it is already the sort column
    pub fn sort_by(&mut self, column: SortColumn) {
        self.sort = self.sort.select(column);
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        self.page = 1;
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.page = 1;
    }

    /// Back to the first page, e.g. after the cache has been reloaded
    pub fn reset_page(&mut self) {
        self.page = 1;
    }

    /// Switch to `page` of the current result, out of range requests leave the
    /// view unchanged
    pub fn goto_page(&mut self, page: usize, assets: &[Asset]) -> Result<(), TableError> {
        let total_pages = self.page_size.total_pages(self.filter.apply(assets).len());
        if page < 1 || page > total_pages {
            return Err(TableError::PageOutOfRange { page, total_pages });
        }
        self.page = page;
        Ok(())
    }

    pub fn next_page(&mut self, assets: &[Asset]) -> Result<(), TableError> {
        self.goto_page(self.page + 1, assets)
    }

    pub fn prev_page(&mut self, assets: &[Asset]) -> Result<(), TableError> {
        self.goto_page(self.page.saturating_sub(1), assets)
    }

    /// Rows currently matched by the filter in sort order, without paging
    pub fn visible(&self, assets: &[Asset]) -> Vec<Asset> {
        let mut matched = self.filter.apply(assets);
        self.sort.sort(&mut matched);
        matched
    }

    pub fn current_page(&self, assets: &[Asset]) -> TablePage {
        let (items, total_matched) = apply(assets, &self.filter, &self.sort, self.page_size, self.page);
        let window = self.page_size.window(self.page, total_matched);
        TablePage {
            shown: if items.is_empty() {
                None
            } else {
                Some((window.start + 1, window.end))
            },
            items,
            total_matched,
            page: self.page,
            total_pages: self.page_size.total_pages(total_matched),
        }
    }
}
