//! Sample assets for filling an empty asset service
use chrono::NaiveDate;
use log::{info, warn};

use crate::datatypes::{Asset, AssetHandler, Category};
use crate::stats::{category_breakdown, CategoryStats};

fn sample(
    name: &str,
    category: Category,
    value: f64,
    (year, month, day): (i32, u32, u32),
    description: &str,
) -> Option<Asset> {
    Some(Asset::new(
        None,
        name,
        category,
        value,
        NaiveDate::from_ymd_opt(year, month, day)?,
        Some(description.to_string()),
    ))
}

/// Fixed set of assets covering every known category
pub fn sample_assets() -> Vec<Asset> {
    [
        sample("MacBook Pro 16", Category::Electronics, 18999.0, (2023, 3, 15), "M2 Max, 32GB"),
        sample("Dell UltraSharp 32", Category::Electronics, 3299.0, (2023, 8, 10), "4K monitor"),
        sample("iPhone 15 Pro", Category::Electronics, 8999.0, (2024, 1, 20), "Company phone"),
        sample("Laser printer", Category::OfficeSupplies, 1899.0, (2022, 6, 1), "Shared printer, 2nd floor"),
        sample("Paper shredder", Category::OfficeSupplies, 650.0, (2021, 11, 5), "Cross cut"),
        sample("Conference table", Category::Furniture, 5600.0, (2021, 4, 12), "Seats twelve"),
        sample("Ergonomic chair", Category::Furniture, 2400.0, (2023, 9, 30), "Height adjustable"),
        sample("Standing desk", Category::Furniture, 3200.0, (2024, 2, 18), "Electric"),
        sample("Delivery van", Category::Vehicles, 168000.0, (2020, 7, 22), "Diesel, 3.5t"),
        sample("Company car", Category::Vehicles, 235000.0, (2022, 12, 3), "Electric sedan"),
        sample("Office unit 1204", Category::RealEstate, 2650000.0, (2019, 5, 28), "120 m², city center"),
        sample("Coffee machine", Category::Other, 4200.0, (2023, 5, 6), "Kitchen"),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Outcome of seeding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedReport {
    pub created: Vec<Asset>,
    pub failed: usize,
}

impl SeedReport {
    /// Count and value per category of the created assets
    pub fn by_category(&self) -> Vec<(Category, CategoryStats)> {
        category_breakdown(&self.created)
    }
}

/// Submit every asset that passes validation, failures are counted and do not
/// stop the remaining inserts
pub async fn seed(handler: &(dyn AssetHandler + Send + Sync), assets: &[Asset]) -> SeedReport {
    let mut report = SeedReport::default();
    for asset in assets {
        if let Err(err) = asset.validate() {
            warn!("skipping sample asset '{}': {}", asset.name, err);
            report.failed += 1;
            continue;
        }
        let mut asset = asset.clone();
        asset.id = None;
        match handler.insert_asset(&asset).await {
            Ok(created) => report.created.push(created),
            Err(err) => {
                warn!("failed to create sample asset '{}': {}", asset.name, err);
                report.failed += 1;
            }
        }
    }
    info!(
        "seeding finished, {} created, {} failed",
        report.created.len(),
        report.failed
    );
    report
}
