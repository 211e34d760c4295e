//! Seed catalog loading from config.toml
//!
//! The optional `[[vendors]]` and `[[products]]` tables describe a starter catalog. It is
//! applied at startup only while the product table is still empty, so editing the file has no
//! effect on a running shop.

use crate::{
    core::{
        product::{self, ProductDraft},
        vendor,
    },
    entities::Product,
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct CatalogConfig {
    /// Vendors to create
    #[serde(default)]
    pub vendors: Vec<VendorSeed>,
    /// Products to create, each referencing a vendor by title
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

/// A seeded vendor
#[derive(Debug, Deserialize, Clone)]
pub struct VendorSeed {
    pub title: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// A seeded product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductSeed {
    /// Title of the owning vendor
    pub vendor: String,
    pub title: String,
    pub amount: Decimal,
    #[serde(default)]
    pub old_price: Decimal,
    pub stock_count: i32,
    #[serde(default = "default_publish")]
    pub publish: bool,
}

const fn default_publish() -> bool {
    true
}

/// Loads the seed catalog from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Like [`load_config`], but a missing file means "no seed catalog".
pub fn load_optional_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    if path.as_ref().exists() {
        load_config(path)
    } else {
        warn!(
            "No catalog config at {}, starting with an empty catalog",
            path.as_ref().display()
        );
        Ok(CatalogConfig::default())
    }
}

/// Creates the seed vendors and products if the catalog is empty.
///
/// Returns the number of products created.
pub async fn seed_catalog<C>(db: &C, config: &CatalogConfig) -> Result<usize>
where
    C: ConnectionTrait,
{
    if Product::find().count(db).await? > 0 {
        info!("Catalog already populated, skipping seed");
        return Ok(0);
    }

    for seed in &config.vendors {
        if vendor::get_vendor_by_title(db, &seed.title).await?.is_none() {
            vendor::create_vendor(db, &seed.title, seed.user_id.clone()).await?;
        }
    }

    let mut created = 0;
    for seed in &config.products {
        let owner = vendor::get_vendor_by_title(db, &seed.vendor)
            .await?
            .ok_or_else(|| Error::Config {
                message: format!(
                    "Product '{}' references unknown vendor '{}'",
                    seed.title, seed.vendor
                ),
            })?;
        let draft = ProductDraft {
            title: seed.title.clone(),
            amount: seed.amount,
            old_price: seed.old_price,
            stock_count: seed.stock_count,
        };
        let saved = product::create_product(db, owner.id, draft, seed.publish).await?;
        if let Some(advisory) = saved.advisory {
            warn!("Seed product '{}': {}", saved.product.title, advisory);
        }
        created += 1;
    }

    info!("Seeded {} products", created);
    Ok(created)
}
