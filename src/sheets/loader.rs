use std::{future::Future, sync::Arc};

use tokio::{
    sync::RwLock,
    time::{sleep_until, Duration, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    config::RangePreferences,
    menu::types::{MenuData, RestaurantConfig},
    sheets::{
        client::{SheetsClient, SheetsError},
        parse::{parse_categories, parse_config, parse_opening_hours, parse_products},
    },
    timing::zoned_now::resolve_timezone,
};

/// The menu every request reads. Only the refresh loop writes to it.
pub type SharedMenu = Arc<RwLock<MenuData>>;

/// Anything that can hand back the rows of a sheet range.
pub trait ReadRange {
    fn read_range(
        &self,
        range: &str,
    ) -> impl Future<Output = Result<Vec<Vec<String>>, SheetsError>> + Send;
}

impl ReadRange for SheetsClient {
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        SheetsClient::read_range(self, range).await
    }
}

pub struct Loader<R: ReadRange> {
    reader: R,
    ranges: RangePreferences,
    default_timezone: String,
}

impl<R: ReadRange + Send + Sync + 'static> Loader<R> {
    pub fn setup(reader: R, ranges: RangePreferences, default_timezone: &str) -> Self {
        Self {
            reader,
            ranges,
            default_timezone: default_timezone.to_string(),
        }
    }

    /// Tries each range in order and returns the first one that has rows.
    /// Failing ranges are logged and skipped, running out of ranges gives no rows.
    pub async fn read_first_available(&self, ranges: &[String]) -> Vec<Vec<String>> {
        for range in ranges.iter().filter(|range| !range.is_empty()) {
            match self.reader.read_range(range).await {
                Ok(rows) if !rows.is_empty() => {
                    debug!(range = %range, rows = rows.len(), "read sheet range");
                    return rows;
                }
                Ok(_) => debug!(range = %range, "sheet range is empty"),
                Err(err) => warn!(range = %range, error = %err, "failed to read sheet range"),
            }
        }
        Vec::new()
    }

    pub async fn load_menu(&self) -> MenuData {
        let (category_rows, product_rows, opening_rows, config_rows) = tokio::join!(
            self.read_first_available(&self.ranges.categories),
            self.read_first_available(&self.ranges.products),
            self.read_first_available(&self.ranges.opening_hours),
            self.read_first_available(&self.ranges.config),
        );

        MenuData {
            categories: parse_categories(&category_rows),
            products: parse_products(&product_rows),
            opening_hours: parse_opening_hours(&opening_rows),
            config: parse_config(&config_rows, &self.default_timezone),
        }
    }

    /// Loads once and swaps the shared menu. An entirely empty load is treated as an outage
    /// and the previous menu is kept.
    pub async fn refresh(&self, menu: &SharedMenu) -> bool {
        let loaded = self.load_menu().await;
        if loaded.categories.is_empty()
            && loaded.products.is_empty()
            && loaded.opening_hours.is_empty()
            && loaded.config == RestaurantConfig::with_timezone(&self.default_timezone)
        {
            warn!("sheet returned nothing, keeping the previous menu");
            return false;
        }
        if resolve_timezone(&loaded.config.timezone).is_none() {
            warn!(
                timezone = %loaded.config.timezone,
                "unknown timezone in the sheet, opening hours will be evaluated in UTC"
            );
        }
        info!(
            categories = loaded.categories.len(),
            products = loaded.products.len(),
            opening_hours = loaded.opening_hours.len(),
            "menu refreshed"
        );
        *menu.write().await = loaded;
        true
    }

    pub async fn run(self, menu: SharedMenu, interval: Duration) {
        info!(interval_secs = interval.as_secs(), "menu refresher running");
        loop {
            self.refresh(&menu).await;
            sleep_until(Instant::now() + interval).await;
        }
    }
}
