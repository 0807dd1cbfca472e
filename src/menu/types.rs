use serde::{Deserialize, Serialize};

use crate::timing::{daily::OpeningHour, zoned_now::DEFAULT_TIMEZONE};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub order: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image_url: String,
    pub price: f64,
    pub category_id: String,
    pub available: bool,
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantConfig {
    pub restaurant_name: String,
    pub logo_url: String,
    pub whatsapp_number: String,
    pub timezone: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
}

impl RestaurantConfig {
    /// The values used for anything the config sheet leaves out.
    pub fn with_timezone(timezone: &str) -> Self {
        Self {
            restaurant_name: "Meu Restaurante".to_string(),
            logo_url: "/logo.svg".to_string(),
            whatsapp_number: String::new(),
            timezone: timezone.to_string(),
            currency: "BRL".to_string(),
            accent_color: None,
            welcome_message: None,
        }
    }
}

impl Default for RestaurantConfig {
    fn default() -> Self {
        Self::with_timezone(DEFAULT_TIMEZONE)
    }
}

/// Everything the menu page needs, as loaded from the spreadsheet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuData {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub opening_hours: Vec<OpeningHour>,
    pub config: RestaurantConfig,
}
