use crate::menu::types::{Category, Product, RestaurantConfig};
use crate::timing::{
    daily::{OpeningHour, OpeningHourWindow},
    time_of_day::normalize_time,
};

const BOOLEAN_TRUE_VALUES: [&str; 8] = [
    "true", "1", "yes", "y", "sim", "ativo", "open", "available",
];

/// Day names as people type them in the sheet, keyed by their slug.
fn day_name_to_index(key: &str) -> Option<u8> {
    let index = match key {
        "domingo" | "dom" | "sunday" | "sun" => 0,
        "segunda" | "segunda-feira" | "segundafeira" | "seg" | "monday" | "mon" => 1,
        "terca" | "terca-feira" | "tercafeira" | "ter" | "tuesday" | "tue" => 2,
        "quarta" | "quarta-feira" | "quartafeira" | "qua" | "wednesday" | "wed" => 3,
        "quinta" | "quinta-feira" | "quintafeira" | "qui" | "thursday" | "thu" => 4,
        "sexta" | "sexta-feira" | "sextafeira" | "sex" | "friday" | "fri" => 5,
        "sabado" | "sab" | "saturday" | "sat" => 6,
        _ => return None,
    };
    Some(index)
}

fn strip_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// `"Pão de Queijo!"` -> `"pao-de-queijo"`
pub fn to_slug(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.trim().to_lowercase().chars().map(strip_accent) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Reads prices written the Brazilian way, `1.234,50`. Dots are thousand separators.
pub fn parse_number(raw: &str, fallback: f64) -> f64 {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect();
    if compact.is_empty() {
        return fallback;
    }
    match compact.replacen(',', ".", 1).parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => parsed,
        _ => fallback,
    }
}

pub fn parse_boolean(raw: &str, fallback: bool) -> bool {
    if raw.is_empty() {
        return fallback;
    }
    BOOLEAN_TRUE_VALUES.contains(&raw.trim().to_lowercase().as_str())
}

pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split([';', ','])
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn trimmed_cells(row: &[String]) -> Vec<String> {
    row.iter().map(|cell| cell.trim().to_string()).collect()
}

fn cell(cells: &[String], index: usize) -> &str {
    cells.get(index).map_or("", String::as_str)
}

fn parse_day(day_cell: &str) -> Option<u8> {
    if day_cell.is_empty() {
        return None;
    }
    if day_cell.chars().all(|c| c.is_ascii_digit()) {
        return day_cell.parse::<u8>().ok().filter(|day| *day <= 6);
    }
    let slug = to_slug(day_cell);
    day_name_to_index(&slug).or_else(|| day_name_to_index(&slug.replace('-', "")))
}

/**
Parses the opening hours tab.

Column 0 is the weekday, as a number (0 = Sunday) or a name in Portuguese or English. Every
following pair of columns is an opening and a closing time. A pair is kept only when both times
normalize. Rows with an unknown weekday are dropped.
*/
pub fn parse_opening_hours(rows: &[Vec<String>]) -> Vec<OpeningHour> {
    rows.iter()
        .filter_map(|row| {
            let day = parse_day(row.first().map_or("", |c| c.trim()))?;
            let windows = row
                .get(1..)
                .unwrap_or_default()
                .chunks(2)
                .filter_map(|pair| {
                    let opens = normalize_time(pair.first().map_or("", String::as_str));
                    let closes = normalize_time(pair.get(1).map_or("", String::as_str));
                    if opens.is_empty() || closes.is_empty() {
                        return None;
                    }
                    Some(OpeningHourWindow {
                        opens_at: opens,
                        closes_at: closes,
                    })
                })
                .collect();
            Some(OpeningHour::new(day, windows))
        })
        .collect()
}

/// Columns: id, name, slug, order. Only a name (or a lone first column) is required.
pub fn parse_categories(rows: &[Vec<String>]) -> Vec<Category> {
    let mut categories: Vec<Category> = rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let cells = trimmed_cells(row);
            let name = match cell(&cells, 1) {
                "" => cell(&cells, 0),
                name => name,
            };
            if name.is_empty() {
                return None;
            }
            let id = match cell(&cells, 0) {
                "" => to_slug(name),
                id => to_slug(id),
            };
            let slug = match cell(&cells, 2) {
                "" => to_slug(name),
                slug => slug.to_string(),
            };
            let order = cell(&cells, 3)
                .parse::<i64>()
                .ok()
                .filter(|order| *order != 0)
                .unwrap_or(index as i64);
            Some(Category {
                id,
                name: name.to_string(),
                slug,
                order,
            })
        })
        .collect();
    categories.sort_by_key(|category| category.order);
    categories
}

/**
Parses the products tab. Two layouts are around:

- nine or more columns: id, name, slug, description, image, price, category, available, tags
- the older short one: id, name, description, price, category, available, image

A product without a name or a category is skipped.
*/
pub fn parse_products(rows: &[Vec<String>]) -> Vec<Product> {
    rows.iter()
        .filter_map(|row| {
            let cells = trimmed_cells(row);
            let wide = cells.len() >= 9;
            let name = match cell(&cells, 1) {
                "" => cell(&cells, 0),
                name => name,
            };

            let (description, image_url, price, category_ref, available_raw, tags, slug) = if wide {
                (
                    cell(&cells, 3),
                    cell(&cells, 4),
                    cell(&cells, 5),
                    cell(&cells, 6),
                    cell(&cells, 7),
                    parse_tags(cell(&cells, 8)),
                    cell(&cells, 2),
                )
            } else {
                (
                    cell(&cells, 2),
                    cell(&cells, 6),
                    cell(&cells, 3),
                    cell(&cells, 4),
                    cell(&cells, 5),
                    Vec::new(),
                    "",
                )
            };

            if name.is_empty() || category_ref.is_empty() {
                return None;
            }

            let id = match cell(&cells, 0) {
                "" => to_slug(&format!("{}-{}", category_ref, name)),
                id => id.to_string(),
            };
            let slug = match slug {
                "" => to_slug(name),
                slug => slug.to_string(),
            };

            Some(Product {
                id,
                name: name.to_string(),
                slug,
                description: description.to_string(),
                image_url: image_url.to_string(),
                price: parse_number(price, 0.0),
                category_id: to_slug(category_ref),
                available: parse_boolean(available_raw, true),
                tags,
            })
        })
        .collect()
}

/// Key/value rows. Unknown keys are ignored, empty values keep the default.
pub fn parse_config(rows: &[Vec<String>], default_timezone: &str) -> RestaurantConfig {
    let defaults = RestaurantConfig::with_timezone(default_timezone);
    let mut config = defaults.clone();

    for row in rows {
        let cells = trimmed_cells(row);
        let key = cell(&cells, 0).to_lowercase();
        let value = cell(&cells, 1);
        if key.is_empty() {
            continue;
        }
        let or_default = |default: &str| match value {
            "" => default.to_string(),
            value => value.to_string(),
        };

        match key.as_str() {
            "nome" | "restaurant_name" | "name" => {
                config.restaurant_name = or_default(&defaults.restaurant_name)
            }
            "logo" | "logo_url" | "logourl" => config.logo_url = or_default(&defaults.logo_url),
            "whatsapp" | "whatsapp_number" | "zap" | "telefone" => {
                config.whatsapp_number = or_default(&defaults.whatsapp_number)
            }
            "timezone" | "fuso" | "fuso_horario" => config.timezone = or_default(&defaults.timezone),
            "currency" | "moeda" => config.currency = or_default(&defaults.currency),
            "accent_color" | "primary_color" | "cor" => config.accent_color = Some(value.to_string()),
            "mensagem" | "welcome_message" => config.welcome_message = Some(value.to_string()),
            _ => (),
        }
    }

    config
}
