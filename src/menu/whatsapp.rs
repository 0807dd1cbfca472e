use serde::{Deserialize, Serialize};
use url_escape::encode_component;

use super::{
    cart::{calculate_cart_totals, CartLineItem},
    format::format_currency,
    types::RestaurantConfig,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsumptionType {
    #[serde(rename = "dine-in")]
    DineIn,
    #[serde(rename = "pickup")]
    Pickup,
}

impl ConsumptionType {
    pub fn label(&self) -> &'static str {
        match self {
            ConsumptionType::DineIn => "Consumo no local",
            ConsumptionType::Pickup => "Retirada no local",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WhatsAppMessage {
    pub phone: String,
    pub message: String,
    pub url: String,
}

/// Keeps only the digits of a phone number, `wa.me` wants nothing else.
pub fn sanitize_phone_number(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn build_message_body(
    line_items: &[CartLineItem],
    config: &RestaurantConfig,
    customer_name: &str,
    notes: Option<&str>,
    consumption_type: ConsumptionType,
) -> String {
    let totals = calculate_cart_totals(line_items);
    let mut lines = vec![
        format!("Olá *{}*!", config.restaurant_name),
        format!("Cliente: *{}*", customer_name.trim()),
        String::new(),
        "Pedido:".to_string(),
    ];

    for item in line_items {
        lines.push(format!(
            "• {}x {} — {}",
            item.quantity,
            item.product.name,
            format_currency(item.line_total, &config.currency)
        ));
        if !item.product.description.is_empty() {
            lines.push(format!("  {}", item.product.description));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Total de itens: *{}* — Total: *{}*",
        totals.total_quantity,
        format_currency(totals.subtotal, &config.currency)
    ));
    lines.push(format!("Modalidade: *{}*", consumption_type.label()));

    if let Some(notes) = notes.map(str::trim).filter(|notes| !notes.is_empty()) {
        lines.push(String::new());
        lines.push("Observações:".to_string());
        lines.push(notes.to_string());
    }

    if let Some(welcome) = config.welcome_message.as_deref().filter(|m| !m.is_empty()) {
        lines.push(String::new());
        lines.push(welcome.to_string());
    }

    lines.join("\n")
}

/// Builds the order text and the `wa.me` link that opens a chat with it pre-filled.
///
/// Without a configured number the link lets the visitor pick the contact.
pub fn build_whatsapp_message(
    line_items: &[CartLineItem],
    config: &RestaurantConfig,
    customer_name: &str,
    notes: Option<&str>,
    consumption_type: ConsumptionType,
) -> WhatsAppMessage {
    let message = build_message_body(line_items, config, customer_name, notes, consumption_type);
    let phone = sanitize_phone_number(&config.whatsapp_number);
    let encoded = encode_component(&message);
    let url = if phone.is_empty() {
        format!("https://wa.me/?text={}", encoded)
    } else {
        format!("https://wa.me/{}?text={}", phone, encoded)
    };
    WhatsAppMessage {
        phone,
        message,
        url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::types::Product;

    fn line(name: &str, description: &str, price: f64, quantity: u32) -> CartLineItem {
        CartLineItem {
            product: Product {
                id: name.to_lowercase(),
                name: name.to_string(),
                slug: name.to_lowercase(),
                description: description.to_string(),
                image_url: String::new(),
                price,
                category_id: String::new(),
                available: true,
                tags: Vec::new(),
            },
            quantity,
            line_total: price * quantity as f64,
        }
    }

    fn config() -> RestaurantConfig {
        let mut config = RestaurantConfig::default();
        config.restaurant_name = "Cantina".to_string();
        config.whatsapp_number = "+55 (11) 98765-4321".to_string();
        config
    }

    #[test]
    fn message_layout() {
        let items = vec![line("Pastel", "Carne e queijo", 9.0, 2), line("Suco", "", 7.5, 1)];
        let result = build_whatsapp_message(
            &items,
            &config(),
            "  Ana ",
            Some("  sem cebola "),
            ConsumptionType::Pickup,
        );
        let expected = [
            "Olá *Cantina*!",
            "Cliente: *Ana*",
            "",
            "Pedido:",
            "• 2x Pastel — R$\u{a0}18,00",
            "  Carne e queijo",
            "• 1x Suco — R$\u{a0}7,50",
            "",
            "Total de itens: *3* — Total: *R$\u{a0}25,50*",
            "Modalidade: *Retirada no local*",
            "",
            "Observações:",
            "sem cebola",
        ]
        .join("\n");
        assert_eq!(result.message, expected);
        assert_eq!(result.phone, "5511987654321");
        assert!(result.url.starts_with("https://wa.me/5511987654321?text=Ol%C3%A1%20"));
        assert!(result.url.contains("Cantina"));
        assert!(!result.url.contains('\n'));
    }

    #[test]
    fn blank_notes_are_skipped_and_welcome_is_appended() {
        let mut config = config();
        config.welcome_message = Some("Obrigado!".to_string());
        let result = build_whatsapp_message(
            &[line("Suco", "", 7.5, 1)],
            &config,
            "Bia",
            Some("   "),
            ConsumptionType::DineIn,
        );
        assert!(!result.message.contains("Observações"));
        assert!(result.message.ends_with("Modalidade: *Consumo no local*\n\nObrigado!"));
    }

    #[test]
    fn no_phone_links_to_contact_picker() {
        let mut config = config();
        config.whatsapp_number = "não informado".to_string();
        let result = build_whatsapp_message(&[], &config, "Bia", None, ConsumptionType::DineIn);
        assert_eq!(result.phone, "");
        assert!(result.url.starts_with("https://wa.me/?text="));
    }

    #[test]
    fn consumption_type_wire_names() {
        let parsed: ConsumptionType = serde_json::from_str("\"dine-in\"").unwrap();
        assert_eq!(parsed, ConsumptionType::DineIn);
        assert_eq!(serde_json::to_string(&ConsumptionType::Pickup).unwrap(), "\"pickup\"");
    }
}
