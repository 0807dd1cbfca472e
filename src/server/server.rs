use bytes::Bytes;
use chrono::{DateTime, Utc};
use http_body_util::{BodyExt, Full, Limited};
use hyper::{
    body::Incoming,
    header::{HeaderValue, CONTENT_TYPE},
    service::Service,
    Method, Request, Response, StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use std::{future::Future, pin::Pin};

use crate::{
    menu::{
        cart::{build_cart_line_items, calculate_cart_totals, Cart, CartItem, CartLineItem, CartTotals},
        format::format_currency,
        types::MenuData,
        whatsapp::{build_whatsapp_message, ConsumptionType, WhatsAppMessage},
    },
    sheets::loader::SharedMenu,
    timing::schedule::get_restaurant_status,
};

use super::myresponse::StatusResponse;

const MAX_BODY_BYTES: usize = 64 * 1024;

type HttpResult = Result<Response<Full<Bytes>>, hyper::Error>;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    customer_name: String,
    items: Vec<CartItem>,
    #[serde(default)]
    notes: Option<String>,
    consumption_type: ConsumptionType,
}

/// One change to a cart the client keeps on its side.
#[derive(Deserialize, Debug)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum CartAction {
    Add {
        #[serde(rename = "productId")]
        product_id: String,
        quantity: u32,
    },
    Set {
        #[serde(rename = "productId")]
        product_id: String,
        quantity: u32,
    },
    Remove {
        #[serde(rename = "productId")]
        product_id: String,
    },
    Clear,
}

#[derive(Deserialize, Debug)]
pub struct CartRequest {
    #[serde(default)]
    cart: Cart,
    action: CartAction,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    cart: Cart,
    line_items: Vec<CartLineItem>,
    totals: CartTotals,
    subtotal_label: String,
    /// Units of the product the action touched, absent after `clear`.
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<u32>,
}

/// The Server
///
/// Handles the API endpoints. The menu itself is kept fresh by the `Loader`, this only ever
/// reads it.
///
/// Every connection gets its own clone, cloning only bumps the `Arc` around the menu.
#[derive(Clone)]
pub struct Server {
    menu: SharedMenu,
}

impl Server {
    pub fn setup(menu: SharedMenu) -> Self {
        Self { menu }
    }

    /// The /api/menu endpoint. Returns the whole menu as last loaded.
    async fn menu_data(&self) -> HttpResult {
        let menu = self.menu.read().await;
        Self::ok_data(&*menu)
    }

    /// The /api/status endpoint.
    ///
    /// Evaluated fresh on every call in the restaurant's timezone. The page polls this once a
    /// minute, there is nothing cached here.
    async fn status(&self) -> HttpResult {
        let menu = self.menu.read().await;
        Self::ok_data(&Self::status_at(&menu, Utc::now()))
    }

    fn status_at(menu: &MenuData, instant: DateTime<Utc>) -> StatusResponse {
        StatusResponse::new(get_restaurant_status(
            &menu.opening_hours,
            &menu.config.timezone,
            instant,
        ))
    }

    async fn read_body(req: Request<Incoming>) -> Option<Bytes> {
        Limited::new(req.into_body(), MAX_BODY_BYTES)
            .collect()
            .await
            .ok()
            .map(|collected| collected.to_bytes())
    }

    /// The /api/order endpoint.
    ///
    /// Takes the cart and customer details, answers with the WhatsApp message and link.
    async fn order(&self, req: Request<Incoming>) -> HttpResult {
        let Some(body) = Self::read_body(req).await else {
            return Self::bad_request("Could not read body.");
        };
        let menu = self.menu.read().await;
        match Self::build_order(&menu, &body) {
            Ok(message) => {
                info!(phone = %message.phone, "order message built");
                Self::ok_data(&message)
            }
            Err(message) => Self::bad_request(&message),
        }
    }

    /// The /api/cart endpoint.
    ///
    /// The cart lives on the client. It sends the cart along with one action and gets back the
    /// updated cart, priced against the current menu.
    async fn cart(&self, req: Request<Incoming>) -> HttpResult {
        let Some(body) = Self::read_body(req).await else {
            return Self::bad_request("Could not read body.");
        };
        let menu = self.menu.read().await;
        match Self::apply_cart_action(&menu, &body) {
            Ok(response) => Self::ok_data(&response),
            Err(message) => Self::bad_request(&message),
        }
    }

    fn apply_cart_action(menu: &MenuData, body: &[u8]) -> Result<CartResponse, String> {
        let CartRequest { mut cart, action } =
            serde_json::from_slice(body).map_err(|err| format!("Malformed cart. {}", err))?;

        let touched = match action {
            CartAction::Add {
                product_id,
                quantity,
            } => {
                cart.add_item(&product_id, quantity)
                    .map_err(|err| err.to_string())?;
                Some(product_id)
            }
            CartAction::Set {
                product_id,
                quantity,
            } => {
                cart.set_item_quantity(&product_id, quantity);
                Some(product_id)
            }
            CartAction::Remove { product_id } => {
                cart.remove_item(&product_id);
                Some(product_id)
            }
            CartAction::Clear => {
                cart.clear();
                None
            }
        };

        let line_items = build_cart_line_items(cart.items(), &menu.products);
        let totals = calculate_cart_totals(&line_items);
        Ok(CartResponse {
            quantity: touched.map(|product_id| cart.get_item_quantity(&product_id)),
            subtotal_label: format_currency(totals.subtotal, &menu.config.currency),
            cart,
            line_items,
            totals,
        })
    }

    fn build_order(menu: &MenuData, body: &[u8]) -> Result<WhatsAppMessage, String> {
        let order: OrderRequest =
            serde_json::from_slice(body).map_err(|err| format!("Malformed order. {}", err))?;

        if order.customer_name.trim().is_empty() {
            return Err("customerName not provided.".to_string());
        }

        // Going through the cart merges repeated products and drops zero quantities
        let mut cart = Cart::new();
        for item in &order.items {
            cart.add_item(&item.product_id, item.quantity)
                .map_err(|err| err.to_string())?;
        }
        let line_items = build_cart_line_items(cart.items(), &menu.products);
        if line_items.is_empty() {
            return Err("No known products in the order.".to_string());
        }

        Ok(build_whatsapp_message(
            &line_items,
            &menu.config,
            &order.customer_name,
            order.notes.as_deref(),
            order.consumption_type,
        ))
    }

    fn json_response(status: StatusCode, body: Bytes) -> HttpResult {
        let mut res = Response::new(Full::new(body));
        *res.status_mut() = status;
        res.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(res)
    }

    fn error_body(message: &str) -> Bytes {
        Bytes::from(serde_json::json!({ "error": message }).to_string())
    }

    /// Return a 200 OK response with the data provided.
    fn ok_data<T: Serialize>(body: &T) -> HttpResult {
        match serde_json::to_vec(body) {
            Ok(data) => Self::json_response(StatusCode::OK, Bytes::from(data)),
            Err(err) => {
                error!(error = %err, "could not serialize response");
                Self::server_error("Could not serialize response")
            }
        }
    }

    /// Return a 500 Internal Server Error response with the message provided.
    fn server_error(message: &str) -> HttpResult {
        Self::json_response(StatusCode::INTERNAL_SERVER_ERROR, Self::error_body(message))
    }

    /// Return a 404 Not Found response. Leave the message empty for no body.
    fn not_found(message: &str) -> HttpResult {
        let body = if message.is_empty() {
            Bytes::new()
        } else {
            Self::error_body(message)
        };
        Self::json_response(StatusCode::NOT_FOUND, body)
    }

    /// Return a 400 Bad Request response with the message provided.
    fn bad_request(message: &str) -> HttpResult {
        Self::json_response(StatusCode::BAD_REQUEST, Self::error_body(message))
    }

    async fn route(self, req: Request<Incoming>) -> HttpResult {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        match (method, path.as_str()) {
            (Method::GET, "/api/menu") => self.menu_data().await,
            (Method::GET, "/api/status") => self.status().await,
            (Method::POST, "/api/order") => self.order(req).await,
            (Method::POST, "/api/cart") => self.cart(req).await,
            _ => Server::not_found(""),
        }
    }
}

impl Service<Request<Incoming>> for Server {
    type Response = Response<Full<Bytes>>;
    type Error = hyper::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        Box::pin(self.clone().route(req))
    }
}
