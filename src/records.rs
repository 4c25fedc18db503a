//! Normalization of the legacy exports into common record shapes.
//!
//! Export and local sales orders come from different spreadsheets with
//! different column names. Both collapse into [`OrderRecord`]; box-level stock
//! rows become [`StockRecord`].

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::data_helpers::{date_from_value, number_label};
use crate::{value_f64, value_str};

/// Category for descriptions that match no keyword.
pub const OTHER_CATEGORY: &str = "Other";
/// Fallback for missing text fields.
pub const UNKNOWN: &str = "Unknown";
/// Country assigned to every local order.
pub const LOCAL_COUNTRY: &str = "Domestic";

/// Keyword (upper case) to category, checked in order. First match wins.
const PRODUCT_KEYWORDS: &[(&str, &str)] = &[
    ("PSF", "PSF"),
    ("POY", "POY"),
    ("FDY", "FDY"),
    ("DTY", "DTY"),
    ("PFY", "PFY"),
    ("CHIP", "Chips"),
    ("WASTE", "Waste"),
];

const EXPORT_ORDER_NO: &[&str] = &["Order No", "Order Number", "PO No", "orderNo", "order_no"];
const EXPORT_CUSTOMER: &[&str] = &["Buyer", "Customer", "Customer Name", "customer"];
const EXPORT_DESCRIPTION: &[&str] = &[
    "Description",
    "Product Description",
    "Product",
    "description",
];
const EXPORT_QUANTITY: &[&str] = &["Quantity", "Qty", "Qty (Kg)", "quantity"];
const EXPORT_VALUE: &[&str] = &["Value", "Amount", "Value (USD)", "FOB Value", "value"];
const EXPORT_DATE: &[&str] = &["Date", "Order Date", "PO Date", "date"];
const EXPORT_COUNTRY: &[&str] = &["Country", "Destination", "country"];

const LOCAL_ORDER_NO: &[&str] = &["SO No", "Order No", "Sales Order", "orderNo", "order_no"];
const LOCAL_CUSTOMER: &[&str] = &["Customer Name", "Party Name", "Customer", "customer"];
const LOCAL_DESCRIPTION: &[&str] = &["Product", "Item Description", "Description", "product"];
const LOCAL_QUANTITY: &[&str] = &["Quantity", "Qty", "Qty (Kg)", "quantity"];
const LOCAL_VALUE: &[&str] = &["Amount", "Value", "Total Amount", "amount"];
const LOCAL_DATE: &[&str] = &["Date", "Order Date", "SO Date", "date"];

const STOCK_PRODUCT_CODE: &[&str] = &["Product Code", "Item Code", "Product", "productCode"];
const STOCK_DENIER: &[&str] = &["Denier", "denier"];
const STOCK_NET_WEIGHT: &[&str] = &["Net Weight", "Net Wt", "Net Wt (Kg)", "netWeight"];
const STOCK_LOCATION: &[&str] = &["Location", "Warehouse", "location"];
const STOCK_GRADE: &[&str] = &["Grade", "Quality", "grade"];

/// Classify free text into a product category.
pub fn categorize_product(text: &str) -> &'static str {
    let upper = text.to_uppercase();
    PRODUCT_KEYWORDS
        .iter()
        .find(|(keyword, _)| upper.contains(keyword))
        .map(|(_, category)| *category)
        .unwrap_or(OTHER_CATEGORY)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderOrigin {
    Export,
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_no: String,
    pub customer: String,
    pub product: &'static str,
    pub description: String,
    pub quantity: f64,
    pub value: f64,
    pub date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub origin: OrderOrigin,
    pub country: String,
}

impl OrderRecord {
    pub fn from_export_row(row: &Value) -> Self {
        let description = value_str(row, EXPORT_DESCRIPTION).unwrap_or_default();
        Self {
            order_no: value_str(row, EXPORT_ORDER_NO).unwrap_or_else(|| UNKNOWN.to_string()),
            customer: value_str(row, EXPORT_CUSTOMER).unwrap_or_else(|| UNKNOWN.to_string()),
            product: categorize_product(&description),
            description,
            quantity: value_f64(row, EXPORT_QUANTITY).unwrap_or(0.0),
            value: value_f64(row, EXPORT_VALUE).unwrap_or(0.0),
            date: value_date(row, EXPORT_DATE),
            origin: OrderOrigin::Export,
            country: value_str(row, EXPORT_COUNTRY).unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    pub fn from_local_row(row: &Value) -> Self {
        let description = value_str(row, LOCAL_DESCRIPTION).unwrap_or_default();
        Self {
            order_no: value_str(row, LOCAL_ORDER_NO).unwrap_or_else(|| UNKNOWN.to_string()),
            customer: value_str(row, LOCAL_CUSTOMER).unwrap_or_else(|| UNKNOWN.to_string()),
            product: categorize_product(&description),
            description,
            quantity: value_f64(row, LOCAL_QUANTITY).unwrap_or(0.0),
            value: value_f64(row, LOCAL_VALUE).unwrap_or(0.0),
            date: value_date(row, LOCAL_DATE),
            origin: OrderOrigin::Local,
            country: LOCAL_COUNTRY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub product_code: String,
    pub product: &'static str,
    pub denier: String,
    pub net_weight: f64,
    pub location: String,
    pub grade: String,
}

impl StockRecord {
    pub fn from_row(row: &Value) -> Self {
        let product_code = value_str(row, STOCK_PRODUCT_CODE).unwrap_or_else(|| UNKNOWN.to_string());
        let denier = STOCK_DENIER
            .iter()
            .find_map(|key| match row.get(*key) {
                Some(Value::Number(n)) => n.as_f64().map(number_label),
                Some(Value::String(s)) => Some(s.trim().trim_end_matches(['D', 'd']).trim())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
                _ => None,
            })
            .unwrap_or_else(|| UNKNOWN.to_string());
        Self {
            product: categorize_product(&product_code),
            product_code,
            denier,
            net_weight: value_f64(row, STOCK_NET_WEIGHT).unwrap_or(0.0),
            location: value_str(row, STOCK_LOCATION).unwrap_or_else(|| UNKNOWN.to_string()),
            grade: value_str(row, STOCK_GRADE).unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }
}

/// Export rows first, then local rows, each in input order.
pub fn normalize_orders(export_rows: &[Value], local_rows: &[Value]) -> Vec<OrderRecord> {
    export_rows
        .iter()
        .map(OrderRecord::from_export_row)
        .chain(local_rows.iter().map(OrderRecord::from_local_row))
        .collect()
}

pub fn normalize_stock(rows: &[Value]) -> Vec<StockRecord> {
    rows.iter().map(StockRecord::from_row).collect()
}

fn value_date(row: &Value, keys: &[&str]) -> Option<NaiveDate> {
    keys.iter()
        .filter_map(|key| row.get(*key))
        .find_map(date_from_value)
}
