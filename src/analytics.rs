//! Analytics aggregation over the normalized exports.
//!
//! Produces four views from one pass over the order and stock records:
//! order analytics, stock analytics, production needs, and sales
//! recommendations. Everything is recomputed from scratch on each call.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::records::{OrderOrigin, OrderRecord, StockRecord};

/// Fixed price used to estimate the value of stock on hand.
pub const STOCK_VALUE_PER_KG: f64 = 150.0;
pub const RECENT_ORDER_LIMIT: usize = 10;

/// Low-stock threshold is this many average boxes.
const LOW_STOCK_BOXES: f64 = 10.0;
/// High stock is above this multiple of the low-stock threshold.
const HIGH_STOCK_MULTIPLIER: f64 = 5.0;

const HIGH_GAP_PERCENT: f64 = 50.0;
const MEDIUM_GAP_PERCENT: f64 = 20.0;

/// Summed order quantity counts as one month of demand.
const DEMAND_COVER_MONTHS: f64 = 2.0;
const LIQUIDATION_SHARE: f64 = 0.30;
const URGENCY_HIGH_MULTIPLIER: f64 = 4.0;
const URGENCY_MEDIUM_MULTIPLIER: f64 = 3.0;
const PRICE_DECREASE_MULTIPLIER: f64 = 3.0;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsResponse {
    pub orders: OrderAnalytics,
    pub stock: StockAnalytics,
    pub production: ProductionAnalytics,
    pub sales: SalesAnalytics,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBucket {
    pub count: u64,
    pub quantity: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAnalytics {
    pub total_orders: u64,
    pub total_quantity: f64,
    pub total_value: f64,
    pub export_orders: u64,
    pub local_orders: u64,
    pub by_product: BTreeMap<String, OrderBucket>,
    pub by_customer: BTreeMap<String, OrderBucket>,
    pub by_country: BTreeMap<String, OrderBucket>,
    pub recent_orders: Vec<OrderRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockBucket {
    pub boxes: u64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDenierBucket {
    pub product: String,
    pub denier: String,
    pub boxes: u64,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStockStatus {
    pub boxes: u64,
    pub weight: f64,
    pub average_box_weight: f64,
    pub threshold: f64,
    pub status: StockLevel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAnalytics {
    pub total_boxes: u64,
    pub total_weight: f64,
    pub estimated_value: f64,
    pub by_product_denier: BTreeMap<String, ProductDenierBucket>,
    pub by_location: BTreeMap<String, StockBucket>,
    pub by_grade: BTreeMap<String, StockBucket>,
    pub product_status: BTreeMap<String, ProductStockStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionNeed {
    pub product: String,
    pub demand: f64,
    pub current_stock: f64,
    pub production_needed: f64,
    pub gap_percentage: f64,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionAnalytics {
    pub items: Vec<ProductionNeed>,
    pub high_priority: u64,
    pub medium_priority: u64,
    pub low_priority: u64,
    pub total_production_needed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceDirection {
    Decrease,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecommendation {
    pub product: String,
    pub current_stock: f64,
    pub monthly_demand: f64,
    pub two_month_demand: f64,
    pub excess_stock: f64,
    pub liquidation_target: f64,
    pub urgency: Urgency,
    pub price_recommendation: PriceDirection,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesAnalytics {
    pub recommendations: Vec<SalesRecommendation>,
    pub total_excess_stock: f64,
    pub total_liquidation_target: f64,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

pub fn build_analytics(
    orders: &[OrderRecord],
    stock: &[StockRecord],
    now: DateTime<Utc>,
) -> AnalyticsResponse {
    let demand = demand_by_product(orders);
    let on_hand = stock_by_product(stock);
    AnalyticsResponse {
        orders: order_analytics(orders),
        stock: stock_analytics(stock),
        production: production_analytics(&demand, &on_hand),
        sales: sales_analytics(&demand, &on_hand),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

fn add_order(bucket: &mut OrderBucket, order: &OrderRecord) {
    bucket.count += 1;
    bucket.quantity += order.quantity;
    bucket.value += order.value;
}

pub fn order_analytics(orders: &[OrderRecord]) -> OrderAnalytics {
    let mut by_product: BTreeMap<String, OrderBucket> = BTreeMap::new();
    let mut by_customer: BTreeMap<String, OrderBucket> = BTreeMap::new();
    let mut by_country: BTreeMap<String, OrderBucket> = BTreeMap::new();
    let mut total_quantity = 0.0f64;
    let mut total_value = 0.0f64;
    let mut export_orders = 0u64;
    let mut local_orders = 0u64;

    for order in orders {
        total_quantity += order.quantity;
        total_value += order.value;
        match order.origin {
            OrderOrigin::Export => export_orders += 1,
            OrderOrigin::Local => local_orders += 1,
        }
        add_order(by_product.entry(order.product.to_string()).or_default(), order);
        add_order(by_customer.entry(order.customer.clone()).or_default(), order);
        add_order(by_country.entry(order.country.clone()).or_default(), order);
    }

    // Stable sort: undated orders go last, ties keep input order
    let mut recent: Vec<&OrderRecord> = orders.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    let recent_orders = recent
        .into_iter()
        .take(RECENT_ORDER_LIMIT)
        .cloned()
        .collect();

    OrderAnalytics {
        total_orders: orders.len() as u64,
        total_quantity,
        total_value,
        export_orders,
        local_orders,
        by_product,
        by_customer,
        by_country,
        recent_orders,
    }
}

fn product_denier_key(product: &str, denier: &str) -> String {
    if denier == crate::records::UNKNOWN {
        format!("{product} {denier}")
    } else {
        format!("{product} {denier}D")
    }
}

fn stock_level(weight: f64, threshold: f64) -> StockLevel {
    if weight <= 0.0 || weight < threshold {
        StockLevel::Low
    } else if weight > threshold * HIGH_STOCK_MULTIPLIER {
        StockLevel::High
    } else {
        StockLevel::Normal
    }
}

pub fn stock_analytics(stock: &[StockRecord]) -> StockAnalytics {
    let mut by_product_denier: BTreeMap<String, ProductDenierBucket> = BTreeMap::new();
    let mut by_location: BTreeMap<String, StockBucket> = BTreeMap::new();
    let mut by_grade: BTreeMap<String, StockBucket> = BTreeMap::new();
    let mut by_product: BTreeMap<&'static str, StockBucket> = BTreeMap::new();
    let mut total_weight = 0.0f64;

    for record in stock {
        total_weight += record.net_weight;

        let composite = by_product_denier
            .entry(product_denier_key(record.product, &record.denier))
            .or_insert_with(|| ProductDenierBucket {
                product: record.product.to_string(),
                denier: record.denier.clone(),
                boxes: 0,
                weight: 0.0,
            });
        composite.boxes += 1;
        composite.weight += record.net_weight;

        for bucket in [
            by_location.entry(record.location.clone()).or_default(),
            by_grade.entry(record.grade.clone()).or_default(),
            by_product.entry(record.product).or_default(),
        ] {
            bucket.boxes += 1;
            bucket.weight += record.net_weight;
        }
    }

    let product_status = by_product
        .into_iter()
        .map(|(product, bucket)| {
            let average_box_weight = if bucket.boxes > 0 {
                bucket.weight / bucket.boxes as f64
            } else {
                0.0
            };
            let threshold = average_box_weight * LOW_STOCK_BOXES;
            let status = ProductStockStatus {
                boxes: bucket.boxes,
                weight: bucket.weight,
                average_box_weight,
                threshold,
                status: stock_level(bucket.weight, threshold),
            };
            (product.to_string(), status)
        })
        .collect();

    StockAnalytics {
        total_boxes: stock.len() as u64,
        total_weight,
        estimated_value: total_weight * STOCK_VALUE_PER_KG,
        by_product_denier,
        by_location,
        by_grade,
        product_status,
    }
}

pub fn demand_by_product(orders: &[OrderRecord]) -> BTreeMap<&'static str, f64> {
    let mut demand: BTreeMap<&'static str, f64> = BTreeMap::new();
    for order in orders {
        *demand.entry(order.product).or_insert(0.0) += order.quantity;
    }
    demand
}

pub fn stock_by_product(stock: &[StockRecord]) -> BTreeMap<&'static str, f64> {
    let mut on_hand: BTreeMap<&'static str, f64> = BTreeMap::new();
    for record in stock {
        *on_hand.entry(record.product).or_insert(0.0) += record.net_weight;
    }
    on_hand
}

pub fn production_need(product: &str, demand: f64, current_stock: f64) -> ProductionNeed {
    let production_needed = (demand - current_stock).max(0.0);
    let gap_percentage = if demand > 0.0 {
        production_needed / demand * 100.0
    } else {
        0.0
    };
    let priority = if gap_percentage > HIGH_GAP_PERCENT {
        Priority::High
    } else if gap_percentage > MEDIUM_GAP_PERCENT {
        Priority::Medium
    } else {
        Priority::Low
    };
    ProductionNeed {
        product: product.to_string(),
        demand,
        current_stock,
        production_needed,
        gap_percentage,
        priority,
    }
}

pub fn production_analytics(
    demand: &BTreeMap<&'static str, f64>,
    on_hand: &BTreeMap<&'static str, f64>,
) -> ProductionAnalytics {
    let products: BTreeSet<&'static str> = demand.keys().chain(on_hand.keys()).copied().collect();

    let items: Vec<ProductionNeed> = products
        .into_iter()
        .map(|product| {
            production_need(
                product,
                demand.get(product).copied().unwrap_or(0.0),
                on_hand.get(product).copied().unwrap_or(0.0),
            )
        })
        .collect();

    let count = |p: Priority| items.iter().filter(|i| i.priority == p).count() as u64;
    ProductionAnalytics {
        high_priority: count(Priority::High),
        medium_priority: count(Priority::Medium),
        low_priority: count(Priority::Low),
        total_production_needed: items.iter().map(|i| i.production_needed).sum(),
        items,
    }
}

pub fn sales_recommendation(
    product: &str,
    monthly_demand: f64,
    current_stock: f64,
) -> Option<SalesRecommendation> {
    let two_month_demand = monthly_demand * DEMAND_COVER_MONTHS;
    let excess_stock = (current_stock - two_month_demand).max(0.0);
    if excess_stock <= 0.0 {
        return None;
    }
    let urgency = if current_stock > monthly_demand * URGENCY_HIGH_MULTIPLIER {
        Urgency::High
    } else if current_stock > monthly_demand * URGENCY_MEDIUM_MULTIPLIER {
        Urgency::Medium
    } else {
        Urgency::Low
    };
    let price_recommendation = if current_stock > monthly_demand * PRICE_DECREASE_MULTIPLIER {
        PriceDirection::Decrease
    } else {
        PriceDirection::Hold
    };
    Some(SalesRecommendation {
        product: product.to_string(),
        current_stock,
        monthly_demand,
        two_month_demand,
        excess_stock,
        liquidation_target: excess_stock * LIQUIDATION_SHARE,
        urgency,
        price_recommendation,
    })
}

pub fn sales_analytics(
    demand: &BTreeMap<&'static str, f64>,
    on_hand: &BTreeMap<&'static str, f64>,
) -> SalesAnalytics {
    let mut recommendations: Vec<SalesRecommendation> = on_hand
        .iter()
        .filter_map(|(product, stock)| {
            sales_recommendation(product, demand.get(product).copied().unwrap_or(0.0), *stock)
        })
        .collect();
    recommendations.sort_by(|a, b| {
        b.excess_stock
            .partial_cmp(&a.excess_stock)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    SalesAnalytics {
        total_excess_stock: recommendations.iter().map(|r| r.excess_stock).sum(),
        total_liquidation_target: recommendations.iter().map(|r| r.liquidation_target).sum(),
        recommendations,
    }
}
