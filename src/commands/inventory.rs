//! Inventory form endpoints.
//!
//! Submissions are validated and logged, then redirected to the item's detail
//! page. Nothing is persisted.

use axum::extract::Path;
use axum::response::Redirect;
use axum::Form;
use serde::Deserialize;
use tracing::{info, warn};

use crate::data_helpers::number_from_value;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InventoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, alias = "item_code")]
    pub item_code: Option<String>,
}

impl InventoryForm {
    fn quantity(&self) -> Option<f64> {
        number_from_value(&serde_json::Value::String(self.quantity.clone()))
    }
}

/// Keep ids safe to embed in a path segment.
fn sanitize_item_id(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// `POST /api/inventory/add`
pub async fn inventory_add(Form(form): Form<InventoryForm>) -> Redirect {
    if form.name.trim().is_empty() {
        warn!("Inventory add rejected: missing name");
        return Redirect::to("/inventory/add?error=missing-name");
    }

    let item_id = form
        .item_code
        .as_deref()
        .map(sanitize_item_id)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    info!(
        item_id = %item_id,
        name = %form.name.trim(),
        category = %form.category,
        quantity = ?form.quantity(),
        unit = %form.unit,
        location = %form.location,
        "Inventory item submitted (not persisted)"
    );
    Redirect::to(&format!("/inventory/{item_id}"))
}

/// `POST /api/inventory/:id/edit`
pub async fn inventory_edit(
    Path(id): Path<String>,
    Form(form): Form<InventoryForm>,
) -> Redirect {
    let item_id = sanitize_item_id(&id);
    if form.name.trim().is_empty() {
        warn!(item_id = %item_id, "Inventory edit rejected: missing name");
        return Redirect::to(&format!("/inventory/{item_id}/edit?error=missing-name"));
    }

    info!(
        item_id = %item_id,
        name = %form.name.trim(),
        quantity = ?form.quantity(),
        "Inventory item update submitted (not persisted)"
    );
    Redirect::to(&format!("/inventory/{item_id}"))
}
