//! Storefront checkout: capture, create order, match, upload.
//!
//! Ordering is strict. Every preview is captured before the order is
//! submitted, and nothing is uploaded unless the order was created.
//! Screenshot problems never fail checkout; order problems always do.

use futures::future::join_all;
use threadmark_core::customization::CustomizationRecord;
use threadmark_core::matching::{match_line, LineIdentity};
use threadmark_core::orders::ProductRef;
use threadmark_core::screenshots::{encode_png_data_url, AssetStatus, ViewMap};
use threadmark_core::types::DbId;
use threadmark_render::capture::{capture_items, CapturedViews, RenderSurface};
use threadmark_render::raster::TextRasterizer;
use uuid::Uuid;

use crate::api::{CreatedOrder, OrderApi, OrderLineRequest, OrderRequest};
use crate::error::ClientError;

/// One line in the shopping cart.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_id: DbId,
    pub color: String,
    pub size: String,
    pub quantity: i32,
    /// Generated when the line is added to the cart.
    pub line_key: Option<Uuid>,
    pub customization: Option<CustomizationRecord>,
}

impl CartLine {
    pub fn new(product_id: DbId, color: &str, size: &str, quantity: i32) -> Self {
        Self {
            product_id,
            color: color.to_string(),
            size: size.to_string(),
            quantity,
            line_key: Some(Uuid::new_v4()),
            customization: None,
        }
    }

    pub fn with_customization(mut self, record: CustomizationRecord) -> Self {
        self.customization = Some(record);
        self
    }

    fn identity(&self) -> LineIdentity {
        LineIdentity {
            line_key: self.line_key,
            product_id: self.product_id,
            color: self.color.clone(),
            size: self.size.clone(),
        }
    }

    fn to_request(&self) -> OrderLineRequest {
        OrderLineRequest {
            product: ProductRef::Id(self.product_id),
            color: self.color.clone(),
            size: self.size.clone(),
            quantity: self.quantity,
            line_key: self.line_key,
            customization: self.customization.clone(),
        }
    }
}

/// Outcome for one cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineOutcome {
    pub line_index: usize,
    /// The matched order item, if matching succeeded.
    pub item_id: Option<DbId>,
    pub asset_status: AssetStatus,
}

/// Outcome of a completed checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReport {
    pub order_id: DbId,
    pub order_number: String,
    pub lines: Vec<LineOutcome>,
}

/// Run the full checkout flow.
///
/// Fails only if the order itself cannot be created.
pub async fn run_checkout<S, A>(
    surface: &mut S,
    rasterizer: &TextRasterizer,
    api: &A,
    customer_email: &str,
    cart: &[CartLine],
) -> Result<CheckoutReport, ClientError>
where
    S: RenderSurface,
    A: OrderApi + ?Sized,
{
    // 1. Capture, sequentially, on the one surface.
    let empty = CustomizationRecord::default();
    let records = cart.iter().map(|line| line.customization.as_ref().unwrap_or(&empty));
    let captures = capture_items(surface, rasterizer, records).await;

    // 2. Create the order. Failure here aborts before any upload.
    let request = OrderRequest {
        customer_email: customer_email.to_string(),
        items: cart.iter().map(CartLine::to_request).collect(),
    };
    let order = api.create_order(&request).await?;
    tracing::info!(order_id = order.id, order_number = %order.order_number, "Order created");

    // 3. Match captured lines to order items.
    let order_items = item_identities(&order);
    let mut lines = Vec::with_capacity(cart.len());
    let mut pending = Vec::new();
    for (line_index, (line, captured)) in cart.iter().zip(captures).enumerate() {
        let status = match &captured {
            Some(views) => AssetStatus::NoScreenshots
                .capture(views.count())
                .unwrap_or(AssetStatus::NoScreenshots),
            None => AssetStatus::NoScreenshots,
        };

        let item_id = match match_line(&line.identity(), &order_items) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(
                    line_index,
                    error = %e,
                    "Cart line not matched, screenshots dropped"
                );
                None
            }
        };

        if let (Some(item_id), Some(views)) = (item_id, captured) {
            pending.push((line_index, item_id, views));
        }
        lines.push(LineOutcome {
            line_index,
            item_id,
            asset_status: status,
        });
    }

    // 4. Upload. Items are independent, so they go concurrently.
    let order_id = order.id;
    let uploads = pending.into_iter().map(|(line_index, item_id, views)| async move {
        let payload = to_data_urls(&views);
        let result = api.upload_item_screenshots(order_id, item_id, &payload).await;
        (line_index, item_id, result)
    });
    for (line_index, item_id, result) in join_all(uploads).await {
        let outcome = &mut lines[line_index];
        match result {
            Ok(persisted) => {
                outcome.asset_status = outcome
                    .asset_status
                    .persist(persisted.count())
                    .unwrap_or(AssetStatus::Persisted { count: persisted.count() as u8 });
            }
            Err(e) => {
                tracing::warn!(order_id, item_id, error = %e, "Screenshot upload failed");
            }
        }
    }

    Ok(CheckoutReport {
        order_id,
        order_number: order.order_number,
        lines,
    })
}

fn item_identities(order: &CreatedOrder) -> Vec<(DbId, LineIdentity)> {
    order
        .items
        .iter()
        .map(|item| {
            (
                item.id,
                LineIdentity {
                    line_key: item.line_key,
                    product_id: item.product_id,
                    color: item.color.clone(),
                    size: item.size.clone(),
                },
            )
        })
        .collect()
}

fn to_data_urls(views: &CapturedViews) -> ViewMap<String> {
    views
        .iter()
        .map(|(view, png)| (view, encode_png_data_url(png)))
        .collect()
}
