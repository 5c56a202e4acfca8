//! Commands on the logged-in user's own products.

use std::path::PathBuf;
use std::sync::Arc;

use marketplace_client::api::{ImageFile, NewProduct};
use marketplace_client::views::{DashboardView, Gate, Navigation};
use marketplace_client::{ClientError, Result};
use marketplace_core::ProductId;

use super::Context;
use crate::render;

/// "Add product" fields as given on the command line.
pub struct AddArgs {
    pub name: String,
    pub description: String,
    pub price: String,
    pub quantity: String,
    pub image: Option<PathBuf>,
}

/// Show the user's products.
pub async fn show(ctx: &Context) {
    if let Some(view) = open(ctx).await {
        render::dashboard(&view.view_model());
    }
}

/// Add a product, then show the refreshed list.
///
/// The image is read only once the session gate has passed.
pub async fn add(ctx: &Context, args: AddArgs) -> Result<()> {
    let Some(mut view) = open(ctx).await else {
        return Ok(());
    };

    let image = match &args.image {
        Some(path) => Some(
            ImageFile::from_path(path)
                .await
                .map_err(|source| ClientError::File {
                    path: path.clone(),
                    source,
                })?,
        ),
        None => None,
    };
    let product = NewProduct {
        name: args.name,
        description: args.description,
        price: args.price,
        quantity: args.quantity,
        image,
    };

    let navigation = view.add_product(product).await;
    finish(&view, navigation);
    Ok(())
}

/// Delete a product, then show the refreshed list.
pub async fn delete(ctx: &Context, id: ProductId) {
    if let Some(mut view) = open(ctx).await {
        let navigation = view.delete_product(id).await;
        finish(&view, navigation);
    }
}

/// Open the dashboard, rendering the redirect if there is no session.
async fn open(ctx: &Context) -> Option<Box<DashboardView>> {
    match DashboardView::open(&ctx.api, Arc::clone(&ctx.store)).await {
        Gate::Ready(view) => Some(view),
        Gate::Redirect(page) => {
            render::redirect(page);
            None
        }
    }
}

fn finish(view: &DashboardView, navigation: Navigation) {
    match navigation {
        Navigation::Stay => render::dashboard(&view.view_model()),
        Navigation::Redirect(page) => render::redirect(page),
    }
}
