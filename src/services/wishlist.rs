use crate::{
    entities::{wishlist_item, Product, ProductModel, WishlistItem, WishlistItemModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Wishlist service: a flat set of (user, product) bookmarks.
///
/// Adds are get-or-create, so wishing for the same product twice is a
/// no-op rather than an error or a duplicate.
#[derive(Clone)]
pub struct WishlistService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl WishlistService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Adds a product to the user's wishlist; returns the entry and
    /// whether it was newly created.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<(WishlistItemModel, bool), ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let existing = WishlistItem::find()
            .filter(wishlist_item::Column::UserId.eq(user_id))
            .filter(wishlist_item::Column::ProductId.eq(product_id))
            .one(&*self.db)
            .await?;

        if let Some(entry) = existing {
            return Ok((entry, false));
        }

        let entry = wishlist_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            product_id: Set(product_id),
            added_at: Set(Utc::now()),
        };
        let entry = entry.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::WishlistItemAdded {
                user_id,
                product_id,
            })
            .await;

        Ok((entry, true))
    }

    /// Returns the user's wishlist entries with their products.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<WishlistEntry>, ServiceError> {
        let rows = WishlistItem::find()
            .filter(wishlist_item::Column::UserId.eq(user_id))
            .order_by_asc(wishlist_item::Column::AddedAt)
            .find_also_related(Product)
            .all(&*self.db)
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for (item, product) in rows {
            let product = product.ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Wishlist item {} references a missing product",
                    item.id
                ))
            })?;
            entries.push(WishlistEntry { item, product });
        }
        Ok(entries)
    }

    /// Removes a product from the user's wishlist.
    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: Uuid, product_id: Uuid) -> Result<(), ServiceError> {
        WishlistItem::delete_many()
            .filter(wishlist_item::Column::UserId.eq(user_id))
            .filter(wishlist_item::Column::ProductId.eq(product_id))
            .exec(&*self.db)
            .await?;

        self.event_sender
            .send_or_log(Event::WishlistItemRemoved {
                user_id,
                product_id,
            })
            .await;

        Ok(())
    }
}

/// One wishlist entry joined with its product
#[derive(Debug, Serialize)]
pub struct WishlistEntry {
    pub item: WishlistItemModel,
    pub product: ProductModel,
}
