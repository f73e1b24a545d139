use crate::{
    entities::{review, Product, Review, ReviewModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Review service: one rating + comment per (user, product).
///
/// Submitting again for the same pair overwrites the stored review
/// (update-or-create) instead of appending a second row.
#[derive(Clone)]
pub struct ReviewService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl ReviewService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Creates or overwrites the user's review of a product.
    #[instrument(skip(self, input))]
    pub async fn submit(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        input: SubmitReviewInput,
    ) -> Result<ReviewModel, ServiceError> {
        if !(1..=5).contains(&input.rating) {
            return Err(ServiceError::ValidationError(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let existing = Review::find()
            .filter(review::Column::UserId.eq(user_id))
            .filter(review::Column::ProductId.eq(product_id))
            .one(&*self.db)
            .await?;

        let saved = match existing {
            Some(current) => {
                let mut current: review::ActiveModel = current.into();
                current.rating = Set(input.rating);
                current.comment = Set(input.comment);
                current.updated_at = Set(Utc::now());
                current.update(&*self.db).await?
            }
            None => {
                let now = Utc::now();
                let fresh = review::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    product_id: Set(product_id),
                    rating: Set(input.rating),
                    comment: Set(input.comment),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                fresh.insert(&*self.db).await?
            }
        };

        self.event_sender
            .send_or_log(Event::ReviewSubmitted {
                user_id,
                product_id,
            })
            .await;

        info!("Review saved for product {} by user {}", product_id, user_id);
        Ok(saved)
    }

    /// Lists a product's reviews, newest first.
    pub async fn list_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<ReviewModel>, ServiceError> {
        Review::find()
            .filter(review::Column::ProductId.eq(product_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Mean rating rounded to one decimal place; zero without reviews.
    pub async fn average_rating(&self, product_id: Uuid) -> Result<Decimal, ServiceError> {
        let reviews = self.list_for_product(product_id).await?;
        Ok(average(&reviews.iter().map(|r| r.rating).collect::<Vec<_>>()))
    }
}

fn average(ratings: &[i32]) -> Decimal {
    if ratings.is_empty() {
        return Decimal::ZERO;
    }
    let sum: i32 = ratings.iter().sum();
    (Decimal::from(sum) / Decimal::from(ratings.len() as i64)).round_dp(1)
}

/// Input for submitting a review
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReviewInput {
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}
