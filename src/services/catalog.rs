use crate::{
    entities::{category, product, Category, CategoryModel, Product, ProductModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Catalog service for categories and products.
///
/// Catalog rows are only ever mutated here; the cart and checkout
/// services read them but never write them.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self))]
    pub async fn create_category(&self, name: String) -> Result<CategoryModel, ServiceError> {
        let category = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
        };
        Ok(category.insert(&*self.db).await?)
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryModel>, ServiceError> {
        Category::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Creates a product under an existing category.
    #[instrument(skip(self, input))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        Category::find_by_id(input.category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Category {} not found", input.category_id))
            })?;

        let product_id = Uuid::new_v4();
        let product = product::ActiveModel {
            id: Set(product_id),
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            category_id: Set(input.category_id),
            image_url: Set(input.image_url),
            on_sale: Set(input.on_sale),
            sale_price: Set(input.sale_price.unwrap_or(Decimal::ZERO)),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        let product = product.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductCreated(product_id))
            .await;

        info!("Created product: {}", product_id);
        Ok(product)
    }

    /// Applies a partial update to a product.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        let product = Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", product_id))
            })?;

        let mut product: product::ActiveModel = product.into();
        if let Some(name) = input.name {
            product.name = Set(name);
        }
        if let Some(description) = input.description {
            product.description = Set(Some(description));
        }
        if let Some(price) = input.price {
            product.price = Set(price);
        }
        if let Some(image_url) = input.image_url {
            product.image_url = Set(Some(image_url));
        }
        if let Some(on_sale) = input.on_sale {
            product.on_sale = Set(on_sale);
        }
        if let Some(sale_price) = input.sale_price {
            product.sale_price = Set(sale_price);
        }
        product.updated_at = Set(Utc::now());

        let updated = product.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductUpdated(product_id))
            .await;

        Ok(updated)
    }

    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductModel, ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    /// Lists products, optionally restricted to one category, newest
    /// first, with page/per_page pagination.
    pub async fn list_products(
        &self,
        query: ProductListQuery,
    ) -> Result<(Vec<ProductModel>, u64), ServiceError> {
        let mut finder = Product::find().order_by_desc(product::Column::CreatedAt);

        if let Some(category_id) = query.category_id {
            finder = finder.filter(product::Column::CategoryId.eq(category_id));
        }

        let paginator = finder.paginate(&*self.db, query.per_page.max(1));
        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(query.page.saturating_sub(1)).await?;

        Ok((data, total))
    }

    /// Space- and case-insensitive substring search over product names
    /// and descriptions: both sides are lowercased and stripped of
    /// spaces before matching, so "redshirt" finds "Red Shirt".
    ///
    /// A blank query returns nothing. No ranking is applied; results
    /// come back in catalog order.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<ProductModel>, ServiceError> {
        let needle = normalize(query);
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let products = Product::find()
            .order_by_desc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(products
            .into_iter()
            .filter(|p| {
                normalize(&p.name).contains(&needle)
                    || p.description
                        .as_deref()
                        .map(|d| normalize(d).contains(&needle))
                        .unwrap_or(false)
            })
            .collect())
    }
}

/// Lowercases and removes spaces, mirroring the match applied to the
/// stored name/description.
fn normalize(s: &str) -> String {
    s.replace(' ', "").to_lowercase()
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Uuid,
    pub image_url: Option<String>,
    #[serde(default)]
    pub on_sale: bool,
    pub sale_price: Option<Decimal>,
}

/// Input for updating a product
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub on_sale: Option<bool>,
    pub sale_price: Option<Decimal>,
}

/// Product listing query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListQuery {
    pub category_id: Option<Uuid>,
    pub page: u64,
    pub per_page: u64,
}

impl Default for ProductListQuery {
    fn default() -> Self {
        Self {
            category_id: None,
            page: 1,
            per_page: 20,
        }
    }
}
