use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use rust_decimal::Decimal;
use storefront_api::{
    api_v1_routes,
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::{CategoryModel, ProductModel, UserModel},
    events::{self, EventSender},
    handlers::AppServices,
    mailer::{Mailer, MailerError},
    services::{CreateProductInput, RegisterInput},
    AppState,
};
use tokio::sync::mpsc;

/// Helper harness spinning up application state backed by an in-memory
/// SQLite database.
pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_0123456789abcdef".to_string(),
            "127.0.0.1".to_string(),
            0,
        );

        let db = db::establish_connection(&cfg)
            .await
            .expect("failed to open in-memory database");
        db::run_migrations(&db)
            .await
            .expect("failed to run migrations");
        let db = Arc::new(db);

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth = Arc::new(AuthService::new(AuthConfig::new(
            cfg.jwt_secret.clone(),
            Duration::from_secs(3600),
        )));

        let mailer = Arc::new(RecordingMailer::default());

        let services = AppServices::new(
            db.clone(),
            Arc::new(event_sender.clone()),
            auth.clone(),
            mailer.clone(),
        );

        let state = Arc::new(AppState {
            db,
            config: cfg,
            event_sender,
            auth,
            services,
        });

        let router = Router::new()
            .nest("/api/v1", api_v1_routes())
            .with_state(state.clone());

        Self {
            state,
            router,
            mailer,
            _event_task: event_task,
        }
    }

    /// Registers a user through the account service.
    pub async fn seed_user(&self, username: &str) -> UserModel {
        self.state
            .services
            .accounts
            .register(RegisterInput {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: "correct-horse-battery".to_string(),
                password_confirm: "correct-horse-battery".to_string(),
                first_name: username.to_string(),
                last_name: "Tester".to_string(),
            })
            .await
            .expect("failed to seed user")
    }

    /// Creates a category through the catalog service.
    pub async fn seed_category(&self, name: &str) -> CategoryModel {
        self.state
            .services
            .catalog
            .create_category(name.to_string())
            .await
            .expect("failed to seed category")
    }

    /// Creates a product under a fresh category.
    pub async fn seed_product(&self, name: &str, price: Decimal) -> ProductModel {
        let category = self.seed_category(&format!("category-for-{name}")).await;
        self.seed_product_in(name, price, &category).await
    }

    /// Creates a product under an existing category.
    pub async fn seed_product_in(
        &self,
        name: &str,
        price: Decimal,
        category: &CategoryModel,
    ) -> ProductModel {
        self.state
            .services
            .catalog
            .create_product(CreateProductInput {
                name: name.to_string(),
                description: None,
                price,
                category_id: category.id,
                image_url: None,
                on_sale: false,
                sale_price: None,
            })
            .await
            .expect("failed to seed product")
    }
}

/// One captured outgoing mail
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail backend that records messages instead of sending them, and can
/// be switched into a failing mode.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().expect("mailer lock poisoned").clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailerError::InvalidAddress(
                "simulated delivery failure".to_string(),
            ));
        }
        self.sent.lock().expect("mailer lock poisoned").push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
