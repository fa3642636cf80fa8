// ============================================================================
// AppContext - shared dependencies of the REST and realtime handlers
// ============================================================================
//
// Built once at startup with `AppContext::builder()` and cloned into every
// handler. The realtime hub is owned here and injected into the services
// that push events; nothing reaches it through a global.
//
// ============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use stayhub_config::Config;
use stayhub_db::DbPool;

use crate::bookings::{BookingLedger, BookingStore, InMemoryBookingStore, PostgresBookingStore};
use crate::directory::{Directory, PostgresDirectory};
use crate::email::{EmailDispatcher, LogEmailDispatcher};
use crate::messages::{
    ChatService, InMemoryMessageStore, InboxAggregator, MessageStore, PostgresMessageStore,
};
use crate::notifications::{
    InMemoryNotificationStore, NotificationStore, Notifier, PostgresNotificationStore,
};
use crate::realtime::RealtimeHub;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Present only with the PostgreSQL backend
    pub db_pool: Option<DbPool>,
    pub directory: Arc<dyn Directory>,
    pub hub: Arc<RealtimeHub>,
    pub chat: Arc<ChatService>,
    pub inbox: Arc<InboxAggregator>,
    pub bookings: Arc<BookingLedger>,
    pub notifier: Arc<Notifier>,
}

impl AppContext {
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::default()
    }
}

#[derive(Default)]
pub struct AppContextBuilder {
    config: Option<Arc<Config>>,
    db_pool: Option<DbPool>,
    directory: Option<Arc<dyn Directory>>,
    message_store: Option<Arc<dyn MessageStore>>,
    booking_store: Option<Arc<dyn BookingStore>>,
    notification_store: Option<Arc<dyn NotificationStore>>,
    email: Option<Arc<dyn EmailDispatcher>>,
}

impl AppContextBuilder {
    pub fn with_config(mut self, config: Arc<Config>) -> Self {
        self.config = Some(config);
        self
    }

    /// Back directory and stores with PostgreSQL. Stores set explicitly
    /// take precedence.
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.directory
            .get_or_insert_with(|| Arc::new(PostgresDirectory::new(pool.clone())));
        self.message_store
            .get_or_insert_with(|| Arc::new(PostgresMessageStore::new(pool.clone())));
        self.booking_store
            .get_or_insert_with(|| Arc::new(PostgresBookingStore::new(pool.clone())));
        self.notification_store
            .get_or_insert_with(|| Arc::new(PostgresNotificationStore::new(pool.clone())));
        self.db_pool = Some(pool);
        self
    }

    /// Process-local stores for everything not set yet
    pub fn with_in_memory_stores(mut self) -> Self {
        self.message_store
            .get_or_insert_with(|| Arc::new(InMemoryMessageStore::new()));
        self.booking_store
            .get_or_insert_with(|| Arc::new(InMemoryBookingStore::new()));
        self.notification_store
            .get_or_insert_with(|| Arc::new(InMemoryNotificationStore::new()));
        self
    }

    pub fn with_directory(mut self, directory: Arc<dyn Directory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn with_message_store(mut self, store: Arc<dyn MessageStore>) -> Self {
        self.message_store = Some(store);
        self
    }

    pub fn with_booking_store(mut self, store: Arc<dyn BookingStore>) -> Self {
        self.booking_store = Some(store);
        self
    }

    pub fn with_notification_store(mut self, store: Arc<dyn NotificationStore>) -> Self {
        self.notification_store = Some(store);
        self
    }

    pub fn with_email(mut self, email: Arc<dyn EmailDispatcher>) -> Self {
        self.email = Some(email);
        self
    }

    pub fn build(self) -> Result<AppContext> {
        let config = self.config.context("AppContext requires a config")?;
        let directory = self.directory.context("AppContext requires a directory")?;
        let message_store = self
            .message_store
            .context("AppContext requires a message store")?;
        let booking_store = self
            .booking_store
            .context("AppContext requires a booking store")?;
        let notification_store = self
            .notification_store
            .context("AppContext requires a notification store")?;
        let email = self
            .email
            .unwrap_or_else(|| Arc::new(LogEmailDispatcher));

        let hub = Arc::new(RealtimeHub::new());
        let notifier = Arc::new(Notifier::new(
            notification_store,
            hub.clone(),
            config.notifications.clone(),
            config.logging.clone(),
        ));
        let chat = Arc::new(ChatService::new(
            message_store.clone(),
            directory.clone(),
            hub.clone(),
            notifier.clone(),
            config.logging.clone(),
        ));
        let inbox = Arc::new(InboxAggregator::new(
            message_store,
            directory.clone(),
            config.logging.clone(),
        ));
        let bookings = Arc::new(BookingLedger::new(
            booking_store,
            directory.clone(),
            notifier.clone(),
            email,
            config.logging.clone(),
        ));

        Ok(AppContext {
            config,
            db_pool: self.db_pool,
            directory,
            hub,
            chat,
            inbox,
            bookings,
            notifier,
        })
    }
}
