//! Catalog seeder
//!
//! Authenticates once, then creates and publishes every catalog record in
//! dependency order: categories, products, banners, showcases. Products carry
//! the ids of categories created earlier in the same run; showcases carry the
//! ids of products.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use tokio::time::{sleep_until, Instant};
use tracing::{error, info, warn};

use crate::catalog::{ProductSeed, SeedCatalog, ShowcaseSeed};
use crate::domain::{BannerRecord, CategoryRecord, EntityKind, Record, RecordId, SeedEvent, Sku, Slug};
use crate::store::{ContentStore, Credentials};
use crate::{SeedError, Result};

/// What to do when the store refuses to create a record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicy {
    /// Stop the run at the first refused record.
    #[default]
    Abort,
    /// Log the refusal and carry on with the next record.
    Continue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedPhase { NotAuthenticated, Authenticated, Seeding, Done, Failed }

impl fmt::Display for SeedPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Debug::fmt(self, f) }
}

#[derive(Clone, Debug)]
pub struct SeederOptions {
    pub policy: FailurePolicy,
    /// Minimum spacing between two record submissions.
    pub pace: Duration,
}

impl Default for SeederOptions {
    fn default() -> Self { Self { policy: FailurePolicy::Abort, pace: Duration::from_millis(500) } }
}

/// Keeps consecutive submissions at least `interval` apart.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self { Self { interval, last: None } }

    /// Wait until the next submission is allowed, then claim the slot.
    pub async fn ready(&mut self) {
        if let Some(last) = self.last {
            sleep_until(last + self.interval).await;
        }
        self.last = Some(Instant::now());
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KindTally {
    pub created: usize,
    pub published: usize,
    pub drafts: usize,
    pub failed: usize,
}

#[derive(Clone, Debug)]
pub struct SeedReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tallies: BTreeMap<EntityKind, KindTally>,
    pub dropped_references: usize,
    /// Fields the adapter could not fill in, as `label: attribute` lines.
    pub manual_steps: Vec<String>,
}

impl SeedReport {
    fn from_events(events: &[SeedEvent], started_at: DateTime<Utc>, manual_steps: Vec<String>) -> Self {
        let mut tallies: BTreeMap<EntityKind, KindTally> = EntityKind::ALL.iter().map(|k| (*k, KindTally::default())).collect();
        let mut dropped_references = 0;
        for event in events {
            let tally = tallies.entry(event.kind()).or_default();
            match event {
                SeedEvent::Created { .. } => tally.created += 1,
                SeedEvent::Published { .. } => tally.published += 1,
                SeedEvent::PublishFailed { .. } => tally.drafts += 1,
                SeedEvent::CreateFailed { .. } => tally.failed += 1,
                SeedEvent::ReferenceDropped { .. } => dropped_references += 1,
            }
        }
        Self { started_at, finished_at: Utc::now(), tallies, dropped_references, manual_steps }
    }

    pub fn tally(&self, kind: EntityKind) -> KindTally { self.tallies.get(&kind).copied().unwrap_or_default() }

    pub fn total_published(&self) -> usize { self.tallies.values().map(|t| t.published).sum() }

    pub fn total_failed(&self) -> usize { self.tallies.values().map(|t| t.failed).sum() }

    pub fn log_summary(&self) {
        let elapsed = (self.finished_at - self.started_at).num_milliseconds();
        info!(elapsed_ms = elapsed, published = self.total_published(), "catalog seeding finished");
        for (kind, tally) in &self.tallies {
            info!(%kind, created = tally.created, published = tally.published, drafts = tally.drafts, failed = tally.failed, "summary");
        }
        if self.dropped_references > 0 {
            warn!(count = self.dropped_references, "references to records that failed were left out");
        }
        for step in &self.manual_steps {
            warn!(field = %step, "configure manually in the admin panel");
        }
        for reminder in self.reminders() {
            info!("{reminder}");
        }
    }

    /// Follow-up work the seeder leaves to a human.
    pub fn reminders(&self) -> Vec<String> {
        let mut reminders = vec!["images are not uploaded by the seeder; attach them in the admin panel".to_string()];
        if self.manual_steps.iter().any(|step| step.ends_with("(relation)")) {
            reminders.push("link products to their categories and showcases to their products by hand".to_string());
        }
        if !self.manual_steps.is_empty() {
            reminders.push(format!("{} fields still need values in the admin panel", self.manual_steps.len()));
        }
        reminders.push(format!(
            "grant the Public role find and findOne on {} so the storefront can read them",
            EntityKind::ALL.iter().map(|k| k.collection()).collect::<Vec<_>>().join(", ")
        ));
        reminders
    }
}

pub struct Seeder<S> {
    store: S,
    options: SeederOptions,
    phase: SeedPhase,
    pacer: Pacer,
    events: Vec<SeedEvent>,
    categories: HashMap<Slug, RecordId>,
    products: HashMap<Sku, RecordId>,
}

impl<S: ContentStore> Seeder<S> {
    pub fn new(store: S, options: SeederOptions) -> Self {
        let pacer = Pacer::new(options.pace);
        Self {
            store, options, phase: SeedPhase::NotAuthenticated, pacer, events: Vec::new(),
            categories: HashMap::new(), products: HashMap::new(),
        }
    }

    pub fn phase(&self) -> SeedPhase { self.phase }
    pub fn events(&self) -> &[SeedEvent] { &self.events }
    pub fn store(&self) -> &S { &self.store }
    pub fn store_mut(&mut self) -> &mut S { &mut self.store }
    pub fn into_store(self) -> S { self.store }

    /// Identifier of a category created in this run.
    pub fn category_id(&self, slug: &Slug) -> Option<&RecordId> { self.categories.get(slug) }

    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        info!(store = self.store.name(), email = %credentials.email, "logging in");
        match self.store.authenticate(credentials).await {
            Ok(()) => {
                self.phase = SeedPhase::Authenticated;
                info!("login succeeded");
                Ok(())
            }
            Err(e) => {
                self.phase = SeedPhase::Failed;
                error!(error = %e, "login failed");
                Err(SeedError::Authentication(e))
            }
        }
    }

    /// Authenticate, provision the whole catalog and summarize.
    pub async fn run(&mut self, credentials: &Credentials, catalog: &SeedCatalog) -> Result<SeedReport> {
        let started_at = Utc::now();
        self.events.clear();
        self.categories.clear();
        self.products.clear();
        self.authenticate(credentials).await?;
        match self.seed(catalog).await {
            Ok(()) => {
                self.phase = SeedPhase::Done;
                let manual_steps = self.store.take_manual_steps();
                Ok(SeedReport::from_events(&self.events, started_at, manual_steps))
            }
            Err(e) => {
                self.phase = SeedPhase::Failed;
                Err(e)
            }
        }
    }

    async fn seed(&mut self, catalog: &SeedCatalog) -> Result<()> {
        info!(count = catalog.categories.len(), "creating categories");
        for category in &catalog.categories {
            self.create_category(category).await?;
        }
        info!(count = catalog.products.len(), "creating products");
        for product in &catalog.products {
            self.create_product(product).await?;
        }
        info!(count = catalog.banners.len(), "creating banners");
        for banner in &catalog.banners {
            self.create_banner(banner).await?;
        }
        info!(count = catalog.showcases.len(), "creating showcases");
        for showcase in &catalog.showcases {
            self.create_showcase(showcase).await?;
        }
        Ok(())
    }

    /// Returns `None` when the store refused the category and the policy is
    /// [`FailurePolicy::Continue`].
    pub async fn create_category(&mut self, category: &CategoryRecord) -> Result<Option<RecordId>> {
        let id = self.provision(Record::Category(category.clone())).await?;
        if let Some(id) = &id {
            self.categories.insert(category.slug.clone(), id.clone());
        }
        Ok(id)
    }

    pub async fn create_product(&mut self, product: &ProductSeed) -> Result<Option<RecordId>> {
        let categories = self.resolve(EntityKind::Product, &product.title, &product.categories, |s, slug| s.categories.get(slug).cloned());
        let id = self.provision(Record::Product(product.clone().with_categories(categories))).await?;
        if let Some(id) = &id {
            self.products.insert(product.sku.clone(), id.clone());
        }
        Ok(id)
    }

    pub async fn create_banner(&mut self, banner: &BannerRecord) -> Result<Option<RecordId>> {
        self.provision(Record::Banner(banner.clone())).await
    }

    pub async fn create_showcase(&mut self, showcase: &ShowcaseSeed) -> Result<Option<RecordId>> {
        let products = self.resolve(EntityKind::Showcase, &showcase.title, &showcase.products, |s, sku| s.products.get(sku).cloned());
        self.provision(Record::Showcase(showcase.clone().with_products(products))).await
    }

    /// Map catalog references to ids from this run, dropping any whose target
    /// was never created.
    fn resolve<K: fmt::Display>(
        &mut self,
        kind: EntityKind,
        label: &str,
        references: &[K],
        lookup: impl Fn(&Self, &K) -> Option<RecordId>,
    ) -> Vec<RecordId> {
        let mut resolved = Vec::with_capacity(references.len());
        for reference in references {
            match lookup(&*self, reference) {
                Some(id) => resolved.push(id),
                None => {
                    warn!(%kind, label, %reference, "referenced record was not created in this run; leaving it out");
                    self.events.push(SeedEvent::ReferenceDropped { kind, label: label.to_string(), reference: reference.to_string() });
                }
            }
        }
        resolved
    }

    /// Create, then publish. A refused publish leaves the record as a draft
    /// and is never fatal.
    async fn provision(&mut self, record: Record) -> Result<Option<RecordId>> {
        match self.phase {
            SeedPhase::Authenticated | SeedPhase::Seeding => self.phase = SeedPhase::Seeding,
            phase => return Err(SeedError::OutOfPhase(phase)),
        }
        let kind = record.kind();
        let label = record.label().to_string();

        self.pacer.ready().await;
        info!(%kind, %label, "creating");
        let id = match self.store.create_record(&record).await {
            Ok(id) => id,
            Err(source) => {
                error!(%kind, %label, error = %source, "create failed");
                self.events.push(SeedEvent::CreateFailed { kind, label: label.clone(), reason: source.to_string() });
                return match self.options.policy {
                    FailurePolicy::Abort => Err(SeedError::Create { kind, label, source }),
                    FailurePolicy::Continue => Ok(None),
                };
            }
        };
        self.events.push(SeedEvent::Created { kind, label: label.clone(), id: id.clone() });

        match self.store.publish_record(kind, &id).await {
            Ok(()) => {
                info!(%kind, %label, %id, "created and published");
                self.events.push(SeedEvent::Published { kind, id: id.clone(), at: Utc::now() });
            }
            Err(e) => {
                warn!(%kind, %label, %id, error = %e, "saved but not published; left as draft");
                self.events.push(SeedEvent::PublishFailed { kind, id: id.clone(), reason: e.to_string() });
            }
        }
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::collections::HashSet;

    fn options(policy: FailurePolicy) -> SeederOptions { SeederOptions { policy, pace: Duration::ZERO } }
    fn credentials() -> Credentials { Credentials::new("admin@example.com", "secret") }
    fn store() -> MemoryStore { MemoryStore::with_credentials(credentials()) }

    #[tokio::test]
    async fn test_sample_catalog_is_fully_published() {
        let catalog = SeedCatalog::sample().unwrap();
        let mut seeder = Seeder::new(store(), options(FailurePolicy::Abort));
        let report = seeder.run(&credentials(), &catalog).await.unwrap();

        assert_eq!(seeder.phase(), SeedPhase::Done);
        assert_eq!(report.total_published(), 20);
        assert_eq!(report.tally(EntityKind::Category), KindTally { created: 6, published: 6, drafts: 0, failed: 0 });
        assert_eq!(report.tally(EntityKind::Product).published, 8);
        assert_eq!(report.tally(EntityKind::Banner).published, 3);
        assert_eq!(report.tally(EntityKind::Showcase).published, 3);

        let store = seeder.store();
        let category_ids: HashSet<_> = store.entries_of(EntityKind::Category).map(|e| e.id.clone()).collect();
        assert_eq!(category_ids.len(), 6);
        assert_eq!(store.published_count(), 20);
    }

    #[tokio::test]
    async fn test_product_references_only_created_categories() {
        let catalog = SeedCatalog::sample().unwrap();
        let mut seeder = Seeder::new(store(), options(FailurePolicy::Abort));
        seeder.run(&credentials(), &catalog).await.unwrap();

        let food = seeder.category_id(&Slug::new("food").unwrap()).cloned().unwrap();
        let category_ids: Vec<RecordId> = seeder.store().entries_of(EntityKind::Category).map(|e| e.id.clone()).collect();
        for entry in seeder.store().entries_of(EntityKind::Product) {
            let Record::Product(product) = &entry.record else { panic!("not a product") };
            assert!(product.categories.iter().all(|id| category_ids.contains(id)));
        }
        let Record::Product(racao) = &seeder.store().find("Ração Premium Cães Adultos").unwrap().record else { panic!() };
        assert_eq!(racao.categories, vec![food]);
    }

    #[tokio::test]
    async fn test_authentication_failure_creates_nothing() {
        let catalog = SeedCatalog::sample().unwrap();
        let mut seeder = Seeder::new(store(), options(FailurePolicy::Continue));
        let err = seeder.run(&Credentials::new("admin@example.com", "wrong"), &catalog).await.unwrap_err();
        assert!(matches!(err, SeedError::Authentication(_)));
        assert_eq!(seeder.phase(), SeedPhase::Failed);
        assert_eq!(seeder.store().create_attempts(), 0);
    }

    #[tokio::test]
    async fn test_create_before_login_is_refused() {
        let mut seeder = Seeder::new(store(), options(FailurePolicy::Abort));
        let food = CategoryRecord::new("Food", Slug::new("food").unwrap(), 1);
        let err = seeder.create_category(&food).await.unwrap_err();
        assert!(matches!(err, SeedError::OutOfPhase(SeedPhase::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_publish_failure_leaves_single_draft() {
        let catalog = SeedCatalog::sample().unwrap();
        let mut seeder = Seeder::new(store().rejecting_publish_of("Toys"), options(FailurePolicy::Abort));
        let report = seeder.run(&credentials(), &catalog).await.unwrap();

        assert_eq!(report.tally(EntityKind::Category), KindTally { created: 6, published: 5, drafts: 1, failed: 0 });
        let toys: Vec<_> = seeder.store().entries().iter().filter(|e| e.record.label() == "Toys").collect();
        assert_eq!(toys.len(), 1);
        assert!(!toys[0].is_published());
        // the draft still has an id, so products keep referencing it
        let Record::Product(ball) = &seeder.store().find("Bola Interativa").unwrap().record else { panic!() };
        assert_eq!(ball.categories, vec![toys[0].id.clone()]);
    }

    #[tokio::test]
    async fn test_abort_policy_stops_at_first_refusal() {
        let catalog = SeedCatalog::sample().unwrap();
        let mut seeder = Seeder::new(store().rejecting_create_of("Beds"), options(FailurePolicy::Abort));
        let err = seeder.run(&credentials(), &catalog).await.unwrap_err();

        assert!(matches!(err, SeedError::Create { kind: EntityKind::Category, ref label, .. } if label == "Beds"));
        assert_eq!(seeder.phase(), SeedPhase::Failed);
        assert_eq!(seeder.store().create_attempts(), 3);
        assert_eq!(seeder.store().entries().len(), 2);
    }

    #[tokio::test]
    async fn test_continue_policy_drops_dangling_references() {
        let catalog = SeedCatalog::sample().unwrap();
        let mut seeder = Seeder::new(store().rejecting_create_of("Beds"), options(FailurePolicy::Continue));
        let report = seeder.run(&credentials(), &catalog).await.unwrap();

        assert_eq!(seeder.phase(), SeedPhase::Done);
        assert_eq!(report.total_failed(), 1);
        assert_eq!(report.total_published(), 19);
        assert_eq!(report.dropped_references, 1);
        let Record::Product(bed) = &seeder.store().find("Cama Ortopédica").unwrap().record else { panic!() };
        assert!(bed.categories.is_empty());
    }

    #[tokio::test]
    async fn test_second_run_duplicates_records() {
        let catalog = SeedCatalog::sample().unwrap();
        let mut seeder = Seeder::new(store(), options(FailurePolicy::Abort));
        seeder.run(&credentials(), &catalog).await.unwrap();
        seeder.run(&credentials(), &catalog).await.unwrap();
        assert_eq!(seeder.store().entries_of(EntityKind::Category).count(), 12);
        assert_eq!(seeder.store().published_count(), 40);
    }

    #[tokio::test]
    async fn test_rerun_never_reuses_previous_run_ids() {
        let catalog = SeedCatalog::sample().unwrap();
        let beds = Slug::new("beds").unwrap();
        let mut seeder = Seeder::new(store(), options(FailurePolicy::Continue));
        seeder.run(&credentials(), &catalog).await.unwrap();
        let first_beds = seeder.category_id(&beds).cloned().unwrap();

        let refusing = std::mem::take(seeder.store_mut()).rejecting_create_of("Beds");
        *seeder.store_mut() = refusing;
        let report = seeder.run(&credentials(), &catalog).await.unwrap();

        assert_eq!(report.tally(EntityKind::Category).failed, 1);
        assert_eq!(report.dropped_references, 1);
        assert!(seeder.category_id(&beds).is_none());
        let bed_products: Vec<_> = seeder.store().entries().iter().filter(|e| e.record.label() == "Cama Ortopédica").collect();
        assert_eq!(bed_products.len(), 2);
        let Record::Product(second) = &bed_products[1].record else { panic!("not a product") };
        assert!(second.categories.is_empty());
        assert!(!second.categories.contains(&first_beds));
    }

    #[test]
    fn test_reminders_cover_images_permissions_and_relations() {
        let mut report = SeedReport::from_events(&[], Utc::now(), Vec::new());
        let reminders = report.reminders();
        assert_eq!(reminders.len(), 2);
        assert!(reminders[0].contains("images"));
        assert!(reminders[1].contains("Public role") && reminders[1].contains("categories, products, banners, showcases"));

        report.manual_steps = vec!["Cama Ortopédica: categorias (relation)".into(), "Cama Ortopédica: tamanhos (product.size component)".into()];
        let reminders = report.reminders();
        assert!(reminders.iter().any(|r| r.starts_with("link products to their categories")));
        assert!(reminders.iter().any(|r| r.starts_with("2 fields")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacer_spaces_submissions() {
        let mut pacer = Pacer::new(Duration::from_millis(500));
        let start = Instant::now();
        pacer.ready().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        pacer.ready().await;
        pacer.ready().await;
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }
}
