pub mod errors;
pub mod format;
pub mod models;
pub mod providers;
pub mod services;

use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info};
use models::{
    allocation::{AllocationEntry, AllocationView, CurrentTotals},
    chart::DailySeries,
    identity::Identity,
    notification::Notification,
    record::{RecordDraft, SnapshotRecord},
    settings::Settings,
};
use providers::gemini::GeminiSummarizer;
use providers::traits::{IdentityProvider, RecordStore, RecordSubscription, Summarizer};
use services::{
    allocation_service::AllocationService, analysis_service::AnalysisService,
    chart_service::ChartService, pagination_service::PaginationService,
    record_service::RecordService, retry_policy::RetryPolicy,
    sequence_service::SequenceService, snapshot_service::SnapshotService,
};

use errors::CoreError;

/// Every view derived from one record collection, rebuilt together.
#[derive(Debug, Clone, Default)]
struct DerivedViews {
    ascending: Vec<SnapshotRecord>,
    descending: Vec<SnapshotRecord>,
    series: DailySeries,
    totals: CurrentTotals,
    by_asset_class: Vec<AllocationEntry>,
    by_institution: Vec<AllocationEntry>,
    suggested_institutions: Vec<String>,
}

/// Main entry point for the Net Worth Tracker core library.
///
/// Holds the latest record collection pushed by the store, the views derived
/// from it, and the small amount of UI state those views depend on (page
/// number, allocation view, pending delete, analysis text, notification).
/// Derived views are recomputed only when the collection is replaced.
#[must_use]
pub struct NetWorthTracker {
    settings: Settings,
    identity: Option<Identity>,
    records: Vec<SnapshotRecord>,
    views: DerivedViews,
    current_page: usize,
    allocation_view: AllocationView,
    pending_delete: Option<String>,
    analysis: String,
    notification: Option<Notification>,
    summarizer: Option<GeminiSummarizer>,
    sequence_service: SequenceService,
    chart_service: ChartService,
    snapshot_service: SnapshotService,
    allocation_service: AllocationService,
    pagination_service: PaginationService,
    record_service: RecordService,
    analysis_service: AnalysisService,
    retry_policy: RetryPolicy,
}

impl std::fmt::Debug for NetWorthTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetWorthTracker")
            .field("identity", &self.identity.as_ref().map(|i| &i.uid))
            .field("records", &self.records.len())
            .field("days", &self.views.series.len())
            .field("current_page", &self.current_page)
            .field("allocation_view", &self.allocation_view)
            .field("summarizer", &self.summarizer.is_some())
            .finish()
    }
}

impl NetWorthTracker {
    /// Create a tracker with default settings and no data.
    pub fn create_new() -> Self {
        Self::build(Settings::default())
    }

    /// Create a tracker with custom settings (validated first).
    pub fn with_settings(settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    // ── Identity ────────────────────────────────────────────────────

    /// Sign in through the identity provider, retrying transient failures.
    pub async fn sign_in(&mut self, provider: &dyn IdentityProvider) -> Result<Identity, CoreError> {
        match self.retry_policy.run("sign-in", || provider.sign_in()).await {
            Ok(identity) => {
                self.set_identity(Some(identity.clone()));
                self.notify_success("Signed in");
                Ok(identity)
            }
            Err(e) => {
                error!("Sign-in failed: {e}");
                self.notify_error("Sign-in failed, please try again later");
                Err(e)
            }
        }
    }

    /// Sign out and drop every record held for the previous identity.
    pub async fn sign_out(&mut self, provider: &dyn IdentityProvider) -> Result<(), CoreError> {
        provider.sign_out().await.inspect_err(|e| error!("Sign-out failed: {e}"))?;
        self.set_identity(None);
        self.notify_success("Signed out");
        Ok(())
    }

    /// Follow an identity change pushed by the provider.
    /// A different (or no) identity clears the working collection.
    pub fn set_identity(&mut self, identity: Option<Identity>) {
        let changed = self.identity.as_ref().map(|i| &i.uid) != identity.as_ref().map(|i| &i.uid);
        self.identity = identity;
        if changed {
            self.pending_delete = None;
            self.analysis.clear();
            self.apply_snapshot(Vec::new());
            self.current_page = 1;
        }
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    // ── Live Records ────────────────────────────────────────────────

    /// Open a live subscription for the signed-in identity, retrying transient failures.
    pub async fn subscribe(&mut self, store: &dyn RecordStore) -> Result<RecordSubscription, CoreError> {
        let identity = self.identity.clone().ok_or(CoreError::NotSignedIn)?;
        let result = self.retry_policy.run("subscribe", || store.subscribe(&identity)).await;
        match result {
            Ok(subscription) => Ok(subscription),
            Err(e) => {
                error!("Subscribing to {} failed: {e}", store.name());
                self.notify_error("Could not load your records, please try again later");
                Err(e)
            }
        }
    }

    /// Wait for the next collection on `subscription` and apply it.
    ///
    /// Returns `false` once the subscription has ended, or when it belongs to
    /// an identity other than the one signed in now; its events are dropped.
    pub async fn pump(&mut self, subscription: &mut RecordSubscription) -> bool {
        if !self.owns(subscription) {
            debug!("Ignoring stale subscription for {}", subscription.uid());
            return false;
        }
        match subscription.next().await {
            Some(records) if self.owns(subscription) => {
                self.apply_snapshot(records);
                true
            }
            Some(_) => {
                debug!("Dropped event from stale subscription for {}", subscription.uid());
                false
            }
            None => {
                debug!("Record subscription closed");
                false
            }
        }
    }

    fn owns(&self, subscription: &RecordSubscription) -> bool {
        self.identity.as_ref().is_some_and(|i| i.uid == subscription.uid())
    }

    /// Replace the working collection wholesale and rebuild every derived view.
    ///
    /// The page number is clamped if the collection shrank below it.
    pub fn apply_snapshot(&mut self, records: Vec<SnapshotRecord>) {
        self.records = records;
        self.views = self.derive();
        self.current_page = self
            .pagination_service
            .clamp_page(self.current_page, self.records.len());
        debug!(
            "Applied snapshot: {} record(s), {} day(s), page {}/{}",
            self.records.len(),
            self.views.series.len(),
            self.current_page,
            self.total_pages()
        );
    }

    /// Records in store order, as last received.
    #[must_use]
    pub fn records(&self) -> &[SnapshotRecord] {
        &self.records
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    // ── Derived Views ───────────────────────────────────────────────

    /// Records oldest first (chart order).
    #[must_use]
    pub fn chart_records(&self) -> &[SnapshotRecord] {
        &self.views.ascending
    }

    /// One point per day, oldest first.
    #[must_use]
    pub fn chart_series(&self) -> &DailySeries {
        &self.views.series
    }

    /// Records newest first (history table order).
    #[must_use]
    pub fn table_rows(&self) -> &[SnapshotRecord] {
        &self.views.descending
    }

    /// Table rows on the active page.
    #[must_use]
    pub fn current_page_rows(&self) -> &[SnapshotRecord] {
        self.pagination_service
            .page(&self.views.descending, self.current_page)
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.pagination_service.total_pages(self.views.descending.len())
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Totals of the most recent day.
    #[must_use]
    pub fn current_totals(&self) -> &CurrentTotals {
        &self.views.totals
    }

    /// Breakdown for the selected allocation view.
    #[must_use]
    pub fn allocation(&self) -> &[AllocationEntry] {
        self.allocation_for(self.allocation_view)
    }

    #[must_use]
    pub fn allocation_for(&self, view: AllocationView) -> &[AllocationEntry] {
        match view {
            AllocationView::AssetClass => &self.views.by_asset_class,
            AllocationView::Institution => &self.views.by_institution,
        }
    }

    /// Known institution names for the entry form.
    #[must_use]
    pub fn suggested_institutions(&self) -> &[String] {
        &self.views.suggested_institutions
    }

    // ── Pagination & View Mode ──────────────────────────────────────

    /// Jump to `page`, kept within 1..=total pages.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = self
            .pagination_service
            .clamp_page(page, self.records.len());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.current_page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.current_page.saturating_sub(1));
    }

    #[must_use]
    pub fn allocation_view(&self) -> AllocationView {
        self.allocation_view
    }

    pub fn set_allocation_view(&mut self, view: AllocationView) {
        self.allocation_view = view;
    }

    pub fn toggle_allocation_view(&mut self) {
        self.allocation_view = self.allocation_view.toggled();
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Validate and submit a new record.
    ///
    /// Validation errors are reported without contacting the store. On
    /// success the table returns to page 1; the record itself shows up with
    /// the store's next pushed collection.
    pub async fn submit_record(
        &mut self,
        store: &dyn RecordStore,
        draft: &RecordDraft,
    ) -> Result<String, CoreError> {
        let Some(identity) = self.identity.clone() else {
            return Err(CoreError::NotSignedIn);
        };

        match self
            .record_service
            .submit(store, &identity, draft, Utc::now())
            .await
        {
            Ok(id) => {
                self.current_page = 1;
                self.notify_success("Record added");
                Ok(id)
            }
            Err(CoreError::ValidationError(message)) => {
                self.notify_error(&message);
                Err(CoreError::ValidationError(message))
            }
            Err(e) => {
                self.notify_error("Save failed, please check your connection");
                Err(e)
            }
        }
    }

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: impl Into<String>) {
        self.pending_delete = Some(id.into());
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    #[must_use]
    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// Delete the record awaiting confirmation. The pending id is cleared
    /// whatever the outcome. Without a pending id this is a no-op.
    pub async fn confirm_delete(&mut self, store: &dyn RecordStore) -> Result<(), CoreError> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(());
        };
        let Some(identity) = self.identity.clone() else {
            return Err(CoreError::NotSignedIn);
        };

        match self.record_service.delete(store, &identity, &id).await {
            Ok(()) => {
                self.notify_success("Record deleted");
                Ok(())
            }
            Err(e) => {
                self.notify_error("Delete failed");
                Err(e)
            }
        }
    }

    // ── Analysis ────────────────────────────────────────────────────

    /// Request a narrative summary of the recent days.
    /// On failure the previous analysis text is kept.
    pub async fn run_analysis(&mut self, summarizer: &dyn Summarizer) -> Result<&str, CoreError> {
        match self
            .analysis_service
            .analyze(summarizer, &self.views.series)
            .await
        {
            Ok(text) => {
                info!("Received analysis from {}", summarizer.name());
                self.analysis = text;
                Ok(&self.analysis)
            }
            Err(e) => {
                self.notify_error("Analysis is unavailable right now");
                Err(e)
            }
        }
    }

    #[must_use]
    pub fn analysis(&self) -> &str {
        &self.analysis
    }

    // ── Notifications ───────────────────────────────────────────────

    /// The banner to show right now, if any.
    #[must_use]
    pub fn notification(&self) -> Option<&Notification> {
        self.notification_at(Utc::now())
    }

    #[must_use]
    pub fn notification_at(&self, now: DateTime<Utc>) -> Option<&Notification> {
        self.notification.as_ref().filter(|n| !n.is_expired(now))
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn get_settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings and rebuild everything that depends on them.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), CoreError> {
        settings.validate()?;
        self.allocation_service = AllocationService::new(&settings);
        self.pagination_service = PaginationService::new(settings.page_size);
        self.analysis_service = AnalysisService::new(settings.summary_window_days);
        self.retry_policy = RetryPolicy::from_settings(&settings.retry);
        self.summarizer = GeminiSummarizer::from_api_keys(&settings.api_keys);
        self.settings = settings;

        let records = std::mem::take(&mut self.records);
        self.apply_snapshot(records);
        Ok(())
    }

    /// Set an API key for a provider (e.g., "gemini").
    /// The configured summarizer is rebuilt so the new key takes effect immediately.
    pub fn set_api_key(&mut self, provider: impl Into<String>, key: impl Into<String>) {
        self.settings.api_keys.insert(provider.into(), key.into());
        self.summarizer = GeminiSummarizer::from_api_keys(&self.settings.api_keys);
    }

    /// Remove an API key. Returns whether a key was present.
    pub fn remove_api_key(&mut self, provider: &str) -> bool {
        let removed = self.settings.api_keys.remove(provider).is_some();
        if removed {
            self.summarizer = GeminiSummarizer::from_api_keys(&self.settings.api_keys);
        }
        removed
    }

    /// The summarizer built from the configured API keys, if any.
    /// Clone it to pass to [`run_analysis`](Self::run_analysis).
    #[must_use]
    pub fn summarizer(&self) -> Option<&GeminiSummarizer> {
        self.summarizer.as_ref()
    }

    // ── Export ──────────────────────────────────────────────────────

    /// Export records (table order) as a JSON string.
    pub fn export_records_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.views.descending)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize records to JSON: {e}")))
    }

    /// Export records (table order) as a CSV string.
    /// Columns: id, date, institution, bank, stock, total, note
    #[must_use]
    pub fn export_records_to_csv(&self) -> String {
        let mut csv = String::from("id,date,institution,bank,stock,total,note\n");
        for record in &self.views.descending {
            let date = record.date.map(|d| d.to_string()).unwrap_or_default();
            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                csv_field(&record.id),
                date,
                csv_field(&record.institution),
                record.bank,
                record.stock,
                record.total(),
                csv_field(record.note.as_deref().unwrap_or("")),
            ));
        }
        csv
    }

    // ── Internal ────────────────────────────────────────────────────

    fn derive(&self) -> DerivedViews {
        let ascending = self.sequence_service.ascending(&self.records);
        let descending = self.sequence_service.descending(&self.records);
        let series = self.chart_service.aggregate_daily(&ascending);
        let totals = self.snapshot_service.current_totals(&series, &ascending);
        let by_asset_class = self.allocation_service.by_asset_class(&totals);
        let by_institution = self.allocation_service.by_institution(&totals);
        let suggested_institutions = self.record_service.suggested_institutions(&self.records);

        DerivedViews {
            ascending,
            descending,
            series,
            totals,
            by_asset_class,
            by_institution,
            suggested_institutions,
        }
    }

    fn notify_success(&mut self, message: &str) {
        let ttl = self.notification_ttl();
        self.notification = Some(Notification::success(message, Utc::now(), ttl));
    }

    fn notify_error(&mut self, message: &str) {
        let ttl = self.notification_ttl();
        self.notification = Some(Notification::error(message, Utc::now(), ttl));
    }

    fn notification_ttl(&self) -> Duration {
        // capped at one day; chrono panics on out-of-range durations
        let secs = self.settings.notification_ttl_secs.min(86_400);
        Duration::seconds(i64::try_from(secs).unwrap_or(86_400))
    }

    fn build(settings: Settings) -> Self {
        let allocation_service = AllocationService::new(&settings);
        let pagination_service = PaginationService::new(settings.page_size);
        let analysis_service = AnalysisService::new(settings.summary_window_days);
        let retry_policy = RetryPolicy::from_settings(&settings.retry);
        let summarizer = GeminiSummarizer::from_api_keys(&settings.api_keys);

        Self {
            settings,
            identity: None,
            records: Vec::new(),
            views: DerivedViews::default(),
            current_page: 1,
            allocation_view: AllocationView::default(),
            pending_delete: None,
            analysis: String::new(),
            notification: None,
            summarizer,
            sequence_service: SequenceService::new(),
            chart_service: ChartService::new(),
            snapshot_service: SnapshotService::new(),
            allocation_service,
            pagination_service,
            record_service: RecordService::new(),
            analysis_service,
            retry_policy,
        }
    }
}

impl Default for NetWorthTracker {
    fn default() -> Self {
        Self::create_new()
    }
}

/// Quote a CSV field containing commas, quotes, or newlines.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
