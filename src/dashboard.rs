//! Top-level controller owning the application state.
//!
//! The dashboard keeps the last successfully loaded list of assets, the table
//! view state, the edit form and the pending delete confirmation. Mutations are
//! validated locally, sent to the [`AssetHandler`] and followed by a full reload;
//! the cache is never patched in place. Failures are reported as notices and
//! leave the cache untouched.
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::datatypes::{Asset, AssetForm, AssetHandler, DataError};
use crate::debounce::Debouncer;
use crate::stats::{summarize, DashboardStats, StatsError, TimeGrouping, ValueSummary};
use crate::table::{
    AssetFilter, PageSize, SortColumn, SortOrder, TableError, TablePage, TableView,
};

/// Client side copy of the backend asset list.
///
/// Every reload draws a ticket; a loaded list is only installed if its ticket
/// is newer than the one of the installed list, so a slow response to an older
/// request can not overwrite newer data.
#[derive(Debug, Default)]
pub struct AssetStore {
    assets: Vec<Asset>,
    issued: u64,
    installed: u64,
}

impl AssetStore {
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn find(&self, id: i32) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == Some(id))
    }

    /// Ticket for a new reload request
    pub fn ticket(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Replace the whole list, returns false if a newer list is installed already
    pub fn install(&mut self, ticket: u64, assets: Vec<Asset>) -> bool {
        if ticket <= self.installed {
            debug!(
                "discarding asset list of request {}, request {} is newer",
                ticket, self.installed
            );
            return false;
        }
        self.installed = ticket;
        self.assets = assets;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient message for the user
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

pub struct Dashboard {
    handler: Arc<dyn AssetHandler + Send + Sync>,
    store: AssetStore,
    view: TableView,
    search: Debouncer<String>,
    form: AssetForm,
    editing: Option<i32>,
    pending_delete: Option<Asset>,
    notices: Vec<Notice>,
    loading: bool,
}

impl Dashboard {
    pub fn new(
        handler: Arc<dyn AssetHandler + Send + Sync>,
        page_size: PageSize,
        search_quiet_period: Duration,
    ) -> Dashboard {
        Dashboard {
            handler,
            store: AssetStore::default(),
            view: TableView::new(page_size),
            search: Debouncer::new(search_quiet_period),
            form: AssetForm::default(),
            editing: None,
            pending_delete: None,
            notices: Vec::new(),
            loading: false,
        }
    }

    pub fn assets(&self) -> &[Asset] {
        self.store.assets()
    }

    /// Cached asset with the given id
    pub fn asset(&self, id: i32) -> Option<&Asset> {
        self.store.find(id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn success(&mut self, text: String) {
        info!("{}", text);
        self.notices.push(Notice {
            level: NoticeLevel::Success,
            text,
        });
    }

    fn failure(&mut self, context: &str, err: &DataError) {
        warn!("{}: {}", context, err);
        self.notices.push(Notice {
            level: NoticeLevel::Error,
            text: format!("{}: {}", context, err.user_message()),
        });
    }

    /// Hand out the collected notices, oldest first
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Start a reload, the returned ticket must be passed to [`Dashboard::finish_reload`]
    pub fn begin_reload(&mut self) -> u64 {
        self.loading = true;
        self.store.ticket()
    }

    /// Install the outcome of a reload. A failed reload keeps the previous list.
    pub fn finish_reload(
        &mut self,
        ticket: u64,
        result: Result<Vec<Asset>, DataError>,
    ) -> Result<usize, DataError> {
        self.loading = false;
        match result {
            Ok(assets) => {
                let count = assets.len();
                if self.store.install(ticket, assets) {
                    self.view.reset_page();
                }
                Ok(count)
            }
            Err(err) => {
                self.failure("loading assets failed", &err);
                Err(err)
            }
        }
    }

    /// Discard the cache and load the full list from the backend
    pub async fn refresh(&mut self) -> Result<usize, DataError> {
        let ticket = self.begin_reload();
        let result = self.handler.get_all_assets().await;
        self.finish_reload(ticket, result)
    }

    // Reload after a successful mutation. The mutation itself stays successful
    // if the reload fails, the failure is reported as notice.
    async fn reload_after_mutation(&mut self) {
        let _ = self.refresh().await;
    }

    pub fn view(&self) -> &TableView {
        &self.view
    }

    pub fn set_filter(&mut self, filter: AssetFilter) {
        self.search.cancel();
        self.view.set_filter(filter);
    }

    pub fn clear_filters(&mut self) {
        self.search.cancel();
        self.view.clear_filters();
    }

    /// Record a keystroke in the search box, the filter follows once the input
    /// has been quiet for the configured period
    pub fn type_search(&mut self, term: &str, now: Instant) {
        self.search.input(term.to_string(), now);
    }

    /// Apply settled search input, returns true if the filter changed
    pub fn poll_search(&mut self, now: Instant) -> bool {
        match self.search.poll(now) {
            Some(term) => {
                self.view.set_search(&term);
                true
            }
            None => false,
        }
    }

    pub fn sort_by(&mut self, column: SortColumn) {
        self.view.sort_by(column);
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.view.set_sort(sort);
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.view.set_page_size(page_size);
    }

    pub fn goto_page(&mut self, page: usize) -> Result<(), TableError> {
        self.view.goto_page(page, self.store.assets())
    }

    pub fn current_page(&self) -> TablePage {
        self.view.current_page(self.store.assets())
    }

    /// Filtered and sorted list as shown, without paging
    pub fn visible(&self) -> Vec<Asset> {
        self.view.visible(self.store.assets())
    }

    /// Key figures of the filtered list
    pub fn visible_summary(&self) -> ValueSummary {
        summarize(&self.visible())
    }

    /// Dashboard figures of the complete list
    pub fn stats(
        &self,
        grouping: TimeGrouping,
        today: NaiveDate,
    ) -> Result<DashboardStats, StatsError> {
        DashboardStats::compute(self.store.assets(), grouping, today)
    }

    pub fn form(&self) -> &AssetForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut AssetForm {
        &mut self.form
    }

    pub fn editing(&self) -> Option<i32> {
        self.editing
    }

    /// Validate the form and create a new asset from it
    pub async fn create(&mut self) -> Result<Asset, DataError> {
        let asset = match self.form.to_asset(None) {
            Ok(asset) => asset,
            Err(err) => {
                let err = DataError::from(err);
                self.failure("creating asset failed", &err);
                return Err(err);
            }
        };
        match self.handler.insert_asset(&asset).await {
            Ok(created) => {
                self.form.clear();
                self.success(format!("asset '{}' has been created", created.name));
                self.reload_after_mutation().await;
                Ok(created)
            }
            Err(err) => {
                self.failure("creating asset failed", &err);
                Err(err)
            }
        }
    }

    /// Fill the form with the cached asset `id` and remember it for saving
    pub fn begin_edit(&mut self, id: i32) -> Result<&AssetForm, DataError> {
        let form = match self.store.find(id) {
            Some(asset) => AssetForm::from_asset(asset),
            None => {
                let err = DataError::NotFound(format!("asset {} to edit", id));
                self.failure("editing asset failed", &err);
                return Err(err);
            }
        };
        self.form = form;
        self.editing = Some(id);
        Ok(&self.form)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.form.clear();
    }

    /// Validate the form and save it as new state of the edited asset.
    /// Invalid input keeps the edit open, a rejected request closes it.
    pub async fn save_edit(&mut self) -> Result<Asset, DataError> {
        let id = match self.editing {
            Some(id) => id,
            None => {
                let err = DataError::NotEditing;
                self.failure("updating asset failed", &err);
                return Err(err);
            }
        };
        let asset = match self.form.to_asset(Some(id)) {
            Ok(asset) => asset,
            Err(err) => {
                let err = DataError::from(err);
                self.failure("updating asset failed", &err);
                return Err(err);
            }
        };
        let result = self.handler.update_asset(&asset).await;
        self.cancel_edit();
        match result {
            Ok(updated) => {
                self.success(format!("asset '{}' has been updated", updated.name));
                self.reload_after_mutation().await;
                Ok(updated)
            }
            Err(err) => {
                self.failure("updating asset failed", &err);
                Err(err)
            }
        }
    }

    /// First step of deleting: remember the asset and return the question to
    /// ask the user
    pub fn request_delete(&mut self, id: i32) -> Result<String, DataError> {
        match self.store.find(id) {
            Some(asset) => {
                let question = format!(
                    "Do you really want to delete asset \"{}\"? This can not be undone.",
                    asset.name
                );
                self.pending_delete = Some(asset.clone());
                Ok(question)
            }
            None => {
                let err = DataError::NotFound(format!("asset {} to delete", id));
                self.failure("deleting asset failed", &err);
                Err(err)
            }
        }
    }

    pub fn pending_delete(&self) -> Option<&Asset> {
        self.pending_delete.as_ref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Second step of deleting: send the request for the confirmed asset.
    /// The asset disappears from the view with the following reload.
    pub async fn confirm_delete(&mut self) -> Result<(), DataError> {
        let asset = match self.pending_delete.take() {
            Some(asset) => asset,
            None => {
                let err = DataError::NoPendingDelete;
                self.failure("deleting asset failed", &err);
                return Err(err);
            }
        };
        let id = match asset.id {
            Some(id) => id,
            None => {
                let err = DataError::NotFound(asset.name);
                self.failure("deleting asset failed", &err);
                return Err(err);
            }
        };
        match self.handler.delete_asset(id).await {
            Ok(()) => {
                self.success(format!("asset '{}' has been deleted", asset.name));
                self.reload_after_mutation().await;
                Ok(())
            }
            Err(err) => {
                self.failure("deleting asset failed", &err);
                Err(err)
            }
        }
    }
}
