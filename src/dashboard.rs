//! Task dashboard state and operations.
//!
//! The server owns the task list. Every mutation here is followed by a full
//! [`Dashboard::reload`]; the local copy is only ever replaced, never patched.
//! Failures are logged and leave the previous state on screen.

use tracing::{error, info, warn};

use crate::api::TaskApi;
use crate::error::{ApiError, SessionError};
use crate::models::{NewTaskDraft, Route, Task, TaskUpdate};
use crate::session::SessionStore;

pub const EMPTY_MESSAGE: &str = "No tasks yet. Create your first task!";
pub const DEFAULT_DISPLAY_NAME: &str = "User";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded,
}

#[derive(Debug, Default)]
pub struct Dashboard {
    /// Name shown in the "Welcome" banner.
    pub username: String,
    pub tasks: Vec<Task>,
    pub load_state: LoadState,
    pub draft: NewTaskDraft,
    /// Whether the "Create New Task" panel is open.
    pub show_add_form: bool,
    /// Task awaiting delete confirmation.
    pub pending_delete: Option<u64>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry point when the dashboard is shown.
    ///
    /// Without a stored credential this returns [`Route::Login`] and issues no
    /// request. Otherwise the task list is loaded and [`Route::Dashboard`] returned.
    pub async fn activate<A: TaskApi>(&mut self, api: &A, session: &SessionStore) -> Route {
        let Some(current) = session.get() else {
            info!("no session, redirecting to login");
            return Route::Login;
        };
        self.username = if current.username.is_empty() { DEFAULT_DISPLAY_NAME.to_string() } else { current.username };
        self.load_state = LoadState::Loading;
        // Failures are already logged; the dashboard still leaves the loading state.
        let _ = self.reload(api).await;
        Route::Dashboard
    }

    /// Replaces the local list with the server's.
    pub async fn reload<A: TaskApi>(&mut self, api: &A) -> Result<(), ApiError> {
        let result = api.list_tasks().await;
        self.load_state = LoadState::Loaded;
        match result {
            Ok(tasks) => {
                self.tasks = tasks;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to load tasks");
                Err(e)
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    /// Loaded with zero tasks: render the empty-state message instead of a table.
    pub fn is_empty_state(&self) -> bool {
        self.load_state == LoadState::Loaded && self.tasks.is_empty()
    }

    pub fn find(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Opens or closes the creation panel. The draft is kept either way.
    pub fn toggle_add_form(&mut self) {
        self.show_add_form = !self.show_add_form;
    }

    /// Submits the draft, resets it, closes the panel and reloads.
    pub async fn create<A: TaskApi>(&mut self, api: &A) -> Result<(), ApiError> {
        match api.create_task(&self.draft.to_request()).await {
            Ok(task) => {
                info!(id = task.id, title = %task.title, "task created");
                self.draft = NewTaskDraft::default();
                self.show_add_form = false;
                self.reload(api).await
            }
            Err(e) => {
                error!(error = %e, "Failed to add task");
                Err(e)
            }
        }
    }

    /// Flips `pending <-> completed` for one task and reloads.
    ///
    /// An id that is not in the current list is ignored.
    pub async fn toggle_status<A: TaskApi>(&mut self, api: &A, id: u64) -> Result<(), ApiError> {
        let Some(task) = self.find(id) else {
            warn!(id, "toggle requested for unknown task");
            return Ok(());
        };
        let update = TaskUpdate::status(task.status.toggled());
        self.update(api, id, &update).await
    }

    /// Sends a partial update for one task and reloads.
    pub async fn update<A: TaskApi>(&mut self, api: &A, id: u64, update: &TaskUpdate) -> Result<(), ApiError> {
        match api.update_task(id, update).await {
            Ok(task) => {
                info!(id, status = %task.status, "task updated");
                self.reload(api).await
            }
            Err(e) => {
                error!(id, error = %e, "Failed to update task");
                Err(e)
            }
        }
    }

    /// First step of a delete: remember the task and wait for confirmation.
    pub fn request_delete(&mut self, id: u64) {
        self.pending_delete = Some(id);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes the task awaiting confirmation, if any, and reloads.
    pub async fn confirm_delete<A: TaskApi>(&mut self, api: &A) -> Result<(), ApiError> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(());
        };
        match api.delete_task(id).await {
            Ok(()) => {
                info!(id, "task deleted");
                self.reload(api).await
            }
            Err(e) => {
                error!(id, error = %e, "Failed to delete task");
                Err(e)
            }
        }
    }

    /// Clears the session and the local copy. The caller navigates to the landing page.
    pub fn logout(&mut self, session: &SessionStore) -> Result<Route, SessionError> {
        session.clear()?;
        *self = Dashboard::default();
        info!("signed out");
        Ok(Route::Landing)
    }
}
