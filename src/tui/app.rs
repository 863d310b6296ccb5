use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::TableState;
use tracing::error;

use crate::api::TaskApi;
use crate::auth::{LoginForm, RegisterForm};
use crate::dashboard::Dashboard;
use crate::models::{Route, TaskUpdate};
use crate::session::SessionStore;

/// Work that needs the network. Key handling stays synchronous and returns one
/// of these; the event loop draws the loading state, then runs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Quit,
    Login,
    Register,
    Activate,
    Reload,
    Create,
    Toggle(u64),
    Delete,
    SaveTitle(u64),
}

/// Which input of the "Create New Task" panel has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraftField {
    #[default]
    Title,
    Description,
    Priority,
}

impl DraftField {
    fn next(self) -> Self {
        match self {
            DraftField::Title => DraftField::Description,
            DraftField::Description => DraftField::Priority,
            DraftField::Priority => DraftField::Title,
        }
    }

    fn previous(self) -> Self {
        match self {
            DraftField::Title => DraftField::Priority,
            DraftField::Description => DraftField::Title,
            DraftField::Priority => DraftField::Description,
        }
    }
}

pub const LANDING_CHOICES: [&str; 2] = ["Login", "Register"];

pub struct App<A: TaskApi> {
    pub api: A,
    pub session: SessionStore,
    pub screen: Route,
    pub landing_selected: usize,
    pub login: LoginForm,
    /// Focused login field: 0 username, 1 password.
    pub login_focus: usize,
    pub register: RegisterForm,
    /// Focused register field: 0 username, 1 password, 2 confirmation.
    pub register_focus: usize,
    pub dashboard: Dashboard,
    pub state: TableState,
    pub draft_focus: DraftField,
    /// Task id and title being edited in place.
    pub editing: Option<(u64, String)>,
}

impl<A: TaskApi> App<A> {
    pub fn new(api: A, session: SessionStore) -> App<A> {
        App {
            api,
            session,
            screen: Route::Landing,
            landing_selected: 0,
            login: LoginForm::new(),
            login_focus: 0,
            register: RegisterForm::new(),
            register_focus: 0,
            dashboard: Dashboard::new(),
            state: TableState::default(),
            draft_focus: DraftField::default(),
            editing: None,
        }
    }

    /// First effect to run: straight to the dashboard when a session is stored.
    pub fn start(&mut self) -> Option<Effect> {
        if self.session.get().is_some() {
            self.navigate(Route::Dashboard)
        } else {
            self.navigate(Route::Landing)
        }
    }

    /// Switches screens, resetting the target screen's transient state.
    pub fn navigate(&mut self, route: Route) -> Option<Effect> {
        self.screen = route;
        match route {
            Route::Landing => None,
            Route::Login => {
                self.login = LoginForm::new();
                self.login_focus = 0;
                None
            }
            Route::Register => {
                self.register = RegisterForm::new();
                self.register_focus = 0;
                None
            }
            Route::Dashboard => {
                self.dashboard = Dashboard::new();
                self.state = TableState::default();
                self.draft_focus = DraftField::default();
                self.editing = None;
                Some(Effect::Activate)
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Effect> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Effect::Quit);
        }
        match self.screen {
            Route::Landing => self.handle_landing_key(key),
            Route::Login => self.handle_login_key(key),
            Route::Register => self.handle_register_key(key),
            Route::Dashboard => self.handle_dashboard_key(key),
        }
    }

    fn handle_landing_key(&mut self, key: KeyEvent) -> Option<Effect> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Effect::Quit),
            KeyCode::Down | KeyCode::Up | KeyCode::Tab | KeyCode::Char('j') | KeyCode::Char('k') => {
                self.landing_selected = (self.landing_selected + 1) % LANDING_CHOICES.len();
                None
            }
            KeyCode::Char('l') => self.navigate(Route::Login),
            KeyCode::Char('r') => self.navigate(Route::Register),
            KeyCode::Enter => {
                if self.landing_selected == 0 {
                    self.navigate(Route::Login)
                } else {
                    self.navigate(Route::Register)
                }
            }
            _ => None,
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> Option<Effect> {
        if self.login.is_loading() {
            return None;
        }
        match key.code {
            KeyCode::Esc => self.navigate(Route::Landing),
            KeyCode::Tab | KeyCode::Down => {
                self.login_focus = (self.login_focus + 1) % 2;
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.login_focus = (self.login_focus + 1) % 2;
                None
            }
            KeyCode::Enter => self.login.begin_submit().ok().map(|_| Effect::Login),
            KeyCode::Char(c) => {
                self.login_field().push(c);
                None
            }
            KeyCode::Backspace => {
                self.login_field().pop();
                None
            }
            _ => None,
        }
    }

    fn login_field(&mut self) -> &mut String {
        match self.login_focus {
            0 => &mut self.login.username,
            _ => &mut self.login.password,
        }
    }

    fn handle_register_key(&mut self, key: KeyEvent) -> Option<Effect> {
        if self.register.is_loading() {
            return None;
        }
        match key.code {
            KeyCode::Esc => self.navigate(Route::Landing),
            KeyCode::Tab | KeyCode::Down => {
                self.register_focus = (self.register_focus + 1) % 3;
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.register_focus = (self.register_focus + 2) % 3;
                None
            }
            KeyCode::Enter => self.register.begin_submit().ok().map(|_| Effect::Register),
            KeyCode::Char(c) => {
                self.register_field().push(c);
                None
            }
            KeyCode::Backspace => {
                self.register_field().pop();
                None
            }
            _ => None,
        }
    }

    fn register_field(&mut self) -> &mut String {
        match self.register_focus {
            0 => &mut self.register.username,
            1 => &mut self.register.password,
            _ => &mut self.register.confirm_password,
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) -> Option<Effect> {
        if self.dashboard.is_loading() {
            return match key.code {
                KeyCode::Char('q') => Some(Effect::Quit),
                _ => None,
            };
        }
        if self.dashboard.pending_delete.is_some() {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => Some(Effect::Delete),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.dashboard.cancel_delete();
                    None
                }
                _ => None,
            };
        }
        if self.editing.is_some() {
            return self.handle_edit_key(key);
        }
        if self.dashboard.show_add_form {
            return self.handle_draft_key(key);
        }
        match key.code {
            KeyCode::Char('q') => Some(Effect::Quit),
            KeyCode::Down | KeyCode::Char('j') => {
                self.next();
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.previous();
                None
            }
            KeyCode::Char('a') => {
                self.dashboard.toggle_add_form();
                self.draft_focus = DraftField::Title;
                None
            }
            KeyCode::Char(' ') | KeyCode::Char('t') => self.selected_id().map(Effect::Toggle),
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.dashboard.request_delete(id);
                }
                None
            }
            KeyCode::Char('e') => {
                if let Some(id) = self.selected_id() {
                    let title = self.dashboard.find(id).map(|t| t.title.clone()).unwrap_or_default();
                    self.editing = Some((id, title));
                }
                None
            }
            KeyCode::Char('r') => Some(Effect::Reload),
            KeyCode::Char('o') => {
                match self.dashboard.logout(&self.session) {
                    Ok(route) => return self.navigate(route),
                    Err(e) => error!(error = %e, "Failed to clear session"),
                }
                None
            }
            _ => None,
        }
    }

    fn handle_draft_key(&mut self, key: KeyEvent) -> Option<Effect> {
        match key.code {
            KeyCode::Esc => {
                self.dashboard.toggle_add_form();
                None
            }
            KeyCode::Tab | KeyCode::Down => {
                self.draft_focus = self.draft_focus.next();
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.draft_focus = self.draft_focus.previous();
                None
            }
            // The title input is required; an empty one never submits.
            KeyCode::Enter if self.dashboard.draft.title.trim().is_empty() => {
                self.draft_focus = DraftField::Title;
                None
            }
            KeyCode::Enter => Some(Effect::Create),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if self.draft_focus == DraftField::Priority => {
                let draft = &mut self.dashboard.draft;
                draft.priority = draft.priority.next();
                None
            }
            KeyCode::Char(c) => {
                match self.draft_focus {
                    DraftField::Title => self.dashboard.draft.title.push(c),
                    DraftField::Description => self.dashboard.draft.description.push(c),
                    DraftField::Priority => {}
                }
                None
            }
            KeyCode::Backspace => {
                match self.draft_focus {
                    DraftField::Title => {
                        self.dashboard.draft.title.pop();
                    }
                    DraftField::Description => {
                        self.dashboard.draft.description.pop();
                    }
                    DraftField::Priority => {}
                }
                None
            }
            _ => None,
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Option<Effect> {
        let (id, buffer) = self.editing.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                self.editing = None;
                None
            }
            KeyCode::Enter if buffer.trim().is_empty() => None,
            KeyCode::Enter => Some(Effect::SaveTitle(*id)),
            KeyCode::Char(c) => {
                buffer.push(c);
                None
            }
            KeyCode::Backspace => {
                buffer.pop();
                None
            }
            _ => None,
        }
    }

    /// Runs a network effect. Returns `true` when the app should exit.
    pub async fn run_effect(&mut self, effect: Effect) -> bool {
        match effect {
            Effect::Quit => return true,
            Effect::Login => {
                if let Ok(route) = self.login.finish_submit(&self.api, &self.session).await {
                    self.follow(route).await;
                }
            }
            Effect::Register => {
                if let Ok(route) = self.register.finish_submit(&self.api, &self.session).await {
                    self.follow(route).await;
                }
            }
            Effect::Activate => {
                let route = self.dashboard.activate(&self.api, &self.session).await;
                if route != Route::Dashboard {
                    self.navigate(route);
                }
            }
            Effect::Reload => {
                let _ = self.dashboard.reload(&self.api).await;
            }
            Effect::Create => {
                let _ = self.dashboard.create(&self.api).await;
            }
            Effect::Toggle(id) => {
                let _ = self.dashboard.toggle_status(&self.api, id).await;
            }
            Effect::Delete => {
                let _ = self.dashboard.confirm_delete(&self.api).await;
            }
            Effect::SaveTitle(id) => {
                if let Some((_, title)) = self.editing.take() {
                    let update = TaskUpdate { title: Some(title), ..Default::default() };
                    let _ = self.dashboard.update(&self.api, id, &update).await;
                }
            }
        }
        self.clamp_selection();
        false
    }

    /// Navigates and immediately runs whatever the new screen needs.
    async fn follow(&mut self, route: Route) {
        if let Some(Effect::Activate) = self.navigate(route) {
            let route = self.dashboard.activate(&self.api, &self.session).await;
            if route != Route::Dashboard {
                self.navigate(route);
            }
        }
    }

    pub fn selected_id(&self) -> Option<u64> {
        self.state.selected().and_then(|i| self.dashboard.tasks.get(i)).map(|t| t.id)
    }

    /// Selects the next task, wrapping around.
    pub fn next(&mut self) {
        let len = self.dashboard.tasks.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous task, wrapping around.
    pub fn previous(&mut self) {
        let len = self.dashboard.tasks.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Keeps the selection inside the freshly reloaded list.
    fn clamp_selection(&mut self) {
        let len = self.dashboard.tasks.len();
        if len == 0 {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= len {
                self.state.select(Some(len - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }
}
