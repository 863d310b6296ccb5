#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use taskweb::api::TaskApi;
use taskweb::error::ApiError;
use taskweb::models::{LoginResponse, NewTask, Status, Task, TaskUpdate};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Register(String, String),
    Login(String, String),
    List,
    Create(NewTask),
    Update(u64, TaskUpdate),
    Delete(u64),
}

/// In-process stand-in for the task server. Records every call.
#[derive(Default)]
pub struct FakeApi {
    pub calls: RefCell<Vec<Call>>,
    pub users: RefCell<HashMap<String, String>>,
    pub tasks: RefCell<Vec<Task>>,
    next_id: RefCell<u64>,
    /// When set, every task operation fails with this status.
    pub fail_tasks: RefCell<Option<u16>>,
    /// When set, register fails with this status and an empty body.
    pub fail_register: RefCell<Option<u16>>,
}

impl FakeApi {
    pub fn new() -> Self {
        FakeApi { next_id: RefCell::new(1), ..Default::default() }
    }

    pub fn with_user(self, username: &str, password: &str) -> Self {
        self.users.borrow_mut().insert(username.to_string(), password.to_string());
        self
    }

    pub fn with_task(self, title: &str, status: Status) -> Self {
        let id = self.bump_id();
        self.tasks.borrow_mut().push(task(id, title, status));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    fn bump_id(&self) -> u64 {
        let mut next = self.next_id.borrow_mut();
        let id = (*next).max(1);
        *next = id + 1;
        id
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn check_tasks(&self) -> Result<(), ApiError> {
        match *self.fail_tasks.borrow() {
            Some(status) => Err(ApiError::Status { status, detail: Some("Internal Server Error".into()) }),
            None => Ok(()),
        }
    }

    fn not_found() -> ApiError {
        ApiError::Status { status: 404, detail: Some("Task not found".into()) }
    }
}

pub fn task(id: u64, title: &str, status: Status) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: None,
        status,
        priority: Default::default(),
        created_at: "2025-01-01T09:30:00.000000".to_string(),
        user_id: Some("alice".to_string()),
    }
}

impl TaskApi for FakeApi {
    async fn register(&self, username: &str, password: &str) -> Result<serde_json::Value, ApiError> {
        self.record(Call::Register(username.into(), password.into()));
        if let Some(status) = *self.fail_register.borrow() {
            return Err(ApiError::Status { status, detail: None });
        }
        let mut users = self.users.borrow_mut();
        if users.contains_key(username) {
            return Err(ApiError::Status { status: 400, detail: Some("Username already exists".into()) });
        }
        users.insert(username.into(), password.into());
        Ok(serde_json::json!({ "message": "User registered successfully" }))
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.record(Call::Login(username.into(), password.into()));
        match self.users.borrow().get(username) {
            Some(p) if p == password => Ok(LoginResponse {
                access_token: format!("token-{}", username),
                token_type: Some("bearer".into()),
            }),
            _ => Err(ApiError::Status { status: 401, detail: Some("Invalid credentials".into()) }),
        }
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.record(Call::List);
        self.check_tasks()?;
        Ok(self.tasks.borrow().clone())
    }

    async fn create_task(&self, new: &NewTask) -> Result<Task, ApiError> {
        self.record(Call::Create(new.clone()));
        self.check_tasks()?;
        let mut t = task(self.bump_id(), &new.title, Status::Pending);
        t.description = new.description.clone();
        t.priority = new.priority.unwrap_or_default();
        self.tasks.borrow_mut().push(t.clone());
        Ok(t)
    }

    async fn update_task(&self, id: u64, update: &TaskUpdate) -> Result<Task, ApiError> {
        self.record(Call::Update(id, update.clone()));
        self.check_tasks()?;
        let mut tasks = self.tasks.borrow_mut();
        let t = tasks.iter_mut().find(|t| t.id == id).ok_or_else(Self::not_found)?;
        if let Some(title) = &update.title {
            t.title = title.clone();
        }
        if let Some(d) = &update.description {
            t.description = Some(d.clone());
        }
        if let Some(s) = update.status {
            t.status = s;
        }
        if let Some(p) = update.priority {
            t.priority = p;
        }
        Ok(t.clone())
    }

    async fn delete_task(&self, id: u64) -> Result<(), ApiError> {
        self.record(Call::Delete(id));
        self.check_tasks()?;
        let mut tasks = self.tasks.borrow_mut();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }
}
