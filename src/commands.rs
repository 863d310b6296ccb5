use std::io::{self, BufRead, Write};

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::api::TaskApi;
use crate::auth::{LoginForm, RegisterForm};
use crate::dashboard::{Dashboard, DEFAULT_DISPLAY_NAME, EMPTY_MESSAGE};
use crate::models::{Priority, Status, Task, TaskUpdate};
use crate::session::SessionStore;

const NOT_SIGNED_IN: &str = "Not signed in. Run `taskweb login` or `taskweb register` first.";

/// Builds a dashboard for the stored session without loading anything.
fn signed_in_dashboard(session: &SessionStore) -> Option<Dashboard> {
    let current = session.get()?;
    let mut dashboard = Dashboard::new();
    dashboard.username = if current.username.is_empty() { DEFAULT_DISPLAY_NAME.to_string() } else { current.username };
    Some(dashboard)
}

/// Asks a yes/no question on stdin. Anything but `y` is a no.
pub fn prompt_confirm(question: &str) -> bool {
    print!("{} [y/N] ", question);
    let _ = io::stdout().flush();
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    input.trim().eq_ignore_ascii_case("y")
}

/// Reads one line from `input` after printing `prompt` to stderr.
///
/// Used for passwords left off the command line. The trailing newline is
/// stripped; `None` on EOF or a read error.
pub fn read_secret(prompt: &str, input: &mut impl BufRead) -> Option<String> {
    eprint!("{}: ", prompt);
    let _ = io::stderr().flush();
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

/// Returns `given`, or asks for it on stdin.
pub fn secret_or_prompt(given: Option<String>, prompt: &str) -> Option<String> {
    given.or_else(|| read_secret(prompt, &mut io::stdin().lock()))
}

/// Creates an account, then signs in with the same credentials.
pub async fn cmd_register<A: TaskApi>(api: &A, session: &SessionStore, username: String, password: String, confirm: String) {
    let mut form = RegisterForm { username, password, confirm_password: confirm, ..Default::default() };
    match form.submit(api, session).await {
        Ok(_) => println!("Account created. Signed in as {}.", form.username),
        Err(e) => eprintln!("{}", e),
    }
}

pub async fn cmd_login<A: TaskApi>(api: &A, session: &SessionStore, username: String, password: String) {
    let mut form = LoginForm { username, password, ..Default::default() };
    match form.submit(api, session).await {
        Ok(_) => println!("Signed in as {}.", form.username),
        Err(e) => eprintln!("{}", e),
    }
}

pub fn cmd_logout(session: &SessionStore) {
    let mut dashboard = Dashboard::new();
    match dashboard.logout(session) {
        Ok(_) => println!("Signed out."),
        Err(e) => eprintln!("Failed to clear session: {}", e),
    }
}

pub fn cmd_whoami(session: &SessionStore) {
    match session.get() {
        Some(s) if !s.username.is_empty() => println!("{}", s.username),
        Some(_) => println!("{}", DEFAULT_DISPLAY_NAME),
        None => eprintln!("{}", NOT_SIGNED_IN),
    }
}

/// Lists the signed-in user's tasks in server order.
pub async fn cmd_list<A: TaskApi>(api: &A, session: &SessionStore) {
    let Some(mut dashboard) = signed_in_dashboard(session) else {
        eprintln!("{}", NOT_SIGNED_IN);
        return;
    };
    match dashboard.reload(api).await {
        Ok(()) => print_dashboard(&dashboard),
        Err(e) => eprintln!("Failed to load tasks: {}", e),
    }
}

pub async fn cmd_add<A: TaskApi>(
    api: &A,
    session: &SessionStore,
    title: String,
    description: Option<String>,
    priority: Option<Priority>,
) {
    if title.trim().is_empty() {
        eprintln!("Title is required.");
        return;
    }
    let Some(mut dashboard) = signed_in_dashboard(session) else {
        eprintln!("{}", NOT_SIGNED_IN);
        return;
    };
    dashboard.draft.title = title;
    dashboard.draft.description = description.unwrap_or_default();
    dashboard.draft.priority = priority.unwrap_or_default();
    match dashboard.create(api).await {
        Ok(()) => {
            println!("Task added.");
            print_dashboard(&dashboard);
        }
        Err(e) => eprintln!("Failed to add task: {}", e),
    }
}

/// Flips a task between pending and completed.
pub async fn cmd_toggle<A: TaskApi>(api: &A, session: &SessionStore, id: u64) {
    let Some(mut dashboard) = signed_in_dashboard(session) else {
        eprintln!("{}", NOT_SIGNED_IN);
        return;
    };
    if let Err(e) = dashboard.reload(api).await {
        eprintln!("Failed to load tasks: {}", e);
        return;
    }
    let Some(current) = dashboard.find(id).map(|t| t.status) else {
        eprintln!("Task {} not found.", id);
        return;
    };
    match dashboard.toggle_status(api, id).await {
        Ok(()) => {
            println!("Task {} marked as {}.", id, current.toggled());
            print_dashboard(&dashboard);
        }
        Err(e) => eprintln!("Failed to update task: {}", e),
    }
}

/// Edits an existing task's fields.
pub async fn cmd_edit<A: TaskApi>(
    api: &A,
    session: &SessionStore,
    id: u64,
    title: Option<String>,
    description: Option<String>,
    status: Option<Status>,
    priority: Option<Priority>,
) {
    let update = TaskUpdate { title, description, status, priority };
    if update.is_empty() {
        eprintln!("Nothing to update. Pass at least one of --title, --description, --status, --priority.");
        return;
    }
    if matches!(update.title.as_deref(), Some(t) if t.trim().is_empty()) {
        eprintln!("Title cannot be empty.");
        return;
    }
    let Some(mut dashboard) = signed_in_dashboard(session) else {
        eprintln!("{}", NOT_SIGNED_IN);
        return;
    };
    match dashboard.update(api, id, &update).await {
        Ok(()) => {
            println!("Task {} updated.", id);
            print_dashboard(&dashboard);
        }
        Err(e) => eprintln!("Failed to update task: {}", e),
    }
}

/// Removes a task after confirmation.
pub async fn cmd_remove<A: TaskApi>(api: &A, session: &SessionStore, id: u64, force: bool) {
    let Some(mut dashboard) = signed_in_dashboard(session) else {
        eprintln!("{}", NOT_SIGNED_IN);
        return;
    };
    dashboard.request_delete(id);
    if !force && !prompt_confirm("Are you sure you want to delete this task?") {
        dashboard.cancel_delete();
        println!("Aborted.");
        return;
    }
    match dashboard.confirm_delete(api).await {
        Ok(()) => {
            println!("Task {} removed.", id);
            print_dashboard(&dashboard);
        }
        Err(e) => eprintln!("Failed to delete task: {}", e),
    }
}

fn print_dashboard(dashboard: &Dashboard) {
    if dashboard.is_empty_state() {
        println!("{}", EMPTY_MESSAGE);
        return;
    }
    println!("{}", task_table(&dashboard.tasks));
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::DarkYellow,
        Priority::Low => Color::Green,
    }
}

pub fn status_color(status: Status) -> Color {
    match status {
        Status::Completed => Color::Green,
        Status::Pending => Color::Yellow,
    }
}

/// Formats tasks as a table, one row per task.
pub fn task_table(tasks: &[Task]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Description").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Created").add_attribute(Attribute::Bold),
        ]);

    for t in tasks {
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.title),
            Cell::new(t.description.as_deref().filter(|d| !d.is_empty()).unwrap_or("-")),
            Cell::new(t.status).fg(status_color(t.status)),
            Cell::new(t.priority).fg(priority_color(t.priority)),
            Cell::new(t.created_display()),
        ]);
    }
    table
}
