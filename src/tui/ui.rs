use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::app::{App, DraftField, LANDING_CHOICES};
use crate::api::TaskApi;
use crate::dashboard::EMPTY_MESSAGE;
use crate::models::{Priority, Route, Status};

pub fn ui<A: TaskApi>(f: &mut Frame, app: &mut App<A>) {
    match app.screen {
        Route::Landing => draw_landing(f, app),
        Route::Login => draw_login(f, app),
        Route::Register => draw_register(f, app),
        Route::Dashboard => draw_dashboard(f, app),
    }
}

fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::High => Style::default().fg(Color::Red),
        Priority::Medium => Style::default().fg(Color::LightYellow),
        Priority::Low => Style::default().fg(Color::Green),
    }
}

fn status_style(status: Status) -> Style {
    match status {
        Status::Completed => Style::default().fg(Color::Green),
        Status::Pending => Style::default().fg(Color::Yellow),
    }
}

fn help_bar(f: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}

fn draw_landing<A: TaskApi>(f: &mut Frame, app: &App<A>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    let mut lines = vec![
        Line::from(Span::styled("Task Web App", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("Organize your tasks efficiently with our modern interface"),
        Line::from(""),
    ];
    for (i, choice) in LANDING_CHOICES.iter().enumerate() {
        let style = if i == app.landing_selected {
            Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(format!("  {}  ", choice), style)));
    }

    let area = centered_rect(60, lines.len() as u16 + 2, chunks[0]);
    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(body, area);

    help_bar(f, chunks[1], "Enter: Select | j/k: Move | l: Login | r: Register | q: Quit");
}

/// One labelled input line. Secret values are masked.
fn field_line(label: &str, value: &str, focused: bool, secret: bool) -> Line<'static> {
    let shown = if secret { "*".repeat(value.chars().count()) } else { value.to_string() };
    let cursor = if focused { "_" } else { "" };
    let label_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    Line::from(vec![
        Span::styled(format!("{:<18}", label), label_style),
        Span::raw(format!("{}{}", shown, cursor)),
    ])
}

fn draw_form(f: &mut Frame, title: &str, subtitle: &str, fields: Vec<Line<'static>>, error: Option<&str>, button: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    let mut lines = vec![Line::from(subtitle.to_string()), Line::from("")];
    if let Some(e) = error {
        lines.push(Line::from(Span::styled(e.to_string(), Style::default().fg(Color::Red))));
        lines.push(Line::from(""));
    }
    lines.extend(fields);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("[ {} ]", button),
        Style::default().fg(Color::Black).bg(Color::LightYellow).add_modifier(Modifier::BOLD),
    )));

    let area = centered_rect(60, lines.len() as u16 + 2, chunks[0]);
    f.render_widget(Clear, area);
    let form = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(form, area);

    help_bar(f, chunks[1], "Tab: Next Field | Enter: Submit | Esc: Back to Home");
}

fn draw_login<A: TaskApi>(f: &mut Frame, app: &App<A>) {
    let form = &app.login;
    let fields = vec![
        field_line("Username", &form.username, app.login_focus == 0, false),
        field_line("Password", &form.password, app.login_focus == 1, true),
    ];
    let button = if form.is_loading() { "Logging in..." } else { "Login" };
    draw_form(f, "Welcome Back", "Login to manage your tasks", fields, form.error.as_deref(), button);
}

fn draw_register<A: TaskApi>(f: &mut Frame, app: &App<A>) {
    let form = &app.register;
    let fields = vec![
        field_line("Username", &form.username, app.register_focus == 0, false),
        field_line("Password", &form.password, app.register_focus == 1, true),
        field_line("Confirm Password", &form.confirm_password, app.register_focus == 2, true),
    ];
    let button = if form.is_loading() { "Creating Account..." } else { "Register" };
    draw_form(f, "Create Account", "Join us to start managing tasks", fields, form.error.as_deref(), button);
}

fn draw_dashboard<A: TaskApi>(f: &mut Frame, app: &mut App<A>) {
    let add_height = if app.dashboard.show_add_form { 7 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),          // Navbar
            Constraint::Length(add_height), // Create form
            Constraint::Min(0),             // Table
            Constraint::Length(3),          // Help
        ].as_ref())
        .split(f.area());

    let navbar = Paragraph::new(Line::from(vec![
        Span::styled("Task Dashboard", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw("   "),
        Span::raw(format!("Welcome, {}!", app.dashboard.username)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(navbar, chunks[0]);

    if app.dashboard.is_loading() {
        let loading = Paragraph::new("Loading...")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(loading, chunks[2]);
        help_bar(f, chunks[3], "q: Quit");
        return;
    }

    if app.dashboard.show_add_form {
        let draft = &app.dashboard.draft;
        let priority = Line::from(vec![
            Span::styled(
                format!("{:<18}", "Priority"),
                if app.draft_focus == DraftField::Priority {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Cyan)
                },
            ),
            Span::styled(format!("< {} >", draft.priority), priority_style(draft.priority)),
        ]);
        let lines = vec![
            field_line("Title", &draft.title, app.draft_focus == DraftField::Title, false),
            field_line("Description", &draft.description, app.draft_focus == DraftField::Description, false),
            priority,
        ];
        let form = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Create New Task"));
        f.render_widget(form, chunks[1]);
    }

    if app.dashboard.is_empty_state() {
        let empty = Paragraph::new(EMPTY_MESSAGE)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Your Tasks"));
        f.render_widget(empty, chunks[2]);
    } else {
        let rows: Vec<Row> = app
            .dashboard
            .tasks
            .iter()
            .map(|t| {
                Row::new(vec![
                    Cell::from(t.title.clone()),
                    Cell::from(t.description.clone().filter(|d| !d.is_empty()).unwrap_or_else(|| "-".into())),
                    Cell::from(t.status.to_string()).style(status_style(t.status)),
                    Cell::from(t.priority.to_string()).style(priority_style(t.priority)),
                    Cell::from(t.created_display()),
                ])
            })
            .collect();

        let widths = [
            Constraint::Min(20),
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(16),
        ];

        let table = Table::new(rows, widths)
            .header(Row::new(vec!["Title", "Description", "Status", "Priority", "Created"])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .bottom_margin(1))
            .block(Block::default().borders(Borders::ALL).title("Your Tasks"))
            .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[2], &mut app.state);
    }

    let help_text = if app.dashboard.pending_delete.is_some() {
        "y: Delete | n/Esc: Keep"
    } else if app.editing.is_some() {
        "Enter: Save | Esc: Cancel"
    } else if app.dashboard.show_add_form {
        "Tab: Next Field | Left/Right: Priority | Enter: Add Task | Esc: Cancel"
    } else {
        "q: Quit | a: Add New Task | Space: Toggle | e: Edit Title | d: Delete | r: Refresh | o: Logout"
    };
    help_bar(f, chunks[3], help_text);

    if app.dashboard.pending_delete.is_some() {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);
        let prompt = Paragraph::new("Are you sure you want to delete this task? (y/n)")
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title("Delete Task"));
        f.render_widget(prompt, area);
    }

    if let Some((_, buffer)) = &app.editing {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);
        let input = Paragraph::new(buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title("Edit Title"));
        f.render_widget(input, area);
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height);
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((r.height - height) / 2),
            Constraint::Length(height),
            Constraint::Length((r.height - height) / 2),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
