use db::models::task::{Task, TaskStatus};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::{
    app::App,
    board::{self, Column, EMPTY_COLUMN_TEXT},
    form::{FormField, TaskForm},
};

const APP_NAME: &str = "ProTask";
const KEY_HINTS: &str =
    "←→↑↓ move  n new  e edit  d delete  space grab/drop  r reload  q quit";

fn accent(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::LightBlue,
        TaskStatus::InProgress => Color::Yellow,
        TaskStatus::Done => Color::Green,
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, chunks[0]);
    draw_columns(f, app, chunks[1]);
    draw_status_line(f, app, chunks[2]);

    if let Some(form) = app.form() {
        draw_form(f, form);
    }
}

fn draw_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            APP_NAME,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(KEY_HINTS, Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_columns(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    let selected = app.selected_task().map(|task| task.id);
    for (i, column) in board::columns(app.store()).iter().enumerate() {
        draw_column(f, app, column, selected, chunks[i]);
    }
}

fn draw_column(
    f: &mut Frame,
    app: &App,
    column: &Column<'_>,
    selected: Option<uuid::Uuid>,
    area: Rect,
) {
    let is_drop_target = app.drag().over() == Some(column.status);
    let border_style = if is_drop_target {
        Style::default()
            .fg(accent(column.status))
            .add_modifier(Modifier::BOLD)
    } else if app.selected_column() == column.status {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(column.title())
        .borders(Borders::ALL)
        .border_style(border_style);

    if column.tasks.is_empty() {
        let placeholder = Paragraph::new(EMPTY_COLUMN_TEXT)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = column
        .tasks
        .iter()
        .map(|task| {
            card(
                task,
                selected == Some(task.id),
                app.drag().grabbed() == Some(task.id),
            )
        })
        .collect();
    f.render_widget(List::new(items).block(block), area);
}

fn card(task: &Task, selected: bool, grabbed: bool) -> ListItem<'_> {
    let mut title_style = Style::default().add_modifier(Modifier::BOLD);
    if selected {
        title_style = title_style.fg(Color::Black).bg(Color::Cyan);
    }
    let marker = if grabbed { "» " } else { "" };

    let mut lines = vec![Line::from(vec![
        Span::styled("▌", Style::default().fg(accent(task.status))),
        Span::styled(format!("{marker}{}", task.title), title_style),
    ])];
    if let Some(description) = &task.description {
        lines.push(Line::from(vec![
            Span::styled("▌", Style::default().fg(accent(task.status))),
            Span::styled(description.as_str(), Style::default().fg(Color::Gray)),
        ]));
    }
    lines.push(Line::default());
    ListItem::new(Text::from(lines))
}

fn draw_status_line(f: &mut Frame, app: &App, area: Rect) {
    let line = match (app.status_message(), app.drag().over()) {
        (Some(message), _) => Line::styled(message, Style::default().fg(Color::Red)),
        (None, Some(over)) => Line::styled(
            format!("Moving to {over}: ←→ choose column, space/enter drop, esc cancel"),
            Style::default().fg(accent(over)),
        ),
        (None, None) => Line::default(),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_form(f: &mut Frame, form: &TaskForm) {
    let area = centered_rect(60, 12, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(form.heading())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

    f.render_widget(
        input("Title", form.title(), form.focus() == FormField::Title),
        rows[0],
    );
    f.render_widget(
        input(
            "Description",
            form.description(),
            form.focus() == FormField::Description,
        ),
        rows[1],
    );
    if let Some(error) = form.error() {
        f.render_widget(
            Paragraph::new(error).style(Style::default().fg(Color::Red)),
            rows[2],
        );
    }

    let submit_style = if form.is_submitting() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    };
    let footer = Line::from(vec![
        Span::styled(format!("[enter] {}", form.submit_label()), submit_style),
        Span::raw("  [tab] switch field  [esc] cancel"),
    ]);
    f.render_widget(Paragraph::new(footer), rows[3]);
}

fn input<'a>(label: &'a str, value: &'a str, focused: bool) -> Paragraph<'a> {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let cursor = if focused { "_" } else { "" };
    Paragraph::new(format!("{value}{cursor}")).block(
        Block::default()
            .title(label)
            .borders(Borders::ALL)
            .border_style(border_style),
    )
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

    use super::*;
    use crate::{api::fake::FakeTaskApi, state::tests::task};

    fn buffer_text(buffer: &Buffer) -> String {
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[tokio::test]
    async fn renders_columns_with_counts_and_placeholder() {
        let mut described = task("Write docs", TaskStatus::Todo);
        described.description = Some("README first".to_string());
        let api = Arc::new(FakeTaskApi::with_tasks(vec![
            described,
            task("Ship it", TaskStatus::Done),
        ]));
        let mut app = App::new(api);
        app.fetch_tasks().await;

        let screen = render(&app);

        assert!(screen.contains("ProTask"));
        assert!(screen.contains("To Do (1)"));
        assert!(screen.contains("In Progress (0)"));
        assert!(screen.contains("Done (1)"));
        assert!(screen.contains("Write docs"));
        assert!(screen.contains("README first"));
        assert!(screen.contains("Drag tasks here"));
    }

    #[tokio::test]
    async fn renders_form_modal() {
        let mut app = App::new(Arc::new(FakeTaskApi::default()));
        app.open_create_form();

        let screen = render(&app);

        assert!(screen.contains("Add a New Task"));
        assert!(screen.contains("Add Task"));
        assert!(screen.contains("Title"));
    }

    #[tokio::test]
    async fn renders_status_message() {
        let api = Arc::new(FakeTaskApi::default());
        api.fail_list
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let mut app = App::new(api);
        app.fetch_tasks().await;

        assert!(render(&app).contains("Failed to load tasks"));
    }
}
