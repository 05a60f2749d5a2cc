use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table},
    Frame,
};
use crate::clock::Clock;
use crate::recurrence::describe;
use crate::schedule::{format_minutes, format_time_label, reminder_due, reminder_label, status_label, Status};
use crate::store::TaskRepository;
use super::app::{App, DisplayItem, InputMode, ViewMode};

fn status_style(status: Status) -> Style {
    match status {
        Status::Completed => Style::default().fg(Color::Green),
        Status::Missed => Style::default().fg(Color::Red),
        Status::DueSoon => Style::default().fg(Color::Yellow),
        Status::Upcoming => Style::default(),
    }
}

pub fn ui<R: TaskRepository, C: Clock>(f: &mut Frame, app: &mut App<R, C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Summary
            Constraint::Min(0),    // Table
            Constraint::Length(3)  // Help
        ].as_ref())
        .split(f.area());

    render_summary(f, app, chunks[0]);

    match app.view_mode {
        ViewMode::Today => {
            let rows: Vec<Row> = app
                .display_items
                .iter()
                .map(|item| match item {
                    DisplayItem::SegmentHeader(segment, count) => Row::new(vec![
                        Cell::from(segment.label()),
                        Cell::from(format!("{} task{}", count, if *count == 1 { "" } else { "s" })),
                    ])
                    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                    DisplayItem::Task(o) => {
                        let title = if o.task.pinned { format!("* {}", o.task.title) } else { o.task.title.clone() };
                        let reminder = if reminder_due(o) {
                            format!("{} !", reminder_label(o.task.reminder_offset))
                        } else {
                            reminder_label(o.task.reminder_offset)
                        };
                        Row::new(vec![
                            Cell::from(format!("  {}", format_time_label(o.task.time))),
                            Cell::from(title),
                            Cell::from(o.task.category.clone()),
                            Cell::from(describe(&o.task)),
                            Cell::from(reminder),
                            Cell::from(status_label(o)),
                        ])
                        .style(status_style(Status::of(o)))
                    }
                })
                .collect();

            let widths = [
                Constraint::Length(10),
                Constraint::Min(20),
                Constraint::Length(10),
                Constraint::Length(16),
                Constraint::Length(14),
                Constraint::Length(12),
            ];

            let table = Table::new(rows, widths)
                .header(Row::new(vec!["Time", "Task", "Category", "Repeats", "Reminder", "Status"])
                    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .bottom_margin(1))
                .block(Block::default().borders(Borders::ALL).title(format!("Today's routine ({})", app.filter)))
                .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
                .highlight_symbol(">> ");

            f.render_stateful_widget(table, chunks[1], &mut app.state);
        }
        ViewMode::Ideas => {
            let rows: Vec<Row> = app
                .ideas
                .iter()
                .map(|d| {
                    Row::new(vec![
                        Cell::from(d.title.clone()),
                        Cell::from(d.category.clone()),
                        Cell::from(d.time.format("%H:%M").to_string()),
                        Cell::from(d.notes.clone().unwrap_or_default()),
                    ])
                })
                .collect();

            let widths = [
                Constraint::Min(20),
                Constraint::Length(10),
                Constraint::Length(6),
                Constraint::Min(20),
            ];

            let table = Table::new(rows, widths)
                .header(Row::new(vec!["Suggestion", "Category", "Time", "Notes"])
                    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .bottom_margin(1))
                .block(Block::default().borders(Borders::ALL).title("Quick add suggestions"))
                .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
                .highlight_symbol(">> ");

            f.render_stateful_widget(table, chunks[1], &mut app.idea_state);
        }
    }

    let help_text = match (&app.message, &app.input_mode) {
        (Some(msg), InputMode::Normal | InputMode::Adding) => msg.clone(),
        (_, InputMode::Normal) => match app.view_mode {
            ViewMode::Today => "q: Quit | a: Add | Space: Done | p: Pin | d: Del | f: Filter | r: Reset day | X: Clear all | v: Suggestions".to_string(),
            ViewMode::Ideas => "q: Quit | Enter: Add suggestion | v: Today".to_string(),
        },
        (_, InputMode::Adding) => "Enter: Next Step | Esc: Cancel".to_string(),
        (_, InputMode::ConfirmClear) => "Delete ALL tasks? y: Yes | any other key: No".to_string(),
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[2]);

    if app.input_mode == InputMode::Adding {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);

        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(app.add_state.prompt()));

        f.render_widget(input, area);
    }
}

fn render_summary<R: TaskRepository, C: Clock>(f: &mut Frame, app: &App<R, C>, area: Rect) {
    let s = &app.summary;
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(area);

    let date = app.routine.clock().today().format("%A, %B %-d").to_string();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!(
            "{} | {} done, {} remaining, {} planned",
            date, s.completed, s.remaining, s.total
        )))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(s.completion_rate.min(100) as u16);
    f.render_widget(gauge, halves[0]);

    let mut lines = vec![match &s.next_up {
        Some(o) => Line::from(vec![
            Span::styled("Next up: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{} at {}", o.task.title, format_time_label(o.task.time))),
            Span::styled(format!(" (in {})", format_minutes(o.minutes_until)), Style::default().fg(Color::Green)),
        ]),
        None => Line::from(Span::styled("Next up: nothing scheduled", Style::default().fg(Color::Gray))),
    }];
    if !s.missed.is_empty() {
        let names: Vec<&str> = s.missed.iter().take(3).map(|o| o.task.title.as_str()).collect();
        let mut text = format!("Missed: {}", names.join(", "));
        if s.missed.len() > 3 {
            text.push_str(&format!(" +{} more", s.missed.len() - 3));
        }
        lines.push(Line::from(Span::styled(text, Style::default().fg(Color::Red))));
    }
    let side = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(side, halves[1]);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(r.height.saturating_sub(height) / 2),
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
