//! UI rendering for chrono-task.

use crate::app::{App, InsightState, MessageType};
use crate::config::WeekStart;
use crate::models::{DayStatus, Priority};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Draw the application.
pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer/status
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);

    // Draw popups
    if app.show_help {
        draw_help_popup(f);
    }

    if let Some(dialog) = &app.confirm_dialog {
        draw_confirm_dialog(f, dialog);
    }

    if app.editing {
        draw_add_dialog(f, app);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let date_str = app
        .selected_date
        .format(&app.config.display.date_format)
        .to_string();
    let stats = app.day_stats();

    let summary = if stats.total == 0 {
        "No tasks planned for this day".to_string()
    } else {
        format!(
            "{} of {} tasks completed ({}%)",
            stats.completed, stats.total, stats.rate
        )
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(date_str, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  -  "),
        Span::styled(summary, Style::default().fg(Color::Gray)),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" ChronoTask "))
    .alignment(Alignment::Center);

    f.render_widget(header, area);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(0)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(12), Constraint::Min(0)])
        .split(columns[0]);

    draw_calendar(f, app, left[0]);
    draw_weekly_chart(f, app, left[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(9)])
        .split(columns[1]);

    draw_task_list(f, app, right[0]);
    draw_insight_panel(f, app, right[1]);
}

fn draw_calendar(f: &mut Frame, app: &App, area: Rect) {
    let month = app.view_month;
    let title = format!(" {} ", month.format("%B %Y"));

    let week_start_offset = |date: NaiveDate| -> i64 {
        let from_monday = date.weekday().num_days_from_monday() as i64;
        match app.config.display.week_start {
            WeekStart::Monday => from_monday,
            WeekStart::Sunday => date.weekday().num_days_from_sunday() as i64,
        }
    };

    let day_labels = match app.config.display.week_start {
        WeekStart::Monday => ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"],
        WeekStart::Sunday => ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"],
    };

    let mut lines: Vec<Line> = vec![Line::from(
        day_labels
            .iter()
            .map(|l| Span::styled(format!(" {:>3} ", l), Style::default().fg(Color::DarkGray)))
            .collect::<Vec<_>>(),
    )];

    let today = Utc::now().date_naive();
    let mut day = month - Duration::days(week_start_offset(month));
    let grid_end = {
        let next_month = if month.month() == 12 {
            NaiveDate::from_ymd_opt(month.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(month.year(), month.month() + 1, 1)
        };
        next_month.unwrap_or(month)
    };

    while day < grid_end {
        let mut spans: Vec<Span> = Vec::new();
        for _ in 0..7 {
            let in_month = day.month() == month.month() && day.year() == month.year();
            let status = app.day_status(day);

            let marker = match status {
                DayStatus::None => ' ',
                DayStatus::Pending => '·',
                DayStatus::Complete => '●',
            };

            let mut style = if day == app.selected_date {
                Style::default()
                    .bg(Color::Indexed(62))
                    .add_modifier(Modifier::BOLD)
            } else if !in_month {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };

            if day == today && day != app.selected_date {
                style = style.add_modifier(Modifier::UNDERLINED);
            }

            let marker_color = match status {
                DayStatus::Complete => Color::Green,
                DayStatus::Pending => Color::Yellow,
                DayStatus::None => Color::Reset,
            };

            spans.push(Span::styled(format!(" {:>2}", day.day()), style));
            spans.push(Span::styled(marker.to_string(), style.fg(marker_color)));
            spans.push(Span::styled(" ", style));

            day = day + Duration::days(1);
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(vec![
        Span::styled(" ●", Style::default().fg(Color::Green)),
        Span::styled(" all done  ", Style::default().fg(Color::DarkGray)),
        Span::styled("·", Style::default().fg(Color::Yellow)),
        Span::styled(" pending", Style::default().fg(Color::DarkGray)),
    ]));

    let calendar = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(calendar, area);
}

fn draw_weekly_chart(f: &mut Frame, app: &App, area: Rect) {
    let series = app.weekly_series();
    let today_rate = series.last().map(|p| p.rate).unwrap_or(0);

    let bars: Vec<Bar> = series
        .iter()
        .map(|point| {
            Bar::default()
                .value(point.rate as u64)
                .label(Line::from(point.day_name.clone()))
                .style(Style::default().fg(Color::Indexed(62)))
                .value_style(Style::default().fg(Color::Black).bg(Color::Indexed(62)))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Weekly Momentum ({}% today) ", today_rate)),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(4)
        .bar_gap(1)
        .max(100);

    f.render_widget(chart, area);
}

fn draw_task_list(f: &mut Frame, app: &App, area: Rect) {
    let day_tasks = app.day_tasks();

    if day_tasks.is_empty() {
        let msg = Paragraph::new("No tasks found.\nPress 'a' to start planning your day.")
            .block(Block::default().borders(Borders::ALL).title(" Tasks "))
            .alignment(Alignment::Center);
        f.render_widget(msg, area);
        return;
    }

    let items: Vec<ListItem> = day_tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let checkbox = if task.completed { "[x]" } else { "[ ]" };

            let mut spans = vec![
                Span::styled(
                    checkbox,
                    Style::default().fg(if task.completed {
                        Color::Green
                    } else {
                        Color::Gray
                    }),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{} ", task.priority.symbol()),
                    Style::default().fg(priority_color(task.priority)),
                ),
            ];

            let text_style = if task.completed {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else if i == app.selected_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            spans.push(Span::styled(&task.text, text_style));

            let style = if i == app.selected_index {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };

            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Tasks "));

    f.render_widget(list, area);
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn draw_insight_panel(f: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match &app.insight {
        InsightState::Ready(text) => (text.clone(), Style::default()),
        InsightState::Loading => (
            "Generating insight...".to_string(),
            Style::default().fg(Color::Yellow),
        ),
        InsightState::Idle => {
            let hint = if app.day_tasks().is_empty() {
                "Add tasks to this day to unlock AI insights."
            } else {
                "Press 'i' for an AI reflection on this day."
            };
            (hint.to_string(), Style::default().fg(Color::DarkGray))
        }
    };

    let panel = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(" Daily Insight "))
        .wrap(Wrap { trim: true });

    f.render_widget(panel, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let (msg, style) = if let Some((ref message, msg_type)) = app.message {
        let color = match msg_type {
            MessageType::Info => Color::Blue,
            MessageType::Success => Color::Green,
            MessageType::Warning => Color::Yellow,
        };
        (message.clone(), Style::default().fg(color))
    } else {
        (
            "j/k:Navigate  Space:Toggle  a:Add  d:Delete  h/l:Day  [/]:Month  t:Today  i:Insight  ?:Help  q:Quit"
                .to_string(),
            Style::default().fg(Color::DarkGray),
        )
    };

    let footer = Paragraph::new(msg)
        .style(style)
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = centered_rect(60, 80, f.area());
    f.render_widget(Clear, area);

    let help_text = r#"
ChronoTask Keybindings

Navigation:
  j/k, Up/Down    Move task selection
  h/l, Left/Right Previous/next day
  [/]             Previous/next calendar month
  t               Jump to today

Actions:
  Space, Enter    Toggle completion
  a               Add new task (Tab cycles priority)
  d               Delete task
  i               Generate AI insight for this day

General:
  ?               Show this help
  q               Quit

Press any key to close
"#;

    let popup = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: false });

    f.render_widget(popup, area);
}

fn draw_confirm_dialog(f: &mut Frame, dialog: &crate::app::ConfirmDialog) {
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);

    let text = Paragraph::new(dialog.message.clone())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", dialog.title)),
        )
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(text, area);
}

fn draw_add_dialog(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);

    let title = format!(
        " New task for {} ({} {} - Tab to change) ",
        app.selected_date,
        app.input_priority.symbol(),
        app.input_priority.label()
    );

    let input = Paragraph::new(app.input_buffer.as_str())
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(Color::Yellow));

    f.render_widget(input, area);

    // Show cursor
    f.set_cursor_position((area.x + 1 + app.input_buffer.len() as u16, area.y + 1));
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
