use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .title(" Debug ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.foreground_dim));

    let mut lines = Vec::new();

    let generation = app
        .feed()
        .map_or_else(|| "-".to_string(), |f| f.generation().to_string());
    let task_count = app.debug.running_tasks.len();
    lines.push(Line::from(vec![
        Span::styled("Tasks: ", Style::default().fg(theme.foreground_dim)),
        Span::styled(
            task_count.to_string(),
            Style::default().fg(if task_count > 0 {
                theme.spinner
            } else {
                theme.foreground
            }),
        ),
        Span::styled("  Generation: ", Style::default().fg(theme.foreground_dim)),
        Span::styled(generation, Style::default().fg(theme.foreground)),
    ]));

    for task in &app.debug.running_tasks {
        let elapsed = task.started_at.elapsed();
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!("[{}] ", task.id),
                Style::default().fg(theme.foreground_dim),
            ),
            Span::styled(&task.description, Style::default().fg(theme.foreground)),
            Span::styled(
                format!(" ({:.1?})", elapsed),
                Style::default().fg(theme.date),
            ),
        ]));
    }

    if !app.debug.running_tasks.is_empty() {
        lines.push(Line::from(""));
    }

    // Newest first, as many as fit
    let available_lines = area.height.saturating_sub(3) as usize;
    let log_lines = available_lines.saturating_sub(app.debug.running_tasks.len() + 1);

    for entry in app.debug.log.iter().rev().take(log_lines) {
        lines.push(Line::from(Span::styled(
            format!("  {}", entry.message),
            Style::default().fg(theme.foreground_dim),
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestAppBuilder;
    use crate::views::tests::render_to_string;

    #[test]
    fn shows_tasks_and_recent_outcomes() {
        let mut app = TestAppBuilder::new().with_sample_stories().build();
        let done = app.debug.start_task("Filter page 1 (gen 1)");
        app.debug.end_task(done, "discarded (stale)");
        app.debug.start_task("Load more page 2 (gen 1)");

        let output = render_to_string(70, 10, |frame| {
            render(frame, &app, frame.area());
        });

        assert!(output.contains("Tasks: 1"));
        assert!(output.contains("Generation: 0"));
        assert!(output.contains("Load more page 2"));
        assert!(output.contains("discarded (stale)"));
    }
}
