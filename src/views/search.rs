use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::{App, Overlay};
use crate::views::common::centered_rect;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(Overlay::Search { input }) = &app.overlay else {
        return;
    };
    let theme = &app.theme;

    let popup_area = centered_rect(50, 3, area);
    frame.render_widget(Clear, popup_area);

    let line = Line::from(vec![
        Span::styled("/ ", Style::default().fg(theme.primary)),
        Span::styled(input.clone(), Style::default().fg(theme.foreground)),
        Span::styled("_", Style::default().fg(theme.spinner)),
    ]);
    let widget = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style())
            .title(" Search ")
            .title_bottom(Line::styled(" Enter:apply  Esc:cancel ", theme.dim_style())),
    );
    frame.render_widget(widget, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestAppBuilder;
    use crate::views::tests::render_to_string;

    #[test]
    fn shows_current_input() {
        let app = TestAppBuilder::new()
            .overlay(Overlay::Search {
                input: "housing".into(),
            })
            .build();

        let output = render_to_string(60, 5, |frame| {
            render(frame, &app, frame.area());
        });

        assert!(output.contains("Search"));
        assert!(output.contains("/ housing_"));
        assert!(output.contains("Enter:apply"));
    }
}
