use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::tui::app::{App, HEADER_ROWS};
use crate::tui::component::Component;
use crate::tui::components::HelpView;
use crate::tui::styles::Styles;

pub fn draw_ui(frame: &mut Frame, app: &mut App) {
    use Constraint::{Length, Min};
    let help_height = app.help_height();
    let layout = Layout::vertical([Length(1), Length(HEADER_ROWS - 1), Min(0), Length(help_height)]);
    let [title_area, _, page_area, help_area] = layout.areas(frame.area());

    draw_title(frame, title_area, app);

    let styles = app.common.styles.clone();
    match &app.error {
        Some(error_msg) => draw_error_view(frame, page_area, &styles, error_msg),
        None => app.selection.render(frame, page_area),
    }

    let help = HelpView::new(&styles, &app.selection, app.show_full_help);
    help.render(frame, help_area);
}

fn draw_title(frame: &mut Frame, area: Rect, app: &App) {
    let styles = &app.common.styles;
    let title = Span::styled(format!(" {} ", app.title), styles.app_title);
    frame.render_widget(Paragraph::new(Line::from(title)), area);

    if let Some(status) = &app.status {
        frame.render_widget(
            Paragraph::new(status.as_str())
                .alignment(Alignment::Right)
                .style(styles.status),
            area,
        );
    }
}

fn draw_error_view(frame: &mut Frame, area: Rect, styles: &Styles, error_msg: &str) {
    let block = Block::bordered().title(Span::styled(" ERROR ", styles.error_title));
    let body = vec![
        Line::from(Span::styled(error_msg.to_string(), styles.error_body)),
        Line::default(),
        Line::from("Press any key to exit."),
    ];
    let error_paragraph = Paragraph::new(body)
        .block(block)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    frame.render_widget(error_paragraph, area);
}
