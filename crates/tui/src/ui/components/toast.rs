use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
};

use crate::{app::SuccessBanner, ui::theme::Theme};

/// Bottom-right toast for the timed success banner.
pub fn render(frame: &mut Frame<'_>, area: Rect, banner: Option<&SuccessBanner>) {
    let Some(banner) = banner else {
        return;
    };
    let theme = Theme::default();
    let width = (banner.message.len() + 4).min(area.width as usize) as u16;
    let height = 3u16;
    let x = area.x + area.width.saturating_sub(width);
    let y = area
        .y
        .saturating_add(area.height.saturating_sub(height + 1));
    let rect = Rect {
        x,
        y,
        width,
        height,
    };

    let style = Style::default().fg(theme.positive);
    let block = Block::default().borders(Borders::ALL).border_style(style);
    let content = Paragraph::new(Line::from(banner.message.as_str())).style(style);
    frame.render_widget(content.block(block), rect);
}
