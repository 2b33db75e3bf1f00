use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{AppState, LoginField},
    ui::theme::Theme,
};

/// Calculates a centered rect for the login box
fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let box_width = 40;
    let box_height = 6;
    let card_area = centered_box(box_width, box_height, area);

    // Clear the area behind the form
    frame.render_widget(Clear, card_area);

    let block = Block::default()
        .title(" System Zgub ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Email
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Password
        ])
        .margin(1)
        .split(inner);

    let login = &state.login;

    let email_focused = login.focus == LoginField::Email;
    render_input(frame, rows[0], &login.email, false, email_focused, &theme);

    let password_focused = login.focus == LoginField::Password;
    render_input(
        frame,
        rows[2],
        &login.password,
        true,
        password_focused,
        &theme,
    );

    // Status line below the box: busy indicator or rejection message.
    let status_area = Rect {
        x: card_area.x,
        y: card_area.y + card_area.height + 1,
        width: card_area.width,
        height: 1,
    };
    if login.busy {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Logowanie...",
                Style::default().fg(theme.dim),
            ))
            .alignment(Alignment::Center),
            status_area,
        );
    } else if let Some(message) = &login.message {
        frame.render_widget(
            Paragraph::new(Span::styled(
                message.as_str(),
                Style::default().fg(theme.error),
            ))
            .alignment(Alignment::Center),
            status_area,
        );
    }
}

/// Renders a simple input field - just value and cursor, no labels
fn render_input(
    frame: &mut Frame<'_>,
    area: Rect,
    value: &str,
    is_password: bool,
    focused: bool,
    theme: &Theme,
) {
    let cursor = if focused { "│" } else { "" };

    let display = if is_password {
        format!("{}{}", mask_password(value), cursor)
    } else {
        format!("{value}{cursor}")
    };

    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };

    frame.render_widget(Paragraph::new(Span::styled(display, style)), area);
}

/// Masks password with bullets, one per character
fn mask_password(password: &str) -> String {
    if password.is_empty() {
        String::new()
    } else {
        "•".repeat(password.chars().count())
    }
}
