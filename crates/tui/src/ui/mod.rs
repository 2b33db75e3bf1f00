pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::AppState;

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    match state.screen {
        crate::app::Screen::Login => screens::login::render(frame, area, state),
        crate::app::Screen::Register => render_shell(frame, area, state),
    }
}

fn render_shell(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    screens::register::render(frame, layout[2], state);
    render_bottom_bar(frame, layout[3], &theme);
    components::toast::render(frame, area, state.register.success.as_ref());
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let powiat = state.powiat.as_deref().unwrap_or("-");
    let user = state.login.email.as_str();
    let status = if state.connection_ok { "OK" } else { "ERR" };
    let status_style = if state.connection_ok {
        Style::default().fg(theme.positive)
    } else {
        Style::default().fg(theme.error)
    };

    let line = Line::from(vec![
        Span::styled("Rejestracja Zgub", Style::default().fg(theme.accent)),
        Span::raw("  "),
        Span::styled("Powiat", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {powiat}  ")),
        Span::styled("Urzędnik", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {user}  ")),
        Span::styled(status, status_style),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let parts = vec![
        Span::styled("Tab", Style::default().fg(theme.accent)),
        Span::raw(" pola  "),
        Span::styled("Enter", Style::default().fg(theme.accent)),
        Span::raw(" dodaj/usuń zdjęcie  "),
        Span::styled("Ctrl+A", Style::default().fg(theme.accent)),
        Span::raw(" analiza  "),
        Span::styled("Ctrl+S", Style::default().fg(theme.accent)),
        Span::raw(" zapisz  "),
        Span::styled("Ctrl+L", Style::default().fg(theme.accent)),
        Span::raw(" wyloguj  "),
        Span::styled("Ctrl+C", Style::default().fg(theme.accent)),
        Span::raw(" wyjście"),
    ];

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}
