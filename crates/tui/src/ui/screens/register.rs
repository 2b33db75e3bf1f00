use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::{AppState, RegisterFocus},
    intake::form::Field,
    ui::{components::card::Card, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // AI box
            Constraint::Length(1), // Global error line
            Constraint::Min(0),    // Form
        ])
        .split(area);

    render_ai_box(frame, layout[0], state, &theme);
    render_global_error(frame, layout[1], state, &theme);
    render_form(frame, layout[2], state, &theme);
}

fn render_ai_box(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let register = &state.register;
    let ai_focused = matches!(
        register.focus,
        RegisterFocus::PhotoPath | RegisterFocus::Staged
    );

    let card = Card::new("AI Auto-uzupełnianie", theme).focused(ai_focused);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Subtitle / busy indicator
            Constraint::Length(1), // Photo path input
            Constraint::Min(0),    // Staged list
        ])
        .split(inner);

    let subtitle = if register.analyzing {
        Span::styled("Analiza...", Style::default().fg(theme.accent))
    } else {
        Span::styled(
            "Wgraj zdjęcia, a system rozpozna kategorię i opis.",
            Style::default().fg(theme.dim),
        )
    };
    frame.render_widget(Paragraph::new(subtitle), rows[0]);

    let path_focused = register.focus == RegisterFocus::PhotoPath;
    let cursor = if path_focused { "│" } else { "" };
    let input_style = if path_focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Plik: ", Style::default().fg(theme.text_muted)),
            Span::styled(format!("{}{cursor}", register.photo_input), input_style),
        ])),
        rows[1],
    );

    let list_focused = register.focus == RegisterFocus::Staged;
    let mut lines = Vec::new();
    for (index, photo) in register
        .staging
        .iter()
        .take(rows[2].height as usize)
        .enumerate()
    {
        let selected = list_focused && index == register.staged_selected;
        let marker = if selected { "▸ " } else { "  " };
        let style = if selected {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.text)
        };
        lines.push(Line::from(Span::styled(
            format!("{marker}{}", photo.file_name),
            style,
        )));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Brak zdjęć w poczekalni",
            Style::default().fg(theme.dim),
        )));
    }
    frame.render_widget(Paragraph::new(lines), rows[2]);
}

fn render_global_error(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    if let Some(message) = &state.register.global_error {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("❌ {message}"),
                Style::default().fg(theme.error),
            )),
            area,
        );
    }
}

fn render_form(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let form_focused = matches!(state.register.focus, RegisterFocus::Form(_));
    let card = Card::new("Rejestracja przedmiotu", theme).focused(form_focused);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Dates
            Constraint::Length(1),
            Constraint::Length(3), // Category and status
            Constraint::Length(1),
            Constraint::Length(3), // Location
            Constraint::Length(1),
            Constraint::Length(3), // Description
            Constraint::Min(0),
        ])
        .split(inner);

    render_field_pair(
        frame,
        rows[0],
        state,
        Field::DataZnalezienia,
        Field::DataPrzekazania,
        theme,
    );
    render_field_pair(frame, rows[2], state, Field::Kategoria, Field::Status, theme);
    render_field_pair(
        frame,
        rows[4],
        state,
        Field::AdresZnalezienia,
        Field::AdresZnalezieniaOpis,
        theme,
    );
    render_field(frame, rows[6], state, Field::Opis, theme);
}

fn render_field_pair(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    left: Field,
    right: Field,
    theme: &Theme,
) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);

    render_field(frame, cols[0], state, left, theme);
    render_field(frame, cols[2], state, right, theme);
}

fn render_field(frame: &mut Frame<'_>, area: Rect, state: &AppState, field: Field, theme: &Theme) {
    let register = &state.register;
    let focused = register.focus == RegisterFocus::Form(field);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Label
            Constraint::Length(1), // Value
            Constraint::Length(1), // Error or helper
        ])
        .split(area);

    let label_style = if focused {
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_muted)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(field.label(), label_style)),
        rows[0],
    );

    let value = field_value(state, field, focused);
    let value_style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text)
    };
    frame.render_widget(Paragraph::new(Span::styled(value, value_style)), rows[1]);

    if let Some(error) = register.form.error(field) {
        frame.render_widget(
            Paragraph::new(Span::styled(error, Style::default().fg(theme.error))),
            rows[2],
        );
    } else if field == Field::DataPrzekazania {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Jeśli inna niż data znalezienia",
                Style::default().fg(theme.dim),
            )),
            rows[2],
        );
    }
}

fn field_value(state: &AppState, field: Field, focused: bool) -> String {
    let draft = state.register.form.draft();
    match field {
        Field::Kategoria => select_value(draft.kategoria.label(), focused),
        Field::Status => select_value(draft.status.label(), focused),
        _ => {
            let cursor = if focused { "│" } else { "" };
            format!("{}{cursor}", state.register.form.text(field))
        }
    }
}

fn select_value(label: &str, focused: bool) -> String {
    if focused {
        format!("◂ {label} ▸")
    } else {
        label.to_string()
    }
}
