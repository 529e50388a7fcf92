use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use doctor_core::{render::Block as BodyBlock, ErrorPanel, FieldId, Panel, UiState};

use crate::app::{App, FocusPane, InputMode, ServiceStatus};

const SPINNER: [&str; 3] = ["◐", "◓", "◑"];

/// Cursor row and column inside a (possibly multi-line) value.
fn cursor_row_col(value: &str, cursor: usize) -> (usize, usize) {
    let before: String = value.chars().take(cursor).collect();
    let row = before.matches('\n').count();
    let col = before.rsplit('\n').next().map(|s| s.chars().count()).unwrap_or(0);
    (row, col)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [form_area, results_area] = Layout::horizontal([
        Constraint::Percentage(40),
        Constraint::Percentage(60),
    ])
    .areas(body_area);

    render_form(app, frame, form_area);
    render_results(app, frame, results_area);

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Doctor.AI ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.client.endpoint().to_string(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_form(app: &mut App, frame: &mut Frame, area: Rect) {
    let form_focused = app.focus == FocusPane::Form;
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if form_focused { Color::Cyan } else { Color::DarkGray }))
        .title(" Patient Intake ");
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let mut constraints: Vec<Constraint> = FieldId::all()
        .iter()
        .map(|id| Constraint::Length(if id.is_multiline() { 4 } else { 3 }))
        .collect();
    constraints.push(Constraint::Length(1)); // buttons
    constraints.push(Constraint::Min(0));

    let rows = Layout::vertical(constraints).split(inner);
    let field_count = FieldId::all().len();
    app.field_areas = rows[..field_count].to_vec();

    for (idx, id) in FieldId::all().into_iter().enumerate() {
        render_field(app, frame, rows[idx], idx, id);
    }

    render_buttons(app, frame, rows[field_count]);
}

fn render_field(app: &App, frame: &mut Frame, area: Rect, idx: usize, id: FieldId) {
    let selected = app.focus == FocusPane::Form && app.field_idx == idx;
    let editing = selected && app.input_mode == InputMode::Editing;

    let border_color = if editing {
        Color::Yellow
    } else if selected {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let title = if id.is_required() {
        format!(" {} * ", id.label())
    } else {
        format!(" {} ", id.label())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let value = app.controller.form().value(id);
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;

    // Keep the cursor in view when editing
    let (row, col) = if editing {
        cursor_row_col(value, app.cursor)
    } else {
        (0, 0)
    };
    let scroll_y = if inner_height == 0 { 0 } else { row.saturating_sub(inner_height - 1) };
    let scroll_x = if inner_width == 0 || col < inner_width { 0 } else { col - inner_width + 1 };

    let content = if value.is_empty() && !editing {
        let hint = if id.is_required() { "required" } else { "optional" };
        Text::from(Span::styled(hint, Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)))
    } else {
        Text::from(value.to_string())
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .scroll((scroll_y as u16, scroll_x as u16));
    frame.render_widget(paragraph, area);

    if editing {
        frame.set_cursor_position((
            area.x + 1 + (col - scroll_x) as u16,
            area.y + 1 + (row - scroll_y) as u16,
        ));
    }
}

fn render_buttons(app: &App, frame: &mut Frame, area: Rect) {
    let control = app.controller.submit_control();

    let submit = if control.enabled {
        Span::styled(
            format!(" {} ", control.label),
            Style::default().bg(Color::Blue).fg(Color::White).bold(),
        )
    } else {
        let spinner = SPINNER[app.animation_frame as usize % SPINNER.len()];
        Span::styled(
            format!(" {} {} ", spinner, control.label),
            Style::default().bg(Color::DarkGray).fg(Color::Gray),
        )
    };

    let line = Line::from(vec![
        Span::raw(" "),
        submit,
        Span::raw("  "),
        Span::styled(" Clear Form ", Style::default().bg(Color::Gray).fg(Color::Black)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_results(app: &mut App, frame: &mut Frame, area: Rect) {
    app.results_area = Some(area);
    let focused = app.focus == FocusPane::Results;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }))
        .title(" Analysis ");

    let text = match app.controller.state() {
        UiState::Idle => Text::from(Span::styled(
            "Fill in the patient details and press Ctrl+S to analyze.",
            Style::default().fg(Color::DarkGray),
        )),
        UiState::Submitting => {
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            Text::from(Span::styled(
                format!("Analyzing patient data{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))
        }
        UiState::Rendered(panels) => {
            let selected = focused.then_some(app.selected_panel);
            Text::from(accordion_lines(panels, selected))
        }
        UiState::Errored => Text::from(error_lines()),
    };

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.results_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn block_line(block: &BodyBlock) -> Line<'static> {
    let text = block.text().to_string();
    match block {
        BodyBlock::DangerAlert(_) => Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!(" {} ", text),
                Style::default().bg(Color::Red).fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]),
        BodyBlock::Recommendation(_) => Line::from(vec![
            Span::raw("  "),
            Span::styled("▌ ", Style::default().fg(Color::Green)),
            Span::styled(text, Style::default().fg(Color::Green)),
        ]),
        BodyBlock::Paragraph(_) => Line::from(format!("  {}", text)),
    }
}

/// Accordion: a header per panel, with bodies only for expanded panels.
pub fn accordion_lines(panels: &[Panel], selected: Option<usize>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for panel in panels {
        let marker = if panel.expanded { "▾" } else { "▸" };
        let mut header_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        if selected == Some(panel.index) {
            header_style = header_style.bg(Color::DarkGray);
        }
        lines.push(Line::from(Span::styled(
            format!("{} {}", marker, panel.heading()),
            header_style,
        )));

        if panel.expanded {
            lines.extend(panel.blocks.iter().map(block_line));
        }
        lines.push(Line::default());
    }

    lines
}

pub fn error_lines() -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            ErrorPanel::HEADING,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(ErrorPanel::MESSAGE, Style::default().fg(Color::Red))),
    ];
    lines.extend(
        ErrorPanel::service_lines()
            .into_iter()
            .map(|service| Line::from(Span::styled(format!("  • {}", service), Style::default().fg(Color::Red)))),
    );
    lines
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints: Vec<(&str, &str)> = match (app.input_mode, app.focus) {
        (InputMode::Editing, _) => vec![("Esc", "done"), ("Tab", "next"), ("^S", "analyze")],
        (InputMode::Normal, FocusPane::Form) => vec![
            ("j/k", "field"),
            ("Enter", "edit"),
            ("s", "analyze"),
            ("C", "clear"),
            ("Tab", "results"),
            ("q", "quit"),
        ],
        (InputMode::Normal, FocusPane::Results) => vec![
            ("j/k", "panel"),
            ("Enter", "expand"),
            ("d/u", "scroll"),
            ("Tab", "form"),
            ("q", "quit"),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }

    if let Some(flash) = &app.flash {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(flash.clone(), Style::default().fg(Color::Yellow)));
    }

    let status = match &app.service_status {
        ServiceStatus::Unknown => Span::styled("  service: ? (F5)", Style::default().fg(Color::DarkGray)),
        ServiceStatus::Checking => Span::styled("  service: checking", Style::default().fg(Color::DarkGray)),
        ServiceStatus::Reported(status) => Span::styled(
            format!("  service: {}", status),
            Style::default().fg(if status == "healthy" { Color::Green } else { Color::Yellow }),
        ),
        ServiceStatus::Unreachable => Span::styled("  service: unreachable", Style::default().fg(Color::Red)),
    };
    spans.push(status);

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
