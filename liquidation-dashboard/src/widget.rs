//! Ratatui rendering of a [`DashboardView`]
//!
//! Thin adapter: every string comes pre-formatted from the projection, this
//! module only picks layout and colours.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::projection::{DashboardView, EventRow, FundingCard, FundingTone, RowTone};
use crate::settings::{SettingsForm, ThresholdField};
use crate::symbol::Symbol;
use crate::websocket::ConnectionStatus;

const C_BUY: Color = Color::Rgb(100, 220, 100);
const C_SELL: Color = Color::Rgb(220, 100, 100);
const C_NEUTRAL: Color = Color::Rgb(180, 180, 100);
const C_DIM: Color = Color::Rgb(120, 120, 120);
const C_BRIGHT: Color = Color::Rgb(220, 220, 220);
const C_ACCENT: Color = Color::Rgb(100, 180, 220);
const C_LARGE: Color = Color::Rgb(255, 200, 60);

/// Everything outside the session that the frame needs
pub struct ScreenState<'a> {
    pub view: &'a DashboardView,
    pub form: &'a SettingsForm,
    pub status: ConnectionStatus,
    /// Show the "Applied!" acknowledgement
    pub applied: bool,
}

/// Draw the full dashboard
pub fn render_dashboard(f: &mut Frame, state: &ScreenState<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Min(6),
            Constraint::Length(4),
        ])
        .split(f.area());

    render_title(f, chunks[0], state);
    render_funding(f, chunks[1], &state.view.funding);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    render_events(f, panels[0], " LIQUIDATIONS ", &state.view.liquidations);
    render_events(f, panels[1], " LARGE TRADES ", &state.view.trades);

    render_settings(f, chunks[3], state.form, state.applied);
}

fn render_title(f: &mut Frame, area: Rect, state: &ScreenState<'_>) {
    let status_color = match state.status {
        ConnectionStatus::Connected => C_BUY,
        ConnectionStatus::Reconnecting => C_NEUTRAL,
        ConnectionStatus::Disconnected => C_SELL,
    };
    let stats = state.view.stats;

    let line = Line::from(vec![
        Span::styled(
            " LIQUIDATION DASHBOARD ",
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("● {} ", state.status.label()),
            Style::default().fg(status_color),
        ),
        Span::styled(
            format!(
                " events {}  shown {}  filtered {}  dropped {}",
                stats.events, stats.accepted, stats.filtered, stats.malformed
            ),
            Style::default().fg(C_DIM),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_funding(f: &mut Frame, area: Rect, cards: &[FundingCard]) {
    if cards.is_empty() {
        let block = Block::default()
            .title(" FUNDING ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(C_DIM));
        let placeholder = Paragraph::new(Span::styled(
            "No symbols selected",
            Style::default().fg(C_DIM),
        ))
        .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    let count = cards.len() as u32;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(cards.iter().map(|_| Constraint::Ratio(1, count)))
        .split(area);

    for (card, column) in cards.iter().zip(columns.iter()) {
        render_funding_card(f, *column, card);
    }
}

fn render_funding_card(f: &mut Frame, area: Rect, card: &FundingCard) {
    let tone_color = match card.tone {
        FundingTone::Positive => C_BUY,
        FundingTone::Negative => C_SELL,
        FundingTone::Flat => C_DIM,
    };
    let border_color = if card.extreme { C_LARGE } else { C_ACCENT };

    let block = Block::default()
        .title(format!(" {} ", card.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let mut rate_style = Style::default().fg(tone_color).add_modifier(Modifier::BOLD);
    if card.extreme {
        rate_style = rate_style.add_modifier(Modifier::REVERSED);
    }

    let lines = vec![
        Line::from(Span::styled(card.rate.clone(), rate_style)),
        Line::from(vec![
            Span::styled("Annual: ", Style::default().fg(C_DIM)),
            Span::styled(card.annualized.clone(), Style::default().fg(tone_color)),
        ]),
        Line::from(Span::styled(card.direction.clone(), Style::default().fg(C_DIM))),
    ];
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_events(f: &mut Frame, area: Rect, title: &str, rows: &[EventRow]) {
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT));

    let table_rows = rows.iter().map(|row| {
        let tone_color = match row.tone {
            RowTone::LongLiquidation | RowTone::Sell => C_SELL,
            RowTone::ShortLiquidation | RowTone::Buy => C_BUY,
        };
        let value_style = if row.large {
            Style::default().fg(C_LARGE).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_BRIGHT)
        };

        Row::new(vec![
            Cell::from(row.time.clone()).style(Style::default().fg(C_DIM)),
            Cell::from(row.symbol.as_str()).style(Style::default().fg(C_BRIGHT)),
            Cell::from(row.kind_label).style(Style::default().fg(tone_color)),
            Cell::from(row.detail.clone().unwrap_or_default())
                .style(Style::default().fg(C_DIM)),
            Cell::from(row.value.clone()).style(value_style),
        ])
        .height(1)
    });

    let table = Table::new(
        table_rows,
        [
            Constraint::Length(9),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Min(12),
            Constraint::Length(9),
        ],
    )
    .block(block);

    f.render_widget(table, area);
}

fn render_settings(f: &mut Frame, area: Rect, form: &SettingsForm, applied: bool) {
    let block = Block::default()
        .title(" SETTINGS ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_DIM));

    let mut symbols: Vec<Span> = Vec::new();
    for (index, symbol) in Symbol::ALL.iter().enumerate() {
        let checked = form.is_checked(*symbol);
        let style = if checked {
            Style::default().fg(C_BUY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_DIM)
        };
        symbols.push(Span::styled(
            format!("[{}]{}{} ", index + 1, if checked { "✓" } else { " " }, symbol),
            style,
        ));
    }

    let mut controls = vec![
        threshold_span(form, ThresholdField::Liquidation, 'l'),
        Span::raw("  "),
        threshold_span(form, ThresholdField::Trade, 't'),
        Span::styled(
            "   [a] apply  [r] reset  [q] quit",
            Style::default().fg(C_DIM),
        ),
    ];
    if applied {
        controls.push(Span::styled(
            "  Applied!",
            Style::default().fg(C_BUY).add_modifier(Modifier::BOLD),
        ));
    }

    let lines = vec![Line::from(symbols), Line::from(controls)];
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn threshold_span(form: &SettingsForm, field: ThresholdField, key: char) -> Span<'static> {
    let editing = form.editing() == Some(field);
    let style = if editing {
        Style::default().fg(C_NEUTRAL).add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default().fg(C_BRIGHT)
    };
    let cursor = if editing { "_" } else { "" };
    Span::styled(
        format!("[{}] {}: ${}{}", key, field.label(), form.field_text(field), cursor),
        style,
    )
}
