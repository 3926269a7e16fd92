use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use erc20_indexer::domain::address::{checksum, short_addr};
use erc20_indexer::domain::token::display_balance;
use erc20_indexer::{AggregatedResult, QueryState, TokenBalanceRecord, TokenMetadata};

pub mod layout;

use crate::app::{App, StatusLevel};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const CARD_HEIGHT: u16 = 5;

pub fn draw(f: &mut Frame, app: &mut App) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header);
    draw_wallet_line(f, areas.wallet, app);
    draw_input(f, areas.input, app);
    draw_message(f, areas.message, app);
    draw_results(f, areas.results, app);
    draw_status_line(f, areas.status_line, app);
    draw_key_line(f, areas.key_line);

    if app.help_open {
        draw_help_popup(f, areas.size);
    }
}

fn draw_header(f: &mut Frame, area: Rect) {
    let text = Text::from(vec![
        Line::from(Span::styled(
            "ERC-20 Token Indexer",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Connect your wallet or enter an address to see all ERC-20 token balances!",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn draw_wallet_line(f: &mut Frame, area: Rect, app: &App) {
    let line = match (app.wallet, app.wallet_available) {
        (Some(address), _) => Line::from(vec![
            Span::styled("● Wallet Connected ", Style::default().fg(Color::Green)),
            Span::raw(short_addr(&checksum(&address))),
        ]),
        (None, true) => Line::from(Span::styled(
            "○ Connect Wallet (F2)",
            Style::default().fg(Color::Green),
        )),
        (None, false) => Line::from(Span::styled(
            "○ No wallet endpoint configured",
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_input(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Get all the ERC-20 token balances of this address ");
    let paragraph = Paragraph::new(format!("{}_", app.input))
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn draw_message(f: &mut Frame, area: Rect, app: &App) {
    let line = match &app.query {
        QueryState::Failure(kind, message) => Line::from(vec![
            Span::styled(
                format!("[{}] ", kind.label()),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(message.clone(), Style::default().fg(Color::Red)),
        ]),
        QueryState::Loading => Line::from(Span::styled(
            format!(
                "{} Fetching tokens...",
                SPINNER[app.spinner_frame % SPINNER.len()]
            ),
            Style::default().fg(Color::Blue),
        )),
        _ => Line::default(),
    };
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_results(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" ERC-20 token balances ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let result = match &app.query {
        QueryState::Success(result) => result,
        QueryState::Loading => {
            let paragraph = Paragraph::new("Fetching tokens...")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Blue));
            f.render_widget(paragraph, inner);
            return;
        }
        _ => {
            if !app.has_queried {
                let paragraph =
                    Paragraph::new("Please make a query! This may take a few seconds...")
                        .alignment(Alignment::Center)
                        .style(Style::default().fg(Color::DarkGray));
                f.render_widget(paragraph, inner);
            }
            return;
        }
    };

    if result.is_empty() {
        let paragraph = Paragraph::new("No ERC-20 tokens held by this address")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(paragraph, inner);
        return;
    }

    draw_card_grid(f, inner, result, app.scroll);
}

fn draw_card_grid(f: &mut Frame, area: Rect, result: &AggregatedResult, scroll: usize) {
    let columns = layout::grid_columns(area.width);
    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
    let first_row = scroll / columns;

    let cards: Vec<(&TokenBalanceRecord, &TokenMetadata)> = result.rows().collect();
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
        .split(area);

    for (row_idx, row_area) in row_areas.iter().enumerate() {
        let start = (first_row + row_idx) * columns;
        if start >= cards.len() {
            break;
        }
        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(*row_area);

        for (col_idx, card_area) in col_areas.iter().enumerate() {
            if let Some((balance, meta)) = cards.get(start + col_idx) {
                draw_card(f, *card_area, balance, meta);
            }
        }
    }
}

fn draw_card(f: &mut Frame, area: Rect, balance: &TokenBalanceRecord, meta: &TokenMetadata) {
    let title = meta
        .name
        .clone()
        .unwrap_or_else(|| short_addr(&checksum(&balance.contract)));
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title));

    let logo = meta
        .logo
        .clone()
        .unwrap_or_else(|| "(no logo)".to_string());
    let text = Text::from(vec![
        Line::from(vec![
            Span::styled("Symbol: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                meta.display_symbol(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Balance: ", Style::default().fg(Color::DarkGray)),
            Span::raw(display_balance(balance.balance, meta.decimals)),
        ]),
        Line::from(Span::styled(logo, Style::default().fg(Color::DarkGray))),
    ]);

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled("Provider ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.endpoint)),
        Span::styled("Cached ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.cached_queries)),
    ];
    if let Some(result) = app.query.result() {
        spans.push(Span::styled("Owner ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::raw(format!("{}  ", short_addr(&checksum(&result.owner())))));
        spans.push(Span::styled("Fetched ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::raw(format!(
            "{}  ",
            result.fetched_at().format("%H:%M:%S")
        )));
    }
    if let Some((text, level)) = app.status_text() {
        let color = match level {
            StatusLevel::Info => Color::Green,
            StatusLevel::Error => Color::Red,
        };
        spans.push(Span::styled(text.to_string(), Style::default().fg(color)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

fn draw_key_line(f: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "Enter check balances  F2 connect wallet  ↑/↓ scroll  Ctrl-U clear  ? help  Esc quit",
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(Paragraph::new(line), area);
}

fn draw_help_popup(f: &mut Frame, size: Rect) {
    let area = centered_rect(60, 50, size);
    let text = Text::from(vec![
        Line::from("Type an address (0x…) or ENS name (name.eth)."),
        Line::from(""),
        Line::from("Enter     check ERC-20 token balances"),
        Line::from("F2        connect wallet and use its account"),
        Line::from("↑/↓       scroll results"),
        Line::from("Ctrl-U    clear input"),
        Line::from("Esc       quit (or close this help)"),
        Line::from(""),
        Line::from("Results are cached per exact input for this session."),
    ]);
    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
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
