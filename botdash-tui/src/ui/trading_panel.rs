//! Panel 2 - Trading: current position, wallet, recent orders.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use botdash_core::domain::{OrderSide, OrderStatus, Position, Wallet};
use botdash_core::format::{format_currency, format_date, format_signed_pct};

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(snapshot) = &app.snapshot else {
        f.render_widget(
            Paragraph::new(Span::styled("Waiting for the first snapshot...", theme::muted())),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(4)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    render_position(f, top[0], snapshot.position.as_ref());
    render_wallet(f, top[1], snapshot.wallet.as_ref());
    render_orders(f, chunks[1], app);
}

fn section(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(format!(" {title} "))
        .title_style(theme::accent_bold())
}

fn field<'a>(label: &str, value: String, style: ratatui::style::Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:>14}: "), theme::muted()),
        Span::styled(value, style),
    ])
}

fn render_position(f: &mut Frame, area: Rect, position: Option<&Position>) {
    let lines = match position {
        None => vec![Line::from(Span::styled("No open position", theme::muted()))],
        Some(p) => vec![
            field("Symbol", p.symbol.clone(), theme::accent_bold()),
            field("Quantity", format!("{:.4}", p.quantity), theme::text()),
            field("Entry", format_currency(p.entry_price), theme::text()),
            field("Current", format_currency(p.current_price), theme::text()),
            field(
                "P&L",
                format!("{} ({})", format_currency(p.pnl), format_signed_pct(p.pnl_percentage)),
                theme::metric_color(p.pnl),
            ),
            field("Opened", format_date(p.timestamp), theme::muted()),
        ],
    };
    f.render_widget(Paragraph::new(lines).block(section("Position")), area);
}

fn render_wallet(f: &mut Frame, area: Rect, wallet: Option<&Wallet>) {
    let lines = match wallet {
        None => vec![Line::from(Span::styled("Wallet unavailable", theme::muted()))],
        Some(w) => vec![
            field("Balance", format_currency(w.balance), theme::accent_bold()),
            field("Available", format_currency(w.available), theme::text()),
            field("In use", format_currency(w.in_use()), theme::text()),
            field(
                "P&L",
                format!(
                    "{} ({})",
                    format_currency(w.profit_loss),
                    format_signed_pct(w.profit_loss_percentage)
                ),
                theme::metric_color(w.profit_loss),
            ),
            field("Updated", format_date(w.last_updated), theme::muted()),
        ],
    };
    f.render_widget(Paragraph::new(lines).block(section("Wallet")), area);
}

fn render_orders(f: &mut Frame, area: Rect, app: &AppState) {
    let orders = app.snapshot.as_ref().map(|s| s.orders.as_slice()).unwrap_or_default();
    let block = section(&format!("Orders ({}) [j/k]scroll", orders.len()));
    if orders.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("No recent orders", theme::muted())).block(block),
            area,
        );
        return;
    }

    let visible = area.height.saturating_sub(3) as usize;
    let start = app.trading.order_cursor.saturating_sub(visible.saturating_sub(1));
    let rows: Vec<Row> = orders
        .iter()
        .enumerate()
        .skip(start)
        .take(visible.max(1))
        .map(|(i, o)| {
            let side_style = match o.side {
                OrderSide::Buy => theme::positive(),
                OrderSide::Sell => theme::negative(),
            };
            let status_style = match o.status {
                OrderStatus::Filled => theme::positive(),
                OrderStatus::Open => theme::warning(),
                OrderStatus::Canceled => theme::muted(),
                OrderStatus::Rejected => theme::negative(),
            };
            let row = Row::new(vec![
                Cell::from(o.id.clone()),
                Cell::from(o.symbol.clone()),
                Cell::from(o.side.to_string()).style(side_style),
                Cell::from(format!("{:?}", o.order_type).to_uppercase()),
                Cell::from(format!("{:.4}", o.quantity)),
                Cell::from(format_currency(o.price)),
                Cell::from(format_currency(o.notional())),
                Cell::from(format!("{:?}", o.status).to_uppercase()).style(status_style),
                Cell::from(format_date(o.timestamp)).style(theme::muted()),
            ]);
            if i == app.trading.order_cursor {
                row.style(theme::selected())
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(5),
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Min(19),
        ],
    )
    .header(
        Row::new(vec![
            "ID", "Symbol", "Side", "Type", "Qty", "Price", "Notional", "Status", "Time",
        ])
        .style(theme::accent_bold()),
    )
    .block(block);
    f.render_widget(table, area);
}
