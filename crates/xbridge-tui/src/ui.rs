//! UI rendering.

use crate::app::{App, Route, WalletField};
use crate::log_buffer::LogLevel;
use qrcode::{EcLevel, QrCode};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use xbridge_core::{Asset, ConnectionStatus, DepositStep, StepView, TxStatus, format_amount};

/// Visible lines in the log pane.
const LOG_LINES: usize = 8;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(LOG_LINES as u16 + 2),
    ])
    .split(frame.area());

    render_header(frame, app, chunks[0]);
    match app.route {
        Route::Wallet => render_wallet(frame, app, chunks[1]),
        Route::BridgeDeposit => render_deposit(frame, app, chunks[1]),
    }
    render_logs(frame, app, chunks[2]);

    if app.showing_help {
        render_help_modal(frame, app);
    }
}

fn block<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.palette.border))
        .title(title)
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let mut spans = vec![Span::styled("Bridge deposit", Style::default().fg(p.accent).bold())];

    for (chain, status) in &app.connections {
        let (text, color) = match status {
            ConnectionStatus::Disconnected => ("offline".to_string(), p.muted),
            ConnectionStatus::Connecting => (format!("{}", app.spinner_char()), p.warning),
            ConnectionStatus::Connected { block } => (format!("#{}", block), p.success),
            ConnectionStatus::Error(_) => ("error".to_string(), p.error),
        };
        spans.push(Span::raw("  │  "));
        spans.push(Span::raw(format!("{} ", chain)));
        spans.push(Span::styled(text, Style::default().fg(color)));
    }

    if let Some(chain_id) = app.wallet_provider.bridge_chain_id {
        spans.push(Span::raw("  │  "));
        spans.push(Span::styled(
            format!("wallet chain {}", chain_id),
            Style::default().fg(p.primary),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block(app, "")), area);
}

// ==================== Wallet page ====================

fn render_wallet(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let focused = |field: WalletField| {
        if app.wallet.field == field {
            Style::default().fg(p.accent).bold()
        } else {
            Style::default().fg(p.fg)
        }
    };

    let cursor = if app.wallet.field == WalletField::Receiver { "▏" } else { "" };
    let assets: Vec<Span> = Asset::all()
        .iter()
        .map(|asset| {
            if *asset == app.wallet.asset() {
                Span::styled(format!(" [{}] ", asset), focused(WalletField::Asset))
            } else {
                Span::styled(format!("  {}  ", asset), Style::default().fg(p.muted))
            }
        })
        .collect();

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Receiver on RSK", focused(WalletField::Receiver))),
        Line::from(format!("  {}{}", app.wallet.receiver, cursor)),
        Line::from(""),
        Line::from(Span::styled("  Asset", focused(WalletField::Asset))),
        Line::from(assets),
        Line::from(""),
        Line::from(Span::styled(
            "  Tab: switch field   ←/→: asset   Enter: deposit",
            Style::default().fg(p.muted),
        )),
    ];
    if let Some(error) = &app.wallet.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            Style::default().fg(p.error),
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(block(app, " Wallet ")), area);
}

// ==================== Deposit page ====================

fn render_deposit(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks =
        Layout::horizontal([Constraint::Length(26), Constraint::Min(0)]).split(area);

    render_sidebar_steps(frame, app, chunks[0]);

    // One view per step.
    let content = chunks[1];
    match app.deposit.view() {
        StepView::ChainSelector => render_chain_selector(frame, app, content),
        StepView::TokenSelector => render_token_selector(frame, app, content),
        StepView::AmountSelector => render_amount_selector(frame, app, content),
        StepView::Review => render_review(frame, app, content),
        StepView::Confirm => render_confirm(frame, app, content),
        StepView::Processing => render_processing(frame, app, content),
        StepView::Complete => render_complete(frame, app, content),
    }
}

fn render_sidebar_steps(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let current = app.deposit.step.index();

    let items: Vec<ListItem> = DepositStep::all()
        .iter()
        .map(|step| {
            let (marker, style) = match step.index().cmp(&current) {
                std::cmp::Ordering::Less => ("✓", Style::default().fg(p.step_done)),
                std::cmp::Ordering::Equal => ("▶", Style::default().fg(p.step_active).bold()),
                std::cmp::Ordering::Greater => (" ", Style::default().fg(p.step_pending)),
            };
            ListItem::new(Line::from(Span::styled(
                format!(" {} {}", marker, step.label()),
                style,
            )))
        })
        .collect();

    frame.render_widget(List::new(items).block(block(app, " Steps ")), area);
}

fn highlight(app: &App) -> Style {
    Style::default()
        .fg(app.palette.selection)
        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
}

fn render_chain_selector(frame: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .source_chains()
        .iter()
        .map(|chain| {
            let name = app
                .dictionaries
                .networks
                .get(*chain)
                .map_or_else(|| chain.label().to_string(), |n| n.name.clone());
            ListItem::new(format!("  {}", name))
        })
        .collect();

    let list = List::new(items)
        .block(block(app, " Select network to deposit from "))
        .highlight_style(highlight(app));
    frame.render_stateful_widget(list, area, &mut app.page.list);
}

fn render_token_selector(frame: &mut Frame, app: &mut App, area: Rect) {
    let p = app.palette;
    let target = app
        .deposit
        .selection
        .target_asset
        .map(|a| a.to_string())
        .unwrap_or_default();

    let assets = app.source_assets();
    if assets.is_empty() {
        let network = app
            .deposit
            .selection
            .chain
            .and_then(|c| app.dictionaries.networks.get(c))
            .map(|n| n.name.clone())
            .unwrap_or_default();
        let text = Paragraph::new(format!(
            "Sorry, no supported deposit tokens for {} on {} network. Try choosing another network or token.",
            target, network
        ))
        .wrap(Wrap { trim: true })
        .block(block(app, " Select coin to deposit "));
        frame.render_widget(text, area);
        return;
    }

    let items: Vec<ListItem> = assets
        .iter()
        .map(|asset| {
            let limit = match (&app.page.limits, app.page.limits_loading) {
                (Some(limits), _) => limits.get(&asset.symbol).map(|l| {
                    Span::styled(
                        format!("  available {}", format_amount(*l, asset.decimals, 4)),
                        Style::default().fg(p.muted),
                    )
                }),
                (None, true) if asset.has_aggregator_limit() => Some(Span::styled(
                    format!("  {}", app.spinner_char()),
                    Style::default().fg(p.warning),
                )),
                _ => None,
            };
            let mut spans = vec![Span::raw(format!("  {} → {}", asset.symbol, target))];
            spans.extend(limit);
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block(app, " Select coin to deposit "))
        .highlight_style(highlight(app));
    frame.render_stateful_widget(list, area, &mut app.page.list);
}

fn render_amount_selector(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let Some(asset) = app.selected_asset() else {
        frame.render_widget(Paragraph::new("No token selected").block(block(app, " Amount ")), area);
        return;
    };

    let bound = |units: Option<u128>| {
        units.map_or_else(|| "-".to_string(), |u| format_amount(u, asset.decimals, 8))
    };
    let mut lines = vec![
        Line::from(""),
        Line::from(format!(
            "  Min {}   Max {}",
            bound(asset.min_amount_units()),
            bound(asset.max_amount_units())
        ))
        .style(Style::default().fg(p.muted)),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{}▏", app.page.amount_input), Style::default().fg(p.accent)),
            Span::raw(format!(" {}", asset.symbol)),
        ]),
    ];
    if let Some(error) = &app.page.amount_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), Style::default().fg(p.error))));
    }

    frame.render_widget(
        Paragraph::new(lines).block(block(app, " Enter amount ")),
        area,
    );
}

fn review_lines(app: &App) -> Vec<Line<'static>> {
    let p = &app.palette;
    let selection = &app.deposit.selection;
    let asset = app.selected_asset();

    let amount = match (selection.amount, asset) {
        (Some(amount), Some(asset)) => {
            format!("{} {}", format_amount(amount, asset.decimals, 8), asset.symbol)
        }
        _ => "-".to_string(),
    };
    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", label), Style::default().fg(p.muted)),
            Span::raw(value),
        ])
    };
    let show = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        Line::from(""),
        row("From", show(selection.chain.map(|c| c.to_string()))),
        row("To", show(selection.target_chain.map(|c| c.to_string()))),
        row("Send", amount),
        row("Receive", show(selection.target_asset.map(|a| a.to_string()))),
        row("Receiver", show(selection.receiver.clone())),
    ];
    if let Some(warning) = &app.page.amount_warning {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", warning),
            Style::default().fg(p.warning),
        )));
    }
    lines
}

fn render_review(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = review_lines(app);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Enter: confirm   Esc: back",
        Style::default().fg(app.palette.muted),
    )));
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block(app, " Review deposit ")),
        area,
    );
}

fn render_confirm(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let chunks = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let qr_lines = match &app.page.qr_data {
        Some(data) => match QrCode::with_error_correction_level(data, EcLevel::L) {
            Ok(qr) => render_qr_halfblock(&qr, app.theme.is_dark()),
            Err(e) => vec![Line::from(format!("Payload too large for a QR code: {}", e))],
        },
        None => vec![Line::from(
            app.page
                .build_error
                .clone()
                .unwrap_or_else(|| "No payload".to_string()),
        )
        .style(Style::default().fg(p.error))],
    };
    frame.render_widget(
        Paragraph::new(qr_lines)
            .alignment(Alignment::Center)
            .block(block(app, " Scan with your wallet ")),
        chunks[0],
    );

    let mut lines = Vec::new();
    if let Some(unsigned) = &app.page.unsigned {
        lines.push(Line::from(format!("  Chain id {}", unsigned.chain_id)));
        for (i, call) in unsigned.calls.iter().enumerate() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("  {}. {}", i + 1, call.description),
                Style::default().fg(p.accent),
            )));
            lines.push(Line::from(format!("     to {:?}", call.to)));
        }
    }
    if let TxStatus::Failed(reason) = &app.deposit.tx.status {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  Previous attempt failed: {}", reason),
            Style::default().fg(p.error),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from("  Transaction hash:"));
    lines.push(Line::from(Span::styled(
        format!("  {}▏", app.page.hash_input),
        Style::default().fg(p.accent),
    )));
    if let Some(error) = &app.page.hash_error {
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            Style::default().fg(p.error),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block(app, " Confirm ")),
        chunks[1],
    );
}

fn render_processing(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let hash = app.deposit.tx.hash.clone().unwrap_or_default();
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {} Waiting for the deposit to be mined", app.spinner_char()),
            Style::default().fg(p.warning),
        )),
        Line::from(""),
        Line::from(format!("  {}", hash)),
    ];
    if let Some(url) = app.deposit_tx_url() {
        lines.push(Line::from(Span::styled(format!("  {}", url), Style::default().fg(p.primary))));
    }
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block(app, " Processing ")),
        area,
    );
}

fn render_complete(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Deposit confirmed", Style::default().fg(p.success).bold())),
    ];
    lines.extend(review_lines(app));
    if let Some(url) = app.deposit_tx_url() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", url), Style::default().fg(p.primary))));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Enter: back to wallet",
        Style::default().fg(p.muted),
    )));
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block(app, " Complete ")),
        area,
    );
}

// ==================== Shared widgets ====================

/// Draw a QR code with half blocks, two module rows per text line.
fn render_qr_halfblock(qr: &QrCode, dark_theme: bool) -> Vec<Line<'static>> {
    use ratatui::style::Color;

    const QUIET: usize = 2;
    let width = qr.width();
    let colors = qr.to_colors();
    let size = width + 2 * QUIET;

    let is_dark = |x: usize, y: usize| {
        if x < QUIET || y < QUIET || x >= QUIET + width || y >= QUIET + width {
            return false;
        }
        colors[(y - QUIET) * width + (x - QUIET)] == qrcode::Color::Dark
    };

    // Dark themes invert the code so it reads light-on-dark.
    let (on, off) = if dark_theme {
        (Color::White, Color::Black)
    } else {
        (Color::Black, Color::White)
    };

    (0..size)
        .step_by(2)
        .map(|y| {
            let spans: Vec<Span> = (0..size)
                .map(|x| {
                    let (ch, fg, bg) = match (is_dark(x, y), is_dark(x, y + 1)) {
                        (true, true) => ("█", on, on),
                        (true, false) => ("▀", on, off),
                        (false, true) => ("▄", on, off),
                        (false, false) => (" ", off, off),
                    };
                    Span::styled(ch, Style::default().fg(fg).bg(bg))
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn render_help_modal(frame: &mut Frame, app: &App) {
    let p = &app.palette;
    let area = frame.area();
    let width = 52.min(area.width.saturating_sub(4));
    let height = 20.min(area.height.saturating_sub(4));
    let modal = Rect::new(
        (area.width.saturating_sub(width)) / 2,
        (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );
    frame.render_widget(Clear, modal);

    let key_style = Style::default().fg(p.accent).bold();
    let entry = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<12}", key), key_style),
            Span::raw(desc),
        ])
    };
    let heading = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(p.primary).bold()));

    let lines = vec![
        Line::from(""),
        heading("  Wallet"),
        entry("Tab", "Switch between receiver and asset"),
        entry("←/→", "Choose asset"),
        entry("Enter", "Open deposit"),
        Line::from(""),
        heading("  Deposit"),
        entry("↑/↓", "Move selection"),
        entry("Enter", "Continue"),
        entry("Esc", "Previous step"),
        entry("c", "Cancel deposit"),
        Line::from(""),
        heading("  General"),
        entry("PgUp/PgDn", "Scroll logs"),
        entry("?", "Toggle help"),
        entry("q, Ctrl+C", "Quit"),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.success))
                .title(" Keys "),
        ),
        modal,
    );
}

fn render_logs(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let total = app.log_buffer.len();
    let window = app.log_buffer.window(LOG_LINES, app.log_scroll);

    let mut lines: Vec<Line> = vec![Line::from(""); LOG_LINES.saturating_sub(window.len())];
    lines.extend(window.into_iter().map(|log| {
        let color = match log.level {
            LogLevel::Trace => p.muted,
            LogLevel::Debug => p.primary,
            LogLevel::Info => p.success,
            LogLevel::Warn => p.warning,
            LogLevel::Error => p.error,
        };
        let target = log.target.rsplit("::").next().unwrap_or(&log.target).to_string();
        Line::from(vec![
            Span::styled(format!("{} ", log.time), Style::default().fg(p.muted)),
            Span::styled(format!("{:5} ", log.level.as_str()), Style::default().fg(color)),
            Span::styled(format!("[{}] ", target), Style::default().fg(p.muted)),
            Span::raw(log.message),
        ])
    }));

    let scroll = if app.log_scroll > 0 {
        format!(" ↑{}", app.log_scroll)
    } else {
        String::new()
    };
    let title = format!(" Logs ({}){} │ ?: help  q: quit ", total, scroll);
    frame.render_widget(Paragraph::new(lines).block(block(app, "").title(title)), area);
}
