//! ImageGen TUI - Actor-based text-to-image front-end
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine processing events
//! - Network Layer (Tokio) - async provider requests

mod models;
mod error;
mod config;
mod storage;
mod ui;
mod messages;
mod app;
mod network;
mod constants;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::*,
};
use tokio::sync::mpsc;

use app::AppActor;
use config::Config;
use constants::{APP_NAME, APP_VERSION, PROMPT_PLACEHOLDER};
use messages::{GenerationView, NetworkCommand, NetworkResponse, RenderState, UiEvent};
use messages::ui_events::{key_to_ui_event, InputMode};
use network::{HuggingFaceClient, NetworkActor};
use ui::{card, cursor_line_col, footer_credit, format_bytes, palette, Palette};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    // Initialize logging to file
    let log_dir = log_dir(&config);
    let file_appender = tracing_appender::rolling::never(&log_dir, "imagegen.log");
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_max_level(config.log_level)
        .init();

    tracing::info!(
        model = %config.model,
        endpoint = %config.endpoint,
        download_dir = %config.download_dir.display(),
        credential = config.credential.is_some(),
        "Starting {} v{}", APP_NAME, APP_VERSION
    );

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let provider = Arc::new(HuggingFaceClient::new(config.endpoint.clone(), config.request_timeout));
    let network_actor = NetworkActor::new(provider, net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(&config, net_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    tracing::info!("Exiting");
    Ok(())
}

/// Log next to the config when that directory is usable, else the working directory
fn log_dir(config: &Config) -> PathBuf {
    if std::fs::create_dir_all(&config.config_dir).is_ok() {
        config.config_dir.clone()
    } else {
        PathBuf::from(".")
    }
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(key, current_state.input_mode, current_state.show_help) {
                    if matches!(event, UiEvent::Quit) {
                        let _ = ui_tx.send(event);
                        break;
                    }
                    let _ = ui_tx.send(event);
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();
    let colors = palette(state.theme, state.system_theme);

    f.render_widget(
        Block::default().style(Style::default().fg(colors.fg).bg(colors.bg)),
        area,
    );

    // Page shell: header, content, footer
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // Header
            Constraint::Min(0),     // Generator card
            Constraint::Length(1),  // Footer
        ])
        .split(area);

    draw_header(f, state, &colors, main_chunks[0]);
    draw_generator(f, state, &colors, centered_column(90, main_chunks[1]));
    draw_footer(f, state, &colors, main_chunks[2]);

    if state.show_help {
        draw_help_popup(f, &colors, area);
    }
}

fn draw_header(f: &mut Frame, state: &RenderState, colors: &Palette, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(36)])
        .split(area);

    let title = Line::from(vec![
        Span::styled(format!(" 🤖 {} ", APP_NAME), Style::default().fg(colors.accent).bold()),
        Span::styled(format!(" {}", state.model), Style::default().fg(colors.muted)),
    ]);
    f.render_widget(Paragraph::new(title), halves[0]);

    let credential = if state.credential_configured {
        Span::styled("token ✓", Style::default().fg(colors.success))
    } else {
        Span::styled("no token", Style::default().fg(colors.error))
    };
    let right = Line::from(vec![
        credential,
        Span::styled("  │  ", Style::default().fg(colors.muted)),
        Span::styled(format!("theme: {} (t) ", state.theme.as_str()), Style::default().fg(colors.fg)),
    ])
    .right_aligned();
    f.render_widget(Paragraph::new(right), halves[1]);
}

fn draw_generator(f: &mut Frame, state: &RenderState, colors: &Palette, area: Rect) {
    let outer = card(
        Span::styled(" AI Image Generator ", Style::default().fg(colors.accent).bold()),
        colors,
        colors.muted,
    );
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let banner_height = if matches!(state.view, GenerationView::Failed { .. }) { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),              // Description
            Constraint::Length(5),              // Prompt editor
            Constraint::Length(banner_height),  // Error banner
            Constraint::Min(5),                 // Image area
            Constraint::Length(3),              // Submit control
            Constraint::Length(1),              // Notice
        ])
        .split(inner);

    let description = Paragraph::new("Describe the image you want to create. The more detail, the better!")
        .style(Style::default().fg(colors.muted));
    f.render_widget(description, chunks[0]);

    draw_prompt(f, state, colors, chunks[1]);
    if let GenerationView::Failed { message } = &state.view {
        draw_error_banner(f, message, colors, chunks[2]);
    }
    draw_image_area(f, state, colors, chunks[3]);
    draw_submit(f, state, colors, chunks[4]);
    draw_notice(f, state, colors, chunks[5]);
}

fn draw_prompt(f: &mut Frame, state: &RenderState, colors: &Palette, area: Rect) {
    let is_loading = state.view.is_loading();
    let editing = state.input_mode == InputMode::Editing;

    let (border, title) = if is_loading {
        (colors.muted, " Prompt (locked while generating) ")
    } else if editing {
        (colors.editing, " Prompt (Esc: done, Alt+Enter: generate) ")
    } else {
        (colors.accent, " Prompt (e: edit) ")
    };

    let content = if state.prompt.is_empty() {
        Text::styled(PROMPT_PLACEHOLDER, Style::default().fg(colors.muted).italic())
    } else if is_loading {
        Text::styled(state.prompt.as_str(), Style::default().fg(colors.muted))
    } else {
        Text::raw(state.prompt.as_str())
    };

    let prompt = Paragraph::new(content)
        .block(card(title, colors, border))
        .wrap(Wrap { trim: false });
    f.render_widget(prompt, area);

    if editing {
        let (line, col) = cursor_line_col(&state.prompt, state.cursor_position);
        let max_x = area.x + area.width.saturating_sub(2);
        let max_y = area.y + area.height.saturating_sub(2);
        let cursor_x = (area.x + col + 1).min(max_x);
        let cursor_y = (area.y + line + 1).min(max_y);
        f.set_cursor_position(Position::new(cursor_x, cursor_y));
    }
}

fn draw_error_banner(f: &mut Frame, message: &str, colors: &Palette, area: Rect) {
    let banner = Paragraph::new(Line::from(vec![
        Span::styled("⚠ Error: ", Style::default().fg(colors.error).bold()),
        Span::styled(message, Style::default().fg(colors.error)),
    ]))
    .block(card("", colors, colors.error))
    .wrap(Wrap { trim: true });
    f.render_widget(banner, area);
}

fn draw_image_area(f: &mut Frame, state: &RenderState, colors: &Palette, area: Rect) {
    let mut block = card(" Image ", colors, colors.muted);

    let lines: Vec<Line> = match &state.view {
        GenerationView::Idle | GenerationView::Failed { .. } => vec![
            Line::from(""),
            Line::from(Span::styled(
                "The generated image will appear here.",
                Style::default().fg(colors.muted),
            ))
            .centered(),
        ],
        GenerationView::Loading { bytes_received } => {
            let progress = if *bytes_received > 0 {
                format!("receiving image... {}", format_bytes(*bytes_received))
            } else {
                String::from("waiting for the model...")
            };
            vec![
                Line::from(""),
                Line::from(Span::styled("░░▒▒▓▓ Generating ▓▓▒▒░░", Style::default().fg(colors.accent))).centered(),
                Line::from(Span::styled(progress, Style::default().fg(colors.muted))).centered(),
            ]
        }
        GenerationView::Succeeded { format, size, content_type, prompt, created_at } => {
            block = block.title_bottom(
                Line::from(Span::styled(" d: Download ", Style::default().fg(colors.success).bold()))
                    .right_aligned(),
            );
            let kind = match content_type {
                Some(ct) => format!("{} ({})", format.as_str(), ct),
                None => format.as_str().to_string(),
            };
            let elapsed = state
                .last_time_ms
                .map(|ms| format!(" in {:.1}s", ms as f64 / 1000.0))
                .unwrap_or_default();
            vec![
                Line::from(Span::styled("✓ Image ready", Style::default().fg(colors.success).bold())),
                Line::from(format!("Format:    {}", kind)),
                Line::from(format!("Size:      {}", format_bytes(*size))),
                Line::from(format!("Generated: {}{}", created_at.format("%H:%M:%S UTC"), elapsed)),
                Line::from(format!("Prompt:    {}", prompt)),
            ]
        }
    };

    let image = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(image, area);
}

fn draw_submit(f: &mut Frame, state: &RenderState, colors: &Palette, area: Rect) {
    let (label, style) = if state.view.is_loading() {
        ("Generating...", Style::default().fg(colors.muted))
    } else {
        ("✦ Generate Image (g)", Style::default().fg(colors.bg).bg(colors.accent).bold())
    };

    let button = Paragraph::new(Line::from(label).centered())
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(colors.muted)));
    f.render_widget(button, area);
}

fn draw_notice(f: &mut Frame, state: &RenderState, colors: &Palette, area: Rect) {
    if let Some(notice) = &state.notice {
        let color = if notice.is_error { colors.error } else { colors.success };
        f.render_widget(
            Paragraph::new(notice.text.as_str()).style(Style::default().fg(color)),
            area,
        );
    }
}

fn draw_footer(f: &mut Frame, state: &RenderState, colors: &Palette, area: Rect) {
    let hints = if state.view.is_loading() {
        " Generating... "
    } else if state.input_mode == InputMode::Editing {
        " Esc:stop editing | Enter:new line | Alt+Enter/Ctrl+G:generate "
    } else if state.view.has_image() {
        " e:edit | g:generate | d:download | t:theme | ?:help | q:quit "
    } else {
        " e:edit | g:generate | t:theme | ?:help | q:quit "
    };

    let credit = footer_credit();
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(credit.chars().count() as u16)])
        .split(area);

    f.render_widget(Paragraph::new(hints).style(Style::default().fg(colors.muted)), halves[0]);
    f.render_widget(
        Paragraph::new(Line::from(credit).right_aligned())
            .style(Style::default().fg(colors.muted)),
        halves[1],
    );
}

fn draw_help_popup(f: &mut Frame, colors: &Palette, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = r#"
 IMAGEGEN TUI - Keyboard Shortcuts

 PROMPT
   e / Enter          Start editing the prompt
   Enter (editing)    New line
   Esc                Stop editing
   ← / →              Move cursor

 GENERATE
   g                  Generate image
   Alt+Enter          Generate while editing
   Ctrl+G             Generate from anywhere
   d                  Download the generated image

 GENERAL
   t                  Cycle theme (Light/Dark/System)
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let help = Paragraph::new(help_text)
        .block(card(" Help ", colors, colors.accent))
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

/// Horizontally centered column at most `max_width` wide
fn centered_column(max_width: u16, r: Rect) -> Rect {
    let width = r.width.min(max_width);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y,
        width,
        height: r.height,
    }
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
