use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use file_encrypter::{AppController, AppState, Command, FileBrowser, NotificationKind};

pub fn draw(f: &mut Frame, app: &AppController, browser: &FileBrowser) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Min(0),    // body
            Constraint::Length(1), // error
            Constraint::Length(1), // info
            Constraint::Length(1), // footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    match app.state() {
        AppState::Browsing => draw_browser(f, browser, chunks[1]),
        AppState::FileOpened => draw_opened(f, app, chunks[1]),
    }
    draw_notification(f, app, NotificationKind::Error, chunks[2]);
    draw_notification(f, app, NotificationKind::Info, chunks[3]);
    draw_footer(f, app, chunks[4]);

    if app.show_help() {
        draw_help(f, f.area());
    }
}

fn draw_header(f: &mut Frame, app: &AppController, area: Rect) {
    let key_status = match app.key() {
        Some(_) => Span::styled(" KEY READY ", Style::default().fg(Color::Green)),
        None => Span::styled(" NO KEY ", Style::default().fg(Color::Red)),
    };
    let mut spans = vec![
        Span::styled(
            " file-encrypter ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        key_status,
        Span::styled(
            format!(" {} ", app.key_file().display()),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if app.is_busy() {
        spans.push(Span::styled(" WORKING ", Style::default().fg(Color::Yellow)));
    }
    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}

fn draw_browser(f: &mut Frame, browser: &FileBrowser, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", browser.dir().display()))
        .borders(Borders::ALL);

    if browser.entries().is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  (empty directory)",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = browser
        .entries()
        .iter()
        .map(|entry| {
            if entry.is_dir {
                ListItem::new(Line::from(Span::styled(
                    format!("  {}/", entry.name),
                    Style::default().fg(Color::Blue),
                )))
            } else {
                let marker = if entry.encrypted { "🔒" } else { "  " };
                let style = if entry.allowed {
                    Style::default()
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(Line::from(vec![
                    Span::raw(marker),
                    Span::styled(entry.name.clone(), style),
                ]))
            }
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(browser.cursor()));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_opened(f: &mut Frame, app: &AppController, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let path = app
        .file_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let (status, color) = match app.command() {
        Command::Pending => ("choose encrypt or decrypt", Color::White),
        Command::Encrypting => ("encrypting...", Color::Yellow),
        Command::Decrypting => ("decrypting...", Color::Yellow),
        Command::Done => ("done", Color::Green),
    };
    let summary = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("File: ", Style::default().fg(Color::Cyan)),
            Span::raw(path),
        ]),
        Line::from(Span::styled(status, Style::default().fg(color))),
    ])
    .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(summary, chunks[0]);

    let preview = Paragraph::new(app.file_contents())
        .wrap(Wrap { trim: false })
        .block(Block::default().title(" Preview ").borders(Borders::ALL));
    f.render_widget(preview, chunks[1]);
}

fn draw_notification(f: &mut Frame, app: &AppController, kind: NotificationKind, area: Rect) {
    let Some(note) = app.notification(kind) else {
        return;
    };
    let color = match kind {
        NotificationKind::Error => Color::Red,
        NotificationKind::Info => Color::Green,
    };
    let secs_left = note.remaining(Instant::now()).as_millis().div_ceil(1000);
    let line = Line::from(vec![
        Span::styled(format!(" {}", note.text), Style::default().fg(color)),
        Span::styled(
            format!(" ({secs_left}s)"),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn hint(key: &'static str, label: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(key, Style::default().fg(Color::Yellow)),
        Span::raw(label),
    ]
}

fn draw_footer(f: &mut Frame, app: &AppController, area: Rect) {
    let hints: Vec<[Span; 2]> = match app.state() {
        AppState::Browsing => vec![
            hint("[↑/↓]", " Move  "),
            hint("[Enter]", " Open  "),
            hint("[Bksp]", " Up  "),
        ],
        AppState::FileOpened => vec![
            hint("[e]", " Encrypt  "),
            hint("[d]", " Decrypt  "),
            hint("[b]", " Back  "),
        ],
    };
    let mut spans: Vec<Span> = hints.into_iter().flatten().collect();
    spans.extend(hint("[?]", " Help  "));
    spans.extend(hint("[q]", " Quit  "));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let area = centered(area, 50, 14);
    let lines = vec![
        Line::from(Span::styled(
            "Browsing",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  ↑/k ↓/j     move"),
        Line::from("  Enter/l     open file or directory"),
        Line::from("  Bksp/h      parent directory"),
        Line::from(""),
        Line::from(Span::styled(
            "File opened",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  e           encrypt in place"),
        Line::from("  d           decrypt in place"),
        Line::from("  b/Esc       back to the browser"),
        Line::from(""),
        Line::from("  ?           toggle this help   q quit"),
    ];
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().title(" Help ").borders(Borders::ALL)),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
