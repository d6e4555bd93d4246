use chrono::Local;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::agent::TranscriptEntry;
use crate::app::{App, SidebarItem};
use crate::definitions::{BRAND_SUBTITLE, BRAND_TITLE, FocusArea};

mod theme;
use theme::*;

const SIDEBAR_WIDTH: u16 = 34;
const COMPOSER_HEIGHT: u16 = 5;

pub fn render(f: &mut Frame<'_>, app: &App) {
    let size = f.size();
    if size.width < 60 || size.height < 16 {
        let block = Paragraph::new("Terminal too small, resize to at least 60x16.")
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(BRAND_TITLE)
                    .borders(Borders::ALL)
                    .style(Style::default().fg(FG_PRIMARY).bg(BG_PANEL)),
            )
            .style(Style::default().fg(FG_PRIMARY).bg(BG_PRIMARY));
        f.render_widget(block, size);
        return;
    }

    let base = Block::default().style(Style::default().bg(BG_PRIMARY));
    f.render_widget(base, size);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(size);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(vertical[0]);
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(COMPOSER_HEIGHT),
        ])
        .split(columns[1]);

    render_sidebar(f, app, columns[0]);
    render_header(f, app, main[0]);
    render_transcript(f, app, main[1]);
    render_composer(f, app, main[2]);
    render_status_bar(f, app, vertical[1]);
}

fn focus_block(title: Line<'static>, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default()
            .fg(BORDER_FOCUS)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(BORDER_IDLE)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
        .style(Style::default().bg(BG_PANEL))
}

fn render_sidebar(f: &mut Frame<'_>, app: &App, area: Rect) {
    let block = focus_block(
        Line::from(vec![
            Span::styled(
                BRAND_TITLE,
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" · {BRAND_SUBTITLE}"), Style::default().fg(FG_DIM)),
        ]),
        app.focus == FocusArea::Sidebar,
    );
    let inner = block.inner(area);
    f.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let count = if app.agents.is_empty() && app.directory_loader.is_some() {
        String::from("Agents · loading...")
    } else {
        format!("Agents · {}", app.agents.len())
    };
    f.render_widget(
        Paragraph::new(Span::styled(count, Style::default().fg(FG_DIM))),
        sections[0],
    );

    let width = sections[1].width as usize;
    let now = Local::now();
    let active_agent = app.conversations.active_agent_id();
    let active_conversation = app.conversations.active_conversation_id();

    let items: Vec<ListItem> = app
        .sidebar_items()
        .into_iter()
        .map(|item| match item {
            SidebarItem::NewChat => ListItem::new(Line::from(Span::styled(
                "+ New chat  (Ctrl+N)",
                Style::default().fg(ACCENT),
            ))),
            SidebarItem::Agent(index) => {
                let agent = &app.agents[index];
                let active = agent.id == active_agent;
                let marker = if active { "●" } else { "○" };
                let name_style = if active {
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(FG_PRIMARY)
                };
                let mut lines = vec![Line::from(vec![
                    Span::styled(format!("{marker} "), Style::default().fg(ACCENT)),
                    Span::styled(format!("[{}] ", agent.initial()), Style::default().fg(FG_DIM)),
                    Span::styled(agent.name.clone(), name_style),
                ])];
                if !agent.description.is_empty() {
                    lines.push(Line::from(Span::styled(
                        truncate_to_width(&format!("    {}", agent.description), width),
                        Style::default().fg(FG_DIM),
                    )));
                }
                ListItem::new(lines)
            }
            SidebarItem::Conversation {
                agent_index,
                conversation_id,
            } => {
                let agent_id = &app.agents[agent_index].id;
                let Some(record) = app.conversations.find(agent_id, &conversation_id) else {
                    return ListItem::new(Line::default());
                };
                let active = *agent_id == active_agent && record.id == active_conversation;
                let label = record.updated_label(now);
                let title_width = width.saturating_sub(UnicodeWidthStr::width(label.as_str()) + 6);
                let title = truncate_to_width(&record.title.replace('\n', " "), title_width);
                let title_style = if active {
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(FG_PRIMARY)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(if active { "  › " } else { "    " }, Style::default().fg(ACCENT)),
                    Span::styled(title, title_style),
                    Span::styled(format!("  {label}"), Style::default().fg(FG_DIM)),
                ]))
            }
        })
        .collect();

    let mut state = ListState::default();
    if app.focus == FocusArea::Sidebar {
        state.select(Some(app.sidebar_selected));
    }
    let list = List::new(items)
        .style(Style::default().bg(BG_PANEL))
        .highlight_style(Style::default().bg(PANEL_HIGHLIGHT_BG).fg(Color::White));
    f.render_stateful_widget(list, sections[1], &mut state);
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let agent_name = app
        .active_agent()
        .map(|agent| agent.name.clone())
        .unwrap_or_else(|| String::from("Loading..."));
    let conversation_title = app
        .conversations
        .active_conversation()
        .map(|record| record.title.replace('\n', " "))
        .unwrap_or_else(|| String::from("Select a conversation"));

    let line = Line::from(vec![
        Span::styled(
            agent_name,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  /  ", Style::default().fg(FG_DIM)),
        Span::styled(conversation_title, Style::default().fg(FG_PRIMARY)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER_IDLE))
        .title(Span::styled(app.backend_url.clone(), Style::default().fg(FG_DIM)))
        .style(Style::default().bg(BG_PANEL));
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_transcript(f: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER_IDLE))
        .title(Span::styled("Conversation", Style::default().fg(FG_PRIMARY)))
        .style(Style::default().bg(BG_PANEL));
    let inner = block.inner(area);
    let width = inner.width.max(1) as usize;

    let transcript = app
        .active_thread_id()
        .and_then(|thread_id| app.bridge.transcript(thread_id));
    let mut lines: Vec<Line> = Vec::new();
    match transcript {
        Some(transcript) if !transcript.is_empty() => {
            for entry in transcript.entries() {
                push_entry_lines(&mut lines, entry, app, width);
                lines.push(Line::default());
            }
            if transcript.is_running() {
                lines.push(Line::from(Span::styled(
                    "…",
                    Style::default().fg(FG_DIM).add_modifier(Modifier::SLOW_BLINK),
                )));
            }
        }
        _ => {
            let hint = if app.conversations.active_conversation().is_some() {
                "Say hello to start the conversation."
            } else {
                "Waiting for agents from the backend..."
            };
            lines.push(Line::from(Span::styled(hint, Style::default().fg(FG_DIM))));
        }
    }

    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let bottom = total.saturating_sub(inner.height);
    let offset = bottom.saturating_sub(app.transcript_scroll);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(BG_PANEL))
        .scroll((offset, 0));
    f.render_widget(paragraph, area);
}

fn push_entry_lines(lines: &mut Vec<Line>, entry: &TranscriptEntry, app: &App, width: usize) {
    match entry {
        TranscriptEntry::User(message) => {
            lines.push(Line::from(Span::styled(
                "You",
                Style::default().fg(USER_FG).add_modifier(Modifier::BOLD),
            )));
            push_wrapped_text(lines, &message.content, Style::default().fg(Color::White), width);
        }
        TranscriptEntry::Assistant {
            text, streaming, ..
        } => {
            let name = app
                .active_agent()
                .map(|agent| agent.name.clone())
                .unwrap_or_else(|| String::from("Agent"));
            let title = if *streaming { format!("{name} …") } else { name };
            lines.push(Line::from(Span::styled(
                title,
                Style::default().fg(ASSISTANT_FG).add_modifier(Modifier::BOLD),
            )));
            push_wrapped_text(lines, text, Style::default().fg(FG_PRIMARY), width);
        }
        TranscriptEntry::ToolCall {
            name, args, done, ..
        } => {
            let state = if *done { "done" } else { "running" };
            lines.push(Line::from(Span::styled(
                format!("Tool: {name} ({state})"),
                Style::default().fg(TOOL_FG),
            )));
            if !args.is_empty() {
                push_wrapped_text(lines, args, Style::default().fg(FG_DIM), width);
            }
        }
        TranscriptEntry::Info { title, detail } => {
            lines.push(Line::from(Span::styled(
                title.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            )));
            push_wrapped_text(lines, detail, Style::default().fg(FG_DIM), width);
        }
        TranscriptEntry::Error { title, detail } => {
            lines.push(Line::from(Span::styled(
                title.clone(),
                Style::default().fg(ERROR_FG).add_modifier(Modifier::BOLD),
            )));
            push_wrapped_text(lines, detail, Style::default().fg(ERROR_FG), width);
        }
    }
}

fn render_composer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let focused = app.focus == FocusArea::Composer;
    let block = focus_block(
        Line::from(Span::styled(
            "Message (Enter send / Alt+Enter newline)",
            Style::default().fg(FG_PRIMARY),
        )),
        focused,
    );
    let inner = block.inner(area);

    let lines: Vec<Line> = if app.composer.is_empty() {
        vec![Line::from(Span::styled(
            "Ask the agent something, or /help",
            Style::default().fg(FG_DIM),
        ))]
    } else {
        app.composer
            .buffer()
            .split('\n')
            .map(|line| {
                Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(FG_PRIMARY),
                ))
            })
            .collect()
    };

    let width = inner.width.max(1) as usize;
    let (cursor_col, cursor_row) = app.composer.cursor_display_position(width);
    let scroll = cursor_row.saturating_sub(inner.height.saturating_sub(1));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(BG_PANEL))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);

    if focused {
        let cursor_x = inner
            .x
            .saturating_add(cursor_col.min(width.saturating_sub(1) as u16));
        let cursor_y = inner
            .y
            .saturating_add((cursor_row - scroll).min(inner.height.saturating_sub(1)));
        f.set_cursor(cursor_x, cursor_y);
    }
}

fn render_status_bar(f: &mut Frame<'_>, app: &App, area: Rect) {
    let run = if app.is_active_run() { "RUN" } else { "IDLE" };
    let segments = [
        format!("[FOCUS:{}]", app.focus.label()),
        format!("[AGENT:{}]", app.bridge.backend_name()),
        format!("[{run}]"),
    ];

    let mut spans: Vec<Span> = Vec::new();
    for segment in segments {
        spans.push(Span::styled(
            segment,
            Style::default().fg(BAR_TEXT).bg(BAR_HIGHLIGHT_BG),
        ));
        spans.push(Span::styled(" ", Style::default().bg(BAR_BG)));
    }
    spans.push(Span::styled(
        app.status_message.replace('\n', " "),
        Style::default().fg(BAR_TEXT).bg(BAR_BG),
    ));

    f.render_widget(Clear, area);
    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(BAR_TEXT).bg(BAR_BG))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

fn push_wrapped_text(lines: &mut Vec<Line>, text: &str, style: Style, width: usize) {
    if text.is_empty() {
        lines.push(Line::default());
        return;
    }
    for line in text.split('\n') {
        for segment in wrap_to_width(line, width) {
            lines.push(Line::from(Span::styled(segment, style)));
        }
    }
}

fn wrap_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    if text.is_empty() {
        return vec![String::new()];
    }
    let mut result = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1).max(1);
        if current_width + ch_width > width && !current.is_empty() {
            result.push(current);
            current = String::new();
            current_width = 0;
        }
        current.push(ch);
        current_width += ch_width;
    }
    result.push(current);
    result
}

fn truncate_to_width(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1);
        if used + ch_width + 1 > width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::agent::AgentEventKind;
    use crate::app::test_support::{agent, test_app};

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn wrapping_counts_display_width() {
        assert_eq!(wrap_to_width("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(wrap_to_width("你好嗎", 4), vec!["你好", "嗎"]);
        assert_eq!(wrap_to_width("", 4), vec![String::new()]);
        assert_eq!(truncate_to_width("conversation", 6), "conve…");
        assert_eq!(truncate_to_width("short", 6), "short");
    }

    #[test]
    fn truncation_never_exceeds_the_width() {
        for text in ["conversation", "你好你好你好", "a你b好c", "x"] {
            for width in 1..10 {
                let out = truncate_to_width(text, width);
                assert!(
                    UnicodeWidthStr::width(out.as_str()) <= width,
                    "{text:?} at {width} -> {out:?}"
                );
            }
        }
    }

    #[test]
    fn header_placeholders_before_agents_load() {
        let (app, _) = test_app();
        let text = screen(&app, 100, 30);
        assert!(text.contains("Loading..."));
        assert!(text.contains("Select a conversation"));
        assert!(text.contains(BRAND_TITLE));
    }

    #[tokio::test]
    async fn renders_agents_titles_and_replies() {
        let (mut app, backend) = test_app();
        app.apply_agent_directory(vec![agent("a1", "Ava", "Planning helper")]);
        app.send_message("help me plan Q3").await;
        let thread_id = app.active_thread_id().unwrap().to_string();
        backend.queue(
            &thread_id,
            AgentEventKind::TextDelta {
                message_id: "m1".into(),
                delta: "Sure, let's start.".into(),
            },
        );
        backend.queue(&thread_id, AgentEventKind::RunFinished);
        app.on_tick();

        let text = screen(&app, 110, 30);
        assert!(text.contains("Ava"));
        assert!(text.contains("Planning helper"));
        assert!(text.contains("help me plan Q3"));
        assert!(text.contains("just now"));
        assert!(text.contains("Sure, let's start."));
        assert!(text.contains("[IDLE]"));
    }

    #[test]
    fn tiny_terminal_shows_a_notice() {
        let (app, _) = test_app();
        let text = screen(&app, 40, 10);
        assert!(text.contains("Terminal"));
    }
}
