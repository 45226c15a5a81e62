use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect, Size};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Paragraph, Wrap};
use tui_scrollview::{ScrollView, ScrollbarVisibility};

use crate::core::input::MAX_INPUT_CHARS;
use crate::core::message::{Message, Role};
use crate::core::state::{SUGGESTED_PROMPTS, Session, Status};
use crate::tui::TuiState;
use crate::tui::markdown;

const MAX_INPUT_LINES: u16 = 6;
const ACCENT: Color = Color::Magenta;

pub fn draw_ui(frame: &mut Frame, session: &Session, tui: &mut TuiState) {
    use Constraint::{Length, Min, Percentage};

    let input = input_paragraph(session, tui);
    // line_count includes the block borders.
    let input_lines = (input.line_count(frame.area().width) as u16).saturating_sub(2);
    let input_height = input_lines.clamp(1, MAX_INPUT_LINES) + 2;
    let input = input.scroll((input_lines.saturating_sub(MAX_INPUT_LINES), 0));

    let [header_area, body_area, input_area] =
        Layout::vertical([Length(2), Min(0), Length(input_height)]).areas(frame.area());

    draw_header(frame, header_area, session, tui);

    if tui.show_pdf {
        let [chat_area, pdf_area] =
            Layout::horizontal([Percentage(50), Percentage(50)]).areas(body_area);
        draw_messages(frame, chat_area, session, tui);
        draw_document_panel(frame, pdf_area, session, tui);
    } else {
        draw_messages(frame, body_area, session, tui);
    }

    frame.render_widget(input, input_area);
}

fn draw_header(frame: &mut Frame, area: Rect, session: &Session, tui: &TuiState) {
    let doc = session.document();
    let toggle = if tui.show_pdf { "Hide PDF" } else { "View PDF" };
    let lines = vec![
        Line::from(vec![
            Span::styled("▍", Style::default().fg(ACCENT)),
            Span::styled(doc.file_name.clone(), Style::default().bold()),
        ]),
        Line::from(vec![
            Span::styled(format!(" {} pages", doc.pages), Style::default().dim()),
            Span::styled(
                format!("   Ctrl+P {toggle} · Esc New document · Ctrl+C Quit"),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn role_title(message: &Message) -> Line<'static> {
    let who = match message.role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    };
    Line::from(format!(" {} · {} ", who, message.timestamp.format("%H:%M")))
}

fn message_paragraph(message: &Message) -> Paragraph<'static> {
    let (body, border) = match (message.role, message.is_error) {
        (Role::User, _) => (
            Text::raw(message.content.clone()),
            Style::default().fg(ACCENT),
        ),
        (Role::Assistant, true) => (
            Text::styled(message.content.clone(), Style::default().fg(Color::Red)),
            Style::default().fg(Color::Red),
        ),
        (Role::Assistant, false) => (
            markdown::render(&message.content, Style::default()),
            Style::default().fg(Color::DarkGray),
        ),
    };

    let block = Block::bordered()
        .title(role_title(message))
        .border_style(border)
        .title_style(border);
    let block = if message.role == Role::User {
        block.title_alignment(ratatui::layout::Alignment::Right)
    } else {
        block
    };

    Paragraph::new(body).block(block).wrap(Wrap { trim: false })
}

fn thinking_paragraph(frame_no: usize) -> Paragraph<'static> {
    let dots = ".".repeat(frame_no % 4);
    Paragraph::new(Line::from(vec![
        Span::styled("● ", Style::default().fg(ACCENT)),
        Span::styled(format!("Thinking{dots}"), Style::default().dim()),
    ]))
    .block(Block::bordered().border_style(Style::default().fg(Color::DarkGray)))
}

fn suggestions_paragraph(selected: Option<usize>) -> Paragraph<'static> {
    let mut lines = vec![Line::from(Span::styled(
        "Try asking (Tab to pick):",
        Style::default().dim(),
    ))];
    for (i, prompt) in SUGGESTED_PROMPTS.iter().enumerate() {
        let style = if selected == Some(i) {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(format!("  › {prompt}"), style)));
    }
    Paragraph::new(lines).wrap(Wrap { trim: false })
}

fn draw_messages(frame: &mut Frame, area: Rect, session: &Session, tui: &mut TuiState) {
    // One column for the scrollbar.
    let width = area.width.saturating_sub(1);

    let mut blocks: Vec<Paragraph<'static>> =
        session.messages().iter().map(message_paragraph).collect();
    if session.status() == Status::AwaitingResponse {
        blocks.push(thinking_paragraph(tui.spinner_frame));
    }
    if session.show_suggested_prompts() {
        blocks.push(suggestions_paragraph(tui.suggestion));
    }

    let heights: Vec<u16> = blocks
        .iter()
        .map(|p| p.line_count(width) as u16)
        .collect();
    let total: u16 = heights.iter().sum();
    tui.viewport_height = area.height;
    tui.content_height = total;

    let mut scroll_view = ScrollView::new(Size::new(width, total))
        .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
        .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

    let mut y = 0u16;
    for (paragraph, height) in blocks.into_iter().zip(heights) {
        scroll_view.render_widget(paragraph, Rect::new(0, y, width, height));
        y += height;
    }

    if tui.stick_to_bottom {
        tui.scroll_state.scroll_to_bottom();
    }
    frame.render_stateful_widget(scroll_view, area, &mut tui.scroll_state);
}

fn draw_document_panel(frame: &mut Frame, area: Rect, session: &Session, tui: &TuiState) {
    let doc = session.document();
    let size = match tui.pdf_bytes {
        Some(bytes) => format!("{:.1} KB", bytes as f64 / 1024.0),
        None => "unavailable".to_string(),
    };
    let lines = vec![
        Line::from(Span::styled(doc.file_name.clone(), Style::default().bold())),
        Line::default(),
        Line::from(format!("Pages:    {}", doc.pages)),
        Line::from(format!("Size:     {size}")),
        Line::from(format!("File id:  {}", doc.file_id)),
        Line::default(),
        Line::from(Span::styled(
            "The terminal cannot display PDF pages. Ask the assistant about the document instead.",
            Style::default().dim(),
        )),
    ];
    let panel = Paragraph::new(lines)
        .block(
            Block::bordered()
                .title(" Document ")
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(panel, area);
}

fn input_paragraph(session: &Session, tui: &TuiState) -> Paragraph<'static> {
    let view = session.view();
    let counter_style = if view.over_limit {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let counter = Line::from(Span::styled(
        format!(" {}/{} ", view.draft_chars, MAX_INPUT_CHARS),
        counter_style,
    ))
    .right_aligned();

    let title = match &tui.notice {
        Some(notice) => Line::from(Span::styled(
            format!(" {notice} "),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(" Ask about the document... ").dim(),
    };

    let border = if view.status == Status::AwaitingResponse {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(ACCENT)
    };

    let draft = session.draft();
    let mut text = Text::raw(draft.to_string());
    // `Text::raw` drops the empty line after a trailing newline.
    if text.lines.is_empty() || draft.ends_with('\n') {
        text.lines.push(Line::default());
    }
    if let Some(last) = text.lines.last_mut() {
        last.push_span(Span::styled("█", Style::default().fg(Color::Gray)));
    }

    Paragraph::new(text)
        .block(
            Block::bordered()
                .title(title)
                .title_bottom(counter)
                .border_style(border),
        )
        .wrap(Wrap { trim: false })
}
