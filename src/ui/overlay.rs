use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::config::UiConfig;
use crate::surface::HighlightView;
use crate::tour::geometry::{Horizontal, Vertical};
use crate::tour::{AnchorOrigins, Bounds, HighlightBox, TourPhase, TourView};

use super::layout::{bounds_to_cells, centered_rect};

const DIM: Style = Style::new().fg(Color::DarkGray);
const RING: Style = Style::new().fg(Color::Yellow);

/// Draws the dimmer, the highlight ring and either the step popover or a
/// loading notice, depending on the tour phase.
pub fn draw_tour_overlay(
    frame: &mut Frame<'_>,
    area: Rect,
    view: &TourView,
    highlights: &[HighlightView],
    ui: &UiConfig,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    match view.phase {
        TourPhase::Idle => {}
        TourPhase::Loading { step } => {
            dim_outside(frame, area, None);
            draw_loading_overlay(frame, area, step);
        }
        TourPhase::Active { .. } => {
            let hole = highlights
                .first()
                .and_then(|highlight| highlight_cells(&highlight.placement, area));
            dim_outside(frame, area, hole);
            if let Some(hole) = hole {
                frame.render_widget(Block::bordered().border_style(RING), hole);
            }
            if let Some(overlay) = &view.overlay {
                let target = hole
                    .or_else(|| highlight_cells(&overlay.highlight, area))
                    .unwrap_or_else(|| centered_rect(area, 1, 1));
                let popover = PopoverText {
                    title: &overlay.title,
                    desc: &overlay.desc,
                    progress: view.progress_label(),
                    prev_disabled: view.prev_disabled,
                    next_disabled: view.next_disabled,
                    show_hints: ui.show_hints,
                };
                draw_popover(frame, area, target, overlay.origins, &popover, ui.popover_max_width);
            }
        }
    }
}

pub fn draw_loading_overlay(frame: &mut Frame<'_>, area: Rect, step: usize) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let popup = centered_rect(area, area.width.min(34), area.height.min(3));
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title("Loading")
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Yellow));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let message = Paragraph::new(format!("Looking for step {step}..."))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White));
    frame.render_widget(message, inner);
}

/// Snapshot placement in cells, including the ring drawn around it.
fn highlight_cells(placement: &HighlightBox, area: Rect) -> Option<Rect> {
    let bounds = Bounds::new(
        placement.top,
        placement.left,
        placement.width,
        placement.height,
    );
    bounds_to_cells(bounds, area)
}

fn dim_outside(frame: &mut Frame<'_>, area: Rect, hole: Option<Rect>) {
    let buffer = frame.buffer_mut();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if hole.is_some_and(|hole| hole.contains(Position::new(x, y))) {
                continue;
            }
            if let Some(cell) = buffer.cell_mut((x, y)) {
                cell.set_style(DIM);
            }
        }
    }
}

struct PopoverText<'a> {
    title: &'a str,
    desc: &'a str,
    progress: Option<String>,
    prev_disabled: bool,
    next_disabled: bool,
    show_hints: bool,
}

fn draw_popover(
    frame: &mut Frame<'_>,
    area: Rect,
    target: Rect,
    origins: AnchorOrigins,
    text: &PopoverText<'_>,
    max_width: u16,
) {
    let width = max_width.min(area.width).max(1);
    let text_width = usize::from(width.saturating_sub(2)).max(1);

    let mut lines: Vec<Line<'static>> = wrap_text(text.desc, text_width)
        .into_iter()
        .map(Line::from)
        .collect();
    if !lines.is_empty() {
        lines.push(Line::default());
    }
    lines.push(button_line(text));
    if text.show_hints {
        lines.push(Line::styled(
            "esc to leave the tour",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let height = popover_height(lines.len(), area.height);
    let popup = popover_rect(target, origins, width, height, area);
    frame.render_widget(Clear, popup);
    let block = Block::bordered()
        .title(Span::styled(
            format!(" {} ", text.title),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .border_style(RING);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    if inner.width == 0 || inner.height == 0 {
        return;
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn button_line(text: &PopoverText<'_>) -> Line<'static> {
    let enabled = Style::default().fg(Color::White);
    let disabled = Style::default().fg(Color::DarkGray);
    let prev_style = if text.prev_disabled { disabled } else { enabled };
    let next_label = if text.next_disabled { "finish" } else { "next ->" };

    let mut spans = vec![
        Span::styled("<- prev", prev_style),
        Span::raw("  "),
        Span::styled(next_label, enabled.add_modifier(Modifier::BOLD)),
    ];
    if let Some(progress) = &text.progress {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(progress.clone(), disabled));
    }
    Line::from(spans)
}

/// Places a `width` x `height` popover so that its `transform` origin sits on
/// the `anchor` origin of `target`, then clamps it into `area`.
pub(crate) fn popover_rect(
    target: Rect,
    origins: AnchorOrigins,
    width: u16,
    height: u16,
    area: Rect,
) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let (w, h) = (i32::from(width), i32::from(height));

    let anchor_x = match origins.anchor.horizontal {
        Horizontal::Left => i32::from(target.left()),
        Horizontal::Center => i32::from(target.x) + i32::from(target.width) / 2,
        Horizontal::Right => i32::from(target.right()),
    };
    let anchor_y = match origins.anchor.vertical {
        Vertical::Top => i32::from(target.top()),
        Vertical::Center => i32::from(target.y) + i32::from(target.height) / 2,
        Vertical::Bottom => i32::from(target.bottom()),
    };

    let x = match origins.transform.horizontal {
        Horizontal::Left => anchor_x + 1,
        Horizontal::Center => anchor_x - w / 2,
        Horizontal::Right => anchor_x - w - 1,
    };
    let y = match origins.transform.vertical {
        Vertical::Top => anchor_y,
        Vertical::Center => anchor_y - h / 2,
        Vertical::Bottom => anchor_y - h,
    };

    let max_x = i32::from(area.right()) - w;
    let max_y = i32::from(area.bottom()) - h;
    let x = x.clamp(i32::from(area.x), max_x.max(i32::from(area.x)));
    let y = y.clamp(i32::from(area.y), max_y.max(i32::from(area.y)));
    Rect::new(x as u16, y as u16, width, height)
}

fn popover_height(line_count: usize, max_height: u16) -> u16 {
    u16::try_from(line_count)
        .unwrap_or(u16::MAX)
        .saturating_add(2)
        .min(max_height)
        .max(1)
}

/// Greedy word wrap by display width; words wider than a line are split on
/// grapheme boundaries.
pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0usize;

        for word in paragraph.split_word_bounds() {
            let blank = word.trim().is_empty();
            if blank && current.is_empty() {
                continue;
            }
            let word_width = word.width();
            if current_width + word_width <= width {
                current.push_str(word);
                current_width += word_width;
                continue;
            }

            if !current.is_empty() {
                lines.push(current.trim_end().to_string());
                current.clear();
                current_width = 0;
            }
            if blank {
                continue;
            }
            for grapheme in word.graphemes(true) {
                let grapheme_width = grapheme.width();
                if current_width + grapheme_width > width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push_str(grapheme);
                current_width += grapheme_width;
            }
        }

        let line = current.trim_end();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    lines
}
