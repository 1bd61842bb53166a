use ratatui::Frame;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Paragraph, Wrap};

use crate::tour::{TourPhase, TourView};

use super::layout::UiLayout;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    pub section: String,
    pub message: String,
    pub show_hints: bool,
}

pub fn draw_status(frame: &mut Frame<'_>, layout: UiLayout, view: &TourView, status: &StatusLine) {
    if layout.status.width == 0 || layout.status.height == 0 {
        return;
    }
    let text = status_text(view, status);
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, layout.status);
}

fn status_text(view: &TourView, status: &StatusLine) -> String {
    let tour = match view.phase {
        TourPhase::Idle => "tour off".to_string(),
        TourPhase::Loading { step } => format!("step {step} loading"),
        TourPhase::Active { .. } => view
            .progress_label()
            .map(|progress| format!("step {progress}"))
            .unwrap_or_default(),
    };
    let mut parts = vec![format!("gtour | {} | {tour}", status.section)];
    if !status.message.is_empty() {
        parts.push(status.message.clone());
    }
    if status.show_hints {
        let hints = if view.phase == TourPhase::Idle {
            "t start tour  q quit"
        } else {
            "-> next  <- prev  esc exit"
        };
        parts.push(hints.to_string());
    }
    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::{StatusLine, status_text};
    use crate::tour::{TourPhase, TourView};

    #[test]
    fn status_shows_progress_and_hints() {
        let view = TourView {
            phase: TourPhase::Active { step: 2 },
            current_step_index: 2,
            step_count: 5,
            visible: true,
            ..TourView::default()
        };
        let status = StatusLine {
            section: "Users".to_string(),
            message: String::new(),
            show_hints: true,
        };
        assert_eq!(
            status_text(&view, &status),
            "gtour | Users | step 2 of 5 | -> next  <- prev  esc exit"
        );
    }

    #[test]
    fn idle_status_carries_last_message() {
        let status = StatusLine {
            section: "Reports".to_string(),
            message: "tour finished at step 8".to_string(),
            show_hints: false,
        };
        assert_eq!(
            status_text(&TourView::default(), &status),
            "gtour | Reports | tour off | tour finished at step 8"
        );
    }
}
