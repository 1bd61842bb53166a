use ratatui::Frame;

use crate::ui::{StatusLine, draw_console, draw_status, draw_tour_overlay, split_layout};

use super::core::App;

impl App {
    pub(crate) fn draw(&mut self, frame: &mut Frame<'_>) {
        let layout = split_layout(frame.area());
        draw_console(frame, layout.console, &self.surface.elements());

        let view = self.view.borrow_and_update().clone();
        draw_tour_overlay(
            frame,
            layout.console,
            &view,
            &self.surface.highlights(),
            &self.config.ui,
        );

        let status = StatusLine {
            section: self.console.section().title().to_string(),
            message: self.status.clone(),
            show_hints: self.config.ui.show_hints,
        };
        draw_status(frame, layout, &view, &status);
    }
}
