use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Clear, Paragraph};

use crate::surface::ElementView;

use super::layout::bounds_to_cells;

/// Draws every live element of the interface tree as a labelled box, in tree
/// order, so later elements (dialogs, buttons) paint over their parents.
pub fn draw_console(frame: &mut Frame<'_>, area: Rect, elements: &[ElementView]) {
    for element in elements {
        let Some(cells) = bounds_to_cells(element.bounds, area) else {
            continue;
        };
        frame.render_widget(Clear, cells);
        if cells.height < 3 {
            let button = Paragraph::new(format!("[ {} ]", element.label))
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::REVERSED));
            frame.render_widget(button, cells);
            continue;
        }
        let block = Block::bordered()
            .title(format!(" {} ", element.label))
            .border_style(Style::default().fg(Color::Blue));
        frame.render_widget(block, cells);
    }
}
