use std::collections::BTreeSet;

use ratatui::layout::Rect;

use crate::surface::MemorySurface;
use crate::tour::ViewportSize;
use crate::ui::{CELL_SIZE_UNITS, cells_to_bounds};

const SIDEBAR_WIDTH: u16 = 22;
const NAV_ROW_HEIGHT: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Users,
    Applications,
    Guardrails,
    Reports,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Users,
        Section::Applications,
        Section::Guardrails,
        Section::Reports,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Applications => "Applications",
            Self::Guardrails => "Guardrails",
            Self::Reports => "Reports",
        }
    }

    fn nav_id(self) -> &'static str {
        match self {
            Self::Users => "nav-users",
            Self::Applications => "nav-applications",
            Self::Guardrails => "nav-guardrails",
            Self::Reports => "nav-reports",
        }
    }
}

/// Screen changes a step hook may ask the console for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleAction {
    Show(Section),
    OpenReport,
    CloseReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleElement {
    pub id: &'static str,
    pub label: &'static str,
    /// Cells, relative to the console origin.
    pub area: Rect,
}

/// Mock admin console. Its widgets exist only as element rectangles in the
/// interface tree, which is all the tour engine gets to see.
#[derive(Debug, Clone)]
pub struct ConsoleScreen {
    section: Section,
    report_open: bool,
    users: Vec<&'static str>,
    registered: BTreeSet<&'static str>,
}

impl Default for ConsoleScreen {
    fn default() -> Self {
        Self {
            section: Section::Users,
            report_open: false,
            users: vec!["alice", "bashir", "chen"],
            registered: BTreeSet::new(),
        }
    }
}

impl ConsoleScreen {
    pub fn section(&self) -> Section {
        self.section
    }

    pub fn is_report_open(&self) -> bool {
        self.report_open
    }

    pub fn set_users(&mut self, users: Vec<&'static str>) {
        self.users = users;
    }

    /// Returns whether the screen changed.
    pub fn apply(&mut self, action: ConsoleAction) -> bool {
        match action {
            ConsoleAction::Show(section) => {
                let changed = self.section != section;
                self.section = section;
                changed
            }
            ConsoleAction::OpenReport => !std::mem::replace(&mut self.report_open, true),
            ConsoleAction::CloseReport => std::mem::replace(&mut self.report_open, false),
        }
    }

    pub fn reset(&mut self) {
        self.section = Section::Users;
        self.report_open = false;
    }

    pub fn layout(&self, width: u16, height: u16) -> Vec<ConsoleElement> {
        let mut elements = Vec::new();
        if width == 0 || height == 0 {
            return elements;
        }
        let mut push = |id, label, area: Rect| {
            if area.width > 0 && area.height > 0 {
                elements.push(ConsoleElement { id, label, area });
            }
        };

        push("console-header", "Admin Console", Rect::new(0, 0, width, 3.min(height)));

        let sidebar = width.min(SIDEBAR_WIDTH);
        for (row, section) in Section::ALL.iter().enumerate() {
            let y = 3 + row as u16 * NAV_ROW_HEIGHT;
            if y + NAV_ROW_HEIGHT <= height {
                push(section.nav_id(), section.title(), Rect::new(0, y, sidebar, NAV_ROW_HEIGHT));
            }
        }
        if height >= 3 + 5 * NAV_ROW_HEIGHT {
            push("help-button", "Help", Rect::new(1, height - 2, sidebar.saturating_sub(2), 1));
        }

        let main_x = sidebar.saturating_add(1);
        let main_w = width.saturating_sub(main_x + 1);
        let main_h = height.saturating_sub(4);
        let panel = Rect::new(main_x, 3, main_w, main_h);
        match self.section {
            Section::Users if self.users.is_empty() => {
                push("users-empty", "No users yet: invite one", panel);
            }
            Section::Users => {
                push("users-table", "User directory", panel);
                push("invite-user", "Invite user", button(panel));
            }
            Section::Applications => {
                push("application-list", "Applications", panel);
                push("create-application", "New application", button(panel));
            }
            Section::Guardrails => {
                push("guardrail-list", "Guardrail policies", panel);
            }
            Section::Reports => {
                push("report-list", "Reports", panel);
                push("open-report", "Open report", button(panel));
            }
        }

        if self.report_open {
            let dialog_w = width.saturating_sub(4).min(52);
            let dialog_h = height.saturating_sub(2).min(12);
            let dialog = Rect::new(
                width.saturating_sub(dialog_w) / 2,
                height.saturating_sub(dialog_h) / 2,
                dialog_w,
                dialog_h,
            );
            push("report-dialog", "Monthly usage report", dialog);
            if dialog.height >= 4 {
                let export = Rect::new(
                    dialog.x + 2,
                    dialog.bottom() - 2,
                    dialog.width.saturating_sub(4).min(18),
                    1,
                );
                push("report-export", "Export CSV", export);
            }
        }
        elements
    }

    /// Mirrors the current layout into `surface`: new widgets are inserted,
    /// vanished ones removed, and the rest moved in place.
    pub fn sync(&mut self, surface: &MemorySurface, width: u16, height: u16) {
        let (cell_w, cell_h) = CELL_SIZE_UNITS;
        surface.set_viewport(ViewportSize::new(
            f64::from(width) * cell_w,
            f64::from(height) * cell_h,
        ));

        let elements = self.layout(width, height);
        let live: BTreeSet<&'static str> = elements.iter().map(|element| element.id).collect();
        for stale in self.registered.difference(&live) {
            surface.remove_element(stale);
        }
        for element in &elements {
            let bounds = cells_to_bounds(element.area);
            if self.registered.contains(element.id) && surface.move_element(element.id, bounds) {
                continue;
            }
            surface.insert_element(element.id, element.label, bounds);
        }
        self.registered = live;
    }
}

fn button(panel: Rect) -> Rect {
    Rect::new(
        panel.x + 2,
        panel.bottom().saturating_sub(2),
        panel.width.saturating_sub(4).min(20),
        1,
    )
}
