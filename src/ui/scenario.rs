//! Scenario panel: title, description, tasks, and the last check result.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};

use crate::api::Scenario;

/// Shown when validation cannot be completed.
pub const VALIDATION_ERROR_MESSAGE: &str = "Error validating scenario. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioView {
    NotSelected,
    Loading,
    Loaded(Scenario),
    Failed,
}

pub struct TuiScenario {
    view: ScenarioView,
    /// Message returned by the last validation
    check_output: Option<String>,
    checking: bool,
}

impl TuiScenario {
    pub fn new(view: ScenarioView) -> Self {
        Self {
            view,
            check_output: None,
            checking: false,
        }
    }

    pub fn view(&self) -> &ScenarioView {
        &self.view
    }

    pub fn set_view(&mut self, view: ScenarioView) {
        self.view = view;
    }

    pub fn is_checking(&self) -> bool {
        self.checking
    }

    pub fn start_check(&mut self) {
        self.checking = true;
        self.check_output = None;
    }

    pub fn finish_check(&mut self, message: String) {
        self.checking = false;
        self.check_output = Some(message);
    }

    pub fn check_output(&self) -> Option<&str> {
        self.check_output.as_deref()
    }

    /// Title and description for the current view.
    fn heading(&self) -> (&str, &str) {
        match &self.view {
            ScenarioView::NotSelected => (
                "No scenario selected",
                "Please select a scenario from the home page.",
            ),
            ScenarioView::Loading => ("Loading scenario...", ""),
            ScenarioView::Failed => ("Error loading scenario", "Please try refreshing the page."),
            ScenarioView::Loaded(s) => (s.title.as_str(), s.description.as_str()),
        }
    }

    fn lines(&self) -> Vec<Line<'_>> {
        let (title, description) = self.heading();
        let mut lines = vec![Line::from(title.bold())];
        if !description.is_empty() {
            lines.push(Line::default());
            lines.extend(description.lines().map(Line::from));
        }

        if let ScenarioView::Loaded(scenario) = &self.view {
            if !scenario.tasks.is_empty() {
                lines.push(Line::default());
                lines.push(Line::from("Tasks".underlined()));
                for (i, task) in scenario.tasks.iter().enumerate() {
                    lines.push(Line::from(format!("{}. {}", i + 1, task)));
                }
            }
        }

        if self.checking {
            lines.push(Line::default());
            lines.push(Line::from("Checking...".italic().dark_gray()));
        } else if let Some(output) = &self.check_output {
            lines.push(Line::default());
            lines.push(Line::from(vec![
                Span::styled("Check: ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Span::raw(output.as_str()),
            ]));
        }
        lines
    }
}

impl Widget for &TuiScenario {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Scenario ")
            .title_bottom(Line::from(" Ctrl+B c: check ").right_aligned());
        Paragraph::new(self.lines())
            .wrap(Wrap { trim: false })
            .block(block)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(scenario: &TuiScenario) -> Vec<String> {
        scenario.lines().iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn placeholder_when_no_scenario() {
        let panel = TuiScenario::new(ScenarioView::NotSelected);
        let lines = text(&panel);
        assert_eq!(lines[0], "No scenario selected");
        assert_eq!(lines[2], "Please select a scenario from the home page.");
    }

    #[test]
    fn failure_message() {
        let panel = TuiScenario::new(ScenarioView::Failed);
        let lines = text(&panel);
        assert_eq!(lines[0], "Error loading scenario");
        assert_eq!(lines[2], "Please try refreshing the page.");
    }

    #[test]
    fn loaded_scenario_lists_tasks() {
        let panel = TuiScenario::new(ScenarioView::Loaded(Scenario {
            id: 1,
            title: "Pods".to_string(),
            description: "Work with pods".to_string(),
            tasks: vec!["create nginx".to_string(), "delete it".to_string()],
        }));
        let lines = text(&panel);
        assert_eq!(lines[0], "Pods");
        assert!(lines.contains(&"1. create nginx".to_string()));
        assert!(lines.contains(&"2. delete it".to_string()));
    }

    #[test]
    fn check_lifecycle() {
        let mut panel = TuiScenario::new(ScenarioView::Loading);
        panel.start_check();
        assert!(panel.is_checking());
        assert!(text(&panel).contains(&"Checking...".to_string()));

        panel.finish_check("All tasks complete".to_string());
        assert!(!panel.is_checking());
        assert_eq!(panel.check_output(), Some("All tasks complete"));
        assert_eq!(text(&panel).last().map(String::as_str), Some("Check: All tasks complete"));
    }
}
