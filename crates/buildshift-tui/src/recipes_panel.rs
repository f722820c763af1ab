//! Recipe calculator panel.
//!
//! The selector cycles with Left/Right; editable ingredient fields come from
//! the configured controlling-inputs list, everything else renders read-only
//! with its server-computed value.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::data::RecipesState;
use crate::theme::Theme;

/// The recipe calculator view panel.
pub struct RecipesPanel<'a> {
    state: &'a RecipesState,
    theme: &'a Theme,
    /// Controlling-inputs list for the selected recipe
    controlling: &'a [String],
}

impl<'a> RecipesPanel<'a> {
    pub fn new(state: &'a RecipesState, theme: &'a Theme, controlling: &'a [String]) -> Self {
        Self {
            state,
            theme,
            controlling,
        }
    }

    fn selector_line(&self) -> Line<'static> {
        let theme = self.theme;
        if self.state.list_loading {
            return Line::from(Span::styled(
                "Loading recipes...",
                Style::default().fg(theme.text_dim),
            ));
        }
        if self.state.options.is_empty() {
            return Line::from(Span::styled(
                "No recipes found.",
                Style::default().fg(theme.text_dim),
            ));
        }

        let name = self
            .state
            .selected_option()
            .map(|o| o.name.clone())
            .unwrap_or_default();
        Line::from(vec![
            Span::styled("recipe: ".to_string(), Style::default().fg(theme.text_dim)),
            Span::styled(
                format!("< {name} >"),
                Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({}/{})", self.state.option_idx + 1, self.state.options.len()),
                Style::default().fg(theme.text_dim),
            ),
        ])
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        let theme = self.theme;
        let mut lines = vec![self.selector_line(), Line::default()];

        if self.state.detail_loading {
            lines.push(Line::from(Span::styled(
                "Loading recipe fields...",
                Style::default().fg(theme.text_dim),
            )));
            return lines;
        }

        if let Some(error) = &self.state.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(theme.status_error),
            )));
        }

        let Some(recipe) = &self.state.recipe else {
            lines.push(Line::from(Span::styled(
                "Select a recipe with Left/Right.",
                Style::default().fg(theme.text_dim),
            )));
            return lines;
        };

        let (editable, dependent) = recipe.partition(self.controlling);

        lines.push(Line::from(Span::styled(
            "Inputs".to_string(),
            Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
        )));
        if editable.is_empty() {
            lines.push(Line::from(Span::styled(
                "  (no controlling inputs configured for this recipe)",
                Style::default().fg(theme.text_dim),
            )));
        }
        for (idx, field) in editable.iter().enumerate() {
            let at_cursor = idx == self.state.field_cursor;
            let marker = if at_cursor { "> " } else { "  " };

            let value = match (&self.state.editing, at_cursor) {
                (Some(buffer), true) => format!("{buffer}_"),
                _ => self
                    .state
                    .inputs
                    .get(&field.key)
                    .cloned()
                    .unwrap_or_else(|| "-".to_string()),
            };

            lines.push(Line::from(vec![
                Span::raw(marker.to_string()),
                Span::styled(
                    format!("{:<24}", field.key),
                    if at_cursor {
                        Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(theme.text)
                    },
                ),
                Span::styled(value, Style::default().fg(theme.hotkey)),
            ]));
        }

        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Computed".to_string(),
            Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
        )));
        for field in &dependent {
            let value = self.state.display_value(&field.key, field.kind);
            lines.push(Line::from(vec![
                Span::raw("  ".to_string()),
                Span::styled(
                    format!("{:<24}", field.key),
                    Style::default().fg(theme.text_dim),
                ),
                Span::styled(value, Style::default().fg(theme.text)),
            ]));
        }

        lines.push(Line::default());
        let hint = if self.state.computing {
            "Computing..."
        } else {
            "[Enter] edit input  [c] compute  [Left/Right] switch recipe"
        };
        lines.push(Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(theme.text_dim),
        )));

        lines
    }
}

impl Widget for RecipesPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Recipes ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.border_dim));

        let lines = self.build_lines();
        Paragraph::new(lines).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildshift_data::recipe::{Recipe, RecipeOption};
    use serde_json::json;

    fn rendered_text(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn state_with_recipe() -> RecipesState {
        let mut state = RecipesState::default();
        state.options = vec![RecipeOption {
            id: "r1".into(),
            name: "Vanilla Base".into(),
        }];
        let tag = state.detail_generation.begin();
        state.apply_detail(
            tag,
            Ok(Recipe::from_page(
                "r1",
                &json!({
                    "Name": "Vanilla Base",
                    "Milk (L)": 12.5,
                    "Yield (L)": { "type": "formula", "formula": { "type": "number" } }
                }),
            )),
        );
        state
    }

    #[test]
    fn test_partition_renders_inputs_and_computed() {
        let state = state_with_recipe();
        let theme = Theme::default();
        let controlling = vec!["Milk (L)".to_string()];
        let text =
            rendered_text(&RecipesPanel::new(&state, &theme, &controlling).build_lines());

        assert!(text.contains("Vanilla Base"));
        assert!(text.contains("Milk (L)"));
        // Dependent field shows a placeholder until computed
        assert!(text.contains("Yield (L)"));
    }

    #[test]
    fn test_computed_values_replace_placeholders() {
        let mut state = state_with_recipe();
        let tag = state.compute_generation.begin();
        state.apply_computed(tag, Ok(json!({ "Yield (L)": 15.1 })));

        let theme = Theme::default();
        let controlling = vec!["Milk (L)".to_string()];
        let text =
            rendered_text(&RecipesPanel::new(&state, &theme, &controlling).build_lines());
        assert!(text.contains("15.1"));
    }
}
