use crate::ai::Provider;
use crate::app::{App, Busy, View, DISMISS_HINT};
use crate::catalog::DisplayEntry;
use crate::form::TextInput;
use crate::list::Rank;
use ansi_to_tui::IntoText;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

const LIST_WIDTH_PERCENT: u16 = 35;

pub fn footer_hint(view: View) -> &'static str {
    match view {
        View::List => {
            "enter: run  type: filter  esc: clear/quit  pgup/pgdn: scroll  ctrl+p: AI settings  q: quit"
        }
        View::ParameterInput => "enter: next/run  tab/shift+tab: move  ctrl+f: pick file  esc: back",
        View::Generating => "esc: back  ctrl+c: quit",
        View::ProviderSelect => "up/down: choose  enter: select  esc: back",
        View::ApiKeyInput => "enter: save  ctrl+f: pick file  esc: back",
        View::ModelInput => "enter: save (empty keeps default)  ctrl+f: pick file  esc: back",
        View::ModelSelect => "type: filter  up/down: choose  enter: save  esc: back",
    }
}

pub fn draw_app(frame: &mut Frame<'_>, app: &App, spinner: &str) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(frame.area());

    match app.view() {
        View::List => draw_task_list(frame, app, sections[0]),
        View::ParameterInput => draw_form(frame, app, sections[0]),
        View::Generating => draw_generating(frame, app, spinner, sections[0]),
        View::ProviderSelect => draw_provider_select(frame, app, sections[0]),
        View::ApiKeyInput => draw_single_input(
            frame,
            &format!("Enter {} API Key", app.pending_provider().display_name()),
            "API Key: ",
            app.key_input(),
            &format!(
                "Or set {} in the environment.",
                app.pending_provider().api_key_env()
            ),
            sections[0],
        ),
        View::ModelInput => draw_single_input(
            frame,
            &format!("Enter {} Model", app.pending_provider().display_name()),
            "Model: ",
            app.model_input(),
            &format!(
                "Leave empty to keep the default ({}).",
                app.pending_provider().default_model()
            ),
            sections[0],
        ),
        View::ModelSelect => draw_model_select(frame, app, sections[0]),
    }
    draw_footer(frame, app, sections[1]);
}

fn draw_footer(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let line = match app.banner() {
        Some(message) => Line::from(vec![
            Span::styled(
                format!("Error: {message} "),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(DISMISS_HINT, Style::default().fg(Color::Gray)),
        ]),
        None => Line::styled(footer_hint(app.view()), Style::default().fg(Color::Gray)),
    };
    frame.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

/// Name with its fuzzy-matched characters highlighted.
fn highlighted_name(name: &str, rank: &Rank, selected: bool) -> Line<'static> {
    let base = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let matched = base.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED);
    let spans: Vec<Span<'static>> = name
        .chars()
        .enumerate()
        .map(|(idx, ch)| {
            let style = if rank.matched.contains(&idx) {
                matched
            } else {
                base
            };
            Span::styled(ch.to_string(), style)
        })
        .collect();
    Line::from(spans)
}

fn draw_task_list(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(LIST_WIDTH_PERCENT),
            Constraint::Percentage(100 - LIST_WIDTH_PERCENT),
        ])
        .split(area);

    let list = app.list();
    let selected = list.selected_position();
    let items: Vec<ListItem<'static>> = list
        .visible()
        .enumerate()
        .map(|(position, (entry, rank))| {
            let is_selected = position == selected;
            let mut lines = Vec::with_capacity(2);
            match entry {
                DisplayEntry::Task { name, description } => {
                    lines.push(highlighted_name(name, rank, is_selected));
                    if let Some(description) = description {
                        lines.push(Line::styled(
                            format!("  {description}"),
                            Style::default().fg(Color::DarkGray),
                        ));
                    }
                }
                DisplayEntry::Generate => {
                    lines.push(Line::styled(
                        app.entry_title(entry),
                        Style::default()
                            .fg(if is_selected {
                                Color::Yellow
                            } else {
                                Color::Magenta
                            })
                            .add_modifier(Modifier::BOLD),
                    ));
                }
            }
            ListItem::new(Text::from(lines))
        })
        .collect();

    let title = if list.is_filtering() {
        format!("Tasks  Filter: {}", list.filter_text())
    } else {
        "Tasks".to_string()
    };
    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(
        List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_symbol("> "),
        columns[0],
        &mut state,
    );

    let detail = app
        .detail()
        .as_bytes()
        .into_text()
        .unwrap_or_else(|_| Text::raw(app.detail().to_string()));
    frame.render_widget(
        Paragraph::new(detail)
            .block(Block::default().title("Details").borders(Borders::ALL))
            .scroll((app.detail_scroll(), 0)),
        columns[1],
    );
}

/// Prompt, then the value with a block cursor when focused, or the dimmed
/// placeholder when empty.
fn input_line(prompt: &str, input: &TextInput, focused: bool) -> Line<'static> {
    let prompt_style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let mut spans = vec![Span::styled(prompt.to_string(), prompt_style)];
    let cursor_style = Style::default().add_modifier(Modifier::REVERSED);
    if input.value().is_empty() {
        if focused {
            spans.push(Span::styled(" ", cursor_style));
        }
        spans.push(Span::styled(
            input.placeholder().to_string(),
            Style::default().fg(Color::DarkGray),
        ));
        return Line::from(spans);
    }
    let shown: Vec<char> = input.display_value().chars().collect();
    if !focused {
        spans.push(Span::raw(shown.iter().collect::<String>()));
        return Line::from(spans);
    }
    let cursor = input.cursor().min(shown.len());
    spans.push(Span::raw(shown[..cursor].iter().collect::<String>()));
    let under_cursor = shown.get(cursor).map(char::to_string).unwrap_or_else(|| " ".to_string());
    spans.push(Span::styled(under_cursor, cursor_style));
    if cursor + 1 < shown.len() {
        spans.push(Span::raw(shown[cursor + 1..].iter().collect::<String>()));
    }
    Line::from(spans)
}

fn draw_form(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(form) = app.form() else {
        return;
    };
    let mut lines = vec![Line::raw("")];
    for (idx, field) in form.fields().iter().enumerate() {
        lines.push(input_line(&field.prompt, &field.input, idx == form.focus()));
    }
    frame.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(form.title())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_generating(frame: &mut Frame<'_>, app: &App, spinner: &str, area: Rect) {
    let label = match app.busy() {
        Some(Busy::ModelListing(provider)) => {
            format!("{spinner} Fetching models for {}...", provider.display_name())
        }
        _ => format!("{spinner} Generating command..."),
    };
    let mut lines = vec![
        Line::styled(
            label,
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
    ];
    if matches!(app.busy(), Some(Busy::Generation)) {
        lines.push(Line::styled(
            format!("Request: {}", app.ai_prompt()),
            Style::default().fg(Color::Gray),
        ));
        lines.push(Line::raw(""));
        lines.extend(app.generated().lines().map(|line| Line::raw(line.to_string())));
    }
    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().title("AI").borders(Borders::ALL))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_provider_select(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items: Vec<ListItem<'static>> = Provider::ALL
        .iter()
        .enumerate()
        .map(|(idx, provider)| {
            let mut label = provider.display_name().to_string();
            if app.active_provider() == Some(*provider) {
                label.push_str(" (active)");
            }
            let mut item = ListItem::new(Line::raw(label));
            if idx == app.provider_cursor() {
                item = item.style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                );
            }
            item
        })
        .collect();
    frame.render_widget(
        List::new(items).block(
            Block::default()
                .title("Select AI Provider")
                .borders(Borders::ALL),
        ),
        area,
    );
}

fn draw_single_input(
    frame: &mut Frame<'_>,
    title: &str,
    prompt: &str,
    input: &TextInput,
    note: &str,
    area: Rect,
) {
    let lines = vec![
        Line::raw(""),
        input_line(prompt, input, true),
        Line::raw(""),
        Line::styled(note.to_string(), Style::default().fg(Color::Gray)),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        area,
    );
}

fn draw_model_select(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let list = app.model_list();
    let selected = list.selected_position();
    let items: Vec<ListItem<'static>> = list
        .visible()
        .enumerate()
        .map(|(position, (model, rank))| {
            ListItem::new(highlighted_name(model, rank, position == selected))
        })
        .collect();
    let mut title = format!("Select {} Model", app.pending_provider().display_name());
    if !list.filter_text().is_empty() {
        title.push_str(&format!("  Filter: {}", list.filter_text()));
    }
    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(
        List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_symbol("> "),
        area,
        &mut state,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn masked_input_never_renders_the_secret() {
        let mut input = TextInput::new().masked();
        input.insert_str("sk-secret");
        let line = input_line("API Key: ", &input, true);
        let text = rendered(&line);
        assert!(!text.contains("secret"));
        assert!(text.starts_with("API Key: •••"));
    }

    #[test]
    fn empty_input_shows_placeholder() {
        let input = TextInput::new().with_placeholder("World (default)");
        let line = input_line("name: ", &input, false);
        assert_eq!(rendered(&line), "name: World (default)");
    }

    #[test]
    fn every_view_has_a_hint() {
        for view in View::ALL {
            assert!(!footer_hint(view).is_empty());
        }
    }
}
