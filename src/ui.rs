use crate::app::{App, HERO_ROWS, ModalState};
use crate::domain::{CardLayout, Icon, Link};
use crate::focus::SearchInput;
use crate::settings::SettingsField;
use crate::view::ViewOutcome;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Alignment, Color, Line, Modifier, Span, Style};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const MIN_CELL_WIDTH: usize = 14;
const SUBTITLE: &str = "Quick access to all your company's resources";

pub fn draw(frame: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_page(frame, app, outer[1]);
    draw_header(frame, app, outer[0]);
    draw_status_bar(frame, app, outer[2]);
    draw_modal(frame, app);
}

/// The scrollable page body and where the selected card sits in it.
pub(crate) struct Page {
    pub lines: Vec<Line<'static>>,
    pub selected_rows: Option<(usize, usize)>,
}

fn draw_page(frame: &mut Frame, app: &mut App, area: Rect) {
    let page = build_page(app, area.width);
    let viewport = usize::from(area.height);

    app.set_page_rows(page.lines.len(), viewport);
    if app.take_follow_selection()
        && let Some((top, bottom)) = page.selected_rows
    {
        // Keep the hero in view while the first row is selected.
        let top = if top <= HERO_ROWS + 1 { 0 } else { top };
        app.sync_page_scroll(top, bottom, viewport);
    }

    let scroll = app.page_scroll().min(usize::from(u16::MAX)) as u16;
    let paragraph = Paragraph::new(page.lines).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

pub(crate) fn build_page(app: &App, width: u16) -> Page {
    let width = usize::from(width.max(1));
    let mut lines = hero_lines(app, width);
    debug_assert_eq!(lines.len(), HERO_ROWS);

    let view = match app.view() {
        ViewOutcome::NoResults { query } => {
            lines.extend(no_results_lines(query, app.github_edit_url.as_deref()));
            return Page {
                lines,
                selected_rows: None,
            };
        }
        ViewOutcome::Results(view) => view,
    };

    let settings = app.settings();
    let columns = usize::from(settings.grid_columns.max(1))
        .min((width / MIN_CELL_WIDTH).max(1));
    let cell_width = width / columns;

    let mut blocks: Vec<(Line<'static>, &[Link])> = Vec::new();
    if !view.favorite_links.is_empty() {
        blocks.push((
            block_header("★ Favorites", view.favorite_links.len(), Color::Yellow),
            view.favorite_links.as_slice(),
        ));
    }
    for group in &view.groups {
        blocks.push((
            block_header(&group.category, group.links.len(), Color::Cyan),
            group.links.as_slice(),
        ));
    }

    let mut selected_rows = None;
    let mut index = 0usize;
    for (header, links) in blocks {
        lines.push(header);
        for (row_idx, row) in links.chunks(columns).enumerate() {
            let top = lines.len();
            let row_lines = card_row_lines(app, row, index, settings.card_layout, cell_width);
            let height = row_lines.len();
            if let Some(selected) = app.selection.index()
                && (index..index + row.len()).contains(&selected)
            {
                // Bring the block header along with its first row.
                let top = if row_idx == 0 { top - 1 } else { top };
                selected_rows = Some((top, lines.len() + height));
            }
            lines.extend(row_lines);
            index += row.len();
        }
        lines.push(Line::from(""));
    }

    Page {
        lines,
        selected_rows,
    }
}

fn hero_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let focused = app.focus.owner() == Some(SearchInput::Hero);
    let title = Line::from(Span::styled(
        center(&app.title, width),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    let subtitle = Line::from(Span::styled(
        center(SUBTITLE, width),
        Style::default().fg(Color::Gray),
    ));

    vec![
        title,
        subtitle,
        Line::from(""),
        search_line(app.query().query(), focused, false),
        tags_line(app),
        Line::from(""),
    ]
}

fn search_line(query: &str, focused: bool, compact: bool) -> Line<'static> {
    let label = if compact { "🔍 " } else { "  Search: " };
    let border = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let mut spans = vec![Span::styled(label.to_string(), border)];
    if query.is_empty() && !focused {
        spans.push(Span::styled(
            "Search links, tags, categories… (Ctrl+K)".to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::raw(query.to_string()));
    }
    if focused {
        spans.push(Span::styled(
            "▏".to_string(),
            Style::default().fg(Color::Cyan),
        ));
    }
    Line::from(spans)
}

fn tags_line(app: &App) -> Line<'static> {
    let selected = app.query().selected_tags();
    let mut spans = vec![Span::styled(
        "  Tags:   ".to_string(),
        Style::default().fg(Color::Gray),
    )];
    if selected.is_empty() {
        spans.push(Span::styled(
            "none (t to filter by tag)".to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        for tag in selected {
            spans.push(Span::styled(
                format!(" {tag} "),
                Style::default().fg(Color::Black).bg(Color::LightBlue),
            ));
            spans.push(Span::raw(" "));
        }
    }
    Line::from(spans)
}

fn block_header(title: &str, count: usize, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" {title} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {count} "),
            Style::default().fg(Color::Black).bg(Color::Gray),
        ),
    ])
}

fn card_row_lines(
    app: &App,
    row: &[Link],
    first_index: usize,
    layout: CardLayout,
    cell_width: usize,
) -> Vec<Line<'static>> {
    let height = match layout {
        CardLayout::Compact => 1,
        CardLayout::Default => 2,
    };
    let inner = cell_width.saturating_sub(1).max(1);

    (0..height)
        .map(|line_idx| {
            let spans: Vec<Span<'static>> = row
                .iter()
                .enumerate()
                .flat_map(|(offset, link)| {
                    let selected = app.selection.is_selected(first_index + offset);
                    let favorite = app.favorites().contains(&link.href);
                    let text = if line_idx == 0 {
                        card_title(link, favorite)
                    } else {
                        format!("    {}", link.description.as_deref().unwrap_or(""))
                    };
                    let style = card_style(selected, line_idx == 0);
                    [Span::styled(fit(&text, inner), style), Span::raw(" ")]
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn card_title(link: &Link, favorite: bool) -> String {
    let star = if favorite { " ★" } else { "" };
    format!(" {} {}{star}", link.icon().terminal_marker(), link.title)
}

fn card_style(selected: bool, title_line: bool) -> Style {
    if selected {
        Style::default()
            .fg(Color::Black)
            .bg(Color::LightGreen)
            .add_modifier(Modifier::BOLD)
    } else if title_line {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn no_results_lines(query: &str, edit_url: Option<&str>) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  No results found".to_string(),
            Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("  No links found matching \"{query}\""),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if let Some(url) = edit_url.filter(|u| !u.trim().is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(
                "  Think something is missing? Add it on GitHub: ".to_string(),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(url.to_string(), Style::default().fg(Color::LightBlue)),
        ]));
    }
    lines
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        format!(" {}", app.title),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(title, columns[0]);

    if app.focus.sticky_visible() {
        let focused = app.focus.owner() == Some(SearchInput::Sticky);
        let search = Paragraph::new(search_line(app.query().query(), focused, true));
        frame.render_widget(search, columns[1]);
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (state, state_style) = if app.is_hydrated() {
        ("READY", Style::default().bg(Color::DarkGray).fg(Color::White))
    } else {
        ("LOADING", Style::default().bg(Color::Yellow).fg(Color::Black))
    };
    let shown = app.visible_links().len();

    let mut spans = vec![
        Span::styled(format!(" {state} "), state_style),
        Span::raw("  "),
        Span::styled(
            format!("{shown}/{} links", app.catalog().len()),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("  "),
    ];
    if !app.favorites().is_empty() {
        spans.push(Span::styled(
            format!("★ {}", app.favorites().len()),
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::raw("  "));
    }
    if let Some(status) = &app.status {
        spans.push(Span::styled(
            status.clone(),
            Style::default().fg(Color::LightYellow),
        ));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(
        "Ctrl+K search | ↑/↓ move | Enter open | Ctrl+F favorite | t tags | s settings | ? help",
        Style::default().fg(Color::Gray),
    ));

    let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

fn draw_modal(frame: &mut Frame, app: &App) {
    match &app.modal {
        ModalState::None => {}
        ModalState::Help => {
            let area = centered_rect(60, 60, frame.area());
            frame.render_widget(Clear, area);
            let lines: Vec<Line> = HELP_LINES.iter().map(|line| Line::from(*line)).collect();
            let p = Paragraph::new(lines)
                .block(
                    Block::default()
                        .title(" Help ")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Cyan)),
                )
                .wrap(Wrap { trim: false });
            frame.render_widget(p, area);
        }
        ModalState::Tags { cursor } => {
            let area = centered_rect(40, 70, frame.area());
            frame.render_widget(Clear, area);

            let items: Vec<ListItem> = app
                .all_tags()
                .iter()
                .map(|tag| {
                    let mark = if app.query().has_tag(tag) { "[x]" } else { "[ ]" };
                    ListItem::new(format!("{mark} {tag}"))
                })
                .collect();

            let list = List::new(items)
                .block(
                    Block::default()
                        .title(" Tags (space: toggle, x: clear, esc: close) ")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Cyan)),
                )
                .highlight_style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::LightYellow)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▶ ");

            let mut state = ListState::default();
            if !app.all_tags().is_empty() {
                state.select(Some(*cursor));
            }
            frame.render_stateful_widget(list, area, &mut state);
        }
        ModalState::Settings { draft, field } => {
            let area = centered_rect(60, 55, frame.area());
            frame.render_widget(Clear, area);

            let current = app.settings();
            let mut lines = vec![
                Line::from("Customize your Resource Hub. Settings are saved on this machine."),
                Line::from(""),
            ];
            for candidate in SettingsField::ALL {
                let style = if candidate == *field {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::LightYellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(
                    format!(
                        "{:<18} ◀ {} ▶",
                        candidate.label(),
                        draft.display_value(candidate)
                    ),
                    style,
                )));
            }
            lines.push(Line::from(""));
            if draft.has_changes(&current) {
                lines.push(
                    Line::from("unsaved changes").style(Style::default().fg(Color::Yellow)),
                );
            }
            if !draft.is_at_defaults(app.defaults()) {
                lines.push(
                    Line::from("r: reset to defaults").style(Style::default().fg(Color::Gray)),
                );
            }
            lines.push(Line::from("↑/↓ field  ←/→ change  Enter: save  Esc: cancel"));

            let p = Paragraph::new(lines)
                .block(
                    Block::default()
                        .title(" Settings ")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::LightBlue)),
                )
                .wrap(Wrap { trim: false });
            frame.render_widget(p, area);
        }
    }
}

const HELP_LINES: &[&str] = &[
    "Ctrl+K or /     focus the search box",
    "type            filter by title, description, category or tag",
    "↑/↓ Tab         move the selection (while searching or filtering)",
    "Enter           open the selected link",
    "Esc             clear the selection and leave the search box",
    "Ctrl+F or f     toggle favorite on the selected link",
    "t               pick tags (all selected tags must match)",
    "x               clear selected tags",
    "s               settings (columns, layout, link target, sorting)",
    "PgUp/PgDn j/k   scroll the page",
    "q or Ctrl+C     quit",
];

/// The current view as plain text, for non-interactive output.
pub(crate) fn plain_text(app: &App) -> String {
    let mut out = format!("{}\n", app.title);
    match app.view() {
        ViewOutcome::NoResults { query } => {
            out.push_str("\nNo results found\n");
            out.push_str(&format!("No links found matching \"{query}\"\n"));
            if let Some(url) = app.github_edit_url.as_deref().filter(|u| !u.trim().is_empty()) {
                out.push_str(&format!("Think something is missing? Add it on GitHub: {url}\n"));
            }
        }
        ViewOutcome::Results(view) => {
            let favorites = (!view.favorite_links.is_empty())
                .then_some(("★ Favorites", view.favorite_links.as_slice()));
            let groups = view
                .groups
                .iter()
                .map(|g| (g.category.as_str(), g.links.as_slice()));
            for (title, links) in favorites.into_iter().chain(groups) {
                out.push_str(&format!("\n{title} ({})\n", links.len()));
                for link in links {
                    out.push_str(&format!("  {link}\n"));
                    if let Some(description) = &link.description {
                        out.push_str(&format!("      {description}\n"));
                    }
                    if let Some(icon) = icon_reference(&link.icon()) {
                        out.push_str(&format!("      icon: {icon}\n"));
                    }
                }
            }
        }
    }
    out
}

/// Where a graphical client would load the icon from.
fn icon_reference(icon: &Icon) -> Option<String> {
    match icon {
        Icon::Image(url) => Some(url.clone()),
        Icon::Devicon { .. } if icon.uses_svg() => icon.svg_url(),
        Icon::Devicon { .. } => icon.font_class(),
        Icon::None | Icon::Glyph(_) => None,
    }
}

/// Truncate to `width` display columns (with an ellipsis) and pad the rest.
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        let mut out = text.to_string();
        out.push_str(&" ".repeat(width - text.width()));
        return out;
    }

    let budget = width.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(ch);
        used += w;
    }
    if width > 0 {
        out.push('…');
        used += 1;
    }
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

fn center(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.width()) / 2;
    format!("{}{text}", " ".repeat(pad))
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, LinkRecord};
    use crate::domain::SortingOption;
    use crate::query::QueryState;
    use crate::store::FavoriteSet;
    use pretty_assertions::assert_eq;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn app_with(links: &[(&str, &str, &str)], query: &str) -> App {
        let config = AppConfig {
            github_edit_url: Some("https://github.com/acme/hub".to_string()),
            link_sorting: Some(SortingOption::Defined),
            grid_columns: Some(2),
            links: links
                .iter()
                .map(|(href, title, category)| LinkRecord {
                    href: Some(href.to_string()),
                    title: Some(title.to_string()),
                    category: Some(category.to_string()),
                    ..LinkRecord::default()
                })
                .collect(),
            ..AppConfig::default()
        };
        App::new(&config, QueryState::new(query, Vec::new()))
    }

    #[test]
    fn fit_pads_and_truncates_by_display_width() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("日本語", 4), "日… ");
        assert_eq!(fit("", 0), "");
    }

    #[test]
    fn page_lists_blocks_in_visible_order() {
        let mut app = app_with(
            &[
                ("a", "Alpha", "One"),
                ("b", "Beta", "Two"),
                ("c", "Gamma", "One"),
            ],
            "",
        );
        app.apply_hydration(FavoriteSet::from_hrefs(vec!["b".to_string()]), None);

        let page = build_page(&app, 80);
        let text: Vec<String> = page.lines.iter().map(line_text).collect();
        let body = &text[HERO_ROWS..];

        // Default layout: a title line and a description line per card row.
        assert!(body[0].contains("Favorites"));
        assert!(body[1].contains("Beta"));
        assert!(body[4].contains("One"));
        assert!(body[5].contains("Alpha") && body[5].contains("Gamma"));
        assert!(!text.iter().any(|l| l.contains(" Two ")));
        assert!(page.selected_rows.is_none());
    }

    #[test]
    fn no_results_page_echoes_query_and_edit_link() {
        let app = app_with(&[("a", "GitHub", "Dev"), ("b", "GitLab", "Dev")], "zzz");
        let page = build_page(&app, 80);
        let text: Vec<String> = page.lines.iter().map(line_text).collect();
        assert!(text.iter().any(|l| l.contains("No results found")));
        assert!(text.iter().any(|l| l.contains("No links found matching \"zzz\"")));
        assert!(text.iter().any(|l| l.contains("https://github.com/acme/hub")));
    }

    #[test]
    fn plain_text_lists_groups_with_counts() {
        let mut app = app_with(&[("a", "Alpha", "One"), ("b", "Beta", "Two")], "");
        app.apply_hydration(FavoriteSet::from_hrefs(vec!["b".to_string()]), None);
        assert_eq!(
            plain_text(&app),
            "Resource Hub\n\n★ Favorites (1)\n  Beta <b>\n\nOne (1)\n  Alpha <a>\n"
        );

        app.set_query("nothing");
        let text = plain_text(&app);
        assert!(text.contains("No links found matching \"nothing\""));
        assert!(text.contains("Add it on GitHub: https://github.com/acme/hub"));
    }

    #[test]
    fn icon_reference_prefers_svg_for_original_devicons() {
        assert_eq!(
            icon_reference(&Icon::parse(Some("devicon/github-original"))).as_deref(),
            Some("https://cdn.jsdelivr.net/gh/devicons/devicon@latest/icons/github/github-original.svg")
        );
        assert_eq!(
            icon_reference(&Icon::parse(Some("devicon/docker-plain"))).as_deref(),
            Some("devicon-docker-plain")
        );
        assert_eq!(icon_reference(&Icon::parse(Some("🚀"))), None);
    }

    #[test]
    fn selected_card_rows_are_reported() {
        let mut app = app_with(
            &[
                ("a", "Alpha", "One"),
                ("b", "Beta", "One"),
                ("c", "Gamma", "One"),
            ],
            "a",
        );
        app.move_next();
        app.move_next();
        let page = build_page(&app, 80);
        let (top, bottom) = page.selected_rows.expect("selected rows");
        assert!(top < bottom);
        assert!(line_text(&page.lines[top]).contains("Gamma"));
    }
}
