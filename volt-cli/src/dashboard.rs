//! Read-only terminal dashboard: stat tiles, the spending chart, and the
//! record history, rendered from a snapshot of the store.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Paragraph, Row, Table},
};
use std::io::{self, Stdout};

use volt_core::{BillRecord, chart_series, compute_totals};

#[derive(Clone, Copy, PartialEq)]
enum View {
    Overview,
    History,
}

pub fn run_dashboard(records: &[BillRecord]) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = dash_loop(&mut terminal, records);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn dash_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, records: &[BillRecord]) -> Result<()> {
    let mut view = View::Overview;

    loop {
        terminal.draw(|f| match view {
            View::Overview => draw_overview(f, records),
            View::History => draw_history(f, records),
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => {
                    view = match view {
                        View::Overview => View::History,
                        View::History => View::Overview,
                    };
                }
                _ => {}
            }
        }
    }
}

fn draw_overview(f: &mut Frame, records: &[BillRecord]) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_tiles(f, chunks[0], records);
    draw_chart(f, chunks[1], records);
    draw_help(f, chunks[2], "q quit · tab history");
}

fn draw_tiles(f: &mut Frame, area: Rect, records: &[BillRecord]) {
    let totals = compute_totals(records);
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let tile = |title: &'static str, value: String| {
        Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title))
    };

    f.render_widget(
        tile("Total Spent", format!("{:.2}", totals.total_spent)),
        tiles[0],
    );
    f.render_widget(
        tile("Avg Bill Amount", format!("{:.2}", totals.avg_spent)),
        tiles[1],
    );
    f.render_widget(
        tile("Total Entries", totals.entry_count.to_string()),
        tiles[2],
    );
    f.render_widget(
        tile("Avg Duration", format!("{} days", totals.avg_duration_days)),
        tiles[3],
    );
}

fn draw_chart(f: &mut Frame, area: Rect, records: &[BillRecord]) {
    let series = chart_series(records);
    let bars: Vec<(String, u64)> = series
        .iter()
        .map(|p| {
            (
                p.date_inserted.format("%m-%d").to_string(),
                p.amount.max(0.0).round() as u64,
            )
        })
        .collect();
    let data: Vec<(&str, u64)> = bars.iter().map(|(label, v)| (label.as_str(), *v)).collect();

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Spending Trend"))
        .data(&data)
        .bar_width(7)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Blue))
        .value_style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(chart, area);
}

fn draw_history(f: &mut Frame, records: &[BillRecord]) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(f.area());

    let rows: Vec<Row> = records
        .iter()
        .map(|r| {
            Row::new(vec![
                r.date_purchased.to_string(),
                r.date_inserted.to_string(),
                r.date_finished
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "ongoing".to_string()),
                format!("{:.2}", r.amount_purchased),
                r.status().label().to_string(),
                r.notes.clone().unwrap_or_default(),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Min(10),
        ],
    )
    .header(
        Row::new(vec![
            "Purchased", "Inserted", "Finished", "Amount", "Status", "Notes",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title("History"));

    f.render_widget(table, chunks[0]);
    draw_help(f, chunks[1], "q quit · tab overview");
}

fn draw_help(f: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::DarkGray),
    )))
    .alignment(Alignment::Center);
    f.render_widget(help, area);
}
