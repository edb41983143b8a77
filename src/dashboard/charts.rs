//! # History Charts
//!
//! Draws one line chart per charted quantity in a 3×3 grid, each with its
//! fixed y range.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType};

use crate::telemetry::history::ChartSeries;

/// Charts per grid row
const GRID_COLUMNS: usize = 3;

/// Draw every series into `area`, row by row.
pub fn render_grid(f: &mut ratatui::Frame, area: Rect, series: &[ChartSeries]) {
    if series.is_empty() {
        return;
    }

    let rows = series.len().div_ceil(GRID_COLUMNS);
    let row_areas = Layout::vertical(vec![Constraint::Ratio(1, rows as u32); rows]).split(area);

    for (row_area, row_series) in row_areas.iter().zip(series.chunks(GRID_COLUMNS)) {
        let cells = Layout::horizontal(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
            .split(*row_area);
        for (cell, s) in cells.iter().zip(row_series) {
            render_chart(f, *cell, s);
        }
    }
}

/// Draw one series as a line chart.
pub fn render_chart(f: &mut ratatui::Frame, area: Rect, series: &ChartSeries) {
    let points = series.points();
    let (y_min, y_max) = series.range();
    let x_max = series.values.len().saturating_sub(1).max(1) as f64;

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Red))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(Block::bordered().title(series.title()))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, x_max]),
        )
        .y_axis(
            Axis::default()
                .title(series.quantity.y_label())
                .style(Style::default().fg(Color::DarkGray))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{}", y_min)),
                    Span::raw(format!("{}", y_max)),
                ]),
        );

    f.render_widget(chart, area);
}
