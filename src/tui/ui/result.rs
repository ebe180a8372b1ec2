//! Result view: headline, probability, risk gauge and category chart.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders, Gauge, Paragraph, Wrap,
    },
    Frame,
};

use crate::application::Session;
use crate::domain::{classify, AssessmentResult, RiskClassification, RISK_BANDS};
use crate::tui::styles::{MedicalTheme, LOGO_SMALL};

use super::analysis::render_advanced_panel;

/// Number of straight segments approximating the gauge arc.
const ARC_SEGMENTS: usize = 60;
const NEEDLE_LENGTH: f64 = 0.85;

/// Point on the unit semicircle for a gauge angle in degrees (0 = leftmost).
#[must_use]
pub fn gauge_point(angle_degrees: f64, radius: f64) -> (f64, f64) {
    let theta = angle_degrees.to_radians();
    (-radius * theta.cos(), radius * theta.sin())
}

/// Render the result view for a session in `Success`.
pub fn render_result(f: &mut Frame, area: Rect, session: &Session, status: Option<&str>) {
    let Some(result) = session.result() else {
        return;
    };
    let classification = result.classification();

    let panel_height = if session.is_advanced_panel_open() { 14 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),            // Header
            Constraint::Min(0),               // Result
            Constraint::Length(panel_height), // Advanced analysis
            Constraint::Length(3),            // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    render_summary(f, columns[0], result, &classification);
    render_category_chart(f, columns[1], &classification);

    if session.is_advanced_panel_open() {
        render_advanced_panel(f, chunks[2], session);
    }

    render_result_footer(f, chunks[3], session, status);
}

fn render_result_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled(LOGO_SMALL, MedicalTheme::title()),
        Span::styled(" │ Risk Assessment", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_summary(
    f: &mut Frame,
    area: Rect,
    result: &AssessmentResult,
    classification: &RiskClassification,
) {
    let risk_style = MedicalTheme::risk_level(classification.category);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Headline
            Constraint::Length(3), // Probability
            Constraint::Min(6),    // Gauge
        ])
        .margin(1)
        .split(area);

    let headline = Paragraph::new(vec![
        Line::from(Span::styled(
            result.prediction.headline(),
            risk_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            result.prediction.summary(),
            MedicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(headline, chunks[0]);

    let probability = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(" Disease Probability ", MedicalTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(risk_style)
        .ratio((result.probability / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.1}%", result.probability));
    f.render_widget(probability, chunks[1]);

    render_risk_gauge(f, chunks[2], classification);
}

/// Semicircular gauge: colored band arcs with a needle at the classified angle.
fn render_risk_gauge(f: &mut Frame, area: Rect, classification: &RiskClassification) {
    let angle = classification.gauge_angle_degrees;
    let needle_color = MedicalTheme::risk_color(classification.color);

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(Span::styled(" Risk Gauge ", MedicalTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .marker(Marker::Braille)
        .x_bounds([-1.2, 1.2])
        .y_bounds([-0.2, 1.2])
        .paint(move |ctx| {
            let step = 180.0 / ARC_SEGMENTS as f64;
            for i in 0..ARC_SEGMENTS {
                let from = i as f64 * step;
                let to = from + step;
                // Color each segment by the band its midpoint falls in.
                let band_color = classify((from + to) / 2.0 / 180.0 * 100.0).color;
                let (x1, y1) = gauge_point(from, 1.0);
                let (x2, y2) = gauge_point(to, 1.0);
                ctx.draw(&CanvasLine {
                    x1,
                    y1,
                    x2,
                    y2,
                    color: MedicalTheme::risk_color(band_color),
                });
            }

            let (nx, ny) = gauge_point(angle, NEEDLE_LENGTH);
            ctx.draw(&CanvasLine {
                x1: 0.0,
                y1: 0.0,
                x2: nx,
                y2: ny,
                color: needle_color,
            });

            ctx.print(-1.15, -0.15, "0%");
            ctx.print(1.0, -0.15, "100%");
        });

    f.render_widget(canvas, area);
}

fn render_category_chart(f: &mut Frame, area: Rect, classification: &RiskClassification) {
    let block = Block::default()
        .title(Span::styled(" Risk Categories ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let mut lines = vec![Line::from("")];
    for band in RISK_BANDS {
        let active = band.level == classification.category;
        let style = if active {
            MedicalTheme::active_band(band.level)
        } else {
            MedicalTheme::risk_level(band.level)
        };
        let marker = if active { "▶" } else { " " };
        lines.push(Line::from(vec![
            Span::styled(format!(" {marker} "), MedicalTheme::text()),
            Span::styled(format!(" {:<14} {:>8} ", band.name, band.range), style),
        ]));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(vec![
        Span::styled(" Level: ", MedicalTheme::text_secondary()),
        Span::styled(
            classification.category.description(),
            MedicalTheme::risk_level(classification.category),
        ),
    ]));

    let chart = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(chart, area);
}

fn render_result_footer(f: &mut Frame, area: Rect, session: &Session, status: Option<&str>) {
    let panel = if session.is_advanced_panel_open() {
        "Hide analysis "
    } else {
        "Advanced analysis "
    };

    let mut spans = vec![
        Span::styled("[A] ", MedicalTheme::key_hint()),
        Span::styled(panel, MedicalTheme::key_desc()),
        Span::styled("[E] ", MedicalTheme::key_hint()),
        Span::styled("Export ", MedicalTheme::key_desc()),
        Span::styled("[P] ", MedicalTheme::key_hint()),
        Span::styled("Print ", MedicalTheme::key_desc()),
        Span::styled("[N] ", MedicalTheme::key_hint()),
        Span::styled("New assessment ", MedicalTheme::key_desc()),
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Edit inputs", MedicalTheme::key_desc()),
    ];
    if session.has_unassessed_edits() {
        spans.push(Span::styled(" │ ", MedicalTheme::text_muted()));
        spans.push(Span::styled(
            "Inputs changed; reports use the analyzed values",
            MedicalTheme::danger(),
        ));
    }
    if let Some(message) = status {
        spans.push(Span::styled(" │ ", MedicalTheme::text_muted()));
        spans.push(Span::styled(message.to_string(), MedicalTheme::info()));
    }

    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

/// Render the in-flight view with its progress bar (`progress` in `[0, 1]`).
pub fn render_submitting(f: &mut Frame, area: Rect, progress: f64) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .margin(2)
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        "Analyzing EKG Data...",
        MedicalTheme::focused(),
    )))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(MedicalTheme::info())
        .ratio(progress.clamp(0.0, 1.0))
        .label(format!("{:.0}%", progress * 100.0));
    f.render_widget(gauge, chunks[1]);

    let desc = Paragraph::new(Line::from(Span::styled(
        "Waiting for the prediction service",
        MedicalTheme::text_muted(),
    )))
    .alignment(Alignment::Center);
    f.render_widget(desc, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn test_gauge_point_endpoints() {
        assert!(close(gauge_point(0.0, 1.0), (-1.0, 0.0)));
        assert!(close(gauge_point(90.0, 1.0), (0.0, 1.0)));
        assert!(close(gauge_point(180.0, 1.0), (1.0, 0.0)));
    }

    #[test]
    fn test_needle_for_high_risk_points_right() {
        let (x, y) = gauge_point(classify(85.0).gauge_angle_degrees, NEEDLE_LENGTH);
        assert!(x > 0.0);
        assert!(y > 0.0);
    }
}
