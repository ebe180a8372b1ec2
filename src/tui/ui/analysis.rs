//! Advanced analysis panel: contributions, model comparison, statistical
//! summary, recommendations.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::application::Session;
use crate::domain::{
    benchmark, contribution, recommendations, ModelBenchmark, RiskContributions, MODEL_BENCHMARKS,
    MODEL_CONFIDENCE,
};
use crate::tui::styles::MedicalTheme;

/// Render the advanced analysis panel for a session in `Success`.
pub fn render_advanced_panel(f: &mut Frame, area: Rect, session: &Session) {
    let Some(result) = session.result() else {
        return;
    };
    let classification = result.classification();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(22),
            Constraint::Percentage(20),
            Constraint::Percentage(28),
        ])
        .split(area);

    render_contributions(f, columns[0], &RiskContributions::from_record(session.record()));
    render_model_comparison(f, columns[1], &MODEL_BENCHMARKS);

    let response = session
        .response_time()
        .map_or_else(|| "n/a".to_string(), |d| format!("{} ms", d.as_millis()));
    let summary = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Probability:   ", MedicalTheme::text_secondary()),
            Span::styled(format!("{:.1}%", result.probability), MedicalTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("Risk level:    ", MedicalTheme::text_secondary()),
            Span::styled(
                classification.category.to_string(),
                MedicalTheme::risk_level(classification.category),
            ),
        ]),
        Line::from(vec![
            Span::styled("Confidence:    ", MedicalTheme::text_secondary()),
            Span::styled(format!("{MODEL_CONFIDENCE:.1}%"), MedicalTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("Response time: ", MedicalTheme::text_secondary()),
            Span::styled(response, MedicalTheme::text()),
        ]),
    ])
    .block(
        Block::default()
            .title(Span::styled(" Statistical Summary ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(summary, columns[2]);

    let items: Vec<Line> = recommendations(classification.category)
        .iter()
        .map(|r| {
            Line::from(vec![
                Span::styled("• ", MedicalTheme::risk_level(classification.category)),
                Span::styled(*r, MedicalTheme::text()),
            ])
        })
        .collect();
    let recs = Paragraph::new(items)
        .block(
            Block::default()
                .title(Span::styled(
                    " Clinical Recommendations ",
                    MedicalTheme::subtitle(),
                ))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(recs, columns[3]);
}

fn render_contributions(f: &mut Frame, area: Rect, contributions: &RiskContributions) {
    let block = Block::default()
        .title(Span::styled(
            " Key Risk Factors Contribution ",
            MedicalTheme::subtitle(),
        ))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let factors = contributions.labelled();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            factors
                .iter()
                .map(|_| Constraint::Length(2))
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .split(inner);

    for (i, (label, score)) in factors.iter().enumerate() {
        let width = contribution::bar_width(*score);
        let bar = Gauge::default()
            .block(Block::default().title(Span::styled(*label, MedicalTheme::text_secondary())))
            .gauge_style(MedicalTheme::info())
            .ratio(width / 100.0)
            .label(format!("{score:.1}%"));
        f.render_widget(bar, rows[i]);
    }
}

fn render_model_comparison(f: &mut Frame, area: Rect, models: &[ModelBenchmark]) {
    let block = Block::default()
        .title(Span::styled(
            " Model Performance Comparison ",
            MedicalTheme::subtitle(),
        ))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            models
                .iter()
                .map(|_| Constraint::Length(2))
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .split(inner);

    for (i, model) in models.iter().enumerate() {
        let bar = Gauge::default()
            .block(Block::default().title(Span::styled(model.name, MedicalTheme::text_secondary())))
            .gauge_style(MedicalTheme::focused())
            .ratio(benchmark::relative_bar(model, models))
            .label(format!("{:.1}%", model.accuracy));
        f.render_widget(bar, rows[i]);
    }
}
