//! Clinical intake form.
//!
//! Numeric fields are typed into an edit buffer that is committed through
//! the session on navigation or submit; coded fields cycle in place.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::application::{RecordError, Session};
use crate::domain::{list_fields, FieldKind, FieldSpec, FieldValue};
use crate::tui::styles::{MedicalTheme, LOGO_SMALL};

/// Intake form state
#[derive(Debug, Default)]
pub struct IntakeFormState {
    pub selected_field: usize,
    /// Uncommitted text for the selected numeric field
    pub edit_buffer: Option<String>,
    pub error_message: Option<String>,
}

impl IntakeFormState {
    #[must_use]
    pub fn selected(&self) -> &'static FieldSpec {
        &list_fields()[self.selected_field]
    }

    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % list_fields().len();
    }

    pub fn prev_field(&mut self) {
        let count = list_fields().len();
        self.selected_field = (self.selected_field + count - 1) % count;
    }

    /// Add a character to the selected numeric field.
    pub fn input_char(&mut self, c: char) {
        if matches!(self.selected().kind, FieldKind::Coded { .. }) {
            return;
        }
        if c.is_ascii_digit() || c == '.' || c == '-' {
            self.edit_buffer.get_or_insert_with(String::new).push(c);
            self.error_message = None;
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(buffer) = self.edit_buffer.as_mut() {
            buffer.pop();
        }
    }

    /// Write the edit buffer into the session.
    ///
    /// On rejection the buffer is kept so it can be corrected, and the
    /// violation is shown in the footer.
    ///
    /// # Errors
    /// Returns the session's rejection.
    pub fn commit(&mut self, session: &mut Session) -> Result<(), RecordError> {
        let Some(buffer) = self.edit_buffer.as_ref() else {
            return Ok(());
        };

        match session.update_field(self.selected().id, buffer) {
            Ok(()) => {
                self.clear_sensitive();
                Ok(())
            }
            Err(e) => {
                self.error_message = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Step the selected coded field to its next or previous code.
    pub fn cycle(&mut self, session: &mut Session, forward: bool) {
        let spec = self.selected();
        let FieldValue::Code(current) = session.record().get(spec.id) else {
            return;
        };
        let Some(next) = spec.cycle_code(current, forward) else {
            return;
        };

        match session.set_value(spec.id, FieldValue::Code(next)) {
            Ok(()) => self.error_message = None,
            Err(e) => self.error_message = Some(e.to_string()),
        }
    }

    /// Wipe the edit buffer from memory.
    pub fn clear_sensitive(&mut self) {
        if let Some(buffer) = self.edit_buffer.as_mut() {
            buffer.zeroize();
        }
        self.edit_buffer = None;
        self.error_message = None;
    }
}

/// Render the intake form
pub fn render_intake_form(f: &mut Frame, area: Rect, state: &IntakeFormState, session: &Session) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0], session);
    render_form_fields(f, chunks[1], state, session);
    render_form_footer(f, chunks[2], state, session);
}

fn render_form_header(f: &mut Frame, area: Rect, session: &Session) {
    let mut spans = vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled(LOGO_SMALL, MedicalTheme::title()),
        Span::styled(
            " │ Clinical Parameters Input",
            MedicalTheme::text_secondary(),
        ),
    ];
    if let Some(error) = session.last_error() {
        spans.push(Span::styled(" │ ", MedicalTheme::text_secondary()));
        spans.push(Span::styled(
            format!("Analysis failed: {error}"),
            MedicalTheme::danger(),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &IntakeFormState, session: &Session) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let fields = list_fields();
    let mid = (fields.len() + 1) / 2;

    render_field_column(f, columns[0], &fields[..mid], 0, state, session);
    render_field_column(f, columns[1], &fields[mid..], mid, state, session);
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FieldSpec],
    offset: usize,
    state: &IntakeFormState,
    session: &Session,
) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, spec) in fields.iter().enumerate() {
        let is_selected = offset + i == state.selected_field;
        let (border_style, title_style) = if is_selected {
            (MedicalTheme::border_focused(), MedicalTheme::focused())
        } else {
            (MedicalTheme::border(), MedicalTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", spec.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let mut spans = vec![Span::raw(" ")];
        match (&state.edit_buffer, is_selected) {
            (Some(buffer), true) => {
                spans.push(Span::styled(buffer.clone(), MedicalTheme::text()));
                spans.push(Span::styled("▌", MedicalTheme::cursor()));
            }
            _ => {
                spans.push(Span::styled(
                    display_value(spec, session.record().get(spec.id), is_selected),
                    MedicalTheme::text(),
                ));
                if is_selected && !matches!(spec.kind, FieldKind::Coded { .. }) {
                    spans.push(Span::styled("▌", MedicalTheme::cursor()));
                }
            }
        }
        spans.push(Span::styled(
            format!("  {}", spec.hint),
            MedicalTheme::text_muted(),
        ));

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn display_value(spec: &FieldSpec, value: FieldValue, selected: bool) -> String {
    match value {
        FieldValue::Code(code) => {
            let label = spec.code_label(code).unwrap_or("?");
            if selected {
                format!("◀ {label} ▶")
            } else {
                label.to_string()
            }
        }
        other => other.to_string(),
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &IntakeFormState, session: &Session) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        let mut spans = vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Change option ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Run Cardiac Analysis ", MedicalTheme::key_desc()),
            Span::styled("[R] ", MedicalTheme::key_hint()),
            Span::styled("Reset ", MedicalTheme::key_desc()),
        ];
        if session.result().is_some() {
            spans.push(Span::styled("[Esc] ", MedicalTheme::key_hint()));
            spans.push(Span::styled("Back to result", MedicalTheme::key_desc()));
        }
        Line::from(spans)
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldId, Sex};

    fn select(state: &mut IntakeFormState, field: FieldId) {
        state.selected_field = FieldId::ALL
            .iter()
            .position(|id| *id == field)
            .expect("Should find field");
    }

    #[test]
    fn test_navigation_wraps() {
        let mut state = IntakeFormState::default();
        state.prev_field();
        assert_eq!(state.selected().id, FieldId::Thallium);
        state.next_field();
        assert_eq!(state.selected().id, FieldId::Age);
    }

    #[test]
    fn test_commit_valid_and_invalid_input() {
        let mut session = Session::new();
        let mut state = IntakeFormState::default();
        select(&mut state, FieldId::RestingBp);

        for c in "30".chars() {
            state.input_char(c);
        }
        assert!(state.commit(&mut session).is_err());
        assert_eq!(session.record().resting_bp, 180);
        assert!(state.error_message.is_some());
        assert_eq!(state.edit_buffer.as_deref(), Some("30"));

        state.delete_char();
        state.delete_char();
        for c in "132".chars() {
            state.input_char(c);
        }
        state.commit(&mut session).expect("Should commit");
        assert_eq!(session.record().resting_bp, 132);
        assert!(state.edit_buffer.is_none());
        assert!(state.error_message.is_none());
    }

    #[test]
    fn test_cycle_coded_field() {
        let mut session = Session::new();
        let mut state = IntakeFormState::default();
        select(&mut state, FieldId::Sex);

        state.input_char('7');
        assert!(state.edit_buffer.is_none());

        state.cycle(&mut session, true);
        assert_eq!(session.record().sex, Sex::Female);
        state.cycle(&mut session, false);
        assert_eq!(session.record().sex, Sex::Male);
    }
}
