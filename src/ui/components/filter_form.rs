use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::catalog::{FieldInput, FieldSpec, FilterPatch, FilterSet, ResourceKind};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by the filter form that the parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterFormEvent {
  /// A field was edited; apply right away
  Changed(FilterPatch),
  /// Form closed
  Closed,
}

#[derive(Debug, Clone)]
enum Editor {
  Text(TextInput),
  Select {
    options: &'static [&'static str],
    index: usize,
  },
}

impl Editor {
  fn for_field(spec: &FieldSpec, value: &str) -> Self {
    match spec.input {
      FieldInput::Text => {
        let mut input = TextInput::new();
        input.set_value(value);
        Editor::Text(input)
      }
      FieldInput::Select(options) => Editor::Select {
        options,
        index: options
          .iter()
          .position(|o| o.eq_ignore_ascii_case(value))
          .unwrap_or(0),
      },
    }
  }

  fn value(&self) -> String {
    match self {
      Editor::Text(input) => input.value().to_string(),
      Editor::Select { options, index } => options.get(*index).copied().unwrap_or("").to_string(),
    }
  }
}

/// Overlay form editing every filter field of one resource kind.
///
/// Every edit is emitted immediately; debouncing free-text fields is the
/// list controller's job, not the form's.
#[derive(Debug, Clone)]
pub struct FilterForm {
  kind: ResourceKind,
  active: bool,
  editors: Vec<Editor>,
  focused: usize,
}

impl FilterForm {
  pub fn new(kind: ResourceKind) -> Self {
    let filters = FilterSet::for_kind(kind);
    Self {
      kind,
      active: false,
      editors: Self::editors(kind, &filters),
      focused: 0,
    }
  }

  fn editors(kind: ResourceKind, filters: &FilterSet) -> Vec<Editor> {
    kind
      .fields()
      .iter()
      .map(|spec| Editor::for_field(spec, filters.get(spec.name)))
      .collect()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show the form, starting from the controller's live filters
  pub fn open(&mut self, filters: &FilterSet) {
    self.editors = Self::editors(self.kind, filters);
    self.focused = 0;
    self.active = true;
  }

  pub fn close(&mut self) {
    self.active = false;
  }

  fn focused_spec(&self) -> Option<&'static FieldSpec> {
    self.kind.fields().get(self.focused)
  }

  fn focus(&mut self, delta: isize) {
    let len = self.editors.len() as isize;
    if len > 0 {
      self.focused = (self.focused as isize + delta).rem_euclid(len) as usize;
    }
  }

  fn changed(&self) -> KeyResult<FilterFormEvent> {
    match (self.focused_spec(), self.editors.get(self.focused)) {
      (Some(spec), Some(editor)) => KeyResult::Event(FilterFormEvent::Changed(
        FilterPatch::new().set(spec.name, editor.value()),
      )),
      _ => KeyResult::Handled,
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FilterFormEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Enter => {
        self.close();
        return KeyResult::Event(FilterFormEvent::Closed);
      }
      KeyCode::Tab | KeyCode::Down => {
        self.focus(1);
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus(-1);
        return KeyResult::Handled;
      }
      _ => {}
    }

    let Some(editor) = self.editors.get_mut(self.focused) else {
      return KeyResult::Handled;
    };

    match editor {
      Editor::Text(input) => match input.handle_key(key) {
        InputResult::Changed => self.changed(),
        _ => KeyResult::Handled,
      },
      Editor::Select { options, index } => {
        let len = options.len();
        match key.code {
          KeyCode::Left | KeyCode::Char('h') if len > 0 => {
            *index = (*index + len - 1) % len;
            self.changed()
          }
          KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') if len > 0 => {
            *index = (*index + 1) % len;
            self.changed()
          }
          _ => KeyResult::Handled,
        }
      }
    }
  }

  /// Render the form overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (area.width * 60 / 100).clamp(30, 60).min(area.width);
    let height = (self.editors.len() as u16 + 4).min(area.height);
    let overlay_area = Rect::new(area.x + 1, area.y + 1, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" Filter {} ", self.kind.label()));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let mut lines: Vec<Line> = self
      .kind
      .fields()
      .iter()
      .zip(&self.editors)
      .enumerate()
      .map(|(i, (spec, editor))| {
        let focused = i == self.focused;
        let label_style = if focused {
          Style::default().fg(Color::Yellow).bold()
        } else {
          Style::default().fg(Color::DarkGray)
        };

        let mut spans = vec![Span::styled(format!("{:>10}: ", spec.label), label_style)];
        match editor {
          Editor::Text(input) => {
            spans.push(Span::raw(input.display()));
            if focused {
              spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
            }
          }
          Editor::Select { .. } => {
            let value = editor.value();
            let shown = if value.is_empty() { "Any".to_string() } else { value };
            spans.push(Span::styled(
              format!("< {} >", shown),
              Style::default().fg(Color::Cyan),
            ));
          }
        }
        Line::from(spans)
      })
      .collect();

    lines.push(Line::default());
    lines.push(Line::styled(
      " Tab:next field  </>:cycle option  Enter/Esc:close",
      Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(lines), inner);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn patch(result: KeyResult<FilterFormEvent>) -> Vec<(String, String)> {
    match result {
      KeyResult::Event(FilterFormEvent::Changed(p)) => p
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
      other => panic!("expected a change, got {:?}", other),
    }
  }

  #[test]
  fn test_inactive_form_ignores_keys() {
    let mut form = FilterForm::new(ResourceKind::Characters);
    assert_eq!(form.handle_key(key(KeyCode::Char('x'))), KeyResult::NotHandled);
  }

  #[test]
  fn test_typing_emits_each_edit() {
    let mut form = FilterForm::new(ResourceKind::Characters);
    form.open(&FilterSet::for_kind(ResourceKind::Characters));

    form.handle_key(key(KeyCode::Char('R')));
    let change = patch(form.handle_key(key(KeyCode::Char('i'))));
    assert_eq!(change, vec![("name".to_string(), "Ri".to_string())]);
  }

  #[test]
  fn test_select_cycles_options() {
    let mut form = FilterForm::new(ResourceKind::Characters);
    let mut filters = FilterSet::for_kind(ResourceKind::Characters);
    filters.set("status", "dead");
    form.open(&filters);

    // name -> status
    form.handle_key(key(KeyCode::Tab));
    let change = patch(form.handle_key(key(KeyCode::Right)));
    assert_eq!(change, vec![("status".to_string(), "unknown".to_string())]);

    // Wraps back to "any"
    let change = patch(form.handle_key(key(KeyCode::Right)));
    assert_eq!(change, vec![("status".to_string(), String::new())]);
  }

  #[test]
  fn test_close_keys() {
    let mut form = FilterForm::new(ResourceKind::Locations);
    form.open(&FilterSet::for_kind(ResourceKind::Locations));
    assert_eq!(
      form.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(FilterFormEvent::Closed)
    );
    assert!(!form.is_active());
  }

  #[test]
  fn test_focus_wraps() {
    let mut form = FilterForm::new(ResourceKind::Locations);
    form.open(&FilterSet::for_kind(ResourceKind::Locations));
    form.handle_key(key(KeyCode::Up));
    let change = patch(form.handle_key(key(KeyCode::Char('C'))));
    assert_eq!(change, vec![("dimension".to_string(), "C".to_string())]);
  }
}
