use crate::session::Session;
use crate::ui::components::{InputResult, TextInput};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
  Email,
  Password,
}

/// Email and password form shown until a session exists
pub struct LoginView {
  session: Session,
  email: TextInput,
  password: TextInput,
  focus: Focus,
  error: Option<String>,
}

impl LoginView {
  pub fn new(session: Session) -> Self {
    Self {
      session,
      email: TextInput::new(),
      password: TextInput::masked(),
      focus: Focus::Email,
      error: None,
    }
  }

  fn submit(&mut self) -> ViewAction {
    match self.session.login(self.email.value(), self.password.value()) {
      Ok(()) => {
        self.password.clear();
        ViewAction::Authenticated
      }
      Err(e) => {
        self.error = Some(e.to_string());
        ViewAction::None
      }
    }
  }

  fn toggle_focus(&mut self) {
    self.focus = match self.focus {
      Focus::Email => Focus::Password,
      Focus::Password => Focus::Email,
    };
  }

  fn field_line<'a>(&self, label: &'a str, input: &TextInput, focused: bool) -> Line<'a> {
    let label_style = if focused {
      Style::default().fg(Color::Yellow).bold()
    } else {
      Style::default().fg(Color::DarkGray)
    };

    let mut spans = vec![
      Span::styled(format!("{:>10}: ", label), label_style),
      Span::raw(input.display()),
    ];
    if focused {
      spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
  }
}

impl View for LoginView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        self.toggle_focus();
        return ViewAction::None;
      }
      KeyCode::Esc => return ViewAction::Quit,
      _ => {}
    }

    let input = match self.focus {
      Focus::Email => &mut self.email,
      Focus::Password => &mut self.password,
    };

    match input.handle_key(key) {
      InputResult::Submitted(_) if self.focus == Focus::Email => {
        self.focus = Focus::Password;
        ViewAction::None
      }
      InputResult::Submitted(_) => self.submit(),
      InputResult::Changed => {
        self.error = None;
        ViewAction::None
      }
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let width = 56.min(area.width);
    let height = 9.min(area.height);
    let form_area = Rect::new(
      area.x + area.width.saturating_sub(width) / 2,
      area.y + area.height.saturating_sub(height) / 2,
      width,
      height,
    );

    let block = Block::default()
      .title(" Sign in ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Green));

    let inner = block.inner(form_area);
    frame.render_widget(block, form_area);

    let mut lines = vec![
      Line::default(),
      self.field_line("Email", &self.email, self.focus == Focus::Email),
      self.field_line("Password", &self.password, self.focus == Focus::Password),
      Line::default(),
    ];

    match &self.error {
      Some(error) => lines.push(Line::styled(
        format!(" {}", error),
        Style::default().fg(Color::Red),
      )),
      None => lines.push(Line::styled(
        " Any valid email and a 6+ character password",
        Style::default().fg(Color::DarkGray),
      )),
    }

    frame.render_widget(Paragraph::new(lines), inner);
  }

  fn breadcrumb_label(&self) -> String {
    "Login".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("Tab", "switch field").with_priority(10),
      ShortcutInfo::new("Enter", "sign in").with_priority(20),
      ShortcutInfo::new("Esc", "quit").with_priority(90),
    ]
  }
}
