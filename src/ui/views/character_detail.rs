use crate::catalog::Character;
use crate::ui::renderfns::status_color;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Full record of one character
pub struct CharacterDetailView {
  character: Character,
}

impl CharacterDetailView {
  pub fn new(character: Character) -> Self {
    Self { character }
  }

  fn field<'a>(label: &'a str, value: &'a str) -> Line<'a> {
    let value = if value.is_empty() { "-" } else { value };
    Line::from(vec![
      Span::styled(format!("{:<10}", label), Style::default().fg(Color::DarkGray)),
      Span::raw(value),
    ])
  }
}

impl View for CharacterDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let c = &self.character;

    let block = Block::default()
      .title(format!(" {} ", c.name))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let created = c
      .created
      .map(|t| t.format("%Y-%m-%d").to_string())
      .unwrap_or_default();
    let episodes = c.episodes.len().to_string();

    let lines = vec![
      Line::from(vec![
        Span::styled(format!("{:<10}", "Status"), Style::default().fg(Color::DarkGray)),
        Span::styled(&c.status, Style::default().fg(status_color(&c.status)).bold()),
      ]),
      Self::field("Species", &c.species),
      Self::field("Type", &c.variant),
      Self::field("Gender", &c.gender),
      Self::field("Origin", &c.origin.name),
      Self::field("Location", &c.location.name),
      Self::field("Episodes", &episodes),
      Self::field("Created", &created),
      Line::default(),
      Self::field("Image", &c.image),
    ];

    let paragraph = Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.character.name.clone()
  }

  fn context(&self) -> Option<String> {
    Some(format!("#{}", self.character.id))
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![ShortcutInfo::new("q", "back")]
  }
}
