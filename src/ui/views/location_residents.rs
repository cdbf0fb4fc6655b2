use crate::catalog::{CatalogClient, Character, Location};
use crate::query::{Query, QueryState};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{status_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::CharacterDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// A location and the characters living there
pub struct LocationResidentsView {
  location: Location,
  query: Query<Vec<Character>>,
  list_state: ListState,
}

impl LocationResidentsView {
  pub fn new(location: Location, client: CatalogClient) -> Self {
    let ids = location.resident_ids();
    let mut query = Query::new(move || {
      let client = client.clone();
      let ids = ids.clone();
      async move { client.fetch_characters(&ids).await }
    });

    query.fetch();

    Self {
      location,
      query,
      list_state: ListState::default(),
    }
  }

  fn residents(&self) -> &[Character] {
    self.query.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn render_summary(&self, frame: &mut Frame, area: Rect) {
    let l = &self.location;
    let lines = vec![
      Line::from(vec![
        Span::styled("Type       ", Style::default().fg(Color::DarkGray)),
        Span::raw(&l.location_type),
      ]),
      Line::from(vec![
        Span::styled("Dimension  ", Style::default().fg(Color::DarkGray)),
        Span::raw(&l.dimension),
      ]),
      Line::from(vec![
        Span::styled("Residents  ", Style::default().fg(Color::DarkGray)),
        Span::raw(l.residents.len().to_string()),
      ]),
    ];

    let block = Block::default()
      .title(format!(" {} ", l.name))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    frame.render_widget(Paragraph::new(lines).block(block), area);
  }

  fn render_residents(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.residents().len();
    ensure_valid_selection(&mut self.list_state, len);

    let title = match self.query.state() {
      QueryState::Loading => " Residents (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Residents (error: {}) ", e),
      _ => format!(" Residents ({}) ", len),
    };

    let block = Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if len == 0 {
      let (content, color) = if self.query.is_loading() {
        ("Loading residents...", Color::DarkGray)
      } else if self.query.error().is_some() {
        ("Failed to load residents. Press 'r' to retry.", Color::Red)
      } else {
        ("Nobody lives here.", Color::DarkGray)
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(color));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .residents()
      .iter()
      .map(|c| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:>4} ", c.id), Style::default().fg(Color::DarkGray)),
          Span::styled(format!("{:<28}", truncate(&c.name, 28)), Style::default().fg(Color::Cyan)),
          Span::styled(
            format!("{:<8}", truncate(&c.status, 8)),
            Style::default().fg(status_color(&c.status)),
          ),
          Span::raw(truncate(&c.species, 20)),
        ]))
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for LocationResidentsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => self.query.refetch(),
      KeyCode::Enter => {
        let selected = self
          .list_state
          .selected()
          .and_then(|idx| self.residents().get(idx));
        if let Some(character) = selected {
          return ViewAction::Push(Box::new(CharacterDetailView::new(character.clone())));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(5), Constraint::Min(1)])
      .split(area);

    self.render_summary(frame, chunks[0]);
    self.render_residents(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    self.location.name.clone()
  }

  fn context(&self) -> Option<String> {
    Some(self.location.dimension.clone())
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("Enter", "open").with_priority(10),
      ShortcutInfo::new("r", "refresh").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
