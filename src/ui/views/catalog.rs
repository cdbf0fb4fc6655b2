use crate::app::AppContext;
use crate::cache::TtlCache;
use crate::catalog::{
  CatalogClient, Entity, FilterPatch, PageSource, ResourceKind,
};
use crate::controller::{ListController, Timings};
use crate::prefs::{KeyValueStore, Preferences};
use crate::ui::components::{FilterForm, FilterFormEvent, KeyResult, Pager};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{status_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{CharacterDetailView, LocationResidentsView};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs};
use std::sync::Arc;

/// One tab: a list controller plus its selection and filter form
struct ListTab {
  controller: ListController,
  list_state: ListState,
  form: FilterForm,
}

/// Root view after login: characters and locations side by side in tabs
pub struct CatalogView {
  client: CatalogClient,
  tabs: Vec<ListTab>,
  active: usize,
}

impl CatalogView {
  pub fn new(ctx: &AppContext, start: ResourceKind) -> Self {
    let source: Arc<dyn PageSource> = Arc::new(ctx.client.clone());
    Self::with_source(
      ctx.client.clone(),
      source,
      ctx.cache.clone(),
      ctx.store.clone(),
      ctx.config.timings.to_timings(),
      start,
    )
  }

  fn with_source(
    client: CatalogClient,
    source: Arc<dyn PageSource>,
    cache: TtlCache,
    store: Arc<dyn KeyValueStore>,
    timings: Timings,
    start: ResourceKind,
  ) -> Self {
    let tabs = ResourceKind::ALL
      .iter()
      .map(|&kind| ListTab {
        controller: ListController::new(
          kind,
          source.clone(),
          cache.clone(),
          Preferences::new(store.clone(), kind),
          timings,
        ),
        list_state: ListState::default(),
        form: FilterForm::new(kind),
      })
      .collect();

    let active = ResourceKind::ALL
      .iter()
      .position(|k| *k == start)
      .unwrap_or(0);

    Self {
      client,
      tabs,
      active,
    }
  }

  fn tab(&self) -> &ListTab {
    &self.tabs[self.active]
  }

  fn tab_mut(&mut self) -> &mut ListTab {
    &mut self.tabs[self.active]
  }

  fn pager(&self) -> Pager {
    let ctrl = &self.tab().controller;
    Pager::new(ctrl.page(), ctrl.total_pages(), !ctrl.can_change_page())
  }

  fn go_to(&mut self, page: Option<u32>) {
    if let Some(page) = page {
      let tab = self.tab_mut();
      if tab.controller.set_page(page) {
        tab.list_state.select(Some(0));
      }
    }
  }

  fn open_selected(&self) -> ViewAction {
    let tab = self.tab();
    let Some(entity) = tab
      .list_state
      .selected()
      .and_then(|idx| tab.controller.items().get(idx))
    else {
      return ViewAction::None;
    };

    match entity {
      Entity::Character(c) => ViewAction::Push(Box::new(CharacterDetailView::new(c.clone()))),
      Entity::Location(l) => ViewAction::Push(Box::new(LocationResidentsView::new(
        l.clone(),
        self.client.clone(),
      ))),
    }
  }

  fn render_tabs(&self, frame: &mut Frame, area: Rect) {
    let titles: Vec<Line> = self
      .tabs
      .iter()
      .map(|t| Line::from(format!(" {} ", t.controller.kind().label())))
      .collect();

    let tabs = Tabs::new(titles)
      .select(self.active)
      .style(Style::default().fg(Color::DarkGray))
      .highlight_style(Style::default().fg(Color::Black).bg(Color::Green))
      .divider("│");
    frame.render_widget(tabs, area);
  }

  fn render_filter_summary(&self, frame: &mut Frame, area: Rect) {
    let ctrl = &self.tab().controller;
    let mut spans = vec![Span::styled(" Filters: ", Style::default().fg(Color::DarkGray))];

    let active: Vec<String> = ctrl
      .filters()
      .active()
      .map(|(field, value)| format!("{}={}", field, value))
      .collect();
    if active.is_empty() {
      spans.push(Span::styled("none", Style::default().fg(Color::DarkGray)));
    } else {
      spans.push(Span::styled(active.join("  "), Style::default().fg(Color::Yellow)));
    }

    if ctrl.is_searching() {
      spans.push(Span::styled("  searching...", Style::default().fg(Color::Cyan)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let tab = &mut self.tabs[self.active];
    let ctrl = &tab.controller;
    let kind = ctrl.kind();

    let title = if ctrl.is_loading() {
      format!(" {} (loading...) ", kind.label())
    } else {
      format!(" {} ({}) ", kind.label(), ctrl.total_results())
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if let Some(error) = ctrl.error() {
      let paragraph = Paragraph::new(format!("{}\n\nChange the filters or page to try again.", error))
        .block(block)
        .style(Style::default().fg(Color::Red));
      frame.render_widget(paragraph, area);
      return;
    }

    if ctrl.items().is_empty() {
      let content = if ctrl.is_loading() {
        format!("Loading {}...", kind)
      } else {
        format!("No {} to show.", kind)
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let dim = if ctrl.is_loading() {
      Modifier::DIM
    } else {
      Modifier::empty()
    };

    let items: Vec<ListItem> = ctrl.items().iter().map(entity_line).collect();
    let len = items.len();

    let list = List::new(items)
      .block(block)
      .style(Style::default().add_modifier(dim))
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    ensure_valid_selection(&mut tab.list_state, len);
    frame.render_stateful_widget(list, area, &mut tab.list_state);
  }
}

fn entity_line(entity: &Entity) -> ListItem<'static> {
  let line = match entity {
    Entity::Character(c) => Line::from(vec![
      Span::styled(format!("{:<28}", truncate(&c.name, 28)), Style::default().fg(Color::Cyan)),
      Span::raw(" "),
      Span::styled(
        format!("{:<8}", truncate(&c.status, 8)),
        Style::default().fg(status_color(&c.status)),
      ),
      Span::raw(" "),
      Span::raw(format!("{:<16}", truncate(&c.species, 16))),
      Span::raw(" "),
      Span::styled(truncate(&c.gender, 12), Style::default().fg(Color::DarkGray)),
    ]),
    Entity::Location(l) => Line::from(vec![
      Span::styled(format!("{:<28}", truncate(&l.name, 28)), Style::default().fg(Color::Cyan)),
      Span::raw(" "),
      Span::raw(format!("{:<16}", truncate(&l.location_type, 16))),
      Span::raw(" "),
      Span::raw(format!("{:<28}", truncate(&l.dimension, 28))),
      Span::styled(
        format!("{} residents", l.residents.len()),
        Style::default().fg(Color::DarkGray),
      ),
    ]),
  };
  ListItem::new(line)
}

impl View for CatalogView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // Open filter form gets every key first
    let tab = self.tab_mut();
    match tab.form.handle_key(key) {
      KeyResult::Event(FilterFormEvent::Changed(patch)) => {
        tab.controller.set_filters(patch);
        return ViewAction::None;
      }
      KeyResult::Event(FilterFormEvent::Closed) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Tab | KeyCode::BackTab => {
        self.active = (self.active + 1) % self.tabs.len();
      }
      KeyCode::Char('j') | KeyCode::Down => self.tab_mut().list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.tab_mut().list_state.select_previous(),
      KeyCode::Char('h') | KeyCode::Left => {
        let page = self.pager().previous();
        self.go_to(page);
      }
      KeyCode::Char('l') | KeyCode::Right => {
        let page = self.pager().next();
        self.go_to(page);
      }
      KeyCode::Char('/') => {
        let tab = self.tab_mut();
        let filters = tab.controller.filters().clone();
        tab.form.open(&filters);
      }
      KeyCode::Char('c') => {
        let tab = self.tab_mut();
        let kind = tab.controller.kind();
        tab.controller.set_filters(FilterPatch::clear(kind));
      }
      KeyCode::Enter => return self.open_selected(),
      KeyCode::Char('L') => return ViewAction::Logout,
      KeyCode::Char('q') => return ViewAction::Quit,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Tabs
        Constraint::Length(1), // Active filters
        Constraint::Min(1),    // List
        Constraint::Length(1), // Pagination
      ])
      .split(area);

    self.render_tabs(frame, chunks[0]);
    self.render_filter_summary(frame, chunks[1]);
    self.render_list(frame, chunks[2]);

    let pager = Paragraph::new(self.pager().line()).alignment(Alignment::Center);
    frame.render_widget(pager, chunks[3]);

    self.tab().form.render_overlay(frame, chunks[2]);
  }

  fn breadcrumb_label(&self) -> String {
    self.tab().controller.kind().label().to_string()
  }

  fn context(&self) -> Option<String> {
    Some(self.pager().label())
  }

  fn tick(&mut self) {
    for tab in &mut self.tabs {
      tab.controller.tick();
    }
  }

  fn dispose(&mut self) {
    for tab in &mut self.tabs {
      tab.form.close();
      tab.controller.dispose();
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if self.tab().form.is_active() {
      return vec![
        ShortcutInfo::new("Tab", "next field").with_priority(10),
        ShortcutInfo::new("Esc", "close").with_priority(20),
      ];
    }
    vec![
      ShortcutInfo::new("/", "filter").with_priority(10),
      ShortcutInfo::new("c", "clear").with_priority(20),
      ShortcutInfo::new("h/l", "page").with_priority(30),
      ShortcutInfo::new("Tab", "switch").with_priority(40),
      ShortcutInfo::new("L", "logout").with_priority(80),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}
