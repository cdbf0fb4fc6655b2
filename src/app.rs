use crate::cache::TtlCache;
use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::prefs::{KeyValueStore, SqliteStore};
use crate::session::Session;
use crate::ui::renderfns::{draw_footer, draw_header};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{CatalogView, LoginView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const TICK_RATE: Duration = Duration::from_millis(100);

/// Long-lived services shared by every view
#[derive(Clone)]
pub struct AppContext {
  pub config: Config,
  pub client: CatalogClient,
  pub cache: TtlCache,
  pub store: Arc<dyn KeyValueStore>,
  pub session: Session,
}

impl AppContext {
  pub fn new(config: Config, store: Arc<dyn KeyValueStore>) -> Result<Self> {
    let client = CatalogClient::new(&config)?;

    let mut cache = TtlCache::new(config.cache_ttl());
    if let Some(max) = config.cache.max_entries {
      cache = cache.with_max_entries(max);
    }

    Ok(Self {
      session: Session::new(store.clone()),
      config,
      client,
      cache,
      store,
    })
  }
}

/// Main application state
pub struct App {
  ctx: AppContext,
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open()?);
    Ok(Self::with_context(AppContext::new(config, store)?))
  }

  fn with_context(ctx: AppContext) -> Self {
    let root = Self::root_view(&ctx);
    Self {
      ctx,
      view_stack: vec![root],
      should_quit: false,
    }
  }

  fn root_view(ctx: &AppContext) -> Box<dyn View> {
    if ctx.session.is_authenticated() {
      Box::new(CatalogView::new(ctx, ctx.config.start_view))
    } else {
      Box::new(LoginView::new(ctx.session.clone()))
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(TICK_RATE);

    let result = self.event_loop(&mut terminal, &mut events).await;

    // Restore the terminal even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(
    &mut self,
    terminal: &mut Terminal<B>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick | Event::Resize => {}
    }
    // Timers must advance even while keys keep arriving
    self.tick();
  }

  /// Views below the top keep running so lists settle behind detail views
  fn tick(&mut self) {
    for view in &mut self.view_stack {
      view.tick();
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::Quit,
    };
    self.apply(action);
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => {
        debug!(view = %view.breadcrumb_label(), "push view");
        self.view_stack.push(view);
      }
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::Authenticated => {
        self.view_stack = vec![Box::new(CatalogView::new(
          &self.ctx,
          self.ctx.config.start_view,
        ))];
      }
      ViewAction::Logout => {
        // Stop the list controllers before wiping what they persist to
        for view in &mut self.view_stack {
          view.dispose();
        }
        self.view_stack.clear();
        self.ctx.session.logout();
        self.ctx.cache.clear();
        info!("session ended");
        self.view_stack.push(Box::new(LoginView::new(self.ctx.session.clone())));
      }
      ViewAction::Quit => self.should_quit = true,
    }
  }

  fn draw(&mut self, frame: &mut Frame) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Header
        Constraint::Min(1),    // Main content
        Constraint::Length(1), // Breadcrumb
      ])
      .split(frame.area());

    let breadcrumb: Vec<String> = self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect();

    if let Some(view) = self.view_stack.last_mut() {
      let context = view.context();
      let shortcuts = view.shortcuts();
      draw_header(
        frame,
        chunks[0],
        &self.ctx.config.api_url,
        context.as_deref(),
        &shortcuts,
      );
      view.render(frame, chunks[1]);
    }

    draw_footer(frame, chunks[2], &breadcrumb);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::prefs::MemoryStore;
  use ratatui::backend::TestBackend;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn app(store: Arc<MemoryStore>) -> App {
    let ctx = AppContext::new(Config::default(), store).unwrap();
    App::with_context(ctx)
  }

  fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
      app.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[tokio::test]
  async fn test_login_then_logout() {
    let store = Arc::new(MemoryStore::new());
    let mut app = app(store.clone());
    assert_eq!(app.view_stack[0].breadcrumb_label(), "Login");

    type_str(&mut app, "morty@smith.com");
    app.handle_key(key(KeyCode::Enter));
    type_str(&mut app, "jessica123");
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(app.view_stack.len(), 1);
    assert_eq!(app.view_stack[0].breadcrumb_label(), "Characters");
    assert!(store.get("token").unwrap().is_some());

    app.handle_key(key(KeyCode::Char('L')));
    assert_eq!(app.view_stack[0].breadcrumb_label(), "Login");
    assert!(store.get("token").unwrap().is_none());
    assert!(app.ctx.cache.is_empty());
  }

  #[tokio::test]
  async fn test_existing_token_skips_login() {
    let store = Arc::new(MemoryStore::new());
    store.set("token", "abc").unwrap();
    let app = app(store);
    assert_eq!(app.view_stack[0].breadcrumb_label(), "Characters");
  }

  #[tokio::test]
  async fn test_ctrl_c_quits() {
    let mut app = app(Arc::new(MemoryStore::new()));
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn test_draws_login_screen() {
    let mut app = app(Arc::new(MemoryStore::new()));
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
    terminal.draw(|frame| app.draw(frame)).unwrap();

    let buffer = terminal.backend().buffer();
    let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
    assert!(text.contains("Sign in"));
    assert!(text.contains("rickandmortyapi.com"));
  }
}
