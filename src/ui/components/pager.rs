use ratatui::prelude::*;

/// Previous/next page navigation for a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
  pub current: u32,
  pub total: u32,
  /// Set while the list is loading or searching
  pub disabled: bool,
}

impl Pager {
  pub fn new(current: u32, total: u32, disabled: bool) -> Self {
    Self {
      current,
      total,
      disabled,
    }
  }

  pub fn previous(&self) -> Option<u32> {
    if self.disabled || self.current <= 1 {
      None
    } else {
      Some((self.current - 1).max(1))
    }
  }

  pub fn next(&self) -> Option<u32> {
    if self.disabled || self.current >= self.total {
      None
    } else {
      Some((self.current + 1).min(self.total))
    }
  }

  pub fn label(&self) -> String {
    format!("Page {} of {}", self.current, self.total.max(1))
  }

  /// `‹ Page X of Y ›` with arrows dimmed when unavailable
  pub fn line(&self) -> Line<'static> {
    let arrow = |enabled: bool, s: &'static str| {
      let style = if enabled {
        Style::default().fg(Color::Cyan)
      } else {
        Style::default().fg(Color::DarkGray)
      };
      Span::styled(s, style)
    };

    Line::from(vec![
      arrow(self.previous().is_some(), "‹ "),
      Span::raw(self.label()),
      arrow(self.next().is_some(), " ›"),
    ])
  }
}
