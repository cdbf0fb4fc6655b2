mod filter_form;
mod input;
mod pager;

pub use filter_form::{FilterForm, FilterFormEvent};
pub use input::{InputResult, TextInput};
pub use pager::Pager;

/// Generic result type for component key handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Key was consumed, no event for parent to handle
  Handled,
  /// Key was consumed, here's an event for parent to process
  Event(T),
  /// Key was not consumed, parent should try next handler
  NotHandled,
}
