/// What a component did with a key.
///
/// Views chain components with `or_else`, trying the next handler on
/// `NotHandled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Consumed, nothing for the parent to do
  Handled,
  /// Consumed, parent should react to the event
  Event(T),
  /// Not consumed
  NotHandled,
}
