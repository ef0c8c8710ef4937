/// What a player tells its host, in emission order:
///
/// * `pause` fires `ResponsesHidden` then `TextChanged`.
/// * `advance` fires `ResponsesHidden` first, then `TextChanged` once the next
///   state is bound.
/// * a revealed character fires `CharacterPrinted`, then `ResponsesReady` when
///   it completes the text, then `TextChanged` at the end of the tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The displayed text, prefix included.
    TextChanged(String),
    ResponsesHidden,
    /// Response texts bound to the host's slots by index.
    ResponsesReady(Vec<String>),
    CharacterPrinted(char),
}

pub trait PlayerListener {
    fn notify(&mut self, notification: &Notification);
}

impl<F> PlayerListener for F
where
    F: FnMut(&Notification),
{
    fn notify(&mut self, notification: &Notification) {
        self(notification)
    }
}
