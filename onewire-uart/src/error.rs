#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// UART transport errors
pub enum UartError<E> {
    /// Serial port errors.
    Serial(E),
    /// A data slot was sent but its echo never came back within the retry budget.
    NoEcho,
}

impl<E> From<E> for UartError<E> {
    fn from(value: E) -> Self {
        Self::Serial(value)
    }
}
