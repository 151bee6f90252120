/// UART transport failure, tagged with the operation that failed.
#[derive(Debug)]
pub enum UartError<E> {
    /// Bringing the port up or down failed.
    Init(E),
    /// A full-duplex byte exchange failed.
    Exchange(E),
    /// The port rejected a baud-rate change.
    Baudrate(E),
}
