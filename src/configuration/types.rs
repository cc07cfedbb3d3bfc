/// What the host's active session handler reports about itself.
///
/// Consumed by the backend selector in `auto` mode and by the Redis adapter
/// as a last-resort connection-string source. Supplied by configuration
/// introspection, not computed here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerProbe {
    /// Name of the active session save handler (e.g. "redis", "apcu").
    pub save_handler: Option<String>,
    /// The handler's save path, usable as a Redis connection string.
    pub save_path: Option<String>,
}
