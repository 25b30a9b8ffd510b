/// Logs one line tagged with a component name.
///
/// The component becomes the record target, so the fern formatter set up in
/// `main.rs` prints it between the level and the message:
/// ```rust
/// use log::Level;
/// rpmsg_bind::rpmsg_log!(Level::Info, "bind", "endpoint {} created", "chrdev_virtio0");
/// ```
/// Logs like:
/// [2026-10-18T16:32:10+02:00][INFO ][bind][pid=4568] endpoint chrdev_virtio0 created
#[macro_export]
macro_rules! rpmsg_log {
    ($level:expr, $component:expr, $($arg:tt)+) => {
        ::log::log!(target: $component, $level, $($arg)+)
    };
}
