// src/macros.rs

/// Logs a line tagged with the component that emitted it.
/// Usage:
/// ```ignore
/// use log::Level;
/// clamtrack::clamtrack_log!(Level::Info, "store", "Database contains {} scans", 3);
/// ```
/// The `fern` dispatch installed by the binary adds timestamp, pid and tid, so
/// the line ends up as:
/// [2025-04-25T16:32:10+02:00][INFO ][clamtrack::db::store][pid=4568][tid=ThreadId(1)] [store] Database contains 3 scans
#[macro_export]
macro_rules! clamtrack_log {
    ($level:expr, $component:expr, $fmt:expr $(, $($arg:tt)+)?) => {
        log::log!(
            $level,
            concat!("[", $component, "] ", $fmt)
            $(, $($arg)+)?
        );
    };
}
