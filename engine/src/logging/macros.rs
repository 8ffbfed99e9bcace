/// Emit a `tracing` event under `$scope` if the scope table lets it through.
#[macro_export]
macro_rules! scoped_log {
    ($level:ident, $scope:expr, $($arg:tt)*) => {
        if $crate::logging::log_config().enabled($scope, $crate::logging::Level::$level) {
            ::tracing::event!($crate::logging::Level::$level, scope = $scope, $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! scene_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "scene", $($arg)*)
    };
}

#[macro_export]
macro_rules! raycast_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "raycast", $($arg)*)
    };
}

#[macro_export]
macro_rules! navigation_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "navigation", $($arg)*)
    };
}

#[macro_export]
macro_rules! input_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "input", $($arg)*)
    };
}
