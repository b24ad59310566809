/// DSL macro for building test histories.
///
/// Produces `Vec<OperationHistory<u64>>`, one inner vector per thread.
///
/// # Syntax
///
/// ```ignore
/// history! {
///     [fail(3, 5), ok(1, 2), ok(7, 9)],   // thread 0
///     [ok(2, 7), fail(7, 8)],             // thread 1
/// }
/// ```
///
/// - `ok(from, to)`   → `CasOperation::succeeded(from, to)`
/// - `fail(from, to)` → `CasOperation::failed(from, to)`
///
/// Build a single operation.
#[macro_export]
macro_rules! cas {
    (ok($from:expr, $to:expr)) => {
        cascheck_core::history::CasOperation::<u64>::succeeded($from, $to)
    };
    (fail($from:expr, $to:expr)) => {
        cascheck_core::history::CasOperation::<u64>::failed($from, $to)
    };
}

/// Build a flat list of operations, ignoring threads.
#[macro_export]
macro_rules! operations {
    ($($kind:ident($($args:tt)*)),* $(,)?) => {
        vec![$($crate::cas!($kind($($args)*))),*]
    };
}

/// Build a multi-thread history.
#[macro_export]
macro_rules! history {
    ($([$($kind:ident($($args:tt)*)),* $(,)?]),* $(,)?) => {
        vec![$(
            $crate::operations![$($kind($($args)*)),*]
        ),*]
    };
}
