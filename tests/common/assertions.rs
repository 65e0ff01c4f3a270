//! Custom assertion macros
//!
//! Enhanced assertions with descriptive failure messages.

/// Assert that a result is ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a result is an error, optionally of a given shape
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        assert!($result.is_err(), "Expected Err, got Ok");
    };
    ($result:expr, $pattern:pat) => {
        match $result {
            Err($pattern) => {}
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => panic!("Expected different error variant, got: {:?}", e),
        }
    };
}

/// Assert that a state is clean or dirty
#[macro_export]
macro_rules! assert_status {
    ($state:expr, $status:ident) => {
        assert_eq!(
            wifiwidget::reversible::ReversibleState::status(&$state),
            wifiwidget::reversible::SyncStatus::$status,
            "unexpected status for '{}'",
            wifiwidget::reversible::ReversibleState::name(&$state)
        );
    };
}
