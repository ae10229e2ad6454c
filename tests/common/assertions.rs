//! Custom assertion macros

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

/// Assert that a backend result failed with the given `BackendError` variant
#[macro_export]
macro_rules! assert_backend_err {
    ($result:expr, $variant:ident) => {
        match $result {
            Err(standup::backend::BackendError::$variant { .. }) => {}
            Ok(value) => panic!("Expected {}, got Ok: {:?}", stringify!($variant), value),
            Err(e) => panic!("Expected {}, got: {:?}", stringify!($variant), e),
        }
    };
}

/// Assert that a JSON error body carries the expected status
#[macro_export]
macro_rules! assert_error_body {
    ($body:expr, $status:expr) => {
        assert_eq!($body["status"], $status, "unexpected error body: {}", $body);
        assert!($body["error"].is_string(), "error body without message: {}", $body);
    };
}
