use packrat_logger::{Logger, LoggerError};
use serial_test::serial;

#[test]
#[serial]
fn second_init_reports_existing_subscriber() {
    let _logger = Logger::builder("first").init().expect("first init succeeds");

    let err = Logger::builder("second").init().unwrap_err();
    assert!(matches!(err, LoggerError::Subscriber(_)));
}
