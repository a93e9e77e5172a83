use serial_test::serial;

use super::*;

struct RecordingNotifier {
    messages: std::sync::Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn notify_delivery_failed(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[test]
fn noop_notifier_does_not_panic() {
    let notifier = NoopNotifier;
    notifier.notify_delivery_failed("manual intervention needed");
}

#[test]
fn custom_notifier_records_message() {
    let notifier = RecordingNotifier { messages: std::sync::Mutex::new(Vec::new()) };
    notifier.notify_delivery_failed("all tiers exhausted");
    assert_eq!(notifier.messages.lock().unwrap().as_slice(), ["all tiers exhausted"]);
}

#[test]
#[serial]
fn select_falls_back_to_noop_without_a_display() {
    std::env::remove_var("DISPLAY");
    std::env::remove_var("WAYLAND_DISPLAY");
    assert!(!display_available());
}
