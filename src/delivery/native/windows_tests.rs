use super::*;

#[test]
fn escape_maps_to_sendkeys_token() {
    let steps = crate::delivery::keystrokes::resume_sequence("continue");
    assert_eq!(sendkeys_token(&steps[0]), "{ESC}");
}

#[test]
fn ctrl_u_maps_to_caret_u() {
    let steps = crate::delivery::keystrokes::resume_sequence("continue");
    assert_eq!(sendkeys_token(&steps[1]), "^u");
}

#[test]
fn enter_maps_to_enter_token() {
    let step = NudgeStep { bytes: b"\r".to_vec(), delay_after: None };
    assert_eq!(sendkeys_token(&step), "{ENTER}");
}
