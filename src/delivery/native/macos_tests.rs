use super::*;

#[test]
fn escape_maps_to_key_code_53() {
    let steps = crate::delivery::keystrokes::resume_sequence("continue");
    assert_eq!(script_for_step(&steps[0]), "key code 53");
}

#[test]
fn ctrl_u_maps_to_key_code_32_with_control() {
    let steps = crate::delivery::keystrokes::resume_sequence("continue");
    assert_eq!(script_for_step(&steps[1]), "key code 32 using control down");
}

#[test]
fn prompt_text_is_escaped_for_applescript_quoting() {
    let step = NudgeStep { bytes: b"say \"hi\"".to_vec(), delay_after: None };
    assert_eq!(script_for_step(&step), "keystroke \"say \\\"hi\\\"\"");
}

#[test]
fn return_maps_to_key_code_36() {
    let step = NudgeStep { bytes: b"\r".to_vec(), delay_after: None };
    assert_eq!(script_for_step(&step), "key code 36");
}
