//! Property-based check that assembling a decimal literal and running it
//! leaves the target register holding exactly the rounded value the literal
//! denotes, for any finite f32.

use gsx_vm::registers::{GeneralRegister, RegisterName};
use gsx_vm::{MachineState, run, translate};

#[quickcheck_macros::quickcheck]
fn decimal_literal_assembles_to_its_rounded_value(x: f32) -> bool {
    if !x.is_finite() {
        return true;
    }
    // `{:?}` always prints a fractional part (e.g. "3.0"), which keeps this
    // on the float-constant path regardless of whether `x` happens to be a
    // whole number.
    let source = format!("new t = {x:?}");
    let (bytes, errors) = translate(&source);
    if !errors.is_empty() {
        return false;
    }

    let mut state = MachineState::new();
    if run(&bytes, &mut state).is_err() {
        return false;
    }

    let expected = x as f64 as f32; // the same coercion RegisterFile::set applies
    let actual = state.registers.get_general(GeneralRegister::T);
    actual == expected || (actual.is_nan() && expected.is_nan())
}

#[test]
fn whole_number_decimal_literal_still_uses_the_float_opcode() {
    let (bytes, errors) = translate("new r = 12.0");
    assert!(errors.is_empty());
    assert_eq!(bytes.len(), 5);
    assert_eq!(bytes[0], 4);

    let mut state = MachineState::new();
    run(&bytes, &mut state).unwrap();
    assert_eq!(state.registers.get(RegisterName::R), 12.0);
}
