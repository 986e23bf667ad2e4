//! The six GSX registers and the width-enforcing register file.

use crate::numeric::{round_to_f32, saturate_to_u32, saturate_to_u8};

/// One of the three general-purpose float registers addressable from
/// assembly mnemonics (`t`, `r`, `y`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeneralRegister {
    T,
    R,
    Y,
}

impl GeneralRegister {
    /// All three general registers, in the fixed enumeration order the
    /// opcode table builder iterates them in. Changing this order renames
    /// every generated opcode.
    pub const ALL: [GeneralRegister; 3] = [GeneralRegister::T, GeneralRegister::R, GeneralRegister::Y];

    /// The lowercase mnemonic letter for this register.
    pub fn letter(self) -> char {
        match self {
            GeneralRegister::T => 't',
            GeneralRegister::R => 'r',
            GeneralRegister::Y => 'y',
        }
    }

    /// The remaining two registers, in fixed enumeration order (the
    /// `other-two` function referenced in the design notes).
    pub fn other_two(self) -> (GeneralRegister, GeneralRegister) {
        let mut it = GeneralRegister::ALL.into_iter().filter(|&r| r != self);
        (it.next().unwrap(), it.next().unwrap())
    }

    /// Parse a single mnemonic letter back into a register.
    pub fn from_letter(c: char) -> Option<GeneralRegister> {
        match c {
            't' => Some(GeneralRegister::T),
            'r' => Some(GeneralRegister::R),
            'y' => Some(GeneralRegister::Y),
            _ => None,
        }
    }
}

/// Every addressable register, including the two pointer registers that
/// have no assembly-level mnemonic of their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegisterName {
    Pc,
    As,
    Js,
    T,
    R,
    Y,
}

impl From<GeneralRegister> for RegisterName {
    fn from(r: GeneralRegister) -> Self {
        match r {
            GeneralRegister::T => RegisterName::T,
            GeneralRegister::R => RegisterName::R,
            GeneralRegister::Y => RegisterName::Y,
        }
    }
}

/// Typed storage for all six registers, with a width-enforcing coercion on
/// every write (I1, I2).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RegisterFile {
    pc: u32,
    as_: u8,
    js: u8,
    t: f32,
    r: f32,
    y: f32,
}

/// The value stored in (or written to) a register. Integer registers only
/// ever hold whole numbers but are exposed as `f64` so `get`/`set` share one
/// signature across all six registers, matching the data model's "number"
/// framing.
pub type RegisterValue = f64;

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: RegisterName) -> RegisterValue {
        match name {
            RegisterName::Pc => self.pc as f64,
            RegisterName::As => self.as_ as f64,
            RegisterName::Js => self.js as f64,
            RegisterName::T => self.t as f64,
            RegisterName::R => self.r as f64,
            RegisterName::Y => self.y as f64,
        }
    }

    pub fn set(&mut self, name: RegisterName, value: RegisterValue) {
        match name {
            RegisterName::Pc => self.pc = saturate_to_u32(value),
            RegisterName::As => self.as_ = saturate_to_u8(value),
            RegisterName::Js => self.js = saturate_to_u8(value),
            RegisterName::T => self.t = round_to_f32(value),
            RegisterName::R => self.r = round_to_f32(value),
            RegisterName::Y => self.y = round_to_f32(value),
        }
    }

    pub fn get_general(&self, reg: GeneralRegister) -> f32 {
        match reg {
            GeneralRegister::T => self.t,
            GeneralRegister::R => self.r,
            GeneralRegister::Y => self.y,
        }
    }

    pub fn set_general(&mut self, reg: GeneralRegister, value: f32) {
        self.set(reg.into(), value as f64);
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn set_pc(&mut self, value: u32) {
        self.set(RegisterName::Pc, value as f64);
    }

    pub fn as_ptr(&self) -> u8 {
        self.as_
    }

    pub fn set_as_ptr(&mut self, value: u8) {
        self.set(RegisterName::As, value as f64);
    }

    pub fn js_ptr(&self) -> u8 {
        self.js
    }

    pub fn set_js_ptr(&mut self, value: u8) {
        self.set(RegisterName::Js, value as f64);
    }

    /// Zero every register (I2's "reset" half of the machine-state lifecycle).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pc_saturates_to_u32_bounds() {
        let mut regs = RegisterFile::new();
        regs.set(RegisterName::Pc, -1.0);
        assert_eq!(regs.pc(), 0);
        regs.set(RegisterName::Pc, u64::MAX as f64);
        assert_eq!(regs.pc(), u32::MAX);
    }

    #[test]
    fn as_and_js_saturate_to_u8_bounds() {
        let mut regs = RegisterFile::new();
        regs.set(RegisterName::As, 300.0);
        assert_eq!(regs.as_ptr(), 255);
        regs.set(RegisterName::Js, -10.0);
        assert_eq!(regs.js_ptr(), 0);
    }

    #[test]
    fn float_registers_round_to_f32() {
        let mut regs = RegisterFile::new();
        regs.set(RegisterName::T, 0.1f64);
        assert_eq!(regs.get(RegisterName::T), 0.1f32 as f64);
    }

    #[test]
    fn other_two_is_the_remaining_registers_in_enumeration_order() {
        assert_eq!(
            GeneralRegister::T.other_two(),
            (GeneralRegister::R, GeneralRegister::Y)
        );
        assert_eq!(
            GeneralRegister::R.other_two(),
            (GeneralRegister::T, GeneralRegister::Y)
        );
        assert_eq!(
            GeneralRegister::Y.other_two(),
            (GeneralRegister::T, GeneralRegister::R)
        );
    }

    #[test]
    fn reset_zeroes_every_register() {
        let mut regs = RegisterFile::new();
        regs.set(RegisterName::T, 5.0);
        regs.set(RegisterName::Pc, 5.0);
        regs.reset();
        assert_eq!(regs.get(RegisterName::T), 0.0);
        assert_eq!(regs.get(RegisterName::Pc), 0.0);
    }
}
