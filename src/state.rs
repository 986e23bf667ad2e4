//! Machine state: the register file, RAM, and the two fixed stack buffers.

use crate::registers::{RegisterFile, RegisterName};

/// RAM size: 3 MiB, fixed for the lifetime of a `MachineState`.
pub const RAM_SIZE: usize = 3 * 1024 * 1024;

/// Bytecode programs strictly smaller than this may run; anything at or
/// above this size is rejected with `RunError::ProgramTooLarge`.
pub const MAX_PROGRAM_SIZE: usize = RAM_SIZE;

const ARG_STACK_LEN: usize = 256;
const JUMP_STACK_LEN: usize = 256;

/// The full, long-lived state of one GSX machine: registers, RAM, and the
/// argument/jump stacks. Buffers are allocated once at construction with
/// fixed capacities and are never grown or resized.
pub struct MachineState {
    pub registers: RegisterFile,
    ram: Vec<u8>,
    arg_stack: [f32; ARG_STACK_LEN],
    jump_stack: [u32; JUMP_STACK_LEN],
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineState {
    pub fn new() -> Self {
        Self {
            registers: RegisterFile::new(),
            ram: vec![0u8; RAM_SIZE],
            arg_stack: [0.0; ARG_STACK_LEN],
            jump_stack: [0; JUMP_STACK_LEN],
        }
    }

    /// Zero every register and every RAM byte. The stack buffers are left
    /// untouched — only the pointer registers that address them are reset.
    /// This is intentional (see the design notes' open question), not an
    /// oversight.
    pub fn reset(&mut self) {
        self.registers.reset();
        self.ram.iter_mut().for_each(|b| *b = 0);
    }

    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    /// Read a signed byte from RAM (two's-complement interpretation).
    pub fn ram_get_i8(&self, addr: u32) -> i8 {
        self.ram[addr as usize] as i8
    }

    /// Write a signed byte to RAM.
    pub fn ram_set_i8(&mut self, addr: u32, value: i8) {
        self.ram[addr as usize] = value as u8;
    }

    /// Read a big-endian single-precision float starting at `addr`.
    pub fn ram_get_f32(&self, addr: u32) -> f32 {
        let i = addr as usize;
        let bytes = [self.ram[i], self.ram[i + 1], self.ram[i + 2], self.ram[i + 3]];
        crate::float_bytes::bytes_to_float(bytes)
    }

    /// Write a big-endian single-precision float starting at `addr`.
    pub fn ram_set_f32(&mut self, addr: u32, value: f32) {
        let bytes = crate::float_bytes::float_to_bytes(value);
        let i = addr as usize;
        self.ram[i..i + 4].copy_from_slice(&bytes);
    }

    /// Push `value` onto the argument stack at the current `AS` and
    /// increment `AS` (wrapping at the 8-bit saturation boundary).
    pub fn arg_push(&mut self, value: f32) {
        let as_ = self.registers.as_ptr();
        self.arg_stack[as_ as usize] = value;
        self.registers.set(RegisterName::As, as_ as f64 + 1.0);
    }

    /// Decrement `AS` and pop the value underneath it.
    pub fn arg_pop(&mut self) -> f32 {
        let as_ = self.registers.as_ptr();
        self.registers.set(RegisterName::As, as_ as f64 - 1.0);
        self.arg_stack[self.registers.as_ptr() as usize]
    }

    /// Push a return address onto the jump stack and increment `JS`.
    pub fn jump_push(&mut self, return_addr: u32) {
        let js = self.registers.js_ptr();
        self.jump_stack[js as usize] = return_addr;
        self.registers.set(RegisterName::Js, js as f64 + 1.0);
    }

    /// Decrement `JS` and pop the return address underneath it.
    pub fn jump_pop(&mut self) -> u32 {
        let js = self.registers.js_ptr();
        self.registers.set(RegisterName::Js, js as f64 - 1.0);
        self.jump_stack[self.registers.js_ptr() as usize]
    }

    /// Directly seed a jump-stack slot; used by tests and by callers that
    /// want to prime return addresses before calling `run`.
    pub fn set_jump_stack_slot(&mut self, index: usize, value: u32) {
        self.jump_stack[index] = value;
    }

    pub fn jump_stack_slot(&self, index: usize) -> u32 {
        self.jump_stack[index]
    }

    pub fn arg_stack_slot(&self, index: usize) -> f32 {
        self.arg_stack[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_zeroes_registers_and_ram_but_not_stacks() {
        let mut state = MachineState::new();
        state.ram_set_i8(0, 42);
        state.arg_stack[0] = 9.0;
        state.jump_stack[0] = 7;
        state.registers.set(RegisterName::T, 3.0);

        state.reset();

        assert_eq!(state.ram_get_i8(0), 0);
        assert_eq!(state.registers.get(RegisterName::T), 0.0);
        // Stack buffers are untouched by design.
        assert_eq!(state.arg_stack[0], 9.0);
        assert_eq!(state.jump_stack[0], 7);
    }

    #[test]
    fn ram_float_access_is_big_endian() {
        let mut state = MachineState::new();
        state.ram_set_f32(2, -8.58);
        assert_eq!(state.ram()[2], 0xC1);
        assert_eq!(state.ram_get_f32(2), -8.58f32);
    }

    #[test]
    fn arg_stack_push_pop_round_trips() {
        let mut state = MachineState::new();
        state.arg_push(1.5);
        state.arg_push(2.5);
        assert_eq!(state.arg_pop(), 2.5);
        assert_eq!(state.arg_pop(), 1.5);
    }

    #[test]
    fn jump_stack_push_pop_round_trips() {
        let mut state = MachineState::new();
        state.jump_push(100);
        state.jump_push(200);
        assert_eq!(state.jump_pop(), 200);
        assert_eq!(state.jump_pop(), 100);
    }

    #[test]
    fn arg_pointer_wraps_at_eight_bits() {
        let mut state = MachineState::new();
        state.registers.set_as_ptr(255);
        state.arg_push(1.0);
        assert_eq!(state.registers.as_ptr(), 0);
    }
}
