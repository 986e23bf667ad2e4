//! The fetch/advance/dispatch loop.

use crate::error::RunError;
use crate::opcodes::{ArithOp, Instruction, opcode_table};
use crate::registers::RegisterName;
use crate::state::{MAX_PROGRAM_SIZE, MachineState};

/// `PC` lands here on natural termination or `exit`: larger than any legal
/// program size, so the fetch loop stops on the next iteration.
const TERMINATED_PC: u32 = u32::MAX;

/// Execute `bytecode` against `state` until the program terminates.
///
/// Termination happens when `PC` reaches or exceeds `bytecode.len()`
/// (running off the end) or a handler sets `PC` to [`TERMINATED_PC`]
/// (`exit` with an empty jump stack). All other conditions proceed without
/// error: saturating writes, silent float rounding, IEEE-754 division
/// semantics, and 8-bit stack-pointer wraparound are by design, not bugs.
pub fn run(bytecode: &[u8], state: &mut MachineState) -> Result<(), RunError> {
    if bytecode.len() >= MAX_PROGRAM_SIZE {
        return Err(RunError::ProgramTooLarge {
            size: bytecode.len(),
            limit: MAX_PROGRAM_SIZE,
        });
    }

    let table = opcode_table();

    while (state.registers.pc() as usize) < bytecode.len() {
        let pc = state.registers.pc();
        let opcode = bytecode[pc as usize];
        state.registers.set_pc(pc + 1);

        let instruction = table.instruction(opcode);
        dispatch(instruction, state, bytecode);
    }

    Ok(())
}

fn dispatch(instruction: Instruction, state: &mut MachineState, bytecode: &[u8]) {
    match instruction {
        Instruction::ByteConst(reg) => {
            let pc = state.registers.pc();
            let value = bytecode[pc as usize] as i8;
            state.registers.set_general(reg, value as f32);
            state.registers.set_pc(pc + 1);
        }
        Instruction::FloatConst(reg) => {
            let pc = state.registers.pc() as usize;
            let bytes = [bytecode[pc], bytecode[pc + 1], bytecode[pc + 2], bytecode[pc + 3]];
            let value = crate::float_bytes::bytes_to_float(bytes);
            state.registers.set_general(reg, value);
            state.registers.set_pc(pc as u32 + 4);
        }
        Instruction::Exit => exit(state),
        Instruction::Run(reg) => {
            let return_addr = state.registers.pc() + 1;
            state.jump_push(return_addr);
            let target = state.registers.get_general(reg);
            state.registers.set(RegisterName::Pc, target as f64);
        }
        Instruction::Push(reg) => {
            let value = state.registers.get_general(reg);
            state.arg_push(value);
        }
        Instruction::Pop(reg) => {
            let value = state.arg_pop();
            state.registers.set_general(reg, value);
        }
        Instruction::MemReadByte { dst, addr } => {
            let address = state.registers.get_general(addr) as u32;
            let value = state.ram_get_i8(address);
            state.registers.set_general(dst, value as f32);
        }
        Instruction::MemReadFloat { dst, addr } => {
            let address = state.registers.get_general(addr) as u32;
            let value = state.ram_get_f32(address);
            state.registers.set_general(dst, value);
        }
        Instruction::MemWriteByte { addr, src } => {
            let address = state.registers.get_general(addr) as u32;
            let value = state.registers.get_general(src);
            state.ram_set_i8(address, crate::numeric::saturate_to_u8(value as f64) as i8);
        }
        Instruction::MemWriteFloat { addr, src } => {
            let address = state.registers.get_general(addr) as u32;
            let value = state.registers.get_general(src);
            state.ram_set_f32(address, value);
        }
        Instruction::Arith { op, target, lhs, rhs } => {
            let l = state.registers.get_general(lhs) as f64;
            let r = state.registers.get_general(rhs) as f64;
            let result = match op {
                ArithOp::Add => l + r,
                ArithOp::Sub => l - r,
                ArithOp::Mul => l * r,
                ArithOp::Div => l / r,
            };
            state.registers.set_general(target, result as f32);
        }
        Instruction::Undefined => exit(state),
    }
}

/// Terminate if the jump stack is empty, otherwise return to the caller.
/// Shared by `Exit` and `Undefined`, which are documented to behave
/// identically (see `Instruction::Undefined`).
fn exit(state: &mut MachineState) {
    if state.registers.js_ptr() == 0 {
        state.registers.set_pc(TERMINATED_PC);
    } else {
        let return_addr = state.jump_pop();
        state.registers.set_pc(return_addr);
    }
}
