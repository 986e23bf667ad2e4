//! The 256-entry opcode dispatch table and mnemonic dictionary.
//!
//! `build()` runs the 17-step ordering algorithm from the component design
//! exactly once; the result is memoized behind [`opcode_table`] so every
//! caller shares the same read-only table (see SPEC_FULL.md §5 —
//! `std::sync::OnceLock` is this crate's idiomatic stand-in for the
//! `lazy_static` pattern other emulators in the example pool reach for).
//!
//! The dispatch table stores an [`Instruction`] per opcode rather than a
//! function pointer: each variant names the register operands and, for
//! arithmetic, the operator. The interpreter's dispatch is then a single
//! `match` over the fetched instruction (see `crate::interpreter`).

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::registers::GeneralRegister as Reg;

/// One of the four binary arithmetic operators opcodes 46–105 implement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// The effect of one opcode, as built by the 17-step ordering algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Opcodes 0–2: read a signed byte immediate into T/R/Y.
    ByteConst(Reg),
    /// Opcodes 3–5: read a big-endian f32 immediate into T/R/Y.
    FloatConst(Reg),
    Exit,
    Run(Reg),
    Push(Reg),
    Pop(Reg),
    MemReadByte { dst: Reg, addr: Reg },
    MemReadFloat { dst: Reg, addr: Reg },
    MemWriteByte { addr: Reg, src: Reg },
    MemWriteFloat { addr: Reg, src: Reg },
    Arith {
        op: ArithOp,
        target: Reg,
        lhs: Reg,
        rhs: Reg,
    },
    /// An opcode byte with no defined effect. The assembler built into this
    /// crate never emits one; if malformed bytecode reaches it anyway it
    /// behaves like `Exit`, matching the "no sandbox against malformed
    /// bytecode" non-goal.
    Undefined,
}

/// Opcodes 0–5 are reserved for the six constant-load forms and have no
/// keyable mnemonic.
pub const RESERVED_OPCODES: u8 = 6;

/// Number of opcodes the 17-step algorithm actually defines, reserved
/// constant loads included. See SPEC_FULL.md's opcode-numbering addendum
/// for why this is 106 rather than the 256 the table is physically sized
/// to hold.
pub const DEFINED_OPCODE_COUNT: usize = 106;

/// Physical size of the dispatch table — every opcode byte (0–255) is a
/// valid index.
pub const TABLE_SIZE: usize = 256;

/// The dispatch table and the mnemonic dictionary built from it. Built once
/// and immutable thereafter (see [`opcode_table`]).
pub struct OpcodeTable {
    instructions: [Instruction; TABLE_SIZE],
    mnemonics: HashMap<String, u8>,
}

impl OpcodeTable {
    /// The instruction stored at `opcode`.
    pub fn instruction(&self, opcode: u8) -> Instruction {
        self.instructions[opcode as usize]
    }

    /// Look up a normalized mnemonic, returning its opcode if keyable.
    pub fn lookup_mnemonic(&self, key: &str) -> Option<u8> {
        self.mnemonics.get(key).copied()
    }

    /// Number of distinct mnemonic keys in the dictionary.
    pub fn mnemonic_count(&self) -> usize {
        self.mnemonics.len()
    }
}

/// Return the process-wide opcode table, building it on first access.
pub fn opcode_table() -> &'static OpcodeTable {
    static TABLE: OnceLock<OpcodeTable> = OnceLock::new();
    TABLE.get_or_init(build)
}

struct Builder {
    instructions: [Instruction; TABLE_SIZE],
    mnemonics: HashMap<String, u8>,
    next: u8,
}

impl Builder {
    fn new() -> Self {
        Self {
            instructions: [Instruction::Undefined; TABLE_SIZE],
            mnemonics: HashMap::new(),
            next: 0,
        }
    }

    /// Append `instr` to the table, bumping the opcode counter. Used for
    /// the reserved constant-load slots, which have no keyable mnemonic.
    fn reserve(&mut self, instr: Instruction) -> u8 {
        let opcode = self.next;
        self.instructions[opcode as usize] = instr;
        self.next = self
            .next
            .checked_add(1)
            .expect("opcode table overflowed 256 entries");
        opcode
    }

    /// Append `instr` and register every mnemonic in `keys` against its
    /// opcode. Panics on a duplicate key — the 17-step algorithm must never
    /// produce one; a collision means the builder itself is wrong.
    fn define(&mut self, instr: Instruction, keys: &[String]) -> u8 {
        let opcode = self.reserve(instr);
        for key in keys {
            let previous = self.mnemonics.insert(key.clone(), opcode);
            assert!(previous.is_none(), "duplicate mnemonic key: {key}");
        }
        opcode
    }
}

fn new_eq(target: Reg, rhs: &str) -> String {
    format!("new{}={}", target.letter(), rhs)
}

/// Run the 17-step ordering algorithm from §4.5. The order here is
/// load-bearing: reordering any loop changes which opcode a mnemonic maps
/// to.
fn build() -> OpcodeTable {
    let mut b = Builder::new();

    // Step 1 (opcodes 0-5): constant loads, no keyable mnemonic.
    for r in Reg::ALL {
        b.reserve(Instruction::ByteConst(r));
    }
    for r in Reg::ALL {
        b.reserve(Instruction::FloatConst(r));
    }

    // Step 2 (opcode 6): exit.
    b.define(Instruction::Exit, &["exit".to_string()]);

    // Step 3: run <reg>.
    for r in Reg::ALL {
        b.define(Instruction::Run(r), &[format!("run{}", r.letter())]);
    }

    // Step 4: push <reg>.
    for r in Reg::ALL {
        b.define(Instruction::Push(r), &[format!("push{}", r.letter())]);
    }

    // Step 5: new <reg> = pop.
    for r in Reg::ALL {
        b.define(Instruction::Pop(r), &[new_eq(r, "pop")]);
    }

    // Step 6: memory reads, byte then float, every ordered (vreg, areg) pair.
    for v in Reg::ALL {
        for a in Reg::ALL {
            let key = new_eq(v, &format!("ram[{}]byte", a.letter()));
            b.define(Instruction::MemReadByte { dst: v, addr: a }, &[key]);
        }
    }
    for v in Reg::ALL {
        for a in Reg::ALL {
            let key = new_eq(v, &format!("ram[{}]float", a.letter()));
            b.define(Instruction::MemReadFloat { dst: v, addr: a }, &[key]);
        }
    }

    // Step 7: memory writes, byte then float, vreg != areg.
    for v in Reg::ALL {
        for a in Reg::ALL {
            if v == a {
                continue;
            }
            let key = format!("newram[{}]byte={}", a.letter(), v.letter());
            b.define(Instruction::MemWriteByte { addr: a, src: v }, &[key]);
        }
    }
    for v in Reg::ALL {
        for a in Reg::ALL {
            if v == a {
                continue;
            }
            let key = format!("newram[{}]float={}", a.letter(), v.letter());
            b.define(Instruction::MemWriteFloat { addr: a, src: v }, &[key]);
        }
    }

    // Step 8: three-register addition. Both operand orderings share one
    // opcode.
    for x in Reg::ALL {
        let (a, c) = x.other_two();
        let keys = vec![
            new_eq(x, &format!("{}+{}", a.letter(), c.letter())),
            new_eq(x, &format!("{}+{}", c.letter(), a.letter())),
        ];
        b.define(
            Instruction::Arith {
                op: ArithOp::Add,
                target: x,
                lhs: a,
                rhs: c,
            },
            &keys,
        );
    }

    // Step 9: self-double, three synonymous mnemonics per opcode.
    for x in Reg::ALL {
        let keys = vec![
            new_eq(x, &format!("{}+{}", x.letter(), x.letter())),
            new_eq(x, &format!("2*{}", x.letter())),
            new_eq(x, &format!("{}*2", x.letter())),
        ];
        b.define(
            Instruction::Arith {
                op: ArithOp::Add,
                target: x,
                lhs: x,
                rhs: x,
            },
            &keys,
        );
    }

    // Step 10: register plus other, both orderings share one opcode.
    for target in Reg::ALL {
        for other in Reg::ALL {
            if other == target {
                continue;
            }
            let keys = vec![
                new_eq(target, &format!("{}+{}", target.letter(), other.letter())),
                new_eq(target, &format!("{}+{}", other.letter(), target.letter())),
            ];
            b.define(
                Instruction::Arith {
                    op: ArithOp::Add,
                    target,
                    lhs: target,
                    rhs: other,
                },
                &keys,
            );
        }
    }

    // Step 11: three-register multiplication, symmetric like step 8.
    for x in Reg::ALL {
        let (a, c) = x.other_two();
        let keys = vec![
            new_eq(x, &format!("{}*{}", a.letter(), c.letter())),
            new_eq(x, &format!("{}*{}", c.letter(), a.letter())),
        ];
        b.define(
            Instruction::Arith {
                op: ArithOp::Mul,
                target: x,
                lhs: a,
                rhs: c,
            },
            &keys,
        );
    }

    // Step 12: self-square, two mnemonics per opcode.
    for x in Reg::ALL {
        let keys = vec![
            new_eq(x, &format!("{}*{}", x.letter(), x.letter())),
            new_eq(x, &format!("{}^2", x.letter())),
        ];
        b.define(
            Instruction::Arith {
                op: ArithOp::Mul,
                target: x,
                lhs: x,
                rhs: x,
            },
            &keys,
        );
    }

    // Step 13: register times other, symmetric like step 10.
    for target in Reg::ALL {
        for other in Reg::ALL {
            if other == target {
                continue;
            }
            let keys = vec![
                new_eq(target, &format!("{}*{}", target.letter(), other.letter())),
                new_eq(target, &format!("{}*{}", other.letter(), target.letter())),
            ];
            b.define(
                Instruction::Arith {
                    op: ArithOp::Mul,
                    target,
                    lhs: target,
                    rhs: other,
                },
                &keys,
            );
        }
    }

    // Step 14: subtraction, three-operand. Unlike addition/multiplication,
    // each operand ordering gets its own opcode.
    for x in Reg::ALL {
        let (a, c) = x.other_two();
        b.define(
            Instruction::Arith {
                op: ArithOp::Sub,
                target: x,
                lhs: a,
                rhs: c,
            },
            &[new_eq(x, &format!("{}-{}", a.letter(), c.letter()))],
        );
        b.define(
            Instruction::Arith {
                op: ArithOp::Sub,
                target: x,
                lhs: c,
                rhs: a,
            },
            &[new_eq(x, &format!("{}-{}", c.letter(), a.letter()))],
        );
    }

    // Step 15: subtraction, target-in-operand. Four opcodes per target.
    for x in Reg::ALL {
        let (a, c) = x.other_two();
        b.define(
            Instruction::Arith {
                op: ArithOp::Sub,
                target: x,
                lhs: x,
                rhs: a,
            },
            &[new_eq(x, &format!("{}-{}", x.letter(), a.letter()))],
        );
        b.define(
            Instruction::Arith {
                op: ArithOp::Sub,
                target: x,
                lhs: x,
                rhs: c,
            },
            &[new_eq(x, &format!("{}-{}", x.letter(), c.letter()))],
        );
        b.define(
            Instruction::Arith {
                op: ArithOp::Sub,
                target: x,
                lhs: a,
                rhs: x,
            },
            &[new_eq(x, &format!("{}-{}", a.letter(), x.letter()))],
        );
        b.define(
            Instruction::Arith {
                op: ArithOp::Sub,
                target: x,
                lhs: c,
                rhs: x,
            },
            &[new_eq(x, &format!("{}-{}", c.letter(), x.letter()))],
        );
    }

    // Step 16: division, three-operand. Same shape as step 14.
    for x in Reg::ALL {
        let (a, c) = x.other_two();
        b.define(
            Instruction::Arith {
                op: ArithOp::Div,
                target: x,
                lhs: a,
                rhs: c,
            },
            &[new_eq(x, &format!("{}/{}", a.letter(), c.letter()))],
        );
        b.define(
            Instruction::Arith {
                op: ArithOp::Div,
                target: x,
                lhs: c,
                rhs: a,
            },
            &[new_eq(x, &format!("{}/{}", c.letter(), a.letter()))],
        );
    }

    // Step 17: division, target-in-operand. Same shape as step 15.
    for x in Reg::ALL {
        let (a, c) = x.other_two();
        b.define(
            Instruction::Arith {
                op: ArithOp::Div,
                target: x,
                lhs: x,
                rhs: a,
            },
            &[new_eq(x, &format!("{}/{}", x.letter(), a.letter()))],
        );
        b.define(
            Instruction::Arith {
                op: ArithOp::Div,
                target: x,
                lhs: x,
                rhs: c,
            },
            &[new_eq(x, &format!("{}/{}", x.letter(), c.letter()))],
        );
        b.define(
            Instruction::Arith {
                op: ArithOp::Div,
                target: x,
                lhs: a,
                rhs: x,
            },
            &[new_eq(x, &format!("{}/{}", a.letter(), x.letter()))],
        );
        b.define(
            Instruction::Arith {
                op: ArithOp::Div,
                target: x,
                lhs: c,
                rhs: x,
            },
            &[new_eq(x, &format!("{}/{}", c.letter(), x.letter()))],
        );
    }

    debug_assert_eq!(b.next as usize, DEFINED_OPCODE_COUNT);

    OpcodeTable {
        instructions: b.instructions,
        mnemonics: b.mnemonics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_always_256_entries() {
        let table = opcode_table();
        assert_eq!(table.instructions.len(), TABLE_SIZE);
    }

    #[test]
    fn constant_loads_occupy_opcodes_zero_through_five_in_order() {
        let table = opcode_table();
        assert_eq!(table.instruction(0), Instruction::ByteConst(Reg::T));
        assert_eq!(table.instruction(1), Instruction::ByteConst(Reg::R));
        assert_eq!(table.instruction(2), Instruction::ByteConst(Reg::Y));
        assert_eq!(table.instruction(3), Instruction::FloatConst(Reg::T));
        assert_eq!(table.instruction(4), Instruction::FloatConst(Reg::R));
        assert_eq!(table.instruction(5), Instruction::FloatConst(Reg::Y));
    }

    #[test]
    fn exit_is_opcode_six() {
        assert_eq!(opcode_table().instruction(6), Instruction::Exit);
        assert_eq!(opcode_table().lookup_mnemonic("exit"), Some(6));
    }

    #[test]
    fn opcodes_beyond_defined_range_are_undefined() {
        let table = opcode_table();
        assert_eq!(
            table.instruction((DEFINED_OPCODE_COUNT) as u8),
            Instruction::Undefined
        );
        assert_eq!(table.instruction(255), Instruction::Undefined);
    }

    #[test]
    fn mnemonic_dictionary_has_the_expected_size() {
        // See SPEC_FULL.md's opcode-numbering addendum: with only three
        // addressable registers the 17-step algorithm yields 127 distinct
        // mnemonic keys over 106 defined opcodes, not the 250/256 figures
        // the distilled spec's aggregate invariants quote.
        assert_eq!(opcode_table().mnemonic_count(), 127);
    }

    #[test]
    fn commutative_synonyms_map_to_the_same_opcode() {
        let table = opcode_table();
        let a = table.lookup_mnemonic("newt=r+y").unwrap();
        let b = table.lookup_mnemonic("newt=y+r").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn noncommutative_orderings_map_to_different_opcodes() {
        let table = opcode_table();
        let a = table.lookup_mnemonic("newt=r-y").unwrap();
        let b = table.lookup_mnemonic("newt=y-r").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn self_double_has_three_synonyms() {
        let table = opcode_table();
        let a = table.lookup_mnemonic("newt=t+t").unwrap();
        let c = table.lookup_mnemonic("newt=2*t").unwrap();
        let d = table.lookup_mnemonic("newt=t*2").unwrap();
        assert_eq!(a, c);
        assert_eq!(c, d);
    }

    #[test]
    fn memory_write_excludes_self_pairs() {
        let table = opcode_table();
        assert!(table.lookup_mnemonic("newram[t]byte=t").is_none());
        assert!(table.lookup_mnemonic("newram[t]byte=r").is_some());
    }
}
