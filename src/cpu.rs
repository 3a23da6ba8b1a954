use crate::error::LcError;
use crate::flags::Condition;
use crate::instruction::Instruction;
use crate::machine::Machine;
use crate::registers::Register::*;
use crate::sign_extend::SignExtend;
use crate::term::HostIo;
use crate::trap;

/// Runs one decoded instruction against `machine`, consuming and
/// returning it (matching the fetch/decode step, which already advanced
/// PC before this is called). Returns `Err` only for the two fatal
/// opcodes (RTI, RES) and an unrecognized TRAP vector — every other
/// opcode always succeeds, since address and register arithmetic wraps
/// rather than faults.
pub fn execute<H: HostIo>(
    mut machine: Machine<H>,
    instruction: Instruction,
) -> Result<Machine<H>, LcError> {
    match instruction {
        // BR - Conditional Branch
        //
        // Assembler Formats
        //
        //      BRn     LABEL   BRzp    LABEL
        //      BRz     LABEL   BRnp    LABEL
        //      BRp     LABEL   BRnz    LABEL
        //      BR[1]   LABEL   BRnzp   LABEL
        //
        // Description
        //
        // The condition codes specified by the state of bits [11:9] are tested. If any of the
        // condition codes tested is set, the program branches to the location specified by
        // adding the sign-extended PCoffset9 field to the incremented PC.
        //
        // [1]: The assembly language opcode BR is interpreted the same as BRnzp; that is, always
        // branch to the target address.
        Instruction::Br(mask, pc_offset) => {
            let cond = machine.registers.cond;
            let taken = (mask.n && cond == Condition::N)
                || (mask.z && cond == Condition::Z)
                || (mask.p && cond == Condition::P);

            if taken {
                machine.registers.pc =
                    machine.registers.pc.wrapping_add(pc_offset.sign_extend(9));
            }
        }

        // ADD - Addition
        //
        // Assembler Formats
        //
        //      ADD DR, SR1, SR2
        //      ADD DR, SR1, imm5
        //
        // Description
        //
        // The second source operand (SR2, or the sign-extended imm5) is added to the contents
        // of SR1 and the result stored in DR. The condition codes are set based on the result.
        Instruction::Add(dr, sr1, sr2) => {
            let value = machine
                .registers
                .read(sr1)
                .wrapping_add(machine.registers.read(sr2));

            machine.registers.write(dr, value);
            machine.registers.update_flags(dr);
        }
        Instruction::AddImm(dr, sr1, imm5) => {
            let value = machine.registers.read(sr1).wrapping_add(imm5);

            machine.registers.write(dr, value);
            machine.registers.update_flags(dr);
        }

        // LD - Load
        //
        // An address is computed by sign-extending bits [8:0] to 16 bits and adding this value to
        // the incremented PC. The contents of memory at this address are loaded into DR.
        Instruction::Ld(dr, pc_offset) => {
            let address = machine.registers.pc.wrapping_add(pc_offset.sign_extend(9));
            let value = machine.memory.read(address, &mut machine.host);

            machine.registers.write(dr, value);
            machine.registers.update_flags(dr);
        }

        // ST - Store
        //
        // The contents of SR are stored in the memory location whose address is computed by
        // sign-extending bits [8:0] to 16 bits and adding this value to the incremented PC.
        Instruction::St(sr, pc_offset) => {
            let address = machine.registers.pc.wrapping_add(pc_offset.sign_extend(9));
            let value = machine.registers.read(sr);

            machine.memory.write(address, value);
        }

        // JSR - Jump to Subroutine
        // JSRR
        //
        // The incremented PC is saved in R7. Then the PC is loaded with the address of the first
        // instruction of the subroutine: from BaseR (JSRR), or by sign-extending bits [10:0] and
        // adding to the incremented PC (JSR).
        Instruction::Jsr(pc_offset) => {
            let return_address = machine.registers.pc;
            machine.registers.pc = machine.registers.pc.wrapping_add(pc_offset.sign_extend(11));
            machine.registers.write(R7, return_address);
        }
        Instruction::Jsrr(base_r) => {
            let return_address = machine.registers.pc;
            machine.registers.pc = machine.registers.read(base_r);
            machine.registers.write(R7, return_address);
        }

        // AND - Bit-wise Logical AND
        //
        // The second source operand (SR2, or the sign-extended imm5) and the contents of SR1 are
        // bit-wise ANDed, and the result stored in DR. The condition codes are set based on the
        // result.
        Instruction::And(dr, sr1, sr2) => {
            let value = machine.registers.read(sr1) & machine.registers.read(sr2);

            machine.registers.write(dr, value);
            machine.registers.update_flags(dr);
        }
        Instruction::AndImm(dr, sr1, imm5) => {
            let value = machine.registers.read(sr1) & imm5;

            machine.registers.write(dr, value);
            machine.registers.update_flags(dr);
        }

        // LDR - Load Base+offset
        //
        // An address is computed by sign-extending bits [5:0] to 16 bits and adding this value to
        // the contents of BaseR. The contents of memory at this address are loaded into DR.
        Instruction::Ldr(dr, base_r, offset) => {
            let address = machine
                .registers
                .read(base_r)
                .wrapping_add(offset.sign_extend(6));
            let value = machine.memory.read(address, &mut machine.host);

            machine.registers.write(dr, value);
            machine.registers.update_flags(dr);
        }

        // STR - Store Base+offset
        //
        // The contents of SR are stored in the memory location whose address is computed by
        // sign-extending bits [5:0] to 16 bits and adding this value to the contents of BaseR.
        Instruction::Str(sr, base_r, offset) => {
            let address = machine
                .registers
                .read(base_r)
                .wrapping_add(offset.sign_extend(6));
            let value = machine.registers.read(sr);

            machine.memory.write(address, value);
        }

        // RTI - Return from Interrupt
        //
        // Not implemented: this emulator never enters an interrupt/privileged mode, so RTI has no
        // valid context to return to. Fatal.
        Instruction::Rti(word) => return Err(LcError::IllegalInstruction(word)),

        // NOT - Bit-Wise Complement
        //
        // The bit-wise complement of the contents of SR is stored in DR. The condition codes are
        // set based on the result.
        Instruction::Not(dr, sr) => {
            let value = !machine.registers.read(sr);

            machine.registers.write(dr, value);
            machine.registers.update_flags(dr);
        }

        // LDI - Load Indirect
        //
        // An address is computed by sign-extending bits [8:0] to 16 bits and adding this value to
        // the incremented PC. What is stored in memory at this address is the address of the data
        // to be loaded into DR.
        Instruction::Ldi(dr, pc_offset) => {
            let pointer_address = machine.registers.pc.wrapping_add(pc_offset.sign_extend(9));
            let address = machine.memory.read(pointer_address, &mut machine.host);
            let value = machine.memory.read(address, &mut machine.host);

            machine.registers.write(dr, value);
            machine.registers.update_flags(dr);
        }

        // STI - Store Indirect
        //
        // Bits [8:0] are sign-extended to 16 bits and added to the incremented PC. What is in
        // memory at this address is the address of the location to which SR is stored.
        Instruction::Sti(sr, pc_offset) => {
            let pointer_address = machine.registers.pc.wrapping_add(pc_offset.sign_extend(9));
            let address = machine.memory.read(pointer_address, &mut machine.host);
            let value = machine.registers.read(sr);

            machine.memory.write(address, value);
        }

        // JMP - Jump
        // RET - Return from Subroutine (BaseR = R7)
        //
        // The program unconditionally jumps to the location specified by the contents of BaseR.
        Instruction::Jmp(base_r) => {
            machine.registers.pc = machine.registers.read(base_r);
        }

        // RES - Reserved opcode. Never assigned a meaning. Fatal.
        Instruction::Res(word) => return Err(LcError::IllegalInstruction(word)),

        // LEA - Load Effective Address
        //
        // An address is computed by sign-extending bits [8:0] to 16 bits and adding this value to
        // the incremented PC. This address itself (not memory at that address) is loaded into DR.
        Instruction::Lea(dr, pc_offset) => {
            let address = machine.registers.pc.wrapping_add(pc_offset.sign_extend(9));

            machine.registers.write(dr, address);
            machine.registers.update_flags(dr);
        }

        // TRAP - System Call
        //
        // R7 is loaded with the incremented PC, enabling a return to the instruction following
        // TRAP once the service routine completes. Control then transfers to the routine named by
        // the trap vector; per spec this emulator runs it inline rather than jumping through the
        // trap vector table, returning control to the next sequential instruction afterward.
        Instruction::Trap(vector) => {
            let return_address = machine.registers.pc;
            machine.registers.write(R7, return_address);
            machine = trap::dispatch(machine, vector)?;
        }
    }

    Ok(machine)
}
