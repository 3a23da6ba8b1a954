//! Trap service routines: the bridge between guest TRAP instructions and
//! host I/O. After a trap runs, execution continues at the instruction
//! following TRAP — traps never touch PC themselves.

use crate::error::LcError;
use crate::machine::Machine;
use crate::registers::Register::R0;
use crate::term::HostIo;
use crate::trap_vector::TrapVector;
use std::io;

/// Runs the service routine named by `vector` (the raw TRAP byte).
/// Returns `Err(LcError::UnknownTrapVector)` for anything outside
/// 0x20..=0x25.
pub(crate) fn dispatch<H: HostIo>(
    mut machine: Machine<H>,
    vector: u8,
) -> Result<Machine<H>, LcError> {
    let trap = TrapVector::decode(vector).ok_or(LcError::UnknownTrapVector(vector))?;

    match trap {
        // GETC - read a single character from the keyboard (blocking).
        // Not echoed. Zero-extended into R0. A stdin error surfaces as a
        // zero read rather than aborting the machine (spec's stdin-error
        // rule, distinct from stdout errors which are fatal).
        TrapVector::Getc => {
            let byte = machine.host.read_byte().unwrap_or(0);
            machine.registers.write(R0, u16::from(byte));
            machine.registers.update_flags(R0);
        }

        // OUT - write R0[7:0] to the console.
        TrapVector::Out => {
            let byte = machine.registers.read(R0) as u8;
            machine.host.write_byte(byte).map_err(LcError::HostIo)?;
            machine.host.flush().map_err(LcError::HostIo)?;
        }

        // PUTS - write consecutive words starting at R0 as one character
        // each, stopping at a 0x0000 terminator (or address wrap-around,
        // treated as an implicit terminator).
        TrapVector::Puts => {
            let mut address = machine.registers.read(R0);
            loop {
                let word = machine.memory.read(address, &mut machine.host);
                if word == 0 {
                    break;
                }
                machine
                    .host
                    .write_byte(word as u8)
                    .map_err(LcError::HostIo)?;
                if address == 0xFFFF {
                    break;
                }
                address = address.wrapping_add(1);
            }
            machine.host.flush().map_err(LcError::HostIo)?;
        }

        // IN - prompt, read one character (blocking), echo it, store into
        // R0. A stdin error surfaces as a zero read, same as GETC.
        TrapVector::In => {
            write_str(&mut machine.host, "Enter a character: ").map_err(LcError::HostIo)?;
            machine.host.flush().map_err(LcError::HostIo)?;

            let byte = machine.host.read_byte().unwrap_or(0);
            machine.host.write_byte(byte).map_err(LcError::HostIo)?;
            machine.host.flush().map_err(LcError::HostIo)?;

            machine.registers.write(R0, u16::from(byte));
            machine.registers.update_flags(R0);
        }

        // PUTSP - like PUTS, but packs two characters per word: low byte
        // first, then the high byte if it's non-zero. Terminates the same
        // way PUTS does.
        TrapVector::Putsp => {
            let mut address = machine.registers.read(R0);
            loop {
                let word = machine.memory.read(address, &mut machine.host);
                if word == 0 {
                    break;
                }

                let low = (word & 0xFF) as u8;
                let high = (word >> 8) as u8;

                machine.host.write_byte(low).map_err(LcError::HostIo)?;
                if high != 0 {
                    machine.host.write_byte(high).map_err(LcError::HostIo)?;
                }

                if address == 0xFFFF {
                    break;
                }
                address = address.wrapping_add(1);
            }
            machine.host.flush().map_err(LcError::HostIo)?;
        }

        // HALT - print a banner and stop the fetch/execute loop.
        TrapVector::Halt => {
            write_str(&mut machine.host, "\n--- halting the LC-3 ---\n").map_err(LcError::HostIo)?;
            machine.host.flush().map_err(LcError::HostIo)?;
            machine.running = false;
        }
    }

    Ok(machine)
}

fn write_str<H: HostIo>(host: &mut H, s: &str) -> io::Result<()> {
    for byte in s.bytes() {
        host.write_byte(byte)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::Machine;
    use crate::term::test_support::ScriptedIo;

    fn new_machine(input: &[u8]) -> Machine<ScriptedIo> {
        Machine::new(ScriptedIo::new(input))
    }

    #[test]
    fn getc_zero_extends_into_r0() {
        let machine = new_machine(&[b'A']);
        let machine = dispatch(machine, 0x20).unwrap();
        assert_eq!(machine.registers.read(R0), u16::from(b'A'));
    }

    #[test]
    fn out_writes_low_byte_of_r0() {
        let mut machine = new_machine(&[]);
        machine.registers.write(R0, u16::from(b'z'));
        let machine = dispatch(machine, 0x21).unwrap();

        assert_eq!(machine.host.output, vec![b'z']);
    }

    #[test]
    fn puts_stops_at_terminator() {
        let mut machine = new_machine(&[]);
        machine.registers.write(R0, 0x4000);
        machine.memory.write(0x4000, u16::from(b'H'));
        machine.memory.write(0x4001, u16::from(b'i'));
        machine.memory.write(0x4002, 0x0000);

        let machine = dispatch(machine, 0x22).unwrap();
        assert_eq!(machine.host.output, b"Hi");
    }

    #[test]
    fn putsp_packs_two_chars_per_word() {
        let mut machine = new_machine(&[]);
        machine.registers.write(R0, 0x4000);
        machine
            .memory
            .write(0x4000, u16::from_le_bytes([b'H', b'i']));
        machine.memory.write(0x4001, 0x0000);

        let machine = dispatch(machine, 0x24).unwrap();
        assert_eq!(machine.host.output, b"Hi");
    }

    #[test]
    fn putsp_skips_zero_high_byte_on_odd_length_string() {
        let mut machine = new_machine(&[]);
        machine.registers.write(R0, 0x4000);
        machine.memory.write(0x4000, u16::from(b'x')); // high byte is 0
        machine.memory.write(0x4001, 0x0000);

        let machine = dispatch(machine, 0x24).unwrap();
        assert_eq!(machine.host.output, b"x");
    }

    #[test]
    fn puts_stops_at_address_wrap_without_a_terminator() {
        let mut machine = new_machine(&[]);
        machine.registers.write(R0, 0xFFFF);
        machine.memory.write(0xFFFF, u16::from(b'!'));

        let machine = dispatch(machine, 0x22).unwrap();
        assert_eq!(machine.host.output, b"!");
    }

    #[test]
    fn in_echoes_and_stores_the_byte() {
        let machine = new_machine(&[b'q']);
        let machine = dispatch(machine, 0x23).unwrap();

        assert_eq!(machine.registers.read(R0), u16::from(b'q'));
        assert!(machine.host.output.ends_with(&[b'q']));
    }

    #[test]
    fn halt_clears_running() {
        let machine = new_machine(&[]);
        let machine = dispatch(machine, 0x25).unwrap();
        assert!(!machine.running);
    }

    #[test]
    fn unknown_vector_errors() {
        let machine = new_machine(&[]);
        let err = dispatch(machine, 0x7F).unwrap_err();
        assert!(matches!(err, LcError::UnknownTrapVector(0x7F)));
    }

    #[test]
    fn getc_surfaces_a_zero_read_on_stdin_error_instead_of_aborting() {
        use crate::term::test_support::ErroringIo;

        let machine = Machine::new(ErroringIo::new());
        let machine = dispatch(machine, 0x20).unwrap();

        assert_eq!(machine.registers.read(R0), 0);
        assert_eq!(machine.registers.cond, crate::flags::Condition::Z);
    }

    #[test]
    fn in_surfaces_a_zero_read_on_stdin_error_instead_of_aborting() {
        use crate::term::test_support::ErroringIo;

        let machine = Machine::new(ErroringIo::new());
        let machine = dispatch(machine, 0x23).unwrap();

        assert_eq!(machine.registers.read(R0), 0);
        assert_eq!(machine.registers.cond, crate::flags::Condition::Z);
    }
}
