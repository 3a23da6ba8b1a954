use crate::cpu::execute;
use crate::error::LcError;
use crate::instruction::Instruction;
use crate::memory::Memory;
use crate::registers::Registers;
use crate::term::HostIo;

/// Memory + register file + the halt flag, plus the host I/O adapter the
/// trap dispatcher and the keyboard-status read need. Generic over the
/// host adapter so tests can plug in a scripted fake instead of a real
/// terminal. Owns everything the executor touches for one instruction;
/// nothing here is global, so tests can build as many independent
/// `Machine`s as they like.
pub struct Machine<H: HostIo> {
    pub memory: Memory,
    pub registers: Registers,
    pub running: bool,
    pub host: H,
}

impl<H: HostIo> Machine<H> {
    /// Boots a fresh machine: R0..R7 = 0, PC = 0x3000, COND = Z, running.
    pub fn new(host: H) -> Self {
        Machine {
            memory: Memory::new(),
            registers: Registers::new(),
            running: true,
            host,
        }
    }

    /// Copies `words` into memory starting at `origin` (see
    /// `Memory::load_image` for the truncation rule).
    pub fn load_image(&mut self, origin: u16, words: &[u16]) {
        self.memory.load_image(origin, words);
    }

    /// One fetch-decode-execute cycle: read the word at PC, advance PC,
    /// decode, dispatch. Consumes and returns `self` to match the
    /// executor's by-value style; `?` on a fatal error drops the machine.
    pub fn step(mut self) -> Result<Self, LcError> {
        let word = self.memory.read(self.registers.pc, &mut self.host);
        self.registers.pc = self.registers.pc.wrapping_add(1);

        let instruction = Instruction::decode(word);
        execute(self, instruction)
    }

    /// Runs cycles until `running` goes false (HALT) or a fatal error
    /// occurs.
    pub fn run(mut self) -> Result<Self, LcError> {
        while self.running {
            self = self.step()?;
        }
        Ok(self)
    }
}
