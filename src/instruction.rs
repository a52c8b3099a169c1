use crate::error::Chip8Error;
use crate::opcode::Opcode;
use crate::operations::*;

/// A decoded instruction: its mnemonic and the operation that executes it.
#[derive(Copy, Clone)]
pub struct Instruction {
    pub mnemonic: &'static str,
    pub execute: Operation,
}

impl std::fmt::Debug for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic)
    }
}

/// Selects the correct Instruction for a given Opcode
pub fn from_op(op: Opcode) -> Result<Instruction, Chip8Error> {
    let (mnemonic, execute): (&'static str, Operation) = match op.nibbles() {
        (0x0, 0x0, 0xE, 0x0) => ("CLS", clr),
        (0x0, 0x0, 0xE, 0xE) => ("RET", rts),
        (0x1, ..) => ("JP", jump),
        (0x2, ..) => ("CALL", call),
        (0x3, ..) => ("SE", ske),
        (0x4, ..) => ("SNE", skne),
        (0x5, .., 0x0) => ("SE", skre),
        (0x6, ..) => ("LD", load),
        (0x7, ..) => ("ADD", add),
        (0x8, .., 0x0) => ("LD", mv),
        (0x8, .., 0x1) => ("OR", or),
        (0x8, .., 0x2) => ("AND", and),
        (0x8, .., 0x3) => ("XOR", xor),
        (0x8, .., 0x4) => ("ADD", addr),
        (0x8, .., 0x5) => ("SUB", sub),
        (0x8, .., 0x6) => ("SHR", shr),
        (0x8, .., 0x7) => ("SUBN", subn),
        (0x8, .., 0xE) => ("SHL", shl),
        (0x9, .., 0x0) => ("SNE", skrne),
        (0xA, ..) => ("LD I", loadi),
        (0xB, ..) => ("JP V0", jumpi),
        (0xC, ..) => ("RND", rnd),
        (0xD, ..) => ("DRW", draw),
        (0xE, _, 0x9, 0xE) => ("SKP", skpr),
        (0xE, _, 0xA, 0x1) => ("SKNP", skup),
        (0xF, _, 0x0, 0x7) => ("LD DT", moved),
        (0xF, _, 0x0, 0x8) => ("LD ST", moves),
        (0xF, _, 0x0, 0xA) => ("LD K", keyd),
        (0xF, _, 0x1, 0x5) => ("LD DT", loadd),
        (0xF, _, 0x1, 0x8) => ("LD ST", loads),
        (0xF, _, 0x1, 0xE) => ("ADD I", addi),
        (0xF, _, 0x2, 0x9) => ("LD F", ldspr),
        (0xF, _, 0x3, 0x3) => ("LD B", bcd),
        (0xF, _, 0x5, 0x5) => ("LD [I]", stor),
        (0xF, _, 0x6, 0x5) => ("LD Vx", read),
        _ => return Err(Chip8Error::UnknownOpcode { opcode: op.0 }),
    };
    Ok(Instruction { mnemonic, execute })
}

#[cfg(test)]
mod test_instruction {
    use super::*;
    use crate::config::Quirks;
    use crate::constants::STACK_DEPTH;
    use crate::keypad::Keypad;
    use crate::state::State;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run_with(
        op: u16,
        state: &State,
        keypad: &Keypad,
        quirks: Quirks,
    ) -> Result<State, Chip8Error> {
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = Context {
            keypad,
            rng: &mut rng,
            quirks,
        };
        let op = Opcode(op);
        (from_op(op)?.execute)(op, state, &mut ctx)
    }

    fn run(op: u16, state: &State) -> State {
        run_with(op, state, &Keypad::new(), Quirks::default()).unwrap()
    }

    #[test]
    fn test_decoding_is_total_and_deterministic() {
        for word in 0..=u16::MAX {
            let first = from_op(Opcode(word)).map(|i| i.mnemonic);
            let second = from_op(Opcode(word)).map(|i| i.mnemonic);
            assert_eq!(first, second);
            if let Err(err) = first {
                assert_eq!(err, Chip8Error::UnknownOpcode { opcode: word });
            }
        }
    }

    #[test]
    fn test_rejects_unknown_opcodes() {
        for &word in &[0x0000, 0x0123, 0x00E1, 0x5121, 0x8128, 0x912F, 0xE1A2, 0xF1FF] {
            assert_eq!(
                from_op(Opcode(word)).map(|i| i.mnemonic),
                Err(Chip8Error::UnknownOpcode { opcode: word })
            );
        }
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(from_op(Opcode(0xD125)).unwrap().mnemonic, "DRW");
        assert_eq!(from_op(Opcode(0x8124)).unwrap().mnemonic, "ADD");
        assert_eq!(from_op(Opcode(0xF10A)).unwrap().mnemonic, "LD K");
    }

    #[test]
    fn test_00e0_cls() {
        let mut state = State::new();
        state.frame_buffer.draw(0, 0, &[0xFF]);
        let state = run(0x00E0, &state);
        assert_eq!(state.frame_buffer.pixel_rows(), &[0; 32]);
        assert!(state.draw_flag);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_00ee_ret() {
        let mut state = State::new();
        state.sp = 0x1;
        state.stack[0] = 0x0ABC;
        let state = run(0x00EE, &state);
        assert_eq!(state.sp, 0x0);
        assert_eq!(state.pc, 0x0ABC);
    }

    #[test]
    fn test_00ee_ret_underflows() {
        let state = State::new();
        let result = run_with(0x00EE, &state, &Keypad::new(), Quirks::default());
        assert_eq!(result, Err(Chip8Error::StackUnderflow));
    }

    #[test]
    fn test_1nnn_jp() {
        let state = State::new();
        let state = run(0x1ABC, &state);
        assert_eq!(state.pc, 0x0ABC);
    }

    #[test]
    fn test_2nnn_call() {
        let mut state = State::new();
        state.pc = 0x0ABC;
        let state = run(0x2123, &state);
        assert_eq!(state.sp, 0x1);
        assert_eq!(state.stack[0], 0x0ABE);
        assert_eq!(state.pc, 0x0123);
    }

    #[test]
    fn test_2nnn_call_overflows() {
        let mut state = State::new();
        state.sp = STACK_DEPTH;
        let result = run_with(0x2123, &state, &Keypad::new(), Quirks::default());
        assert_eq!(
            result,
            Err(Chip8Error::StackOverflow { depth: STACK_DEPTH })
        );
    }

    #[test]
    fn test_3xkk_se_skips() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        let state = run(0x3111, &state);
        assert_eq!(state.pc, 0x0204);
    }

    #[test]
    fn test_3xkk_se_doesntskip() {
        let state = State::new();
        let state = run(0x3111, &state);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_4xkk_sne_skips() {
        let state = State::new();
        let state = run(0x4111, &state);
        assert_eq!(state.pc, 0x0204);
    }

    #[test]
    fn test_4xkk_sne_doesntskip() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        let state = run(0x4111, &state);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_5xy0_se_skips() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        state.v[0x2] = 0x11;
        let state = run(0x5120, &state);
        assert_eq!(state.pc, 0x0204);
    }

    #[test]
    fn test_5xy0_se_doesntskip() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        let state = run(0x5120, &state);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_6xkk_ld() {
        let state = State::new();
        let state = run(0x6122, &state);
        assert_eq!(state.v[0x1], 0x22);
    }

    #[test]
    fn test_7xkk_add_wraps_without_flag() {
        let mut state = State::new();
        state.v[0x1] = 0xFF;
        state.v[0xF] = 0x5;
        let state = run(0x7102, &state);
        assert_eq!(state.v[0x1], 0x01);
        assert_eq!(state.v[0xF], 0x5);
    }

    #[test]
    fn test_8xy0_ld() {
        let mut state = State::new();
        state.v[0x2] = 0x1;
        let state = run(0x8120, &state);
        assert_eq!(state.v[0x1], 0x1);
    }

    #[test]
    fn test_8xy1_or() {
        let mut state = State::new();
        state.v[0x1] = 0x6;
        state.v[0x2] = 0x3;
        let state = run(0x8121, &state);
        assert_eq!(state.v[0x1], 0x7);
    }

    #[test]
    fn test_8xy2_and() {
        let mut state = State::new();
        state.v[0x1] = 0x6;
        state.v[0x2] = 0x3;
        let state = run(0x8122, &state);
        assert_eq!(state.v[0x1], 0x2);
    }

    #[test]
    fn test_8xy3_xor() {
        let mut state = State::new();
        state.v[0x1] = 0x6;
        state.v[0x2] = 0x3;
        let state = run(0x8123, &state);
        assert_eq!(state.v[0x1], 0x5);
    }

    #[test]
    fn test_8xy4_add_flags_every_pair() {
        let mut state = State::new();
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                state.v[0x1] = a;
                state.v[0x2] = b;
                let next = run(0x8124, &state);
                assert_eq!(next.v[0x1], a.wrapping_add(b));
                assert_eq!(next.v[0xF], (u16::from(a) + u16::from(b) > 255) as u8);
            }
        }
    }

    #[test]
    fn test_8xy5_sub_flags_every_pair() {
        let mut state = State::new();
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                state.v[0x1] = a;
                state.v[0x2] = b;
                let next = run(0x8125, &state);
                assert_eq!(next.v[0x1], a.wrapping_sub(b));
                assert_eq!(next.v[0xF], (a >= b) as u8);
            }
        }
    }

    #[test]
    fn test_8xy7_subn_flags_every_pair() {
        let mut state = State::new();
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                state.v[0x1] = a;
                state.v[0x2] = b;
                let next = run(0x8127, &state);
                assert_eq!(next.v[0x1], b.wrapping_sub(a));
                assert_eq!(next.v[0xF], (b >= a) as u8);
            }
        }
    }

    #[test]
    fn test_8xy4_flag_wins_over_result_in_vf() {
        let mut state = State::new();
        state.v[0xF] = 0x01;
        state.v[0x1] = 0x02;
        let state = run(0x8F14, &state);
        // the sum 0x03 is discarded in favour of the carry flag
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xy6_shr_lsb() {
        let mut state = State::new();
        state.v[0x1] = 0x5;
        let state = run(0x8106, &state);
        assert_eq!(state.v[0x1], 0x2);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy6_shr_nolsb() {
        let mut state = State::new();
        state.v[0x1] = 0x4;
        let state = run(0x8106, &state);
        assert_eq!(state.v[0x1], 0x2);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xye_shl_msb() {
        let mut state = State::new();
        state.v[0x1] = 0xFF;
        let state = run(0x810E, &state);
        // 0xFF * 2 = 0x01FE
        assert_eq!(state.v[0x1], 0xFE);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xye_shl_nomsb() {
        let mut state = State::new();
        state.v[0x1] = 0x4;
        let state = run(0x810E, &state);
        assert_eq!(state.v[0x1], 0x8);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xy6_shr_reads_vy_with_quirk() {
        let mut state = State::new();
        state.v[0x1] = 0xF0;
        state.v[0x2] = 0x03;
        let quirks = Quirks {
            shift_reads_vy: true,
            ..Quirks::default()
        };
        let state = run_with(0x8126, &state, &Keypad::new(), quirks).unwrap();
        assert_eq!(state.v[0x1], 0x01);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_9xy0_sne_skips() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        let state = run(0x9120, &state);
        assert_eq!(state.pc, 0x0204);
    }

    #[test]
    fn test_9xy0_sne_doesntskip() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        state.v[0x2] = 0x11;
        let state = run(0x9120, &state);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_annn_ld() {
        let state = State::new();
        let state = run(0xAABC, &state);
        assert_eq!(state.i, 0xABC);
    }

    #[test]
    fn test_bnnn_jp() {
        let mut state = State::new();
        state.v[0x0] = 0x2;
        let state = run(0xBABC, &state);
        assert_eq!(state.pc, 0xABE);
    }

    #[test]
    fn test_cxkk_rnd_is_masked() {
        let state = State::new();
        for &mask in &[0x00u8, 0x0F, 0xF0] {
            let state = run(0xC100 | u16::from(mask), &state);
            assert_eq!(state.v[0x1] & !mask, 0);
        }
    }

    #[test]
    fn test_cxkk_rnd_is_reproducible_with_same_seed() {
        let state = State::new();
        assert_eq!(run(0xC1FF, &state).v[0x1], run(0xC1FF, &state).v[0x1]);
    }

    #[test]
    fn test_dxyn_drw_draws() {
        let mut state = State::new();
        state.v[0x0] = 0x1;
        // Draw the 0x0 sprite with a 1x 1y offset
        let state = run(0xD005, &state);
        assert_eq!(state.frame_buffer.pixel_rows()[0], 0);
        assert_eq!(state.frame_buffer.pixel_rows()[1] >> 56, 0b0111_1000);
        assert_eq!(state.frame_buffer.pixel_rows()[2] >> 56, 0b0100_1000);
        assert_eq!(state.frame_buffer.pixel_rows()[5] >> 56, 0b0111_1000);
        assert_eq!(state.v[0xF], 0x0);
        assert!(state.draw_flag);
    }

    #[test]
    fn test_dxyn_drw_collides() {
        let mut state = State::new();
        state.frame_buffer.draw(0, 0, &[0x80]);
        let state = run(0xD001, &state);
        assert_eq!(state.v[0xF], 0x1)
    }

    #[test]
    fn test_dxyn_drw_clears_stale_collision_flag() {
        let mut state = State::new();
        state.v[0xF] = 0x1;
        let state = run(0xD011, &state);
        assert_eq!(state.v[0xF], 0x0)
    }

    #[test]
    fn test_dxyn_drw_twice_restores_frame() {
        let mut state = State::new();
        state.frame_buffer.draw(3, 3, &[0xAA, 0x55]);
        state.v[0x1] = 60;
        state.v[0x2] = 30;
        let before = state.frame_buffer;
        let once = run(0xD125, &state);
        let twice = run(0xD125, &once);
        assert_eq!(once.v[0xF], 0x0);
        assert_eq!(twice.v[0xF], 0x1);
        assert_eq!(twice.frame_buffer, before);
    }

    #[test]
    fn test_dxyn_drw_reading_past_memory_fails() {
        let mut state = State::new();
        state.i = 0xFFE;
        let result = run_with(0xD005, &state, &Keypad::new(), Quirks::default());
        assert_eq!(
            result,
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 })
        );
    }

    #[test]
    fn test_ex9e_skp_skips() {
        let mut state = State::new();
        let mut keypad = Keypad::new();
        keypad.set(0xE, true).unwrap();
        state.v[0x1] = 0xE;
        let state = run_with(0xE19E, &state, &keypad, Quirks::default()).unwrap();
        assert_eq!(state.pc, 0x0204);
    }

    #[test]
    fn test_ex9e_skp_uses_low_nibble() {
        let mut state = State::new();
        let mut keypad = Keypad::new();
        keypad.set(0xE, true).unwrap();
        state.v[0x1] = 0xFE;
        let state = run_with(0xE19E, &state, &keypad, Quirks::default()).unwrap();
        assert_eq!(state.pc, 0x0204);
    }

    #[test]
    fn test_ex9e_skp_doesntskip() {
        let state = State::new();
        let state = run(0xE19E, &state);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_exa1_sknp_skips() {
        let state = State::new();
        let state = run(0xE1A1, &state);
        assert_eq!(state.pc, 0x0204);
    }

    #[test]
    fn test_exa1_sknp_doesntskip() {
        let mut state = State::new();
        let mut keypad = Keypad::new();
        keypad.set(0xE, true).unwrap();
        state.v[0x1] = 0xE;
        let state = run_with(0xE1A1, &state, &keypad, Quirks::default()).unwrap();
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_fx07_ld() {
        let mut state = State::new();
        state.delay_timer = 0xF;
        let state = run(0xF107, &state);
        assert_eq!(state.v[0x1], 0xF);
    }

    #[test]
    fn test_fx08_ld() {
        let mut state = State::new();
        state.sound_timer = 0xC;
        let state = run(0xF108, &state);
        assert_eq!(state.v[0x1], 0xC);
    }

    #[test]
    fn test_fx0a_ld_setsregisterneedingkey() {
        let state = State::new();
        let state = run(0xF10A, &state);
        assert_eq!(state.register_needing_key, Some(0x1));
        assert_eq!(state.pc, 0x0200);
    }

    #[test]
    fn test_fx0a_ld_completes_with_key_down() {
        let state = State::new();
        let mut keypad = Keypad::new();
        keypad.set(0x7, true).unwrap();
        let state = run_with(0xF10A, &state, &keypad, Quirks::default()).unwrap();
        assert_eq!(state.register_needing_key, None);
        assert_eq!(state.v[0x1], 0x7);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_fx15_ld() {
        let mut state = State::new();
        state.v[0x1] = 0xF;
        let state = run(0xF115, &state);
        assert_eq!(state.delay_timer, 0xF);
    }

    #[test]
    fn test_fx18_ld() {
        let mut state = State::new();
        state.v[0x1] = 0xF;
        let state = run(0xF118, &state);
        assert_eq!(state.sound_timer, 0xF);
    }

    #[test]
    fn test_fx1e_add() {
        let mut state = State::new();
        state.i = 0x1;
        state.v[0x1] = 0x1;
        let state = run(0xF11E, &state);
        assert_eq!(state.i, 0x2);
    }

    #[test]
    fn test_fx29_ld() {
        let mut state = State::new();
        state.v[0x1] = 0x2;
        let state = run(0xF129, &state);
        assert_eq!(state.i, 0xA);
    }

    #[test]
    fn test_fx29_ld_uses_low_nibble() {
        let mut state = State::new();
        state.v[0x1] = 0x1F;
        let state = run(0xF129, &state);
        assert_eq!(state.i, 0x4B);
    }

    #[test]
    fn test_fx33_ld() {
        let mut state = State::new();
        // 0x7B -> 123
        state.v[0x1] = 0x7B;
        state.i = 0x300;
        let state = run(0xF133, &state);
        assert_eq!(state.memory.slice(0x300, 3).unwrap(), &[0x1, 0x2, 0x3]);
    }

    #[test]
    fn test_fx33_ld_into_reserved_memory_fails() {
        let mut state = State::new();
        state.i = 0x0;
        let result = run_with(0xF133, &state, &Keypad::new(), Quirks::default());
        assert_eq!(result, Err(Chip8Error::ReservedWrite { address: 0x0 }));
    }

    #[test]
    fn test_fx_55_ld() {
        let mut state = State::new();
        state.i = 0x300;
        state.v[0x0..0x5].copy_from_slice(&[0x1, 0x2, 0x3, 0x4, 0x5]);
        let state = run(0xF455, &state);
        assert_eq!(
            state.memory.slice(0x300, 6).unwrap(),
            &[0x1, 0x2, 0x3, 0x4, 0x5, 0x0]
        );
        assert_eq!(state.i, 0x300);
    }

    #[test]
    fn test_fx_65_ld() {
        let mut state = State::new();
        state.i = 0x300;
        state
            .memory
            .write_slice(0x300, &[0x1, 0x2, 0x3, 0x4, 0x5, 0x6])
            .unwrap();
        let state = run(0xF465, &state);
        assert_eq!(state.v[0x0..0x6], [0x1, 0x2, 0x3, 0x4, 0x5, 0x0]);
        assert_eq!(state.i, 0x300);
    }

    #[test]
    fn test_fx_65_ld_advances_i_with_quirk() {
        let mut state = State::new();
        state.i = 0x300;
        let quirks = Quirks {
            load_store_advances_i: true,
            ..Quirks::default()
        };
        let state = run_with(0xF265, &state, &Keypad::new(), quirks).unwrap();
        assert_eq!(state.i, 0x303);
    }
}
