use rand::{Rng, RngCore};

use crate::config::Quirks;
use crate::constants::{FONT_ADDR, FONT_GLYPH_SIZE, STACK_DEPTH};
use crate::error::Chip8Error;
use crate::keypad::Keypad;
use crate::opcode::Opcode;
use crate::state::State;

/// What an operation can see of the world outside the machine's State.
pub struct Context<'a> {
    pub keypad: &'a Keypad,
    pub rng: &'a mut dyn RngCore,
    pub quirks: Quirks,
}

/// Every instruction is a function from the current State to the next one.
pub type Operation = fn(op: Opcode, state: &State, ctx: &mut Context<'_>) -> Result<State, Chip8Error>;

/// Moves on to the next instruction, or skips over it if `condition` holds
fn skip_if(condition: bool, state: &State) -> State {
    let pc = if condition {
        state.pc + 0x4
    } else {
        state.next_pc()
    };
    State { pc, ..*state }
}

/// Writes an arithmetic result to Vx and then its flag to VF.
/// The flag is written last so it wins when x is F.
fn with_flag(state: &State, x: u8, result: u8, flag: bool) -> State {
    let mut v = state.v;
    v[x as usize] = result;
    v[0xF] = flag as u8;
    State {
        pc: state.next_pc(),
        v,
        ..*state
    }
}

/// Writes a result to Vx, leaving VF alone
fn with_register(state: &State, x: u8, value: u8) -> State {
    let mut v = state.v;
    v[x as usize] = value;
    State {
        pc: state.next_pc(),
        v,
        ..*state
    }
}

/// clear
pub fn clr(_op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let mut frame_buffer = state.frame_buffer;
    frame_buffer.clear();
    Ok(State {
        pc: state.next_pc(),
        frame_buffer,
        draw_flag: true,
        ..*state
    })
}

/// PC = STACK.pop()
pub fn rts(_op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let sp = state.sp.checked_sub(1).ok_or(Chip8Error::StackUnderflow)?;
    Ok(State {
        pc: state.stack[sp],
        sp,
        ..*state
    })
}

/// PC = addr
pub fn jump(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    Ok(State {
        pc: op.addr(),
        ..*state
    })
}

/// STACK.push(PC + 2); PC = addr
pub fn call(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    if state.sp == STACK_DEPTH {
        return Err(Chip8Error::StackOverflow { depth: STACK_DEPTH });
    }
    let mut stack = state.stack;
    stack[state.sp] = state.next_pc();
    Ok(State {
        pc: op.addr(),
        sp: state.sp + 1,
        stack,
        ..*state
    })
}

/// if Vx == kk then pc += 2
pub fn ske(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    Ok(skip_if(state.v[op.x() as usize] == op.kk(), state))
}

/// if Vx != kk then pc += 2
pub fn skne(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    Ok(skip_if(state.v[op.x() as usize] != op.kk(), state))
}

/// if Vx == Vy then pc += 2
pub fn skre(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    Ok(skip_if(
        state.v[op.x() as usize] == state.v[op.y() as usize],
        state,
    ))
}

/// Vx = kk
pub fn load(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    Ok(with_register(state, op.x(), op.kk()))
}

/// Vx += kk
/// Add kk to Vx; allow for overflow but implicitly drop it
pub fn add(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let res = state.v[op.x() as usize].wrapping_add(op.kk());
    Ok(with_register(state, op.x(), res))
}

/// Vx = Vy
pub fn mv(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    Ok(with_register(state, op.x(), state.v[op.y() as usize]))
}

/// Vx |= Vy
pub fn or(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let res = state.v[op.x() as usize] | state.v[op.y() as usize];
    Ok(with_register(state, op.x(), res))
}

/// Vx &= Vy
pub fn and(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let res = state.v[op.x() as usize] & state.v[op.y() as usize];
    Ok(with_register(state, op.x(), res))
}

/// Vx ^= Vy
pub fn xor(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let res = state.v[op.x() as usize] ^ state.v[op.y() as usize];
    Ok(with_register(state, op.x(), res))
}

/// Vx += Vy; VF = overflow
pub fn addr(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let (res, over) = state.v[op.x() as usize].overflowing_add(state.v[op.y() as usize]);
    Ok(with_flag(state, op.x(), res, over))
}

/// Vx -= Vy; VF = !underflow
pub fn sub(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let (res, under) = state.v[op.x() as usize].overflowing_sub(state.v[op.y() as usize]);
    Ok(with_flag(state, op.x(), res, !under))
}

/// Vx >>= 1; VF = the bit shifted out
pub fn shr(op: Opcode, state: &State, ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let src = shift_source(op, state, ctx.quirks);
    Ok(with_flag(state, op.x(), src >> 1, src & 0x1 == 1))
}

/// Vx = Vy - Vx; VF = !underflow
pub fn subn(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let (res, under) = state.v[op.y() as usize].overflowing_sub(state.v[op.x() as usize]);
    Ok(with_flag(state, op.x(), res, !under))
}

/// Vx <<= 1; VF = the bit shifted out
pub fn shl(op: Opcode, state: &State, ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let src = shift_source(op, state, ctx.quirks);
    Ok(with_flag(state, op.x(), src << 1, src & 0x80 != 0))
}

fn shift_source(op: Opcode, state: &State, quirks: Quirks) -> u8 {
    if quirks.shift_reads_vy {
        state.v[op.y() as usize]
    } else {
        state.v[op.x() as usize]
    }
}

/// if Vx != Vy then pc +=2
pub fn skrne(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    Ok(skip_if(
        state.v[op.x() as usize] != state.v[op.y() as usize],
        state,
    ))
}

/// I = addr
pub fn loadi(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    Ok(State {
        pc: state.next_pc(),
        i: op.addr(),
        ..*state
    })
}

/// PC = V0 + addr
pub fn jumpi(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    Ok(State {
        pc: u16::from(state.v[0x0]) + op.addr(),
        ..*state
    })
}

/// Vx = rand_byte & kk
pub fn rnd(op: Opcode, state: &State, ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let rand_byte: u8 = ctx.rng.gen();
    Ok(with_register(state, op.x(), rand_byte & op.kk()))
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory i..i+n at position x, y on the FrameBuffer.
/// Sets VF if any pixels are erased
pub fn draw(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let sprite = state.memory.slice(state.i, op.n() as usize)?;
    let mut frame_buffer = state.frame_buffer;
    let collision = frame_buffer.draw(
        state.v[op.x() as usize] as usize,
        state.v[op.y() as usize] as usize,
        sprite,
    );

    let mut v = state.v;
    v[0xF] = collision as u8;
    Ok(State {
        pc: state.next_pc(),
        draw_flag: true,
        v,
        frame_buffer,
        ..*state
    })
}

/// if Vx.pressed then pc += 2
pub fn skpr(op: Opcode, state: &State, ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let pressed = ctx.keypad.is_pressed(state.v[op.x() as usize] & 0xF)?;
    Ok(skip_if(pressed, state))
}

/// if !Vx.pressed then pc += 2
pub fn skup(op: Opcode, state: &State, ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let pressed = ctx.keypad.is_pressed(state.v[op.x() as usize] & 0xF)?;
    Ok(skip_if(!pressed, state))
}

/// Vx = DT
pub fn moved(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    Ok(with_register(state, op.x(), state.delay_timer))
}

/// Vx = ST
pub fn moves(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    Ok(with_register(state, op.x(), state.sound_timer))
}

/// await keypress for Vx
/// Completes straight away if a key is already down, otherwise parks the pc here
pub fn keyd(op: Opcode, state: &State, ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    match ctx.keypad.first_pressed() {
        Some(key) => Ok(with_register(state, op.x(), key)),
        None => Ok(State {
            register_needing_key: Some(op.x()),
            ..*state
        }),
    }
}

/// DT = Vx
pub fn loadd(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    Ok(State {
        pc: state.next_pc(),
        delay_timer: state.v[op.x() as usize],
        ..*state
    })
}

/// ST = Vx
pub fn loads(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    Ok(State {
        pc: state.next_pc(),
        sound_timer: state.v[op.x() as usize],
        ..*state
    })
}

/// I += Vx
pub fn addi(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    Ok(State {
        pc: state.next_pc(),
        i: state.i.wrapping_add(u16::from(state.v[op.x() as usize])),
        ..*state
    })
}

/// I = sprite_addr(Vx)
/// Set I to the memory address of the font sprite for the low nibble of Vx
/// See constants::SPRITE_SHEET for more details
pub fn ldspr(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let digit = u16::from(state.v[op.x() as usize] & 0xF);
    Ok(State {
        pc: state.next_pc(),
        i: FONT_ADDR + digit * FONT_GLYPH_SIZE,
        ..*state
    })
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address i
pub fn bcd(op: Opcode, state: &State, _ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let vx = state.v[op.x() as usize];
    let bcd = [vx / 100 % 10, vx / 10 % 10, vx % 10];
    let mut memory = state.memory;
    memory.write_slice(state.i, &bcd)?;
    Ok(State {
        pc: state.next_pc(),
        memory,
        ..*state
    })
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(op: Opcode, state: &State, ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let count = op.x() as usize + 1;
    let mut memory = state.memory;
    memory.write_slice(state.i, &state.v[..count])?;
    Ok(State {
        pc: state.next_pc(),
        i: index_after_transfer(state.i, count, ctx.quirks),
        memory,
        ..*state
    })
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(op: Opcode, state: &State, ctx: &mut Context<'_>) -> Result<State, Chip8Error> {
    let count = op.x() as usize + 1;
    let mut v = state.v;
    v[..count].copy_from_slice(state.memory.slice(state.i, count)?);
    Ok(State {
        pc: state.next_pc(),
        i: index_after_transfer(state.i, count, ctx.quirks),
        v,
        ..*state
    })
}

fn index_after_transfer(i: u16, count: usize, quirks: Quirks) -> u16 {
    if quirks.load_store_advances_i {
        i.wrapping_add(count as u16)
    } else {
        i
    }
}
