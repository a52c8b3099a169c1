use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use log::{error, info};

use emu8::{Chip8, Config, PixelRows, CLOCK_SPEED, CPU_CYCLES_PER_TIMER_CYCLE};

pub struct Options {
    pub config: Config,
    /// How many CPU cycles to run before stopping
    pub cycles: u64,
    /// Whether or not the default clock speed should be respected
    pub realtime: bool,
    /// Keypad codes held down for the whole run
    pub held_keys: Vec<u8>,
}

pub fn run(rom: &Path, options: Options) -> Result<(), Box<dyn Error>> {
    let mut chip8 = Chip8::with_config(options.config);

    // Load ROM
    let program = fs::read(rom)?;
    chip8.load(&program)?;
    info!("loaded {} ({} bytes)", rom.display(), program.len());

    for &key in &options.held_keys {
        chip8.key_press(key)?;
    }

    // Set initial timing
    let cycle_time = Duration::new(0, CLOCK_SPEED as u32);
    let mut last_cycle = Instant::now();
    let mut halted = None;

    for cycle in 1..=options.cycles {
        if let Err(e) = chip8.tick() {
            error!("halted at pc {:04X}: {}", chip8.pc(), e);
            halted = Some(e);
            break;
        }
        if cycle % u64::from(CPU_CYCLES_PER_TIMER_CYCLE) == 0 {
            chip8.decrement_timers();
        }

        // Handle timing
        let current_time = Instant::now();
        let elapsed_cycle_time = current_time - last_cycle;
        if options.realtime && cycle_time > elapsed_cycle_time {
            std::thread::sleep(cycle_time - elapsed_cycle_time);
        }
        last_cycle = current_time;
    }

    print!("{}", render(chip8.pixel_rows()));
    println!("pc {:04X}  i {:04X}", chip8.pc(), chip8.index());
    for (n, v) in chip8.registers().iter().enumerate() {
        print!("v{:X} {:02X}{}", n, v, if n % 8 == 7 { "\n" } else { "  " });
    }

    match halted {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Draws the frame as text, one line per row
fn render(rows: &PixelRows) -> String {
    rows.iter()
        .map(|row| {
            let line: String = format!("{:064b}", row)
                .chars()
                .map(|bit| if bit == '1' { '#' } else { '.' })
                .collect();
            line + "\n"
        })
        .collect()
}
