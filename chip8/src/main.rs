use std::error::Error;
use std::path::PathBuf;

use clap::{arg, command, value_parser, ArgAction, Command};

use emu8::{Config, Quirks};

mod keymap;
mod run;

use keymap::keymap;
use run::{run, Options};

fn cli() -> Command {
    let rom_arg = arg!([rom] "Path to the ROM to run")
        .required(true)
        .value_parser(value_parser!(PathBuf));
    let cycles_arg = arg!(-n --cycles <CYCLES> "How many CPU cycles to run")
        .value_parser(value_parser!(u64))
        .default_value("10000");
    let seed_arg = arg!(--seed <SEED> "Seed for the RND instruction").value_parser(value_parser!(u64));
    let hold_arg = arg!(--hold <KEYS> "Keys held down for the whole run, e.g. 'qw'");
    let realtime_arg = arg!(--realtime "Run at the original clock speed").action(ArgAction::SetTrue);
    let shift_arg =
        arg!(--"shift-vy" "8xy6/8xyE shift Vy into Vx").action(ArgAction::SetTrue);
    let advance_arg =
        arg!(--"advance-i" "Fx55/Fx65 leave I past the last register").action(ArgAction::SetTrue);

    command!()
        .arg(rom_arg)
        .arg(cycles_arg)
        .arg(seed_arg)
        .arg(hold_arg)
        .arg(realtime_arg)
        .arg(shift_arg)
        .arg(advance_arg)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Off)
        .filter_module("emu8", log::LevelFilter::Info)
        .filter_module("chip8", log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let matches = cli().get_matches();

    let rom = matches.get_one::<PathBuf>("rom").ok_or("missing ROM path")?;
    let cycles = *matches
        .get_one::<u64>("cycles")
        .ok_or("missing cycle count")?;

    let mut config = Config::default().with_quirks(Quirks {
        shift_reads_vy: matches.get_flag("shift-vy"),
        load_store_advances_i: matches.get_flag("advance-i"),
    });
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config = config.with_rng_seed(seed);
    }

    let held_keys = match matches.get_one::<String>("hold") {
        Some(keys) => keys
            .chars()
            .map(|key| keymap(key).ok_or_else(|| format!("no keypad key is mapped to '{}'", key)))
            .collect::<Result<Vec<u8>, String>>()?,
        None => Vec::new(),
    };

    run(
        rom,
        Options {
            config,
            cycles,
            realtime: matches.get_flag("realtime"),
            held_keys,
        },
    )
}
